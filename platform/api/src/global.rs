use std::sync::Arc;

use crate::config::ApiConfig;
use crate::database::GatherStore;

pub trait ApiState {
	fn store(&self) -> &Arc<dyn GatherStore>;
}

pub trait ApiGlobal:
	binary_helper::global::GlobalCtx
	+ binary_helper::global::GlobalConfigProvider<ApiConfig>
	+ binary_helper::global::GlobalConfig
	+ ApiState
	+ Send
	+ Sync
	+ 'static
{
}

impl<T> ApiGlobal for T where
	T: binary_helper::global::GlobalCtx
		+ binary_helper::global::GlobalConfigProvider<ApiConfig>
		+ binary_helper::global::GlobalConfig
		+ ApiState
		+ Send
		+ Sync
		+ 'static
{
}
