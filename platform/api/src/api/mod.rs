use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use common::http::{error_body, RouteError};
use common::make_response;
use hyper::server::conn::Http;
use hyper::{Body, Request, Response, StatusCode};
use routerify::{RequestServiceBuilder, Router};
use tokio::net::TcpSocket;
use tokio::select;

use self::error::{ApiError, Result};
use crate::config::ApiConfig;
use crate::global::ApiGlobal;

pub mod error;
pub mod ext;
pub mod gathers;
pub mod health;
pub mod middleware;
pub mod users;

pub fn routes<G: ApiGlobal>(global: &Arc<G>) -> Router<Body, RouteError<ApiError>> {
	let weak = Arc::downgrade(global);
	Router::builder()
		.data(weak)
		.err_handler_with_info(common::http::error_handler::<ApiError>)
		.middleware(middleware::cors::cors_middleware(global))
		.middleware(middleware::request_log::request_log_middleware(global))
		.scope("/", health::routes(global))
		.scope("/", gathers::routes(global))
		.scope("/", users::routes(global))
		.options("/*", middleware::cors::preflight)
		.any(not_found)
		.build()
		.expect("failed to build router")
}

async fn not_found(_: Request<Body>) -> Result<Response<Body>> {
	Ok(make_response!(StatusCode::NOT_FOUND, error_body("not found")))
}

async fn load_tls(cert: &str, key: &str) -> anyhow::Result<tokio_rustls::TlsAcceptor> {
	let cert = tokio::fs::read(cert).await.context("failed to read api ssl cert")?;
	let key = tokio::fs::read(key).await.context("failed to read api ssl private key")?;

	let key = rustls_pemfile::pkcs8_private_keys(&mut io::BufReader::new(io::Cursor::new(key)))?
		.into_iter()
		.next()
		.map(rustls::PrivateKey)
		.context("no pkcs8 private key found")?;

	let certs = rustls_pemfile::certs(&mut io::BufReader::new(io::Cursor::new(cert)))?
		.into_iter()
		.map(rustls::Certificate)
		.collect();

	let config = rustls::ServerConfig::builder()
		.with_safe_defaults()
		.with_no_client_auth()
		.with_single_cert(certs, key)?;

	Ok(tokio_rustls::TlsAcceptor::from(Arc::new(config)))
}

pub async fn run<G: ApiGlobal>(global: Arc<G>) -> anyhow::Result<()> {
	let config = global.config::<ApiConfig>();

	tracing::info!("listening on {}", config.bind_address);
	let socket = if config.bind_address.is_ipv6() {
		TcpSocket::new_v6()?
	} else {
		TcpSocket::new_v4()?
	};

	socket.set_reuseaddr(true)?;
	socket.set_reuseport(true)?;
	socket.bind(config.bind_address)?;
	let listener = socket.listen(1024)?;

	let tls_acceptor = match &config.tls {
		Some(tls) => {
			tracing::info!("tls enabled");
			Some(load_tls(&tls.cert, &tls.key).await?)
		}
		None => None,
	};

	// The router only holds a weak handle to the global state so open
	// keep-alive connections do not hold up shutdown.
	let request_service = RequestServiceBuilder::new(routes(&global)).expect("failed to build request service");

	loop {
		select! {
			_ = global.ctx().done() => {
				return Ok(());
			},
			r = listener.accept() => {
				let (socket, addr) = r?;

				let tls_acceptor = tls_acceptor.clone();
				let service = request_service.build(addr);

				tracing::trace!("accepted connection from {}", addr);

				tokio::spawn(async move {
					if let Some(tls_acceptor) = tls_acceptor {
						let Ok(Ok(socket)) = tokio::time::timeout(Duration::from_secs(5), tls_acceptor.accept(socket)).await else {
							return;
						};
						Http::new().serve_connection(socket, service).with_upgrades().await.ok();
					} else {
						Http::new().serve_connection(socket, service).with_upgrades().await.ok();
					}
				});
			},
		}
	}
}
