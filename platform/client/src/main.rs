use anyhow::Context as _;
use clap::{Parser, Subcommand};
use common::config::ConfigArgs;
use common::types::{Bounds, Gather, LatLng, Participant};
use gathers_client::config::{ClientConfig, ENV_PREFIX};
use gathers_client::discovery::{DiscoveryController, GatherDraft, Session};
use gathers_client::places::GooglePlaces;
use gathers_client::GatherClient;
use ulid::Ulid;

#[derive(Debug, Parser)]
#[command(author, version, about = "Find, create and join gathers from the command line")]
struct Cli {
	#[command(flatten)]
	config: ConfigArgs,

	/// Act as this existing user
	#[arg(long, global = true, env = "GATHERS_USER_ID")]
	user_id: Option<Ulid>,

	/// Register a new user with this name when no user id is given
	#[arg(long, global = true, default_value = "anonymous")]
	user_name: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Show place suggestions for some text
	Search { input: String },
	/// Pick a suggestion and show the gather at that place, if any
	Select {
		input: String,
		/// Which suggestion to pick
		#[arg(long, default_value_t = 0)]
		index: usize,
	},
	/// Create a gather at the picked place
	Create {
		input: String,
		#[arg(long, default_value_t = 0)]
		index: usize,
		#[arg(long)]
		name: String,
		#[arg(long, default_value = "")]
		description: String,
		#[arg(long = "picture")]
		pictures: Vec<String>,
	},
	/// Join the gather at the picked place
	Join {
		input: String,
		#[arg(long, default_value_t = 0)]
		index: usize,
	},
	/// List gathers inside a viewport
	Nearby {
		#[arg(long, allow_hyphen_values = true)]
		north: f64,
		#[arg(long, allow_hyphen_values = true)]
		east: f64,
		#[arg(long, allow_hyphen_values = true)]
		south: f64,
		#[arg(long, allow_hyphen_values = true)]
		west: f64,
	},
	/// Register a user and print its id
	Register { name: String },
}

type Controller = DiscoveryController<GooglePlaces, GatherClient>;

/// Types `input`, waits for the suggestions to be revealed and selects the
/// one at `index`.
async fn pick(controller: &Controller, input: &str, index: usize) -> anyhow::Result<()> {
	controller.handle_input(input).await.context("place lookup failed")?;

	let suggestions = controller.state().suggestions;
	let suggestion = suggestions
		.get(index)
		.with_context(|| format!("no suggestion at index {index}, got {}", suggestions.len()))?;

	println!("selected: {}", suggestion.label);

	controller
		.select_suggestion(suggestion)
		.await
		.context("failed to select place")?;

	Ok(())
}

fn print_gather(gather: &Gather) {
	let names = gather.participants.iter().map(|p| p.name.as_str()).collect::<Vec<_>>();
	println!(
		"{} {} at {} ({}) participants: {}",
		gather.id,
		gather.name,
		gather.google_place.name,
		gather.google_place.formatted_address,
		names.join(", ")
	);
}

/// Loads the user to act as, or registers a new one when no id is given.
async fn session(client: &GatherClient, user_id: Option<Ulid>, user_name: &str) -> anyhow::Result<Session> {
	let participant: Participant = match user_id {
		Some(id) => client.user(id).await.context("failed to load user")?,
		None => {
			let user = client.create_user(user_name).await.context("failed to register user")?;
			eprintln!("registered user {} ({}), pass --user-id to reuse it", user.name, user.id);
			user
		}
	};

	Ok(Session::new(participant))
}

/// Read only commands never touch the user, they get a session that exists
/// only locally.
fn local_session(user_id: Option<Ulid>, user_name: &str) -> Session {
	Session::new(Participant {
		id: user_id.unwrap_or_else(Ulid::new),
		name: user_name.to_owned(),
	})
}

fn controller(client: GatherClient, config: &ClientConfig, session: Session) -> anyhow::Result<Controller> {
	let places = GooglePlaces::new(&config.places).context("invalid places url")?;

	Ok(DiscoveryController::new(places, client, session, config.discovery.clone()))
}

async fn run(cli: Cli, config: ClientConfig) -> anyhow::Result<()> {
	let client = GatherClient::new(&config.api_url).context("invalid api url")?;
	let Cli {
		user_id,
		user_name,
		command,
		..
	} = cli;

	match command {
		Command::Register { name } => {
			let user = client.create_user(&name).await.context("failed to register user")?;
			println!("{}", user.id);
		}
		Command::Search { input } => {
			let controller = controller(client, &config, local_session(user_id, &user_name))?;
			controller.handle_input(&input).await.context("place lookup failed")?;
			for (i, suggestion) in controller.state().suggestions.iter().enumerate() {
				println!("{i}: {} ({})", suggestion.label, suggestion.id);
			}
		}
		Command::Select { input, index } => {
			let controller = controller(client, &config, local_session(user_id, &user_name))?;
			pick(&controller, &input, index).await?;
			match controller.state().selected_gather {
				Some(gather) => print_gather(&gather),
				None => println!("no gather here yet"),
			}
		}
		Command::Create {
			input,
			index,
			name,
			description,
			pictures,
		} => {
			let session = session(&client, user_id, &user_name).await?;
			let controller = controller(client, &config, session)?;
			pick(&controller, &input, index).await?;
			let gather = controller
				.create(GatherDraft {
					name,
					description,
					pictures,
				})
				.await
				.context("failed to create gather")?;
			print_gather(&gather);
		}
		Command::Join { input, index } => {
			let session = session(&client, user_id, &user_name).await?;
			let controller = controller(client, &config, session)?;
			pick(&controller, &input, index).await?;
			let gather = controller.join().await.context("failed to join gather")?;
			print_gather(&gather);
		}
		Command::Nearby {
			north,
			east,
			south,
			west,
		} => {
			let bounds = Bounds::new(LatLng { lat: north, lng: east }, LatLng { lat: south, lng: west })?;
			let controller = controller(client, &config, local_session(user_id, &user_name))?;
			controller
				.on_bounds_changed(bounds)
				.await
				.context("failed to load gathers")?;
			for gather in controller.state().visible_gathers {
				print_gather(&gather);
			}
		}
	}

	Ok(())
}

#[tokio::main]
async fn main() {
	let cli = Cli::parse();

	let config = match common::config::parse_with_args::<ClientConfig>(
		ENV_PREFIX,
		cli.config.clone(),
		ClientConfig::default().config_file,
	) {
		Ok((config, _)) => config,
		Err(err) => {
			eprintln!("failed to parse config: {err}");
			std::process::exit(1);
		}
	};

	if let Err(err) = common::logging::init(&config.logging.level, config.logging.mode) {
		eprintln!("failed to init logging: {err}");
		std::process::exit(1);
	}

	if let Err(err) = run(cli, config).await {
		tracing::error!("{:#}", err);
		eprintln!("error: {err:#}");
		std::process::exit(1);
	}
}
