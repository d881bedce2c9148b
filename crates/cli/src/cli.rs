use clap::{Args, Parser, Subcommand};

use cdp_bridge_protocol::relay::{DEFAULT_RELAY_HOST, DEFAULT_RELAY_PORT};

use crate::relay::RelayConfig;

#[derive(Parser, Debug)]
#[command(name = "cdp-bridge")]
#[command(about = "Relay CDP inspector sessions to inspected pages")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Run the session relay
	Serve {
		#[command(flatten)]
		relay: RelayArgs,
	},

	/// List pages connected to a running relay
	Pages {
		#[command(flatten)]
		relay: RelayArgs,

		/// Print the raw JSON listing
		#[arg(long)]
		json: bool,
	},

	/// Connect a sample inspected page to a running relay
	Demo {
		#[command(flatten)]
		relay: RelayArgs,

		/// Page id to register under
		#[arg(long, default_value = "demo")]
		id: String,
	},
}

#[derive(Args, Debug, Clone)]
pub struct RelayArgs {
	/// Relay host
	#[arg(long, default_value = DEFAULT_RELAY_HOST)]
	pub host: String,

	/// Relay port
	#[arg(short, long, default_value_t = DEFAULT_RELAY_PORT)]
	pub port: u16,
}

impl From<RelayArgs> for RelayConfig {
	fn from(args: RelayArgs) -> Self {
		RelayConfig {
			host: args.host,
			port: args.port,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn serve_defaults() {
		let cli = Cli::try_parse_from(["cdp-bridge", "serve"]).unwrap();
		let Commands::Serve { relay } = cli.command else {
			panic!("expected serve");
		};
		assert_eq!(RelayConfig::from(relay), RelayConfig::default());
	}

	#[test]
	fn pages_with_overrides() {
		let cli = Cli::try_parse_from(["cdp-bridge", "-vv", "pages", "--port", "9300", "--json"]).unwrap();
		assert_eq!(cli.verbose, 2);
		let Commands::Pages { relay, json } = cli.command else {
			panic!("expected pages");
		};
		assert!(json);
		assert_eq!(relay.port, 9300);
		assert_eq!(relay.host, DEFAULT_RELAY_HOST);
	}
}
