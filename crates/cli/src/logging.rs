use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

pub fn init_logging(verbosity: u8) {
	// 0 = warnings only
	// 1 (-v) = connection lifecycle from the relay and agent
	// 2+ (-vv) = debug/trace for everything, including id allocation
	let filter = match verbosity {
		0 => "warn",
		1 => "info,cdp_bridge::dom=warn,cdp_bridge::runtime=warn",
		_ => "debug,cdp_bridge=trace",
	};

	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

	let stderr = std::io::stderr.with_max_level(tracing::Level::TRACE);

	tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_writer(stderr)
		.with_target(true)
		.with_level(true)
		.compact()
		.init();
}
