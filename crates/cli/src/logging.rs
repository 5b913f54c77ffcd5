use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

// 0 = errors only
// 1 (-v) = uipo info: one line per HTTP request, config load and save
// 2 (-vv) = uipo debug: response sizes, temp files, auth responses
// 3+ = debug for everything, reqwest/hyper included
fn default_filter(verbosity: u8) -> &'static str {
	match verbosity {
		0 => "error",
		1 => "warn,uipo=info,uipo_cli=info",
		2 => "warn,uipo=debug,uipo_cli=debug",
		_ => "debug",
	}
}

pub fn init_logging(verbosity: u8) {
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

	let stderr = std::io::stderr.with_max_level(tracing::Level::TRACE);

	tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_writer(stderr)
		.with_target(true)
		.with_level(true)
		.compact()
		.init();
}
