use clap::Parser;
use uipo_cli::cli::Cli;
use uipo_cli::commands;
use uipo_cli::error::CliError;
use uipo_cli::logging;
use uipo_cli::output::{self, OutputFormat, ResultBuilder};

#[tokio::main(flavor = "current_thread")]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	let format = cli.format;
	let command = cli.command.name();

	if let Err(err) = commands::dispatch(cli).await {
		handle_error(command, err, format);
		std::process::exit(1);
	}
}

fn handle_error(command: &str, err: CliError, format: OutputFormat) {
	let cmd_error = err.to_command_error();

	output::print_error_stderr(&cmd_error);

	if format == OutputFormat::Json {
		let result: output::CommandResult<()> = ResultBuilder::new(command)
			.command_error(cmd_error)
			.build();
		output::print_result(&result, format);
	}
}
