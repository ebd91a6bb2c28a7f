#![allow(missing_docs)]

use clap::{Parser, Subcommand};

mod cmd;

#[derive(Parser)]
#[command(name = "gffdoc", about = "GFF 4.x structured document inspection tools")]
struct Cli {
	/// Raise the default log filter to `debug`; `RUST_LOG` still wins when set.
	#[arg(long, short, global = true)]
	verbose: bool,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	Info(cmd::info::Args),
	Schema(cmd::schema::Args),
	Dump(cmd::dump::Args),
	Roundtrip(cmd::roundtrip::Args),
}

fn main() {
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> gffdoc::gff::Result<()> {
	let cli = Cli::parse();
	init_logging(cli.verbose);

	match cli.command {
		Commands::Info(args) => cmd::info::run(args),
		Commands::Schema(args) => cmd::schema::run(args),
		Commands::Dump(args) => cmd::dump::run(args),
		Commands::Roundtrip(args) => cmd::roundtrip::run(args),
	}
}

fn init_logging(verbose: bool) {
	let default_filter = if verbose { "debug" } else { "warn" };
	let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
		.format_timestamp(None)
		.try_init();
}
