#![allow(missing_docs)]

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "btdoc", about = "Behavior tree document inspection tools")]
struct Cli {
	/// Raise log verbosity (-v info, -vv debug, -vvv trace); `RUST_LOG` wins when set.
	#[arg(short, long, action = ArgAction::Count, global = true)]
	verbose: u8,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Summarize a behavior container.
	Info(cmd::info::Args),
	/// Print the decoded task tree.
	Tree(cmd::tree::Args),
	/// Print one decoded node with its fields.
	Show(cmd::show::Args),
	/// List document or global variables.
	Vars(cmd::vars::Args),
	/// Dump field layout rows.
	Layout(cmd::layout::Args),
	/// Re-encode a document in the current format.
	Convert(cmd::convert::Args),
}

fn main() {
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> btdoc::tree::Result<()> {
	let cli = Cli::parse();
	init_logging(cli.verbose);

	match cli.command {
		Commands::Info(args) => cmd::info::run(args),
		Commands::Tree(args) => cmd::tree::run(args),
		Commands::Show(args) => cmd::show::run(args),
		Commands::Vars(args) => cmd::vars::run(args),
		Commands::Layout(args) => cmd::layout::run(args),
		Commands::Convert(args) => cmd::convert::run(args),
	}
}

fn init_logging(verbose: u8) {
	let level = match verbose {
		0 => "warn",
		1 => "info",
		2 => "debug",
		_ => "trace",
	};
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
