use clap::Parser;

mod args;
mod cmd;
mod commands;
mod exit_codes;
mod logging;
mod output;
mod providers;

pub use args::*;
use commands::Command;

#[derive(Debug, Parser)]
#[command(name = "mapkit", version, about = "Use-case integration map runner")]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create tokio runtime: {e}");
            std::process::exit(exit_codes::FAULT);
        }
    };

    let exit_code = rt.block_on(run_command(cli.command));
    std::process::exit(exit_code);
}

async fn run_command(command: Command) -> i32 {
    match command {
        Command::List { output } => cmd::list::list_cmd(output),
        Command::Run {
            provider,
            use_case,
            invocation,
            output,
            runtime,
            retry,
        } => cmd::run::run_cmd(&provider, &use_case, invocation, output, runtime, retry).await,
    }
}
