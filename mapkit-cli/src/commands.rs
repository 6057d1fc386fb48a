use clap::Subcommand;

use crate::args::*;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List bundled providers and their use cases.
    List {
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Run one use case and print its report.
    Run {
        provider: String,
        use_case: String,
        #[command(flatten)]
        invocation: InvocationArgs,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        runtime: RuntimeArgs,
        #[command(flatten)]
        retry: RetryArgs,
    },
}
