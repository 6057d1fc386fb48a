use clap::Args;

use crate::output::OutputFormat;

#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Args, Clone)]
pub struct InvocationArgs {
    /// JSON or YAML file with the use-case input.
    #[arg(long)]
    pub input: Option<std::path::PathBuf>,
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set_inputs: Vec<String>,
    /// JSON or YAML file with provider parameters.
    #[arg(long)]
    pub parameters: Option<std::path::PathBuf>,
    /// JSON or YAML file with provider credentials.
    #[arg(long)]
    pub security: Option<std::path::PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct RuntimeArgs {
    /// Override or add a service base URL.
    #[arg(long = "service", value_name = "NAME=URL")]
    pub services: Vec<String>,
    /// Per-request timeout in milliseconds.
    #[arg(long, default_value_t = 30000)]
    pub timeout: u64,
    #[arg(long, default_value_t = 4_194_304)]
    pub max_response_bytes: usize,
    #[arg(long, default_value_t = 1000)]
    pub max_pages: usize,
    /// Where runtime events go: none, stdout or log.
    #[arg(long, default_value = "none")]
    pub events: String,
}

#[derive(Debug, Args, Clone)]
pub struct RetryArgs {
    /// Total attempts per request; 1 disables retries.
    #[arg(long)]
    pub retry_max_attempts: Option<usize>,
    /// Upper bound for a single retry delay in milliseconds.
    #[arg(long)]
    pub retry_max_delay: Option<u64>,
    /// Header carrying the unix time a rate limit resets, honored after `Retry-After`.
    #[arg(long, value_name = "NAME")]
    pub retry_reset_header: Option<String>,
}
