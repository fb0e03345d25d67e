// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};

use skylift::config::Environment;
use skylift::report::ReportFormat;

#[derive(Parser)]
#[command(name = "skylift")]
#[command(about = "Deploy and smoke-test a serverless function")]
#[command(version)]
pub struct Cli {
    /// Target environment
    #[arg(
        short,
        long,
        global = true,
        value_enum,
        env = "SKYLIFT_ENVIRONMENT",
        default_value_t = Environment::Dev
    )]
    pub environment: Environment,

    /// Target region (falls back to AWS_REGION, then the config file)
    #[arg(short, long, global = true)]
    pub region: Option<String>,

    /// Override the derived stack name
    #[arg(long, global = true)]
    pub stack_name: Option<String>,

    /// Report format
    #[arg(short, long, global = true, value_enum, default_value_t = ReportFormat::Text)]
    pub output: ReportFormat,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build, package, deploy, and validate the function
    Deploy,

    /// Run the validation probes against an already-deployed stack
    Validate,

    /// Show the stack's current state and outputs
    Status,
}
