// ABOUTME: Entry point for the skylift CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use skylift::build::{BuildEnvironment, DockerBuildEnvironment};
use skylift::config::{Config, Target};
use skylift::deploy::Pipeline;
use skylift::error::{Error, Result};
use skylift::report::{Report, ReportFormat};
use skylift::stack::{AwsCli, FunctionStatus, Orchestrator, StackError, StackState};
use skylift::validate::{HttpProtocolClient, ValidationResult, Validator};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let result = run(cli).await;

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let cwd = env::current_dir()?;
    let config = Config::discover(&cwd)?;
    let target = config.resolve(
        cli.environment,
        cli.region.as_deref(),
        cli.stack_name.as_deref(),
    )?;

    match cli.command {
        Commands::Deploy => deploy(config, target, cli.output).await,
        Commands::Validate => validate(config, target, cli.output).await,
        Commands::Status => status(target, cli.output).await,
    }
}

/// Run the full pipeline: build, package, reconcile, deploy, validate.
async fn deploy(config: Config, target: Target, format: ReportFormat) -> Result<()> {
    let aws = AwsCli::new();

    progress(format, "  → Checking prerequisites...");
    aws.preflight()
        .await
        .map_err(|e| Error::Precondition(e.to_string()))?;
    let build_env = DockerBuildEnvironment::connect(config.build.image.clone())
        .map_err(|e| Error::Precondition(e.to_string()))?;
    build_env
        .preflight()
        .await
        .map_err(|e| Error::Precondition(e.to_string()))?;

    progress(
        format,
        &format!(
            "Deploying {} as {} ({})",
            config.service, target.stack_name, target.region
        ),
    );

    let pipeline = Pipeline::new(config, target);

    progress(format, "  → Building artifact...");
    let pipeline = pipeline.build(&build_env).await?;

    progress(format, "  → Packaging bundle...");
    let pipeline = pipeline.package(&build_env).await?;

    progress(format, "  → Reconciling stack state...");
    let pipeline = pipeline.reconcile(&aws).await?;

    progress(format, &format!("  → Deploying ({})...", pipeline.action()));
    let pipeline = pipeline.submit(&aws).await?;
    progress(format, "  ✓ Deploy complete");

    // Validation is diagnostic: probe failures are reported but never
    // change the exit status, which reflects the deploy stage only.
    let endpoint = pipeline.endpoint()?;
    progress(format, &format!("  → Validating {endpoint}..."));
    let results = run_probes(
        endpoint,
        pipeline.config(),
        pipeline.target(),
        pipeline.outputs().function_name(),
        &aws,
    )
    .await?;

    let report = Report::new(
        pipeline.target(),
        None,
        Some(pipeline.action()),
        pipeline.outputs(),
        &results,
    );
    print!("{}", report.render(format));

    Ok(())
}

/// Run only the probe harness against an already-deployed stack.
async fn validate(config: Config, target: Target, format: ReportFormat) -> Result<()> {
    let aws = AwsCli::new();
    aws.preflight()
        .await
        .map_err(|e| Error::Precondition(e.to_string()))?;

    let outputs = aws
        .stack_outputs(&target.region, &target.stack_name)
        .await
        .map_err(StackError::from)?;
    let endpoint = outputs.endpoint().ok_or_else(|| {
        Error::Precondition(format!(
            "stack {} has no endpoint output; deploy first",
            target.stack_name
        ))
    })?;

    progress(format, &format!("  → Validating {endpoint}..."));
    let results = run_probes(endpoint, &config, &target, outputs.function_name(), &aws).await?;

    let report = Report::new(&target, None, None, &outputs, &results);
    print!("{}", report.render(format));

    Ok(())
}

/// Show the stack's current state and outputs without deploying.
async fn status(target: Target, format: ReportFormat) -> Result<()> {
    let aws = AwsCli::new();
    aws.preflight()
        .await
        .map_err(|e| Error::Precondition(e.to_string()))?;

    let description = aws
        .describe_stack(&target.region, &target.stack_name)
        .await
        .map_err(StackError::from)?;

    let (state, outputs) = match description {
        None => (StackState::Absent, Default::default()),
        Some(d) => {
            let state = d.state();
            let outputs = aws
                .stack_outputs(&target.region, &target.stack_name)
                .await
                .map_err(StackError::from)?;
            (state, outputs)
        }
    };

    let report = Report::new(&target, Some(&state), None, &outputs, &[]);
    print!("{}", report.render(format));

    Ok(())
}

/// Print a progress line, unless the selected report format claims stdout
/// for itself.
fn progress(format: ReportFormat, message: &str) {
    if format.shows_progress() {
        println!("{message}");
    }
}

async fn run_probes(
    endpoint: &str,
    config: &Config,
    target: &Target,
    function_name: Option<&str>,
    platform: &(impl FunctionStatus + ?Sized),
) -> Result<Vec<ValidationResult>> {
    let client = HttpProtocolClient::new(endpoint, config.probe.timeout)
        .map_err(|e| Error::Precondition(e.to_string()))?;
    let validator = Validator::new(
        &client,
        platform,
        &config.probe,
        &target.region,
        function_name,
    );
    Ok(validator.run_all().await)
}
