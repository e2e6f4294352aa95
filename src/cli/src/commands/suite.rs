use crate::client::{ProbeClient, RunConfig, RunReport};
use crate::commands::shared::{OutputArgs, SourceArgs, SuiteNameArgs};
use crate::commands::validators;
use crate::core::error::CliError;
use clap::{Args, Subcommand};
use probe_lib::client::ReqwestExecutor;
use probe_lib::debug_log;
use probe_lib::model::{RunOverrides, RunStatus};
use probe_lib::runner::{RunProgress, SequentialFlowRunner, SuiteRunner};
use std::path::Path;

#[derive(Debug, Args)]
#[command(about = "Manage and run test suites")]
pub struct SuiteCommand {
    #[command(subcommand)]
    pub command: SuiteSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum SuiteSubcommand {
    #[command(about = "List suites")]
    List(ListArgs),
    #[command(about = "Show suite settings and items")]
    Show(ShowArgs),
    #[command(about = "Run a suite")]
    Run(RunArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub suite: SuiteNameArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub suite: SuiteNameArgs,

    #[arg(
        short = 'e',
        long = "env",
        alias = "environment",
        help = "Environment id or name (defaults to the suite's)",
        value_parser = validators::validate_name
    )]
    pub environment: Option<String>,

    #[arg(
        short = 'a',
        long = "auth",
        help = "Auth id or name (defaults to the suite's)",
        value_parser = validators::validate_name
    )]
    pub auth: Option<String>,

    #[arg(
        long = "concurrency",
        value_name = "N",
        help = "Invocations per batch",
        value_parser = validators::validate_concurrency
    )]
    pub concurrency: Option<usize>,

    #[arg(long = "delay", value_name = "MS", help = "Pause between batches")]
    pub delay: Option<u64>,

    #[arg(long = "stop-on-failure", help = "Skip remaining batches after a failure")]
    pub stop_on_failure: bool,

    #[arg(long = "timeout", value_name = "MS", help = "Per-request timeout")]
    pub timeout: Option<u64>,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl RunArgs {
    fn overrides(&self) -> RunOverrides {
        RunOverrides {
            concurrent_calls: self.concurrency,
            delay_between_calls: self.delay,
            stop_on_failure: self.stop_on_failure.then_some(true),
            request_timeout_ms: self.timeout,
        }
    }
}

pub fn execute_list(args: &ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let client = ProbeClient::open(Path::new(&args.source.source))?;
    let suites = client.list_suites()?;

    let formatter = crate::core::formatter::get_formatter(&args.output.output);
    print!(
        "{}",
        formatter.format_list(&suites, "Suites found:", "No suites found")
    );

    Ok(())
}

pub fn execute_show(args: &ShowArgs) -> Result<(), Box<dyn std::error::Error>> {
    let client = ProbeClient::open(Path::new(&args.source.source))?;
    let details = client.suite_details(&args.suite.name)?;

    let formatter = crate::core::formatter::get_formatter(&args.output.output);
    print!("{}", formatter.format(&details));

    Ok(())
}

fn progress_line(snapshot: &RunProgress) -> String {
    let progress = &snapshot.progress;
    format!(
        "[{}/{}] passed={} failed={} skipped={}",
        progress.completed, progress.total, progress.passed, progress.failed, progress.skipped
    )
}

pub async fn execute_run(args: &RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let client = ProbeClient::open(Path::new(&args.source.source))?;
    let config = RunConfig {
        source_path: args.source.source.clone(),
        suite: args.suite.name.clone(),
        environment: args.environment.clone(),
        auth: args.auth.clone(),
        overrides: args.overrides(),
    };
    let input = client.prepare_run(&config)?;
    debug_log!("Running suite '{}' from {}", input.suite.id, config.source_path);

    let http = ReqwestExecutor::new(crate::core::version::user_agent())?;
    let runner = SuiteRunner::new(http.clone(), SequentialFlowRunner::new(http));

    let mut progress = runner.subscribe();
    let printer = tokio::spawn(async move {
        let mut last_completed = 0;
        while progress.changed().await.is_ok() {
            let snapshot = *progress.borrow_and_update();
            if snapshot.progress.completed > last_completed {
                last_completed = snapshot.progress.completed;
                eprintln!("{}", progress_line(&snapshot));
            }
        }
    });

    let cancel = runner.cancel_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Cancelling after the current batch...");
            cancel.cancel();
        }
    });

    let result = runner.run_suite(&input).await;
    drop(runner);
    interrupt.abort();
    let _ = printer.await;

    let report = RunReport::new(&input.suite.name, &result);
    let formatter = crate::core::formatter::get_formatter(&args.output.output);
    print!("{}", formatter.format(&report));

    match result.status {
        RunStatus::Cancelled => Err(CliError::Cancelled(format!(
            "Run cancelled after {} of {} invocations",
            result.progress.completed - result.progress.skipped,
            result.progress.total
        ))
        .into()),
        RunStatus::Failed => match result.error {
            Some(error) => Err(CliError::RunAborted(error).into()),
            None => Err(CliError::TestFailure(format!(
                "Suite '{}' failed: {} of {} invocations failed",
                input.suite.name, result.progress.failed, result.progress.total
            ))
            .into()),
        },
        _ => Ok(()),
    }
}
