//! Command-line entry point.
//!
//! Runs a probe task file and prints the JSON report on stdout. Logs go to
//! stderr and are controlled by `RUST_LOG` (default `warn`).
//!
//! Exit status: 0 when the task succeeds, 1 when it fails, 2 when the input
//! cannot be used.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use api_probe::config::load_config;
use api_probe::executor::ReqwestExecutor;
use api_probe::{ProbeError, ProbeTask, SequenceRunner, TaskReport};
use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(name = "api-probe", version)]
#[command(about = "Run multi-step API probes", long_about = None)]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a task and print its report
    Run {
        /// Task definition (JSON)
        task: PathBuf,

        /// Settings file with an "api-probe" section
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// System variable made available to every step (repeatable)
        #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_var)]
        vars: Vec<(String, String)>,

        /// Pretty-print the report
        #[arg(long)]
        pretty: bool,
    },

    /// Parse a task without running it
    Check {
        /// Task definition (JSON)
        task: PathBuf,
    },
}

fn parse_var(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{}'", raw)),
    }
}

/// Exit status when the input cannot be used.
const USAGE_FAILURE: u8 = 2;

fn report_status(report: &TaskReport) -> u8 {
    if report.is_success() {
        0
    } else {
        1
    }
}

fn read_settings(path: &Path) -> Result<Value, ProbeError> {
    let text = fs::read_to_string(path).map_err(|source| ProbeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = CliArgs::parse();
    match run(args.command).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::from(USAGE_FAILURE)
        }
    }
}

async fn run(command: Command) -> Result<ExitCode, ProbeError> {
    match command {
        Command::Check { task } => {
            let task = ProbeTask::from_file(&task)?;
            println!("task {}: {} steps", task.task_id, task.steps().len());
            Ok(ExitCode::SUCCESS)
        }
        Command::Run {
            task,
            config,
            vars,
            pretty,
        } => {
            let settings = config.as_deref().map(read_settings).transpose()?;
            load_config(settings).map_err(ProbeError::Config)?;

            let task = ProbeTask::from_file(&task)?;
            let client = ReqwestExecutor::from_global_config()?;
            let runner = SequenceRunner::from_global_config()
                .with_system_variables(vars.into_iter().map(|(name, value)| (name, Value::String(value))));

            let report = runner.run(&task, &client).await?;
            let output = if pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            println!("{}", output);

            Ok(ExitCode::from(report_status(&report)))
        }
    }
}
