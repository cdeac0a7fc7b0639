//! cmdr binary entry point.

use std::process::ExitCode;

use cmdr::cli::{self, Args};
use cmdr::config::Config;
use cmdr::execution::{terminate, CommandTemplate, Invocation, Runner};
use cmdr::{logging, CmdrError};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("Try 'cmdr --help' for more information.");
            return ExitCode::from(2);
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };
    let _ = logging::init_with(config.log_filter());

    let template = match config.command_for(&args) {
        Ok(template) => template,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };

    match execute(&args, &template).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!(path = %template.path, error = %e, "run failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Run the template and print the result; returns the exit status to report.
async fn execute(args: &Args, template: &CommandTemplate) -> cmdr::Result<u8> {
    let runner = Runner::new();

    if args.background {
        let pid = runner.background(template)?;
        println!("{pid}");
        return Ok(0);
    }

    let (tx, mut rx) = mpsc::channel(1);
    let launched = runner.submit(template, &args.params, tx).await?;

    let received = match (&launched, args.timeout) {
        (Some(running), Some(limit)) => match tokio::time::timeout(limit, rx.recv()).await {
            Ok(received) => received,
            Err(_) => {
                warn!(pid = running.pid, ?limit, "deadline exceeded, terminating");
                if !terminate(running.pid)? {
                    debug!(pid = running.pid, "process already exited");
                }
                rx.recv().await
            }
        },
        _ => rx.recv().await,
    };
    let invocation = received.ok_or(CmdrError::ChannelClosed)?;

    if let Some(running) = launched {
        running.join().await?;
    }

    report(&invocation, args.json);
    Ok(u8::try_from(invocation.exit_code).unwrap_or(1))
}

fn report(invocation: &Invocation, json: bool) {
    if !json {
        print!("{invocation}");
        return;
    }
    match serde_json::to_string_pretty(invocation) {
        Ok(text) => println!("{text}"),
        Err(e) => warn!(error = %e, "failed to encode result"),
    }
}
