use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};

use crate::commands::{self, CommandReport};

#[derive(Debug, Parser)]
#[command(name = "lotto-sync")]
#[command(about = "Rebuild the lottery draw history from archive bundles and the live results API")]
struct Cli {
    /// Print the command report as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the full pipeline and rewrite the output dataset (default)
    Build,
    /// Show resolved paths, configuration and output state
    Status,
}

fn print_report(report: &CommandReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let state = if report.ok { "ok" } else { "failed" };
    println!("{}: {state}", report.command);
    for detail in &report.details {
        println!("  {detail}");
    }
    for issue in &report.issues {
        println!("  issue: {issue}");
    }
    Ok(())
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let report = match cli.command.unwrap_or(Command::Build) {
        Command::Build => commands::build::run()?,
        Command::Status => commands::status::run()?,
    };

    print_report(&report, cli.json)?;
    if !report.ok {
        return Err(anyhow!(
            "{} reported {} issue(s)",
            report.command,
            report.issues.len()
        ));
    }
    Ok(())
}
