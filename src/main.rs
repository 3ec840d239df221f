//! Carewatch CLI entry point.

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;

mod cli;

use carewatch::config::Config;
use carewatch::loader::load_sources;
use carewatch::pipeline::{BatchResult, Pipeline, RunReport};

fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("carewatch")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("carewatch.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    let mut builder = env_logger::Builder::new();
    builder.filter_level(if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    });
    builder.parse_default_env();
    builder.target(env_logger::Target::Pipe(target)).init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async_main(cli))
}

async fn async_main(cli: cli::Cli) -> Result<()> {
    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref())
        .context("Failed to load configuration")?
        .with_env();

    info!("Starting with config from: {:?}", cli.config);

    match cli.command {
        cli::Command::Config => {
            print!("{}", serde_yaml::to_string(&config.redacted())?);
            Ok(())
        }
        cli::Command::Run { json } => {
            let pipeline = Pipeline::from_config(&config).context("Failed to build pipeline")?;
            let report = pipeline.run_sources(load_sources(&config.data)).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&report.result)?);
            } else {
                print_report(&report);
            }
            Ok(())
        }
        cli::Command::Ask { question } => {
            let pipeline = Pipeline::from_config(&config).context("Failed to build pipeline")?;
            let answer = pipeline.ask(&question.join(" ")).await?;
            println!("{}", answer);
            Ok(())
        }
        cli::Command::TestAlert => {
            let pipeline = Pipeline::from_config(&config).context("Failed to build pipeline")?;
            if pipeline.test_alert().await {
                println!("{} Test email sent successfully", "✓".green());
                Ok(())
            } else {
                Err(eyre::eyre!("Failed to send test email"))
            }
        }
    }
}

fn print_report(report: &RunReport) {
    let result: &BatchResult = &report.result;

    print_section("Reminders", &result.reminders);
    print_section("Health", &result.health);
    print_section("Health insights", &result.health_insights);
    print_section("Safety", &result.safety);
    print_section("Safety analysis", &result.safety_analysis);

    println!("{}", "Caregiver".bold());
    println!("  {}", result.caregiver);
    println!();

    if !report.dispatches.is_empty() {
        println!("{}", "Alerts".bold());
        for outcome in &report.dispatches {
            let mark = if outcome.delivered { "✓".green() } else { "✗".red() };
            println!("  {} {}", mark, outcome.subject);
        }
        println!();
    }

    for (stream, error) in &result.errors {
        eprintln!("{} {} stream not loaded: {}", "!".yellow(), stream, error);
    }
}

fn print_section(title: &str, lines: &[String]) {
    println!("{}", title.bold());
    if lines.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for line in lines {
        println!("  {}", line);
    }
    println!();
}
