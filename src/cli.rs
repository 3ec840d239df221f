//! CLI argument parsing for Carewatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "carewatch",
    about = "Elder-care monitoring and notification pipeline",
    version,
    after_help = "Logs are written to: ~/.local/share/carewatch/logs/carewatch.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Process one batch of reminder, health and safety records
    Run {
        /// Print the batch result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ask the health assistant a question
    Ask {
        /// The question
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Send a test alert through the notification channel
    TestAlert,

    /// Show the effective configuration
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_json() {
        let cli = Cli::try_parse_from(["carewatch", "run", "--json"]).unwrap();
        assert!(matches!(cli.command, Command::Run { json: true }));
    }

    #[test]
    fn test_parse_ask_joins_words() {
        let cli = Cli::try_parse_from(["carewatch", "-v", "ask", "is", "tea", "ok?"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Ask { question } => assert_eq!(question.join(" "), "is tea ok?"),
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_ask_requires_question() {
        assert!(Cli::try_parse_from(["carewatch", "ask"]).is_err());
    }
}
