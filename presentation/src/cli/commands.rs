//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tandem_domain::DecisionKind;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}

impl From<OutputFormat> for tandem_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => tandem_domain::OutputFormat::Text,
            OutputFormat::Json => tandem_domain::OutputFormat::Json,
        }
    }
}

/// How a decision is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    /// One round; finalized as soon as both participants voted
    Vote,
    /// Up to three elimination rounds
    Poll,
}

impl From<KindArg> for DecisionKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Vote => DecisionKind::Vote,
            KindArg::Poll => DecisionKind::Poll,
        }
    }
}

/// CLI arguments for tandem
#[derive(Parser, Debug)]
#[command(name = "tandem")]
#[command(author, version, about = "Two-person decisions by vote or elimination poll")]
#[command(long_about = r#"
Tandem helps two people (a creator and a partner) settle on one option.

A vote decision completes once both participants have voted. A poll runs
up to three rounds: agreement ends it early, disagreement narrows the
options to the two that were picked, and in round three the partner
decides alone.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./tandem.toml       Project-level config
3. ~/.config/tandem/config.toml   Global config

Example:
  tandem create --kind poll --creator ana --partner ben --title "Movie" Action Drama Comedy
  tandem vote <DECISION> --user ben --option <OPTION>
  tandem show <DECISION>
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output format (defaults to [output].format, then text)
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and the effective configuration, then exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open a new decision at round 1
    Create {
        /// Vote (single round) or poll (elimination rounds)
        #[arg(short, long, value_enum, default_value = "vote")]
        kind: KindArg,

        /// Title of the decision
        #[arg(short, long)]
        title: String,

        /// User id of the creator
        #[arg(long)]
        creator: String,

        /// User id of the partner
        #[arg(long)]
        partner: String,

        /// Option titles (at least two)
        #[arg(required = true, num_args = 2.., value_name = "OPTION")]
        options: Vec<String>,
    },

    /// Cast or change a vote in the current round
    Vote {
        /// Decision id
        decision: String,

        /// Voting user id
        #[arg(short, long)]
        user: String,

        /// Option id
        #[arg(long, value_name = "OPTION_ID")]
        option: String,
    },

    /// Show a decision, its current options and the current round's tally
    Show {
        /// Decision id
        decision: String,
    },

    /// List votes of a decision, newest first
    Votes {
        /// Decision id
        decision: String,

        /// Only this round
        #[arg(short, long)]
        round: Option<u32>,
    },

    /// Delete a decision with its options and votes
    Delete {
        /// Decision id
        decision: String,
    },
}
