//! Console output for decisions, votes and configuration

use colored::Colorize;
use serde::Serialize;
use tandem_application::{CastVoteOutput, CreateDecisionOutput, DecisionSnapshot, VoteOutcome};
use tandem_domain::{
    ConfigIssue, Decision, DecisionId, DecisionOption, DecisionStatus, OptionId, Severity, Tally,
    Vote,
};

/// Formats command results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Pretty JSON for any result; used for `--output json`
    pub fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn format_created(output: &CreateDecisionOutput) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{} {}\n",
            "Created decision".green().bold(),
            output.decision.id()
        ));
        out.push_str(&Self::summary(&output.decision));
        out.push_str(&Self::options_table(&output.options, None, None));
        out
    }

    pub fn format_vote(output: &CastVoteOutput) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{} {} voted for {} in round {}\n",
            "✓".green(),
            output.vote.user_id,
            Self::option_title(&output.options, &output.vote.option_id)
                .unwrap_or_else(|| output.vote.option_id.to_string()),
            output.vote.round
        ));

        match &output.outcome {
            VoteOutcome::AwaitingPartner => {
                out.push_str(&format!("{}\n", "Waiting for the other participant.".dimmed()));
            }
            VoteOutcome::AdvancedToRound { round } => {
                out.push_str(&format!(
                    "{} round {}, remaining options:\n",
                    "Advanced to".yellow().bold(),
                    round
                ));
                out.push_str(&Self::options_table(&output.options, None, None));
            }
            VoteOutcome::Completed {
                final_decision,
                decided_by,
            } => {
                let title = Self::option_title(&output.options, final_decision)
                    .unwrap_or_else(|| final_decision.to_string());
                out.push_str(&format!(
                    "{} {} (decided by {})\n",
                    "Decided:".green().bold(),
                    title.bold(),
                    decided_by
                ));
            }
        }
        out
    }

    pub fn format_snapshot(snapshot: &DecisionSnapshot) -> String {
        let decision = &snapshot.decision;
        let mut out = Self::header(decision.title());
        out.push('\n');
        out.push_str(&format!("{} {}\n", "Id:".cyan().bold(), decision.id()));
        out.push_str(&Self::summary(decision));
        out.push_str(&Self::options_table(
            &snapshot.options,
            Some(&snapshot.tally),
            decision.final_decision(),
        ));
        out
    }

    pub fn format_votes(votes: &[Vote]) -> String {
        if votes.is_empty() {
            return format!("{}\n", "No votes yet.".dimmed());
        }
        let mut out = format!(
            "{:<6} {:<16} {:<38} {}\n",
            "ROUND".bold(),
            "USER".bold(),
            "OPTION".bold(),
            "UPDATED".bold()
        );
        for vote in votes {
            out.push_str(&format!(
                "{:<6} {:<16} {:<38} {}\n",
                vote.round,
                vote.user_id.as_str(),
                vote.option_id.as_str(),
                vote.updated_at.format("%Y-%m-%d %H:%M:%S")
            ));
        }
        out
    }

    pub fn format_deleted(id: &DecisionId) -> String {
        format!("{} {}\n", "Deleted decision".red().bold(), id)
    }

    /// One line per issue, errors in red, warnings in yellow
    pub fn format_config_issues(issues: &[ConfigIssue]) -> String {
        issues
            .iter()
            .map(|issue| match issue.severity {
                Severity::Error => format!("{} {}\n", "config error:".red().bold(), issue.message),
                Severity::Warning => {
                    format!("{} {}\n", "config warning:".yellow(), issue.message)
                }
            })
            .collect()
    }

    fn summary(decision: &Decision) -> String {
        let participants = decision.participants();
        let status = match decision.status() {
            DecisionStatus::Pending => decision.status().as_str().normal(),
            DecisionStatus::Voted => decision.status().as_str().yellow(),
            DecisionStatus::Completed => decision.status().as_str().green(),
        };
        let mut out = format!(
            "{} {}  {} {}  {} {}\n",
            "Kind:".cyan().bold(),
            decision.kind(),
            "Round:".cyan().bold(),
            decision.current_round(),
            "Status:".cyan().bold(),
            status
        );
        out.push_str(&format!(
            "{} {} (creator), {} (partner)\n",
            "Participants:".cyan().bold(),
            participants.creator,
            participants.partner
        ));
        if let Some(resolution) = decision.resolution() {
            out.push_str(&format!(
                "{} {} at {}\n",
                "Decided by:".cyan().bold(),
                resolution.decided_by,
                resolution.decided_at.format("%Y-%m-%d %H:%M:%S")
            ));
        }
        out
    }

    fn options_table(
        options: &[DecisionOption],
        tally: Option<&Tally>,
        winner: Option<&OptionId>,
    ) -> String {
        let mut out = String::new();
        for option in options {
            let marker = if Some(&option.id) == winner {
                "★".green().to_string()
            } else {
                " ".to_string()
            };
            let count = tally
                .map(|t| format!("  votes: {}", t.count(&option.id)))
                .unwrap_or_default();
            out.push_str(&format!(
                "  {} {}  {}{}\n",
                marker,
                option.title,
                option.id.as_str().dimmed(),
                count
            ));
        }
        out
    }

    fn option_title(options: &[DecisionOption], id: &OptionId) -> Option<String> {
        options
            .iter()
            .find(|o| o.id == *id)
            .map(|o| o.title.clone())
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }
}
