//! Aggregation and rendering of scripted session results.

use colored::Colorize;
use serde::Serialize;

use crate::harness::SessionReport;

/// Summary across a batch of scripted sessions.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub sessions: usize,
    pub timeouts: usize,
    pub collapses: usize,
    pub average_score: f64,
    pub best_score: i64,
    pub worst_score: i64,
    pub average_choices: f64,
    pub average_extinctions: f64,
}

#[must_use]
pub fn summarize(reports: &[SessionReport]) -> BatchSummary {
    if reports.is_empty() {
        return BatchSummary {
            sessions: 0,
            timeouts: 0,
            collapses: 0,
            average_score: 0.0,
            best_score: 0,
            worst_score: 0,
            average_choices: 0.0,
            average_extinctions: 0.0,
        };
    }
    #[allow(clippy::cast_precision_loss)]
    let count = reports.len() as f64;
    let total_score: i64 = reports.iter().map(|r| r.final_score).sum();
    let total_choices: usize = reports.iter().map(|r| r.choices_resolved).sum();
    let total_extinct: usize = reports.iter().map(|r| r.extinct_species).sum();
    #[allow(clippy::cast_precision_loss)]
    BatchSummary {
        sessions: reports.len(),
        timeouts: reports.iter().filter(|r| r.outcome == "timeout").count(),
        collapses: reports.iter().filter(|r| r.outcome == "collapse").count(),
        average_score: total_score as f64 / count,
        best_score: reports.iter().map(|r| r.final_score).max().unwrap_or(0),
        worst_score: reports.iter().map(|r| r.final_score).min().unwrap_or(0),
        average_choices: total_choices as f64 / count,
        average_extinctions: total_extinct as f64 / count,
    }
}

pub fn print_session_line(report: &SessionReport) {
    let outcome = match report.outcome.as_str() {
        "timeout" => report.outcome.green(),
        "collapse" => report.outcome.red(),
        _ => report.outcome.yellow(),
    };
    println!(
        "  seed {:>6}  {:>9}  score {:>7}  choices {:>3}  extinct {}/8  {}",
        report.seed,
        outcome,
        report.final_score,
        report.choices_resolved,
        report.extinct_species,
        report.playstyle.dimmed()
    );
}

pub fn print_summary(strategy: &str, biome: &str, summary: &BatchSummary) {
    println!();
    println!(
        "{}",
        format!("Summary: {strategy} on {biome}").bright_yellow().bold()
    );
    println!("{}", "-".repeat(40).yellow());
    println!(
        "  sessions {}   survived {}   collapsed {}",
        summary.sessions,
        summary.timeouts.to_string().green(),
        summary.collapses.to_string().red()
    );
    println!(
        "  score avg {:.0}   best {}   worst {}",
        summary.average_score, summary.best_score, summary.worst_score
    );
    println!(
        "  choices/session {:.1}   extinctions/session {:.1}",
        summary.average_choices, summary.average_extinctions
    );
}

/// Render the batch as a JSON document.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json(reports: &[SessionReport], summary: &BatchSummary) -> serde_json::Result<String> {
    #[derive(Serialize)]
    struct Document<'a> {
        summary: &'a BatchSummary,
        sessions: &'a [SessionReport],
    }
    serde_json::to_string_pretty(&Document {
        summary,
        sessions: reports,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(seed: u64, outcome: &str, score: i64) -> SessionReport {
        SessionReport {
            seed,
            biome: String::from("temperate"),
            outcome: outcome.to_string(),
            final_score: score,
            genetic: score / 2,
            streak_bonus: 0.0,
            speed_bonus: 0.0,
            momentum: 1.0,
            extinct_species: 1,
            choices_resolved: 12,
            playstyle: String::from("Balanced"),
            played_secs: 180.0,
        }
    }

    #[test]
    fn summaries_aggregate_outcomes() {
        let reports = vec![
            report(1, "timeout", 4_000),
            report(2, "collapse", 1_000),
            report(3, "timeout", 7_000),
        ];
        let summary = summarize(&reports);
        assert_eq!(summary.sessions, 3);
        assert_eq!(summary.timeouts, 2);
        assert_eq!(summary.collapses, 1);
        assert_eq!(summary.best_score, 7_000);
        assert_eq!(summary.worst_score, 1_000);
        assert!((summary.average_score - 4_000.0).abs() < 1e-9);
    }

    #[test]
    fn json_document_includes_both_views() {
        let reports = vec![report(1, "timeout", 100)];
        let summary = summarize(&reports);
        let json = to_json(&reports, &summary).expect("serialize");
        assert!(json.contains("\"summary\""));
        assert!(json.contains("\"sessions\""));
    }
}
