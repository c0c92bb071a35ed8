//! Human-readable run summaries.

use std::fmt::Write;

use tagprune_registry::RunReport;

/// Renders a run report for the terminal.
pub fn render(report: &RunReport) -> String {
    let mut out = String::new();

    match report {
        RunReport::Listing(tags) => {
            let _ = writeln!(out, "No --specific-tag or --regex given; {} tag(s):", tags.len());
            for tag in tags {
                let _ = writeln!(out, "    {tag}");
            }
        }
        RunReport::SingleTag { tag, outcome: None } => {
            let _ = writeln!(out, "Would delete {tag}");
        }
        RunReport::SingleTag {
            tag,
            outcome: Some(outcome),
        } => {
            if outcome.succeeded() {
                let _ = writeln!(out, "✓ {tag} has been deleted");
            } else {
                let _ = writeln!(out, "✗ {tag} was not deleted (HTTP {})", outcome.status);
            }
        }
        RunReport::Retention(report) => {
            let _ = writeln!(out, "Kept {} tag(s):", report.retained.len());
            for tag in &report.retained {
                let _ = writeln!(out, "    {tag}");
            }
            if report.dry_run {
                let _ = writeln!(out, "Would delete {} tag(s):", report.candidates.len());
                for tag in &report.candidates {
                    let _ = writeln!(out, "    {tag}");
                }
            } else {
                let _ = writeln!(out, "Deleted {} tag(s):", report.deleted.len());
                for tag in &report.deleted {
                    let _ = writeln!(out, "  ✓ {tag}");
                }
                if !report.failed.is_empty() {
                    let _ = writeln!(out, "Not deleted {} tag(s):", report.failed.len());
                    for failed in &report.failed {
                        let _ = writeln!(out, "  ✗ {} (HTTP {})", failed.name, failed.status);
                    }
                }
            }
        }
        RunReport::BulkRequest {
            pattern,
            keep,
            outcome,
        } => match outcome {
            None => {
                let _ = writeln!(
                    out,
                    "Would ask the registry to delete tags matching {pattern}, keeping {keep}"
                );
            }
            Some(outcome) if outcome.succeeded() => {
                let _ = writeln!(
                    out,
                    "✓ Registry accepted deletion of tags matching {pattern}, keeping {keep}"
                );
            }
            Some(outcome) => {
                let _ = writeln!(
                    out,
                    "✗ Registry rejected deletion of tags matching {pattern} (HTTP {})",
                    outcome.status
                );
                if !outcome.body.is_empty() {
                    let _ = writeln!(out, "{}", outcome.body);
                }
            }
        },
    }

    out
}
