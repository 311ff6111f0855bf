//! Terminal output utilities.

use crate::models::{CountRow, DcStatus};
use crate::processing::AuditOutcome;
use colored::Colorize;

/// Format a value as a quoted, right-aligned field.
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    let value_str = value.to_string();
    let quoted = format!("\"{value_str}\"");
    let quoted_len = quoted.len();

    if quoted_len >= width {
        quoted
    } else {
        format!("{quoted:>width$}")
    }
}

/// Render the end-of-run summary: DC health first, then the findings.
pub fn render_summary(outcome: &AuditOutcome, by_site: &[CountRow]) -> String {
    let mut lines = Vec::new();
    lines.push(format!("{}", "DC processing".bold()));
    for s in &outcome.dc_stats {
        let status = match &s.status {
            DcStatus::Completed => s.status.to_string().green(),
            DcStatus::Failed(_) => s.status.to_string().red(),
        };
        lines.push(format!(
            "  {name} {site} {count} {secs}  {status}",
            name = format_field(&s.dc_name, 24),
            site = format_field(&s.dc_site, 18),
            count = format_field(s.mismatch_count, 6),
            secs = format_field(format!("{:.1}s", s.duration_seconds), 8),
        ));
    }
    lines.push(format!(
        "{} DCs processed, {} failed",
        outcome.dc_stats.len(),
        outcome.failed_dc_count()
    ));

    lines.push(format!("{}", "Site mismatches".bold()));
    if by_site.is_empty() {
        lines.push(format!("  {}", "none found".green()));
    }
    for row in by_site {
        lines.push(format!(
            "  {} {}",
            format_field(&row.name, 24),
            format_field(row.count, 6)
        ));
    }
    lines.push(format!("{} mismatched records", outcome.records.len()));
    lines.join("\n")
}

pub fn print_summary(outcome: &AuditOutcome, by_site: &[CountRow]) {
    println!("{}", render_summary(outcome, by_site));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DcProcessingSummary;

    #[test]
    fn test_format_field_short() {
        assert_eq!(format_field("test", 10), "    \"test\"");
    }

    #[test]
    fn test_format_field_long() {
        assert_eq!(format_field("long_value", 5), "\"long_value\"");
    }

    #[test]
    fn test_format_field_number() {
        assert_eq!(format_field(42, 6), "  \"42\"");
    }

    #[test]
    fn test_render_summary() {
        colored::control::set_override(false);
        let outcome = AuditOutcome {
            records: vec![],
            dc_stats: vec![DcProcessingSummary {
                dc_name: "DC3".to_string(),
                dc_site: "SiteC".to_string(),
                dc_ip: "10.0.2.10".to_string(),
                status: DcStatus::Failed("unreachable".to_string()),
                mismatch_count: 0,
                zones_processed: 0,
                zones_failed: 0,
                duration_seconds: 0.01,
            }],
        };
        let text = render_summary(&outcome, &[]);
        assert!(text.contains("Failed: unreachable"));
        assert!(text.contains("1 DCs processed, 1 failed"));
        assert!(text.contains("none found"));
    }
}
