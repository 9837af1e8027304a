use std::fmt::Write;
use std::fs;
use std::path::Path;

use anyhow::Context;

use gtfs_validator_core::{DailyActivity, FeedSummary, SectionResults, ValidationResult};

/// Detail text for a section without findings.
pub const AFFIRMATION: &str = "Hooray! No errors here (at least, none that we could find).";

/// Last line of a detail section that hit its line cap.
pub const TRUNCATION_MARKER: &str = "And Many More...";

/// Joins agency names for the report title: `A`, `A and B`, `A, B and C`.
pub fn render_agency_list<S: AsRef<str>>(names: &[S]) -> String {
    let mut out = String::new();
    let count = names.len();
    for (index, name) in names.iter().enumerate() {
        out.push_str(name.as_ref());
        match count - index {
            1 => {}
            2 => out.push_str(" and "),
            _ => out.push_str(", "),
        }
    }
    out
}

pub fn render_summary_line(result: &ValidationResult) -> String {
    format!("{} errors/warnings", result.size())
}

/// One bullet per finding, capped at `max_lines` bullets. Never empty.
pub fn render_detail_section(result: &ValidationResult, max_lines: usize) -> String {
    if result.is_empty() {
        return AFFIRMATION.to_string();
    }

    let mut lines: Vec<String> = result
        .iter()
        .take(max_lines)
        .map(|finding| format!("- {}", finding))
        .collect();
    if result.size() > max_lines {
        lines.push(TRUNCATION_MARKER.to_string());
    }
    lines.join("\n")
}

fn render_statistics(out: &mut String, summary: &FeedSummary) {
    let counts = &summary.counts;
    out.push_str("## Feed statistics\n");
    writeln!(out, "- {} agencies", counts.agencies).ok();
    writeln!(out, "- {} routes", counts.routes).ok();
    writeln!(out, "- {} trips", counts.trips).ok();
    writeln!(out, "- {} stops", counts.stops).ok();
    writeln!(out, "- {} stop times", counts.stop_times).ok();
    // Blank line keeps the sentence out of the list above.
    writeln!(
        out,
        "\nFeed has service from {} to {}",
        summary.date_range.start(),
        summary.date_range.end()
    )
    .ok();
}

fn render_results_summary(out: &mut String, results: &SectionResults) {
    out.push_str("## Validation Results\n");
    for (section, result) in results.iter() {
        writeln!(out, "- {}: {}", section.title(), render_summary_line(result)).ok();
    }
}

/// Title, statistics, per-section summary lines, then every detail section.
pub fn render_full_report(
    summary: &FeedSummary,
    results: &SectionResults,
    max_detail_lines: usize,
) -> String {
    let mut out = String::with_capacity(256);
    writeln!(
        out,
        "# Validation report for {}",
        render_agency_list(&summary.agency_names)
    )
    .ok();
    render_statistics(&mut out, summary);
    render_results_summary(&mut out, results);

    for (section, result) in results.iter() {
        writeln!(out, "\n### {}", section.title()).ok();
        out.push_str(&render_detail_section(result, max_detail_lines));
        out.push('\n');
    }
    out
}

pub fn render_active_calendars(days: &[DailyActivity], day_count: u32) -> String {
    let mut out = String::new();
    writeln!(out, "\n### Active Calendars for the next {} days", day_count).ok();
    for day in days {
        writeln!(
            out,
            "- {} ({}): {} trips on {} services",
            day.date.format("%Y-%m-%d"),
            day.date.format("%A"),
            day.trips,
            day.services
        )
        .ok();
    }
    out
}

pub fn write_markdown_report<P: AsRef<Path>>(path: P, text: &str) -> anyhow::Result<()> {
    fs::write(&path, text)
        .with_context(|| format!("write markdown report to {}", path.as_ref().display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use gtfs_validator_core::{
        FeedCounts, FeedDateRange, Finding, FindingCategory, ReportSection,
    };

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn result_with(count: usize) -> ValidationResult {
        let findings = (0..count)
            .map(|index| {
                Finding::warning(FindingCategory::Stop, "stops_too_close", "too close")
                    .with_entity_id(format!("S{}", index))
            })
            .collect();
        ValidationResult::with_findings("duplicate_stops", findings)
    }

    fn summary(names: &[&str]) -> FeedSummary {
        FeedSummary {
            counts: FeedCounts {
                agencies: names.len(),
                routes: 4,
                trips: 10,
                stops: 6,
                stop_times: 30,
            },
            date_range: FeedDateRange::new(date(2024, 1, 1), date(2024, 12, 31)),
            agency_names: names.iter().map(|name| name.to_string()).collect(),
        }
    }

    #[test]
    fn joins_agency_names_without_oxford_comma() {
        let none: [&str; 0] = [];
        assert_eq!(render_agency_list(&none), "");
        assert_eq!(render_agency_list(&["BART"]), "BART");
        assert_eq!(render_agency_list(&["BART", "AirBART"]), "BART and AirBART");
        assert_eq!(render_agency_list(&["A", "B", "C"]), "A, B and C");
        assert_eq!(render_agency_list(&["A", "B", "C", "D"]), "A, B, C and D");
    }

    #[test]
    fn summary_line_counts_findings() {
        assert_eq!(render_summary_line(&result_with(0)), "0 errors/warnings");
        assert_eq!(render_summary_line(&result_with(3)), "3 errors/warnings");
    }

    #[test]
    fn empty_section_is_the_affirmation() {
        assert_eq!(render_detail_section(&result_with(0), 128), AFFIRMATION);
    }

    #[test]
    fn detail_section_lists_findings_in_order() {
        let text = render_detail_section(&result_with(3), 128);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "- warning: Stop S0: too close [stops_too_close]",
                "- warning: Stop S1: too close [stops_too_close]",
                "- warning: Stop S2: too close [stops_too_close]",
            ]
        );
    }

    #[test]
    fn detail_section_truncates_the_tail() {
        let exact = render_detail_section(&result_with(128), 128);
        assert_eq!(exact.lines().count(), 128);
        assert!(!exact.contains(TRUNCATION_MARKER));

        let over = render_detail_section(&result_with(129), 128);
        let lines: Vec<_> = over.lines().collect();
        assert_eq!(lines.len(), 129);
        assert_eq!(lines[127], "- warning: Stop S127: too close [stops_too_close]");
        assert_eq!(lines[128], TRUNCATION_MARKER);
        assert_eq!(over.matches(TRUNCATION_MARKER).count(), 1);
    }

    #[test]
    fn full_report_follows_fixed_section_order() {
        let mut results = SectionResults::new();
        results.append(ReportSection::Stops, result_with(2));
        let report = render_full_report(&summary(&["Metro", "Valley Transit"]), &results, 128);

        let expected_head = "# Validation report for Metro and Valley Transit\n\
## Feed statistics\n\
- 2 agencies\n\
- 4 routes\n\
- 10 trips\n\
- 6 stops\n\
- 30 stop times\n\
\n\
Feed has service from 2024-01-01 to 2024-12-31\n\
## Validation Results\n\
- Routes: 0 errors/warnings\n\
- Trips: 0 errors/warnings\n\
- Stops: 2 errors/warnings\n\
- Shapes: 0 errors/warnings\n\
- Dates: 0 errors/warnings\n\
\n\
### Routes\n";
        assert!(report.starts_with(expected_head), "{}", report);

        let headers: Vec<_> = report
            .lines()
            .filter(|line| line.starts_with("### "))
            .collect();
        assert_eq!(
            headers,
            vec!["### Routes", "### Trips", "### Stops", "### Shapes", "### Dates"]
        );
        assert_eq!(report.matches(AFFIRMATION).count(), 4);
        assert!(report.contains("### Stops\n- warning: Stop S0"));
    }

    #[test]
    fn lists_active_calendar_days() {
        let days = [
            DailyActivity {
                date: date(2024, 1, 6),
                services: 2,
                trips: 14,
            },
            DailyActivity {
                date: date(2024, 1, 7),
                services: 0,
                trips: 0,
            },
        ];
        assert_eq!(
            render_active_calendars(&days, 2),
            "\n### Active Calendars for the next 2 days\n\
- 2024-01-06 (Saturday): 14 trips on 2 services\n\
- 2024-01-07 (Sunday): 0 trips on 0 services\n"
        );
    }
}
