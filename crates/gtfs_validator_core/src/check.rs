use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::{
    Channels, Finding, FindingCategory, GtfsFeed, ReportSection, SectionResults, ValidationResult,
};

/// One validation routine. Inspects the feed and reports findings for a single section.
pub trait Check {
    fn name(&self) -> &'static str;
    fn section(&self) -> ReportSection;
    fn run(&self, feed: &GtfsFeed) -> ValidationResult;
}

/// Adapts a plain function into a [`Check`].
pub struct FnCheck<F> {
    name: &'static str,
    section: ReportSection,
    run: F,
}

pub fn check_fn<F>(name: &'static str, section: ReportSection, run: F) -> FnCheck<F>
where
    F: Fn(&GtfsFeed) -> ValidationResult,
{
    FnCheck { name, section, run }
}

impl<F> Check for FnCheck<F>
where
    F: Fn(&GtfsFeed) -> ValidationResult,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn section(&self) -> ReportSection {
        self.section
    }

    fn run(&self, feed: &GtfsFeed) -> ValidationResult {
        (self.run)(feed)
    }
}

/// The checks of one run, executed section by section in report order.
#[derive(Default)]
pub struct CheckPlan {
    checks: Vec<Box<dyn Check>>,
}

impl CheckPlan {
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    pub fn register<C>(&mut self, check: C)
    where
        C: Check + 'static,
    {
        self.checks.push(Box::new(check));
    }

    pub fn with_check<C>(mut self, check: C) -> Self
    where
        C: Check + 'static,
    {
        self.register(check);
        self
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.checks.iter().map(|check| check.name()).collect()
    }

    /// Runs every section in [`ReportSection::ALL`] order, announcing each on
    /// the progress channel. Within a section, checks run in registration
    /// order and their results are appended in that order.
    pub fn run(&self, feed: &GtfsFeed, channels: &mut Channels<'_>) -> SectionResults {
        let mut results = SectionResults::new();
        for section in ReportSection::ALL {
            channels.progress(section.progress_message());
            for check in self.checks.iter().filter(|check| check.section() == section) {
                let result = run_check(check.as_ref(), feed);
                tracing::debug!(
                    check = check.name(),
                    findings = result.size(),
                    "check finished"
                );
                results.append(section, result);
            }
        }
        results
    }
}

fn run_check(check: &dyn Check, feed: &GtfsFeed) -> ValidationResult {
    match catch_unwind(AssertUnwindSafe(|| check.run(feed))) {
        Ok(result) => result,
        Err(panic) => {
            let message = panic_payload_message(&*panic);
            tracing::warn!(check = check.name(), "check panicked: {}", message);
            let mut result = ValidationResult::new(check.name());
            result.push(Finding::error(
                section_category(check.section()),
                "runtime_exception_in_check",
                format!("check {} failed: {}", check.name(), message),
            ));
            result
        }
    }
}

fn section_category(section: ReportSection) -> FindingCategory {
    match section {
        ReportSection::Routes => FindingCategory::Route,
        ReportSection::Trips => FindingCategory::Trip,
        ReportSection::Stops => FindingCategory::Stop,
        ReportSection::Shapes => FindingCategory::Shape,
        ReportSection::Dates => FindingCategory::Calendar,
    }
}

fn panic_payload_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemorySink;

    struct FixedCheck {
        name: &'static str,
        section: ReportSection,
        findings: usize,
    }

    impl Check for FixedCheck {
        fn name(&self) -> &'static str {
            self.name
        }

        fn section(&self) -> ReportSection {
            self.section
        }

        fn run(&self, _feed: &GtfsFeed) -> ValidationResult {
            let mut result = ValidationResult::new(self.name);
            for index in 0..self.findings {
                result.push(
                    Finding::warning(FindingCategory::Shape, self.name, "problem")
                        .with_entity_id(index.to_string()),
                );
            }
            result
        }
    }

    #[test]
    fn announces_every_section_in_report_order() {
        let plan = CheckPlan::new()
            .with_check(FixedCheck {
                name: "dates",
                section: ReportSection::Dates,
                findings: 0,
            })
            .with_check(FixedCheck {
                name: "routes",
                section: ReportSection::Routes,
                findings: 0,
            });
        let mut sink = MemorySink::new();
        let mut channels = Channels::new(&mut sink, false);
        plan.run(&GtfsFeed::default(), &mut channels);

        assert_eq!(
            sink.progress,
            vec![
                "Validating routes",
                "Validating trips",
                "Checking for duplicate stops",
                "Checking for problems with shapes",
                "Checking for dates with no trips",
            ]
        );
    }

    #[test]
    fn appends_results_of_one_section_in_registration_order() {
        let plan = CheckPlan::new()
            .with_check(FixedCheck {
                name: "reversed_trip_shape",
                section: ReportSection::Shapes,
                findings: 1,
            })
            .with_check(FixedCheck {
                name: "stop_too_far_from_shape",
                section: ReportSection::Shapes,
                findings: 2,
            });
        let mut sink = MemorySink::new();
        let mut channels = Channels::new(&mut sink, true);
        let results = plan.run(&GtfsFeed::default(), &mut channels);

        let problems: Vec<_> = results
            .get(ReportSection::Shapes)
            .iter()
            .map(Finding::problem)
            .collect();
        assert_eq!(
            problems,
            vec![
                "reversed_trip_shape",
                "stop_too_far_from_shape",
                "stop_too_far_from_shape"
            ]
        );
        assert_eq!(results.total_findings(), 3);
        assert_eq!(plan.names(), vec!["reversed_trip_shape", "stop_too_far_from_shape"]);
    }

    #[test]
    fn panicking_check_becomes_a_finding() {
        let plan = CheckPlan::new().with_check(check_fn(
            "explodes",
            ReportSection::Trips,
            |_feed: &GtfsFeed| -> ValidationResult { panic!("boom") },
        ));
        let mut sink = MemorySink::new();
        let mut channels = Channels::new(&mut sink, true);
        let results = plan.run(&GtfsFeed::default(), &mut channels);

        let trips = results.get(ReportSection::Trips);
        assert_eq!(trips.size(), 1);
        assert_eq!(trips.findings()[0].problem(), "runtime_exception_in_check");
        assert!(trips.findings()[0].message().contains("boom"));
    }
}
