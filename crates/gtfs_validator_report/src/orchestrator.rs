use std::io;
use std::path::Path;

use thiserror::Error;

use gtfs_validator_core::{
    rules, validate_feed, validate_path, Channels, CheckPlan, GtfsFeed, OutputSink, ValidationError,
    ValidationOutcome, ValidatorConfig,
};

use crate::markdown::{render_active_calendars, render_full_report};

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("failed to write report: {0}")]
    Emit(#[from] io::Error),
}

/// Loads a feed, runs the checks, renders the report and emits it to the sink.
pub struct Orchestrator<S: OutputSink> {
    config: ValidatorConfig,
    plan: CheckPlan,
    sink: S,
}

impl<S: OutputSink> Orchestrator<S> {
    /// Uses the default check plan built from `config`.
    pub fn new(config: ValidatorConfig, sink: S) -> Self {
        let plan = rules::default_plan(&config);
        Self { config, plan, sink }
    }

    pub fn with_plan(mut self, plan: CheckPlan) -> Self {
        self.plan = plan;
        self
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Returns the report that was written to the report channel.
    pub fn run(&mut self, path: &Path) -> Result<String, RunError> {
        tracing::debug!(
            max_detail_lines = self.config.max_detail_lines,
            stop_distance_threshold_meters = self.config.stop_distance_threshold_meters,
            checks = self.plan.len(),
            "starting validation"
        );
        let mut channels = Channels::new(&mut self.sink, self.config.silent);
        let outcome = validate_path(path, &self.plan, &self.config, &mut channels)?;
        let report = render_report(&outcome, &self.config);
        channels.report(&report)?;
        Ok(report)
    }

    /// Same as [`run`](Self::run) for a feed that is already loaded.
    pub fn run_feed(&mut self, feed: &GtfsFeed) -> Result<String, RunError> {
        let mut channels = Channels::new(&mut self.sink, self.config.silent);
        let outcome = validate_feed(feed, &self.plan, &self.config, &mut channels)?;
        let report = render_report(&outcome, &self.config);
        channels.report(&report)?;
        Ok(report)
    }
}

pub fn render_report(outcome: &ValidationOutcome, config: &ValidatorConfig) -> String {
    let mut report = render_full_report(
        &outcome.summary,
        &outcome.results,
        config.max_detail_lines,
    );
    report.push_str(&render_active_calendars(
        &outcome.active_days,
        config.active_calendar_days,
    ));
    report
}
