pub mod markdown;
pub mod orchestrator;

pub use markdown::{
    render_active_calendars, render_agency_list, render_detail_section, render_full_report,
    render_summary_line, write_markdown_report, AFFIRMATION, TRUNCATION_MARKER,
};
pub use orchestrator::{render_report, Orchestrator, RunError};
