use crate::ValidationResult;

/// Report categories, in the order they are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportSection {
    Routes,
    Trips,
    Stops,
    Shapes,
    Dates,
}

impl ReportSection {
    pub const ALL: [ReportSection; 5] = [
        ReportSection::Routes,
        ReportSection::Trips,
        ReportSection::Stops,
        ReportSection::Shapes,
        ReportSection::Dates,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ReportSection::Routes => "Routes",
            ReportSection::Trips => "Trips",
            ReportSection::Stops => "Stops",
            ReportSection::Shapes => "Shapes",
            ReportSection::Dates => "Dates",
        }
    }

    /// Progress line emitted before the first check of the section runs.
    pub fn progress_message(self) -> &'static str {
        match self {
            ReportSection::Routes => "Validating routes",
            ReportSection::Trips => "Validating trips",
            ReportSection::Stops => "Checking for duplicate stops",
            ReportSection::Shapes => "Checking for problems with shapes",
            ReportSection::Dates => "Checking for dates with no trips",
        }
    }

    fn index(self) -> usize {
        match self {
            ReportSection::Routes => 0,
            ReportSection::Trips => 1,
            ReportSection::Stops => 2,
            ReportSection::Shapes => 3,
            ReportSection::Dates => 4,
        }
    }
}

/// One [`ValidationResult`] per report section.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionResults {
    results: [ValidationResult; 5],
}

impl Default for SectionResults {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionResults {
    pub fn new() -> Self {
        Self {
            results: ReportSection::ALL.map(|section| ValidationResult::new(section.title())),
        }
    }

    /// Appends `result` to whatever the section already holds.
    pub fn append(&mut self, section: ReportSection, result: ValidationResult) {
        self.results[section.index()].append(result);
    }

    pub fn get(&self, section: ReportSection) -> &ValidationResult {
        &self.results[section.index()]
    }

    pub fn total_findings(&self) -> usize {
        self.results.iter().map(ValidationResult::size).sum()
    }

    /// Sections paired with their results, always in [`ReportSection::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (ReportSection, &ValidationResult)> {
        ReportSection::ALL
            .into_iter()
            .map(move |section| (section, self.get(section)))
    }
}
