use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// The GTFS entity a finding is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindingCategory {
    Agency,
    Route,
    Trip,
    StopTime,
    Stop,
    Shape,
    Calendar,
    CalendarDate,
}

impl FindingCategory {
    pub fn label(self) -> &'static str {
        match self {
            FindingCategory::Agency => "Agency",
            FindingCategory::Route => "Route",
            FindingCategory::Trip => "Trip",
            FindingCategory::StopTime => "Stop time",
            FindingCategory::Stop => "Stop",
            FindingCategory::Shape => "Shape",
            FindingCategory::Calendar => "Calendar",
            FindingCategory::CalendarDate => "Calendar date",
        }
    }
}

/// One data-quality problem flagged by a check. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    category: FindingCategory,
    problem: String,
    message: String,
    affected_entity_id: Option<String>,
    severity: Option<Severity>,
}

impl Finding {
    pub fn new(
        category: FindingCategory,
        problem: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            problem: problem.into(),
            message: message.into(),
            affected_entity_id: None,
            severity: None,
        }
    }

    pub fn error(
        category: FindingCategory,
        problem: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(category, problem, message).with_severity(Severity::Error)
    }

    pub fn warning(
        category: FindingCategory,
        problem: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(category, problem, message).with_severity(Severity::Warning)
    }

    pub fn with_entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.affected_entity_id = Some(entity_id.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn category(&self) -> FindingCategory {
        self.category
    }

    /// Stable machine-readable code, e.g. `route_both_names_missing`.
    pub fn problem(&self) -> &str {
        &self.problem
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn affected_entity_id(&self) -> Option<&str> {
        self.affected_entity_id.as_deref()
    }

    pub fn severity(&self) -> Option<Severity> {
        self.severity
    }
}

/// Renders the one-line description used in report bullets.
impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(severity) = self.severity {
            write!(f, "{}: ", severity)?;
        }
        f.write_str(self.category.label())?;
        if let Some(entity_id) = self.affected_entity_id.as_deref() {
            write!(f, " {}", entity_id)?;
        }
        write!(f, ": {} [{}]", self.message, self.problem)
    }
}
