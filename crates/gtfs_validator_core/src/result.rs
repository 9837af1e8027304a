use crate::Finding;

/// Findings produced by one check category, in discovery order.
///
/// Results only grow: findings are pushed while a check runs and whole results
/// are concatenated with [`ValidationResult::append`]. Nothing here deduplicates
/// or reorders, so truncation at render time always drops the tail.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    check_name: String,
    findings: Vec<Finding>,
}

impl ValidationResult {
    pub fn new(check_name: impl Into<String>) -> Self {
        Self {
            check_name: check_name.into(),
            findings: Vec::new(),
        }
    }

    pub fn with_findings(check_name: impl Into<String>, findings: Vec<Finding>) -> Self {
        Self {
            check_name: check_name.into(),
            findings,
        }
    }

    pub fn check_name(&self) -> &str {
        &self.check_name
    }

    pub fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    /// Concatenates `other` after the findings already held.
    pub fn append(&mut self, other: ValidationResult) {
        if other.findings.is_empty() {
            return;
        }
        self.findings.extend(other.findings);
    }

    /// Owned variant of [`append`](Self::append).
    pub fn merged(mut self, other: ValidationResult) -> Self {
        self.append(other);
        self
    }

    pub fn size(&self) -> usize {
        self.findings.len()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn iter(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter()
    }
}

impl Extend<Finding> for ValidationResult {
    fn extend<I: IntoIterator<Item = Finding>>(&mut self, iter: I) {
        self.findings.extend(iter);
    }
}

impl<'a> IntoIterator for &'a ValidationResult {
    type Item = &'a Finding;
    type IntoIter = std::slice::Iter<'a, Finding>;

    fn into_iter(self) -> Self::IntoIter {
        self.findings.iter()
    }
}
