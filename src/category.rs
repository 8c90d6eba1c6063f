//! Collapses free-text evaluation types into a small set of display groups.

use std::sync::LazyLock;

use regex::Regex;

/// Ordered `(pattern, group)` rules. The first matching pattern decides the
/// group; matching is case-sensitive and anchored at the start of the label.
static RULES: &[(&str, &str)] = &[
    (r"^Teacher.*Announced.*$", "Teacher (Announced)"),
    (r"^Teacher.*Unannounced.*$", "Teacher (Unannounced)"),
    (r"^Teacher.*Domain 4.*$", "Teacher (Domain 4)"),
    (r"^Counselor.*Announced.*$", "Counselor (Announced)"),
    (r"^Counselor.*Unannounced.*$", "Counselor (Unannounced)"),
    (r"^Counselor.*Domain 4.*$", "Counselor (Domain 4)"),
    (r"^Nurse.*Announced.*$", "Nurse (Announced)"),
    (r"^Nurse.*Unannounced.*$", "Nurse (Unannounced)"),
    (r"^Nurse.*Domain 4.*$", "Nurse (Domain 4)"),
    (r"^Child Study Team.*$", "Child Study Team"),
    (r"^Related Services.*$", "Related Services"),
    (r"^Instructional Assistant.*$", "Instructional Assistant"),
    (r"^Administrators.*$", "Administrator"),
    (r"^Media.*$", "Media Specialist"),
];

/// [`RULES`] compiled once on first use.
static COMPILED: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    RULES
        .iter()
        .filter_map(|(pattern, group)| Regex::new(pattern).ok().map(|re| (re, *group)))
        .collect()
});

/// Maps raw evaluation-type labels to their display group.
pub struct CategoryNormalizer {
    rules: &'static [(Regex, &'static str)],
}

impl CategoryNormalizer {
    pub fn new() -> Self {
        Self {
            rules: COMPILED.as_slice(),
        }
    }

    /// Returns the display group for `raw`, or `raw` itself when no rule matches.
    pub fn group<'a>(&self, raw: &'a str) -> &'a str {
        self.rules
            .iter()
            .find(|(re, _)| re.is_match(raw))
            .map(|(_, group)| *group)
            .unwrap_or(raw)
    }
}

impl Default for CategoryNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
