use serde::{Deserialize, Serialize};

/// A single field-level policy failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Violation {
        Violation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Outcome of running one or more validators over a submission. An empty list
/// of violations means the submission passed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Verdict {
    violations: Vec<Violation>,
}

impl Verdict {
    pub fn new() -> Verdict {
        Verdict::default()
    }

    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation::new(field, message));
    }

    pub fn merge(&mut self, other: Verdict) {
        self.violations.extend(other.violations);
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}

impl From<Vec<Violation>> for Verdict {
    fn from(violations: Vec<Violation>) -> Verdict {
        Verdict { violations }
    }
}

const NAME_MAX_CHARS: usize = 200;

/// Entity names must be present and at most 200 characters.
pub fn validate_name(name: &str) -> Verdict {
    let mut verdict = Verdict::new();
    if name.trim().is_empty() {
        verdict.push("name", "Name is required.");
    } else if name.chars().count() > NAME_MAX_CHARS {
        verdict.push("name", "Name must be at most 200 characters.");
    }
    verdict
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merged_verdicts_keep_order() {
        let mut first = Verdict::new();
        first.push("file", "first");
        let mut second = Verdict::new();
        second.push("trackingTags", "second");

        first.merge(second);

        let fields: Vec<_> = first.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["file", "trackingTags"]);
        assert!(!first.is_valid());
    }

    #[test]
    fn names_are_bounded() {
        assert!(validate_name("Spring Sale").is_valid());
        assert!(!validate_name("   ").is_valid());
        assert!(!validate_name(&"x".repeat(201)).is_valid());
    }
}
