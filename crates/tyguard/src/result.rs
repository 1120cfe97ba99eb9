//! Structured test results
//!
//! A `TestResult` is the outcome of checking one value against one
//! (sub-)expression. Passing results carry nothing but `value: true`;
//! failures may carry a human-readable description and, for aggregates
//! (arrays, maps, shapes, unions, intersections), the failing sub-results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a single check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    value: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    failed: Vec<TestResult>,
}

impl TestResult {
    /// A passing result
    pub fn pass() -> Self {
        Self {
            value: true,
            description: None,
            failed: Vec::new(),
        }
    }

    /// A failing result without a description
    pub fn fail() -> Self {
        Self {
            value: false,
            description: None,
            failed: Vec::new(),
        }
    }

    /// A failing result with a description
    pub fn fail_with(description: impl Into<String>) -> Self {
        Self {
            value: false,
            description: Some(description.into()),
            failed: Vec::new(),
        }
    }

    /// A failing aggregate: a description plus the sub-results that failed.
    ///
    /// Passing entries in `failed` are dropped.
    pub fn aggregate(description: impl Into<String>, failed: Vec<TestResult>) -> Self {
        Self {
            value: false,
            description: Some(description.into()),
            failed: failed.into_iter().filter(|r| !r.value).collect(),
        }
    }

    /// Whether the check passed
    pub fn passed(&self) -> bool {
        self.value
    }

    /// Failure description, if any
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Nested failures of an aggregate
    pub fn failed(&self) -> &[TestResult] {
        &self.failed
    }

    /// Deepest description along the first failure path.
    ///
    /// For `{x:1, y:"bad"}` checked against `{x:number, y:number}` this is the
    /// entry naming property `y`, not the summary naming the whole object.
    pub fn most_specific_description(&self) -> Option<&str> {
        let mut current = self;
        let mut best = self.description();
        while let Some(next) = current.failed.first() {
            if let Some(description) = next.description() {
                best = Some(description);
            }
            current = next;
        }
        best
    }

    /// Number of failures in this tree that carry no further sub-failures
    pub fn leaf_failure_count(&self) -> usize {
        if self.value {
            0
        } else if self.failed.is_empty() {
            1
        } else {
            self.failed.iter().map(TestResult::leaf_failure_count).sum()
        }
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        let description = match (&self.description, self.value) {
            (Some(d), _) => d.as_str(),
            (None, true) => "passed",
            (None, false) => "failed",
        };
        writeln!(f, "{}- {}", indent, description)?;
        for child in &self.failed {
            child.fmt_tree(f, depth + 1)?;
        }
        Ok(())
    }
}

impl From<bool> for TestResult {
    fn from(value: bool) -> Self {
        if value {
            Self::pass()
        } else {
            Self::fail()
        }
    }
}

impl fmt::Display for TestResult {
    /// Indented failure tree, one description per line
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}

/// What a predicate may return: a plain verdict or a detailed result
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Plain pass/fail
    Bool(bool),
    /// A detailed result, passed through unchanged
    Result(TestResult),
}

impl Outcome {
    /// Normalize into a `TestResult`
    pub fn into_result(self) -> TestResult {
        match self {
            Outcome::Bool(b) => TestResult::from(b),
            Outcome::Result(r) => r,
        }
    }
}

impl From<bool> for Outcome {
    fn from(b: bool) -> Self {
        Outcome::Bool(b)
    }
}

impl From<TestResult> for Outcome {
    fn from(r: TestResult) -> Self {
        Outcome::Result(r)
    }
}
