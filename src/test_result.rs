use crate::comparator::ArtifactOutcome;

/// Outcome of one case that was run
#[derive(Debug)]
pub struct CheckResult {
    pub stdout: ArtifactOutcome,
    pub stderr: ArtifactOutcome,
    pub generated: ArtifactOutcome,
    pub exit_code: ValueComparison<Option<i32>>,
}

impl CheckResult {
    pub fn is_success(&self) -> bool {
        self.stdout.is_success()
            && self.stderr.is_success()
            && self.generated.is_success()
            && self.exit_code.is_success()
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ValueComparison<T> {
    NotChecked,
    Matches(T),
    Diff { expected: T, got: T },
}

impl<T> ValueComparison<T> {
    pub fn is_success(&self) -> bool {
        match self {
            Self::NotChecked => true,
            Self::Matches(_) => true,
            Self::Diff { .. } => false,
        }
    }
}

pub fn compare_value<T: PartialEq>(expected: Option<T>, got: T) -> ValueComparison<T> {
    match expected {
        Some(expected) if expected == got => ValueComparison::Matches(got),
        Some(expected) => ValueComparison::Diff { expected, got },
        None => ValueComparison::NotChecked,
    }
}
