use crate::normalizer::Normalizer;
use crate::test_id::TestId;
use itertools::Itertools;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use thiserror::Error;

/// Declarative description of one invocation and the artifacts it must produce
#[derive(Clone, Debug)]
pub struct CheckSpec {
    pub id: TestId,
    pub description: Option<String>,
    pub arguments: Vec<String>,
    pub stdin: Option<String>,
    pub merge_streams: bool,
    pub expected_exit_code: Option<i32>,
    pub stdout: ArtifactSpec,
    pub stderr: ArtifactSpec,
    pub generated: ArtifactSpec,
}

#[derive(Clone, Debug, Default)]
pub struct ArtifactSpec {
    pub expected: Option<PathBuf>,
    pub result: Option<PathBuf>,
    pub normalizer: Option<Normalizer>,
}

impl ArtifactSpec {
    pub fn new(expected: impl Into<PathBuf>, result: impl Into<PathBuf>) -> ArtifactSpec {
        ArtifactSpec {
            expected: Some(expected.into()),
            result: Some(result.into()),
            normalizer: None,
        }
    }

    pub fn with_normalizer(self, normalizer: Normalizer) -> ArtifactSpec {
        ArtifactSpec {
            normalizer: Some(normalizer),
            ..self
        }
    }

    fn is_empty(&self) -> bool {
        self.expected.is_none() && self.result.is_none() && self.normalizer.is_none()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ArtifactKind {
    Stdout,
    Stderr,
    Generated,
}

impl Display for ArtifactKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdout => write!(f, "stdout"),
            Self::Stderr => write!(f, "stderr"),
            Self::Generated => write!(f, "generated file"),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq, PartialOrd, Ord)]
pub enum CheckSpecError {
    #[error("No expected comparison file provided")]
    NoComparisonRequested,
    #[error("When stderr is merged into stdout, stderr cannot have an expected file, result file or normalizer")]
    InvalidMergeConfig,
    #[error("The expected and result paths of {0} must be used in combination")]
    IncompletePair(ArtifactKind),
    #[error("A normalizer for {0} requires an expected file")]
    OrphanNormalizer(ArtifactKind),
}

/// Every rule a [`CheckSpec`] violates, in a stable order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidCheckSpec {
    pub errors: BTreeSet<CheckSpecError>,
}

impl Display for InvalidCheckSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.errors.iter().join("; "))
    }
}

impl std::error::Error for InvalidCheckSpec {}

/// A single artifact comparison that passed validation
pub struct PlannedArtifact<'a> {
    pub kind: ArtifactKind,
    pub expected: &'a PathBuf,
    pub result: &'a PathBuf,
    pub normalizer: Option<&'a Normalizer>,
}

impl CheckSpec {
    pub fn new(id: TestId, arguments: Vec<String>) -> CheckSpec {
        CheckSpec {
            id,
            description: None,
            arguments,
            stdin: None,
            merge_streams: true,
            expected_exit_code: None,
            stdout: ArtifactSpec::default(),
            stderr: ArtifactSpec::default(),
            generated: ArtifactSpec::default(),
        }
    }

    pub fn artifact(&self, kind: ArtifactKind) -> &ArtifactSpec {
        match kind {
            ArtifactKind::Stdout => &self.stdout,
            ArtifactKind::Stderr => &self.stderr,
            ArtifactKind::Generated => &self.generated,
        }
    }

    /// Check that the spec is consistent before anything is run
    ///
    /// Returns the artifacts to compare, in stdout, stderr, generated order.
    pub fn validate(&self) -> Result<Vec<PlannedArtifact<'_>>, InvalidCheckSpec> {
        let mut errors = BTreeSet::new();
        let kinds = [
            ArtifactKind::Stdout,
            ArtifactKind::Stderr,
            ArtifactKind::Generated,
        ];

        if kinds
            .iter()
            .all(|kind| self.artifact(*kind).expected.is_none())
        {
            errors.insert(CheckSpecError::NoComparisonRequested);
        }

        if self.merge_streams && !self.stderr.is_empty() {
            errors.insert(CheckSpecError::InvalidMergeConfig);
        }

        let mut planned = vec![];

        for kind in kinds {
            let artifact = self.artifact(kind);

            match (&artifact.expected, &artifact.result) {
                (Some(expected), Some(result)) => planned.push(PlannedArtifact {
                    kind,
                    expected,
                    result,
                    normalizer: artifact.normalizer.as_ref(),
                }),
                (None, None) => {
                    if artifact.normalizer.is_some() {
                        errors.insert(CheckSpecError::OrphanNormalizer(kind));
                    }
                }
                _ => {
                    errors.insert(CheckSpecError::IncompletePair(kind));
                }
            }
        }

        if errors.is_empty() {
            Ok(planned)
        } else {
            Err(InvalidCheckSpec { errors })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> CheckSpec {
        CheckSpec::new(TestId::from("case"), vec![])
    }

    fn errors_of(spec: &CheckSpec) -> Vec<CheckSpecError> {
        match spec.validate() {
            Ok(_) => vec![],
            Err(invalid) => invalid.errors.into_iter().collect(),
        }
    }

    #[test]
    fn test_stdout_only_is_valid() {
        let mut spec = spec();
        spec.stdout = ArtifactSpec::new("Output/help.txt", "Results/help.txt");

        let planned = spec.validate().unwrap();

        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].kind, ArtifactKind::Stdout);
        assert_eq!(planned[0].result, &PathBuf::from("Results/help.txt"));
    }

    #[test]
    fn test_nothing_requested() {
        assert_eq!(
            errors_of(&spec()),
            vec![CheckSpecError::NoComparisonRequested]
        );
    }

    #[test]
    fn test_stderr_rejected_when_merged() {
        let mut spec = spec();
        spec.merge_streams = true;
        spec.stderr = ArtifactSpec::new("Output/9.txt", "Results/9.txt");

        assert_eq!(errors_of(&spec), vec![CheckSpecError::InvalidMergeConfig]);
    }

    #[test]
    fn test_stderr_result_alone_rejected_when_merged() {
        let mut spec = spec();
        spec.stdout = ArtifactSpec::new("Output/a.txt", "Results/a.txt");
        spec.stderr.result = Some(PathBuf::from("Results/err.txt"));

        assert_eq!(
            errors_of(&spec),
            vec![
                CheckSpecError::InvalidMergeConfig,
                CheckSpecError::IncompletePair(ArtifactKind::Stderr),
            ]
        );
    }

    #[test]
    fn test_stderr_allowed_when_separate() {
        let mut spec = spec();
        spec.merge_streams = false;
        spec.stderr = ArtifactSpec::new("Output/9.txt", "Results/9.txt")
            .with_normalizer(Normalizer::strip_digits());

        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_generated_without_result_rejected() {
        let mut spec = spec();
        spec.generated.expected = Some(PathBuf::from("Output/p.txt"));

        assert_eq!(
            errors_of(&spec),
            vec![CheckSpecError::IncompletePair(ArtifactKind::Generated)]
        );
    }

    #[test]
    fn test_generated_result_without_expected_rejected() {
        let mut spec = spec();
        spec.generated.result = Some(PathBuf::from("Results/p.txt"));

        assert_eq!(
            errors_of(&spec),
            vec![
                CheckSpecError::NoComparisonRequested,
                CheckSpecError::IncompletePair(ArtifactKind::Generated),
            ]
        );
    }

    #[test]
    fn test_orphan_normalizer() {
        let mut spec = spec();
        spec.stdout = ArtifactSpec::new("Output/a.txt", "Results/a.txt");
        spec.generated.normalizer = Some(Normalizer::strip_digits());

        assert_eq!(
            errors_of(&spec),
            vec![CheckSpecError::OrphanNormalizer(ArtifactKind::Generated)]
        );
    }

    #[test]
    fn test_all_three_artifacts_planned_in_order() {
        let mut spec = spec();
        spec.merge_streams = false;
        spec.stdout = ArtifactSpec::new("Output/o.txt", "Results/o.txt");
        spec.stderr = ArtifactSpec::new("Output/e.txt", "Results/e.txt");
        spec.generated = ArtifactSpec::new("Output/g.txt", "Results/g.txt");

        let kinds: Vec<_> = spec.validate().unwrap().iter().map(|a| a.kind).collect();

        assert_eq!(
            kinds,
            vec![
                ArtifactKind::Stdout,
                ArtifactKind::Stderr,
                ArtifactKind::Generated
            ]
        );
    }

    #[test]
    fn test_error_message_lists_every_rule() {
        let mut spec = spec();
        spec.stderr.expected = Some(PathBuf::from("Output/e.txt"));

        let message = spec.validate().err().unwrap().to_string();

        assert_eq!(
            message,
            "When stderr is merged into stdout, stderr cannot have an expected file, result file or normalizer; \
             The expected and result paths of stderr must be used in combination"
        );
    }
}
