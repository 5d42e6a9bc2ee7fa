use crate::check_spec::{ArtifactKind, CheckSpec, InvalidCheckSpec};
use crate::comparator::{ArtifactComparison, ArtifactOutcome};
use crate::process_runner::{self, Invocation, RunError};
use crate::test_result::{compare_value, CheckResult};
use crate::test_suite::SuiteContext;
use log::debug;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("invalid test case: {0}")]
    InvalidSpec(#[from] InvalidCheckSpec),
    #[error("failed to run program: {0}")]
    Run(#[from] RunError),
}

impl CheckError {
    /// Whether the case could not be attempted because of how it or the
    /// suite was set up, as opposed to the program misbehaving
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSpec(_) | Self::Run(RunError::BinaryNotFound(_))
        )
    }
}

/// Validate the spec, run the program once and compare every requested
/// artifact
///
/// Nothing is spawned when validation fails. All artifacts are compared even
/// after one of them failed.
pub fn run(spec: &CheckSpec, context: &SuiteContext) -> Result<CheckResult, CheckError> {
    let planned = spec.validate()?;

    let invocation = Invocation {
        binary: context.binary.clone(),
        arguments: spec.arguments.clone(),
        merge_streams: spec.merge_streams,
        current_dir: Some(context.root.clone()),
        stdin: spec.stdin.clone(),
    };
    let output = process_runner::run(&invocation)?;

    let mut result = CheckResult {
        stdout: ArtifactOutcome::NotChecked,
        stderr: ArtifactOutcome::NotChecked,
        generated: ArtifactOutcome::NotChecked,
        exit_code: compare_value(spec.expected_exit_code.map(Some), output.exit_code),
    };

    for artifact in planned {
        let expected_path = context.resolve(artifact.expected);
        let result_path = context.resolve(artifact.result);
        let comparison = ArtifactComparison {
            expected_path: &expected_path,
            result_path: &result_path,
            normalizer: artifact.normalizer,
        };

        debug!("{}: comparing {}", spec.id, artifact.kind);

        match artifact.kind {
            ArtifactKind::Stdout => {
                result.stdout = comparison.compare_text(&output.stdout);
            }
            ArtifactKind::Stderr => {
                // Validation guarantees stderr was captured separately
                if let Some(stderr) = &output.stderr {
                    result.stderr = comparison.compare_text(stderr);
                }
            }
            ArtifactKind::Generated => {
                result.generated = comparison.compare_generated();
            }
        }
    }

    Ok(result)
}
