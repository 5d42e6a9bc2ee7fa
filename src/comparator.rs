use crate::normalizer::Normalizer;
use log::{debug, error, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Where one artifact is compared, and how the actual text is normalized
pub struct ArtifactComparison<'a> {
    pub expected_path: &'a Path,
    pub result_path: &'a Path,
    pub normalizer: Option<&'a Normalizer>,
}

#[derive(Debug)]
pub enum ArtifactOutcome {
    NotChecked,
    Matches,
    Diff {
        expected: String,
        got: String,
        expected_path: PathBuf,
        result_path: PathBuf,
        result_written: bool,
    },
    ExpectedMissing {
        expected_path: PathBuf,
        reason: String,
    },
    ActualMissing {
        path: PathBuf,
        reason: String,
    },
}

impl ArtifactOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::NotChecked | Self::Matches)
    }
}

impl<'a> ArtifactComparison<'a> {
    /// Compare captured text against the expected file
    ///
    /// The normalized text is written to the result path on mismatch. A
    /// result file left by an earlier failing run is removed on match.
    pub fn compare_text(&self, actual: &str) -> ArtifactOutcome {
        let expected = match read_file(self.expected_path) {
            Ok(expected) => expected,
            Err(err) => {
                warn!("is not a file: {}", self.expected_path.display());
                return ArtifactOutcome::ExpectedMissing {
                    expected_path: self.expected_path.to_path_buf(),
                    reason: err.to_string(),
                };
            }
        };

        let got = match self.normalizer {
            Some(normalizer) => normalizer.apply(actual),
            None => actual.to_owned(),
        };

        if got == expected {
            remove_stale_result(self.result_path);
            ArtifactOutcome::Matches
        } else {
            let result_written = match write_result(self.result_path, &got) {
                Ok(()) => true,
                Err(err) => {
                    error!(
                        "failed to write result file {}: {}",
                        self.result_path.display(),
                        err
                    );
                    false
                }
            };

            ArtifactOutcome::Diff {
                expected,
                got,
                expected_path: self.expected_path.to_path_buf(),
                result_path: self.result_path.to_path_buf(),
                result_written,
            }
        }
    }

    /// Compare a file the program wrote at the result path
    ///
    /// The generated file is removed when it matches and kept (holding the
    /// normalized text) when it does not.
    pub fn compare_generated(&self) -> ArtifactOutcome {
        if !self.expected_path.is_file() {
            warn!("is not a file: {}", self.expected_path.display());
            return ArtifactOutcome::ExpectedMissing {
                expected_path: self.expected_path.to_path_buf(),
                reason: String::from("not a file"),
            };
        }

        match read_file(self.result_path) {
            Ok(generated) => self.compare_text(&generated),
            Err(err) => {
                warn!("is not a file: {}", self.result_path.display());
                ArtifactOutcome::ActualMissing {
                    path: self.result_path.to_path_buf(),
                    reason: err.to_string(),
                }
            }
        }
    }
}

fn read_file(path: &Path) -> io::Result<String> {
    if path.is_file() {
        fs::read_to_string(path)
    } else {
        Err(io::Error::new(io::ErrorKind::NotFound, "not a file"))
    }
}

fn write_result(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, content)
}

fn remove_stale_result(path: &Path) {
    if path.is_file() {
        debug!("removing {}", path.display());
        if let Err(err) = fs::remove_file(path) {
            warn!("failed to remove {}: {}", path.display(), err);
        }
    }
}
