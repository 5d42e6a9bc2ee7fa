use crate::check_spec::{ArtifactKind, ArtifactSpec, CheckSpec, CheckSpecError};
use crate::normalizer::Normalizer;
use crate::test_id::TestId;
use crate::utils::file::config_path;
use crate::utils::string::substitute_param;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_RESULTS_DIR: &str = "Results";

// READ CONFIG FILE

pub struct ValidSuiteConfig {
    pub settings: SuiteSettings,
    pub validation_errors: Vec<(TestId, BTreeSet<CaseValidationError>)>,
    pub test_cases: Vec<CheckSpec>,
}

/// Everything about the suite that is not a test case
pub struct SuiteSettings {
    pub results_dir: PathBuf,
    pub binary_candidates: Vec<String>,
    pub build_check: Option<BuildCheck>,
}

pub struct BuildCheck {
    pub build_type: String,
    pub cmake_cache: PathBuf,
}

#[derive(Debug, Error)]
pub enum TomlConfigError {
    #[error("Failed to read file: {0}")]
    FailedToReadFile(#[from] io::Error),
    #[error("Failed to parse config file: {0}")]
    FailedToParseTomlConfig(#[from] toml::de::Error),
}

pub fn parse_toml_config(source_file: &Path) -> Result<ValidSuiteConfig, TomlConfigError> {
    let toml_content = fs::read_to_string(source_file)?;
    parse_toml_str(&toml_content)
}

pub fn parse_toml_str(toml_content: &str) -> Result<ValidSuiteConfig, TomlConfigError> {
    let toml_suite = toml::from_str::<TomlSuite>(toml_content)?;
    Ok(build_suite(toml_suite))
}

// TOML STRUCTURE

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlSuite {
    results_dir: Option<String>,
    binary: Option<TomlBinary>,
    build: Option<TomlBuild>,
    defaults: Option<TomlCase>,
    #[serde(default)]
    tests: Vec<TomlCase>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlBinary {
    candidates: Vec<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlBuild {
    build_type: String,
    cmake_cache: String,
}

#[derive(Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
struct TomlCase {
    id: Option<String>,
    description: Option<String>,
    arguments: Option<Vec<ArgumentValue>>,
    stdin: Option<String>,
    merge_streams: Option<bool>,
    expected_exit_code: Option<i32>,
    parameters: Option<Vec<String>>,
    stdout: Option<TomlArtifact>,
    stderr: Option<TomlArtifact>,
    generated: Option<TomlArtifact>,
}

#[derive(Deserialize, Clone)]
#[serde(deny_unknown_fields)]
struct TomlArtifact {
    expected: Option<String>,
    result: Option<String>,
    #[serde(default)]
    normalize: Vec<TomlNormalizer>,
}

#[derive(Deserialize, Clone)]
#[serde(untagged)]
enum ArgumentValue {
    Literal(String),
    WrappedLiteral { value: String },
    FetchFromEnv { env: String },
    NullDevice { null_device: bool },
}

#[derive(Deserialize, Clone)]
#[serde(untagged)]
enum TomlNormalizer {
    Named(String),
    Replace {
        replace: String,
        #[serde(default)]
        with: String,
    },
}

// CREATE TEST CASES

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum CaseValidationError {
    IdRequired,
    InvalidId(String),
    DuplicateId,
    EmptyParameters,
    MissingEnvVar(String),
    UnknownNormalizer(String),
    InvalidNormalizer(String),
    InvalidCheckSpec(CheckSpecError),
    DuplicateResultPath { path: PathBuf, first_case: TestId },
}

fn build_suite(toml_suite: TomlSuite) -> ValidSuiteConfig {
    let results_dir = config_path(
        toml_suite
            .results_dir
            .as_deref()
            .unwrap_or(DEFAULT_RESULTS_DIR),
    );

    let settings = SuiteSettings {
        results_dir: results_dir.clone(),
        binary_candidates: toml_suite
            .binary
            .map(|binary| binary.candidates)
            .unwrap_or_default(),
        build_check: toml_suite.build.map(|build| BuildCheck {
            build_type: build.build_type,
            cmake_cache: config_path(&build.cmake_cache),
        }),
    };

    let defaults = toml_suite.defaults.unwrap_or_default();

    let mut errors: BTreeMap<TestId, BTreeSet<CaseValidationError>> = BTreeMap::new();
    let mut error_order = vec![];
    let mut add_error = |id: &TestId, err: CaseValidationError| {
        if !errors.contains_key(id) {
            error_order.push(id.clone());
        }
        errors.entry(id.clone()).or_default().insert(err);
    };

    let mut seen_ids = BTreeSet::new();
    let mut result_paths: BTreeMap<PathBuf, TestId> = BTreeMap::new();
    let mut test_cases = vec![];

    for (index, toml_case) in toml_suite.tests.into_iter().enumerate() {
        let toml_case = merge_toml_cases(&defaults, toml_case);

        for instance in expand_instances(toml_case, index, &results_dir) {
            let id = instance.id;

            if !seen_ids.insert(id.clone()) {
                add_error(&id, CaseValidationError::DuplicateId);
                continue;
            }

            match instance.spec {
                Ok(spec) => {
                    let mut claimed = vec![];
                    let mut collision = false;
                    for result in result_paths_of(&spec) {
                        if let Some(first_case) = result_paths.get(&result) {
                            add_error(
                                &id,
                                CaseValidationError::DuplicateResultPath {
                                    path: result.clone(),
                                    first_case: first_case.clone(),
                                },
                            );
                            collision = true;
                        } else {
                            claimed.push(result);
                        }
                    }

                    if !collision {
                        for result in claimed {
                            result_paths.insert(result, id.clone());
                        }
                        test_cases.push(spec);
                    }
                }
                Err(case_errors) => {
                    for err in case_errors {
                        add_error(&id, err);
                    }
                }
            }
        }
    }

    let validation_errors = error_order
        .into_iter()
        .filter_map(|id| errors.remove(&id).map(|errs| (id, errs)))
        .collect();

    ValidSuiteConfig {
        settings,
        validation_errors,
        test_cases,
    }
}

struct Instance {
    id: TestId,
    spec: Result<CheckSpec, BTreeSet<CaseValidationError>>,
}

/// One instance per parameter, or a single instance without parameters
fn expand_instances(toml_case: TomlCase, index: usize, results_dir: &Path) -> Vec<Instance> {
    let (base_id, id_errors) = match &toml_case.id {
        Some(id) if id.is_empty() || id.contains('.') => (
            TestId::from(&format!("#{}", index + 1)),
            BTreeSet::from([CaseValidationError::InvalidId(id.clone())]),
        ),
        Some(id) => (TestId::from(id), BTreeSet::new()),
        None => (
            TestId::from(&format!("#{}", index + 1)),
            BTreeSet::from([CaseValidationError::IdRequired]),
        ),
    };

    let params: Vec<Option<&str>> = match &toml_case.parameters {
        Some(params) if params.is_empty() => {
            let mut errs = id_errors;
            errs.insert(CaseValidationError::EmptyParameters);
            return vec![Instance {
                id: base_id,
                spec: Err(errs),
            }];
        }
        Some(params) => params.iter().map(|p| Some(p.as_str())).collect(),
        None => vec![None],
    };

    params
        .into_iter()
        .map(|param| {
            let id = match param {
                Some(p) => base_id.child(p),
                None => base_id.clone(),
            };
            let spec = build_test_case(&toml_case, id.clone(), param, results_dir).and_then(
                |spec| {
                    if id_errors.is_empty() {
                        Ok(spec)
                    } else {
                        Err(id_errors.clone())
                    }
                },
            );
            Instance { id, spec }
        })
        .collect()
}

fn build_test_case(
    toml_case: &TomlCase,
    id: TestId,
    param: Option<&str>,
    results_dir: &Path,
) -> Result<CheckSpec, BTreeSet<CaseValidationError>> {
    let mut validation_errors = BTreeSet::new();

    let mut arguments = vec![];
    for arg in toml_case.arguments.iter().flatten() {
        match arg.read(param) {
            Ok(arg) => arguments.push(arg),
            Err(err) => {
                validation_errors.insert(err);
            }
        }
    }

    let mut spec = CheckSpec::new(id, arguments);
    spec.description = toml_case
        .description
        .as_deref()
        .map(|d| substitute_param(d, param));
    spec.stdin = toml_case
        .stdin
        .as_deref()
        .map(|s| substitute_param(s, param));
    spec.merge_streams = toml_case.merge_streams.unwrap_or(true);
    spec.expected_exit_code = toml_case.expected_exit_code;

    let artifacts = [
        (ArtifactKind::Stdout, &toml_case.stdout),
        (ArtifactKind::Stderr, &toml_case.stderr),
        (ArtifactKind::Generated, &toml_case.generated),
    ];

    for (kind, toml_artifact) in artifacts {
        if let Some(toml_artifact) = toml_artifact {
            let artifact =
                build_artifact(&mut validation_errors, kind, toml_artifact, param, results_dir);
            match kind {
                ArtifactKind::Stdout => spec.stdout = artifact,
                ArtifactKind::Stderr => spec.stderr = artifact,
                ArtifactKind::Generated => spec.generated = artifact,
            }
        }
    }

    if let Err(invalid) = spec.validate() {
        validation_errors.extend(
            invalid
                .errors
                .into_iter()
                .map(CaseValidationError::InvalidCheckSpec),
        );
    }

    if validation_errors.is_empty() {
        Ok(spec)
    } else {
        Err(validation_errors)
    }
}

fn build_artifact(
    validation_errors: &mut BTreeSet<CaseValidationError>,
    kind: ArtifactKind,
    toml_artifact: &TomlArtifact,
    param: Option<&str>,
    results_dir: &Path,
) -> ArtifactSpec {
    let expected = toml_artifact
        .expected
        .as_deref()
        .map(|e| config_path(&substitute_param(e, param)));

    let mut result = toml_artifact
        .result
        .as_deref()
        .map(|r| config_path(&substitute_param(r, param)));

    // Captured streams land next to the other results unless told otherwise.
    // The generated file's path is chosen by the program, so it is never guessed.
    if kind != ArtifactKind::Generated && result.is_none() {
        result = expected
            .as_ref()
            .and_then(|e| e.file_name())
            .map(|file_name| results_dir.join(file_name));
    }

    let mut normalizers = vec![];
    for toml_normalizer in &toml_artifact.normalize {
        match toml_normalizer.build() {
            Ok(normalizer) => normalizers.push(normalizer),
            Err(err) => {
                validation_errors.insert(err);
            }
        }
    }

    let normalizer = match normalizers.len() {
        0 => None,
        1 => normalizers.pop(),
        _ => Some(Normalizer::chain(normalizers)),
    };

    ArtifactSpec {
        expected,
        result,
        normalizer,
    }
}

fn result_paths_of(spec: &CheckSpec) -> Vec<PathBuf> {
    [&spec.stdout, &spec.stderr, &spec.generated]
        .iter()
        .filter_map(|artifact| artifact.result.clone())
        .collect()
}

fn merge_toml_cases(base_case: &TomlCase, prioritized_case: TomlCase) -> TomlCase {
    let base_case = base_case.clone();

    TomlCase {
        id: prioritized_case.id, // Ids are never inherited
        description: prioritized_case.description.or(base_case.description),
        arguments: prioritized_case.arguments.or(base_case.arguments),
        stdin: prioritized_case.stdin.or(base_case.stdin),
        merge_streams: prioritized_case.merge_streams.or(base_case.merge_streams),
        expected_exit_code: prioritized_case
            .expected_exit_code
            .or(base_case.expected_exit_code),
        parameters: prioritized_case.parameters.or(base_case.parameters),
        stdout: prioritized_case.stdout.or(base_case.stdout),
        stderr: prioritized_case.stderr.or(base_case.stderr),
        generated: prioritized_case.generated.or(base_case.generated),
    }
}

impl ArgumentValue {
    fn read(&self, param: Option<&str>) -> Result<String, CaseValidationError> {
        match self {
            Self::Literal(value) => Ok(substitute_param(value, param)),
            Self::WrappedLiteral { value } => Ok(substitute_param(value, param)),
            Self::FetchFromEnv { env: var_name } => env::var(var_name)
                .map_err(|_| CaseValidationError::MissingEnvVar(var_name.clone())),
            Self::NullDevice { null_device: true } => Ok(String::from(null_device())),
            Self::NullDevice { null_device: false } => Ok(String::new()),
        }
    }
}

impl TomlNormalizer {
    fn build(&self) -> Result<Normalizer, CaseValidationError> {
        match self {
            Self::Named(name) => match name.as_str() {
                "strip-digits" => Ok(Normalizer::strip_digits()),
                "strip-first-line" => Ok(Normalizer::strip_first_line()),
                "unix-newlines" => Ok(Normalizer::unix_newlines()),
                _ => Err(CaseValidationError::UnknownNormalizer(name.clone())),
            },
            Self::Replace { replace, with } => Normalizer::replace(replace, with)
                .map_err(|err| CaseValidationError::InvalidNormalizer(err.to_string())),
        }
    }
}

pub fn null_device() -> &'static str {
    if cfg!(windows) {
        "nul"
    } else {
        "/dev/null"
    }
}
