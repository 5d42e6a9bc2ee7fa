use goldrun::formats::tree;
use goldrun::formats::tree::Tree::{self, Leaf, Node};
use goldrun::preflight::PreflightError;
use goldrun::test_id::TestId;
use goldrun::toml_config::{CaseValidationError, TomlConfigError};
use goldrun::utils::file::display_path;
use std::collections::BTreeSet;
use std::path::Path;

pub fn print_validation_errors(
    source_file: &Path,
    validation_errors: &[(TestId, BTreeSet<CaseValidationError>)],
) {
    let test_cases = validation_errors
        .iter()
        .map(|(test_id, errs)| {
            Node(
                test_id.to_string(),
                errs.iter()
                    .map(|err| str_to_tree(&show_validation_error(err)))
                    .collect(),
            )
        })
        .collect();

    let tree = Node(
        config_heading(source_file),
        vec![Node(String::from("Validation errors"), test_cases)],
    );

    print_tree(tree);
}

pub fn print_toml_config_error(source_file: &Path, error: &TomlConfigError) {
    let tree = Node(
        config_heading(source_file),
        vec![str_to_tree(&error.to_string())],
    );

    print_tree(tree);
}

pub fn print_preflight_error(error: &PreflightError) {
    eprintln!("{}", error);
}

fn print_tree(tree: Tree) {
    let content = tree::draw_tree(&tree).unwrap_or_else(|_| String::from("Failed to draw tree\n"));

    eprint!("{}", content); // Already contains newline
    eprintln!()
}

fn config_heading(source_file: &Path) -> String {
    format!("📋 {}", display_path(source_file))
}

fn show_validation_error(validation_error: &CaseValidationError) -> String {
    let msg = match validation_error {
        CaseValidationError::IdRequired => String::from("The field 'id' is required"),
        CaseValidationError::InvalidId(id) => {
            format!("The id '{}' must be non-empty and contain no '.'", id)
        }
        CaseValidationError::DuplicateId => String::from("The id is used by another test"),
        CaseValidationError::EmptyParameters => {
            String::from("The field 'parameters' must not be empty")
        }
        CaseValidationError::MissingEnvVar(var_name) => {
            format!("Missing environment variable '{}'", var_name)
        }
        CaseValidationError::UnknownNormalizer(name) => {
            format!("Unknown normalizer '{}'", name)
        }
        CaseValidationError::InvalidNormalizer(err) => format!("Invalid normalizer: {}", err),
        CaseValidationError::InvalidCheckSpec(err) => err.to_string(),
        CaseValidationError::DuplicateResultPath { path, first_case } => format!(
            "The result path '{}' is already used by '{}'",
            path.display(),
            first_case
        ),
    };

    format!("❌ {}", msg)
}

fn str_to_tree(msg: &str) -> Tree {
    Leaf(vec![msg.to_owned()])
}
