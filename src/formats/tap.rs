use crate::formats::tree::artifact_problem;
use crate::output_check::CheckError;
use crate::test_result::{CheckResult, ValueComparison};
use crate::utils::string;

pub fn print_version() {
    println!("TAP version 14")
}

pub fn print_plan(start: usize, end: usize) {
    println!("{}..{}", start, end)
}

pub fn print_ok(test_number: usize, message: &str, indent_level: usize) {
    println!(
        "ok     {:>indent$} - {}",
        test_number,
        message,
        indent = indent_level
    )
}

pub fn print_not_ok(test_number: usize, message: &str, diagnostics: &str, indent_level: usize) {
    println!(
        "not ok {:>indent$} - {}",
        test_number,
        message,
        indent = indent_level
    );
    if !diagnostics.is_empty() {
        print_diagnostics(diagnostics)
    }
}

pub fn print_diagnostics(diagnostics: &str) {
    let code_block = format!("---\n{}...", diagnostics);
    println!("{}", string::indent_lines(&code_block, 2));
}

pub fn print_comment(message: &str) {
    println!("# {}", message)
}

pub fn print_bail_out(message: &str) {
    println!("Bail out! {}", message)
}

/// YAML block describing why a check failed
pub fn check_result_diagnostics(check_result: &CheckResult) -> String {
    let mut output = String::new();

    let artifacts = [
        ("stdout", &check_result.stdout),
        ("stderr", &check_result.stderr),
        ("generated", &check_result.generated),
    ];

    for (key, outcome) in artifacts {
        let problems = artifact_problem(outcome);
        if !problems.is_empty() {
            output.push_str(&format!("{}:\n", key));
            for problem in problems {
                output.push_str(&format!("  - \"{}\"\n", problem.replace('"', "\\\"")));
            }
        }
    }

    if let ValueComparison::Diff { expected, got } = check_result.exit_code {
        output.push_str(&format!(
            "exit_code:\n  expected: {}\n  got: {}\n",
            yaml_exit_code(expected),
            yaml_exit_code(got)
        ));
    }

    output
}

pub fn check_error_diagnostics(check_error: &CheckError) -> String {
    format!("error: \"{}\"\n", check_error.to_string().replace('"', "\\\""))
}

fn yaml_exit_code(code: Option<i32>) -> String {
    code.map_or_else(|| String::from("~"), |c| c.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparator::ArtifactOutcome;
    use indoc::indoc;

    #[test]
    fn test_diagnostics_for_missing_generated_file() {
        let check_result = CheckResult {
            stdout: ArtifactOutcome::Matches,
            stderr: ArtifactOutcome::NotChecked,
            generated: ArtifactOutcome::ActualMissing {
                path: "Results/p.txt".into(),
                reason: String::from("not a file"),
            },
            exit_code: ValueComparison::Diff {
                expected: Some(0),
                got: None,
            },
        };

        let expected = indoc! {r#"
            generated:
              - "Generated file Results/p.txt could not be read (not a file)"
            exit_code:
              expected: 0
              got: ~
        "#};

        assert_eq!(check_result_diagnostics(&check_result), expected);
    }
}
