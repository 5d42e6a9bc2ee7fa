use crate::comparator::ArtifactOutcome;
use crate::output_check::CheckError;
use crate::test_result::{CheckResult, ValueComparison};
use crate::utils::file::display_path;
use crate::utils::string;
pub use ascii_tree::Tree::{self, Leaf, Node};
use std::fmt::Error;

const MAX_DIFF_LINES: usize = 20;

pub fn draw_tree(tree: &Tree) -> Result<String, Error> {
    let mut output = String::new();
    ascii_tree::write_tree(&mut output, tree)?;

    // The crate indents every line by one column
    Ok(output
        .lines()
        .map(|line| format!("{}\n", line.strip_prefix(' ').unwrap_or(line)))
        .collect())
}

pub fn text_block(content: &str) -> String {
    let prefixed_content = string::indent_with("│ ", content);

    if content.ends_with('\n') {
        format!("╭\n{}╰", prefixed_content)
    } else {
        format!("╭\n{}\n╰ (No newline at end)", prefixed_content)
    }
}

// ERROR FORMATTING

pub fn tree_from_check_result(check_result: &CheckResult) -> Vec<Tree> {
    let mut categories = vec![];

    let artifacts = [
        ("Standard output", &check_result.stdout),
        ("Standard error", &check_result.stderr),
        ("Generated file", &check_result.generated),
    ];

    for (heading, outcome) in artifacts {
        if !outcome.is_success() {
            categories.push(Node(String::from(heading), show_artifact_outcome(outcome)));
        }
    }

    if let ValueComparison::Diff { expected, got } = check_result.exit_code {
        categories.push(Node(
            String::from("Exit code"),
            show_single_line_diff(show_exit_code(expected), show_exit_code(got)),
        ));
    }

    categories
}

pub fn tree_from_check_error(check_error: &CheckError) -> Vec<Tree> {
    match check_error {
        CheckError::InvalidSpec(invalid) => invalid
            .errors
            .iter()
            .map(|err| str_to_tree(&err.to_string()))
            .collect(),
        CheckError::Run(err) => vec![str_to_tree(&err.to_string())],
    }
}

/// Short description of a failed artifact, one line per entry
pub fn artifact_problem(outcome: &ArtifactOutcome) -> Vec<String> {
    match outcome {
        ArtifactOutcome::NotChecked | ArtifactOutcome::Matches => vec![],
        ArtifactOutcome::Diff {
            expected_path,
            result_path,
            result_written,
            ..
        } => {
            let result_path = display_path(result_path);
            let expected_path = display_path(expected_path);
            if *result_written {
                vec![
                    format!("Problem with {}", result_path),
                    format!("use: 'diff {} {}' to find why", result_path, expected_path),
                ]
            } else {
                vec![format!(
                    "Output differs from {}, and {} could not be written",
                    expected_path, result_path
                )]
            }
        }
        ArtifactOutcome::ExpectedMissing {
            expected_path,
            reason,
        } => vec![format!(
            "Expected file {} could not be read ({})",
            display_path(expected_path),
            reason
        )],
        ArtifactOutcome::ActualMissing { path, reason } => vec![format!(
            "Generated file {} could not be read ({})",
            display_path(path),
            reason
        )],
    }
}

fn show_artifact_outcome(outcome: &ArtifactOutcome) -> Vec<Tree> {
    let mut nodes: Vec<Tree> = artifact_problem(outcome)
        .iter()
        .map(|line| str_to_tree(line))
        .collect();

    if let ArtifactOutcome::Diff { expected, got, .. } = outcome {
        nodes.push(Leaf(string_to_lines(&format!(
            "Diff (- expected, + got)\n{}",
            text_block(&line_diff(expected, got))
        ))));
    }

    nodes
}

fn line_diff(expected: &str, got: &str) -> String {
    let expected_lines: Vec<&str> = expected.lines().collect();
    let got_lines: Vec<&str> = got.lines().collect();

    let changed: Vec<String> = diff::slice(&expected_lines, &got_lines)
        .into_iter()
        .filter_map(|line| match line {
            diff::Result::Left(l) => Some(format!("-{}", l)),
            diff::Result::Right(r) => Some(format!("+{}", r)),
            diff::Result::Both(_, _) => None,
        })
        .collect();

    let mut output = String::new();
    for line in changed.iter().take(MAX_DIFF_LINES) {
        output.push_str(line);
        output.push('\n');
    }
    if changed.len() > MAX_DIFF_LINES {
        output.push_str(&format!("… {} more lines\n", changed.len() - MAX_DIFF_LINES));
    }
    if changed.is_empty() {
        // Only line endings differ
        output.push_str("(no line differs, check trailing newlines)\n");
    }

    output
}

fn show_exit_code(code: Option<i32>) -> String {
    code.map_or_else(|| String::from("(terminated by signal)"), |c| c.to_string())
}

fn string_to_lines(str: &str) -> Vec<String> {
    str.lines().map(|x| x.to_owned()).collect()
}

fn str_to_tree(msg: &str) -> Tree {
    Leaf(vec![msg.to_owned()])
}

fn show_single_line_diff(expected: String, got: String) -> Vec<Tree> {
    vec![
        Node(String::from("Expected"), vec![Leaf(vec![expected])]),
        Node(String::from("Got"), vec![Leaf(vec![got])]),
    ]
}

// TESTS

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_text_block_empty() {
        assert_eq!(text_block(""), "╭\n│ \n╰ (No newline at end)");
    }

    #[test]
    fn test_text_block_keeps_empty_lines() {
        assert_eq!(
            text_block("line 1\n\nline 3\n"),
            "╭\n│ line 1\n│ \n│ line 3\n╰"
        );
    }

    #[test]
    fn test_line_diff_shows_changed_lines_only() {
        let expected = indoc! {"
            -v1.2
            +v1.3
        "};

        assert_eq!(line_diff("v1.2\nok\n", "v1.3\nok\n"), expected);
    }

    #[test]
    fn test_line_diff_is_truncated() {
        let got: String = (0..30).map(|i| format!("{}\n", i)).collect();

        let output = line_diff("", &got);

        assert_eq!(output.lines().count(), MAX_DIFF_LINES + 1);
        assert!(output.ends_with("… 10 more lines\n"));
    }

    #[test]
    fn test_line_diff_only_trailing_newline_differs() {
        assert_eq!(
            line_diff("a\n", "a"),
            "(no line differs, check trailing newlines)\n"
        );
    }

    #[test]
    fn test_diff_hint() {
        let outcome = ArtifactOutcome::Diff {
            expected: String::from("a\n"),
            got: String::from("b\n"),
            expected_path: "Output/help.txt".into(),
            result_path: "Results/help.txt".into(),
            result_written: true,
        };

        assert_eq!(
            artifact_problem(&outcome),
            vec![
                String::from("Problem with Results/help.txt"),
                String::from("use: 'diff Results/help.txt Output/help.txt' to find why"),
            ]
        );
    }

    #[test]
    fn test_exit_code_tree() {
        let check_result = CheckResult {
            stdout: ArtifactOutcome::Matches,
            stderr: ArtifactOutcome::NotChecked,
            generated: ArtifactOutcome::NotChecked,
            exit_code: ValueComparison::Diff {
                expected: Some(0),
                got: Some(70),
            },
        };

        let tree = Node(String::from("case"), tree_from_check_result(&check_result));

        let expected = indoc! {"
            case
            └─ Exit code
               ├─ Expected
               │  └─ 0
               └─ Got
                  └─ 70
        "};

        assert_eq!(draw_tree(&tree).unwrap(), expected);
    }
}
