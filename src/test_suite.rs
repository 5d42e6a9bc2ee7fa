use crate::check_spec::CheckSpec;
use crate::formats::tree::Node;
use crate::formats::{tap, tree};
use crate::output_check::{self, CheckError};
use crate::test_id::TestId;
use crate::test_result::CheckResult;
use colored::Colorize;
use log::info;
use std::path::{Path, PathBuf};

const ALL_OK_MSG: &str = "all tests are OK";
const PROBLEMS_MSG: &str = "some problem(s) are still present";

/// Where a suite runs, resolved once before the first case
pub struct SuiteContext {
    /// Directory that relative paths in cases are resolved against, and the
    /// working directory of the program under test
    pub root: PathBuf,
    pub binary: PathBuf,
    pub results_dir: PathBuf,
}

impl SuiteContext {
    pub fn new(
        root: impl Into<PathBuf>,
        binary: impl Into<PathBuf>,
        results_dir: impl Into<PathBuf>,
    ) -> SuiteContext {
        SuiteContext {
            root: root.into(),
            binary: binary.into(),
            results_dir: results_dir.into(),
        }
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

pub struct ReportConfig {
    pub format: ReportFormat,
}

pub enum ReportFormat {
    Summary { show_all_tests: bool },
    Tap,
}

pub struct CaseResult {
    pub id: TestId,
    pub description: Option<String>,
    pub result: Result<CheckResult, CheckError>,
}

impl CaseResult {
    pub fn is_success(&self) -> bool {
        match &self.result {
            Ok(check_result) => check_result.is_success(),
            Err(_) => false,
        }
    }

    fn message(&self, separator: &str) -> String {
        match &self.description {
            Some(description) => format!("{}{}{}", self.id, separator, description),
            None => self.id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteOutcome {
    AllPassed,
    /// A case could not be attempted: invalid spec or missing binary
    UsageError,
    ChecksFailed,
}

pub struct SuiteResult {
    pub cases: Vec<CaseResult>,
}

impl SuiteResult {
    pub fn is_success(&self) -> bool {
        self.cases.iter().all(CaseResult::is_success)
    }

    pub fn outcome(&self) -> SuiteOutcome {
        let any_usage_error = self.cases.iter().any(|case| match &case.result {
            Err(err) => err.is_usage_error(),
            Ok(_) => false,
        });

        if any_usage_error {
            SuiteOutcome::UsageError
        } else if self.is_success() {
            SuiteOutcome::AllPassed
        } else {
            SuiteOutcome::ChecksFailed
        }
    }
}

/// Ordered cases run one after another against one binary
pub struct TestSuite {
    context: SuiteContext,
    cases: Vec<CheckSpec>,
}

impl TestSuite {
    pub fn new(context: SuiteContext, cases: Vec<CheckSpec>) -> TestSuite {
        TestSuite { context, cases }
    }

    /// Run every case, even after failures, then report the summary
    ///
    /// The results directory is prepared by the caller.
    pub fn run(&self, report_config: &ReportConfig) -> SuiteResult {
        let number_of_tests = self.cases.len();
        report_start(report_config, number_of_tests);

        let mut case_results = vec![];

        for (i, case) in self.cases.iter().enumerate() {
            info!("running {}", case.id);

            let case_result = CaseResult {
                id: case.id.clone(),
                description: case.description.clone(),
                result: output_check::run(case, &self.context),
            };

            report_test_case(report_config, number_of_tests, i, &case_result);
            case_results.push(case_result);
        }

        let suite_result = SuiteResult {
            cases: case_results,
        };

        report_summary(report_config, &suite_result);

        suite_result
    }
}

// REPORTING

fn report_start(report_config: &ReportConfig, number_of_tests: usize) {
    match report_config.format {
        ReportFormat::Summary { .. } => {
            println!("Running {} tests:", number_of_tests)
        }
        ReportFormat::Tap => {
            tap::print_version();
            tap::print_plan(1, number_of_tests);
        }
    }
}

fn report_test_case(
    report_config: &ReportConfig,
    number_of_tests: usize,
    index: usize,
    case_result: &CaseResult,
) {
    match report_config.format {
        ReportFormat::Summary { .. } => {
            if case_result.is_success() {
                print!(".")
            } else {
                print!("F")
            }
        }
        ReportFormat::Tap => {
            let indent_level = number_of_tests.to_string().len();
            tap_print_test_case(index + 1, case_result, indent_level);
        }
    }
}

fn report_summary(report_config: &ReportConfig, suite_result: &SuiteResult) {
    match report_config.format {
        ReportFormat::Summary { show_all_tests } => {
            summary_print_summary(show_all_tests, suite_result);
        }
        ReportFormat::Tap => {
            tap::print_comment(final_message(suite_result));
        }
    }
}

fn final_message(suite_result: &SuiteResult) -> &'static str {
    if suite_result.is_success() {
        ALL_OK_MSG
    } else {
        PROBLEMS_MSG
    }
}

// SUMMARY HELPERS

fn summary_print_summary(show_all_tests: bool, suite_result: &SuiteResult) {
    println!(); // Add newline to dots

    let mut is_any_test_cases_printed = false;

    for case_result in &suite_result.cases {
        if show_all_tests || !case_result.is_success() {
            if !is_any_test_cases_printed {
                println!();
                is_any_test_cases_printed = true;
            }

            summary_print_result(case_result);
        }
    }

    let number_of_tests = suite_result.cases.len();
    let number_of_passed_tests = suite_result
        .cases
        .iter()
        .filter(|c| c.is_success())
        .count();
    let number_of_failed_tests = number_of_tests - number_of_passed_tests;

    let status = if number_of_failed_tests == 0 {
        "OK".green()
    } else {
        "FAIL".red()
    };

    println!();
    println!(
        "Test result: {} ({} passed, {} failed)",
        status, number_of_passed_tests, number_of_failed_tests,
    );
    println!("{}", final_message(suite_result));
}

fn summary_print_result(case_result: &CaseResult) {
    let message = case_result.message(" - ");

    if case_result.is_success() {
        println!("✅ {}", message);
        return;
    }

    let children = match &case_result.result {
        Ok(check_result) => tree::tree_from_check_result(check_result),
        Err(err) => tree::tree_from_check_error(err),
    };
    let tree = Node(format!("❌ {}", message), children);
    let content =
        tree::draw_tree(&tree).unwrap_or_else(|_| String::from("Failed to draw tree\n"));
    print!("{}", content);
}

// TAP HELPERS

fn tap_print_test_case(test_number: usize, case_result: &CaseResult, indent_level: usize) {
    let message = case_result.message(" # ");

    match &case_result.result {
        Ok(check_result) if check_result.is_success() => {
            tap::print_ok(test_number, &message, indent_level)
        }
        Ok(check_result) => tap::print_not_ok(
            test_number,
            &message,
            &tap::check_result_diagnostics(check_result),
            indent_level,
        ),
        Err(err) => tap::print_not_ok(
            test_number,
            &message,
            &tap::check_error_diagnostics(err),
            indent_level,
        ),
    }
}
