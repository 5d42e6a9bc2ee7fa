#![cfg(unix)]

mod common;

use common::{shell_case, Fixture};
use goldrun::check_spec::{ArtifactSpec, CheckSpec};
use goldrun::preflight;
use goldrun::test_suite::{ReportConfig, ReportFormat, SuiteOutcome, TestSuite};
use std::fs;

fn summary() -> ReportConfig {
    ReportConfig {
        format: ReportFormat::Summary {
            show_all_tests: true,
        },
    }
}

fn stdout_case(id: &str, script: &str) -> CheckSpec {
    let mut spec = shell_case(id, script);
    spec.stdout = ArtifactSpec::new(
        format!("Output/{}.txt", id),
        format!("Results/{}.txt", id),
    );
    spec
}

#[test]
fn test_failure_does_not_stop_later_cases() {
    let fixture = Fixture::new();
    fixture.write("Output/first.txt", "expected\n");
    fixture.write("Output/second.txt", "ok\n");

    let cases = vec![
        stdout_case("first", "echo actual"),
        stdout_case("second", "touch second_ran; echo ok"),
    ];

    let suite_result = TestSuite::new(fixture.context(), cases).run(&summary());

    assert!(fixture.exists("second_ran"));
    assert!(!suite_result.cases[0].is_success());
    assert!(suite_result.cases[1].is_success());
    assert!(!suite_result.is_success());
    assert_eq!(suite_result.outcome(), SuiteOutcome::ChecksFailed);
    assert_eq!(fixture.read("Results/first.txt"), "actual\n");
}

#[test]
fn test_all_passing_suite_is_idempotent() {
    let fixture = Fixture::new();
    fixture.write("Output/a.txt", "a\n");
    fixture.write("Output/b.txt", "b\n");

    preflight::clear_dir(&fixture.path("Results")).unwrap();

    let cases = vec![stdout_case("a", "echo a"), stdout_case("b", "echo b")];
    let suite = TestSuite::new(fixture.context(), cases);

    for _ in 0..2 {
        let suite_result = suite.run(&summary());

        assert_eq!(suite_result.outcome(), SuiteOutcome::AllPassed);
        assert_eq!(fs::read_dir(fixture.path("Results")).unwrap().count(), 0);
    }
}

#[test]
fn test_fixed_case_removes_stale_result() {
    let fixture = Fixture::new();
    fixture.write("Output/greeting.txt", "hello\n");

    let broken = TestSuite::new(
        fixture.context(),
        vec![stdout_case("greeting", "echo helo")],
    );
    assert_eq!(broken.run(&summary()).outcome(), SuiteOutcome::ChecksFailed);
    assert!(fixture.exists("Results/greeting.txt"));

    let fixed = TestSuite::new(
        fixture.context(),
        vec![stdout_case("greeting", "echo hello")],
    );
    assert_eq!(fixed.run(&summary()).outcome(), SuiteOutcome::AllPassed);
    assert!(!fixture.exists("Results/greeting.txt"));
}

#[test]
fn test_invalid_case_is_a_usage_error_but_others_still_run() {
    let fixture = Fixture::new();
    fixture.write("Output/ok.txt", "ok\n");

    let mut invalid = shell_case("invalid", "touch invalid_ran");
    invalid.stderr = ArtifactSpec::new("Output/err.txt", "Results/err.txt");

    let cases = vec![invalid, stdout_case("ok", "touch ok_ran; echo ok")];

    let suite_result = TestSuite::new(fixture.context(), cases).run(&summary());

    assert!(!fixture.exists("invalid_ran"));
    assert!(fixture.exists("ok_ran"));
    assert_eq!(suite_result.outcome(), SuiteOutcome::UsageError);
}

#[test]
fn test_tap_format_reports_the_same_outcome() {
    let fixture = Fixture::new();
    fixture.write("Output/first.txt", "1\n");
    fixture.write("Output/second.txt", "2\n");

    let cases = vec![
        stdout_case("first", "echo 1"),
        stdout_case("second", "echo 3"),
    ];
    let report_config = ReportConfig {
        format: ReportFormat::Tap,
    };

    let suite_result = TestSuite::new(fixture.context(), cases).run(&report_config);

    assert_eq!(suite_result.outcome(), SuiteOutcome::ChecksFailed);
}

#[test]
fn test_empty_suite_passes_without_touching_results() {
    let fixture = Fixture::new();

    let suite_result = TestSuite::new(fixture.context(), vec![]).run(&summary());

    assert_eq!(suite_result.outcome(), SuiteOutcome::AllPassed);
    assert!(!fixture.exists("Results"));
}
