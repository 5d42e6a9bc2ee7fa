mod cli;

use cli::{report, Args, OutputFormat};
use goldrun::formats::tap;
use goldrun::preflight::{self, PreflightError};
use goldrun::test_suite::{ReportConfig, ReportFormat, SuiteContext, SuiteOutcome, TestSuite};
use goldrun::toml_config::{self, ValidSuiteConfig};
use log::debug;
use std::path::{self, Path, PathBuf};
use std::process::ExitCode;

// Exit statuses from sysexits.h
const EX_OK: u8 = 0;
const EX_USAGE: u8 = 64;
const EX_SOFTWARE: u8 = 70;

fn main() -> ExitCode {
    let args = cli::parse();

    init_logging(args.verbose);

    ExitCode::from(run(&args))
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn run(args: &Args) -> u8 {
    let source_file = &args.suite.source_file;

    let config = match toml_config::parse_toml_config(source_file) {
        Ok(config) => config,
        Err(err) => {
            report::print_toml_config_error(source_file, &err);
            return EX_USAGE;
        }
    };

    let selected_tests = args.selected_tests();
    let rejected_cases: Vec<_> = config
        .validation_errors
        .iter()
        .filter(|(test_id, _)| selected_tests.selects(test_id))
        .cloned()
        .collect();

    // Rejected cases fail on their own, the valid ones still run
    if !rejected_cases.is_empty() {
        report::print_validation_errors(source_file, &rejected_cases);
    }

    let context = match prepare_context(args, source_file, &config) {
        Ok(context) => context,
        Err(err) => {
            report::print_preflight_error(&err);
            if let OutputFormat::Tap = args.output_format {
                tap::print_bail_out(&err.to_string());
            }
            return EX_USAGE;
        }
    };

    let test_cases: Vec<_> = config
        .test_cases
        .into_iter()
        .filter(|test_case| selected_tests.selects(&test_case.id))
        .collect();

    if test_cases.is_empty() {
        if rejected_cases.is_empty() {
            eprintln!("No tests selected");
        }
        return EX_USAGE;
    }

    let report_config = ReportConfig {
        format: match args.output_format {
            OutputFormat::Summary => ReportFormat::Summary {
                show_all_tests: args.show_all_tests,
            },
            OutputFormat::Tap => ReportFormat::Tap,
        },
    };

    let suite = TestSuite::new(context, test_cases);
    let suite_result = suite.run(&report_config);

    if !rejected_cases.is_empty() {
        return EX_USAGE;
    }

    match suite_result.outcome() {
        SuiteOutcome::AllPassed => EX_OK,
        SuiteOutcome::UsageError => EX_USAGE,
        SuiteOutcome::ChecksFailed => EX_SOFTWARE,
    }
}

/// Everything that happens once before the first case runs
fn prepare_context(
    args: &Args,
    source_file: &Path,
    config: &ValidSuiteConfig,
) -> Result<SuiteContext, PreflightError> {
    let root = absolute(source_file.parent().unwrap_or(Path::new(".")));
    debug!("suite root: {}", root.display());

    let binary = match &args.binary {
        Some(binary) => {
            if !binary.is_file() {
                return Err(PreflightError::BinaryNotFound {
                    tried: vec![binary.clone()],
                });
            }
            absolute(binary)
        }
        None => preflight::locate_binary(&config.settings.binary_candidates, &root)?,
    };

    // Build types of multi-configuration generators cannot be read from the cache
    if !args.skip_build_check && !cfg!(windows) {
        if let Some(build_check) = &config.settings.build_check {
            preflight::check_build_type(
                &build_check.build_type,
                &root.join(&build_check.cmake_cache),
            )?;
        }
    }

    preflight::clear_dir(&root.join(&config.settings.results_dir))?;

    Ok(SuiteContext::new(
        root,
        binary,
        config.settings.results_dir.clone(),
    ))
}

fn absolute(path: &Path) -> PathBuf {
    let path = if path.as_os_str().is_empty() {
        Path::new(".")
    } else {
        path
    };

    path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
