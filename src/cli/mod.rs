pub mod report;

use clap::Parser;
use goldrun::test_id::TestId;
use goldrun::test_id_container::TestIdContainer;
use goldrun::utils::file as file_utils;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub fn parse() -> Args {
    Args::parse()
}

/// Golden-file test runner for command-line programs
#[derive(Parser)]
#[clap(bin_name = "goldrun")]
pub struct Args {
    /// Path to the suite file, optionally followed by `:<TEST_ID>`
    pub suite: SuitePath,

    /// Only run the test with this id (repeatable)
    #[arg(long)]
    pub only: Vec<String>,

    /// Use this binary instead of searching the candidates in the suite file
    #[arg(long)]
    pub binary: Option<PathBuf>,

    /// Options: summary, tap
    #[arg(long, default_value = "summary")]
    pub output_format: OutputFormat,

    /// Show all tests in summary, regardless of test status
    #[arg(long)]
    pub show_all_tests: bool,

    /// Do not check the build type of the binary
    #[arg(long)]
    pub skip_build_check: bool,

    /// Print debug logging
    #[arg(long)]
    pub verbose: bool,
}

impl Args {
    pub fn selected_tests(&self) -> TestIdContainer {
        let ids = self
            .suite
            .test_id
            .iter()
            .cloned()
            .chain(self.only.iter().map(|id| TestId::from(id.as_str())));

        TestIdContainer::from_ids(ids)
    }
}

#[derive(Clone)]
pub struct SuitePath {
    pub source_file: PathBuf,
    pub test_id: Option<TestId>,
}

impl FromStr for SuitePath {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = Path::new(s);
        if path.is_file() {
            return Ok(Self {
                source_file: path.to_path_buf(),
                test_id: None,
            });
        }

        match file_utils::split_file_name(path) {
            (source_file, Some(suffix)) if source_file.is_file() => Ok(Self {
                source_file,
                test_id: Some(TestId::from(suffix.as_str())),
            }),
            _ => Err("Invalid path to suite file"),
        }
    }
}

#[derive(Clone)]
pub enum OutputFormat {
    Summary,
    Tap,
}

impl FromStr for OutputFormat {
    type Err = &'static str;

    fn from_str(format: &str) -> Result<Self, Self::Err> {
        match format {
            "summary" => Ok(Self::Summary),
            "tap" => Ok(Self::Tap),
            _ => Err("Invalid output format"),
        }
    }
}
