//! Golden-file test harness for command-line programs.
//!
//! A suite runs one binary many times, captures what it prints and writes,
//! and compares every artifact against a committed expected file.

pub mod check_spec;
pub mod comparator;
pub mod formats;
pub mod normalizer;
pub mod output_check;
pub mod preflight;
pub mod process_runner;
pub mod test_id;
pub mod test_id_container;
pub mod test_result;
pub mod test_suite;
pub mod toml_config;
pub mod utils;
