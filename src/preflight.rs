//! Checks that run once before a suite: find the binary, make sure it is the
//! right kind of build, and start from an empty results directory.

use crate::utils::file::{config_path, find_executable_path};
use itertools::Itertools;
use log::{info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreflightError {
    #[error("No binary found, tried: {}", display_paths(.tried))]
    BinaryNotFound { tried: Vec<PathBuf> },
    #[error("CMAKE_BUILD_TYPE must be '{build_type}' (checked {})", .cmake_cache.display())]
    WrongBuildType {
        build_type: String,
        cmake_cache: PathBuf,
    },
    #[error("Failed to clear {}: {source}", .path.display())]
    ClearDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths.iter().map(|p| p.display()).join(", ")
}

/// First candidate that is an existing file
///
/// Candidates containing a path separator are resolved against `root`.
/// Bare names are looked up in `root` first and then in PATH.
pub fn locate_binary(candidates: &[String], root: &Path) -> Result<PathBuf, PreflightError> {
    let mut tried = vec![];

    for candidate in candidates {
        let is_bare_name = !candidate.contains('/') && !candidate.contains('\\');

        let found = if is_bare_name {
            find_executable_path(candidate, root).ok()
        } else {
            Some(root.join(config_path(candidate))).filter(|path| path.is_file())
        };

        match found {
            Some(path) => {
                info!("binary found: {}", path.display());
                return Ok(path);
            }
            None => {
                warn!("is not a file: {}", candidate);
                tried.push(PathBuf::from(candidate));
            }
        }
    }

    Err(PreflightError::BinaryNotFound { tried })
}

/// Verify that a single-configuration CMake build used `build_type`
pub fn check_build_type(build_type: &str, cmake_cache: &Path) -> Result<(), PreflightError> {
    let wrong_build_type = || PreflightError::WrongBuildType {
        build_type: build_type.to_owned(),
        cmake_cache: cmake_cache.to_path_buf(),
    };

    let search = format!("CMAKE_BUILD_TYPE:STRING={}", build_type).to_lowercase();
    let content = fs::read_to_string(cmake_cache).map_err(|err| {
        warn!("failed to read {}: {}", cmake_cache.display(), err);
        wrong_build_type()
    })?;

    if content.to_lowercase().contains(&search) {
        info!("CMAKE_BUILD_TYPE is correct");
        Ok(())
    } else {
        Err(wrong_build_type())
    }
}

/// Delete a directory with everything in it and create it again
pub fn clear_dir(path: &Path) -> Result<(), PreflightError> {
    let clear = || -> io::Result<()> {
        if path.is_dir() {
            fs::remove_dir_all(path)?;
        }
        fs::create_dir_all(path)
    };

    clear().map_err(|source| PreflightError::ClearDir {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_first_existing_candidate() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("build/Release")).unwrap();
        fs::write(dir.path().join("build/Release/tool"), "").unwrap();

        let candidates = vec![
            String::from("build/tool"),
            String::from("build/Release/tool"),
        ];

        let found = locate_binary(&candidates, dir.path()).unwrap();

        assert_eq!(found, dir.path().join("build").join("Release").join("tool"));
    }

    #[test]
    fn test_no_candidate_found() {
        let dir = tempfile::tempdir().unwrap();
        let candidates = vec![String::from("build/tool"), String::from("bin/tool")];

        match locate_binary(&candidates, dir.path()) {
            Err(PreflightError::BinaryNotFound { tried }) => assert_eq!(tried.len(), 2),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_build_type_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("CMakeCache.txt");
        fs::write(&cache, "FOO:BOOL=ON\nCMAKE_BUILD_TYPE:STRING=Release\n").unwrap();

        assert!(check_build_type("release", &cache).is_ok());
        assert!(matches!(
            check_build_type("debug", &cache),
            Err(PreflightError::WrongBuildType { .. })
        ));
    }

    #[test]
    fn test_build_type_missing_cache() {
        let dir = tempfile::tempdir().unwrap();

        assert!(check_build_type("release", &dir.path().join("CMakeCache.txt")).is_err());
    }

    #[test]
    fn test_clear_dir() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("Results");
        fs::create_dir_all(results.join("nested")).unwrap();
        fs::write(results.join("nested/stale.txt"), "stale").unwrap();

        clear_dir(&results).unwrap();

        assert!(results.is_dir());
        assert_eq!(fs::read_dir(&results).unwrap().count(), 0);
    }
}
