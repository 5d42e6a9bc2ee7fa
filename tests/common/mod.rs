#![allow(dead_code)]

use goldrun::check_spec::CheckSpec;
use goldrun::test_id::TestId;
use goldrun::test_suite::SuiteContext;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const SHELL: &str = "/bin/sh";

/// Suite root in a temporary directory, with `/bin/sh` as the program
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Fixture {
        Fixture {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).unwrap()
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.path(relative).exists()
    }

    pub fn context(&self) -> SuiteContext {
        SuiteContext::new(self.root(), SHELL, "Results")
    }
}

/// Case running `sh -c <script>` in the suite root
pub fn shell_case(id: &str, script: &str) -> CheckSpec {
    CheckSpec::new(
        TestId::from(id),
        vec![String::from("-c"), String::from(script)],
    )
}
