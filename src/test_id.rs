use std::fmt::{Display, Formatter};

/// Dotted identifier of a case, e.g. `debug_log.21` for one instance of a
/// parameterized case
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Debug, Hash)]
pub struct TestId {
    id_path: Vec<String>,
}

impl TestId {
    pub fn new(id_path: Vec<String>) -> TestId {
        TestId { id_path }
    }

    pub fn root() -> TestId {
        Self::new(vec![])
    }

    pub fn from(str: &str) -> TestId {
        if str.is_empty() {
            Self::root()
        } else {
            Self::new(str.split('.').map(String::from).collect())
        }
    }

    pub fn child(&self, segment: &str) -> TestId {
        let mut id_path = self.id_path.clone();
        id_path.push(segment.to_owned());
        Self::new(id_path)
    }

    pub fn contains(&self, other: &TestId) -> bool {
        other.id_path.starts_with(&self.id_path)
    }

    pub fn is_root(&self) -> bool {
        self.id_path.is_empty()
    }
}

impl Display for TestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id_path.join("."))
    }
}
