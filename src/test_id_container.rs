use crate::test_id::TestId;

/// Set of selected test ids, kept free of ids already covered by another
pub struct TestIdContainer {
    ids: Vec<TestId>,
}

impl TestIdContainer {
    pub fn empty() -> TestIdContainer {
        TestIdContainer { ids: vec![] }
    }

    /// Selects every case
    pub fn full() -> TestIdContainer {
        TestIdContainer {
            ids: vec![TestId::root()],
        }
    }

    pub fn from_ids(ids: impl IntoIterator<Item = TestId>) -> TestIdContainer {
        let mut container = Self::empty();
        for id in ids {
            container.add(id);
        }
        if container.is_empty() {
            Self::full()
        } else {
            container
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn selects(&self, id: &TestId) -> bool {
        self.ids.iter().any(|selected| selected.contains(id))
    }

    pub fn add(&mut self, new_id: TestId) -> bool {
        if self.selects(&new_id) {
            return false;
        }

        self.ids.retain(|existing_id| !new_id.contains(existing_id));
        self.ids.push(new_id);
        self.ids.sort();

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_replaces_narrower_ids() {
        let mut ids = TestIdContainer::empty();

        assert!(ids.add(TestId::from("help")));
        assert!(ids.add(TestId::from("debug_log.9")));
        assert_eq!(ids.len(), 2);
        assert!(ids.add(TestId::root()));
        assert_eq!(ids.len(), 1);
        assert!(!ids.add(TestId::from("show_config")));
    }

    #[test]
    fn test_selects_instances_of_a_case() {
        let ids = TestIdContainer::from_ids(vec![TestId::from("debug_log")]);

        assert!(ids.selects(&TestId::from("debug_log.9")));
        assert!(ids.selects(&TestId::from("debug_log")));
        assert!(!ids.selects(&TestId::from("help")));
    }

    #[test]
    fn test_no_ids_selects_everything() {
        let ids = TestIdContainer::from_ids(vec![]);

        assert!(ids.selects(&TestId::from("anything.at.all")));
    }
}
