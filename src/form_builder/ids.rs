use std::cell::Cell;
use uuid::Uuid;

/// Source of client-side keys for containers, controls and option items.
///
/// The only contract is uniqueness within an editing session.
pub trait IdGenerator {
    fn generate(&self) -> String;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

/// Predictable keys (`id-1`, `id-2`, ...) for tests and fixtures.
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: Cell<u64>,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn generate(&self) -> String {
        let id = self.next.get() + 1;
        self.next.set(id);
        format!("id-{id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn uuid_ids_do_not_repeat() {
        let ids = UuidGenerator;
        let seen: HashSet<String> = (0..500).map(|_| ids.generate()).collect();
        assert_eq!(seen.len(), 500);
    }

    #[test]
    fn sequential_ids_count_up() {
        let ids = SequentialIds::new();
        assert_eq!(ids.generate(), "id-1");
        assert_eq!(ids.generate(), "id-2");
    }
}
