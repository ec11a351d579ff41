//! Sequential identity minting for tree nodes.

use serde::{Deserialize, Serialize};

/// Sequential ID generator for the nodes of one tree.
///
/// The counter only moves forward, so an id handed out once is never
/// produced again for the lifetime of the generator, even after the node
/// it named has been removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdGenerator {
    count: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self { count: 0 }
    }

    /// Resume from a previously persisted counter value
    pub fn from_count(count: u64) -> Self {
        Self { count }
    }

    /// Generate next sequential ID
    pub fn next_id(&mut self) -> String {
        self.count += 1;
        self.count.to_string()
    }

    /// Number of ids issued so far (the persisted `nodeCount`)
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Advance the counter so it is at least `floor`. Never moves backwards.
    pub fn bump_to(&mut self, floor: u64) {
        if floor > self.count {
            self.count = floor;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sequential_ids() {
        let mut gen = IdGenerator::new();

        assert_eq!(gen.next_id(), "1");
        assert_eq!(gen.next_id(), "2");
        assert_eq!(gen.next_id(), "3");
        assert_eq!(gen.count(), 3);
    }

    #[test]
    fn test_resume_from_count() {
        let mut gen = IdGenerator::from_count(5);
        assert_eq!(gen.next_id(), "6");
    }

    #[test]
    fn test_bump_never_moves_backwards() {
        let mut gen = IdGenerator::from_count(10);
        gen.bump_to(4);
        assert_eq!(gen.count(), 10);

        gen.bump_to(12);
        assert_eq!(gen.next_id(), "13");
    }

    #[test]
    fn test_ids_are_unique() {
        let mut gen = IdGenerator::new();
        let ids: HashSet<String> = (0..1000).map(|_| gen.next_id()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
