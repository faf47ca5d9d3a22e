//! Handler id allocation.
//!
//! Every element carrying an event handler is tagged with a synthetic class so
//! the lifecycle hook can find it again after rendering. The ids behind those
//! classes must never collide inside one compilation run, including runs that
//! lower several files in parallel.

use std::sync::atomic::{AtomicU64, Ordering};

/// Prefix of the synthetic handler class names (`__handler0`, `__handler1`, ...).
pub const HANDLER_CLASS_PREFIX: &str = "__handler";

/// Process-wide allocator used when the host does not supply its own.
pub static GLOBAL_HANDLER_IDS: HandlerIdAllocator = HandlerIdAllocator::new();

/// Monotonic, lock-free handler id source.
#[derive(Debug, Default)]
pub struct HandlerIdAllocator {
    next: AtomicU64,
}

impl HandlerIdAllocator {
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }

    pub const fn seeded(seed: u64) -> Self {
        Self {
            next: AtomicU64::new(seed),
        }
    }

    /// Returns the next synthetic class name.
    pub fn next_class(&self) -> String {
        let id = self.next.fetch_add(1, Ordering::SeqCst);
        format!("{}{}", HANDLER_CLASS_PREFIX, id)
    }

    /// The id the next call to [`next_class`](Self::next_class) will use.
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }

    /// Restarts numbering at zero. Only meant for isolated test runs: ids
    /// handed out before the reset may be handed out again.
    pub fn reset(&self) {
        self.seed(0);
    }

    pub fn seed(&self, value: u64) {
        self.next.store(value, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_monotonic() {
        let ids = HandlerIdAllocator::new();
        assert_eq!(ids.next_class(), "__handler0");
        assert_eq!(ids.next_class(), "__handler1");
        assert_eq!(ids.peek(), 2);
    }

    #[test]
    fn test_reset_and_seed() {
        let ids = HandlerIdAllocator::seeded(40);
        assert_eq!(ids.next_class(), "__handler40");
        ids.reset();
        assert_eq!(ids.next_class(), "__handler0");
        ids.seed(7);
        assert_eq!(ids.next_class(), "__handler7");
    }

    #[test]
    fn test_parallel_allocation_is_unique() {
        let ids = HandlerIdAllocator::new();
        let classes: Vec<String> = (0..1000).into_par_iter().map(|_| ids.next_class()).collect();
        let unique: HashSet<&String> = classes.iter().collect();
        assert_eq!(unique.len(), 1000);
        assert_eq!(ids.peek(), 1000);
    }
}
