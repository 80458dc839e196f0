//! People counters (entries / exits)

use crate::core::{LoungeError, LoungeResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoungeCounters {
    pub people_inside: u32,
    pub total_entries: u64,
}

impl LoungeCounters {
    pub fn new(people_inside: u32, total_entries: u64) -> Self {
        Self {
            people_inside,
            total_entries,
        }
    }

    /// Someone walked in. Always succeeds.
    pub fn record_entry(&mut self) {
        self.people_inside = self.people_inside.saturating_add(1);
        self.total_entries = self.total_entries.saturating_add(1);
    }

    /// Someone walked out. Rejected (state untouched) when nobody is inside.
    ///
    /// Returns the new number of people inside.
    pub fn record_exit(&mut self) -> LoungeResult<u32> {
        if self.people_inside == 0 {
            return Err(LoungeError::NoOneInside);
        }
        self.people_inside -= 1;
        Ok(self.people_inside)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_increments_both() {
        let mut counters = LoungeCounters::default();
        counters.record_entry();
        counters.record_entry();
        assert_eq!(counters, LoungeCounters::new(2, 2));
    }

    #[test]
    fn test_exit_decrements_inside_only() {
        let mut counters = LoungeCounters::new(2, 5);
        assert_eq!(counters.record_exit(), Ok(1));
        assert_eq!(counters, LoungeCounters::new(1, 5));
    }

    #[test]
    fn test_exit_at_zero_is_rejected() {
        let mut counters = LoungeCounters::new(0, 9);
        assert_eq!(counters.record_exit(), Err(LoungeError::NoOneInside));
        assert_eq!(counters, LoungeCounters::new(0, 9));
    }
}
