use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::bar::spec::SpaceTypeEntry;

/// Remaining area per space type while a bar is sliced.
///
/// Allocations consume the ledger and return the updated one, so each
/// slicing step can be checked on its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaLedger {
    remaining: BTreeMap<String, f64>,
}

impl AreaLedger {
    pub fn new(entries: &[SpaceTypeEntry]) -> Self {
        let mut remaining = BTreeMap::new();
        for e in entries.iter() {
            *remaining.entry(e.name.clone()).or_default() += e.target_floor_area;
        }
        Self { remaining }
    }

    #[must_use]
    pub fn allocate(mut self, name: &str, area: f64) -> Self {
        *self.remaining.entry(name.to_string()).or_default() -= area;
        self
    }

    pub fn remaining(&self, name: &str) -> f64 {
        self.remaining.get(name).copied().unwrap_or(0.)
    }

    pub fn total_remaining(&self) -> f64 {
        self.remaining.values().sum()
    }

    /// Entries whose remaining area is not within `tol` of zero.
    pub fn unsettled(&self, tol: f64) -> impl Iterator<Item = (&str, f64)> {
        self.remaining
            .iter()
            .filter(move |(_, a)| a.abs() > tol)
            .map(|(n, a)| (n.as_str(), *a))
    }

    pub fn is_settled(&self, tol: f64) -> bool {
        self.unsettled(tol).next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::IsClose;

    #[test]
    fn test_allocate() {
        let entries = vec![
            SpaceTypeEntry::new("Office", "x", 100.),
            SpaceTypeEntry::new("Storage", "x", 20.),
        ];
        let ledger = AreaLedger::new(&entries)
            .allocate("Office", 60.)
            .allocate("Storage", 20.);
        assert!(ledger.remaining("Office").is_close(40.));
        assert!(ledger.total_remaining().is_close(40.));
        assert!(!ledger.is_settled(1e-4));
        let ledger = ledger.allocate("Office", 40.);
        assert!(ledger.is_settled(1e-4));
        assert!(ledger.remaining("Lab").is_close(0.));
    }

    #[test]
    fn test_overdrawn_is_unsettled() {
        let ledger = AreaLedger::new(&[SpaceTypeEntry::new("A", "x", 10.)]).allocate("A", 12.);
        let unsettled: Vec<(&str, f64)> = ledger.unsettled(1e-4).collect();
        assert_eq!(unsettled.len(), 1);
        assert!(unsettled[0].1.is_close(-2.));
    }
}
