use std::collections::HashMap;
use zpoolctl_schema::{PoolName, Topology};

#[derive(Debug, Clone)]
struct CacheEntry {
    topology: Topology,
    valid: bool,
}

/// Parsed topologies, one per pool, kept for the length of a pass.
///
/// An entry stays until it is invalidated; invalidated entries are kept but
/// never returned, so the next read goes back to `zpool status`.
#[derive(Debug, Default)]
pub struct TopologyCache {
    entries: HashMap<PoolName, CacheEntry>,
}

impl TopologyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pool: &str) -> Option<&Topology> {
        self.entries
            .get(pool)
            .filter(|e| e.valid)
            .map(|e| &e.topology)
    }

    pub fn store(&mut self, pool: &str, topology: Topology) -> &Topology {
        let entry = self
            .entries
            .entry(PoolName::from(pool))
            .or_insert_with(|| CacheEntry {
                topology: Topology::absent(),
                valid: false,
            });
        entry.topology = topology;
        entry.valid = true;
        &entry.topology
    }

    pub fn invalidate(&mut self, pool: &str) {
        if let Some(entry) = self.entries.get_mut(pool) {
            entry.valid = false;
        }
    }

    pub fn invalidate_all(&mut self) {
        for entry in self.entries.values_mut() {
            entry.valid = false;
        }
    }

    pub fn is_valid(&self, pool: &str) -> bool {
        self.entries.get(pool).is_some_and(|e| e.valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_then_get() {
        let mut cache = TopologyCache::new();
        assert!(cache.get("tank").is_none());
        cache.store("tank", Topology::named("tank"));
        assert!(cache.is_valid("tank"));
        assert_eq!(cache.get("tank").unwrap().pool.as_ref().unwrap(), "tank");
        assert!(cache.get("other").is_none());
    }

    #[test]
    fn absent_topology_is_cached_too() {
        let mut cache = TopologyCache::new();
        cache.store("gone", Topology::absent());
        assert!(cache.get("gone").unwrap().is_absent());
    }

    #[test]
    fn invalidate_hides_entry_until_stored_again() {
        let mut cache = TopologyCache::new();
        cache.store("tank", Topology::named("tank"));
        cache.store("data", Topology::named("data"));

        cache.invalidate("tank");
        assert!(cache.get("tank").is_none());
        assert!(cache.is_valid("data"));

        cache.store("tank", Topology::absent());
        assert!(cache.get("tank").unwrap().is_absent());

        cache.invalidate_all();
        assert!(!cache.is_valid("tank"));
        assert!(!cache.is_valid("data"));
    }
}
