use super::InstanceRecord;
use dashmap::DashMap;
use std::sync::Arc;

/// Team id → instance record. Entries are never removed; a destroyed team's
/// record stays so the next create reuses it.
#[derive(Debug, Default)]
pub struct InstanceRegistry {
    records: DashMap<String, Arc<InstanceRecord>>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the record for `team_id`, inserting the one built by `factory`
    /// if there is none. Concurrent callers racing on a new key all get the
    /// same record; `factory` runs at most once per key.
    pub fn get_or_create<F>(&self, team_id: &str, factory: F) -> Arc<InstanceRecord>
    where
        F: FnOnce() -> InstanceRecord,
    {
        if let Some(record) = self.records.get(team_id) {
            return record.value().clone();
        }
        // only the shard is locked, and only for the insert
        self.records
            .entry(team_id.to_string())
            .or_insert_with(|| Arc::new(factory()))
            .value()
            .clone()
    }

    pub fn get(&self, team_id: &str) -> Option<Arc<InstanceRecord>> {
        self.records.get(team_id).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records, in no particular order
    pub fn records(&self) -> Vec<Arc<InstanceRecord>> {
        self.records.iter().map(|r| r.value().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_get_or_create_inserts_once() {
        let registry = InstanceRegistry::new();
        let a = registry.get_or_create("T-100", || InstanceRecord::new("T-100", "ns-a"));
        let b = registry.get_or_create("T-100", || InstanceRecord::new("T-100", "ns-b"));

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(b.resource_name(), "ns-a");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_does_not_insert() {
        let registry = InstanceRegistry::new();
        assert!(registry.get("T-100").is_none());
        assert!(registry.is_empty());

        registry.get_or_create("T-100", || InstanceRecord::new("T-100", "ns"));
        assert!(registry.get("T-100").is_some());
        assert!(registry.get("T-200").is_none());
    }

    #[test]
    fn test_concurrent_inserts_share_one_record() {
        let registry = Arc::new(InstanceRegistry::new());
        let built = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let registry = registry.clone();
                let built = built.clone();
                std::thread::spawn(move || {
                    registry.get_or_create("T-100", || {
                        built.fetch_add(1, Ordering::SeqCst);
                        InstanceRecord::new("T-100", "ns")
                    })
                })
            })
            .collect();

        let records: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(built.load(Ordering::SeqCst), 1);
        assert!(records.iter().all(|r| Arc::ptr_eq(r, &records[0])));
        assert_eq!(registry.len(), 1);
    }
}
