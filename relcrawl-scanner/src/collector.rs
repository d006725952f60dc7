use crate::record::MetadataRecord;
use std::sync::{Mutex, PoisonError};

/// Append-only list of records in completion order.
#[derive(Debug, Default)]
pub struct ResultCollector {
    records: Mutex<Vec<MetadataRecord>>,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, record: MetadataRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }

    /// Takes every record collected so far. Call once the crawl has joined;
    /// nothing appends after that point.
    pub fn drain(&self) -> Vec<MetadataRecord> {
        std::mem::take(&mut *self.records.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceId;

    #[test]
    fn test_drain_preserves_append_order() {
        let collector = ResultCollector::new();
        for name in ["first", "second", "third"] {
            collector.append(MetadataRecord::new(ResourceId::new(name), name));
        }

        let titles: Vec<String> = collector.drain().into_iter().map(|r| r.title).collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
        assert!(collector.drain().is_empty());
    }
}
