//! In-memory registry of known bridges.

use crate::types::BridgeRecord;

/// Known bridges, at most one per identity.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    records: Vec<BridgeRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing any existing record with the same identity.
    ///
    /// Returns the record that was replaced, if any.
    pub fn upsert(&mut self, record: BridgeRecord) -> Option<BridgeRecord> {
        match self
            .records
            .iter_mut()
            .find(|existing| existing.identity() == record.identity())
        {
            Some(existing) => Some(std::mem::replace(existing, record)),
            None => {
                self.records.push(record);
                None
            }
        }
    }

    /// Find a bridge by identity.
    pub fn lookup(&self, identity: &str) -> Option<&BridgeRecord> {
        self.records.iter().find(|r| r.identity() == identity)
    }

    pub fn records(&self) -> &[BridgeRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<BridgeRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
