//! In-memory audit sink.

use std::sync::{Arc, Mutex};

use gitlab_policy::{AuditLogger, AuditRecord, AuditSink};

/// Collects every audit record written through it.
#[derive(Debug, Default)]
pub struct RecordingAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl RecordingAuditSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Logger that writes into this sink.
    pub fn logger(self: &Arc<Self>) -> AuditLogger {
        AuditLogger::new(self.clone())
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn reasons(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.reason).collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for RecordingAuditSink {
    fn write(&self, record: &AuditRecord) {
        self.records.lock().unwrap().push(record.clone());
    }
}
