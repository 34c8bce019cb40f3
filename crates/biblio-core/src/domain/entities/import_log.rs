//! Audit record for one CSV import batch.
//!
//! A log is opened in `processing` when the batch starts and finalized once,
//! either with the batch totals or with a fatal error message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    error::DomainError,
    value_objects::{DataKind, ImportState},
};

use super::common::ImportLogId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportLog {
    pub id: ImportLogId,
    pub batch: Uuid,
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub actor: String,
    pub kind: DataKind,
    pub file_name: Option<String>,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub state: ImportState,
    pub errors: String,
    pub created_ids: Vec<u64>,
}

impl ImportLog {
    /// Open a log for a batch that is about to run.
    pub fn start(
        id: ImportLogId,
        kind: DataKind,
        actor: impl Into<String>,
        file_name: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            batch: Uuid::new_v4(),
            name: format!("Import {} - {}", kind.label(), now.format("%Y-%m-%d %H:%M:%S")),
            timestamp: now,
            actor: actor.into(),
            kind,
            file_name,
            processed: 0,
            succeeded: 0,
            failed: 0,
            state: ImportState::Processing,
            errors: String::new(),
            created_ids: Vec::new(),
        }
    }

    /// Record the batch totals. `failed` is always `processed - succeeded`.
    pub fn finalize(
        &mut self,
        processed: usize,
        succeeded: usize,
        errors: &[String],
        created_ids: Vec<u64>,
    ) -> Result<(), DomainError> {
        self.ensure_processing()?;
        let succeeded = succeeded.min(processed);
        self.processed = processed;
        self.succeeded = succeeded;
        self.failed = processed - succeeded;
        self.errors = errors.join("\n");
        self.created_ids = created_ids;
        self.state = ImportState::from_totals(self.succeeded, self.failed);
        Ok(())
    }

    /// Mark the whole batch as failed before any row was processed.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), DomainError> {
        self.ensure_processing()?;
        self.errors = message.into();
        self.state = ImportState::Error;
        Ok(())
    }

    pub fn success_rate(&self) -> f64 {
        if self.processed == 0 {
            return 0.0;
        }
        self.succeeded as f64 / self.processed as f64 * 100.0
    }

    /// Created record ids joined with commas.
    pub fn created_ids_text(&self) -> String {
        self.created_ids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    fn ensure_processing(&self) -> Result<(), DomainError> {
        if self.state != ImportState::Processing {
            return Err(DomainError::ImportAlreadyFinalized { log: self.id.get() });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log() -> ImportLog {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        ImportLog::start(ImportLogId::new(1), DataKind::Book, "admin", None, now)
    }

    #[test]
    fn name_includes_kind_and_timestamp() {
        assert_eq!(log().name, "Import Books - 2023-11-14 22:13:20");
        assert_eq!(log().state, ImportState::Processing);
    }

    #[test]
    fn totals_always_add_up() {
        let mut l = log();
        l.finalize(10, 7, &["Line 2: x".into()], vec![1, 2]).unwrap();
        assert_eq!(l.succeeded + l.failed, l.processed);
        assert_eq!(l.failed, 3);
        assert_eq!(l.state, ImportState::CompletedWithErrors);
        assert_eq!(l.created_ids_text(), "1,2");
        assert!((l.success_rate() - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn state_follows_outcome() {
        let mut ok = log();
        ok.finalize(3, 3, &[], vec![]).unwrap();
        assert_eq!(ok.state, ImportState::Completed);

        let mut bad = log();
        bad.finalize(3, 0, &[], vec![]).unwrap();
        assert_eq!(bad.state, ImportState::Error);
    }

    #[test]
    fn finalized_only_once() {
        let mut l = log();
        l.finalize(1, 1, &[], vec![]).unwrap();
        assert!(l.finalize(1, 1, &[], vec![]).is_err());
        assert!(l.fail("boom").is_err());
    }
}
