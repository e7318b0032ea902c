//! Upload session state.
//!
//! The ingestion and aggregation core is pure; the one piece of state in the
//! system is "which dataset is currently loaded". A [`Session`] holds at most
//! one dataset and replaces it wholesale on each successful upload. A failed
//! upload leaves the previous dataset untouched.

use tracing::info;

use chartbook_model::Dataset;

use crate::dataset::{IngestOptions, ingest_bytes};
use crate::error::Result;

#[derive(Debug, Default)]
pub struct Session {
    dataset: Option<Dataset>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingests `bytes` and replaces the held dataset with the result.
    pub fn upload(&mut self, bytes: &[u8], options: &IngestOptions) -> Result<&Dataset> {
        let dataset = ingest_bytes(bytes, options)?;
        info!(
            fingerprint = %dataset.fingerprint(),
            rows = dataset.row_count(),
            replaced = self.dataset.is_some(),
            "session dataset replaced"
        );
        Ok(self.dataset.insert(dataset))
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    /// Discards the held dataset, if any.
    pub fn clear(&mut self) {
        self.dataset = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_replaces_wholesale() {
        let mut session = Session::new();
        assert!(session.dataset().is_none());

        session
            .upload(b"region,sales\nEast,10\n", &IngestOptions::default())
            .unwrap();
        let first = session.dataset().unwrap().fingerprint().to_string();

        session
            .upload(b"region,sales\nWest,20\n", &IngestOptions::default())
            .unwrap();
        let second = session.dataset().unwrap().fingerprint().to_string();
        assert_ne!(first, second);
        assert_eq!(session.dataset().unwrap().row_count(), 1);
    }

    #[test]
    fn failed_upload_keeps_previous_dataset() {
        let mut session = Session::new();
        session
            .upload(b"region,sales\nEast,10\n", &IngestOptions::default())
            .unwrap();
        let err = session.upload(b"region,sales\n", &IngestOptions::default());
        assert!(err.is_err());
        assert_eq!(session.dataset().unwrap().row_count(), 1);
    }

    #[test]
    fn clear_discards() {
        let mut session = Session::new();
        session
            .upload(b"a\n1\n", &IngestOptions::default())
            .unwrap();
        session.clear();
        assert!(session.dataset().is_none());
    }
}
