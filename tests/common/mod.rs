//! Shared helpers for integration tests

use gemchat::transcript::TranscriptStore;
use tempfile::TempDir;

/// Create a transcript store backed by a temporary directory.
///
/// Returns the `TempDir` alongside the store so the caller keeps the
/// directory alive for the duration of the test.
pub fn create_temp_store() -> (TranscriptStore, TempDir) {
    let tmp = TempDir::new().expect("create tempdir");
    let store = TranscriptStore::new_with_dir(tmp.path().join("sessions")).expect("create store");
    (store, tmp)
}
