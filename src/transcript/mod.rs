//! Transcript storage for GemChat
//!
//! Sessions are stored one JSON file per session (`{id}.json`) in a
//! configurable directory. Files that do not match the naming pattern
//! are ignored; files that match but fail to parse are skipped during
//! listing (logged, never fatal) and surface a distinct storage error
//! on explicit load.

use crate::error::{GemChatError, Result};
use crate::providers::Message;
use anyhow::Context;
use chrono::Local;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

pub mod types;
pub use types::{SessionRecord, SessionSummary};

/// File extension for session files
const SESSION_EXT: &str = "json";

/// Process-wide counter disambiguating ids synthesized within the same
/// second
static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Storage backend for chat transcripts
pub struct TranscriptStore {
    dir: PathBuf,
}

impl TranscriptStore {
    /// Create a new store instance
    ///
    /// Uses the directory from `GEMCHAT_HISTORY_DIR` when set, otherwise
    /// a `sessions` directory under the user's data directory. The
    /// directory is created on demand.
    pub fn new() -> Result<Self> {
        if let Ok(override_dir) = std::env::var("GEMCHAT_HISTORY_DIR") {
            if !override_dir.is_empty() {
                return Self::new_with_dir(override_dir);
            }
        }

        let proj_dirs = ProjectDirs::from("com", "xbcsmith", "gemchat")
            .ok_or_else(|| GemChatError::Storage("Could not determine data directory".into()))?;

        Self::new_with_dir(proj_dirs.data_dir().join("sessions"))
    }

    /// Create a new store instance rooted at the specified directory
    ///
    /// This is primarily useful for tests where the default application
    /// data directory is not desirable (for example, using a temporary
    /// directory).
    ///
    /// # Examples
    ///
    /// ```
    /// use gemchat::transcript::TranscriptStore;
    ///
    /// let store = TranscriptStore::new_with_dir("/tmp/gemchat_sessions").unwrap();
    /// ```
    pub fn new_with_dir<P: Into<PathBuf>>(dir: P) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .context("Failed to create session directory")
            .map_err(|e| GemChatError::Storage(e.to_string()))?;
        Ok(Self { dir })
    }

    /// Directory this store reads and writes
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the session file for an id
    fn session_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", id, SESSION_EXT))
    }

    /// Whether a session file exists for this id
    pub fn session_exists(&self, id: &str) -> bool {
        self.session_path(id).is_file()
    }

    /// Current human-readable timestamp
    fn timestamp_now() -> String {
        Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Synthesize a session id from the current time
    ///
    /// A second-granularity stamp alone collides under rapid consecutive
    /// saves, so a process-wide monotonic counter suffix keeps ids
    /// distinct.
    fn synthesize_id() -> String {
        let stamp = Local::now().format("%Y%m%d-%H%M%S");
        let seq = ID_COUNTER.fetch_add(1, Ordering::Relaxed) % 10_000;
        format!("{}-{:04}", stamp, seq)
    }

    /// List all stored sessions, newest first
    ///
    /// Files without the session extension are ignored. A matching file
    /// whose content fails to parse is skipped with a warning; one bad
    /// file never fails the whole listing.
    pub fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(&self.dir)
            .context("Failed to read session directory")
            .map_err(|e| GemChatError::Storage(e.to_string()))?;

        let mut sessions = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SESSION_EXT) {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            match read_record(&path) {
                Ok(record) => sessions.push(SessionSummary {
                    id: id.to_string(),
                    title: record.title,
                    timestamp: record.timestamp,
                    message_count: record.messages.len(),
                }),
                Err(e) => {
                    // Best-effort listing: skip and continue
                    tracing::warn!("Skipping unreadable session file {}: {}", path.display(), e);
                }
            }
        }

        // Both the timestamp format and synthesized ids sort
        // chronologically as strings
        sessions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(sessions)
    }

    /// Save or overwrite a session
    ///
    /// When `id` is omitted an id is synthesized from the current time.
    /// The written timestamp always reflects this save.
    ///
    /// # Returns
    ///
    /// The id the session was stored under
    pub fn save_session(
        &self,
        messages: &[Message],
        title: &str,
        id: Option<&str>,
    ) -> Result<String> {
        std::fs::create_dir_all(&self.dir)
            .context("Failed to create session directory")
            .map_err(|e| GemChatError::Storage(e.to_string()))?;

        let id = id.map(str::to_string).unwrap_or_else(Self::synthesize_id);
        let record = SessionRecord {
            title: title.to_string(),
            timestamp: Self::timestamp_now(),
            messages: messages.to_vec(),
        };

        write_record(&self.session_path(&id), &record)?;
        tracing::debug!("Saved session {} ({} messages)", id, record.messages.len());
        Ok(id)
    }

    /// Load a session by id
    ///
    /// An id with no session file yields the default record (`title`
    /// "Chat", empty timestamp, no messages) rather than an error. An
    /// existing file that cannot be read or parsed surfaces a storage
    /// error, distinct from "not found".
    pub fn load_session(&self, id: &str) -> Result<SessionRecord> {
        let path = self.session_path(id);
        if !path.is_file() {
            return Ok(SessionRecord::default());
        }
        read_record(&path)
    }

    /// Delete a session
    ///
    /// # Returns
    ///
    /// `true` if a session file was removed, `false` when it was already
    /// absent (not an error)
    pub fn delete_session(&self, id: &str) -> Result<bool> {
        let path = self.session_path(id);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("Deleted session {}", id);
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(GemChatError::Storage(format!(
                "Failed to delete session {}: {}",
                id, e
            ))
            .into()),
        }
    }

    /// Rename a session, refreshing its timestamp
    ///
    /// Messages are preserved unchanged. Existence is checked explicitly
    /// so a missing session is reported as `false` rather than silently
    /// materializing from the load default.
    pub fn rename_session(&self, id: &str, new_title: &str) -> Result<bool> {
        if !self.session_exists(id) {
            return Ok(false);
        }

        let record = self.load_session(id)?;
        self.save_session(&record.messages, new_title, Some(id))?;
        Ok(true)
    }

    /// Parse an uploaded transcript document
    ///
    /// The document must be a JSON object with a `messages` array of
    /// `{role, content}` turns. Anything else is rejected with a
    /// descriptive error and no state change.
    pub fn parse_upload(json: &str) -> Result<Vec<Message>> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| GemChatError::Upload(format!("invalid JSON: {}", e)))?;

        let messages = value
            .get("messages")
            .ok_or_else(|| GemChatError::Upload("missing 'messages' field".to_string()))?;

        serde_json::from_value(messages.clone())
            .map_err(|e| GemChatError::Upload(format!("invalid 'messages' entries: {}", e)).into())
    }

    /// Import an uploaded transcript document as a new session
    ///
    /// # Returns
    ///
    /// The id of the newly saved session
    pub fn import_session(&self, json: &str, title: &str) -> Result<String> {
        let messages = Self::parse_upload(json)?;
        self.save_session(&messages, title, None)
    }
}

/// Read and parse a session file
fn read_record(path: &Path) -> Result<SessionRecord> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        GemChatError::Storage(format!("Failed to read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&contents)
        .map_err(|e| {
            GemChatError::Storage(format!("Failed to parse {}: {}", path.display(), e)).into()
        })
}

/// Write a session file as human-indented UTF-8 JSON
fn write_record(path: &Path, record: &SessionRecord) -> Result<()> {
    let mut json = serde_json::to_string_pretty(record)
        .context("Failed to serialize session")
        .map_err(|e| GemChatError::Storage(e.to_string()))?;
    json.push('\n');
    std::fs::write(path, json).map_err(|e| {
        GemChatError::Storage(format!("Failed to write {}: {}", path.display(), e)).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashSet;
    use tempfile::tempdir;

    /// Helper: create a temporary store backed by a temp directory.
    ///
    /// Returns both the store and the `TempDir` so the caller keeps
    /// ownership of the directory (preventing it from being removed).
    fn create_test_store() -> (TranscriptStore, tempfile::TempDir) {
        let dir = tempdir().expect("failed to create tempdir");
        let store =
            TranscriptStore::new_with_dir(dir.path().join("sessions")).expect("failed to create store");
        (store, dir)
    }

    fn sample_messages() -> Vec<Message> {
        vec![
            Message::user("Hello"),
            Message::assistant("Hi! How can I help?"),
        ]
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let (store, _dir) = create_test_store();

        let id = store
            .save_session(&sample_messages(), "Greetings", None)
            .expect("save failed");
        let record = store.load_session(&id).expect("load failed");

        assert_eq!(record.title, "Greetings");
        assert_eq!(record.messages, sample_messages());
        assert!(!record.timestamp.is_empty());
    }

    #[test]
    fn test_save_with_explicit_id_overwrites() {
        let (store, _dir) = create_test_store();

        store
            .save_session(&sample_messages(), "First", Some("fixed-id"))
            .expect("save failed");
        store
            .save_session(&[Message::user("only")], "Second", Some("fixed-id"))
            .expect("overwrite failed");

        let record = store.load_session("fixed-id").expect("load failed");
        assert_eq!(record.title, "Second");
        assert_eq!(record.messages.len(), 1);
    }

    #[test]
    fn test_synthesized_ids_are_distinct_within_a_second() {
        let (store, _dir) = create_test_store();

        let mut ids = HashSet::new();
        for _ in 0..20 {
            let id = store
                .save_session(&sample_messages(), "Burst", None)
                .expect("save failed");
            ids.insert(id);
        }
        assert_eq!(ids.len(), 20);
    }

    #[test]
    fn test_load_missing_id_returns_default_record() {
        let (store, _dir) = create_test_store();

        let record = store.load_session("does-not-exist").expect("load failed");
        assert_eq!(record.title, "Chat");
        assert!(record.timestamp.is_empty());
        assert!(record.messages.is_empty());
    }

    #[test]
    fn test_load_corrupt_file_surfaces_error() {
        let (store, _dir) = create_test_store();

        std::fs::write(store.dir().join("bad.json"), "{not json").unwrap();
        let result = store.load_session("bad");
        assert!(result.is_err());
    }

    #[test]
    fn test_list_sessions_skips_corrupt_files() {
        let (store, _dir) = create_test_store();

        let id = store
            .save_session(&sample_messages(), "Valid", None)
            .expect("save failed");
        std::fs::write(store.dir().join("corrupt.json"), "{{{{").unwrap();

        let sessions = store.list_sessions().expect("list failed");
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, id);
        assert_eq!(sessions[0].title, "Valid");
        assert_eq!(sessions[0].message_count, 2);
    }

    #[test]
    fn test_list_sessions_ignores_non_session_files() {
        let (store, _dir) = create_test_store();

        std::fs::write(store.dir().join("notes.txt"), "not a session").unwrap();
        std::fs::write(store.dir().join("README"), "also not").unwrap();

        let sessions = store.list_sessions().expect("list failed");
        assert!(sessions.is_empty());
    }

    #[test]
    fn test_list_sessions_empty_store() {
        let (store, _dir) = create_test_store();
        assert!(store.list_sessions().expect("list failed").is_empty());
    }

    #[test]
    fn test_delete_session_idempotent() {
        let (store, _dir) = create_test_store();

        let id = store
            .save_session(&sample_messages(), "To delete", None)
            .expect("save failed");

        assert!(store.delete_session(&id).expect("first delete failed"));
        assert!(!store.delete_session(&id).expect("second delete failed"));
        assert!(!store.session_exists(&id));
    }

    #[test]
    fn test_rename_session_changes_only_title_and_timestamp() {
        let (store, _dir) = create_test_store();

        let id = store
            .save_session(&sample_messages(), "Old title", None)
            .expect("save failed");

        let renamed = store
            .rename_session(&id, "New title")
            .expect("rename failed");
        assert!(renamed);

        let record = store.load_session(&id).expect("load failed");
        assert_eq!(record.title, "New title");
        assert_eq!(record.messages, sample_messages());
        assert!(!record.timestamp.is_empty());
    }

    #[test]
    fn test_rename_missing_session_returns_false() {
        let (store, _dir) = create_test_store();

        let renamed = store
            .rename_session("ghost", "Anything")
            .expect("rename failed");
        assert!(!renamed);
        // The rename default must not materialize a file
        assert!(!store.session_exists("ghost"));
    }

    #[test]
    fn test_parse_upload_accepts_valid_document() {
        let json = r#"{"messages": [{"role": "user", "content": "hi"}]}"#;
        let messages = TranscriptStore::parse_upload(json).expect("parse failed");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "user");
    }

    #[test]
    fn test_parse_upload_rejects_missing_messages_key() {
        let json = r#"{"title": "no messages here"}"#;
        let err = TranscriptStore::parse_upload(json).unwrap_err();
        assert!(err.to_string().contains("messages"));
    }

    #[test]
    fn test_parse_upload_rejects_invalid_json() {
        assert!(TranscriptStore::parse_upload("{{{").is_err());
    }

    #[test]
    fn test_import_session_rejection_leaves_store_unchanged() {
        let (store, _dir) = create_test_store();

        let result = store.import_session(r#"{"title": "x"}"#, "Imported");
        assert!(result.is_err());
        assert!(store.list_sessions().expect("list failed").is_empty());
    }

    #[test]
    fn test_import_session_persists_messages() {
        let (store, _dir) = create_test_store();

        let json = r#"{"messages": [{"role": "user", "content": "from upload"}]}"#;
        let id = store.import_session(json, "Imported").expect("import failed");

        let record = store.load_session(&id).expect("load failed");
        assert_eq!(record.title, "Imported");
        assert_eq!(record.messages[0].content, "from upload");
    }

    #[test]
    fn test_session_file_is_pretty_printed_utf8() {
        let (store, _dir) = create_test_store();

        let id = store
            .save_session(&[Message::user("héllo wörld")], "Unicode", None)
            .expect("save failed");

        let raw = std::fs::read_to_string(store.dir().join(format!("{}.json", id))).unwrap();
        // Human-indented, with non-ASCII written verbatim
        assert!(raw.contains("\n  "));
        assert!(raw.contains("héllo wörld"));
    }

    #[test]
    #[serial]
    fn test_new_respects_env_override() {
        let dir = tempdir().expect("failed to create tempdir");
        let sessions_dir = dir.path().join("nested").join("sessions");
        std::env::set_var("GEMCHAT_HISTORY_DIR", sessions_dir.to_string_lossy().to_string());

        let store = TranscriptStore::new().expect("new failed with env override");
        assert_eq!(store.dir(), sessions_dir.as_path());
        assert!(sessions_dir.exists());

        std::env::remove_var("GEMCHAT_HISTORY_DIR");
    }
}
