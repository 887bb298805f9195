//! File-backed webhook state store.
//!
//! The slot is a JSON document inside a capability directory. Saves write a
//! temporary sibling file and rename it over the slot, so a crash leaves
//! either the old or the new document and never a torn one.

use crate::contract::domain::{ValidationError, ValidationErrorKind};
use crate::webhook::domain::{WEBHOOK_STATE_SLOT, WebhookRegistrationState};
use crate::webhook::ports::{WebhookStateStore, WebhookStateStoreError, WebhookStateStoreResult};
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::io::Write;
use std::sync::Arc;
use tracing::debug;

/// Webhook state slot persisted as `webhookState.json` in a directory.
#[derive(Debug, Clone)]
pub struct FileWebhookStateStore {
    dir: Arc<Dir>,
    file_name: Utf8PathBuf,
}

impl FileWebhookStateStore {
    /// Opens the store in an existing directory.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookStateStoreError::Persistence`] when the directory
    /// cannot be opened.
    pub fn open(directory: &Utf8Path) -> WebhookStateStoreResult<Self> {
        let dir = Dir::open_ambient_dir(directory, ambient_authority())
            .map_err(WebhookStateStoreError::persistence)?;
        Ok(Self::from_dir(dir))
    }

    /// Uses an already opened capability directory.
    #[must_use]
    pub fn from_dir(dir: Dir) -> Self {
        Self {
            dir: Arc::new(dir),
            file_name: Utf8PathBuf::from(format!("{WEBHOOK_STATE_SLOT}.json")),
        }
    }

    /// Returns the slot file name relative to the directory.
    #[must_use]
    pub fn file_name(&self) -> &Utf8Path {
        &self.file_name
    }

    fn temporary_name(&self) -> Utf8PathBuf {
        self.file_name.with_extension("json.tmp")
    }
}

fn read_slot(
    dir: &Dir,
    file_name: &Utf8Path,
) -> WebhookStateStoreResult<WebhookRegistrationState> {
    let contents = match dir.read_to_string(file_name) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(WebhookRegistrationState::Unregistered);
        }
        Err(err) => return Err(WebhookStateStoreError::persistence(err)),
    };
    let document = serde_json::from_str(&contents).map_err(|err| {
        ValidationError::at_root(ValidationErrorKind::Undecodable(err.to_string()))
    })?;
    Ok(WebhookRegistrationState::from_document(&document)?)
}

fn write_slot(
    dir: &Dir,
    temporary: &Utf8Path,
    file_name: &Utf8Path,
    contents: &[u8],
) -> std::io::Result<()> {
    let mut file = dir.create(temporary)?;
    file.write_all(contents)?;
    file.sync_all()?;
    dir.rename(temporary, dir, file_name)?;
    sync_directory(dir)
}

/// Flushes the directory entry so a completed rename survives power loss.
#[cfg(unix)]
fn sync_directory(dir: &Dir) -> std::io::Result<()> {
    dir.open(".")?.sync_all()
}

#[cfg(not(unix))]
const fn sync_directory(_dir: &Dir) -> std::io::Result<()> {
    Ok(())
}

#[async_trait]
impl WebhookStateStore for FileWebhookStateStore {
    async fn load(&self) -> WebhookStateStoreResult<WebhookRegistrationState> {
        let dir = Arc::clone(&self.dir);
        let file_name = self.file_name.clone();
        tokio::task::spawn_blocking(move || read_slot(&dir, &file_name))
            .await
            .map_err(WebhookStateStoreError::persistence)?
    }

    async fn save(&self, registration: &WebhookRegistrationState) -> WebhookStateStoreResult<()> {
        let contents = serde_json::to_vec_pretty(&registration.to_document())
            .map_err(WebhookStateStoreError::persistence)?;
        let dir = Arc::clone(&self.dir);
        let temporary = self.temporary_name();
        let file_name = self.file_name.clone();
        tokio::task::spawn_blocking(move || write_slot(&dir, &temporary, &file_name, &contents))
            .await
            .map_err(WebhookStateStoreError::persistence)?
            .map_err(WebhookStateStoreError::persistence)?;
        debug!(state = %registration, file = %self.file_name, "webhook state saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::domain::TrelloId;
    use rstest::{fixture, rstest};
    use serde_json::{Value, json};
    use tempfile::TempDir;

    const WEBHOOK: &str = "5a4b3c2d1e0f5a4b3c2d1e0f";

    #[fixture]
    fn temp_dir() -> TempDir {
        tempfile::tempdir().expect("temporary directory")
    }

    fn open_store(temp_dir: &TempDir) -> FileWebhookStateStore {
        let path = Utf8Path::from_path(temp_dir.path()).expect("UTF-8 temporary path");
        FileWebhookStateStore::open(path).expect("store should open")
    }

    fn slot_contents(temp_dir: &TempDir) -> Value {
        let raw = std::fs::read_to_string(temp_dir.path().join("webhookState.json"))
            .expect("slot file");
        serde_json::from_str(&raw).expect("slot JSON")
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn missing_file_loads_as_unregistered(temp_dir: TempDir) {
        let store = open_store(&temp_dir);

        let state = store.load().await.expect("load should succeed");

        assert_eq!(state, WebhookRegistrationState::Unregistered);
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn saved_state_survives_reopening(temp_dir: TempDir) {
        let webhook_id = TrelloId::new(WEBHOOK).expect("valid id");
        open_store(&temp_dir)
            .save(&WebhookRegistrationState::Registered(webhook_id.clone()))
            .await
            .expect("save should succeed");

        let reopened = open_store(&temp_dir);

        assert_eq!(
            reopened.load().await.expect("load should succeed"),
            WebhookRegistrationState::Registered(webhook_id)
        );
        assert_eq!(slot_contents(&temp_dir), json!({ "trelloWebhookId": WEBHOOK }));
        assert!(!temp_dir.path().join("webhookState.json.tmp").exists());
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn unregistering_overwrites_the_slot(temp_dir: TempDir) {
        let store = open_store(&temp_dir);
        let webhook_id = TrelloId::new(WEBHOOK).expect("valid id");
        store
            .save(&WebhookRegistrationState::Registered(webhook_id))
            .await
            .expect("first save");

        store
            .save(&WebhookRegistrationState::Unregistered)
            .await
            .expect("second save");

        assert_eq!(slot_contents(&temp_dir), json!({ "trelloWebhookId": null }));
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn repeated_saves_leave_only_the_slot_file(temp_dir: TempDir) {
        let store = open_store(&temp_dir);
        let webhook_id = TrelloId::new(WEBHOOK).expect("valid id");
        for state in [
            WebhookRegistrationState::Registered(webhook_id),
            WebhookRegistrationState::Unregistered,
        ] {
            store.save(&state).await.expect("save should succeed");
        }

        let entries: Vec<String> = std::fs::read_dir(temp_dir.path())
            .expect("list directory")
            .map(|entry| {
                entry
                    .expect("directory entry")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();

        assert_eq!(entries, vec!["webhookState.json".to_owned()]);
        assert!(sync_directory(&store.dir).is_ok());
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn unparseable_slot_is_invalid_data(temp_dir: TempDir) {
        std::fs::write(temp_dir.path().join("webhookState.json"), "{not json")
            .expect("write corrupt slot");
        let store = open_store(&temp_dir);

        let error = store.load().await.expect_err("load should fail");

        assert!(matches!(error, WebhookStateStoreError::InvalidPersistedData(_)));
    }
}
