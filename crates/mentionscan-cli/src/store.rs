//! JSON-file snapshot store for the CLI.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use mentionscan_search::snapshot::{MentionSnapshot, MentionSnapshotStore, SnapshotError};

/// Writes each snapshot as `<dir>/<snapshot-id>.json`.
pub struct JsonFileSnapshotStore {
    dir: PathBuf,
}

impl JsonFileSnapshotStore {
    pub fn new(dir: PathBuf) -> Arc<Self> {
        Arc::new(Self { dir })
    }
}

#[async_trait]
impl MentionSnapshotStore for JsonFileSnapshotStore {
    async fn save(&self, snapshot: &MentionSnapshot) -> Result<(), SnapshotError> {
        let body = serde_json::to_vec_pretty(snapshot)?;
        let path = self.dir.join(format!("{}.json", snapshot.id));
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, body).await?;
        tracing::info!(path = %path.display(), "snapshot written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;
    use mentionscan_core::{FilterSpec, Platform};
    use uuid::Uuid;

    use super::*;

    #[tokio::test]
    async fn writes_snapshot_file_named_after_its_id() {
        let dir = std::env::temp_dir().join(format!("mentionscan-test-{}", Uuid::new_v4()));
        let store = JsonFileSnapshotStore::new(dir.clone());
        let snapshot = MentionSnapshot {
            id: Uuid::new_v4(),
            fingerprint: "00".repeat(32),
            keywords: vec!["rust".to_owned()],
            platforms: vec![Platform::Reddit],
            filters: FilterSpec::default(),
            mentions: vec![],
            platform_counts: BTreeMap::new(),
            partial_failure: false,
            captured_at: Utc::now(),
        };

        store.save(&snapshot).await.unwrap();

        let path = dir.join(format!("{}.json", snapshot.id));
        let body = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(body.contains("\"keywords\""));
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
