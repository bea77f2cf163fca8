//! Implements the ReleaseStore trait over a directory of JSON documents
use async_trait::async_trait;
use log::*;
use serde::Serialize;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::{fs, sync::Mutex};

use crate::{
    error::{RelnotesError, Result},
    release::Release,
    settings::Settings,
    store::traits::ReleaseStore,
};

const RELEASES_DIR: &str = "releases";
const SETTINGS_DIR: &str = "settings";

/// Stores each record as `{root}/{collection}/{id}.json`. Writes go through a
/// temp file and a rename so readers never observe half-written documents.
pub struct FileStore {
    root: PathBuf,
    // serializes create/update so the project+version check and the write
    // happen together
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(root.join(RELEASES_DIR)).await?;
        fs::create_dir_all(root.join(SETTINGS_DIR)).await?;

        debug!("opened document store at {}", root.display());

        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    fn document_path(&self, collection: &str, id: &str) -> Result<PathBuf> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if !valid {
            return Err(RelnotesError::invalid_input(format!(
                "invalid document id: {id}"
            )));
        }

        Ok(self.root.join(collection).join(format!("{id}.json")))
    }

    async fn read_release(&self, id: &str) -> Result<Release> {
        let path = self.document_path(RELEASES_DIR, id)?;
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(RelnotesError::not_found(format!("release {id}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(value)?;
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, content).await?;
        fs::rename(&tmp_path, path).await?;
        Ok(())
    }

    async fn read_all_releases(&self) -> Result<Vec<Release>> {
        let mut releases = vec![];
        let mut entries = fs::read_dir(self.root.join(RELEASES_DIR)).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();

            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let content = match fs::read_to_string(&path).await {
                Ok(content) => content,
                // deleted since read_dir listed it
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            match serde_json::from_str::<Release>(&content) {
                Ok(release) => releases.push(release),
                Err(e) => {
                    warn!("skipping unreadable release document {}: {e}", path.display())
                }
            }
        }

        Ok(releases)
    }
}

#[async_trait]
impl ReleaseStore for FileStore {
    async fn create(&self, release: Release) -> Result<Release> {
        let _guard = self.write_lock.lock().await;

        let path = self.document_path(RELEASES_DIR, &release.id)?;

        if fs::try_exists(&path).await? {
            return Err(RelnotesError::Conflict(format!(
                "release id {} already exists",
                release.id
            )));
        }

        let existing = self.read_all_releases().await?;
        if let Some(other) = existing
            .iter()
            .find(|r| r.same_identity(&release.project, &release.version))
        {
            return Err(RelnotesError::Conflict(format!(
                "release {} {} already exists with id {}",
                release.project, release.version, other.id
            )));
        }

        self.write_json(&path, &release).await?;
        info!("created release {} ({} {})", release.id, release.project, release.version);

        Ok(release)
    }

    async fn update(&self, release: Release) -> Result<Release> {
        let _guard = self.write_lock.lock().await;

        // fails with NotFound for unknown ids
        self.read_release(&release.id).await?;

        let existing = self.read_all_releases().await?;
        if let Some(other) = existing.iter().find(|r| {
            r.id != release.id
                && r.same_identity(&release.project, &release.version)
        }) {
            return Err(RelnotesError::Conflict(format!(
                "release {} {} already exists with id {}",
                release.project, release.version, other.id
            )));
        }

        let path = self.document_path(RELEASES_DIR, &release.id)?;
        self.write_json(&path, &release).await?;
        debug!("updated release {}", release.id);

        Ok(release)
    }

    async fn get(&self, id: &str) -> Result<Release> {
        self.read_release(id).await
    }

    async fn list(&self) -> Result<Vec<Release>> {
        let mut releases = self.read_all_releases().await?;
        releases.sort_by(|a, b| {
            b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id))
        });
        debug!("listed {} releases", releases.len());
        Ok(releases)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let path = self.document_path(RELEASES_DIR, id)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                info!("deleted release {id}");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(RelnotesError::not_found(format!("release {id}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_settings(&self, tenant: &str) -> Result<Option<Settings>> {
        let path = self.document_path(SETTINGS_DIR, tenant)?;
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put_settings(&self, tenant: &str, settings: Settings) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let path = self.document_path(SETTINGS_DIR, tenant)?;
        self.write_json(&path, &settings).await?;
        info!("saved settings for tenant {tenant}");
        Ok(())
    }
}
