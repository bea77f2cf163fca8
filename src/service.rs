//! Release service: store access, settings and document generation behind
//! one handle shared by the CLI and the HTTP API.
use chrono::Utc;
use log::*;
use nanoid::nanoid;
use std::sync::Arc;

use crate::{
    assembler::{Assembler, GeneratedDocument},
    error::Result,
    release::{Release, ReleaseDraft, ReleasePatch},
    settings::{DEFAULT_TENANT, Settings},
    store::ReleaseStore,
};

pub mod in_flight;

use in_flight::InFlight;

pub struct ReleaseService {
    store: Arc<dyn ReleaseStore>,
    assembler: Assembler,
    in_flight: InFlight,
    tenant: String,
}

impl ReleaseService {
    pub fn new(store: Arc<dyn ReleaseStore>, assembler: Assembler) -> Self {
        Self {
            store,
            assembler,
            in_flight: InFlight::default(),
            tenant: DEFAULT_TENANT.into(),
        }
    }

    pub async fn create_release(&self, draft: ReleaseDraft) -> Result<Release> {
        let release = Release::from_draft(nanoid!(), draft)?;
        let created = self.store.create(release).await?;
        debug!(
            "created release {} for {} {}",
            created.id, created.project, created.version
        );
        Ok(created)
    }

    pub async fn update_release(&self, id: &str, patch: ReleasePatch) -> Result<Release> {
        let mut release = self.store.get(id).await?;
        release.apply(patch)?;
        let updated = self.store.update(release).await?;
        info!("updated release {id}");
        Ok(updated)
    }

    pub async fn get_release(&self, id: &str) -> Result<Release> {
        self.store.get(id).await
    }

    pub async fn list_releases(&self) -> Result<Vec<Release>> {
        self.store.list().await
    }

    pub async fn delete_release(&self, id: &str) -> Result<()> {
        self.store.delete(id).await?;
        debug!("deleted release {id}");
        Ok(())
    }

    /// Stored settings, empty when none were saved yet.
    pub async fn get_settings(&self) -> Result<Settings> {
        Ok(self
            .store
            .get_settings(&self.tenant)
            .await?
            .unwrap_or_default())
    }

    /// Merge `update` into the stored settings and return the result.
    pub async fn update_settings(&self, update: Settings) -> Result<Settings> {
        let mut settings = self.get_settings().await?;
        settings.merge(update);
        self.store.put_settings(&self.tenant, settings.clone()).await?;
        info!("settings updated");
        Ok(settings)
    }

    /// Generate the document for release `id` and store it as the release's
    /// `generated_markdown`. At most one generation per id runs at a time.
    pub async fn generate(&self, id: &str) -> Result<GeneratedDocument> {
        let _guard = self.in_flight.acquire(id)?;

        let release = self.store.get(id).await?;
        let settings = self.get_settings().await?;

        let document = self.assembler.generate(&release, &settings).await?;

        // edits made while generating are kept; only the document is replaced
        let mut latest = self.store.get(id).await?;
        latest.generated_markdown = Some(document.markdown.clone());
        latest.updated_at = Utc::now();
        self.store.update(latest).await?;

        info!("stored generated release notes for {id}");

        Ok(document)
    }

    pub fn in_flight(&self) -> &InFlight {
        &self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::RelnotesError,
        scraper::traits::MockScraper,
        store::FileStore,
        summarizer::traits::MockSummarizer,
        test_helpers::{create_test_draft, create_test_settings, create_test_ticket},
        tracker::traits::MockTracker,
    };
    use tempfile::TempDir;

    async fn create_test_service(
        tracker: MockTracker,
        summarizer: MockSummarizer,
    ) -> (TempDir, ReleaseService) {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        let assembler = Assembler::builder()
            .tracker(Box::new(tracker))
            .scraper(Box::new(MockScraper::new()))
            .summarizer(Box::new(summarizer))
            .build()
            .unwrap();
        (dir, ReleaseService::new(Arc::new(store), assembler))
    }

    #[tokio::test]
    async fn generate_stores_markdown() {
        let mut tracker = MockTracker::new();
        tracker
            .expect_fetch_ticket()
            .returning(|_, key| Ok(create_test_ticket(key, "Bug")));
        let mut summarizer = MockSummarizer::new();
        summarizer
            .expect_summarize()
            .returning(|_, _, _| Ok("Fixed a crash on startup.".into()));

        let (_dir, service) = create_test_service(tracker, summarizer).await;
        service.update_settings(create_test_settings()).await.unwrap();
        let release = service.create_release(create_test_draft()).await.unwrap();

        let document = service.generate(&release.id).await.unwrap();
        let stored = service.get_release(&release.id).await.unwrap();

        assert_eq!(stored.generated_markdown, Some(document.markdown));
        assert!(!service.in_flight().contains(&release.id));
    }

    fn assert_send<T: Send>(_: T) {}

    #[tokio::test]
    async fn generate_future_is_send() {
        let (_dir, service) =
            create_test_service(MockTracker::new(), MockSummarizer::new()).await;

        // the HTTP handler spawns this future onto the runtime
        assert_send(service.generate("any"));
    }

    #[tokio::test]
    async fn generate_without_settings_is_config_error() {
        let mut tracker = MockTracker::new();
        tracker.expect_fetch_ticket().never();
        let mut summarizer = MockSummarizer::new();
        summarizer.expect_summarize().never();

        let (_dir, service) = create_test_service(tracker, summarizer).await;
        let release = service.create_release(create_test_draft()).await.unwrap();

        let result = service.generate(&release.id).await;

        assert!(matches!(result, Err(RelnotesError::Config(_))));
        assert!(!service.in_flight().contains(&release.id));
        let stored = service.get_release(&release.id).await.unwrap();
        assert!(stored.generated_markdown.is_none());
    }

    #[tokio::test]
    async fn concurrent_generate_for_same_id_is_rejected() {
        let (_dir, service) =
            create_test_service(MockTracker::new(), MockSummarizer::new()).await;
        let release = service.create_release(create_test_draft()).await.unwrap();

        let _running = service.in_flight().acquire(&release.id).unwrap();
        let result = service.generate(&release.id).await;

        assert!(matches!(result, Err(RelnotesError::GenerationInProgress(_))));
    }

    #[tokio::test]
    async fn generate_unknown_release_is_not_found() {
        let (_dir, service) =
            create_test_service(MockTracker::new(), MockSummarizer::new()).await;

        let result = service.generate("missing").await;

        assert!(matches!(result, Err(RelnotesError::NotFound(_))));
        assert!(!service.in_flight().contains("missing"));
    }

    #[tokio::test]
    async fn deleted_release_is_not_listed() {
        let (_dir, service) =
            create_test_service(MockTracker::new(), MockSummarizer::new()).await;
        let release = service.create_release(create_test_draft()).await.unwrap();
        assert_eq!(service.list_releases().await.unwrap().len(), 1);

        service.delete_release(&release.id).await.unwrap();

        assert!(service.list_releases().await.unwrap().is_empty());
        assert!(matches!(
            service.get_release(&release.id).await,
            Err(RelnotesError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_release_applies_patch() {
        let (_dir, service) =
            create_test_service(MockTracker::new(), MockSummarizer::new()).await;
        let release = service.create_release(create_test_draft()).await.unwrap();

        let updated = service
            .update_release(
                &release.id,
                ReleasePatch {
                    highlights: Some("New highlights".into()),
                    ..ReleasePatch::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.highlights, "New highlights");
        assert_eq!(updated.created_at, release.created_at);
    }

    #[tokio::test]
    async fn settings_updates_merge() {
        let (_dir, service) =
            create_test_service(MockTracker::new(), MockSummarizer::new()).await;
        service.update_settings(create_test_settings()).await.unwrap();

        let merged = service
            .update_settings(Settings {
                llm_token: Some("rotated".into()),
                ..Settings::default()
            })
            .await
            .unwrap();

        assert_eq!(merged.llm_token.as_deref(), Some("rotated"));
        assert_eq!(merged.tracker_token.as_deref(), Some("tracker-token"));
        assert_eq!(service.get_settings().await.unwrap(), merged);
    }
}
