//! Traits related to release persistence
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::{error::Result, release::Release, settings::Settings};

/// Collection of release documents keyed by id plus one settings document
/// per tenant. Writes are last-write-wins.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ReleaseStore: Send + Sync {
    /// Insert a new release. Fails with `Conflict` when a release with the
    /// same project and version already exists.
    async fn create(&self, release: Release) -> Result<Release>;
    /// Replace an existing release. Fails with `NotFound` for unknown ids.
    async fn update(&self, release: Release) -> Result<Release>;
    /// Fetch one release. Fails with `NotFound` for unknown ids.
    async fn get(&self, id: &str) -> Result<Release>;
    /// All releases, newest first.
    async fn list(&self) -> Result<Vec<Release>>;
    /// Remove a release. Fails with `NotFound` for unknown ids.
    async fn delete(&self, id: &str) -> Result<()>;
    /// Settings for `tenant`, or `None` if never saved.
    async fn get_settings(&self, tenant: &str) -> Result<Option<Settings>>;
    /// Replace settings for `tenant`.
    async fn put_settings(&self, tenant: &str, settings: Settings) -> Result<()>;
}
