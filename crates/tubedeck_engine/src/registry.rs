use crate::{AddRequest, Collection, DownloadInfo, History, RegistryError, RegistryReply};

/// Predicate over registry entries, used by the filter-based operations.
pub type EntryFilter<'a> = &'a (dyn Fn(&DownloadInfo) -> bool + Sync);

/// The download registry as seen by a client: it owns the queue and done
/// collections and accepts submissions, deletions and start requests.
#[async_trait::async_trait]
pub trait Registry: Send + Sync {
    /// Submits one URL. A transport failure is an `Err`; an application
    /// level rejection is `Ok(RegistryReply::Error { .. })`.
    async fn add(&self, request: &AddRequest) -> Result<RegistryReply, RegistryError>;

    async fn delete_by_id(
        &self,
        collection: Collection,
        ids: &[String],
    ) -> Result<RegistryReply, RegistryError>;

    /// Starts queue entries that were added without auto start.
    async fn start_by_id(&self, ids: &[String]) -> Result<RegistryReply, RegistryError>;

    async fn history(&self) -> Result<History, RegistryError>;

    /// Deletes every entry of `collection` matching `filter`; returns how many were targeted.
    async fn delete_by_filter(
        &self,
        collection: Collection,
        filter: EntryFilter<'_>,
    ) -> Result<usize, RegistryError> {
        let history = self.history().await?;
        let ids = matching_keys(&history, collection, filter);
        if ids.is_empty() {
            return Ok(0);
        }
        self.delete_by_id(collection, &ids).await?;
        Ok(ids.len())
    }

    async fn start_by_filter(&self, filter: EntryFilter<'_>) -> Result<usize, RegistryError> {
        let history = self.history().await?;
        let ids = matching_keys(&history, Collection::Queue, filter);
        if ids.is_empty() {
            return Ok(0);
        }
        self.start_by_id(&ids).await?;
        Ok(ids.len())
    }
}

fn matching_keys(history: &History, collection: Collection, filter: EntryFilter<'_>) -> Vec<String> {
    history
        .entries(collection)
        .filter(|info| filter(info))
        .map(|info| info.key().to_string())
        .collect()
}
