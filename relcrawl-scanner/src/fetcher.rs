use crate::error::FetchError;
use crate::record::FetchedResource;
use crate::resource::ResourceId;
use async_trait::async_trait;

/// Source of metadata and relations for a single resource.
///
/// Implementations own their transport and any retry policy; the crawler
/// only sees success or a [`FetchError`].
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, id: &ResourceId) -> Result<FetchedResource, FetchError>;

    /// Maps an identifier onto the form this fetcher reports relations in.
    /// The crawler applies it to the seed and to every relation before the
    /// visited check, so two spellings of one resource share a key.
    fn canonical(&self, id: &ResourceId) -> ResourceId {
        id.clone()
    }
}
