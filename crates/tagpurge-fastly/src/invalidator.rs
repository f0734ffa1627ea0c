//! Cache tag invalidation.
//!
//! Turns a batch of invalidated CMS cache tags into exactly one purge:
//! everything when extensions changed, otherwise the hashed keys.

use std::sync::Arc;

use tagpurge_core::{CORE_EXTENSION_TAG, SurrogateKey, SurrogateKeySet, TagHasher};
use tracing::{debug, info};

use crate::error::FastlyError;
use crate::purge::PurgeBackend;

/// What an invalidation batch translates to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationPlan {
    /// No tags, nothing to purge.
    Nothing,
    /// Purge the whole service.
    PurgeAll,
    /// Purge every object of this site on a shared service.
    PurgeSite(SurrogateKey),
    /// Purge the hashed tags.
    PurgeKeys(SurrogateKeySet),
}

impl InvalidationPlan {
    /// Short name for logs and responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Nothing => "nothing",
            Self::PurgeAll => "purge_all",
            Self::PurgeSite(_) => "purge_site",
            Self::PurgeKeys(_) => "purge_keys",
        }
    }

    /// Keys that will be purged, empty for `Nothing` and `PurgeAll`.
    pub fn keys(&self) -> Vec<SurrogateKey> {
        match self {
            Self::Nothing | Self::PurgeAll => Vec::new(),
            Self::PurgeSite(key) => vec![key.clone()],
            Self::PurgeKeys(keys) => keys.as_slice().to_vec(),
        }
    }
}

/// Translates cache tag invalidations into purge calls.
///
/// # Example
///
/// ```ignore
/// let invalidator = CacheTagsInvalidator::new(Arc::new(api), TagHasher::default());
/// invalidator.invalidate_tags(&["node:1", "node_list"]).await?;
/// ```
#[derive(Clone)]
pub struct CacheTagsInvalidator {
    backend: Arc<dyn PurgeBackend>,
    hasher: TagHasher,
}

impl CacheTagsInvalidator {
    pub fn new(backend: Arc<dyn PurgeBackend>, hasher: TagHasher) -> Self {
        Self { backend, hasher }
    }

    pub fn hasher(&self) -> &TagHasher {
        &self.hasher
    }

    pub fn backend(&self) -> &dyn PurgeBackend {
        self.backend.as_ref()
    }

    /// Decides what to purge for `tags` without sending anything.
    pub fn plan<S: AsRef<str>>(&self, tags: &[S]) -> InvalidationPlan {
        if tags.iter().any(|t| t.as_ref() == CORE_EXTENSION_TAG) {
            // Module and theme changes can affect any page.
            return match self.hasher.site_key() {
                Some(site_key) => InvalidationPlan::PurgeSite(site_key),
                None => InvalidationPlan::PurgeAll,
            };
        }

        let keys = self.hasher.hash_tags(tags);
        if keys.is_empty() {
            InvalidationPlan::Nothing
        } else {
            InvalidationPlan::PurgeKeys(keys)
        }
    }

    /// Sends the purge a plan describes.
    pub async fn execute(&self, plan: &InvalidationPlan) -> Result<(), FastlyError> {
        match plan {
            InvalidationPlan::Nothing => {
                debug!("No cache tags to invalidate");
                Ok(())
            },
            InvalidationPlan::PurgeAll => self.backend.purge_all().await,
            InvalidationPlan::PurgeSite(key) => {
                self.backend.purge_keys(std::slice::from_ref(key)).await
            },
            InvalidationPlan::PurgeKeys(keys) => self.backend.purge_keys(keys.as_slice()).await,
        }
    }

    /// Invalidates `tags` on the CDN, returning the plan that was executed.
    pub async fn invalidate_tags<S: AsRef<str>>(
        &self,
        tags: &[S],
    ) -> Result<InvalidationPlan, FastlyError> {
        let plan = self.plan(tags);
        info!(
            tags = tags.len(),
            plan = plan.kind(),
            keys = plan.keys().len(),
            "Invalidating cache tags"
        );

        self.execute(&plan).await?;
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::purge::{Authorization, CredentialCheck};
    use crate::sync::CredentialState;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Debug, PartialEq)]
    enum Call {
        All,
        Keys(Vec<String>),
    }

    #[derive(Default)]
    struct RecordingBackend {
        state: CredentialState,
        calls: Mutex<Vec<Call>>,
    }

    #[async_trait]
    impl PurgeBackend for RecordingBackend {
        async fn check_credentials(&self) -> CredentialCheck {
            CredentialCheck::Valid {
                via: Authorization::PurgeScopes,
            }
        }

        async fn purge_all(&self) -> Result<(), FastlyError> {
            self.calls.lock().push(Call::All);
            Ok(())
        }

        async fn purge_url(&self, _url: &str) -> Result<(), FastlyError> {
            Ok(())
        }

        async fn purge_keys(&self, keys: &[SurrogateKey]) -> Result<(), FastlyError> {
            self.calls
                .lock()
                .push(Call::Keys(keys.iter().map(|k| k.to_string()).collect()));
            Ok(())
        }

        fn state(&self) -> &CredentialState {
            &self.state
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn invalidator(hasher: TagHasher) -> (Arc<RecordingBackend>, CacheTagsInvalidator) {
        let backend = Arc::new(RecordingBackend::default());
        let invalidator = CacheTagsInvalidator::new(backend.clone(), hasher);
        (backend, invalidator)
    }

    #[tokio::test]
    async fn test_tags_are_hashed_into_one_purge() {
        let (backend, invalidator) = invalidator(TagHasher::default());

        let plan = invalidator
            .invalidate_tags(&["node:1", "user:7"])
            .await
            .unwrap();

        assert_eq!(plan.kind(), "purge_keys");
        assert_eq!(
            *backend.calls.lock(),
            vec![Call::Keys(vec!["37l9".into(), "3rkq".into()])]
        );
    }

    #[tokio::test]
    async fn test_core_extension_purges_everything() {
        let (backend, invalidator) = invalidator(TagHasher::default());

        let plan = invalidator
            .invalidate_tags(&["node:1", CORE_EXTENSION_TAG])
            .await
            .unwrap();

        assert_eq!(plan, InvalidationPlan::PurgeAll);
        assert_eq!(*backend.calls.lock(), vec![Call::All]);
    }

    #[tokio::test]
    async fn test_core_extension_with_site_purges_site_key() {
        let hasher = TagHasher::default().with_site_id("mysiteid");
        let (backend, invalidator) = invalidator(hasher);

        let plan = invalidator
            .invalidate_tags(&[CORE_EXTENSION_TAG])
            .await
            .unwrap();

        assert_eq!(plan.kind(), "purge_site");
        assert_eq!(*backend.calls.lock(), vec![Call::Keys(vec!["63u8".into()])]);
    }

    #[tokio::test]
    async fn test_empty_tags_send_nothing() {
        let (backend, invalidator) = invalidator(TagHasher::default());
        let tags: [&str; 0] = [];

        let plan = invalidator.invalidate_tags(&tags).await.unwrap();

        assert_eq!(plan, InvalidationPlan::Nothing);
        assert!(backend.calls.lock().is_empty());
    }

    #[test]
    fn test_plan_keys() {
        let (_, invalidator) = invalidator(TagHasher::default());

        assert!(invalidator.plan(&["", " "]).keys().is_empty());
        assert_eq!(invalidator.plan(&["node:1", "node:1"]).keys().len(), 1);
    }
}
