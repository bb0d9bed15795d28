//! Lazily loaded, invalidatable credential cache.
//!
//! Streaming-service credentials are expensive to obtain (scraped or fetched
//! from a remote service), so they are loaded on first use and shared
//! afterwards. The cache is an owned value injected into whatever needs it;
//! there is no process-wide instance.
//!
//! Nothing in this crate holds credentials yet. This is the extension point
//! for a streaming-service client: it builds a `CredentialCache` around its
//! own [`CredentialSource`] and owns it alongside its HTTP client, instead
//! of keeping secrets in a global.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::BluroomResult;

/// Loads a credential value from wherever it lives.
#[async_trait]
pub trait CredentialSource<T>: Send + Sync {
    async fn load(&self) -> BluroomResult<T>;
}

/// Caches the value produced by a [`CredentialSource`].
///
/// Concurrent `get()` calls during a load wait for that load instead of
/// starting their own. A failed load caches nothing.
pub struct CredentialCache<T> {
    source: Arc<dyn CredentialSource<T>>,
    value: Mutex<Option<Arc<T>>>,
}

impl<T: Send + Sync + 'static> CredentialCache<T> {
    pub fn new(source: Arc<dyn CredentialSource<T>>) -> Self {
        Self {
            source,
            value: Mutex::new(None),
        }
    }

    /// Returns the cached value, loading it first if needed.
    pub async fn get(&self) -> BluroomResult<Arc<T>> {
        let mut value = self.value.lock().await;
        if let Some(cached) = value.as_ref() {
            return Ok(Arc::clone(cached));
        }

        log::debug!("[Credentials] Loading credentials");
        let loaded = Arc::new(self.source.load().await?);
        *value = Some(Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Drops the cached value so the next `get()` reloads it.
    pub async fn invalidate(&self) {
        let mut value = self.value.lock().await;
        if value.take().is_some() {
            log::info!("[Credentials] Cached credentials invalidated");
        }
    }

    /// Returns true if a value is currently cached.
    pub async fn is_loaded(&self) -> bool {
        self.value.lock().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BluroomError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingSource {
        loads: AtomicUsize,
        fail_first: bool,
    }

    #[async_trait]
    impl CredentialSource<String> for CountingSource {
        async fn load(&self) -> BluroomResult<String> {
            let n = self.loads.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            if self.fail_first && n == 0 {
                return Err(BluroomError::Configuration("bundle unavailable".into()));
            }
            Ok(format!("secret-{}", n))
        }
    }

    #[tokio::test]
    async fn loads_once_and_shares() {
        let source = Arc::new(CountingSource::default());
        let cache = CredentialCache::new(Arc::clone(&source) as Arc<dyn CredentialSource<String>>);

        let (a, b) = tokio::join!(cache.get(), cache.get());

        assert_eq!(*a.unwrap(), "secret-0");
        assert_eq!(*b.unwrap(), "secret-0");
        assert_eq!(source.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidate_forces_reload() {
        let source = Arc::new(CountingSource::default());
        let cache = CredentialCache::new(Arc::clone(&source) as Arc<dyn CredentialSource<String>>);

        cache.get().await.unwrap();
        cache.invalidate().await;
        assert!(!cache.is_loaded().await);

        assert_eq!(*cache.get().await.unwrap(), "secret-1");
        assert_eq!(source.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_load_is_not_cached() {
        let source = Arc::new(CountingSource {
            fail_first: true,
            ..Default::default()
        });
        let cache = CredentialCache::new(Arc::clone(&source) as Arc<dyn CredentialSource<String>>);

        assert!(cache.get().await.is_err());
        assert!(!cache.is_loaded().await);
        assert_eq!(*cache.get().await.unwrap(), "secret-1");
    }
}
