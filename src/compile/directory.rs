//! Compiler directory cache
//!
//! Fetches and memoizes, per server, the list of compilers the remote
//! service supports. Each server is fetched at most once per process
//! lifetime unless explicitly refreshed; directories from different
//! servers are cached independently and never merged.
//!
//! Concurrency contract: concurrent callers for the same uncached server
//! share a single in-flight fetch. The first caller fetches; everyone
//! else joins and receives the same outcome. A failed fetch leaves the
//! cache empty for that server and fails all waiters — no automatic
//! retry.

use crate::api::{CompilerDescriptor, WandboxApi};
use crate::types::WandboxError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, warn};

pub type Directory = Arc<Vec<CompilerDescriptor>>;

type FetchOutcome = Result<Directory, String>;

enum Slot {
    Ready(Directory),
    Fetching(broadcast::Sender<FetchOutcome>),
}

enum Wait {
    Hit(Directory),
    Join(broadcast::Receiver<FetchOutcome>),
    Lead,
}

pub struct DirectoryCache {
    api: Arc<dyn WandboxApi>,
    entries: Mutex<HashMap<String, Slot>>,
}

impl DirectoryCache {
    pub fn new(api: Arc<dyn WandboxApi>) -> Self {
        Self {
            api,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The directory for `server`, fetching it on first request.
    pub async fn get_directory(&self, server: &str) -> Result<Directory, WandboxError> {
        let wait = {
            let mut entries = self.entries.lock().await;
            match entries.get(server) {
                Some(Slot::Ready(directory)) => Wait::Hit(directory.clone()),
                Some(Slot::Fetching(tx)) => Wait::Join(tx.subscribe()),
                None => {
                    let (tx, _) = broadcast::channel(1);
                    entries.insert(server.to_string(), Slot::Fetching(tx));
                    Wait::Lead
                }
            }
        };

        match wait {
            Wait::Hit(directory) => {
                debug!("directory cache hit for {}", server);
                Ok(directory)
            }
            Wait::Join(mut rx) => match rx.recv().await {
                Ok(Ok(directory)) => Ok(directory),
                Ok(Err(reason)) => Err(WandboxError::DirectoryUnavailable {
                    server: server.to_string(),
                    reason,
                }),
                Err(_) => Err(WandboxError::DirectoryUnavailable {
                    server: server.to_string(),
                    reason: "directory fetch interrupted".to_string(),
                }),
            },
            Wait::Lead => self.fetch_and_publish(server).await,
        }
    }

    async fn fetch_and_publish(&self, server: &str) -> Result<Directory, WandboxError> {
        let outcome = self.api.get_list(server).await;
        let mut entries = self.entries.lock().await;

        match outcome {
            Ok(list) => {
                debug!("cached {} compilers for {}", list.len(), server);
                let directory: Directory = Arc::new(list);
                let previous = entries.insert(server.to_string(), Slot::Ready(directory.clone()));
                if let Some(Slot::Fetching(tx)) = previous {
                    let _ = tx.send(Ok(directory.clone()));
                }
                Ok(directory)
            }
            Err(e) => {
                let reason = e.to_string();
                warn!("directory fetch failed for {}: {}", server, reason);
                if let Some(Slot::Fetching(tx)) = entries.remove(server) {
                    let _ = tx.send(Err(reason.clone()));
                }
                Err(WandboxError::DirectoryUnavailable {
                    server: server.to_string(),
                    reason,
                })
            }
        }
    }

    /// Drop the cached directory for `server`. An in-flight fetch is left
    /// alone; its waiters still get their outcome.
    pub async fn invalidate(&self, server: &str) {
        let mut entries = self.entries.lock().await;
        if matches!(entries.get(server), Some(Slot::Ready(_))) {
            entries.remove(server);
        }
    }

    /// Always fetch, overwrite the cache entry, and return the fresh
    /// value. Used by the raw-listing UI, never for silent background
    /// refresh.
    pub async fn refresh(&self, server: &str) -> Result<Directory, WandboxError> {
        let outcome = self.api.get_list(server).await;
        let mut entries = self.entries.lock().await;

        match outcome {
            Ok(list) => {
                let directory: Directory = Arc::new(list);
                // Don't clobber a concurrent in-flight slot; its leader
                // will publish to its own waiters
                if !matches!(entries.get(server), Some(Slot::Fetching(_))) {
                    entries.insert(server.to_string(), Slot::Ready(directory.clone()));
                }
                Ok(directory)
            }
            Err(e) => {
                let reason = e.to_string();
                warn!("directory refresh failed for {}: {}", server, reason);
                if matches!(entries.get(server), Some(Slot::Ready(_))) {
                    entries.remove(server);
                }
                Err(WandboxError::DirectoryUnavailable {
                    server: server.to_string(),
                    reason,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fakes::FakeApi;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    const SERVER: &str = "https://wandbox.org";

    fn api_with(names: &[(&str, &str)]) -> FakeApi {
        FakeApi::with_list(
            names
                .iter()
                .map(|(n, l)| FakeApi::descriptor(n, l))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_second_lookup_uses_cache() {
        let api = Arc::new(api_with(&[("clang-head", "C++")]));
        let cache = DirectoryCache::new(api.clone());

        let first = cache.get_directory(SERVER).await.unwrap();
        let second = cache.get_directory(SERVER).await.unwrap();
        assert_eq!(first[0].name, "clang-head");
        assert_eq!(second[0].name, "clang-head");
        assert_eq!(api.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_lookups_share_one_fetch() {
        let mut api = api_with(&[("clang-head", "C++")]);
        api.fetch_delay = Some(Duration::from_millis(50));
        let api = Arc::new(api);
        let cache = Arc::new(DirectoryCache::new(api.clone()));

        let a = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.get_directory(SERVER).await })
        };
        let b = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.get_directory(SERVER).await })
        };

        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(api.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_servers_are_cached_independently() {
        let api = Arc::new(api_with(&[("clang-head", "C++")]));
        let cache = DirectoryCache::new(api.clone());

        cache.get_directory("https://a.example").await.unwrap();
        cache.get_directory("https://b.example").await.unwrap();
        assert_eq!(api.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_leaves_cache_empty() {
        let api = Arc::new(api_with(&[("clang-head", "C++")]));
        *api.list.lock().unwrap() = Err((503, "unavailable".to_string()));
        let cache = DirectoryCache::new(api.clone());

        let err = cache.get_directory(SERVER).await.unwrap_err();
        assert!(matches!(err, WandboxError::DirectoryUnavailable { .. }));

        // No automatic retry happened, but a new user-triggered call
        // fetches again because the failed entry was not cached
        *api.list.lock().unwrap() = Ok(vec![FakeApi::descriptor("clang-head", "C++")]);
        let directory = cache.get_directory(SERVER).await.unwrap();
        assert_eq!(directory.len(), 1);
        assert_eq!(api.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_refresh_always_fetches_and_overwrites() {
        let api = Arc::new(api_with(&[("clang-head", "C++")]));
        let cache = DirectoryCache::new(api.clone());

        cache.get_directory(SERVER).await.unwrap();
        *api.list.lock().unwrap() = Ok(vec![
            FakeApi::descriptor("clang-head", "C++"),
            FakeApi::descriptor("gcc-head", "C++"),
        ]);

        let fresh = cache.refresh(SERVER).await.unwrap();
        assert_eq!(fresh.len(), 2);
        assert_eq!(api.list_calls.load(Ordering::SeqCst), 2);

        // The overwritten entry serves subsequent lookups
        let cached = cache.get_directory(SERVER).await.unwrap();
        assert_eq!(cached.len(), 2);
        assert_eq!(api.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let api = Arc::new(api_with(&[("clang-head", "C++")]));
        let cache = DirectoryCache::new(api.clone());

        cache.get_directory(SERVER).await.unwrap();
        cache.invalidate(SERVER).await;
        cache.get_directory(SERVER).await.unwrap();
        assert_eq!(api.list_calls.load(Ordering::SeqCst), 2);
    }
}
