//! Shared curated-index locator.
//!
//! Downloads a `name=uri` index file once, lazily, then serves lookups from
//! memory for the rest of the process. First access is single-flighted: the
//! loading thread holds the cache mutex for the duration of the download, so
//! concurrent callers block and reuse the parsed result instead of fetching
//! again. A failed load propagates and is not cached, so a later call may
//! retry.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::fetch::Fetcher;
use crate::locate::{parse_properties, ModuleLocator, Stability};

type Index = Arc<BTreeMap<String, String>>;

/// Locator backed by a lazily downloaded, memoized name→URI index.
pub struct SharedIndexLocator {
    uri: String,
    fetcher: Arc<dyn Fetcher>,
    cache: Mutex<Option<Index>>,
}

impl SharedIndexLocator {
    /// Create a locator loading its index from `uri` on first use.
    pub fn new(uri: impl Into<String>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            uri: uri.into(),
            fetcher,
            cache: Mutex::new(None),
        }
    }

    fn index(&self) -> Result<Index> {
        let mut cache = self.cache.lock().expect("shared index lock");
        if let Some(index) = cache.as_ref() {
            return Ok(Arc::clone(index));
        }
        let text = self.fetcher.read_text(&self.uri)?;
        let index: Index = Arc::new(parse_properties(&text));
        tracing::debug!(uri = %self.uri, entries = index.len(), "shared index loaded");
        *cache = Some(Arc::clone(&index));
        Ok(index)
    }
}

impl ModuleLocator for SharedIndexLocator {
    fn name(&self) -> &str {
        "shared-index"
    }

    fn stability(&self) -> Stability {
        // Stable once loaded: lookups are served from the memoized index.
        Stability::Stable
    }

    fn locate(&self, module: &str) -> Result<Option<String>> {
        Ok(self.index()?.get(module).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::HttpFetcher;
    use httpmock::prelude::*;

    const INDEX: &str = "\
# curated modules
org.example.lib=https://example.com/lib.jar
org.example.net=https://example.com/net.jar
";

    #[test]
    fn serves_lookups_from_index() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/index.properties");
            then.status(200).body(INDEX);
        });

        let locator =
            SharedIndexLocator::new(server.url("/index.properties"), Arc::new(HttpFetcher::new()));

        assert_eq!(
            locator.locate("org.example.lib").unwrap().as_deref(),
            Some("https://example.com/lib.jar")
        );
        assert!(locator.locate("org.example.unknown").unwrap().is_none());
    }

    #[test]
    fn downloads_index_exactly_once() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/index.properties");
            then.status(200).body(INDEX);
        });

        let locator =
            SharedIndexLocator::new(server.url("/index.properties"), Arc::new(HttpFetcher::new()));

        locator.locate("org.example.lib").unwrap();
        locator.locate("org.example.net").unwrap();
        locator.locate("org.example.unknown").unwrap();

        mock.assert_calls(1);
    }

    #[test]
    fn concurrent_first_access_is_single_flighted() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/index.properties");
            then.status(200).body(INDEX);
        });

        let locator = Arc::new(SharedIndexLocator::new(
            server.url("/index.properties"),
            Arc::new(HttpFetcher::new()),
        ));

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let locator = Arc::clone(&locator);
                scope.spawn(move || {
                    let uri = locator.locate("org.example.lib").unwrap();
                    assert!(uri.is_some());
                });
            }
        });

        mock.assert_calls(1);
    }

    #[test]
    fn failed_load_propagates_and_is_retried() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/index.properties");
            then.status(500);
        });

        let locator =
            SharedIndexLocator::new(server.url("/index.properties"), Arc::new(HttpFetcher::new()));

        assert!(locator.locate("org.example.lib").is_err());
        assert!(locator.locate("org.example.lib").is_err());
        mock.assert_calls(2);
    }

    #[test]
    fn is_stable() {
        let server = MockServer::start();
        let locator =
            SharedIndexLocator::new(server.url("/index.properties"), Arc::new(HttpFetcher::new()));
        assert_eq!(locator.stability(), Stability::Stable);
    }
}
