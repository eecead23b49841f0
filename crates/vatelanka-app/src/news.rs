//! Municipal news feed with a local cache.
//!
//! The feed is plain JSON over HTTP. A fetched copy is cached to local
//! storage with its fetch time; reads inside the TTL are served from cache,
//! and a failing refresh falls back to whatever cached copy exists rather
//! than blanking the view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vatelanka_core::{Clock, EngineConfig};
use vatelanka_store::kv::{KeyValueStore, CACHED_NEWS_KEY};
use vatelanka_store::StoreError;

#[derive(Debug, Error)]
pub enum NewsError {
    #[error("news feed url not configured")]
    NotConfigured,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Cache(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedNews {
    fetched_at: i64,
    items: Vec<NewsItem>,
}

pub struct NewsClient {
    http: reqwest::Client,
    url: String,
    ttl_secs: i64,
}

impl NewsClient {
    /// # Errors
    ///
    /// [`NewsError::NotConfigured`] without a feed URL; otherwise an HTTP
    /// client construction error.
    pub fn new(config: &EngineConfig) -> Result<Self, NewsError> {
        let url = config
            .news_feed_url
            .clone()
            .ok_or(NewsError::NotConfigured)?;
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.news_request_timeout_secs))
            .user_agent(concat!("vatelanka/", env!("CARGO_PKG_VERSION")))
            .build()?;
        #[allow(clippy::cast_possible_wrap)]
        let ttl_secs = config.news_cache_ttl_secs as i64;
        Ok(Self { http, url, ttl_secs })
    }

    /// Fetch the feed directly, bypassing the cache.
    ///
    /// # Errors
    ///
    /// HTTP and decode failures surface as [`NewsError::Http`].
    pub async fn fetch(&self) -> Result<Vec<NewsItem>, NewsError> {
        let items = self
            .http
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(items)
    }

    /// Serve from cache inside the TTL, refresh otherwise, and fall back to
    /// any cached copy when the refresh fails.
    ///
    /// # Errors
    ///
    /// Fails only when the fetch fails and no cached copy exists.
    pub async fn cached_or_fetch<K: KeyValueStore>(
        &self,
        kv: &K,
        clock: &dyn Clock,
    ) -> Result<Vec<NewsItem>, NewsError> {
        let now = clock.now().and_utc().timestamp();
        let cached = read_cache(kv).await?;
        if let Some(cache) = &cached {
            if now - cache.fetched_at <= self.ttl_secs {
                return Ok(cache.items.clone());
            }
        }

        match self.fetch().await {
            Ok(items) => {
                write_cache(kv, now, &items).await;
                Ok(items)
            }
            Err(e) => match cached {
                Some(stale) => {
                    tracing::warn!(error = %e, "news refresh failed; serving cached copy");
                    Ok(stale.items)
                }
                None => Err(e),
            },
        }
    }
}

async fn read_cache<K: KeyValueStore>(kv: &K) -> Result<Option<CachedNews>, NewsError> {
    let Some(raw) = kv.get(CACHED_NEWS_KEY).await? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(cache) => Ok(Some(cache)),
        Err(e) => {
            tracing::warn!(error = %e, "cached news unreadable; ignoring");
            Ok(None)
        }
    }
}

async fn write_cache<K: KeyValueStore>(kv: &K, fetched_at: i64, items: &[NewsItem]) {
    let cache = CachedNews {
        fetched_at,
        items: items.to_vec(),
    };
    match serde_json::to_string(&cache) {
        Ok(raw) => {
            if let Err(e) = kv.set(CACHED_NEWS_KEY, &raw).await {
                tracing::warn!(error = %e, "news cache write failed");
            }
        }
        Err(e) => tracing::warn!(error = %e, "news cache serialization failed"),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use vatelanka_core::FixedClock;
    use vatelanka_store::MemoryKv;

    fn clock() -> FixedClock {
        FixedClock::at(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(), 8, 0)
    }

    fn config_for(server: &MockServer) -> EngineConfig {
        EngineConfig {
            news_feed_url: Some(format!("{}/feed", server.uri())),
            ..EngineConfig::default()
        }
    }

    fn feed_json() -> serde_json::Value {
        json!([
            { "id": "n1", "title": "Ward cleanup day", "body": "Saturday from 08:00." },
            { "id": "n2", "title": "New recycling bins", "body": "Rolling out this month." }
        ])
    }

    #[test]
    fn client_requires_a_configured_url() {
        let result = NewsClient::new(&EngineConfig::default());
        assert!(matches!(result, Err(NewsError::NotConfigured)));
    }

    #[tokio::test]
    async fn fetch_decodes_the_feed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(feed_json()))
            .mount(&server)
            .await;

        let client = NewsClient::new(&config_for(&server)).unwrap();
        let items = client.fetch().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "n1");
        assert!(items[0].published_at.is_none());
    }

    #[tokio::test]
    async fn a_fresh_cache_is_served_without_a_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(feed_json()))
            .expect(0)
            .mount(&server)
            .await;

        let kv = MemoryKv::new();
        let clock = clock();
        let cached = CachedNews {
            fetched_at: clock.now().and_utc().timestamp() - 60,
            items: vec![NewsItem {
                id: "cached".to_string(),
                title: "Cached headline".to_string(),
                body: "From local storage.".to_string(),
                published_at: None,
            }],
        };
        kv.set(CACHED_NEWS_KEY, &serde_json::to_string(&cached).unwrap())
            .await
            .unwrap();

        let client = NewsClient::new(&config_for(&server)).unwrap();
        let items = client.cached_or_fetch(&kv, &clock).await.unwrap();
        assert_eq!(items[0].id, "cached");
    }

    #[tokio::test]
    async fn an_expired_cache_is_refreshed_and_rewritten() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(feed_json()))
            .expect(1)
            .mount(&server)
            .await;

        let kv = MemoryKv::new();
        let clock = clock();
        let stale = CachedNews {
            fetched_at: clock.now().and_utc().timestamp() - 3_600,
            items: vec![],
        };
        kv.set(CACHED_NEWS_KEY, &serde_json::to_string(&stale).unwrap())
            .await
            .unwrap();

        let client = NewsClient::new(&config_for(&server)).unwrap();
        let items = client.cached_or_fetch(&kv, &clock).await.unwrap();
        assert_eq!(items.len(), 2);

        let rewritten: CachedNews =
            serde_json::from_str(&kv.get(CACHED_NEWS_KEY).await.unwrap().unwrap()).unwrap();
        assert_eq!(rewritten.items.len(), 2);
    }

    #[tokio::test]
    async fn a_failed_refresh_falls_back_to_the_stale_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let kv = MemoryKv::new();
        let clock = clock();
        let stale = CachedNews {
            fetched_at: clock.now().and_utc().timestamp() - 3_600,
            items: vec![NewsItem {
                id: "stale".to_string(),
                title: "Old headline".to_string(),
                body: "Better than nothing.".to_string(),
                published_at: None,
            }],
        };
        kv.set(CACHED_NEWS_KEY, &serde_json::to_string(&stale).unwrap())
            .await
            .unwrap();

        let client = NewsClient::new(&config_for(&server)).unwrap();
        let items = client.cached_or_fetch(&kv, &clock).await.unwrap();
        assert_eq!(items[0].id, "stale");
    }

    #[tokio::test]
    async fn a_failed_fetch_with_no_cache_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = NewsClient::new(&config_for(&server)).unwrap();
        let result = client.cached_or_fetch(&MemoryKv::new(), &clock()).await;
        assert!(matches!(result, Err(NewsError::Http(_))));
    }
}
