//! Cache-first fetching with retry and backoff around the page client.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rand::Rng;
use wowhead_api::{Client, Resource};

use crate::cache::{CacheError, PageCache};

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("gave up on {resource} after {attempts} attempts")]
    Exhausted {
        resource: Resource,
        attempts: usize,
        #[source]
        last: wowhead_api::Error,
    },
    #[error("fetching {resource} failed")]
    Api {
        resource: Resource,
        #[source]
        source: wowhead_api::Error,
    },
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// How a failed request should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureClass {
    RateLimited,
    Transient,
    Fatal,
}

fn classify(err: &wowhead_api::Error) -> FailureClass {
    match err {
        wowhead_api::Error::RequestFailed => FailureClass::Transient,
        wowhead_api::Error::InvalidUrl(_) => FailureClass::Fatal,
        wowhead_api::Error::HttpStatus { status, .. } => match *status {
            403 | 429 => FailureClass::RateLimited,
            s if s >= 500 => FailureClass::Transient,
            _ => FailureClass::Fatal,
        },
    }
}

/// Attempt ceilings and backoff bases, split by failure severity.
///
/// Attempts are counted across the whole request, so a resource that first
/// times out and is then rate limited shares one counter; each failure is
/// checked against the ceiling of its own class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub rate_limit_max_attempts: usize,
    pub rate_limit_base: Duration,
    pub transient_max_attempts: usize,
    pub transient_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            rate_limit_max_attempts: 12,
            rate_limit_base: Duration::from_secs(15),
            transient_max_attempts: 6,
            transient_base: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Defaults overridden by `FRUGALFORGE_RETRY_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            rate_limit_max_attempts: env_usize(
                "FRUGALFORGE_RETRY_RATE_LIMIT_MAX",
                defaults.rate_limit_max_attempts,
            ),
            rate_limit_base: Duration::from_millis(env_u64(
                "FRUGALFORGE_RETRY_RATE_LIMIT_BASE_MS",
                defaults.rate_limit_base.as_millis() as u64,
            )),
            transient_max_attempts: env_usize(
                "FRUGALFORGE_RETRY_TRANSIENT_MAX",
                defaults.transient_max_attempts,
            ),
            transient_base: Duration::from_millis(env_u64(
                "FRUGALFORGE_RETRY_TRANSIENT_BASE_MS",
                defaults.transient_base.as_millis() as u64,
            )),
        }
    }

    /// A policy that retries immediately. Used in tests.
    pub fn immediate(rate_limit_max_attempts: usize, transient_max_attempts: usize) -> Self {
        Self {
            rate_limit_max_attempts,
            rate_limit_base: Duration::ZERO,
            transient_max_attempts,
            transient_base: Duration::ZERO,
        }
    }

    fn max_attempts(&self, class: FailureClass) -> usize {
        match class {
            FailureClass::RateLimited => self.rate_limit_max_attempts,
            FailureClass::Transient => self.transient_max_attempts,
            FailureClass::Fatal => 1,
        }
    }

    /// Server hint when present, otherwise the class base scaled by attempt with ±20% jitter.
    fn delay_for(&self, class: FailureClass, attempt: usize, hint: Option<Duration>) -> Duration {
        if let Some(hint) = hint {
            return hint;
        }
        let base = match class {
            FailureClass::RateLimited => self.rate_limit_base,
            _ => self.transient_base,
        };
        let scaled = base.saturating_mul(attempt.min(u32::MAX as usize) as u32);
        let jitter = rand::thread_rng().gen_range(0.8..1.2);
        scaled.mul_f64(jitter)
    }
}

/// Counters describing what the client did during a run.
#[derive(Default)]
pub struct FetchStats {
    cache_hits: AtomicU64,
    network_fetches: AtomicU64,
    retries: AtomicU64,
}

/// Point-in-time copy of [`FetchStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStatsSnapshot {
    pub cache_hits: u64,
    pub network_fetches: u64,
    pub retries: u64,
}

impl FetchStats {
    pub fn snapshot(&self) -> FetchStatsSnapshot {
        FetchStatsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            network_fetches: self.network_fetches.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
        }
    }
}

/// Cache key for a resource. Spell pages and the CSV export share one cache
/// root; item renders use their own.
pub fn cache_key(resource: &Resource) -> String {
    match resource {
        Resource::SkillLineAbilityCsv { build } => format!("SkillLineAbility.{}.csv", build),
        Resource::Spell(id) => format!("wowhead/spell_{}.html", id),
        Resource::Item(id) => format!("wowhead_tbc_item_{}.html", id),
        Resource::ItemXml(id) => format!("wowhead_tbc_item_{}.xml", id),
    }
}

/// Page client wrapper that adds a persistent cache and retry with backoff.
///
/// Cache hits bypass the network entirely. After every network fetch the
/// configured request delay is slept to stay polite to the remote site.
pub struct CachedClient<C> {
    inner: Client,
    cache: C,
    policy: RetryPolicy,
    request_delay: Duration,
    stats: FetchStats,
}

impl<C: PageCache> CachedClient<C> {
    /// Creates a cached client with the retry policy taken from the environment.
    pub fn new(inner: Client, cache: C) -> Self {
        Self {
            inner,
            cache,
            policy: RetryPolicy::from_env(),
            request_delay: Duration::ZERO,
            stats: FetchStats::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn stats(&self) -> FetchStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Returns the resource body from cache, fetching and caching it on a miss.
    pub async fn fetch(&self, resource: &Resource) -> Result<String, FetchError> {
        let key = cache_key(resource);
        if let Some(cached) = self.cache.get(&key)? {
            tracing::debug!("cache hit for {}", resource);
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(cached);
        }

        let body = self.fetch_with_retry(resource).await?;
        self.cache.put(&key, &body)?;
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }
        Ok(body)
    }

    async fn fetch_with_retry(&self, resource: &Resource) -> Result<String, FetchError> {
        let mut attempt = 0usize;
        loop {
            attempt += 1;
            self.stats.network_fetches.fetch_add(1, Ordering::Relaxed);
            let err = match self.inner.fetch_text(resource).await {
                Ok(body) => return Ok(body),
                Err(err) => err,
            };

            let class = classify(&err);
            if class == FailureClass::Fatal {
                return Err(FetchError::Api {
                    resource: resource.clone(),
                    source: err,
                });
            }
            let max_attempts = self.policy.max_attempts(class);
            if attempt >= max_attempts {
                return Err(FetchError::Exhausted {
                    resource: resource.clone(),
                    attempts: attempt,
                    last: err,
                });
            }

            let delay = self.policy.delay_for(class, attempt, err.retry_after());
            match err.status() {
                Some(status) => tracing::warn!(
                    "HTTP {} for {} (attempt {}/{}), retrying in {:.1}s",
                    status,
                    resource,
                    attempt,
                    max_attempts,
                    delay.as_secs_f64()
                ),
                None => tracing::warn!(
                    "{} request failed (attempt {}/{}), retrying in {:.1}s",
                    resource,
                    attempt,
                    max_attempts,
                    delay.as_secs_f64()
                ),
            }
            self.stats.retries.fetch_add(1, Ordering::Relaxed);
            tokio::time::sleep(delay).await;
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(default)
}
