/// Athlete resolution pipeline.
///
/// `resolve` turns one query into one `AthleteRecord`:
///   cache → slug candidates → profile fetch → localized names (worker
///   pool) + nationality chain → merged record → cache
///
/// It never fails; every problem degrades to a placeholder or a NotFound
/// record.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::cache::{ResultCache, normalize_key};
use crate::config::{Config, LocaleConfig};
use crate::extract;
use crate::fetcher::{HttpClient, ReqwestClient, ResourceFetcher};
use crate::models::{
    AthleteRecord, FetchResult, LocalizedName, NOT_FOUND, PLACEHOLDER, ResolutionStatus,
};
use crate::nationality::{NationalityChain, NationalityContext};
use crate::slug;

pub struct AthleteResolutionPipeline {
    fetcher: ResourceFetcher,
    chain: NationalityChain,
    locales: Vec<LocaleConfig>,
    locale_codes: Vec<String>,
    primary_locale: String,
    worker_width: usize,
    batch_delay: Duration,
    separator: String,
    cache: Mutex<ResultCache>,
}

impl AthleteResolutionPipeline {
    /// Pipeline over a real HTTP client built from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let http = ReqwestClient::new(&config.user_agent, config.request_timeout())?;
        Ok(Self::new(config, Arc::new(http)))
    }

    /// Pipeline with the standard nationality chain over `http`.
    pub fn new(config: &Config, http: Arc<dyn HttpClient>) -> Self {
        let chain = NationalityChain::standard(config, Arc::clone(&http));
        Self::with_chain(config, http, chain)
    }

    /// Pipeline with a caller-supplied nationality chain.
    pub fn with_chain(
        config: &Config,
        http: Arc<dyn HttpClient>,
        chain: NationalityChain,
    ) -> Self {
        Self {
            fetcher: ResourceFetcher::new(http, &config.base_url),
            chain,
            locales: config.locales.clone(),
            locale_codes: config.locale_codes().into_iter().map(str::to_string).collect(),
            primary_locale: config.primary_locale.clone(),
            worker_width: config.worker_width.max(1),
            batch_delay: config.batch_delay(),
            separator: config.nationality_separator.clone(),
            cache: Mutex::new(ResultCache::new(
                Duration::from_secs(config.cache.ttl_secs),
                config.cache.capacity,
            )),
        }
    }

    /// Resolve one query. Repeated queries within the cache TTL are served
    /// without touching the network.
    pub fn resolve(&self, query: &str) -> AthleteRecord {
        let key = normalize_key(query);
        if let Some(record) = self.cache.lock().ok().and_then(|mut c| c.get(&key)) {
            debug!("cache hit for {key:?}");
            return record;
        }

        let record = match self.find_profile(query) {
            Some((slug, body)) => self.build_record(query, &slug, &body),
            None => {
                info!("No profile found for {query:?}");
                AthleteRecord::not_found(query.trim(), &self.locale_codes)
            }
        };

        match self.cache.lock() {
            Ok(mut cache) => cache.put(&key, record.clone()),
            Err(e) => warn!("result cache unavailable: {e}"),
        }
        record
    }

    /// Resolve queries one after another, pausing between them.
    pub fn resolve_batch<S: AsRef<str>>(&self, queries: &[S]) -> Vec<AthleteRecord> {
        self.resolve_batch_with(queries, |_| {})
    }

    /// Like [`resolve_batch`](Self::resolve_batch), calling `on_record`
    /// after each query completes.
    pub fn resolve_batch_with<S, F>(&self, queries: &[S], mut on_record: F) -> Vec<AthleteRecord>
    where
        S: AsRef<str>,
        F: FnMut(&AthleteRecord),
    {
        let mut records = Vec::with_capacity(queries.len());
        for (i, query) in queries.iter().enumerate() {
            if i > 0 && !self.batch_delay.is_zero() {
                std::thread::sleep(self.batch_delay);
            }
            let record = self.resolve(query.as_ref());
            on_record(&record);
            records.push(record);
        }
        records
    }

    // ── Internal helpers ─────────────────────────────────────────────

    /// Try candidates in order; the first profile page found wins.
    fn find_profile(&self, query: &str) -> Option<(String, String)> {
        for candidate in slug::candidates_for(query) {
            if candidate.is_empty() {
                continue;
            }
            if let FetchResult::Found { slug, body } = self.fetcher.fetch(&candidate) {
                return Some((slug, body));
            }
            debug!("candidate {candidate:?} absent");
        }
        None
    }

    fn build_record(&self, query: &str, slug: &str, body: &str) -> AthleteRecord {
        let profile_url = self.fetcher.profile_url("", slug);
        let names = self.localized_names(slug, &profile_url, body);

        let ctx = NationalityContext {
            slug,
            document: body,
            profile_url: &profile_url,
        };
        let (nationality, nationalities, nationality_source) = match self.chain.determine(&ctx) {
            Some(c) => (c.values.join(&self.separator), c.values, Some(c.source)),
            None => (NOT_FOUND.to_string(), Vec::new(), None),
        };

        let nickname = self.pick_nickname(&names);
        info!("Resolved {query:?} as {slug} ({nationality})");

        AthleteRecord {
            query: query.trim().to_string(),
            resolved_slug: Some(slug.to_string()),
            names,
            nationality,
            nationalities,
            nationality_source,
            nickname,
            profile_url,
            status: ResolutionStatus::Found,
            resolved_at: Utc::now(),
        }
    }

    /// Fetch and extract every locale's name on a bounded worker pool.
    /// A failing locale degrades to "Not found" without affecting others.
    fn localized_names(&self, slug: &str, profile_url: &str, body: &str) -> Vec<LocalizedName> {
        let total = self.locales.len();
        let next = &AtomicUsize::new(0);
        let workers = self.worker_width.min(total);

        let mut slots: Vec<Option<LocalizedName>> = vec![None; total];
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    s.spawn(move || {
                        let mut done = Vec::new();
                        loop {
                            let i = next.fetch_add(1, Ordering::SeqCst);
                            let Some(locale) = self.locales.get(i) else {
                                break;
                            };
                            done.push((i, self.localized_name(locale, slug, profile_url, body)));
                        }
                        done
                    })
                })
                .collect();

            for handle in handles {
                match handle.join() {
                    Ok(done) => {
                        for (i, name) in done {
                            slots[i] = Some(name);
                        }
                    }
                    Err(_) => warn!("locale worker for {slug} panicked"),
                }
            }
        });

        slots
            .into_iter()
            .zip(&self.locales)
            .map(|(slot, locale)| slot.unwrap_or_else(|| LocalizedName::not_found(&locale.code)))
            .collect()
    }

    fn localized_name(
        &self,
        locale: &LocaleConfig,
        slug: &str,
        profile_url: &str,
        body: &str,
    ) -> LocalizedName {
        let url = self.fetcher.profile_url(&locale.path_prefix, slug);
        if url == profile_url {
            return extract::extract(body, &locale.code);
        }
        match self.fetcher.get_document(&url) {
            Some(localized) => extract::extract(&localized, &locale.code),
            None => LocalizedName::not_found(&locale.code),
        }
    }

    /// Primary locale's nickname, else the first other locale carrying one.
    fn pick_nickname(&self, names: &[LocalizedName]) -> String {
        let has_nickname =
            |n: &&LocalizedName| n.nickname.as_deref().is_some_and(|s| !s.is_empty());

        names
            .iter()
            .filter(has_nickname)
            .find(|n| n.locale == self.primary_locale)
            .or_else(|| names.iter().find(has_nickname))
            .and_then(|n| n.nickname.clone())
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }
}
