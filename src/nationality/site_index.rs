/// Country lookup through a crawled index of the site's athlete listing.
///
/// The listing pages are crawled once and the slug → country map is kept
/// for `ttl`. Crawl failures only shrink the index; they are never errors.
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex};
use std::time::{Duration, Instant};

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use super::{NationalityCandidate, NationalityContext, NationalitySource, NationalityStrategy};
use crate::config::Config;
use crate::fetcher::HttpClient;
use crate::slug::slug_from_url;

static CARD: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.simple-post-card, div.athlete-card, article").unwrap()
});
static PROFILE_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href*="/athletes/"]"#).unwrap());
static COUNTRY_BADGE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#".country, .athlete-country, [class*="country"]"#).unwrap()
});
static BADGE_IMAGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img[alt], img[title]").unwrap());

type SlugIndex = HashMap<String, Vec<String>>;

struct BuiltIndex {
    built_at: Instant,
    entries: Arc<SlugIndex>,
}

pub struct SiteIndexStrategy {
    http: Arc<dyn HttpClient>,
    listing_url: String,
    max_pages: usize,
    ttl: Duration,
    index: Mutex<Option<BuiltIndex>>,
}

impl SiteIndexStrategy {
    pub fn new(
        http: Arc<dyn HttpClient>,
        listing_url: &str,
        max_pages: usize,
        ttl: Duration,
    ) -> Self {
        let mut listing_url = listing_url.to_string();
        if !listing_url.ends_with('/') {
            listing_url.push('/');
        }
        Self {
            http,
            listing_url,
            max_pages,
            ttl,
            index: Mutex::new(None),
        }
    }

    pub fn from_config(config: &Config, http: Arc<dyn HttpClient>) -> Self {
        let listing_url = format!(
            "{}/{}",
            config.base_url.trim_end_matches('/'),
            config.site_index.listing_path.trim_start_matches('/')
        );
        Self::new(
            http,
            &listing_url,
            config.site_index.max_pages,
            Duration::from_secs(config.site_index.ttl_secs),
        )
    }

    /// Countries recorded for `slug`, crawling the listing if needed.
    pub fn lookup(&self, slug: &str) -> Option<Vec<String>> {
        let entries = self.entries()?;
        entries.get(&slug.to_lowercase()).cloned()
    }

    fn entries(&self) -> Option<Arc<SlugIndex>> {
        let mut guard = self.index.lock().ok()?;
        if let Some(built) = guard.as_ref() {
            if built.built_at.elapsed() < self.ttl {
                return Some(Arc::clone(&built.entries));
            }
        }

        let entries = Arc::new(self.crawl());
        *guard = Some(BuiltIndex {
            built_at: Instant::now(),
            entries: Arc::clone(&entries),
        });
        Some(entries)
    }

    fn page_url(&self, page: usize) -> String {
        if page <= 1 {
            self.listing_url.clone()
        } else {
            format!("{}page/{page}/", self.listing_url)
        }
    }

    /// Walk listing pages until one is missing or empty.
    fn crawl(&self) -> SlugIndex {
        let mut index = SlugIndex::new();
        for page in 1..=self.max_pages {
            let url = self.page_url(page);
            let body = match self.http.get(&url) {
                Ok(body) => body,
                Err(e) => {
                    debug!("listing page {url} unavailable: {e}");
                    break;
                }
            };
            let entries = parse_listing(&body);
            if entries.is_empty() {
                break;
            }
            for (slug, country) in entries {
                index.entry(slug).or_insert_with(|| vec![country]);
            }
        }
        info!("Site index built with {} athletes", index.len());
        index
    }
}

impl NationalityStrategy for SiteIndexStrategy {
    fn source(&self) -> NationalitySource {
        NationalitySource::SiteIndex
    }

    fn attempt(&self, ctx: &NationalityContext<'_>) -> Option<NationalityCandidate> {
        let countries = self.lookup(ctx.slug)?;
        NationalityCandidate::new(NationalitySource::SiteIndex, countries)
    }
}

/// Pair each athlete card's slug with its country badge.
#[must_use]
pub fn parse_listing(html: &str) -> Vec<(String, String)> {
    let document = Html::parse_document(html);
    let mut out = Vec::new();

    for card in document.select(&CARD) {
        // wrappers around other cards are not cards themselves
        if card.select(&CARD).next().is_some() {
            continue;
        }
        let mut slugs: Vec<String> = card
            .select(&PROFILE_LINK)
            .filter_map(|a| a.value().attr("href"))
            .filter_map(slug_from_url)
            .collect();
        slugs.sort();
        slugs.dedup();
        if slugs.len() != 1 {
            continue;
        }
        let slug = slugs.remove(0);
        let Some(country) = card.select(&COUNTRY_BADGE).find_map(badge_text) else {
            continue;
        };
        out.push((slug, country));
    }
    out
}

/// Badge text, or the alt/title of a flag image inside it.
fn badge_text(badge: ElementRef<'_>) -> Option<String> {
    let text = badge.text().collect::<Vec<_>>().join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if !text.is_empty() {
        return Some(text);
    }
    badge
        .select(&BADGE_IMAGE)
        .filter_map(|img| img.value().attr("alt").or_else(|| img.value().attr("title")))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}
