/// Nationality determination.
///
/// A `NationalityChain` holds an ordered list of independent strategies and
/// returns the first hit. The order is the trust ranking: profile markup,
/// then the site-wide index, then third-party search, then the static table.
pub mod markup;
pub mod search;
pub mod site_index;
pub mod static_table;

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

pub use markup::MarkupStrategy;
pub use search::SearchStrategy;
pub use site_index::SiteIndexStrategy;
pub use static_table::StaticTableStrategy;

use crate::config::Config;
use crate::fetcher::HttpClient;

/// Which strategy produced an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NationalitySource {
    Markup,
    SiteIndex,
    SearchApi,
    StaticTable,
}

impl NationalitySource {
    /// Ordinal trust rank of answers from this source.
    #[must_use]
    pub fn confidence(self) -> Confidence {
        match self {
            Self::Markup => Confidence::Direct,
            Self::SiteIndex => Confidence::Indexed,
            Self::SearchApi => Confidence::Heuristic,
            Self::StaticTable => Confidence::Fallback,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Markup => "markup",
            Self::SiteIndex => "site-index",
            Self::SearchApi => "search-api",
            Self::StaticTable => "static-table",
        }
    }
}

/// Ordinal rank used for tie-breaking; not a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Fallback,
    Heuristic,
    Indexed,
    Direct,
}

/// One strategy's answer. `values` holds one country per entry in source
/// order (several for multi-nationality athletes), never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NationalityCandidate {
    pub source: NationalitySource,
    pub values: Vec<String>,
    pub confidence: Confidence,
}

impl NationalityCandidate {
    /// Build a candidate from raw values, trimming and deduplicating them.
    /// Returns `None` if nothing usable remains.
    #[must_use]
    pub fn new<I, S>(source: NationalitySource, values: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let values: Vec<String> = values
            .into_iter()
            .map(|v| v.as_ref().split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|v| !v.is_empty() && seen.insert(v.to_lowercase()))
            .collect();

        (!values.is_empty()).then(|| Self {
            source,
            values,
            confidence: source.confidence(),
        })
    }
}

/// Everything a strategy may look at.
#[derive(Debug, Clone, Copy)]
pub struct NationalityContext<'a> {
    pub slug: &'a str,
    /// Body of the default-locale profile page.
    pub document: &'a str,
    pub profile_url: &'a str,
}

/// Trait for one self-contained way of finding a nationality.
///
/// `attempt` must fail soft: any network or parse problem is a miss.
pub trait NationalityStrategy: Send + Sync {
    fn source(&self) -> NationalitySource;

    fn attempt(&self, ctx: &NationalityContext<'_>) -> Option<NationalityCandidate>;
}

/// Ordered strategy list, first hit wins.
pub struct NationalityChain {
    strategies: Vec<Box<dyn NationalityStrategy>>,
}

impl NationalityChain {
    pub fn new(strategies: Vec<Box<dyn NationalityStrategy>>) -> Self {
        Self { strategies }
    }

    /// The standard four-strategy chain configured from `config`.
    pub fn standard(config: &Config, http: Arc<dyn HttpClient>) -> Self {
        Self::new(vec![
            Box::new(MarkupStrategy),
            Box::new(SiteIndexStrategy::from_config(config, Arc::clone(&http))),
            Box::new(SearchStrategy::from_config(&config.search, http)),
            Box::new(StaticTableStrategy::with_overrides(&config.static_nationalities)),
        ])
    }

    /// Sources in the order they are consulted.
    #[must_use]
    pub fn sources(&self) -> Vec<NationalitySource> {
        self.strategies.iter().map(|s| s.source()).collect()
    }

    /// Run the strategies in order and return the first answer.
    pub fn determine(&self, ctx: &NationalityContext<'_>) -> Option<NationalityCandidate> {
        for strategy in &self.strategies {
            match strategy.attempt(ctx) {
                Some(candidate) => {
                    debug!(
                        "nationality for {} from {}: {:?}",
                        ctx.slug,
                        candidate.source.as_str(),
                        candidate.values
                    );
                    return Some(candidate);
                }
                None => debug!("{} missed for {}", strategy.source().as_str(), ctx.slug),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        source: NationalitySource,
        value: Option<&'static str>,
    }

    impl Fixed {
        fn boxed(
            source: NationalitySource,
            value: Option<&'static str>,
        ) -> Box<dyn NationalityStrategy> {
            Box::new(Self { source, value })
        }
    }

    impl NationalityStrategy for Fixed {
        fn source(&self) -> NationalitySource {
            self.source
        }

        fn attempt(&self, _ctx: &NationalityContext<'_>) -> Option<NationalityCandidate> {
            NationalityCandidate::new(self.source, self.value)
        }
    }

    fn ctx() -> NationalityContext<'static> {
        NationalityContext {
            slug: "rodtang",
            document: "",
            profile_url: "https://example.test/athletes/rodtang/",
        }
    }

    #[test]
    fn test_first_hit_wins() {
        let chain = NationalityChain::new(vec![
            Fixed::boxed(NationalitySource::Markup, Some("Thailand")),
            Fixed::boxed(NationalitySource::StaticTable, Some("Japan")),
        ]);
        let hit = chain.determine(&ctx()).unwrap();
        assert_eq!(hit.source, NationalitySource::Markup);
        assert_eq!(hit.values, vec!["Thailand"]);
        assert_eq!(hit.confidence, Confidence::Direct);
    }

    #[test]
    fn test_falls_through_misses() {
        let chain = NationalityChain::new(vec![
            Fixed::boxed(NationalitySource::Markup, None),
            Fixed::boxed(NationalitySource::SiteIndex, None),
            Fixed::boxed(NationalitySource::StaticTable, Some("Brazil")),
        ]);
        let hit = chain.determine(&ctx()).unwrap();
        assert_eq!(hit.source, NationalitySource::StaticTable);
    }

    #[test]
    fn test_all_miss() {
        let chain = NationalityChain::new(vec![
            Fixed::boxed(NationalitySource::Markup, None),
            Fixed::boxed(NationalitySource::SearchApi, None),
        ]);
        assert!(chain.determine(&ctx()).is_none());
    }

    #[test]
    fn test_confidence_follows_trust_order() {
        assert!(Confidence::Direct > Confidence::Indexed);
        assert!(Confidence::Indexed > Confidence::Heuristic);
        assert!(Confidence::Heuristic > Confidence::Fallback);
    }

    #[test]
    fn test_candidate_dedup_and_empty() {
        let c = NationalityCandidate::new(
            NationalitySource::Markup,
            ["Thailand", " thailand ", "Japan", ""],
        )
        .unwrap();
        assert_eq!(c.values, vec!["Thailand", "Japan"]);
        assert!(NationalityCandidate::new(NationalitySource::Markup, ["  "]).is_none());
    }

    #[test]
    fn test_standard_chain_order() {
        let config = Config::default();
        let http: Arc<dyn HttpClient> = Arc::new(crate::fetcher::mock::MockHttp::new());
        let chain = NationalityChain::standard(&config, http);
        assert_eq!(
            chain.sources(),
            vec![
                NationalitySource::Markup,
                NationalitySource::SiteIndex,
                NationalitySource::SearchApi,
                NationalitySource::StaticTable,
            ]
        );
    }
}
