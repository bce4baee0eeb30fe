/// Nationality guessed from a third-party search API response.
///
/// The structured answer box is read first, then the knowledge graph, then
/// snippets of the first few organic results and related questions are
/// matched against a handful of textual templates. This is the least
/// reliable source that still talks to the network.
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use super::{NationalityCandidate, NationalityContext, NationalitySource, NationalityStrategy};
use crate::config::SearchConfig;
use crate::fetcher::HttpClient;

/// Longest direct answer accepted verbatim, in words.
const MAX_DIRECT_ANSWER_WORDS: usize = 3;

static TEMPLATES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i:nationality)\s*[:\-]\s*(\p{Lu}\p{L}+(?:[ \-]\p{Lu}\p{L}+)*)",
        r"\bis an? (\p{Lu}\p{L}+)\b[\p{L}\- ]*?\b(?i:fighter|kickboxer|boxer|martial artist)",
        r"\bfrom (?:the )?(\p{Lu}\p{L}+(?: \p{Lu}\p{L}+)*)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

// ── Response shape ───────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub answer_box: Option<AnswerBox>,
    #[serde(default)]
    pub knowledge_graph: Option<KnowledgeGraph>,
    #[serde(default)]
    pub organic_results: Vec<OrganicResult>,
    #[serde(default)]
    pub related_questions: Vec<RelatedQuestion>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnswerBox {
    pub answer: Option<String>,
    pub snippet: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct KnowledgeGraph {
    pub nationality: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrganicResult {
    pub title: Option<String>,
    pub snippet: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RelatedQuestion {
    pub snippet: Option<String>,
}

// ── Strategy ─────────────────────────────────────────────────────────

pub struct SearchStrategy {
    http: Arc<dyn HttpClient>,
    api_url: String,
    api_key: String,
    engine: String,
    qualifier: String,
    max_results: usize,
}

impl SearchStrategy {
    pub fn from_config(config: &SearchConfig, http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            engine: config.engine.clone(),
            qualifier: config.qualifier.clone(),
            max_results: config.max_results,
        }
    }

    /// Search text for `slug`: its tokens plus the qualifying phrase.
    #[must_use]
    pub fn query_for(&self, slug: &str) -> String {
        let mut parts: Vec<&str> = slug.split('-').filter(|t| !t.is_empty()).collect();
        if !self.qualifier.is_empty() {
            parts.push(&self.qualifier);
        }
        parts.join(" ")
    }

    fn request_url(&self, slug: &str) -> Option<String> {
        let query = self.query_for(slug);
        let params = [
            ("q", query.as_str()),
            ("api_key", self.api_key.as_str()),
            ("engine", self.engine.as_str()),
        ];
        match reqwest::Url::parse_with_params(&self.api_url, &params) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                debug!("invalid search api url {}: {e}", self.api_url);
                None
            }
        }
    }
}

impl NationalityStrategy for SearchStrategy {
    fn source(&self) -> NationalitySource {
        NationalitySource::SearchApi
    }

    fn attempt(&self, ctx: &NationalityContext<'_>) -> Option<NationalityCandidate> {
        if self.api_key.is_empty() || ctx.slug.is_empty() {
            return None;
        }
        let url = self.request_url(ctx.slug)?;
        let body = self
            .http
            .get(&url)
            .inspect_err(|e| debug!("search api request failed: {e}"))
            .ok()?;
        let response: SearchResponse = serde_json::from_str(&body)
            .inspect_err(|e| debug!("search api response unparseable: {e}"))
            .ok()?;

        let value = nationality_from_response(&response, self.max_results)?;
        NationalityCandidate::new(NationalitySource::SearchApi, [value])
    }
}

// ── Response scanning ────────────────────────────────────────────────

/// Scan a search response for a nationality, most structured field first.
#[must_use]
pub fn nationality_from_response(response: &SearchResponse, max_results: usize) -> Option<String> {
    if let Some(answer_box) = &response.answer_box {
        if let Some(answer) = answer_box.answer.as_deref().and_then(direct_answer) {
            return Some(answer);
        }
        let texts = [answer_box.answer.as_deref(), answer_box.snippet.as_deref()];
        if let Some(found) = texts.into_iter().flatten().find_map(match_templates) {
            return Some(found);
        }
    }

    if let Some(graph) = &response.knowledge_graph {
        if let Some(nationality) = graph.nationality.as_deref().and_then(direct_answer) {
            return Some(nationality);
        }
        if let Some(found) = graph.description.as_deref().and_then(match_templates) {
            return Some(found);
        }
    }

    let organic = response
        .organic_results
        .iter()
        .take(max_results)
        .flat_map(|r| [r.snippet.as_deref(), r.title.as_deref()]);
    let related = response
        .related_questions
        .iter()
        .take(max_results)
        .map(|q| q.snippet.as_deref());

    organic.chain(related).flatten().find_map(match_templates)
}

/// A short, capitalised answer is taken as-is.
fn direct_answer(text: &str) -> Option<String> {
    let text = text.trim().trim_end_matches('.');
    let words = text.split_whitespace().count();
    let capitalised = text.chars().next().is_some_and(char::is_uppercase);
    (words > 0 && words <= MAX_DIRECT_ANSWER_WORDS && capitalised).then(|| text.to_string())
}

/// First template that matches `text`, in template order.
#[must_use]
pub fn match_templates(text: &str) -> Option<String> {
    TEMPLATES.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
    })
}
