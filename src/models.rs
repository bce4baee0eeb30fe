/// Shared data types flowing through the resolution pipeline.
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::nationality::NationalitySource;

/// Sentinel used whenever a value could not be determined.
pub const NOT_FOUND: &str = "Not found";

/// Placeholder used for every field of a record that never resolved.
pub const PLACEHOLDER: &str = "-";

/// Outcome of requesting one candidate's profile page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    Found { slug: String, body: String },
    Absent,
}

/// A display name as rendered on one locale of the site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalizedName {
    pub locale: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
}

impl LocalizedName {
    #[must_use]
    pub fn not_found(locale: &str) -> Self {
        Self {
            locale: locale.to_string(),
            display_name: NOT_FOUND.to_string(),
            nickname: None,
        }
    }

    #[must_use]
    pub fn placeholder(locale: &str) -> Self {
        Self {
            locale: locale.to_string(),
            display_name: PLACEHOLDER.to_string(),
            nickname: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    Found,
    NotFound,
}

/// The merged answer for one query. Built once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AthleteRecord {
    pub query: String,
    pub resolved_slug: Option<String>,
    /// One entry per configured locale, in configuration order.
    pub names: Vec<LocalizedName>,
    pub nationality: String,
    pub nationalities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality_source: Option<NationalitySource>,
    pub nickname: String,
    pub profile_url: String,
    pub status: ResolutionStatus,
    pub resolved_at: DateTime<Utc>,
}

impl AthleteRecord {
    /// A record for a query whose candidates were all absent.
    #[must_use]
    pub fn not_found(query: &str, locales: &[impl AsRef<str>]) -> Self {
        Self {
            query: query.to_string(),
            resolved_slug: None,
            names: locales
                .iter()
                .map(|l| LocalizedName::placeholder(l.as_ref()))
                .collect(),
            nationality: PLACEHOLDER.to_string(),
            nationalities: Vec::new(),
            nationality_source: None,
            nickname: PLACEHOLDER.to_string(),
            profile_url: PLACEHOLDER.to_string(),
            status: ResolutionStatus::NotFound,
            resolved_at: Utc::now(),
        }
    }

    /// Look up the name rendered for `locale`.
    #[must_use]
    pub fn name_for(&self, locale: &str) -> Option<&LocalizedName> {
        self.names.iter().find(|n| n.locale == locale)
    }
}
