//! # athlete-resolver
//!
//! Resolves an athlete query (free-text name or profile URL) against a
//! combat-sports promotion's website: finds the profile by trying slug
//! candidates, reads the athlete's name from every localized version of
//! the site, and determines nationality from a ranked chain of sources.
//!
//! ## Architecture
//!
//! - **[`slug`]** — Slug candidates from a name, slug from a profile URL
//! - **[`fetcher`]** — `HttpClient` trait, reqwest client, profile fetcher
//! - **[`extract`]** — Display name and nickname from a profile heading
//! - **[`nationality`]** — Ordered strategy chain (markup, site index, search API, static table)
//! - **[`cache`]** — TTL + LRU result cache
//! - **[`pipeline`]** — `AthleteResolutionPipeline`, single and batch resolution
//! - **[`models`]** — Records and results shared across modules
//! - **[`config`]** — JSON configuration loading and validation

pub mod cache;
pub mod config;
pub mod extract;
pub mod fetcher;
pub mod models;
pub mod nationality;
pub mod pipeline;
pub mod slug;

pub use models::{AthleteRecord, LocalizedName, ResolutionStatus};
pub use pipeline::AthleteResolutionPipeline;
