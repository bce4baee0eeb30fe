/// End-to-end tests for the resolution pipeline.
///
/// Tests the complete flow:
///   Query → Slug candidates → Fetch → Names × locales + Nationality chain → Cache
use std::io::Read;
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use athlete_resolver::config::Config;
use athlete_resolver::fetcher::mock::MockHttp;
use athlete_resolver::fetcher::{HttpClient, ReqwestClient, ResourceFetcher};
use athlete_resolver::models::{FetchResult, NOT_FOUND};
use athlete_resolver::nationality::NationalitySource;
use athlete_resolver::{AthleteResolutionPipeline, ResolutionStatus};

const BASE: &str = "https://example.test";

const RODTANG_EN: &str = r#"<html><body>
    <h1 class="use-letter-spacing-hint my-4">Rodtang “The Iron Man” Jitmuangnon</h1>
    <div class="attr"><h5 class="title">Country</h5>
      <div class="value"><a href="/country/thailand">Thailand</a></div></div>
</body></html>"#;

fn config() -> Config {
    Config {
        base_url: BASE.to_string(),
        batch_delay_ms: 0,
        ..Config::default()
    }
}

fn url(path: &str) -> String {
    format!("{BASE}{path}")
}

/// Mock site with Rodtang's profile on all four locales.
fn rodtang_site() -> Arc<MockHttp> {
    let mock = Arc::new(MockHttp::new());
    mock.respond(&url("/athletes/rodtang/"), RODTANG_EN);
    mock.respond(&url("/th/athletes/rodtang/"), "<h1>รถถัง จิตรเมืองนนท์</h1>");
    mock.respond(&url("/jp/athletes/rodtang/"), "<h1>ロッタン・ジットムアンノン</h1>");
    mock.respond(&url("/cn/athletes/rodtang/"), "<h1>罗唐</h1>");
    mock
}

/// Full resolution: names in every locale, nickname, markup nationality.
#[test]
fn test_full_resolution() {
    let mock = rodtang_site();
    let pipeline = AthleteResolutionPipeline::new(&config(), mock.clone());

    let record = pipeline.resolve("Rodtang");

    assert_eq!(record.status, ResolutionStatus::Found);
    assert_eq!(record.resolved_slug.as_deref(), Some("rodtang"));
    assert_eq!(record.profile_url, url("/athletes/rodtang/"));
    assert_eq!(record.nationality, "Thailand");
    assert_eq!(record.nationality_source, Some(NationalitySource::Markup));
    assert_eq!(record.nickname, "The Iron Man");

    let locales: Vec<&str> = record.names.iter().map(|n| n.locale.as_str()).collect();
    assert_eq!(locales, vec!["en", "th", "jp", "cn"]);
    assert_eq!(record.name_for("en").unwrap().display_name, "Rodtang Jitmuangnon");
    assert_eq!(record.name_for("th").unwrap().display_name, "รถถัง จิตรเมืองนนท์");
    assert_eq!(record.name_for("jp").unwrap().display_name, "ロッタン・ジットムアンノン");
    assert_eq!(record.name_for("cn").unwrap().display_name, "罗唐");
}

/// Second resolve within the TTL is identical and makes no request.
#[test]
fn test_resolve_is_cached() {
    let mock = rodtang_site();
    let pipeline = AthleteResolutionPipeline::new(&config(), mock.clone());

    let first = pipeline.resolve("Rodtang");
    let requests_after_first = mock.request_count();
    let second = pipeline.resolve("  rodtang ");

    assert_eq!(first, second, "cached record should be identical");
    assert_eq!(mock.request_count(), requests_after_first);
}

/// NotFound results are cached too.
#[test]
fn test_not_found_is_cached() {
    let mock = Arc::new(MockHttp::new());
    let pipeline = AthleteResolutionPipeline::new(&config(), mock.clone());

    let first = pipeline.resolve("NoSuchAthlete123");
    let count = mock.request_count();
    let second = pipeline.resolve("NoSuchAthlete123");

    assert_eq!(first.status, ResolutionStatus::NotFound);
    assert_eq!(first, second);
    assert_eq!(mock.request_count(), count);
}

/// Markup on the profile outranks the static table for the same slug.
#[test]
fn test_markup_beats_static_table() {
    let mock = rodtang_site();
    let mut cfg = config();
    cfg.static_nationalities
        .insert("rodtang".to_string(), "Static Land".to_string());
    let pipeline = AthleteResolutionPipeline::new(&cfg, mock);

    let record = pipeline.resolve("Rodtang");
    assert_eq!(record.nationality, "Thailand");
    assert_eq!(record.nationality_source, Some(NationalitySource::Markup));
}

/// Without markup, the static table answers.
#[test]
fn test_static_table_fallback() {
    let mock = Arc::new(MockHttp::new());
    mock.respond(&url("/athletes/takeru/"), "<h1>Takeru</h1>");
    let pipeline = AthleteResolutionPipeline::new(&config(), mock);

    let record = pipeline.resolve("Takeru");
    assert_eq!(record.nationality, "Japan");
    assert_eq!(record.nationality_source, Some(NationalitySource::StaticTable));
}

/// The crawled site index outranks the static table.
#[test]
fn test_site_index_beats_static_table() {
    let mock = Arc::new(MockHttp::new());
    mock.respond(&url("/athletes/takeru/"), "<h1>Takeru</h1>");
    mock.respond(
        &url("/athletes/"),
        r#"<div class="simple-post-card"><a href="/athletes/takeru/">Takeru</a>
           <span class="athlete-country">Japan (listing)</span></div>"#,
    );
    let pipeline = AthleteResolutionPipeline::new(&config(), mock);

    let record = pipeline.resolve("Takeru");
    assert_eq!(record.nationality, "Japan (listing)");
    assert_eq!(record.nationality_source, Some(NationalitySource::SiteIndex));
}

/// Every strategy missing yields the literal sentinel.
#[test]
fn test_all_strategies_miss() {
    let mock = Arc::new(MockHttp::new());
    mock.respond(&url("/athletes/unknown-fighter/"), "<h1>Unknown Fighter</h1>");
    let pipeline = AthleteResolutionPipeline::new(&config(), mock);

    let record = pipeline.resolve("Unknown Fighter");
    assert_eq!(record.status, ResolutionStatus::Found);
    assert_eq!(record.nationality, NOT_FOUND);
    assert!(record.nationalities.is_empty());
    assert!(record.nationality_source.is_none());
    assert_eq!(record.nickname, "-");
}

/// Search API answers when the page and index have nothing.
#[test]
fn test_search_strategy_in_pipeline() {
    let mock = Arc::new(MockHttp::new());
    mock.respond(&url("/athletes/new-face/"), "<h1>New Face</h1>");
    mock.respond(
        "https://search.test/?q=new+face+ONE+Championship+fighter+nationality&api_key=k&engine=google",
        r#"{"organic_results": [{"snippet": "New Face is a Mongolian fighter"}]}"#,
    );
    let mut cfg = config();
    cfg.search.api_url = "https://search.test/".to_string();
    cfg.search.api_key = "k".to_string();
    let pipeline = AthleteResolutionPipeline::new(&cfg, mock);

    let record = pipeline.resolve("New Face");
    assert_eq!(record.nationality, "Mongolian");
    assert_eq!(record.nationality_source, Some(NationalitySource::SearchApi));
}

/// A missing locale page degrades only that locale.
#[test]
fn test_locale_failure_is_isolated() {
    let mock = Arc::new(MockHttp::new());
    mock.respond(&url("/athletes/rodtang/"), RODTANG_EN);
    mock.respond(&url("/jp/athletes/rodtang/"), "<h1>ロッタン</h1>");
    mock.respond_status(&url("/th/athletes/rodtang/"), 500);
    mock.respond(&url("/cn/athletes/rodtang/"), "<p>no heading</p>");
    let pipeline = AthleteResolutionPipeline::new(&config(), mock);

    let record = pipeline.resolve("Rodtang");
    assert_eq!(record.name_for("en").unwrap().display_name, "Rodtang Jitmuangnon");
    assert_eq!(record.name_for("th").unwrap().display_name, NOT_FOUND);
    assert_eq!(record.name_for("jp").unwrap().display_name, "ロッタン");
    assert_eq!(record.name_for("cn").unwrap().display_name, NOT_FOUND);
}

/// Locale fetches run side by side, not one after another.
#[test]
fn test_locale_fetches_are_concurrent() {
    let delay = Duration::from_millis(400);
    let mock = Arc::new(MockHttp::new().with_delay(delay));
    mock.respond(&url("/athletes/rodtang/"), RODTANG_EN);
    let pipeline = AthleteResolutionPipeline::new(&config(), mock.clone());

    let start = Instant::now();
    let record = pipeline.resolve("Rodtang");
    let elapsed = start.elapsed();

    assert_eq!(record.status, ResolutionStatus::Found);
    // profile fetch + one parallel round of locale fetches; serial locale
    // fetches would take 4 × delay on their own
    assert!(
        elapsed < delay * 4,
        "resolution took {elapsed:?}, locale fetches look serial"
    );
}

/// Batch rows are independent of each other.
#[test]
fn test_batch_resolution() {
    let mock = rodtang_site();
    let pipeline = AthleteResolutionPipeline::new(&config(), mock);

    let records = pipeline.resolve_batch(&["Rodtang", "NoSuchAthlete123"]);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].status, ResolutionStatus::Found);
    assert_eq!(records[0].query, "Rodtang");
    assert_eq!(records[0].nationality, "Thailand");

    assert_eq!(records[1].status, ResolutionStatus::NotFound);
    assert_eq!(records[1].query, "NoSuchAthlete123");
    assert_eq!(records[1].nationality, "-");
    assert_eq!(records[1].nickname, "-");
    assert!(records[1].resolved_slug.is_none());
    assert!(records[1].names.iter().all(|n| n.display_name == "-"));
}

/// A responder that never answers resolves to Absent within the timeout.
#[test]
fn test_slow_responder_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming().flatten() {
            let mut stream = stream;
            let mut buf = [0_u8; 1024];
            let _ = stream.read(&mut buf);
            // Hold the connection open without replying.
            held.push(stream);
        }
    });

    let http: Arc<dyn HttpClient> =
        Arc::new(ReqwestClient::new("athlete-resolver-test", Duration::from_millis(300)).unwrap());
    let base = format!("http://127.0.0.1:{port}");

    let fetcher = ResourceFetcher::new(Arc::clone(&http), &base);
    let start = Instant::now();
    assert_eq!(fetcher.fetch("rodtang"), FetchResult::Absent);
    assert!(start.elapsed() < Duration::from_secs(3));

    let cfg = Config {
        base_url: base,
        batch_delay_ms: 0,
        ..Config::default()
    };
    let pipeline = AthleteResolutionPipeline::new(&cfg, http);
    let start = Instant::now();
    let record = pipeline.resolve("Rodtang");
    assert_eq!(record.status, ResolutionStatus::NotFound);
    assert!(start.elapsed() < Duration::from_secs(3));
}

/// Transport errors do not echo the request URL or its query string.
#[test]
fn test_transport_error_hides_url() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming().flatten() {
            held.push(stream);
        }
    });

    let client = ReqwestClient::new("athlete-resolver-test", Duration::from_millis(300)).unwrap();
    let err = client
        .get(&format!("http://127.0.0.1:{port}/search?api_key=s3cr3t-key"))
        .unwrap_err();
    let text = err.to_string();
    assert!(!text.contains("s3cr3t-key"), "error leaked the query: {text}");
    assert!(!text.contains("127.0.0.1"), "error leaked the url: {text}");
}

/// Config defaults and validation.
#[test]
fn test_config_defaults_and_validation() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.locale_codes(), vec!["en", "th", "jp", "cn"]);
    assert!(AthleteResolutionPipeline::from_config(&config).is_ok());

    let mut bad = Config::default();
    bad.worker_width = 0;
    assert!(AthleteResolutionPipeline::from_config(&bad).is_err());

    let slow = Config {
        request_timeout_secs: 600,
        ..Config::default()
    };
    assert!(AthleteResolutionPipeline::from_config(&slow).is_err());
}
