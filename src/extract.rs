/// Display name and nickname extraction from profile pages.
use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::debug;

use crate::models::LocalizedName;

/// Quote pairs recognised around a nickname, tried in order.
const QUOTE_PAIRS: &[(char, char)] = &[('\u{201C}', '\u{201D}'), ('"', '"')];

static PREFERRED_HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1.use-letter-spacing-hint").unwrap());
static ANY_HEADING: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());

/// Extract the athlete's name for `locale` from a profile page body.
///
/// Missing heading yields a `"Not found"` display name.
#[must_use]
pub fn extract(body: &str, locale: &str) -> LocalizedName {
    let Some(heading) = heading_text(body) else {
        debug!("no heading found for locale {locale}");
        return LocalizedName::not_found(locale);
    };

    let (display_name, nickname) = extract_nickname_and_clean(&heading);
    LocalizedName {
        locale: locale.to_string(),
        display_name,
        nickname,
    }
}

/// Whitespace-collapsed text of the page's primary heading.
fn heading_text(body: &str) -> Option<String> {
    let document = Html::parse_document(body);
    let element = document
        .select(&PREFERRED_HEADING)
        .next()
        .or_else(|| document.select(&ANY_HEADING).next())?;

    let text = collapse_ws(&element.text().collect::<String>());
    (!text.is_empty()).then_some(text)
}

/// Split a quoted nickname out of a heading.
///
/// `Fabricio "Wonder Boy" Andrade` becomes (`Fabricio Andrade`,
/// `Some("Wonder Boy")`). Curly quotes are tried before straight ones.
/// Without a quoted run the text comes back unchanged (modulo whitespace).
#[must_use]
pub fn extract_nickname_and_clean(text: &str) -> (String, Option<String>) {
    for &(open, close) in QUOTE_PAIRS {
        let Some(start) = text.find(open) else {
            continue;
        };
        let inner_start = start + open.len_utf8();
        let Some(inner_len) = text[inner_start..].find(close) else {
            continue;
        };
        let nickname = text[inner_start..inner_start + inner_len].trim();
        if nickname.is_empty() {
            continue;
        }
        let end = inner_start + inner_len + close.len_utf8();
        let remainder = format!("{} {}", &text[..start], &text[end..]);
        return (tidy(&remainder), Some(nickname.to_string()));
    }

    (collapse_ws(text), None)
}

/// Collapse whitespace and clear up commas left behind by a removal.
fn tidy(s: &str) -> String {
    let mut out = collapse_ws(s).replace(" ,", ",");
    while out.contains(",,") {
        out = out.replace(",,", ",");
    }
    out.trim_matches(|c: char| c == ',' || c.is_whitespace())
        .to_string()
}

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
