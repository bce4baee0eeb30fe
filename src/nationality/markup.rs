/// Country from the labelled attribute blocks on the profile page itself.
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::{NationalityCandidate, NationalityContext, NationalitySource, NationalityStrategy};

static ATTR_BLOCK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.attr").unwrap());
static ATTR_TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".title").unwrap());
static ATTR_LINKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".value a").unwrap());

/// Reads `<div class="attr"><h5 class="title">Country</h5>
/// <div class="value"><a>…</a></div></div>` blocks.
pub struct MarkupStrategy;

impl NationalityStrategy for MarkupStrategy {
    fn source(&self) -> NationalitySource {
        NationalitySource::Markup
    }

    fn attempt(&self, ctx: &NationalityContext<'_>) -> Option<NationalityCandidate> {
        NationalityCandidate::new(NationalitySource::Markup, countries_from_markup(ctx.document))
    }
}

/// All linked values of the first attribute block labelled "country".
#[must_use]
pub fn countries_from_markup(document: &str) -> Vec<String> {
    let document = Html::parse_document(document);

    document
        .select(&ATTR_BLOCK)
        .filter(|block| is_country_block(*block))
        .map(|block| {
            block
                .select(&ATTR_LINKS)
                .map(|a| a.text().collect::<String>().trim().to_string())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
        })
        .find(|values| !values.is_empty())
        .unwrap_or_default()
}

fn is_country_block(block: ElementRef<'_>) -> bool {
    block.select(&ATTR_TITLE).next().is_some_and(|title| {
        title
            .text()
            .collect::<String>()
            .to_lowercase()
            .contains("country")
    })
}
