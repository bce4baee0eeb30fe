/// Hand-maintained slug → country table, consulted last.
use std::collections::{BTreeMap, HashMap};

use super::{NationalityCandidate, NationalityContext, NationalitySource, NationalityStrategy};

const BUILTIN: &[(&str, &str)] = &[
    ("rodtang", "Thailand"),
    ("superlek", "Thailand"),
    ("tawanchai", "Thailand"),
    ("nong-o", "Thailand"),
    ("stamp-fairtex", "Thailand"),
    ("demetrious-johnson", "United States"),
    ("adriano-moraes", "Brazil"),
    ("fabricio-andrade", "Brazil"),
    ("jonathan-haggerty", "United Kingdom"),
    ("takeru", "Japan"),
    ("anatoly-malykhin", "Russia"),
    ("christian-lee", "Singapore"),
    ("angela-lee", "Singapore"),
    ("xiong-jing-nan", "China"),
    ("joshua-pacio", "Philippines"),
];

pub struct StaticTableStrategy {
    table: HashMap<String, String>,
}

impl StaticTableStrategy {
    /// The built-in table.
    #[must_use]
    pub fn builtin() -> Self {
        Self::with_overrides(&BTreeMap::new())
    }

    /// The built-in table with `overrides` layered on top.
    #[must_use]
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let mut table: HashMap<String, String> = BUILTIN
            .iter()
            .map(|&(slug, country)| (slug.to_string(), country.to_string()))
            .collect();
        for (slug, country) in overrides {
            table.insert(slug.trim().to_lowercase(), country.clone());
        }
        Self { table }
    }

    #[must_use]
    pub fn lookup(&self, slug: &str) -> Option<&str> {
        self.table.get(&slug.to_lowercase()).map(String::as_str)
    }
}

impl NationalityStrategy for StaticTableStrategy {
    fn source(&self) -> NationalitySource {
        NationalitySource::StaticTable
    }

    fn attempt(&self, ctx: &NationalityContext<'_>) -> Option<NationalityCandidate> {
        NationalityCandidate::new(NationalitySource::StaticTable, self.lookup(ctx.slug))
    }
}
