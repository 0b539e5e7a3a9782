// Offline keyword-matched result table

use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use super::{WebResult, WebSearchTool};

struct Entry {
    keywords: &'static [&'static str],
    results: &'static [(&'static str, &'static str, &'static str)],
}

const TABLE: &[Entry] = &[
    Entry {
        keywords: &["nitrate pollution", "nitrate", "nitrates", "fertilizer", "fertiliser", "blue baby"],
        results: &[
            (
                "Nitrate pollution in groundwater",
                "Nitrate from fertilisers and manure leaches into aquifers; drinking water above 50 mg/L (10 mg/L as N) is linked to methaemoglobinaemia in infants.",
                "https://en.wikipedia.org/wiki/Nitrate#Human_health_effects",
            ),
            (
                "WHO guideline value for nitrate",
                "The WHO sets a guideline value of 50 mg/L nitrate to protect bottle-fed infants against methaemoglobinaemia.",
                "https://www.who.int/publications/i/item/9789240045064",
            ),
        ],
    },
    Entry {
        keywords: &["lead contamination", "lead", "service line", "flint"],
        results: &[(
            "Lead in drinking water",
            "Lead usually enters tap water from corroding service lines and plumbing; there is no known safe blood lead level.",
            "https://www.epa.gov/ground-water-and-drinking-water/basic-information-about-lead-drinking-water",
        )],
    },
    Entry {
        keywords: &["arsenic", "groundwater arsenic"],
        results: &[(
            "Arsenic contamination of groundwater",
            "Naturally occurring arsenic in groundwater affects millions of people; long-term exposure causes skin lesions and cancers.",
            "https://en.wikipedia.org/wiki/Arsenic_contamination_of_groundwater",
        )],
    },
    Entry {
        keywords: &["e. coli", "e.coli", "coliform", "bacteria", "pathogen", "pathogens", "microbial"],
        results: &[(
            "Faecal indicator bacteria",
            "E. coli in drinking water indicates recent faecal contamination; the WHO target is zero per 100 mL sample.",
            "https://en.wikipedia.org/wiki/Indicator_organism",
        )],
    },
    Entry {
        keywords: &["pfas", "pfoa", "pfos", "forever chemicals"],
        results: &[(
            "PFAS in drinking water",
            "Per- and polyfluoroalkyl substances persist in the environment; granular activated carbon and reverse osmosis reduce concentrations.",
            "https://en.wikipedia.org/wiki/Per-_and_polyfluoroalkyl_substances",
        )],
    },
    Entry {
        keywords: &["microplastic", "microplastics", "plastic"],
        results: &[(
            "Microplastics in water",
            "Microplastic particles are found in tap and bottled water; health effects at current exposure levels remain uncertain.",
            "https://en.wikipedia.org/wiki/Microplastics",
        )],
    },
    Entry {
        keywords: &["chlorination", "chlorine", "disinfection", "boil"],
        results: &[(
            "Water chlorination",
            "Chlorine disinfection inactivates most pathogens; a free chlorine residual of 0.2-0.5 mg/L is maintained in distribution.",
            "https://en.wikipedia.org/wiki/Water_chlorination",
        )],
    },
    Entry {
        keywords: &["water hardness", "hardness", "calcium", "magnesium", "limescale"],
        results: &[(
            "Hard water",
            "Hardness is caused by dissolved calcium and magnesium; it affects scaling and taste but is not a health risk.",
            "https://en.wikipedia.org/wiki/Hard_water",
        )],
    },
    Entry {
        keywords: &["turbidity", "cloudy", "suspended solids"],
        results: &[(
            "Turbidity",
            "Turbidity measures water cloudiness; high turbidity shields microbes from disinfection and should stay below 1 NTU.",
            "https://en.wikipedia.org/wiki/Turbidity",
        )],
    },
    Entry {
        keywords: &["safe drinking water", "drinking water", "safest", "water treatment", "filter", "filters"],
        results: &[(
            "Safe drinking water",
            "Safe drinking water is free of pathogens and chemical hazards; treatment combines filtration, disinfection and source protection.",
            "https://en.wikipedia.org/wiki/Drinking_water",
        )],
    },
];

const GENERIC_RESULT: (&str, &str, &str) = (
    "Water quality",
    "Water quality describes the chemical, physical and biological condition of water relative to its intended use.",
    "https://en.wikipedia.org/wiki/Water_quality",
);

/// One whole-word pattern per keyword, aligned with `TABLE`
fn keyword_patterns() -> &'static [Vec<Regex>] {
    static PATTERNS: OnceLock<Vec<Vec<Regex>>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        TABLE
            .iter()
            .map(|entry| {
                entry
                    .keywords
                    .iter()
                    .map(|k| Regex::new(&format!(r"\b{}\b", regex::escape(k))).expect("valid regex"))
                    .collect()
            })
            .collect()
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StaticSearch;

impl StaticSearch {
    pub fn new() -> Self {
        Self
    }

    /// Entry with the most whole-word keyword matches; earlier entries win ties.
    /// Falls back to a single generic record.
    pub fn lookup(&self, query: &str, max_results: usize) -> Vec<WebResult> {
        let query = query.to_lowercase();
        let best = TABLE
            .iter()
            .zip(keyword_patterns())
            .map(|(entry, patterns)| {
                let hits = patterns.iter().filter(|p| p.is_match(&query)).count();
                (hits, entry)
            })
            .filter(|(hits, _)| *hits > 0)
            .fold(None::<(usize, &Entry)>, |best, (hits, entry)| match best {
                Some((top, _)) if top >= hits => best,
                _ => Some((hits, entry)),
            });

        match best {
            Some((hits, entry)) => {
                debug!(hits, "Static table match");
                entry
                    .results
                    .iter()
                    .take(max_results.max(1))
                    .map(|(title, snippet, url)| WebResult::new(*title, *snippet, *url))
                    .collect()
            }
            None => {
                let (title, snippet, url) = GENERIC_RESULT;
                vec![WebResult::new(title, snippet, url)]
            }
        }
    }
}

#[async_trait]
impl WebSearchTool for StaticSearch {
    async fn search(&self, query: &str, max_results: usize) -> Vec<WebResult> {
        self.lookup(query, max_results)
    }
}
