use log::debug;

use crate::models::Category;

const CYBER_KEYWORDS: &[&str] = &[
    "security", "hacker", "cyber", "vulnerability", "breach", "exploit", "malware", "ransomware",
    "attack", "patch",
];
const TECH_KEYWORDS: &[&str] = &[
    "ai", "apple", "google", "microsoft", "smartphone", "gadget", "software", "hardware", "app",
    "launch",
];
const SPORTS_KEYWORDS: &[&str] = &[
    "sport", "football", "soccer", "basketball", "baseball", "tennis", "olympic", "championship",
    "league", "tournament", "nba", "nfl",
];
const BUSINESS_KEYWORDS: &[&str] = &[
    "economy", "economic", "market", "stock", "inflation", "earnings", "revenue", "investor",
    "startup", "funding", "tariff", "gdp",
];
const POLITICS_KEYWORDS: &[&str] = &[
    "election", "government", "senate", "congress", "president", "parliament", "minister",
    "policy", "vote", "campaign", "legislation", "lawmaker",
];
const SCIENCE_KEYWORDS: &[&str] = &[
    "science", "research", "scientist", "space", "nasa", "climate", "physics", "biology",
    "quantum", "discovery", "telescope", "astronom",
];

/// Scores text for a single category.
pub trait CategoryRule {
    fn category(&self) -> Category;
    fn score(&self, text: &str) -> usize;
}

#[derive(Debug, Clone)]
pub struct KeywordRule {
    category: Category,
    keywords: &'static [&'static str],
}

impl KeywordRule {
    pub fn new(category: Category, keywords: &'static [&'static str]) -> Self {
        Self { category, keywords }
    }
}

impl CategoryRule for KeywordRule {
    fn category(&self) -> Category {
        self.category
    }

    // Plain substring counting: "ai" also hits "said", and that is accepted.
    fn score(&self, text: &str) -> usize {
        self.keywords.iter().map(|k| text.matches(k).count()).sum()
    }
}

/// Picks a category for an item from keyword frequency.
///
/// Rules are held in priority order. The highest score wins outright; on a
/// tie the rule listed first wins, which gives the fixed order
/// Cybersecurity > Tech > Sports > Business > Politics > Science. When
/// nothing matches at all the feed's own category is used.
pub struct Classifier {
    rules: Vec<KeywordRule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            rules: vec![
                KeywordRule::new(Category::Cybersecurity, CYBER_KEYWORDS),
                KeywordRule::new(Category::Tech, TECH_KEYWORDS),
                KeywordRule::new(Category::Sports, SPORTS_KEYWORDS),
                KeywordRule::new(Category::Business, BUSINESS_KEYWORDS),
                KeywordRule::new(Category::Politics, POLITICS_KEYWORDS),
                KeywordRule::new(Category::Science, SCIENCE_KEYWORDS),
            ],
        }
    }
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scores(&self, title: &str, content: &str) -> Vec<(Category, usize)> {
        let text = format!("{} {}", title, content).to_lowercase();
        self.rules
            .iter()
            .map(|rule| (rule.category(), rule.score(&text)))
            .collect()
    }

    pub fn classify(&self, title: &str, content: &str, default: Category) -> Category {
        let scores = self.scores(title, content);

        let mut best: Option<(Category, usize)> = None;
        for (category, score) in &scores {
            // strict comparison keeps the earlier (higher priority) rule on ties
            if best.is_none_or(|(_, top)| *score > top) {
                best = Some((*category, *score));
            }
        }

        match best {
            Some((category, score)) if score > 0 => {
                debug!("Classified {:?} as {} ({:?})", title, category, scores);
                category
            }
            _ => default,
        }
    }
}
