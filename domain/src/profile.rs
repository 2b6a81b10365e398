use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Words that mark an order-status question rather than a return question.
const ORDER_KEYWORDS: &[&str] = &["order", "shipped", "delivered", "tracking"];

/// The bounded domains this agent can answer in. Each carries its own index,
/// category vocabulary, classification prompt, and retrieval filter heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Domain {
    Health,
    Order,
}

impl Domain {
    pub fn index_name(&self) -> &'static str {
        match self {
            Domain::Health => "health-data",
            Domain::Order => "support-data",
        }
    }

    /// Metadata key that discriminates categories in this domain.
    pub fn category_key(&self) -> &'static str {
        match self {
            Domain::Health => "category",
            Domain::Order => "type",
        }
    }

    pub fn labels(&self) -> &'static [Category] {
        match self {
            Domain::Health => &[
                Category::Fitness,
                Category::Nutrition,
                Category::Sleep,
                Category::General,
            ],
            Domain::Order => &[Category::Order, Category::Return],
        }
    }

    /// Label assigned when the classifier output matches nothing known.
    pub fn default_label(&self) -> Category {
        match self {
            Domain::Health => Category::General,
            Domain::Order => Category::Unknown,
        }
    }

    pub fn classification_prompt(&self, query: &str) -> String {
        match self {
            Domain::Health => format!(
                "Classify this query into 'fitness', 'nutrition', 'sleep', or 'general': {query}"
            ),
            Domain::Order => {
                format!("Classify this query into 'order' or 'return': {query}")
            }
        }
    }

    /// Strict parse of the classifier model's raw output: first known label
    /// contained in the lower-cased text wins, otherwise the domain default.
    pub fn parse_label(&self, raw: &str) -> Category {
        let lowered = raw.to_lowercase();
        self.labels()
            .iter()
            .copied()
            .find(|label| lowered.contains(label.as_str()))
            .unwrap_or_else(|| self.default_label())
    }

    /// Cheap keyword heuristic that picks the retrieval metadata filter.
    ///
    /// Deliberately independent of the classifier: the health variant takes
    /// the first whitespace token of the lower-cased query, the order variant
    /// checks a fixed keyword set. The two derivations can disagree.
    pub fn infer_filter(&self, query: &str) -> String {
        let lowered = query.to_lowercase();
        match self {
            Domain::Health => lowered
                .split_whitespace()
                .next()
                .unwrap_or("general")
                .to_string(),
            Domain::Order => {
                if ORDER_KEYWORDS.iter().any(|word| lowered.contains(word)) {
                    "order".to_string()
                } else {
                    "return".to_string()
                }
            }
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Health => write!(f, "health"),
            Domain::Order => write!(f, "order"),
        }
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "health" => Ok(Domain::Health),
            "order" => Ok(Domain::Order),
            other => Err(format!("unknown domain '{other}' (expected 'health' or 'order')")),
        }
    }
}

/// Closed category vocabulary across both domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Fitness,
    Nutrition,
    Sleep,
    General,
    Order,
    Return,
    Unknown,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Fitness => "fitness",
            Category::Nutrition => "nutrition",
            Category::Sleep => "sleep",
            Category::General => "general",
            Category::Order => "order",
            Category::Return => "return",
            Category::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reindexing policy for an ingestion run. The destructive rebuild is the
/// historical default; append only creates the index when it is missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IndexMode {
    #[default]
    Rebuild,
    Append,
}

impl FromStr for IndexMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rebuild" => Ok(IndexMode::Rebuild),
            "append" => Ok(IndexMode::Append),
            other => Err(format!("unknown index mode '{other}' (expected 'rebuild' or 'append')")),
        }
    }
}
