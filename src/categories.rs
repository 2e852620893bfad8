use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed expense vocabulary. `Other` is the fallback every
/// categorization path can land on, so the set is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Groceries,
    Dining,
    Transportation,
    Entertainment,
    Shopping,
    Utilities,
    Healthcare,
    Travel,
    Other,
}

impl Category {
    /// All categories, in vocabulary order. Substring resolution scans
    /// this order, so it doubles as the tie-break priority.
    pub const ALL: [Category; 9] = [
        Category::Groceries,
        Category::Dining,
        Category::Transportation,
        Category::Entertainment,
        Category::Shopping,
        Category::Utilities,
        Category::Healthcare,
        Category::Travel,
        Category::Other,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Groceries => "Groceries",
            Category::Dining => "Dining",
            Category::Transportation => "Transportation",
            Category::Entertainment => "Entertainment",
            Category::Shopping => "Shopping",
            Category::Utilities => "Utilities",
            Category::Healthcare => "Healthcare",
            Category::Travel => "Travel",
            Category::Other => "Other",
        }
    }

    /// Exact (case-sensitive) vocabulary lookup.
    pub fn from_exact(s: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.name() == s)
    }

    /// First vocabulary member whose name appears case-insensitively
    /// inside `text`. Recovers phrasing like "This looks like Dining".
    pub fn find_mention(text: &str) -> Option<Category> {
        let lower = text.to_lowercase();
        Category::ALL
            .iter()
            .copied()
            .find(|c| lower.contains(&c.name().to_lowercase()))
    }

    /// Comma-joined vocabulary, for embedding in prompts.
    pub fn prompt_list() -> String {
        Category::ALL
            .iter()
            .map(|c| c.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
