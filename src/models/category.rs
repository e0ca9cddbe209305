use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a transaction for grouping and display.
///
/// Known labels map to a fixed set of variants. Anything else read from
/// storage or an import file is kept verbatim in [`Category::Unrecognized`]
/// so that grouping by label still works.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Food,
    Transportation,
    Entertainment,
    Utilities,
    Housing,
    Healthcare,
    Personal,
    Education,
    Shopping,
    Salary,
    Investment,
    Gift,
    Other,
    Unrecognized(String),
}

impl Category {
    /// Every selectable category, in the order a picker offers them.
    pub const ALL: [Category; 13] = [
        Category::Food,
        Category::Transportation,
        Category::Entertainment,
        Category::Utilities,
        Category::Housing,
        Category::Healthcare,
        Category::Personal,
        Category::Education,
        Category::Shopping,
        Category::Salary,
        Category::Investment,
        Category::Gift,
        Category::Other,
    ];

    /// Parses a stored or user-entered key. Returns `None` for a blank key.
    pub fn parse(key: &str) -> Option<Category> {
        let key = key.trim();
        if key.is_empty() {
            return None;
        }

        let category = match key.to_lowercase().as_str() {
            "food" => Category::Food,
            "transportation" => Category::Transportation,
            "entertainment" => Category::Entertainment,
            "utilities" => Category::Utilities,
            "housing" => Category::Housing,
            "healthcare" => Category::Healthcare,
            "personal" => Category::Personal,
            "education" => Category::Education,
            "shopping" => Category::Shopping,
            "salary" => Category::Salary,
            "investment" => Category::Investment,
            "gift" => Category::Gift,
            "other" => Category::Other,
            _ => Category::Unrecognized(key.to_string()),
        };
        Some(category)
    }

    /// The storage key, also used as the grouping key in summaries.
    pub fn key(&self) -> &str {
        match self {
            Category::Food => "food",
            Category::Transportation => "transportation",
            Category::Entertainment => "entertainment",
            Category::Utilities => "utilities",
            Category::Housing => "housing",
            Category::Healthcare => "healthcare",
            Category::Personal => "personal",
            Category::Education => "education",
            Category::Shopping => "shopping",
            Category::Salary => "salary",
            Category::Investment => "investment",
            Category::Gift => "gift",
            Category::Other => "other",
            Category::Unrecognized(label) => label,
        }
    }

    /// Whether two categories share a summary group. Keys compare
    /// case-insensitively, matching the list filter.
    pub fn same_group(&self, other: &Category) -> bool {
        self.key().to_lowercase() == other.key().to_lowercase()
    }

    pub fn label(&self) -> &str {
        match self {
            Category::Food => "Food & Dining",
            Category::Transportation => "Transportation",
            Category::Entertainment => "Entertainment",
            Category::Utilities => "Utilities",
            Category::Housing => "Housing",
            Category::Healthcare => "Healthcare",
            Category::Personal => "Personal",
            Category::Education => "Education",
            Category::Shopping => "Shopping",
            Category::Salary => "Salary",
            Category::Investment => "Investment",
            Category::Gift => "Gift",
            Category::Other => "Other",
            Category::Unrecognized(label) => label,
        }
    }

    /// Single glyph shown next to a transaction in the terminal.
    pub fn icon(&self) -> &'static str {
        match self {
            Category::Food => "☕",
            Category::Transportation => "🚗",
            Category::Entertainment => "📺",
            Category::Utilities => "🧾",
            Category::Housing => "🏠",
            Category::Healthcare => "💓",
            Category::Personal => "🧴",
            Category::Education => "🎓",
            Category::Shopping => "🛒",
            Category::Salary => "₹",
            Category::Investment => "📈",
            Category::Gift => "🎁",
            Category::Other | Category::Unrecognized(_) => "📄",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        // Blank labels only appear in hand-edited data; keep them visible.
        Category::parse(&value).unwrap_or(Category::Unrecognized(value))
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.key().to_string()
    }
}
