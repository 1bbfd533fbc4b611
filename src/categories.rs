//! Category catalog and per-category monthly budgets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::TransactionType;

/// Display bucket for category ids the catalog does not know.
pub const OTHER_LABEL: &str = "Other";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: TransactionType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
        }
    }
}

/// Maps a category id to its display name.
pub trait CategoryResolver {
    /// Display name for `id`, or [`OTHER_LABEL`] when unknown.
    fn display_name(&self, id: &str, kind: TransactionType) -> String;
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CategoryError {
    #[error("Budget references unknown expense category '{0}'")]
    UnknownCategory(String),
    #[error("Budget for '{category}' must not be negative (got {amount})")]
    NegativeBudget { category: String, amount: i64 },
    #[error("Duplicate category id '{0}' for the same type")]
    DuplicateCategory(String),
}

/// The fixed set of categories a household works with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCatalog {
    categories: Vec<Category>,
}

impl CategoryCatalog {
    pub fn new(categories: Vec<Category>) -> Result<Self, CategoryError> {
        let mut seen = std::collections::HashSet::new();
        for c in &categories {
            if !seen.insert((c.id.as_str(), c.kind)) {
                return Err(CategoryError::DuplicateCategory(c.id.clone()));
            }
        }
        Ok(Self { categories })
    }

    /// Built-in household categories.
    pub fn household_defaults() -> Self {
        use TransactionType::{Expense, Income};
        let categories = [
            ("food", "Food", Expense),
            ("housing", "Housing", Expense),
            ("utilities", "Utilities", Expense),
            ("transport", "Transport", Expense),
            ("communication", "Phone & Internet", Expense),
            ("insurance", "Insurance", Expense),
            ("medical", "Medical", Expense),
            ("education", "Education", Expense),
            ("shopping", "Shopping", Expense),
            ("leisure", "Leisure", Expense),
            ("savings", "Savings", Expense),
            ("other", "Other", Expense),
            ("salary", "Salary", Income),
            ("bonus", "Bonus", Income),
            ("interest", "Interest", Income),
            ("other_income", "Other", Income),
        ]
        .into_iter()
        .map(|(id, name, kind)| Category::new(id, name, kind))
        .collect();
        Self { categories }
    }

    pub fn get(&self, id: &str, kind: TransactionType) -> Option<&Category> {
        self.categories
            .iter()
            .find(|c| c.kind == kind && c.id == id)
    }

    pub fn contains(&self, id: &str, kind: TransactionType) -> bool {
        self.get(id, kind).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }
}

impl Default for CategoryCatalog {
    fn default() -> Self {
        Self::household_defaults()
    }
}

impl CategoryResolver for CategoryCatalog {
    fn display_name(&self, id: &str, kind: TransactionType) -> String {
        self.get(id, kind)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| OTHER_LABEL.to_string())
    }
}

/// Monthly budget per expense category id, checked against a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryBudgets {
    budgets: BTreeMap<String, i64>,
}

impl CategoryBudgets {
    pub fn new(
        catalog: &CategoryCatalog,
        entries: impl IntoIterator<Item = (String, i64)>,
    ) -> Result<Self, CategoryError> {
        let mut budgets = BTreeMap::new();
        for (category, amount) in entries {
            if !catalog.contains(&category, TransactionType::Expense) {
                return Err(CategoryError::UnknownCategory(category));
            }
            if amount < 0 {
                return Err(CategoryError::NegativeBudget { category, amount });
            }
            budgets.insert(category, amount);
        }
        Ok(Self { budgets })
    }

    pub fn get(&self, category: &str) -> Option<i64> {
        self.budgets.get(category).copied()
    }

    pub fn total(&self) -> i64 {
        self.budgets.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.budgets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.budgets.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
