//! Bean name list

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Beans offered before the user has saved any of their own
pub const DEFAULT_BEANS: &[&str] = &[
    "Brazil Santos",
    "Burundi",
    "Colombia Supremo",
    "Costa Rica Tarrazu",
    "Espresso Blend",
    "Ethiopia Yirgacheffe",
    "Guatemala Antigua",
    "House Blend",
    "Java",
    "Kenya AA",
    "Rwanda",
    "Sumatra Mandheling",
    "Tanzania Peaberry",
    "Yemen Mocha",
];

/// Deduplicated bean names kept in alphabetical order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BeanList(Vec<String>);

impl BeanList {
    /// Build a list from arbitrary names, dropping blanks and duplicates
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::default();
        for name in names {
            list.insert(name.into());
        }
        list
    }

    pub fn with_defaults() -> Self {
        Self::from_names(DEFAULT_BEANS.iter().copied())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|b| b == name.trim())
    }

    /// Insert a name in sorted position. Returns false for blanks and
    /// names already present.
    pub fn insert(&mut self, name: String) -> bool {
        let name = name.trim().to_string();
        if name.is_empty() || self.contains(&name) {
            return false;
        }
        let position = self
            .0
            .iter()
            .position(|existing| compare_names(existing, &name) == Ordering::Greater)
            .unwrap_or(self.0.len());
        self.0.insert(position, name);
        true
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|b| b != name.trim());
        self.0.len() != before
    }

    /// Restore ordering and uniqueness after loading stored data
    pub fn normalized(self) -> Self {
        Self::from_names(self.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// Case-insensitive alphabetical order, exact text as tie-breaker
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
