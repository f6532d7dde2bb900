//! Blend recipe models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::RecordId;

/// One bean's share of a blend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendComponent {
    pub bean_name: String,
    /// Share of the blend, 0-100
    pub percentage: Decimal,
}

impl BlendComponent {
    pub fn new(bean_name: impl Into<String>, percentage: Decimal) -> Self {
        Self {
            bean_name: bean_name.into(),
            percentage,
        }
    }
}

/// A saved blend recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blend {
    pub id: RecordId,
    pub name: String,
    pub description: Option<String>,
    pub components: Vec<BlendComponent>,
    pub saved_at: DateTime<Utc>,
}

impl Blend {
    pub fn from_input(id: RecordId, saved_at: DateTime<Utc>, input: BlendInput) -> Self {
        Self {
            id,
            name: input.name.trim().to_string(),
            description: input.description.filter(|d| !d.trim().is_empty()),
            components: input
                .components
                .into_iter()
                .map(|c| BlendComponent::new(c.bean_name.trim(), c.percentage))
                .collect(),
            saved_at,
        }
    }

    pub fn to_input(&self) -> BlendInput {
        BlendInput {
            name: self.name.clone(),
            description: self.description.clone(),
            components: self.components.clone(),
        }
    }

    pub fn total_percentage(&self) -> Decimal {
        self.components.iter().map(|c| c.percentage).sum()
    }
}

/// Values submitted from the blend form or an imported row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct BlendInput {
    #[validate(length(min = 1, max = 200, message = "Blend name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub components: Vec<BlendComponent>,
}

impl BlendInput {
    pub fn percentages(&self) -> Vec<Decimal> {
        self.components.iter().map(|c| c.percentage).collect()
    }
}
