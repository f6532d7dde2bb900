//! Roast history service

use chrono::{Local, NaiveDate, Utc};
use serde::Serialize;
use shared::{
    next_record_id, validate_final_time, validate_weight, FormMode, RecordId, Roast, RoastInput,
};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::beans::BeanService;
use crate::storage::{KeyValueStore, ROASTS_KEY};

/// Roast service for logging, editing and browsing roast sessions
#[derive(Clone)]
pub struct RoastService {
    store: KeyValueStore,
    beans: BeanService,
}

/// A prefilled roast form together with what submitting it will do
#[derive(Debug, Clone, Serialize)]
pub struct RoastDraft {
    pub mode: FormMode,
    pub input: RoastInput,
}

impl RoastService {
    pub fn new(store: KeyValueStore) -> Self {
        let beans = BeanService::new(store.clone());
        Self { store, beans }
    }

    // ========================================================================
    // Form Submission
    // ========================================================================

    /// Save a submitted roast form.
    ///
    /// `New` and `Duplicating` append a record with a fresh id. `Editing`
    /// replaces the record in place, keeping its id and position.
    pub async fn submit(&self, mode: FormMode, input: RoastInput) -> AppResult<Roast> {
        validate_roast_input(&input)?;

        let mut roasts = self.load().await?;
        let now = Utc::now();

        let roast = match mode {
            FormMode::Editing { id } => {
                let position = roasts
                    .iter()
                    .position(|r| r.id == id)
                    .ok_or_else(|| AppError::NotFound(format!("Roast #{}", id)))?;
                let roast = Roast::from_input(id, now, input)
                    .map_err(|m| AppError::ValidationError(m.to_string()))?;
                roasts[position] = roast.clone();
                roast
            }
            FormMode::New | FormMode::Duplicating { .. } => {
                let id = next_record_id(now.timestamp_millis(), max_id(&roasts));
                let roast = Roast::from_input(id, now, input)
                    .map_err(|m| AppError::ValidationError(m.to_string()))?;
                roasts.push(roast.clone());
                roast
            }
        };

        if self.beans.ensure(&roast.bean_name).await? {
            tracing::info!("Registered new bean '{}' from roast", roast.bean_name);
        }
        self.save(&roasts).await?;

        tracing::info!(
            "Saved roast #{} ({}, {}) [{}]",
            roast.id,
            roast.bean_name,
            roast.roast_date,
            mode
        );
        Ok(roast)
    }

    /// Prefill the form from an existing roast for editing
    pub async fn draft_edit(&self, id: RecordId) -> AppResult<RoastDraft> {
        let roast = self.get(id).await?;
        Ok(RoastDraft {
            mode: FormMode::Editing { id },
            input: roast.to_input(),
        })
    }

    /// Prefill the form from an existing roast as a new record dated today
    pub async fn duplicate(&self, id: RecordId) -> AppResult<RoastDraft> {
        let roast = self.get(id).await?;
        let mut input = roast.to_input();
        input.roast_date = Some(today());

        Ok(RoastDraft {
            mode: FormMode::Duplicating {
                source_id: roast.id,
                source_date: roast.roast_date,
            },
            input,
        })
    }

    // ========================================================================
    // History
    // ========================================================================

    pub async fn get(&self, id: RecordId) -> AppResult<Roast> {
        self.load()
            .await?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Roast #{}", id)))
    }

    /// All roasts, newest roast date first
    pub async fn list(&self) -> AppResult<Vec<Roast>> {
        let mut roasts = self.load().await?;
        sort_history(&mut roasts);
        Ok(roasts)
    }

    /// Roasts in the order they were stored
    pub async fn list_stored(&self) -> AppResult<Vec<Roast>> {
        self.load().await
    }

    /// Delete one roast; the remaining roasts keep their order
    pub async fn delete(&self, id: RecordId) -> AppResult<Roast> {
        let mut roasts = self.load().await?;
        let position = roasts
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Roast #{}", id)))?;
        let removed = roasts.remove(position);

        self.save(&roasts).await?;
        tracing::info!("Deleted roast #{} ({})", removed.id, removed.bean_name);
        Ok(removed)
    }

    /// Remove the whole roast history, returning how many roasts it held
    pub async fn clear_all(&self) -> AppResult<usize> {
        let count = self.load().await?.len();
        self.store.remove(ROASTS_KEY).await?;
        tracing::warn!("Cleared roast history ({} roasts)", count);
        Ok(count)
    }

    // ========================================================================
    // Import
    // ========================================================================

    /// Append imported roasts with fresh ids, recomputing derived fields.
    ///
    /// Rows with a missing date or bean, or a negative weight, are skipped.
    /// Returns the saved roasts and the number skipped.
    pub async fn import(&self, inputs: Vec<RoastInput>) -> AppResult<(Vec<Roast>, usize)> {
        let mut roasts = self.load().await?;
        let now = Utc::now();
        let mut last_id = max_id(&roasts);
        let mut imported = Vec::with_capacity(inputs.len());
        let mut skipped = 0;

        for input in inputs {
            let bean_name = input.bean_name.clone();
            if let Err(e) = validate_roast_fields(&input) {
                tracing::warn!("Skipping imported roast '{}': {}", bean_name, e);
                skipped += 1;
                continue;
            }
            let id = next_record_id(now.timestamp_millis(), last_id);
            match Roast::from_input(id, now, input) {
                Ok(roast) => {
                    last_id = Some(id);
                    imported.push(roast);
                }
                Err(m) => {
                    tracing::warn!("Skipping imported roast '{}': {}", bean_name, m);
                    skipped += 1;
                }
            }
        }

        self.beans
            .merge(imported.iter().map(|r| r.bean_name.as_str()))
            .await?;
        roasts.extend(imported.iter().cloned());
        self.save(&roasts).await?;

        tracing::info!("Imported {} roast(s), skipped {}", imported.len(), skipped);
        Ok((imported, skipped))
    }

    async fn load(&self) -> AppResult<Vec<Roast>> {
        self.store.get_or_default(ROASTS_KEY).await
    }

    async fn save(&self, roasts: &[Roast]) -> AppResult<()> {
        self.store.set(ROASTS_KEY, roasts).await
    }
}

/// Check the fields a roast cannot be saved without
fn validate_roast_input(input: &RoastInput) -> AppResult<()> {
    input.validate()?;

    validate_final_time(input.checkpoints.final_point.time_seconds)
        .map_err(|m| AppError::validation("final_time", m))?;
    validate_weights(input)
}

/// Imported rows skip the Final check
fn validate_roast_fields(input: &RoastInput) -> AppResult<()> {
    input.validate()?;
    validate_weights(input)
}

fn validate_weights(input: &RoastInput) -> AppResult<()> {
    validate_weight(input.green_weight_grams)
        .map_err(|m| AppError::validation("green_weight", m))?;
    validate_weight(input.roasted_weight_grams)
        .map_err(|m| AppError::validation("roasted_weight", m))?;

    Ok(())
}

/// Roast date descending, newest id first on the same date
pub fn sort_history(roasts: &mut [Roast]) {
    roasts.sort_by(|a, b| b.roast_date.cmp(&a.roast_date).then(b.id.cmp(&a.id)));
}

fn max_id(roasts: &[Roast]) -> Option<RecordId> {
    roasts.iter().map(|r| r.id).max()
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
