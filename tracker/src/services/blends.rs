//! Blend recipe service

use chrono::Utc;
use rust_decimal::Decimal;
use shared::{
    allocate, next_record_id, validate_batch_weight, validate_bean_name,
    validate_blend_percentages, Blend, BlendAllocation, BlendInput, RecordId,
};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::beans::BeanService;
use crate::storage::{KeyValueStore, BLENDS_KEY};

/// Suffix given to the name of a duplicated blend
pub const COPY_SUFFIX: &str = " (copy)";

/// Matches the `BlendInput` name length limit
const MAX_NAME_CHARS: usize = 200;

/// Blend service for managing blend recipes and batch allocation
#[derive(Clone)]
pub struct BlendService {
    store: KeyValueStore,
    beans: BeanService,
}

impl BlendService {
    pub fn new(store: KeyValueStore) -> Self {
        let beans = BeanService::new(store.clone());
        Self { store, beans }
    }

    pub async fn create(&self, input: BlendInput) -> AppResult<Blend> {
        validate_blend_input(&input)?;

        let mut blends = self.load().await?;
        let now = Utc::now();
        let id = next_record_id(now.timestamp_millis(), max_id(&blends));
        let blend = Blend::from_input(id, now, input);

        self.register_beans(&blend).await?;
        blends.push(blend.clone());
        self.save(&blends).await?;

        tracing::info!(
            "Created blend #{} '{}' with {} bean(s)",
            blend.id,
            blend.name,
            blend.components.len()
        );
        Ok(blend)
    }

    /// Replace a blend in place, keeping its id
    pub async fn update(&self, id: RecordId, input: BlendInput) -> AppResult<Blend> {
        validate_blend_input(&input)?;

        let mut blends = self.load().await?;
        let position = find_position(&blends, id)?;
        let blend = Blend::from_input(id, Utc::now(), input);

        self.register_beans(&blend).await?;
        blends[position] = blend.clone();
        self.save(&blends).await?;

        tracing::info!("Updated blend #{} '{}'", blend.id, blend.name);
        Ok(blend)
    }

    /// Save a copy of a blend under a new id
    pub async fn duplicate(&self, id: RecordId) -> AppResult<Blend> {
        let source = self.get(id).await?;
        let mut input = source.to_input();
        input.name = copy_name(&source.name);
        self.create(input).await
    }

    pub async fn delete(&self, id: RecordId) -> AppResult<Blend> {
        let mut blends = self.load().await?;
        let position = find_position(&blends, id)?;
        let removed = blends.remove(position);

        self.save(&blends).await?;
        tracing::info!("Deleted blend #{} '{}'", removed.id, removed.name);
        Ok(removed)
    }

    pub async fn get(&self, id: RecordId) -> AppResult<Blend> {
        self.load()
            .await?
            .into_iter()
            .find(|b| b.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Blend #{}", id)))
    }

    /// All blends ordered by name
    pub async fn list(&self) -> AppResult<Vec<Blend>> {
        let mut blends = self.load().await?;
        blends.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then(a.id.cmp(&b.id))
        });
        Ok(blends)
    }

    /// Split a batch weight across a saved blend's components
    pub async fn allocate(&self, id: RecordId, batch_grams: Decimal) -> AppResult<BlendAllocation> {
        validate_batch_weight(batch_grams).map_err(|m| AppError::validation("weight", m))?;

        let blend = self.get(id).await?;
        let allocation =
            allocate(&blend.components, batch_grams).map_err(|m| AppError::validation("weight", m))?;

        if !allocation.is_exact() {
            tracing::debug!(
                "Allocation of blend #{} drifted by {} g",
                id,
                allocation.difference()
            );
        }
        Ok(allocation)
    }

    /// Append imported blends with fresh ids.
    ///
    /// Blends that fail validation are skipped. Returns the saved blends and
    /// the number skipped.
    pub async fn import(&self, inputs: Vec<BlendInput>) -> AppResult<(Vec<Blend>, usize)> {
        let mut blends = self.load().await?;
        let now = Utc::now();
        let mut last_id = max_id(&blends);
        let mut imported = Vec::new();
        let mut skipped = 0;

        for input in inputs {
            if let Err(e) = validate_blend_input(&input) {
                tracing::warn!("Skipping imported blend '{}': {}", input.name.trim(), e);
                skipped += 1;
                continue;
            }
            let id = next_record_id(now.timestamp_millis(), last_id);
            last_id = Some(id);
            imported.push(Blend::from_input(id, now, input));
        }

        self.beans
            .merge(
                imported
                    .iter()
                    .flat_map(|b| b.components.iter().map(|c| c.bean_name.as_str())),
            )
            .await?;
        blends.extend(imported.iter().cloned());
        self.save(&blends).await?;

        tracing::info!("Imported {} blend(s), skipped {}", imported.len(), skipped);
        Ok((imported, skipped))
    }

    async fn register_beans(&self, blend: &Blend) -> AppResult<()> {
        self.beans
            .merge(blend.components.iter().map(|c| c.bean_name.as_str()))
            .await?;
        Ok(())
    }

    async fn load(&self) -> AppResult<Vec<Blend>> {
        self.store.get_or_default(BLENDS_KEY).await
    }

    async fn save(&self, blends: &[Blend]) -> AppResult<()> {
        self.store.set(BLENDS_KEY, blends).await
    }
}

/// Blend name, component beans and percentages
pub fn validate_blend_input(input: &BlendInput) -> AppResult<()> {
    input.validate()?;
    if input.name.trim().is_empty() {
        return Err(AppError::validation("name", "Blend name is required"));
    }
    for component in &input.components {
        validate_bean_name(&component.bean_name)
            .map_err(|m| AppError::validation("components", m))?;
    }
    validate_blend_percentages(&input.percentages())
        .map_err(|m| AppError::validation("components", m))
}

fn find_position(blends: &[Blend], id: RecordId) -> AppResult<usize> {
    blends
        .iter()
        .position(|b| b.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Blend #{}", id)))
}

/// Name for a duplicate, shortened so the suffix still fits
fn copy_name(name: &str) -> String {
    let room = MAX_NAME_CHARS - COPY_SUFFIX.chars().count();
    let base: String = name.chars().take(room).collect();
    format!("{}{}", base.trim_end(), COPY_SUFFIX)
}

fn max_id(blends: &[Blend]) -> Option<RecordId> {
    blends.iter().map(|b| b.id).max()
}
