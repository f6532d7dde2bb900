//! Command execution and output rendering

use std::path::{Path, PathBuf};

use chrono::Local;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use shared::{
    derive_weight_loss, finalize_time_input, format_optional_time, format_percent, format_time,
    normalize_time_input, parse_time, Blend, BlendAllocation, BlendInput,
    Roast, RoastCheckpoints, RoastInput, RoastMetrics, EMPTY_DISPLAY,
};

use crate::cli::{
    parse_time_arg, BeanCommand, BlendCommand, CalcCommand, Cli, Command, ExportArgs, ImportArgs,
    RoastCommand,
};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::services::{BeanService, BlendService, RoastService};
use crate::sheets::{self, ImportSummary, SheetKind};
use crate::storage::KeyValueStore;

/// Services a command can use
pub struct App {
    pub roasts: RoastService,
    pub beans: BeanService,
    pub blends: BlendService,
    export_dir: PathBuf,
    json: bool,
}

impl App {
    pub fn new(store: KeyValueStore, export_dir: PathBuf, json: bool) -> Self {
        Self {
            roasts: RoastService::new(store.clone()),
            beans: BeanService::new(store.clone()),
            blends: BlendService::new(store),
            export_dir,
            json,
        }
    }

    /// Print `value` as JSON, or the human rendering otherwise
    fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce() -> String) -> AppResult<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", human());
        }
        Ok(())
    }
}

/// Open storage and run one parsed command
pub async fn run(cli: Cli, config: &Config) -> AppResult<()> {
    let store = KeyValueStore::connect(&config.storage).await?;
    let app = App::new(store.clone(), config.export.directory.clone(), cli.json);

    let result = execute(&app, cli.command).await;
    store.close().await;
    result
}

pub async fn execute(app: &App, command: Command) -> AppResult<()> {
    match command {
        Command::Roast(cmd) => roast(app, cmd).await,
        Command::Bean(cmd) => bean(app, cmd).await,
        Command::Blend(cmd) => blend(app, cmd).await,
        Command::Calc(cmd) => calc(app, cmd),
        Command::Export(args) => export(app, args).await,
        Command::Import(args) => import(app, args).await,
    }
}

// ============================================================================
// Roasts
// ============================================================================

async fn roast(app: &App, command: RoastCommand) -> AppResult<()> {
    match command {
        RoastCommand::Add(fields) => {
            let mut input = RoastInput {
                roast_date: Some(Local::now().date_naive()),
                ..Default::default()
            };
            fields.apply_to(&mut input);
            let roast = app.roasts.submit(Default::default(), input).await?;
            app.emit(&roast, || format!("Saved roast #{}\n\n{}", roast.id, render_roast(&roast)))
        }
        RoastCommand::Edit { id, fields } => {
            let mut draft = app.roasts.draft_edit(id).await?;
            fields.apply_to(&mut draft.input);
            let roast = app.roasts.submit(draft.mode, draft.input).await?;
            app.emit(&roast, || format!("Updated roast #{}\n\n{}", roast.id, render_roast(&roast)))
        }
        RoastCommand::Duplicate { id, fields } => {
            let mut draft = app.roasts.duplicate(id).await?;
            fields.apply_to(&mut draft.input);
            let mode = draft.mode;
            let roast = app.roasts.submit(draft.mode, draft.input).await?;
            app.emit(&roast, || {
                format!("{}: saved as roast #{}\n\n{}", mode, roast.id, render_roast(&roast))
            })
        }
        RoastCommand::Delete { id } => {
            let removed = app.roasts.delete(id).await?;
            app.emit(&removed, || {
                format!(
                    "Deleted roast #{} ({}, {})",
                    removed.id, removed.bean_name, removed.roast_date
                )
            })
        }
        RoastCommand::Show { id } => {
            let roast = app.roasts.get(id).await?;
            app.emit(&roast, || render_roast(&roast))
        }
        RoastCommand::List => {
            let roasts = app.roasts.list().await?;
            app.emit(&roasts, || render_roast_list(&roasts))
        }
        RoastCommand::Clear { yes } => {
            if !yes {
                return Err(AppError::ValidationError(
                    "Clearing deletes every roast; pass --yes to confirm".to_string(),
                ));
            }
            let count = app.roasts.clear_all().await?;
            app.emit(&json!({ "deleted": count }), || {
                format!("Deleted {} roast(s)", count)
            })
        }
    }
}

fn render_roast_list(roasts: &[Roast]) -> String {
    if roasts.is_empty() {
        return "No saved roasts".to_string();
    }

    let mut out = format!(
        "{:<15} {:<10} {:<24} {:>6} {:>8} {:>8} {:>6}",
        "ID", "DATE", "BEAN", "FINAL", "LOSS", "DEV", "DTR"
    );
    for roast in roasts {
        out.push_str(&format!(
            "\n{:<15} {:<10} {:<24} {:>6} {:>8} {:>8} {:>6}",
            roast.id,
            roast.roast_date,
            truncate(&roast.bean_name, 24),
            format_optional_time(roast.checkpoints.final_point.time_seconds),
            format_percent(roast.metrics.loss_percent),
            format_optional_time(roast.metrics.dev_time_ctp),
            format_percent(roast.metrics.dtr_ctp),
        ));
    }
    out
}

fn render_roast(roast: &Roast) -> String {
    let saved_at = roast.saved_at.with_timezone(&Local);
    let mut lines = vec![
        format!("Roast #{}  {}  {}", roast.id, roast.roast_date, roast.bean_name),
        format!("Saved:        {}", saved_at.format("%Y-%m-%d %H:%M:%S")),
        format!(
            "Temps:        env {}  charge {}  final {}",
            temp(roast.env_temp_celsius),
            temp(roast.charge_temp_celsius),
            temp(roast.final_temp_celsius)
        ),
        format!(
            "Weight:       green {}  roasted {}  loss {}",
            grams(roast.green_weight_grams),
            grams(roast.roasted_weight_grams),
            format_percent(roast.metrics.loss_percent)
        ),
        String::new(),
        "Checkpoints:".to_string(),
    ];

    lines.extend(render_checkpoints(&roast.checkpoints));
    lines.push(String::new());
    lines.extend(render_metrics(&roast.metrics));

    if let Some(plan) = &roast.roast_plan {
        lines.push(format!("Plan:  {}", plan));
    }
    if let Some(notes) = &roast.roast_notes {
        lines.push(format!("Notes: {}", notes));
    }
    lines.join("\n")
}

fn render_checkpoints(checkpoints: &RoastCheckpoints) -> Vec<String> {
    checkpoints
        .iter()
        .map(|(kind, checkpoint)| {
            format!(
                "  {:<14} {:>6}  {}",
                kind.label(),
                format_optional_time(checkpoint.time_seconds),
                temp(checkpoint.temp_celsius)
            )
        })
        .collect()
}

fn render_metrics(metrics: &RoastMetrics) -> Vec<String> {
    vec![
        format!(
            "Total time:   CS {}  CTP {}",
            format_optional_time(metrics.total_time_cs),
            format_optional_time(metrics.total_time_ctp)
        ),
        format!(
            "Dev time:     CS {}  CTP {}",
            format_optional_time(metrics.dev_time_cs),
            format_optional_time(metrics.dev_time_ctp)
        ),
        format!(
            "DTR:          CS {}  CTP {}",
            format_percent(metrics.dtr_cs),
            format_percent(metrics.dtr_ctp)
        ),
    ]
}

// ============================================================================
// Beans
// ============================================================================

async fn bean(app: &App, command: BeanCommand) -> AppResult<()> {
    match command {
        BeanCommand::List => {
            let beans = app.beans.list().await?;
            app.emit(&beans, || beans.iter().collect::<Vec<_>>().join("\n"))
        }
        BeanCommand::Add { name } => {
            let name = app.beans.add(&name).await?;
            app.emit(&json!({ "added": name }), || format!("Added bean '{}'", name))
        }
        BeanCommand::Remove { name } => {
            app.beans.remove(&name).await?;
            let name = name.trim();
            app.emit(&json!({ "removed": name }), || format!("Removed bean '{}'", name))
        }
    }
}

// ============================================================================
// Blends
// ============================================================================

async fn blend(app: &App, command: BlendCommand) -> AppResult<()> {
    match command {
        BlendCommand::Add(fields) => {
            let mut input = BlendInput::default();
            fields.apply_to(&mut input);
            let blend = app.blends.create(input).await?;
            app.emit(&blend, || format!("Saved blend #{}\n\n{}", blend.id, render_blend(&blend)))
        }
        BlendCommand::Edit { id, fields } => {
            let mut input = app.blends.get(id).await?.to_input();
            fields.apply_to(&mut input);
            let blend = app.blends.update(id, input).await?;
            app.emit(&blend, || format!("Updated blend #{}\n\n{}", blend.id, render_blend(&blend)))
        }
        BlendCommand::Duplicate { id } => {
            let blend = app.blends.duplicate(id).await?;
            app.emit(&blend, || format!("Saved copy as blend #{}\n\n{}", blend.id, render_blend(&blend)))
        }
        BlendCommand::Delete { id } => {
            let removed = app.blends.delete(id).await?;
            app.emit(&removed, || format!("Deleted blend #{} '{}'", removed.id, removed.name))
        }
        BlendCommand::Show { id } => {
            let blend = app.blends.get(id).await?;
            app.emit(&blend, || render_blend(&blend))
        }
        BlendCommand::List => {
            let blends = app.blends.list().await?;
            app.emit(&blends, || render_blend_list(&blends))
        }
        BlendCommand::Allocate { id, weight } => {
            let allocation = app.blends.allocate(id, weight).await?;
            app.emit(&allocation, || render_allocation(&allocation))
        }
    }
}

fn render_blend_list(blends: &[Blend]) -> String {
    if blends.is_empty() {
        return "No saved blends".to_string();
    }
    blends
        .iter()
        .map(|blend| {
            let beans: Vec<String> = blend
                .components
                .iter()
                .map(|c| format!("{} {}%", c.bean_name, c.percentage))
                .collect();
            format!("#{}  {}  ({})", blend.id, blend.name, beans.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_blend(blend: &Blend) -> String {
    let mut lines = vec![format!("Blend #{}  {}", blend.id, blend.name)];
    if let Some(description) = &blend.description {
        lines.push(description.clone());
    }
    for component in &blend.components {
        lines.push(format!("  {:<28} {:>6}%", component.bean_name, component.percentage));
    }
    lines.push(format!("  {:<28} {:>6}%", "Total", blend.total_percentage()));
    lines.join("\n")
}

fn render_allocation(allocation: &BlendAllocation) -> String {
    let mut lines: Vec<String> = allocation
        .components
        .iter()
        .map(|c| format!("  {:<28} {:>6}%  {:>6} g", c.bean_name, c.percentage, c.amount_grams))
        .collect();
    lines.push(format!(
        "  {:<28} {:>7}  {:>6} g",
        "Total", "", allocation.allocated_grams
    ));
    if !allocation.is_exact() {
        lines.push(format!(
            "Rounded amounts differ from the {} g batch by {} g",
            allocation.requested_grams,
            allocation.difference()
        ));
    }
    lines.join("\n")
}

// ============================================================================
// Calculators
// ============================================================================

fn calc(app: &App, command: CalcCommand) -> AppResult<()> {
    match command {
        CalcCommand::Time { value } => {
            let normalized = normalize_time_input(&value);
            let finalized = finalize_time_input(&value);
            let seconds = parse_time(&finalized);
            let formatted = format_time(seconds);
            app.emit(
                &json!({
                    "normalized": normalized,
                    "finalized": finalized,
                    "seconds": seconds,
                    "formatted": formatted,
                }),
                || format!("{} -> {} ({} s)", value, formatted, seconds),
            )
        }
        CalcCommand::Loss { green, roasted } => {
            let loss = derive_weight_loss(Some(green), Some(roasted));
            app.emit(&json!({ "loss_percent": loss }), || {
                format!("Loss: {}", format_percent(loss))
            })
        }
        CalcCommand::Metrics {
            final_time,
            fcs,
            cooling_start,
            cooling_tp,
            green,
            roasted,
        } => {
            let mut checkpoints = RoastCheckpoints::default();
            checkpoints.final_point.time_seconds = parse_time_arg(&final_time);
            checkpoints.first_crack_start.time_seconds = fcs.as_deref().and_then(parse_time_arg);
            checkpoints.cooling_start.time_seconds =
                cooling_start.as_deref().and_then(parse_time_arg);
            checkpoints.cooling_turning_point.time_seconds =
                cooling_tp.as_deref().and_then(parse_time_arg);

            let metrics = RoastMetrics::derive(&checkpoints, green, roasted);
            app.emit(&metrics, || {
                let mut lines = vec![format!("Loss:         {}", format_percent(metrics.loss_percent))];
                lines.extend(render_metrics(&metrics));
                lines.join("\n")
            })
        }
    }
}

// ============================================================================
// Spreadsheets
// ============================================================================

async fn export(app: &App, args: ExportArgs) -> AppResult<()> {
    let (csv, count) = match args.sheet {
        SheetKind::Roasts => {
            let roasts = app.roasts.list_stored().await?;
            (sheets::export_roasts(&roasts)?, roasts.len())
        }
        SheetKind::Beans => {
            let beans = app.beans.list().await?;
            (sheets::export_beans(&beans)?, beans.len())
        }
        SheetKind::Blends => {
            let blends = app.blends.list().await?;
            (sheets::export_blends(&blends)?, blends.len())
        }
    };

    if count == 0 {
        return Err(AppError::ValidationError("No data to export".to_string()));
    }

    let path = args.out.unwrap_or_else(|| {
        app.export_dir
            .join(args.sheet.default_file_name(Local::now().date_naive()))
    });
    write_file(&path, &csv).await?;

    tracing::info!("Exported {} {} to {}", count, args.sheet.as_str(), path.display());
    app.emit(
        &json!({ "sheet": args.sheet.as_str(), "rows": count, "path": path }),
        || format!("Exported {} {} to {}", count, args.sheet.as_str(), path.display()),
    )
}

async fn write_file(path: &Path, contents: &str) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, contents).await?;
    Ok(())
}

async fn import(app: &App, args: ImportArgs) -> AppResult<()> {
    let bytes = tokio::fs::read(&args.path).await?;
    let summary = import_sheet(app, args.sheet, &bytes).await?;

    app.emit(&summary, || {
        let mut message = format!("Imported {} {}", summary.imported, args.sheet.as_str());
        if summary.skipped > 0 {
            message.push_str(&format!(", skipped {} row(s)", summary.skipped));
        }
        message
    })
}

/// Parse a sheet and merge its rows into the matching collection
pub async fn import_sheet(app: &App, sheet: SheetKind, bytes: &[u8]) -> AppResult<ImportSummary> {
    let summary = match sheet {
        SheetKind::Roasts => {
            let parsed = sheets::import_roasts(bytes)?;
            let (imported, invalid) = app.roasts.import(parsed.rows).await?;
            ImportSummary {
                imported: imported.len(),
                skipped: parsed.skipped + invalid,
            }
        }
        SheetKind::Beans => {
            let parsed = sheets::import_beans(bytes)?;
            let imported = app.beans.merge(&parsed.rows).await?;
            ImportSummary {
                imported,
                skipped: parsed.skipped,
            }
        }
        SheetKind::Blends => {
            let parsed = sheets::import_blends(bytes)?;
            let (imported, invalid) = app.blends.import(parsed.rows).await?;
            ImportSummary {
                imported: imported.len(),
                skipped: parsed.skipped + invalid,
            }
        }
    };

    tracing::info!(
        "Imported {} row(s) into {}, skipped {}",
        summary.imported,
        sheet.as_str(),
        summary.skipped
    );
    Ok(summary)
}

fn temp(value: Option<Decimal>) -> String {
    value
        .map(|v| format!("{} °C", v))
        .unwrap_or_else(|| EMPTY_DISPLAY.to_string())
}

fn grams(value: Option<Decimal>) -> String {
    value
        .map(|v| format!("{} g", v))
        .unwrap_or_else(|| EMPTY_DISPLAY.to_string())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let cut: String = text.chars().take(width - 1).collect();
        format!("{}…", cut)
    }
}
