//! Command-line interface definition for `roastlog`

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use shared::{
    finalize_time_input, parse_checkpoint_time, BlendComponent, BlendInput, CheckpointKind,
    RecordId, RoastInput,
};

use crate::sheets::SheetKind;

#[derive(Parser)]
#[command(
    name = "roastlog",
    version,
    about = "Personal coffee roast log: roasts, beans, blends and spreadsheets"
)]
pub struct Cli {
    /// SQLite file to use instead of the configured one
    #[arg(long, global = true, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Log and browse roasts
    #[command(subcommand)]
    Roast(RoastCommand),
    /// Manage the bean list
    #[command(subcommand)]
    Bean(BeanCommand),
    /// Manage blend recipes
    #[command(subcommand)]
    Blend(BlendCommand),
    /// Run the calculators without saving anything
    #[command(subcommand)]
    Calc(CalcCommand),
    /// Write a collection to a CSV sheet
    Export(ExportArgs),
    /// Read a CSV sheet into a collection
    Import(ImportArgs),
}

#[derive(Subcommand)]
pub enum RoastCommand {
    /// Log a new roast
    Add(RoastFields),
    /// Change a saved roast; omitted fields keep their value
    Edit {
        id: RecordId,
        #[command(flatten)]
        fields: RoastFields,
    },
    /// Log a new roast prefilled from a saved one, dated today
    Duplicate {
        id: RecordId,
        #[command(flatten)]
        fields: RoastFields,
    },
    Delete {
        id: RecordId,
    },
    Show {
        id: RecordId,
    },
    /// List roasts, newest first
    List,
    /// Delete every roast
    Clear {
        /// Confirm deleting the whole history
        #[arg(long)]
        yes: bool,
    },
}

/// Roast form fields. Times are `MM:SS`.
#[derive(Args, Debug, Default, Clone)]
pub struct RoastFields {
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub date: Option<NaiveDate>,
    #[arg(long)]
    pub bean: Option<String>,

    #[arg(long, value_name = "°C")]
    pub env_temp: Option<Decimal>,
    #[arg(long, value_name = "°C")]
    pub charge_temp: Option<Decimal>,
    #[arg(long, value_name = "°C")]
    pub final_temp: Option<Decimal>,

    #[arg(long, value_name = "GRAMS")]
    pub green: Option<Decimal>,
    #[arg(long, value_name = "GRAMS")]
    pub roasted: Option<Decimal>,

    #[arg(long, value_name = "MM:SS")]
    pub tp_time: Option<String>,
    #[arg(long, value_name = "°C")]
    pub tp_temp: Option<Decimal>,
    #[arg(long, value_name = "MM:SS")]
    pub dry_end_time: Option<String>,
    #[arg(long, value_name = "°C")]
    pub dry_end_temp: Option<Decimal>,
    #[arg(long = "final-2-time", value_name = "MM:SS")]
    pub final_minus_2_time: Option<String>,
    #[arg(long = "final-2-temp", value_name = "°C")]
    pub final_minus_2_temp: Option<Decimal>,
    #[arg(long = "final-1-time", value_name = "MM:SS")]
    pub final_minus_1_time: Option<String>,
    #[arg(long = "final-1-temp", value_name = "°C")]
    pub final_minus_1_temp: Option<Decimal>,
    #[arg(long, value_name = "MM:SS")]
    pub final_time: Option<String>,
    #[arg(long, value_name = "°C")]
    pub final_temp_point: Option<Decimal>,
    /// First crack start
    #[arg(long, value_name = "MM:SS")]
    pub fcs_time: Option<String>,
    #[arg(long, value_name = "°C")]
    pub fcs_temp: Option<Decimal>,
    /// First crack end
    #[arg(long, value_name = "MM:SS")]
    pub fce_time: Option<String>,
    #[arg(long, value_name = "°C")]
    pub fce_temp: Option<Decimal>,
    /// Defaults to final time + 3 minutes
    #[arg(long, value_name = "MM:SS")]
    pub cooling_start_time: Option<String>,
    #[arg(long, value_name = "°C")]
    pub cooling_start_temp: Option<Decimal>,
    /// Cooling turning point
    #[arg(long, value_name = "MM:SS")]
    pub cooling_tp_time: Option<String>,
    #[arg(long, value_name = "°C")]
    pub cooling_tp_temp: Option<Decimal>,

    #[arg(long)]
    pub plan: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

impl RoastFields {
    fn checkpoint_args(&self) -> [(CheckpointKind, Option<&str>, Option<Decimal>); 9] {
        [
            (CheckpointKind::TurningPoint, self.tp_time.as_deref(), self.tp_temp),
            (CheckpointKind::DryEnd, self.dry_end_time.as_deref(), self.dry_end_temp),
            (
                CheckpointKind::FinalMinus2,
                self.final_minus_2_time.as_deref(),
                self.final_minus_2_temp,
            ),
            (
                CheckpointKind::FinalMinus1,
                self.final_minus_1_time.as_deref(),
                self.final_minus_1_temp,
            ),
            (CheckpointKind::Final, self.final_time.as_deref(), self.final_temp_point),
            (CheckpointKind::FirstCrackStart, self.fcs_time.as_deref(), self.fcs_temp),
            (CheckpointKind::FirstCrackEnd, self.fce_time.as_deref(), self.fce_temp),
            (
                CheckpointKind::CoolingStart,
                self.cooling_start_time.as_deref(),
                self.cooling_start_temp,
            ),
            (
                CheckpointKind::CoolingTurningPoint,
                self.cooling_tp_time.as_deref(),
                self.cooling_tp_temp,
            ),
        ]
    }

    /// Overlay the given fields on `input`.
    ///
    /// A new final temperature clears the Final, Final-1 and Final-2
    /// temperatures that were not given so they are derived again. A new
    /// final time does the same for the cooling start time.
    pub fn apply_to(&self, input: &mut RoastInput) {
        if let Some(date) = self.date {
            input.roast_date = Some(date);
        }
        if let Some(bean) = &self.bean {
            input.bean_name = bean.clone();
        }
        override_value(&mut input.env_temp_celsius, self.env_temp);
        override_value(&mut input.charge_temp_celsius, self.charge_temp);
        override_value(&mut input.green_weight_grams, self.green);
        override_value(&mut input.roasted_weight_grams, self.roasted);

        let checkpoints = &mut input.checkpoints;
        if self.final_temp.is_some() {
            input.final_temp_celsius = self.final_temp;
            checkpoints.final_point.temp_celsius = None;
            checkpoints.final_minus_1.temp_celsius = None;
            checkpoints.final_minus_2.temp_celsius = None;
        }
        if self.final_time.is_some() {
            checkpoints.cooling_start.time_seconds = None;
        }

        for (kind, time, temp) in self.checkpoint_args() {
            let checkpoint = checkpoints.get_mut(kind);
            if let Some(raw) = time {
                checkpoint.time_seconds = parse_time_arg(raw);
            }
            override_value(&mut checkpoint.temp_celsius, temp);
        }

        if let Some(plan) = &self.plan {
            input.roast_plan = Some(plan.clone());
        }
        if let Some(notes) = &self.notes {
            input.roast_notes = Some(notes.clone());
        }
    }
}

/// `MM:SS` argument as seconds; empty, `-` and `00:00` clear the field
pub fn parse_time_arg(raw: &str) -> Option<u32> {
    parse_checkpoint_time(&finalize_time_input(raw))
}

fn override_value<T>(target: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *target = value;
    }
}

#[derive(Subcommand)]
pub enum BeanCommand {
    List,
    Add { name: String },
    Remove { name: String },
}

#[derive(Subcommand)]
pub enum BlendCommand {
    /// Save a new blend recipe
    Add(BlendFields),
    /// Change a blend; giving any --component replaces all components
    Edit {
        id: RecordId,
        #[command(flatten)]
        fields: BlendFields,
    },
    /// Save a copy of a blend
    Duplicate { id: RecordId },
    Delete { id: RecordId },
    Show { id: RecordId },
    List,
    /// Split a batch weight across a blend's beans
    Allocate {
        id: RecordId,
        /// Batch weight in grams
        #[arg(long, value_name = "GRAMS")]
        weight: Decimal,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct BlendFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Component as `BEAN=PERCENT`, repeat for each bean
    #[arg(long = "component", value_name = "BEAN=PERCENT", value_parser = parse_component)]
    pub components: Vec<BlendComponent>,
}

impl BlendFields {
    pub fn apply_to(&self, input: &mut BlendInput) {
        if let Some(name) = &self.name {
            input.name = name.clone();
        }
        if let Some(description) = &self.description {
            input.description = Some(description.clone());
        }
        if !self.components.is_empty() {
            input.components = self.components.clone();
        }
    }
}

/// Parse `Bean Name=60`; the last `=` separates the percentage
pub fn parse_component(raw: &str) -> Result<BlendComponent, String> {
    let (bean, percent) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected BEAN=PERCENT, got '{}'", raw))?;
    let bean = bean.trim();
    if bean.is_empty() {
        return Err("bean name is empty".to_string());
    }
    let percentage: Decimal = percent
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a percentage", percent.trim()))?;
    Ok(BlendComponent::new(bean, percentage))
}

#[derive(Subcommand)]
pub enum CalcCommand {
    /// Normalize and convert a time entry
    Time { value: String },
    /// Weight loss percentage
    Loss {
        #[arg(long, value_name = "GRAMS")]
        green: Decimal,
        #[arg(long, value_name = "GRAMS")]
        roasted: Decimal,
    },
    /// Total, development time and DTR from checkpoint times
    Metrics {
        #[arg(long = "final", value_name = "MM:SS")]
        final_time: String,
        #[arg(long, value_name = "MM:SS")]
        fcs: Option<String>,
        #[arg(long, value_name = "MM:SS")]
        cooling_start: Option<String>,
        #[arg(long, value_name = "MM:SS")]
        cooling_tp: Option<String>,
        #[arg(long, value_name = "GRAMS")]
        green: Option<Decimal>,
        #[arg(long, value_name = "GRAMS")]
        roasted: Option<Decimal>,
    },
}

#[derive(Args)]
pub struct ExportArgs {
    #[arg(value_enum)]
    pub sheet: SheetKind,
    /// Output file; defaults to coffee_<sheet>_<date>.csv in the export directory
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct ImportArgs {
    #[arg(value_enum)]
    pub sheet: SheetKind,
    pub path: PathBuf,
}
