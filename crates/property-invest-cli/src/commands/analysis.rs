use clap::{Args, ValueEnum};
use serde_json::Value;

use property_invest_core::analysis::investment;
use property_invest_core::analysis::scoring::{self, ScoreInput};
use property_invest_core::analysis::sensitivity;
use property_invest_core::analysis::{PropertyScenario, ScenarioPreset};

use crate::input;

#[derive(Debug, Clone, ValueEnum)]
pub enum PresetArg {
    Pessimistic,
    Neutral,
    Optimistic,
}

impl From<PresetArg> for ScenarioPreset {
    fn from(p: PresetArg) -> Self {
        match p {
            PresetArg::Pessimistic => ScenarioPreset::Pessimistic,
            PresetArg::Neutral => ScenarioPreset::Neutral,
            PresetArg::Optimistic => ScenarioPreset::Optimistic,
        }
    }
}

/// Arguments for commands that take a property scenario
#[derive(Args)]
pub struct ScenarioArgs {
    /// Path to JSON or YAML scenario; missing fields use defaults
    #[arg(long)]
    pub input: Option<String>,

    /// Override appreciation, vacancy and maintenance with a market preset
    #[arg(long)]
    pub preset: Option<PresetArg>,
}

/// Arguments for the full property analysis
pub type AnalyzeArgs = ScenarioArgs;

fn load_scenario(args: ScenarioArgs) -> Result<PropertyScenario, Box<dyn std::error::Error>> {
    let scenario: PropertyScenario =
        input::read_structured(args.input.as_deref())?.unwrap_or_default();
    Ok(match args.preset {
        Some(preset) => scenario.with_preset(preset.into()),
        None => scenario,
    })
}

pub fn run_sensitivity(args: ScenarioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let scenario = load_scenario(args)?;
    let result = sensitivity::sensitivity_analysis(&scenario)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let scenario = load_scenario(args)?;
    let result = investment::analyze_property(&scenario)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the investment score
#[derive(Args)]
pub struct ScoreArgs {
    /// Path to JSON or YAML metrics file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_score(args: ScoreArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let score_input: ScoreInput = input::read_structured(args.input.as_deref())?
        .ok_or("--input <file> or stdin required for investment score")?;
    let result = scoring::investment_score(&score_input)?;
    Ok(serde_json::to_value(result)?)
}
