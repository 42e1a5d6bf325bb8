//! Renderers for command results.
//!
//! Every command produces a `serde_json::Value`, usually a
//! `ComputationOutput` envelope. The formats differ in how much of it they
//! show:
//!
//! - `json`: the whole value
//! - `table`: the result fields, with payment and yearly records as sub-tables
//! - `csv`: one row per record for schedules and projections, key/value otherwise
//! - `minimal`: the headline figure of each computation only

pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use serde_json::Value;

use crate::OutputFormat;

pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}
