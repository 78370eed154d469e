// lodestar/src/commands/mod.rs

pub mod clean;
pub mod inspect;
pub mod query;
pub mod report;
pub mod run;

use comfy_table::{Table, presets::UTF8_FULL};
use lodestar_core::ports::connector::QueryOutput;

/// Renders a result set for the terminal.
pub fn render_table(output: &QueryOutput) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(output.columns.clone());
    for row in &output.rows {
        table.add_row(row.clone());
    }
    table
}
