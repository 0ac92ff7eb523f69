use tabled::builder::Builder;
use tabled::settings::{Padding, Style};

use crate::ui::widgets::TableSpec;

/// Image references and error strings can be long; cells past this many
/// characters are cut with an ellipsis.
pub const MAX_CELL_WIDTH: usize = 40;

pub fn render_table(spec: &TableSpec) -> String {
    let mut builder = Builder::default();
    if !spec.headers.is_empty() {
        builder.push_record(spec.headers.iter().map(|header| header.to_uppercase()));
    }
    for row in &spec.rows {
        builder.push_record(row.iter().map(|cell| fit_cell(cell, MAX_CELL_WIDTH)));
    }
    let mut table = builder.build();
    table.with(Style::blank());
    table.with(Padding::new(0, 2, 0, 0));
    table.to_string()
}

fn fit_cell(cell: &str, max: usize) -> String {
    if cell.chars().count() <= max {
        return cell.to_owned();
    }
    let kept = cell.chars().take(max.saturating_sub(1)).collect::<String>();
    format!("{kept}…")
}
