//! Plain-text tables for the `report` command.

use crate::aggregate::{Aggregate, Dimension, FrequencyTable};
use crate::model::milestone_label;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{CellAlignment, ContentArrangement, Table};

fn base_table(headers: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers);
    table
}

/// One dimension's values with counts, highest count first.
pub fn frequency_table(title: &str, counts: &FrequencyTable) -> Table {
    let mut table = base_table(vec![title, "Count"]);
    for (value, count) in counts.ranked() {
        table.add_row(vec![value.to_string(), count.to_string()]);
    }
    if let Some(column) = table.column_mut(1) {
        column.set_cell_alignment(CellAlignment::Right);
    }
    table
}

/// The served dimensions followed by a per-component table.
pub fn summary_tables(aggregate: &Aggregate) -> Vec<Table> {
    let mut tables: Vec<Table> = Dimension::ALL
        .iter()
        .map(|dimension| frequency_table(dimension.title(), aggregate.table(*dimension)))
        .collect();
    tables.push(frequency_table("Component", &aggregate.component_counts()));
    tables
}

/// Bugs of each milestone, one table per milestone.
pub fn breakdown_tables(aggregate: &Aggregate) -> Vec<(String, Table)> {
    aggregate
        .by_milestone()
        .into_iter()
        .map(|(milestone, records)| {
            let mut table = base_table(vec![
                "Priority",
                "Summary",
                "Resolution",
                "Assignee",
                "Bug ID",
                "Component",
            ]);
            for record in records {
                table.add_row(vec![
                    record.priority.clone(),
                    record.summary.clone(),
                    record.resolution.clone(),
                    record.assignee.clone(),
                    record.id.to_string(),
                    record.component_label(),
                ]);
            }
            (milestone_label(milestone).to_string(), table)
        })
        .collect()
}
