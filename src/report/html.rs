use crate::aggregate::{Aggregate, Dimension, FrequencyTable};
use crate::model::{milestone_label, Record};
use chrono::{DateTime, Utc};
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write as _;

const REPORT_TEMPLATE: &str = include_str!("templates/report.html");
const WAITING_TEMPLATE: &str = include_str!("templates/waiting.html");

/// Renders the served HTML page for one finished cycle.
pub struct HtmlReport<'a> {
    template: &'static str,
    bug_link_base: &'a str,
}

impl<'a> HtmlReport<'a> {
    pub fn new(bug_link_base: &'a str) -> Self {
        Self {
            template: REPORT_TEMPLATE,
            bug_link_base,
        }
    }

    pub fn render(&self, aggregate: &Aggregate, cycle: u64, completed_at: DateTime<Utc>) -> String {
        fill_template(
            self.template,
            &[
                (
                    "TIMESTAMP",
                    completed_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
                ),
                ("CYCLE", cycle.to_string()),
                ("TOTAL_BUGS", aggregate.record_count().to_string()),
                ("SUMMARY_TABLES", summary_tables(aggregate)),
                ("MILESTONE_SECTIONS", self.milestone_sections(aggregate)),
            ],
        )
    }

    fn milestone_sections(&self, aggregate: &Aggregate) -> String {
        let mut out = String::new();
        for (milestone, records) in aggregate.by_milestone() {
            let _ = writeln!(
                out,
                "<section class=\"milestone\">\n<h2>{} <span class=\"count\">({})</span></h2>",
                encode_text(milestone_label(milestone)),
                records.len()
            );
            out.push_str(
                "<table class=\"bugs\">\n<thead><tr><th>Priority</th><th>Summary</th>\
                 <th>Resolution</th><th>Assignee</th><th>Bug ID</th><th>Milestone</th></tr></thead>\n<tbody>\n",
            );
            for record in records {
                out.push_str(&self.bug_row(record));
            }
            out.push_str("</tbody>\n</table>\n</section>\n");
        }
        out
    }

    fn bug_row(&self, record: &Record) -> String {
        let href = format!("{}{}", self.bug_link_base, record.id);
        format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
             <td><a href=\"{}\">{}</a></td><td>{}</td></tr>\n",
            encode_text(&record.priority),
            encode_text(&record.summary),
            encode_text(&record.resolution),
            encode_text(&record.assignee),
            encode_double_quoted_attribute(&href),
            record.id,
            encode_text(milestone_label(&record.milestone)),
        )
    }
}

/// Substitute `{{{NAME}}}` placeholders in one pass.
///
/// Substituted text is never rescanned, so placeholder-looking values taken
/// from bug data come out literally. Unknown placeholders are left as they are.
fn fill_template(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find("{{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 3..];
        let value = after.find("}}}").and_then(|close| {
            values
                .iter()
                .find(|(name, _)| *name == &after[..close])
                .map(|(_, value)| (close, value))
        });
        match value {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 3..];
            }
            None => {
                out.push_str("{{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// The page served before the first cycle has finished.
pub fn render_waiting() -> String {
    WAITING_TEMPLATE.to_string()
}

fn summary_tables(aggregate: &Aggregate) -> String {
    Dimension::ALL
        .iter()
        .map(|dimension| summary_table(*dimension, aggregate.table(*dimension)))
        .collect()
}

fn summary_table(dimension: Dimension, table: &FrequencyTable) -> String {
    let mut out = format!(
        "<table class=\"summary\" id=\"summary-{}\">\n<thead><tr><th>{}</th><th>Count</th></tr></thead>\n<tbody>\n",
        dimension.key(),
        encode_text(dimension.title())
    );
    for (value, count) in table.ranked() {
        let value = match dimension {
            Dimension::Milestone => milestone_label(value),
            _ => value,
        };
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td></tr>",
            encode_text(value),
            count
        );
    }
    out.push_str("</tbody>\n</table>\n");
    out
}
