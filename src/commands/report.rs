use crate::aggregate::Aggregate;
use crate::config::BugdashConfig;
use crate::export::write_records_csv;
use crate::fetch::{HttpPageSource, PageSource};
use crate::report::table::{breakdown_tables, summary_tables};
use crate::scheduler::run_cycle;
use anyhow::{Context, Result};
use std::fmt::Write;
use tracing::{debug, warn};

/// Run one cycle against the configured upstream and print the tables.
pub async fn run_report(config: &BugdashConfig, breakdown: bool) -> Result<()> {
    config.validate()?;
    let source = HttpPageSource::new(&config.upstream)?;
    let aggregate = refresh_once(&source, config).await?;
    print!("{}", render_report_text(&aggregate, breakdown));
    Ok(())
}

/// One cycle plus the optional export. An export failure is only logged.
pub async fn refresh_once<S: PageSource>(source: &S, config: &BugdashConfig) -> Result<Aggregate> {
    let aggregate = run_cycle(source, config.upstream.page_ceiling, |page, cursor| {
        debug!(page, cursor, "fetching page");
    })
    .await
    .context("Refresh failed")?;

    if let Some(path) = &config.export.path {
        if let Err(err) = write_records_csv(path, &aggregate.records) {
            warn!(class = %err.class(), error = %err, "export failed");
        }
    }
    Ok(aggregate)
}

pub fn render_report_text(aggregate: &Aggregate, breakdown: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} bugs, {} without a milestone",
        aggregate.record_count(),
        aggregate.unset_milestone_count()
    );

    for table in summary_tables(aggregate) {
        let _ = writeln!(out, "\n{table}");
    }

    if breakdown {
        for (milestone, table) in breakdown_tables(aggregate) {
            let _ = writeln!(out, "\n{milestone}\n{table}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_page;
    use crate::testkit::{csv_page, record, ScriptedResponse, ScriptedSource};
    use tempfile::TempDir;

    fn sample() -> Vec<crate::model::Record> {
        vec![
            record(1, "M5", "Core", "NEW"),
            record(2, "M6", "Core", "ASSIGNED"),
            record(3, "M5", "Firefox", "NEW"),
        ]
    }

    #[tokio::test]
    async fn test_refresh_once_exports_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("bugs.csv");
        let mut config = BugdashConfig::default();
        config.export.path = Some(path.clone());

        let source = ScriptedSource::new(vec![ScriptedResponse::Csv(csv_page(&sample()))]);
        let aggregate = refresh_once(&source, &config).await.unwrap();
        assert_eq!(aggregate.record_count(), 3);

        let written = std::fs::read(&path).unwrap();
        let ids: Vec<u64> = decode_page(written.as_slice())
            .unwrap()
            .map(|row| row.unwrap().id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_refresh_once_fails_on_upstream_error() {
        let source = ScriptedSource::new(vec![ScriptedResponse::Status(500)]);
        let err = refresh_once(&source, &BugdashConfig::default())
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("500"));
    }

    #[tokio::test]
    async fn test_report_text_lists_ranked_values() {
        let source = ScriptedSource::new(vec![ScriptedResponse::Csv(csv_page(&sample()))]);
        let aggregate = refresh_once(&source, &BugdashConfig::default()).await.unwrap();

        let text = render_report_text(&aggregate, false);
        assert!(text.starts_with("3 bugs, 0 without a milestone\n"));
        assert!(text.contains("Milestone"));
        assert!(text.contains("ASSIGNED"));
        let m5 = text.find("M5").unwrap();
        let m6 = text.find("M6").unwrap();
        assert!(m5 < m6);
        assert!(!text.contains("Bug 3"));

        let components = text.find("Component").unwrap();
        assert!(text.find("Status").unwrap() < components);
        let core = text[components..].find("Core::General").unwrap();
        let firefox = text[components..].find("Firefox::General").unwrap();
        assert!(core < firefox);

        let with_breakdown = render_report_text(&aggregate, true);
        assert!(with_breakdown.contains("Bug 3"));
    }
}
