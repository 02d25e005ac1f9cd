//! Factory functions for test records and pages.

use crate::model::Record;

/// A record with the dimensions that matter for aggregation set and
/// plausible filler for the rest.
pub fn record(id: u64, milestone: &str, product: &str, status: &str) -> Record {
    Record {
        id,
        milestone: milestone.to_string(),
        product: product.to_string(),
        component: "General".to_string(),
        status: status.to_string(),
        priority: "P2".to_string(),
        assignee: "nobody@mozilla.org".to_string(),
        summary: format!("Bug {id}"),
        resolution: String::new(),
    }
}

/// Render records as one CSV page with the upstream's header row.
///
/// An empty slice still produces the header row.
pub fn csv_page(records: &[Record]) -> String {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if records.is_empty() {
        writer
            .write_record([
                "Bug ID",
                "Fission Milestone",
                "Product",
                "Component",
                "Status",
                "Priority",
                "Assignee",
                "Summary",
                "Resolution",
            ])
            .expect("writing to a Vec cannot fail");
    }
    for record in records {
        writer.serialize(record).expect("writing to a Vec cannot fail");
    }
    let bytes = writer.into_inner().expect("writing to a Vec cannot fail");
    String::from_utf8(bytes).expect("csv output is UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_page;

    #[test]
    fn test_csv_page_decodes_back() {
        let page = csv_page(&[record(3, "M1", "Core", "NEW"), record(4, "---", "UI", "NEW")]);
        let decoded: Vec<Record> = decode_page(page.as_bytes())
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(decoded, vec![record(3, "M1", "Core", "NEW"), record(4, "---", "UI", "NEW")]);
    }

    #[test]
    fn test_empty_csv_page_is_header_only() {
        let page = csv_page(&[]);
        assert_eq!(page.lines().count(), 1);
        assert!(page.starts_with("Bug ID,"));
    }
}
