use crate::aggregate::{Aggregate, FrequencyTable};
use crate::errors::Result;
use serde::Serialize;

/// The `/data` document: one frequency table per chart.
#[derive(Debug, Serialize)]
pub struct ChartData<'a> {
    pub milestone: &'a FrequencyTable,
    pub product: &'a FrequencyTable,
    pub status: &'a FrequencyTable,
}

impl<'a> From<&'a Aggregate> for ChartData<'a> {
    fn from(aggregate: &'a Aggregate) -> Self {
        Self {
            milestone: &aggregate.milestone,
            product: &aggregate.product,
            status: &aggregate.status,
        }
    }
}

pub fn chart_data_json(aggregate: &Aggregate) -> Result<String> {
    Ok(serde_json::to_string(&ChartData::from(aggregate))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Aggregator;
    use crate::testkit::record;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_three_row_document() {
        let mut aggregator = Aggregator::new();
        aggregator.fold(record(1, "M1", "Core", "NEW"));
        aggregator.fold(record(2, "M2", "Core", "NEW"));
        aggregator.fold(record(3, "M1", "UI", "RESOLVED"));

        let json = chart_data_json(&aggregator.finish()).unwrap();
        assert_eq!(
            json,
            r#"{"milestone":{"M1":2,"M2":1},"product":{"Core":2,"UI":1},"status":{"NEW":2,"RESOLVED":1}}"#
        );
    }

    #[test]
    fn test_empty_aggregate_has_all_keys() {
        let json = chart_data_json(&Aggregate::default()).unwrap();
        assert_eq!(json, r#"{"milestone":{},"product":{},"status":{}}"#);
    }
}
