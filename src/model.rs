//! Bug records as they arrive from the tracker's CSV export.

use serde::{Deserialize, Serialize};

/// Column names in the upstream CSV export (human-readable header mode).
pub mod columns {
    pub const BUG_ID: &str = "Bug ID";
    pub const MILESTONE: &str = "Fission Milestone";
    pub const PRODUCT: &str = "Product";
    pub const COMPONENT: &str = "Component";
    pub const STATUS: &str = "Status";
    pub const PRIORITY: &str = "Priority";
    pub const ASSIGNEE: &str = "Assignee";
    pub const SUMMARY: &str = "Summary";
    pub const RESOLUTION: &str = "Resolution";

    /// Columns a page must carry for any of its rows to decode.
    pub const REQUIRED: [&str; 4] = [BUG_ID, MILESTONE, PRODUCT, STATUS];
}

/// The tracker's placeholder for a milestone field that was never set.
pub const UNSET_MILESTONE: &str = "---";

/// One bug row.
///
/// Field names on the wire are the export's column headers, so the same
/// type reads a page and writes the CSV export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Bug ID")]
    pub id: u64,
    #[serde(rename = "Fission Milestone")]
    pub milestone: String,
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "Component", default)]
    pub component: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Priority", default)]
    pub priority: String,
    #[serde(rename = "Assignee", default)]
    pub assignee: String,
    #[serde(rename = "Summary", default)]
    pub summary: String,
    #[serde(rename = "Resolution", default)]
    pub resolution: String,
}

/// Display label for a milestone value; the unset sentinel reads as "No milestone".
pub fn milestone_label(milestone: &str) -> &str {
    if milestone.is_empty() || milestone == UNSET_MILESTONE {
        "No milestone"
    } else {
        milestone
    }
}

impl Record {
    pub fn milestone_is_unset(&self) -> bool {
        self.milestone.is_empty() || self.milestone == UNSET_MILESTONE
    }

    /// `Product::Component`, or just the product when no component was exported.
    pub fn component_label(&self) -> String {
        if self.component.is_empty() {
            self.product.clone()
        } else {
            format!("{}::{}", self.product, self.component)
        }
    }
}
