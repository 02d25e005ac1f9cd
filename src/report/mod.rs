//! Turning a finished [`Aggregate`](crate::aggregate::Aggregate) into what
//! gets served or printed: the HTML page, the `/data` chart document and
//! terminal tables.

pub mod html;
pub mod json;
pub mod table;

pub use html::{render_waiting, HtmlReport};
pub use json::{chart_data_json, ChartData};
