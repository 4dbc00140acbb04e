use serde::Serialize;

use crate::pipeline::stage4_chart::ChartLayout;
use crate::report::SummaryData;

pub fn render_summary_json(data: &SummaryData) -> Result<String, serde_json::Error> {
    pretty(data)
}

pub fn render_chart_json(layout: &ChartLayout) -> Result<String, serde_json::Error> {
    pretty(layout)
}

fn pretty<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let mut out = serde_json::to_string_pretty(value)?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/json.rs"]
mod tests;
