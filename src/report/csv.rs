use std::io;

use csv::Writer;

use crate::report::Report;

/// Header row `["", columns...]`, then `[sample, values...]` per row. Cells
/// reading `"0"` and missing cells are left blank.
pub fn render_report_csv(report: &Report) -> Result<String, csv::Error> {
    let mut writer = Writer::from_writer(Vec::new());

    let header = std::iter::once("").chain(report.column_headers.iter().map(String::as_str));
    writer.write_record(header)?;

    for (row, name) in report.row_headers.iter().enumerate() {
        let cells = (0..report.n_cols()).map(|col| blank_zero(report.value(row, col)));
        writer.write_record(std::iter::once(name.as_str()).chain(cells))?;
    }

    let bytes = writer.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| csv::Error::from(io::Error::new(io::ErrorKind::InvalidData, e)))
}

fn blank_zero(value: Option<&str>) -> &str {
    match value {
        Some("0") | None => "",
        Some(v) => v,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/csv.rs"]
mod tests;
