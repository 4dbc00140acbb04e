use serde::Serialize;

use crate::model::settings::{ChartStyle, ViewMode};
use crate::report::{Report, numeric_prefix};

const CHAR_WIDTH: f64 = 0.6;
const PADDING: f64 = 0.5;
const ROW_HEIGHT: f64 = 1.5;
const BASELINE_SHIFT: f64 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnLayout {
    pub header: String,
    pub x: f64,
    pub width: f64,
    /// Largest numeric cell value; 0 when the column holds no numbers.
    pub max_value: f64,
    /// Start of the header text, drawn rotated by -90 degrees.
    pub header_anchor: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowLayout {
    pub header: String,
    pub y: f64,
    pub height: f64,
    pub header_anchor: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mark", rename_all = "snake_case")]
pub enum Mark {
    /// Right-aligned at `x`.
    Text {
        row: usize,
        col: usize,
        x: f64,
        y: f64,
        text: String,
    },
    Circle {
        row: usize,
        col: usize,
        cx: f64,
        cy: f64,
        r: f64,
    },
    Block {
        row: usize,
        col: usize,
        rect: Rect,
    },
    Vertex {
        row: usize,
        col: usize,
        x: f64,
        y: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polyline {
    pub col: usize,
    pub points: Vec<Point>,
}

/// Geometry of a synoptic chart, built once from a finished report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartLayout {
    pub view: ViewMode,
    pub style: ChartStyle,
    pub width: f64,
    pub height: f64,
    pub header_height: f64,
    pub row_header_width: f64,
    pub row_height: f64,
    pub columns: Vec<ColumnLayout>,
    pub rows: Vec<RowLayout>,
    pub marks: Vec<Mark>,
    pub polylines: Vec<Polyline>,
    pub border: Rect,
    /// Horizontal rule under the headers, vertical rule after the row headers.
    pub rules: Vec<Segment>,
    /// Vertical lines between column groups.
    pub separators: Vec<Segment>,
}

/// Font-derived measures shared by every width formula.
#[derive(Debug, Clone, Copy)]
struct Metrics {
    font: f64,
    char_width: f64,
    pad: f64,
    origin: f64,
    row_height: f64,
}

impl Metrics {
    fn new(style: &ChartStyle) -> Self {
        let font = style.font_size;
        Self {
            font,
            char_width: CHAR_WIDTH * font,
            pad: PADDING * font,
            origin: style.stroke_width / 2.0,
            row_height: ROW_HEIGHT * font + style.stroke_width,
        }
    }

    fn text_extent<'s>(&self, texts: impl Iterator<Item = &'s str>) -> f64 {
        let chars = texts.map(|t| t.chars().count()).max().unwrap_or(0);
        chars as f64 * self.char_width + 2.0 * self.pad
    }

    fn column_width(&self, view: ViewMode, report: &Report, col: usize) -> f64 {
        let inner = match view {
            ViewMode::Numbers => {
                let chars = (0..report.n_rows())
                    .map(|row| report.value(row, col).map_or(0, |v| v.chars().count()))
                    .max()
                    .unwrap_or(0);
                (chars as f64 * self.char_width).max(self.font)
            }
            ViewMode::Points => self.font,
            ViewMode::Blocks => 2.0 * self.font,
            ViewMode::Lines => 4.0 * self.font,
        };
        inner + 2.0 * self.pad
    }
}

fn cell_magnitude(report: &Report, row: usize, col: usize, max_value: f64) -> f64 {
    if max_value <= 0.0 {
        return 0.0;
    }
    let value = report.value(row, col).and_then(numeric_prefix).unwrap_or(0.0);
    (value / max_value).max(0.0)
}

fn column_max(report: &Report, col: usize) -> f64 {
    (0..report.n_rows())
        .filter_map(|row| report.value(row, col).and_then(numeric_prefix))
        .fold(0.0, f64::max)
}

pub fn run_stage4(report: &Report, view: ViewMode, style: ChartStyle) -> ChartLayout {
    let m = Metrics::new(&style);
    let o = m.origin;

    let header_height = m.text_extent(report.column_headers.iter().map(String::as_str));
    let row_header_width = m.text_extent(report.row_headers.iter().map(String::as_str));

    let mut columns = Vec::with_capacity(report.n_cols());
    let mut x = o + row_header_width;
    for (col, header) in report.column_headers.iter().enumerate() {
        let width = m.column_width(view, report, col);
        columns.push(ColumnLayout {
            header: header.clone(),
            x,
            width,
            max_value: column_max(report, col),
            header_anchor: Point {
                x: x + width / 2.0 + BASELINE_SHIFT * m.font,
                y: o + header_height - m.pad,
            },
        });
        x += width;
    }

    let mut rows = Vec::with_capacity(report.n_rows());
    let mut y = o + header_height;
    for header in &report.row_headers {
        rows.push(RowLayout {
            header: header.clone(),
            y,
            height: m.row_height,
            header_anchor: Point {
                x: o + m.pad,
                y: y + m.row_height / 2.0 + BASELINE_SHIFT * m.font,
            },
        });
        y += m.row_height;
    }

    let width = 2.0 * o + row_header_width + columns.iter().map(|c| c.width).sum::<f64>();
    let height = 2.0 * o + header_height + rows.len() as f64 * m.row_height;

    let mut marks = Vec::new();
    let mut polylines = Vec::new();
    for (col, column) in columns.iter().enumerate() {
        let mut points = Vec::new();
        for (row, layout) in rows.iter().enumerate() {
            let centre_y = layout.y + m.row_height / 2.0;
            let magnitude = cell_magnitude(report, row, col, column.max_value);
            match view {
                ViewMode::Numbers => {
                    let Some(text) = report.value(row, col).filter(|t| !t.is_empty() && *t != "0")
                    else {
                        continue;
                    };
                    marks.push(Mark::Text {
                        row,
                        col,
                        x: column.x + column.width - m.pad,
                        y: centre_y + BASELINE_SHIFT * m.font,
                        text: text.to_string(),
                    });
                }
                ViewMode::Points => {
                    if magnitude > 0.0 {
                        marks.push(Mark::Circle {
                            row,
                            col,
                            cx: column.x + column.width / 2.0,
                            cy: centre_y,
                            r: magnitude * m.font / 2.0,
                        });
                    }
                }
                ViewMode::Blocks => {
                    if magnitude > 0.0 {
                        let block_width = magnitude * (column.width - 2.0 * m.pad);
                        marks.push(Mark::Block {
                            row,
                            col,
                            rect: Rect {
                                x: column.x + (column.width - block_width) / 2.0,
                                y: centre_y - m.font / 2.0,
                                width: block_width,
                                height: m.font,
                            },
                        });
                    }
                }
                ViewMode::Lines => {
                    let vx = column.x + m.pad + magnitude * (column.width - 2.0 * m.pad);
                    marks.push(Mark::Vertex {
                        row,
                        col,
                        x: vx,
                        y: centre_y,
                    });
                    points.push(Point { x: vx, y: centre_y });
                }
            }
        }
        if !points.is_empty() {
            polylines.push(Polyline { col, points });
        }
    }

    let border = Rect {
        x: o,
        y: o,
        width: width - 2.0 * o,
        height: height - 2.0 * o,
    };
    let rules = vec![
        Segment {
            from: Point {
                x: o,
                y: o + header_height,
            },
            to: Point {
                x: width - o,
                y: o + header_height,
            },
        },
        Segment {
            from: Point {
                x: o + row_header_width,
                y: o,
            },
            to: Point {
                x: o + row_header_width,
                y: height - o,
            },
        },
    ];
    let separators = report
        .splits
        .iter()
        .filter(|&&split| split > 0 && split < columns.len())
        .map(|&split| Segment {
            from: Point {
                x: columns[split].x,
                y: o,
            },
            to: Point {
                x: columns[split].x,
                y: height - o,
            },
        })
        .collect();

    tracing::debug!(
        ?view,
        width,
        height,
        marks = marks.len(),
        "chart layout computed"
    );

    ChartLayout {
        view,
        style,
        width,
        height,
        header_height,
        row_header_width,
        row_height: m.row_height,
        columns,
        rows,
        marks,
        polylines,
        border,
        rules,
        separators,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_chart.rs"]
mod tests;
