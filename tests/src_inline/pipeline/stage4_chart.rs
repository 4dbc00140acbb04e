use super::*;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn style() -> ChartStyle {
    // char 6, pad 5, origin 1, row height 17
    ChartStyle {
        font_size: 10.0,
        stroke_width: 2.0,
    }
}

fn report() -> Report {
    Report {
        row_headers: vec!["S-1".to_string(), "S-22".to_string()],
        column_headers: vec!["ab".to_string(), "abcd".to_string()],
        values: vec![
            vec![Some("5".to_string()), Some("12".to_string())],
            vec![Some("0".to_string()), Some("3+?".to_string())],
        ],
        splits: vec![1, 2],
    }
}

#[test]
fn test_numbers_geometry() {
    let layout = run_stage4(&report(), ViewMode::Numbers, style());

    assert!(close(layout.header_height, 34.0));
    assert!(close(layout.row_header_width, 34.0));
    assert!(close(layout.row_height, 17.0));

    assert!(close(layout.columns[0].x, 35.0));
    assert!(close(layout.columns[0].width, 20.0));
    assert!(close(layout.columns[1].x, 55.0));
    assert!(close(layout.columns[1].width, 28.0));

    assert!(close(layout.rows[0].y, 35.0));
    assert!(close(layout.rows[1].y, 52.0));

    assert!(close(layout.width, 84.0));
    assert!(close(layout.height, 70.0));
    assert!(close(layout.border.width, 82.0));
    assert!(close(layout.border.height, 68.0));
}

#[test]
fn test_numbers_marks_skip_zero_cells() {
    let layout = run_stage4(&report(), ViewMode::Numbers, style());
    assert_eq!(layout.marks.len(), 3);
    match &layout.marks[0] {
        Mark::Text { row, col, x, y, text } => {
            assert_eq!((*row, *col), (0, 0));
            assert_eq!(text, "5");
            assert!(close(*x, 50.0));
            assert!(close(*y, 47.0));
        }
        other => panic!("unexpected mark {other:?}"),
    }
    match &layout.marks[2] {
        Mark::Text { row, x, y, text, .. } => {
            assert_eq!(*row, 1);
            assert_eq!(text, "3+?");
            assert!(close(*x, 78.0));
            assert!(close(*y, 64.0));
        }
        other => panic!("unexpected mark {other:?}"),
    }
    assert!(layout.polylines.is_empty());
}

#[test]
fn test_separators_between_groups_only() {
    let layout = run_stage4(&report(), ViewMode::Numbers, style());
    assert_eq!(layout.separators.len(), 1);
    let sep = layout.separators[0];
    assert!(close(sep.from.x, 55.0));
    assert!(close(sep.from.y, 1.0));
    assert!(close(sep.to.y, 69.0));

    assert_eq!(layout.rules.len(), 2);
    assert!(close(layout.rules[0].from.y, 35.0));
    assert!(close(layout.rules[1].from.x, 35.0));
}

#[test]
fn test_points_scale_by_column_max() {
    let layout = run_stage4(&report(), ViewMode::Points, style());
    assert!(layout.columns.iter().all(|c| close(c.width, 20.0)));
    assert!(close(layout.columns[1].max_value, 12.0));

    let circles: Vec<(usize, usize, f64, f64)> = layout
        .marks
        .iter()
        .filter_map(|m| match m {
            Mark::Circle { row, col, cx, r, .. } => Some((*row, *col, *cx, *r)),
            _ => None,
        })
        .collect();
    assert_eq!(circles.len(), 3);
    assert!(close(circles[0].3, 5.0));
    let (row, col, cx, r) = circles[2];
    assert_eq!((row, col), (1, 1));
    assert!(close(cx, 65.0));
    assert!(close(r, 1.25));
}

#[test]
fn test_blocks_are_centred() {
    let layout = run_stage4(&report(), ViewMode::Blocks, style());
    assert!(close(layout.columns[1].x, 65.0));
    let block = layout
        .marks
        .iter()
        .find_map(|m| match m {
            Mark::Block { row: 1, col: 1, rect } => Some(*rect),
            _ => None,
        })
        .unwrap();
    assert!(close(block.width, 5.0));
    assert!(close(block.x, 77.5));
    assert!(close(block.y, 55.5));
    assert!(close(block.height, 10.0));
}

#[test]
fn test_lines_build_one_polyline_per_column() {
    let layout = run_stage4(&report(), ViewMode::Lines, style());
    assert!(layout.columns.iter().all(|c| close(c.width, 50.0)));
    assert_eq!(layout.polylines.len(), 2);

    let first = &layout.polylines[0];
    assert_eq!(first.col, 0);
    assert!(close(first.points[0].x, 80.0));
    assert!(close(first.points[1].x, 40.0));
    assert!(close(first.points[0].y, 43.5));
    assert_eq!(layout.marks.len(), 4);
}

#[test]
fn test_empty_report() {
    let layout = run_stage4(&Report::default(), ViewMode::Numbers, style());
    assert!(layout.columns.is_empty());
    assert!(layout.rows.is_empty());
    assert!(close(layout.width, 12.0));
    assert!(close(layout.height, 12.0));
    assert!(layout.separators.is_empty());
}

#[test]
fn test_layout_serializes_tagged_marks() {
    let layout = run_stage4(&report(), ViewMode::Points, ChartStyle::default_v1());
    let json = serde_json::to_value(&layout).unwrap();
    assert_eq!(json["view"], "points");
    assert_eq!(json["marks"][0]["mark"], "circle");
    assert_eq!(json["style"]["font_size"], 12.0);
}
