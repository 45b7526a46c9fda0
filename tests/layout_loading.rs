// tests/layout_loading.rs
use cone_layout::{Layout, LayoutError, LayoutOptions, ShapeError, UnknownFields};
use glam::DVec2;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const SAMPLE: &str = r#"{
    "x": [0, 1],
    "y": [0, 2],
    "color": [1, 2],
    "start_position": [0, 0],
    "start_orientation": 0,
    "timing_line_position": [5, 5],
    "timing_line_orientation": 0,
    "timing_line_width": 1.5
}"#;

fn write_layout(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_load_sample_layout() {
    let dir = TempDir::new().unwrap();
    let path = write_layout(&dir, "sample.json", SAMPLE);

    let layout = Layout::load_from_file(&path).unwrap();

    assert_eq!(layout.x(), &[0.0, 1.0]);
    assert_eq!(layout.y(), &[0.0, 2.0]);
    assert_eq!(layout.color(), &[1, 2]);
    assert_eq!(layout.start_position(), DVec2::ZERO);
    assert_eq!(layout.timing_line_position(), DVec2::new(5.0, 5.0));
    assert_eq!(layout.timing_line_width(), 1.5);

    // [[0,0],[1,2]]
    let positions = layout.cone_positions();
    assert_eq!(positions.shape(), &[2, 2]);
    assert_eq!(positions.row(0), Some(&[0.0, 0.0][..]));
    assert_eq!(positions.row(1), Some(&[1.0, 2.0][..]));

    // [[0,0,1],[1,2,2]]
    let colored = layout.cones_with_color();
    assert_eq!(colored.shape(), &[2, 3]);
    assert_eq!(colored.row(0), Some(&[0.0, 0.0, 1.0][..]));
    assert_eq!(colored.row(1), Some(&[1.0, 2.0, 2.0][..]));
}

#[test]
fn test_cone_positions_pair_inputs_in_order() {
    let dir = TempDir::new().unwrap();
    let contents = r#"{
        "x": [3.5, -1.25, 8, 0.1],
        "y": [2, 4.75, -6, 0.2],
        "color": [0, 1, 2, 1],
        "start_position": [1.5, -2.5],
        "start_orientation": 1.5707963267948966,
        "timing_line_position": [0, 0],
        "timing_line_orientation": -0.5,
        "timing_line_width": 3
    }"#;
    let path = write_layout(&dir, "track.json", contents);
    let layout = Layout::load_from_file(&path).unwrap();

    assert_eq!(layout.start_orientation(), std::f64::consts::FRAC_PI_2);
    for (i, row) in layout.cone_positions().rows().enumerate() {
        assert_eq!(row, &[layout.x()[i], layout.y()[i]]);
    }
    for (i, row) in layout.cones_with_color().rows().enumerate() {
        assert_eq!(row, &[layout.x()[i], layout.y()[i], layout.color()[i] as f64]);
    }
    assert_eq!(layout.cone_positions().rows().count(), 4);

    // Same values on every access.
    let first = layout.cone_positions().clone();
    assert_eq!(&first, layout.cone_positions());
}

#[test]
fn test_missing_file_is_not_found() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("does-not-exist.json");

    let err = Layout::load_from_file(&path).unwrap_err();
    match &err {
        LayoutError::NotFound { path: reported, .. } => assert_eq!(reported, &path),
        other => panic!("expected NotFound, got {other:?}"),
    }
    assert!(err.shape_error().is_none());
}

#[test]
fn test_invalid_json_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write_layout(&dir, "broken.json", "{ \"x\": [0, 1], ");

    let err = Layout::load_from_file(&path).unwrap_err();
    assert!(matches!(err, LayoutError::Parse(_)), "{err}");
    assert!(err.shape_error().is_none());
}

#[test]
fn test_rank_two_x_in_file_is_shape_error() {
    let dir = TempDir::new().unwrap();
    let contents = SAMPLE.replace("\"x\": [0, 1]", "\"x\": [[0, 1], [1, 2]]");
    let path = write_layout(&dir, "rank2.json", &contents);

    let err = Layout::load_from_file(&path).unwrap_err();
    assert_eq!(
        err.shape_error(),
        Some(&ShapeError::Rank {
            expected: 1,
            actual: 2
        })
    );
}

#[test]
fn test_unknown_keys_follow_policy() {
    let dir = TempDir::new().unwrap();
    let contents = SAMPLE.replacen('{', "{ \"name\": \"fsg19\",", 1);
    let path = write_layout(&dir, "named.json", &contents);

    assert!(Layout::load_from_file(&path).is_ok());

    let strict = LayoutOptions {
        unknown_fields: UnknownFields::Reject,
    };
    assert!(matches!(
        Layout::load_from_file_with(&path, &strict),
        Err(LayoutError::UnknownField { field }) if field == "name"
    ));
}

#[test]
fn test_written_layout_round_trips_through_file() {
    let dir = TempDir::new().unwrap();
    let original = Layout::from_json_str(SAMPLE).unwrap();
    let rendered = serde_json::to_string_pretty(&original.to_json_value().unwrap()).unwrap();
    let path = write_layout(&dir, "rendered.json", &rendered);

    assert_eq!(Layout::load_from_file(&path).unwrap(), original);
}
