//! Integration tests for datapage CLI

use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

const SALES: &str = r#"{
    "columns": ["region", "units", "share"],
    "rows": [["north", 3.0, 0.25], ["south", 4.0, 0.75]]
}"#;

const FIELDS: &str = r#"[
    {"name": "region", "header": "Region"},
    {"name": "units", "format": {"type": "int"}},
    {"name": "share", "visible": false},
    {"name": "share_pct", "is_data": false, "header": "Share", "source": "share",
     "format": {"type": "percent", "precision": 0}, "attributes": {"class": "num"}}
]"#;

/// 1x1 transparent PNG
const PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f, 0x15, 0xc4,
    0x89, 0x00, 0x00, 0x00, 0x0a, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0d, 0x0a, 0x2d, 0xb4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4e, 0x44, 0xae,
    0x42, 0x60, 0x82,
];

fn run_datapage(args: &[&str]) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_datapage"))
        .args(args)
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();

    (stdout, stderr, success)
}

/// Temp dir holding `sales.json` and `fields.json`
fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("sales.json"), SALES).unwrap();
    fs::write(dir.path().join("fields.json"), FIELDS).unwrap();
    dir
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_cli_help() {
    let (stdout, _, success) = run_datapage(&["--help"]);

    assert!(success);
    assert!(stdout.contains("datapage"));
    assert!(stdout.contains("render"));
    assert!(stdout.contains("inspect"));
    assert!(stdout.contains("--verbose"));
}

#[test]
fn test_render_help() {
    let (stdout, _, success) = run_datapage(&["render", "--help"]);

    assert!(success);
    assert!(stdout.contains("--fields"));
    assert!(stdout.contains("--overwrite"));
    assert!(stdout.contains("--no-int-convert"));
    assert!(stdout.contains("--resources"));
}

#[test]
fn test_cli_version() {
    let (stdout, _, success) = run_datapage(&["--version"]);

    assert!(success);
    assert!(stdout.contains("datapage"));
}

#[test]
fn test_render_raw_dataset() {
    let dir = workspace();
    let data = dir.path().join("sales.json");
    let (stdout, stderr, success) = run_datapage(&[
        "render",
        path_str(&data),
        "--dir",
        path_str(dir.path()),
        "--title",
        "Sales 2024",
        "--table-title",
        "By region",
    ]);

    assert!(success, "stderr: {}", stderr);
    assert!(stdout.contains("file://"));
    assert!(stdout.contains("Sales_2024.html"));

    let html = fs::read_to_string(dir.path().join("Sales_2024.html")).unwrap();
    assert!(html.contains("<title>Sales 2024</title>"));
    assert!(html.contains("<h1>Sales 2024</h1>"));
    assert!(html.contains("<h2>By region</h2>"));
    assert!(html.contains("<th>units</th>"));
    // Whole-number floats become integers
    assert!(html.contains("<td>3</td>"));
    assert!(html.contains("<td>0.250000</td>"));
}

#[test]
fn test_render_name_defaults_to_data_file() {
    let dir = workspace();
    let data = dir.path().join("sales.json");
    let (_, stderr, success) =
        run_datapage(&["render", path_str(&data), "--dir", path_str(dir.path())]);

    assert!(success, "stderr: {}", stderr);
    assert!(dir.path().join("sales.html").exists());
}

#[test]
fn test_render_raw_options() {
    let dir = workspace();
    let data = dir.path().join("sales.json");
    let (_, stderr, success) = run_datapage(&[
        "render",
        path_str(&data),
        "--dir",
        path_str(dir.path()),
        "--no-int-convert",
        "--scientific",
    ]);

    assert!(success, "stderr: {}", stderr);
    let html = fs::read_to_string(dir.path().join("sales.html")).unwrap();
    assert!(html.contains("<td>3.0</td>"));
    assert!(html.contains("<td>0.25</td>"));
}

#[test]
fn test_render_refuses_overwrite() {
    let dir = workspace();
    let data = dir.path().join("sales.json");
    let args = ["render", path_str(&data), "--dir", path_str(dir.path())];

    let (_, _, success) = run_datapage(&args);
    assert!(success);

    let (_, stderr, success) = run_datapage(&args);
    assert!(!success);
    assert!(stderr.contains("Error:"));
    assert!(stderr.contains("file exists"));

    let mut overwrite = args.to_vec();
    overwrite.push("--overwrite");
    let (_, _, success) = run_datapage(&overwrite);
    assert!(success);
}

#[test]
fn test_render_with_fields() {
    let dir = workspace();
    let data = dir.path().join("sales.json");
    let fields = dir.path().join("fields.json");
    let (_, stderr, success) = run_datapage(&[
        "render",
        path_str(&data),
        "--fields",
        path_str(&fields),
        "--dir",
        path_str(dir.path()),
    ]);

    assert!(success, "stderr: {}", stderr);
    let html = fs::read_to_string(dir.path().join("sales.html")).unwrap();
    assert!(html.contains("<th>Region</th>"));
    assert!(html.contains("<th>Share</th>"));
    assert!(!html.contains("<th>share</th>"));
    assert!(html.contains(r#"<td class="num">25 %</td>"#));
    assert!(html.contains("<td>4</td>"));
}

#[test]
fn test_render_with_image_and_chart() {
    let dir = workspace();
    let data = dir.path().join("sales.json");
    let image = dir.path().join("trend.png");
    let chart = dir.path().join("share.json");
    fs::write(&image, PNG).unwrap();
    fs::write(
        &chart,
        r#"{"mark": "bar", "encoding": {"x": {"field": "region"}}}"#,
    )
    .unwrap();

    let (_, stderr, success) = run_datapage(&[
        "render",
        path_str(&data),
        "--dir",
        path_str(dir.path()),
        "--image",
        path_str(&image),
        "--chart",
        path_str(&chart),
    ]);

    assert!(success, "stderr: {}", stderr);
    let html = fs::read_to_string(dir.path().join("sales.html")).unwrap();
    assert!(html.contains("<h2>trend</h2>"));
    assert!(html.contains("data:image/png;base64,iVBORw0KGgo"));
    assert!(html.contains("cdn.jsdelivr.net/npm/vega-embed@6"));
    assert!(html.contains("<div id=\"datapage-chart-3\"></div>"));
    assert!(html.contains("vegaEmbed(\"#datapage-chart-3\""));

    // Table, image, chart in insertion order
    let table = html.find("<table").unwrap();
    let img = html.find("<img").unwrap();
    let placeholder = html.find("datapage-chart-3\"></div>").unwrap();
    assert!(table < img && img < placeholder);
}

#[test]
fn test_render_extras_follow_argument_order() {
    let dir = workspace();
    let data = dir.path().join("sales.json");
    let image = dir.path().join("trend.png");
    let chart = dir.path().join("share.json");
    fs::write(&image, PNG).unwrap();
    fs::write(&chart, r#"{"mark": "bar"}"#).unwrap();

    let (_, stderr, success) = run_datapage(&[
        "render",
        path_str(&data),
        "--dir",
        path_str(dir.path()),
        "--chart",
        path_str(&chart),
        "--image",
        path_str(&image),
    ]);

    assert!(success, "stderr: {}", stderr);
    let html = fs::read_to_string(dir.path().join("sales.html")).unwrap();
    let body = &html[html.find("<body>").unwrap()..];
    let placeholder = body.find("<div id=\"datapage-chart-2\"></div>").unwrap();
    let img = body.find("<img").unwrap();
    assert!(placeholder < img);
}

#[test]
fn test_render_unsupported_image() {
    let dir = workspace();
    let data = dir.path().join("sales.json");
    let image = dir.path().join("trend.bmp");
    fs::write(&image, b"BM").unwrap();

    let (_, stderr, success) = run_datapage(&[
        "render",
        path_str(&data),
        "--dir",
        path_str(dir.path()),
        "--image",
        path_str(&image),
    ]);

    assert!(!success);
    assert!(stderr.contains("unsupported image type"));
}

#[test]
fn test_inspect_table_dict() {
    let dir = workspace();
    let data = dir.path().join("sales.json");
    let fields = dir.path().join("fields.json");
    let (stdout, stderr, success) =
        run_datapage(&["inspect", path_str(&data), "--fields", path_str(&fields)]);

    assert!(success, "stderr: {}", stderr);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("Invalid JSON output");
    assert_eq!(parsed["head"], serde_json::json!(["Region", "units", "Share"]));
    assert_eq!(
        parsed["body"][1]["values"],
        serde_json::json!(["south", "4", "75 %"])
    );
    assert_eq!(parsed["body"][0]["attributes"][2]["class"], "num");
}

#[test]
fn test_inspect_without_fields() {
    let dir = workspace();
    let data = dir.path().join("sales.json");
    let (stdout, _, success) = run_datapage(&["inspect", path_str(&data)]);

    assert!(success);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("Invalid JSON output");
    assert_eq!(parsed["head"], serde_json::json!(["region", "units", "share"]));
    assert_eq!(parsed["body"][0]["values"][0], "north");
}

#[test]
fn test_inspect_pretty_data() {
    let dir = workspace();
    let data = dir.path().join("sales.json");
    let fields = dir.path().join("fields.json");
    let (stdout, _, success) = run_datapage(&[
        "inspect",
        path_str(&data),
        "--fields",
        path_str(&fields),
        "--pretty-data",
    ]);

    assert!(success);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("Invalid JSON output");
    assert_eq!(
        parsed["columns"],
        serde_json::json!(["Region", "units", "share"])
    );
    assert_eq!(parsed["rows"][0][0], "north");
}

#[test]
fn test_missing_data_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");
    let (_, stderr, success) = run_datapage(&["inspect", path_str(&missing)]);

    assert!(!success);
    assert!(stderr.contains("Error:"));
    assert!(stderr.contains("nope.json"));
}

#[test]
fn test_unknown_field_fails() {
    let dir = workspace();
    let data = dir.path().join("sales.json");
    let fields = dir.path().join("bad_fields.json");
    fs::write(&fields, r#"[{"name": "profit"}]"#).unwrap();

    let (_, stderr, success) =
        run_datapage(&["inspect", path_str(&data), "--fields", path_str(&fields)]);

    assert!(!success);
    assert!(stderr.contains("field 'profit' not found"));
}
