//! Subcommand implementations. Each returns its output as a string so the
//! binary only has to print it.

use knotboard_core::{
    ConfigError, Document, Editor, EditorConfig, LinkId, LoadReport, MarkerParams, NodeId,
    SceneError, link_inset,
};
use kurbo::Size;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

/// Visible area assumed for headless runs.
const HEADLESS_VIEWPORT: (f64, f64) = (1920.0, 1080.0);

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Document has {0} dangling link(s)")]
    Invalid(usize),
}

pub fn load_document(path: &Path) -> Result<LoadReport, CliError> {
    let json = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let report = Document::from_json(&json)?.load()?;
    log::info!("Read {}", path.display());
    Ok(report)
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, CliError> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}

/// Run the layout to settlement and render the final frame.
pub fn layout(
    document: &Path,
    config: Option<&Path>,
    max_ticks: usize,
    pretty: bool,
) -> Result<String, CliError> {
    let config = match config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };
    let report = load_document(document)?;
    for (link, node) in &report.skipped_links {
        log::warn!("Dropped link {link}: node {node} does not exist");
    }

    let mut editor = Editor::new(config, Size::from(HEADLESS_VIEWPORT))?;
    editor.set_scene(report.scene);
    let steps = editor.run_until_settled(max_ticks);
    if editor.layout().is_active() {
        log::warn!("Layout still running after {steps} tick(s)");
    } else {
        log::info!("Layout settled after {steps} tick(s)");
    }
    to_json(&editor.frame(), pretty)
}

#[derive(Debug, Serialize)]
pub struct Validation {
    pub nodes: usize,
    pub links: usize,
    pub dangling: Vec<DanglingLink>,
}

#[derive(Debug, Serialize)]
pub struct DanglingLink {
    pub link: LinkId,
    pub missing: NodeId,
}

/// Check a document's referential integrity.
///
/// Returns the printable report alongside its data.
pub fn validate(document: &Path) -> Result<(String, Validation), CliError> {
    let report = load_document(document)?;
    let validation = Validation {
        nodes: report.scene.node_count(),
        links: report.scene.link_count(),
        dangling: report
            .skipped_links
            .into_iter()
            .map(|(link, missing)| DanglingLink { link, missing })
            .collect(),
    };
    let text = to_json(&validation, true)?;
    Ok((text, validation))
}

#[derive(Debug, Serialize)]
pub struct Anchor {
    pub link: LinkId,
    pub inset: f64,
}

/// Marker inset of every link, as loaded (no layout).
pub fn anchors(document: &Path) -> Result<String, CliError> {
    let scene = load_document(document)?.scene;
    let params = MarkerParams::default();
    let anchors = scene
        .links()
        .iter()
        .map(|link| {
            Ok(Anchor {
                link: link.id.clone(),
                inset: link_inset(&scene, link, params)?,
            })
        })
        .collect::<Result<Vec<_>, SceneError>>()?;
    to_json(&anchors, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DOC: &str = r#"{
        "nodes": [
            {"id": "A", "type": "rect", "width": 40, "height": 30, "x": 100, "y": 85},
            {"id": "B", "type": "circle", "r": 20, "cx": 300, "cy": 100},
            {"id": "C", "type": "triangle", "r": 20, "cx": 200, "cy": 300}
        ],
        "lines": [
            {"id": "L1", "sourceId": "A", "targetId": "B"},
            {"id": "L2", "sourceId": "B", "targetId": "A"}
        ]
    }"#;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_layout_outputs_frame() {
        let doc = write_temp(DOC);
        let out = layout(doc.path(), None, 1000, false).unwrap();
        let frame: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(frame["nodes"].as_array().unwrap().len(), 3);
        assert_eq!(frame["links"].as_array().unwrap().len(), 2);
        assert_eq!(frame["nodes"][2]["kind"], "triangle");
    }

    #[test]
    fn test_layout_with_config() {
        let doc = write_temp(DOC);
        let config = write_temp(r#"{"layout": {"tick_divider": 1}, "labels": {"circle_gap": 7}}"#);
        let out = layout(doc.path(), Some(config.path()), 3, true).unwrap();
        let frame: serde_json::Value = serde_json::from_str(&out).unwrap();
        let b = &frame["nodes"][1];
        let cy = b["center"]["y"].as_f64().unwrap();
        let label_y = b["label_anchor"]["y"].as_f64().unwrap();
        assert!((label_y - (cy + 20.0 + 7.0)).abs() < 1e-9);
    }

    #[test]
    fn test_bad_config_rejected() {
        let doc = write_temp(DOC);
        let config = write_temp(r#"{"grid": {"spacing": 0}}"#);
        let err = layout(doc.path(), Some(config.path()), 3, false).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn test_validate_reports_dangling() {
        let doc = write_temp(
            r#"{"nodes": [{"id": "A", "type": "circle", "r": 10, "cx": 50, "cy": 50}],
                "lines": [{"id": "L", "sourceId": "A", "targetId": "Z"}]}"#,
        );
        let (text, validation) = validate(doc.path()).unwrap();
        assert_eq!(validation.nodes, 1);
        assert_eq!(validation.links, 0);
        assert_eq!(validation.dangling.len(), 1);
        assert!(text.contains("\"missing\": \"Z\""));
    }

    #[test]
    fn test_anchors() {
        let doc = write_temp(DOC);
        let out = anchors(doc.path()).unwrap();
        let anchors: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(anchors[0]["link"], "L1");
        assert_eq!(anchors[0]["inset"], 25.0);
        // B sits level with A's center: half the width plus the gap.
        assert_eq!(anchors[1]["inset"], 25.0);
    }

    #[test]
    fn test_missing_file() {
        let err = load_document(Path::new("/nonexistent/knotboard.json")).unwrap_err();
        assert!(matches!(err, CliError::Io { .. }));
    }
}
