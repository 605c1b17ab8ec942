// SPDX-License-Identifier: MIT OR Apache-2.0
//! Subcommand implementations.
//!
//! Each command returns `Ok(true)` on success, `Ok(false)` when it ran but
//! found problems (diagnostics or unresolved poses), and `Err` when it
//! could not run at all.

use framekit_graph::Pose;
use framekit_model::{Diagnostics, Element, LoaderSettings, Model, PoseError};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Errors that stop a command
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Reading or writing a file failed
    #[error("{path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// A pose query failed
    #[error("Pose query failed: {0}")]
    Pose(#[from] PoseError),

    /// JSON encoding failed
    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// One entity's resolved pose
#[derive(Debug, Clone, Serialize)]
pub struct PoseRecord {
    /// `link`, `joint` or `light`
    pub kind: &'static str,
    /// Entity name
    pub name: String,
    /// Frame the pose is expressed in
    pub frame: String,
    /// Translation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<[f64; 3]>,
    /// Roll, pitch, yaw in radians
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpy: Option<[f64; 3]>,
    /// Why the pose could not be resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PoseRecord {
    fn new(kind: &'static str, name: String, frame: &str, result: Result<Pose, PoseError>) -> Self {
        let (position, rpy, error) = match result {
            Ok(pose) => (Some(pose.position), Some(pose.rpy()), None),
            Err(e) => (None, None, Some(e.to_string())),
        };
        Self {
            kind,
            name,
            frame: frame.to_string(),
            position,
            rpy,
            error,
        }
    }
}

/// Load settings from `path`, or the defaults
pub fn load_settings(path: Option<&Path>) -> Result<LoaderSettings, CliError> {
    match path {
        Some(path) => {
            let settings = LoaderSettings::load(path).map_err(|e| CliError::io(path, e))?;
            tracing::debug!("Loaded settings from {:?}", path);
            Ok(settings)
        }
        None => Ok(LoaderSettings::default()),
    }
}

/// Read a document and load it as a model
pub fn load_model(path: &Path, settings: &LoaderSettings) -> Result<(Model, Diagnostics), CliError> {
    let element = Element::load(path).map_err(|e| CliError::io(path, e))?;
    let mut model = Model::new();
    let diagnostics = model.load_with_settings(element.into_ptr(), settings);
    Ok((model, diagnostics))
}

/// `framekit check`
pub fn check(document: &Path, settings: &LoaderSettings) -> Result<bool, CliError> {
    let (model, diagnostics) = load_model(document, settings)?;

    if diagnostics.is_empty() {
        println!(
            "{}: model '{}' loaded cleanly ({} links, {} joints, {} lights)",
            document.display(),
            model.name(),
            model.link_count(),
            model.joint_count(),
            model.light_count()
        );
        return Ok(true);
    }

    for diagnostic in &diagnostics {
        println!("{}: {}", document.display(), diagnostic);
    }
    println!("{} diagnostic(s)", diagnostics.len());
    Ok(false)
}

/// Resolve every entity of `model` in `frame`
pub fn pose_records(model: &Model, frame: &str) -> Vec<PoseRecord> {
    let links = model
        .links()
        .iter()
        .map(|l| PoseRecord::new("link", l.name(), frame, l.pose_in_frame(frame)));
    let joints = model
        .joints()
        .iter()
        .map(|j| PoseRecord::new("joint", j.name(), frame, j.pose_in_frame(frame)));
    let lights = model
        .lights()
        .iter()
        .map(|l| PoseRecord::new("light", l.name(), frame, l.pose_in_frame(frame)));

    links.chain(joints).chain(lights).collect()
}

/// `framekit poses`
pub fn poses(
    document: &Path,
    frame: Option<&str>,
    json: bool,
    settings: &LoaderSettings,
) -> Result<bool, CliError> {
    let (model, diagnostics) = load_model(document, settings)?;
    for diagnostic in &diagnostics {
        tracing::warn!("{}", diagnostic);
    }

    let frame = frame.map_or_else(|| model.root_frame(), str::to_string);
    let records = pose_records(&model, &frame);

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        for record in &records {
            println!("{}", format_record(record));
        }
    }

    Ok(records.iter().all(|r| r.error.is_none()))
}

/// `framekit pose`
pub fn pose(
    document: &Path,
    source: &str,
    target: &str,
    json: bool,
    settings: &LoaderSettings,
) -> Result<bool, CliError> {
    let (model, diagnostics) = load_model(document, settings)?;
    for diagnostic in &diagnostics {
        tracing::warn!("{}", diagnostic);
    }

    let pose = model.pose_in_frame(source, target)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&pose)?);
    } else {
        println!("{source} in {target}: {}", format_pose(&pose));
    }
    Ok(true)
}

/// `framekit settings`
pub fn write_settings(output: &Path, settings: &LoaderSettings) -> Result<bool, CliError> {
    settings.save(output).map_err(|e| CliError::io(output, e))?;
    tracing::info!("Wrote settings to {:?}", output);
    Ok(true)
}

/// `x y z | roll pitch yaw`
pub fn format_pose(pose: &Pose) -> String {
    let [x, y, z] = pose.position;
    let [roll, pitch, yaw] = pose.rpy();
    format!("{x:.6} {y:.6} {z:.6} | {roll:.6} {pitch:.6} {yaw:.6}")
}

fn format_record(record: &PoseRecord) -> String {
    let head = format!("{:<6} {:<24}", record.kind, record.name);
    match (record.position, record.rpy, &record.error) {
        (Some([x, y, z]), Some([roll, pitch, yaw]), _) => {
            format!("{head} {x:.6} {y:.6} {z:.6} | {roll:.6} {pitch:.6} {yaw:.6}")
        }
        (_, _, Some(error)) => format!("{head} error: {error}"),
        _ => head,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framekit_model::Value;

    fn string(s: &str) -> Value {
        Value::String(s.to_string())
    }

    fn model() -> Model {
        let element = Element::new("model")
            .with_attribute("name", string("cart"))
            .with_child(
                Element::new("link")
                    .with_attribute("name", string("chassis"))
                    .with_child(
                        Element::new("pose")
                            .with_value(Value::Pose([1.0, 0.0, 0.0, 0.0, 0.0, 0.0])),
                    ),
            )
            .with_child(
                Element::new("joint")
                    .with_attribute("name", string("axle"))
                    .with_attribute("type", string("continuous"))
                    .with_child(Element::new("parent").with_value(string("chassis")))
                    .with_child(Element::new("child").with_value(string("wheel"))),
            );

        let mut model = Model::new();
        model.load(element.into_ptr());
        model
    }

    #[test]
    fn test_pose_records() {
        let model = model();
        let records = pose_records(&model, "__model__");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, "link");
        assert_eq!(records[0].name, "chassis");
        assert_eq!(records[0].position, Some([1.0, 0.0, 0.0]));
        assert_eq!(records[1].kind, "joint");
        assert!(records[1].error.is_none());
    }

    #[test]
    fn test_unknown_frame_is_recorded() {
        let model = model();
        let records = pose_records(&model, "garage");

        assert!(records.iter().all(|r| r.error.is_some()));
        assert!(records[0].error.as_deref().unwrap_or_default().contains("garage"));
    }

    #[test]
    fn test_record_json_skips_missing_fields() {
        let model = model();
        let records = pose_records(&model, "garage");
        let json = serde_json::to_value(&records[0]).unwrap();

        assert!(json.get("position").is_none());
        assert_eq!(json["name"], "chassis");
    }

    #[test]
    fn test_format_pose() {
        let pose = Pose::from_translation([1.0, 2.0, 3.0]);
        assert_eq!(
            format_pose(&pose),
            "1.000000 2.000000 3.000000 | 0.000000 0.000000 0.000000"
        );
    }

    #[test]
    fn test_missing_settings_file() {
        let path = Path::new("/nonexistent/framekit/settings.ron");
        assert!(matches!(
            load_settings(Some(path)),
            Err(CliError::Io { .. })
        ));
        assert_eq!(load_settings(None).unwrap(), LoaderSettings::default());
    }
}
