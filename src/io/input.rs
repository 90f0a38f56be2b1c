// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Input manifest parsing.
//!
//! The input JSON is either a plain list of image paths or a mapping of
//! image path to approximate panel locations (integer `[x, y]` pairs).
//! Validation happens here, before any window opens: a malformed manifest
//! aborts the run without launching a session.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::FlattenError;
use crate::models::geometry::Point;

/// One image to annotate, with any hint points supplied for it.
#[derive(Debug, Clone, PartialEq)]
pub struct InputEntry {
    pub path: PathBuf,
    pub hints: Vec<Point>,
}

/// The validated input manifest, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSpec {
    pub entries: Vec<InputEntry>,
}

impl InputSpec {
    /// Read and validate the manifest at `path`.
    pub fn from_file(path: &Path) -> Result<Self, FlattenError> {
        let text = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&text)?;
        Self::from_value(&value)
    }

    /// Validate a parsed JSON document.
    pub fn from_value(value: &Value) -> Result<Self, FlattenError> {
        match value {
            Value::Array(paths) => {
                let mut entries = Vec::with_capacity(paths.len());
                for item in paths {
                    let Some(path) = item.as_str() else {
                        return Err(FlattenError::JsonFormat(
                            "image list entries must be path strings".into(),
                        ));
                    };
                    entries.push(InputEntry {
                        path: PathBuf::from(path),
                        hints: Vec::new(),
                    });
                }
                Ok(Self { entries })
            }
            Value::Object(map) => {
                let mut entries = Vec::with_capacity(map.len());
                for (path, hints) in map {
                    entries.push(InputEntry {
                        path: PathBuf::from(path),
                        hints: parse_hints(path, hints)?,
                    });
                }
                Ok(Self { entries })
            }
            _ => Err(FlattenError::JsonFormat(
                "input json must be a list of paths or a path-to-hints mapping".into(),
            )),
        }
    }
}

/// Validate one hint list: every element an `[x, y]` pair of integers.
fn parse_hints(path: &str, value: &Value) -> Result<Vec<Point>, FlattenError> {
    let Some(list) = value.as_array() else {
        return Err(FlattenError::HintFormat(format!(
            "hints for {path:?} must be a list of [x, y] pairs"
        )));
    };

    let mut points = Vec::with_capacity(list.len());
    for pair in list {
        let coords = pair.as_array().ok_or_else(|| {
            FlattenError::HintFormat(format!("hint for {path:?} is not an [x, y] pair"))
        })?;
        if coords.len() != 2 {
            return Err(FlattenError::HintFormat(format!(
                "hint for {path:?} has {} coordinates, expected 2",
                coords.len()
            )));
        }
        let (Some(x), Some(y)) = (coords[0].as_i64(), coords[1].as_i64()) else {
            return Err(FlattenError::HintFormat(format!(
                "hint coordinates for {path:?} must be integers"
            )));
        };
        points.push(Point::new(x as f64, y as f64));
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_list() {
        let spec = InputSpec::from_value(&json!(["a.jpg", "b.jpg"])).unwrap();
        assert_eq!(spec.entries.len(), 2);
        assert_eq!(spec.entries[0].path, PathBuf::from("a.jpg"));
        assert!(spec.entries[0].hints.is_empty());
    }

    #[test]
    fn test_hint_mapping() {
        let spec =
            InputSpec::from_value(&json!({"a.jpg": [[10, 20], [30, 40]], "b.jpg": []})).unwrap();
        assert_eq!(spec.entries.len(), 2);
        assert_eq!(
            spec.entries[0].hints,
            vec![Point::new(10.0, 20.0), Point::new(30.0, 40.0)]
        );
        assert!(spec.entries[1].hints.is_empty());
    }

    #[test]
    fn test_preserves_file_order() {
        let spec = InputSpec::from_value(&json!({"z.jpg": [], "a.jpg": []})).unwrap();
        assert_eq!(spec.entries[0].path, PathBuf::from("z.jpg"));
        assert_eq!(spec.entries[1].path, PathBuf::from("a.jpg"));
    }

    #[test]
    fn test_rejects_scalar_document() {
        assert!(matches!(
            InputSpec::from_value(&json!(42)),
            Err(FlattenError::JsonFormat(_))
        ));
    }

    #[test]
    fn test_rejects_non_string_path() {
        assert!(matches!(
            InputSpec::from_value(&json!(["a.jpg", 7])),
            Err(FlattenError::JsonFormat(_))
        ));
    }

    #[test]
    fn test_rejects_non_list_hints() {
        assert!(matches!(
            InputSpec::from_value(&json!({"a.jpg": "nope"})),
            Err(FlattenError::HintFormat(_))
        ));
    }

    #[test]
    fn test_rejects_wrong_pair_length() {
        assert!(matches!(
            InputSpec::from_value(&json!({"a.jpg": [[1, 2, 3]]})),
            Err(FlattenError::HintFormat(_))
        ));
    }

    #[test]
    fn test_rejects_non_integer_coordinates() {
        assert!(matches!(
            InputSpec::from_value(&json!({"a.jpg": [[1.5, 2]]})),
            Err(FlattenError::HintFormat(_))
        ));
    }
}
