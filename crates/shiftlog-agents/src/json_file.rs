use serde_json::Value;
use std::path::Path;

use crate::error::Result;

/// Load a JSON file, treating a missing file as an empty object — every
/// hook-configuration reader must tolerate absence.
pub fn load_json(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Ok(Value::Object(Default::default()));
    }
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    Ok(serde_json::from_str(&content)?)
}

/// Write a JSON file using a write-and-rename pattern so a crash never
/// leaves a half-written hook configuration on disk.
pub fn write_json_atomic(path: &Path, value: &Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("shiftlog-tmp");
    std::fs::write(&tmp_path, serde_json::to_string_pretty(value)?)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Coerce `value` into an object in place (replacing any non-object value)
/// and return a mutable reference to its map. Used when walking/building a
/// nested hook-config shape one key at a time.
pub fn ensure_object(value: &mut Value) -> &mut serde_json::Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Default::default());
    }
    value.as_object_mut().expect("just ensured object")
}

/// Coerce `value` into an array in place (replacing any non-array value)
/// and return a mutable reference to its vec.
pub fn ensure_array(value: &mut Value) -> &mut Vec<Value> {
    if !value.is_array() {
        *value = Value::Array(Vec::new());
    }
    value.as_array_mut().expect("just ensured array")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_missing_file_returns_empty_object() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nonexistent.json");
        assert_eq!(load_json(&path).unwrap(), Value::Object(Default::default()));
    }

    #[test]
    fn write_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/settings.json");
        let value = serde_json::json!({"a": 1});
        write_json_atomic(&path, &value).unwrap();
        assert_eq!(load_json(&path).unwrap(), value);
    }
}
