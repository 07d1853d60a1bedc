//! Reading raw knowledge records from JSON / YAML files or directories.

use std::path::{Path, PathBuf};

use serde_json::Value;
use walkdir::WalkDir;

use crate::error::{GraphRagError, Result};

/// Discover knowledge files (`.json`, `.yaml`, `.yml`) below `root`.
///
/// Walks recursively and returns paths sorted by file name within each
/// directory, so ingestion order is stable across runs.
pub fn discover_knowledge_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if is_knowledge_file(path) {
            files.push(path.to_path_buf());
        }
    }

    log::info!("Discovered {} knowledge files in {}", files.len(), root.display());
    Ok(files)
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn is_knowledge_file(path: &Path) -> bool {
    matches!(extension_of(path).as_str(), "json" | "yaml" | "yml")
}

/// Load raw records from a single file or from every knowledge file in a directory.
pub fn load_records(path: &Path) -> Result<Vec<Value>> {
    if path.is_dir() {
        let mut records = Vec::new();
        for file in discover_knowledge_files(path)? {
            records.extend(load_file(&file)?);
        }
        return Ok(records);
    }
    if path.is_file() {
        return load_file(path);
    }
    Err(GraphRagError::Config(format!(
        "Knowledge path does not exist: {}",
        path.display()
    )))
}

fn load_file(path: &Path) -> Result<Vec<Value>> {
    let content = std::fs::read_to_string(path)?;
    let records = parse_records(&content, &extension_of(path), &path.display().to_string())?;
    log::debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Parse file content into raw records.
///
/// The document must be a list of records or a single record object. Records
/// are left undecoded so that one bad record does not reject the whole file.
pub fn parse_records(content: &str, extension: &str, path: &str) -> Result<Vec<Value>> {
    let value: Value = match extension {
        "json" => serde_json::from_str(content)
            .map_err(|e| GraphRagError::Parse(format!("JSON parse error in {}: {}", path, e)))?,
        "yaml" | "yml" => serde_yaml_ng::from_str(content)
            .map_err(|e| GraphRagError::Parse(format!("YAML parse error in {}: {}", path, e)))?,
        other => {
            return Err(GraphRagError::Parse(format!(
                "Unsupported knowledge file type '{}': {}",
                other, path
            )))
        }
    };

    match value {
        Value::Array(items) => Ok(items),
        Value::Object(_) => Ok(vec![value]),
        Value::Null => Ok(Vec::new()),
        _ => Err(GraphRagError::Parse(format!(
            "Expected a list of records in {}",
            path
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_json_list() {
        let content = r#"[{"entity": "A"}, {"entity": "B", "type": "gene"}]"#;
        let records = parse_records(content, "json", "kb.json").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["type"], "gene");
    }

    #[test]
    fn test_parse_single_object() {
        let records = parse_records(r#"{"entity": "A"}"#, "json", "kb.json").unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_parse_yaml() {
        let content = r#"
- entity: HER2
  type: protein
  related_to:
    - entity: ERBB2
      type: encoded_by
"#;
        let records = parse_records(content, "yaml", "kb.yaml").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["related_to"][0]["type"], "encoded_by");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_records("[", "json", "bad.json"),
            Err(GraphRagError::Parse(_))
        ));
        assert!(matches!(
            parse_records("42", "json", "num.json"),
            Err(GraphRagError::Parse(_))
        ));
        assert!(matches!(
            parse_records("entity,type", "csv", "kb.csv"),
            Err(GraphRagError::Parse(_))
        ));
    }

    #[test]
    fn test_load_directory_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("nested")).unwrap();
        fs::write(root.join("b.json"), r#"[{"entity": "B"}]"#).unwrap();
        fs::write(root.join("a.yaml"), "- entity: A\n").unwrap();
        fs::write(root.join("nested/c.yml"), "entity: C\n").unwrap();
        fs::write(root.join("notes.md"), "# not knowledge").unwrap();

        let files = discover_knowledge_files(root).unwrap();
        assert_eq!(files.len(), 3);

        let records = load_records(root).unwrap();
        let ids: Vec<_> = records.iter().map(|r| r["entity"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_load_missing_path() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_records(&temp_dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, GraphRagError::Config(_)));
    }
}
