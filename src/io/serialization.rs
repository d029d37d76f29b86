// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Metadata document and configuration serialization.
//!
//! The annotation metadata document is a single JSON mapping from image id
//! to record. Configuration is stored as YAML.

use crate::config::AppConfig;
use crate::error::AnnotationError;
use crate::models::record::AnnotationRecord;
use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;

/// All records of a metadata document, keyed by image id.
pub type MetadataDocument = BTreeMap<String, AnnotationRecord>;

/// Read the metadata document. A missing file is an empty document.
pub fn read_metadata(path: &Path) -> Result<MetadataDocument, AnnotationError> {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => return Err(AnnotationError::persistence("reading metadata", e)),
    };

    let mut document: MetadataDocument = serde_json::from_str(&json)
        .map_err(|e| AnnotationError::persistence("parsing metadata", e))?;
    for (key, record) in document.iter_mut() {
        record.image_id = key.clone();
    }
    Ok(document)
}

/// Rewrite the whole metadata document.
pub fn write_metadata(path: &Path, document: &MetadataDocument) -> Result<(), AnnotationError> {
    let json = serde_json::to_string_pretty(document)
        .map_err(|e| AnnotationError::persistence("encoding metadata", e))?;
    std::fs::write(path, json).map_err(|e| AnnotationError::persistence("writing metadata", e))
}

/// Export configuration to YAML format.
pub fn export_config_yaml(config: &AppConfig, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

/// Import configuration from YAML format.
pub fn import_config_yaml(path: &Path) -> Result<AppConfig> {
    let yaml = std::fs::read_to_string(path)?;
    let config = serde_yaml::from_str(&yaml)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::Roi;
    use tempfile::tempdir;

    #[test]
    fn test_missing_document_is_empty() {
        let dir = tempdir().unwrap();
        let document = read_metadata(&dir.path().join("annotations.json")).unwrap();
        assert!(document.is_empty());
    }

    #[test]
    fn test_document_roundtrip_restores_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("annotations.json");
        let record = AnnotationRecord::new(
            "clip",
            9,
            &Roi::new(1, 2, 30, 40),
            "note",
            &[],
            "2025-06-01T12:00:00+00:00".to_string(),
        );

        let mut document = MetadataDocument::new();
        document.insert(record.image_id.clone(), record.clone());
        write_metadata(&path, &document).unwrap();

        let loaded = read_metadata(&path).unwrap();
        assert_eq!(loaded.get("clip_frame_9"), Some(&record));
    }

    #[test]
    fn test_corrupt_document_is_persistence_failure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("annotations.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            read_metadata(&path),
            Err(AnnotationError::PersistenceFailure { .. })
        ));
    }

    #[test]
    fn test_config_yaml_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let mut config = AppConfig::default();
        config.output_dir = "exports".into();
        export_config_yaml(&config, &path).unwrap();
        assert_eq!(import_config_yaml(&path).unwrap(), config);
    }
}
