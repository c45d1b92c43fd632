//! JSON persistence of massing configs and generated models.

use crate::bar::config::MassingConfig;
use crate::model::building::Building;
use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Reads a massing config from a JSON file.
///
/// Missing fields take their default values, so a file holding only
/// `{"total_floor_area": 2000.0}` is a valid config.
///
/// # Example
/// ```no_run
/// use massing3d::io::read_config;
/// use std::path::Path;
///
/// let config = read_config(Path::new("office.json")).unwrap();
/// println!("Building type: {}", config.building_type);
/// ```
pub fn read_config(path: &Path) -> Result<MassingConfig> {
    read_json(path, "config")
}

/// Writes a massing config to a JSON file.
pub fn write_config(path: &Path, config: &MassingConfig) -> Result<()> {
    write_json(path, config, "config")
}

/// Writes a generated building to a JSON file.
///
/// # Arguments
/// * `path` - Path to the output file
/// * `building` - The building to serialize
pub fn write_model(path: &Path, building: &Building) -> Result<()> {
    write_json(path, building, "building")
}

/// Reads a building from a JSON file written by `write_model`.
pub fn read_model(path: &Path) -> Result<Building> {
    read_json(path, "building")
}

pub fn model_to_string(building: &Building) -> Result<String> {
    serde_json::to_string_pretty(building).context("Failed to serialize building to string")
}

pub fn model_from_str(json: &str) -> Result<Building> {
    serde_json::from_str(json).context("Failed to deserialize building from string")
}

fn write_json<T: Serialize>(path: &Path, value: &T, what: &str) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, value)
        .with_context(|| format!("Failed to serialize {what} to: {}", path.display()))?;

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader)
        .with_context(|| format!("Failed to deserialize {what} from: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bar::catalog::StaticCatalog;
    use crate::bar::config::DivisionMethod;
    use crate::bar::create::create_bar_massing;
    use crate::geom::IsClose;
    use tempfile::tempdir;

    #[test]
    fn test_config_roundtrip() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.json");

        let original = MassingConfig::default()
            .with_building_type("MediumOffice")
            .with_stories(3., 1)
            .with_party_wall_stories(0, 2, 0, 0)
            .with_division_method(DivisionMethod::SingleSpaceType);
        write_config(&path, &original)?;
        let loaded = read_config(&path)?;

        assert_eq!(loaded, original);
        Ok(())
    }

    #[test]
    fn test_partial_config_uses_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{"building_type": "Warehouse", "num_stories_above_grade": 2.0}"#)?;

        let config = read_config(&path)?;
        assert_eq!(config.building_type, "Warehouse");
        assert!(config.num_stories_above_grade.is_close(2.));
        assert_eq!(config.division_method, MassingConfig::default().division_method);
        Ok(())
    }

    #[test]
    fn test_model_roundtrip() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("model.json");

        let config = MassingConfig::default().with_stories(3., 0).with_window_to_wall_ratio(0.3);
        let result = create_bar_massing(&config, &StaticCatalog::prototypes())?;
        write_model(&path, &result.building)?;
        let loaded = read_model(&path)?;

        assert_eq!(loaded.name, result.building.name);
        assert_eq!(loaded.volumes.len(), result.building.volumes.len());
        assert_eq!(loaded.surfaces().count(), result.building.surfaces().count());
        assert!(loaded.floor_area().is_close_within(result.building.floor_area(), 1e-9));
        loaded.validate()?;

        let text = model_to_string(&loaded)?;
        let again = model_from_str(&text)?;
        assert_eq!(again.hvac_zones(), loaded.hvac_zones());
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let err = read_model(Path::new("/nonexistent/model.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to open file"));
    }

    #[test]
    fn test_invalid_json() {
        assert!(model_from_str("{not json").is_err());
    }
}
