use serde::Deserialize;
use serde::Deserializer;
use serde::de::Error;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::cache::SpectralCache;
use crate::error::Result as SaberResult;
use crate::iop::Oac;
use crate::model::{Geometry, WaterType};
use crate::tables::MemoryLimit;

pub mod error;
pub use error::ConfigError;

/// Raster names accepted besides the constituent names.
pub const DEPTH_RASTER: &str = "depth";

const CONSTITUENT_NAMES: [&str; 8] = [
    "chl",
    "a_g_440",
    "a_nap_440",
    "bb_p_550",
    "a_g_s_g",
    "a_g_s_d",
    "a_nap_s_d",
    "bb_p_gamma",
];

#[derive(Debug, Deserialize, Clone)]
pub struct RasterFile {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct WaterAbsorptionTable {
    pub wavelengths: Vec<f64>,
    pub values: Vec<f64>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SlopeCoefficientsTable {
    pub wavelengths: Vec<f64>,
    pub a0: Vec<f64>,
    pub a1: Vec<f64>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BottomClass {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BottomReflectanceTable {
    pub wavelengths: Vec<f64>,
    pub classes: Vec<BottomClass>,
}

impl BottomReflectanceTable {
    /// Class-major matrix as expected by the table store.
    pub fn matrix(&self) -> Vec<f64> {
        self.classes
            .iter()
            .flat_map(|class| class.values.iter().copied())
            .collect()
    }

    pub fn class_names(&self) -> Vec<&str> {
        self.classes.iter().map(|class| class.name.as_str()).collect()
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Tables {
    pub water_absorption: WaterAbsorptionTable,
    pub slope_coefficients: SlopeCoefficientsTable,
    pub bottom_reflectance: BottomReflectanceTable,
}

/// A forward-model scenario: master tables, target grid, constituents,
/// geometry and optionally a shallow bottom and per-pixel rasters.
#[derive(Debug, Clone)]
pub struct Config {
    wavelengths: Vec<f64>,
    tables: Tables,
    constituents: Oac,
    water_type: WaterType,
    geometry: Geometry,
    depth: Option<f64>,
    bottom_fractions: Vec<(String, f64)>,
    max_table_bytes: Option<usize>,
    raster_files: Option<Vec<RasterFile>>,
}

// Deserializes through a helper struct so the grid, the table shapes, the
// depth and the raster names are validated before a Config exists.
impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ConfigHelper {
            wavelengths: Vec<f64>,
            tables: Tables,
            #[serde(default)]
            constituents: Oac,
            water_type: WaterType,
            geometry: Geometry,
            depth: Option<f64>,
            #[serde(default)]
            bottom_fractions: BTreeMap<String, f64>,
            max_table_bytes: Option<usize>,
            raster_files: Option<Vec<RasterFile>>,
        }

        let helper = ConfigHelper::deserialize(deserializer)?;

        validate_grid(&helper.wavelengths).map_err(D::Error::custom)?;
        validate_tables(&helper.tables).map_err(D::Error::custom)?;

        if let Some(depth) = helper.depth {
            if depth.is_nan() || depth < 0.0 {
                return Err(D::Error::custom(ConfigError::NegativeDepth(depth)));
            }
            if helper.bottom_fractions.is_empty() {
                return Err(D::Error::custom(ConfigError::MissingBottom));
            }
        }

        if let Some(rasters) = &helper.raster_files {
            let has_depth = rasters.iter().any(|raster| raster.name == DEPTH_RASTER);
            if has_depth && helper.bottom_fractions.is_empty() {
                return Err(D::Error::custom(ConfigError::MissingBottom));
            }
            for raster in rasters {
                let known = raster.name == DEPTH_RASTER
                    || CONSTITUENT_NAMES.contains(&raster.name.as_str());
                if !known {
                    return Err(D::Error::custom(ConfigError::UnknownRaster(
                        raster.name.clone(),
                    )));
                }
            }
        }

        Ok(Config {
            wavelengths: helper.wavelengths,
            tables: helper.tables,
            constituents: helper.constituents,
            water_type: helper.water_type,
            geometry: helper.geometry,
            depth: helper.depth,
            bottom_fractions: helper.bottom_fractions.into_iter().collect(),
            max_table_bytes: helper.max_table_bytes,
            raster_files: helper.raster_files,
        })
    }
}

fn validate_grid(wavelengths: &[f64]) -> Result<(), ConfigError> {
    if wavelengths.is_empty() {
        return Err(ConfigError::EmptyGrid);
    }
    if let Some(idx) = wavelengths.iter().position(|wl| !wl.is_finite()) {
        return Err(ConfigError::UnsortedGrid(idx));
    }
    if let Some(idx) = wavelengths.windows(2).position(|pair| pair[0] >= pair[1]) {
        return Err(ConfigError::UnsortedGrid(idx + 1));
    }
    Ok(())
}

fn shape_error(table: &str, reason: String) -> ConfigError {
    ConfigError::TableShape {
        table: table.to_string(),
        reason,
    }
}

fn validate_tables(tables: &Tables) -> Result<(), ConfigError> {
    let water = &tables.water_absorption;
    if water.values.len() != water.wavelengths.len() {
        return Err(shape_error(
            "water_absorption",
            format!(
                "{} values for {} wavelengths",
                water.values.len(),
                water.wavelengths.len()
            ),
        ));
    }

    let slopes = &tables.slope_coefficients;
    if slopes.a0.len() != slopes.wavelengths.len() || slopes.a1.len() != slopes.wavelengths.len() {
        return Err(shape_error(
            "slope_coefficients",
            format!(
                "a0/a1 have {}/{} values for {} wavelengths",
                slopes.a0.len(),
                slopes.a1.len(),
                slopes.wavelengths.len()
            ),
        ));
    }

    let bottom = &tables.bottom_reflectance;
    for class in &bottom.classes {
        if class.values.len() != bottom.wavelengths.len() {
            return Err(shape_error(
                "bottom_reflectance",
                format!(
                    "class '{}' has {} values for {} wavelengths",
                    class.name,
                    class.values.len(),
                    bottom.wavelengths.len()
                ),
            ));
        }
    }

    Ok(())
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let config: Config = serde_json::from_reader(reader).map_err(ConfigError::from)?;

        Ok(config)
    }

    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub fn constituents(&self) -> &Oac {
        &self.constituents
    }

    pub fn water_type(&self) -> WaterType {
        self.water_type
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Bottom depth in metres, `None` for optically deep water.
    pub fn depth(&self) -> Option<f64> {
        self.depth
    }

    pub fn bottom_fractions(&self) -> &[(String, f64)] {
        &self.bottom_fractions
    }

    pub fn memory_limit(&self) -> MemoryLimit {
        self.max_table_bytes
            .map_or(MemoryLimit::unlimited(), MemoryLimit::bytes)
    }

    pub fn raster_files(&self) -> Option<&Vec<RasterFile>> {
        self.raster_files.as_ref()
    }

    /// A spectral cache with every master table of this scenario loaded.
    pub fn load_cache(&self) -> SaberResult<SpectralCache> {
        let mut cache = SpectralCache::with_limit(self.memory_limit());

        let water = &self.tables.water_absorption;
        cache.load_water_absorption(&water.wavelengths, &water.values)?;

        let slopes = &self.tables.slope_coefficients;
        cache.load_slope_coefficients(&slopes.wavelengths, &slopes.a0, &slopes.a1)?;

        let bottom = &self.tables.bottom_reflectance;
        cache.load_bottom_reflectance(&bottom.wavelengths, &bottom.class_names(), &bottom.matrix())?;

        Ok(cache)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    pub(crate) const SCENARIO: &str = r#"
    {
        "wavelengths": [443.0, 490.0, 555.0],
        "tables": {
            "water_absorption": {
                "wavelengths": [443.0, 490.0, 555.0],
                "values": [0.01, 0.02, 0.03]
            },
            "slope_coefficients": {
                "wavelengths": [443.0, 490.0, 555.0],
                "a0": [0.06, 0.05, 0.04],
                "a1": [0.01, 0.01, 0.01]
            },
            "bottom_reflectance": {
                "wavelengths": [443.0, 490.0, 555.0],
                "classes": [
                    {"name": "sand", "values": [0.01, 0.02, 0.03]},
                    {"name": "algae", "values": [0.03, 0.04, 0.05]}
                ]
            }
        },
        "constituents": {"chl": 1.0, "a_g_440": 0.1, "bb_p_550": 0.01},
        "water_type": 2,
        "geometry": {"theta_sun": 20.0, "theta_view": 0.0},
        "depth": 5.0,
        "bottom_fractions": {"sand": 0.7, "algae": 0.3}
    }
    "#;

    fn with_field(field: &str, value: &str) -> String {
        let mut json: serde_json::Value = serde_json::from_str(SCENARIO).unwrap();
        json[field] = serde_json::from_str(value).unwrap();
        json.to_string()
    }

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("scenario.json");
        let mut file = File::create(&file_path).unwrap();
        file.write_all(SCENARIO.as_bytes()).unwrap();

        let config = Config::from_file(file_path).unwrap();

        assert_eq!(config.wavelengths(), &[443.0, 490.0, 555.0]);
        assert_eq!(config.water_type(), WaterType::Type2);
        assert_eq!(config.depth(), Some(5.0));
        assert_eq!(config.constituents().chl, Some(1.0));
        assert_eq!(
            config.bottom_fractions(),
            &[("algae".to_string(), 0.3), ("sand".to_string(), 0.7)]
        );
        assert_eq!(config.memory_limit(), MemoryLimit::unlimited());
        assert!(config.raster_files().is_none());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            Config::from_file(dir.path().join("absent.json")),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_load_cache() {
        let config: Config = serde_json::from_str(SCENARIO).unwrap();
        let mut cache = config.load_cache().unwrap();
        cache.ensure_cache(config.wavelengths()).unwrap();

        assert_eq!(cache.class_names(), &["sand", "algae"]);
        assert_eq!(cache.bottom_reflectance_column(1).unwrap(), &[0.03, 0.04, 0.05]);
    }

    #[test]
    fn test_rejects_unsorted_grid() {
        let json = with_field("wavelengths", "[443.0, 555.0, 490.0]");
        let err = serde_json::from_str::<Config>(&json).unwrap_err();
        assert!(err.to_string().contains("strictly ascending"));

        let json = with_field("wavelengths", "[]");
        assert!(serde_json::from_str::<Config>(&json).is_err());
    }

    #[test]
    fn test_rejects_bad_depth_and_missing_bottom() {
        let json = with_field("depth", "-2.0");
        assert!(serde_json::from_str::<Config>(&json).is_err());

        let json = with_field("bottom_fractions", "{}");
        let err = serde_json::from_str::<Config>(&json).unwrap_err();
        assert!(err.to_string().contains("bottom_fractions"));
    }

    #[test]
    fn test_rejects_bad_water_type() {
        let json = with_field("water_type", "7");
        assert!(serde_json::from_str::<Config>(&json).is_err());
    }

    #[test]
    fn test_rejects_ragged_bottom_table() {
        let mut json: serde_json::Value = serde_json::from_str(SCENARIO).unwrap();
        json["tables"]["bottom_reflectance"]["classes"][0]["values"] =
            serde_json::json!([0.01, 0.02]);
        let err = serde_json::from_str::<Config>(&json.to_string()).unwrap_err();
        assert!(err.to_string().contains("sand"));
    }

    #[test]
    fn test_raster_names_are_checked() {
        let json = with_field(
            "raster_files",
            r#"[{"name": "chl", "path": "chl.tif"}, {"name": "depth", "path": "depth.tif"}]"#,
        );
        let config: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config.raster_files().unwrap().len(), 2);

        let json = with_field("raster_files", r#"[{"name": "sst", "path": "sst.tif"}]"#);
        assert!(serde_json::from_str::<Config>(&json).is_err());
    }

    #[test]
    fn test_depth_raster_requires_bottom() {
        let mut json: serde_json::Value = serde_json::from_str(SCENARIO).unwrap();
        json["depth"] = serde_json::Value::Null;
        json["bottom_fractions"] = serde_json::json!({});
        json["raster_files"] = serde_json::json!([{"name": "depth", "path": "depth.tif"}]);
        let err = serde_json::from_str::<Config>(&json.to_string()).unwrap_err();
        assert!(err.to_string().contains("bottom_fractions"));

        // Constituent rasters alone are fine for deep water
        json["raster_files"] = serde_json::json!([{"name": "chl", "path": "chl.tif"}]);
        let config: Config = serde_json::from_str(&json.to_string()).unwrap();
        assert!(config.bottom_fractions().is_empty());
    }

    #[test]
    fn test_memory_limit() {
        let json = with_field("max_table_bytes", "4096");
        let config: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config.memory_limit(), MemoryLimit::bytes(4096));
    }
}
