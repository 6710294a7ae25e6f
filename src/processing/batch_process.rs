use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use thiserror::Error;

use crate::config::Config;
use crate::error::SaberError;
use crate::readers::{Data, FileError, ReadError, create_reader, write_geotiff};

use super::ReflectanceModel;
use super::pixel::PixelData;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("no raster_files configured")]
    NoRasters,
    #[error("raster '{name}' is {found:?}, expected {expected:?}")]
    DimensionMismatch {
        name: String,
        expected: (u32, u32),
        found: (u32, u32),
    },
    #[error(transparent)]
    Model(#[from] SaberError),
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    File(#[from] FileError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One reflectance raster per target wavelength.
#[derive(Debug)]
pub struct BatchOutput {
    pub wavelengths: Vec<f64>,
    pub bands: Vec<Data>,
    pub skipped: usize,
    pub cache_rebuilds: u64,
}

impl BatchOutput {
    /// Write each band as `rrs_<wavelength>.tif` into `dir`.
    pub fn write<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>, BatchError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let mut written = Vec::with_capacity(self.bands.len());
        for (wl, band) in self.wavelengths.iter().zip(&self.bands) {
            let path = dir.join(format!("rrs_{wl}.tif"));
            write_geotiff(&path, band)?;
            debug!("wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

#[derive(Debug)]
pub struct BatchProcessor {
    rasters: HashMap<String, String>,
    config: Config,
}

impl BatchProcessor {
    pub fn new(config: Config) -> Self {
        let mut rasters = HashMap::new();

        if let Some(raster_files) = config.raster_files() {
            for raster_file in raster_files {
                rasters.insert(raster_file.name.clone(), raster_file.path.clone());
            }
        }

        BatchProcessor { rasters, config }
    }

    fn read_rasters(&self) -> Result<(HashMap<String, Data>, (u32, u32)), BatchError> {
        let mut datasets = HashMap::new();
        let mut dimensions = None;

        for (name, path) in &self.rasters {
            let data = create_reader(path.clone())?.read_data()?;
            info!("read '{}' from {} ({}x{})", name, path, data.width, data.height);

            let found = (data.width, data.height);
            match dimensions {
                None => dimensions = Some(found),
                Some(expected) if expected != found => {
                    return Err(BatchError::DimensionMismatch {
                        name: name.clone(),
                        expected,
                        found,
                    });
                }
                Some(_) => {}
            }
            datasets.insert(name.clone(), data);
        }

        let dimensions = dimensions.ok_or(BatchError::NoRasters)?;
        Ok((datasets, dimensions))
    }

    /// Run the forward model on every pixel of the configured rasters.
    ///
    /// Pixels with a missing raster value, or whose values the model rejects,
    /// are written as NaN.
    pub fn process(&self) -> Result<BatchOutput, BatchError> {
        let (datasets, (width, height)) = self.read_rasters()?;
        let mut model = ReflectanceModel::from_config(&self.config)?;

        let n_bands = model.wavelengths().len();
        let n_pixels = width as usize * height as usize;
        let mut buffers = vec![vec![f32::NAN; n_pixels]; n_bands];
        let mut skipped = 0;

        for y in 0..height {
            for x in 0..width {
                let idx = y as usize * width as usize + x as usize;
                let pixel = PixelData::from_rasters(
                    x,
                    y,
                    &datasets,
                    *self.config.constituents(),
                    self.config.depth(),
                )?;

                let Some(pixel) = pixel else {
                    skipped += 1;
                    continue;
                };

                match pixel.reflectance(&mut model) {
                    Ok(rrs) => {
                        for (buffer, value) in buffers.iter_mut().zip(rrs) {
                            buffer[idx] = value as f32;
                        }
                    }
                    Err(SaberError::InvalidArgument(reason)) => {
                        debug!("pixel ({x}, {y}) skipped: {reason}");
                        skipped += 1;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            if height >= 10 && (y + 1) % (height / 10) == 0 {
                info!("processed {}/{} rows", y + 1, height);
            }
        }

        info!(
            "processed {} pixels, {} skipped, cache rebuilt {} time(s)",
            n_pixels,
            skipped,
            model.cache().rebuild_count()
        );

        let bands = buffers
            .into_iter()
            .map(|buffer| Data::new(width, height, buffer))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BatchOutput {
            wavelengths: model.wavelengths().to_vec(),
            bands,
            skipped,
            cache_rebuilds: model.cache().rebuild_count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::SCENARIO;
    use crate::readers::DataReader;
    use crate::readers::GeoTiffReader;
    use tempfile::tempdir;

    fn config_with_rasters(rasters: serde_json::Value) -> Config {
        let mut json: serde_json::Value = serde_json::from_str(SCENARIO).unwrap();
        json["raster_files"] = rasters;
        serde_json::from_str(&json.to_string()).unwrap()
    }

    #[test]
    fn test_process_rasters() {
        let dir = tempdir().unwrap();
        let chl_path = dir.path().join("chl.tif");
        let depth_path = dir.path().join("depth.tif");
        write_geotiff(
            &chl_path,
            &Data::new(2, 2, vec![0.5, 1.0, f32::NAN, 4.0]).unwrap(),
        )
        .unwrap();
        write_geotiff(
            &depth_path,
            &Data::new(2, 2, vec![2.0, 5.0, 5.0, -1.0]).unwrap(),
        )
        .unwrap();

        let config = config_with_rasters(serde_json::json!([
            {"name": "chl", "path": chl_path.to_string_lossy()},
            {"name": "depth", "path": depth_path.to_string_lossy()},
        ]));

        let output = BatchProcessor::new(config).process().unwrap();

        assert_eq!(output.bands.len(), 3);
        assert_eq!(output.cache_rebuilds, 1);
        // NaN chlorophyll and negative depth
        assert_eq!(output.skipped, 2);
        for band in &output.bands {
            assert!(band.value(0).is_some_and(|v| v > 0.0));
            assert!(band.value(1).is_some_and(|v| v > 0.0));
            assert!(band.value(2).is_none());
            assert!(band.value(3).is_none());
        }

        let out_dir = dir.path().join("out");
        let written = output.write(&out_dir).unwrap();
        assert_eq!(written.len(), 3);
        assert!(written[0].ends_with("rrs_443.tif"));

        let read = GeoTiffReader {
            file_name: written[1].to_string_lossy().into_owned(),
        }
        .read_data()
        .unwrap();
        assert_eq!((read.width, read.height), (2, 2));
        assert_eq!(read.value(1), output.bands[1].value(1));
        assert!(read.value(2).is_none());
    }

    #[test]
    fn test_dimension_mismatch() {
        let dir = tempdir().unwrap();
        let chl_path = dir.path().join("chl.tif");
        let depth_path = dir.path().join("depth.tif");
        write_geotiff(&chl_path, &Data::new(2, 2, vec![1.0; 4]).unwrap()).unwrap();
        write_geotiff(&depth_path, &Data::new(3, 1, vec![1.0; 3]).unwrap()).unwrap();

        let config = config_with_rasters(serde_json::json!([
            {"name": "chl", "path": chl_path.to_string_lossy()},
            {"name": "depth", "path": depth_path.to_string_lossy()},
        ]));

        assert!(matches!(
            BatchProcessor::new(config).process(),
            Err(BatchError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_no_rasters() {
        let config: Config = serde_json::from_str(SCENARIO).unwrap();
        assert!(matches!(
            BatchProcessor::new(config).process(),
            Err(BatchError::NoRasters)
        ));
    }
}
