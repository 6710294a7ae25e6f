use std::collections::HashMap;

use crate::config::DEPTH_RASTER;
use crate::error::Result;
use crate::iop::Oac;
use crate::readers::Data;

use super::ReflectanceModel;

// Forward-model inputs for a single pixel
#[derive(Debug, Clone)]
pub struct PixelData {
    pub x: u32,
    pub y: u32,
    pub constituents: Oac,
    pub depth: Option<f64>, // Bottom depth in metres, None for deep water
}

impl PixelData {
    pub fn new(x: u32, y: u32, constituents: Oac, depth: Option<f64>) -> Self {
        Self {
            x,
            y,
            constituents,
            depth,
        }
    }

    /// Scenario defaults overridden by the raster values at `(x, y)`.
    ///
    /// Returns `None` when any raster is missing a value at this pixel.
    pub fn from_rasters(
        x: u32,
        y: u32,
        rasters: &HashMap<String, Data>,
        constituents: Oac,
        depth: Option<f64>,
    ) -> Result<Option<Self>> {
        let mut pixel = Self::new(x, y, constituents, depth);

        for (name, data) in rasters {
            let index = y as usize * data.width as usize + x as usize;
            let Some(value) = data.value(index) else {
                return Ok(None);
            };
            if name == DEPTH_RASTER {
                pixel.depth = Some(f64::from(value));
            } else {
                pixel.constituents.set(name, f64::from(value))?;
            }
        }

        Ok(Some(pixel))
    }

    pub fn reflectance(&self, model: &mut ReflectanceModel) -> Result<Vec<f64>> {
        let (_, rrs) = model.reflectance(&self.constituents, self.depth)?;
        Ok(rrs)
    }
}
