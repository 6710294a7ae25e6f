use std::fmt;
use thiserror::Error;

pub trait DataReader {
    fn read_data(&self) -> Result<Data, ReadError>;
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("GeoTIFF error: {0}")]
    GeoTiff(String),
    #[error("raster has {found} pixels, expected {expected} ({width}x{height})")]
    Size {
        width: u32,
        height: u32,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Error)]
pub enum FileError {
    #[error("unknown raster file type: {0}")]
    UnknownFileType(String),
}

/// Single-band raster in row-major order. NaN marks missing pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Data {
    pub width: u32,
    pub height: u32,
    pub buffer: Vec<f32>,
}

impl Data {
    pub fn new(width: u32, height: u32, buffer: Vec<f32>) -> Result<Self, ReadError> {
        let expected = width as usize * height as usize;
        if buffer.len() != expected {
            return Err(ReadError::Size {
                width,
                height,
                expected,
                found: buffer.len(),
            });
        }
        Ok(Self {
            width,
            height,
            buffer,
        })
    }

    pub fn pixel_count(&self) -> usize {
        self.buffer.len()
    }

    /// Value at pixel `index`, `None` when missing.
    pub fn value(&self, index: usize) -> Option<f32> {
        self.buffer.get(index).copied().filter(|v| !v.is_nan())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    GeoTiff,
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let valid = || self.buffer.iter().copied().filter(|x| !x.is_nan());
        let min_value = valid().fold(f32::NAN, f32::min);
        let max_value = valid().fold(f32::NAN, f32::max);

        write!(
            f,
            "Width: {}\nHeight: {}\nBuffer Length: {}\nMin value: {}\nMax value: {}",
            self.width,
            self.height,
            self.buffer.len(),
            min_value,
            max_value,
        )
    }
}
