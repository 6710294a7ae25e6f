use super::{Data, DataReader, ReadError};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{TiffEncoder, colortype};

pub struct GeoTiffReader {
    pub file_name: String,
}

impl DataReader for GeoTiffReader {
    fn read_data(&self) -> Result<Data, ReadError> {
        let file = File::open(&self.file_name)
            .map_err(|e| ReadError::GeoTiff(format!("Failed to open file: {}", e)))?;

        let reader = BufReader::new(file);

        let mut decoder = Decoder::new(reader)
            .map_err(|e| ReadError::GeoTiff(format!("Failed to decode TIFF: {}", e)))?;

        let (width, height) = decoder
            .dimensions()
            .map_err(|e| ReadError::GeoTiff(format!("Failed to get dimensions: {}", e)))?;

        let image_data: Vec<f32> = match decoder
            .read_image()
            .map_err(|e| ReadError::GeoTiff(format!("Failed to read image: {}", e)))?
        {
            DecodingResult::U8(data) => data.iter().map(|&x| x as f32).collect(),
            DecodingResult::U16(data) => data.iter().map(|&x| x as f32).collect(),
            DecodingResult::U32(data) => data.iter().map(|&x| x as f32).collect(),
            DecodingResult::F32(data) => data,
            DecodingResult::F64(data) => data.iter().map(|&x| x as f32).collect(),
            _ => return Err(ReadError::GeoTiff("Unsupported pixel format".to_string())),
        };

        Data::new(width, height, image_data)
    }
}

/// Write a single-band 32-bit float TIFF.
pub fn write_geotiff<P: AsRef<Path>>(path: P, data: &Data) -> Result<(), ReadError> {
    let file = File::create(path.as_ref())
        .map_err(|e| ReadError::GeoTiff(format!("Failed to create file: {}", e)))?;

    let mut encoder = TiffEncoder::new(BufWriter::new(file))
        .map_err(|e| ReadError::GeoTiff(format!("Failed to create encoder: {}", e)))?;

    encoder
        .write_image::<colortype::Gray32Float>(data.width, data.height, &data.buffer)
        .map_err(|e| ReadError::GeoTiff(format!("Failed to write image: {}", e)))?;

    Ok(())
}
