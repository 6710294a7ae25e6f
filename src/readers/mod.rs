pub mod geotiff;
pub mod types;
pub mod utils;

pub use geotiff::{GeoTiffReader, write_geotiff};
pub use types::{Data, DataReader, FileError, FileType, ReadError};
pub use utils::reader_from_filetype;

pub fn create_reader(file_name: String) -> Result<Box<dyn DataReader>, FileError> {
    match reader_from_filetype(file_name.as_ref()) {
        Ok(FileType::GeoTiff) => Ok(Box::new(GeoTiffReader { file_name })),
        Err(e) => Err(e),
    }
}
