pub mod upload;

pub use upload::{DatasetUpload, UploadDatasetsCommand, UploadDatasetsError};
