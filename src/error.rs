use genomap::GenomeMapError;
use std::io;
use thiserror::Error;

use crate::file::FileError;

#[derive(Error, Debug)]
pub enum ContigMapError {
    #[error("IO error: {0}")]
    IOError(#[from] io::Error),
    #[error("File reading eror: {0}")]
    FileError(#[from] FileError),
    #[error("Marker info parsing error: {0}")]
    MarkerInfoParsingError(#[from] csv::Error),
    #[error("GenomeMap Error: error updating GenomeMap")]
    GenomeMapError(#[from] GenomeMapError),
    #[error("Could not build thread pool: {0}")]
    ThreadPoolError(#[from] rayon::ThreadPoolBuildError),
    #[error("The {0} token was lost by a worker")]
    TokenLost(&'static str),
}
