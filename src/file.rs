//! Encapsulates plaintext and gzip-compressed file input and output.
//!
//! The [`InputFile`] and [`OutputFile`] abstractions are for working with
//! possibly gzip-compressed genetic map, marker info and pseudomolecule files.
//! Readers and writers are `Send` so they can be handed to worker threads.
//!
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileError {
    #[error("IO error on '{0}': {1}")]
    IOError(String, #[source] io::Error),
}

/// Check if a file is a gzipped by looking for the magic numbers
fn is_gzipped_file(file_path: &str) -> io::Result<bool> {
    let file = File::open(file_path)?;
    let mut buffer = Vec::with_capacity(2);
    // files shorter than the magic number are plaintext
    file.take(2).read_to_end(&mut buffer)?;
    Ok(buffer == [0x1f, 0x8b])
}

/// Represents an input file.
///
/// This abstracts how data is read in, allowing for both plaintext and gzip-compressed input
/// to be read through a common interface.
pub struct InputFile {
    pub filepath: String,
}

impl InputFile {
    /// Constructs a new `InputFile`.
    ///
    /// # Arguments
    ///
    /// * `filepath` - A string slice that holds the path to the file. Gzip-compressed
    /// input is detected from the file's magic number and uncompressed on the fly.
    pub fn new(filepath: &str) -> Self {
        Self {
            filepath: filepath.to_string(),
        }
    }

    /// Opens the file and returns a buffered reader.
    ///
    /// # Returns
    ///
    /// A result containing a `BufReader<Box<dyn Read + Send>>` on success, or a `FileError`
    /// naming the file on failure.
    pub fn reader(&self) -> Result<BufReader<Box<dyn Read + Send>>, FileError> {
        let wrap = |e| FileError::IOError(self.filepath.clone(), e);
        let file = File::open(&self.filepath).map_err(wrap)?;
        let is_gzipped = is_gzipped_file(&self.filepath).map_err(wrap)?;
        let reader: Box<dyn Read + Send> = if is_gzipped {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(BufReader::new(reader))
    }
}

/// Represents an output file.
///
/// This abstracts writing both plaintext and gzip-compressed files.
pub struct OutputFile {
    pub filepath: String,
}

impl OutputFile {
    /// Constructs a new `OutputFile`.
    ///
    /// # Arguments
    ///
    /// * `filepath` - A string slice that holds the path to the file. If the file extension is
    /// `.gz`, `OutputFile` will automatically write gzip-compressed output.
    pub fn new(filepath: &str) -> Self {
        Self {
            filepath: filepath.to_string(),
        }
    }

    /// Creates the file and returns a buffered writer.
    pub fn writer(&self) -> Result<Box<dyn Write + Send>, FileError> {
        let outfile = &self.filepath;
        let file = File::create(outfile).map_err(|e| FileError::IOError(outfile.clone(), e))?;
        let writer: Box<dyn Write + Send> = if outfile.ends_with(".gz") {
            Box::new(BufWriter::new(GzEncoder::new(file, Compression::default())))
        } else {
            Box::new(BufWriter::new(file))
        };
        Ok(writer)
    }
}

/// Open `filepath` for writing, or fall back to `fallback` (usually standard out or
/// standard error) when no path is given.
pub fn open_writer(
    filepath: Option<&str>,
    fallback: impl FnOnce() -> Box<dyn Write + Send>,
) -> Result<Box<dyn Write + Send>, FileError> {
    match filepath {
        Some(path) => OutputFile::new(path).writer(),
        None => Ok(fallback()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufRead;
    use tempfile::tempdir;

    #[test]
    fn test_gzip_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("map.txt.gz");
        let path = path.to_str().unwrap();

        {
            let mut writer = OutputFile::new(path).writer().unwrap();
            writeln!(writer, "group LG1").unwrap();
            writeln!(writer, "m1 0.5").unwrap();
        }

        let lines: Vec<String> = InputFile::new(path)
            .reader()
            .unwrap()
            .lines()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(lines, vec!["group LG1", "m1 0.5"]);
    }

    #[test]
    fn test_empty_file_is_plaintext() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        File::create(&path).unwrap();
        let mut reader = InputFile::new(path.to_str().unwrap()).reader().unwrap();
        let mut line = String::new();
        assert_eq!(reader.read_line(&mut line).unwrap(), 0);
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = InputFile::new("does/not/exist.txt").reader().err().unwrap();
        assert!(err.to_string().contains("does/not/exist.txt"));
    }
}
