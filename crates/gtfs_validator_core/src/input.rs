use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::csv_table::{parse_csv_table, CsvTable};

#[derive(Debug, Error)]
pub enum GtfsInputError {
    #[error("input path does not exist: {0}")]
    MissingPath(PathBuf),
    #[error("input path is neither a directory nor a file: {0}")]
    InvalidPath(PathBuf),
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid zip archive {path}: {source}")]
    ZipArchive {
        path: PathBuf,
        #[source]
        source: ZipError,
    },
    #[error("zip entry {file}: {source}")]
    ZipFile {
        file: String,
        #[source]
        source: ZipError,
    },
    #[error("io error reading zip entry {file}: {source}")]
    ZipFileIo {
        file: String,
        #[source]
        source: io::Error,
    },
    #[error("missing required file {0}")]
    MissingFile(String),
    #[error("feed has neither calendar.txt nor calendar_dates.txt")]
    MissingServiceCalendar,
    #[error("csv error in {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },
}

/// Where a feed is read from: an extracted directory or a zip archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GtfsInput {
    Directory(PathBuf),
    Zip(PathBuf),
}

impl GtfsInput {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GtfsInputError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(GtfsInputError::MissingPath(path.to_path_buf()));
        }
        if path.is_dir() {
            Ok(GtfsInput::Directory(path.to_path_buf()))
        } else if path.is_file() {
            Ok(GtfsInput::Zip(path.to_path_buf()))
        } else {
            Err(GtfsInputError::InvalidPath(path.to_path_buf()))
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            GtfsInput::Directory(path) | GtfsInput::Zip(path) => path,
        }
    }

    /// Opens the input. For archives this reads the zip central directory.
    pub fn reader(&self) -> Result<GtfsInputReader, GtfsInputError> {
        let source = match self {
            GtfsInput::Directory(path) => ReaderSource::Directory(path.clone()),
            GtfsInput::Zip(path) => {
                let file = File::open(path).map_err(|source| GtfsInputError::Io {
                    path: path.clone(),
                    source,
                })?;
                let archive =
                    ZipArchive::new(file).map_err(|source| GtfsInputError::ZipArchive {
                        path: path.clone(),
                        source,
                    })?;
                ReaderSource::Zip(Box::new(archive))
            }
        };
        Ok(GtfsInputReader { source })
    }
}

enum ReaderSource {
    Directory(PathBuf),
    Zip(Box<ZipArchive<File>>),
}

pub struct GtfsInputReader {
    source: ReaderSource,
}

impl GtfsInputReader {
    /// Raw bytes of `name`, or `None` when the feed does not contain it.
    ///
    /// Archive entries are matched by base name so feeds zipped with an
    /// enclosing folder still load.
    pub fn read_file(&mut self, name: &str) -> Result<Option<Vec<u8>>, GtfsInputError> {
        match &mut self.source {
            ReaderSource::Directory(dir) => {
                let path = dir.join(name);
                if !path.is_file() {
                    return Ok(None);
                }
                fs::read(&path)
                    .map(Some)
                    .map_err(|source| GtfsInputError::Io { path, source })
            }
            ReaderSource::Zip(archive) => {
                let entry_name = archive
                    .file_names()
                    .find(|entry| Path::new(entry).file_name() == Some(OsStr::new(name)))
                    .map(str::to_string);
                let Some(entry_name) = entry_name else {
                    return Ok(None);
                };
                let mut entry =
                    archive
                        .by_name(&entry_name)
                        .map_err(|source| GtfsInputError::ZipFile {
                            file: entry_name.clone(),
                            source,
                        })?;
                let mut data = Vec::new();
                entry
                    .read_to_end(&mut data)
                    .map_err(|source| GtfsInputError::ZipFileIo {
                        file: entry_name.clone(),
                        source,
                    })?;
                Ok(Some(data))
            }
        }
    }

    pub fn read_optional_table<T: DeserializeOwned>(
        &mut self,
        name: &str,
    ) -> Result<Option<CsvTable<T>>, GtfsInputError> {
        match self.read_file(name)? {
            Some(data) => parse_csv_table(name, &data).map(Some),
            None => Ok(None),
        }
    }

    pub fn read_required_table<T: DeserializeOwned>(
        &mut self,
        name: &str,
    ) -> Result<CsvTable<T>, GtfsInputError> {
        self.read_optional_table(name)?
            .ok_or_else(|| GtfsInputError::MissingFile(name.to_string()))
    }
}
