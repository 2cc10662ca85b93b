use std::fs;
use std::io::{self, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use ron::ser::PrettyConfig;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("{0:?} is not a directory")]
    NotADirectory(PathBuf),
    #[error("could not access {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("could not parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("could not serialize {path:?}: {message}")]
    Serialize { path: PathBuf, message: String },
}

/// One value of type `T` kept as pretty-printed ron in a single file.
///
/// Stores go through a temp file in the same directory and a rename, so a
/// reader sees either the previous value or the new one.
pub struct RonFile<T> {
    path: PathBuf,
    _value: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned> RonFile<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _value: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `None` when the file does not exist yet.
    pub fn load(&self) -> Result<Option<T>, PersistError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(self.io(source)),
        };
        ron::from_str(&content)
            .map(Some)
            .map_err(|err| PersistError::Parse {
                path: self.path.clone(),
                message: err.to_string(),
            })
    }

    pub fn store(&self, value: &T) -> Result<(), PersistError> {
        let content = ron::ser::to_string_pretty(value, PrettyConfig::new()).map_err(|err| {
            PersistError::Serialize {
                path: self.path.clone(),
                message: err.to_string(),
            }
        })?;
        let dir = self.ensure_parent()?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| self.io(e))?;
        tmp.write_all(content.as_bytes()).map_err(|e| self.io(e))?;
        tmp.as_file_mut().sync_all().map_err(|e| self.io(e))?;
        tmp.persist(&self.path).map_err(|e| self.io(e.error))?;
        Ok(())
    }

    fn ensure_parent(&self) -> Result<PathBuf, PersistError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if dir.exists() && !dir.is_dir() {
            return Err(PersistError::NotADirectory(dir));
        }
        fs::create_dir_all(&dir).map_err(|e| self.io(e))?;
        Ok(dir)
    }

    fn io(&self, source: io::Error) -> PersistError {
        PersistError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
