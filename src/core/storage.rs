use crate::core::config::get_env_var;
use crate::core::errors::{Error, Result};
use log::{debug, info};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/*-------------------------------------------------------------------------------------------------
  Object Store Interface
-------------------------------------------------------------------------------------------------*/

/// A flat, bucket-scoped key/value store.
///
/// Object names are `/` separated paths; a prefix is the folder part of an object name
/// (`external-networks/2020-10-19 21-16-30-1a2b3c4d` for
/// `external-networks/2020-10-19 21-16-30-1a2b3c4d/networks`).
pub trait ObjectStore {
    /// Write `data` to the object `<prefix>/<name>`, replacing any existing object.
    fn write(&self, bucket: &str, prefix: &str, name: &str, data: &[u8]) -> Result<()>;

    /// Delete the object named `prefix`, or every object under it.
    fn delete(&self, bucket: &str, prefix: &str) -> Result<()>;

    /// Distinct prefixes of every object in the bucket, sorted.
    fn list_prefixes(&self, bucket: &str) -> Result<Vec<String>>;

    /// Names of the objects starting with `prefix`, sorted.
    fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<String>>;

    fn read(&self, bucket: &str, name: &str) -> Result<Vec<u8>>;
}

/*-------------------------------------------------------------------------------------------------
  Local Object Store
-------------------------------------------------------------------------------------------------*/

/// An [ObjectStore] backed by the local filesystem: every bucket is a directory under `root`
/// and every object a file.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl Default for LocalObjectStore {
    /// Root the store at `CLOUDIPRANGES_STORAGE_ROOT` when set, otherwise at
    /// `<data dir>/cloudipranges` (`~/.local/share/cloudipranges` on Linux).
    fn default() -> Self {
        Self::new(get_env_var("CLOUDIPRANGES_STORAGE_ROOT", default_root()))
    }
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the objects of `bucket`.
    pub fn bucket_path(&self, bucket: &str) -> PathBuf {
        self.root.join(bucket)
    }

    /*-------------------------------------------------------------------------
      Private Methods
    -------------------------------------------------------------------------*/

    fn object_path(&self, bucket: &str, name: &str) -> PathBuf {
        let mut path = self.bucket_path(bucket);
        path.extend(name.split('/').filter(|component| !component.is_empty()));
        path
    }

    /// Every object name in the bucket; a missing bucket holds no objects.
    fn all_objects(&self, bucket: &str) -> Result<Vec<String>> {
        let bucket_path = self.bucket_path(bucket);
        let mut names = Vec::new();
        if bucket_path.is_dir() {
            collect_objects(&bucket_path, "", &mut names)?;
        }
        names.sort();
        Ok(names)
    }
}

impl ObjectStore for LocalObjectStore {
    fn write(&self, bucket: &str, prefix: &str, name: &str, data: &[u8]) -> Result<()> {
        let path = self.object_path(bucket, &format!("{prefix}/{name}"));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| storage_error(parent, source))?;
        }
        fs::write(&path, data).map_err(|source| storage_error(&path, source))?;
        info!("Wrote {} bytes to {}", data.len(), path.display());
        Ok(())
    }

    fn delete(&self, bucket: &str, prefix: &str) -> Result<()> {
        let path = self.object_path(bucket, prefix);
        let result = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        match result {
            Ok(()) => {
                info!("Deleted {}", path.display());
                Ok(())
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!("Nothing to delete at {}", path.display());
                Ok(())
            }
            Err(error) => Err(storage_error(&path, error)),
        }
    }

    fn list_prefixes(&self, bucket: &str) -> Result<Vec<String>> {
        let prefixes: BTreeSet<String> = self
            .all_objects(bucket)?
            .iter()
            .filter_map(|name| name.rsplit_once('/'))
            .map(|(prefix, _)| prefix.to_string())
            .collect();
        Ok(prefixes.into_iter().collect())
    }

    fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .all_objects(bucket)?
            .into_iter()
            .filter(|name| name.starts_with(prefix))
            .collect())
    }

    fn read(&self, bucket: &str, name: &str) -> Result<Vec<u8>> {
        let path = self.object_path(bucket, name);
        fs::read(&path).map_err(|source| storage_error(&path, source))
    }
}

/*-------------------------------------------------------------------------------------------------
  Helper Functions
-------------------------------------------------------------------------------------------------*/

fn default_root() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("cloudipranges")
}

fn collect_objects(directory: &Path, prefix: &str, names: &mut Vec<String>) -> Result<()> {
    let entries = fs::read_dir(directory).map_err(|source| storage_error(directory, source))?;
    for entry in entries {
        let entry = entry.map_err(|source| storage_error(directory, source))?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        let name = if prefix.is_empty() {
            file_name
        } else {
            format!("{prefix}/{file_name}")
        };

        let path = entry.path();
        if path.is_dir() {
            collect_objects(&path, &name, names)?;
        } else {
            names.push(name);
        }
    }
    Ok(())
}

fn storage_error(path: &Path, source: io::Error) -> Error {
    Error::Storage {
        path: path.to_path_buf(),
        source,
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
