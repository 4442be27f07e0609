use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{Collection, Filter, ReadStore, Sink, StoreError};
use crate::collector::{DiskReading, Reading, ScalarReading};

/// Дописывает записи в JSON-lines файлы, по одному файлу на коллекцию
pub struct JsonLinesStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLinesStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;

        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, collection: Collection) -> PathBuf {
        self.dir.join(format!("{}.jsonl", collection.name()))
    }

    fn append<T: Serialize>(&self, collection: Collection, record: &T) -> Result<(), StoreError> {
        let line = serde_json::to_string(record)?;
        let path = self.path(collection);
        let io_err = |source| StoreError::Io {
            path: path.clone(),
            source,
        };

        let _guard = self.write_lock.lock();
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_err)?;
        writeln!(file, "{}", line).map_err(io_err)
    }

    fn load<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>, StoreError> {
        let path = self.path(collection);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        let mut records = Vec::new();
        for (n, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(
                    path = %path.display(),
                    line = n + 1,
                    error = %e,
                    "пропущена поврежденная запись"
                ),
            }
        }

        Ok(records)
    }
}

#[async_trait]
impl Sink for JsonLinesStore {
    async fn write(&self, reading: &Reading) -> Result<(), StoreError> {
        match reading {
            Reading::Scalar(r) => self.append(Collection::Scalar, r),
            Reading::Disk(r) => self.append(Collection::Disk, r),
        }
    }
}

#[async_trait]
impl ReadStore for JsonLinesStore {
    async fn scalars(&self, filter: &Filter) -> Result<Vec<ScalarReading>, StoreError> {
        Ok(filter.apply(self.load(Collection::Scalar)?))
    }

    async fn disks(&self, filter: &Filter) -> Result<Vec<DiskReading>, StoreError> {
        Ok(filter.apply(self.load(Collection::Disk)?))
    }
}
