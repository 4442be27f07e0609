//! Хранилище показаний.
//!
//! Коллектор только дописывает записи через [`Sink`], HTTP слой читает их
//! через [`ReadStore`]. Записи разложены по двум коллекциям, как и в
//! исходной базе: `snmp_data` для скаляров и `snmp_disk_data` для дисков.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::path::PathBuf;
use thiserror::Error;

use crate::collector::{DiskReading, Reading, ScalarReading};

pub mod jsonl;
pub mod memory;

pub use jsonl::JsonLinesStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("ошибка ввода-вывода {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ошибка сериализации записи: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("хранилище недоступно: {0}")]
    Unavailable(String),
}

/// Коллекция, в которую попадает запись
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Scalar,
    Disk,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Scalar => "snmp_data",
            Collection::Disk => "snmp_disk_data",
        }
    }
}

/// Приемник записей: только добавление, без чтения
#[async_trait]
pub trait Sink: Send + Sync {
    async fn write(&self, reading: &Reading) -> Result<(), StoreError>;
}

/// Постраничное чтение, новые записи первыми
#[async_trait]
pub trait ReadStore: Send + Sync {
    async fn scalars(&self, filter: &Filter) -> Result<Vec<ScalarReading>, StoreError>;
    async fn disks(&self, filter: &Filter) -> Result<Vec<DiskReading>, StoreError>;
}

pub trait Record {
    fn name(&self) -> &str;
    fn timestamp(&self) -> DateTime<Utc>;
}

impl Record for ScalarReading {
    fn name(&self) -> &str {
        &self.name
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl Record for DiskReading {
    fn name(&self) -> &str {
        &self.name
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Параметры выборки: поиск по имени, сортировка по времени по убыванию,
/// затем `offset`/`limit`
#[derive(Debug, Clone)]
pub struct Filter {
    pub limit: usize,
    pub offset: usize,
    pub search: Option<Regex>,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            limit: 10,
            offset: 0,
            search: None,
        }
    }
}

impl Filter {
    pub fn apply<T: Record>(&self, mut items: Vec<T>) -> Vec<T> {
        if let Some(search) = &self.search {
            items.retain(|item| search.is_match(item.name()));
        }

        // при равном времени позже записанное идет первым
        items.reverse();
        items.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));

        items
            .into_iter()
            .skip(self.offset)
            .take(self.limit)
            .collect()
    }
}
