use async_trait::async_trait;
use parking_lot::Mutex;

use super::{Filter, ReadStore, Sink, StoreError};
use crate::collector::{DiskReading, Reading, ScalarReading};

/// Хранит показания в памяти процесса
#[derive(Default)]
pub struct MemoryStore {
    scalars: Mutex<Vec<ScalarReading>>,
    disks: Mutex<Vec<DiskReading>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scalar_readings(&self) -> Vec<ScalarReading> {
        self.scalars.lock().clone()
    }

    pub fn disk_readings(&self) -> Vec<DiskReading> {
        self.disks.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.scalars.lock().len() + self.disks.lock().len()
    }
}

#[async_trait]
impl Sink for MemoryStore {
    async fn write(&self, reading: &Reading) -> Result<(), StoreError> {
        match reading {
            Reading::Scalar(r) => self.scalars.lock().push(r.clone()),
            Reading::Disk(r) => self.disks.lock().push(r.clone()),
        }
        Ok(())
    }
}

#[async_trait]
impl ReadStore for MemoryStore {
    async fn scalars(&self, filter: &Filter) -> Result<Vec<ScalarReading>, StoreError> {
        Ok(filter.apply(self.scalar_readings()))
    }

    async fn disks(&self, filter: &Filter) -> Result<Vec<DiskReading>, StoreError> {
        Ok(filter.apply(self.disk_readings()))
    }
}
