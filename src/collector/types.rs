use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Скалярное показание устройства (OS / CPU / RAM free)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarReading {
    pub name: String,
    pub oid: String,
    pub value: String,
    pub timestamp: DateTime<Utc>,
}

/// Одна ячейка таблицы дисков
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskReading {
    pub ip: String,
    pub name: String,
    pub oid: String,
    pub metric_type: MetricType,
    pub value: String,
    pub timestamp: DateTime<Utc>,
}

/// Колонка dskTable, к которой относится значение
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    Path,
    TotalKb,
    AvailableKb,
    UsedKb,
    PercentUsed,
    Unknown,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Path => "path",
            MetricType::TotalKb => "total_kb",
            MetricType::AvailableKb => "available_kb",
            MetricType::UsedKb => "used_kb",
            MetricType::PercentUsed => "percent_used",
            MetricType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Запись для хранилища
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    Scalar(ScalarReading),
    Disk(DiskReading),
}

impl Reading {
    pub fn name(&self) -> &str {
        match self {
            Reading::Scalar(r) => &r.name,
            Reading::Disk(r) => &r.name,
        }
    }
}

/// Итог одного цикла опроса
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub targets: usize,
    pub scalar_records: usize,
    pub disk_records: usize,
    /// Ветки (scalar или walk), завершившиеся ошибкой
    pub failed_branches: usize,
    pub failed_writes: usize,
}

impl CycleReport {
    pub(crate) fn absorb(&mut self, branch: BranchReport) {
        match branch.kind {
            BranchKind::Scalar => self.scalar_records += branch.written,
            BranchKind::Disk => self.disk_records += branch.written,
        }
        self.failed_writes += branch.failed_writes;
        if branch.failed {
            self.failed_branches += 1;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BranchKind {
    Scalar,
    Disk,
}

/// Итог одной ветки опроса цели
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BranchReport {
    pub kind: BranchKind,
    pub written: usize,
    pub failed_writes: usize,
    pub failed: bool,
}

impl BranchReport {
    pub fn new(kind: BranchKind) -> Self {
        Self {
            kind,
            written: 0,
            failed_writes: 0,
            failed: false,
        }
    }
}
