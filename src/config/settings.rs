use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Базовые настройки приложения, можно переопределить YAML файлом
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Настройки опроса
    pub polling: PollingSettings,
    /// Настройки подключения
    pub connection: ConnectionSettings,
    /// Настройки аутентификации
    pub auth: AuthSettings,
    /// Хранилище показаний
    pub storage: StorageSettings,
    /// HTTP API для чтения
    pub http: HttpSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingSettings {
    pub enabled: bool,
    /// Адреса опрашиваемых устройств
    pub targets: Vec<String>,
    /// Интервал между тиками (секунды)
    pub interval_secs: u64,
    /// Сколько тиков подряд цикл может не завершаться
    pub watchdog_ticks: u32,
    /// Перезапускать опрос вместо остановки
    pub watchdog_restart: bool,
    /// max-repetitions для GETBULK
    pub walk_page: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Таймаут для SNMP операций (секунды)
    pub timeout: u64,
    pub port: u16,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Настройки SNMPv2c
    pub v2c: SnmpV2cSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnmpV2cSettings {
    /// Community string
    pub community: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StoreKind,
    /// Каталог для JSON-lines файлов
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Пустая строка отключает HTTP API
    pub addr: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Jsonl,
    Memory,
}

impl FromStr for StoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jsonl" => Ok(StoreKind::Jsonl),
            "memory" => Ok(StoreKind::Memory),
            other => anyhow::bail!("неизвестное хранилище '{}', ожидается jsonl или memory", other),
        }
    }
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            targets: vec!["localhost".to_string()],
            interval_secs: 10,
            watchdog_ticks: 5,
            watchdog_restart: false,
            walk_page: 20,
        }
    }
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            timeout: 10,
            port: 161,
        }
    }
}

impl Default for SnmpV2cSettings {
    fn default() -> Self {
        Self {
            community: "public".to_string(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StoreKind::Jsonl,
            data_dir: PathBuf::from("./data"),
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl Settings {
    /// Загружает настройки из YAML, отсутствующие поля берутся по умолчанию
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Не удалось прочитать файл: {}", path))?;

        Self::from_yaml(&content).context(format!("Не удалось распарсить YAML: {}", path))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yml::from_str(content)?)
    }
}
