use anyhow::{Context, Result};
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub mod settings;

pub use settings::{Settings, StoreKind};

/// Главная конфигурация приложения.
///
/// Собирается один раз при старте из настроек и переменных окружения и
/// дальше не меняется.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub polling_enabled: bool,
    pub targets: Vec<String>,
    pub community: String,
    pub port: u16,
    pub poll_interval: Duration,
    pub timeout: Duration,
    pub watchdog_ticks: u32,
    pub watchdog_restart: bool,
    pub walk_page: u32,
    pub store: StoreKind,
    pub data_dir: PathBuf,
    /// `None`, если HTTP API отключен
    pub http_addr: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_settings(Settings::default())
    }
}

impl AppConfig {
    /// Читает `SNMP_CONFIG` (если задан) и переменные окружения
    pub fn load() -> Result<Self> {
        let settings = match env::var("SNMP_CONFIG") {
            Ok(path) => Settings::load(&path)?,
            Err(_) => Settings::default(),
        };

        Self::resolve(settings, |key| env::var(key).ok())
    }

    fn from_settings(settings: Settings) -> Self {
        let http_addr = Some(settings.http.addr.trim().to_string()).filter(|a| !a.is_empty());

        Self {
            polling_enabled: settings.polling.enabled,
            targets: settings.polling.targets,
            community: settings.auth.v2c.community,
            port: settings.connection.port,
            poll_interval: Duration::from_secs(settings.polling.interval_secs),
            timeout: Duration::from_secs(settings.connection.timeout),
            watchdog_ticks: settings.polling.watchdog_ticks,
            watchdog_restart: settings.polling.watchdog_restart,
            walk_page: settings.polling.walk_page,
            store: settings.storage.backend,
            data_dir: settings.storage.data_dir,
            http_addr,
        }
    }

    /// Накладывает переменные окружения поверх настроек
    pub fn resolve(settings: Settings, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::from_settings(settings);

        if let Some(polling) = lookup("SNMP_POLLING") {
            config.polling_enabled = !polling.trim().eq_ignore_ascii_case("false");
        }
        if let Some(targets) = lookup("SNMP_TARGET_IP") {
            config.targets = split_targets(&targets);
        }
        if let Some(community) = lookup("SNMP_COMMUNITY") {
            config.community = community;
        }
        if let Some(port) = parse_var(&lookup, "SNMP_PORT")? {
            config.port = port;
        }
        if let Some(secs) = parse_var(&lookup, "SNMP_POLL_INTERVAL_SECS")? {
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var(&lookup, "SNMP_TIMEOUT")? {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(ticks) = parse_var(&lookup, "SNMP_WATCHDOG_TICKS")? {
            config.watchdog_ticks = ticks;
        }
        if let Some(restart) = parse_var(&lookup, "SNMP_WATCHDOG_RESTART")? {
            config.watchdog_restart = restart;
        }
        if let Some(page) = parse_var(&lookup, "SNMP_WALK_PAGE")? {
            config.walk_page = page;
        }
        if let Some(store) = parse_var(&lookup, "SNMP_STORE")? {
            config.store = store;
        }
        if let Some(dir) = lookup("SNMP_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(addr) = lookup("SNMP_HTTP_ADDR") {
            config.http_addr = Some(addr.trim().to_string()).filter(|a| !a.is_empty());
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            anyhow::bail!("не задано ни одного SNMP устройства (SNMP_TARGET_IP)");
        }
        if self.poll_interval.is_zero() {
            anyhow::bail!("интервал опроса должен быть больше нуля");
        }
        if self.timeout.is_zero() {
            anyhow::bail!("таймаут SNMP должен быть больше нуля");
        }
        if self.walk_page == 0 {
            anyhow::bail!("SNMP_WALK_PAGE должен быть больше нуля");
        }
        Ok(())
    }

    pub fn debug_config(&self) {
        tracing::info!(
            polling = self.polling_enabled,
            targets = ?self.targets,
            port = self.port,
            interval_secs = self.poll_interval.as_secs(),
            timeout_secs = self.timeout.as_secs(),
            watchdog_ticks = self.watchdog_ticks,
            watchdog_restart = self.watchdog_restart,
            store = ?self.store,
            http = ?self.http_addr,
            "Конфигурация SNMP"
        );
    }
}

fn split_targets(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| anyhow::anyhow!("{}", e))
                .context(format!("Невалидное значение {}='{}'", key, raw))
        })
        .transpose()
}
