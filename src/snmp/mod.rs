use async_trait::async_trait;

pub mod error;
pub mod oid;
pub mod v2c;
pub mod walk;

#[cfg(test)]
pub mod mock;

pub use error::{SnmpError, VarBindError};
pub use oid::parse_oid;
pub use v2c::SnmpConnector;
pub use walk::Walk;

/// Пара OID/значение из ответа агента, значение уже приведено к строке
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarBind {
    pub oid: String,
    pub value: Result<String, VarBindError>,
}

impl VarBind {
    pub fn ok(oid: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            oid: oid.into(),
            value: Ok(value.into()),
        }
    }

    pub fn error(oid: impl Into<String>, error: VarBindError) -> Self {
        Self {
            oid: oid.into(),
            value: Err(error),
        }
    }
}

/// Клиент одного SNMP агента
#[async_trait]
pub trait DeviceClient: Send {
    /// Адрес агента, с которым работает клиент
    fn target(&self) -> &str;

    /// GET по списку OID, ответ выровнен по позициям запроса
    async fn get_many(&mut self, oids: &[&str]) -> Result<Vec<VarBind>, SnmpError>;

    /// Один раунд GETBULK начиная со следующего за `from` OID
    async fn get_bulk(
        &mut self,
        from: &str,
        max_repetitions: u32,
    ) -> Result<Vec<VarBind>, SnmpError>;
}

/// Фабрика клиентов: по одному клиенту на каждую операцию
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, address: &str) -> Result<Box<dyn DeviceClient>, SnmpError>;
}
