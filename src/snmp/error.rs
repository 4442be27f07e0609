use thiserror::Error;

/// Ошибки обращения к SNMP агенту
#[derive(Debug, Error)]
pub enum SnmpError {
    #[error("невалидный OID '{oid}': {reason}")]
    InvalidOid { oid: String, reason: String },

    #[error("не удалось создать SNMP сессию с {target}: {source}")]
    Session {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("таймаут SNMP запроса к {target} ({secs}с)")]
    Timeout { target: String, secs: u64 },

    #[error("SNMP запрос к {target} не удался: {reason}")]
    Transport { target: String, reason: String },

    #[error("агент {target} вернул error-status {status} (index {index})")]
    ErrorStatus {
        target: String,
        status: u32,
        index: u32,
    },

    #[error("агент {target} вернул не возрастающий OID {oid}")]
    NotIncreasing { target: String, oid: String },
}

/// Ошибка отдельного varbind (исключения SNMPv2c)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VarBindError {
    #[error("noSuchObject")]
    NoSuchObject,
    #[error("noSuchInstance")]
    NoSuchInstance,
    #[error("endOfMibView")]
    EndOfMibView,
}
