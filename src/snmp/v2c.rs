use async_trait::async_trait;
use snmp2::{AsyncSession, Oid, Pdu, Value};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::time::{Duration, timeout};

use super::{Connector, DeviceClient, SnmpError, VarBind, VarBindError, parse_oid};

pub struct SnmpClientV2c {
    target: String,
    session: AsyncSession,
    timeout: Duration,
}

impl SnmpClientV2c {
    pub async fn new(
        target: &str,
        community: &[u8],
        timeout_duration: Duration,
    ) -> Result<Self, SnmpError> {
        let connect = AsyncSession::new_v2c(target, community, 2);
        let session = match timeout(timeout_duration, connect).await {
            Ok(Ok(session)) => session,
            Ok(Err(source)) => {
                return Err(SnmpError::Session {
                    target: target.to_string(),
                    source,
                });
            }
            Err(_) => {
                return Err(SnmpError::Timeout {
                    target: target.to_string(),
                    secs: timeout_duration.as_secs(),
                });
            }
        };

        Ok(Self {
            target: target.to_string(),
            session,
            timeout: timeout_duration,
        })
    }

    fn timeout_error(&self) -> SnmpError {
        SnmpError::Timeout {
            target: self.target.clone(),
            secs: self.timeout.as_secs(),
        }
    }
}

#[async_trait]
impl DeviceClient for SnmpClientV2c {
    fn target(&self) -> &str {
        &self.target
    }

    async fn get_many(&mut self, oids: &[&str]) -> Result<Vec<VarBind>, SnmpError> {
        let parsed = oids
            .iter()
            .map(|oid| parse_oid(oid))
            .collect::<Result<Vec<_>, _>>()?;
        let refs: Vec<&Oid<'_>> = parsed.iter().collect();

        let timeout_error = self.timeout_error();
        let resp = timeout(self.timeout, self.session.get_many(&refs))
            .await
            .map_err(|_| timeout_error)?
            .map_err(|e| SnmpError::Transport {
                target: self.target.clone(),
                reason: e.to_string(),
            })?;

        decode(&self.target, resp)
    }

    async fn get_bulk(
        &mut self,
        from: &str,
        max_repetitions: u32,
    ) -> Result<Vec<VarBind>, SnmpError> {
        let start = parse_oid(from)?;

        let timeout_error = self.timeout_error();
        let resp = timeout(self.timeout, self.session.getbulk(&[&start], 0, max_repetitions))
            .await
            .map_err(|_| timeout_error)?
            .map_err(|e| SnmpError::Transport {
                target: self.target.clone(),
                reason: e.to_string(),
            })?;

        decode(&self.target, resp)
    }
}

/// Переводит PDU ответа в varbind'ы, пока буфер сессии еще жив
fn decode(target: &str, resp: Pdu<'_>) -> Result<Vec<VarBind>, SnmpError> {
    if resp.error_status != 0 {
        return Err(SnmpError::ErrorStatus {
            target: target.to_string(),
            status: resp.error_status,
            index: resp.error_index,
        });
    }

    Ok(resp
        .varbinds
        .into_iter()
        .map(|(oid, value)| VarBind {
            oid: oid.to_string(),
            value: flatten(&value),
        })
        .collect())
}

/// Приводит значение к строке один раз; неизвестные типы превращаются в ""
pub fn flatten(value: &Value<'_>) -> Result<String, VarBindError> {
    match value {
        Value::NoSuchObject => Err(VarBindError::NoSuchObject),
        Value::NoSuchInstance => Err(VarBindError::NoSuchInstance),
        Value::EndOfMibView => Err(VarBindError::EndOfMibView),
        Value::Null => Ok(String::new()),
        Value::Boolean(b) => Ok(b.to_string()),
        Value::Integer(n) => Ok(n.to_string()),
        Value::OctetString(bytes) => Ok(String::from_utf8_lossy(bytes).into_owned()),
        Value::ObjectIdentifier(oid) => Ok(oid.to_string()),
        Value::IpAddress(octets) => Ok(Ipv4Addr::from(*octets).to_string()),
        Value::Counter32(n) | Value::Unsigned32(n) | Value::Timeticks(n) => Ok(n.to_string()),
        Value::Counter64(n) => Ok(n.to_string()),
        _ => Ok(String::new()),
    }
}

/// Дописывает порт к адресу, если его там нет
pub fn target_socket(address: &str, port: u16) -> String {
    let address = address.trim();
    if address.parse::<SocketAddr>().is_ok() {
        return address.to_string();
    }
    if let Ok(ip) = address.parse::<IpAddr>() {
        return SocketAddr::new(ip, port).to_string();
    }
    if address
        .rsplit_once(':')
        .is_some_and(|(_, p)| p.parse::<u16>().is_ok())
    {
        return address.to_string();
    }
    format!("{}:{}", address, port)
}

/// Создает SNMPv2c клиентов с общим community
pub struct SnmpConnector {
    community: Vec<u8>,
    port: u16,
    timeout: Duration,
}

impl SnmpConnector {
    pub fn new(community: impl Into<Vec<u8>>, port: u16, timeout: Duration) -> Self {
        Self {
            community: community.into(),
            port,
            timeout,
        }
    }
}

#[async_trait]
impl Connector for SnmpConnector {
    async fn connect(&self, address: &str) -> Result<Box<dyn DeviceClient>, SnmpError> {
        let target = target_socket(address, self.port);
        let client = SnmpClientV2c::new(&target, &self.community, self.timeout).await?;
        Ok(Box::new(client))
    }
}
