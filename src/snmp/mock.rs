//! Сценарные SNMP клиенты для тестов без сети.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use super::{Connector, DeviceClient, SnmpError, VarBind};

/// Ответ агента на один запрос
#[derive(Debug, Clone)]
pub enum Reply {
    Ok(Vec<VarBind>),
    Fail,
    Hang,
}

#[derive(Debug, Clone)]
pub struct DeviceScript {
    pub get: Reply,
    /// Страницы GETBULK по порядку, после них агент отвечает пусто
    pub bulk: Vec<Reply>,
}

impl Default for DeviceScript {
    fn default() -> Self {
        Self {
            get: Reply::Ok(Vec::new()),
            bulk: Vec::new(),
        }
    }
}

impl DeviceScript {
    pub fn with_get(mut self, reply: Reply) -> Self {
        self.get = reply;
        self
    }

    pub fn with_bulk(mut self, pages: Vec<Reply>) -> Self {
        self.bulk = pages;
        self
    }
}

pub struct ScriptedClient {
    target: String,
    script: DeviceScript,
    next_page: usize,
    log: Arc<Mutex<Vec<String>>>,
}

impl ScriptedClient {
    pub fn new(target: &str, script: DeviceScript) -> Self {
        Self::with_log(target, script, Arc::default())
    }

    fn with_log(target: &str, script: DeviceScript, log: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            target: target.to_string(),
            script,
            next_page: 0,
            log,
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    fn record(&self, request: String) {
        self.log.lock().push(format!("{} {}", self.target, request));
    }

    async fn answer(&self, reply: Reply) -> Result<Vec<VarBind>, SnmpError> {
        match reply {
            Reply::Ok(varbinds) => Ok(varbinds),
            Reply::Fail => Err(SnmpError::Transport {
                target: self.target.clone(),
                reason: "scripted failure".to_string(),
            }),
            Reply::Hang => std::future::pending().await,
        }
    }
}

#[async_trait]
impl DeviceClient for ScriptedClient {
    fn target(&self) -> &str {
        &self.target
    }

    async fn get_many(&mut self, oids: &[&str]) -> Result<Vec<VarBind>, SnmpError> {
        self.record(format!("get {}", oids.join(",")));
        self.answer(self.script.get.clone()).await
    }

    async fn get_bulk(
        &mut self,
        from: &str,
        _max_repetitions: u32,
    ) -> Result<Vec<VarBind>, SnmpError> {
        self.record(format!("bulk {}", from));
        let reply = self
            .script
            .bulk
            .get(self.next_page)
            .cloned()
            .unwrap_or(Reply::Ok(Vec::new()));
        self.next_page += 1;
        self.answer(reply).await
    }
}

/// Коннектор с заранее заданным поведением каждого адреса
#[derive(Default)]
pub struct ScriptedConnector {
    devices: HashMap<String, DeviceScript>,
    log: Arc<Mutex<Vec<String>>>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn device(mut self, address: &str, script: DeviceScript) -> Self {
        self.devices.insert(address.to_string(), script);
        self
    }

    /// Все запросы всех клиентов в порядке поступления
    pub fn requests(&self) -> Vec<String> {
        self.log.lock().clone()
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, address: &str) -> Result<Box<dyn DeviceClient>, SnmpError> {
        let script = self
            .devices
            .get(address)
            .cloned()
            .ok_or_else(|| SnmpError::Transport {
                target: address.to_string(),
                reason: "no route to host".to_string(),
            })?;

        Ok(Box::new(ScriptedClient::with_log(
            address,
            script,
            Arc::clone(&self.log),
        )))
    }
}
