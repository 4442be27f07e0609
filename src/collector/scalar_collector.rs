use chrono::Utc;
use std::sync::Arc;

use super::persist;
use super::types::{BranchKind, BranchReport, Reading, ScalarReading};
use crate::snmp::oid::{LA_LOAD_1, MEM_AVAIL_REAL, SYS_DESCR};
use crate::snmp::{Connector, SnmpError, VarBind};
use crate::storage::Sink;

/// Скаляры в порядке запроса и суффиксы их имен
pub const SCALAR_SLOTS: [(&str, &str); 3] = [
    (SYS_DESCR, "OS"),
    (LA_LOAD_1, "CPU"),
    (MEM_AVAIL_REAL, "RAM free"),
];

/// Один GET по трем скалярам цели.
///
/// Ошибка транспорта обрывает ветку целиком, ошибочный varbind только
/// пропускается.
pub(crate) async fn collect(
    address: String,
    connector: Arc<dyn Connector>,
    sink: Arc<dyn Sink>,
) -> BranchReport {
    let mut report = BranchReport::new(BranchKind::Scalar);

    let varbinds = match fetch(&address, connector.as_ref()).await {
        Ok(varbinds) => varbinds,
        Err(e) => {
            tracing::error!(device = %address, error = %e, "SNMP GET не удался");
            report.failed = true;
            return report;
        }
    };

    for ((_, label), varbind) in SCALAR_SLOTS.iter().zip(varbinds) {
        let value = match varbind.value {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    device = %address,
                    oid = %varbind.oid,
                    error = %e,
                    "SNMP varbind с ошибкой"
                );
                continue;
            }
        };

        tracing::info!(oid = %varbind.oid, value = %value, "{}", label);

        let reading = ScalarReading {
            name: format!("{}:{}", address, label),
            oid: varbind.oid,
            value,
            timestamp: Utc::now(),
        };
        persist(sink.as_ref(), Reading::Scalar(reading), &mut report).await;
    }

    report
}

async fn fetch(address: &str, connector: &dyn Connector) -> Result<Vec<VarBind>, SnmpError> {
    let mut client = connector.connect(address).await?;
    let oids: Vec<&str> = SCALAR_SLOTS.iter().map(|(oid, _)| *oid).collect();
    client.get_many(&oids).await
}
