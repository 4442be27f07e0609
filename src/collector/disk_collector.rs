use chrono::Utc;
use std::sync::Arc;

use super::classifier::classify;
use super::persist;
use super::types::{BranchKind, BranchReport, DiskReading, Reading};
use crate::snmp::oid::DSK_ENTRY;
use crate::snmp::{Connector, Walk};
use crate::storage::Sink;

/// Обходит dskTable цели, сохраняя каждую страницу сразу по получении
pub(crate) async fn collect(
    address: String,
    connector: Arc<dyn Connector>,
    sink: Arc<dyn Sink>,
    page_size: u32,
) -> BranchReport {
    let mut report = BranchReport::new(BranchKind::Disk);

    let mut client = match connector.connect(&address).await {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(device = %address, error = %e, "SNMP Walk не удался");
            report.failed = true;
            return report;
        }
    };

    let mut walk = match Walk::new(client.as_mut(), DSK_ENTRY, page_size) {
        Ok(walk) => walk,
        Err(e) => {
            tracing::error!(device = %address, error = %e, "SNMP Walk не удался");
            report.failed = true;
            return report;
        }
    };

    while let Some(batch) = walk.next_batch().await {
        let batch = match batch {
            Ok(batch) => batch,
            Err(e) => {
                tracing::error!(device = %address, error = %e, "SNMP Walk не удался");
                report.failed = true;
                return report;
            }
        };

        for varbind in batch {
            let value = match varbind.value {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(
                        device = %address,
                        oid = %varbind.oid,
                        error = %e,
                        "SNMP Disk Walk: varbind с ошибкой"
                    );
                    continue;
                }
            };

            let metric_type = classify(&varbind.oid);
            tracing::info!(oid = %varbind.oid, value = %value, metric_type = %metric_type, "Disk");

            let reading = DiskReading {
                ip: address.clone(),
                name: format!("{}:Disk:{}", address, metric_type),
                oid: varbind.oid,
                metric_type,
                value,
                timestamp: Utc::now(),
            };
            persist(sink.as_ref(), Reading::Disk(reading), &mut report).await;
        }
    }

    tracing::info!(device = %address, records = report.written, "SNMP Walk по дискам завершен");
    report
}
