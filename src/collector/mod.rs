use std::sync::Arc;
use tokio::task::JoinSet;

pub mod classifier;
pub mod disk_collector;
pub mod scalar_collector;
pub mod types;

pub use types::{CycleReport, DiskReading, MetricType, Reading, ScalarReading};

use crate::snmp::Connector;
use crate::storage::Sink;
use types::BranchReport;

/// Коллектор одного цикла опроса.
///
/// Для каждой цели запускаются две независимые задачи: GET скаляров и
/// walk таблицы дисков. Цикл заканчивается, когда все задачи завершились,
/// как бы они ни завершились.
pub struct SnmpCollector {
    targets: Vec<String>,
    connector: Arc<dyn Connector>,
    sink: Arc<dyn Sink>,
    walk_page: u32,
}

impl SnmpCollector {
    pub fn new(
        targets: Vec<String>,
        connector: Arc<dyn Connector>,
        sink: Arc<dyn Sink>,
        walk_page: u32,
    ) -> Self {
        Self {
            targets,
            connector,
            sink,
            walk_page,
        }
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    pub async fn run_cycle(&self, cycle: u64) -> CycleReport {
        let mut tasks = JoinSet::new();

        for address in &self.targets {
            tracing::info!(cycle, device = %address, "Опрос SNMP устройства");

            tasks.spawn(scalar_collector::collect(
                address.clone(),
                Arc::clone(&self.connector),
                Arc::clone(&self.sink),
            ));
            tasks.spawn(disk_collector::collect(
                address.clone(),
                Arc::clone(&self.connector),
                Arc::clone(&self.sink),
                self.walk_page,
            ));
        }

        let mut report = CycleReport {
            targets: self.targets.len(),
            ..CycleReport::default()
        };

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(branch) => report.absorb(branch),
                Err(e) => {
                    tracing::error!(cycle, error = %e, "задача опроса упала");
                    report.failed_branches += 1;
                }
            }
        }

        report
    }
}

/// Пишет запись; ошибка записи только логируется
async fn persist(sink: &dyn Sink, reading: Reading, report: &mut BranchReport) {
    match sink.write(&reading).await {
        Ok(()) => report.written += 1,
        Err(e) => {
            tracing::error!(record = %reading.name(), error = %e, "не удалось сохранить запись");
            report.failed_writes += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snmp::mock::{DeviceScript, Reply, ScriptedConnector};
    use crate::snmp::{VarBind, VarBindError};
    use crate::storage::{MemoryStore, StoreError};
    use async_trait::async_trait;

    fn scalars_ok() -> Reply {
        Reply::Ok(vec![
            VarBind::ok("1.3.6.1.2.1.1.1.0", "Linux srv 6.1.0"),
            VarBind::ok("1.3.6.1.4.1.2021.10.1.3.1", "0.42"),
            VarBind::ok("1.3.6.1.4.1.2021.4.6.0", "812344"),
        ])
    }

    fn disk_pages() -> Vec<Reply> {
        vec![
            Reply::Ok(vec![
                VarBind::ok("1.3.6.1.4.1.2021.9.1.1.1", "1"),
                VarBind::ok("1.3.6.1.4.1.2021.9.1.2.1", "/"),
                VarBind::ok("1.3.6.1.4.1.2021.9.1.6.1", "20509264"),
            ]),
            Reply::Ok(vec![
                VarBind::ok("1.3.6.1.4.1.2021.9.1.7.1", "12139184"),
                VarBind::ok("1.3.6.1.4.1.2021.9.1.8.1", "7305128"),
                VarBind::ok("1.3.6.1.4.1.2021.9.1.9.1", "38"),
                VarBind::ok("1.3.6.1.4.1.2021.10.1.1.1", "1"),
            ]),
        ]
    }

    fn collector(connector: ScriptedConnector, sink: Arc<dyn Sink>, targets: &[&str]) -> SnmpCollector {
        SnmpCollector::new(
            targets.iter().map(|t| t.to_string()).collect(),
            Arc::new(connector),
            sink,
            20,
        )
    }

    #[tokio::test]
    async fn scalar_names_follow_request_order() {
        let connector =
            ScriptedConnector::new().device("A", DeviceScript::default().with_get(scalars_ok()));
        let store = Arc::new(MemoryStore::new());

        let report = collector(connector, store.clone(), &["A"]).run_cycle(1).await;

        let scalars = store.scalar_readings();
        let names: Vec<_> = scalars.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A:OS", "A:CPU", "A:RAM free"]);
        assert!(scalars.iter().all(|r| !r.value.is_empty()));
        assert_eq!(scalars[1].oid, "1.3.6.1.4.1.2021.10.1.3.1");
        assert_eq!(report.scalar_records, 3);
    }

    #[tokio::test]
    async fn erroneous_varbind_is_skipped() {
        let get = Reply::Ok(vec![
            VarBind::ok("1.3.6.1.2.1.1.1.0", "Linux"),
            VarBind::error("1.3.6.1.4.1.2021.10.1.3.1", VarBindError::NoSuchInstance),
            VarBind::ok("1.3.6.1.4.1.2021.4.6.0", "1024"),
        ]);
        let connector = ScriptedConnector::new().device("A", DeviceScript::default().with_get(get));
        let store = Arc::new(MemoryStore::new());

        let report = collector(connector, store.clone(), &["A"]).run_cycle(1).await;

        let names: Vec<_> = store.scalar_readings().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["A:OS".to_string(), "A:RAM free".to_string()]);
        assert_eq!(report.failed_branches, 0);
    }

    #[tokio::test]
    async fn null_value_is_stored_as_empty_string() {
        let get = Reply::Ok(vec![VarBind::ok("1.3.6.1.2.1.1.1.0", "")]);
        let connector = ScriptedConnector::new().device("A", DeviceScript::default().with_get(get));
        let store = Arc::new(MemoryStore::new());

        collector(connector, store.clone(), &["A"]).run_cycle(1).await;

        let scalars = store.scalar_readings();
        assert_eq!(scalars.len(), 1);
        assert_eq!(scalars[0].value, "");
    }

    #[tokio::test]
    async fn disk_walk_is_classified_and_stored() {
        let connector = ScriptedConnector::new().device("A", DeviceScript::default().with_bulk(disk_pages()));
        let store = Arc::new(MemoryStore::new());

        let report = collector(connector, store.clone(), &["A"]).run_cycle(1).await;

        let disks = store.disk_readings();
        let types: Vec<_> = disks.iter().map(|r| r.metric_type).collect();
        assert_eq!(
            types,
            vec![
                MetricType::Unknown,
                MetricType::Path,
                MetricType::TotalKb,
                MetricType::AvailableKb,
                MetricType::UsedKb,
                MetricType::PercentUsed,
            ]
        );
        assert_eq!(disks[3].name, "A:Disk:available_kb");
        assert_eq!(disks[3].ip, "A");
        assert_eq!(disks[3].value, "12139184");
        assert!(disks.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        assert_eq!(report.disk_records, 6);
    }

    #[tokio::test]
    async fn walk_failure_keeps_streamed_entries() {
        let mut pages = disk_pages();
        pages[1] = Reply::Fail;
        let connector = ScriptedConnector::new().device("A", DeviceScript::default().with_bulk(pages));
        let store = Arc::new(MemoryStore::new());

        let report = collector(connector, store.clone(), &["A"]).run_cycle(1).await;

        assert_eq!(store.disk_readings().len(), 3);
        assert_eq!(report.failed_branches, 1);
    }

    #[tokio::test]
    async fn transport_failure_on_one_target_does_not_block_others() {
        let connector = ScriptedConnector::new()
            .device(
                "10.0.0.1",
                DeviceScript::default()
                    .with_get(Reply::Fail)
                    .with_bulk(disk_pages()),
            )
            .device(
                "10.0.0.2",
                DeviceScript::default()
                    .with_get(scalars_ok())
                    .with_bulk(disk_pages()),
            );
        let connector = Arc::new(connector);
        let store = Arc::new(MemoryStore::new());
        let collector = SnmpCollector::new(
            vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()],
            connector.clone(),
            store.clone(),
            20,
        );

        let report = collector.run_cycle(1).await;

        let scalars = store.scalar_readings();
        assert!(scalars.iter().all(|r| r.name.starts_with("10.0.0.2:")));
        assert_eq!(scalars.len(), 3);

        let disks = store.disk_readings();
        assert_eq!(disks.iter().filter(|r| r.ip == "10.0.0.1").count(), 6);
        assert_eq!(disks.iter().filter(|r| r.ip == "10.0.0.2").count(), 6);

        let requests = connector.requests();
        for address in ["10.0.0.1", "10.0.0.2"] {
            assert!(requests.iter().any(|r| r.starts_with(&format!("{} get", address))));
            assert!(requests.iter().any(|r| r.starts_with(&format!("{} bulk", address))));
        }

        assert_eq!(report.targets, 2);
        assert_eq!(report.failed_branches, 1);
    }

    #[tokio::test]
    async fn unreachable_target_fails_both_branches() {
        let store = Arc::new(MemoryStore::new());
        let report = collector(ScriptedConnector::new(), store.clone(), &["nowhere"])
            .run_cycle(1)
            .await;

        assert_eq!(report.failed_branches, 2);
        assert_eq!(store.count(), 0);
    }

    /// Отказывает в записи CPU, остальное пишет в память
    struct RejectCpu(MemoryStore);

    #[async_trait]
    impl Sink for RejectCpu {
        async fn write(&self, reading: &Reading) -> Result<(), StoreError> {
            if reading.name().ends_with(":CPU") {
                return Err(StoreError::Unavailable("disk full".to_string()));
            }
            self.0.write(reading).await
        }
    }

    #[tokio::test]
    async fn write_failure_does_not_block_sibling_writes() {
        let connector = ScriptedConnector::new().device("A", DeviceScript::default().with_get(scalars_ok()));
        let sink = Arc::new(RejectCpu(MemoryStore::new()));

        let report = collector(connector, sink.clone(), &["A"]).run_cycle(1).await;

        let names: Vec<_> = sink.0.scalar_readings().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["A:OS".to_string(), "A:RAM free".to_string()]);
        assert_eq!(report.failed_writes, 1);
        assert_eq!(report.scalar_records, 2);
    }
}
