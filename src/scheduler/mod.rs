//! Планировщик опроса.
//!
//! Тики идут с фиксированным интервалом; тик принимается, только если
//! предыдущий цикл уже освободил guard. Если цикл держит guard дольше
//! `watchdog_ticks` тиков подряд, он отменяется через свой
//! `CancellationToken`, после чего планировщик либо завершается с
//! [`PollError::Stalled`], либо (при `watchdog_restart`) продолжает работу.

use std::sync::Arc;
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Duration, Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

pub mod guard;

pub use guard::{SingleFlight, TickDecision};

use crate::collector::{CycleReport, SnmpCollector};
use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum PollError {
    #[error("SNMP цикл {cycle} не завершился за {missed} тиков, опрос остановлен")]
    Stalled { cycle: u64, missed: u32 },
}

#[derive(Debug)]
pub enum CycleOutcome {
    Completed(CycleReport),
    Cancelled,
}

struct InFlight {
    cycle: u64,
    cancel: CancellationToken,
    handle: JoinHandle<CycleOutcome>,
}

impl InFlight {
    async fn cancel(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            tracing::error!(cycle = self.cycle, error = %e, "задача цикла упала при отмене");
        }
        tracing::warn!(cycle = self.cycle, "SNMP цикл отменен");
    }
}

pub struct Scheduler {
    collector: Arc<SnmpCollector>,
    interval: Duration,
    guard: SingleFlight,
    restart_on_stall: bool,
}

impl Scheduler {
    pub fn new(collector: Arc<SnmpCollector>, config: &AppConfig) -> Self {
        Self {
            collector,
            interval: config.poll_interval,
            guard: SingleFlight::new(config.watchdog_ticks),
            restart_on_stall: config.watchdog_restart,
        }
    }

    pub async fn run(mut self, shutdown: CancellationToken) -> Result<(), PollError> {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut in_flight: Option<InFlight> = None;

        tracing::info!(
            interval_secs = self.interval.as_secs(),
            targets = self.collector.targets().len(),
            "SNMP опрос запущен"
        );

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    if let Some(current) = in_flight.take() {
                        current.cancel().await;
                    }
                    tracing::info!("SNMP опрос остановлен");
                    return Ok(());
                }

                joined = wait_in_flight(&mut in_flight) => {
                    if let Some(finished) = in_flight.take() {
                        self.guard.release(finished.cycle);
                        log_outcome(finished.cycle, joined);
                    }
                }

                _ = ticker.tick() => match self.guard.on_tick() {
                    TickDecision::Admit { cycle } => {
                        in_flight = Some(self.spawn_cycle(cycle));
                    }
                    TickDecision::Skip { cycle, missed } => {
                        tracing::warn!(cycle, missed, "предыдущий SNMP цикл еще идет, тик пропущен");
                    }
                    TickDecision::Stalled { cycle, missed } => {
                        tracing::error!(cycle, missed, "SNMP операция идет слишком долго, цикл прерывается");
                        if let Some(current) = in_flight.take() {
                            current.cancel().await;
                        }

                        if !self.restart_on_stall {
                            return Err(PollError::Stalled { cycle, missed });
                        }
                        self.guard.reset();
                    }
                },
            }
        }
    }

    fn spawn_cycle(&self, cycle: u64) -> InFlight {
        tracing::info!(cycle, "SNMP цикл запущен");

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let collector = Arc::clone(&self.collector);

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => CycleOutcome::Cancelled,
                report = collector.run_cycle(cycle) => CycleOutcome::Completed(report),
            }
        });

        InFlight {
            cycle,
            cancel,
            handle,
        }
    }
}

async fn wait_in_flight(in_flight: &mut Option<InFlight>) -> Result<CycleOutcome, JoinError> {
    match in_flight {
        Some(current) => (&mut current.handle).await,
        None => std::future::pending().await,
    }
}

fn log_outcome(cycle: u64, joined: Result<CycleOutcome, JoinError>) {
    match joined {
        Ok(CycleOutcome::Completed(report)) => tracing::info!(
            cycle,
            targets = report.targets,
            scalar_records = report.scalar_records,
            disk_records = report.disk_records,
            failed_branches = report.failed_branches,
            failed_writes = report.failed_writes,
            "SNMP цикл завершен"
        ),
        Ok(CycleOutcome::Cancelled) => tracing::warn!(cycle, "SNMP цикл отменен"),
        Err(e) => tracing::error!(cycle, error = %e, "задача цикла упала"),
    }
}

/// Запускает планировщик в отдельной задаче, если опрос включен
pub fn start(
    config: &AppConfig,
    collector: Arc<SnmpCollector>,
    shutdown: CancellationToken,
) -> Option<JoinHandle<Result<(), PollError>>> {
    if !config.polling_enabled {
        tracing::info!("SNMP опрос отключен переменной окружения 'SNMP_POLLING'");
        return None;
    }

    let scheduler = Scheduler::new(collector, config);
    Some(tokio::spawn(scheduler.run(shutdown)))
}
