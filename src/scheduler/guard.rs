/// Состояние опроса с точки зрения планировщика
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Running { cycle: u64 },
}

/// Что делать с очередным тиком
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickDecision {
    /// Запустить новый цикл
    Admit { cycle: u64 },
    /// Предыдущий цикл еще идет, тик пропускается
    Skip { cycle: u64, missed: u32 },
    /// Цикл не освободил guard за отведенное число тиков
    Stalled { cycle: u64, missed: u32 },
}

/// Single-flight guard со счетчиком пропущенных тиков.
///
/// Принадлежит циклу планировщика и меняется только из него, поэтому
/// блокировки не нужны.
#[derive(Debug)]
pub struct SingleFlight {
    state: CycleState,
    missed: u32,
    threshold: u32,
    next_cycle: u64,
}

impl SingleFlight {
    pub fn new(threshold: u32) -> Self {
        Self {
            state: CycleState::Idle,
            missed: 0,
            threshold,
            next_cycle: 1,
        }
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn missed(&self) -> u32 {
        self.missed
    }

    pub fn on_tick(&mut self) -> TickDecision {
        match self.state {
            CycleState::Idle => {
                let cycle = self.next_cycle;
                self.next_cycle += 1;
                self.missed = 0;
                self.state = CycleState::Running { cycle };
                TickDecision::Admit { cycle }
            }
            CycleState::Running { cycle } => {
                self.missed += 1;
                if self.missed > self.threshold {
                    TickDecision::Stalled {
                        cycle,
                        missed: self.missed,
                    }
                } else {
                    TickDecision::Skip {
                        cycle,
                        missed: self.missed,
                    }
                }
            }
        }
    }

    /// Цикл завершился (успешно или нет).
    ///
    /// Счетчик не сбрасывается здесь: его обнуляет только принятый тик.
    pub fn release(&mut self, cycle: u64) {
        if self.state == (CycleState::Running { cycle }) {
            self.state = CycleState::Idle;
        }
    }

    /// Сброс после отмены зависшего цикла
    pub fn reset(&mut self) {
        self.state = CycleState::Idle;
        self.missed = 0;
    }
}
