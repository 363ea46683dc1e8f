//! Journaling mock peripherals
//!
//! Every mock appends what it was asked to do to a shared [`Journal`], so a
//! test can check the order of operations across chips and the host.
//! Failures are injected with a predicate over the journaled operation.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use biosense_core::{
    ecg::{
        BiasClockConfig, BiozConfig, CalibrationConfig, EcgChannelConfig, HeartRateRecord,
        PaceConfig, RtoRConfig,
    },
    routing::{InterruptLine, RouteRegisters},
    signal::ReadySignal,
    traits::{
        BiopotentialFrontEnd, HostIrq, InterruptController, LedChannel, PowerManager,
        PulseOxFrontEnd,
    },
    window::OpticalSample,
};
use embedded_hal::delay::DelayNs;

/// One peripheral operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    PmicInit,
    BoostEnable(bool),
    BoostVoltage(u16),
    Priority(HostIrq, u8),
    Mask(InterruptLine),
    Unmask(InterruptLine),
    Arm(InterruptLine),
    SetMode(u8),
    SetFifo(u8),
    SetSpo2(u8),
    EnableIrq(u16),
    LedAmplitude(LedChannel, u8),
    DelayMs(u32),
    Ready,
    ReadFifo,
    MasterClock,
    EcgReset,
    Routes(RouteRegisters),
    Calibration,
    EcgChannel,
    Pace,
    Bioz,
    RtoR,
    BiasClock,
    AllowInterrupts(bool),
    ReadHeartRate,
}

/// Shared, ordered operation log
#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<Op>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, op: Op) {
        self.0.borrow_mut().push(op);
    }

    pub fn ops(&self) -> Vec<Op> {
        self.0.borrow().clone()
    }

    /// Operations other than the per-sample `Ready` / `ReadFifo` pairs
    pub fn config_ops(&self) -> Vec<Op> {
        self.0
            .borrow()
            .iter()
            .copied()
            .filter(|op| !matches!(op, Op::Ready | Op::ReadFifo))
            .collect()
    }

    pub fn count(&self, op: Op) -> usize {
        self.0.borrow().iter().filter(|&&o| o == op).count()
    }

    pub fn position(&self, op: Op) -> Option<usize> {
        self.0.borrow().iter().position(|&o| o == op)
    }

    pub fn contains(&self, op: Op) -> bool {
        self.position(op).is_some()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// Predicate selecting operations that fail
pub type FailWhen = fn(&Op) -> bool;

pub fn never(_: &Op) -> bool {
    false
}

/// Error returned by every mock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError(pub Op);

fn run(journal: &Journal, fail_when: FailWhen, op: Op) -> Result<(), MockError> {
    journal.push(op);
    if fail_when(&op) {
        Err(MockError(op))
    } else {
        Ok(())
    }
}

/// MAX14720-style PMIC
pub struct MockPmic {
    pub journal: Journal,
    pub fail_when: FailWhen,
}

impl PowerManager for MockPmic {
    type Error = MockError;

    fn init(&mut self) -> Result<(), MockError> {
        run(&self.journal, self.fail_when, Op::PmicInit)
    }

    fn set_boost_enabled(&mut self, enabled: bool) -> Result<(), MockError> {
        run(&self.journal, self.fail_when, Op::BoostEnable(enabled))
    }

    fn set_boost_voltage(&mut self, millivolts: u16) -> Result<(), MockError> {
        run(&self.journal, self.fail_when, Op::BoostVoltage(millivolts))
    }
}

/// Host NVIC and GPIO edge configuration
pub struct MockHost {
    pub journal: Journal,
    pub fail_when: FailWhen,
}

impl InterruptController for MockHost {
    type Error = MockError;

    fn set_priority(&mut self, irq: HostIrq, priority: u8) -> Result<(), MockError> {
        run(&self.journal, self.fail_when, Op::Priority(irq, priority))
    }

    fn mask(&mut self, line: InterruptLine) {
        self.journal.push(Op::Mask(line));
    }

    fn unmask(&mut self, line: InterruptLine) {
        self.journal.push(Op::Unmask(line));
    }

    fn arm(&mut self, line: InterruptLine) -> Result<(), MockError> {
        run(&self.journal, self.fail_when, Op::Arm(line))
    }
}

/// MAX30101-style optical front end
///
/// Sample `n` (0-based, counted across the whole test) reads back as
/// [`sample_at(n)`](sample_at).
pub struct MockPulseOx {
    pub journal: Journal,
    pub fail_when: FailWhen,
    /// Fail the FIFO read with this 0-based index, once
    pub fail_read_at: Option<usize>,
    pub reads: usize,
}

/// Value of the `n`th sample produced by [`MockPulseOx`]
pub fn sample_at(n: usize) -> OpticalSample {
    OpticalSample::new(100_000 + n as u32, 200_000 + n as u32)
}

impl PulseOxFrontEnd for MockPulseOx {
    type Error = MockError;

    fn set_mode(&mut self, bits: u8) -> Result<(), MockError> {
        run(&self.journal, self.fail_when, Op::SetMode(bits))
    }

    fn set_fifo_config(&mut self, bits: u8) -> Result<(), MockError> {
        run(&self.journal, self.fail_when, Op::SetFifo(bits))
    }

    fn set_spo2_config(&mut self, bits: u8) -> Result<(), MockError> {
        run(&self.journal, self.fail_when, Op::SetSpo2(bits))
    }

    fn enable_interrupts(&mut self, bits: u16) -> Result<(), MockError> {
        run(&self.journal, self.fail_when, Op::EnableIrq(bits))
    }

    fn set_led_amplitude(&mut self, channel: LedChannel, value: u8) -> Result<(), MockError> {
        run(&self.journal, self.fail_when, Op::LedAmplitude(channel, value))
    }

    fn read_fifo(&mut self) -> Result<OpticalSample, MockError> {
        self.journal.push(Op::ReadFifo);
        if self.fail_read_at == Some(self.reads) {
            self.fail_read_at = None;
            return Err(MockError(Op::ReadFifo));
        }
        let sample = sample_at(self.reads);
        self.reads += 1;
        Ok(sample)
    }
}

/// MAX30001-style biopotential front end
pub struct MockEcg {
    pub journal: Journal,
    pub fail_when: FailWhen,
    pub record: HeartRateRecord,
}

impl BiopotentialFrontEnd for MockEcg {
    type Error = MockError;

    fn start_master_clock(&mut self) -> Result<(), MockError> {
        run(&self.journal, self.fail_when, Op::MasterClock)
    }

    fn software_reset(&mut self) -> Result<(), MockError> {
        run(&self.journal, self.fail_when, Op::EcgReset)
    }

    fn write_interrupt_routes(&mut self, routes: RouteRegisters) -> Result<(), MockError> {
        run(&self.journal, self.fail_when, Op::Routes(routes))
    }

    fn init_calibration(&mut self, _: &CalibrationConfig) -> Result<(), MockError> {
        run(&self.journal, self.fail_when, Op::Calibration)
    }

    fn init_ecg(&mut self, _: &EcgChannelConfig) -> Result<(), MockError> {
        run(&self.journal, self.fail_when, Op::EcgChannel)
    }

    fn init_pace(&mut self, _: &PaceConfig) -> Result<(), MockError> {
        run(&self.journal, self.fail_when, Op::Pace)
    }

    fn init_bioz(&mut self, _: &BiozConfig) -> Result<(), MockError> {
        run(&self.journal, self.fail_when, Op::Bioz)
    }

    fn init_rtor(&mut self, _: &RtoRConfig) -> Result<(), MockError> {
        run(&self.journal, self.fail_when, Op::RtoR)
    }

    fn init_bias_clock(&mut self, _: &BiasClockConfig) -> Result<(), MockError> {
        run(&self.journal, self.fail_when, Op::BiasClock)
    }

    fn allow_interrupts(&mut self, allow: bool) -> Result<(), MockError> {
        run(&self.journal, self.fail_when, Op::AllowInterrupts(allow))
    }

    fn read_heart_rate(&mut self) -> Result<HeartRateRecord, MockError> {
        run(&self.journal, self.fail_when, Op::ReadHeartRate)?;
        Ok(self.record)
    }
}

/// Ready signal with a shared indication budget
///
/// `None` in the budget means unlimited; `Some(k)` grants `k` more
/// indications and then reports `WouldBlock` until the test tops it up.
pub struct ScriptedReady {
    pub journal: Journal,
    pub budget: Rc<Cell<Option<usize>>>,
    /// Report a signal fault once this many indications were granted
    pub fault_after: Option<usize>,
    pub granted: usize,
}

impl ScriptedReady {
    pub fn unlimited(journal: Journal) -> Self {
        Self {
            journal,
            budget: Rc::new(Cell::new(None)),
            fault_after: None,
            granted: 0,
        }
    }

    pub fn limited(journal: Journal, budget: usize) -> (Self, Rc<Cell<Option<usize>>>) {
        let shared = Rc::new(Cell::new(Some(budget)));
        let ready = Self {
            journal,
            budget: Rc::clone(&shared),
            fault_after: None,
            granted: 0,
        };
        (ready, shared)
    }
}

impl ReadySignal for ScriptedReady {
    type Error = MockError;

    fn poll_ready(&mut self) -> nb::Result<(), MockError> {
        if self.fault_after == Some(self.granted) {
            return Err(nb::Error::Other(MockError(Op::Ready)));
        }
        match self.budget.get() {
            Some(0) => return Err(nb::Error::WouldBlock),
            Some(k) => self.budget.set(Some(k - 1)),
            None => {}
        }
        self.granted += 1;
        self.journal.push(Op::Ready);
        Ok(())
    }
}

/// Delay that only records what it was asked for
pub struct MockDelay {
    pub journal: Journal,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.journal.push(Op::DelayMs(ms));
    }
}
