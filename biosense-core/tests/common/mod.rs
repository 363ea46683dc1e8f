//! Common fixtures for integration tests
//!
//! This module provides:
//! - Journaling mock peripherals (`devices`)
//! - A mock board wiring them into a `HealthMonitor`
//! - Estimators that record the windows they were handed

#![allow(dead_code)]

pub mod devices;

use std::cell::RefCell;
use std::rc::Rc;

use biosense_core::{
    config::MonitorConfig,
    ecg::HeartRateRecord,
    monitor::{Board, BoardParts, HealthMonitor},
    time::MockTimeSource,
    traits::EstimationResult,
};

use devices::{
    never, FailWhen, Journal, MockDelay, MockEcg, MockHost, MockPmic, MockPulseOx, ScriptedReady,
};

/// Board made of journaling mocks
pub struct MockBoard;

impl Board for MockBoard {
    type Power = MockPmic;
    type PulseOx = MockPulseOx;
    type Biopotential = MockEcg;
    type Host = MockHost;
    type Ready = ScriptedReady;
    type Delay = MockDelay;
    type Clock = MockTimeSource;
}

/// Per-peripheral failure injection
#[derive(Clone, Copy)]
pub struct Faults {
    pub pmic: FailWhen,
    pub host: FailWhen,
    pub pulse_ox: FailWhen,
    pub ecg: FailWhen,
}

impl Default for Faults {
    fn default() -> Self {
        Self { pmic: never, host: never, pulse_ox: never, ecg: never }
    }
}

/// Mock board parts sharing one journal
pub fn board_parts(journal: &Journal, faults: Faults) -> BoardParts<MockBoard> {
    BoardParts {
        power: MockPmic { journal: journal.clone(), fail_when: faults.pmic },
        pulse_ox: MockPulseOx {
            journal: journal.clone(),
            fail_when: faults.pulse_ox,
            fail_read_at: None,
            reads: 0,
        },
        biopotential: MockEcg {
            journal: journal.clone(),
            fail_when: faults.ecg,
            record: HeartRateRecord { rtor: 0x40, fmstr: 0 },
        },
        host: MockHost { journal: journal.clone(), fail_when: faults.host },
        ready: ScriptedReady::unlimited(journal.clone()),
        delay: MockDelay { journal: journal.clone() },
        clock: MockTimeSource::stepping(0, 1),
    }
}

/// Windows seen by a [`recording_estimator`]
pub type SeenWindows = Rc<RefCell<Vec<(Vec<u32>, Vec<u32>)>>>;

/// Estimator that keeps a copy of every `(ir, red)` window
///
/// Reports the newest red value as heart rate and the window length as SpO2
/// so a test can tell which window produced a result.
pub fn recording_estimator() -> (impl Fn(&[u32], &[u32]) -> EstimationResult, SeenWindows) {
    let seen: SeenWindows = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let estimator = move |ir: &[u32], red: &[u32]| {
        sink.borrow_mut().push((ir.to_vec(), red.to_vec()));
        EstimationResult {
            spo2: red.len() as u32,
            spo2_valid: true,
            heart_rate: red.last().copied().unwrap_or(0),
            heart_rate_valid: false,
        }
    };
    (estimator, seen)
}

/// Monitor on a mock board with the firmware defaults
pub fn monitor(
    journal: &Journal,
    faults: Faults,
    config: MonitorConfig,
) -> (HealthMonitor<MockBoard, impl Fn(&[u32], &[u32]) -> EstimationResult>, SeenWindows) {
    let (estimator, seen) = recording_estimator();
    (HealthMonitor::new(board_parts(journal, faults), estimator, config), seen)
}
