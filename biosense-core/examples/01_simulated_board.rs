//! Simulated Board Example
//!
//! Runs the full acquisition flow against a software board: bring-up,
//! SpO2 / heart-rate refreshes from a synthetic PPG, ECG routing and an
//! interrupt dispatch.
//!
//! ## What You'll Learn
//!
//! - Describing a board's peripherals with the `Board` trait
//! - Feeding the sampler from an interrupt-style `ReadyCounter`
//! - Reading a bring-up report and its status code
//! - Dispatching a MAX30001 status word to event sources
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 01_simulated_board
//! ```

use std::convert::Infallible;
use std::thread;
use std::time::Duration;

use biosense_core::{
    ecg::{
        BiasClockConfig, BiozConfig, CalibrationConfig, EcgChannelConfig, HeartRateRecord,
        PaceConfig, RtoRConfig,
    },
    routing::RouteRegisters,
    time::SystemTime,
    traits::{
        BiopotentialFrontEnd, EstimationResult, HostIrq, InterruptController, LedChannel,
        PowerManager, PulseOxFrontEnd,
    },
    Board, BoardParts, EventSource, HealthMonitor, InterruptLine, MonitorConfig, OpticalSample,
    ReadyCounter,
};
use embedded_hal::delay::DelayNs;

/// Sample-ready edges, as an interrupt handler would count them
static PPG_READY: ReadyCounter = ReadyCounter::new(32);

/// 100 samples per second
const SAMPLE_RATE_HZ: f32 = 100.0;

struct SimPmic;

impl PowerManager for SimPmic {
    type Error = Infallible;

    fn init(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn set_boost_enabled(&mut self, enabled: bool) -> Result<(), Infallible> {
        println!("  boost enabled: {}", enabled);
        Ok(())
    }

    fn set_boost_voltage(&mut self, millivolts: u16) -> Result<(), Infallible> {
        println!("  boost voltage: {} mV", millivolts);
        Ok(())
    }
}

/// Synthetic PPG at 72 bpm with a red/IR ratio that reads as about 97%
struct SimPulseOx {
    n: u32,
}

impl PulseOxFrontEnd for SimPulseOx {
    type Error = Infallible;

    fn set_mode(&mut self, bits: u8) -> Result<(), Infallible> {
        println!("  MODE_CONFIG   <- {:#04x}", bits);
        Ok(())
    }

    fn set_fifo_config(&mut self, bits: u8) -> Result<(), Infallible> {
        println!("  FIFO_CONFIG   <- {:#04x}", bits);
        Ok(())
    }

    fn set_spo2_config(&mut self, bits: u8) -> Result<(), Infallible> {
        println!("  SPO2_CONFIG   <- {:#04x}", bits);
        Ok(())
    }

    fn enable_interrupts(&mut self, bits: u16) -> Result<(), Infallible> {
        println!("  INT_ENABLE    <- {:#06x}", bits);
        Ok(())
    }

    fn set_led_amplitude(&mut self, channel: LedChannel, amplitude: u8) -> Result<(), Infallible> {
        println!("  LED {:?} amplitude <- {:#04x}", channel, amplitude);
        Ok(())
    }

    fn read_fifo(&mut self) -> Result<OpticalSample, Infallible> {
        let t = self.n as f32 / SAMPLE_RATE_HZ;
        let pulse = (2.0 * std::f32::consts::PI * 1.2 * t).sin();
        self.n += 1;
        let red = 80_000.0 + 400.0 * pulse;
        let ir = 100_000.0 + 1_000.0 * pulse;
        Ok(OpticalSample::new(red as u32, ir as u32))
    }
}

struct SimEcg;

impl BiopotentialFrontEnd for SimEcg {
    type Error = Infallible;

    fn start_master_clock(&mut self) -> Result<(), Infallible> { Ok(()) }
    fn software_reset(&mut self) -> Result<(), Infallible> { Ok(()) }

    fn write_interrupt_routes(&mut self, routes: RouteRegisters) -> Result<(), Infallible> {
        println!("  EN_INT  <- {:#08x}", routes.en_int);
        println!("  EN_INT2 <- {:#08x}", routes.en_int2);
        Ok(())
    }

    fn init_calibration(&mut self, _: &CalibrationConfig) -> Result<(), Infallible> { Ok(()) }
    fn init_ecg(&mut self, _: &EcgChannelConfig) -> Result<(), Infallible> { Ok(()) }
    fn init_pace(&mut self, _: &PaceConfig) -> Result<(), Infallible> { Ok(()) }
    fn init_bioz(&mut self, _: &BiozConfig) -> Result<(), Infallible> { Ok(()) }
    fn init_rtor(&mut self, _: &RtoRConfig) -> Result<(), Infallible> { Ok(()) }
    fn init_bias_clock(&mut self, _: &BiasClockConfig) -> Result<(), Infallible> { Ok(()) }
    fn allow_interrupts(&mut self, _: bool) -> Result<(), Infallible> { Ok(()) }

    fn read_heart_rate(&mut self) -> Result<HeartRateRecord, Infallible> {
        // 833 ms between R peaks in 7.8 ms ticks
        Ok(HeartRateRecord { rtor: 107, fmstr: 0 })
    }
}

struct SimNvic;

impl InterruptController for SimNvic {
    type Error = Infallible;

    fn set_priority(&mut self, irq: HostIrq, priority: u8) -> Result<(), Infallible> {
        println!("  {:?} -> priority {}", irq, priority);
        Ok(())
    }

    fn mask(&mut self, _: InterruptLine) {}
    fn unmask(&mut self, _: InterruptLine) {}
    fn arm(&mut self, _: InterruptLine) -> Result<(), Infallible> { Ok(()) }
}

struct SleepDelay;

impl DelayNs for SleepDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

struct SimBoard;

impl Board for SimBoard {
    type Power = SimPmic;
    type PulseOx = SimPulseOx;
    type Biopotential = SimEcg;
    type Host = SimNvic;
    type Ready = &'static ReadyCounter;
    type Delay = SleepDelay;
    type Clock = SystemTime;
}

/// Mean crossings for heart rate and the AC/DC ratio of ratios for SpO2
fn estimate(ir: &[u32], red: &[u32]) -> EstimationResult {
    fn ac_dc(channel: &[u32]) -> (f32, f32) {
        let dc = channel.iter().map(|&v| v as f32).sum::<f32>() / channel.len().max(1) as f32;
        let (lo, hi) = channel
            .iter()
            .fold((u32::MAX, 0), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        ((hi.saturating_sub(lo)) as f32, dc)
    }

    let (ir_ac, ir_dc) = ac_dc(ir);
    let (red_ac, red_dc) = ac_dc(red);
    let crossings = ir
        .windows(2)
        .filter(|w| (w[0] as f32) < ir_dc && (w[1] as f32) >= ir_dc)
        .count() as u32;
    let seconds = ir.len() as u32 / SAMPLE_RATE_HZ as u32;

    if ir_ac == 0.0 || red_dc == 0.0 || seconds == 0 {
        return EstimationResult::default();
    }
    let ratio = (red_ac / red_dc) / (ir_ac / ir_dc);
    EstimationResult {
        spo2: (110.0 - 25.0 * ratio) as u32,
        spo2_valid: true,
        heart_rate: crossings * 60 / seconds,
        heart_rate_valid: true,
    }
}

fn main() {
    println!("biosense Simulated Board Example");
    println!("================================\n");

    // Stand-in for the sample-ready ISR
    thread::spawn(|| loop {
        PPG_READY.notify();
        thread::sleep(Duration::from_micros(200));
    });

    let parts = BoardParts::<SimBoard> {
        power: SimPmic,
        pulse_ox: SimPulseOx { n: 0 },
        biopotential: SimEcg,
        host: SimNvic,
        ready: &PPG_READY,
        delay: SleepDelay,
        clock: SystemTime::new(),
    };
    let mut health = HealthMonitor::new(parts, estimate, MonitorConfig::default());

    println!("Bring-up:");
    let report = health.init();
    println!("  -> {} (status {})\n", report, report.status_code());

    println!("ECG bring-up:");
    let report = health.init_ecg();
    println!("  -> {} (status {})\n", report, report.status_code());

    println!("Vital signs (first read primes the 500-sample window):");
    for refresh in 0..3 {
        match health.read_spo2() {
            Ok(vitals) => println!(
                "  refresh {}: SpO2={}% HR={} bpm",
                refresh, vitals.spo2, vitals.heart_rate
            ),
            Err(e) => println!("  refresh {} failed: {}", refresh, e),
        }
    }
    println!("  dropped ready edges: {}\n", PPG_READY.overruns());

    println!("Interrupt dispatch:");
    let status = EventSource::RtoR.mask() | EventSource::LeadOn.mask();
    for line in InterruptLine::BOTH {
        health.dispatch(line, status, |source| println!("  {:?} -> {:?}", line, source));
    }

    let mut record = [0u8; 8];
    if let Ok(written) = health.read_ecg(&mut record) {
        println!("\nHeart-rate record ({} bytes): {:02x?}", written, record);
    }
}
