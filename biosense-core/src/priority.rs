//! Host Interrupt Priority Plan
//!
//! The biopotential front end's interrupt handlers run SPI transfers. If any
//! GPIO port interrupt were as urgent as the SPI peripheral, a GPIO handler
//! could preempt a transfer that the biopotential handler is blocked on.
//! Bring-up therefore assigns every GPIO port a uniform lower priority and the
//! biopotential transport the most urgent one.
//!
//! A [`PriorityPlan`] holds the assignments and is checked before anything is
//! written to the controller.

use heapless::Vec;

use crate::constants::interrupts::{
    BIOPOTENTIAL_SPI_INDEX, BIOPOTENTIAL_TRANSPORT_PRIORITY, GPIO_PORT_COUNT, GPIO_PORT_PRIORITY,
    MAX_PRIORITY_ENTRIES,
};
use crate::errors::{PriorityError, PriorityResult};
use crate::traits::{HostIrq, InterruptController};

/// Ordered priority assignments for the host interrupt controller
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PriorityPlan {
    transport: HostIrq,
    entries: Vec<(HostIrq, u8), MAX_PRIORITY_ENTRIES>,
}

impl PriorityPlan {
    /// Empty plan protecting `transport`
    pub fn new(transport: HostIrq) -> Self {
        Self { transport, entries: Vec::new() }
    }

    /// GPIO ports 0..=6 at 5, SPI1 at 0
    pub fn firmware_default() -> Self {
        let mut plan = Self::new(HostIrq::Spi(BIOPOTENTIAL_SPI_INDEX));
        for port in 0..GPIO_PORT_COUNT {
            // 8 entries always fit
            let _ = plan.assign(HostIrq::GpioPort(port), GPIO_PORT_PRIORITY);
        }
        let _ = plan.assign(plan.transport, BIOPOTENTIAL_TRANSPORT_PRIORITY);
        plan
    }

    /// Set the priority of `irq`, replacing any earlier assignment
    pub fn assign(&mut self, irq: HostIrq, priority: u8) -> PriorityResult<()> {
        if let Some(entry) = self.entries.iter_mut().find(|(i, _)| *i == irq) {
            entry.1 = priority;
            return Ok(());
        }
        self.entries
            .push((irq, priority))
            .map_err(|_| PriorityError::PlanFull)
    }

    /// Builder form of [`assign`](Self::assign)
    pub fn with(mut self, irq: HostIrq, priority: u8) -> PriorityResult<Self> {
        self.assign(irq, priority)?;
        Ok(self)
    }

    /// The protected biopotential transport interrupt
    pub fn transport(&self) -> HostIrq {
        self.transport
    }

    /// Planned priority of `irq`
    pub fn priority_of(&self, irq: HostIrq) -> Option<u8> {
        self.entries.iter().find(|(i, _)| *i == irq).map(|&(_, p)| p)
    }

    /// Assignments in write order
    pub fn entries(&self) -> &[(HostIrq, u8)] {
        &self.entries
    }

    /// Check that the transport is strictly more urgent than every GPIO port
    ///
    /// A plan that does not assign the transport at all has nothing to
    /// protect and passes.
    pub fn validate(&self) -> PriorityResult<()> {
        let Some(transport_priority) = self.priority_of(self.transport) else {
            return Ok(());
        };

        let inverted = self.entries.iter().find(|(irq, priority)| {
            matches!(irq, HostIrq::GpioPort(_)) && *priority <= transport_priority
        });

        match inverted {
            Some(&(irq, priority)) => Err(PriorityError::Inversion {
                irq,
                priority,
                transport_priority,
            }),
            None => Ok(()),
        }
    }

    /// Validate, then write every assignment
    ///
    /// Nothing is written if validation fails. Rejected writes do not stop the
    /// remaining ones.
    pub fn apply<H: InterruptController>(&self, host: &mut H) -> PriorityResult<()> {
        self.validate()?;

        let mut failed = 0;
        for &(irq, priority) in &self.entries {
            if let Err(e) = host.set_priority(irq, priority) {
                log_warn!("priority {} for {:?} rejected: {:?}", priority, irq, e);
                failed += 1;
            }
        }

        if failed == 0 {
            log_debug!("applied {} interrupt priorities", self.entries.len());
            Ok(())
        } else {
            Err(PriorityError::Rejected { failed })
        }
    }
}

impl Default for PriorityPlan {
    fn default() -> Self {
        Self::firmware_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::InterruptLine;

    #[derive(Default)]
    struct RecordingNvic {
        writes: std::vec::Vec<(HostIrq, u8)>,
        reject: Option<HostIrq>,
    }

    impl InterruptController for RecordingNvic {
        type Error = ();

        fn set_priority(&mut self, irq: HostIrq, priority: u8) -> Result<(), ()> {
            if self.reject == Some(irq) {
                return Err(());
            }
            self.writes.push((irq, priority));
            Ok(())
        }

        fn mask(&mut self, _: InterruptLine) {}
        fn unmask(&mut self, _: InterruptLine) {}
        fn arm(&mut self, _: InterruptLine) -> Result<(), ()> {
            Ok(())
        }
    }

    #[test]
    fn firmware_default_layout() {
        let plan = PriorityPlan::firmware_default();

        assert_eq!(plan.entries().len(), 8);
        for port in 0..7 {
            assert_eq!(plan.priority_of(HostIrq::GpioPort(port)), Some(5));
        }
        assert_eq!(plan.priority_of(HostIrq::Spi(1)), Some(0));
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn equal_priority_is_an_inversion() {
        let plan = PriorityPlan::firmware_default()
            .with(HostIrq::GpioPort(4), 0)
            .unwrap();

        assert_eq!(
            plan.validate(),
            Err(PriorityError::Inversion {
                irq: HostIrq::GpioPort(4),
                priority: 0,
                transport_priority: 0,
            })
        );
    }

    #[test]
    fn inverted_plan_writes_nothing() {
        let plan = PriorityPlan::firmware_default()
            .with(HostIrq::Spi(1), 6)
            .unwrap();
        let mut nvic = RecordingNvic::default();

        assert!(plan.apply(&mut nvic).is_err());
        assert!(nvic.writes.is_empty());
    }

    #[test]
    fn rejected_writes_are_counted() {
        let plan = PriorityPlan::firmware_default();
        let mut nvic = RecordingNvic { reject: Some(HostIrq::GpioPort(2)), ..Default::default() };

        assert_eq!(plan.apply(&mut nvic), Err(PriorityError::Rejected { failed: 1 }));
        assert_eq!(nvic.writes.len(), 7);
        assert_eq!(nvic.writes.last(), Some(&(HostIrq::Spi(1), 0)));
    }

    #[test]
    fn plan_capacity() {
        let mut plan = PriorityPlan::new(HostIrq::Spi(0));
        for port in 0..MAX_PRIORITY_ENTRIES as u8 {
            plan.assign(HostIrq::GpioPort(port), 5).unwrap();
        }
        assert_eq!(plan.assign(HostIrq::Spi(0), 0), Err(PriorityError::PlanFull));
    }
}
