//! Host Interrupt Priorities
//!
//! Numeric priorities for the host interrupt controller. Lower numbers are
//! more urgent (NVIC convention).

/// Number of GPIO port interrupts on the host (ports 0 through 6).
pub const GPIO_PORT_COUNT: u8 = 7;

/// Priority shared by every GPIO port interrupt.
pub const GPIO_PORT_PRIORITY: u8 = 5;

/// Priority of the biopotential front end's transport (SPI1).
///
/// Must stay strictly below [`GPIO_PORT_PRIORITY`]: the biopotential interrupt
/// handlers run SPI transfers, and a GPIO handler at equal or higher urgency
/// would stall them.
pub const BIOPOTENTIAL_TRANSPORT_PRIORITY: u8 = 0;

/// SPI peripheral index used by the biopotential front end.
pub const BIOPOTENTIAL_SPI_INDEX: u8 = 1;

/// Maximum entries in a priority plan.
pub const MAX_PRIORITY_ENTRIES: usize = 16;
