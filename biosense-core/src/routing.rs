//! Interrupt Routing for the Biopotential Front End
//!
//! ## Overview
//!
//! The MAX30001 has fifteen independent interrupt sources and two open-drain
//! outputs, `INTB` and `INT2B`. Each source is enabled on at most one output;
//! a source enabled on neither never pulls a line low. This module models that
//! assignment as an [`InterruptRouteMap`] and applies it through an
//! [`InterruptRouter`] that owns the host-side sequencing.
//!
//! ```text
//!  EventSource ──► Route ──► EN_INT / EN_INT2 bit ──► INTB / INT2B pin ──► host GPIO
//!                   │
//!                   └── NoInterrupt: bit clear in both registers
//! ```
//!
//! ## Register Layout
//!
//! `EN_INT` (0x02) and `EN_INT2` (0x03) share one layout, and the `STATUS`
//! register (0x01) reports the same sources at the same bit positions:
//!
//! ```text
//! D23   D22   D21    D20       D19  D18  D17   D16   D15    D14  D13  D12   D11    D10   D9    ...  D1:D0
//! EINT  EOVF  FSTINT DCLOFFINT BINT BOVF BOVER BUNDR BCGMON PINT POVF PEDGE LONINT RRINT SAMP ...  INTB_TYPE
//! ```
//!
//! ## Applying a Map
//!
//! [`InterruptRouter::configure`] is the only way a map reaches the chip. It
//! masks both host lines, arms their handlers, writes both registers, and
//! unmasks only after the chip accepted the write. A failed write leaves the
//! lines masked and the router `Unconfigured`.
//!
//! ```rust
//! use biosense_core::routing::{EventSource, InterruptRouteMap, Route};
//!
//! let map = InterruptRouteMap::builder()
//!     .route(EventSource::RtoR, Route::LineA)
//!     .route(EventSource::DcLeadOff, Route::LineB)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(map.route(EventSource::RtoR), Route::LineA);
//! assert_eq!(map.route(EventSource::PaceEdge), Route::NoInterrupt);
//! ```

use core::convert::Infallible;

use crate::errors::{RoutingError, RoutingResult};
use crate::traits::{BiopotentialFrontEnd, InterruptController};

/// Number of routable event sources
pub const EVENT_SOURCE_COUNT: usize = 15;

/// Bit position of the first source (`EINT`) in `EN_INT` / `STATUS`
const FIRST_SOURCE_BIT: u32 = 23;

/// Mask of the `INTB_TYPE` field in `EN_INT` / `EN_INT2`
const LINE_MODE_MASK: u32 = 0b11;

/// Hardware event sources of the biopotential front end
///
/// Declared in register bit order, D23 first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventSource {
    /// ECG FIFO reached its threshold (`EINT`)
    EcgFifoThreshold,
    /// ECG FIFO overflowed (`EOVF`)
    EcgFifoOverflow,
    /// ECG fast-recovery mode engaged (`FSTINT`)
    FastRecovery,
    /// DC lead-off detected (`DCLOFFINT`)
    DcLeadOff,
    /// BioZ FIFO reached its threshold (`BINT`)
    BiozFifoThreshold,
    /// BioZ FIFO overflowed (`BOVF`)
    BiozFifoOverflow,
    /// BioZ signal above the upper range limit (`BOVER`)
    BiozOverRange,
    /// BioZ signal below the lower range limit (`BUNDR`)
    BiozUnderRange,
    /// BioZ current generator monitor tripped (`BCGMON`)
    BiozCurrentMonitor,
    /// Pace event FIFO has data (`PINT`)
    PaceEvent,
    /// Pace FIFO overflowed (`POVF`)
    PaceFifoOverflow,
    /// Pace edge detected (`PEDGE`)
    PaceEdge,
    /// Ultra-low-power lead-on detected (`LONINT`)
    LeadOn,
    /// New R-to-R interval available (`RRINT`)
    RtoR,
    /// Sample synchronization pulse (`SAMP`)
    SampleSync,
}

impl EventSource {
    /// Number of sources
    pub const COUNT: usize = EVENT_SOURCE_COUNT;

    /// Every source in register bit order
    pub const ALL: [EventSource; EVENT_SOURCE_COUNT] = [
        Self::EcgFifoThreshold,
        Self::EcgFifoOverflow,
        Self::FastRecovery,
        Self::DcLeadOff,
        Self::BiozFifoThreshold,
        Self::BiozFifoOverflow,
        Self::BiozOverRange,
        Self::BiozUnderRange,
        Self::BiozCurrentMonitor,
        Self::PaceEvent,
        Self::PaceFifoOverflow,
        Self::PaceEdge,
        Self::LeadOn,
        Self::RtoR,
        Self::SampleSync,
    ];

    /// Position in [`EventSource::ALL`]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Enable / status bit mask for this source
    pub const fn mask(self) -> u32 {
        1 << (FIRST_SOURCE_BIT - self as u32)
    }
}

/// Destination of one event source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Route {
    /// Drive `INTB`
    LineA,
    /// Drive `INT2B`
    LineB,
    /// Enabled on neither output
    #[default]
    NoInterrupt,
}

impl Route {
    /// Physical line for this route, if any
    pub const fn line(self) -> Option<InterruptLine> {
        match self {
            Self::LineA => Some(InterruptLine::LineA),
            Self::LineB => Some(InterruptLine::LineB),
            Self::NoInterrupt => None,
        }
    }
}

/// Physical interrupt output of the biopotential front end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterruptLine {
    /// `INTB`
    LineA,
    /// `INT2B`
    LineB,
}

impl InterruptLine {
    /// Both lines
    pub const BOTH: [InterruptLine; 2] = [Self::LineA, Self::LineB];

    /// Route that targets this line
    pub const fn route(self) -> Route {
        match self {
            Self::LineA => Route::LineA,
            Self::LineB => Route::LineB,
        }
    }
}

/// Electrical signaling mode of one output (`INTB_TYPE` / `INT2B_TYPE`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum LineMode {
    /// Output disabled
    Disabled = 0b00,
    /// Push-pull CMOS driver
    Cmos = 0b01,
    /// Open-drain NMOS, pull-up provided by the host
    ///
    /// Default for both lines. Vendor drivers name their default `ODNR` but
    /// encode it as `0b11` (internal pull-up enabled); boards that rely on
    /// the internal pull-up should select [`LineMode::OpenDrainPullup`].
    #[default]
    OpenDrainNoPullup = 0b10,
    /// Open-drain NMOS with the internal 125 kΩ pull-up
    OpenDrainPullup = 0b11,
}

impl LineMode {
    /// Field encoding
    pub const fn bits(self) -> u32 {
        self as u32
    }
}

/// Signaling mode of both outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LineModes {
    /// `INTB` mode
    pub line_a: LineMode,
    /// `INT2B` mode
    pub line_b: LineMode,
}

impl LineModes {
    /// Same mode on both lines
    pub const fn uniform(mode: LineMode) -> Self {
        Self { line_a: mode, line_b: mode }
    }

    /// Mode of `line`
    pub const fn get(&self, line: InterruptLine) -> LineMode {
        match line {
            InterruptLine::LineA => self.line_a,
            InterruptLine::LineB => self.line_b,
        }
    }
}

/// Encoded `EN_INT` / `EN_INT2` register words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteRegisters {
    /// `EN_INT` (0x02), drives `INTB`
    pub en_int: u32,
    /// `EN_INT2` (0x03), drives `INT2B`
    pub en_int2: u32,
}

/// Assignment of every event source to exactly one destination
///
/// Backed by a fixed array indexed by [`EventSource::index`], so a source can
/// never be missing or doubly assigned once the map exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InterruptRouteMap {
    routes: [Route; EVENT_SOURCE_COUNT],
}

impl InterruptRouteMap {
    /// Every source routed to `NoInterrupt`
    pub const fn new() -> Self {
        Self {
            routes: [Route::NoInterrupt; EVENT_SOURCE_COUNT],
        }
    }

    /// Start building a map; unnamed sources default to `NoInterrupt`
    pub fn builder() -> RouteMapBuilder {
        RouteMapBuilder::new()
    }

    /// Assignment used by the health-monitor firmware
    ///
    /// Lead and BioZ range faults go to `INT2B`; data-path events (ECG FIFO,
    /// pace, R-to-R) go to `INTB`.
    pub const fn firmware_default() -> Self {
        let mut routes = [Route::NoInterrupt; EVENT_SOURCE_COUNT];
        routes[EventSource::EcgFifoThreshold.index()] = Route::LineA;
        routes[EventSource::DcLeadOff.index()] = Route::LineB;
        routes[EventSource::BiozFifoThreshold.index()] = Route::LineB;
        routes[EventSource::BiozOverRange.index()] = Route::LineB;
        routes[EventSource::BiozUnderRange.index()] = Route::LineB;
        routes[EventSource::PaceEvent.index()] = Route::LineA;
        routes[EventSource::LeadOn.index()] = Route::LineB;
        routes[EventSource::RtoR.index()] = Route::LineA;
        Self { routes }
    }

    /// Destination of `source`
    pub const fn route(&self, source: EventSource) -> Route {
        self.routes[source.index()]
    }

    /// All `(source, route)` pairs in register order
    pub fn iter(&self) -> impl Iterator<Item = (EventSource, Route)> + '_ {
        EventSource::ALL.into_iter().map(move |s| (s, self.route(s)))
    }

    /// Sources that drive `line`
    pub fn sources_on(&self, line: InterruptLine) -> impl Iterator<Item = EventSource> + '_ {
        let target = line.route();
        self.iter().filter(move |&(_, r)| r == target).map(|(s, _)| s)
    }

    /// `true` if at least one source drives `line`
    pub fn is_line_used(&self, line: InterruptLine) -> bool {
        self.sources_on(line).next().is_some()
    }

    /// Encode into register words with the given line modes
    pub fn register_image(&self, modes: LineModes) -> RouteRegisters {
        let mut image = RouteRegisters {
            en_int: modes.line_a.bits() & LINE_MODE_MASK,
            en_int2: modes.line_b.bits() & LINE_MODE_MASK,
        };
        for (source, route) in self.iter() {
            match route {
                Route::LineA => image.en_int |= source.mask(),
                Route::LineB => image.en_int2 |= source.mask(),
                Route::NoInterrupt => {}
            }
        }
        image
    }
}

impl Default for InterruptRouteMap {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`InterruptRouteMap`]
///
/// Naming a source twice with the same destination is harmless; naming it
/// with two different destinations fails the build.
#[derive(Debug, Clone)]
pub struct RouteMapBuilder {
    routes: [Option<Route>; EVENT_SOURCE_COUNT],
    conflict: Option<EventSource>,
}

impl RouteMapBuilder {
    fn new() -> Self {
        Self {
            routes: [None; EVENT_SOURCE_COUNT],
            conflict: None,
        }
    }

    /// Assign `source` to `route`
    pub fn route(mut self, source: EventSource, route: Route) -> Self {
        let slot = &mut self.routes[source.index()];
        match *slot {
            Some(existing) if existing != route => {
                self.conflict.get_or_insert(source);
            }
            _ => *slot = Some(route),
        }
        self
    }

    /// Assign every source in `sources` to `route`
    pub fn route_all(self, sources: &[EventSource], route: Route) -> Self {
        sources.iter().fold(self, |b, &s| b.route(s, route))
    }

    /// Finish the map
    pub fn build(self) -> Result<InterruptRouteMap, RoutingError<Infallible>> {
        if let Some(event) = self.conflict {
            return Err(RoutingError::ConflictingRoute { event });
        }
        let mut map = InterruptRouteMap::new();
        for (slot, route) in map.routes.iter_mut().zip(self.routes) {
            *slot = route.unwrap_or_default();
        }
        Ok(map)
    }
}

/// Lifecycle of the routing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoutingState {
    /// No map applied, or the last attempt failed
    #[default]
    Unconfigured,
    /// A map is being written
    Configuring,
    /// The chip accepted the map
    Configured,
}

/// Applies route maps and dispatches asserted lines to event sources
#[derive(Debug, Default)]
pub struct InterruptRouter {
    state: RoutingState,
    active: Option<(InterruptRouteMap, LineModes)>,
}

impl InterruptRouter {
    /// Router with nothing applied
    pub const fn new() -> Self {
        Self {
            state: RoutingState::Unconfigured,
            active: None,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> RoutingState {
        self.state
    }

    /// Map and modes the chip is running with
    pub fn active(&self) -> Option<&(InterruptRouteMap, LineModes)> {
        self.active.as_ref()
    }

    /// Apply `routes` and `modes` to the chip
    ///
    /// Host lines are masked for the whole transaction and unmasked only on
    /// success, and only if at least one source drives them and their mode is
    /// not `Disabled`. No retry on failure.
    pub fn configure<D, H>(
        &mut self,
        device: &mut D,
        host: &mut H,
        routes: InterruptRouteMap,
        modes: LineModes,
    ) -> RoutingResult<(), D::Error>
    where
        D: BiopotentialFrontEnd,
        H: InterruptController,
    {
        for line in InterruptLine::BOTH {
            host.mask(line);
        }
        self.state = RoutingState::Configuring;
        self.active = None;

        for line in InterruptLine::BOTH {
            if let Err(e) = host.arm(line) {
                log_warn!("arming {:?} failed: {:?}", line, e);
                self.state = RoutingState::Unconfigured;
                return Err(RoutingError::HostLine { line });
            }
        }

        let image = routes.register_image(modes);
        if let Err(e) = device.write_interrupt_routes(image) {
            log_warn!("route map write failed: {:?}", e);
            self.state = RoutingState::Unconfigured;
            return Err(RoutingError::Device(e));
        }

        self.state = RoutingState::Configured;
        self.active = Some((routes, modes));

        for line in InterruptLine::BOTH {
            if modes.get(line) != LineMode::Disabled && routes.is_line_used(line) {
                host.unmask(line);
            }
        }
        log_debug!("interrupt routes applied: en_int={:#08x} en_int2={:#08x}", image.en_int, image.en_int2);
        Ok(())
    }

    /// Sources behind an assertion of `line`, given the chip `STATUS` word
    ///
    /// Only sources routed to `line` are reported; a status bit set for a
    /// source routed elsewhere or to `NoInterrupt` is ignored. Nothing is
    /// reported until a map has been applied.
    pub fn pending(&self, line: InterruptLine, status: u32) -> impl Iterator<Item = EventSource> + '_ {
        self.active
            .iter()
            .flat_map(move |(map, _)| map.sources_on(line))
            .filter(move |s| status & s.mask() != 0)
    }

    /// Call `handler` for every source behind an assertion of `line`
    ///
    /// Returns the number of handlers invoked.
    pub fn dispatch<F>(&self, line: InterruptLine, status: u32, mut handler: F) -> usize
    where
        F: FnMut(EventSource),
    {
        let mut count = 0;
        for source in self.pending(line, status) {
            handler(source);
            count += 1;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_follow_register_order() {
        assert_eq!(EventSource::EcgFifoThreshold.mask(), 1 << 23);
        assert_eq!(EventSource::RtoR.mask(), 1 << 10);
        assert_eq!(EventSource::SampleSync.mask(), 1 << 9);

        for (i, s) in EventSource::ALL.iter().enumerate() {
            assert_eq!(s.index(), i);
        }
    }

    #[test]
    fn omitted_sources_resolve_to_no_interrupt() {
        let map = InterruptRouteMap::builder()
            .route(EventSource::PaceEdge, Route::LineB)
            .build()
            .unwrap();

        let routed: usize = map.iter().filter(|(_, r)| *r != Route::NoInterrupt).count();
        assert_eq!(routed, 1);
        assert_eq!(map.route(EventSource::EcgFifoOverflow), Route::NoInterrupt);
    }

    #[test]
    fn conflicting_assignment_fails_build() {
        let result = InterruptRouteMap::builder()
            .route(EventSource::RtoR, Route::LineA)
            .route(EventSource::RtoR, Route::LineB)
            .build();

        assert_eq!(result, Err(RoutingError::ConflictingRoute { event: EventSource::RtoR }));
    }

    #[test]
    fn repeated_identical_assignment_is_fine() {
        let map = InterruptRouteMap::builder()
            .route(EventSource::RtoR, Route::LineA)
            .route(EventSource::RtoR, Route::LineA)
            .build()
            .unwrap();
        assert_eq!(map.route(EventSource::RtoR), Route::LineA);
    }

    #[test]
    fn firmware_default_image() {
        let image = InterruptRouteMap::firmware_default()
            .register_image(LineModes::uniform(LineMode::OpenDrainNoPullup));

        let line_a = EventSource::EcgFifoThreshold.mask()
            | EventSource::PaceEvent.mask()
            | EventSource::RtoR.mask();
        let line_b = EventSource::DcLeadOff.mask()
            | EventSource::BiozFifoThreshold.mask()
            | EventSource::BiozOverRange.mask()
            | EventSource::BiozUnderRange.mask()
            | EventSource::LeadOn.mask();

        assert_eq!(image.en_int, line_a | 0b10);
        assert_eq!(image.en_int2, line_b | 0b10);
        assert_eq!(image.en_int & image.en_int2 & !LINE_MODE_MASK, 0);
    }

    #[test]
    fn pending_is_empty_before_configuration() {
        let router = InterruptRouter::new();
        assert_eq!(router.pending(InterruptLine::LineA, u32::MAX).count(), 0);
    }
}
