//! Shared types used across the firmware
//!
//! Domain types for the transceiver operating state. The mode flag is the
//! one value shared between the control plane and the streaming loops, so it
//! lives behind an atomic with acquire/release ordering.

use core::sync::atomic::{AtomicU8, Ordering};

/// Global transceiver operating mode
///
/// Exactly one value is active at any time. The discriminants are the wire
/// values used by the host control protocol; gaps are rejected at the
/// protocol boundary before the mode controller ever sees them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum TransceiverMode {
    /// Streaming stopped, RF path unpowered
    #[default]
    Off = 0,
    /// Continuous receive streaming to the host
    Receive = 1,
    /// Continuous transmit streaming from the host
    Transmit = 2,
    /// Programmable-logic image update (streaming torn down)
    PldUpdate = 4,
    /// Receive streaming driven by the sweep scheduler
    ReceiveSweep = 5,
}

impl TransceiverMode {
    /// Decode a host-supplied wire value, rejecting anything undefined
    #[must_use]
    pub const fn from_value(value: u16) -> Option<Self> {
        match value {
            0 => Some(Self::Off),
            1 => Some(Self::Receive),
            2 => Some(Self::Transmit),
            4 => Some(Self::PldUpdate),
            5 => Some(Self::ReceiveSweep),
            _ => None,
        }
    }

    /// Wire value of this mode
    #[must_use]
    pub const fn as_value(self) -> u16 {
        self as u16
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for TransceiverMode {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Off => defmt::write!(f, "OFF"),
            Self::Receive => defmt::write!(f, "RX"),
            Self::Transmit => defmt::write!(f, "TX"),
            Self::PldUpdate => defmt::write!(f, "PLD-UPDATE"),
            Self::ReceiveSweep => defmt::write!(f, "RX-SWEEP"),
        }
    }
}

/// Shared operating-mode flag
///
/// Written by the mode controller, read by the streaming loops to decide
/// continuation. Single writer; the loops only read. Release on store and
/// acquire on load keep the loops from acting on a stale mode.
pub struct ModeFlag(AtomicU8);

impl ModeFlag {
    /// Create a flag starting in the given mode
    #[must_use]
    pub const fn new(mode: TransceiverMode) -> Self {
        Self(AtomicU8::new(mode as u8))
    }

    /// Current mode
    #[must_use]
    pub fn get(&self) -> TransceiverMode {
        match TransceiverMode::from_value(u16::from(self.0.load(Ordering::Acquire))) {
            Some(mode) => mode,
            // Only valid discriminants are ever stored.
            None => TransceiverMode::Off,
        }
    }

    /// Commit a new mode
    pub fn set(&self, mode: TransceiverMode) {
        self.0.store(mode as u8, Ordering::Release);
    }
}

impl Default for ModeFlag {
    fn default() -> Self {
        Self::new(TransceiverMode::Off)
    }
}

/// External hardware synchronization pulse behavior
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HwSyncMode {
    /// No external sync
    #[default]
    Off,
    /// Wait for the external sync pulse before streaming
    On,
}

impl HwSyncMode {
    /// Decode a host-supplied value; any non-zero value enables sync
    #[must_use]
    pub const fn from_value(value: u16) -> Self {
        if value == 0 {
            Self::Off
        } else {
            Self::On
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for HwSyncMode {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Off => defmt::write!(f, "SYNC-OFF"),
            Self::On => defmt::write!(f, "SYNC-ON"),
        }
    }
}

/// Logical direction of the RF signal path and sample stream
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StreamDirection {
    /// Path unpowered, stream idle
    #[default]
    Off,
    /// Antenna towards host
    Receive,
    /// Host towards antenna
    Transmit,
}

impl StreamDirection {
    /// Direction implied by an operating mode
    #[must_use]
    pub const fn from_mode(mode: TransceiverMode) -> Self {
        match mode {
            TransceiverMode::Receive | TransceiverMode::ReceiveSweep => Self::Receive,
            TransceiverMode::Transmit => Self::Transmit,
            TransceiverMode::Off | TransceiverMode::PldUpdate => Self::Off,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for StreamDirection {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Off => defmt::write!(f, "OFF"),
            Self::Receive => defmt::write!(f, "RX"),
            Self::Transmit => defmt::write!(f, "TX"),
        }
    }
}

/// Active PLL reference of the clock generator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ClockSource {
    /// No source selected yet; the first selection always programs registers
    #[default]
    Uninitialized,
    /// On-board crystal oscillator (PLL A)
    Crystal,
    /// External reference input (PLL B)
    ClockInput,
}

#[cfg(feature = "embedded")]
impl defmt::Format for ClockSource {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Uninitialized => defmt::write!(f, "UNINIT"),
            Self::Crystal => defmt::write!(f, "XTAL"),
            Self::ClockInput => defmt::write!(f, "CLKIN"),
        }
    }
}

/// Hardware revision profile, selected once at startup
///
/// One board revision couples the Q-channel inversion line to the stream
/// direction; the profile carries that difference as data so the stream
/// engine stays free of revision conditionals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoardProfile {
    /// The Q-inversion line level must be recomputed whenever the stream
    /// direction changes
    pub q_invert_follows_direction: bool,
}

impl BoardProfile {
    /// Standard board: the Q-inversion line carries the requested level
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            q_invert_follows_direction: false,
        }
    }

    /// Revision with direction-coupled Q inversion
    #[must_use]
    pub const fn coupled_q_invert() -> Self {
        Self {
            q_invert_follows_direction: true,
        }
    }
}

impl Default for BoardProfile {
    fn default() -> Self {
        Self::standard()
    }
}
