//! RF signal path switching, analog gain limits and status indication
//!
//! The antenna-facing switch fabric and front-end gain stages live outside
//! this crate; what lives here is their validated state. The mode controller
//! drives the path direction, the control protocol toggles the preselector
//! amplifier and antenna-port bias and applies gain settings, and the
//! platform layer maps the committed state onto hardware.

use crate::config::{LNA_GAIN_MAX_DB, TXVGA_GAIN_MAX_DB, VGA_GAIN_MAX_DB};
use crate::types::StreamDirection;
use embedded_hal::digital::OutputPin;

/// Committed state of the RF switch fabric
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RfPath {
    direction: StreamDirection,
    amp_enabled: bool,
    antenna_bias: bool,
}

impl RfPath {
    /// Path fully off, amplifier and bias disabled
    #[must_use]
    pub const fn new() -> Self {
        Self {
            direction: StreamDirection::Off,
            amp_enabled: false,
            antenna_bias: false,
        }
    }

    /// Route the path for the given direction
    pub fn set_direction(&mut self, direction: StreamDirection) {
        self.direction = direction;
    }

    /// Toggle the preselector amplifier
    pub fn set_amp(&mut self, enable: bool) {
        self.amp_enabled = enable;
    }

    /// Toggle the antenna-port bias supply
    pub fn set_antenna_bias(&mut self, enable: bool) {
        self.antenna_bias = enable;
    }

    /// Current path direction
    #[must_use]
    pub const fn direction(&self) -> StreamDirection {
        self.direction
    }

    /// Whether the preselector amplifier is in the path
    #[must_use]
    pub const fn amp_enabled(&self) -> bool {
        self.amp_enabled
    }

    /// Whether the antenna port carries bias
    #[must_use]
    pub const fn antenna_bias(&self) -> bool {
        self.antenna_bias
    }
}

/// Validated front-end gain settings
///
/// Each setter accepts only the steps the gain stage implements and reports
/// acceptance; a rejected value changes nothing, so the caller can echo the
/// outcome to the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GainSettings {
    lna_db: u16,
    vga_db: u16,
    txvga_db: u16,
}

impl GainSettings {
    /// All gains at minimum
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lna_db: 0,
            vga_db: 0,
            txvga_db: 0,
        }
    }

    /// IF amplifier gain, 0..=40 dB in 8 dB steps
    pub fn set_lna(&mut self, gain_db: u16) -> bool {
        if gain_db > LNA_GAIN_MAX_DB || gain_db % 8 != 0 {
            return false;
        }
        self.lna_db = gain_db;
        true
    }

    /// Receive baseband gain, 0..=62 dB in 2 dB steps
    pub fn set_vga(&mut self, gain_db: u16) -> bool {
        if gain_db > VGA_GAIN_MAX_DB || gain_db % 2 != 0 {
            return false;
        }
        self.vga_db = gain_db;
        true
    }

    /// Transmit gain, 0..=47 dB in 1 dB steps
    pub fn set_txvga(&mut self, gain_db: u16) -> bool {
        if gain_db > TXVGA_GAIN_MAX_DB {
            return false;
        }
        self.txvga_db = gain_db;
        true
    }

    /// Applied IF amplifier gain
    #[must_use]
    pub const fn lna_db(&self) -> u16 {
        self.lna_db
    }

    /// Applied receive baseband gain
    #[must_use]
    pub const fn vga_db(&self) -> u16 {
        self.vga_db
    }

    /// Applied transmit gain
    #[must_use]
    pub const fn txvga_db(&self) -> u16 {
        self.txvga_db
    }
}

/// Receive and transmit indicator LEDs
pub struct StatusLeds<R, T> {
    receive: R,
    transmit: T,
}

impl<R: OutputPin, T: OutputPin> StatusLeds<R, T> {
    /// Take ownership of the two indicator pins, both dark
    pub fn new(mut receive: R, mut transmit: T) -> Self {
        receive.set_low().ok();
        transmit.set_low().ok();
        Self { receive, transmit }
    }

    /// Light the indicator matching the path direction
    pub fn indicate(&mut self, direction: StreamDirection) {
        match direction {
            StreamDirection::Receive => {
                self.transmit.set_low().ok();
                self.receive.set_high().ok();
            }
            StreamDirection::Transmit => {
                self.receive.set_low().ok();
                self.transmit.set_high().ok();
            }
            StreamDirection::Off => {
                self.receive.set_low().ok();
                self.transmit.set_low().ok();
            }
        }
    }
}
