//! Si5351C clock generator driver
//!
//! Programs the eight-output clock generator that produces the codec sample
//! clock, the baseband converter references and the auxiliary clock output.
//! Both PLLs are kept at the same internal VCO frequency, PLL A fed from the
//! on-board crystal and PLL B from the external reference input, so a
//! reference switch is a single clock-control rewrite with no divider math.
//!
//! All register traffic goes through the [`TwoWireBus`] transport; every
//! operation surfaces bus timeouts to the caller.

use crate::bus::{BusResult, TwoWireBus};
use crate::types::ClockSource;

/// Si5351C register addresses
mod reg {
    pub const DEVICE_STATUS: u8 = 0;
    pub const OUTPUT_ENABLE: u8 = 3;
    pub const OEB_PIN_ENABLE: u8 = 9;
    pub const PLL_INPUT_SOURCE: u8 = 15;
    pub const CLK_CONTROL_BASE: u8 = 16;
    pub const CLK3_CONTROL: u8 = 19;
    pub const PLLA_PARAMS: u8 = 26;
    pub const PLLB_PARAMS: u8 = 34;
    pub const MS_PARAMS_BASE: u8 = 42;
    pub const PLL_RESET: u8 = 177;
    pub const CRYSTAL_LOAD: u8 = 183;
    pub const FANOUT_ENABLE: u8 = 187;
}

/// Clock control register (16..=23) bit fields
mod ctrl {
    pub const POWERDOWN: u8 = 1 << 7;
    pub const INT_MODE: u8 = 1 << 6;
    pub const PLL_SRC_B: u8 = 1 << 5;
    pub const INV: u8 = 1 << 4;
    /// Source field: multisynth 0 or 4
    pub const SRC_MS_0_4: u8 = 2 << 2;
    /// Source field: this output's own multisynth
    pub const SRC_MS_SELF: u8 = 3 << 2;
    pub const IDRV_2MA: u8 = 0;
    pub const IDRV_4MA: u8 = 1;
    pub const IDRV_6MA: u8 = 2;
    pub const IDRV_8MA: u8 = 3;
}

/// Device status register: loss of signal on the external reference input
const STATUS_LOS_CLKIN: u8 = 1 << 4;

/// Output-enable register bit for the auxiliary clock output (CLK3)
const CLKOUT_DISABLE_BIT: u8 = 1 << 3;

/// Multisynth divider parameters in the device's P1/P2/P3 encoding
///
/// For an output of `f_vco / (a + b/c)` the parameters are
/// `p1 = 128*a + floor(128*b/c) - 512`, `p2 = 128*b - c*floor(128*b/c)`,
/// `p3 = c`. The final R divider halves the output `r_div` times.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MultisynthParams {
    /// Integer part encoding, 18 bits
    pub p1: u32,
    /// Fractional numerator encoding, 20 bits
    pub p2: u32,
    /// Fractional denominator, 20 bits
    pub p3: u32,
    /// Output R divider exponent (0 = /1, 1 = /2, .. 7 = /128)
    pub r_div: u8,
}

impl MultisynthParams {
    /// Parameters for an exact integer divider with no R stage
    #[must_use]
    pub const fn from_integer_divider(divider: u32) -> Self {
        Self {
            p1: 128 * divider - 512,
            p2: 0,
            p3: 1,
            r_div: 0,
        }
    }

    /// Output frequency these parameters produce from a VCO running at
    /// `vco_hz`
    ///
    /// Inverts the P1/P2/P3 encoding: the divider is
    /// `(p1 + 512 + p2/p3) / 128`, doubled `r_div` times by the R stage.
    /// The result is truncated to whole hertz.
    #[must_use]
    pub const fn expand(self, vco_hz: u64) -> u64 {
        if self.p3 == 0 {
            return 0;
        }
        // 128 * (a + b/c) expressed over the common denominator p3.
        let divider_128ths = (self.p1 as u64 + 512) * self.p3 as u64 + self.p2 as u64;
        vco_hz * 128 * self.p3 as u64 / (divider_128ths << self.r_div)
    }

    /// Pack into the eight contiguous parameter registers
    #[must_use]
    pub const fn register_image(self) -> [u8; 8] {
        [
            (self.p3 >> 8) as u8,
            self.p3 as u8,
            ((self.r_div & 0x7) << 4) | ((self.p1 >> 16) & 0x3) as u8,
            (self.p1 >> 8) as u8,
            self.p1 as u8,
            ((((self.p3 >> 16) & 0xF) << 4) | ((self.p2 >> 16) & 0xF)) as u8,
            (self.p2 >> 8) as u8,
            self.p2 as u8,
        ]
    }
}

/// Si5351C driver instance
///
/// Owns the bus handle and the last committed PLL source so redundant
/// reference switches never touch the wire.
pub struct Si5351<B> {
    bus: B,
    address: u8,
    active_source: ClockSource,
}

impl<B: TwoWireBus> Si5351<B> {
    /// Create a driver for the device at `address`
    ///
    /// No bus traffic happens here; the first [`set_clock_source`] always
    /// programs the clock-control block because the source starts out
    /// uninitialized.
    ///
    /// [`set_clock_source`]: Self::set_clock_source
    #[must_use]
    pub const fn new(bus: B, address: u8) -> Self {
        Self {
            bus,
            address,
            active_source: ClockSource::Uninitialized,
        }
    }

    /// Currently committed PLL source
    #[must_use]
    pub const fn active_source(&self) -> ClockSource {
        self.active_source
    }

    /// Bus handle, for inspection in tests
    #[must_use]
    pub const fn bus(&self) -> &B {
        &self.bus
    }

    /// Write one or more contiguous registers; `frame[0]` is the first
    /// register number, values follow.
    fn write(&mut self, frame: &[u8]) -> BusResult<()> {
        self.bus.transfer(self.address, frame, &mut [])
    }

    /// Write a single register
    fn write_single(&mut self, register: u8, value: u8) -> BusResult<()> {
        self.write(&[register, value])
    }

    /// Read a single register
    fn read_single(&mut self, register: u8) -> BusResult<u8> {
        let mut value = [0x00];
        self.bus.transfer(self.address, &[register], &mut value)?;
        Ok(value[0])
    }

    /// Bring the device from power-up to a configured but silent state
    ///
    /// All outputs end up disabled and powered down with both PLLs locked
    /// at the common VCO frequency. Output routing is committed later by
    /// the first reference selection.
    pub fn initialize(&mut self) -> BusResult<()> {
        self.disable_all_outputs()?;
        self.disable_oeb_pin_control()?;
        self.power_down_all_clocks()?;
        self.set_crystal_configuration()?;
        self.enable_xo_and_ms_fanout()?;
        self.configure_pll_sources()?;
        self.configure_pll_multisynth()
    }

    /// Disable every clock output
    pub fn disable_all_outputs(&mut self) -> BusResult<()> {
        self.write_single(reg::OUTPUT_ENABLE, 0xFF)
    }

    /// Turn off OEB pin control for all outputs
    pub fn disable_oeb_pin_control(&mut self) -> BusResult<()> {
        self.write_single(reg::OEB_PIN_ENABLE, 0xFF)
    }

    /// Power down all output drivers
    pub fn power_down_all_clocks(&mut self) -> BusResult<()> {
        self.write(&[
            reg::CLK_CONTROL_BASE,
            ctrl::POWERDOWN,
            ctrl::POWERDOWN,
            ctrl::POWERDOWN,
            ctrl::POWERDOWN,
            ctrl::POWERDOWN,
            ctrl::POWERDOWN,
            ctrl::POWERDOWN | ctrl::INT_MODE,
            ctrl::POWERDOWN | ctrl::INT_MODE,
        ])
    }

    /// Crystal internal load capacitance, 8 pF per board characterization
    pub fn set_crystal_configuration(&mut self) -> BusResult<()> {
        self.write_single(reg::CRYSTAL_LOAD, 0x80)
    }

    /// Fanout enable: XO and MultiSynth fanout only
    pub fn enable_xo_and_ms_fanout(&mut self) -> BusResult<()> {
        self.write_single(reg::FANOUT_ENABLE, 0xD0)
    }

    /// PLL input source: PLL A from the crystal, PLL B from the external
    /// reference input, input divider 1.
    pub fn configure_pll_sources(&mut self) -> BusResult<()> {
        self.write_single(reg::PLL_INPUT_SOURCE, 0x08)
    }

    /// Program both PLL feedback multisynths for the common VCO frequency
    ///
    /// PLL A: 25 MHz crystal * (0x0E00 + 512) / 128, integer mode.
    /// PLL B: 10 MHz reference * (0x2600 + 512) / 128.
    pub fn configure_pll_multisynth(&mut self) -> BusResult<()> {
        self.write(&[
            reg::PLLA_PARAMS,
            0x00,
            0x01,
            0x00,
            0x0E,
            0x00,
            0x00,
            0x00,
            0x00,
        ])?;
        self.write(&[
            reg::PLLB_PARAMS,
            0x00,
            0x01,
            0x00,
            0x26,
            0x00,
            0x00,
            0x00,
            0x00,
        ])
    }

    /// Soft-reset both PLLs
    pub fn reset_pll(&mut self) -> BusResult<()> {
        self.write_single(reg::PLL_RESET, 0xA0)
    }

    /// Program the output multisynth for channel `ms_number`
    pub fn configure_multisynth(
        &mut self,
        ms_number: u8,
        params: MultisynthParams,
    ) -> BusResult<()> {
        let image = params.register_image();
        let mut frame = [0u8; 9];
        frame[0] = reg::MS_PARAMS_BASE + ms_number * 8;
        frame[1..].copy_from_slice(&image);
        self.write(&frame)
    }

    /// Rewrite all eight clock-control registers for the given PLL source
    ///
    /// The sample clock output runs its own fractional multisynth; the
    /// converter references run off multisynth 0/4 in integer mode. The
    /// CPU clock and the auxiliary output stay powered down, both unused
    /// outputs would only radiate noise.
    pub fn configure_clock_control(&mut self, source: ClockSource) -> BusResult<()> {
        let pll = if source == ClockSource::ClockInput {
            ctrl::PLL_SRC_B
        } else {
            0
        };
        self.write(&[
            reg::CLK_CONTROL_BASE,
            pll | ctrl::SRC_MS_SELF | ctrl::IDRV_8MA,
            ctrl::INT_MODE | pll | ctrl::SRC_MS_0_4 | ctrl::IDRV_2MA | ctrl::INV,
            ctrl::INT_MODE | pll | ctrl::SRC_MS_0_4 | ctrl::IDRV_2MA,
            ctrl::POWERDOWN | ctrl::INT_MODE,
            ctrl::INT_MODE | pll | ctrl::SRC_MS_SELF | ctrl::IDRV_6MA | ctrl::INV,
            ctrl::INT_MODE | pll | ctrl::SRC_MS_SELF | ctrl::IDRV_4MA,
            ctrl::POWERDOWN | ctrl::INT_MODE,
            ctrl::POWERDOWN | ctrl::INT_MODE,
        ])
    }

    /// Enable outputs 0, 1, 2, 4 and 5; the auxiliary output and the
    /// unconnected outputs stay disabled.
    pub fn enable_clock_outputs(&mut self) -> BusResult<()> {
        self.write_single(
            reg::OUTPUT_ENABLE,
            (1 << 3) | (1 << 6) | (1 << 7),
        )
    }

    /// Toggle integer mode on one output's control register
    pub fn set_int_mode(&mut self, ms_number: u8, on: bool) -> BusResult<()> {
        if ms_number >= 8 {
            return Ok(());
        }
        let register = reg::CLK_CONTROL_BASE + ms_number;
        let mut value = self.read_single(register)?;
        if on {
            value |= ctrl::INT_MODE;
        } else {
            value &= !ctrl::INT_MODE;
        }
        self.write_single(register, value)
    }

    /// Commit a PLL source, rewriting clock control only on a change
    pub fn set_clock_source(&mut self, source: ClockSource) -> BusResult<()> {
        if source != self.active_source {
            self.configure_clock_control(source)?;
            self.active_source = source;
        }
        Ok(())
    }

    /// Whether a valid signal is present on the external reference input
    pub fn clkin_signal_valid(&mut self) -> BusResult<bool> {
        Ok(self.read_single(reg::DEVICE_STATUS)? & STATUS_LOS_CLKIN == 0)
    }

    /// Probe the external reference and commit the preferred source:
    /// the external input when present, the crystal otherwise.
    pub fn activate_best_clock_source(&mut self) -> BusResult<()> {
        let source = if self.clkin_signal_valid()? {
            ClockSource::ClockInput
        } else {
            ClockSource::Crystal
        };
        #[cfg(feature = "embedded")]
        defmt::debug!("clock source: {}", source);
        self.set_clock_source(source)
    }

    /// Switch the auxiliary 10 MHz clock output on or off
    ///
    /// Read-modify-write of the output-enable register touching only the
    /// auxiliary output's bit, then divider and driver programming to
    /// match.
    pub fn clkout_enable(&mut self, enable: bool) -> BusResult<()> {
        let mut output_enable = self.read_single(reg::OUTPUT_ENABLE)?;
        if enable {
            output_enable &= !CLKOUT_DISABLE_BIT;
        } else {
            output_enable |= CLKOUT_DISABLE_BIT;
        }
        self.write_single(reg::OUTPUT_ENABLE, output_enable)?;

        // VCO / 80 = 10 MHz.
        self.configure_multisynth(3, MultisynthParams::from_integer_divider(80))?;

        let pll = if self.active_source == ClockSource::ClockInput {
            ctrl::PLL_SRC_B
        } else {
            0
        };
        let clk3_ctrl = if enable {
            ctrl::INT_MODE | pll | ctrl::SRC_MS_SELF | ctrl::IDRV_8MA
        } else {
            ctrl::POWERDOWN | ctrl::INT_MODE
        };
        self.write_single(reg::CLK3_CONTROL, clk3_ctrl)
    }
}
