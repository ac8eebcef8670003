//! Stream engine
//!
//! Drives the serial/parallel shift peripheral that moves sample words
//! between memory and the RF converter's data pins. Eight data lanes are
//! wired either as one concatenated 8-lane slice (with an extra slice
//! generating the burst-request pattern) or as eight independent single-lane
//! slices, all clocked from the externally supplied bit clock and gated by
//! the qualifier pin.
//!
//! Pin roles on the peripheral:
//! - 0..=7: converter data bits
//! - 8: bit clock input
//! - 9: capture qualifier input (1 = capture enabled)
//! - 10: stream disable output (1 = converter data stream gated off)
//! - 11: direction output (1 = transmit towards the DAC, 0 = receive)
//! - 14: DMA burst request output

pub mod registers;

use crate::types::{BoardProfile, HwSyncMode, StreamDirection};
use embedded_hal::digital::OutputPin;
use registers::{pin_mux, position, SgpioBlock, ShiftConfig, Slice, SliceMuxConfig};

/// Data pin driven by the converter clock
const PIN_CLOCK: u32 = 8;
/// Capture qualifier input pin
const PIN_QUALIFIER: u32 = 9;
/// Stream disable control line
const PIN_DISABLE: u32 = 10;
/// Direction control line
const PIN_DIRECTION: u32 = 11;
/// DMA burst request line
const PIN_BURST_REQUEST: u32 = 14;

/// Slices carrying the data lanes, in concatenation order
const DATA_SLICES: [Slice; 8] = [
    Slice::A,
    Slice::I,
    Slice::E,
    Slice::J,
    Slice::C,
    Slice::K,
    Slice::F,
    Slice::L,
];

/// Slice generating the fixed burst-request pattern in single-slice mode
const BURST_SLICE: Slice = Slice::H;

/// Slice mirroring the shift clock out to the switch timer
const CLOCK_OUT_SLICE: Slice = Slice::D;

/// Persistent stream engine configuration
///
/// Consumed on every full reconfiguration; mutated only through the
/// explicit setters on [`StreamEngine`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamConfig {
    /// Shift through 8 independent single-lane slices instead of one
    /// concatenated 8-lane slice
    pub multi_slice: bool,
    /// Requested Q-channel inversion
    pub q_invert: bool,
}

/// Shift peripheral driver
pub struct StreamEngine<Q, S> {
    regs: SgpioBlock,
    profile: BoardProfile,
    config: StreamConfig,
    q_invert_pin: Q,
    hw_sync_pin: S,
}

impl<Q: OutputPin, S: OutputPin> StreamEngine<Q, S> {
    /// Create the engine with both control lines deasserted
    pub fn new(profile: BoardProfile, q_invert_pin: Q, hw_sync_pin: S) -> Self {
        let mut engine = Self {
            regs: SgpioBlock::reset(),
            profile,
            config: StreamConfig::default(),
            q_invert_pin,
            hw_sync_pin,
        };
        engine.set_rx_q_invert(false);
        engine.set_hw_sync(HwSyncMode::Off);
        engine
    }

    /// Full peripheral reprogram for the given direction
    ///
    /// All slice clocks are stopped first and restarted with a single
    /// enable write at the very end, so no lane ever runs on a
    /// half-configured wiring.
    pub fn configure(&mut self, direction: StreamDirection) {
        let tx = direction == StreamDirection::Transmit;
        let r = &mut self.regs;

        // Stop all counters during configuration.
        r.ctrl_enable = 0;

        // Static levels: direction line per mode, stream gated off.
        r.gpio_outreg = (u32::from(tx) << PIN_DIRECTION) | (1 << PIN_DISABLE);

        if self.profile.q_invert_follows_direction {
            self.apply_q_invert_correction();
        }
        let r = &mut self.regs;

        // Data lanes drive outward only when transmitting; the control and
        // burst-request lines are always outputs, clock and qualifier
        // always inputs.
        let data_direction = if tx { 0xFF } else { 0x00 };
        r.gpio_oenreg = (1 << PIN_BURST_REQUEST)
            | (1 << PIN_DIRECTION)
            | (1 << PIN_DISABLE)
            | data_direction;

        r.out_mux_cfg[PIN_CLOCK as usize] = pin_mux(0, 0);
        r.out_mux_cfg[PIN_QUALIFIER as usize] = pin_mux(0, 0);
        r.out_mux_cfg[PIN_DISABLE as usize] = pin_mux(0, 4);
        r.out_mux_cfg[PIN_DIRECTION as usize] = pin_mux(0, 4);
        r.out_mux_cfg[PIN_BURST_REQUEST as usize] = pin_mux(0, 0);

        // 8-bit output mode 8c gives each data pin its own slice; mode 8a
        // drives all eight pins from the single slice A chain.
        let output_mode = if self.config.multi_slice { 11 } else { 9 };
        for pin in 0..8 {
            r.out_mux_cfg[pin] = pin_mux(0, output_mode);
        }

        let single_slice = !self.config.multi_slice;
        let slice_count = if self.config.multi_slice { 8 } else { 1 };
        let pos = if self.config.multi_slice { 0x1F } else { 0x03 };

        let mut enable_mask = CLOCK_OUT_SLICE.mask();

        for (i, slice) in DATA_SLICES.iter().take(slice_count).enumerate() {
            let idx = slice.index();
            let input_slice = i == 0 && !tx;
            let self_loop = input_slice || single_slice;

            r.mux_cfg[idx] = SliceMuxConfig {
                concat_order: if self_loop { 0 } else { 3 },
                concat_enable: !self_loop,
                qualifier_slice_mode: 0,
                qualifier_pin_mode: 1,
                qualifier_mode: 3,
                clk_source_slice_mode: 0,
                clk_source_pin_mode: 0,
                ext_clk_enable: true,
            }
            .encode();

            r.slice_mux_cfg[idx] = ShiftConfig {
                inv_qualifier: false,
                parallel_mode: 3,
                data_capture_mode: 0,
                inv_out_clk: false,
                clkgen_mode: 1,
                clk_capture_mode: 0,
                match_mode: 0,
            }
            .encode();

            // External clock: divider preset/counter are don't-care.
            r.preset[idx] = 0;
            r.count[idx] = 0;
            r.pos[idx] = position(pos, pos);
            r.data[idx] = 0;
            r.data_shadow[idx] = 0;

            enable_mask |= slice.mask();
        }

        if single_slice {
            // One extra slice shifts a fixed 1-in-4 pattern onto the
            // burst-request line.
            let idx = BURST_SLICE.index();

            r.mux_cfg[idx] = SliceMuxConfig {
                concat_order: 0,
                concat_enable: true,
                qualifier_slice_mode: 0,
                qualifier_pin_mode: 1,
                qualifier_mode: 3,
                clk_source_slice_mode: 0,
                clk_source_pin_mode: 0,
                ext_clk_enable: true,
            }
            .encode();

            r.slice_mux_cfg[idx] = ShiftConfig {
                inv_qualifier: false,
                parallel_mode: 0,
                data_capture_mode: 0,
                inv_out_clk: false,
                clkgen_mode: 1,
                clk_capture_mode: 0,
                match_mode: 0,
            }
            .encode();

            r.preset[idx] = 0;
            r.count[idx] = 0;
            r.pos[idx] = position(0x1F, 0x1F);
            r.data[idx] = 0x1111_1111;
            r.data_shadow[idx] = 0x1111_1111;

            enable_mask |= BURST_SLICE.mask();
        }

        // Start operation by enabling all configured slice clocks at once.
        r.ctrl_enable = enable_mask;
    }

    /// Open the converter data gate without touching the slice wiring
    pub fn stream_enable(&mut self) {
        self.regs.gpio_outreg &= !(1 << PIN_DISABLE);
    }

    /// Close the converter data gate without touching the slice wiring
    pub fn stream_disable(&mut self) {
        self.regs.gpio_outreg |= 1 << PIN_DISABLE;
    }

    /// Whether the converter data gate is open
    #[must_use]
    pub fn is_stream_enabled(&self) -> bool {
        self.regs.gpio_outreg & (1 << PIN_DISABLE) == 0
    }

    /// Select single- or multi-slice shifting for the next reconfiguration
    pub fn set_slice_mode(&mut self, multi_slice: bool) {
        self.config.multi_slice = multi_slice;
    }

    /// Request Q-channel inversion
    ///
    /// On the standard profile the control line simply carries the request.
    /// On the coupled profile the line level also depends on the current
    /// stream direction and is recomputed here and on every direction
    /// change.
    pub fn set_rx_q_invert(&mut self, invert: bool) {
        self.config.q_invert = invert;
        if self.profile.q_invert_follows_direction {
            self.apply_q_invert_correction();
        } else if invert {
            self.q_invert_pin.set_high().ok();
        } else {
            self.q_invert_pin.set_low().ok();
        }
    }

    /// Drive the external-synchronization enable line
    pub fn set_hw_sync(&mut self, mode: HwSyncMode) {
        if mode == HwSyncMode::On {
            self.hw_sync_pin.set_high().ok();
        } else {
            self.hw_sync_pin.set_low().ok();
        }
    }

    /// Persistent configuration as last set
    #[must_use]
    pub fn config(&self) -> StreamConfig {
        self.config
    }

    /// Register block, for the platform layer and for inspection in tests
    #[must_use]
    pub fn registers(&self) -> &SgpioBlock {
        &self.regs
    }

    /// Level for the coupled profile: assert on {no-invert, RX} and
    /// {invert, TX}, deassert otherwise.
    fn apply_q_invert_correction(&mut self) {
        let tx = self.regs.gpio_outreg & (1 << PIN_DIRECTION) != 0;
        if self.config.q_invert == tx {
            self.q_invert_pin.set_high().ok();
        } else {
            self.q_invert_pin.set_low().ok();
        }
    }
}
