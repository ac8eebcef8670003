//! Serial/parallel stream peripheral register block
//!
//! Typed model of the shift-engine's register file: named fields instead of
//! address arithmetic, and builder structs instead of shift/mask macros for
//! the packed configuration words. The engine manipulates this block; the
//! platform layer maps it onto the peripheral.

/// Number of shift slices in the peripheral
pub const SLICE_COUNT: usize = 16;

/// Number of multiplexed peripheral pins
pub const PIN_COUNT: usize = 16;

/// One independently configurable shift-channel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Slice {
    A, B, C, D, E, F, G, H, I, J, K, L, M, N, O, P,
}

impl Slice {
    /// Register index of this slice
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Bit in the slice-clock enable register
    #[must_use]
    pub const fn mask(self) -> u32 {
        1 << (self as u32)
    }
}

/// Clock-enable register word and friends
#[derive(Debug)]
pub struct SgpioBlock {
    /// Slice shift-clock enable bits; writing this starts the slices
    pub ctrl_enable: u32,
    /// Static output levels for pins in GPIO-out mode
    pub gpio_outreg: u32,
    /// Output-enable bits for all peripheral pins
    pub gpio_oenreg: u32,
    /// Per-pin output multiplexer configuration
    pub out_mux_cfg: [u32; PIN_COUNT],
    /// Per-slice clock/qualifier/concatenation multiplexer configuration
    pub mux_cfg: [u32; SLICE_COUNT],
    /// Per-slice shift behavior configuration
    pub slice_mux_cfg: [u32; SLICE_COUNT],
    /// Per-slice internal clock divider preset
    pub preset: [u32; SLICE_COUNT],
    /// Per-slice internal clock divider counter
    pub count: [u32; SLICE_COUNT],
    /// Per-slice shift position / reload word
    pub pos: [u32; SLICE_COUNT],
    /// Per-slice primary data register
    pub data: [u32; SLICE_COUNT],
    /// Per-slice shadow data register
    pub data_shadow: [u32; SLICE_COUNT],
}

impl SgpioBlock {
    /// Block in its reset state
    #[must_use]
    pub const fn reset() -> Self {
        Self {
            ctrl_enable: 0,
            gpio_outreg: 0,
            gpio_oenreg: 0,
            out_mux_cfg: [0; PIN_COUNT],
            mux_cfg: [0; SLICE_COUNT],
            slice_mux_cfg: [0; SLICE_COUNT],
            preset: [0; SLICE_COUNT],
            count: [0; SLICE_COUNT],
            pos: [0; SLICE_COUNT],
            data: [0; SLICE_COUNT],
            data_shadow: [0; SLICE_COUNT],
        }
    }
}

impl Default for SgpioBlock {
    fn default() -> Self {
        Self::reset()
    }
}

/// Pin output-multiplexer word
///
/// `out_source` 0 routes the 1-bit slice dout; 4 routes the GPIO-out level.
/// `oe_source` 0 takes output enable from the OE register.
#[must_use]
pub const fn pin_mux(oe_source: u32, out_source: u32) -> u32 {
    ((oe_source & 0x7) << 4) | (out_source & 0xF)
}

/// Slice clock/qualifier/concatenation multiplexer word
#[derive(Clone, Copy, Debug, Default)]
pub struct SliceMuxConfig {
    /// 0 = self-loop, 3 = concatenate 8 slices
    pub concat_order: u32,
    /// Take input from the concatenation chain instead of the data pin
    pub concat_enable: bool,
    /// Qualifier slice select
    pub qualifier_slice_mode: u32,
    /// Qualifier pin select
    pub qualifier_pin_mode: u32,
    /// Qualifier mode; 3 = external pin
    pub qualifier_mode: u32,
    /// Clock source slice select
    pub clk_source_slice_mode: u32,
    /// Clock source pin select
    pub clk_source_pin_mode: u32,
    /// Use the external clock pin instead of the internal counter
    pub ext_clk_enable: bool,
}

impl SliceMuxConfig {
    /// Pack into the register word
    #[must_use]
    pub const fn encode(self) -> u32 {
        (self.ext_clk_enable as u32)
            | ((self.clk_source_pin_mode & 0x3) << 1)
            | ((self.clk_source_slice_mode & 0x3) << 3)
            | ((self.qualifier_mode & 0x3) << 5)
            | ((self.qualifier_pin_mode & 0x3) << 7)
            | ((self.qualifier_slice_mode & 0x3) << 9)
            | ((self.concat_enable as u32) << 11)
            | ((self.concat_order & 0x3) << 12)
    }
}

/// Slice shift-behavior word
#[derive(Clone, Copy, Debug, Default)]
pub struct ShiftConfig {
    /// Invert the qualifier input
    pub inv_qualifier: bool,
    /// Bits shifted per clock: 0 = 1 bit, 3 = 1 byte
    pub parallel_mode: u32,
    /// Input capture edge condition
    pub data_capture_mode: u32,
    /// Invert the output clock
    pub inv_out_clk: bool,
    /// 1 = clock from a pin or another slice
    pub clkgen_mode: u32,
    /// 0 = rising clock edge, 1 = falling
    pub clk_capture_mode: u32,
    /// Pattern-match mode
    pub match_mode: u32,
}

impl ShiftConfig {
    /// Pack into the register word
    #[must_use]
    pub const fn encode(self) -> u32 {
        (self.match_mode & 0x1)
            | ((self.clk_capture_mode & 0x1) << 1)
            | ((self.clkgen_mode & 0x1) << 2)
            | ((self.inv_out_clk as u32) << 3)
            | ((self.data_capture_mode & 0x3) << 4)
            | ((self.parallel_mode & 0x3) << 6)
            | ((self.inv_qualifier as u32) << 8)
    }
}

/// Shift position word: current position and reload value
#[must_use]
pub const fn position(reset: u32, pos: u32) -> u32 {
    ((reset & 0xFF) << 8) | (pos & 0xFF)
}
