//! System configuration and hardware constants
//!
//! Compile-time constants for the streaming transceiver hardware. Clock
//! frequencies, device addresses, buffer geometry and front-end limits are
//! centralized here.

/// Crystal reference feeding PLL A of the clock generator (25 MHz)
pub const XTAL_FREQ_HZ: u32 = 25_000_000;

/// External reference input feeding PLL B of the clock generator (10 MHz)
pub const CLKIN_FREQ_HZ: u32 = 10_000_000;

/// Internal VCO frequency both PLLs are programmed to reach (800 MHz)
pub const PLL_VCO_FREQ_HZ: u64 = 800_000_000;

/// Auxiliary reference produced on the clock-output channel (10 MHz)
pub const CLKOUT_FREQ_HZ: u32 = 10_000_000;

/// Clock generator two-wire bus address
pub const CLOCKGEN_BUS_ADDRESS: u8 = 0x60;

/// Clock-generator channel carrying the sample clock
pub const SAMPLE_CLOCK_CHANNEL: u8 = 0;

/// Clock-generator channel carrying the auxiliary clock output
pub const CLKOUT_CHANNEL: u8 = 3;

/// Size of one host bulk transfer slot in bytes (16 KiB)
pub const BANK_SIZE: usize = 0x4000;

/// Size of the full double-buffered sample ring in bytes (32 KiB)
pub const SAMPLE_BUFFER_SIZE: usize = 2 * BANK_SIZE;

/// Upper limit of the tunable range in Hz
pub const FREQ_MAX_HZ: u64 = 7_250_000_000;

/// Lower edge of the direct-conversion (bypass) band in Hz
pub const BYPASS_BAND_MIN_HZ: u64 = 2_150_000_000;

/// Upper edge of the direct-conversion (bypass) band in Hz
pub const BYPASS_BAND_MAX_HZ: u64 = 2_750_000_000;

/// Intermediate frequency used for the low/high converted paths in Hz
pub const DEFAULT_IF_HZ: u64 = 2_600_000_000;

/// Minimum front-end local oscillator frequency in Hz (84.375 MHz)
pub const LO_MIN_HZ: u64 = 84_375_000;

/// Maximum front-end local oscillator frequency in Hz
pub const LO_MAX_HZ: u64 = 5_400_000_000;

/// Maximum LNA (IF amplifier) gain in dB, settable in 8 dB steps
pub const LNA_GAIN_MAX_DB: u16 = 40;

/// Maximum baseband VGA gain in dB, settable in 2 dB steps
pub const VGA_GAIN_MAX_DB: u16 = 62;

/// Maximum TX VGA gain in dB, settable in 1 dB steps
pub const TXVGA_GAIN_MAX_DB: u16 = 47;

/// Baseband low-pass filter bandwidths supported by the transceiver chip,
/// in Hz, ascending.
pub const BASEBAND_FILTER_BANDWIDTHS: [u32; 16] = [
    1_750_000, 2_500_000, 3_500_000, 5_000_000, 5_500_000, 6_000_000,
    7_000_000, 8_000_000, 9_000_000, 10_000_000, 12_000_000, 14_000_000,
    15_000_000, 20_000_000, 24_000_000, 28_000_000,
];

/// Default baseband filter bandwidth in Hz
pub const DEFAULT_FILTER_BANDWIDTH_HZ: u32 = 10_000_000;
