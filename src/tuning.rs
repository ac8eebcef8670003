//! Frequency planning and sample-clock derivation
//!
//! Pure arithmetic: target frequencies become mixer plans and sample rates
//! become clock-generator divider parameters. Nothing here touches hardware;
//! the control protocol validates with these functions and hands the results
//! to the clock sequencer and the front end.

use crate::config::{
    BASEBAND_FILTER_BANDWIDTHS, BYPASS_BAND_MAX_HZ, BYPASS_BAND_MIN_HZ, DEFAULT_IF_HZ,
    FREQ_MAX_HZ, LO_MAX_HZ, LO_MIN_HZ, PLL_VCO_FREQ_HZ,
};
use crate::drivers::si5351::MultisynthParams;

/// Image-rejection filter path through the mixer stage
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterPath {
    /// Mixer bypassed, intermediate frequency radiated directly
    Bypass,
    /// Low-pass path, target below the intermediate band
    LowPass,
    /// High-pass path, target above the intermediate band
    HighPass,
}

impl FilterPath {
    /// Decode the host's path selector
    #[must_use]
    pub const fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Bypass),
            1 => Some(Self::LowPass),
            2 => Some(Self::HighPass),
            _ => None,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for FilterPath {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Bypass => defmt::write!(f, "BYPASS"),
            Self::LowPass => defmt::write!(f, "LOW-PASS"),
            Self::HighPass => defmt::write!(f, "HIGH-PASS"),
        }
    }
}

/// A fully resolved tuning decision
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrequencyPlan {
    /// Filter path through the mixer stage
    pub path: FilterPath,
    /// Intermediate frequency the transceiver chip is tuned to
    pub if_hz: u64,
    /// Front-end local oscillator frequency; zero on the bypass path
    pub lo_hz: u64,
}

/// Plan a tune to `freq_hz`
///
/// Targets inside the 2150..2750 MHz band are radiated directly; below it
/// the front-end mixer converts down from the fixed intermediate frequency,
/// above it up. Anything past the tunable range is rejected.
#[must_use]
pub fn plan_frequency(freq_hz: u64) -> Option<FrequencyPlan> {
    if freq_hz > FREQ_MAX_HZ {
        return None;
    }
    if freq_hz < BYPASS_BAND_MIN_HZ {
        Some(FrequencyPlan {
            path: FilterPath::LowPass,
            if_hz: DEFAULT_IF_HZ,
            lo_hz: DEFAULT_IF_HZ + freq_hz,
        })
    } else if freq_hz <= BYPASS_BAND_MAX_HZ {
        Some(FrequencyPlan {
            path: FilterPath::Bypass,
            if_hz: freq_hz,
            lo_hz: 0,
        })
    } else {
        Some(FrequencyPlan {
            path: FilterPath::HighPass,
            if_hz: DEFAULT_IF_HZ,
            lo_hz: freq_hz - DEFAULT_IF_HZ,
        })
    }
}

/// Validate an explicitly specified plan from the host
///
/// The intermediate frequency must sit inside the direct band, and unless
/// the mixer is bypassed the local oscillator must be within the
/// synthesizer's range.
#[must_use]
pub fn plan_explicit(if_hz: u64, lo_hz: u64, path: FilterPath) -> Option<FrequencyPlan> {
    if if_hz < BYPASS_BAND_MIN_HZ || if_hz > BYPASS_BAND_MAX_HZ {
        return None;
    }
    if path != FilterPath::Bypass && (lo_hz < LO_MIN_HZ || lo_hz > LO_MAX_HZ) {
        return None;
    }
    Some(FrequencyPlan { path, if_hz, lo_hz })
}

/// Derived sample-clock programming
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SampleClockPlan {
    /// Divider parameters for the sample-clock multisynth
    pub params: MultisynthParams,
    /// The divider came out exact; the output runs in integer mode
    pub integer_mode: bool,
}

/// Derive the sample-clock multisynth settings for `rate_num / rate_denom` Hz
///
/// The VCO is divided by `a + b/c`; an inexact division is reduced and, when
/// the denominator overflows the device's 20-bit field, approximated at the
/// field's full resolution. Rates whose integer divider falls outside the
/// device's 8..=2048 range are rejected.
#[must_use]
pub fn plan_sample_clock(rate_num: u32, rate_denom: u32) -> Option<SampleClockPlan> {
    if rate_num == 0 || rate_denom == 0 {
        return None;
    }

    let vco_times_denom = PLL_VCO_FREQ_HZ * u64::from(rate_denom);
    let a = vco_times_denom / u64::from(rate_num);
    if !(8..=2048).contains(&a) {
        return None;
    }
    let a = a as u32;

    let mut rem = (vco_times_denom - u64::from(a) * u64::from(rate_num)) as u32;
    let mut num = rate_num;

    let (b, c) = if rem == 0 {
        (0, 1)
    } else {
        let g = gcd(rem, num);
        rem /= g;
        num /= g;
        if num < (1 << 20) {
            (rem, num)
        } else {
            // Denominator too wide for the device; approximate at the
            // field's full resolution.
            let c = (1u32 << 20) - 1;
            let b = (u64::from(c) * u64::from(rem) / u64::from(num)) as u32;
            let g = gcd(b, c);
            (b / g, c / g)
        }
    };

    let p1 = 128 * a + 128 * b / c - 512;
    let p2 = (128 * b) % c;
    let p3 = c;

    Some(SampleClockPlan {
        // The output multisynth runs at twice the codec rate; the final R
        // stage halves it.
        params: MultisynthParams {
            p1,
            p2,
            p3,
            r_div: 1,
        },
        integer_mode: b == 0,
    })
}

/// Snap a requested baseband filter bandwidth to the nearest supported one
///
/// Only a zero request is rejected; everything else lands on the closest
/// table entry, preferring the lower one on a tie.
#[must_use]
pub fn nearest_baseband_filter_bandwidth(bandwidth_hz: u32) -> Option<u32> {
    if bandwidth_hz == 0 {
        return None;
    }
    let mut best = BASEBAND_FILTER_BANDWIDTHS[0];
    for &entry in &BASEBAND_FILTER_BANDWIDTHS {
        if entry.abs_diff(bandwidth_hz) < best.abs_diff(bandwidth_hz) {
            best = entry;
        }
    }
    Some(best)
}

/// Greatest common divisor, Euclid
const fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}
