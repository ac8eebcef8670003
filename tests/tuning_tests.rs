//! Tests for frequency planning and sample-clock derivation

use xcvr_firmware::config::{DEFAULT_IF_HZ, FREQ_MAX_HZ, PLL_VCO_FREQ_HZ};
use xcvr_firmware::tuning::{
    nearest_baseband_filter_bandwidth, plan_explicit, plan_frequency, plan_sample_clock,
    FilterPath,
};

// ============================================================================
// Frequency Plan Tests
// ============================================================================

#[test]
fn low_band_converts_down_from_if() {
    let plan = plan_frequency(100_000_000).unwrap();
    assert_eq!(plan.path, FilterPath::LowPass);
    assert_eq!(plan.if_hz, DEFAULT_IF_HZ);
    assert_eq!(plan.lo_hz, DEFAULT_IF_HZ + 100_000_000);
}

#[test]
fn mid_band_bypasses_the_mixer() {
    let plan = plan_frequency(2_400_000_000).unwrap();
    assert_eq!(plan.path, FilterPath::Bypass);
    assert_eq!(plan.if_hz, 2_400_000_000);
    assert_eq!(plan.lo_hz, 0);
}

#[test]
fn high_band_converts_up_from_if() {
    let plan = plan_frequency(5_800_000_000).unwrap();
    assert_eq!(plan.path, FilterPath::HighPass);
    assert_eq!(plan.if_hz, DEFAULT_IF_HZ);
    assert_eq!(plan.lo_hz, 5_800_000_000 - DEFAULT_IF_HZ);
}

#[test]
fn band_edges() {
    assert_eq!(plan_frequency(2_149_999_999).unwrap().path, FilterPath::LowPass);
    assert_eq!(plan_frequency(2_150_000_000).unwrap().path, FilterPath::Bypass);
    assert_eq!(plan_frequency(2_750_000_000).unwrap().path, FilterPath::Bypass);
    assert_eq!(plan_frequency(2_750_000_001).unwrap().path, FilterPath::HighPass);
}

#[test]
fn tuning_range_is_bounded() {
    assert!(plan_frequency(FREQ_MAX_HZ).is_some());
    assert!(plan_frequency(FREQ_MAX_HZ + 1).is_none());
    assert!(plan_frequency(0).is_some());
}

// ============================================================================
// Explicit Plan Tests
// ============================================================================

#[test]
fn explicit_plan_passes_through_when_valid() {
    let plan = plan_explicit(2_400_000_000, 1_000_000_000, FilterPath::LowPass).unwrap();
    assert_eq!(plan.if_hz, 2_400_000_000);
    assert_eq!(plan.lo_hz, 1_000_000_000);
    assert_eq!(plan.path, FilterPath::LowPass);
}

#[test]
fn explicit_plan_rejects_if_outside_direct_band() {
    assert!(plan_explicit(2_000_000_000, 1_000_000_000, FilterPath::LowPass).is_none());
    assert!(plan_explicit(2_800_000_000, 1_000_000_000, FilterPath::LowPass).is_none());
}

#[test]
fn explicit_plan_checks_lo_range_unless_bypassed() {
    assert!(plan_explicit(2_400_000_000, 84_374_999, FilterPath::HighPass).is_none());
    assert!(plan_explicit(2_400_000_000, 5_400_000_001, FilterPath::HighPass).is_none());
    // The bypass path never drives the front-end LO.
    assert!(plan_explicit(2_400_000_000, 0, FilterPath::Bypass).is_some());
}

#[test]
fn filter_path_selector_decoding() {
    assert_eq!(FilterPath::from_value(0), Some(FilterPath::Bypass));
    assert_eq!(FilterPath::from_value(1), Some(FilterPath::LowPass));
    assert_eq!(FilterPath::from_value(2), Some(FilterPath::HighPass));
    assert_eq!(FilterPath::from_value(3), None);
}

// ============================================================================
// Sample Clock Tests
// ============================================================================

#[test]
fn exact_rate_runs_in_integer_mode() {
    // 20 Msps: clock at 40 MHz, VCO / 20.
    let plan = plan_sample_clock(40_000_000, 1).unwrap();
    assert!(plan.integer_mode);
    assert_eq!(plan.params.p1, 128 * 20 - 512);
    assert_eq!(plan.params.p2, 0);
    assert_eq!(plan.params.p3, 1);
    assert_eq!(plan.params.r_div, 1);
}

#[test]
fn inexact_rate_runs_fractionally() {
    // 8.5 Msps: clock at 17 MHz, VCO / (47 + 1/17).
    let plan = plan_sample_clock(17_000_000, 1).unwrap();
    assert!(!plan.integer_mode);
    assert_eq!(plan.params.p1, 128 * 47 + 128 / 17 - 512);
    assert_eq!(plan.params.p2, 128 % 17);
    assert_eq!(plan.params.p3, 17);
}

#[test]
fn irreducible_denominator_is_approximated() {
    let plan = plan_sample_clock(3_000_001, 1).unwrap();
    assert!(!plan.integer_mode);
    assert!(plan.params.p3 < 1 << 20);
}

#[test]
fn unreachable_dividers_are_rejected() {
    // Divider below 8.
    assert!(plan_sample_clock(400_000_000, 1).is_none());
    // Divider above 2048.
    assert!(plan_sample_clock(200_000, 1).is_none());
    assert!(plan_sample_clock(0, 1).is_none());
    assert!(plan_sample_clock(40_000_000, 0).is_none());
}

#[test]
fn derived_plan_reproduces_the_requested_clock() {
    // Expanding the packed parameters back out must land on the requested
    // sample rate, i.e. the shift clock after the /2 output stage. Exact
    // dividers reproduce it to the hertz; an approximated denominator is
    // off by no more than its fractional resolution.
    let cases: [(u32, u32, u64); 4] = [
        (40_000_000, 1, 20_000_000),
        (17_000_000, 1, 8_500_000),
        (50_000_000, 3, 8_333_333),
        (3_000_001, 1, 1_500_000),
    ];
    for (num, denom, rate_hz) in cases {
        let plan = plan_sample_clock(num, denom).unwrap();
        let produced = plan.params.expand(PLL_VCO_FREQ_HZ);
        assert!(
            produced.abs_diff(rate_hz) <= 1,
            "{num}/{denom}: produced {produced} Hz, requested {rate_hz} Hz"
        );
    }
}

#[test]
fn denominator_scales_the_rate() {
    // 12.5 MHz via 25_000_000 / 2: same divider either way.
    let direct = plan_sample_clock(25_000_000, 1).unwrap();
    let scaled = plan_sample_clock(50_000_000, 2).unwrap();
    assert_eq!(direct.params, scaled.params);
}

// ============================================================================
// Baseband Filter Tests
// ============================================================================

#[test]
fn filter_selection_snaps_to_nearest() {
    assert_eq!(nearest_baseband_filter_bandwidth(10_000_000), Some(10_000_000));
    assert_eq!(nearest_baseband_filter_bandwidth(1), Some(1_750_000));
    assert_eq!(nearest_baseband_filter_bandwidth(13_500_000), Some(14_000_000));
    assert_eq!(nearest_baseband_filter_bandwidth(100_000_000), Some(28_000_000));
}

#[test]
fn filter_tie_prefers_lower_bandwidth() {
    assert_eq!(nearest_baseband_filter_bandwidth(11_000_000), Some(10_000_000));
}

#[test]
fn zero_bandwidth_is_rejected() {
    assert_eq!(nearest_baseband_filter_bandwidth(0), None);
}
