//! Tests for the stream engine
//!
//! Exercises the shift-peripheral wiring, the stream gate and the
//! Q-inversion behavior against a register-block model and mock pins.

use std::cell::Cell;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, OutputPin};
use xcvr_firmware::sgpio::registers::{pin_mux, position, Slice};
use xcvr_firmware::sgpio::{StreamConfig, StreamEngine};
use xcvr_firmware::types::{BoardProfile, HwSyncMode, StreamDirection};

#[derive(Clone, Default)]
struct MockPin(Rc<Cell<bool>>);

impl MockPin {
    fn level(&self) -> bool {
        self.0.get()
    }
}

impl ErrorType for MockPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set(true);
        Ok(())
    }
}

fn engine(profile: BoardProfile) -> (StreamEngine<MockPin, MockPin>, MockPin, MockPin) {
    let q_invert = MockPin::default();
    let hw_sync = MockPin::default();
    let engine = StreamEngine::new(profile, q_invert.clone(), hw_sync.clone());
    (engine, q_invert, hw_sync)
}

// ============================================================================
// Pin Direction Tests
// ============================================================================

#[test]
fn receive_keeps_data_pins_as_inputs() {
    let (mut engine, _, _) = engine(BoardProfile::standard());
    engine.configure(StreamDirection::Receive);

    let regs = engine.registers();
    assert_eq!(regs.gpio_oenreg & 0xFF, 0x00);
    // Control and burst-request lines stay outputs.
    assert_eq!(regs.gpio_oenreg, (1 << 14) | (1 << 11) | (1 << 10));
}

#[test]
fn transmit_drives_data_pins() {
    let (mut engine, _, _) = engine(BoardProfile::standard());
    engine.configure(StreamDirection::Transmit);

    let regs = engine.registers();
    assert_eq!(regs.gpio_oenreg & 0xFF, 0xFF);
    assert_eq!(regs.gpio_oenreg, (1 << 14) | (1 << 11) | (1 << 10) | 0xFF);
}

#[test]
fn direction_line_follows_mode() {
    let (mut engine, _, _) = engine(BoardProfile::standard());

    engine.configure(StreamDirection::Receive);
    assert_eq!(engine.registers().gpio_outreg & (1 << 11), 0);

    engine.configure(StreamDirection::Transmit);
    assert_ne!(engine.registers().gpio_outreg & (1 << 11), 0);
}

// ============================================================================
// Slice Wiring Tests
// ============================================================================

#[test]
fn single_slice_enable_mask() {
    let (mut engine, _, _) = engine(BoardProfile::standard());
    engine.configure(StreamDirection::Receive);

    // Data slice A, clock-out slice D, burst slice H.
    let expected = Slice::A.mask() | Slice::D.mask() | Slice::H.mask();
    assert_eq!(engine.registers().ctrl_enable, expected);
}

#[test]
fn multi_slice_enable_mask() {
    let (mut engine, _, _) = engine(BoardProfile::standard());
    engine.set_slice_mode(true);
    engine.configure(StreamDirection::Receive);

    let expected = Slice::A.mask()
        | Slice::I.mask()
        | Slice::E.mask()
        | Slice::J.mask()
        | Slice::C.mask()
        | Slice::K.mask()
        | Slice::F.mask()
        | Slice::L.mask()
        | Slice::D.mask();
    assert_eq!(engine.registers().ctrl_enable, expected);
}

#[test]
fn single_slice_routes_mode_8a_output() {
    let (mut engine, _, _) = engine(BoardProfile::standard());
    engine.configure(StreamDirection::Receive);

    let regs = engine.registers();
    for pin in 0..8 {
        assert_eq!(regs.out_mux_cfg[pin], pin_mux(0, 9));
    }
    assert_eq!(regs.out_mux_cfg[10], pin_mux(0, 4));
    assert_eq!(regs.out_mux_cfg[11], pin_mux(0, 4));
    assert_eq!(regs.out_mux_cfg[14], pin_mux(0, 0));
}

#[test]
fn multi_slice_routes_mode_8c_output() {
    let (mut engine, _, _) = engine(BoardProfile::standard());
    engine.set_slice_mode(true);
    engine.configure(StreamDirection::Receive);

    for pin in 0..8 {
        assert_eq!(engine.registers().out_mux_cfg[pin], pin_mux(0, 11));
    }
}

#[test]
fn single_slice_burst_pattern() {
    let (mut engine, _, _) = engine(BoardProfile::standard());
    engine.configure(StreamDirection::Receive);

    let regs = engine.registers();
    let h = Slice::H.index();
    assert_eq!(regs.data[h], 0x1111_1111);
    assert_eq!(regs.data_shadow[h], 0x1111_1111);
    assert_eq!(regs.pos[h], position(0x1F, 0x1F));
}

#[test]
fn multi_slice_omits_burst_slice() {
    let (mut engine, _, _) = engine(BoardProfile::standard());
    engine.set_slice_mode(true);
    engine.configure(StreamDirection::Receive);

    assert_eq!(engine.registers().ctrl_enable & Slice::H.mask(), 0);
}

#[test]
fn shift_positions_match_slice_mode() {
    let (mut engine, _, _) = engine(BoardProfile::standard());

    engine.configure(StreamDirection::Receive);
    assert_eq!(engine.registers().pos[Slice::A.index()], position(0x03, 0x03));

    engine.set_slice_mode(true);
    engine.configure(StreamDirection::Receive);
    assert_eq!(engine.registers().pos[Slice::A.index()], position(0x1F, 0x1F));
    assert_eq!(engine.registers().pos[Slice::L.index()], position(0x1F, 0x1F));
}

// ============================================================================
// Stream Gate Tests
// ============================================================================

#[test]
fn configure_leaves_stream_gated_off() {
    let (mut engine, _, _) = engine(BoardProfile::standard());
    engine.configure(StreamDirection::Receive);
    assert!(!engine.is_stream_enabled());
}

#[test]
fn stream_gate_toggles_only_disable_line() {
    let (mut engine, _, _) = engine(BoardProfile::standard());
    engine.configure(StreamDirection::Transmit);
    let before = engine.registers().gpio_outreg;

    engine.stream_enable();
    assert!(engine.is_stream_enabled());
    assert_eq!(engine.registers().gpio_outreg, before & !(1 << 10));

    engine.stream_disable();
    assert!(!engine.is_stream_enabled());
    assert_eq!(engine.registers().gpio_outreg, before);
}

// ============================================================================
// Q-Inversion Truth Table
// ============================================================================

#[test]
fn standard_profile_pin_carries_request() {
    let (mut engine, q_invert, _) = engine(BoardProfile::standard());
    assert!(!q_invert.level());

    engine.set_rx_q_invert(true);
    assert!(q_invert.level());

    // Direction changes leave the request alone on the standard board.
    engine.configure(StreamDirection::Transmit);
    assert!(q_invert.level());

    engine.set_rx_q_invert(false);
    assert!(!q_invert.level());
}

#[test]
fn coupled_profile_truth_table() {
    let cases = [
        (false, StreamDirection::Receive, true),
        (false, StreamDirection::Transmit, false),
        (true, StreamDirection::Receive, false),
        (true, StreamDirection::Transmit, true),
    ];
    for (invert, direction, expected) in cases {
        let (mut engine, q_invert, _) = engine(BoardProfile::coupled_q_invert());
        engine.set_rx_q_invert(invert);
        engine.configure(direction);
        assert_eq!(
            q_invert.level(),
            expected,
            "invert={invert:?} direction={direction:?}"
        );
    }
}

#[test]
fn coupled_profile_recomputes_on_direction_change() {
    let (mut engine, q_invert, _) = engine(BoardProfile::coupled_q_invert());
    engine.set_rx_q_invert(false);

    engine.configure(StreamDirection::Receive);
    assert!(q_invert.level());

    engine.configure(StreamDirection::Transmit);
    assert!(!q_invert.level());
}

// ============================================================================
// Sync and Config Tests
// ============================================================================

#[test]
fn hw_sync_drives_pin() {
    let (mut engine, _, hw_sync) = engine(BoardProfile::standard());
    assert!(!hw_sync.level());

    engine.set_hw_sync(HwSyncMode::On);
    assert!(hw_sync.level());

    engine.set_hw_sync(HwSyncMode::Off);
    assert!(!hw_sync.level());
}

#[test]
fn config_reflects_setters() {
    let (mut engine, _, _) = engine(BoardProfile::standard());
    assert_eq!(engine.config(), StreamConfig::default());

    engine.set_slice_mode(true);
    engine.set_rx_q_invert(true);
    assert_eq!(
        engine.config(),
        StreamConfig {
            multi_slice: true,
            q_invert: true,
        }
    );
}
