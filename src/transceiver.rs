//! Transceiver mode controller
//!
//! Owns every subsystem that must move in lockstep when the operating mode
//! changes: the stream engine, the clock generator, the RF path, the status
//! LEDs and the host bulk transport. A mode change is one ordered sequence;
//! nothing else in the firmware touches these subsystems concurrently.

use crate::bus::{BusResult, TwoWireBus};
use crate::config::{DEFAULT_FILTER_BANDWIDTH_HZ, SAMPLE_CLOCK_CHANNEL};
use crate::drivers::si5351::Si5351;
use crate::rf_path::{GainSettings, RfPath, StatusLeds};
use crate::sgpio::StreamEngine;
use crate::transport::{BulkEndpoint, BulkTransport, SampleBuffer, StreamPosition};
use crate::tuning::{self, FilterPath, FrequencyPlan};
use crate::types::{ClockSource, HwSyncMode, ModeFlag, StreamDirection, TransceiverMode};
use embedded_hal::digital::OutputPin;

/// Antenna-switch timing sequencer hook
///
/// The switch scheduler itself lives outside this crate; the mode controller
/// only needs to park it whenever streaming stops.
pub trait SwitchSequencer {
    /// Return the sequencer to its idle state
    fn reset_to_idle(&mut self);
}

/// No sequencer fitted
impl SwitchSequencer for () {
    fn reset_to_idle(&mut self) {}
}

/// The transceiver device
///
/// Generic over its hardware seams: the engine control pins, the clock
/// generator bus, the LED pins, both bulk endpoints and the switch
/// sequencer. Tests plug mocks into every seam.
pub struct Transceiver<'a, Q, S, B, R, T, I, O, W> {
    engine: StreamEngine<Q, S>,
    clock_gen: Si5351<B>,
    rf_path: RfPath,
    gains: GainSettings,
    leds: StatusLeds<R, T>,
    transport: BulkTransport<'a, I, O>,
    sequencer: W,
    mode: &'a ModeFlag,
    position: &'a StreamPosition,
    hw_sync_mode: HwSyncMode,
    plan: Option<FrequencyPlan>,
    filter_bandwidth_hz: u32,
}

impl<'a, Q, S, B, R, T, I, O, W> Transceiver<'a, Q, S, B, R, T, I, O, W>
where
    Q: OutputPin,
    S: OutputPin,
    B: TwoWireBus,
    R: OutputPin,
    T: OutputPin,
    I: BulkEndpoint,
    O: BulkEndpoint,
    W: SwitchSequencer,
{
    /// Assemble the device around the shared mode flag and stream position
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        engine: StreamEngine<Q, S>,
        clock_gen: Si5351<B>,
        leds: StatusLeds<R, T>,
        transport: BulkTransport<'a, I, O>,
        sequencer: W,
        mode: &'a ModeFlag,
        position: &'a StreamPosition,
    ) -> Self {
        Self {
            engine,
            clock_gen,
            rf_path: RfPath::new(),
            gains: GainSettings::new(),
            leds,
            transport,
            sequencer,
            mode,
            position,
            hw_sync_mode: HwSyncMode::Off,
            plan: None,
            filter_bandwidth_hz: DEFAULT_FILTER_BANDWIDTH_HZ,
        }
    }

    /// Bring the clock generator from power-up to running outputs
    ///
    /// The crystal is committed as the initial reference; the first mode
    /// change re-probes for an external one.
    pub fn initialize(&mut self) -> BusResult<()> {
        self.clock_gen.initialize()?;
        self.clock_gen.set_clock_source(ClockSource::Crystal)?;
        self.clock_gen.reset_pll()?;
        self.clock_gen.enable_clock_outputs()
    }

    /// Commit a new operating mode
    ///
    /// Teardown happens unconditionally and in order: the sample stream is
    /// gated off, the switch sequencer parked and both bulk pipes flushed
    /// before the new mode becomes visible to the streaming loops. Only
    /// then are the indicators, the RF path and the engine wiring brought
    /// up for the new mode, the best clock reference committed and the
    /// stream position rewound.
    ///
    /// Re-selecting the active mode runs the same sequence and lands in
    /// the same state.
    pub fn set_mode(&mut self, new_mode: TransceiverMode) -> BusResult<()> {
        self.engine.stream_disable();
        self.sequencer.reset_to_idle();
        self.transport.flush();

        self.mode.set(new_mode);

        #[cfg(feature = "embedded")]
        defmt::info!("mode: {}", new_mode);

        let direction = StreamDirection::from_mode(new_mode);
        self.leds.indicate(direction);
        self.rf_path.set_direction(direction);
        if direction != StreamDirection::Off {
            self.engine.configure(direction);
        }

        if new_mode != TransceiverMode::Off {
            self.clock_gen.activate_best_clock_source()?;
            self.engine.set_hw_sync(self.hw_sync_mode);
            self.position.set(0);
        }
        Ok(())
    }

    /// Serve the current mode's streaming loop until the mode changes
    ///
    /// Off and update modes have no loop; the call returns immediately.
    pub fn run_stream(&mut self, buffer: &mut SampleBuffer) {
        match self.mode.get() {
            serving @ (TransceiverMode::Receive | TransceiverMode::ReceiveSweep) => {
                self.engine.stream_enable();
                self.transport.run_receive(serving, buffer);
            }
            TransceiverMode::Transmit => {
                self.transport.prime_transmit(buffer);
                // Transmit zeros while the host fills the first bank.
                self.engine.stream_enable();
                self.transport.run_transmit(buffer);
            }
            TransceiverMode::Off | TransceiverMode::PldUpdate => {}
        }
    }

    /// Record the synchronization behavior applied on the next mode change
    pub fn set_hw_sync_mode(&mut self, mode: HwSyncMode) {
        self.hw_sync_mode = mode;
    }

    /// Toggle the preselector amplifier
    pub fn set_amp(&mut self, enable: bool) {
        self.rf_path.set_amp(enable);
    }

    /// Toggle the antenna-port bias supply
    pub fn set_antenna_bias(&mut self, enable: bool) {
        self.rf_path.set_antenna_bias(enable);
    }

    /// Apply an IF amplifier gain; reports acceptance
    pub fn set_lna_gain(&mut self, gain_db: u16) -> bool {
        self.gains.set_lna(gain_db)
    }

    /// Apply a receive baseband gain; reports acceptance
    pub fn set_vga_gain(&mut self, gain_db: u16) -> bool {
        self.gains.set_vga(gain_db)
    }

    /// Apply a transmit gain; reports acceptance
    pub fn set_txvga_gain(&mut self, gain_db: u16) -> bool {
        self.gains.set_txvga(gain_db)
    }

    /// Tune to a target frequency; reports acceptance
    pub fn tune(&mut self, freq_hz: u64) -> bool {
        match tuning::plan_frequency(freq_hz) {
            Some(plan) => {
                self.plan = Some(plan);
                true
            }
            None => false,
        }
    }

    /// Apply a host-specified tuning plan; reports acceptance
    pub fn tune_explicit(&mut self, if_hz: u64, lo_hz: u64, path: FilterPath) -> bool {
        match tuning::plan_explicit(if_hz, lo_hz, path) {
            Some(plan) => {
                self.plan = Some(plan);
                true
            }
            None => false,
        }
    }

    /// Reprogram the sample clock for `rate_num / rate_denom` Hz
    ///
    /// The stream is paused around the divider rewrite when it is running.
    /// `Ok(false)` means the rate is unreachable and nothing was touched.
    pub fn set_sample_rate(&mut self, rate_num: u32, rate_denom: u32) -> BusResult<bool> {
        let Some(plan) = tuning::plan_sample_clock(rate_num, rate_denom) else {
            return Ok(false);
        };

        let streaming = self.engine.is_stream_enabled();
        if streaming {
            self.engine.stream_disable();
        }

        self.clock_gen
            .set_int_mode(SAMPLE_CLOCK_CHANNEL, plan.integer_mode)?;
        self.clock_gen
            .configure_multisynth(SAMPLE_CLOCK_CHANNEL, plan.params)?;
        self.clock_gen.reset_pll()?;

        if streaming {
            self.engine.stream_enable();
        }
        Ok(true)
    }

    /// Snap and apply a baseband filter bandwidth; reports acceptance
    pub fn set_filter_bandwidth(&mut self, bandwidth_hz: u32) -> bool {
        match tuning::nearest_baseband_filter_bandwidth(bandwidth_hz) {
            Some(bandwidth) => {
                self.filter_bandwidth_hz = bandwidth;
                true
            }
            None => false,
        }
    }

    /// Switch the auxiliary clock output
    pub fn set_clkout(&mut self, enable: bool) -> BusResult<()> {
        self.clock_gen.clkout_enable(enable)
    }

    /// Stream engine, for inspection
    #[must_use]
    pub fn engine(&self) -> &StreamEngine<Q, S> {
        &self.engine
    }

    /// Stream engine, writable, for configuration requests
    pub fn engine_mut(&mut self) -> &mut StreamEngine<Q, S> {
        &mut self.engine
    }

    /// Clock generator, for inspection
    #[must_use]
    pub fn clock_gen(&self) -> &Si5351<B> {
        &self.clock_gen
    }

    /// RF path state, for inspection
    #[must_use]
    pub fn rf_path(&self) -> &RfPath {
        &self.rf_path
    }

    /// Applied gain settings, for inspection
    #[must_use]
    pub fn gains(&self) -> &GainSettings {
        &self.gains
    }

    /// Current tuning plan, if any
    #[must_use]
    pub fn plan(&self) -> Option<FrequencyPlan> {
        self.plan
    }

    /// Applied baseband filter bandwidth
    #[must_use]
    pub fn filter_bandwidth_hz(&self) -> u32 {
        self.filter_bandwidth_hz
    }
}
