//! Host control protocol
//!
//! Vendor-request dispatcher for the control endpoint. Requests follow the
//! usual three-stage shape: everything that fits in the setup packet is
//! handled immediately, requests with a parameter block answer the setup
//! stage with the payload length to fetch and finish when the data stage
//! delivers it. Validation happens here, before the device is touched; an
//! undefined request, mode or parameter never reaches the controller.

use heapless::Vec;

use crate::bus::TwoWireBus;
use crate::transceiver::{SwitchSequencer, Transceiver};
use crate::transport::BulkEndpoint;
use crate::tuning::FilterPath;
use crate::types::{HwSyncMode, TransceiverMode};
use embedded_hal::digital::OutputPin;

/// Largest parameter block of any request (explicit tune: two u64 + path)
pub const MAX_PAYLOAD_LEN: usize = 17;

/// Vendor request codes, matching the established host tooling
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Request {
    /// Change the operating mode
    SetTransceiverMode = 1,
    /// Reprogram the sample clock (data stage: rate numerator + divider)
    SampleRateSet = 6,
    /// Select the baseband filter bandwidth
    BasebandFilterBandwidthSet = 7,
    /// Tune to a target frequency (data stage: MHz + Hz parts)
    SetFreq = 16,
    /// Toggle the preselector amplifier
    AmpEnable = 17,
    /// Apply an IF amplifier gain
    SetLnaGain = 19,
    /// Apply a receive baseband gain
    SetVgaGain = 20,
    /// Apply a transmit gain
    SetTxvgaGain = 21,
    /// Toggle the antenna-port bias
    AntennaEnable = 23,
    /// Apply an explicit tuning plan (data stage: IF + LO + path)
    SetFreqExplicit = 24,
    /// Record the hardware-sync behavior for the next mode change
    SetHwSyncMode = 29,
    /// Switch the auxiliary clock output
    ClkoutEnable = 32,
}

impl Request {
    /// Decode a request code, rejecting anything unimplemented
    #[must_use]
    pub const fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::SetTransceiverMode),
            6 => Some(Self::SampleRateSet),
            7 => Some(Self::BasebandFilterBandwidthSet),
            16 => Some(Self::SetFreq),
            17 => Some(Self::AmpEnable),
            19 => Some(Self::SetLnaGain),
            20 => Some(Self::SetVgaGain),
            21 => Some(Self::SetTxvgaGain),
            23 => Some(Self::AntennaEnable),
            24 => Some(Self::SetFreqExplicit),
            29 => Some(Self::SetHwSyncMode),
            32 => Some(Self::ClkoutEnable),
            _ => None,
        }
    }
}

/// Decoded setup packet of a vendor request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SetupPacket {
    /// Vendor request code
    pub request: u8,
    /// wValue field
    pub value: u16,
    /// wIndex field
    pub index: u16,
    /// wLength field
    pub length: u16,
}

/// Outcome of one dispatch step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestResult {
    /// Accepted; complete with a zero-length status stage
    Ack,
    /// Accepted; send this byte, then the status stage
    Reply(u8),
    /// Stage this many payload bytes and call the data-stage handler
    Payload(usize),
    /// Rejected; stall the endpoint
    Stall,
}

/// Control-request dispatcher
///
/// Holds the staged data-stage payload between the two dispatch calls of a
/// parameterized request.
#[derive(Default)]
pub struct Dispatcher {
    staged: Vec<u8, MAX_PAYLOAD_LEN>,
}

impl Dispatcher {
    /// Dispatcher with no request in flight
    #[must_use]
    pub const fn new() -> Self {
        Self { staged: Vec::new() }
    }

    /// Append data-stage bytes; reports false when the payload overflows
    pub fn stage(&mut self, chunk: &[u8]) -> bool {
        self.staged.extend_from_slice(chunk).is_ok()
    }

    /// Handle the setup stage of a vendor request
    pub fn handle_setup<Q, S, B, R, T, I, O, W>(
        &mut self,
        device: &mut Transceiver<'_, Q, S, B, R, T, I, O, W>,
        setup: &SetupPacket,
    ) -> RequestResult
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
        let Some(request) = Request::from_value(setup.request) else {
            return RequestResult::Stall;
        };

        match request {
            Request::SetTransceiverMode => {
                let Some(mode) = TransceiverMode::from_value(setup.value) else {
                    return RequestResult::Stall;
                };
                match device.set_mode(mode) {
                    Ok(()) => RequestResult::Ack,
                    Err(_) => RequestResult::Stall,
                }
            }
            Request::SetHwSyncMode => {
                device.set_hw_sync_mode(HwSyncMode::from_value(setup.value));
                RequestResult::Ack
            }
            Request::AmpEnable => match setup.value {
                0 => {
                    device.set_amp(false);
                    RequestResult::Ack
                }
                1 => {
                    device.set_amp(true);
                    RequestResult::Ack
                }
                _ => RequestResult::Stall,
            },
            Request::AntennaEnable => match setup.value {
                0 => {
                    device.set_antenna_bias(false);
                    RequestResult::Ack
                }
                1 => {
                    device.set_antenna_bias(true);
                    RequestResult::Ack
                }
                _ => RequestResult::Stall,
            },
            Request::SetLnaGain => {
                RequestResult::Reply(u8::from(device.set_lna_gain(setup.index)))
            }
            Request::SetVgaGain => {
                RequestResult::Reply(u8::from(device.set_vga_gain(setup.index)))
            }
            Request::SetTxvgaGain => {
                RequestResult::Reply(u8::from(device.set_txvga_gain(setup.index)))
            }
            Request::BasebandFilterBandwidthSet => {
                let bandwidth = (u32::from(setup.index) << 16) | u32::from(setup.value);
                if device.set_filter_bandwidth(bandwidth) {
                    RequestResult::Ack
                } else {
                    RequestResult::Stall
                }
            }
            Request::ClkoutEnable => match device.set_clkout(setup.value != 0) {
                Ok(()) => RequestResult::Ack,
                Err(_) => RequestResult::Stall,
            },
            Request::SetFreq | Request::SampleRateSet => {
                self.staged.clear();
                RequestResult::Payload(8)
            }
            Request::SetFreqExplicit => {
                self.staged.clear();
                RequestResult::Payload(MAX_PAYLOAD_LEN)
            }
        }
    }

    /// Handle the data stage once the payload has been staged
    pub fn handle_data<Q, S, B, R, T, I, O, W>(
        &mut self,
        device: &mut Transceiver<'_, Q, S, B, R, T, I, O, W>,
        setup: &SetupPacket,
    ) -> RequestResult
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
        let payload = core::mem::take(&mut self.staged);
        let Some(request) = Request::from_value(setup.request) else {
            return RequestResult::Stall;
        };

        match request {
            Request::SetFreq => {
                let (Some(mhz), Some(hz)) = (le_u32(&payload, 0), le_u32(&payload, 4)) else {
                    return RequestResult::Stall;
                };
                let freq_hz = u64::from(mhz) * 1_000_000 + u64::from(hz);
                if device.tune(freq_hz) {
                    RequestResult::Ack
                } else {
                    RequestResult::Stall
                }
            }
            Request::SetFreqExplicit => {
                let (Some(if_hz), Some(lo_hz)) = (le_u64(&payload, 0), le_u64(&payload, 8))
                else {
                    return RequestResult::Stall;
                };
                let Some(&path_value) = payload.get(16) else {
                    return RequestResult::Stall;
                };
                let Some(path) = FilterPath::from_value(path_value) else {
                    return RequestResult::Stall;
                };
                if device.tune_explicit(if_hz, lo_hz, path) {
                    RequestResult::Ack
                } else {
                    RequestResult::Stall
                }
            }
            Request::SampleRateSet => {
                let (Some(rate_hz), Some(divider)) = (le_u32(&payload, 0), le_u32(&payload, 4))
                else {
                    return RequestResult::Stall;
                };
                // The codec samples on both clock edges, so the clock runs
                // at twice the requested rate.
                match device.set_sample_rate(rate_hz.wrapping_mul(2), divider) {
                    Ok(true) => RequestResult::Ack,
                    Ok(false) | Err(_) => RequestResult::Stall,
                }
            }
            _ => RequestResult::Stall,
        }
    }
}

fn le_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let slice = bytes.get(offset..offset + 4)?;
    let array: [u8; 4] = slice.try_into().ok()?;
    Some(u32::from_le_bytes(array))
}

fn le_u64(bytes: &[u8], offset: usize) -> Option<u64> {
    let slice = bytes.get(offset..offset + 8)?;
    let array: [u8; 8] = slice.try_into().ok()?;
    Some(u64::from_le_bytes(array))
}
