//! SDR Sample-Streaming Transceiver Firmware Core
//!
//! This library provides the real-time control core of a USB software
//! defined radio front end: the transceiver operating-mode machine, the
//! sample stream engine, the double-buffered host bulk transport and the
//! clock-generator sequencing that ties them together.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CONTROL PLANE                            │
//! │  Vendor Request Dispatcher  │  Transceiver Mode Controller   │
//! ├─────────────────────────────────────────────────────────────┤
//! │                     STREAMING PLANE                          │
//! │  Stream Engine (shift slices)  │  Double-Buffered Transport  │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   DRIVER / SEAM LAYER                        │
//! │  Si5351C Clock Gen  │  Two-Wire Bus  │  Pins  │  Endpoints   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Board bring-up (vector table, USB enumeration, pin muxing) and the
//! bit-level bus and endpoint drivers are external collaborators; this
//! crate owns the semantics between them.
//!
//! # Design Principles
//!
//! - **Owned device state**: one `Transceiver` struct, no globals; the two
//!   values shared with interrupt context are explicit atomics
//! - **Type-driven design**: undefined wire values never construct a mode
//! - **Explicit error handling**: all fallible operations return `Result`
//! - **Mockable seams**: every hardware boundary is a trait

#![cfg_attr(feature = "embedded", no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export dependencies needed by platform binaries (only in embedded mode)
#[cfg(feature = "embedded")]
pub use cortex_m;
#[cfg(feature = "embedded")]
pub use cortex_m_rt;
#[cfg(feature = "embedded")]
pub use defmt_rtt;
#[cfg(feature = "embedded")]
pub use panic_probe;

/// Two-wire bus transport interface
pub mod bus;

/// Peripheral Drivers
///
/// High-level drivers for external ICs (Si5351C clock generator).
pub mod drivers;

/// Host control protocol
///
/// Vendor-request decoding, validation and dispatch.
pub mod protocol;

/// RF signal path switching, gain limits and status indication
pub mod rf_path;

/// Stream engine driving the sample shift peripheral
pub mod sgpio;

/// Transceiver mode controller
pub mod transceiver;

/// Double-buffered host bulk transport
pub mod transport;

/// Frequency planning and sample-clock derivation
pub mod tuning;

/// Shared types used across modules
pub mod types;

/// System configuration and constants
pub mod config;

/// Prelude module for common imports
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::config::*;
    pub use crate::types::*;

    pub use crate::bus::{BusError, BusResult, TwoWireBus};
    pub use crate::transceiver::Transceiver;
    pub use crate::transport::{Bank, BulkEndpoint, SampleBuffer, StreamPosition};

    // Common traits
    pub use embedded_hal::digital::OutputPin;

    // Error handling
    pub use core::result::Result;

    // Logging
    #[cfg(feature = "embedded")]
    pub use defmt::{debug, error, info, trace, warn};
}
