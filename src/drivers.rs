//! Hardware device drivers
//!
//! Bus-attached peripherals of the transceiver board. Each driver is generic
//! over its transport so the register traffic can be exercised without
//! hardware.

pub mod si5351;
