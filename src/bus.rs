//! Two-wire bus transport interface
//!
//! The clock generator is reached over a two-wire bus whose bit-level
//! implementation lives outside this crate. The trait below models the
//! primitive set at its interface: start/transmit/receive/stop plus a
//! write-then-optional-read convenience with all-or-nothing framing.
//!
//! Each primitive is bounded by a fixed retry count inside the
//! implementation; expiry surfaces as [`BusError::TimedOut`] instead of
//! silently returning stale data, so the caller decides what to do about a
//! stuck bus. A session (start..stop) is single-owner and non-reentrant;
//! callers must not interleave transactions.

/// Two-wire bus failure
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusError {
    /// The bounded wait on the hardware-ready bit expired
    TimedOut,
}

#[cfg(feature = "embedded")]
impl defmt::Format for BusError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::TimedOut => defmt::write!(f, "BUS-TIMEOUT"),
        }
    }
}

/// Two-wire bus operation result
pub type BusResult<T> = Result<T, BusError>;

/// Two-wire bus primitive set
///
/// Implemented by the platform's bus driver; implemented by mocks in tests.
pub trait TwoWireBus {
    /// Issue a (repeated) start condition
    fn start(&mut self) -> BusResult<()>;

    /// Shift one byte out, including the address byte
    fn transmit(&mut self, byte: u8) -> BusResult<()>;

    /// Shift one byte in, acknowledging it unless it is the last of the read
    fn receive(&mut self, ack: bool) -> BusResult<u8>;

    /// Issue a stop condition, releasing the bus
    fn stop(&mut self) -> BusResult<()>;

    /// Write `tx` to `address`, then read `rx.len()` bytes back
    ///
    /// Either phase may be empty. Framing is all-or-nothing: on a timeout
    /// the session is abandoned and no partial-transfer detail is reported.
    fn transfer(&mut self, address: u8, tx: &[u8], rx: &mut [u8]) -> BusResult<()> {
        if tx.is_empty() && rx.is_empty() {
            return Ok(());
        }
        if !tx.is_empty() {
            self.start()?;
            self.transmit(address << 1)?;
            for &byte in tx {
                self.transmit(byte)?;
            }
        }
        if !rx.is_empty() {
            self.start()?;
            self.transmit((address << 1) | 1)?;
            let last = rx.len() - 1;
            for (i, byte) in rx.iter_mut().enumerate() {
                *byte = self.receive(i != last)?;
            }
        }
        self.stop()
    }
}
