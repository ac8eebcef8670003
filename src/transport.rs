//! Double-buffered host bulk transport
//!
//! The sample ring is one contiguous buffer split into two equal banks. The
//! converter side fills or drains it continuously through the stream engine
//! while the host side moves whole banks over a bulk endpoint. The hand-off
//! rule is positional: a bank belongs to the host exactly while the
//! converter is working in the other one, so the only shared state is the
//! converter's write/read offset.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::config::{BANK_SIZE, SAMPLE_BUFFER_SIZE};
use crate::types::{ModeFlag, TransceiverMode};

/// One half of the double-buffered sample ring
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bank {
    /// First half of the ring
    Low,
    /// Second half of the ring
    High,
}

impl Bank {
    /// Byte offset of this bank in the ring
    #[must_use]
    pub const fn offset(self) -> usize {
        match self {
            Self::Low => 0,
            Self::High => BANK_SIZE,
        }
    }

    /// The opposite bank
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Bank {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Low => defmt::write!(f, "BANK-LO"),
            Self::High => defmt::write!(f, "BANK-HI"),
        }
    }
}

/// Converter-side offset into the sample ring
///
/// Advanced by the sample-clock interrupt, polled by the streaming loop.
/// Single writer; release/acquire keeps the loop from handing a bank to the
/// host before the converter has left it.
#[derive(Default)]
pub struct StreamPosition(AtomicU32);

impl StreamPosition {
    /// Position at the start of the ring
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    /// Current byte offset
    #[must_use]
    pub fn get(&self) -> usize {
        self.0.load(Ordering::Acquire) as usize
    }

    /// Publish a new byte offset
    pub fn set(&self, offset: usize) {
        self.0.store(offset as u32, Ordering::Release);
    }
}

/// The double-buffered sample ring
pub struct SampleBuffer {
    bytes: [u8; SAMPLE_BUFFER_SIZE],
}

impl SampleBuffer {
    /// A zeroed ring
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes: [0; SAMPLE_BUFFER_SIZE],
        }
    }

    /// Zero the whole ring
    pub fn zero(&mut self) {
        self.bytes.fill(0);
    }

    /// One bank's bytes
    #[must_use]
    pub fn bank(&self, bank: Bank) -> &[u8] {
        &self.bytes[bank.offset()..bank.offset() + BANK_SIZE]
    }

    /// One bank's bytes, writable
    pub fn bank_mut(&mut self, bank: Bank) -> &mut [u8] {
        &mut self.bytes[bank.offset()..bank.offset() + BANK_SIZE]
    }
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// One direction of the host bulk pipe
///
/// Implemented by the platform's endpoint driver; implemented by mocks in
/// tests. A queued transfer always covers exactly one bank.
pub trait BulkEndpoint {
    /// Queue a transfer over the given bank
    fn schedule(&mut self, bank: Bank, buffer: &mut SampleBuffer);

    /// Cancel any queued transfer and drop its data
    fn flush(&mut self);
}

/// Bank due for hand-off to the host, if any
///
/// `awaiting` is the bank whose hand-off the loop is waiting for. The low
/// bank is due once the converter has moved into the high bank and vice
/// versa; anything else means the converter is still inside the awaited
/// bank.
#[must_use]
pub fn next_due_bank(offset: usize, awaiting: Bank) -> Option<Bank> {
    match awaiting {
        Bank::Low if offset >= BANK_SIZE => Some(Bank::Low),
        Bank::High if offset < BANK_SIZE => Some(Bank::High),
        _ => None,
    }
}

/// Host bulk transport: one endpoint towards the host, one from it
pub struct BulkTransport<'a, I, O> {
    mode: &'a ModeFlag,
    position: &'a StreamPosition,
    to_host: I,
    from_host: O,
}

impl<'a, I: BulkEndpoint, O: BulkEndpoint> BulkTransport<'a, I, O> {
    /// Bind the transport to the shared mode flag and stream position
    pub const fn new(
        mode: &'a ModeFlag,
        position: &'a StreamPosition,
        to_host: I,
        from_host: O,
    ) -> Self {
        Self {
            mode,
            position,
            to_host,
            from_host,
        }
    }

    /// Flush both directions, dropping any in-flight bank
    pub fn flush(&mut self) {
        self.to_host.flush();
        self.from_host.flush();
    }

    /// Receive streaming loop
    ///
    /// Hands each bank to the host as soon as the converter leaves it.
    /// Returns when the shared mode no longer matches `serving`; the
    /// caller tears the stream down afterwards.
    pub fn run_receive(&mut self, serving: TransceiverMode, buffer: &mut SampleBuffer) {
        let mut awaiting = Bank::Low;
        while self.mode.get() == serving {
            if let Some(bank) = next_due_bank(self.position.get(), awaiting) {
                self.to_host.schedule(bank, buffer);
                awaiting = bank.other();
            }
        }
    }

    /// Prepare the ring for transmit
    ///
    /// Zeroes the ring so the converter radiates silence until real host
    /// data lands, and requests the high bank up front while the converter
    /// starts draining the low one. The caller enables the stream after
    /// this and then enters [`run_transmit`].
    ///
    /// [`run_transmit`]: Self::run_transmit
    pub fn prime_transmit(&mut self, buffer: &mut SampleBuffer) {
        buffer.zero();
        self.from_host.schedule(Bank::High, buffer);
    }

    /// Transmit streaming loop
    pub fn run_transmit(&mut self, buffer: &mut SampleBuffer) {
        let mut awaiting = Bank::Low;
        while self.mode.get() == TransceiverMode::Transmit {
            if let Some(bank) = next_due_bank(self.position.get(), awaiting) {
                self.from_host.schedule(bank, buffer);
                awaiting = bank.other();
            }
        }
    }

    /// Outbound endpoint, for inspection in tests
    #[must_use]
    pub fn to_host(&self) -> &I {
        &self.to_host
    }

    /// Inbound endpoint, for inspection in tests
    #[must_use]
    pub fn from_host(&self) -> &O {
        &self.from_host
    }
}
