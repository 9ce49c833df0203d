//! Transport callbacks for a sensor-hub protocol engine
//!
//! A sensor-hub protocol engine drives its transport through a small
//! open/read/write/time/close callback set. [`ChannelHal`] packages a bus
//! channel and a clock into that shape, so the engine is handed an
//! explicit context object instead of reaching for process-wide bus
//! state.

use crate::interface::HubChannel;
use crate::transport;
use crate::Error;

/// Monotonic microsecond clock
///
/// Queried once per completed frame read to timestamp the frame, and on
/// demand through [`HubHal::time_us`].
pub trait TimeSource {
    /// Current timestamp in microseconds
    fn now_us(&mut self) -> u32;
}

/// The transport callback set a sensor-hub protocol engine drives
pub trait HubHal {
    /// Transport error type
    type Error;

    /// Bring the transport up
    fn open(&mut self) -> Result<(), Self::Error>;

    /// Shut the transport down
    fn close(&mut self);

    /// Read one frame into `dest`
    ///
    /// Returns the frame length together with the timestamp at which the
    /// read completed. A length of 0 means nothing was pending.
    fn read(&mut self, dest: &mut [u8]) -> Result<(usize, u32), Self::Error>;

    /// Write one frame from `src`; returns the number of bytes written
    fn write(&mut self, src: &[u8]) -> Result<usize, Self::Error>;

    /// Current timestamp in microseconds
    fn time_us(&mut self) -> u32;
}

/// [`HubHal`] implementation over any bus channel and clock
pub struct ChannelHal<C, T> {
    channel: C,
    clock: T,
}

impl<C, T> ChannelHal<C, T> {
    /// Create a HAL context from a channel and a clock
    pub const fn new(channel: C, clock: T) -> Self {
        Self { channel, clock }
    }

    /// Consume the context and return the channel and clock
    pub fn release(self) -> (C, T) {
        (self.channel, self.clock)
    }
}

impl<C, T, E> HubHal for ChannelHal<C, T>
where
    C: HubChannel<Error = E>,
    T: TimeSource,
{
    type Error = Error<E>;

    fn open(&mut self) -> Result<(), Self::Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("hal open");
        Ok(())
    }

    fn close(&mut self) {
        #[cfg(feature = "defmt")]
        defmt::trace!("hal close");
    }

    fn read(&mut self, dest: &mut [u8]) -> Result<(usize, u32), Self::Error> {
        let len = transport::read_frame(&mut self.channel, dest)?;
        let timestamp = self.clock.now_us();
        Ok((len, timestamp))
    }

    fn write(&mut self, src: &[u8]) -> Result<usize, Self::Error> {
        transport::write_frame(&mut self.channel, src)
    }

    fn time_us(&mut self) -> u32 {
        self.clock.now_us()
    }
}
