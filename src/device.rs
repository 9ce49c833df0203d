//! High-level driver for the BNO08x
//!
//! This module owns the bus channel, the optional reset line, and the
//! per-channel sequence counters, and provides reset handling plus the
//! initialization handshake: draining the hub's unsolicited startup
//! frames and verifying the product ID.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::interface::HubChannel;
use crate::transport::{self, FrameHeader, HEADER_LENGTH};
use crate::{Error, CHANNEL_EXECUTABLE, CHANNEL_HUB_CONTROL, NUM_CHANNELS};

/// Receive buffer capacity
///
/// Must hold the largest frame the hub sends unsolicited; the startup
/// advertisement runs to roughly 280 bytes.
pub const RECV_BUFFER_LEN: usize = 512;

/// Send buffer capacity; the driver only sends short control frames
const SEND_BUFFER_LEN: usize = 64;

/// Executable-channel reset command
const EXECUTABLE_RESET: u8 = 1;
/// Product ID request report
const PRODUCT_ID_REQUEST: u8 = 0xF9;
/// Product ID response report
const PRODUCT_ID_RESPONSE: u8 = 0xF8;
/// Bytes per product ID response entry
const PRODUCT_ID_ENTRY_LEN: usize = 16;

/// Settle time after a reset before the hub answers
const RESET_SETTLE_MS: u32 = 100;
/// Frames drained after reset before initialization proceeds
const STARTUP_DRAIN_ATTEMPTS: usize = 8;
/// Read attempts allowed while waiting for the product ID response
const PRODUCT_ID_ATTEMPTS: usize = 10;

/// One product ID response entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProductId {
    /// Cause of the last reset, as reported by the hub
    pub reset_cause: u8,
    /// Software version (major)
    pub sw_version_major: u8,
    /// Software version (minor)
    pub sw_version_minor: u8,
    /// Software version (patch)
    pub sw_version_patch: u16,
    /// Software part number
    pub sw_part_number: u32,
    /// Software build number
    pub sw_build_number: u32,
}

/// Product ID entries reported by the hub during initialization
pub type ProductIds = heapless::Vec<ProductId, 4>;

/// Placeholder reset pin for boards where the reset line is not wired
#[derive(Debug, Clone, Copy)]
pub struct NoResetPin;

impl embedded_hal::digital::ErrorType for NoResetPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for NoResetPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Main driver for the BNO08x
pub struct Bno08x<C, RST> {
    channel: C,
    reset_pin: Option<RST>,
    sequence_numbers: [u8; NUM_CHANNELS],
    send_buf: [u8; SEND_BUFFER_LEN],
    recv_buf: [u8; RECV_BUFFER_LEN],
}

impl<C> Bno08x<C, NoResetPin> {
    /// Create a driver without a reset line
    ///
    /// Initialization falls back to the executable-channel reset command.
    pub const fn new(channel: C) -> Self {
        Self {
            channel,
            reset_pin: None,
            sequence_numbers: [0; NUM_CHANNELS],
            send_buf: [0; SEND_BUFFER_LEN],
            recv_buf: [0; RECV_BUFFER_LEN],
        }
    }
}

impl<C, RST> Bno08x<C, RST> {
    /// Create a driver with a dedicated reset line
    pub const fn with_reset_pin(channel: C, reset_pin: RST) -> Self {
        Self {
            channel,
            reset_pin: Some(reset_pin),
            sequence_numbers: [0; NUM_CHANNELS],
            send_buf: [0; SEND_BUFFER_LEN],
            recv_buf: [0; RECV_BUFFER_LEN],
        }
    }

    /// Consume the driver and return the bus channel
    pub fn release(self) -> C {
        self.channel
    }
}

impl<C, RST, E> Bno08x<C, RST>
where
    C: HubChannel<Error = E>,
    RST: OutputPin,
{
    /// Initialize the hub
    ///
    /// Resets the device (through the reset line when one was provided,
    /// the reset command otherwise), drains the unsolicited startup
    /// frames, then requests and decodes the product ID entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InitializationTimeout`] if the product ID response
    /// never arrives; bus errors are propagated.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mut imu = Bno08x::with_reset_pin(interface, reset_pin);
    /// let product_ids = imu.init(&mut delay)?;
    /// ```
    pub fn init<D>(&mut self, delay: &mut D) -> Result<ProductIds, Error<E>>
    where
        D: DelayNs,
    {
        if self.reset_pin.is_some() {
            self.hardware_reset(delay)?;
        } else {
            self.soft_reset()?;
            delay.delay_ms(RESET_SETTLE_MS);
        }

        // the hub announces itself unsolicited after reset; consume the
        // advertisement and reset-complete frames
        for _ in 0..STARTUP_DRAIN_ATTEMPTS {
            if self.receive_packet()?.is_empty() {
                break;
            }
            delay.delay_ms(1);
        }

        self.send_packet(CHANNEL_HUB_CONTROL, &[PRODUCT_ID_REQUEST, 0])?;

        for _ in 0..PRODUCT_ID_ATTEMPTS {
            let frame = self.receive_packet()?;
            if frame.len() > HEADER_LENGTH {
                let header =
                    FrameHeader::decode([frame[0], frame[1], frame[2], frame[3]]);
                if header.channel == CHANNEL_HUB_CONTROL
                    && frame[HEADER_LENGTH] == PRODUCT_ID_RESPONSE
                {
                    return Ok(decode_product_ids(&frame[HEADER_LENGTH..]));
                }
            }
            delay.delay_ms(1);
        }

        Err(Error::InitializationTimeout)
    }

    /// Reset the hub through the reset line
    ///
    /// A no-op when the driver was built without one. Holds the line low
    /// for 1 ms, then waits out the hub's boot time.
    pub fn hardware_reset<D>(&mut self, delay: &mut D) -> Result<(), Error<E>>
    where
        D: DelayNs,
    {
        let reset = match self.reset_pin.as_mut() {
            Some(pin) => pin,
            None => return Ok(()),
        };

        #[cfg(feature = "defmt")]
        defmt::debug!("hardware reset");

        reset.set_high().map_err(|_| Error::ResetPin)?;
        delay.delay_ms(1);
        reset.set_low().map_err(|_| Error::ResetPin)?;
        delay.delay_ms(1);
        reset.set_high().map_err(|_| Error::ResetPin)?;
        delay.delay_ms(RESET_SETTLE_MS);

        Ok(())
    }

    /// Tell the hub to reset through the executable channel
    ///
    /// Used when no reset line is wired up. The hub answers with its
    /// startup frames, which the caller is expected to drain.
    pub fn soft_reset(&mut self) -> Result<(), Error<E>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("soft reset");

        self.send_packet(CHANNEL_EXECUTABLE, &[EXECUTABLE_RESET])?;
        Ok(())
    }

    /// Read one frame into the driver's receive buffer
    ///
    /// Returns the frame (header included), or an empty slice when the
    /// hub has nothing pending.
    pub fn receive_packet(&mut self) -> Result<&[u8], Error<E>> {
        let len = transport::read_frame(&mut self.channel, &mut self.recv_buf)?;
        Ok(&self.recv_buf[..len])
    }

    /// Build a frame around `body` and send it on `channel`
    fn send_packet(&mut self, channel: u8, body: &[u8]) -> Result<usize, Error<E>> {
        let frame_len = body.len() + HEADER_LENGTH;
        let sequence = self.sequence_numbers[channel as usize];
        self.sequence_numbers[channel as usize] = sequence.wrapping_add(1);

        let header = FrameHeader::encode(frame_len as u16, channel, sequence);
        self.send_buf[..HEADER_LENGTH].copy_from_slice(&header);
        self.send_buf[HEADER_LENGTH..frame_len].copy_from_slice(body);

        transport::write_frame(&mut self.channel, &self.send_buf[..frame_len])
    }
}

/// Decode the 16-byte entries of a product ID response payload
fn decode_product_ids(payload: &[u8]) -> ProductIds {
    let mut ids = ProductIds::new();

    for entry in payload.chunks_exact(PRODUCT_ID_ENTRY_LEN) {
        if entry[0] != PRODUCT_ID_RESPONSE {
            break;
        }

        let id = ProductId {
            reset_cause: entry[1],
            sw_version_major: entry[2],
            sw_version_minor: entry[3],
            sw_part_number: u32::from_le_bytes([entry[4], entry[5], entry[6], entry[7]]),
            sw_build_number: u32::from_le_bytes([entry[8], entry[9], entry[10], entry[11]]),
            sw_version_patch: u16::from_le_bytes([entry[12], entry[13]]),
        };

        #[cfg(feature = "defmt")]
        defmt::info!(
            "part {}: version {}.{}.{} build {}",
            id.sw_part_number,
            id.sw_version_major,
            id.sw_version_minor,
            id.sw_version_patch,
            id.sw_build_number
        );

        if ids.push(id).is_err() {
            break;
        }
    }

    ids
}
