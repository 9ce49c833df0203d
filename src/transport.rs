//! SHTP frame transport
//!
//! One logical frame can be larger than what a single bus transaction may
//! move. [`read_frame`] reassembles a frame out of as many bounded
//! transactions as the channel's transfer window requires; the hub repeats
//! the 4-byte header at the start of every transaction, and the repeats
//! are stripped before the payload is appended. [`write_frame`] is a
//! single bounded transaction; the hub does not accept fragmented writes.

use crate::interface::HubChannel;
use crate::Error;

/// Frame header length in bytes
pub const HEADER_LENGTH: usize = 4;

/// Scratch capacity for a single bus transaction
///
/// The effective transfer window is the smaller of this and the channel's
/// own limit.
pub const MAX_TRANSFER_SIZE: usize = 256;

/// The high bit of the length field flags a continued transfer
const LENGTH_MASK: u16 = 0x7FFF;

/// Decoded frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameHeader {
    /// Total frame length in bytes, header included
    pub length: u16,
    /// Channel number
    pub channel: u8,
    /// Per-channel sequence number
    pub sequence: u8,
    /// Continued-transfer flag (high bit of the length field)
    pub continuation: bool,
}

impl FrameHeader {
    /// Decode a raw 4-byte header
    ///
    /// The length field is little-endian with its high bit reserved as the
    /// continuation flag; the flag is masked off the returned length.
    pub fn decode(raw: [u8; HEADER_LENGTH]) -> Self {
        let field = u16::from_le_bytes([raw[0], raw[1]]);
        Self {
            length: field & LENGTH_MASK,
            channel: raw[2],
            sequence: raw[3],
            continuation: (field & !LENGTH_MASK) != 0,
        }
    }

    /// Encode a header for a frame of `length` total bytes on `channel`
    pub fn encode(length: u16, channel: u8, sequence: u8) -> [u8; HEADER_LENGTH] {
        let [lsb, msb] = length.to_le_bytes();
        [lsb, msb, channel, sequence]
    }
}

/// Read one logical frame into `dest`
///
/// Issues a 4-byte transaction to probe the header, then as many bounded
/// transactions as the transfer window requires. The declared length
/// counts the header, and the hub re-sends a header at the start of every
/// transaction: the copy carried by the first chunk is the one that lands
/// in `dest`, and the copies on later chunks are discarded.
///
/// Returns the total frame length (header included), or 0 when the hub
/// has nothing pending. On failure the channel's read cursor has already
/// advanced and the contents of `dest` are undefined.
///
/// # Errors
///
/// - [`Error::ChannelTooNarrow`] if the window cannot carry a continuation
///   header; no transaction is issued.
/// - [`Error::FrameTooLarge`] if the declared length exceeds `dest`; only
///   the header probe has been issued.
/// - [`Error::Bus`] if any transaction fails.
pub fn read_frame<C, E>(channel: &mut C, dest: &mut [u8]) -> Result<usize, Error<E>>
where
    C: HubChannel<Error = E>,
{
    let window = channel.max_transfer_size().min(MAX_TRANSFER_SIZE);
    if window <= HEADER_LENGTH {
        return Err(Error::ChannelTooNarrow(window));
    }

    let mut header = [0u8; HEADER_LENGTH];
    channel.read(&mut header)?;

    let frame_len = FrameHeader::decode(header).length as usize;
    if frame_len == 0 {
        // nothing pending
        return Ok(0);
    }
    if frame_len > dest.len() {
        return Err(Error::FrameTooLarge(frame_len));
    }

    #[cfg(feature = "defmt")]
    defmt::trace!("frame of {} bytes, window {}", frame_len, window);

    let mut scratch = [0u8; MAX_TRANSFER_SIZE];
    let mut remaining = frame_len;
    let mut offset = 0;
    let mut first_chunk = true;

    while remaining > 0 {
        let read_size = if first_chunk {
            window.min(remaining)
        } else {
            // account for the header the hub re-sends
            window.min(remaining + HEADER_LENGTH)
        };

        channel.read(&mut scratch[..read_size])?;

        let chunk = if first_chunk {
            // the first chunk starts with the header that belongs in `dest`
            first_chunk = false;
            &scratch[..read_size]
        } else {
            &scratch[HEADER_LENGTH..read_size]
        };

        dest[offset..offset + chunk.len()].copy_from_slice(chunk);
        offset += chunk.len();
        remaining -= chunk.len();

        #[cfg(feature = "defmt")]
        defmt::trace!("read {} bytes, {} remaining", read_size, remaining);
    }

    Ok(frame_len)
}

/// Write one frame in a single bounded transaction
///
/// The transaction is capped at the transfer window; a longer `src` is
/// truncated to it. There is no chunking loop on the write path — the
/// hub's protocol assumes a frame arrives in one transaction — so the
/// returned count can be less than `src.len()`.
///
/// # Errors
///
/// [`Error::Bus`] if the transaction fails; nothing has been retried.
pub fn write_frame<C, E>(channel: &mut C, src: &[u8]) -> Result<usize, Error<E>>
where
    C: HubChannel<Error = E>,
{
    let window = channel.max_transfer_size().min(MAX_TRANSFER_SIZE);
    let write_size = src.len().min(window);

    channel.write(&src[..write_size])?;
    Ok(write_size)
}

/// Async mirrors of the transport entry points
#[cfg(feature = "async")]
pub mod asynch {
    use super::{FrameHeader, HEADER_LENGTH, MAX_TRANSFER_SIZE};
    use crate::interface::AsyncHubChannel;
    use crate::Error;

    /// Read one logical frame into `dest`
    ///
    /// Behaves exactly like [`read_frame`](super::read_frame) with the bus
    /// transactions awaited.
    pub async fn read_frame<C, E>(channel: &mut C, dest: &mut [u8]) -> Result<usize, Error<E>>
    where
        C: AsyncHubChannel<Error = E>,
    {
        let window = channel.max_transfer_size().min(MAX_TRANSFER_SIZE);
        if window <= HEADER_LENGTH {
            return Err(Error::ChannelTooNarrow(window));
        }

        let mut header = [0u8; HEADER_LENGTH];
        channel.read(&mut header).await?;

        let frame_len = FrameHeader::decode(header).length as usize;
        if frame_len == 0 {
            return Ok(0);
        }
        if frame_len > dest.len() {
            return Err(Error::FrameTooLarge(frame_len));
        }

        let mut scratch = [0u8; MAX_TRANSFER_SIZE];
        let mut remaining = frame_len;
        let mut offset = 0;
        let mut first_chunk = true;

        while remaining > 0 {
            let read_size = if first_chunk {
                window.min(remaining)
            } else {
                window.min(remaining + HEADER_LENGTH)
            };

            channel.read(&mut scratch[..read_size]).await?;

            let chunk = if first_chunk {
                first_chunk = false;
                &scratch[..read_size]
            } else {
                &scratch[HEADER_LENGTH..read_size]
            };

            dest[offset..offset + chunk.len()].copy_from_slice(chunk);
            offset += chunk.len();
            remaining -= chunk.len();
        }

        Ok(frame_len)
    }

    /// Write one frame in a single bounded transaction
    ///
    /// Behaves exactly like [`write_frame`](super::write_frame) with the
    /// bus transaction awaited.
    pub async fn write_frame<C, E>(channel: &mut C, src: &[u8]) -> Result<usize, Error<E>>
    where
        C: AsyncHubChannel<Error = E>,
    {
        let window = channel.max_transfer_size().min(MAX_TRANSFER_SIZE);
        let write_size = src.len().min(window);

        channel.write(&src[..write_size]).await?;
        Ok(write_size)
    }
}
