#![no_std]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![allow(async_fn_in_trait)]

pub mod device;
pub mod hal;
pub mod interface;
pub mod transport;

// Re-export main types
pub use device::{Bno08x, NoResetPin, ProductId, ProductIds};
pub use hal::{ChannelHal, HubHal, TimeSource};
#[cfg(feature = "async")]
pub use interface::AsyncHubChannel;
pub use interface::{HubChannel, I2cInterface, SpiInterface};
pub use transport::{FrameHeader, HEADER_LENGTH, MAX_TRANSFER_SIZE};

/// BNO08x I2C address when the address-select pin is low (default: 0x4A)
///
/// This is the most common configuration; most breakout boards pull the
/// pin low. Use [`I2cInterface::default()`] for this configuration.
pub const I2C_ADDRESS_DEFAULT: u8 = 0x4A;

/// BNO08x I2C address when the address-select pin is high (alternative: 0x4B)
///
/// Use [`I2cInterface::alternative()`] for this configuration.
pub const I2C_ADDRESS_ALTERNATE: u8 = 0x4B;

/// Command channel (advertisements, error lists)
pub const CHANNEL_COMMAND: u8 = 0;
/// Executable channel (reset, on/off)
pub const CHANNEL_EXECUTABLE: u8 = 1;
/// Sensor-hub control channel (product ID, feature commands)
pub const CHANNEL_HUB_CONTROL: u8 = 2;
/// Non-wake sensor input reports
pub const CHANNEL_INPUT_REPORTS: u8 = 3;
/// Wake sensor input reports
pub const CHANNEL_WAKE_REPORTS: u8 = 4;
/// Gyro rotation vector channel
pub const CHANNEL_GYRO_ROTATION: u8 = 5;

/// Number of channels the hub multiplexes over one transport
pub const NUM_CHANNELS: usize = 6;

/// Driver errors
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Communication error with the device
    Bus(E),
    /// Declared frame length exceeds the destination buffer (contains the
    /// declared length)
    FrameTooLarge(usize),
    /// Transfer window too small to carry a continuation header (contains
    /// the window size)
    ChannelTooNarrow(usize),
    /// Reset line could not be driven
    ResetPin,
    /// Initialization timed out (the hub never answered the product ID
    /// request)
    InitializationTimeout,
}

impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Self::Bus(error)
    }
}
