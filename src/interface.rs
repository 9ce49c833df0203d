//! Bus channel implementations for the BNO08x
//!
//! This module defines the bounded-transaction channel the SHTP transport
//! runs over, together with I2C and SPI implementations built on the
//! `embedded-hal` bus traits.

use crate::transport::MAX_TRANSFER_SIZE;
use crate::I2C_ADDRESS_DEFAULT;

/// Largest single I2C burst most controllers move without splitting; the
/// classic Arduino Wire buffer that made chunked frame reads necessary in
/// the first place.
pub const DEFAULT_I2C_TRANSFER_SIZE: usize = 32;

/// A byte channel to the sensor hub with a fixed per-transaction size limit
///
/// One `read` or `write` call is one physical bus transaction. The hub
/// places a fresh frame header at the start of every read transaction;
/// [`transport::read_frame`](crate::transport::read_frame) accounts for
/// that when it reassembles a frame across several transactions.
pub trait HubChannel {
    /// Channel error type
    type Error;

    /// Read exactly `buf.len()` bytes in one bus transaction
    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write `buf` in one bus transaction
    fn write(&mut self, buf: &[u8]) -> Result<(), Self::Error>;

    /// Largest byte count a single transaction may move
    fn max_transfer_size(&self) -> usize;
}

/// Async variant of [`HubChannel`]
#[cfg(feature = "async")]
pub trait AsyncHubChannel {
    /// Channel error type
    type Error;

    /// Read exactly `buf.len()` bytes in one bus transaction
    async fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write `buf` in one bus transaction
    async fn write(&mut self, buf: &[u8]) -> Result<(), Self::Error>;

    /// Largest byte count a single transaction may move
    fn max_transfer_size(&self) -> usize;
}

/// I2C channel to the BNO08x
pub struct I2cInterface<I2C> {
    i2c: I2C,
    address: u8,
    max_transfer: usize,
}

impl<I2C> I2cInterface<I2C> {
    /// Create a new I2C channel with the default address (0x4A, address
    /// pin LOW)
    ///
    /// # Example
    /// ```ignore
    /// let interface = I2cInterface::default(i2c);
    /// let mut imu = Bno08x::new(interface);
    /// ```
    pub const fn default(i2c: I2C) -> Self {
        Self::new(i2c, I2C_ADDRESS_DEFAULT)
    }

    /// Create a new I2C channel with the alternative address (0x4B,
    /// address pin HIGH)
    pub const fn alternative(i2c: I2C) -> Self {
        Self::new(i2c, crate::I2C_ADDRESS_ALTERNATE)
    }

    /// Create a new I2C channel with a custom device address
    ///
    /// For standard BNO08x configurations, prefer
    /// [`default()`](Self::default) or
    /// [`alternative()`](Self::alternative).
    pub const fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            max_transfer: DEFAULT_I2C_TRANSFER_SIZE,
        }
    }

    /// Override the per-transaction size limit
    ///
    /// The default of 32 bytes matches the most restrictive common I2C
    /// controller buffers; controllers that move larger bursts can raise
    /// it to cut down the number of transactions per frame.
    pub const fn with_max_transfer_size(mut self, size: usize) -> Self {
        self.max_transfer = size;
        self
    }

    /// Consume the channel and return the I2C peripheral
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C, E> HubChannel for I2cInterface<I2C>
where
    I2C: embedded_hal::i2c::I2c<Error = E>,
{
    type Error = E;

    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.read(self.address, buf)
    }

    fn write(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        self.i2c.write(self.address, buf)
    }

    fn max_transfer_size(&self) -> usize {
        self.max_transfer
    }
}

#[cfg(feature = "async")]
impl<I2C, E> AsyncHubChannel for I2cInterface<I2C>
where
    I2C: embedded_hal_async::i2c::I2c<Error = E>,
{
    type Error = E;

    async fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.read(self.address, buf).await
    }

    async fn write(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        self.i2c.write(self.address, buf).await
    }

    fn max_transfer_size(&self) -> usize {
        self.max_transfer
    }
}

/// SPI channel to the BNO08x
///
/// # Note on Chip Select
///
/// This channel uses the `SpiDevice` trait from `embedded-hal`, which
/// manages the chip select (CS) pin automatically, so the pin is not
/// passed separately.
///
/// If using `embedded-hal-bus`, you would typically create an `SpiDevice`
/// like:
/// ```ignore
/// let spi_device = embedded_hal_bus::spi::ExclusiveDevice::new(spi_bus, cs_pin, delay);
/// let interface = SpiInterface::new(spi_device);
/// ```
pub struct SpiInterface<SPI> {
    spi: SPI,
    max_transfer: usize,
}

impl<SPI> SpiInterface<SPI> {
    /// Create a new SPI channel with the given SPI device
    ///
    /// SPI moves whole frames in fewer transactions than I2C; the default
    /// per-transaction limit is the transport's scratch capacity.
    pub const fn new(spi: SPI) -> Self {
        Self {
            spi,
            max_transfer: MAX_TRANSFER_SIZE,
        }
    }

    /// Override the per-transaction size limit
    pub const fn with_max_transfer_size(mut self, size: usize) -> Self {
        self.max_transfer = size;
        self
    }

    /// Consume the channel and return the SPI device
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI, E> HubChannel for SpiInterface<SPI>
where
    SPI: embedded_hal::spi::SpiDevice<Error = E>,
{
    type Error = E;

    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.spi.read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        self.spi.write(buf)
    }

    fn max_transfer_size(&self) -> usize {
        self.max_transfer
    }
}

#[cfg(feature = "async")]
impl<SPI, E> AsyncHubChannel for SpiInterface<SPI>
where
    SPI: embedded_hal_async::spi::SpiDevice<Error = E>,
{
    type Error = E;

    async fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.spi.read(buf).await
    }

    async fn write(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        self.spi.write(buf).await
    }

    fn max_transfer_size(&self) -> usize {
        self.max_transfer
    }
}
