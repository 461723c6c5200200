//!# CAN Controller device
//!
//!```
//!# use xl2515::can::Controller;
//!# use xl2515::example::*;
//!# use xl2515::interrupt::ReceiveSignal;
//!#
//! static CAN_RX: ReceiveSignal = ReceiveSignal::new();
//!
//! let spi_bus = ExampleSPIBus::default();
//! let cs_pin = ExampleCSPin {};
//! let delay = ExampleDelay {};
//!
//! // Initialize controller object
//! let mut can_controller: Controller<_, _, _, ExampleClock> = Controller::new(spi_bus, cs_pin, delay, &CAN_RX);
//!
//! // Reset and configure the CAN controller for 125 kbit/s
//! can_controller.initialize("125KBPS").unwrap();
//! ```

use crate::config::{BitRate, Configuration};
use crate::frame::{CanFrame, MAX_PAYLOAD};
use crate::interrupt::ReceiveSignal;
use crate::registers::{CanCtrl, CanInterrupts, DlcReg, SidReg, TxbCtrl};
use crate::status::{OperationMode, OperationStatus};
use core::marker::PhantomData;
use embedded_can::{Frame, StandardId};
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::spi::Transfer;
use embedded_hal::digital::v2::OutputPin;
use embedded_time::duration::Milliseconds;
use embedded_time::Clock;
use log::{debug, warn};

const REGISTER_RXF0SIDH: u8 = 0x00;
const REGISTER_RXF0SIDL: u8 = 0x01;
const REGISTER_CANSTAT: u8 = 0x0E;
const REGISTER_CANCTRL: u8 = 0x0F;
const REGISTER_RXM0SIDH: u8 = 0x20;
const REGISTER_RXM0SIDL: u8 = 0x21;
const REGISTER_CNF3: u8 = 0x28;
const REGISTER_CNF2: u8 = 0x29;
const REGISTER_CNF1: u8 = 0x2A;
const REGISTER_CANINTE: u8 = 0x2B;
const REGISTER_CANINTF: u8 = 0x2C;

const REGISTER_TXB0CTRL: u8 = 0x30;
const REGISTER_TXB0SIDH: u8 = 0x31;
const REGISTER_TXB0SIDL: u8 = 0x32;
const REGISTER_TXB0EID8: u8 = 0x33;
const REGISTER_TXB0EID0: u8 = 0x34;
const REGISTER_TXB0DLC: u8 = 0x35;
const REGISTER_TXB0D0: u8 = 0x36;

const REGISTER_RXB0CTRL: u8 = 0x60;
const REGISTER_RXB0SIDH: u8 = 0x61;
const REGISTER_RXB0SIDL: u8 = 0x62;
const REGISTER_RXB0DLC: u8 = 0x65;
const REGISTER_RXB0D0: u8 = 0x66;

/// Time the device needs after reset before register writes are honored
const RESET_SETTLE_MS: u8 = 100;

/// Max. number of TXREQ polls before a frame is submitted regardless
const TX_BUSY_ATTEMPTS: u8 = 50;

/// Delay between two TXREQ polls
const TX_BUSY_BACKOFF_MS: u8 = 1;

/// Max. time [CanController::recv] waits for the RX0IF flag once the interrupt was signaled
pub const RECEIVE_TIMEOUT_MS: u32 = 10;

/// Identifier loaded into TX buffer 0, acceptance filter 0 and mask 0 during configuration
const DEFAULT_IDENTIFIER: u16 = 0x7FF;

/// RXB0SIDH/RXB0SIDL values written during configuration and restored after each reception
const RX_DEFAULT_SID: [u8; 2] = [0x00, 0x60];

/// RXB0CTRL: RXM = 0b11, filters and masks off, any message is received
const RXB0CTRL_RECEIVE_ANY: u8 = 0x60;

#[derive(Debug, PartialEq)]
pub enum BusError<B, CS> {
    /// SPI transfer failed
    TransferError(B),
    /// Chip select pin could not be set
    CSError(CS),
}

/// Possible errors during initialization/configuration
#[derive(Debug, PartialEq)]
pub enum ConfigError<B, CS> {
    /// SPI bus transfer error
    BusError(BusError<B, CS>),
    /// Requested bit rate name is not supported
    UnknownBitRate,
}

impl<B, CS> From<BusError<B, CS>> for ConfigError<B, CS> {
    fn from(value: BusError<B, CS>) -> Self {
        Self::BusError(value)
    }
}

/// Possible CAN errors during transmission/reception
#[derive(Debug, PartialEq)]
pub enum CanError<B, CS> {
    /// SPI bus transfer error
    BusError(BusError<B, CS>),
    /// Internal clock error
    ClockError,
    /// RX0IF not set within [RECEIVE_TIMEOUT_MS] after the interrupt was signaled
    Timeout,
    /// Only standard identifiers are supported
    ExtendedIdUnsupported,
}

impl<B, CS> From<BusError<B, CS>> for CanError<B, CS> {
    fn from(value: BusError<B, CS>) -> Self {
        Self::BusError(value)
    }
}

impl<B, CS> From<embedded_time::clock::Error> for CanError<B, CS> {
    fn from(_error: embedded_time::clock::Error) -> Self {
        Self::ClockError
    }
}

/// Main XL2515 CAN controller device
pub struct Controller<'a, B: Transfer<u8>, CS: OutputPin, D: DelayMs<u8>, CLK: Clock> {
    /// SPI bus
    bus: B,

    /// CS pin, active low
    pin_cs: CS,

    /// Delay for reset settling and TX back-off
    delay: D,

    /// Set by the INT pin falling edge handler
    signal: &'a ReceiveSignal,

    /// System clock
    clock: PhantomData<CLK>,
}

/// Trait for CAN controller
pub trait CanController {
    type Error;
    type Clock: Clock;

    /// Transmits a data frame using TX buffer 0.
    /// Payloads longer than 8 bytes are truncated.
    ///
    /// Waits up to 50 ms for a previous transmission to leave the buffer
    /// and submits the frame regardless if it did not.
    fn send(&mut self, identifier: StandardId, payload: &[u8]) -> Result<(), Self::Error>;

    /// Transmits the given standard data or remote frame, see [Self::send]
    fn transmit(&mut self, frame: &CanFrame) -> Result<(), Self::Error>;

    /// Returns the frame in RX buffer 0 if the receive interrupt was signaled, otherwise `None`
    /// without touching the bus.
    ///
    /// `identifier` is programmed as RX buffer 0 identifier while reading and used as identifier
    /// of the returned frame.
    fn recv(&mut self, identifier: StandardId, clock: &Self::Clock) -> Result<Option<CanFrame>, Self::Error>;
}

impl<B, CS, D, CLK> CanController for Controller<'_, B, CS, D, CLK>
where
    B: Transfer<u8>,
    CS: OutputPin,
    D: DelayMs<u8>,
    CLK: Clock,
{
    type Error = CanError<B::Error, CS::Error>;
    type Clock = CLK;

    fn send(&mut self, identifier: StandardId, payload: &[u8]) -> Result<(), Self::Error> {
        let payload = if payload.len() > MAX_PAYLOAD {
            debug!("Payload of {} bytes truncated to {MAX_PAYLOAD} bytes", payload.len());
            &payload[..MAX_PAYLOAD]
        } else {
            payload
        };

        let dlc = DlcReg::new().with_dlc(payload.len() as u8);
        self.submit(identifier, payload, dlc)?;

        Ok(())
    }

    fn transmit(&mut self, frame: &CanFrame) -> Result<(), Self::Error> {
        let identifier = frame.standard_id().ok_or(CanError::ExtendedIdUnsupported)?;

        if frame.is_remote_frame() {
            let dlc = DlcReg::new().with_rtr(true).with_dlc(frame.dlc().min(MAX_PAYLOAD) as u8);
            self.submit(identifier, &[], dlc)?;
            return Ok(());
        }

        self.send(identifier, frame.data())
    }

    fn recv(&mut self, identifier: StandardId, clock: &CLK) -> Result<Option<CanFrame>, Self::Error> {
        if !self.signal.take() {
            return Ok(None);
        }

        let [sidh, sidl] = SidReg::from_standard_id(identifier).to_registers();
        self.write_register(REGISTER_RXB0SIDH, sidh)?;
        self.write_register(REGISTER_RXB0SIDL, sidl)?;

        let received = self.wait_rx_buffer_full(clock).and_then(|()| self.read_rx_buffer());

        // Default identifier is restored on failure too, first error wins
        let restored = self.restore_rx_identifier();
        let (data, length) = received?;
        restored?;

        Ok(CanFrame::new(identifier, &data[..length]))
    }
}

impl<'a, B, CS, D, CLK> Controller<'a, B, CS, D, CLK>
where
    B: Transfer<u8>,
    CS: OutputPin,
    D: DelayMs<u8>,
    CLK: Clock,
{
    pub fn new(bus: B, pin_cs: CS, delay: D, signal: &'a ReceiveSignal) -> Self {
        Self {
            bus,
            pin_cs,
            delay,
            signal,
            clock: Default::default(),
        }
    }

    /// Releases bus, CS pin and delay
    pub fn release(self) -> (B, CS, D) {
        (self.bus, self.pin_cs, self.delay)
    }

    /// Resets the device and configures it for the bit rate of the given name, e.g. `125KBPS`.
    /// All other settings are taken from [Configuration::default].
    pub fn initialize(&mut self, bit_rate: &str) -> Result<(), ConfigError<B::Error, CS::Error>> {
        self.reset_and_settle()?;

        let bit_rate = BitRate::from_name(bit_rate).ok_or_else(|| {
            debug!("Unknown bit rate {bit_rate}");
            ConfigError::UnknownBitRate
        })?;

        self.configure(&Configuration {
            bit_rate,
            ..Configuration::default()
        })
    }

    /// Resets the device and applies the given configuration
    pub fn initialize_with(&mut self, config: &Configuration) -> Result<(), ConfigError<B::Error, CS::Error>> {
        self.reset_and_settle()?;
        self.configure(config)
    }

    /// Configures bit timing, buffers, filter and interrupts and requests normal mode.
    /// Device must be in configuration mode, which is the case after [Self::reset].
    pub fn configure(&mut self, config: &Configuration) -> Result<(), ConfigError<B::Error, CS::Error>> {
        let timing = config.bit_rate.timing();

        self.write_register(REGISTER_CNF1, timing.cnf1)?;
        self.write_register(REGISTER_CNF2, timing.cnf2)?;
        self.write_register(REGISTER_CNF3, timing.cnf3)?;

        let [sidh, sidl] = SidReg::new().with_sid(DEFAULT_IDENTIFIER).to_registers();

        self.write_register(REGISTER_TXB0SIDH, sidh)?;
        self.write_register(REGISTER_TXB0SIDL, sidl)?;
        self.write_register(
            REGISTER_TXB0DLC,
            DlcReg::new().with_rtr(true).with_dlc(MAX_PAYLOAD as u8).into(),
        )?;

        self.write_register(REGISTER_RXB0SIDH, RX_DEFAULT_SID[0])?;
        self.write_register(REGISTER_RXB0SIDL, RX_DEFAULT_SID[1])?;
        self.write_register(REGISTER_RXB0CTRL, RXB0CTRL_RECEIVE_ANY)?;
        self.write_register(REGISTER_RXB0DLC, DlcReg::new().with_dlc(MAX_PAYLOAD as u8).into())?;

        self.write_register(REGISTER_RXF0SIDH, sidh)?;
        self.write_register(REGISTER_RXF0SIDL, sidl)?;
        self.write_register(REGISTER_RXM0SIDH, sidh)?;
        self.write_register(REGISTER_RXM0SIDL, sidl)?;

        self.write_register(REGISTER_CANINTF, 0x00)?;
        self.write_register(REGISTER_CANINTE, CanInterrupts::new().with_rx0(true).into())?;

        self.request_normal_mode(config.clock_output)?;

        Ok(())
    }

    /// Reads and returns the operation status
    pub fn read_operation_status(&mut self) -> Result<OperationStatus, BusError<B::Error, CS::Error>> {
        let data = self.read_register(REGISTER_CANSTAT)?;

        Ok(OperationStatus::from_register(data))
    }

    /// Reset internal register to default and switch to Configuration mode
    pub fn reset(&mut self) -> Result<(), BusError<B::Error, CS::Error>> {
        let mut buffer = [Operation::Reset as u8];
        self.transfer(&mut buffer)?;

        Ok(())
    }

    /// Reads a single register byte
    pub fn read_register(&mut self, register: u8) -> Result<u8, BusError<B::Error, CS::Error>> {
        let mut buffer = [Operation::Read as u8, register, 0x0];

        self.transfer(&mut buffer)
    }

    /// Writes a single register byte
    pub fn write_register(&mut self, register: u8, value: u8) -> Result<(), BusError<B::Error, CS::Error>> {
        let mut buffer = [Operation::Write as u8, register, value];

        self.transfer(&mut buffer)?;
        Ok(())
    }

    fn reset_and_settle(&mut self) -> Result<(), BusError<B::Error, CS::Error>> {
        self.reset()?;
        self.delay.delay_ms(RESET_SETTLE_MS);

        Ok(())
    }

    /// Requests normal mode and re-asserts the request once if CANSTAT does not confirm it
    fn request_normal_mode(&mut self, clock_output: bool) -> Result<(), BusError<B::Error, CS::Error>> {
        let request: u8 = CanCtrl::new()
            .with_reqop(OperationMode::Normal as u8)
            .with_clken(clock_output)
            .into();

        self.write_register(REGISTER_CANCTRL, request)?;

        let status = self.read_operation_status()?;
        if status.mode != OperationMode::Normal {
            warn!("Device did not enter normal mode. Current mode: {:?}", status.mode);
            self.write_register(REGISTER_CANCTRL, request)?;
        }

        Ok(())
    }

    /// Loads TX buffer 0 and sets TXREQ
    fn submit(
        &mut self,
        identifier: StandardId,
        payload: &[u8],
        dlc: DlcReg,
    ) -> Result<(), BusError<B::Error, CS::Error>> {
        self.wait_tx_buffer()?;

        let [sidh, sidl] = SidReg::from_standard_id(identifier).to_registers();

        self.write_register(REGISTER_TXB0SIDH, sidh)?;
        self.write_register(REGISTER_TXB0SIDL, sidl)?;
        self.write_register(REGISTER_TXB0EID8, 0x00)?;
        self.write_register(REGISTER_TXB0EID0, 0x00)?;
        self.write_register(REGISTER_TXB0DLC, dlc.into())?;

        for (offset, byte) in payload.iter().enumerate() {
            self.write_register(REGISTER_TXB0D0 + offset as u8, *byte)?;
        }

        self.write_register(REGISTER_TXB0CTRL, TxbCtrl::new().with_txreq(true).into())?;

        Ok(())
    }

    /// Waits max. 50 ms for TXREQ of TX buffer 0 to be cleared
    fn wait_tx_buffer(&mut self) -> Result<(), BusError<B::Error, CS::Error>> {
        for _ in 0..TX_BUSY_ATTEMPTS {
            if !self.tx_request_pending()? {
                return Ok(());
            }

            self.delay.delay_ms(TX_BUSY_BACKOFF_MS);
        }

        if !self.tx_request_pending()? {
            return Ok(());
        }

        warn!("TX buffer 0 still pending after {TX_BUSY_ATTEMPTS} attempts, overwriting it");
        Ok(())
    }

    /// Returns true if TXREQ of TX buffer 0 is set
    fn tx_request_pending(&mut self) -> Result<bool, BusError<B::Error, CS::Error>> {
        let control = TxbCtrl::from(self.read_register(REGISTER_TXB0CTRL)?);

        Ok(control.txreq())
    }

    /// Polls CANINTF until RX0IF is set or [RECEIVE_TIMEOUT_MS] elapsed
    fn wait_rx_buffer_full(&mut self, clock: &CLK) -> Result<(), CanError<B::Error, CS::Error>> {
        let target = clock
            .try_now()?
            .checked_add(Milliseconds::<u32>::new(RECEIVE_TIMEOUT_MS))
            .ok_or(CanError::ClockError)?;

        loop {
            let flags = CanInterrupts::from(self.read_register(REGISTER_CANINTF)?);

            if flags.rx0() {
                return Ok(());
            }

            if clock.try_now()? > target {
                debug!("RX buffer 0 not filled within {RECEIVE_TIMEOUT_MS} ms");
                return Err(CanError::Timeout);
            }
        }
    }

    /// Reads DLC and data of RX buffer 0, then releases the buffer and re-enables the RX0 interrupt
    fn read_rx_buffer(&mut self) -> Result<([u8; MAX_PAYLOAD], usize), CanError<B::Error, CS::Error>> {
        let dlc = DlcReg::from(self.read_register(REGISTER_RXB0DLC)?);
        let length = (dlc.dlc() as usize).min(MAX_PAYLOAD);

        let mut data = [0u8; MAX_PAYLOAD];
        for (offset, byte) in data[..length].iter_mut().enumerate() {
            *byte = self.read_register(REGISTER_RXB0D0 + offset as u8)?;
        }

        self.write_register(REGISTER_CANINTF, 0x00)?;
        self.write_register(REGISTER_CANINTE, CanInterrupts::new().with_rx0(true).into())?;

        Ok((data, length))
    }

    fn restore_rx_identifier(&mut self) -> Result<(), BusError<B::Error, CS::Error>> {
        self.write_register(REGISTER_RXB0SIDH, RX_DEFAULT_SID[0])?;
        self.write_register(REGISTER_RXB0SIDL, RX_DEFAULT_SID[1])?;

        Ok(())
    }

    /// Executes a SPI transfer framed by the CS pin and returns the last byte received.
    /// CS is released even if the transfer fails, a transfer error takes precedence over a CS error.
    fn transfer(&mut self, buffer: &mut [u8]) -> Result<u8, BusError<B::Error, CS::Error>> {
        self.pin_cs.set_low().map_err(BusError::CSError)?;

        let result = self
            .bus
            .transfer(buffer)
            .map(|received| received.last().copied().unwrap_or_default())
            .map_err(BusError::TransferError);

        let released = self.pin_cs.set_high().map_err(BusError::CSError);
        let received = result?;
        released?;

        Ok(received)
    }
}

/// SPI instruction
#[derive(Copy, Clone)]
enum Operation {
    Reset = 0xC0,
    Read = 0x03,
    Write = 0x02,
}
