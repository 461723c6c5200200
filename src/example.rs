//! # Simulated controller for doc examples
//!
//! [ExampleSPIBus] emulates the register file of the controller in loopback:
//! setting TXREQ copies TX buffer 0 into RX buffer 0, raises RX0IF and (if enabled in CANINTE)
//! signals the attached [ReceiveSignal] like a falling edge of the INT pin would.
use crate::frame::CanFrame;
use crate::interrupt::ReceiveSignal;
use crate::registers::{DlcReg, SidReg};
use core::cell::Cell;
use core::convert::Infallible;
use embedded_can::{Frame, StandardId};
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::spi::Transfer;
use embedded_hal::digital::v2::OutputPin;
use embedded_time::clock::Error;
use embedded_time::duration::{Duration, Fraction};
use embedded_time::fixed_point::FixedPoint;
use embedded_time::timer::param::{Armed, OneShot};
use embedded_time::{Clock, Instant, Timer};

const CANSTAT: usize = 0x0E;
const CANCTRL: usize = 0x0F;
const CANINTE: usize = 0x2B;
const CANINTF: usize = 0x2C;
const TXB0CTRL: usize = 0x30;
const TXB0SIDH: usize = 0x31;
const RXB0SIDH: usize = 0x61;

/// Size of a buffer image: SIDH, SIDL, EID8, EID0, DLC and 8 data bytes
const BUFFER_LENGTH: usize = 13;

const TXREQ: u8 = 0x08;
const RX0IF: u8 = 0x01;

/// CANSTAT after reset: configuration mode
const CANSTAT_RESET: u8 = 0x80;

#[derive(Debug)]
pub struct ExampleSPIBus {
    registers: [u8; 128],
    interrupt: Option<&'static ReceiveSignal>,
    transmitted: Option<CanFrame>,
}

impl Default for ExampleSPIBus {
    fn default() -> Self {
        let mut registers = [0u8; 128];
        registers[CANSTAT] = CANSTAT_RESET;

        Self {
            registers,
            interrupt: None,
            transmitted: None,
        }
    }
}

impl ExampleSPIBus {
    /// Simulated bus which signals received frames to the given signal
    pub fn with_interrupt(signal: &'static ReceiveSignal) -> Self {
        Self {
            interrupt: Some(signal),
            ..Self::default()
        }
    }

    /// Returns the last frame put on the bus, decoded from TX buffer 0
    pub fn transmitted(&self) -> Option<CanFrame> {
        self.transmitted
    }

    /// Returns the current value of the given register
    pub fn register(&self, address: u8) -> u8 {
        self.registers[address as usize & 0x7F]
    }

    fn reset(&mut self) {
        self.registers = [0u8; 128];
        self.registers[CANSTAT] = CANSTAT_RESET;
    }

    fn write(&mut self, address: u8, value: u8) {
        let address = address as usize & 0x7F;

        match address {
            CANCTRL => {
                self.registers[CANCTRL] = value;
                self.registers[CANSTAT] = (value & 0xE0) | (self.registers[CANSTAT] & 0x1F);
            }
            TXB0CTRL if value & TXREQ != 0 => {
                self.registers[TXB0CTRL] = value & !TXREQ;
                self.transmit();
            }
            _ => self.registers[address] = value,
        }
    }

    fn transmit(&mut self) {
        let tx = &self.registers[TXB0SIDH..TXB0SIDH + BUFFER_LENGTH];

        let sid = SidReg::from_registers([tx[0], tx[1]]).sid();
        let dlc = DlcReg::from(tx[4]);
        let length = (dlc.dlc() as usize).min(8);

        self.transmitted = StandardId::new(sid).and_then(|id| CanFrame::new(id, &tx[5..5 + length]));

        if self.registers[CANINTF] & RX0IF != 0 {
            // RX buffer 0 still occupied, frame is lost
            return;
        }

        self.registers.copy_within(TXB0SIDH..TXB0SIDH + BUFFER_LENGTH, RXB0SIDH);
        self.registers[CANINTF] |= RX0IF;

        if self.registers[CANINTE] & RX0IF != 0 {
            if let Some(signal) = self.interrupt {
                signal.on_interrupt();
            }
        }
    }
}

impl Transfer<u8> for ExampleSPIBus {
    type Error = Infallible;

    fn transfer<'w>(&mut self, words: &'w mut [u8]) -> Result<&'w [u8], Self::Error> {
        match &mut words[..] {
            [0xC0] => self.reset(),
            [0x03, address, value] => *value = self.register(*address),
            [0x02, address, value] => self.write(*address, *value),
            _ => {}
        }

        Ok(words)
    }
}

pub struct ExampleCSPin {}

impl OutputPin for ExampleCSPin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

pub struct ExampleDelay {}

impl DelayMs<u8> for ExampleDelay {
    fn delay_ms(&mut self, _ms: u8) {}
}

/// Clock advancing by 1 ms on each read
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExampleClock {
    ticks: Cell<u64>,
}

impl Clock for ExampleClock {
    type T = u64;
    const SCALING_FACTOR: Fraction = Fraction::new(1, 1_000_000);

    fn try_now(&self) -> Result<Instant<Self>, Error> {
        let now = self.ticks.get();
        self.ticks.set(now + 1_000);

        Ok(Instant::new(now))
    }

    fn new_timer<Dur: Duration + FixedPoint>(&self, duration: Dur) -> Timer<OneShot, Armed, Self, Dur> {
        Timer::new(self, duration)
    }
}
