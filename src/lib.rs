#![cfg_attr(not(test), no_std)]
#![cfg_attr(feature = "strict", deny(warnings))]
#![allow(dead_code)]
#![allow(clippy::identity_op)]

//! # Library for XL2515/MCP2515 CAN controller
//!
//! Crate currently offer the following features:
//! * Bit timing for ten named bit rates between 5 kbit/s and 1 Mbit/s
//! * CAN2.0 standard ID frames using TX buffer 0 and RX buffer 0
//! * Interrupt driven reception via a [interrupt::ReceiveSignal] set from the INT pin handler
//! * no_std support, no allocator required
//!
//!## Example
//! For detailed example with rp-pico check the `example` crate of this repository
//!
//!## CAN Tx/Rx example
//!
//!```
//!use xl2515::example::{ExampleClock, ExampleCSPin, ExampleDelay, ExampleSPIBus};
//!use xl2515::can::{CanController, Controller};
//!use xl2515::interrupt::ReceiveSignal;
//!use embedded_can::{Frame, StandardId};
//!
//! // Set by the falling edge interrupt handler of the INT pin
//!static CAN_RX: ReceiveSignal = ReceiveSignal::new();
//!
//! // Simulated controller in loopback, signaling CAN_RX on reception
//!let spi_bus = ExampleSPIBus::with_interrupt(&CAN_RX);
//!let cs_pin = ExampleCSPin {};
//!let delay = ExampleDelay {};
//!let clock = ExampleClock::default();
//!
//!let mut controller = Controller::new(spi_bus, cs_pin, delay, &CAN_RX);
//! // reset and configure CAN controller
//!controller.initialize("125KBPS").unwrap();
//!
//!let can_id = StandardId::new(0x123).unwrap();
//!
//! // Nothing received yet => no bus access
//!assert_eq!(None, controller.recv(can_id, &clock).unwrap());
//!
//! // Transmit CAN message
//!controller.send(can_id, &[0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88]).unwrap();
//!
//! // Receive CAN message
//!let frame = controller.recv(can_id, &clock).unwrap().unwrap();
//!assert_eq!(&[0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88], frame.data());
//!```

pub mod can;
pub mod config;
pub mod frame;
pub mod interrupt;
pub mod status;

pub mod example;
#[cfg(test)]
pub(crate) mod mocks;
mod registers;
#[cfg(test)]
mod tests;
