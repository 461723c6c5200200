#![allow(unused_braces)]
use embedded_can::StandardId;
use modular_bitfield_msb::prelude::*;

#[bitfield]
#[derive(Default)]
#[repr(u8)]
/// CAN control register (CANCTRL)
pub struct CanCtrl {
    /// Request operation mode bits
    pub reqop: B3,
    /// Abort all pending transmissions bit
    pub abat: bool,
    /// One-shot mode bit
    pub osm: bool,
    /// CLKOUT pin enable bit
    pub clken: bool,
    /// CLKOUT pin prescaler bits
    pub clkpre: B2,
}

#[bitfield]
#[derive(Default)]
#[repr(u8)]
/// CAN status register (CANSTAT)
pub struct CanStat {
    /// Operation mode bits
    pub opmod: B3,
    #[skip]
    __: B1,
    /// Interrupt flag code bits
    pub icod: B3,
    #[skip]
    ___: B1,
}

#[bitfield]
#[derive(Default)]
#[repr(u8)]
/// Transmit buffer control register (TXBnCTRL)
pub struct TxbCtrl {
    #[skip]
    __: B1,
    /// Message aborted flag bit
    pub abtf: bool,
    /// Message lost arbitration bit
    pub mloa: bool,
    /// Transmission error detected bit
    pub txerr: bool,
    /// Message transmit request bit
    pub txreq: bool,
    #[skip]
    ___: B1,
    /// Transmit buffer priority bits
    pub txp: B2,
}

#[bitfield]
#[derive(Default)]
#[repr(u8)]
/// Interrupt enable (CANINTE) and interrupt flag (CANINTF) register layout
pub struct CanInterrupts {
    /// Message error interrupt
    pub merr: bool,
    /// Wake-up interrupt
    pub wak: bool,
    /// Error interrupt
    pub err: bool,
    /// Transmit buffer 2 empty interrupt
    pub tx2: bool,
    /// Transmit buffer 1 empty interrupt
    pub tx1: bool,
    /// Transmit buffer 0 empty interrupt
    pub tx0: bool,
    /// Receive buffer 1 full interrupt
    pub rx1: bool,
    /// Receive buffer 0 full interrupt
    pub rx0: bool,
}

#[bitfield]
#[derive(Default)]
#[repr(u8)]
/// Data length code register (TXBnDLC / RXBnDLC)
pub struct DlcReg {
    #[skip]
    __: B1,
    /// Remote transmission request bit
    pub rtr: bool,
    #[skip]
    ___: B2,
    /// Data length code
    pub dlc: B4,
}

#[bitfield]
#[derive(Default)]
#[repr(u16)]
/// Standard identifier register pair (xxxSIDH + xxxSIDL)
pub struct SidReg {
    /// 11 bit standard identifier, SIDH holds bits 10..3
    pub sid: B11,
    /// Standard frame remote transmit request bit (receive buffers only)
    pub srr: bool,
    /// Extended identifier flag bit
    pub ide: bool,
    #[skip]
    __: B1,
    /// Extended identifier bits 17..16
    pub eid: B2,
}

impl SidReg {
    /// Builds the register pair of the given standard identifier
    pub fn from_standard_id(identifier: StandardId) -> Self {
        Self::new().with_sid(identifier.as_raw())
    }

    /// Returns the [SIDH, SIDL] register values
    pub fn to_registers(self) -> [u8; 2] {
        u16::from(self).to_be_bytes()
    }

    /// Decodes a [SIDH, SIDL] register pair
    pub fn from_registers(registers: [u8; 2]) -> Self {
        Self::from(u16::from_be_bytes(registers))
    }
}
