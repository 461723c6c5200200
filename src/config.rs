//!# Controller configuration
//! Bit rates are selected by name, matching the names used by the board vendor.
//! Each rate maps to one fixed CNF1/CNF2/CNF3 register triple.
//!
//! ```
//!# use xl2515::config::{BitRate, BitTiming};
//!#
//! let rate: BitRate = "500KBPS".parse().unwrap();
//! assert_eq!(BitRate::Kbps500, rate);
//! assert_eq!(BitTiming { cnf1: 0x00, cnf2: 0x9E, cnf3: 0x03 }, rate.timing());
//!
//! assert!(BitRate::from_name("33KBPS").is_none());
//! ```
use core::fmt::{Display, Formatter};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Entire configuration currently supported
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Configuration {
    /// Nominal CAN bus bit rate
    pub bit_rate: BitRate,

    /// Enable clock output on the CLKOUT pin
    pub clock_output: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            bit_rate: BitRate::default(),
            clock_output: true,
        }
    }
}

/// Values of the three bit timing registers
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BitTiming {
    /// Synchronization jump width and baud rate prescaler
    pub cnf1: u8,
    /// Phase segment 1 and propagation segment
    pub cnf2: u8,
    /// Phase segment 2, wake-up filter and start-of-frame signal
    pub cnf3: u8,
}

/// Supported nominal bit rates
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BitRate {
    #[serde(rename = "5KBPS")]
    Kbps5,
    #[serde(rename = "10KBPS")]
    Kbps10,
    #[serde(rename = "20KBPS")]
    Kbps20,
    #[serde(rename = "50KBPS")]
    Kbps50,
    #[serde(rename = "100KBPS")]
    Kbps100,
    #[serde(rename = "125KBPS")]
    Kbps125,
    #[serde(rename = "250KBPS")]
    Kbps250,
    #[serde(rename = "500KBPS")]
    Kbps500,
    #[serde(rename = "800KBPS")]
    Kbps800,
    #[serde(rename = "1000KBPS")]
    Kbps1000,
}

impl Default for BitRate {
    fn default() -> Self {
        Self::Kbps125
    }
}

impl BitRate {
    /// All supported rates, slowest first
    pub const ALL: [BitRate; 10] = [
        Self::Kbps5,
        Self::Kbps10,
        Self::Kbps20,
        Self::Kbps50,
        Self::Kbps100,
        Self::Kbps125,
        Self::Kbps250,
        Self::Kbps500,
        Self::Kbps800,
        Self::Kbps1000,
    ];

    /// Looks up a rate by its name, e.g. `125KBPS`
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|rate| rate.name() == name)
    }

    /// Name of the rate
    pub fn name(&self) -> &'static str {
        match self {
            Self::Kbps5 => "5KBPS",
            Self::Kbps10 => "10KBPS",
            Self::Kbps20 => "20KBPS",
            Self::Kbps50 => "50KBPS",
            Self::Kbps100 => "100KBPS",
            Self::Kbps125 => "125KBPS",
            Self::Kbps250 => "250KBPS",
            Self::Kbps500 => "500KBPS",
            Self::Kbps800 => "800KBPS",
            Self::Kbps1000 => "1000KBPS",
        }
    }

    /// CNF1/CNF2/CNF3 register values of the rate
    pub fn timing(&self) -> BitTiming {
        let (cnf1, cnf2, cnf3) = match self {
            Self::Kbps5 => (0xA7, 0xBF, 0x07),
            Self::Kbps10 => (0x31, 0xA4, 0x04),
            Self::Kbps20 => (0x18, 0xA4, 0x04),
            Self::Kbps50 => (0x09, 0xA4, 0x04),
            Self::Kbps100 => (0x04, 0x9E, 0x03),
            Self::Kbps125 => (0x03, 0x9E, 0x03),
            Self::Kbps250 => (0x01, 0x1E, 0x03),
            Self::Kbps500 => (0x00, 0x9E, 0x03),
            Self::Kbps800 => (0x00, 0x92, 0x02),
            Self::Kbps1000 => (0x00, 0x82, 0x02),
        };

        BitTiming { cnf1, cnf2, cnf3 }
    }
}

impl Display for BitRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Requested bit rate name is not supported
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UnknownBitRate;

impl FromStr for BitRate {
    type Err = UnknownBitRate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or(UnknownBitRate)
    }
}
