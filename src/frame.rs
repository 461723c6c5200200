//!# CAN Frame
//! Classic CAN frame with up to 8 data bytes.
//!
//! ```
//!# use xl2515::frame::CanFrame;
//!# use embedded_can::{Frame, StandardId};
//!#
//! let id = StandardId::new(0x123).unwrap();
//! let frame = CanFrame::new(id, &[0x11, 0x22, 0x33]).unwrap();
//!
//! assert_eq!(3, frame.dlc());
//! assert_eq!(&[0x11, 0x22, 0x33], frame.data());
//! assert!(CanFrame::new(id, &[0u8; 9]).is_none());
//! ```
use embedded_can::{Frame, Id, StandardId};

/// Maximum number of data bytes of a classic CAN frame
pub const MAX_PAYLOAD: usize = 8;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CanFrame {
    identifier: Id,
    rtr: bool,
    dlc: usize,
    data: [u8; MAX_PAYLOAD],
}

impl CanFrame {
    /// Returns the identifier if it is a standard 11 bit identifier
    pub fn standard_id(&self) -> Option<StandardId> {
        match self.identifier {
            Id::Standard(sid) => Some(sid),
            Id::Extended(_) => None,
        }
    }
}

impl Frame for CanFrame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        if data.len() > MAX_PAYLOAD {
            return None;
        }

        let mut frame = CanFrame {
            identifier: id.into(),
            rtr: false,
            dlc: data.len(),
            data: [0; MAX_PAYLOAD],
        };
        frame.data[..data.len()].copy_from_slice(data);
        Some(frame)
    }

    fn new_remote(id: impl Into<Id>, dlc: usize) -> Option<Self> {
        if dlc > MAX_PAYLOAD {
            return None;
        }

        Some(CanFrame {
            identifier: id.into(),
            rtr: true,
            dlc,
            data: [0; MAX_PAYLOAD],
        })
    }

    fn is_extended(&self) -> bool {
        matches!(self.identifier, Id::Extended(_))
    }

    fn is_remote_frame(&self) -> bool {
        self.rtr
    }

    fn id(&self) -> Id {
        self.identifier
    }

    fn dlc(&self) -> usize {
        self.dlc
    }

    /// Payload of a data frame, empty for remote frames
    fn data(&self) -> &[u8] {
        if self.rtr {
            return &[];
        }

        &self.data[..self.dlc]
    }
}
