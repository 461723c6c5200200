//!# Receive interrupt signal
//! The controller pulls its INT line low once a frame lands in receive buffer 0.
//! The falling edge handler only marks the [ReceiveSignal] as pending, all register access is
//! left to [crate::can::CanController::recv] running in the main context.
//!
//! ```
//!# use xl2515::interrupt::ReceiveSignal;
//!#
//! static CAN_RX: ReceiveSignal = ReceiveSignal::new();
//!
//! // inside the GPIO falling edge interrupt handler
//! CAN_RX.on_interrupt();
//!
//! assert!(CAN_RX.is_pending());
//! assert!(CAN_RX.take());
//! assert!(!CAN_RX.is_pending());
//! ```
use core::sync::atomic::Ordering;
use portable_atomic::AtomicBool;

/// Pending flag shared between the interrupt handler and the controller
#[derive(Debug, Default)]
pub struct ReceiveSignal {
    pending: AtomicBool,
}

impl ReceiveSignal {
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
        }
    }

    /// Falling edge callback of the interrupt pin. Safe to call from interrupt context.
    pub fn on_interrupt(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Returns true if a frame was signaled since the last [Self::take]
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Clears the flag and returns the previous state
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }
}
