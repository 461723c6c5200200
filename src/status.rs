use crate::registers::CanStat;

///  Operation status read from CANSTAT register
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OperationStatus {
    /// Current operation mode
    pub mode: OperationMode,

    /// Highest priority pending interrupt source
    pub interrupt: InterruptCode,
}

impl OperationStatus {
    pub(crate) fn from_register(register: u8) -> Self {
        let status = CanStat::from(register);

        Self {
            mode: OperationMode::from_bits(status.opmod()),
            interrupt: InterruptCode::from_bits(status.icod()),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum OperationMode {
    /// Module is in normal mode, sends and receives frames on the bus
    Normal = 0b000,
    /// Module is in sleep mode
    Sleep = 0b001,
    /// Module is in internal loopback mode
    Loopback = 0b010,
    /// Module is in listen-only mode
    ListenOnly = 0b011,
    /// Module is in configuration mode, entered after reset
    Configuration = 0b100,
}

impl OperationMode {
    fn from_bits(bits: u8) -> Self {
        match bits {
            0b000 => Self::Normal,
            0b001 => Self::Sleep,
            0b010 => Self::Loopback,
            0b011 => Self::ListenOnly,
            // 0b101..=0b111 are invalid and read back as configuration mode
            _ => Self::Configuration,
        }
    }
}

/// Interrupt flag code of CANSTAT
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum InterruptCode {
    None = 0b000,
    Error = 0b001,
    WakeUp = 0b010,
    TxBuffer0 = 0b011,
    TxBuffer1 = 0b100,
    TxBuffer2 = 0b101,
    RxBuffer0 = 0b110,
    RxBuffer1 = 0b111,
}

impl InterruptCode {
    fn from_bits(bits: u8) -> Self {
        match bits {
            0b000 => Self::None,
            0b001 => Self::Error,
            0b010 => Self::WakeUp,
            0b011 => Self::TxBuffer0,
            0b100 => Self::TxBuffer1,
            0b101 => Self::TxBuffer2,
            0b110 => Self::RxBuffer0,
            _ => Self::RxBuffer1,
        }
    }
}
