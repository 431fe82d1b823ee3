// libfelica/src/protocol/commands/polling.rs

use crate::constants::command_code::POLLING;
use crate::protocol::parser::{self, FrameBuilder};
use crate::protocol::{Command, PollingResponse};
use crate::types::SystemCode;
use crate::{Error, Result};

/// Extra data requested from the card in a polling response.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestCode {
    /// No extra data.
    None = 0x00,
    /// The system code.
    SystemCode = 0x01,
    /// Communication performance.
    CommunicationPerformance = 0x02,
}

impl RequestCode {
    fn from_byte(b: u8) -> Result<Self> {
        match b {
            0x00 => Ok(Self::None),
            0x01 => Ok(Self::SystemCode),
            0x02 => Ok(Self::CommunicationPerformance),
            other => Err(Error::malformed(format!("request code {:#04x}", other))),
        }
    }
}

/// Number of time slots the card may answer in.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSlot {
    /// One slot.
    Slot1 = 0x00,
    /// Two slots.
    Slot2 = 0x01,
    /// Four slots.
    Slot4 = 0x03,
    /// Eight slots.
    Slot8 = 0x07,
    /// Sixteen slots.
    Slot16 = 0x0F,
}

impl TimeSlot {
    fn from_byte(b: u8) -> Result<Self> {
        match b {
            0x00 => Ok(Self::Slot1),
            0x01 => Ok(Self::Slot2),
            0x03 => Ok(Self::Slot4),
            0x07 => Ok(Self::Slot8),
            0x0F => Ok(Self::Slot16),
            other => Err(Error::malformed(format!("time slot {:#04x}", other))),
        }
    }
}

/// Polling (0x00). Layout: len + code + system_code(2, big-endian) +
/// request_code(1) + time_slot(1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingCommand {
    /// System to poll; [`SystemCode::ANY`] matches every card.
    pub system_code: SystemCode,
    /// Extra data wanted in the reply.
    pub request_code: RequestCode,
    /// Slots the card may answer in.
    pub time_slot: TimeSlot,
}

impl PollingCommand {
    const LEN: usize = 6;

    /// Poll `system_code`.
    pub fn new(system_code: SystemCode, request_code: RequestCode, time_slot: TimeSlot) -> Self {
        Self {
            system_code,
            request_code,
            time_slot,
        }
    }
}

impl Command for PollingCommand {
    const COMMAND_CODE: u8 = POLLING;
    type Response = PollingResponse;

    fn to_bytes(&self) -> Vec<u8> {
        FrameBuilder::new(POLLING)
            .bytes(&self.system_code.to_bytes())
            .byte(self.request_code as u8)
            .byte(self.time_slot as u8)
            .build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, Self::LEN, POLLING)?;
        let system_code = SystemCode::from_bytes(r.array::<2>()?);
        let request_code = RequestCode::from_byte(r.byte()?)?;
        let time_slot = TimeSlot::from_byte(r.byte()?)?;
        r.finish()?;
        Ok(Self::new(system_code, request_code, time_slot))
    }
}
