//! Firmware command groups and notification payloads used by the PNVM flow.

/// Group of the legacy, single byte command ids.
pub const LEGACY_GROUP: u8 = 0x0;
/// Group that legacy ids arrive with on firmware using wide headers.
pub const LONG_GROUP: u8 = 0x1;
pub const REGULATORY_AND_NVM_GROUP: u8 = 0xc;

/// Sent by the firmware once it has consumed the PNVM after the doorbell.
pub const PNVM_INIT_COMPLETE_NTFY: u8 = 0xfe;

/// Combines a group and a command id into a 16 bit wide id.
pub const fn wide_id(group: u8, cmd: u8) -> u16 {
    ((group as u16) << 8) | cmd as u16
}

/// A legacy id as it appears after the firmware moved it into [`LONG_GROUP`].
pub const fn def_id(id: u16) -> u16 {
    wide_id(LONG_GROUP, cmd_id(id))
}

pub const fn group_id(id: u16) -> u8 {
    (id >> 8) as u8
}

pub const fn cmd_id(id: u16) -> u8 {
    (id & 0xff) as u8
}

pub const PNVM_INIT_COMPLETE: u16 = wide_id(REGULATORY_AND_NVM_GROUP, PNVM_INIT_COMPLETE_NTFY);

/// Payload of [`PNVM_INIT_COMPLETE_NTFY`]: a single little endian status word.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PnvmInitCompleteNtfy {
    pub status: u32,
}

impl PnvmInitCompleteNtfy {
    pub const SIZE: usize = 4;

    /// Returns `None` if the payload is shorter than the status word.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        let status = data.get(..Self::SIZE)?;
        Some(Self {
            status: u32::from_le_bytes([status[0], status[1], status[2], status[3]]),
        })
    }

    pub const fn to_bytes(self) -> [u8; Self::SIZE] {
        self.status.to_le_bytes()
    }
}
