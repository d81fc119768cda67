use alloc::vec::Vec;
use core::fmt::Debug;

use crate::{PnvmState, SkuId};

/// Everything the loader needs from the driver. Implemented automatically for
/// any type that provides the three parts. See README.md for an example.
pub trait Platform: Transport + Prph + FirmwareSource {}

impl<T: Transport + Prph + FirmwareSource> Platform for T {}

/// The bus specific transport of an attached device.
pub trait Transport {
    type Error;

    fn sku_id(&self) -> SkuId;

    /// Firmware file name prefix of this device, including the trailing hyphen,
    /// e.g. `iwlwifi-ty-a0-gf-a0-`.
    fn fw_name_pre(&self) -> &str;

    fn pnvm_state(&self) -> PnvmState;

    fn set_pnvm_state(&mut self, state: PnvmState);

    /// Makes `data` available to the firmware. `None` re-uses whatever the
    /// transport kept from an earlier call, which is what a repeated load does.
    fn set_pnvm(&mut self, data: Option<&[u8]>) -> Result<(), Self::Error>;
}

/// Peripheral register access.
pub trait Prph {
    fn write_prph(&mut self, addr: u32, val: u32);

    /// Offset of the UMAC peripheral window on this device family.
    fn umac_prph_offset(&self) -> u32 {
        0
    }

    fn write_umac_prph(&mut self, addr: u32, val: u32) {
        let offset = self.umac_prph_offset();
        self.write_prph(addr + offset, val)
    }
}

/// Host facility that provides firmware files by name.
pub trait FirmwareSource {
    type Error: Debug;

    fn request_firmware(&mut self, name: &str) -> Result<Vec<u8>, Self::Error>;
}

impl<T: Transport> Transport for &mut T {
    type Error = T::Error;

    fn sku_id(&self) -> SkuId {
        T::sku_id(self)
    }

    fn fw_name_pre(&self) -> &str {
        T::fw_name_pre(self)
    }

    fn pnvm_state(&self) -> PnvmState {
        T::pnvm_state(self)
    }

    fn set_pnvm_state(&mut self, state: PnvmState) {
        T::set_pnvm_state(self, state)
    }

    fn set_pnvm(&mut self, data: Option<&[u8]>) -> Result<(), Self::Error> {
        T::set_pnvm(self, data)
    }
}

impl<T: Prph> Prph for &mut T {
    fn write_prph(&mut self, addr: u32, val: u32) {
        T::write_prph(self, addr, val)
    }

    fn umac_prph_offset(&self) -> u32 {
        T::umac_prph_offset(self)
    }

    fn write_umac_prph(&mut self, addr: u32, val: u32) {
        T::write_umac_prph(self, addr, val)
    }
}

impl<T: FirmwareSource> FirmwareSource for &mut T {
    type Error = T::Error;

    fn request_firmware(&mut self, name: &str) -> Result<Vec<u8>, Self::Error> {
        T::request_firmware(self, name)
    }
}
