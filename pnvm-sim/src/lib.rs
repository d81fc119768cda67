//! Simulated device side of the PNVM load handshake.
//!
//! [`SimDevice`] implements the driver traits of `iwl-pnvm` on top of an
//! in-memory transport, a firmware directory and a firmware thread that
//! answers the PNVM doorbell with `PNVM_INIT_COMPLETE`.

pub mod error;

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use iwl_pnvm::api::{PNVM_INIT_COMPLETE_NTFY, PnvmInitCompleteNtfy, REGULATORY_AND_NVM_GROUP};
use iwl_pnvm::notif::{NotifWaitData, RxPacket};
use iwl_pnvm::platform::{FirmwareSource, Prph, Transport};
use iwl_pnvm::regs::{UREG_DOORBELL_TO_ISR6, UREG_DOORBELL_TO_ISR6_PNVM};
use iwl_pnvm::{LoaderConfig, PnvmLoader, PnvmState, SkuId};

pub use error::{Error, SimError};

/// How the simulated firmware reacts to the PNVM doorbell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Firmware {
    /// Never answers, every load times out.
    Silent,
    /// Sends `PNVM_INIT_COMPLETE` with `status` after `delay`.
    Reply { delay: Duration, status: u32 },
}

pub struct SimDevice {
    sku_id: SkuId,
    fw_name_pre: String,
    pnvm_state: PnvmState,
    pnvm: Option<Vec<u8>>,
    firmware_dir: Option<PathBuf>,
    firmware: Firmware,
    fail_reapply: bool,
    notif: Arc<NotifWaitData>,
    doorbells: usize,
}

impl SimDevice {
    pub fn new(sku_id: SkuId, fw_name_pre: &str, firmware: Firmware) -> Self {
        Self {
            sku_id,
            fw_name_pre: fw_name_pre.to_string(),
            pnvm_state: PnvmState::NotAttempted,
            pnvm: None,
            firmware_dir: None,
            firmware,
            fail_reapply: false,
            notif: Arc::new(NotifWaitData::new()),
            doorbells: 0,
        }
    }

    /// Directory that firmware files are requested from.
    pub fn with_firmware_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.firmware_dir = Some(dir.into());
        self
    }

    /// Makes every re-apply of the kept PNVM fail.
    pub fn with_failing_reapply(mut self) -> Self {
        self.fail_reapply = true;
        self
    }

    /// Notification wait facility fed by the simulated firmware.
    pub fn notif_wait(&self) -> Arc<NotifWaitData> {
        self.notif.clone()
    }

    /// The PNVM image the transport currently holds.
    pub fn pnvm(&self) -> Option<&[u8]> {
        self.pnvm.as_deref()
    }

    pub fn doorbells(&self) -> usize {
        self.doorbells
    }

    /// Simulates a detach and re-attach of the device, which forgets the
    /// load state and the kept image.
    pub fn reattach(&mut self) {
        self.pnvm_state = PnvmState::NotAttempted;
        self.pnvm = None;
    }

    fn ring_pnvm_doorbell(&mut self) {
        self.doorbells += 1;

        let Firmware::Reply { delay, status } = self.firmware else {
            return;
        };
        let notif = self.notif.clone();
        thread::spawn(move || {
            thread::sleep(delay);
            let payload = PnvmInitCompleteNtfy { status }.to_bytes();
            notif.notify(&RxPacket::new(
                REGULATORY_AND_NVM_GROUP,
                PNVM_INIT_COMPLETE_NTFY,
                &payload,
            ));
        });
    }
}

impl Transport for SimDevice {
    type Error = SimError;

    fn sku_id(&self) -> SkuId {
        self.sku_id
    }

    fn fw_name_pre(&self) -> &str {
        &self.fw_name_pre
    }

    fn pnvm_state(&self) -> PnvmState {
        self.pnvm_state
    }

    fn set_pnvm_state(&mut self, state: PnvmState) {
        self.pnvm_state = state;
    }

    fn set_pnvm(&mut self, data: Option<&[u8]>) -> Result<(), Self::Error> {
        match data {
            None if self.fail_reapply => Err(SimError::ReapplyRejected),
            None => Ok(()),
            Some([]) => Err(SimError::EmptyImage),
            Some(image) => {
                self.pnvm = Some(image.to_vec());
                Ok(())
            }
        }
    }
}

impl Prph for SimDevice {
    fn write_prph(&mut self, addr: u32, val: u32) {
        if addr == UREG_DOORBELL_TO_ISR6 && val & UREG_DOORBELL_TO_ISR6_PNVM != 0 {
            self.ring_pnvm_doorbell();
        }
    }
}

impl FirmwareSource for SimDevice {
    type Error = std::io::Error;

    fn request_firmware(&mut self, name: &str) -> Result<Vec<u8>, Self::Error> {
        match &self.firmware_dir {
            Some(dir) => std::fs::read(dir.join(name)),
            None => Err(std::io::ErrorKind::NotFound.into()),
        }
    }
}

/// Result of one load call.
#[derive(Debug)]
pub struct Outcome {
    pub result: Result<(), iwl_pnvm::error::Error<SimError>>,
    pub state: PnvmState,
    pub elapsed: Duration,
}

/// Calls the loader `calls` times on `device`.
pub fn run(device: &mut SimDevice, config: LoaderConfig, calls: usize) -> Vec<Outcome> {
    let loader = PnvmLoader::new(config);
    let notif = device.notif_wait();

    (0..calls)
        .map(|_| {
            let start = Instant::now();
            let result = loader.load(device, &*notif);
            Outcome {
                result,
                state: device.pnvm_state(),
                elapsed: start.elapsed(),
            }
        })
        .collect()
}

/// Parses a SKU id given as `01:00:00` or `010000`.
pub fn parse_sku_id(s: &str) -> Result<SkuId, Error> {
    let digits: String = s.chars().filter(|&c| c != ':').collect();
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(Error::InvalidSkuId(s.to_string()));
    }

    let mut id = [0u8; 3];
    for (i, byte) in id.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16)
            .map_err(|_| Error::InvalidSkuId(s.to_string()))?;
    }
    Ok(SkuId::new(id))
}
