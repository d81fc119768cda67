#![allow(dead_code)]

// filename according to https://doc.rust-lang.org/book/ch11-03-test-organization.html
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use iwl_pnvm::api::{PNVM_INIT_COMPLETE_NTFY, PnvmInitCompleteNtfy, REGULATORY_AND_NVM_GROUP};
use iwl_pnvm::error::WaitError;
use iwl_pnvm::notif::{Handler, NotifWait, NotifWaitData, RxPacket};
use iwl_pnvm::platform::{FirmwareSource, Prph, Transport};
use iwl_pnvm::{PnvmState, SkuId};

pub const FW_NAME_PRE: &str = "iwlwifi-ty-a0-gf-a0-";
pub const PNVM_NAME: &str = "iwlwifi-ty-a0-gf-a0.pnvm";
pub const UMAC_PRPH_OFFSET: u32 = 0x300000;

#[derive(Debug, PartialEq, Clone)]
pub enum Operation {
    SetPnvm { len: Option<usize> },
    RequestFirmware { name: String },
    WritePrph { addr: u32, val: u32 },
    InitWait { cmds: Vec<u16> },
    Wait { timeout: Duration },
}

/// Operations of the device and the notification wait in the order they
/// happened.
pub type Log = Arc<Mutex<Vec<Operation>>>;

pub fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn operations(log: &Log) -> Vec<Operation> {
    log.lock().unwrap().clone()
}

/// What the simulated firmware does after the PNVM doorbell.
#[derive(Clone)]
pub enum Reply {
    None,
    After {
        notif: Arc<NotifWaitData>,
        delay: Duration,
        status: u32,
    },
}

#[derive(Debug, PartialEq)]
pub struct DeviceError(pub i32);

pub struct Device {
    pub sku_id: SkuId,
    pub pnvm_state: PnvmState,
    pub files: HashMap<String, Vec<u8>>,
    pub fail_set_pnvm: bool,
    pub reply: Reply,
    pub log: Log,
}

impl Device {
    pub fn new(sku_id: [u8; 3], log: &Log) -> Self {
        Self {
            sku_id: SkuId::new(sku_id),
            pnvm_state: PnvmState::NotAttempted,
            files: HashMap::new(),
            fail_set_pnvm: false,
            reply: Reply::None,
            log: log.clone(),
        }
    }

    pub fn with_file(mut self, name: &str, data: &[u8]) -> Self {
        self.files.insert(name.to_string(), data.to_vec());
        self
    }

    pub fn replying(mut self, notif: &Arc<NotifWaitData>, delay: Duration, status: u32) -> Self {
        self.reply = Reply::After {
            notif: notif.clone(),
            delay,
            status,
        };
        self
    }

    pub fn doorbells(&self) -> usize {
        operations(&self.log)
            .iter()
            .filter(|op| matches!(op, Operation::WritePrph { .. }))
            .count()
    }

    fn push(&self, op: Operation) {
        println!("    device: {op:?}");
        self.log.lock().unwrap().push(op);
    }
}

impl Transport for Device {
    type Error = DeviceError;

    fn sku_id(&self) -> SkuId {
        self.sku_id
    }

    fn fw_name_pre(&self) -> &str {
        FW_NAME_PRE
    }

    fn pnvm_state(&self) -> PnvmState {
        self.pnvm_state
    }

    fn set_pnvm_state(&mut self, state: PnvmState) {
        self.pnvm_state = state;
    }

    fn set_pnvm(&mut self, data: Option<&[u8]>) -> Result<(), Self::Error> {
        self.push(Operation::SetPnvm {
            len: data.map(<[u8]>::len),
        });
        if self.fail_set_pnvm {
            return Err(DeviceError(-5));
        }
        Ok(())
    }
}

impl Prph for Device {
    fn write_prph(&mut self, addr: u32, val: u32) {
        self.push(Operation::WritePrph { addr, val });

        if let Reply::After {
            notif,
            delay,
            status,
        } = self.reply.clone()
        {
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

    fn umac_prph_offset(&self) -> u32 {
        UMAC_PRPH_OFFSET
    }
}

impl FirmwareSource for Device {
    type Error = DeviceError;

    fn request_firmware(&mut self, name: &str) -> Result<Vec<u8>, Self::Error> {
        self.push(Operation::RequestFirmware {
            name: name.to_string(),
        });
        self.files.get(name).cloned().ok_or(DeviceError(-2))
    }
}

/// Records registrations and answers every wait with `result`. If `payload`
/// is set, the wait first runs the registered handler on it.
pub struct RecordingWait {
    pub log: Log,
    pub result: Result<(), WaitError>,
    pub payload: Option<Vec<u8>>,
    pub handler_result: Mutex<Option<bool>>,
}

impl RecordingWait {
    pub fn new(log: &Log, result: Result<(), WaitError>) -> Self {
        Self {
            log: log.clone(),
            result,
            payload: None,
            handler_result: Mutex::new(None),
        }
    }

    pub fn with_payload(mut self, payload: &[u8]) -> Self {
        self.payload = Some(payload.to_vec());
        self
    }
}

impl NotifWait for RecordingWait {
    type Wait<'a> = Option<Handler>;

    fn init_wait(&self, cmds: &[u16], handler: Option<Handler>) -> Self::Wait<'_> {
        self.log.lock().unwrap().push(Operation::InitWait {
            cmds: cmds.to_vec(),
        });
        handler
    }

    fn wait<'a>(&'a self, wait: Self::Wait<'a>, timeout: Duration) -> Result<(), WaitError> {
        self.log.lock().unwrap().push(Operation::Wait { timeout });

        if let (Some(mut handler), Some(payload)) = (wait, self.payload.as_ref()) {
            let done = handler(&RxPacket::new(
                REGULATORY_AND_NVM_GROUP,
                PNVM_INIT_COMPLETE_NTFY,
                payload,
            ));
            *self.handler_result.lock().unwrap() = Some(done);
        }

        self.result
    }
}
