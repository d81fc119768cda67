use std::fs;
use std::time::Duration;

use iwl_pnvm::error::Error;
use iwl_pnvm::{LoadStrategy, LoaderConfig, PnvmState, SkuId};
use pnvm_sim::{Firmware, SimDevice, SimError};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const FW_NAME_PRE: &str = "iwlwifi-so-a0-gf-a0-";

fn replying() -> Firmware {
    Firmware::Reply {
        delay: Duration::from_millis(10),
        status: 0,
    }
}

fn file_based() -> LoaderConfig {
    LoaderConfig::new()
        .with_strategy(LoadStrategy::FileBased)
        .with_timeout(Duration::from_millis(500))
}

#[test]
fn test_skip_strategy() {
    let mut device = SimDevice::new(SkuId::new([1, 0, 0]), FW_NAME_PRE, replying());

    let outcomes = pnvm_sim::run(&mut device, LoaderConfig::new(), 2);

    assert_eq!(outcomes.len(), 2);
    for outcome in &outcomes {
        assert!(outcome.result.is_ok());
        assert_eq!(outcome.state, PnvmState::Skipped);
    }
    assert_eq!(device.doorbells(), 2);
    assert_eq!(device.pnvm(), None);
}

#[test]
fn test_empty_sku() {
    let mut device = SimDevice::new(SkuId::EMPTY, FW_NAME_PRE, Firmware::Silent);

    let outcomes = pnvm_sim::run(&mut device, LoaderConfig::new(), 1);

    assert!(outcomes[0].result.is_ok());
    assert_eq!(outcomes[0].state, PnvmState::NotAttempted);
    assert_eq!(device.doorbells(), 0);
}

#[test]
fn test_file_from_firmware_dir() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("iwlwifi-so-a0-gf-a0.pnvm"), [0x5a; 128]).unwrap();
    let mut device =
        SimDevice::new(SkuId::new([1, 0, 0]), FW_NAME_PRE, replying()).with_firmware_dir(dir.path());

    let outcomes = pnvm_sim::run(&mut device, file_based(), 1);

    assert!(outcomes[0].result.is_ok());
    assert_eq!(outcomes[0].state, PnvmState::Loaded);
    assert_eq!(device.pnvm(), Some(&[0x5a; 128][..]));
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let mut device =
        SimDevice::new(SkuId::new([1, 0, 0]), FW_NAME_PRE, replying()).with_firmware_dir(dir.path());

    let outcomes = pnvm_sim::run(&mut device, file_based(), 1);

    assert!(outcomes[0].result.is_ok());
    assert_eq!(outcomes[0].state, PnvmState::Skipped);
    assert_eq!(device.pnvm(), None);
}

#[test]
fn test_empty_file_is_retried() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("iwlwifi-so-a0-gf-a0.pnvm");
    fs::write(&path, b"").unwrap();
    let mut device =
        SimDevice::new(SkuId::new([1, 0, 0]), FW_NAME_PRE, replying()).with_firmware_dir(dir.path());

    let outcomes = pnvm_sim::run(&mut device, file_based(), 1);
    assert!(outcomes[0].result.is_ok());
    assert_eq!(outcomes[0].state, PnvmState::NotAttempted);

    fs::write(&path, [1, 2, 3, 4]).unwrap();
    let outcomes = pnvm_sim::run(&mut device, file_based(), 1);
    assert_eq!(outcomes[0].state, PnvmState::Loaded);
    assert_eq!(device.pnvm(), Some(&[1, 2, 3, 4][..]));
}

#[test]
fn test_silent_firmware_times_out() {
    let mut device = SimDevice::new(SkuId::new([1, 0, 0]), FW_NAME_PRE, Firmware::Silent);
    let config = LoaderConfig::new().with_timeout(Duration::from_millis(100));

    let outcomes = pnvm_sim::run(&mut device, config, 1);

    assert!(matches!(outcomes[0].result, Err(Error::Timeout)));
    assert!(outcomes[0].elapsed >= Duration::from_millis(100));
    assert_eq!(outcomes[0].state, PnvmState::Skipped);
}

#[test]
fn test_failing_reapply() {
    let mut device =
        SimDevice::new(SkuId::new([1, 0, 0]), FW_NAME_PRE, replying()).with_failing_reapply();

    let outcomes = pnvm_sim::run(&mut device, LoaderConfig::new(), 2);

    assert!(outcomes[0].result.is_ok());
    assert!(matches!(
        outcomes[1].result,
        Err(Error::SetPnvm(SimError::ReapplyRejected))
    ));
    assert_eq!(device.doorbells(), 1);
}

#[test]
fn test_reattach_loads_again() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("iwlwifi-so-a0-gf-a0.pnvm"), [7; 16]).unwrap();
    let mut device =
        SimDevice::new(SkuId::new([0, 1, 0]), FW_NAME_PRE, replying()).with_firmware_dir(dir.path());

    pnvm_sim::run(&mut device, file_based(), 1);
    assert_eq!(device.pnvm(), Some(&[7; 16][..]));

    device.reattach();
    assert_eq!(device.pnvm(), None);

    let outcomes = pnvm_sim::run(&mut device, file_based(), 1);
    assert_eq!(outcomes[0].state, PnvmState::Loaded);
    assert_eq!(device.pnvm(), Some(&[7; 16][..]));
}
