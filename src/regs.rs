//! UMAC peripheral registers.

/// Doorbell register the host uses to signal ISR6 events to the firmware.
pub const UREG_DOORBELL_TO_ISR6: u32 = 0xa05c44;
pub const UREG_DOORBELL_TO_ISR6_NMI_BIT: u32 = 1 << 0;
pub const UREG_DOORBELL_TO_ISR6_SUSPEND: u32 = 1 << 18;
pub const UREG_DOORBELL_TO_ISR6_RESUME: u32 = 1 << 19;
/// Tells the firmware that the PNVM (or its absence) is ready to be consumed.
pub const UREG_DOORBELL_TO_ISR6_PNVM: u32 = 1 << 20;
