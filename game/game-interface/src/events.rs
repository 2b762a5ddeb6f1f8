use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Events a character core triggered during its last tick.
    ///
    /// The outer game turns these into sounds and effects,
    /// the simulation itself never reads them.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CoreEvents: u32 {
        const GROUND_JUMP = 0x01;
        const AIR_JUMP = 0x02;
        const HOOK_LAUNCH = 0x04;
        const HOOK_ATTACH_PLAYER = 0x08;
        const HOOK_ATTACH_GROUND = 0x10;
        const HOOK_HIT_NOHOOK = 0x20;
        const HOOK_RETRACT = 0x40;
    }
}
