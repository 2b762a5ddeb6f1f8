use bitflags::bitflags;
use num_derive::FromPrimitive;
use serde::{Deserialize, Serialize};

/// Tile indices of the DDRace game, front, switch and tele layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, FromPrimitive)]
#[repr(u8)]
pub enum DdraceTileNum {
    Air = 0,
    Solid,
    Death,
    NoHook,
    NoLaser,
    ThroughCut,
    Through,
    Jump,
    Freeze = 9,
    TeleInEvil,
    Unfreeze,
    DFreeze,
    DUnfreeze,
    TeleInWeapon,
    TeleInHook,
    WallJump = 16,
    EHookEnable,
    EHookDisable,
    HitEnable,
    HitDisable,
    SoloEnable,
    SoloDisable,
    //Switches
    SwitchTimedClose,
    SwitchOpen,
    SwitchClose,
    TeleIn,
    TeleOut,
    Boost,
    TeleCheck,
    TeleCheckOut,
    TeleCheckIn,
    RefillJumps = 32,
    Start,
    Finish,
    TimeCheckpointFirst = 35,
    TimeCheckpointLast = 59,
    Stop = 60,
    StopS,
    StopA,
    TeleCheckInEvil,
    CP,
    CPF,
    ThroughAll,
    ThroughDir,
    Tune,
}

bitflags! {
    /// The raw flags of a tile, rotations are combinations of these.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct TileFlags: u8 {
        const XFLIP = 1;
        const YFLIP = 2;
        const OPAQUE = 4;
        const ROTATE = 8;
    }
}

/// Rotations as stored in the tile flags.
///
/// Stopper tiles compare the complete flag byte against these values.
pub const ROTATION_0: u8 = 0;
pub const ROTATION_90: u8 = TileFlags::ROTATE.bits();
pub const ROTATION_180: u8 = TileFlags::XFLIP.bits() | TileFlags::YFLIP.bits();
pub const ROTATION_270: u8 =
    TileFlags::XFLIP.bits() | TileFlags::YFLIP.bits() | TileFlags::ROTATE.bits();

bitflags! {
    /// What a point of the map collides with.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CollisionFlags: u8 {
        const SOLID = 1;
        const DEATH = 2;
        const NOHOOK = 4;
        const TELE = 8;
    }
}

/// A tile of the game or front layer.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(C)]
pub struct Tile {
    pub index: u8,
    pub flags: u8,
    pub skip: u8,
    pub reserved: u8,
}

impl Tile {
    pub const fn new(index: DdraceTileNum, flags: u8) -> Self {
        Self {
            index: index as u8,
            flags,
            skip: 0,
            reserved: 0,
        }
    }
}

/// A tile of the tele layer, `number` groups teleporters.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(C)]
pub struct TeleTile {
    pub number: u8,
    pub tile_type: u8,
}

impl TeleTile {
    pub const fn new(tile_type: DdraceTileNum, number: u8) -> Self {
        Self {
            number,
            tile_type: tile_type as u8,
        }
    }
}

/// A tile of the switch layer, `number` is the switch group it belongs to.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(C)]
pub struct SwitchTile {
    pub number: u8,
    pub tile_type: u8,
    pub flags: u8,
    pub delay: u8,
}

impl SwitchTile {
    pub const fn new(tile_type: DdraceTileNum, flags: u8, number: u8) -> Self {
        Self {
            number,
            tile_type: tile_type as u8,
            flags,
            delay: 0,
        }
    }
}

#[cfg(test)]
mod test {
    use num_traits::FromPrimitive;

    use super::{DdraceTileNum, ROTATION_180, ROTATION_270, ROTATION_90};

    #[test]
    fn tile_numbers_match_map_format() {
        assert_eq!(DdraceTileNum::TeleInHook as u8, 15);
        assert_eq!(DdraceTileNum::TeleOut as u8, 27);
        assert_eq!(DdraceTileNum::Stop as u8, 60);
        assert_eq!(DdraceTileNum::StopA as u8, 62);
        assert_eq!(DdraceTileNum::from_u8(61), Some(DdraceTileNum::StopS));
        assert_eq!(DdraceTileNum::from_u8(8), None);
    }

    #[test]
    fn rotations() {
        assert_eq!(ROTATION_90, 8);
        assert_eq!(ROTATION_180, 3);
        assert_eq!(ROTATION_270, 11);
    }
}
