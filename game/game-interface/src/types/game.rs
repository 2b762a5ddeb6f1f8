/// Index of a character in the world's registry.
pub type CharacterId = usize;

pub type GameTickType = u64;

/// The simulation runs at a fixed rate, shared by client and server.
pub const TICKS_PER_SECOND: GameTickType = 50;

/// Number of character slots of a world.
pub const MAX_CLIENTS: usize = 64;
/// Number of character slots of the 16 player ruleset.
pub const VANILLA_MAX_CLIENTS: usize = 16;
