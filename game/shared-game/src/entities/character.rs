pub mod core;
pub mod hook;
pub mod tiles;
