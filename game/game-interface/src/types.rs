pub mod game;
pub mod input;
