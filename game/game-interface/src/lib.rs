#![deny(warnings)]
#![deny(clippy::all)]

pub mod events;
pub mod types;
