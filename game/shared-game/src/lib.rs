#![allow(clippy::too_many_arguments)]
#![allow(clippy::module_inception)]

pub mod collision;
pub mod config;
pub mod entities;
pub mod teams;
pub mod tuning;
pub mod world;
