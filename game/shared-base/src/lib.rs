#![allow(clippy::all)]

pub mod mapdef_06;
