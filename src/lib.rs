//! Arc Settlement - per-tick settlement economy simulation

pub mod city;
pub mod core;
pub mod simulation;
