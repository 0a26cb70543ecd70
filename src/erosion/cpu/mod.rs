//! CPU implementations used by the erosion engine.

pub mod hydraulic;
