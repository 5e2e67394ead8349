//! Candidate walk, mount lifecycle and fallback field.

pub mod fallback;
pub mod mount;
pub mod resolve;
pub mod state;
