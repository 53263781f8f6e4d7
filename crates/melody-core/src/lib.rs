//! Melody Core — shared abstractions for the action-cycling engine.
//!
//! This crate defines the host capability set, the clock, the error
//! taxonomy and the event envelope. It contains no sequencing logic.

pub mod clock;
pub mod error;
pub mod event;
pub mod host;
