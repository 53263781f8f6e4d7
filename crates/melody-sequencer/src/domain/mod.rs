//! Domain layer: the sequencer state machine, its configuration and events.

pub mod config;
pub mod events;
pub mod sequencer;
