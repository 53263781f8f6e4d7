//! Melody — automated action-cycling engine.
//!
//! Repeatedly triggers a bounded sequence of host-defined actions for the
//! controlled entity, rewinds or advances on retryable interruptions, and
//! ends the run on a fixed set of external conditions. The host drives
//! everything: it calls `tick` on its polling cadence and reports stopped
//! actions as they happen.

pub mod application;
pub mod domain;
