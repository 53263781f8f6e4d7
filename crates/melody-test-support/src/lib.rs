//! Shared test fakes for the melody engine.

mod clock;
mod host;

pub use clock::ManualClock;
pub use host::ScriptedHost;
