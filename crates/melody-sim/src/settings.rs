//! Simulator settings read from the environment.

use std::time::Duration;

use melody_core::host::ActionSlot;

/// Runtime settings for one simulation.
#[derive(Debug, Clone)]
pub struct SimSettings {
    /// Slots to cycle, converted from one-based gem numbers.
    pub slots: Vec<ActionSlot>,
    /// Host polling cadence.
    pub tick: Duration,
    /// How long to run before the entity leaves the world.
    pub run_for: Duration,
    /// How long each simulated cast keeps the cast window open.
    pub cast_duration: Duration,
    /// Probability that a cast is interrupted.
    pub fizzle_rate: f64,
    /// Seed for the interruption RNG.
    pub seed: u64,
}

impl SimSettings {
    /// Reads settings from `MELODY_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns a readable message when a variable is present but malformed.
    pub fn from_env() -> Result<Self, String> {
        let slots = parse_slots(&var_or("MELODY_SLOTS", "1,2,3"))?;
        let tick = Duration::from_millis(parse_var("MELODY_TICK_MS", "50")?);
        let run_for = Duration::from_millis(parse_var("MELODY_RUN_MS", "20000")?);
        let cast_duration = Duration::from_millis(parse_var("MELODY_CAST_MS", "3000")?);
        let fizzle_rate: f64 = parse_var("MELODY_FIZZLE_RATE", "0.2")?;
        if !(0.0..=1.0).contains(&fizzle_rate) {
            return Err(format!(
                "MELODY_FIZZLE_RATE must be between 0 and 1, got {fizzle_rate}"
            ));
        }
        let seed = parse_var("MELODY_SEED", "7")?;

        Ok(Self {
            slots,
            tick,
            run_for,
            cast_duration,
            fizzle_rate,
            seed,
        })
    }
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_owned())
}

fn parse_var<T>(name: &str, default: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    var_or(name, default)
        .trim()
        .parse()
        .map_err(|e| format!("{name} is not valid: {e}"))
}

/// Parses a comma-separated list of one-based gem numbers.
fn parse_slots(raw: &str) -> Result<Vec<ActionSlot>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let gem: u8 = part
                .parse()
                .map_err(|_| format!("MELODY_SLOTS entry {part:?} is not a gem number"))?;
            gem.checked_sub(1)
                .map(ActionSlot)
                .ok_or_else(|| "MELODY_SLOTS gem numbers start at 1".to_owned())
        })
        .collect()
}
