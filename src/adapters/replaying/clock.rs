//! Replaying adapter for the `Clock` port.

use chrono::{DateTime, Utc};

use super::next_output;
use crate::cassette::config::SharedReplayer;
use crate::ports::clock::Clock;

/// Replays recorded clock readings from a cassette.
pub struct ReplayingClock {
    replayer: SharedReplayer,
}

impl ReplayingClock {
    /// Creates a replaying clock backed by the given replayer.
    #[must_use]
    pub fn new(replayer: SharedReplayer) -> Self {
        Self { replayer }
    }
}

impl Clock for ReplayingClock {
    fn now(&self) -> DateTime<Utc> {
        let output = next_output(&self.replayer, "clock", "now");
        serde_json::from_value(output).expect("clock::now: failed to deserialize DateTime<Utc>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::replaying::testing::replayer;
    use serde_json::json;

    #[test]
    fn serves_readings_in_order() {
        let clock = ReplayingClock::new(replayer(vec![
            ("clock", "now", json!("2024-01-01T00:00:00Z")),
            ("clock", "now", json!("2024-01-01T00:00:42Z")),
        ]));
        let start = clock.now();
        let end = clock.now();
        assert_eq!((end - start).num_seconds(), 42);
    }
}
