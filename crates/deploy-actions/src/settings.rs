//! Process-level settings shared by the action binaries.

use std::time::Duration;

/// Environment variable that switches the actions into test mode.
pub const ENV_TEST_MODE: &str = "ISTEST";

/// Run-wide settings.
///
/// Test mode skips the real run path in the binaries and shrinks waits from
/// seconds to milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionSettings {
    pub test_mode: bool,
}

impl ActionSettings {
    #[must_use]
    pub fn from_env() -> Self {
        let test_mode = std::env::var(ENV_TEST_MODE)
            .map(|v| !v.is_empty())
            .unwrap_or(false);

        Self { test_mode }
    }

    #[must_use]
    pub const fn test() -> Self {
        Self { test_mode: true }
    }

    /// Duration of `units` wait units: seconds normally, milliseconds in
    /// test mode.
    #[must_use]
    pub const fn wait(self, units: u64) -> Duration {
        if self.test_mode {
            Duration::from_millis(units)
        } else {
            Duration::from_secs(units)
        }
    }
}
