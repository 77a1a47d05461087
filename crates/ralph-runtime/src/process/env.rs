//! Child environment sanitizing.
//!
//! Supervised agents run behind pipes, so color and TUI rendering are
//! switched off. `CI` is stripped from the inherited environment: several
//! agents read it as "non-interactive dry run" and silently skip real work.

use tokio::process::Command;

/// Variables forced on every child.
pub const CHILD_ENV_OVERRIDES: [(&str, &str); 3] =
    [("TERM", "dumb"), ("NO_COLOR", "1"), ("FORCE_COLOR", "0")];

/// Variables removed from every child, and never set.
pub const CHILD_ENV_REMOVED: [&str; 1] = ["CI"];

/// Apply the sanitized environment to `cmd` on top of the inherited one.
pub fn apply_sanitized_env(cmd: &mut Command) {
    for (key, value) in CHILD_ENV_OVERRIDES {
        cmd.env(key, value);
    }
    for key in CHILD_ENV_REMOVED {
        cmd.env_remove(key);
    }
}
