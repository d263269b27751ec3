//! Path utilities for portfolio-solver.
//!
//! All data lives under `~/.portfolio-solver/`:
//! - `~/.portfolio-solver/config.toml` - main configuration
//! - `~/.portfolio-solver/sets/` - compiled constraint sets

use std::path::PathBuf;

/// Returns the home directory (`~/.portfolio-solver/`).
pub fn home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".portfolio-solver")
}

/// Returns the default config file path (`~/.portfolio-solver/config.toml`).
pub fn default_config() -> PathBuf {
    home_dir().join("config.toml")
}

/// Returns the default constraint set store (`~/.portfolio-solver/sets/`).
pub fn default_store() -> PathBuf {
    home_dir().join("sets")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_under_solver_home() {
        let home = home_dir();
        assert!(home.ends_with(".portfolio-solver"));
        assert!(default_config().starts_with(&home));
        assert!(default_store().starts_with(&home));
        assert!(default_store().ends_with("sets"));
    }
}
