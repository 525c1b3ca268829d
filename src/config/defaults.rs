//! Default value functions for configuration.

use std::path::PathBuf;

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

// =============================================================================
// Path Defaults
// =============================================================================

pub fn default_home() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".slirc"),
        None => PathBuf::from(".slirc"),
    }
}

pub fn default_libdir() -> PathBuf {
    PathBuf::from("/usr/local/lib/slirc")
}

pub fn default_sharedir() -> PathBuf {
    PathBuf::from("/usr/local/share/slirc")
}

// =============================================================================
// Server Defaults
// =============================================================================

pub fn default_port() -> u16 {
    6667
}

pub fn default_username() -> String {
    std::env::var("USER").unwrap_or_else(|_| "slirc".to_string())
}

pub fn default_realname() -> String {
    "slirc user".to_string()
}

pub fn default_autoreconnect_delay() -> u32 {
    30
}
