//! Standard exit codes for CLI operations
//!
//! These exit codes follow sysexits.h where applicable.

#![allow(dead_code)]

/// Success - operation completed without errors
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Usage error - invalid arguments, filter or registry address
pub const USAGE_ERROR: i32 = 64;

/// Registry unavailable - listing call failed
pub const UNAVAILABLE: i32 = 69;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 74;

/// Permission denied - credentials rejected or not resolvable
pub const NO_PERMISSION: i32 = 77;

/// Configuration error - unreadable or invalid config file
pub const CONFIG_ERROR: i32 = 78;
