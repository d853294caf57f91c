//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// Success - operation completed without errors
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Input error - values file or config could not be parsed
pub const INPUT_ERROR: i32 = 2;

/// Translation error - the values document could not be translated
pub const TRANSLATION_ERROR: i32 = 3;

/// Unsupported version - no mapping table for the requested version
pub const UNSUPPORTED_VERSION: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Usage error - invalid arguments or options (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;
