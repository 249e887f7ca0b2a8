//! Process exit codes for the command line interface.
//!
//! Follows the common linter convention: 0 means nothing to do, 1 means
//! `check` found blocks pending annotation, 2 means the tool itself
//! failed (bad configuration, unreadable paths).

pub mod exit {
    use std::process;

    /// No eligible blocks pending annotation
    pub const SUCCESS: i32 = 0;
    /// `check` found blocks pending annotation
    pub const PENDING: i32 = 1;
    /// Configuration or IO failure
    pub const TOOL_ERROR: i32 = 2;

    pub fn success() -> ! {
        process::exit(SUCCESS)
    }

    pub fn pending() -> ! {
        process::exit(PENDING)
    }

    pub fn tool_error() -> ! {
        process::exit(TOOL_ERROR)
    }
}
