//! `marble-rs` is a toolkit for the Marble visual-novel engine's on-disk
//! assets: MBL archive containers and PRS compressed images.
//!
//! The crate re-exports everything from [`marble_types`]; the `marble_utils`
//! binary in this package is the command-line front-end.

pub use marble_types::*;
