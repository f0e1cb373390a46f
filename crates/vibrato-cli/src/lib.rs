//! Vibrato CLI library.
//!
//! Input loading and the command implementations behind the `vibrato` binary.

pub mod commands;
pub mod input;
