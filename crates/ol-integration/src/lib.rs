//! Launch pipeline for orbis-launcher
//!
//! This crate turns command-line tokens into a resolved launch and hands it
//! to the emulator host.

pub mod args;
pub mod launcher;

pub use args::{parse, ArgError, Command, Effect, Invocation, ParseWarning, Parsed, ParsedArgs, USAGE};
pub use launcher::{apply_effects, EmulatorHost, LaunchDescriptor, Launcher, PatchOptions};
