//! Configuration for the slicing core.
//!
//! Settings are plain values passed by reference to every component; nothing
//! is global.

mod print_config;

pub use print_config::{ExtruderSettings, FillPattern, PrintSettings};
