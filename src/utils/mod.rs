//! Utilities for uiscript.
//!
//! Submodules:
//! - `interpolation`: `$name` substitution and the lenient integer parsing used for numeric parameters.

pub mod interpolation;
