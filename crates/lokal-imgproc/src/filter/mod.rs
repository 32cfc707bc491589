//! Filter operations
//!
//! This module provides neighborhood filters for image processing.

/// Directional shadow (emboss) filter
mod shadow;
pub use shadow::*;
