//! # autofit
//!
//! Backend agnostic font-size fitting.
//!
//! Given a block of text, a fixed box and a [`LineMeasurer`], [`TextFitter`] finds the
//! largest font size within a configured range at which the wrapped text stays inside
//! the box. When even the smallest size overflows, the text is cut after the last
//! visible line and ended with an ellipsis.
//!
//! This crate has no dependency on any text engine. `autofit-cosmic` provides a
//! cosmic-text measurer; [`MonospaceMeasurer`] is a fixed-advance reference
//! implementation.

mod config;
mod ellipsis;
mod fitter;
mod measure;
mod monospace;
mod state;
mod surface;

pub use config::*;
pub use ellipsis::*;
pub use fitter::*;
pub use measure::*;
pub use monospace::*;
pub use state::*;
pub use surface::*;
