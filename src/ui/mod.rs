//! UI modules for the viewer.
//!
//! The UI is split into two parts:
//! - Top bar: overlay toggles, radar mode switch and timestamp display
//! - Central canvas: radar tiles and lightning markers

mod canvas;
pub mod colors;
mod top_bar;

pub use canvas::render_canvas;
pub use top_bar::render_top_bar;
