//! Terminal UI module using ratatui.
//!
//! - `render`: Main frame rendering, layout and overlays
//! - `input`: Keyboard event handling
//! - `styles`: Color schemes and text styling
//! - `panels`: The form panel and the saved address list

pub mod input;
pub mod panels;
pub mod render;
pub mod styles;
