//! Input/output helpers.
//!
//! - chart CSV export (`export`)
//! - dashboard JSON read/write (`view`)

pub mod export;
pub mod view;

pub use export::*;
pub use view::*;
