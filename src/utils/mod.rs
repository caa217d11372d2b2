//! Small data structures shared by the analysis stages.

mod window;

pub use window::TrailingWindow;
