pub mod icons;
pub mod progress;
pub mod render;

pub use progress::RequestSpinner;
pub use render::{StationScreen, render_page, terminal_width};
