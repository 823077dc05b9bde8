pub mod app;
pub mod line_input;
pub mod render;
pub mod state;
pub mod theme;

pub use app::run;
