//! Screen renderers

pub mod dialogs;
pub mod main_screen;
