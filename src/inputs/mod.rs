pub mod keymap;
pub mod line_input;

pub use keymap::{AppCommand, map_key};
pub use line_input::{InputOutcome, LineInput};
