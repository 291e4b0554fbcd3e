pub mod filter_bar;
pub mod input_field;

pub use filter_bar::*;
pub use input_field::*;
