pub mod edit;
pub mod error;
pub mod form;
pub mod task;
pub mod view;

pub use edit::*;
pub use error::*;
pub use form::*;
pub use task::*;
pub use view::*;
