pub mod element;
pub mod svg;
pub mod view;

pub use element::*;
pub use view::*;
