pub mod compose;
pub mod curve;
pub mod flyers;
pub mod graticule;
pub mod highlight;
pub mod labels;
pub mod layer;
pub mod path;
pub mod points;
pub mod regions;
pub mod sphere;
pub mod symbology;

pub use compose::*;
pub use highlight::Highlight;
pub use layer::*;
