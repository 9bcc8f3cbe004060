pub mod geojson;
pub mod params;
pub mod topojson;
pub mod travel;

pub use geojson::*;
pub use params::*;
pub use topojson::*;
pub use travel::*;
