//! Safe SQL builder: identifiers from table mappings only, values as parameters.

mod builder;
pub mod params;
pub use builder::*;
pub use params::*;
