mod macros;
pub mod primitives;
pub mod objects;

pub use primitives::*;
pub use objects::*;
