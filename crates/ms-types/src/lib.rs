pub mod archetype;
pub mod config;
pub mod intervention;
pub mod modification;
pub mod errors;

pub use archetype::*;
pub use config::*;
pub use intervention::*;
pub use modification::*;
pub use errors::*;
