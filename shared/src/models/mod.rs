pub mod field;
pub mod generation;
pub mod settings;

pub use field::*;
pub use generation::*;
pub use settings::*;
