pub mod indicators;
pub mod readings;
pub mod signals;
pub mod analyzer;


pub use indicators::*;
pub use readings::*;
pub use signals::*;
pub use analyzer::*;
