// HTTP routes
pub mod audit;
pub mod health;

pub use audit::*;
pub use health::*;
