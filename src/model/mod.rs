pub mod config;
pub mod filter;
pub mod task;
pub mod theme;

pub use config::*;
pub use filter::*;
pub use task::*;
pub use theme::*;
