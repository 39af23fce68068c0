pub mod park;
pub mod snapshot;
pub mod schedule;
pub mod config;

pub use park::*;
pub use snapshot::*;
pub use schedule::*;
pub use config::*;
