pub mod core;
pub mod types;

pub use crate::core::SchoolCore;
pub use crate::core::error::SchoolError;
