//! Geometry helpers shared by tracking and counting
mod utils;

pub use self::utils::*;
