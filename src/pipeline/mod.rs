//! Frame loop and the hand-off to slower output stages
mod overlay_queue;
mod stream;

pub use self::{overlay_queue::*, stream::*};
