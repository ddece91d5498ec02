//! Export contents of `mot` folder
mod associator;
mod config;
mod counter;
mod crossing;
mod detection;
mod engine;
mod mot_errors;
mod track;
mod track_store;

#[cfg(test)]
pub(crate) mod test_data;

pub use self::{
    associator::*,
    config::*,
    counter::*,
    crossing::*,
    detection::*,
    engine::*,
    mot_errors::*,
    track::*,
    track_store::*,
};
