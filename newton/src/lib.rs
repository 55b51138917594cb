// Problem-to-simulation physics core
pub mod core {
    pub mod dimension;
    pub mod math;
    pub mod quantity;
    pub mod solve;
    pub mod state;
}

pub mod laws {
    pub mod catalog;
    pub mod classical;
    pub mod electromagnetic;
    pub mod registry;
}

pub mod resolve;
pub mod ir;
pub mod simulation;

pub mod investigation {
    pub mod events;
    pub mod monitor;
    pub mod probe;
    pub mod validate;
}

pub mod config;
pub mod enrich;
pub mod error;
pub mod pipeline;

pub use config::NewtonConfig;
pub use error::{Error, Result};
pub use pipeline::{Pipeline, PipelineReport};
