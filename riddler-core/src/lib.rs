pub mod batch;
pub mod chart;
pub mod config;
pub mod constants;
pub mod error;
pub mod foraging;
pub mod geo;
pub mod random;
pub mod rendezvous;
pub mod stats;

pub use batch::TrialPlan;
pub use chart::ChartSink;
pub use config::{ForagingConfig, RendezvousConfig, SimConfig};
pub use error::SimError;
pub use foraging::{
    ForagingThreeTable, ForagingTwoTable, GridFilter, ThresholdPairResult, ThresholdResult,
};
pub use geo::GeoPoint;
pub use random::{CyclicSource, UniformSource};
pub use rendezvous::{LatitudeSampling, RatioResult, RendezvousTable};
pub use stats::{Histogram, Summary};
