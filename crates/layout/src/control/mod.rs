#![forbid(unsafe_code)]

mod apps;
mod geometry;

pub use apps::{AppBackend, AppControl, AppSet, LaunchOutcome, LaunchStrategy};
pub use geometry::GeometryMutator;
