#![forbid(unsafe_code)]

pub mod clock;
pub mod control;
pub mod domain;
pub mod engine;
pub mod enumeration;
mod error;
pub mod events;
pub mod persistence;
pub mod report;
pub mod resolver;

pub use engine::{RestoreEngine, Services};
pub use error::{ControlError, EnumerationError, Error};
pub use events::{EventSink, NoopSink, RestoreEvent};
pub use report::{FailureReason, ItemOutcome, RestorationReport};
