//! Map view use cases

pub mod controller;
pub mod scheduler;
pub mod selection;

pub use controller::{
    ControllerError, ControllerResult, FleetMapController, LoadOutcome, TickOutcome,
};
pub use scheduler::{Backoff, FailureState, PollScheduler, RetryPolicy};
pub use selection::{RouteDetail, SelectionController, StopDetail};
