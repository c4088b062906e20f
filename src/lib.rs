//! pos-route-planner
//!
//! Client-side state and request orchestration for planning a visit route
//! over a set of points of sale. The optimization itself runs on a remote
//! backend; this crate owns the selection, the last result and the exports.

pub mod backend;
pub mod cache;
pub mod error;
pub mod export;
pub mod model;
pub mod planner;
pub mod selection;
pub mod traits;

pub use error::{BackendError, PlannerError};
pub use planner::RoutePlanner;
