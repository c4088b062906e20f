//! Backend seam for the planner.
//!
//! The planner only talks to the optimizer through this trait. The HTTP
//! adapter lives in [`crate::backend`]; tests supply in-memory doubles.

use crate::error::BackendError;
use crate::model::{OptimizeRequest, Pos, RouteResult, SaveRouteRequest, SavedRoute};

/// Remote service that owns POS data, runs optimizations and stores routes.
pub trait RouteBackend {
    /// All POS the user may select.
    fn available_pos(&self) -> Result<Vec<Pos>, BackendError>;

    /// POS belonging to a single territory.
    fn pos_by_territory(&self, territory: &str) -> Result<Vec<Pos>, BackendError>;

    /// A previously saved route with its selection.
    fn saved_route(&self, route_id: &str) -> Result<SavedRoute, BackendError>;

    /// Run one optimization. Exactly one remote call per invocation.
    fn optimize_route(&self, request: &OptimizeRequest) -> Result<RouteResult, BackendError>;

    /// Persist a named route. Not retried on failure.
    fn save_route(&self, request: &SaveRouteRequest) -> Result<(), BackendError>;
}

impl<T: RouteBackend + ?Sized> RouteBackend for &T {
    fn available_pos(&self) -> Result<Vec<Pos>, BackendError> {
        (**self).available_pos()
    }

    fn pos_by_territory(&self, territory: &str) -> Result<Vec<Pos>, BackendError> {
        (**self).pos_by_territory(territory)
    }

    fn saved_route(&self, route_id: &str) -> Result<SavedRoute, BackendError> {
        (**self).saved_route(route_id)
    }

    fn optimize_route(&self, request: &OptimizeRequest) -> Result<RouteResult, BackendError> {
        (**self).optimize_route(request)
    }

    fn save_route(&self, request: &SaveRouteRequest) -> Result<(), BackendError> {
        (**self).save_route(request)
    }
}
