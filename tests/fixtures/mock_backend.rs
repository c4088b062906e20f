//! In-memory backend that records every call.

use std::cell::RefCell;
use std::collections::VecDeque;

use pos_route_planner::error::BackendError;
use pos_route_planner::model::{
    OptimizeRequest, Pos, RouteResult, SaveRouteRequest, SavedRoute,
};
use pos_route_planner::traits::RouteBackend;

#[derive(Debug, Default)]
pub struct MockBackend {
    pub catalogue: Vec<Pos>,
    pub saved: Option<SavedRoute>,
    optimize_responses: RefCell<VecDeque<Result<RouteResult, BackendError>>>,
    save_failure: Option<String>,
    pub calls: RefCell<Vec<String>>,
    pub optimize_requests: RefCell<Vec<OptimizeRequest>>,
    pub save_requests: RefCell<Vec<SaveRouteRequest>>,
}

impl MockBackend {
    pub fn new(catalogue: Vec<Pos>) -> Self {
        Self {
            catalogue,
            ..Self::default()
        }
    }

    /// Queue the answer for the next `optimize_route` call.
    pub fn respond_with(self, response: Result<RouteResult, BackendError>) -> Self {
        self.optimize_responses.borrow_mut().push_back(response);
        self
    }

    pub fn push_response(&self, response: Result<RouteResult, BackendError>) {
        self.optimize_responses.borrow_mut().push_back(response);
    }

    pub fn with_saved(mut self, saved: SavedRoute) -> Self {
        self.saved = Some(saved);
        self
    }

    pub fn failing_saves(mut self, message: &str) -> Self {
        self.save_failure = Some(message.to_string());
        self
    }

    pub fn call_count(&self, action: &str) -> usize {
        self.calls.borrow().iter().filter(|call| *call == action).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.borrow().len()
    }

    fn record(&self, action: &str) {
        self.calls.borrow_mut().push(action.to_string());
    }
}

impl RouteBackend for MockBackend {
    fn available_pos(&self) -> Result<Vec<Pos>, BackendError> {
        self.record("getAvailablePOS");
        Ok(self.catalogue.clone())
    }

    fn pos_by_territory(&self, territory: &str) -> Result<Vec<Pos>, BackendError> {
        self.record("getPOSByTerritory");
        Ok(self
            .catalogue
            .iter()
            .filter(|pos| pos.territory == territory)
            .cloned()
            .collect())
    }

    fn saved_route(&self, _route_id: &str) -> Result<SavedRoute, BackendError> {
        self.record("getSavedRoute");
        self.saved
            .clone()
            .ok_or_else(|| BackendError::Rejected("Percorso non trovato".to_string()))
    }

    fn optimize_route(&self, request: &OptimizeRequest) -> Result<RouteResult, BackendError> {
        self.record("optimizeRoute");
        self.optimize_requests.borrow_mut().push(request.clone());
        self.optimize_responses
            .borrow_mut()
            .pop_front()
            .unwrap_or(Err(BackendError::Failed))
    }

    fn save_route(&self, request: &SaveRouteRequest) -> Result<(), BackendError> {
        self.record("saveRoute");
        self.save_requests.borrow_mut().push(request.clone());
        match &self.save_failure {
            Some(message) => Err(BackendError::Rejected(message.clone())),
            None => Ok(()),
        }
    }
}
