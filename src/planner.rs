//! Route planner state container.
//!
//! Owns the POS catalogue, the working selection, the single-slot result
//! cache and the user-visible error field. The backend is injected, so a
//! planner can be driven against the HTTP adapter or an in-memory double.
//!
//! Every mutation of the selection invalidates the cached result. Optimization
//! requests carry the cache generation they were issued under and their
//! responses are dropped when that generation is no longer current.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

use crate::cache::ResultCache;
use crate::error::{BackendError, PlannerError};
use crate::export;
use crate::model::{
    OptimizationParameters, OptimizeRequest, Pos, PosId, Priority, RouteResult, SaveRouteRequest,
    SelectedPos,
};
use crate::selection::SelectionStore;
use crate::traits::RouteBackend;

/// An issued optimization request, tagged with its generation.
///
/// Consumed by [`RoutePlanner::complete_optimize`]; each ticket applies at
/// most once.
#[derive(Debug)]
pub struct OptimizationTicket {
    generation: u64,
    request: OptimizeRequest,
}

impl OptimizationTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn request(&self) -> &OptimizeRequest {
        &self.request
    }
}

#[derive(Debug)]
pub struct RoutePlanner<B> {
    backend: B,
    available: Vec<Pos>,
    selection: SelectionStore,
    cache: ResultCache,
    pending: Option<u64>,
    last_error: Option<String>,
}

impl<B: RouteBackend> RoutePlanner<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            available: Vec::new(),
            selection: SelectionStore::new(),
            cache: ResultCache::new(),
            pending: None,
            last_error: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn available(&self) -> &[Pos] {
        &self.available
    }

    pub fn selection(&self) -> &[SelectedPos] {
        self.selection.entries()
    }

    pub fn result(&self) -> Option<&RouteResult> {
        self.cache.get()
    }

    /// Message of the most recent failure, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether the latest issued optimization has not been completed yet.
    pub fn is_optimizing(&self) -> bool {
        self.pending == Some(self.cache.generation())
    }

    /// Replace the catalogue with every POS the backend offers.
    pub fn load_available_pos(&mut self) -> Result<usize, PlannerError> {
        let loaded = self.backend.available_pos();
        self.replace_available(loaded)
    }

    /// Replace the catalogue with the POS of one territory.
    pub fn load_pos_by_territory(&mut self, territory: &str) -> Result<usize, PlannerError> {
        let loaded = self.backend.pos_by_territory(territory);
        self.replace_available(loaded)
    }

    /// Catalogue entries matching `query` that are not selected yet.
    ///
    /// An empty query matches everything.
    pub fn search_available(&self, query: &str) -> Vec<&Pos> {
        let needle = query.trim().to_lowercase();
        self.available
            .iter()
            .filter(|pos| !self.selection.contains(&pos.id))
            .filter(|pos| needle.is_empty() || pos.matches(&needle))
            .collect()
    }

    pub fn add_to_selection(&mut self, pos: &Pos) {
        if self.selection.add(pos) {
            self.selection_changed();
        }
    }

    pub fn remove_from_selection(&mut self, id: &PosId) {
        if self.selection.remove(id) {
            self.selection_changed();
        }
    }

    pub fn set_visit_duration(&mut self, id: &PosId, minutes: i32) {
        if self.selection.set_visit_duration(id, minutes) {
            self.selection_changed();
        }
    }

    pub fn set_priority(&mut self, id: &PosId, priority: Priority) {
        if self.selection.set_priority(id, priority) {
            self.selection_changed();
        }
    }

    /// Like [`Self::set_priority`] for untyped input; unknown values are
    /// rejected and leave the selection untouched.
    pub fn set_priority_str(&mut self, id: &PosId, priority: &str) -> Result<(), PlannerError> {
        let priority = priority.parse::<Priority>().map_err(|err| self.fail(err))?;
        self.set_priority(id, priority);
        Ok(())
    }

    /// Empty the selection. The cached result is always dropped.
    pub fn clear(&mut self) {
        self.selection.clear();
        self.selection_changed();
    }

    /// Start over: no selection, no result, no error.
    pub fn new_route(&mut self) {
        self.clear();
        self.last_error = None;
    }

    /// Validate `parameters` and issue a request for the current selection.
    ///
    /// Any ticket issued earlier becomes stale.
    pub fn begin_optimize(
        &mut self,
        parameters: OptimizationParameters,
    ) -> Result<OptimizationTicket, PlannerError> {
        if self.selection.is_empty() {
            return Err(self.fail(PlannerError::EmptySelection));
        }
        if let Err(err) = parameters.validate() {
            return Err(self.fail(err));
        }

        let generation = self.cache.advance();
        self.pending = Some(generation);
        let request = OptimizeRequest::new(parameters, self.selection.entries());
        debug!(generation, stops = request.selected_pos_ids.len(), "optimization issued");

        Ok(OptimizationTicket {
            generation,
            request,
        })
    }

    /// Apply the backend's answer to `ticket`.
    ///
    /// A ticket that is no longer outstanding (superseded, invalidated or
    /// already completed) changes nothing and yields
    /// [`PlannerError::StaleResponse`].
    /// On failure the previous result is kept and the error is recorded.
    pub fn complete_optimize(
        &mut self,
        ticket: OptimizationTicket,
        outcome: Result<RouteResult, BackendError>,
    ) -> Result<&RouteResult, PlannerError> {
        let generation = ticket.generation;
        if self.pending != Some(generation) || generation != self.cache.generation() {
            debug!(
                generation,
                current = self.cache.generation(),
                "discarding stale optimization response"
            );
            return Err(PlannerError::StaleResponse { generation });
        }
        self.pending = None;

        match outcome {
            Ok(result) => {
                info!(
                    generation,
                    stops = result.stops.len(),
                    total_time = result.total_time,
                    "optimization applied"
                );
                self.cache.store(generation, result);
                self.last_error = None;
                self.cache.get().ok_or(PlannerError::NoResult)
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    /// Issue one optimization request and apply its response.
    pub fn optimize(
        &mut self,
        parameters: OptimizationParameters,
    ) -> Result<&RouteResult, PlannerError> {
        let ticket = self.begin_optimize(parameters)?;
        let outcome = self.backend.optimize_route(ticket.request());
        self.complete_optimize(ticket, outcome)
    }

    /// CSV rendering of the cached result.
    pub fn export_csv(&mut self) -> Result<String, PlannerError> {
        let rendered = match self.cache.get() {
            Some(result) => export::render_csv(result),
            None => Err(PlannerError::NoResult),
        };
        rendered.map_err(|err| self.fail(err))
    }

    /// Write today's CSV export into `dir`.
    pub fn export_csv_file(&mut self, dir: &Path) -> Result<PathBuf, PlannerError> {
        self.export_csv_file_on(dir, Local::now().date_naive())
    }

    /// Write the CSV export into `dir`, named after `date`.
    pub fn export_csv_file_on(
        &mut self,
        dir: &Path,
        date: NaiveDate,
    ) -> Result<PathBuf, PlannerError> {
        let written = match self.cache.get() {
            Some(result) => export::write_csv_file(result, dir, date),
            None => Err(PlannerError::NoResult),
        };
        match written {
            Ok(path) => {
                info!(path = %path.display(), "route exported");
                Ok(path)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Persist the current selection and result under `name`.
    pub fn save_route(&mut self, name: &str, description: &str) -> Result<(), PlannerError> {
        let Some(result) = self.cache.get().cloned() else {
            return Err(self.fail(PlannerError::NoResult));
        };
        if name.trim().is_empty() {
            return Err(self.fail(PlannerError::InvalidParameters(
                "route name is empty".to_string(),
            )));
        }

        let request = SaveRouteRequest::new(
            name.trim(),
            description,
            self.selection.entries().to_vec(),
            result,
        );
        match self.backend.save_route(&request) {
            Ok(()) => {
                self.last_error = None;
                Ok(())
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    /// Replace selection and result with a route saved on the backend.
    pub fn load_saved_route(&mut self, route_id: &str) -> Result<(), PlannerError> {
        let saved = match self.backend.saved_route(route_id) {
            Ok(saved) => saved,
            Err(err) => return Err(self.fail(err.into())),
        };

        self.selection.replace(saved.selected_pos);
        let generation = self.cache.invalidate();
        self.pending = None;
        if let Some(result) = saved.route_result {
            self.cache.store(generation, result);
        }
        self.last_error = None;
        info!(
            route_id,
            selected = self.selection.len(),
            has_result = !self.cache.is_empty(),
            "saved route loaded"
        );
        Ok(())
    }

    fn replace_available(
        &mut self,
        loaded: Result<Vec<Pos>, BackendError>,
    ) -> Result<usize, PlannerError> {
        match loaded {
            Ok(pos) => {
                self.available = pos;
                self.last_error = None;
                debug!(count = self.available.len(), "POS catalogue loaded");
                Ok(self.available.len())
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    fn selection_changed(&mut self) {
        let generation = self.cache.invalidate();
        self.pending = None;
        debug!(generation, selected = self.selection.len(), "route result invalidated");
    }

    fn fail(&mut self, err: PlannerError) -> PlannerError {
        let message = err.user_message();
        warn!(error = %err, "planner operation failed");
        self.last_error = Some(message);
        err
    }
}
