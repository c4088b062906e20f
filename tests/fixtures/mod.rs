//! Test fixtures for pos-route-planner.
//!
//! Provides:
//! - A small catalogue of Milan-area points of sale
//! - A recording in-memory backend with scripted responses

#![allow(dead_code)]

pub mod milan_pos;
pub mod mock_backend;

pub use milan_pos::*;
pub use mock_backend::*;
