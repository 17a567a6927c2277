//! Shared test utilities for drill integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. Everything here is deterministic under
//! `#[tokio::test(start_paused = true)]` except [`fake_forecast_api`], which
//! binds a real TCP port.

pub mod assertions;
pub mod builders;
pub mod fake_backend;
pub mod fake_forecast_api;
pub mod fixtures;

pub use builders::*;
pub use fake_backend::*;
pub use fake_forecast_api::FakeForecastApi;
pub use fixtures::*;
