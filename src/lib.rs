//! Pallet and shipping volume calculator.
//!
//! Given a set of products (cartons and order quantities), a pallet type and a
//! container, the calculator picks a carton orientation per product, plans
//! full pallets, handles leftover cartons either on dedicated pallets or by
//! consolidating them onto mixed pallets, and totals pallets and volumes.
//!
//! The calculation itself (`calculator::calculate_palletization`) is a pure
//! function; `report` and `api` are thin front ends around it.

pub mod api;
pub mod calculator;
pub mod config;
pub mod input;
pub mod logging;
pub mod model;
pub mod orientation;
pub mod packer;
pub mod planner;
pub mod report;
pub mod types;

pub use calculator::{
    CalculationConfig, calculate_palletization, calculate_palletization_with_config,
};
pub use input::{CalculationInput, ShipmentRequest};
pub use model::{CalculationResult, PalletDetail, ProductPlan, ValidationError};
