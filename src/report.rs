//! Plain-text shipment report for the command line.
//!
//! Reads a JSON shipment document (from a file or stdin), runs the
//! calculation and renders the result. No calculation happens here.

use std::fmt::Write as _;
use std::io::Read;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::calculator::{CalculationConfig, calculate_palletization_with_config};
use crate::input::ShipmentRequest;
use crate::model::{CalculationResult, PalletDetail, ValidationError};

/// Errors of the command-line front end.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Could not read input '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid shipment document: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Reads a shipment document; `-` reads from stdin.
pub fn load_shipment(path: &str) -> Result<ShipmentRequest, CliError> {
    load_shipment_from(path, std::io::stdin())
}

/// Like `load_shipment`, reading `-` from `stdin` instead of the process stdin.
pub fn load_shipment_from(path: &str, mut stdin: impl Read) -> Result<ShipmentRequest, CliError> {
    let io_error = |source| CliError::Io {
        path: path.to_string(),
        source,
    };

    let raw = if path == "-" {
        let mut buffer = String::new();
        stdin.read_to_string(&mut buffer).map_err(io_error)?;
        buffer
    } else {
        std::fs::read_to_string(Path::new(path)).map_err(io_error)?
    };

    Ok(serde_json::from_str(&raw)?)
}

/// Loads the shipment at `path`, calculates it and returns the formatted report.
pub fn run_report(path: &str, config: &CalculationConfig) -> Result<String, CliError> {
    let request = load_shipment(path)?;
    let input = request.into_calculation_input(config.default_allow_mixed);
    debug!(input = path, mixed = input.allow_mixed_remainders, "📥 Calculating shipment");
    let result = calculate_palletization_with_config(&input, config)?;
    Ok(format_report(&result))
}

/// One line of the pallet breakdown.
pub fn format_pallet(detail: &PalletDetail) -> String {
    // BTreeMap iterates in name order
    let products = detail
        .cartons_by_product
        .iter()
        .map(|(name, count)| format!("{}: {} cartons", name, count))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "- {} × {} (goods height {:.0} cm, total height {:.0} cm) -> {}",
        detail.count, detail.label, detail.goods_height_cm, detail.total_height_cm, products
    )
}

/// Renders the complete report.
pub fn format_report(result: &CalculationResult) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, result);
    out
}

fn write_report(out: &mut String, result: &CalculationResult) -> std::fmt::Result {
    writeln!(out, "Total pallets required: {}\n", result.total_pallets)?;

    writeln!(out, "Per-product summary:")?;
    for plan in &result.product_plans {
        let orientation = &plan.orientation;
        writeln!(out, "- {}:", plan.product.name)?;
        writeln!(out, "  Order quantity: {} pcs", plan.product.order_quantity_pcs)?;
        writeln!(out, "  Cartons required: {}", plan.product.cartons_required())?;
        writeln!(
            out,
            "  Best orientation: {:.0} × {:.0} cm ({} × {} per layer)",
            orientation.carton_length_cm,
            orientation.carton_width_cm,
            orientation.cartons_along_length,
            orientation.cartons_along_width
        )?;
        writeln!(out, "  Cartons per layer: {}", orientation.cartons_per_layer)?;
        writeln!(out, "  Layers per pallet: {}", plan.layers_per_pallet)?;
        writeln!(out, "  Full pallets: {}", plan.full_pallets)?;
        writeln!(out, "  Remainder cartons: {}\n", plan.remainder_cartons)?;
    }

    writeln!(out, "Pallet breakdown:")?;
    for detail in &result.pallets {
        writeln!(out, "{}", format_pallet(detail))?;
    }
    writeln!(out)?;

    writeln!(
        out,
        "Total volume without pallets: {:.3} CBM / {:.2} CUFT",
        result.volume_without_pallets_cbm,
        result.volume_without_pallets_cuft()
    )?;
    writeln!(
        out,
        "Total volume with pallets: {:.3} CBM / {:.2} CUFT",
        result.volume_with_pallets_cbm,
        result.volume_with_pallets_cuft()
    )
}
