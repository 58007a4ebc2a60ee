//! Normalization of untrusted shipment data.
//!
//! Raw input arrives as loosely typed JSON (from a file, a request body or a
//! web form). The functions here coerce it into the validated value types of
//! the `model` module, failing on the first offending record.

use serde::Deserialize;
#[allow(unused_imports)]
use serde_json::json;
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::model::{ContainerHeight, PalletSpec, ProductSpec, ValidationError};

/// Shipment as supplied by a client.
///
/// `products` and `pallet_dimensions_cm` stay untyped until `load_products` /
/// `load_pallet` validate them, so that errors can name the offending record.
#[derive(Clone, Debug, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "products": [
            {
                "name": "999-00031",
                "order_quantity_pcs": 800,
                "pcs_per_carton": 10,
                "carton_dimensions_cm": [56, 26, 20]
            }
        ],
        "pallet_dimensions_cm": { "length_cm": 120, "width_cm": 105, "height_cm": 195 },
        "allow_mixed_remainders": true,
        "container_height": "20CY"
    })
)]
pub struct ShipmentRequest {
    #[schema(value_type = Vec<Object>)]
    pub products: Value,
    #[schema(value_type = Object)]
    pub pallet_dimensions_cm: Value,
    #[serde(default)]
    #[schema(nullable = true)]
    pub allow_mixed_remainders: Option<bool>,
    pub container_height: String,
}

/// Input of one calculation call.
#[derive(Clone, Debug)]
pub struct CalculationInput {
    pub products: Value,
    pub pallet: Value,
    pub allow_mixed_remainders: bool,
    pub container_height: String,
}

impl ShipmentRequest {
    /// Resolves the optional mixing flag against the configured default.
    pub fn into_calculation_input(self, default_allow_mixed: bool) -> CalculationInput {
        CalculationInput {
            products: self.products,
            pallet: self.pallet_dimensions_cm,
            allow_mixed_remainders: self.allow_mixed_remainders.unwrap_or(default_allow_mixed),
            container_height: self.container_height,
        }
    }
}

fn product_error(raw: &Value, reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidProduct {
        record: raw.to_string(),
        reason: reason.into(),
    }
}

/// Coerces a JSON number or numeric string into a float.
fn coerce_f64(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|number| number.is_finite())
}

/// Coerces a JSON integer, an integral float or an integer string into a `u64`.
fn coerce_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64().or_else(|| {
            number
                .as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    }
}

fn coerce_name(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn load_product(raw: &Value) -> Result<ProductSpec, ValidationError> {
    let record = raw
        .as_object()
        .ok_or_else(|| product_error(raw, "expected an object"))?;

    let field = |key: &str| {
        record
            .get(key)
            .ok_or_else(|| product_error(raw, format!("missing field '{}'", key)))
    };

    let name = coerce_name(field("name")?)
        .ok_or_else(|| product_error(raw, "'name' must be a string"))?;
    let order_quantity_pcs = coerce_u64(field("order_quantity_pcs")?)
        .ok_or_else(|| product_error(raw, "'order_quantity_pcs' must be an integer"))?;
    let pcs_per_carton = coerce_u64(field("pcs_per_carton")?)
        .ok_or_else(|| product_error(raw, "'pcs_per_carton' must be an integer"))?;

    let dims = field("carton_dimensions_cm")?
        .as_array()
        .filter(|dims| dims.len() >= 3)
        .ok_or_else(|| {
            product_error(raw, "'carton_dimensions_cm' must list length, width and height")
        })?;
    let dimension = |index: usize| {
        coerce_f64(&dims[index])
            .ok_or_else(|| product_error(raw, "carton dimensions must be numeric"))
    };
    let carton_dims = (dimension(0)?, dimension(1)?, dimension(2)?);

    ProductSpec::new(name, order_quantity_pcs, pcs_per_carton, carton_dims).map_err(|err| {
        match err {
            ValidationError::InvalidProduct { reason, .. } => product_error(raw, reason),
            other => other,
        }
    })
}

/// Parses and validates the product list.
///
/// # Returns
/// The products in input order, or the first validation error encountered.
pub fn load_products(raw_products: &Value) -> Result<Vec<ProductSpec>, ValidationError> {
    let entries = match raw_products {
        Value::Array(entries) => entries,
        Value::Null => return Err(ValidationError::NoProducts),
        other => return Err(product_error(other, "products must be a list")),
    };

    let products = entries
        .iter()
        .map(load_product)
        .collect::<Result<Vec<_>, _>>()?;

    if products.is_empty() {
        return Err(ValidationError::NoProducts);
    }
    Ok(products)
}

fn pallet_value(
    record: &Map<String, Value>,
    key: &'static str,
) -> Result<Option<f64>, ValidationError> {
    match record.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => coerce_f64(value).map(Some).ok_or_else(|| {
            ValidationError::InvalidPallet(format!("'{}' must be a number, got {}", key, value))
        }),
    }
}

fn required_pallet_value(
    record: &Map<String, Value>,
    key: &'static str,
) -> Result<f64, ValidationError> {
    pallet_value(record, key)?
        .ok_or_else(|| ValidationError::InvalidPallet(format!("missing field '{}'", key)))
}

/// Parses and validates the pallet dimensions.
///
/// `base_height_cm` is optional and falls back to `default_base_height_cm`.
pub fn load_pallet(
    raw_pallet: &Value,
    default_base_height_cm: f64,
) -> Result<PalletSpec, ValidationError> {
    let record = raw_pallet.as_object().ok_or_else(|| {
        ValidationError::InvalidPallet(format!("expected an object, got {}", raw_pallet))
    })?;

    let length_cm = required_pallet_value(record, "length_cm")?;
    let width_cm = required_pallet_value(record, "width_cm")?;
    let height_cm = required_pallet_value(record, "height_cm")?;
    let base_height_cm = pallet_value(record, "base_height_cm")?.unwrap_or(default_base_height_cm);

    PalletSpec::new(length_cm, width_cm, height_cm, base_height_cm)
}

/// Resolves a container code to its interior height.
pub fn resolve_container_height(code: &str) -> Result<ContainerHeight, ValidationError> {
    ContainerHeight::from_code(code)
}
