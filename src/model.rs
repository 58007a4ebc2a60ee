//! Data models for the pallet calculation.
//!
//! This module defines the value types that flow through one calculation:
//! - `ProductSpec` / `PalletSpec` / `ContainerHeight`: validated input
//! - `OrientationPlan` / `ProductPlan`: per-product stacking decisions
//! - `Layer`: a leftover slice of cartons waiting for a mixed pallet
//! - `PalletDetail`: a realized pallet (or a count of identical ones)
//! - `CalculationResult`: the aggregated outcome
//!
//! All of them are created once per calculation and never mutated afterwards.

use std::collections::BTreeMap;

use serde::Serialize;
#[allow(unused_imports)]
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

use crate::types::{
    CM3_PER_CBM, CM_PER_M, ContainerType, Footprint, cbm_to_cuft, find_container,
    valid_container_codes,
};

/// Validation error for shipment data and for constraints discovered while planning.
///
/// Every variant renders as a human-readable message; adapters show it verbatim.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid product specification: {record} ({reason})")]
    InvalidProduct { record: String, reason: String },

    #[error("At least one product must be provided.")]
    NoProducts,

    #[error("Invalid pallet specification: {0}")]
    InvalidPallet(String),

    #[error("Pallet dimensions must be positive numbers ({field} = {value}).")]
    NonPositivePallet { field: &'static str, value: f64 },

    #[error(
        "Pallet base height must be lower than total pallet height (base {base_height_cm} cm, height {height_cm} cm)."
    )]
    BaseHeightTooLarge {
        base_height_cm: f64,
        height_cm: f64,
    },

    #[error("Unsupported container height '{code}'. Valid values: {valid}.")]
    UnsupportedContainer { code: String, valid: String },

    #[error("Pallet/base height exceeds available container height.")]
    GoodsHeightExhausted,

    #[error("Product {0} cannot fit on the pallet footprint with either orientation.")]
    NoFittingOrientation(String),

    #[error("Product {0} exceeds the allowable stacking height.")]
    ExceedsStackingHeight(String),

    #[error("Product {0} cannot be placed on the pallet with the given constraints.")]
    NoPalletCapacity(String),

    #[error(
        "Product {product} would need {cartons_per_layer} cartons per layer; at most {limit} are supported."
    )]
    TooManyCartonsPerLayer {
        product: String,
        cartons_per_layer: u64,
        limit: u64,
    },

    #[error(
        "Product {product} would stack {layers} layers per pallet; at most {limit} are supported."
    )]
    TooManyLayers {
        product: String,
        layers: u64,
        limit: u64,
    },

    #[error("Total carton count exceeds the supported range.")]
    CartonCountOverflow,

    #[error(
        "Layer of product {product} ({layer_height_cm} cm) exceeds available stacking limit of {limit_cm} cm."
    )]
    LayerTooTall {
        product: String,
        layer_height_cm: f64,
        limit_cm: f64,
    },
}

fn positive_finite(value: f64) -> bool {
    value > 0.0 && value.is_finite()
}

/// A product (SKU) that must be palletised.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductSpec {
    pub name: String,
    pub order_quantity_pcs: u64,
    pub pcs_per_carton: u64,
    pub carton_length_cm: f64,
    pub carton_width_cm: f64,
    pub carton_height_cm: f64,
}

impl ProductSpec {
    /// Creates a product after checking that quantities and carton dimensions are positive.
    ///
    /// # Parameters
    /// * `name` - Product name, used in labels and messages
    /// * `order_quantity_pcs` - Ordered pieces
    /// * `pcs_per_carton` - Pieces packed into one carton
    /// * `carton_dims_cm` - Carton (length, width, height)
    pub fn new(
        name: impl Into<String>,
        order_quantity_pcs: u64,
        pcs_per_carton: u64,
        carton_dims_cm: (f64, f64, f64),
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let invalid = |reason: String| ValidationError::InvalidProduct {
            record: name.clone(),
            reason,
        };

        if order_quantity_pcs == 0 {
            return Err(invalid("order quantity must be positive".to_string()));
        }
        if pcs_per_carton == 0 {
            return Err(invalid("pieces per carton must be positive".to_string()));
        }
        let (length, width, height) = carton_dims_cm;
        for (label, value) in [("length", length), ("width", width), ("height", height)] {
            if !positive_finite(value) {
                return Err(invalid(format!(
                    "carton {} must be positive, got: {}",
                    label, value
                )));
            }
        }

        Ok(Self {
            name,
            order_quantity_pcs,
            pcs_per_carton,
            carton_length_cm: length,
            carton_width_cm: width,
            carton_height_cm: height,
        })
    }

    /// Number of cartons needed to hold the ordered pieces (rounded up).
    pub fn cartons_required(&self) -> u64 {
        self.order_quantity_pcs.div_ceil(self.pcs_per_carton)
    }

    /// Volume of one carton in cubic metres.
    pub fn carton_volume_cbm(&self) -> f64 {
        self.carton_length_cm * self.carton_width_cm * self.carton_height_cm / CM3_PER_CBM
    }

    /// Carton footprint as given (length × width).
    pub fn carton_footprint(&self) -> Footprint {
        Footprint::new(self.carton_length_cm, self.carton_width_cm)
    }
}

/// The pallet type used for every product of a shipment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PalletSpec {
    pub length_cm: f64,
    pub width_cm: f64,
    pub height_cm: f64,
    pub base_height_cm: f64,
}

impl PalletSpec {
    /// Creates a pallet spec with validation.
    ///
    /// All values must be positive and the base must be lower than the total height.
    pub fn new(
        length_cm: f64,
        width_cm: f64,
        height_cm: f64,
        base_height_cm: f64,
    ) -> Result<Self, ValidationError> {
        for (field, value) in [
            ("length_cm", length_cm),
            ("width_cm", width_cm),
            ("height_cm", height_cm),
            ("base_height_cm", base_height_cm),
        ] {
            if !positive_finite(value) {
                return Err(ValidationError::NonPositivePallet { field, value });
            }
        }
        if base_height_cm >= height_cm {
            return Err(ValidationError::BaseHeightTooLarge {
                base_height_cm,
                height_cm,
            });
        }
        Ok(Self {
            length_cm,
            width_cm,
            height_cm,
            base_height_cm,
        })
    }

    /// Maximum stack height of goods above the pallet base inside the given container.
    pub fn goods_height_limit(&self, container_height_cm: f64) -> Result<f64, ValidationError> {
        let limit = self.height_cm.min(container_height_cm) - self.base_height_cm;
        if limit <= 0.0 {
            return Err(ValidationError::GoodsHeightExhausted);
        }
        Ok(limit)
    }

    /// Pallet deck footprint.
    pub fn footprint(&self) -> Footprint {
        Footprint::new(self.length_cm, self.width_cm)
    }

    /// Pallet deck area in square metres.
    pub fn footprint_sqm(&self) -> f64 {
        self.footprint().area_sqm()
    }
}

/// Resolved container with its interior clear height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContainerHeight {
    pub code: &'static str,
    pub interior_height_cm: f64,
}

impl ContainerHeight {
    /// Resolves a container code (case-insensitive).
    pub fn from_code(code: &str) -> Result<Self, ValidationError> {
        find_container(code)
            .map(Self::from)
            .ok_or_else(|| ValidationError::UnsupportedContainer {
                code: code.to_string(),
                valid: valid_container_codes(),
            })
    }
}

impl From<&ContainerType> for ContainerHeight {
    fn from(container: &ContainerType) -> Self {
        Self {
            code: container.code,
            interior_height_cm: container.interior_height_cm,
        }
    }
}

/// Chosen 2D layout of one product's cartons on the pallet deck.
///
/// `carton_length_cm` / `carton_width_cm` are the effective dimensions after
/// a possible axis swap.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, ToSchema)]
pub struct OrientationPlan {
    pub cartons_per_layer: u64,
    pub cartons_along_length: u64,
    pub cartons_along_width: u64,
    pub carton_length_cm: f64,
    pub carton_width_cm: f64,
}

/// Full stacking plan for one product.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductPlan {
    pub product: ProductSpec,
    pub orientation: OrientationPlan,
    pub layers_per_pallet: u64,
    pub cartons_per_pallet: u64,
    pub full_pallets: u64,
    pub remainder_cartons: u64,
}

impl ProductPlan {
    /// Goods height of a full pallet of this product.
    pub fn goods_height_cm(&self) -> f64 {
        self.layers_per_pallet as f64 * self.product.carton_height_cm
    }
}

/// One horizontal slice of cartons of a single product, waiting for a pallet.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub product_name: String,
    pub cartons: u64,
    pub layer_height_cm: f64,
}

/// A realized pallet, or `count` identical ones.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct PalletDetail {
    #[schema(example = "999-00031 full pallet")]
    pub label: String,
    pub count: u64,
    #[schema(example = json!({"999-00031": 72}))]
    pub cartons_by_product: BTreeMap<String, u64>,
    pub goods_height_cm: f64,
    pub total_height_cm: f64,
}

impl PalletDetail {
    /// Creates a pallet holding a single product.
    pub fn single_product(
        label: String,
        count: u64,
        product_name: &str,
        cartons: u64,
        goods_height_cm: f64,
        base_height_cm: f64,
    ) -> Self {
        let mut cartons_by_product = BTreeMap::new();
        cartons_by_product.insert(product_name.to_string(), cartons);
        Self {
            label,
            count,
            cartons_by_product,
            goods_height_cm,
            total_height_cm: goods_height_cm + base_height_cm,
        }
    }

    /// Shipping volume of all `count` pallets including the pallet base.
    pub fn volume_cbm(&self, footprint_sqm: f64) -> f64 {
        self.count as f64 * footprint_sqm * (self.total_height_cm / CM_PER_M)
    }
}

/// Outcome of a full calculation.
#[derive(Clone, Debug, PartialEq)]
pub struct CalculationResult {
    pub product_plans: Vec<ProductPlan>,
    pub pallets: Vec<PalletDetail>,
    pub total_cartons: u64,
    pub total_pallets: u64,
    pub volume_without_pallets_cbm: f64,
    pub volume_with_pallets_cbm: f64,
}

impl CalculationResult {
    pub fn volume_without_pallets_cuft(&self) -> f64 {
        cbm_to_cuft(self.volume_without_pallets_cbm)
    }

    pub fn volume_with_pallets_cuft(&self) -> f64 {
        cbm_to_cuft(self.volume_with_pallets_cbm)
    }

    /// Number of pallet groups that combine more than one product.
    pub fn mixed_pallet_count(&self) -> usize {
        self.pallets
            .iter()
            .filter(|detail| detail.cartons_by_product.len() > 1)
            .count()
    }
}
