//! Calculation entry point and result aggregation.
//!
//! Runs the whole pipeline for one shipment: input normalization,
//! orientation selection and planning per product, remainder handling, and
//! finally the carton, pallet and volume totals.

use tracing::{debug, info};

use crate::input::{CalculationInput, load_pallet, load_products, resolve_container_height};
use crate::model::{CalculationResult, Layer, PalletDetail, ProductPlan, ValidationError};
use crate::orientation::best_orientation;
use crate::packer::{PackEvent, mixed_pallet_details, pack_layers_with_progress};
use crate::planner::{dedicated_remainder_pallet, full_pallet_detail, plan_product, remainder_layers};
use crate::types::DEFAULT_BASE_HEIGHT_CM;

/// Settings applied to every calculation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CalculationConfig {
    /// Pallet base height used when the input omits `base_height_cm`.
    pub default_base_height_cm: f64,
    /// Mixing mode used when a request omits `allow_mixed_remainders`.
    pub default_allow_mixed: bool,
}

impl CalculationConfig {
    pub const DEFAULT_BASE_HEIGHT_CM: f64 = DEFAULT_BASE_HEIGHT_CM;
    pub const DEFAULT_ALLOW_MIXED: bool = false;

    /// Creates a builder for a custom configuration.
    pub fn builder() -> CalculationConfigBuilder {
        CalculationConfigBuilder::default()
    }
}

impl Default for CalculationConfig {
    fn default() -> Self {
        Self {
            default_base_height_cm: Self::DEFAULT_BASE_HEIGHT_CM,
            default_allow_mixed: Self::DEFAULT_ALLOW_MIXED,
        }
    }
}

/// Builder for `CalculationConfig`.
#[derive(Default)]
pub struct CalculationConfigBuilder {
    config: CalculationConfig,
}

impl CalculationConfigBuilder {
    pub fn default_base_height_cm(mut self, height_cm: f64) -> Self {
        self.config.default_base_height_cm = height_cm;
        self
    }

    pub fn default_allow_mixed(mut self, allow: bool) -> Self {
        self.config.default_allow_mixed = allow;
        self
    }

    pub fn build(self) -> CalculationConfig {
        self.config
    }
}

/// Calculates pallets and volumes with the default configuration.
pub fn calculate_palletization(
    input: &CalculationInput,
) -> Result<CalculationResult, ValidationError> {
    calculate_palletization_with_config(input, &CalculationConfig::default())
}

/// Calculates pallets and volumes for one shipment.
///
/// Fails fast: the first invalid input or unsatisfiable constraint aborts the
/// whole calculation.
///
/// # Parameters
/// * `input` - Raw shipment data
/// * `config` - Defaults for values the input may omit
pub fn calculate_palletization_with_config(
    input: &CalculationInput,
    config: &CalculationConfig,
) -> Result<CalculationResult, ValidationError> {
    let products = load_products(&input.products)?;
    let pallet = load_pallet(&input.pallet, config.default_base_height_cm)?;
    let container = resolve_container_height(&input.container_height)?;
    let goods_limit_cm = pallet.goods_height_limit(container.interior_height_cm)?;

    debug!(
        products = products.len(),
        container = container.code,
        goods_limit_cm,
        mixed = input.allow_mixed_remainders,
        "starting calculation"
    );

    let mut product_plans: Vec<ProductPlan> = Vec::with_capacity(products.len());
    let mut remainder_pool: Vec<Layer> = Vec::new();
    let mut pallets: Vec<PalletDetail> = Vec::new();
    let mut total_cartons: u64 = 0;
    let mut volume_without_pallets_cbm = 0.0;

    for product in &products {
        let orientation = best_orientation(product, &pallet)?;
        let plan = plan_product(product, orientation, goods_limit_cm)?;

        let cartons_required = product.cartons_required();
        total_cartons = total_cartons
            .checked_add(cartons_required)
            .ok_or(ValidationError::CartonCountOverflow)?;
        volume_without_pallets_cbm += cartons_required as f64 * product.carton_volume_cbm();

        pallets.extend(full_pallet_detail(&plan, pallet.base_height_cm));
        if input.allow_mixed_remainders {
            remainder_pool.extend(remainder_layers(&plan));
        } else {
            pallets.extend(dedicated_remainder_pallet(&plan, pallet.base_height_cm));
        }
        product_plans.push(plan);
    }

    if input.allow_mixed_remainders && !remainder_pool.is_empty() {
        let groups = pack_layers_with_progress(remainder_pool, goods_limit_cm, |evt| match evt {
            PackEvent::PalletOpened { pallet } => debug!(pallet, "mixed pallet opened"),
            PackEvent::LayerPlaced {
                pallet,
                product,
                cartons,
                stack_height_cm,
            } => debug!(pallet, %product, cartons, stack_height_cm, "layer placed"),
            PackEvent::Finished { pallets, layers } => {
                debug!(pallets, layers, "remainder packing finished")
            }
        })?;
        pallets.extend(mixed_pallet_details(&groups, pallet.base_height_cm));
    }

    let total_pallets = pallets.iter().map(|detail| detail.count).sum();
    let footprint_sqm = pallet.footprint_sqm();
    let volume_with_pallets_cbm = pallets
        .iter()
        .map(|detail| detail.volume_cbm(footprint_sqm))
        .sum();

    let result = CalculationResult {
        product_plans,
        pallets,
        total_cartons,
        total_pallets,
        volume_without_pallets_cbm,
        volume_with_pallets_cbm,
    };

    info!(
        products = result.product_plans.len(),
        total_cartons = result.total_cartons,
        total_pallets = result.total_pallets,
        mixed_pallets = result.mixed_pallet_count(),
        volume_with_pallets_cbm = result.volume_with_pallets_cbm,
        "calculation finished"
    );
    Ok(result)
}
