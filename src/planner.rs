//! Per-product pallet planning.
//!
//! Derives how many layers and cartons fit on one pallet, how many full
//! pallets a product fills and what is left over. Leftover cartons either
//! get a dedicated pallet or are cut into `Layer` fragments for the
//! remainder packer.

use tracing::debug;

use crate::model::{Layer, OrientationPlan, PalletDetail, ProductPlan, ProductSpec, ValidationError};
use crate::types::MAX_LAYERS_PER_PALLET;

/// Builds the stacking plan of one product.
///
/// # Parameters
/// * `product` - The product to plan
/// * `orientation` - Chosen deck layout for its cartons
/// * `goods_height_limit_cm` - Maximum stack height above the pallet base
///
/// # Returns
/// The plan, or an error if the carton cannot be stacked even once or the
/// stack would exceed `MAX_LAYERS_PER_PALLET`.
pub fn plan_product(
    product: &ProductSpec,
    orientation: OrientationPlan,
    goods_height_limit_cm: f64,
) -> Result<ProductPlan, ValidationError> {
    let layers = (goods_height_limit_cm / product.carton_height_cm).floor();
    if layers < 1.0 {
        return Err(ValidationError::ExceedsStackingHeight(product.name.clone()));
    }
    if layers > MAX_LAYERS_PER_PALLET as f64 {
        return Err(ValidationError::TooManyLayers {
            product: product.name.clone(),
            layers: layers as u64,
            limit: MAX_LAYERS_PER_PALLET,
        });
    }
    let layers_per_pallet = layers as u64;

    let cartons_per_pallet = orientation
        .cartons_per_layer
        .checked_mul(layers_per_pallet)
        .filter(|&cartons| cartons > 0)
        .ok_or_else(|| ValidationError::NoPalletCapacity(product.name.clone()))?;

    let cartons_required = product.cartons_required();
    let plan = ProductPlan {
        product: product.clone(),
        orientation,
        layers_per_pallet,
        cartons_per_pallet,
        full_pallets: cartons_required / cartons_per_pallet,
        remainder_cartons: cartons_required % cartons_per_pallet,
    };

    debug!(
        product = %product.name,
        cartons_required,
        cartons_per_layer = orientation.cartons_per_layer,
        layers_per_pallet,
        full_pallets = plan.full_pallets,
        remainder_cartons = plan.remainder_cartons,
        "product planned"
    );
    Ok(plan)
}

/// The group of completely filled pallets of a product, if it fills any.
pub fn full_pallet_detail(plan: &ProductPlan, base_height_cm: f64) -> Option<PalletDetail> {
    if plan.full_pallets == 0 {
        return None;
    }
    Some(PalletDetail::single_product(
        format!("{} full pallet", plan.product.name),
        plan.full_pallets,
        &plan.product.name,
        plan.cartons_per_pallet,
        plan.goods_height_cm(),
        base_height_cm,
    ))
}

/// One pallet holding only this product's leftover cartons.
///
/// The goods height is the smallest whole number of layers that holds the
/// remainder.
pub fn dedicated_remainder_pallet(plan: &ProductPlan, base_height_cm: f64) -> Option<PalletDetail> {
    if plan.remainder_cartons == 0 {
        return None;
    }
    let layers = plan
        .remainder_cartons
        .div_ceil(plan.orientation.cartons_per_layer);
    Some(PalletDetail::single_product(
        format!("{} remainder pallet", plan.product.name),
        1,
        &plan.product.name,
        plan.remainder_cartons,
        layers as f64 * plan.product.carton_height_cm,
        base_height_cm,
    ))
}

/// Cuts the leftover cartons into layer fragments.
///
/// Complete layers come first, followed by at most one partial layer.
pub fn remainder_layers(plan: &ProductPlan) -> Vec<Layer> {
    let per_layer = plan.orientation.cartons_per_layer;
    let full_layers = plan.remainder_cartons / per_layer;
    let partial = plan.remainder_cartons % per_layer;

    let layer = |cartons: u64| Layer {
        product_name: plan.product.name.clone(),
        cartons,
        layer_height_cm: plan.product.carton_height_cm,
    };

    let mut layers: Vec<Layer> = (0..full_layers).map(|_| layer(per_layer)).collect();
    if partial > 0 {
        layers.push(layer(partial));
    }
    layers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PalletSpec;
    use crate::orientation::best_orientation;

    fn plan_for(name: &str, qty: u64, dims: (f64, f64, f64)) -> ProductPlan {
        let pallet = PalletSpec::new(120.0, 105.0, 195.0, 15.0).unwrap();
        let product = ProductSpec::new(name, qty, 10, dims).unwrap();
        let orientation = best_orientation(&product, &pallet).unwrap();
        plan_product(&product, orientation, 180.0).unwrap()
    }

    #[test]
    fn plans_full_pallets_and_remainder() {
        let plan = plan_for("999-00031", 800, (56.0, 26.0, 20.0));
        assert_eq!(plan.layers_per_pallet, 9);
        assert_eq!(plan.cartons_per_pallet, 72);
        assert_eq!(plan.full_pallets, 1);
        assert_eq!(plan.remainder_cartons, 8);
        assert_eq!(plan.goods_height_cm(), 180.0);

        let plan = plan_for("999-00166", 580, (97.0, 26.0, 20.0));
        assert_eq!(plan.cartons_per_pallet, 36);
        assert_eq!(plan.full_pallets, 1);
        assert_eq!(plan.remainder_cartons, 22);
    }

    #[test]
    fn pallets_and_remainder_account_for_every_carton() {
        for qty in [1, 9, 10, 719, 720, 721, 5000, 12345] {
            let plan = plan_for("P", qty, (56.0, 26.0, 20.0));
            assert_eq!(
                plan.full_pallets * plan.cartons_per_pallet + plan.remainder_cartons,
                plan.product.cartons_required()
            );
            assert!(plan.remainder_cartons < plan.cartons_per_pallet);
        }
    }

    #[test]
    fn rejects_carton_taller_than_limit() {
        let pallet = PalletSpec::new(120.0, 105.0, 195.0, 15.0).unwrap();
        let product = ProductSpec::new("Tall", 10, 1, (50.0, 50.0, 181.0)).unwrap();
        let orientation = best_orientation(&product, &pallet).unwrap();
        assert_eq!(
            plan_product(&product, orientation, 180.0),
            Err(ValidationError::ExceedsStackingHeight("Tall".to_string()))
        );
    }

    #[test]
    fn rejects_stacks_beyond_supported_layer_count() {
        let pallet = PalletSpec::new(120.0, 105.0, 195.0, 15.0).unwrap();
        let product = ProductSpec::new("Sheet", 1_000_000, 1, (120.0, 105.0, 1e-9)).unwrap();
        let orientation = best_orientation(&product, &pallet).unwrap();
        assert_eq!(orientation.cartons_per_layer, 1);

        let err = plan_product(&product, orientation, 180.0).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::TooManyLayers { ref product, limit: MAX_LAYERS_PER_PALLET, .. }
                if product == "Sheet"
        ));
    }

    #[test]
    fn thin_cartons_within_layer_limit_stay_bounded() {
        let pallet = PalletSpec::new(120.0, 105.0, 195.0, 15.0).unwrap();
        let product = ProductSpec::new("Film", 25_000, 1, (120.0, 105.0, 0.02)).unwrap();
        let orientation = best_orientation(&product, &pallet).unwrap();
        let plan = plan_product(&product, orientation, 180.0).unwrap();
        assert!(plan.layers_per_pallet <= MAX_LAYERS_PER_PALLET);

        let layers = remainder_layers(&plan);
        assert_eq!(layers.len() as u64, plan.remainder_cartons);
        assert!((layers.len() as u64) < MAX_LAYERS_PER_PALLET);
    }

    #[test]
    fn capacity_overflow_is_an_error() {
        let product = ProductSpec::new("Dust", 10, 1, (1.0, 1.0, 1.0)).unwrap();
        let orientation = OrientationPlan {
            cartons_per_layer: u64::MAX,
            cartons_along_length: u64::MAX,
            cartons_along_width: 1,
            carton_length_cm: 1.0,
            carton_width_cm: 1.0,
        };
        assert_eq!(
            plan_product(&product, orientation, 180.0),
            Err(ValidationError::NoPalletCapacity("Dust".to_string()))
        );
    }

    #[test]
    fn full_pallet_detail_only_when_filled() {
        let plan = plan_for("A", 800, (56.0, 26.0, 20.0));
        let detail = full_pallet_detail(&plan, 15.0).unwrap();
        assert_eq!(detail.label, "A full pallet");
        assert_eq!(detail.count, 1);
        assert_eq!(detail.cartons_by_product["A"], 72);
        assert_eq!(detail.goods_height_cm, 180.0);
        assert_eq!(detail.total_height_cm, 195.0);

        let small = plan_for("B", 50, (56.0, 26.0, 20.0));
        assert!(full_pallet_detail(&small, 15.0).is_none());
    }

    #[test]
    fn dedicated_remainder_rounds_up_to_whole_layers() {
        let plan = plan_for("999-00166", 580, (97.0, 26.0, 20.0));
        let detail = dedicated_remainder_pallet(&plan, 15.0).unwrap();
        assert_eq!(detail.label, "999-00166 remainder pallet");
        assert_eq!(detail.count, 1);
        assert_eq!(detail.cartons_by_product["999-00166"], 22);
        // 22 cartons at 4 per layer need 6 layers
        assert_eq!(detail.goods_height_cm, 120.0);
        assert_eq!(detail.total_height_cm, 135.0);

        let exact = plan_for("C", 720, (56.0, 26.0, 20.0));
        assert_eq!(exact.remainder_cartons, 0);
        assert!(dedicated_remainder_pallet(&exact, 15.0).is_none());
    }

    #[test]
    fn remainder_layers_split_full_and_partial() {
        let plan = plan_for("999-00166", 580, (97.0, 26.0, 20.0));
        let layers = remainder_layers(&plan);
        assert_eq!(layers.len(), 6);
        assert!(layers[..5].iter().all(|layer| layer.cartons == 4));
        assert_eq!(layers[5].cartons, 2);
        assert!(layers.iter().all(|layer| layer.layer_height_cm == 20.0));
        assert_eq!(layers.iter().map(|l| l.cartons).sum::<u64>(), 22);

        let plan = plan_for("999-00031", 800, (56.0, 26.0, 20.0));
        let layers = remainder_layers(&plan);
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].cartons, 8);
    }

    #[test]
    fn no_layers_without_remainder() {
        let plan = plan_for("C", 720, (56.0, 26.0, 20.0));
        assert!(remainder_layers(&plan).is_empty());
    }
}
