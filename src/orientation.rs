//! Carton orientation selection on the pallet deck.
//!
//! Only the two axis-swapped footprints of a carton are considered; cartons
//! are never tipped onto their side.

use std::cmp::Ordering;

use crate::model::{OrientationPlan, PalletSpec, ProductSpec, ValidationError};
use crate::types::{Footprint, MAX_CARTONS_PER_LAYER};

/// Grid layout of `carton` on `deck`, or `None` if not a single carton fits.
fn layout(carton: Footprint, deck: &Footprint) -> Option<OrientationPlan> {
    let (along_length, along_width) = carton.grid_within(deck);
    let per_layer = along_length.saturating_mul(along_width);
    if per_layer == 0 {
        return None;
    }
    Some(OrientationPlan {
        cartons_per_layer: per_layer,
        cartons_along_length: along_length,
        cartons_along_width: along_width,
        carton_length_cm: carton.length_cm,
        carton_width_cm: carton.width_cm,
    })
}

/// Orders candidates best first: most cartons per layer, then most along the
/// pallet length, then most along the pallet width.
fn rank(a: &OrientationPlan, b: &OrientationPlan) -> Ordering {
    b.cartons_per_layer
        .cmp(&a.cartons_per_layer)
        .then_with(|| b.cartons_along_length.cmp(&a.cartons_along_length))
        .then_with(|| b.cartons_along_width.cmp(&a.cartons_along_width))
}

/// Picks the footprint orientation that fits the most cartons per layer.
///
/// The carton as given is the first candidate and its 90° rotation the
/// second; on a complete tie the first candidate wins.
///
/// # Parameters
/// * `product` - Product whose carton is laid out
/// * `pallet` - Pallet whose deck receives the layer
///
/// # Returns
/// The chosen plan, `ValidationError::NoFittingOrientation` if the carton
/// does not fit the deck in either orientation, or
/// `ValidationError::TooManyCartonsPerLayer` if the best layer exceeds
/// `MAX_CARTONS_PER_LAYER`.
pub fn best_orientation(
    product: &ProductSpec,
    pallet: &PalletSpec,
) -> Result<OrientationPlan, ValidationError> {
    let deck = pallet.footprint();
    let carton = product.carton_footprint();

    let mut options: Vec<OrientationPlan> = [carton, carton.rotated()]
        .into_iter()
        .filter_map(|candidate| layout(candidate, &deck))
        .collect();

    // Stable sort keeps the unrotated carton first on a full tie.
    options.sort_by(rank);

    let best = options
        .into_iter()
        .next()
        .ok_or_else(|| ValidationError::NoFittingOrientation(product.name.clone()))?;

    if best.cartons_per_layer > MAX_CARTONS_PER_LAYER {
        return Err(ValidationError::TooManyCartonsPerLayer {
            product: product.name.clone(),
            cartons_per_layer: best.cartons_per_layer,
            limit: MAX_CARTONS_PER_LAYER,
        });
    }
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pallet(length: f64, width: f64) -> PalletSpec {
        PalletSpec::new(length, width, 195.0, 15.0).unwrap()
    }

    fn product(length: f64, width: f64) -> ProductSpec {
        ProductSpec::new("P", 100, 10, (length, width, 20.0)).unwrap()
    }

    #[test]
    fn keeps_given_orientation_when_it_fits_more() {
        let plan = best_orientation(&product(56.0, 26.0), &pallet(120.0, 105.0)).unwrap();
        assert_eq!(plan.cartons_per_layer, 8);
        assert_eq!(plan.cartons_along_length, 2);
        assert_eq!(plan.cartons_along_width, 4);
        assert_eq!(plan.carton_length_cm, 56.0);
        assert_eq!(plan.carton_width_cm, 26.0);
    }

    #[test]
    fn rotates_when_rotation_fits_more() {
        // 26 × 56: 4 × 1 = 4; rotated 56 × 26: 2 × 4 = 8
        let plan = best_orientation(&product(26.0, 56.0), &pallet(120.0, 105.0)).unwrap();
        assert_eq!(plan.cartons_per_layer, 8);
        assert_eq!(plan.carton_length_cm, 56.0);
        assert_eq!(plan.carton_width_cm, 26.0);
    }

    #[test]
    fn tie_prefers_more_cartons_along_length() {
        // 97 × 26: 1 × 4 = 4; rotated 26 × 97: 4 × 1 = 4
        let plan = best_orientation(&product(97.0, 26.0), &pallet(120.0, 105.0)).unwrap();
        assert_eq!(plan.cartons_per_layer, 4);
        assert_eq!(plan.cartons_along_length, 4);
        assert_eq!(plan.cartons_along_width, 1);
        assert_eq!(plan.carton_length_cm, 26.0);
        assert_eq!(plan.carton_width_cm, 97.0);
    }

    #[test]
    fn full_tie_keeps_unrotated_carton() {
        let plan = best_orientation(&product(40.0, 40.0), &pallet(120.0, 80.0)).unwrap();
        assert_eq!(plan.cartons_per_layer, 6);
        assert_eq!(plan.carton_length_cm, 40.0);
        assert_eq!(plan.carton_width_cm, 40.0);
    }

    #[test]
    fn only_rotated_orientation_fits() {
        // 130 × 50 does not fit 100 × 140 as given, but 50 × 130 does.
        let plan = best_orientation(&product(130.0, 50.0), &pallet(100.0, 140.0)).unwrap();
        assert_eq!(plan.cartons_per_layer, 2);
        assert_eq!(plan.carton_length_cm, 50.0);
        assert_eq!(plan.carton_width_cm, 130.0);
    }

    #[test]
    fn fails_when_neither_orientation_fits() {
        let err = best_orientation(&product(130.0, 125.0), &pallet(120.0, 105.0)).unwrap_err();
        assert_eq!(err, ValidationError::NoFittingOrientation("P".to_string()));
    }

    #[test]
    fn rejects_layers_beyond_supported_carton_count() {
        // 1e-5 cm cartons: 1.2e7 × 1.05e7 per layer
        let err = best_orientation(&product(1e-5, 1e-5), &pallet(120.0, 105.0)).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::TooManyCartonsPerLayer { limit: MAX_CARTONS_PER_LAYER, .. }
        ));

        // grid counts this large would overflow when multiplied
        let err = best_orientation(&product(1e-10, 1e-10), &pallet(120.0, 105.0)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooManyCartonsPerLayer {
                product: "P".to_string(),
                cartons_per_layer: u64::MAX,
                limit: MAX_CARTONS_PER_LAYER,
            }
        );
    }

    #[test]
    fn accepts_layer_at_supported_carton_count() {
        // roughly a million cartons per layer
        let plan = best_orientation(&product(0.12, 0.105), &pallet(120.0, 105.0)).unwrap();
        assert!(plan.cartons_per_layer <= MAX_CARTONS_PER_LAYER);
    }

    #[test]
    fn selection_always_has_the_larger_layer() {
        let deck = pallet(120.0, 100.0);
        for length in [15.0, 22.0, 31.0, 47.5, 60.0, 99.0] {
            for width in [12.0, 25.0, 33.0, 50.0, 80.0] {
                let plan = best_orientation(&product(length, width), &deck).unwrap();
                let given = layout(Footprint::new(length, width), &deck.footprint())
                    .map_or(0, |p| p.cartons_per_layer);
                let rotated = layout(Footprint::new(width, length), &deck.footprint())
                    .map_or(0, |p| p.cartons_per_layer);
                assert_eq!(plan.cartons_per_layer, given.max(rotated));
            }
        }
    }
}
