//! Consolidation of leftover layers onto mixed pallets.
//!
//! Implements a height-descending next-fit heuristic:
//! - fragments are sorted by layer height, tallest first (stable for ties)
//! - exactly one pallet is open at a time
//! - a fragment that does not fit the open pallet closes it and opens a new one
//!
//! Closed pallets are never revisited. This can use more pallets than an
//! optimal bin packing would; the pallet counts it produces are part of the
//! calculator's contract.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::model::{Layer, PalletDetail, ValidationError};

/// Events emitted while packing, e.g. for tracing or live display.
#[derive(Clone, Debug, PartialEq)]
pub enum PackEvent {
    /// A new mixed pallet was opened.
    PalletOpened { pallet: usize },
    /// A fragment was put on the open pallet.
    LayerPlaced {
        pallet: usize,
        product: String,
        cartons: u64,
        stack_height_cm: f64,
    },
    /// Packing finished.
    Finished { pallets: usize, layers: usize },
}

/// Packs layer fragments onto pallets without exceeding the height limit.
///
/// # Parameters
/// * `layers` - Pooled fragments of all products, in product order
/// * `goods_height_limit_cm` - Maximum goods height per pallet
///
/// # Returns
/// One list of fragments per pallet in packing order, or
/// `ValidationError::LayerTooTall` if a single fragment exceeds the limit.
pub fn pack_layers(
    layers: Vec<Layer>,
    goods_height_limit_cm: f64,
) -> Result<Vec<Vec<Layer>>, ValidationError> {
    pack_layers_with_progress(layers, goods_height_limit_cm, |_| {})
}

/// Like `pack_layers`, calling `on_event` for every packing step.
pub fn pack_layers_with_progress(
    layers: Vec<Layer>,
    goods_height_limit_cm: f64,
    mut on_event: impl FnMut(&PackEvent),
) -> Result<Vec<Vec<Layer>>, ValidationError> {
    let layer_count = layers.len();

    // Tallest first; sort_by is stable so equal heights keep product order.
    let mut ordered = layers;
    ordered.sort_by(|a, b| {
        b.layer_height_cm
            .partial_cmp(&a.layer_height_cm)
            .unwrap_or(Ordering::Equal)
    });

    let mut pallets: Vec<Vec<Layer>> = Vec::new();
    let mut current: Vec<Layer> = Vec::new();
    let mut current_height = 0.0;

    for layer in ordered {
        if layer.layer_height_cm > goods_height_limit_cm {
            return Err(ValidationError::LayerTooTall {
                product: layer.product_name,
                layer_height_cm: layer.layer_height_cm,
                limit_cm: goods_height_limit_cm,
            });
        }

        if current.is_empty() || current_height + layer.layer_height_cm > goods_height_limit_cm {
            if !current.is_empty() {
                pallets.push(std::mem::take(&mut current));
            }
            current_height = 0.0;
            on_event(&PackEvent::PalletOpened {
                pallet: pallets.len() + 1,
            });
        }

        current_height += layer.layer_height_cm;
        on_event(&PackEvent::LayerPlaced {
            pallet: pallets.len() + 1,
            product: layer.product_name.clone(),
            cartons: layer.cartons,
            stack_height_cm: current_height,
        });
        current.push(layer);
    }

    if !current.is_empty() {
        pallets.push(current);
    }

    on_event(&PackEvent::Finished {
        pallets: pallets.len(),
        layers: layer_count,
    });
    Ok(pallets)
}

/// Turns packed fragment groups into labelled mixed pallets.
///
/// Labels are numbered from 1 in packing order; cartons are summed per product.
pub fn mixed_pallet_details(groups: &[Vec<Layer>], base_height_cm: f64) -> Vec<PalletDetail> {
    groups
        .iter()
        .enumerate()
        .map(|(index, group)| {
            let mut cartons_by_product: BTreeMap<String, u64> = BTreeMap::new();
            let mut goods_height_cm = 0.0;
            for layer in group {
                *cartons_by_product
                    .entry(layer.product_name.clone())
                    .or_default() += layer.cartons;
                goods_height_cm += layer.layer_height_cm;
            }
            PalletDetail {
                label: format!("Mixed remainder pallet #{}", index + 1),
                count: 1,
                cartons_by_product,
                goods_height_cm,
                total_height_cm: goods_height_cm + base_height_cm,
            }
        })
        .collect()
}
