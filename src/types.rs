//! Common constants and small value types shared across the calculation.
//!
//! Everything in here is read-only: the container table is a process-wide
//! constant and `Footprint` is a plain copyable value.

/// Cubic feet per cubic metre.
pub const CUFT_PER_CBM: f64 = 35.3146667;

/// Cubic centimetres per cubic metre.
pub const CM3_PER_CBM: f64 = 1_000_000.0;

/// Centimetres per metre.
pub const CM_PER_M: f64 = 100.0;

/// Pallet base (deck) height used when the input does not specify one.
pub const DEFAULT_BASE_HEIGHT_CM: f64 = 15.0;

/// Largest supported number of cartons in one layer.
pub const MAX_CARTONS_PER_LAYER: u64 = 1_000_000;

/// Largest supported number of layers stacked on one pallet.
pub const MAX_LAYERS_PER_PALLET: u64 = 10_000;

/// A shipping container type with its interior clear height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContainerType {
    pub code: &'static str,
    pub label: &'static str,
    pub interior_height_cm: f64,
}

/// Supported container types, sorted by code.
pub const CONTAINER_TYPES: [ContainerType; 3] = [
    ContainerType {
        code: "20CY",
        label: "20' (Standard)",
        interior_height_cm: 239.0,
    },
    ContainerType {
        code: "40CY",
        label: "40' (Standard)",
        interior_height_cm: 239.0,
    },
    ContainerType {
        code: "40HQ",
        label: "40' High Cube",
        interior_height_cm: 269.0,
    },
];

/// Looks up a container type by code, ignoring case and surrounding whitespace.
pub fn find_container(code: &str) -> Option<&'static ContainerType> {
    let wanted = code.trim();
    CONTAINER_TYPES
        .iter()
        .find(|container| container.code.eq_ignore_ascii_case(wanted))
}

/// Comma separated list of the supported container codes.
pub fn valid_container_codes() -> String {
    CONTAINER_TYPES
        .iter()
        .map(|container| container.code)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Converts cubic metres to cubic feet.
#[inline]
pub fn cbm_to_cuft(cbm: f64) -> f64 {
    cbm * CUFT_PER_CBM
}

/// A rectangular 2D footprint (length × width) in centimetres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Footprint {
    pub length_cm: f64,
    pub width_cm: f64,
}

impl Footprint {
    #[inline]
    pub const fn new(length_cm: f64, width_cm: f64) -> Self {
        Self {
            length_cm,
            width_cm,
        }
    }

    /// The same footprint turned by 90° (length and width swapped).
    #[inline]
    pub const fn rotated(&self) -> Self {
        Self::new(self.width_cm, self.length_cm)
    }

    /// Area in square metres.
    #[inline]
    pub fn area_sqm(&self) -> f64 {
        (self.length_cm / CM_PER_M) * (self.width_cm / CM_PER_M)
    }

    /// How many copies of `self` fit along each axis of `outer` without turning.
    ///
    /// # Returns
    /// `(count_along_length, count_along_width)`; counts saturate at `u64::MAX`.
    #[inline]
    pub fn grid_within(&self, outer: &Footprint) -> (u64, u64) {
        let along_length = (outer.length_cm / self.length_cm).floor() as u64;
        let along_width = (outer.width_cm / self.width_cm).floor() as u64;
        (along_length, along_width)
    }
}
