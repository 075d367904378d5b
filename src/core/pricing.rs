//! Pickup pricing rules.
//!
//! Rates and minimums depend only on whether the waste was sorted. They are part
//! of the public contract with customers, so they are constants rather than
//! configuration.

use crate::errors::{Error, Result};
use serde::Serialize;

/// Price paid per kilogram of sorted waste.
pub const SORTED_RATE_PER_KG: f64 = 2.0;
/// Price paid per kilogram of unsorted waste.
pub const UNSORTED_RATE_PER_KG: f64 = 1.0;
/// Smallest sorted pickup accepted, in kilograms.
pub const SORTED_MINIMUM_KG: f64 = 50.0;
/// Smallest unsorted pickup accepted, in kilograms.
pub const UNSORTED_MINIMUM_KG: f64 = 100.0;

/// Rate for the given category.
#[must_use]
pub const fn rate_per_kg(is_sorted: bool) -> f64 {
    if is_sorted {
        SORTED_RATE_PER_KG
    } else {
        UNSORTED_RATE_PER_KG
    }
}

/// Minimum accepted quantity for the given category.
#[must_use]
pub const fn minimum_quantity_kg(is_sorted: bool) -> f64 {
    if is_sorted {
        SORTED_MINIMUM_KG
    } else {
        UNSORTED_MINIMUM_KG
    }
}

/// `"sorted"` or `"unsorted"`.
#[must_use]
pub const fn category_label(is_sorted: bool) -> &'static str {
    if is_sorted { "sorted" } else { "unsorted" }
}

/// Payment breakdown returned to the customer when a pickup is created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentQuote {
    /// Waste category as entered
    pub waste_type: String,
    /// Whether the sorted rate applies
    pub is_sorted: bool,
    /// Declared quantity in kilograms
    pub quantity_kg: f64,
    /// Rate applied
    pub rate_per_kg: f64,
    /// Rate formatted for display, e.g. `"2tk/kg"`
    pub rate_label: String,
    /// `quantity_kg * rate_per_kg`
    pub total_amount: f64,
}

/// Validates a requested pickup and prices it.
///
/// Rejects an empty waste type, a non-finite or non-positive quantity, and any
/// quantity below the category minimum. The minimum message names the threshold
/// in kilograms.
pub fn quote(waste_type: &str, is_sorted: bool, quantity_kg: f64) -> Result<PaymentQuote> {
    let waste_type = waste_type.trim();
    if waste_type.is_empty() {
        return Err(Error::validation("Missing required fields: waste type"));
    }

    if !quantity_kg.is_finite() || quantity_kg <= 0.0 {
        return Err(Error::validation(format!(
            "Invalid quantity: {quantity_kg}"
        )));
    }

    let minimum = minimum_quantity_kg(is_sorted);
    if quantity_kg < minimum {
        return Err(Error::validation(format!(
            "Minimum {minimum}kg required for {} waste",
            category_label(is_sorted)
        )));
    }

    let rate = rate_per_kg(is_sorted);
    Ok(PaymentQuote {
        waste_type: waste_type.to_string(),
        is_sorted,
        quantity_kg,
        rate_per_kg: rate,
        rate_label: format!("{rate}tk/kg"),
        total_amount: quantity_kg * rate,
    })
}
