use std::iter::repeat;
use std::path::{Path, PathBuf};

pub fn find_first_subpath<P: AsRef<Path>, F: Fn(&Path) -> bool>(
    root: impl AsRef<Path>,
    subpaths: &[P],
    search: F,
) -> Option<PathBuf> {
    subpaths
        .iter()
        .zip(repeat(root.as_ref()))
        .map(|(b, a)| a.join(b))
        .find(|it: &PathBuf| search(it))
}

/// Largest charge the payment provider accepts, in minor units.
pub const MAX_MINOR_UNITS: i64 = 99_999_999;

/// Converts a dollar price into minor currency units. Prices that round to
/// nothing or exceed [`MAX_MINOR_UNITS`] have no valid amount.
pub fn price_to_minor_units(price: f64) -> Option<i64> {
    if !price.is_finite() || price <= 0.0 {
        return None;
    }

    let amount = (price * 100.0).round();
    if amount < 1.0 || amount > MAX_MINOR_UNITS as f64 {
        return None;
    }
    Some(amount as i64)
}
