//! Spatial query helpers
//!
//! Stateless functions over farm positions. Radius queries are a linear
//! scan; kernel rebuilds are already quadratic in the farm count so an
//! index buys nothing at the scales simulated here.

use crate::models::farm::{Farm, FarmId};

/// Euclidean distance between two farms
pub fn distance(a: &Farm, b: &Farm) -> f64 {
    (a.x() - b.x()).hypot(a.y() - b.y())
}

/// Ids of all `farms` within `radius` of `center` (inclusive, center included)
pub fn farms_within<'a, I>(farms: I, center: &Farm, radius: f64) -> Vec<FarmId>
where
    I: IntoIterator<Item = &'a Farm>,
{
    farms
        .into_iter()
        .filter(|farm| farm.id() == center.id() || distance(center, farm) <= radius)
        .map(Farm::id)
        .collect()
}
