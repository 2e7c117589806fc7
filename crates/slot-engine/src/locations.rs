//! Collect the distinct locations adjacent to candidate slots.

use std::collections::BTreeSet;

use crate::model::TimeSlot;

/// Every non-empty `comes_after` / `comes_before` location, deduplicated and
/// in sorted order.
pub fn gather_locations<'a, I>(slots: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a TimeSlot>,
{
    slots
        .into_iter()
        .flat_map(|slot| [slot.comes_after.as_ref(), slot.comes_before.as_ref()])
        .flatten()
        .filter(|neighbor| !neighbor.location.is_empty())
        .map(|neighbor| neighbor.location.clone())
        .collect()
}
