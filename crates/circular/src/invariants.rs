//! Debug assertion macros for the cursor invariants.
//!
//! Only active in debug builds; release builds compile them out.

// =============================================================================
// Cursor Order: read ≤ published ≤ write
// =============================================================================

/// Assert that a claimed read ticket lies below the published cursor.
///
/// Used in: `claim()` after a successful CAS on `read`
macro_rules! debug_assert_claim_published {
    ($ticket:expr, $published:expr) => {
        debug_assert!(
            $ticket < $published,
            "cursor order violated: claimed read ticket {} not below published {}",
            $ticket,
            $published
        )
    };
}

/// Assert that the published cursor never runs ahead of the write cursor.
///
/// Used in: `publish()` before advancing `published`
macro_rules! debug_assert_published_bounded {
    ($published:expr, $write:expr) => {
        debug_assert!(
            $published <= $write,
            "cursor order violated: published {} ahead of write {}",
            $published,
            $write
        )
    };
}

// =============================================================================
// Monotonic Progress
// =============================================================================

/// Assert that a cursor advanced by exactly one.
///
/// Used in: `publish()` and `claim()`
macro_rules! debug_assert_step {
    ($name:literal, $old:expr, $new:expr) => {
        debug_assert!(
            $new == $old.wrapping_add(1),
            "{} did not advance by one: {} -> {}",
            $name,
            $old,
            $new
        )
    };
}

// =============================================================================
// Slot Bounds
// =============================================================================

/// Assert that a masked ticket indexes inside the slot array.
macro_rules! debug_assert_slot_in_bounds {
    ($idx:expr, $capacity:expr) => {
        debug_assert!(
            $idx < $capacity,
            "slot index {} out of bounds for capacity {}",
            $idx,
            $capacity
        )
    };
}

pub(crate) use debug_assert_claim_published;
pub(crate) use debug_assert_published_bounded;
pub(crate) use debug_assert_slot_in_bounds;
pub(crate) use debug_assert_step;
