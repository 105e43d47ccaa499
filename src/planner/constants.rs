/// Days in a default planning period.
pub const DEFAULT_DAYS: usize = 7;

/// Meals planned per day unless configured otherwise.
pub const DEFAULT_MEALS_PER_DAY: usize = 1;

/// Longest planning period accepted (one leap year).
pub const MAX_DAYS: usize = 366;

/// Most meals accepted for a single day.
pub const MAX_MEALS_PER_DAY: usize = 10;

/// Candidate placements the search may try before giving up.
pub const DEFAULT_MAX_STEPS: usize = 10_000;

/// Absolute tolerance for nutrient and cost comparisons.
pub const TOLERANCE: f64 = 1e-6;

/// Upper limit on assignments the exhaustive solver will enumerate.
pub const MAX_EXHAUSTIVE_ASSIGNMENTS: u64 = 2_000_000;

/// Scale floor when normalizing bound violations, so tiny bounds
/// (e.g. 2 mg iron) do not dominate the closest-plan measure.
pub const VIOLATION_SCALE_FLOOR: f64 = 1.0;
