use std::cmp::Ordering;

use crate::models::{MealItem, NutrientVector};
use crate::planner::envelope::Targets;

/// Candidate item with its ranking keys for one slot.
#[derive(Debug)]
struct Candidate {
    index: usize,
    penalty: f64,
    coverage: f64,
}

/// Order `candidates` (indices into `items`) for the next slot.
///
/// Ranking:
/// 1. Lower marginal penalty (cost, or missing rating)
/// 2. Higher micronutrient coverage of still-deficient minimums
/// 3. Item id, lexicographically
pub fn rank_candidates(
    candidates: impl IntoIterator<Item = usize>,
    items: &[&MealItem],
    penalties: &[f64],
    targets: &Targets,
    totals: &NutrientVector,
) -> Vec<usize> {
    let mut ranked: Vec<Candidate> = candidates
        .into_iter()
        .map(|index| Candidate {
            index,
            penalty: penalties[index],
            coverage: targets.coverage(totals, items[index]),
        })
        .collect();

    ranked.sort_by(|a, b| compare(a, b, items));
    ranked.into_iter().map(|c| c.index).collect()
}

fn compare(a: &Candidate, b: &Candidate, items: &[&MealItem]) -> Ordering {
    a.penalty
        .total_cmp(&b.penalty)
        .then_with(|| b.coverage.total_cmp(&a.coverage))
        .then_with(|| items[a.index].id.cmp(&items[b.index].id))
}

/// Pick the item that leaves the projected totals least in violation,
/// assuming the rest of the scope repeats it. Used to build the closest plan
/// when no satisfying plan exists.
pub fn least_violating(
    candidates: impl IntoIterator<Item = usize>,
    items: &[&MealItem],
    penalties: &[f64],
    targets: &Targets,
    totals: &NutrientVector,
    remaining: usize,
) -> Option<usize> {
    let fill = (remaining + 1) as f64;
    candidates
        .into_iter()
        .map(|index| {
            let projected = totals.plus(&items[index].nutrients().scaled(fill));
            (index, targets.violation_score(&projected))
        })
        .min_by(|(a, va), (b, vb)| {
            va.total_cmp(vb)
                .then_with(|| penalties[*a].total_cmp(&penalties[*b]))
                .then_with(|| items[*a].id.cmp(&items[*b].id))
        })
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Bound, Nutrient, NutrientBounds};
    use crate::planner::options::PlannerConfig;

    fn targets() -> Targets {
        let bounds = NutrientBounds::new()
            .with(Nutrient::VitaminC, Bound::at_least(60.0))
            .with(Nutrient::Calories, Bound::at_most(1000.0));
        Targets::new(&bounds, &PlannerConfig::default().with_days(1))
    }

    #[test]
    fn test_rank_by_penalty_then_coverage_then_id() {
        let a = MealItem::new("b-rice", "Rice", 2.0, 400.0);
        let b = MealItem::new("a-stew", "Stew", 2.0, 400.0);
        let c = MealItem::new("c-salad", "Salad", 2.0, 200.0).with(Nutrient::VitaminC, 30.0);
        let d = MealItem::new("d-bread", "Bread", 1.0, 300.0);
        let items = [&a, &b, &c, &d];
        let penalties: Vec<f64> = items.iter().map(|i| i.cost).collect();

        let order = rank_candidates(0..4, &items, &penalties, &targets(), &NutrientVector::zero());
        // cheapest first, then the vitamin C source, then ids "a-stew" < "b-rice"
        assert_eq!(order, vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_least_violating_prefers_smaller_excess() {
        let big = MealItem::new("1", "Big", 5.0, 2000.0);
        let small = MealItem::new("2", "Small", 3.0, 1500.0);
        let items = [&big, &small];
        let penalties = [5.0, 3.0];
        let pick = least_violating(0..2, &items, &penalties, &targets(), &NutrientVector::zero(), 0);
        assert_eq!(pick, Some(1));
    }
}
