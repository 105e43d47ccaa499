use rand::Rng;

use crate::models::{Bound, MealItem, Nutrient, NutrientBounds, NutrientVector, MAX_RATING};
use crate::planner::{Aggregation, Objective, PlannerConfig, MAX_EXHAUSTIVE_ASSIGNMENTS};

/// Shape of the random instances to generate.
#[derive(Debug, Clone, Copy)]
pub struct InstanceShape {
    pub items: usize,
    pub days: usize,
}

/// Random meals with whole-dollar costs, so distinct plans rarely tie by
/// floating-point accident.
pub fn random_catalog(rng: &mut impl Rng, items: usize) -> Vec<MealItem> {
    (0..items)
        .map(|i| {
            let calories = rng.gen_range(20..=90) as f64 * 10.0;
            MealItem::new(
                format!("m{}", i + 1).as_str(),
                format!("Meal {}", i + 1),
                rng.gen_range(1..=12) as f64,
                calories,
            )
            .with(Nutrient::Protein, rng.gen_range(5..=60) as f64)
            .with(Nutrient::Sodium, rng.gen_range(5..=90) as f64 * 10.0)
            .with(Nutrient::Iron, rng.gen_range(0..=80) as f64 / 10.0)
            .with(Nutrient::VitaminC, rng.gen_range(0..=40) as f64)
            .with_rating(rng.gen_range(1..=MAX_RATING))
        })
        .collect()
}

/// Bounds centred on a random selection, loosened or tightened at random so
/// that some instances are infeasible.
pub fn random_bounds(
    rng: &mut impl Rng,
    catalog: &[MealItem],
    config: &PlannerConfig,
) -> NutrientBounds {
    let mut anchor = NutrientVector::zero();
    let picks = match config.aggregation {
        Aggregation::Daily => config.meals_per_day,
        Aggregation::Weekly | Aggregation::Average => config.total_slots(),
    };
    for _ in 0..picks {
        let item = &catalog[rng.gen_range(0..catalog.len())];
        anchor.add_assign(item.nutrients());
    }
    if config.aggregation == Aggregation::Average {
        anchor = anchor.scaled(1.0 / config.days as f64);
    }

    let spread = rng.gen_range(0.05..0.4);
    let calories = anchor[Nutrient::Calories];
    let mut bounds = NutrientBounds::new().with(
        Nutrient::Calories,
        Bound::between(calories * (1.0 - spread), calories * (1.0 + spread)),
    );
    if rng.gen_bool(0.7) {
        bounds.set(
            Nutrient::Protein,
            Bound::at_least(anchor[Nutrient::Protein] * rng.gen_range(0.6..1.1)),
        );
    }
    if rng.gen_bool(0.5) {
        bounds.set(
            Nutrient::Sodium,
            Bound::at_most(anchor[Nutrient::Sodium] * rng.gen_range(0.9..1.5)),
        );
    }
    if rng.gen_bool(0.3) {
        bounds.set(
            Nutrient::Iron,
            Bound::at_least(anchor[Nutrient::Iron] * rng.gen_range(0.5..1.2)),
        );
    }
    bounds
}

/// Random planner settings: meals per day, aggregation, objective and the
/// repeat policy (window and per-item cap) all vary.
pub fn random_config(rng: &mut impl Rng, shape: InstanceShape) -> PlannerConfig {
    let mut config = PlannerConfig::default().with_days(shape.days);
    // every tried candidate is a step, so twice the leaf cap covers the inner nodes
    config.max_steps = 2 * MAX_EXHAUSTIVE_ASSIGNMENTS as usize;
    config.meals_per_day = rng.gen_range(1..=2);
    config.aggregation = match rng.gen_range(0..3) {
        0 => Aggregation::Weekly,
        1 => Aggregation::Daily,
        _ => Aggregation::Average,
    };
    if rng.gen_bool(0.3) {
        config.objective = Objective::MaximizeRating;
    }
    config.allow_repeats = rng.gen_bool(0.7);
    if config.allow_repeats {
        if shape.days > 1 && rng.gen_bool(0.3) {
            config.max_repeat_within_days = 2;
        }
        if rng.gen_bool(0.3) {
            config.max_uses_per_item = Some(rng.gen_range(1..=2));
        }
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_same_seed_same_instance() {
        let shape = InstanceShape { items: 4, days: 3 };
        let build = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let catalog = random_catalog(&mut rng, shape.items);
            let config = random_config(&mut rng, shape);
            let bounds = random_bounds(&mut rng, &catalog, &config);
            (catalog, config, bounds)
        };
        assert_eq!(build(7), build(7));
    }

    #[test]
    fn test_catalog_items_are_valid() {
        let mut rng = StdRng::seed_from_u64(1);
        let catalog = random_catalog(&mut rng, 5);
        assert_eq!(catalog.len(), 5);
        assert!(catalog.iter().all(MealItem::is_valid));
        assert_eq!(catalog[4].id.as_str(), "m5");
    }

    #[test]
    fn test_configs_cover_every_knob() {
        let mut rng = StdRng::seed_from_u64(3);
        let shape = InstanceShape { items: 4, days: 3 };
        let configs: Vec<PlannerConfig> =
            (0..200).map(|_| random_config(&mut rng, shape)).collect();

        assert!(configs.iter().any(|c| c.meals_per_day == 2));
        assert!(configs.iter().any(|c| c.objective == Objective::MaximizeRating));
        assert!(configs.iter().any(|c| c.max_uses_per_item.is_some()));
        assert!(configs.iter().any(|c| c.max_repeat_within_days > 0));
        assert!(configs.iter().any(|c| !c.allow_repeats));
        assert!(configs
            .iter()
            .any(|c| c.meals_per_day == 2 && c.aggregation == Aggregation::Daily));
        assert!(configs.iter().all(|c| c.validate().is_ok()));
    }

    #[test]
    fn test_bounds_are_consistent() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..20 {
            let catalog = random_catalog(&mut rng, 3);
            let config = random_config(&mut rng, InstanceShape { items: 3, days: 2 });
            let bounds = random_bounds(&mut rng, &catalog, &config);
            assert!(bounds.validate().is_ok());
        }
    }
}
