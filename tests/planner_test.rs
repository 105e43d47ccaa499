use serde_json::json;

use meal_planner_rs::models::{Bound, MealItem, Nutrient, NutrientBounds};
use meal_planner_rs::planner::{
    optimize, validate_items, validate_values, Aggregation, Failure, Objective, PlannerConfig,
    ViolationKind,
};

fn scenario_catalog() -> Vec<MealItem> {
    let report = validate_values(vec![
        json!({"id": 1, "title": "Steak Dinner", "estimated_cost_usd": 5.0, "calories": 2000,
               "macros": {"protein": 80}}),
        json!({"id": 2, "title": "Pasta Bowl", "estimated_cost_usd": 3.0, "calories": 1500,
               "macros": {"protein": 40}}),
    ]);
    assert!(report.rejected.is_empty());
    report.accepted
}

fn one_day() -> PlannerConfig {
    PlannerConfig::default().with_days(1)
}

#[test]
fn test_protein_scenario_picks_steak() {
    let catalog = scenario_catalog();
    let bounds = NutrientBounds::new()
        .with(Nutrient::Calories, Bound::between(1800.0, 2200.0))
        .with(Nutrient::Protein, Bound::at_least(50.0));

    let solution = optimize(&catalog, &bounds, &one_day()).unwrap();
    let ids: Vec<&str> = solution.plan.meals().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["1"]);
    assert_eq!(solution.summary.total_cost, 5.0);
    assert_eq!(solution.plan.days[0].day, "Monday");

    let protein = solution.summary.nutrient(Nutrient::Protein).unwrap();
    assert_eq!(protein.total, 80.0);
    assert_eq!(protein.slack, Some(30.0));
}

#[test]
fn test_calorie_cap_scenario_is_infeasible() {
    let catalog = scenario_catalog();
    let bounds = NutrientBounds::new().with(Nutrient::Calories, Bound::at_most(1000.0));

    let Err(Failure::Infeasible(report)) = optimize(&catalog, &bounds, &one_day()) else {
        panic!("expected an infeasible result");
    };
    let calories: Vec<_> = report.violations_for(Nutrient::Calories).collect();
    assert_eq!(calories.len(), 1);
    assert_eq!(calories[0].kind, ViolationKind::Excess);
    assert_eq!(calories[0].amount, 500.0);

    let closest = report.closest.expect("closest plan is reported");
    assert_eq!(closest.days[0].meals[0].as_str(), "2");
}

#[test]
fn test_sodium_over_max_everywhere_names_sodium() {
    let catalog = vec![
        MealItem::new("soup", "Miso Soup", 2.0, 300.0).with(Nutrient::Sodium, 900.0),
        MealItem::new("ramen", "Ramen", 4.0, 600.0).with(Nutrient::Sodium, 1800.0),
    ];
    let bounds = NutrientBounds::new().with(Nutrient::Sodium, Bound::at_most(400.0));
    let config = PlannerConfig::default().with_days(3);

    let failure = optimize(&catalog, &bounds, &config).unwrap_err();
    assert_eq!(failure.kind(), "infeasible");
    assert!(failure.to_string().contains("sodium_mg exceeded"));
    let Failure::Infeasible(report) = failure else {
        unreachable!();
    };
    assert!(report.exhausted);
    assert!(report.violations_for(Nutrient::Sodium).next().is_some());
}

#[test]
fn test_daily_aggregation_bounds_every_day() {
    let catalog = vec![
        MealItem::new("a", "Toast", 1.0, 300.0),
        MealItem::new("b", "Curry", 4.0, 900.0),
        MealItem::new("c", "Salad", 2.0, 400.0),
    ];
    let bounds = NutrientBounds::new().with(Nutrient::Calories, Bound::between(1100.0, 1400.0));
    let mut config = PlannerConfig::default()
        .with_days(3)
        .with_aggregation(Aggregation::Daily);
    config.meals_per_day = 2;

    let solution = optimize(&catalog, &bounds, &config).unwrap();
    assert_eq!(solution.plan.days.len(), 3);
    for day in &solution.plan.days {
        let kcal = day.totals()[Nutrient::Calories];
        assert!((1100.0..=1400.0).contains(&kcal), "{} has {}", day.day, kcal);
    }
    // toast + curry (1200 kcal, $5) is the cheapest pair in range
    assert_eq!(solution.summary.total_cost, 15.0);
}

#[test]
fn test_average_aggregation_scales_bounds() {
    let catalog = vec![
        MealItem::new("light", "Light", 1.0, 1500.0),
        MealItem::new("heavy", "Heavy", 3.0, 2500.0),
    ];
    let bounds = NutrientBounds::new().with(Nutrient::Calories, Bound::between(1900.0, 2100.0));
    let config = PlannerConfig::default()
        .with_days(2)
        .with_aggregation(Aggregation::Average);

    let solution = optimize(&catalog, &bounds, &config).unwrap();
    assert_eq!(solution.summary.total_cost, 4.0);
    let calories = solution.summary.nutrient(Nutrient::Calories).unwrap();
    assert_eq!(calories.average, 2000.0);
}

#[test]
fn test_no_repeats_uses_distinct_meals() {
    let catalog: Vec<MealItem> = (1..=5u64)
        .map(|i| MealItem::new(i, format!("Meal {}", i), i as f64, 500.0))
        .collect();
    let mut config = PlannerConfig::default().with_days(3);
    config.allow_repeats = false;

    let solution = optimize(&catalog, &NutrientBounds::new(), &config).unwrap();
    assert_eq!(solution.summary.distinct_meals, 3);
    assert_eq!(solution.summary.total_cost, 6.0);
}

#[test]
fn test_repeat_window_spaces_out_meals() {
    let catalog = vec![
        MealItem::new("cheap", "Rice", 1.0, 500.0),
        MealItem::new("mid", "Beans", 2.0, 500.0),
        MealItem::new("dear", "Fish", 6.0, 500.0),
    ];
    let mut config = PlannerConfig::default().with_days(4);
    config.max_repeat_within_days = 2;

    let solution = optimize(&catalog, &NutrientBounds::new(), &config).unwrap();
    let ids: Vec<&str> = solution.plan.meals().map(|m| m.id.as_str()).collect();
    for pair in ids.windows(2) {
        assert_ne!(pair[0], pair[1]);
    }
    assert_eq!(solution.summary.total_cost, 6.0);
}

#[test]
fn test_variety_breaks_cost_ties() {
    let catalog = vec![
        MealItem::new("a", "Lentils", 2.0, 500.0),
        MealItem::new("b", "Chickpeas", 2.0, 500.0),
    ];
    let config = PlannerConfig::default().with_days(2);

    let solution = optimize(&catalog, &NutrientBounds::new(), &config).unwrap();
    assert_eq!(solution.summary.total_cost, 4.0);
    assert_eq!(solution.summary.distinct_meals, 2);
}

#[test]
fn test_maximize_rating_prefers_favourites() {
    let catalog = vec![
        MealItem::new("plain", "Plain Rice", 1.0, 600.0).with_rating(3),
        MealItem::new("fav", "Paella", 9.0, 600.0).with_rating(9),
    ];
    let mut config = PlannerConfig::default().with_days(2);
    config.objective = Objective::MaximizeRating;

    let solution = optimize(&catalog, &NutrientBounds::new(), &config).unwrap();
    assert!(solution.plan.meals().all(|m| m.id.as_str() == "fav"));
    assert_eq!(solution.summary.total_rating, 18);
}

#[test]
fn test_invalid_items_are_reported_not_fatal() {
    let catalog = vec![
        MealItem::new("ok", "Oats", 1.0, 400.0),
        MealItem::new("bad", "Mystery", -2.0, 400.0),
    ];
    let solution = optimize(&catalog, &NutrientBounds::new(), &one_day()).unwrap();
    assert_eq!(solution.rejected.len(), 1);
    assert_eq!(solution.rejected[0].id.as_deref(), Some("bad"));
    assert_eq!(solution.rejected[0].position, 2);
}

#[test]
fn test_all_invalid_items_is_empty_catalog() {
    let catalog = vec![MealItem::new("bad", "Mystery", f64::NAN, 400.0)];
    let failure = optimize(&catalog, &NutrientBounds::new(), &one_day()).unwrap_err();
    let Failure::EmptyCatalog { rejected } = failure else {
        panic!("expected empty catalog");
    };
    assert_eq!(rejected.len(), 1);
}

#[test]
fn test_inconsistent_bounds_fail_before_search() {
    let catalog = scenario_catalog();
    let bounds = NutrientBounds::new().with(Nutrient::Iron, Bound::between(10.0, 2.0));
    let failure = optimize(&catalog, &bounds, &one_day()).unwrap_err();
    let Failure::Validation { issues } = failure else {
        panic!("expected validation failure");
    };
    assert_eq!(issues[0].field, "iron_mg");
}

#[test]
fn test_zero_days_is_rejected() {
    let catalog = scenario_catalog();
    let config = PlannerConfig::default().with_days(0);
    assert!(matches!(
        optimize(&catalog, &NutrientBounds::new(), &config),
        Err(Failure::Validation { .. })
    ));
}

#[test]
fn test_oversized_plan_is_rejected_before_search() {
    let catalog = vec![MealItem::new("a", "A", 1.0, 500.0)];
    let config = PlannerConfig::default().with_days(1_000_000_000_000);

    let Err(Failure::Validation { issues }) = optimize(&catalog, &NutrientBounds::new(), &config)
    else {
        panic!("expected validation failure");
    };
    assert_eq!(issues[0].field, "days");

    let mut config = PlannerConfig::default();
    config.meals_per_day = usize::MAX;
    assert!(matches!(
        optimize(&catalog, &NutrientBounds::new(), &config),
        Err(Failure::Validation { .. })
    ));
}

#[test]
fn test_budget_cut_returns_incumbent_unproven() {
    let catalog = scenario_catalog();
    let mut config = one_day();
    config.max_steps = 1;

    let solution = optimize(&catalog, &NutrientBounds::new(), &config).unwrap();
    assert!(!solution.summary.optimal);
    assert_eq!(solution.summary.steps, 1);
}

#[test]
fn test_same_input_same_plan() {
    let catalog: Vec<MealItem> = (1..=8u64)
        .map(|i| {
            MealItem::new(i, format!("Meal {}", i), (i % 4 + 1) as f64, 300.0 + 50.0 * i as f64)
                .with(Nutrient::Protein, (i * 7 % 30) as f64)
        })
        .collect();
    let bounds = NutrientBounds::new()
        .with(Nutrient::Calories, Bound::between(3500.0, 4200.0))
        .with(Nutrient::Protein, Bound::at_least(120.0));
    let config = PlannerConfig::default();

    let first = format!("{:?}", optimize(&catalog, &bounds, &config));
    let second = format!("{:?}", optimize(&catalog, &bounds, &config));
    assert_eq!(first, second);
}

#[test]
fn test_validation_is_idempotent() {
    let catalog = scenario_catalog();
    let again = validate_items(catalog.clone());
    assert!(again.rejected.is_empty());
    assert_eq!(again.accepted, catalog);

    let bounds = NutrientBounds::new().with(Nutrient::Calories, Bound::between(1.0, 2.0));
    let before = bounds.clone();
    assert!(bounds.validate().is_ok());
    assert!(bounds.validate().is_ok());
    assert_eq!(bounds, before);
}
