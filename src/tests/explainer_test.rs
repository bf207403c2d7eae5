use crate::explainer::{advice, coefficient_table, explain, headline, importance, top_drivers};
use crate::feature_builder::FeatureName;
use crate::tests::test_utils::model_with;

const MEANS: [f64; 6] = [12.0, 150.0, 0.05, 2.0, 0.5, 0.2];
const STDS: [f64; 6] = [2.0, 50.0, 0.05, 1.0, 0.2, 0.1];

#[test]
pub fn importance_is_share_of_absolute_weight() {
    let model = model_with([4.0, -2.0, 1.0, 0.0, 3.0, 0.0], 70.0, MEANS, STDS);
    let ranked = importance(&model);

    assert_eq!(ranked.len(), 6);
    assert_eq!(ranked[0].feature, FeatureName::Speed);
    assert!((ranked[0].percent - 40.0).abs() < 1e-9);
    assert_eq!(ranked[1].feature, FeatureName::Load);
    assert_eq!(ranked[2].feature, FeatureName::Speed2);
    assert!((ranked[2].percent - 20.0).abs() < 1e-9);
    assert_eq!(ranked[2].weight, -2.0);

    let total: f64 = ranked.iter().map(|f| f.percent).sum();
    assert!((total - 100.0).abs() < 1e-9);
}

#[test]
pub fn ties_keep_feature_order() {
    let model = model_with([0.0, 0.0, 1.0, 1.0, 1.0, 0.0], 70.0, MEANS, STDS);
    let order: Vec<FeatureName> = top_drivers(&model, 3).into_iter().map(|f| f.feature).collect();
    assert_eq!(order, vec![FeatureName::RouteDev, FeatureName::Weather, FeatureName::Load]);
}

#[test]
pub fn all_zero_weights_give_zero_percent() {
    let model = model_with([0.0; 6], 70.0, MEANS, STDS);
    assert!(importance(&model).iter().all(|f| f.percent == 0.0));
}

#[test]
pub fn headline_names_top_two() {
    let model = model_with([1.0, 5.0, 0.0, 2.0, 0.0, 0.0], 70.0, MEANS, STDS);
    assert_eq!(
        headline(Some(&model)),
        "Top driver: Speed² (nonlinear) • Secondary: Weather severity"
    );
    assert_eq!(headline(None), "Top driver: — • Secondary: —");
}

#[test]
pub fn speed_terms_share_one_tip() {
    let model = model_with([5.0, 4.0, 0.0, 3.0, 0.0, 0.0], 70.0, MEANS, STDS);
    let tips = advice(&model);
    assert_eq!(tips.len(), 2);
    assert!(tips[0].contains("slow steaming"));
    assert!(tips[1].contains("heavy weather"));
}

#[test]
pub fn advice_covers_only_top_three() {
    let model = model_with([0.1, 0.1, 3.0, 0.2, 2.0, 1.0], 70.0, MEANS, STDS);
    let tips = advice(&model);
    assert_eq!(tips.len(), 3);
    assert!(tips.iter().any(|t| t.contains("detours")));
    assert!(tips.iter().any(|t| t.contains("ballast")));
    assert!(tips.iter().any(|t| t.contains("maintenance")));
    assert!(!tips.iter().any(|t| t.contains("slow steaming")));
}

#[test]
pub fn explanation_bundles_ranking_headline_and_advice() {
    let model = model_with([3.0, 1.0, 0.0, 0.0, 0.0, 2.0], 70.0, MEANS, STDS);
    let e = explain(&model);
    assert_eq!(e.ranking[0].feature, FeatureName::Speed);
    assert!(e.headline.starts_with("Top driver: Speed (linear)"));
    assert_eq!(e.advice.len(), 2);
}

#[test]
pub fn coefficient_table_is_signed_in_feature_order() {
    let model = model_with([1.0, -0.5, 0.0, 0.25, 0.0, 2.0], 70.0, MEANS, STDS);
    let table = coefficient_table(&model);
    assert_eq!(table[0], "Speed (linear): +1.000");
    assert_eq!(table[1], "Speed² (nonlinear): -0.500");
    assert_eq!(table[5], "Equipment condition: +2.000");
}
