use super::*;
use crate::config::RatioConfig;

fn policy() -> RatioPolicy {
    RatioPolicy::from(&RatioConfig {
        infant_ratio: 3,
        toddler_ratio: 5,
        preschool_ratio: 8,
        kindergarten_ratio: 12,
        toddler_min_months: 12,
        preschool_min_months: 36,
    })
}

fn child(id: &str, age_in_months: Option<u32>, kindergarten: bool) -> ChildRatioInput {
    ChildRatioInput {
        child_id: id.to_string(),
        first_name: format!("First-{id}"),
        last_name: format!("Last-{id}"),
        age_in_months,
        is_kindergarten_enrolled: kindergarten,
    }
}

fn infant(id: &str) -> ChildRatioInput {
    child(id, Some(6), false)
}

fn toddler(id: &str) -> ChildRatioInput {
    child(id, Some(20), false)
}

fn preschooler(id: &str) -> ChildRatioInput {
    child(id, Some(48), false)
}

#[test]
fn kindergarten_enrollment_overrides_age() {
    let policy = policy();
    for age in [0, 11, 12, 35, 36, 70] {
        assert_eq!(policy.classify(age, true), RatioGroup::Kindergarten);
    }
    assert_eq!(
        policy.group_for(&child("k", None, true)),
        Some(RatioGroup::Kindergarten)
    );
}

#[test]
fn boundary_months_belong_to_the_older_band() {
    let policy = policy();
    assert_eq!(policy.classify(0, false), RatioGroup::Infant);
    assert_eq!(policy.classify(11, false), RatioGroup::Infant);
    assert_eq!(policy.classify(12, false), RatioGroup::Toddler);
    assert_eq!(policy.classify(35, false), RatioGroup::Toddler);
    assert_eq!(policy.classify(36, false), RatioGroup::Preschool);
    assert_eq!(policy.classify(u32::MAX, false), RatioGroup::Preschool);
}

#[test]
fn unknown_age_is_not_classified() {
    assert_eq!(policy().group_for(&child("x", None, false)), None);
}

#[test]
fn empty_room_is_unconstrained() {
    assert_eq!(policy().effective_ratio(&[]), EffectiveRatio::Unconstrained);
}

#[test]
fn strictest_group_binds_the_room() {
    let policy = policy();
    let mut children = vec![preschooler("a"), preschooler("b"), toddler("c")];
    assert_eq!(
        policy.effective_ratio(&children),
        EffectiveRatio::Limited {
            children_per_staff: 5,
            dominant_group: RatioGroup::Toddler,
        }
    );

    children.push(infant("d"));
    let ratio = policy.effective_ratio(&children);
    assert_eq!(ratio.children_per_staff(), Some(3));
    assert_eq!(ratio.dominant_group(), Some(RatioGroup::Infant));
}

#[test]
fn effective_ratio_ignores_order_and_duplicates() {
    let policy = policy();
    let base = vec![infant("a"), toddler("b"), preschooler("c")];
    let reversed: Vec<_> = base.iter().rev().cloned().collect();
    let mut duplicated = base.clone();
    duplicated.extend([toddler("d"), toddler("e"), preschooler("f")]);

    let expected = policy.effective_ratio(&base);
    assert_eq!(policy.effective_ratio(&reversed), expected);
    assert_eq!(policy.effective_ratio(&duplicated), expected);
}

#[test]
fn tied_ratios_report_the_younger_group() {
    let policy = RatioPolicy::from(&RatioConfig {
        toddler_ratio: 8,
        preschool_ratio: 8,
        ..RatioConfig::default()
    });
    let ratio = policy.effective_ratio(&[preschooler("a"), toddler("b")]);
    assert_eq!(ratio.dominant_group(), Some(RatioGroup::Toddler));
}

#[test]
fn no_staff_and_no_children_is_good() {
    let status = policy().calculate_ratio_status(0, &[]);
    assert!(!status.is_over_ratio);
    assert_eq!(status.status_indicator, StatusIndicator::Good);
    assert_eq!(status.max_allowed_children, None);
    assert_eq!(status.actual_ratio, 0.0);
}

#[test]
fn single_staff_thresholds_follow_the_group_ratio() {
    let policy = policy();
    let toddlers: Vec<_> = (0..6).map(|i| toddler(&format!("t{i}"))).collect();

    let under = policy.calculate_ratio_status(1, &toddlers[..4]);
    assert!(!under.is_over_ratio);
    assert_eq!(under.status_indicator, StatusIndicator::Good);

    let at = policy.calculate_ratio_status(1, &toddlers[..5]);
    assert!(!at.is_over_ratio);
    assert_eq!(at.max_allowed_children, Some(5));
    assert_eq!(at.status_indicator, StatusIndicator::Warning);

    let over = policy.calculate_ratio_status(1, &toddlers);
    assert!(over.is_over_ratio);
    assert_eq!(over.status_indicator, StatusIndicator::Critical);
}

#[test]
fn one_infant_tightens_a_mixed_room() {
    let status = policy().calculate_ratio_status(2, &[infant("a"), toddler("b")]);
    assert_eq!(status.required_ratio.children_per_staff(), Some(3));
    assert_eq!(status.max_allowed_children, Some(6));
    assert_eq!(status.children_count, 2);
    assert!(!status.is_over_ratio);
    assert_eq!(status.status_indicator, StatusIndicator::Good);
    assert_eq!(status.actual_ratio, 1.0);
}

#[test]
fn unstaffed_room_with_children_is_critical() {
    let status = policy().calculate_ratio_status(0, &[preschooler("a")]);
    assert!(status.is_over_ratio);
    assert_eq!(status.status_indicator, StatusIndicator::Critical);
    assert_eq!(status.actual_ratio, 1.0);

    let unknown_only = policy().calculate_ratio_status(0, &[child("x", None, false)]);
    assert!(unknown_only.is_over_ratio);
    assert_eq!(unknown_only.status_indicator, StatusIndicator::Critical);
}

#[test]
fn children_without_birth_dates_count_but_do_not_classify() {
    let children = vec![
        preschooler("a"),
        child("b", None, false),
        child("c", None, false),
    ];
    let status = policy().calculate_ratio_status(1, &children);
    assert_eq!(status.children_count, 3);
    assert_eq!(status.unclassified_children, 2);
    assert_eq!(status.required_ratio.children_per_staff(), Some(8));
    assert_eq!(status.status_indicator, StatusIndicator::Good);
}

#[test]
fn summary_describes_the_room() {
    let status = policy().calculate_ratio_status(1, &[infant("a"), infant("b"), infant("c")]);
    let summary = status.summary();
    assert!(summary.contains("1:3 required"), "{summary}");
    assert!(summary.contains("At capacity"), "{summary}");
}

#[test]
fn status_serializes_with_tagged_ratio() {
    let status = policy().calculate_ratio_status(1, &[toddler("a")]);
    let json = serde_json::to_value(&status).expect("serializes");
    assert_eq!(json["required_ratio"]["kind"], "limited");
    assert_eq!(json["required_ratio"]["children_per_staff"], 5);
    assert_eq!(json["required_ratio"]["dominant_group"], "toddler");
    assert_eq!(json["status_indicator"], "good");
}

#[test]
fn invalid_config_values_fall_back_to_safe_policy() {
    let policy = RatioPolicy::from(&RatioConfig {
        infant_ratio: 0,
        toddler_min_months: 40,
        preschool_min_months: 30,
        ..RatioConfig::default()
    });
    assert_eq!(policy.ratio_for(RatioGroup::Infant), 1);
    assert_eq!(policy.classify(12, false), RatioGroup::Toddler);
    assert_eq!(policy.classify(36, false), RatioGroup::Preschool);
}
