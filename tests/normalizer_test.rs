// ABOUTME: Integration tests for target normalization and locale-aware number parsing
// ABOUTME: Covers carb derivation, kcal coherence nudging, the fat parity step, and input errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{hm, run};
use macroplan::engine::normalizer::{normalize, parse_number};
use macroplan::engine::Journal;
use macroplan::{ErrorCode, PlanError, PlanInputs, RawNumber, RawTargets, Targets, WarningCode};

fn raw(kcal: &str, protein: &str, carbs: Option<&str>, fat: &str) -> RawTargets {
    RawTargets {
        kcal: Some(kcal.into()),
        protein: Some(protein.into()),
        carbs: carbs.map(RawNumber::from),
        fat: Some(fat.into()),
    }
}

// === Number Parsing ===

#[test]
fn test_parse_locale_numbers() {
    let cases = [
        ("2 800", 2800.0),
        ("2800", 2800.0),
        ("72,5", 72.5),
        ("1.234,5", 1234.5),
        ("1,234.5", 1234.5),
        ("1,234", 1234.0),
        ("0,250", 0.25),
        ("1,234,567", 1_234_567.0),
        ("1.234.567", 1_234_567.0),
        ("  180 ", 180.0),
    ];
    for (text, expected) in cases {
        let parsed = parse_number(&RawNumber::from(text)).unwrap();
        assert!((parsed - expected).abs() < 1e-9, "{text} -> {parsed}");
    }
}

#[test]
fn test_parse_rejects_garbage() {
    assert_eq!(parse_number(&RawNumber::from("abc")), None);
    assert_eq!(parse_number(&RawNumber::from("")), None);
    assert_eq!(parse_number(&RawNumber::from(f64::NAN)), None);
    assert_eq!(parse_number(&RawNumber::from(f64::INFINITY)), None);
}

// === Coherence ===

#[test]
fn test_coherent_targets_pass_through() {
    let mut journal = Journal::new();
    let normalized = normalize(&RawTargets::new(2800, 180, 340, 80), &mut journal).unwrap();

    assert!(normalized.kcal_coherent);
    assert_eq!(
        normalized.targets,
        Targets {
            kcal: 2800,
            protein: 180,
            carbs: 340,
            fat: 80
        }
    );
    assert!(journal.warnings().is_empty());
    assert!(journal.change_log().is_empty());
}

#[test]
fn test_missing_carbs_are_derived() {
    let mut journal = Journal::new();
    let normalized = normalize(&raw("2000", "150", None, "60"), &mut journal).unwrap();

    assert_eq!(normalized.targets.carbs, 215);
    assert!(normalized.kcal_coherent);
    assert!(journal
        .change_log()
        .iter()
        .any(|e| e.rule == "normalizer.derive_carbs"));
}

#[test]
fn test_carbs_nudged_to_match_kcal() {
    let mut journal = Journal::new();
    let normalized = normalize(&RawTargets::new(2800, 180, 330, 80), &mut journal).unwrap();

    assert_eq!(normalized.targets.carbs, 340);
    assert_eq!(normalized.targets.kcal_residual(), 0);
    assert!(journal
        .change_log()
        .iter()
        .any(|e| e.rule == "normalizer.kcal_coherence"));
}

#[test]
fn test_residual_of_two_uses_one_fat_gram() {
    let mut journal = Journal::new();
    let normalized = normalize(&RawTargets::new(2802, 180, 340, 80), &mut journal).unwrap();

    assert!(normalized.kcal_coherent);
    assert_eq!(normalized.targets.fat, 79);
    assert_eq!(normalized.targets.carbs, 343);
    assert!(normalized.targets.kcal_residual().abs() <= 1);
}

#[test]
fn test_locale_strings_normalize_like_numbers() {
    let mut journal = Journal::new();
    let normalized = normalize(&raw("2 800", "180", Some("340,0"), "80"), &mut journal).unwrap();
    let reference = normalize(&RawTargets::new(2800, 180, 340, 80), &mut journal).unwrap();
    assert_eq!(normalized, reference);
}

#[test]
fn test_incoherent_targets_warn() {
    let mut journal = Journal::new();
    let normalized = normalize(&raw("1000", "200", None, "100"), &mut journal).unwrap();

    assert!(!normalized.kcal_coherent);
    assert_eq!(normalized.targets.carbs, 0);
    let warning = journal
        .warnings()
        .iter()
        .find(|w| w.code == WarningCode::TargetsKcalMismatch)
        .expect("mismatch warning");
    assert!(warning.fix.is_some());
}

#[test]
fn test_incoherent_targets_still_plan() {
    let inputs = PlanInputs::new(hm(7, 0), hm(22, 0), raw("1000", "200", None, "100"));
    let plan = run(&inputs);

    assert!(plan.has_warning(WarningCode::TargetsKcalMismatch));
    assert_eq!(plan.totals().protein, 200);
    assert_eq!(plan.totals().fat, 100);
    assert_eq!(plan.totals().carbs, 0);
}

// === Input Errors ===

#[test]
fn test_missing_or_unparseable_kcal() {
    let mut journal = Journal::new();
    let missing = RawTargets {
        kcal: None,
        ..RawTargets::new(0, 180, 340, 80)
    };
    assert!(matches!(
        normalize(&missing, &mut journal),
        Err(PlanError::MissingKcal)
    ));
    assert!(matches!(
        normalize(&raw("lots", "180", None, "80"), &mut journal),
        Err(PlanError::MissingKcal)
    ));
}

#[test]
fn test_non_positive_kcal() {
    let mut journal = Journal::new();
    for kcal in ["0", "-5", "0,2"] {
        let err = normalize(&raw(kcal, "180", None, "80"), &mut journal).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NonPositiveKcal, "{kcal}");
    }
}

#[test]
fn test_all_zero_macros_rejected() {
    let mut journal = Journal::new();
    let err = normalize(&RawTargets::new(2000, 0, 0, 0), &mut journal).unwrap_err();
    assert!(matches!(err, PlanError::EmptyMacroTargets));
}

#[test]
fn test_negative_macro_rejected() {
    let mut journal = Journal::new();
    let err = normalize(&raw("2000", "-5", None, "60"), &mut journal).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidInput);
    assert!(err.to_string().contains("protein"));
}
