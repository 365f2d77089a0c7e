// ABOUTME: Targets normalizer turning raw, partial, or locale-formatted targets into coherent integers
// ABOUTME: Derives missing carbs, rounds protein/fat first, then nudges carbs (and one fat gram) to match kcal
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Targets normalizer
//!
//! After a successful normalization `|kcal - (4p + 4c + 9f)| <= 1` unless
//! carbohydrate bottoms out at zero, in which case the result is flagged
//! incoherent and a `TARGETS_KCAL_MISMATCH` warning is journaled.

use super::Journal;
use macroplan_core::constants::energy::{KCAL_PER_GRAM_CARBS, KCAL_PER_GRAM_FAT};
use macroplan_core::models::{ChangeLogEntry, RawNumber, RawTargets, Targets, Warning, WarningCode};
use macroplan_core::PlanError;
use serde_json::json;

/// Normalized targets and whether they are kcal-coherent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedTargets {
    /// Integer targets
    pub targets: Targets,
    /// `false` when kcal and macro energy could not be brought within ±1
    pub kcal_coherent: bool,
}

/// Parse a number or a locale-formatted string such as `"2 800"`, `"1.234,5"` or `"72,5"`
#[must_use]
pub fn parse_number(raw: &RawNumber) -> Option<f64> {
    match raw {
        RawNumber::Number(value) => value.is_finite().then_some(*value),
        RawNumber::Text(text) => parse_locale_decimal(text),
    }
}

fn parse_locale_decimal(text: &str) -> Option<f64> {
    let compact: String = text
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '\'' | '\u{a0}' | '\u{202f}'))
        .collect();
    if compact.is_empty() {
        return None;
    }

    let commas = compact.matches(',').count();
    let dots = compact.matches('.').count();
    let canonical = match (commas, dots) {
        (0, 0 | 1) => compact,
        (0, _) => compact.replace('.', ""),
        (_, 0) => comma_only(&compact, commas),
        _ => {
            // Both separators present: whichever comes last is the decimal mark
            let last_comma = compact.rfind(',');
            let last_dot = compact.rfind('.');
            if last_comma > last_dot {
                compact.replace('.', "").replace(',', ".")
            } else {
                compact.replace(',', "")
            }
        }
    };
    canonical.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn comma_only(text: &str, commas: usize) -> String {
    if commas > 1 {
        return text.replace(',', "");
    }
    let (head, tail) = text.split_once(',').unwrap_or((text, ""));
    let head_digits = head.trim_start_matches(['-', '+']);
    let is_thousands = tail.len() == 3
        && tail.chars().all(|c| c.is_ascii_digit())
        && (1..=3).contains(&head_digits.len())
        && head_digits != "0";
    if is_thousands {
        format!("{head}{tail}")
    } else {
        format!("{head}.{tail}")
    }
}

fn grams(field: &'static str, raw: Option<&RawNumber>) -> Result<Option<u32>, PlanError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let value = parse_number(raw)
        .ok_or_else(|| PlanError::invalid_input(field, "not a number"))?;
    if value < 0.0 {
        return Err(PlanError::invalid_input(field, "must not be negative"));
    }
    Ok(Some(value.round().min(f64::from(u32::MAX)) as u32))
}

fn residual(kcal: u32, protein: u32, carbs: u32, fat: u32) -> i64 {
    Targets {
        kcal,
        protein,
        carbs,
        fat,
    }
    .kcal_residual()
}

/// Move carbs by the whole number of 4-kcal steps closest to `residual`
fn nudge_carbs(carbs: u32, residual: i64) -> u32 {
    let per_gram = i64::from(KCAL_PER_GRAM_CARBS);
    let steps = (residual as f64 / per_gram as f64).round() as i64;
    u32::try_from((i64::from(carbs) + steps).max(0)).unwrap_or(u32::MAX)
}

/// Normalize raw targets
///
/// # Errors
///
/// Returns `PlanError::MissingKcal` when kcal is absent or unparseable,
/// `PlanError::NonPositiveKcal` when it is zero or negative,
/// `PlanError::InvalidInput` for unparseable or negative macro values, and
/// `PlanError::EmptyMacroTargets` when protein, carbs and fat are all zero.
pub fn normalize(raw: &RawTargets, journal: &mut Journal) -> Result<NormalizedTargets, PlanError> {
    let kcal = raw
        .kcal
        .as_ref()
        .and_then(parse_number)
        .ok_or(PlanError::MissingKcal)?;
    if kcal <= 0.0 {
        return Err(PlanError::NonPositiveKcal { kcal });
    }
    let kcal = kcal.round().min(f64::from(u32::MAX)) as u32;
    if kcal == 0 {
        return Err(PlanError::NonPositiveKcal { kcal: 0.0 });
    }

    let protein = grams("protein", raw.protein.as_ref())?.unwrap_or(0);
    let mut fat = grams("fat", raw.fat.as_ref())?.unwrap_or(0);
    let mut carbs = match grams("carbs", raw.carbs.as_ref())? {
        Some(carbs) => carbs,
        None => {
            let remainder = residual(kcal, protein, 0, fat);
            let derived = (remainder.max(0) as f64 / f64::from(KCAL_PER_GRAM_CARBS)).round() as u32;
            journal.record(ChangeLogEntry::new(
                "normalizer.derive_carbs",
                json!(null),
                json!(derived),
                "carbohydrate target missing; derived from kcal remainder",
            ));
            derived
        }
    };

    if protein == 0 && carbs == 0 && fat == 0 {
        return Err(PlanError::EmptyMacroTargets);
    }

    let supplied_carbs = carbs;
    let supplied_fat = fat;
    carbs = nudge_carbs(carbs, residual(kcal, protein, carbs, fat));
    let mut remaining = residual(kcal, protein, carbs, fat);

    // 9 mod 4 == 1: a residual of ±2 needs one fat gram before carbs can close it
    if remaining.abs() == 2 {
        let fat_kcal = i64::from(KCAL_PER_GRAM_FAT);
        let step_up = remaining > 0 || fat == 0;
        let candidate_fat = if step_up { fat + 1 } else { fat - 1 };
        let shifted = remaining + if step_up { -fat_kcal } else { fat_kcal };
        let candidate_carbs = nudge_carbs(carbs, shifted);
        if residual(kcal, protein, candidate_carbs, candidate_fat).abs() <= 1 {
            fat = candidate_fat;
            carbs = candidate_carbs;
            remaining = residual(kcal, protein, carbs, fat);
        }
    }

    if carbs != supplied_carbs || fat != supplied_fat {
        journal.record(ChangeLogEntry::new(
            "normalizer.kcal_coherence",
            json!({ "carbs": supplied_carbs, "fat": supplied_fat }),
            json!({ "carbs": carbs, "fat": fat }),
            "macro energy nudged towards the kcal target",
        ));
    }
    let kcal_coherent = remaining.abs() <= 1;
    if !kcal_coherent {
        journal.warn(
            Warning::new(
                WarningCode::TargetsKcalMismatch,
                format!("kcal target exceeds macro energy by {remaining:+} kcal after normalization"),
            )
            .with_fix("lower protein or fat, or raise the kcal target"),
        );
    }

    Ok(NormalizedTargets {
        targets: Targets {
            kcal,
            protein,
            carbs,
            fat,
        },
        kcal_coherent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_locale_formats() {
        let cases = [
            ("2 800", 2800.0),
            ("2,800", 2800.0),
            ("72,5", 72.5),
            ("1.234,5", 1234.5),
            ("1,234.5", 1234.5),
            ("1.234.567", 1_234_567.0),
            ("0,125", 0.125),
            ("180", 180.0),
        ];
        for (text, expected) in cases {
            let parsed = parse_number(&RawNumber::from(text));
            assert_eq!(parsed, Some(expected), "{text}");
        }
        assert_eq!(parse_number(&RawNumber::from("abc")), None);
        assert_eq!(parse_number(&RawNumber::from("  ")), None);
        assert_eq!(parse_number(&RawNumber::Number(f64::NAN)), None);
    }

    #[test]
    fn residual_of_two_moves_one_fat_gram() {
        // 4*100 + 4*200 + 9*50 = 1650; kcal 1652 leaves +2, one carb step flips it to -2
        let mut journal = Journal::new();
        let raw = RawTargets::new(1652, 100, 200, 50);
        let out = normalize(&raw, &mut journal).unwrap_or_else(|e| unreachable!("{e}"));
        assert!(out.kcal_coherent);
        assert_eq!(out.targets.kcal_residual(), -1);
        assert_eq!(out.targets.fat, 49);
        assert_eq!(out.targets.carbs, 203);
    }
}
