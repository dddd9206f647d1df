use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::stay::StaySnapshot;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    pub code: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl ConstraintViolation {
    pub fn new(code: &str, message: impl Into<String>, suggestion: Option<&str>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            suggestion: suggestion.map(str::to_string),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintResult {
    pub valid: bool,
    pub violations: Vec<ConstraintViolation>,
}

impl Default for ConstraintResult {
    fn default() -> Self {
        Self { valid: true, violations: Vec::new() }
    }
}

impl ConstraintResult {
    pub fn from_violations(violations: Vec<ConstraintViolation>) -> Self {
        Self { valid: violations.is_empty(), violations }
    }
}

pub trait ConstraintEngine: Send + Sync {
    fn validate(&self, snapshot: &StaySnapshot) -> ConstraintResult;
}

#[derive(Default)]
pub struct DeterministicConstraintEngine;

impl ConstraintEngine for DeterministicConstraintEngine {
    fn validate(&self, snapshot: &StaySnapshot) -> ConstraintResult {
        validate_snapshot(snapshot)
    }
}

/// Integrity checks a stay snapshot must pass before a quote session uses it.
///
/// Operations never re-check these; a snapshot failing here may produce
/// clamped or unpriced results later on.
pub fn validate_snapshot(snapshot: &StaySnapshot) -> ConstraintResult {
    let mut violations = Vec::new();

    if snapshot.start_date > snapshot.end_date {
        violations.push(ConstraintViolation::new(
            "INVALID_STAY_DATES",
            format!("Stay {} ends before it starts", snapshot.id),
            Some("Set an end date on or after the start date"),
        ));
    }

    if let (Some(min), Some(max)) = (snapshot.min_days, snapshot.max_days) {
        if min > max {
            violations.push(ConstraintViolation::new(
                "INVALID_DAY_LIMITS",
                format!("Minimum stay of {min} days exceeds the maximum of {max}"),
                Some("Lower min_days or raise max_days"),
            ));
        }
    }

    let mut bracket_ids = HashSet::new();
    for bracket in &snapshot.age_brackets {
        if !bracket_ids.insert(&bracket.id) {
            violations.push(ConstraintViolation::new(
                "DUPLICATE_AGE_BRACKET",
                format!("Age bracket {} is listed more than once", bracket.id),
                None,
            ));
        }
        if let (Some(min), Some(max)) = (bracket.min_age, bracket.max_age) {
            if min > max {
                violations.push(ConstraintViolation::new(
                    "INVALID_AGE_RANGE",
                    format!("Age bracket {} has min age {min} above max age {max}", bracket.id),
                    Some("Swap or correct the age limits"),
                ));
            }
        }
    }

    let mut sub_period_ids = HashSet::new();
    for (position, period) in snapshot.sub_periods.iter().enumerate() {
        if !sub_period_ids.insert(&period.id) {
            violations.push(ConstraintViolation::new(
                "DUPLICATE_SUB_PERIOD",
                format!("Sub-period {} is listed more than once", period.id),
                None,
            ));
        }
        if period.start_date >= period.end_date {
            violations.push(ConstraintViolation::new(
                "INVALID_SUB_PERIOD_DATES",
                format!("Sub-period {} does not span at least one night", period.id),
                Some("Set an end date after the start date"),
            ));
        }
        if period.start_date < snapshot.start_date || period.end_date > snapshot.end_date {
            violations.push(ConstraintViolation::new(
                "SUB_PERIOD_OUT_OF_BOUNDS",
                format!("Sub-period {} is not inside the stay dates", period.id),
                Some("Move the sub-period within the stay start and end dates"),
            ));
        }
        for other in &snapshot.sub_periods[position + 1..] {
            if period.overlaps(other) {
                violations.push(ConstraintViolation::new(
                    "OVERLAPPING_SUB_PERIODS",
                    format!("Sub-periods {} and {} overlap", period.id, other.id),
                    Some("Adjust the dates so sub-periods do not share nights"),
                ));
            }
        }
    }

    let mut room_ids = HashSet::new();
    for room in &snapshot.rooms {
        if !room_ids.insert(&room.id) {
            violations.push(ConstraintViolation::new(
                "DUPLICATE_ROOM_TYPE",
                format!("Room type {} is listed more than once", room.id),
                None,
            ));
        }
        if room.capacity == 0 {
            violations.push(ConstraintViolation::new(
                "ZERO_CAPACITY",
                format!("Room type {} has no capacity", room.id),
                Some("Use a capacity of at least one occupant"),
            ));
        }

        let mut tariff_keys = HashSet::new();
        for tariff in &room.tariffs {
            if tariff.room_type_id != room.id {
                violations.push(ConstraintViolation::new(
                    "MISPLACED_TARIFF",
                    format!(
                        "Tariff for {} is listed under room type {}",
                        tariff.room_type_id, room.id
                    ),
                    None,
                ));
            }
            if !bracket_ids.contains(&tariff.age_bracket_id) {
                violations.push(ConstraintViolation::new(
                    "UNKNOWN_TARIFF_AGE_BRACKET",
                    format!(
                        "Room type {} prices unknown age bracket {}",
                        room.id, tariff.age_bracket_id
                    ),
                    None,
                ));
            }
            if let Some(sub_period) = &tariff.sub_period_id {
                if !sub_period_ids.contains(sub_period) {
                    violations.push(ConstraintViolation::new(
                        "UNKNOWN_TARIFF_SUB_PERIOD",
                        format!("Room type {} prices unknown sub-period {sub_period}", room.id),
                        None,
                    ));
                }
            }
            if !tariff_keys.insert((&tariff.age_bracket_id, &tariff.sub_period_id)) {
                violations.push(ConstraintViolation::new(
                    "DUPLICATE_TARIFF",
                    format!(
                        "Room type {} has more than one tariff for {} in {}",
                        room.id,
                        tariff.age_bracket_id,
                        tariff
                            .sub_period_id
                            .as_ref()
                            .map_or("the global period", |id| id.0.as_str())
                    ),
                    Some("Keep a single price per age bracket and period"),
                ));
            }
            if tariff.price < Decimal::ZERO {
                violations.push(ConstraintViolation::new(
                    "NEGATIVE_PRICE",
                    format!(
                        "Room type {} has a negative price for {}",
                        room.id, tariff.age_bracket_id
                    ),
                    Some("Use zero or a positive price"),
                ));
            }
        }
    }

    ConstraintResult::from_violations(violations)
}
