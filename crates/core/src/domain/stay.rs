use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StayId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgeBracketId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubPeriodId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoomTypeId(pub String);

macro_rules! display_id {
    ($($id:ty),+ $(,)?) => {
        $(
            impl fmt::Display for $id {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<&str> for $id {
                fn from(value: &str) -> Self {
                    Self(value.to_owned())
                }
            }
        )+
    };
}

display_id!(StayId, AgeBracketId, SubPeriodId, RoomTypeId);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeBracket {
    pub id: AgeBracketId,
    pub label: String,
    #[serde(default)]
    pub min_age: Option<u32>,
    #[serde(default)]
    pub max_age: Option<u32>,
    #[serde(default)]
    pub order: u32,
}

impl AgeBracket {
    pub fn contains_age(&self, age: u32) -> bool {
        self.min_age.map_or(true, |min| age >= min) && self.max_age.map_or(true, |max| age <= max)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubPeriod {
    pub id: SubPeriodId,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub order: u32,
}

impl SubPeriod {
    pub fn covers(&self, check_in: NaiveDate, check_out: NaiveDate) -> bool {
        self.start_date <= check_in && check_out <= self.end_date
    }

    pub fn overlaps(&self, other: &SubPeriod) -> bool {
        self.start_date < other.end_date && other.start_date < self.end_date
    }
}

/// Price for one occupant of a room type, for the whole stay.
///
/// `sub_period_id: None` is the global tariff used when no sub-period specific
/// price exists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomTariff {
    pub room_type_id: RoomTypeId,
    pub age_bracket_id: AgeBracketId,
    #[serde(default)]
    pub sub_period_id: Option<SubPeriodId>,
    pub price: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomType {
    pub id: RoomTypeId,
    pub name: String,
    pub capacity: u32,
    #[serde(default)]
    pub tariffs: Vec<RoomTariff>,
}

/// Immutable view of a stay handed to the engine by the fetch collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaySnapshot {
    pub id: StayId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub allow_partial_booking: bool,
    #[serde(default)]
    pub min_days: Option<u32>,
    #[serde(default)]
    pub max_days: Option<u32>,
    #[serde(default)]
    pub age_brackets: Vec<AgeBracket>,
    #[serde(default)]
    pub sub_periods: Vec<SubPeriod>,
    #[serde(default)]
    pub rooms: Vec<RoomType>,
}

impl StaySnapshot {
    pub fn nights(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    /// Brackets sorted by their display order, ties broken by id.
    pub fn ordered_age_brackets(&self) -> Vec<&AgeBracket> {
        let mut brackets: Vec<&AgeBracket> = self.age_brackets.iter().collect();
        brackets.sort_by(|left, right| left.order.cmp(&right.order).then(left.id.cmp(&right.id)));
        brackets
    }

    pub fn ordered_sub_periods(&self) -> Vec<&SubPeriod> {
        let mut periods: Vec<&SubPeriod> = self.sub_periods.iter().collect();
        periods.sort_by(|left, right| {
            left.order.cmp(&right.order).then(left.start_date.cmp(&right.start_date))
        });
        periods
    }

    /// The first sub-period (in display order) wholly containing the date range.
    pub fn sub_period_covering(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Option<&SubPeriod> {
        self.ordered_sub_periods().into_iter().find(|period| period.covers(check_in, check_out))
    }

    pub fn bracket_for_age(&self, age: u32) -> Option<&AgeBracket> {
        self.ordered_age_brackets().into_iter().find(|bracket| bracket.contains_age(age))
    }
}

/// Applies a drag-and-drop ordering to sub-periods.
///
/// `ids` must name every period exactly once; the returned periods are in the
/// requested order with `order` renumbered from zero.
pub fn reorder_sub_periods(
    periods: &[SubPeriod],
    ids: &[SubPeriodId],
) -> Result<Vec<SubPeriod>, DomainError> {
    let known: BTreeSet<&SubPeriodId> = periods.iter().map(|period| &period.id).collect();
    let requested: BTreeSet<&SubPeriodId> = ids.iter().collect();

    if ids.len() != periods.len() || requested.len() != ids.len() || known != requested {
        return Err(DomainError::InvalidReorder {
            expected: periods.len(),
            received: ids.iter().map(|id| id.0.clone()).collect(),
        });
    }

    let mut reordered = Vec::with_capacity(ids.len());
    for (position, id) in ids.iter().enumerate() {
        let Some(period) = periods.iter().find(|period| &period.id == id) else {
            return Err(DomainError::UnknownSubPeriod(id.clone()));
        };
        let mut period = period.clone();
        period.order = u32::try_from(position).unwrap_or(u32::MAX);
        reordered.push(period);
    }

    Ok(reordered)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{reorder_sub_periods, AgeBracket, AgeBracketId, SubPeriod, SubPeriodId};
    use crate::errors::DomainError;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, month, day).expect("valid date")
    }

    fn period(id: &str, start: NaiveDate, end: NaiveDate, order: u32) -> SubPeriod {
        SubPeriod {
            id: SubPeriodId(id.to_owned()),
            name: id.to_uppercase(),
            start_date: start,
            end_date: end,
            order,
        }
    }

    #[test]
    fn reorder_renumbers_in_requested_order() {
        let periods = vec![
            period("early", date(7, 1), date(7, 8), 0),
            period("late", date(7, 8), date(7, 15), 1),
        ];

        let reordered = reorder_sub_periods(
            &periods,
            &[SubPeriodId("late".to_owned()), SubPeriodId("early".to_owned())],
        )
        .expect("permutation is accepted");

        assert_eq!(reordered[0].id.0, "late");
        assert_eq!(reordered[0].order, 0);
        assert_eq!(reordered[1].id.0, "early");
        assert_eq!(reordered[1].order, 1);
    }

    #[test]
    fn reorder_rejects_missing_or_duplicate_ids() {
        let periods = vec![
            period("early", date(7, 1), date(7, 8), 0),
            period("late", date(7, 8), date(7, 15), 1),
        ];

        let duplicate = reorder_sub_periods(
            &periods,
            &[SubPeriodId("early".to_owned()), SubPeriodId("early".to_owned())],
        );
        assert!(matches!(duplicate, Err(DomainError::InvalidReorder { .. })));

        let missing = reorder_sub_periods(&periods, &[SubPeriodId("early".to_owned())]);
        assert!(matches!(missing, Err(DomainError::InvalidReorder { .. })));
    }

    #[test]
    fn adjacent_periods_do_not_overlap() {
        let early = period("early", date(7, 1), date(7, 8), 0);
        let late = period("late", date(7, 8), date(7, 15), 1);
        let spanning = period("spanning", date(7, 5), date(7, 10), 2);

        assert!(!early.overlaps(&late));
        assert!(spanning.overlaps(&early));
        assert!(spanning.overlaps(&late));
    }

    #[test]
    fn open_ended_brackets_match_ages() {
        let adult = AgeBracket {
            id: AgeBracketId("adult".to_owned()),
            label: "Adult".to_owned(),
            min_age: Some(18),
            max_age: None,
            order: 0,
        };

        assert!(adult.contains_age(18));
        assert!(adult.contains_age(90));
        assert!(!adult.contains_age(17));
    }
}
