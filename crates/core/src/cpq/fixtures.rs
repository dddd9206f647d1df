use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::quote::RoomInstanceId;
use crate::domain::stay::{
    AgeBracket, AgeBracketId, RoomTariff, RoomType, StayId, StaySnapshot, SubPeriod,
};

pub(crate) fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, month, day).expect("valid date")
}

pub(crate) fn adult() -> AgeBracketId {
    AgeBracketId("adult".to_owned())
}

pub(crate) fn child() -> AgeBracketId {
    AgeBracketId("child".to_owned())
}

pub(crate) fn instance(room_type: &str, index: u32) -> RoomInstanceId {
    RoomInstanceId::new(room_type.into(), index)
}

fn tariff(room_type: &str, bracket: &str, sub_period: Option<&str>, price: Decimal) -> RoomTariff {
    RoomTariff {
        room_type_id: room_type.into(),
        age_bracket_id: bracket.into(),
        sub_period_id: sub_period.map(Into::into),
        price,
    }
}

/// Two-week summer stay split into a low and a high period.
///
/// Double (2 beds): adult 100 global / 120 high, child 50 global.
/// Single (1 bed): adult 80 global, no child tariff.
pub(crate) fn snapshot() -> StaySnapshot {
    StaySnapshot {
        id: StayId("summer-camp".to_owned()),
        start_date: date(7, 1),
        end_date: date(7, 15),
        allow_partial_booking: true,
        min_days: Some(3),
        max_days: None,
        age_brackets: vec![
            AgeBracket {
                id: adult(),
                label: "Adult".to_owned(),
                min_age: Some(18),
                max_age: None,
                order: 0,
            },
            AgeBracket {
                id: child(),
                label: "Child".to_owned(),
                min_age: Some(3),
                max_age: Some(17),
                order: 1,
            },
        ],
        sub_periods: vec![
            SubPeriod {
                id: "low".into(),
                name: "Low season".to_owned(),
                start_date: date(7, 1),
                end_date: date(7, 8),
                order: 0,
            },
            SubPeriod {
                id: "high".into(),
                name: "High season".to_owned(),
                start_date: date(7, 8),
                end_date: date(7, 15),
                order: 1,
            },
        ],
        rooms: vec![
            RoomType {
                id: "double".into(),
                name: "Double".to_owned(),
                capacity: 2,
                tariffs: vec![
                    tariff("double", "adult", None, dec!(100)),
                    tariff("double", "adult", Some("high"), dec!(120)),
                    tariff("double", "child", None, dec!(50)),
                ],
            },
            RoomType {
                id: "single".into(),
                name: "Single".to_owned(),
                capacity: 1,
                tariffs: vec![tariff("single", "adult", None, dec!(80))],
            },
        ],
    }
}
