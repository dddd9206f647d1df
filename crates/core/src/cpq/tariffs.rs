use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::stay::{AgeBracketId, RoomTariff, RoomType, RoomTypeId, SubPeriodId};

/// Column key of the admin pricing grid: the global column or one sub-period.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKey {
    Global,
    SubPeriod(SubPeriodId),
}

impl From<Option<SubPeriodId>> for PeriodKey {
    fn from(value: Option<SubPeriodId>) -> Self {
        value.map_or(Self::Global, Self::SubPeriod)
    }
}

impl PeriodKey {
    pub fn sub_period_id(&self) -> Option<&SubPeriodId> {
        match self {
            Self::Global => None,
            Self::SubPeriod(id) => Some(id),
        }
    }
}

/// Tariffs of one room type grouped by period, then by age bracket.
pub type PricingTable = BTreeMap<PeriodKey, BTreeMap<AgeBracketId, Decimal>>;

/// Resolves the per-occupant, whole-stay price of a room type.
///
/// `None` means no tariff is configured, which is not the same as a price of
/// zero.
#[derive(Clone, Copy, Debug, Default)]
pub struct TariffResolver;

impl TariffResolver {
    /// Exact `(room, bracket, sub_period)` tariff, falling back to the global
    /// tariff of the bracket when a sub-period has no price of its own.
    pub fn price(
        &self,
        room_type: &RoomType,
        bracket: &AgeBracketId,
        sub_period: Option<&SubPeriodId>,
    ) -> Option<Decimal> {
        if let Some(sub_period) = sub_period {
            if let Some(price) = find_tariff(room_type, bracket, Some(sub_period)) {
                return Some(price);
            }
        }
        find_tariff(room_type, bracket, None)
    }

    /// Whether the given sub-periods resolve to more than one distinct price.
    /// A sub-period with no resolvable price counts as its own value.
    pub fn has_variable_pricing(
        &self,
        room_type: &RoomType,
        bracket: &AgeBracketId,
        sub_periods: &[SubPeriodId],
    ) -> bool {
        let distinct: BTreeSet<Option<Decimal>> = sub_periods
            .iter()
            .map(|sub_period| self.price(room_type, bracket, Some(sub_period)))
            .map(|price| price.map(|value| value.normalize()))
            .collect();
        distinct.len() > 1
    }

    pub fn pricing_by_sub_period(&self, room_type: &RoomType) -> PricingTable {
        let mut table = PricingTable::new();
        for tariff in &room_type.tariffs {
            table
                .entry(PeriodKey::from(tariff.sub_period_id.clone()))
                .or_default()
                .insert(tariff.age_bracket_id.clone(), tariff.price);
        }
        table
    }
}

/// Flattens an admin pricing grid back into tariff rows.
pub fn tariffs_from_pricing_table(
    room_type_id: &RoomTypeId,
    table: &PricingTable,
) -> Vec<RoomTariff> {
    table
        .iter()
        .flat_map(|(period, prices)| {
            prices.iter().map(move |(bracket, price)| RoomTariff {
                room_type_id: room_type_id.clone(),
                age_bracket_id: bracket.clone(),
                sub_period_id: period.sub_period_id().cloned(),
                price: *price,
            })
        })
        .collect()
}

fn find_tariff(
    room_type: &RoomType,
    bracket: &AgeBracketId,
    sub_period: Option<&SubPeriodId>,
) -> Option<Decimal> {
    room_type
        .tariffs
        .iter()
        .find(|tariff| {
            &tariff.age_bracket_id == bracket && tariff.sub_period_id.as_ref() == sub_period
        })
        .map(|tariff| tariff.price)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::{tariffs_from_pricing_table, PeriodKey, TariffResolver};
    use crate::domain::stay::{AgeBracketId, RoomTariff, RoomType, RoomTypeId, SubPeriodId};

    fn tariff(bracket: &str, period: Option<&str>, price: Decimal) -> RoomTariff {
        RoomTariff {
            room_type_id: RoomTypeId("double".to_owned()),
            age_bracket_id: AgeBracketId(bracket.to_owned()),
            sub_period_id: period.map(|id| SubPeriodId(id.to_owned())),
            price,
        }
    }

    fn double(tariffs: Vec<RoomTariff>) -> RoomType {
        RoomType {
            id: RoomTypeId("double".to_owned()),
            name: "Double".to_owned(),
            capacity: 2,
            tariffs,
        }
    }

    fn adult() -> AgeBracketId {
        AgeBracketId("adult".to_owned())
    }

    #[test]
    fn exact_sub_period_tariff_wins_over_global() {
        let room = double(vec![
            tariff("adult", None, dec!(100)),
            tariff("adult", Some("high"), dec!(140)),
        ]);
        let resolver = TariffResolver;
        let high = SubPeriodId("high".to_owned());
        let low = SubPeriodId("low".to_owned());

        assert_eq!(resolver.price(&room, &adult(), Some(&high)), Some(dec!(140)));
        assert_eq!(resolver.price(&room, &adult(), Some(&low)), Some(dec!(100)));
        assert_eq!(resolver.price(&room, &adult(), None), Some(dec!(100)));
    }

    #[test]
    fn missing_tariff_is_none_and_free_tariff_is_zero() {
        let room = double(vec![tariff("infant", None, Decimal::ZERO)]);
        let resolver = TariffResolver;

        assert_eq!(resolver.price(&room, &adult(), None), None);
        let infant = AgeBracketId("infant".to_owned());
        assert_eq!(resolver.price(&room, &infant, None), Some(Decimal::ZERO));
    }

    #[test]
    fn sub_period_only_tariff_does_not_leak_into_global() {
        let room = double(vec![tariff("adult", Some("high"), dec!(140))]);
        let resolver = TariffResolver;

        assert_eq!(resolver.price(&room, &adult(), None), None);
        assert_eq!(resolver.price(&room, &adult(), Some(&SubPeriodId("low".to_owned()))), None);
    }

    #[test]
    fn variable_pricing_compares_resolved_values() {
        let periods = [SubPeriodId("low".to_owned()), SubPeriodId("high".to_owned())];
        let resolver = TariffResolver;

        let flat = double(vec![
            tariff("adult", None, dec!(100)),
            tariff("adult", Some("high"), dec!(100.00)),
        ]);
        assert!(!resolver.has_variable_pricing(&flat, &adult(), &periods));

        let seasonal = double(vec![
            tariff("adult", Some("low"), dec!(100)),
            tariff("adult", Some("high"), dec!(120)),
        ]);
        assert!(resolver.has_variable_pricing(&seasonal, &adult(), &periods));

        let partial = double(vec![tariff("adult", Some("high"), dec!(120))]);
        assert!(resolver.has_variable_pricing(&partial, &adult(), &periods));
        assert!(!resolver.has_variable_pricing(&partial, &adult(), &periods[1..]));
    }

    #[test]
    fn pricing_table_groups_by_period_and_flattens_back() {
        let room = double(vec![
            tariff("adult", None, dec!(100)),
            tariff("child", None, dec!(50)),
            tariff("adult", Some("high"), dec!(140)),
        ]);
        let table = TariffResolver.pricing_by_sub_period(&room);

        assert_eq!(table.len(), 2);
        assert_eq!(table[&PeriodKey::Global].len(), 2);
        assert_eq!(
            table[&PeriodKey::SubPeriod(SubPeriodId("high".to_owned()))][&adult()],
            dec!(140)
        );

        let flattened = tariffs_from_pricing_table(&room.id, &table);
        assert_eq!(flattened.len(), room.tariffs.len());
        assert!(room.tariffs.iter().all(|tariff| flattened.contains(tariff)));
    }
}
