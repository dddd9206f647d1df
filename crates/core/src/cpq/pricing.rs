use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cpq::assignment::RoomAssignmentEngine;
use crate::cpq::catalog::Catalog;
use crate::cpq::tariffs::TariffResolver;
use crate::domain::quote::{QuoteConfiguration, RoomInstanceId};
use crate::domain::stay::{AgeBracketId, RoomTypeId, SubPeriodId};
use crate::errors::DomainError;

/// One `count × tariff` term of the exact total.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceLine {
    pub instance: RoomInstanceId,
    pub age_bracket_id: AgeBracketId,
    pub sub_period_id: Option<SubPeriodId>,
    pub count: u32,
    pub unit_price: Option<Decimal>,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingTariff {
    pub room_type_id: RoomTypeId,
    pub age_bracket_id: AgeBracketId,
    pub sub_period_id: Option<SubPeriodId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTraceStep {
    pub stage: String,
    pub detail: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub total: Decimal,
    /// Some occupant had no tariff; the quote needs manual pricing.
    pub has_undefined_pricing: bool,
    pub lines: Vec<PriceLine>,
    pub missing: Vec<MissingTariff>,
    pub trace: Vec<PricingTraceStep>,
}

pub trait PricingEngine: Send + Sync {
    fn total_price(&self, configuration: &QuoteConfiguration)
        -> Result<PriceBreakdown, DomainError>;
}

/// Exact price of a configuration from its room assignments.
///
/// Tariffs are per occupant for the whole stay, so no night count is applied.
#[derive(Clone, Copy, Debug)]
pub struct PriceAggregator<'a> {
    catalog: Catalog<'a>,
    resolver: TariffResolver,
}

impl<'a> PriceAggregator<'a> {
    pub fn new(catalog: Catalog<'a>) -> Self {
        Self { catalog, resolver: TariffResolver }
    }
}

impl PricingEngine for PriceAggregator<'_> {
    fn total_price(
        &self,
        configuration: &QuoteConfiguration,
    ) -> Result<PriceBreakdown, DomainError> {
        let assignments = RoomAssignmentEngine::new(self.catalog);
        let mut lines = Vec::new();
        let mut trace = Vec::new();
        let mut missing: Vec<MissingTariff> = Vec::new();
        let mut total = Decimal::ZERO;

        for assignment in configuration.assignments() {
            let room = self.catalog.room_type(&assignment.instance.room_type_id)?;
            let sub_period = assignments.active_sub_period(configuration, &assignment.instance);

            for (bracket, count) in &assignment.occupants {
                if *count == 0 {
                    continue;
                }
                let unit_price = self.resolver.price(room, bracket, sub_period);
                let amount =
                    unit_price.map_or(Decimal::ZERO, |price| price * Decimal::from(*count));
                total += amount;

                if unit_price.is_none() {
                    let gap = MissingTariff {
                        room_type_id: room.id.clone(),
                        age_bracket_id: bracket.clone(),
                        sub_period_id: sub_period.cloned(),
                    };
                    if !missing.contains(&gap) {
                        missing.push(gap);
                    }
                }

                trace.push(PricingTraceStep {
                    stage: "occupants".to_string(),
                    detail: match (unit_price, sub_period) {
                        (Some(price), Some(period)) => {
                            format!("{} {bracket} x{count} @ {price} ({period})", room.id)
                        }
                        (Some(price), None) => format!("{} {bracket} x{count} @ {price}", room.id),
                        (None, _) => format!("{} {bracket} x{count} @ undefined", room.id),
                    },
                    amount,
                });
                lines.push(PriceLine {
                    instance: assignment.instance.clone(),
                    age_bracket_id: bracket.clone(),
                    sub_period_id: sub_period.cloned(),
                    count: *count,
                    unit_price,
                    amount,
                });
            }
        }

        missing.sort();
        trace.push(PricingTraceStep {
            stage: "total".to_string(),
            detail: "sum(count * tariff)".to_string(),
            amount: total,
        });
        if !missing.is_empty() {
            warn!(
                event_name = "cpq.pricing.undefined_tariff",
                stay_id = %configuration.stay_id,
                missing = missing.len(),
                "configuration contains occupants without a configured tariff"
            );
        }

        let has_undefined_pricing = !missing.is_empty();
        Ok(PriceBreakdown { total, has_undefined_pricing, lines, missing, trace })
    }
}
