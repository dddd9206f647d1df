//! Averaged pricing for configurations that have no room assignments yet.
//!
//! This is an approximation: every participant is charged the mean of the
//! global tariffs of the candidate room types, whatever room they end up in.
//! The exact price always comes from [`crate::cpq::pricing::PriceAggregator`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cpq::catalog::Catalog;
use crate::cpq::tariffs::TariffResolver;
use crate::domain::quote::QuoteConfiguration;
use crate::domain::stay::{AgeBracketId, RoomType};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateLine {
    pub age_bracket_id: AgeBracketId,
    pub participants: u32,
    pub amount: Option<Decimal>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceEstimate {
    pub total: Decimal,
    pub lines: Vec<EstimateLine>,
    /// Brackets with participants but no global tariff in any candidate room.
    pub unpriced: Vec<AgeBracketId>,
}

/// Mean global price of `bracket` over `room_types`, times `participant_count`.
///
/// Room types without a global tariff for the bracket are left out of the
/// mean. `None` when no candidate prices the bracket at all.
pub fn average_price_across_room_types(
    resolver: &TariffResolver,
    bracket: &AgeBracketId,
    room_types: &[&RoomType],
    participant_count: u32,
) -> Option<Decimal> {
    let prices: Vec<Decimal> =
        room_types.iter().filter_map(|room| resolver.price(room, bracket, None)).collect();
    if prices.is_empty() {
        return None;
    }

    let mean = prices.iter().sum::<Decimal>() / Decimal::from(prices.len());
    Some(mean * Decimal::from(participant_count))
}

/// Averaged estimate over every allocated bracket. Candidates are the
/// selected room types, or the whole catalog before anything is selected.
pub fn estimated_total(catalog: Catalog<'_>, configuration: &QuoteConfiguration) -> PriceEstimate {
    let resolver = TariffResolver;
    let rooms = &catalog.snapshot().rooms;
    let selected: Vec<&RoomType> =
        rooms.iter().filter(|room| configuration.quantity(&room.id) > 0).collect();
    let candidates = if selected.is_empty() { rooms.iter().collect() } else { selected };

    let mut estimate =
        PriceEstimate { total: Decimal::ZERO, lines: Vec::new(), unpriced: Vec::new() };
    for bracket in catalog.snapshot().ordered_age_brackets() {
        let participants = configuration.allocation(&bracket.id);
        if participants == 0 {
            continue;
        }

        let amount =
            average_price_across_room_types(&resolver, &bracket.id, &candidates, participants);
        match amount {
            Some(amount) => estimate.total += amount,
            None => estimate.unpriced.push(bracket.id.clone()),
        }
        estimate.lines.push(EstimateLine {
            age_bracket_id: bracket.id.clone(),
            participants,
            amount,
        });
    }

    estimate
}
