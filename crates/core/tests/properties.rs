use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::json;

use stayquote_core::cpq::pricing::PricingEngine;
use stayquote_core::cpq::tariffs::TariffResolver;
use stayquote_core::{
    AgeBracketId, EngineConfig, QuoteAction, QuoteConfiguration, QuoteEngine, RoomInstanceId,
    StaySnapshot, SubPeriodId,
};

const BRACKETS: [&str; 3] = ["adult", "teen", "child"];
const ROOM_TYPES: [&str; 3] = ["single", "double", "family"];

fn snapshot() -> StaySnapshot {
    serde_json::from_value(json!({
        "id": "lakeside",
        "startDate": "2026-08-01",
        "endDate": "2026-08-21",
        "ageBrackets": [
            { "id": "adult", "label": "Adult", "order": 0 },
            { "id": "teen", "label": "Teen", "order": 1 },
            { "id": "child", "label": "Child", "order": 2 }
        ],
        "subPeriods": [
            { "id": "first", "name": "First", "startDate": "2026-08-01", "endDate": "2026-08-11" },
            { "id": "second", "name": "Second", "startDate": "2026-08-11", "endDate": "2026-08-21" }
        ],
        "rooms": [
            { "id": "single", "name": "Single", "capacity": 1, "tariffs": [
                { "roomTypeId": "single", "ageBracketId": "adult", "price": 90 }
            ] },
            { "id": "double", "name": "Double", "capacity": 2, "tariffs": [
                { "roomTypeId": "double", "ageBracketId": "adult", "price": 70 },
                {
                    "roomTypeId": "double",
                    "ageBracketId": "adult",
                    "subPeriodId": "second",
                    "price": 85
                },
                { "roomTypeId": "double", "ageBracketId": "teen", "price": 50 }
            ] },
            { "id": "family", "name": "Family", "capacity": 4, "tariffs": [
                { "roomTypeId": "family", "ageBracketId": "adult", "price": 60 },
                { "roomTypeId": "family", "ageBracketId": "child", "price": 25 }
            ] }
        ]
    }))
    .expect("valid snapshot json")
}

fn action() -> impl Strategy<Value = QuoteAction> {
    prop_oneof![
        (0..BRACKETS.len(), -2i64..8).prop_map(|(bracket, count)| {
            QuoteAction::SetParticipants { age_bracket_id: BRACKETS[bracket].into(), count }
        }),
        (0..ROOM_TYPES.len(), -1i64..4).prop_map(|(room, quantity)| {
            QuoteAction::SetRoomQuantity { room_type_id: ROOM_TYPES[room].into(), quantity }
        }),
        (0..ROOM_TYPES.len(), 0u32..3, 0..BRACKETS.len(), -3i64..5).prop_map(
            |(room, index, bracket, delta)| QuoteAction::Assign {
                instance: RoomInstanceId::new(ROOM_TYPES[room].into(), index),
                age_bracket_id: BRACKETS[bracket].into(),
                delta,
            }
        ),
        Just(QuoteAction::AutoAssign),
    ]
}

/// Applies actions, skipping the ones addressing instances not selected yet.
fn replay(engine: &QuoteEngine<'_>, actions: &[QuoteAction]) -> QuoteConfiguration {
    actions.iter().fold(engine.start(), |configuration, action| {
        engine.apply(&configuration, action).unwrap_or(configuration)
    })
}

fn assigned_instance(configuration: &QuoteConfiguration) -> Option<RoomInstanceId> {
    configuration.assignments().first().map(|assignment| assignment.instance.clone())
}

proptest! {
    #[test]
    fn occupancy_never_exceeds_capacity(actions in prop::collection::vec(action(), 0..40)) {
        let snapshot = snapshot();
        let engine = QuoteEngine::new(&snapshot, EngineConfig::default());
        let configuration = replay(&engine, &actions);

        for assignment in configuration.assignments() {
            let capacity = engine
                .catalog()
                .room_type(&assignment.instance.room_type_id)
                .map(|room| room.capacity)
                .unwrap_or(0);
            prop_assert!(assignment.occupancy() <= capacity);
        }
    }

    #[test]
    fn remaining_plus_assigned_equals_allocation(
        actions in prop::collection::vec(action(), 0..40)
    ) {
        let snapshot = snapshot();
        let engine = QuoteEngine::new(&snapshot, EngineConfig::default());
        let configuration = replay(&engine, &actions);
        let allocator = engine.allocator();

        for bracket in BRACKETS {
            let bracket = AgeBracketId::from(bracket);
            let remaining = allocator.remaining(&configuration, &bracket);
            prop_assert!(remaining >= 0);
            prop_assert_eq!(
                remaining + i64::from(configuration.assigned(&bracket)),
                i64::from(configuration.allocation(&bracket))
            );
        }
    }

    #[test]
    fn unclamped_assign_round_trips(
        actions in prop::collection::vec(action(), 0..30),
        bracket in 0..BRACKETS.len()
    ) {
        let snapshot = snapshot();
        let engine = QuoteEngine::new(&snapshot, EngineConfig::default());
        let configuration = replay(&engine, &actions);
        let bracket = AgeBracketId::from(BRACKETS[bracket]);
        let Some(instance) = assigned_instance(&configuration) else {
            return Ok(());
        };

        let mut forward = configuration.clone();
        let applied = engine
            .assignments()
            .assign(&mut forward, &instance, &bracket, 1)
            .expect("selected instance");
        if applied != 1 {
            return Ok(());
        }

        let mut back = forward.clone();
        engine.assignments().assign(&mut back, &instance, &bracket, -1).expect("selected instance");
        prop_assert_eq!(back, configuration);
    }

    #[test]
    fn global_tariff_resolves_for_every_sub_period(price in 0i64..10_000) {
        let mut snapshot = snapshot();
        let family = &mut snapshot.rooms[2];
        family.tariffs.retain(|tariff| tariff.age_bracket_id.0 != "child");
        family.tariffs.push(serde_json::from_value(json!({
            "roomTypeId": "family",
            "ageBracketId": "child",
            "price": price
        })).expect("tariff json"));

        let price = Decimal::from(price);
        let child = AgeBracketId::from("child");
        let first = SubPeriodId::from("first");
        let second = SubPeriodId::from("second");
        for sub_period in [None, Some(&first), Some(&second)] {
            prop_assert_eq!(
                TariffResolver.price(&snapshot.rooms[2], &child, sub_period),
                Some(price)
            );
        }
    }

    #[test]
    fn total_price_is_idempotent(actions in prop::collection::vec(action(), 0..40)) {
        let snapshot = snapshot();
        let engine = QuoteEngine::new(&snapshot, EngineConfig::default());
        let configuration = replay(&engine, &actions);

        let first = engine.pricing().total_price(&configuration).expect("priced");
        let second = engine.pricing().total_price(&configuration).expect("priced");
        prop_assert_eq!(first, second);
    }

    #[test]
    fn reconcile_keeps_consistent_configurations(
        actions in prop::collection::vec(action(), 0..40)
    ) {
        let snapshot = snapshot();
        let engine = QuoteEngine::new(&snapshot, EngineConfig::default());
        let configuration = replay(&engine, &actions);

        prop_assert_eq!(engine.reconcile(&configuration), configuration);
    }
}
