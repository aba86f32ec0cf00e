//! Assembly of the nested progress snapshot from flat relational rows.

use std::collections::{HashMap, HashSet};

use super::aggregate::{glow_count, CardStats};
use crate::models::{
    Capture, Card, CardRow, CardSummary, Countdowns, Mission, MissionData, MissionRow,
    ProgressSnapshot, ProgressSources, Relocation,
};

/// Decorate a card row with the aggregate of its captures.
pub fn build_card(row: CardRow, captures: Vec<Capture>) -> Card {
    let stats = CardStats::from_captures(&captures);
    Card {
        id: row.id,
        user_id: row.user_id,
        aircraft_id: row.aircraft_id,
        tier: stats.tier(),
        cloudiness: stats.cloudiness,
        coverage: stats.coverage,
        glow: stats.glow,
        glow_count: glow_count(&captures),
        xp: stats.xp,
        captures,
    }
}

impl Card {
    pub fn summary(&self) -> CardSummary {
        CardSummary {
            id: self.id.clone(),
            model_id: self.aircraft_id.clone(),
            aircraft_id: self.aircraft_id.clone(),
            coverage: self.coverage,
            cloudiness: self.cloudiness,
            xp: self.xp,
            glow: self.glow,
            tier: self.tier,
            glow_count: self.glow_count,
        }
    }
}

/// Group a flat capture list under its cards, keeping card order.
pub fn group_cards(cards: Vec<CardRow>, captures: Vec<Capture>) -> Vec<Card> {
    let mut by_card: HashMap<String, Vec<Capture>> = HashMap::new();
    for capture in captures {
        by_card.entry(capture.card_id.clone()).or_default().push(capture);
    }

    cards
        .into_iter()
        .map(|row| {
            let captures = by_card.remove(&row.id).unwrap_or_default();
            build_card(row, captures)
        })
        .collect()
}

/// Attach mission entries to their missions. Entries of unknown missions are dropped.
pub fn group_missions(missions: Vec<MissionRow>, data: Vec<MissionData>) -> Vec<Mission> {
    let mut by_mission: HashMap<i64, Vec<MissionData>> = HashMap::new();
    for entry in data {
        by_mission.entry(entry.mission_id).or_default().push(entry);
    }

    missions
        .into_iter()
        .map(|row| {
            let mut data = by_mission.remove(&row.id).unwrap_or_default();
            data.sort_by_key(|d| d.id);
            Mission {
                id: row.id,
                mission_type: row.mission_type,
                unclaimed: row.unclaimed,
                unfinished: row.unfinished,
                data,
            }
        })
        .collect()
}

/// Build the full snapshot. Total XP and the model count are always
/// recomputed from captures, never taken from the stored counters.
pub fn assemble(sources: ProgressSources, now_ms: i64) -> ProgressSnapshot {
    let ProgressSources {
        mut profile,
        cards,
        captures,
        items,
        achievements,
        missions,
        mission_data,
        friend_ids,
        unlocked_model_ids,
        battle_deck,
    } = sources;

    let cards = group_cards(cards, captures);
    let missions = group_missions(missions, mission_data);

    profile.xp = cards.iter().fold(0i64, |total, c| total.saturating_add(c.xp));
    profile.num_aircraft_models = cards.len() as i64;

    let countdowns = Countdowns::for_profile(&profile, now_ms);
    let relocation = Relocation {
        airport_id: profile.relocation_airport_id,
        airport: profile.relocation_airport,
        timestamp: profile.relocation_timestamp,
    };

    ProgressSnapshot {
        profile,
        cards,
        items,
        achievements,
        missions,
        friend_ids,
        unlocked_model_ids,
        battle_deck,
        relocation,
        countdowns,
    }
}

/// Extend the unlocked model list with the aircraft of every owned card.
pub fn include_owned_models(snapshot: &mut ProgressSnapshot) {
    let mut seen: HashSet<String> = snapshot.unlocked_model_ids.iter().cloned().collect();
    for card in &snapshot.cards {
        if seen.insert(card.aircraft_id.clone()) {
            snapshot.unlocked_model_ids.push(card.aircraft_id.clone());
        }
    }
}

/// Registrations of every capture in the snapshot.
pub fn captured_regs(snapshot: &ProgressSnapshot) -> Vec<String> {
    snapshot
        .cards
        .iter()
        .flat_map(|card| card.captures.iter().map(|c| c.reg.clone()))
        .collect()
}
