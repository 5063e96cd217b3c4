use std::cmp::Ordering;
use std::collections::HashMap;

use crate::store::{Match, Outcome, Player, Tournament};

/// Nominal full-match duration used to turn presence weights into minutes.
pub const NOMINAL_MATCH_MINUTES: f64 = 45.0;

/// Tournament filter for the stats screen; `None` means all matches.
pub fn filter_by_tournament(matches: &[Match], tournament_id: Option<&str>) -> Vec<Match> {
    match tournament_id {
        None => matches.to_vec(),
        Some(id) => matches
            .iter()
            .filter(|m| m.tournament_id == id)
            .cloned()
            .collect(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub matches: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    pub goals_for: u32,
    pub goals_against: u32,
    pub clean_sheets: usize,
    pub minutes_played: f64,
}

pub fn compute_summary(matches: &[Match], tournaments: &[Tournament]) -> Summary {
    let mut summary = Summary {
        matches: matches.len(),
        ..Summary::default()
    };
    for m in matches {
        summary.goals_for += m.result.home;
        summary.goals_against += m.result.away;
        match m.result.outcome() {
            Outcome::Win => summary.wins += 1,
            Outcome::Draw => summary.draws += 1,
            Outcome::Loss => summary.losses += 1,
        }
        if m.result.away == 0 {
            summary.clean_sheets += 1;
        }
        summary.minutes_played +=
            presence_weight(tournaments, &m.tournament_id) * NOMINAL_MATCH_MINUTES;
    }
    summary
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Goals,
    Appearances,
    WeightedAppearances,
    WinRate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub player: Player,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct PlayerTally {
    played: usize,
    wins: usize,
    weighted: f64,
    goals: u32,
}

/// Ranked descending by score, zero-score players excluded. The sort is
/// stable, so equal scores keep the player collection's insertion order.
pub fn compute_leaderboard(
    matches: &[Match],
    players: &[Player],
    tournaments: &[Tournament],
    metric: Metric,
) -> Vec<LeaderboardEntry> {
    let tallies = tally_players(matches, players, tournaments);

    let mut entries: Vec<LeaderboardEntry> = players
        .iter()
        .filter_map(|p| {
            let tally = tallies.get(p.id.as_str()).copied().unwrap_or_default();
            let score = match metric {
                Metric::Goals => tally.goals as f64,
                Metric::Appearances => tally.played as f64,
                Metric::WeightedAppearances => tally.weighted,
                Metric::WinRate => {
                    if tally.played == 0 {
                        return None;
                    }
                    tally.wins as f64 / tally.played as f64 * 100.0
                }
            };
            (score > 0.0).then(|| LeaderboardEntry {
                player: p.clone(),
                score,
            })
        })
        .collect();

    entries.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    entries
}

fn tally_players<'a>(
    matches: &[Match],
    players: &'a [Player],
    tournaments: &[Tournament],
) -> HashMap<&'a str, PlayerTally> {
    let mut tallies: HashMap<&str, PlayerTally> = players
        .iter()
        .map(|p| (p.id.as_str(), PlayerTally::default()))
        .collect();

    for m in matches {
        let weight = presence_weight(tournaments, &m.tournament_id);
        let won = m.result.outcome() == Outcome::Win;
        for a in &m.attendees {
            let Some(tally) = tallies.get_mut(a.player_id.as_str()) else {
                continue;
            };
            tally.played += 1;
            tally.weighted += weight;
            if won {
                tally.wins += 1;
            }
        }
        for s in &m.scorers {
            // Own goals carry no player id and credit nobody.
            let Some(player_id) = s.player_id.as_deref() else {
                continue;
            };
            if s.is_own_goal {
                continue;
            }
            if let Some(tally) = tallies.get_mut(player_id) {
                tally.goals += s.goals;
            }
        }
    }

    tallies
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpponentRecord {
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    pub goals_for: u32,
    pub goals_against: u32,
    /// Matches against this opponent, date descending.
    pub history: Vec<Match>,
}

/// Head-to-head record against one opponent. Correlation is exact
/// case-sensitive string equality on the opponent field.
pub fn compute_opponent_stats(matches: &[Match], opponent: &str) -> OpponentRecord {
    let mut record = OpponentRecord::default();
    let mut history: Vec<Match> = matches
        .iter()
        .filter(|m| m.opponent == opponent)
        .cloned()
        .collect();
    history.sort_by(|a, b| b.date.cmp(&a.date));

    for m in &history {
        record.goals_for += m.result.home;
        record.goals_against += m.result.away;
        match m.result.outcome() {
            Outcome::Win => record.wins += 1,
            Outcome::Draw => record.draws += 1,
            Outcome::Loss => record.losses += 1,
        }
    }
    record.history = history;
    record
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpponentSummary {
    pub name: String,
    pub match_count: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
}

/// Per-opponent tallies over the whole match list, most-faced first.
pub fn opponent_index(matches: &[Match]) -> Vec<OpponentSummary> {
    let mut order: Vec<&str> = Vec::new();
    let mut by_name: HashMap<&str, OpponentSummary> = HashMap::new();

    for m in matches {
        if m.opponent.is_empty() {
            continue;
        }
        let entry = by_name
            .entry(m.opponent.as_str())
            .or_insert_with(|| {
                order.push(m.opponent.as_str());
                OpponentSummary {
                    name: m.opponent.clone(),
                    match_count: 0,
                    wins: 0,
                    draws: 0,
                    losses: 0,
                }
            });
        entry.match_count += 1;
        match m.result.outcome() {
            Outcome::Win => entry.wins += 1,
            Outcome::Draw => entry.draws += 1,
            Outcome::Loss => entry.losses += 1,
        }
    }

    let mut summaries: Vec<OpponentSummary> = order
        .iter()
        .filter_map(|name| by_name.get(name).cloned())
        .collect();
    summaries.sort_by(|a, b| b.match_count.cmp(&a.match_count));
    summaries
}

pub fn presence_weight(tournaments: &[Tournament], tournament_id: &str) -> f64 {
    tournaments
        .iter()
        .find(|t| t.id == tournament_id)
        .map(|t| t.presence_weight)
        .unwrap_or(1.0)
}
