use std::collections::HashMap;

use crate::aggregate::{self, OpponentRecord};
use crate::store::{Match, Outcome, Player, Tournament};

/// All-time career view for one player. Unlike the stats screen this is
/// never tournament-filtered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerCareer {
    /// Matches the player attended, in store (date-descending) order.
    pub played_matches: Vec<Match>,
    pub total_appearances: usize,
    pub weighted_appearances: f64,
    pub total_goals: u32,
}

pub fn player_career(player_id: &str, matches: &[Match], tournaments: &[Tournament]) -> PlayerCareer {
    let played_matches: Vec<Match> = matches
        .iter()
        .filter(|m| m.attended_by(player_id))
        .cloned()
        .collect();

    let weighted_appearances = played_matches
        .iter()
        .map(|m| aggregate::presence_weight(tournaments, &m.tournament_id))
        .sum();

    // Goals are summed over every match, not just the attended ones, so a
    // stored match missing the player from its attendee list still counts.
    let total_goals = matches.iter().map(|m| m.goals_by(player_id)).sum();

    PlayerCareer {
        total_appearances: played_matches.len(),
        weighted_appearances,
        total_goals,
        played_matches,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoachRecord {
    pub coached_matches: Vec<Match>,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    pub goals_for: u32,
    pub goals_against: u32,
    /// Integer percent, "N/A" with zero matches coached.
    pub win_percentage: String,
    /// Presence counts scoped to the coach's matches, descending.
    pub top_by_presence: Vec<(Player, usize)>,
    /// Goal counts scoped to the coach's matches, descending.
    pub top_by_goals: Vec<(Player, u32)>,
}

pub fn coach_record(coach_id: &str, matches: &[Match], players: &[Player]) -> CoachRecord {
    let coached: Vec<Match> = matches
        .iter()
        .filter(|m| m.coach_ids.iter().any(|id| id == coach_id))
        .cloned()
        .collect();

    let mut record = CoachRecord::default();
    for m in &coached {
        record.goals_for += m.result.home;
        record.goals_against += m.result.away;
        match m.result.outcome() {
            Outcome::Win => record.wins += 1,
            Outcome::Draw => record.draws += 1,
            Outcome::Loss => record.losses += 1,
        }
    }
    record.win_percentage = if coached.is_empty() {
        "N/A".to_string()
    } else {
        let pct = (record.wins as f64 / coached.len() as f64 * 100.0).round();
        format!("{pct:.0}%")
    };

    let mut presence: HashMap<&str, usize> = HashMap::new();
    let mut goals: HashMap<&str, u32> = HashMap::new();
    for m in &coached {
        for a in &m.attendees {
            *presence.entry(a.player_id.as_str()).or_insert(0) += 1;
        }
        for s in &m.scorers {
            let Some(player_id) = s.player_id.as_deref() else {
                continue;
            };
            if s.is_own_goal {
                continue;
            }
            *goals.entry(player_id).or_insert(0) += s.goals;
        }
    }

    // Iterating the player collection keeps the stable insertion-order
    // tie-break the full leaderboards use.
    record.top_by_presence = players
        .iter()
        .filter_map(|p| {
            let count = presence.get(p.id.as_str()).copied().unwrap_or(0);
            (count > 0).then(|| (p.clone(), count))
        })
        .collect();
    record.top_by_presence.sort_by(|a, b| b.1.cmp(&a.1));

    record.top_by_goals = players
        .iter()
        .filter_map(|p| {
            let count = goals.get(p.id.as_str()).copied().unwrap_or(0);
            (count > 0).then(|| (p.clone(), count))
        })
        .collect();
    record.top_by_goals.sort_by(|a, b| b.1.cmp(&a.1));

    record.coached_matches = coached;
    record
}

pub fn opponent_detail(matches: &[Match], opponent: &str) -> OpponentRecord {
    aggregate::compute_opponent_stats(matches, opponent)
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerMilestones {
    pub player: Player,
    pub milestones: Vec<String>,
}

const APPEARANCE_MILESTONES: [usize; 5] = [10, 25, 50, 75, 100];
const CAREER_GOAL_MILESTONES: [u32; 3] = [10, 25, 50];

/// Notable per-player events for one match (debuts, braces, round-number
/// career totals), computed against the matches played before it. Feeds the
/// match-report prompt; attendees with nothing notable are omitted.
pub fn match_milestones(
    m: &Match,
    all_matches: &[Match],
    players: &[Player],
) -> Vec<PlayerMilestones> {
    let history: Vec<&Match> = all_matches.iter().filter(|h| h.date < m.date).collect();

    let mut out = Vec::new();
    for attendee in &m.attendees {
        let Some(player) = players.iter().find(|p| p.id == attendee.player_id) else {
            continue;
        };

        let previous_appearances = history
            .iter()
            .filter(|h| h.attended_by(&player.id))
            .count();
        let total_appearances = previous_appearances + 1;

        let previous_goals: u32 = history.iter().map(|h| h.goals_by(&player.id)).sum();
        let goals_in_match = m.goals_by(&player.id);
        let total_goals = previous_goals + goals_in_match;

        let mut milestones = Vec::new();
        if previous_appearances == 0 {
            milestones.push("Debutto".to_string());
        }
        if previous_goals == 0 && goals_in_match > 0 {
            milestones.push("Primo gol in carriera".to_string());
        }
        if goals_in_match == 2 {
            milestones.push("Doppietta".to_string());
        }
        if goals_in_match >= 3 {
            milestones.push("Tripletta".to_string());
        }
        if APPEARANCE_MILESTONES.contains(&total_appearances) {
            milestones.push(format!("{total_appearances}ª presenza"));
        }
        for threshold in CAREER_GOAL_MILESTONES {
            if total_goals >= threshold && previous_goals < threshold {
                milestones.push(format!("Raggiunti {threshold} gol in carriera"));
            }
        }

        if !milestones.is_empty() {
            out.push(PlayerMilestones {
                player: player.clone(),
                milestones,
            });
        }
    }
    out
}
