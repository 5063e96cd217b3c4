use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Result, bail};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub primary_color: String,
    pub secondary_color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub jersey_number: Option<u8>,
    pub team_id: String,
}

impl Player {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coach {
    pub id: String,
    pub name: String,
    pub team_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tournament {
    pub id: String,
    pub name: String,
    /// Multiplier applied to appearances and minutes for matches in this
    /// tournament (short-format games count as a fraction of a presence).
    pub presence_weight: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AttendeeRole {
    Starter,
    Sub,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attendee {
    pub player_id: String,
    pub role: AttendeeRole,
}

/// Either a roster player with a goal count, or an opponent own goal
/// (no player reference) credited to our score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scorer {
    #[serde(default)]
    pub player_id: Option<String>,
    pub goals: u32,
    #[serde(default)]
    pub is_own_goal: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchResult {
    pub home: u32,
    pub away: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

impl MatchResult {
    pub fn outcome(&self) -> Outcome {
        if self.home > self.away {
            Outcome::Win
        } else if self.home < self.away {
            Outcome::Loss
        } else {
            Outcome::Draw
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Match {
    pub id: String,
    pub date: NaiveDateTime,
    /// Free text, not a foreign key. Matches against the same opponent are
    /// correlated by exact (case-sensitive) string equality.
    pub opponent: String,
    pub tournament_id: String,
    pub result: MatchResult,
    #[serde(default)]
    pub coach_ids: Vec<String>,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    #[serde(default)]
    pub scorers: Vec<Scorer>,
}

impl Match {
    pub fn attended_by(&self, player_id: &str) -> bool {
        self.attendees.iter().any(|a| a.player_id == player_id)
    }

    /// Goals credited to `player_id` in this match (own goals carry no
    /// player reference and never count here).
    pub fn goals_by(&self, player_id: &str) -> u32 {
        self.scorers
            .iter()
            .filter(|s| !s.is_own_goal && s.player_id.as_deref() == Some(player_id))
            .map(|s| s.goals)
            .sum()
    }
}

/// A cached AI insight, persisted so the dashboard can show the last
/// generated batch without re-calling the collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Insight {
    pub title: String,
    pub description: String,
    pub emoji: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchReport {
    pub title: String,
    pub content: String,
}

/// Normalized in-memory collections. `Vec`s keep insertion order, which the
/// leaderboard tie-break depends on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityStore {
    pub teams: Vec<Team>,
    pub players: Vec<Player>,
    pub coaches: Vec<Coach>,
    pub tournaments: Vec<Tournament>,
    pub matches: Vec<Match>,
    #[serde(default)]
    pub active_team_id: Option<String>,
    #[serde(default)]
    pub cached_insights: Vec<Insight>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_active_team(&mut self, team_id: Option<String>) {
        self.active_team_id = team_id;
    }

    pub fn add_team(&mut self, name: &str, primary_color: &str, secondary_color: &str) -> Team {
        let team = Team {
            id: next_id(),
            name: name.to_string(),
            primary_color: primary_color.to_string(),
            secondary_color: secondary_color.to_string(),
        };
        self.teams.push(team.clone());
        team
    }

    pub fn update_team(&mut self, updated: Team) {
        replace_by_id(&mut self.teams, updated, |t| &t.id);
    }

    pub fn add_player(
        &mut self,
        first_name: &str,
        last_name: &str,
        jersey_number: Option<u8>,
    ) -> Result<Player> {
        let Some(team_id) = self.active_team_id.clone() else {
            bail!("no active team selected");
        };
        let player = Player {
            id: next_id(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            jersey_number,
            team_id,
        };
        self.players.push(player.clone());
        Ok(player)
    }

    pub fn update_player(&mut self, updated: Player) {
        replace_by_id(&mut self.players, updated, |p| &p.id);
    }

    /// Removes the player and strips its id from every match's attendees and
    /// scorers. The matches themselves are kept.
    pub fn delete_player(&mut self, player_id: &str) {
        self.players.retain(|p| p.id != player_id);
        for m in &mut self.matches {
            m.attendees.retain(|a| a.player_id != player_id);
            m.scorers
                .retain(|s| s.player_id.as_deref() != Some(player_id));
        }
    }

    pub fn add_coach(&mut self, name: &str) -> Result<Coach> {
        let Some(team_id) = self.active_team_id.clone() else {
            bail!("no active team selected");
        };
        let coach = Coach {
            id: next_id(),
            name: name.to_string(),
            team_id,
        };
        self.coaches.push(coach.clone());
        Ok(coach)
    }

    pub fn update_coach(&mut self, updated: Coach) {
        replace_by_id(&mut self.coaches, updated, |c| &c.id);
    }

    pub fn delete_coach(&mut self, coach_id: &str) {
        self.coaches.retain(|c| c.id != coach_id);
        for m in &mut self.matches {
            m.coach_ids.retain(|id| id != coach_id);
        }
    }

    pub fn add_tournament(&mut self, name: &str, presence_weight: f64) -> Result<Tournament> {
        if !(presence_weight > 0.0) {
            bail!("presence weight must be positive, got {presence_weight}");
        }
        let tournament = Tournament {
            id: next_id(),
            name: name.to_string(),
            presence_weight,
        };
        self.tournaments.push(tournament.clone());
        Ok(tournament)
    }

    pub fn update_tournament(&mut self, updated: Tournament) {
        replace_by_id(&mut self.tournaments, updated, |t| &t.id);
    }

    /// No cascade: matches keep the dangling tournament reference, and
    /// weight lookups fall back to 1.0.
    pub fn delete_tournament(&mut self, tournament_id: &str) {
        self.tournaments.retain(|t| t.id != tournament_id);
    }

    pub fn add_match(&mut self, fields: MatchFields) -> Match {
        let m = Match {
            id: next_id(),
            date: fields.date,
            opponent: fields.opponent,
            tournament_id: fields.tournament_id,
            result: fields.result,
            coach_ids: fields.coach_ids,
            attendees: fields.attendees,
            scorers: fields.scorers,
        };
        self.matches.push(m.clone());
        self.sort_matches();
        m
    }

    pub fn update_match(&mut self, updated: Match) {
        replace_by_id(&mut self.matches, updated, |m| &m.id);
        self.sort_matches();
    }

    pub fn delete_match(&mut self, match_id: &str) {
        self.matches.retain(|m| m.id != match_id);
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn coach(&self, id: &str) -> Option<&Coach> {
        self.coaches.iter().find(|c| c.id == id)
    }

    pub fn tournament(&self, id: &str) -> Option<&Tournament> {
        self.tournaments.iter().find(|t| t.id == id)
    }

    pub fn tournament_by_name(&self, name: &str) -> Option<&Tournament> {
        self.tournaments
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    // Date-descending listing is a presentation convention, re-applied on
    // every mutation rather than assumed of loaded data.
    fn sort_matches(&mut self) {
        self.matches.sort_by(|a, b| b.date.cmp(&a.date));
    }
}

/// New-match payload; the store assigns the id.
#[derive(Debug, Clone)]
pub struct MatchFields {
    pub date: NaiveDateTime,
    pub opponent: String,
    pub tournament_id: String,
    pub result: MatchResult,
    pub coach_ids: Vec<String>,
    pub attendees: Vec<Attendee>,
    pub scorers: Vec<Scorer>,
}

fn replace_by_id<T, F>(items: &mut [T], updated: T, id_of: F)
where
    F: Fn(&T) -> &String,
{
    let target = id_of(&updated).clone();
    if let Some(slot) = items.iter_mut().find(|item| id_of(item) == &target) {
        *slot = updated;
    }
}

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Millis timestamp plus a process-local counter, so two adds in the same
/// millisecond cannot collide.
fn next_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let n = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{millis}-{n}")
}
