use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::store::{
    Attendee, AttendeeRole, Coach, MatchFields, MatchResult, Player, Scorer, Tournament,
};

/// One match as extracted from free text. Every field is optional: the
/// extractor omits whatever it could not read.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchCandidate {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub tournament_name: Option<String>,
    #[serde(default)]
    pub opponent_name: Option<String>,
    #[serde(default)]
    pub home_score: Option<u32>,
    #[serde(default)]
    pub away_score: Option<u32>,
    /// Player surnames.
    #[serde(default)]
    pub attendees: Vec<String>,
    #[serde(default)]
    pub scorers: Vec<CandidateScorer>,
    #[serde(default)]
    pub coach_names: Vec<String>,
    #[serde(default)]
    pub parse_errors: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CandidateScorer {
    #[serde(default)]
    pub last_name: Option<String>,
    pub goals: u32,
    #[serde(default)]
    pub is_own_goal: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub status: Status,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedScorer {
    pub player: Option<Player>,
    pub goals: u32,
    pub is_own_goal: bool,
}

/// Fully resolved candidate, ready to commit.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedMatch {
    pub date: NaiveDateTime,
    pub tournament: Tournament,
    pub opponent: String,
    pub home_score: u32,
    pub away_score: u32,
    pub coaches: Vec<Coach>,
    pub attendees: Vec<Player>,
    pub scorers: Vec<ValidatedScorer>,
}

impl ValidatedMatch {
    /// Text-imported attendees all get the starter role; the source format
    /// has no starter/sub distinction.
    pub fn into_match_fields(self) -> MatchFields {
        MatchFields {
            date: self.date,
            opponent: self.opponent,
            tournament_id: self.tournament.id,
            result: MatchResult {
                home: self.home_score,
                away: self.away_score,
            },
            coach_ids: self.coaches.into_iter().map(|c| c.id).collect(),
            attendees: self
                .attendees
                .into_iter()
                .map(|p| Attendee {
                    player_id: p.id,
                    role: AttendeeRole::Starter,
                })
                .collect(),
            scorers: self
                .scorers
                .into_iter()
                .map(|s| Scorer {
                    player_id: s.player.map(|p| p.id),
                    goals: s.goals,
                    is_own_goal: s.is_own_goal,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    pub has_errors: bool,
    pub messages: Vec<Diagnostic>,
    /// Present iff `has_errors` is false.
    pub validated: Option<ValidatedMatch>,
}

/// Single-shot validation pipeline: name resolution against the known
/// entities, then cross-field consistency. Never mutates anything; the
/// caller decides what to commit.
pub fn validate_candidate(
    candidate: &MatchCandidate,
    players: &[Player],
    tournaments: &[Tournament],
    coaches: &[Coach],
) -> ValidationOutcome {
    let mut messages: Vec<Diagnostic> = Vec::new();
    let mut has_errors = false;

    for err in &candidate.parse_errors {
        push(&mut messages, Status::Warning, err.clone());
    }

    // Stage 1: date.
    let date = candidate.date.as_deref().and_then(parse_candidate_date);
    match date {
        Some(d) => push(
            &mut messages,
            Status::Success,
            format!("Data: {}", d.format("%d/%m/%Y")),
        ),
        None => {
            has_errors = true;
            push(
                &mut messages,
                Status::Error,
                "Data non trovata nel testo.".to_string(),
            );
        }
    }

    // Stage 2: tournament, case-insensitive exact name match.
    let tournament = match candidate.tournament_name.as_deref() {
        None => {
            has_errors = true;
            push(
                &mut messages,
                Status::Error,
                "Nome torneo non trovato nel testo.".to_string(),
            );
            None
        }
        Some(name) => match tournaments.iter().find(|t| t.name.eq_ignore_ascii_case(name)) {
            Some(t) => {
                push(&mut messages, Status::Success, format!("Torneo: {}", t.name));
                Some(t.clone())
            }
            None => {
                has_errors = true;
                push(
                    &mut messages,
                    Status::Error,
                    format!("Torneo '{name}' non trovato. Aggiungilo da \"Gestisci Tornei\"."),
                );
                None
            }
        },
    };

    // Stage 3: result triple.
    let result = match (
        candidate.opponent_name.as_deref(),
        candidate.home_score,
        candidate.away_score,
    ) {
        (Some(opponent), Some(home), Some(away)) => {
            push(
                &mut messages,
                Status::Success,
                format!("Risultato: {home} - {away} vs {opponent}"),
            );
            Some((opponent.to_string(), home, away))
        }
        _ => {
            has_errors = true;
            push(
                &mut messages,
                Status::Error,
                "Risultato o avversario non trovato.".to_string(),
            );
            None
        }
    };

    // Stage 4: coaches.
    let mut resolved_coaches: Vec<Coach> = Vec::new();
    for name in &candidate.coach_names {
        match coaches.iter().find(|c| c.name.eq_ignore_ascii_case(name)) {
            Some(c) => resolved_coaches.push(c.clone()),
            None => {
                has_errors = true;
                push(
                    &mut messages,
                    Status::Error,
                    format!("Mister '{name}' non trovato."),
                );
            }
        }
    }
    if !candidate.coach_names.is_empty() && resolved_coaches.len() == candidate.coach_names.len() {
        let names: Vec<&str> = resolved_coaches.iter().map(|c| c.name.as_str()).collect();
        push(
            &mut messages,
            Status::Success,
            format!("Mister presenti: {}", names.join(", ")),
        );
    }

    // Stage 5: attendees by surname. A match with nobody recorded present
    // is itself invalid.
    let mut resolved_attendees: Vec<Player> = Vec::new();
    for surname in &candidate.attendees {
        match find_by_last_name(players, surname) {
            Some(p) => resolved_attendees.push(p.clone()),
            None => {
                has_errors = true;
                push(
                    &mut messages,
                    Status::Error,
                    format!("Giocatore '{surname}' non trovato."),
                );
            }
        }
    }
    if candidate.attendees.is_empty() {
        has_errors = true;
        push(
            &mut messages,
            Status::Error,
            "Nessun giocatore presente trovato.".to_string(),
        );
    } else if resolved_attendees.len() == candidate.attendees.len() {
        push(
            &mut messages,
            Status::Success,
            format!("{} giocatori presenti riconosciuti.", resolved_attendees.len()),
        );
    }

    // Stage 6: scorers. Own goals pass through without a player lookup.
    let mut resolved_scorers: Vec<ValidatedScorer> = Vec::new();
    for scorer in &candidate.scorers {
        if scorer.is_own_goal {
            resolved_scorers.push(ValidatedScorer {
                player: None,
                goals: scorer.goals,
                is_own_goal: true,
            });
            continue;
        }
        let surname = scorer.last_name.as_deref().unwrap_or("");
        match find_by_last_name(players, surname) {
            Some(p) => resolved_scorers.push(ValidatedScorer {
                player: Some(p.clone()),
                goals: scorer.goals,
                is_own_goal: false,
            }),
            None => {
                has_errors = true;
                push(
                    &mut messages,
                    Status::Error,
                    format!("Marcatore '{surname}' non trovato."),
                );
            }
        }
    }

    // Stage 7: cross-field consistency, only on otherwise-clean candidates.
    if let (false, Some((_, home_score, _))) = (has_errors, result.as_ref()) {
        let total_goals: u32 = resolved_scorers.iter().map(|s| s.goals).sum();
        if total_goals != *home_score {
            has_errors = true;
            push(
                &mut messages,
                Status::Error,
                format!(
                    "La somma dei gol dei marcatori ({total_goals}) non corrisponde al risultato ({home_score})."
                ),
            );
        }

        for scorer in &resolved_scorers {
            let Some(player) = scorer.player.as_ref() else {
                continue;
            };
            if !resolved_attendees.iter().any(|a| a.id == player.id) {
                has_errors = true;
                push(
                    &mut messages,
                    Status::Error,
                    format!(
                        "Il marcatore {} non è nella lista dei presenti.",
                        player.last_name
                    ),
                );
            }
        }
    }

    // On a clean run every stage above produced its value.
    let validated = match (has_errors, date, tournament, result) {
        (false, Some(date), Some(tournament), Some((opponent, home_score, away_score))) => {
            Some(ValidatedMatch {
                date,
                tournament,
                opponent,
                home_score,
                away_score,
                coaches: resolved_coaches,
                attendees: resolved_attendees,
                scorers: resolved_scorers,
            })
        }
        _ => None,
    };

    ValidationOutcome {
        has_errors,
        messages,
        validated,
    }
}

/// Candidates from one text block validate independently; the caller may
/// commit the clean subset and surface the rest.
pub fn validate_candidates(
    candidates: &[MatchCandidate],
    players: &[Player],
    tournaments: &[Tournament],
    coaches: &[Coach],
) -> Vec<ValidationOutcome> {
    candidates
        .iter()
        .map(|c| validate_candidate(c, players, tournaments, coaches))
        .collect()
}

fn find_by_last_name<'a>(players: &'a [Player], surname: &str) -> Option<&'a Player> {
    if surname.is_empty() {
        return None;
    }
    players
        .iter()
        .find(|p| p.last_name.eq_ignore_ascii_case(surname))
}

fn push(messages: &mut Vec<Diagnostic>, status: Status, text: String) {
    messages.push(Diagnostic { status, text });
}

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.fZ", "%Y-%m-%d %H:%M:%S"];
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d/%m/%y"];

/// The extractor is asked for ISO dates but gets them from messy text;
/// accept the common day-first forms too.
pub fn parse_candidate_date(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}
