use matchday::store::{AttendeeRole, Coach, Player, Tournament};
use matchday::validate::{
    CandidateScorer, MatchCandidate, Status, parse_candidate_date, validate_candidate,
    validate_candidates,
};

fn player(id: &str, first: &str, last: &str) -> Player {
    Player {
        id: id.to_string(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        jersey_number: None,
        team_id: "team-1".to_string(),
    }
}

fn roster() -> Vec<Player> {
    vec![
        player("p1", "Anna", "Lenzi"),
        player("p2", "Bruno", "Magni"),
        player("p3", "Carlo", "Pasticci"),
    ]
}

fn tournaments() -> Vec<Tournament> {
    vec![Tournament {
        id: "t1".to_string(),
        name: "Amichevole".to_string(),
        presence_weight: 1.0,
    }]
}

fn coaches() -> Vec<Coach> {
    vec![Coach {
        id: "c1".to_string(),
        name: "Rossi".to_string(),
        team_id: "team-1".to_string(),
    }]
}

fn scorer(last_name: &str, goals: u32) -> CandidateScorer {
    CandidateScorer {
        last_name: Some(last_name.to_string()),
        goals,
        is_own_goal: false,
    }
}

fn own_goal(goals: u32) -> CandidateScorer {
    CandidateScorer {
        last_name: None,
        goals,
        is_own_goal: true,
    }
}

fn full_candidate() -> MatchCandidate {
    MatchCandidate {
        date: Some("2025-09-22".to_string()),
        tournament_name: Some("amichevole".to_string()), // case-insensitive
        opponent_name: Some("Pistoiese".to_string()),
        home_score: Some(5),
        away_score: Some(2),
        attendees: vec!["Lenzi".to_string(), "Magni".to_string(), "Pasticci".to_string()],
        scorers: vec![scorer("Lenzi", 3), scorer("Magni", 1), own_goal(1)],
        coach_names: vec!["rossi".to_string()],
        parse_errors: Vec::new(),
    }
}

#[test]
fn fully_resolvable_candidate_passes_with_resolved_references() {
    let outcome = validate_candidate(&full_candidate(), &roster(), &tournaments(), &coaches());
    assert!(!outcome.has_errors);
    assert!(outcome.messages.iter().all(|m| m.status != Status::Error));

    let validated = outcome.validated.expect("clean candidate carries data");
    assert_eq!(validated.tournament.id, "t1");
    assert_eq!(validated.opponent, "Pistoiese");
    assert_eq!(validated.home_score, 5);
    assert_eq!(validated.away_score, 2);
    assert_eq!(validated.coaches[0].id, "c1");
    assert_eq!(validated.attendees.len(), 3);
    assert_eq!(validated.scorers.len(), 3);
    assert!(validated.scorers[2].is_own_goal);
    assert!(validated.scorers[2].player.is_none());
}

#[test]
fn validated_match_commits_with_starter_roles_and_entity_ids() {
    let outcome = validate_candidate(&full_candidate(), &roster(), &tournaments(), &coaches());
    let fields = outcome.validated.unwrap().into_match_fields();

    assert_eq!(fields.tournament_id, "t1");
    assert_eq!(fields.result.home, 5);
    assert_eq!(fields.coach_ids, vec!["c1".to_string()]);
    assert!(fields.attendees.iter().all(|a| a.role == AttendeeRole::Starter));
    assert_eq!(fields.scorers[0].player_id.as_deref(), Some("p1"));
    assert_eq!(fields.scorers[2].player_id, None);
    assert!(fields.scorers[2].is_own_goal);
}

#[test]
fn scorer_sum_mismatch_quotes_both_values() {
    let mut candidate = full_candidate();
    candidate.scorers = vec![scorer("Lenzi", 3), scorer("Magni", 1)]; // sum 4 vs home 5

    let outcome = validate_candidate(&candidate, &roster(), &tournaments(), &coaches());
    assert!(outcome.has_errors);
    assert!(outcome.validated.is_none());
    let message = outcome
        .messages
        .iter()
        .find(|m| m.status == Status::Error)
        .expect("mismatch produces an error");
    assert!(message.text.contains("(4)"), "{}", message.text);
    assert!(message.text.contains("(5)"), "{}", message.text);
}

#[test]
fn scorer_must_be_among_attendees() {
    let mut candidate = full_candidate();
    candidate.attendees = vec!["Magni".to_string(), "Pasticci".to_string()];
    candidate.scorers = vec![scorer("Lenzi", 4), own_goal(1)];

    let outcome = validate_candidate(&candidate, &roster(), &tournaments(), &coaches());
    assert!(outcome.has_errors);
    assert!(outcome.messages.iter().any(|m| {
        m.status == Status::Error && m.text.contains("Lenzi") && m.text.contains("presenti")
    }));
}

#[test]
fn missing_date_is_an_error() {
    let mut candidate = full_candidate();
    candidate.date = None;
    let outcome = validate_candidate(&candidate, &roster(), &tournaments(), &coaches());
    assert!(outcome.has_errors);
}

#[test]
fn unparseable_date_is_an_error() {
    let mut candidate = full_candidate();
    candidate.date = Some("ieri pomeriggio".to_string());
    let outcome = validate_candidate(&candidate, &roster(), &tournaments(), &coaches());
    assert!(outcome.has_errors);
}

#[test]
fn unknown_tournament_error_names_it() {
    let mut candidate = full_candidate();
    candidate.tournament_name = Some("Ponte 2000".to_string());
    let outcome = validate_candidate(&candidate, &roster(), &tournaments(), &coaches());
    assert!(outcome.has_errors);
    assert!(outcome
        .messages
        .iter()
        .any(|m| m.status == Status::Error && m.text.contains("Ponte 2000")));
}

#[test]
fn missing_result_fields_are_an_error() {
    let mut candidate = full_candidate();
    candidate.away_score = None;
    let outcome = validate_candidate(&candidate, &roster(), &tournaments(), &coaches());
    assert!(outcome.has_errors);
}

#[test]
fn empty_attendee_list_is_an_error() {
    let mut candidate = full_candidate();
    candidate.attendees.clear();
    candidate.scorers.clear();
    candidate.home_score = Some(0);
    let outcome = validate_candidate(&candidate, &roster(), &tournaments(), &coaches());
    assert!(outcome.has_errors);
    assert!(outcome
        .messages
        .iter()
        .any(|m| m.status == Status::Error && m.text.contains("Nessun giocatore")));
}

#[test]
fn each_unresolved_name_gets_its_own_error() {
    let mut candidate = full_candidate();
    candidate.attendees.push("Bianchi".to_string());
    candidate.coach_names.push("Verdi".to_string());

    let outcome = validate_candidate(&candidate, &roster(), &tournaments(), &coaches());
    assert!(outcome.has_errors);
    assert!(outcome
        .messages
        .iter()
        .any(|m| m.text.contains("Giocatore 'Bianchi'")));
    assert!(outcome
        .messages
        .iter()
        .any(|m| m.text.contains("Mister 'Verdi'")));
}

#[test]
fn fully_resolved_coaches_emit_one_success_listing_them() {
    let outcome = validate_candidate(&full_candidate(), &roster(), &tournaments(), &coaches());
    assert!(outcome
        .messages
        .iter()
        .any(|m| m.status == Status::Success && m.text.contains("Mister presenti: Rossi")));
}

#[test]
fn candidates_validate_independently() {
    let mut broken = full_candidate();
    broken.tournament_name = Some("Sconosciuto".to_string());

    let outcomes = validate_candidates(
        &[full_candidate(), broken],
        &roster(),
        &tournaments(),
        &coaches(),
    );
    assert_eq!(outcomes.len(), 2);
    assert!(!outcomes[0].has_errors);
    assert!(outcomes[1].has_errors);
}

#[test]
fn candidate_deserializes_from_extractor_json() {
    // camelCase keys, missing fields absent rather than null.
    let raw = r#"[
        {
            "date": "2025-09-15",
            "tournamentName": "Amichevole",
            "opponentName": "Tobbiana",
            "homeScore": 2,
            "awayScore": 1,
            "attendees": ["Lenzi", "Magni"],
            "scorers": [
                {"lastName": "Lenzi", "goals": 1},
                {"goals": 1, "isOwnGoal": true}
            ],
            "coachNames": ["Rossi"]
        },
        {"opponentName": "Pistoiese"}
    ]"#;

    let candidates: Vec<MatchCandidate> = serde_json::from_str(raw).unwrap();
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].home_score, Some(2));
    assert!(!candidates[0].scorers[0].is_own_goal);
    assert!(candidates[0].scorers[1].is_own_goal);
    assert!(candidates[1].date.is_none());
    assert!(candidates[1].attendees.is_empty());
}

#[test]
fn candidate_dates_accept_iso_and_day_first_forms() {
    for raw in ["2025-09-15", "2025-09-15T18:30:00", "15/09/2025", "15/09/25"] {
        assert!(parse_candidate_date(raw).is_some(), "{raw}");
    }
    assert!(parse_candidate_date("").is_none());
    assert!(parse_candidate_date("settembre").is_none());
}
