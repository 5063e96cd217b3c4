use chrono::NaiveDate;

use matchday::ai_fetch::{
    build_insight_prompt, build_parse_prompt, build_report_prompt, parse_candidates_json,
    parse_insights_json, parse_report_json,
};
use matchday::store::{
    Attendee, AttendeeRole, Coach, Match, MatchResult, Player, Scorer, Tournament,
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

fn sample_match(day: u32, opponent: &str) -> Match {
    Match {
        id: format!("m{day}"),
        date: NaiveDate::from_ymd_opt(2025, 9, day)
            .unwrap()
            .and_hms_opt(15, 0, 0)
            .unwrap(),
        opponent: opponent.to_string(),
        tournament_id: "t1".to_string(),
        result: MatchResult { home: 2, away: 1 },
        coach_ids: vec!["c1".to_string()],
        attendees: vec![Attendee {
            player_id: "p1".to_string(),
            role: AttendeeRole::Starter,
        }],
        scorers: vec![
            Scorer {
                player_id: Some("p1".to_string()),
                goals: 1,
                is_own_goal: false,
            },
            Scorer {
                player_id: None,
                goals: 1,
                is_own_goal: true,
            },
        ],
    }
}

#[test]
fn insight_prompt_embeds_record_and_scorers() {
    let players = vec![player("p1", "Anna", "Lenzi")];
    let coaches = vec![Coach {
        id: "c1".to_string(),
        name: "Rossi".to_string(),
        team_id: "team-1".to_string(),
    }];
    let tournaments = vec![Tournament {
        id: "t1".to_string(),
        name: "Campionato".to_string(),
        presence_weight: 1.0,
    }];
    let matches = vec![
        sample_match(1, "Tobbiana"),
        sample_match(2, "Pistoiese"),
        sample_match(3, "Virtus"),
    ];

    let prompt = build_insight_prompt(&matches, &players, &coaches, &tournaments);
    assert!(prompt.contains("3 vittorie, 0 pareggi, 0 sconfitte"));
    assert!(prompt.contains("Anna Lenzi: 3 gol"));
    assert!(prompt.contains("vs Pistoiese"));
    assert!(prompt.contains("Autogol (1)"));
    assert!(prompt.contains("Mister: Rossi"));
}

#[test]
fn report_prompt_embeds_milestones() {
    let players = vec![player("p1", "Anna", "Lenzi")];
    let m = sample_match(1, "Tobbiana");

    let prompt = build_report_prompt(&m, std::slice::from_ref(&m), &players);
    assert!(prompt.contains("Avversario: Tobbiana"));
    assert!(prompt.contains("Risultato: 2-1"));
    assert!(prompt.contains("Debutto"));
    assert!(prompt.contains("Primo gol in carriera"));
}

#[test]
fn parse_prompt_lists_known_names() {
    let players = vec![player("p1", "Anna", "Lenzi"), player("p2", "Bruno", "Magni")];
    let tournaments = vec![Tournament {
        id: "t1".to_string(),
        name: "Ponte 2000".to_string(),
        presence_weight: 0.33,
    }];
    let coaches = vec![Coach {
        id: "c1".to_string(),
        name: "Rossi".to_string(),
        team_id: "team-1".to_string(),
    }];

    let prompt = build_parse_prompt("Aglianese 5 - 2 Pistoiese", &players, &tournaments, &coaches);
    assert!(prompt.contains("Lenzi, Magni"));
    assert!(prompt.contains("Ponte 2000"));
    assert!(prompt.contains("Rossi"));
    assert!(prompt.contains("Aglianese 5 - 2 Pistoiese"));
}

#[test]
fn insight_json_parses_and_tolerates_null() {
    let raw = r#"[{"title":"Muro","description":"Mai subito gol.","emoji":"🧱"}]"#;
    let insights = parse_insights_json(raw).unwrap();
    assert_eq!(insights.len(), 1);
    assert_eq!(insights[0].title, "Muro");

    assert!(parse_insights_json("null").unwrap().is_empty());
    assert!(parse_insights_json("  ").unwrap().is_empty());
    assert!(parse_insights_json("{broken").is_err());
}

#[test]
fn report_json_parses() {
    let raw = r#"{"title":"Che vittoria!","content":"Una partita memorabile."}"#;
    let report = parse_report_json(raw).unwrap();
    assert_eq!(report.title, "Che vittoria!");
    assert!(parse_report_json("null").is_err());
}

#[test]
fn candidate_json_parses_and_tolerates_null() {
    let raw = r#"[{"tournamentName":"Amichevole","homeScore":5}]"#;
    let candidates = parse_candidates_json(raw).unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].home_score, Some(5));
    assert!(candidates[0].date.is_none());

    assert!(parse_candidates_json("null").unwrap().is_empty());
    assert!(parse_candidates_json("").unwrap().is_empty());
}
