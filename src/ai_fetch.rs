use anyhow::{Context, Result, anyhow};
use serde_json::{Value, json};

use crate::entity_stats::match_milestones;
use crate::http_client::{api_key, http_client};
use crate::store::{Coach, Insight, Match, MatchReport, Outcome, Player, Tournament};
use crate::validate::MatchCandidate;

const GEMINI_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent";

/// Below this the insight prompt has too little signal to be worth a call.
const MIN_MATCHES_FOR_INSIGHTS: usize = 3;

/// Dashboard insights. Returns `None` when there are too few matches to
/// bother the collaborator; any transport or parse failure yields the fixed
/// error sentinel instead of propagating.
pub fn generate_insights(
    matches: &[Match],
    players: &[Player],
    coaches: &[Coach],
    tournaments: &[Tournament],
) -> Option<Vec<Insight>> {
    if matches.len() < MIN_MATCHES_FOR_INSIGHTS {
        return None;
    }
    let prompt = build_insight_prompt(matches, players, coaches, tournaments);
    match generate_json(&prompt).and_then(|raw| parse_insights_json(&raw)) {
        Ok(insights) if !insights.is_empty() => Some(insights),
        _ => Some(vec![Insight {
            title: "Errore".to_string(),
            description: "Impossibile contattare l'intelligenza artificiale.".to_string(),
            emoji: "🤖".to_string(),
        }]),
    }
}

/// Post-match write-up for one match. Best-effort: failures substitute the
/// fixed report sentinel.
pub fn generate_match_report(m: &Match, all_matches: &[Match], players: &[Player]) -> MatchReport {
    let prompt = build_report_prompt(m, all_matches, players);
    match generate_json(&prompt).and_then(|raw| parse_report_json(&raw)) {
        Ok(report) => report,
        Err(_) => MatchReport {
            title: "Errore Report".to_string(),
            content: "Impossibile generare il riassunto AI per questa partita.".to_string(),
        },
    }
}

/// Extracts loosely-structured match candidates from a free-text block.
/// `None` means nothing extracted (including any failure); the candidates
/// still need the validator before commit.
pub fn parse_match_text(
    raw_text: &str,
    players: &[Player],
    tournaments: &[Tournament],
    coaches: &[Coach],
) -> Option<Vec<MatchCandidate>> {
    let prompt = build_parse_prompt(raw_text, players, tournaments, coaches);
    generate_json(&prompt)
        .and_then(|raw| parse_candidates_json(&raw))
        .ok()
}

pub fn build_insight_prompt(
    matches: &[Match],
    players: &[Player],
    coaches: &[Coach],
    tournaments: &[Tournament],
) -> String {
    let mut wins = 0;
    let mut draws = 0;
    let mut losses = 0;
    for m in matches {
        match m.result.outcome() {
            Outcome::Win => wins += 1,
            Outcome::Draw => draws += 1,
            Outcome::Loss => losses += 1,
        }
    }

    let mut scorer_totals: Vec<(&Player, u32)> = players
        .iter()
        .map(|p| (p, matches.iter().map(|m| m.goals_by(&p.id)).sum::<u32>()))
        .filter(|(_, goals)| *goals > 0)
        .collect();
    scorer_totals.sort_by(|a, b| b.1.cmp(&a.1));
    let top_scorers = scorer_totals
        .iter()
        .take(3)
        .map(|(p, goals)| format!("{}: {goals} gol", p.full_name()))
        .collect::<Vec<_>>()
        .join("; ");

    let match_lines = matches
        .iter()
        .take(10)
        .map(|m| {
            let tournament = tournaments
                .iter()
                .find(|t| t.id == m.tournament_id)
                .map(|t| t.name.as_str())
                .unwrap_or("N/A");
            let coach_names = m
                .coach_ids
                .iter()
                .filter_map(|id| coaches.iter().find(|c| &c.id == id))
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "  - Partita del {} vs {} (Torneo: {}), Risultato: {}-{}. Marcatori: {}. Mister: {}. Presenti: {} giocatori.",
                m.date.format("%d/%m/%Y"),
                m.opponent,
                tournament,
                m.result.home,
                m.result.away,
                scorers_line(m, players),
                coach_names,
                m.attendees.len(),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Sei un commentatore sportivo carismatico, divertente e un po' pazzo. Il tuo compito è \
         trovare spunti sorprendenti e vivaci analizzando i dati delle partite di una squadra di \
         calcio giovanile. Evita commenti banali, sii creativo e usa un tono entusiasta.\n\n\
         Analizza i seguenti dati:\n\
         - Risultati totali: {wins} vittorie, {draws} pareggi, {losses} sconfitte.\n\
         - Marcatori principali: {top}.\n\
         - Elenco partite dettagliate (massimo 10 recenti):\n{match_lines}\n\n\
         Basandoti ESCLUSIVAMENTE sui dati forniti, estrai ALMENO 3 spunti interessanti e \
         divertenti. Devono essere statistiche verificabili dai dati. Sii specifico.\n\
         Rispondi SOLO con un array JSON di oggetti; ogni oggetto deve avere un \"title\" \
         accattivante (massimo 5-6 parole), una \"description\" concisa (massimo 2 frasi) e una \
         \"emoji\" appropriata.",
        top = if top_scorers.is_empty() { "N/A" } else { top_scorers.as_str() },
    )
}

pub fn build_report_prompt(m: &Match, all_matches: &[Match], players: &[Player]) -> String {
    let milestone_lines = match_milestones(m, all_matches, players)
        .iter()
        .map(|pm| format!("  - {}: {}", pm.player.full_name(), pm.milestones.join(", ")))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Sei un cronista sportivo entusiasta che commenta una partita di calcio giovanile. Il tuo \
         tono è positivo e celebrativo. Basandoti sui dati della partita e sui traguardi \
         raggiunti, scrivi un breve riassunto (2-3 frasi), concentrandoti su 1 o 2 eventi più \
         significativi (un debutto, un primo gol, una tripletta, un traguardo di presenze).\n\n\
         Dettagli partita:\n\
         - Data: {date}\n\
         - Avversario: {opponent}\n\
         - Risultato: {home}-{away}\n\
         - Marcatori: {scorers}\n\n\
         Traguardi e eventi notevoli in questa partita:\n{milestones}\n\n\
         Rispondi SOLO con un oggetto JSON con \"title\" (titolo da giornale, massimo 7 parole) e \
         \"content\" (il paragrafo di riassunto), in italiano.",
        date = m.date.format("%d/%m/%Y"),
        opponent = m.opponent,
        home = m.result.home,
        away = m.result.away,
        scorers = scorers_line(m, players),
        milestones = if milestone_lines.is_empty() {
            "  - Nessuno".to_string()
        } else {
            milestone_lines
        },
    )
}

pub fn build_parse_prompt(
    raw_text: &str,
    players: &[Player],
    tournaments: &[Tournament],
    coaches: &[Coach],
) -> String {
    let player_last_names = players
        .iter()
        .map(|p| p.last_name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let tournament_names = tournaments
        .iter()
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let coach_names = coaches
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Sei un assistente specializzato nell'estrazione di dati da testi non strutturati \
         riguardanti partite di calcio. Il testo può contenere una o più partite separate da \
         '---'. Per OGNI partita trovata estrai data, torneo, risultato, avversario, mister, \
         presenti e marcatori.\n\n\
         Nomi noti:\n\
         - Tornei: {tournament_names}\n\
         - Mister: {coach_names}\n\
         - Cognomi giocatori: {player_last_names}\n\n\
         Istruzioni:\n\
         1. Estrai solo i dati che trovi; se un'informazione manca, ometti la chiave.\n\
         2. Se trovi \"Autogol\" tra i marcatori, crea un marcatore con isOwnGoal: true e il \
         numero di gol, senza lastName.\n\
         3. Se l'intero testo è incomprensibile restituisci un array vuoto [].\n\
         4. Rispondi SEMPRE e SOLO con un array JSON di oggetti con le chiavi: date (ISO, es. \
         2025-09-15), tournamentName, opponentName, homeScore, awayScore, attendees (array di \
         cognomi), scorers (array di oggetti con lastName, goals, isOwnGoal), coachNames (array \
         di nomi), parseErrors (array di stringhe).\n\n\
         Testo da analizzare:\n\"\"\"\n{raw_text}\n\"\"\"",
    )
}

pub fn parse_insights_json(raw: &str) -> Result<Vec<Insight>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    serde_json::from_str(trimmed).context("invalid insights json")
}

pub fn parse_report_json(raw: &str) -> Result<MatchReport> {
    serde_json::from_str(raw.trim()).context("invalid report json")
}

pub fn parse_candidates_json(raw: &str) -> Result<Vec<MatchCandidate>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    serde_json::from_str(trimmed).context("invalid candidates json")
}

/// One attempt, no retry: the caller substitutes a sentinel on failure.
fn generate_json(prompt: &str) -> Result<String> {
    let client = http_client()?;
    let key = api_key()?;

    let body = json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": { "responseMimeType": "application/json" },
    });

    let response: Value = client
        .post(format!("{GEMINI_URL}?key={key}"))
        .json(&body)
        .send()
        .context("request failed")?
        .error_for_status()
        .context("request rejected")?
        .json()
        .context("invalid response body")?;

    extract_text(&response).ok_or_else(|| anyhow!("response carries no text part"))
}

fn extract_text(response: &Value) -> Option<String> {
    let text = response
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()?;
    Some(text.to_string())
}

fn scorers_line(m: &Match, players: &[Player]) -> String {
    if m.scorers.is_empty() {
        return "Nessuno".to_string();
    }
    m.scorers
        .iter()
        .map(|s| {
            if s.is_own_goal {
                return format!("Autogol ({})", s.goals);
            }
            let name = s
                .player_id
                .as_deref()
                .and_then(|id| players.iter().find(|p| p.id == id))
                .map(|p| p.full_name())
                .unwrap_or_else(|| "Sconosciuto".to_string());
            format!("{name} ({})", s.goals)
        })
        .collect::<Vec<_>>()
        .join(", ")
}
