use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::store::{Coach, EntityStore, Insight, Match, Player, Team, Tournament};

const STORE_DIR: &str = "matchday";
const STORE_FILE: &str = "store.json";
const STORE_VERSION: u32 = 1;

/// Full snapshot, one field per logical collection. Every save writes the
/// whole replacement value; there are no partial updates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct StoreFile {
    version: u32,
    teams: Vec<Team>,
    players: Vec<Player>,
    coaches: Vec<Coach>,
    tournaments: Vec<Tournament>,
    matches: Vec<Match>,
    #[serde(default)]
    active_team_id: Option<String>,
    #[serde(default)]
    cached_insights: Vec<Insight>,
}

/// Best-effort load: a missing, unreadable, corrupt, or version-mismatched
/// snapshot loads nothing and leaves the store as-is.
pub fn load_into_store(store: &mut EntityStore) {
    let Some(path) = store_path() else {
        return;
    };
    let Ok(raw) = fs::read_to_string(&path) else {
        return;
    };
    let Ok(file) = serde_json::from_str::<StoreFile>(&raw) else {
        return;
    };
    if file.version != STORE_VERSION {
        return;
    }

    store.teams = file.teams;
    store.players = file.players;
    store.coaches = file.coaches;
    store.tournaments = file.tournaments;
    store.matches = file.matches;
    store.active_team_id = file.active_team_id;
    store.cached_insights = file.cached_insights;
}

pub fn save_from_store(store: &EntityStore) {
    let Some(path) = store_path() else {
        return;
    };
    let Some(dir) = path.parent() else {
        return;
    };
    let _ = fs::create_dir_all(dir);

    let file = StoreFile {
        version: STORE_VERSION,
        teams: store.teams.clone(),
        players: store.players.clone(),
        coaches: store.coaches.clone(),
        tournaments: store.tournaments.clone(),
        matches: store.matches.clone(),
        active_team_id: store.active_team_id.clone(),
        cached_insights: store.cached_insights.clone(),
    };

    if let Ok(json) = serde_json::to_string(&file) {
        write_atomically(&path, &json);
    }
}

fn write_atomically(path: &Path, json: &str) {
    let tmp = path.with_extension("json.tmp");
    if fs::write(&tmp, json).is_ok() {
        let _ = fs::rename(&tmp, path);
    }
}

fn store_path() -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(STORE_DIR).join(STORE_FILE));
        }
    }
    // Fallback to ~/.cache on linux-like systems.
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".cache")
            .join(STORE_DIR)
            .join(STORE_FILE),
    )
}
