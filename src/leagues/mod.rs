//! Static reference data: which leagues the service knows about, their
//! upstream competition codes and the table positions that matter at the end
//! of the season.
//!
//! The registry is built once at startup and shared read-only afterwards.

pub mod zones;

pub use zones::{classify, QualificationZones, Zone};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueDescriptor {
    pub id: u32,
    /// URL-safe identifier, also the cache key
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub country: String,
    /// Upstream competition code, e.g. "PL"
    pub code: String,
    #[serde(default)]
    pub zones: QualificationZones,
}

/// Read-only set of supported leagues.
#[derive(Debug, Clone)]
pub struct LeagueRegistry {
    leagues: Arc<Vec<LeagueDescriptor>>,
}

impl LeagueRegistry {
    pub fn new(leagues: Vec<LeagueDescriptor>) -> Result<Self> {
        if leagues.is_empty() {
            anyhow::bail!("league list is empty");
        }
        let mut ids = HashSet::new();
        let mut slugs = HashSet::new();
        for league in &leagues {
            if league.slug.trim().is_empty() || league.code.trim().is_empty() {
                anyhow::bail!("league {} is missing a slug or upstream code", league.id);
            }
            if !ids.insert(league.id) {
                anyhow::bail!("duplicate league id {}", league.id);
            }
            if !slugs.insert(league.slug.to_lowercase()) {
                anyhow::bail!("duplicate league slug '{}'", league.slug);
            }
        }
        Ok(LeagueRegistry {
            leagues: Arc::new(leagues),
        })
    }

    /// Built-in leagues, or the JSON array at `path` when given.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let leagues = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read leagues file {}", path))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("Failed to parse leagues file {}", path))?
            }
            None => default_leagues(),
        };
        let registry = Self::new(leagues)?;
        info!("Loaded {} league(s)", registry.all().len());
        Ok(registry)
    }

    pub fn all(&self) -> &[LeagueDescriptor] {
        &self.leagues
    }

    /// Look a league up by slug (case-insensitive) or numeric id.
    pub fn find(&self, key: &str) -> Option<&LeagueDescriptor> {
        let key = key.trim();
        if let Ok(id) = key.parse::<u32>() {
            return self.leagues.iter().find(|l| l.id == id);
        }
        self.leagues
            .iter()
            .find(|l| l.slug.eq_ignore_ascii_case(key))
    }
}

fn positions(from: u32, to: u32) -> Vec<u32> {
    (from..=to).collect()
}

fn league(
    id: u32,
    slug: &str,
    name: &str,
    country: &str,
    code: &str,
    zones: QualificationZones,
) -> LeagueDescriptor {
    LeagueDescriptor {
        id,
        slug: slug.to_string(),
        name: name.to_string(),
        country: country.to_string(),
        code: code.to_string(),
        zones,
    }
}

pub fn default_leagues() -> Vec<LeagueDescriptor> {
    vec![
        league(
            1,
            "premier-league",
            "Premier League",
            "England",
            "PL",
            QualificationZones {
                champions_league: positions(1, 4),
                europa_league: vec![5],
                conference_league: vec![6],
                relegation: positions(18, 20),
                ..Default::default()
            },
        ),
        league(
            2,
            "la-liga",
            "La Liga",
            "Spain",
            "PD",
            QualificationZones {
                champions_league: positions(1, 4),
                europa_league: positions(5, 6),
                conference_league: vec![7],
                relegation: positions(18, 20),
                ..Default::default()
            },
        ),
        league(
            3,
            "bundesliga",
            "Bundesliga",
            "Germany",
            "BL1",
            QualificationZones {
                champions_league: positions(1, 4),
                europa_league: vec![5],
                conference_league: vec![6],
                playoff: vec![16],
                relegation: positions(17, 18),
                ..Default::default()
            },
        ),
        league(
            4,
            "serie-a",
            "Serie A",
            "Italy",
            "SA",
            QualificationZones {
                champions_league: positions(1, 4),
                europa_league: positions(5, 6),
                conference_league: vec![7],
                relegation: positions(18, 20),
                ..Default::default()
            },
        ),
        league(
            5,
            "ligue-1",
            "Ligue 1",
            "France",
            "FL1",
            QualificationZones {
                champions_league: positions(1, 4),
                europa_league: vec![5],
                conference_league: vec![6],
                playoff: vec![16],
                relegation: positions(17, 18),
                ..Default::default()
            },
        ),
        league(
            6,
            "eredivisie",
            "Eredivisie",
            "Netherlands",
            "DED",
            QualificationZones {
                champions_league: positions(1, 2),
                europa_league: vec![3],
                conference_league: vec![4],
                playoff: positions(16, 17),
                relegation: vec![18],
                ..Default::default()
            },
        ),
        league(
            7,
            "primeira-liga",
            "Primeira Liga",
            "Portugal",
            "PPL",
            QualificationZones {
                champions_league: positions(1, 2),
                europa_league: vec![3],
                conference_league: vec![4],
                playoff: vec![16],
                relegation: positions(17, 18),
                ..Default::default()
            },
        ),
        league(
            8,
            "championship",
            "Championship",
            "England",
            "ELC",
            QualificationZones {
                promotion: positions(1, 2),
                playoff: positions(3, 6),
                relegation: positions(22, 24),
                ..Default::default()
            },
        ),
    ]
}
