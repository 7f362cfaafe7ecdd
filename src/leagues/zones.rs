use serde::{Deserialize, Serialize};

/// Table positions that lead to each end-of-season outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QualificationZones {
    pub champions_league: Vec<u32>,
    pub europa_league: Vec<u32>,
    pub conference_league: Vec<u32>,
    pub promotion: Vec<u32>,
    pub playoff: Vec<u32>,
    pub relegation: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Zone {
    ChampionsLeague,
    EuropaLeague,
    ConferenceLeague,
    Promotion,
    Playoff,
    Relegation,
    None,
}

impl Zone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::ChampionsLeague => "championsLeague",
            Zone::EuropaLeague => "europaLeague",
            Zone::ConferenceLeague => "conferenceLeague",
            Zone::Promotion => "promotion",
            Zone::Playoff => "playoff",
            Zone::Relegation => "relegation",
            Zone::None => "none",
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a table position to its zone.
///
/// Ranges are expected to be disjoint; if they are not, continental tiers win
/// over promotion, promotion over playoff, and playoff over relegation.
pub fn classify(position: u32, zones: &QualificationZones) -> Zone {
    let ordered = [
        (&zones.champions_league, Zone::ChampionsLeague),
        (&zones.europa_league, Zone::EuropaLeague),
        (&zones.conference_league, Zone::ConferenceLeague),
        (&zones.promotion, Zone::Promotion),
        (&zones.playoff, Zone::Playoff),
        (&zones.relegation, Zone::Relegation),
    ];

    ordered
        .into_iter()
        .find(|(positions, _)| positions.contains(&position))
        .map(|(_, zone)| zone)
        .unwrap_or(Zone::None)
}
