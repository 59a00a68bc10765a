// Data model for the two guide datasets
// Provinces and destinations are immutable after load; consumers only read them

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    North,
    Central,
    South,
    East,
    Northeast,
    West,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::North => "north",
            Region::Central => "central",
            Region::South => "south",
            Region::East => "east",
            Region::Northeast => "northeast",
            Region::West => "west",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Province {
    pub id: String,
    pub name: String,
    pub thai_name: String,
    pub description: String,
    pub region: Region,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EntranceFee {
    pub thai: f64,
    pub foreigner: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub google_maps_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub id: String,
    pub province_id: String,
    pub name_en: String,
    pub name_th: String,
    pub description: String,
    pub category: Vec<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub entrance_fee: Option<EntranceFee>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    // Closed destinations are never shown in any listing view
    pub is_open: bool,
    #[serde(default)]
    pub opening_hours: Option<String>,
    #[serde(default)]
    pub average_duration: Option<String>,
    #[serde(default)]
    pub facilities: Vec<String>,
    #[serde(default)]
    pub contact: Option<Contact>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl Destination {
    // Effective entrance price for sorting: foreigner fee when set, otherwise
    // the Thai fee, otherwise free
    pub fn entrance_price(&self) -> f64 {
        match &self.entrance_fee {
            Some(fee) if fee.foreigner > 0.0 => fee.foreigner,
            Some(fee) if fee.thai > 0.0 => fee.thai,
            _ => 0.0,
        }
    }
}
