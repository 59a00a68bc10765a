// Filtering and sorting over the cached datasets
// Pure functions; the UI layer feeds them the current filter state and renders
// whatever comes back

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::{Destination, Province, Region};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    Rating,
    Name,
    PriceLow,
}

impl Default for SortKey {
    fn default() -> Self {
        SortKey::Rating
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub search: String,
    // Empty string means "all provinces" / "all categories"
    pub province: String,
    pub category: String,
    pub sort: SortKey,
}

// Narrow then order the destination set. Stages run in a fixed order: search,
// province, category, then the unconditional open-only gate; closed
// destinations never appear in the output no matter what the other filters say.
pub fn filter_and_sort(destinations: &[Destination], filters: &FilterState) -> Vec<Destination> {
    let needle = filters.search.to_lowercase();

    let mut filtered: Vec<Destination> = destinations
        .iter()
        .filter(|dest| filters.search.is_empty() || matches_search(dest, &filters.search, &needle))
        .filter(|dest| filters.province.is_empty() || dest.province_id == filters.province)
        .filter(|dest| {
            filters.category.is_empty() || dest.category.iter().any(|tag| tag == &filters.category)
        })
        .filter(|dest| dest.is_open)
        .cloned()
        .collect();

    // Vec::sort_by is stable, so ties keep their input order
    match filters.sort {
        SortKey::Rating => filtered.sort_by(|a, b| {
            b.rating
                .unwrap_or(0.0)
                .total_cmp(&a.rating.unwrap_or(0.0))
        }),
        SortKey::Name => filtered.sort_by(|a, b| compare_names(&a.name_en, &b.name_en)),
        SortKey::PriceLow => {
            filtered.sort_by(|a, b| a.entrance_price().total_cmp(&b.entrance_price()))
        }
    }

    filtered
}

// English names match case-insensitively; the Thai name is matched on the raw
// term since Thai script has no case to fold
fn matches_search(dest: &Destination, raw: &str, needle: &str) -> bool {
    dest.name_en.to_lowercase().contains(needle)
        || dest.name_th.contains(raw)
        || dest.description.to_lowercase().contains(needle)
        || dest.category.iter().any(|tag| tag.to_lowercase().contains(needle))
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

// Province listing filter: optional region plus the same search fields the
// provinces page exposes (name, Thai name, description)
pub fn filter_provinces(
    provinces: &[Province],
    search: &str,
    region: Option<Region>,
) -> Vec<Province> {
    let needle = search.to_lowercase();

    provinces
        .iter()
        .filter(|province| region.map_or(true, |r| province.region == r))
        .filter(|province| {
            search.is_empty()
                || province.name.to_lowercase().contains(&needle)
                || province.thai_name.contains(search)
                || province.description.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}
