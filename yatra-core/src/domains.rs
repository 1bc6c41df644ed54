//! Typed views over the domain-specific fields of a detail document.
//!
//! Every field defaults, so a view only fails to parse when a field is
//! present with the wrong type (e.g. a trek elevation written as prose).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::document::DetailDocument;
use crate::identity::Domain;

/// A typed view of one domain's long-form fields.
pub trait DomainExtension: DeserializeOwned {
    const DOMAIN: Domain;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FestivalDetails {
    pub rituals: Vec<String>,
    pub significance: Option<String>,
    pub dates: Vec<String>,
    pub celebrated_in: Vec<String>,
}

impl DomainExtension for FestivalDetails {
    const DOMAIN: Domain = Domain::Festivals;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dish {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub vegetarian: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CuisineDetails {
    pub dishes: Vec<Dish>,
    pub ingredients: Vec<String>,
    pub region: Option<String>,
}

impl DomainExtension for CuisineDetails {
    const DOMAIN: Domain = Domain::Cuisine;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DanceFormDetails {
    pub origin: Option<String>,
    pub costumes: Vec<String>,
    pub instruments: Vec<String>,
    pub notable_performers: Vec<String>,
}

impl DomainExtension for DanceFormDetails {
    const DOMAIN: Domain = Domain::DanceForms;
}

/// One day of a trek or pilgrimage itinerary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryDay {
    pub day: u16,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrekDifficulty {
    Easy,
    Moderate,
    Challenging,
    Strenuous,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrekDetails {
    /// Maximum altitude in metres.
    #[serde(alias = "elevation")]
    pub elevation_m: Option<u32>,
    pub difficulty: Option<TrekDifficulty>,
    pub duration_days: Option<u16>,
    pub best_season: Option<String>,
    pub itinerary: Vec<ItineraryDay>,
}

impl DomainExtension for TrekDetails {
    const DOMAIN: Domain = Domain::Treks;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpiritualJourneyDetails {
    pub deity: Option<String>,
    pub temples: Vec<String>,
    pub rituals: Vec<String>,
    pub best_season: Option<String>,
    pub itinerary: Vec<ItineraryDay>,
}

impl DomainExtension for SpiritualJourneyDetails {
    const DOMAIN: Domain = Domain::SpiritualJourneys;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionDetails {
    pub capital: Option<String>,
    pub languages: Vec<String>,
    pub highlights: Vec<String>,
    pub best_season: Option<String>,
}

impl DomainExtension for RegionDetails {
    const DOMAIN: Domain = Domain::Regions;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoyalLuxuryDetails {
    pub amenities: Vec<String>,
    /// Starting nightly rate in minor units of `currency`.
    pub price_from: Option<u64>,
    pub currency: Option<String>,
    pub heritage: Option<String>,
}

impl DomainExtension for RoyalLuxuryDetails {
    const DOMAIN: Domain = Domain::RoyalLuxury;
}

impl Domain {
    /// Check that a detail document's long-form fields fit this domain's view.
    pub fn check_extension(self, doc: &DetailDocument) -> Result<(), serde_json::Error> {
        match self {
            Domain::Festivals => fits::<FestivalDetails>(doc),
            Domain::Cuisine => fits::<CuisineDetails>(doc),
            Domain::DanceForms => fits::<DanceFormDetails>(doc),
            Domain::Treks => fits::<TrekDetails>(doc),
            Domain::SpiritualJourneys => fits::<SpiritualJourneyDetails>(doc),
            Domain::Regions => fits::<RegionDetails>(doc),
            Domain::RoyalLuxury => fits::<RoyalLuxuryDetails>(doc),
        }
    }
}

fn fits<T: DomainExtension>(doc: &DetailDocument) -> Result<(), serde_json::Error> {
    doc.extension::<T>().map(drop)
}
