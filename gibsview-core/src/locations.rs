//! Curated points of interest with a recommended imagery layer each.
//!
//! Like the layer catalog this is static, read-only data; the viewer offers
//! the list as jump targets.

use std::fmt::{self, Display, Formatter};

use gibsview_tile_utils::LatLng;
use serde::{Deserialize, Serialize};

/// Kind of phenomenon a featured location shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum LocationCategory {
    /// Forests, rivers, and other natural features.
    Natural,
    /// Ice sheets and other climate indicators.
    Climate,
    /// Deserts, mountains, and volcanic regions.
    Geological,
    /// Cities and built-up areas.
    Urban,
    /// Reefs and other marine features.
    Ocean,
}

impl Display for LocationCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Natural => "natural",
            Self::Climate => "climate",
            Self::Geological => "geological",
            Self::Urban => "urban",
            Self::Ocean => "ocean",
        })
    }
}

/// A named point of interest.
///
/// `recommended_layer` references an [`ImageryLayer`](crate::catalog::ImageryLayer)
/// id but is not checked against the catalog; a dangling reference simply
/// leaves the viewer's layer selection unchanged.
#[serde_with::skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedLocation {
    /// Display name, unique across the catalog.
    pub name: String,
    /// Geographic position.
    #[serde(flatten)]
    pub position: LatLng,
    /// Why the location is worth a look.
    pub description: String,
    /// Id of the imagery layer that shows the location best.
    pub recommended_layer: String,
    /// Zoom level suited to the feature's extent.
    pub zoom: Option<u8>,
    /// Kind of phenomenon on display.
    pub category: LocationCategory,
}

/// Ordered, read-only registry of featured locations.
#[derive(Clone, Debug, PartialEq)]
pub struct FeaturedCatalog {
    locations: Vec<FeaturedLocation>,
}

impl FeaturedCatalog {
    /// Builds a catalog from `locations`, preserving their order.
    #[must_use]
    pub fn new(locations: Vec<FeaturedLocation>) -> Self {
        Self { locations }
    }

    /// Locations of the given category, in catalog order. May be empty.
    pub fn by_category(
        &self,
        category: LocationCategory,
    ) -> impl Iterator<Item = &FeaturedLocation> {
        self.locations
            .iter()
            .filter(move |location| location.category == category)
    }

    /// Looks up a location by its exact name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&FeaturedLocation> {
        self.locations.iter().find(|location| location.name == name)
    }

    /// All locations in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &FeaturedLocation> {
        self.locations.iter()
    }

    /// Number of locations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Whether the catalog has no locations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

impl Default for FeaturedCatalog {
    fn default() -> Self {
        Self::new(featured_locations())
    }
}

fn location(
    name: &str,
    lat: f64,
    lng: f64,
    description: &str,
    recommended_layer: &str,
    zoom: u8,
    category: LocationCategory,
) -> FeaturedLocation {
    FeaturedLocation {
        name: name.to_string(),
        position: LatLng::new(lat, lng),
        description: description.to_string(),
        recommended_layer: recommended_layer.to_string(),
        zoom: Some(zoom),
        category,
    }
}

/// The points of interest the viewer ships with.
fn featured_locations() -> Vec<FeaturedLocation> {
    vec![
        location(
            "Amazon Rainforest",
            -3.4653,
            -62.2159,
            "The world's largest rainforest, vital for global climate regulation",
            "MODIS_Terra_CorrectedReflectance_TrueColor",
            6,
            LocationCategory::Natural,
        ),
        location(
            "Sahara Desert",
            23.8,
            25.0,
            "Earth's largest hot desert with distinctive sand formations",
            "MODIS_Terra_CorrectedReflectance_TrueColor",
            5,
            LocationCategory::Geological,
        ),
        location(
            "Antarctic Ice Sheet",
            -75.0,
            0.0,
            "Massive ice sheet containing 90% of world's ice",
            "MODIS_Aqua_CorrectedReflectance_TrueColor",
            4,
            LocationCategory::Climate,
        ),
        location(
            "Himalayas",
            28.0,
            84.0,
            "World's highest mountain range with dramatic topography",
            "ASTER_GDEM_Greyscale_Shaded_Relief",
            6,
            LocationCategory::Geological,
        ),
        location(
            "Great Barrier Reef",
            -18.2871,
            147.6992,
            "World's largest coral reef system visible from space",
            "MODIS_Aqua_CorrectedReflectance_TrueColor",
            7,
            LocationCategory::Ocean,
        ),
        location(
            "Nile River Delta",
            31.0,
            31.5,
            "Historic delta showing contrast between desert and agriculture",
            "VIIRS_SNPP_CorrectedReflectance_TrueColor",
            7,
            LocationCategory::Natural,
        ),
        location(
            "Iceland Volcanoes",
            64.0,
            -19.0,
            "Active volcanic region with glaciers and geothermal features",
            "MODIS_Terra_CorrectedReflectance_Bands721",
            6,
            LocationCategory::Geological,
        ),
        location(
            "Tokyo Megalopolis",
            35.6762,
            139.6503,
            "One of world's largest urban areas visible at night",
            "VIIRS_SNPP_DayNightBand_ENCC",
            8,
            LocationCategory::Urban,
        ),
        location(
            "Greenland Ice Sheet",
            72.0,
            -40.0,
            "Second largest ice sheet, showing effects of climate change",
            "MODIS_Terra_CorrectedReflectance_TrueColor",
            4,
            LocationCategory::Climate,
        ),
        location(
            "Ganges River",
            25.5,
            85.0,
            "Sacred river supporting millions, showing seasonal changes",
            "VIIRS_SNPP_CorrectedReflectance_TrueColor",
            7,
            LocationCategory::Natural,
        ),
        location(
            "Grand Canyon",
            36.1069,
            -112.1129,
            "Spectacular geological formation carved by the Colorado River",
            "ASTER_GDEM_Greyscale_Shaded_Relief",
            9,
            LocationCategory::Geological,
        ),
        location(
            "Aral Sea",
            45.0,
            60.0,
            "Shrinking lake showing dramatic environmental change",
            "MODIS_Terra_CorrectedReflectance_TrueColor",
            7,
            LocationCategory::Climate,
        ),
    ]
}
