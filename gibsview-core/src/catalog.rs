//! Catalog of imagery layers published by NASA's Global Imagery Browse
//! Services (GIBS), and derivation of per-layer tile-URL templates.
//!
//! Layers are enumerated statically; see <https://nasa-gibs.github.io/gibs-api-docs/>
//! for the upstream service documentation. The catalog itself is pure data:
//! lookups return `Option`, URL construction and date validation have no side
//! effects and perform no I/O.

use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};

use chrono::{NaiveDate, Utc};
use gibsview_tile_utils::{ImageFormat, TileMatrixSet};
use log::warn;
use serde::{Deserialize, Serialize};

/// Root of the GIBS WMTS endpoint in the Web-Mercator "best" projection.
pub const GIBS_BASE_URL: &str = "https://gibs.earthdata.nasa.gov/wmts/epsg3857/best";

/// Body the imagery covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum LayerCategory {
    /// Earth observation imagery.
    Earth,
    /// Mars mission imagery.
    Mars,
    /// Lunar imagery.
    Moon,
    /// Deep-space imagery.
    Space,
}

impl Display for LayerCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Earth => "earth",
            Self::Mars => "mars",
            Self::Moon => "moon",
            Self::Space => "space",
        })
    }
}

/// A single imagery layer as published by the tile service.
#[serde_with::skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageryLayer {
    /// Stable identifier, unique across the catalog. Appears verbatim in
    /// tile URLs and is referenced by annotations.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Longer display description.
    pub description: String,
    /// Body the imagery covers.
    pub category: LayerCategory,
    /// Raster format of the layer's tiles.
    pub format: ImageFormat,
    /// Tiling scheme the layer is published under.
    pub tile_matrix_set: TileMatrixSet,
    /// Whether the layer's content varies by calendar date.
    pub temporal: bool,
    /// First date with imagery, inclusive. Ignored when `temporal` is false.
    pub start_date: Option<NaiveDate>,
    /// Last date with imagery, inclusive. `None` means "up to the present".
    pub end_date: Option<NaiveDate>,
}

impl ImageryLayer {
    /// Builds the layer's tile-URL template against [`GIBS_BASE_URL`].
    ///
    /// See [`tile_url_template_with_base`](Self::tile_url_template_with_base).
    #[must_use]
    pub fn tile_url_template(&self, date: Option<NaiveDate>) -> String {
        self.tile_url_template_with_base(GIBS_BASE_URL, date)
    }

    /// Builds a tile-URL template of the shape
    /// `{base}/{id}/default/{date}/{tileMatrixSet}/{z}/{y}/{x}.{ext}`.
    ///
    /// `{z}`, `{y}` and `{x}` are left as literal placeholders for the map
    /// widget to substitute per tile. For temporal layers the date segment is
    /// the ISO calendar date of `date`, defaulting to today in the UTC
    /// calendar; non-temporal layers always use the literal segment
    /// `default`, regardless of `date`.
    #[must_use]
    pub fn tile_url_template_with_base(&self, base: &str, date: Option<NaiveDate>) -> String {
        let time = if self.temporal {
            date.unwrap_or_else(|| Utc::now().date_naive())
                .format("%Y-%m-%d")
                .to_string()
        } else {
            "default".to_string()
        };
        // The first "default" path segment is the WMTS STYLE parameter
        // required by GIBS, not the date.
        format!(
            "{base}/{id}/default/{time}/{tms}/{{z}}/{{y}}/{{x}}.{ext}",
            id = self.id,
            tms = self.tile_matrix_set,
            ext = self.format.extension(),
        )
    }

    /// Whether the layer has imagery for `date`.
    ///
    /// Always true for non-temporal layers. For temporal layers both bounds
    /// are inclusive and compared at calendar-day granularity.
    #[must_use]
    pub fn is_date_valid(&self, date: NaiveDate) -> bool {
        if !self.temporal {
            return true;
        }
        if self.start_date.is_some_and(|start| date < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| date > end) {
            return false;
        }
        true
    }
}

/// Ordered, statically-built registry of imagery layers.
///
/// [`LayerCatalog::default`] yields the GIBS layers the viewer ships with.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerCatalog {
    layers: Vec<ImageryLayer>,
}

impl LayerCatalog {
    /// Builds a catalog from `layers`, preserving their order.
    ///
    /// Layer ids must be unique; a duplicate keeps the first occurrence and
    /// logs a warning.
    #[must_use]
    pub fn new(layers: Vec<ImageryLayer>) -> Self {
        let mut seen = HashSet::new();
        let layers = layers
            .into_iter()
            .filter(|layer| {
                let fresh = seen.insert(layer.id.clone());
                if !fresh {
                    warn!("ignoring duplicate layer id {}", layer.id);
                }
                fresh
            })
            .collect();
        Self { layers }
    }

    /// Looks up a layer by its exact id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ImageryLayer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    /// Layers of the given category, in catalog order. May be empty.
    pub fn by_category(&self, category: LayerCategory) -> impl Iterator<Item = &ImageryLayer> {
        self.layers
            .iter()
            .filter(move |layer| layer.category == category)
    }

    /// All layers in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &ImageryLayer> {
        self.layers.iter()
    }

    /// First layer of the catalog, the viewer's startup selection.
    #[must_use]
    pub fn first(&self) -> Option<&ImageryLayer> {
        self.layers.first()
    }

    /// Number of layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the catalog has no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Default for LayerCatalog {
    fn default() -> Self {
        Self::new(gibs_layers())
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date")
}

/// The GIBS layers the viewer ships with.
fn gibs_layers() -> Vec<ImageryLayer> {
    vec![
        ImageryLayer {
            id: "VIIRS_SNPP_CorrectedReflectance_TrueColor".to_string(),
            name: "VIIRS True Color".to_string(),
            description: "True-color corrected reflectance from VIIRS instrument on Suomi-NPP \
                          satellite, providing daily global imagery"
                .to_string(),
            category: LayerCategory::Earth,
            format: ImageFormat::Jpeg,
            tile_matrix_set: TileMatrixSet::new("GoogleMapsCompatible_Level9"),
            temporal: true,
            start_date: Some(ymd(2015, 11, 24)),
            end_date: None,
        },
        ImageryLayer {
            id: "MODIS_Terra_CorrectedReflectance_TrueColor".to_string(),
            name: "MODIS Terra True Color".to_string(),
            description: "True-color imagery from MODIS instrument on Terra satellite, showing \
                          Earth as it would appear to human eyes"
                .to_string(),
            category: LayerCategory::Earth,
            format: ImageFormat::Jpeg,
            tile_matrix_set: TileMatrixSet::new("GoogleMapsCompatible_Level9"),
            temporal: true,
            start_date: Some(ymd(2000, 2, 24)),
            end_date: None,
        },
        ImageryLayer {
            id: "MODIS_Aqua_CorrectedReflectance_TrueColor".to_string(),
            name: "MODIS Aqua True Color".to_string(),
            description: "True-color imagery from MODIS instrument on Aqua satellite".to_string(),
            category: LayerCategory::Earth,
            format: ImageFormat::Jpeg,
            tile_matrix_set: TileMatrixSet::new("GoogleMapsCompatible_Level9"),
            temporal: true,
            start_date: Some(ymd(2002, 7, 3)),
            end_date: None,
        },
        ImageryLayer {
            id: "VIIRS_SNPP_CorrectedReflectance_BandsM11-I2-I1".to_string(),
            name: "VIIRS False Color".to_string(),
            description: "False-color imagery using bands M11-I2-I1, useful for identifying \
                          fires, vegetation, and water"
                .to_string(),
            category: LayerCategory::Earth,
            format: ImageFormat::Jpeg,
            tile_matrix_set: TileMatrixSet::new("GoogleMapsCompatible_Level9"),
            temporal: true,
            start_date: Some(ymd(2015, 11, 24)),
            end_date: None,
        },
        ImageryLayer {
            id: "MODIS_Terra_CorrectedReflectance_Bands721".to_string(),
            name: "MODIS Terra False Color (Bands 7-2-1)".to_string(),
            description: "False-color composite ideal for distinguishing burn scars, vegetation, \
                          and urban areas"
                .to_string(),
            category: LayerCategory::Earth,
            format: ImageFormat::Jpeg,
            tile_matrix_set: TileMatrixSet::new("GoogleMapsCompatible_Level9"),
            temporal: true,
            start_date: Some(ymd(2000, 2, 24)),
            end_date: None,
        },
        ImageryLayer {
            id: "MODIS_Aqua_CorrectedReflectance_Bands721".to_string(),
            name: "MODIS Aqua False Color (Bands 7-2-1)".to_string(),
            description: "False-color composite from Aqua satellite for land and fire analysis"
                .to_string(),
            category: LayerCategory::Earth,
            format: ImageFormat::Jpeg,
            tile_matrix_set: TileMatrixSet::new("GoogleMapsCompatible_Level9"),
            temporal: true,
            start_date: Some(ymd(2002, 7, 3)),
            end_date: None,
        },
        ImageryLayer {
            id: "VIIRS_SNPP_DayNightBand_ENCC".to_string(),
            name: "VIIRS Earth at Night".to_string(),
            description: "Day/Night Band showing city lights, auroras, wildfires, and other \
                          nighttime phenomena"
                .to_string(),
            category: LayerCategory::Earth,
            format: ImageFormat::Png,
            tile_matrix_set: TileMatrixSet::new("GoogleMapsCompatible_Level8"),
            temporal: true,
            start_date: Some(ymd(2015, 11, 24)),
            end_date: None,
        },
        ImageryLayer {
            id: "BlueMarble_NextGeneration".to_string(),
            name: "Blue Marble".to_string(),
            description: "Monthly composite imagery of Earth's surface at 500m resolution"
                .to_string(),
            category: LayerCategory::Earth,
            format: ImageFormat::Jpeg,
            tile_matrix_set: TileMatrixSet::new("GoogleMapsCompatible_Level8"),
            temporal: false,
            start_date: None,
            end_date: None,
        },
        ImageryLayer {
            id: "ASTER_GDEM_Greyscale_Shaded_Relief".to_string(),
            name: "ASTER Global Elevation".to_string(),
            description: "Global topographic relief shading from ASTER GDEM dataset".to_string(),
            category: LayerCategory::Earth,
            format: ImageFormat::Jpeg,
            tile_matrix_set: TileMatrixSet::new("GoogleMapsCompatible_Level8"),
            temporal: false,
            start_date: None,
            end_date: None,
        },
    ]
}
