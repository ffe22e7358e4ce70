#![doc = include_str!("../README.md")]

use std::fmt::{self, Display, Formatter};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

mod coords;
pub use coords::{CoordError, LatLng};

/// Raster format of an imagery layer's tiles.
///
/// GIBS serves raster layers as either JPEG or PNG. The format decides the
/// file suffix of per-tile URLs, so it is kept as an enum rather than a free
/// MIME string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    /// Parses a format from either a bare suffix (`jpeg`, `jpg`, `png`) or a
    /// MIME type (`image/jpeg`, `image/png`).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "image/jpeg" => Self::Jpeg,
            "png" | "image/png" => Self::Png,
            _ => None?,
        })
    }

    /// MIME type, as it appears in layer descriptors.
    #[must_use]
    pub fn content_type(&self) -> &str {
        match *self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// File suffix used in tile URLs (the MIME subtype).
    #[must_use]
    pub fn extension(&self) -> &str {
        match *self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }
}

impl Display for ImageFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

// On the wire the format is the MIME string, matching the layer descriptors
// published by the tile service.
impl Serialize for ImageFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.content_type())
    }
}

impl<'de> Deserialize<'de> for ImageFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value)
            .ok_or_else(|| D::Error::custom(format!("unsupported tile format {value:?}")))
    }
}

/// Name of the tiling scheme a layer is published under, e.g.
/// `GoogleMapsCompatible_Level9`.
///
/// The trailing `Level{N}` suffix, when present, is the zoom-level ceiling
/// for the layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileMatrixSet(String);

impl TileMatrixSet {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Maximum zoom level encoded in the scheme name, if any.
    #[must_use]
    pub fn max_zoom(&self) -> Option<u8> {
        let (_, level) = self.0.rsplit_once("Level")?;
        level.parse().ok()
    }
}

impl Display for TileMatrixSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TileMatrixSet {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
