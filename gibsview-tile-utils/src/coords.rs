//! Geographic coordinates and range validation.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// A coordinate component outside its allowed range.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum CoordError {
    #[error("latitude {0} is out of range, must be between -90 and 90")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is out of range, must be between -180 and 180")]
    LongitudeOutOfRange(f64),
}

/// A geographic point in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a point without range checking.
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Creates a point, rejecting out-of-range components.
    ///
    /// Latitude must lie in [-90, 90] and longitude in [-180, 180].
    pub fn validated(lat: f64, lng: f64) -> Result<Self, CoordError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(CoordError::LongitudeOutOfRange(lng));
        }
        Ok(Self { lat, lng })
    }

    /// Whether both components are within range.
    #[must_use]
    pub fn is_in_range(&self) -> bool {
        Self::validated(self.lat, self.lng).is_ok()
    }
}

impl Display for LatLng {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lng)
    }
}
