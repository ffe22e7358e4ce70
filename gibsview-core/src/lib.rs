#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

/// User-created, geolocated notes with pluggable persistence.
pub mod annotations;

/// Imagery layers, date validity, and tile-URL templates.
pub mod catalog;

/// Curated points of interest.
pub mod locations;
