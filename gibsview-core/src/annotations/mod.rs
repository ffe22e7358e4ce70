//! The store of user-created annotations: geolocated notes bound to the
//! imagery layer and date that were on screen when the note was made.
//!
//! The store owns an ordered in-memory list and mirrors every mutation
//! through an injected [`AnnotationPersistence`] backend (write-through).
//! Insertion order defines iteration order; annotations are only ever
//! removed by an explicit [`remove`](AnnotationStore::remove) or replaced
//! wholesale by [`import`](AnnotationStore::import).

use std::fmt::{self, Display, Formatter};

use chrono::{NaiveDate, Utc};
use gibsview_tile_utils::{CoordError, LatLng};
use log::debug;
use rand::distr::{Alphanumeric, SampleString as _};
use serde::{Deserialize, Serialize};

mod persistence;
pub use persistence::{AnnotationPersistence, FilePersistence, MemoryPersistence, PersistenceError};

/// A convenience [`Result`] for annotation store operations.
pub type AnnotationResult<T> = Result<T, AnnotationError>;

/// Errors from annotation store operations.
#[derive(thiserror::Error, Debug)]
pub enum AnnotationError {
    /// Import data was not a JSON array of well-formed annotation records.
    /// The store's prior state is untouched.
    #[error("import data is not a valid annotation array: {0}")]
    MalformedImport(#[source] serde_json::Error),

    /// The annotation list could not be serialized for export.
    #[error("failed to serialize annotations: {0}")]
    Export(#[source] serde_json::Error),

    /// An annotation's coordinates were outside the valid range.
    #[error(transparent)]
    Coordinates(#[from] CoordError),

    /// The persistence backend failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Kind of feature an annotation marks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum AnnotationCategory {
    /// Natural feature.
    Natural,
    /// Weather event.
    Weather,
    /// Human activity.
    Human,
    /// Astronomical phenomenon.
    Astronomical,
    /// Anything else.
    Other,
}

impl Display for AnnotationCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Natural => "natural",
            Self::Weather => "weather",
            Self::Human => "human",
            Self::Astronomical => "astronomical",
            Self::Other => "other",
        })
    }
}

/// A user-created, geolocated note.
///
/// `layer_id` references the imagery layer that was active when the note was
/// made; it is not checked against the catalog. `id` and `created_at` are
/// assigned by the store and never change afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    /// Store-assigned unique identifier.
    pub id: String,
    /// Latitude at time of placement.
    pub lat: f64,
    /// Longitude at time of placement.
    pub lng: f64,
    /// Short label.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Kind of feature the note marks.
    pub category: AnnotationCategory,
    /// Id of the imagery layer that was on screen.
    pub layer_id: String,
    /// Calendar date the viewer was showing.
    pub date: NaiveDate,
    /// Creation timestamp in epoch milliseconds, assigned by the store.
    pub created_at: i64,
    /// Free-form tags, possibly empty, order preserved.
    pub tags: Vec<String>,
}

/// Payload for creating an annotation; the store assigns `id` and
/// `created_at`.
#[derive(Clone, Debug, PartialEq)]
pub struct NewAnnotation {
    /// Latitude of the annotated point.
    pub lat: f64,
    /// Longitude of the annotated point.
    pub lng: f64,
    /// Short label.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Kind of feature the note marks.
    pub category: AnnotationCategory,
    /// Id of the imagery layer on screen.
    pub layer_id: String,
    /// Calendar date the viewer was showing.
    pub date: NaiveDate,
    /// Free-form tags.
    pub tags: Vec<String>,
}

/// Partial update for an existing annotation.
///
/// `id` and `created_at` are deliberately absent: they cannot be changed
/// through an update.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnnotationUpdate {
    /// New latitude, if changing.
    pub lat: Option<f64>,
    /// New longitude, if changing.
    pub lng: Option<f64>,
    /// New title, if changing.
    pub title: Option<String>,
    /// New description, if changing.
    pub description: Option<String>,
    /// New category, if changing.
    pub category: Option<AnnotationCategory>,
    /// New layer reference, if changing.
    pub layer_id: Option<String>,
    /// New viewer date, if changing.
    pub date: Option<NaiveDate>,
    /// Replacement tag list, if changing.
    pub tags: Option<Vec<String>>,
}

fn generate_id(created_at: i64) -> String {
    let suffix = Alphanumeric
        .sample_string(&mut rand::rng(), 9)
        .to_ascii_lowercase();
    format!("ann_{created_at}_{suffix}")
}

/// The ordered, write-through annotation store.
#[derive(Debug)]
pub struct AnnotationStore<P> {
    annotations: Vec<Annotation>,
    persistence: P,
}

impl<P: AnnotationPersistence> AnnotationStore<P> {
    /// Opens the store, loading whatever the backend has persisted.
    ///
    /// An empty backend (e.g. a file that does not exist yet) yields an
    /// empty store.
    pub fn open(persistence: P) -> AnnotationResult<Self> {
        let annotations = persistence.load()?;
        debug!("loaded {} annotations", annotations.len());
        Ok(Self {
            annotations,
            persistence,
        })
    }

    /// Creates an annotation, assigning a fresh id and creation timestamp,
    /// and appends it to the end of the list.
    ///
    /// Coordinates are validated against the geographic range; everything
    /// else is stored as given.
    pub fn add(&mut self, new: NewAnnotation) -> AnnotationResult<Annotation> {
        LatLng::validated(new.lat, new.lng)?;
        let created_at = Utc::now().timestamp_millis();
        let annotation = Annotation {
            id: generate_id(created_at),
            lat: new.lat,
            lng: new.lng,
            title: new.title,
            description: new.description,
            category: new.category,
            layer_id: new.layer_id,
            date: new.date,
            created_at,
            tags: new.tags,
        };
        self.annotations.push(annotation.clone());
        self.persistence.save(&self.annotations)?;
        Ok(annotation)
    }

    /// Removes the annotation with the given id. Removing an unknown id is
    /// not an error; the list is persisted either way.
    pub fn remove(&mut self, id: &str) -> AnnotationResult<()> {
        let before = self.annotations.len();
        self.annotations.retain(|a| a.id != id);
        if self.annotations.len() == before {
            debug!("no annotation {id} to remove");
        }
        self.persistence.save(&self.annotations)?;
        Ok(())
    }

    /// Merges the supplied fields into the annotation with the given id,
    /// leaving unspecified fields untouched. Updating an unknown id is not
    /// an error; the list is persisted either way.
    pub fn update(&mut self, id: &str, update: AnnotationUpdate) -> AnnotationResult<()> {
        if let Some(annotation) = self.annotations.iter_mut().find(|a| a.id == id) {
            let lat = update.lat.unwrap_or(annotation.lat);
            let lng = update.lng.unwrap_or(annotation.lng);
            LatLng::validated(lat, lng)?;
            annotation.lat = lat;
            annotation.lng = lng;
            if let Some(title) = update.title {
                annotation.title = title;
            }
            if let Some(description) = update.description {
                annotation.description = description;
            }
            if let Some(category) = update.category {
                annotation.category = category;
            }
            if let Some(layer_id) = update.layer_id {
                annotation.layer_id = layer_id;
            }
            if let Some(date) = update.date {
                annotation.date = date;
            }
            if let Some(tags) = update.tags {
                annotation.tags = tags;
            }
        } else {
            debug!("no annotation {id} to update");
        }
        self.persistence.save(&self.annotations)?;
        Ok(())
    }

    /// The full list in insertion order.
    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Annotations made on the given layer, in insertion order.
    pub fn by_layer<'a>(&'a self, layer_id: &'a str) -> impl Iterator<Item = &'a Annotation> {
        self.annotations.iter().filter(move |a| a.layer_id == layer_id)
    }

    /// Number of annotations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    /// Whether the store holds no annotations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Serializes the full list as pretty-printed JSON, suitable for
    /// re-import.
    pub fn export(&self) -> AnnotationResult<String> {
        serde_json::to_string_pretty(&self.annotations).map_err(AnnotationError::Export)
    }

    /// Parses `data` as a JSON array of annotation records and replaces the
    /// store's contents wholesale (not merged), returning how many records
    /// were imported.
    ///
    /// Malformed input, including an array with records of the wrong shape,
    /// is rejected with [`AnnotationError::MalformedImport`] and leaves the
    /// existing list untouched.
    pub fn import(&mut self, data: &str) -> AnnotationResult<usize> {
        let imported: Vec<Annotation> =
            serde_json::from_str(data).map_err(AnnotationError::MalformedImport)?;
        let count = imported.len();
        self.annotations = imported;
        self.persistence.save(&self.annotations)?;
        debug!("imported {count} annotations");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn new_annotation(title: &str) -> NewAnnotation {
        NewAnnotation {
            lat: -18.2871,
            lng: 147.6992,
            title: title.to_string(),
            description: "coral bleaching along the outer reef".to_string(),
            category: AnnotationCategory::Natural,
            layer_id: "MODIS_Aqua_CorrectedReflectance_TrueColor".to_string(),
            date: ymd(2024, 1, 15),
            tags: vec!["reef".to_string(), "ocean".to_string()],
        }
    }

    fn open_store() -> AnnotationStore<MemoryPersistence> {
        AnnotationStore::open(MemoryPersistence::default()).unwrap()
    }

    #[test]
    fn add_assigns_id_and_timestamp() {
        let mut store = open_store();
        let created = store.add(new_annotation("Reef")).unwrap();
        assert!(created.id.starts_with("ann_"));
        assert!(created.created_at > 0);
        assert_eq!(store.annotations(), &[created]);
    }

    #[test]
    fn add_rejects_out_of_range_coordinates() {
        let mut store = open_store();
        let mut bad = new_annotation("Nowhere");
        bad.lat = 95.0;
        let err = store.add(bad).unwrap_err();
        assert!(matches!(
            err,
            AnnotationError::Coordinates(CoordError::LatitudeOutOfRange(_))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn ids_are_unique_across_adds() {
        let mut store = open_store();
        let a = store.add(new_annotation("a")).unwrap();
        let b = store.add(new_annotation("b")).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut store = open_store();
        for title in ["first", "second", "third"] {
            store.add(new_annotation(title)).unwrap();
        }
        let titles: Vec<_> = store.annotations().iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["first", "second", "third"]);
    }

    #[test]
    fn remove_restores_pre_add_state() {
        let mut store = open_store();
        let kept = store.add(new_annotation("kept")).unwrap();
        let before = store.annotations().to_vec();

        let added = store.add(new_annotation("doomed")).unwrap();
        store.remove(&added.id).unwrap();

        assert_eq!(store.annotations(), before);
        assert_eq!(store.annotations()[0], kept);
    }

    #[test]
    fn remove_of_unknown_id_is_a_no_op() {
        let mut store = open_store();
        store.add(new_annotation("stays")).unwrap();
        store.remove("ann_0_missing").unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn update_changes_only_supplied_fields() {
        let mut store = open_store();
        let original = store.add(new_annotation("Reef")).unwrap();

        store
            .update(
                &original.id,
                AnnotationUpdate {
                    title: Some("Bleached reef".to_string()),
                    ..AnnotationUpdate::default()
                },
            )
            .unwrap();

        let updated = &store.annotations()[0];
        assert_eq!(updated.title, "Bleached reef");
        assert_eq!(
            Annotation {
                title: original.title.clone(),
                ..updated.clone()
            },
            original
        );
    }

    #[test]
    fn update_cannot_touch_id_or_created_at() {
        // The update payload has no id/created_at fields; verify the merge
        // leaves them intact even when everything else changes.
        let mut store = open_store();
        let original = store.add(new_annotation("Reef")).unwrap();

        store
            .update(
                &original.id,
                AnnotationUpdate {
                    lat: Some(0.0),
                    lng: Some(0.0),
                    title: Some("x".to_string()),
                    description: Some("y".to_string()),
                    category: Some(AnnotationCategory::Other),
                    layer_id: Some("BlueMarble_NextGeneration".to_string()),
                    date: Some(ymd(2020, 6, 1)),
                    tags: Some(vec![]),
                },
            )
            .unwrap();

        let updated = &store.annotations()[0];
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
    }

    #[test]
    fn update_of_unknown_id_is_a_no_op() {
        let mut store = open_store();
        let original = store.add(new_annotation("Reef")).unwrap();
        store
            .update(
                "ann_0_missing",
                AnnotationUpdate {
                    title: Some("x".to_string()),
                    ..AnnotationUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(store.annotations(), &[original]);
    }

    #[test]
    fn by_layer_filters_in_insertion_order() {
        let mut store = open_store();
        store.add(new_annotation("reef one")).unwrap();
        let mut other = new_annotation("desert");
        other.layer_id = "MODIS_Terra_CorrectedReflectance_TrueColor".to_string();
        store.add(other).unwrap();
        store.add(new_annotation("reef two")).unwrap();

        let titles: Vec<_> = store
            .by_layer("MODIS_Aqua_CorrectedReflectance_TrueColor")
            .map(|a| a.title.as_str())
            .collect();
        assert_eq!(titles, ["reef one", "reef two"]);
    }

    #[test]
    fn export_import_round_trip() {
        let mut store = open_store();
        store.add(new_annotation("one")).unwrap();
        store.add(new_annotation("two")).unwrap();
        let before = store.annotations().to_vec();

        let exported = store.export().unwrap();
        let count = store.import(&exported).unwrap();

        assert_eq!(count, 2);
        assert_eq!(store.annotations(), before);
    }

    #[test]
    fn import_replaces_wholesale() {
        let mut store = open_store();
        store.add(new_annotation("old")).unwrap();

        let mut donor = open_store();
        donor.add(new_annotation("new one")).unwrap();
        donor.add(new_annotation("new two")).unwrap();

        store.import(&donor.export().unwrap()).unwrap();
        let titles: Vec<_> = store.annotations().iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["new one", "new two"]);
    }

    #[test]
    fn import_of_invalid_json_leaves_state_untouched() {
        let mut store = open_store();
        store.add(new_annotation("survivor")).unwrap();
        let before = store.annotations().to_vec();

        let err = store.import("not json").unwrap_err();
        assert!(matches!(err, AnnotationError::MalformedImport(_)));
        assert_eq!(store.annotations(), before);
    }

    #[test]
    fn import_of_non_array_json_leaves_state_untouched() {
        let mut store = open_store();
        store.add(new_annotation("survivor")).unwrap();
        let before = store.annotations().to_vec();

        for data in [r#"{"id": "ann_1"}"#, "42", r#""[]""#] {
            let err = store.import(data).unwrap_err();
            assert!(matches!(err, AnnotationError::MalformedImport(_)));
        }
        assert_eq!(store.annotations(), before);
    }

    #[test]
    fn import_rejects_malformed_records() {
        let mut store = open_store();
        let err = store
            .import(r#"[{"id": "ann_1", "lat": "not a number"}]"#)
            .unwrap_err();
        assert!(matches!(err, AnnotationError::MalformedImport(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn every_mutation_writes_through() {
        let mut store = open_store();
        let added = store.add(new_annotation("Reef")).unwrap();
        store
            .update(
                &added.id,
                AnnotationUpdate {
                    title: Some("x".to_string()),
                    ..AnnotationUpdate::default()
                },
            )
            .unwrap();
        store.remove(&added.id).unwrap();
        store.import("[]").unwrap();
        assert_eq!(store.persistence.save_count(), 4);
    }

    #[test]
    fn export_format_is_stable() {
        let mut store = open_store();
        store
            .import(
                r#"[{"id":"ann_1700000000000_k3j9v2m1q","lat":-18.2871,"lng":147.6992,"title":"Reef","description":"coral","category":"natural","layerId":"MODIS_Aqua_CorrectedReflectance_TrueColor","date":"2024-01-15","createdAt":1700000000000,"tags":["reef","ocean"]}]"#,
            )
            .unwrap();

        insta::assert_snapshot!(store.export().unwrap(), @r#"
        [
          {
            "id": "ann_1700000000000_k3j9v2m1q",
            "lat": -18.2871,
            "lng": 147.6992,
            "title": "Reef",
            "description": "coral",
            "category": "natural",
            "layerId": "MODIS_Aqua_CorrectedReflectance_TrueColor",
            "date": "2024-01-15",
            "createdAt": 1700000000000,
            "tags": [
              "reef",
              "ocean"
            ]
          }
        ]
        "#);
    }
}
