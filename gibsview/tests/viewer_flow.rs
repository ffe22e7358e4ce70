//! End-to-end viewer flows against a file-backed annotation store: clicking
//! the map to create an annotation, reopening the viewer, and moving
//! annotations between installations via export/import.

use chrono::NaiveDate;
use gibsview::render::{MapAdapter, MapView, RenderResult};
use gibsview::session::ViewerSession;
use gibsview_core::annotations::{AnnotationCategory, AnnotationStore, FilePersistence};
use gibsview_core::catalog::LayerCatalog;
use gibsview_core::locations::FeaturedCatalog;
use gibsview_tile_utils::LatLng;

/// Adapter test double that "clicks" a scripted list of points.
struct ScriptedClicks {
    clicks: Vec<LatLng>,
}

impl MapAdapter for ScriptedClicks {
    fn render(&mut self, _view: &MapView, on_click: &mut dyn FnMut(LatLng)) -> RenderResult<()> {
        for &at in &self.clicks {
            on_click(at);
        }
        Ok(())
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn open_session(path: &std::path::Path) -> ViewerSession<FilePersistence> {
    let store = AnnotationStore::open(FilePersistence::new(path)).unwrap();
    ViewerSession::new(LayerCatalog::default(), FeaturedCatalog::default(), store)
}

#[test]
fn click_to_annotation_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("annotations.json");

    let mut session = open_session(&path);
    session.select_layer("MODIS_Aqua_CorrectedReflectance_TrueColor");
    session.set_date(ymd(2024, 1, 15));

    // the user clicks the reef and submits the annotation form
    let mut adapter = ScriptedClicks {
        clicks: vec![LatLng::new(-18.2871, 147.6992)],
    };
    let mut clicked = Vec::new();
    let view = session.map_view().unwrap();
    adapter.render(&view, &mut |at| clicked.push(at)).unwrap();
    assert_eq!(clicked.len(), 1);

    let created = session
        .annotate(
            clicked[0],
            "Reef",
            "coral bleaching along the outer reef",
            AnnotationCategory::Natural,
            vec!["reef".to_string()],
        )
        .unwrap();
    assert_eq!(created.layer_id, "MODIS_Aqua_CorrectedReflectance_TrueColor");
    assert_eq!(created.date, ymd(2024, 1, 15));

    // a fresh session on the same file sees the annotation as a marker
    let reopened = open_session(&path);
    assert_eq!(reopened.store().len(), 1);
    let view = reopened.map_view().unwrap();
    assert_eq!(view.markers.len(), 1);
    assert_eq!(view.markers[0].label, "Reef");
    assert_eq!(view.markers[0].position, clicked[0]);
}

#[test]
fn export_moves_annotations_between_installations() {
    let dir = tempfile::tempdir().unwrap();

    let mut source = open_session(&dir.path().join("laptop.json"));
    source
        .annotate(
            LatLng::new(64.0, -19.0),
            "Eruption plume",
            "",
            AnnotationCategory::Natural,
            vec![],
        )
        .unwrap();
    source
        .annotate(
            LatLng::new(35.6762, 139.6503),
            "Night lights",
            "",
            AnnotationCategory::Human,
            vec![],
        )
        .unwrap();
    let exported = source.store().export().unwrap();

    let mut target = open_session(&dir.path().join("desktop.json"));
    target
        .annotate(
            LatLng::new(0.0, 0.0),
            "Scratch note",
            "",
            AnnotationCategory::Other,
            vec![],
        )
        .unwrap();

    // import replaces the target's list wholesale
    let count = target.store_mut().import(&exported).unwrap();
    assert_eq!(count, 2);
    assert_eq!(
        target.store().annotations(),
        source.store().annotations(),
        "imported list must match the exported one"
    );

    // and the replacement is itself persisted
    let reopened = open_session(&dir.path().join("desktop.json"));
    assert_eq!(reopened.store().annotations(), source.store().annotations());
}

#[test]
fn rejected_import_leaves_the_installation_intact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("annotations.json");

    let mut session = open_session(&path);
    session
        .annotate(
            LatLng::new(45.0, 60.0),
            "Shoreline retreat",
            "",
            AnnotationCategory::Natural,
            vec![],
        )
        .unwrap();
    let before = session.store().annotations().to_vec();

    assert!(session.store_mut().import("not json").is_err());
    assert_eq!(session.store().annotations(), before);

    let reopened = open_session(&path);
    assert_eq!(reopened.store().annotations(), before);
}
