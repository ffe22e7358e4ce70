//! File-backed persistence behind the annotation store: a single JSON array
//! per file, written through on every mutation.

use gibsview_core::annotations::{
    Annotation, AnnotationCategory, AnnotationPersistence as _, AnnotationStore, FilePersistence,
    NewAnnotation, PersistenceError,
};

fn sample_annotation(id: &str) -> Annotation {
    Annotation {
        id: id.to_string(),
        lat: -18.2871,
        lng: 147.6992,
        title: "Reef".to_string(),
        description: "coral bleaching".to_string(),
        category: AnnotationCategory::Natural,
        layer_id: "MODIS_Aqua_CorrectedReflectance_TrueColor".to_string(),
        date: chrono::NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        created_at: 1_700_000_000_000,
        tags: vec!["reef".to_string()],
    }
}

#[test]
fn missing_file_loads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let persistence = FilePersistence::new(dir.path().join("annotations.json"));
    assert!(persistence.load().unwrap().is_empty());
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let persistence = FilePersistence::new(dir.path().join("annotations.json"));
    let annotations = vec![sample_annotation("ann_1"), sample_annotation("ann_2")];

    persistence.save(&annotations).unwrap();
    assert_eq!(persistence.load().unwrap(), annotations);
}

#[test]
fn save_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("state").join("gibsview").join("annotations.json");
    let persistence = FilePersistence::new(&nested);

    persistence.save(&[sample_annotation("ann_1")]).unwrap();
    assert!(nested.exists());
    assert_eq!(persistence.load().unwrap().len(), 1);
}

#[test]
fn saved_file_is_a_pretty_printed_json_array() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("annotations.json");
    FilePersistence::new(&path)
        .save(&[sample_annotation("ann_1")])
        .unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.starts_with("[\n  {\n"));
    assert!(contents.contains(r#""layerId": "MODIS_Aqua_CorrectedReflectance_TrueColor""#));
    assert!(contents.contains(r#""createdAt": 1700000000000"#));
}

#[test]
fn corrupt_file_is_reported_not_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("annotations.json");
    std::fs::write(&path, "{ definitely not an array").unwrap();

    let err = FilePersistence::new(&path).load().unwrap_err();
    assert!(matches!(err, PersistenceError::Corrupt(..)));
}

#[test]
fn store_mutations_write_through_to_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("annotations.json");

    let mut store = AnnotationStore::open(FilePersistence::new(&path)).unwrap();
    let created = store
        .add(NewAnnotation {
            lat: 64.0,
            lng: -19.0,
            title: "Eruption plume".to_string(),
            description: String::new(),
            category: AnnotationCategory::Natural,
            layer_id: "MODIS_Terra_CorrectedReflectance_Bands721".to_string(),
            date: chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            tags: vec![],
        })
        .unwrap();

    // a second store opened on the same file sees the write immediately
    let other = AnnotationStore::open(FilePersistence::new(&path)).unwrap();
    assert_eq!(other.annotations(), &[created.clone()]);

    store.remove(&created.id).unwrap();
    let other = AnnotationStore::open(FilePersistence::new(&path)).unwrap();
    assert!(other.is_empty());
}
