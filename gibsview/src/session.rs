//! Page-level viewer state: selected layer and date, the optional
//! comparison layer, and the flows that tie the catalogs, the annotation
//! store, and the map adapter together.

use chrono::{Days, NaiveDate, Utc};
use gibsview_core::annotations::{
    Annotation, AnnotationCategory, AnnotationPersistence, AnnotationResult, AnnotationStore,
    NewAnnotation,
};
use gibsview_core::catalog::{GIBS_BASE_URL, ImageryLayer, LayerCatalog};
use gibsview_core::locations::{FeaturedCatalog, FeaturedLocation};
use gibsview_tile_utils::{CoordError, LatLng};
use log::warn;

use crate::render::{MapView, Marker, TileLayerSpec};

/// Opacity applied to both layers while comparing.
const SPLIT_OPACITY: u8 = 50;

/// How many days before the primary date the comparison date starts at.
const COMPARE_OFFSET_DAYS: u64 = 7;

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// The state of one viewer, bundling the catalogs and the annotation store.
///
/// Selection setters follow the catalogs' not-found convention: an unknown
/// layer id or location name leaves the current selection unchanged rather
/// than failing.
#[derive(Debug)]
pub struct ViewerSession<P> {
    catalog: LayerCatalog,
    locations: FeaturedCatalog,
    store: AnnotationStore<P>,
    base_url: String,
    layer: Option<String>,
    date: NaiveDate,
    compare_layer: Option<String>,
    compare_date: NaiveDate,
    opacity: u8,
    center: Option<LatLng>,
    zoom: Option<u8>,
}

impl<P: AnnotationPersistence> ViewerSession<P> {
    /// Creates a session showing the first catalog layer at today's date
    /// (UTC calendar), with the comparison date a week back and no
    /// comparison layer selected.
    #[must_use]
    pub fn new(
        catalog: LayerCatalog,
        locations: FeaturedCatalog,
        store: AnnotationStore<P>,
    ) -> Self {
        let today = today();
        Self {
            layer: catalog.first().map(|layer| layer.id.clone()),
            catalog,
            locations,
            store,
            base_url: GIBS_BASE_URL.to_string(),
            date: today,
            compare_layer: None,
            compare_date: today
                .checked_sub_days(Days::new(COMPARE_OFFSET_DAYS))
                .unwrap_or(today),
            opacity: 100,
            center: None,
            zoom: None,
        }
    }

    /// Points tile-URL templates at a different service root.
    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.base_url = base_url.into();
    }

    /// Selects the layer with the given id. An unknown id keeps the current
    /// selection and returns false.
    pub fn select_layer(&mut self, id: &str) -> bool {
        if self.catalog.get(id).is_some() {
            self.layer = Some(id.to_string());
            true
        } else {
            warn!("unknown layer {id}, keeping current selection");
            false
        }
    }

    /// The currently selected layer, if the catalog is not empty.
    #[must_use]
    pub fn selected_layer(&self) -> Option<&ImageryLayer> {
        self.catalog.get(self.layer.as_deref()?)
    }

    /// The date the viewer is showing.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Shows the given date.
    pub fn set_date(&mut self, date: NaiveDate) {
        self.date = date;
    }

    /// Steps the shown date one day back.
    pub fn previous_day(&mut self) {
        self.date = self.date.pred_opt().unwrap_or(self.date);
    }

    /// Steps the shown date one day forward, capped at today.
    pub fn next_day(&mut self) {
        let next = self.date.succ_opt().unwrap_or(self.date);
        self.date = next.min(today());
    }

    /// Jumps the shown date the given number of days back.
    pub fn jump_back(&mut self, days: u64) {
        self.date = self.date.checked_sub_days(Days::new(days)).unwrap_or(self.date);
    }

    /// Shows today's date.
    pub fn jump_to_today(&mut self) {
        self.date = today();
    }

    /// Selects the comparison layer, enabling split view; `None` clears the
    /// comparison. An unknown id keeps the current state and returns false.
    pub fn set_compare_layer(&mut self, id: Option<&str>) -> bool {
        match id {
            None => {
                self.compare_layer = None;
                true
            }
            Some(id) if self.catalog.get(id).is_some() => {
                self.compare_layer = Some(id.to_string());
                true
            }
            Some(id) => {
                warn!("unknown compare layer {id}, keeping current state");
                false
            }
        }
    }

    /// The comparison layer, when split view is enabled.
    #[must_use]
    pub fn compare_layer(&self) -> Option<&ImageryLayer> {
        self.catalog.get(self.compare_layer.as_deref()?)
    }

    /// The date shown on the comparison side.
    #[must_use]
    pub fn compare_date(&self) -> NaiveDate {
        self.compare_date
    }

    /// Sets the date shown on the comparison side.
    pub fn set_compare_date(&mut self, date: NaiveDate) {
        self.compare_date = date;
    }

    /// Primary layer opacity in percent.
    #[must_use]
    pub fn opacity(&self) -> u8 {
        self.opacity
    }

    /// Sets the primary layer opacity, clamped to 100%.
    pub fn set_opacity(&mut self, percent: u8) {
        self.opacity = percent.min(100);
    }

    /// Validates a coordinate search and moves the view center there.
    ///
    /// Out-of-range input is rejected without any state change. Actually
    /// panning is the map widget's capability; the session only records the
    /// target.
    pub fn goto(&mut self, lat: f64, lng: f64) -> Result<LatLng, CoordError> {
        let target = LatLng::validated(lat, lng)?;
        self.center = Some(target);
        self.zoom = None;
        Ok(target)
    }

    /// Moves the view to a featured location and switches to its recommended
    /// layer. A recommendation that does not resolve in the catalog leaves
    /// the layer selection unchanged; an unknown name changes nothing.
    pub fn visit(&mut self, name: &str) -> Option<FeaturedLocation> {
        let location = self.locations.find(name)?.clone();
        self.center = Some(location.position);
        self.zoom = location.zoom;
        if self.catalog.get(&location.recommended_layer).is_some() {
            self.layer = Some(location.recommended_layer.clone());
        } else {
            warn!(
                "featured location {} recommends unknown layer {}",
                location.name, location.recommended_layer
            );
        }
        Some(location)
    }

    /// Creates an annotation at `at`, bound to the selected layer and the
    /// shown date (the click-to-annotate flow).
    pub fn annotate(
        &mut self,
        at: LatLng,
        title: impl Into<String>,
        description: impl Into<String>,
        category: AnnotationCategory,
        tags: Vec<String>,
    ) -> AnnotationResult<Annotation> {
        self.store.add(NewAnnotation {
            lat: at.lat,
            lng: at.lng,
            title: title.into(),
            description: description.into(),
            category,
            layer_id: self.layer.clone().unwrap_or_default(),
            date: self.date,
            tags,
        })
    }

    /// The layer catalog.
    #[must_use]
    pub fn catalog(&self) -> &LayerCatalog {
        &self.catalog
    }

    /// The featured location catalog.
    #[must_use]
    pub fn locations(&self) -> &FeaturedCatalog {
        &self.locations
    }

    /// The annotation store.
    #[must_use]
    pub fn store(&self) -> &AnnotationStore<P> {
        &self.store
    }

    /// The annotation store, for direct mutation.
    pub fn store_mut(&mut self) -> &mut AnnotationStore<P> {
        &mut self.store
    }

    /// Projects the session into the view handed to a map adapter, or `None`
    /// when the catalog has no layers.
    ///
    /// In split view both layers render at 50% opacity; otherwise the
    /// primary layer uses the session opacity.
    #[must_use]
    pub fn map_view(&self) -> Option<MapView> {
        let compare = self
            .compare_layer()
            .map(|layer| self.layer_spec(layer, self.compare_date, SPLIT_OPACITY));
        let opacity = if compare.is_some() {
            SPLIT_OPACITY
        } else {
            self.opacity
        };
        let primary = self.layer_spec(self.selected_layer()?, self.date, opacity);
        Some(MapView {
            primary,
            compare,
            center: self.center,
            zoom: self.zoom,
            markers: self
                .store
                .annotations()
                .iter()
                .map(|a| Marker {
                    position: LatLng::new(a.lat, a.lng),
                    label: a.title.clone(),
                })
                .collect(),
        })
    }

    fn layer_spec(&self, layer: &ImageryLayer, date: NaiveDate, opacity: u8) -> TileLayerSpec {
        TileLayerSpec {
            name: layer.name.clone(),
            template: layer.tile_url_template_with_base(&self.base_url, Some(date)),
            opacity,
            max_zoom: layer.tile_matrix_set.max_zoom(),
        }
    }
}
