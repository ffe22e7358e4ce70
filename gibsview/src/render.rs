//! The seam between the viewer session and a map widget.
//!
//! A [`MapView`] is everything a widget needs to draw the current state:
//! tile-URL templates with literal `{z}/{y}/{x}` placeholders, an optional
//! comparison layer, a center to look at, and the annotation markers. The
//! widget reports user clicks back through the `on_click` callback; what it
//! does with the templates (fetching, panning, zooming) is entirely its own
//! business.

use std::io::{self, Write};

use gibsview_tile_utils::LatLng;

/// Attribution line required by the GIBS terms of use.
pub const GIBS_ATTRIBUTION: &str = "Imagery courtesy NASA EOSDIS GIBS";

/// A convenience [`Result`] for adapter rendering.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors from rendering a view.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("failed to write view: {0}")]
    Io(#[from] io::Error),
}

/// One tile layer, ready for a map widget.
#[derive(Clone, Debug, PartialEq)]
pub struct TileLayerSpec {
    /// Display name of the layer.
    pub name: String,
    /// URL template with literal `{z}/{y}/{x}` placeholders, substituted by
    /// the widget per tile.
    pub template: String,
    /// Opacity in percent.
    pub opacity: u8,
    /// Zoom ceiling from the layer's tile matrix set, if it has one.
    pub max_zoom: Option<u8>,
}

/// An annotation rendered as a labelled pin.
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub position: LatLng,
    pub label: String,
}

/// Projection of the viewer session handed to a [`MapAdapter`].
#[derive(Clone, Debug, PartialEq)]
pub struct MapView {
    /// The selected layer.
    pub primary: TileLayerSpec,
    /// Second layer shown at reduced opacity in comparison mode.
    pub compare: Option<TileLayerSpec>,
    /// Where to look, when the user navigated somewhere.
    pub center: Option<LatLng>,
    /// Zoom suited to the current target.
    pub zoom: Option<u8>,
    /// One pin per annotation, in insertion order.
    pub markers: Vec<Marker>,
}

/// Renders [`MapView`]s and reports user clicks.
pub trait MapAdapter {
    /// Draws `view`. Geographic coordinates of any user click are reported
    /// through `on_click`.
    fn render(&mut self, view: &MapView, on_click: &mut dyn FnMut(LatLng)) -> RenderResult<()>;
}

/// Adapter that writes a plain-text rendition of the view. It has no input
/// surface, so it never reports clicks.
#[derive(Debug)]
pub struct TextAdapter<W> {
    out: W,
}

impl<W: Write> TextAdapter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_layer(&mut self, heading: &str, layer: &TileLayerSpec) -> io::Result<()> {
        write!(self.out, "{heading}: {} (opacity {}%", layer.name, layer.opacity)?;
        if let Some(max_zoom) = layer.max_zoom {
            write!(self.out, ", max zoom {max_zoom}")?;
        }
        writeln!(self.out, ")")?;
        writeln!(self.out, "  {}", layer.template)
    }
}

impl<W: Write> MapAdapter for TextAdapter<W> {
    fn render(&mut self, view: &MapView, _on_click: &mut dyn FnMut(LatLng)) -> RenderResult<()> {
        self.write_layer("Layer", &view.primary)?;
        if let Some(compare) = &view.compare {
            self.write_layer("Compare", compare)?;
        }
        if let Some(center) = view.center {
            write!(self.out, "Center: {center}")?;
            if let Some(zoom) = view.zoom {
                write!(self.out, " (zoom {zoom})")?;
            }
            writeln!(self.out)?;
        }
        if !view.markers.is_empty() {
            writeln!(self.out, "Markers:")?;
            for marker in &view.markers {
                writeln!(self.out, "  {}: {}", marker.label, marker.position)?;
            }
        }
        writeln!(self.out, "{GIBS_ATTRIBUTION}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_view() -> MapView {
        MapView {
            primary: TileLayerSpec {
                name: "VIIRS True Color".to_string(),
                template:
                    "https://gibs.earthdata.nasa.gov/wmts/epsg3857/best/VIIRS_SNPP_CorrectedReflectance_TrueColor/default/2024-01-15/GoogleMapsCompatible_Level9/{z}/{y}/{x}.jpeg"
                        .to_string(),
                opacity: 50,
                max_zoom: Some(9),
            },
            compare: Some(TileLayerSpec {
                name: "Blue Marble".to_string(),
                template:
                    "https://gibs.earthdata.nasa.gov/wmts/epsg3857/best/BlueMarble_NextGeneration/default/default/GoogleMapsCompatible_Level8/{z}/{y}/{x}.jpeg"
                        .to_string(),
                opacity: 50,
                max_zoom: Some(8),
            }),
            center: Some(LatLng::new(-18.2871, 147.6992)),
            zoom: Some(7),
            markers: vec![Marker {
                position: LatLng::new(-18.2871, 147.6992),
                label: "Reef".to_string(),
            }],
        }
    }

    fn render_to_string(view: &MapView) -> String {
        let mut adapter = TextAdapter::new(Vec::new());
        adapter.render(view, &mut |_| {}).unwrap();
        String::from_utf8(adapter.into_inner()).unwrap()
    }

    #[test]
    fn full_view_rendition() {
        insta::assert_snapshot!(render_to_string(&sample_view()), @r"
        Layer: VIIRS True Color (opacity 50%, max zoom 9)
          https://gibs.earthdata.nasa.gov/wmts/epsg3857/best/VIIRS_SNPP_CorrectedReflectance_TrueColor/default/2024-01-15/GoogleMapsCompatible_Level9/{z}/{y}/{x}.jpeg
        Compare: Blue Marble (opacity 50%, max zoom 8)
          https://gibs.earthdata.nasa.gov/wmts/epsg3857/best/BlueMarble_NextGeneration/default/default/GoogleMapsCompatible_Level8/{z}/{y}/{x}.jpeg
        Center: -18.2871, 147.6992 (zoom 7)
        Markers:
          Reef: -18.2871, 147.6992
        Imagery courtesy NASA EOSDIS GIBS
        ");
    }

    #[test]
    fn minimal_view_skips_empty_sections() {
        let view = MapView {
            compare: None,
            center: None,
            zoom: None,
            markers: vec![],
            ..sample_view()
        };
        let text = render_to_string(&view);
        assert!(!text.contains("Compare:"));
        assert!(!text.contains("Center:"));
        assert!(!text.contains("Markers:"));
        assert!(text.ends_with(&format!("{GIBS_ATTRIBUTION}\n")));
    }

    #[test]
    fn text_adapter_never_clicks() {
        let mut clicks = Vec::new();
        let mut adapter = TextAdapter::new(Vec::new());
        adapter
            .render(&sample_view(), &mut |at| clicks.push(at))
            .unwrap();
        assert!(clicks.is_empty());
    }
}
