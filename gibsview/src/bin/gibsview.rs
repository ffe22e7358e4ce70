use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context as _, bail};
use chrono::{NaiveDate, Utc};
use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::{Parser, Subcommand};
use gibsview::config::{DEFAULT_ANNOTATIONS_PATH, ViewerConfig};
use gibsview::render::{MapAdapter as _, TextAdapter};
use gibsview::session::ViewerSession;
use gibsview_core::annotations::{
    AnnotationCategory, AnnotationStore, AnnotationUpdate, FilePersistence, NewAnnotation,
};
use gibsview_core::catalog::{ImageryLayer, LayerCatalog, LayerCategory};
use gibsview_core::locations::{FeaturedCatalog, LocationCategory};
use gibsview_tile_utils::LatLng;
use log::{error, warn};

/// Defines the styles used for the CLI help output.
const HELP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Blue.on_default().bold())
    .usage(AnsiColor::Blue.on_default().bold())
    .literal(AnsiColor::White.on_default())
    .placeholder(AnsiColor::Green.on_default());

#[derive(Parser, PartialEq, Debug)]
#[command(
    version,
    name = "gibsview",
    about = "Browse NASA GIBS satellite imagery layers from the terminal",
    after_help = "Use RUST_LOG environment variable to control logging level, e.g. RUST_LOG=debug or RUST_LOG=gibsview=debug. See https://docs.rs/env_logger/latest/env_logger/index.html#enabling-logging for more information.",
    styles = HELP_STYLES
)]
pub struct Args {
    /// Viewer configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// File holding the persisted annotations
    #[arg(long, value_name = "FILE")]
    annotations_file: Option<PathBuf>,
    /// Tile service root to use instead of the GIBS endpoint
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, PartialEq, Debug)]
enum Commands {
    /// List the imagery layers in the catalog
    #[command(name = "layers")]
    Layers {
        /// Only show layers of this category
        #[arg(long, value_enum)]
        category: Option<LayerCategory>,
    },
    /// Show one layer in detail
    #[command(name = "layer")]
    Layer {
        /// Layer id
        id: String,
        /// Date to check against the layer's coverage
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Print the tile-URL template for a layer
    #[command(name = "tile-url")]
    TileUrl {
        /// Layer id
        id: String,
        /// Date to show; defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List the featured locations
    #[command(name = "locations")]
    Locations {
        /// Only show locations of this category
        #[arg(long, value_enum)]
        category: Option<LocationCategory>,
    },
    /// Validate coordinates and report the navigation target
    #[command(name = "goto", allow_negative_numbers = true)]
    Goto {
        /// Latitude in degrees, -90 to 90
        lat: f64,
        /// Longitude in degrees, -180 to 180
        lng: f64,
    },
    /// Render the current view as text
    #[command(name = "view")]
    View(ViewArgs),
    /// Play the shown date backward over a fixed number of frames
    #[command(name = "timelapse")]
    Timelapse(TimelapseArgs),
    /// Manage stored annotations
    #[command(subcommand, name = "annotations")]
    Annotations(AnnotationsCommand),
}

#[derive(clap::Args, Default, PartialEq, Debug)]
struct ViewArgs {
    /// Layer to show; defaults to the startup layer
    #[arg(long, value_name = "ID")]
    layer: Option<String>,
    /// Date to show; defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Second layer for split view
    #[arg(long, value_name = "ID")]
    compare: Option<String>,
    /// Date shown on the comparison side; defaults to a week ago
    #[arg(long, requires = "compare")]
    compare_date: Option<NaiveDate>,
    /// Primary layer opacity in percent
    #[arg(long, value_name = "PERCENT")]
    opacity: Option<u8>,
    /// Jump to a featured location by name
    #[arg(long, value_name = "NAME")]
    location: Option<String>,
}

#[derive(clap::Args, Default, PartialEq, Debug)]
struct TimelapseArgs {
    /// Layer to animate; defaults to the startup layer
    #[arg(long, value_name = "ID")]
    layer: Option<String>,
    /// Date of the first frame; stepping proceeds one day backward per frame
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Delay between frames
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u64>,
    /// Total animation time
    #[arg(long, value_name = "MS")]
    duration_ms: Option<u64>,
    /// Print all frames immediately instead of sleeping between them
    #[arg(long)]
    no_delay: bool,
}

#[derive(Subcommand, PartialEq, Debug)]
enum AnnotationsCommand {
    /// List annotations
    #[command(name = "list")]
    List {
        /// Only annotations made on this layer
        #[arg(long, value_name = "ID")]
        layer: Option<String>,
    },
    /// Create an annotation
    #[command(name = "add")]
    Add(AddArgs),
    /// Delete an annotation
    #[command(name = "remove", alias = "rm")]
    Remove {
        /// Annotation id
        id: String,
    },
    /// Change fields of an existing annotation
    #[command(name = "update")]
    Update(UpdateArgs),
    /// Write all annotations as JSON
    #[command(name = "export")]
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Replace all annotations with the contents of a JSON file
    #[command(name = "import")]
    Import {
        /// File holding a JSON array of annotations
        file: PathBuf,
    },
}

#[derive(clap::Args, PartialEq, Debug)]
#[command(allow_negative_numbers = true)]
struct AddArgs {
    /// Latitude in degrees, -90 to 90
    lat: f64,
    /// Longitude in degrees, -180 to 180
    lng: f64,
    /// Short label
    #[arg(long)]
    title: String,
    /// Free-text description
    #[arg(long, default_value = "")]
    description: String,
    /// Kind of feature the note marks
    #[arg(long, value_enum, default_value_t = AnnotationCategory::Other)]
    category: AnnotationCategory,
    /// Layer the note belongs to; defaults to the startup layer
    #[arg(long, value_name = "ID")]
    layer: Option<String>,
    /// Viewer date for the note; defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Tag for the note; may be given multiple times
    #[arg(long = "tag", value_name = "TAG")]
    tags: Vec<String>,
}

#[derive(clap::Args, PartialEq, Debug)]
#[command(allow_negative_numbers = true)]
struct UpdateArgs {
    /// Annotation id
    id: String,
    /// New latitude
    #[arg(long)]
    lat: Option<f64>,
    /// New longitude
    #[arg(long)]
    lng: Option<f64>,
    /// New title
    #[arg(long)]
    title: Option<String>,
    /// New description
    #[arg(long)]
    description: Option<String>,
    /// New category
    #[arg(long, value_enum)]
    category: Option<AnnotationCategory>,
    /// New layer reference
    #[arg(long, value_name = "ID")]
    layer: Option<String>,
    /// New viewer date
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Replacement tag; may be given multiple times, replaces the whole list
    #[arg(long = "tag", value_name = "TAG")]
    tags: Option<Vec<String>>,
}

fn main() {
    let env = env_logger::Env::default().default_filter_or("gibsview=info");
    env_logger::Builder::from_env(env)
        .format_indent(None)
        .format_module_path(false)
        .format_target(false)
        .format_timestamp(None)
        .init();

    if let Err(err) = run(Args::parse()) {
        error!("{err:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = ViewerConfig::load(args.config.as_deref())?;
    let annotations_path = args
        .annotations_file
        .or_else(|| config.annotations_file.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ANNOTATIONS_PATH));
    let base_url = args.base_url.or_else(|| config.base_url.clone());
    let catalog = LayerCatalog::default();

    match args.command {
        Commands::Layers { category } => {
            print_layers(&catalog, category);
        }
        Commands::Layer { id, date } => {
            let layer = lookup(&catalog, &id)?;
            print_layer_details(layer, date);
        }
        Commands::TileUrl { id, date } => {
            let layer = lookup(&catalog, &id)?;
            let date = Some(date.unwrap_or_else(today));
            match &base_url {
                Some(base) => println!("{}", layer.tile_url_template_with_base(base, date)),
                None => println!("{}", layer.tile_url_template(date)),
            }
        }
        Commands::Locations { category } => {
            print_locations(&FeaturedCatalog::default(), category);
        }
        Commands::Goto { lat, lng } => {
            let target = LatLng::validated(lat, lng)?;
            println!("Navigation target {target}; recentering is up to the map widget.");
        }
        Commands::View(view_args) => {
            let session = open_session(&config, base_url.as_deref(), &annotations_path)?;
            cmd_view(session, view_args)?;
        }
        Commands::Timelapse(timelapse_args) => {
            cmd_timelapse(&catalog, &config, base_url.as_deref(), timelapse_args)?;
        }
        Commands::Annotations(command) => {
            let store = AnnotationStore::open(FilePersistence::new(&annotations_path))?;
            cmd_annotations(store, &catalog, &config, command)?;
        }
    }

    Ok(())
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn lookup<'a>(catalog: &'a LayerCatalog, id: &str) -> anyhow::Result<&'a ImageryLayer> {
    catalog
        .get(id)
        .with_context(|| format!("unknown layer {id:?}; run `gibsview layers` for the catalog"))
}

fn open_session(
    config: &ViewerConfig,
    base_url: Option<&str>,
    annotations_path: &Path,
) -> anyhow::Result<ViewerSession<FilePersistence>> {
    let store = AnnotationStore::open(FilePersistence::new(annotations_path))?;
    let mut session =
        ViewerSession::new(LayerCatalog::default(), FeaturedCatalog::default(), store);
    if let Some(base) = base_url {
        session.set_base_url(base);
    }
    if let Some(id) = &config.start_layer {
        if !session.select_layer(id) {
            warn!("configured start layer {id} is not in the catalog");
        }
    }
    Ok(session)
}

fn print_layers(catalog: &LayerCatalog, category: Option<LayerCategory>) {
    let layers: Vec<_> = match category {
        Some(category) => catalog.by_category(category).collect(),
        None => catalog.iter().collect(),
    };
    for layer in &layers {
        println!("{}", layer.id);
        println!(
            "    {} ({}, {}, {})",
            layer.name,
            layer.category,
            layer.format,
            coverage(layer)
        );
    }
    println!("{} layers", layers.len());
}

fn coverage(layer: &ImageryLayer) -> String {
    if !layer.temporal {
        return "static".to_string();
    }
    match (layer.start_date, layer.end_date) {
        (Some(start), Some(end)) => format!("daily, {start} to {end}"),
        (Some(start), None) => format!("daily since {start}"),
        _ => "daily".to_string(),
    }
}

fn print_layer_details(layer: &ImageryLayer, date: Option<NaiveDate>) {
    println!("{}", layer.name);
    println!("  id:              {}", layer.id);
    println!("  category:        {}", layer.category);
    println!("  format:          {}", layer.format.content_type());
    println!("  tile matrix set: {}", layer.tile_matrix_set);
    println!("  coverage:        {}", coverage(layer));
    if let Some(date) = date {
        let verdict = if layer.is_date_valid(date) {
            "imagery available"
        } else {
            "outside coverage"
        };
        println!("  {date}:      {verdict}");
    }
    println!("  {}", layer.description);
}

fn print_locations(catalog: &FeaturedCatalog, category: Option<LocationCategory>) {
    let locations: Vec<_> = match category {
        Some(category) => catalog.by_category(category).collect(),
        None => catalog.iter().collect(),
    };
    for location in &locations {
        match location.zoom {
            Some(zoom) => println!(
                "{} ({}) at {}, zoom {zoom}",
                location.name, location.category, location.position
            ),
            None => println!(
                "{} ({}) at {}",
                location.name, location.category, location.position
            ),
        }
        println!("    {}", location.description);
        println!("    best seen with {}", location.recommended_layer);
    }
    println!("{} locations", locations.len());
}

fn cmd_view(
    mut session: ViewerSession<FilePersistence>,
    args: ViewArgs,
) -> anyhow::Result<()> {
    if let Some(id) = &args.layer {
        if !session.select_layer(id) {
            bail!("unknown layer {id:?}; run `gibsview layers` for the catalog");
        }
    }
    if let Some(name) = &args.location {
        session
            .visit(name)
            .with_context(|| format!("unknown featured location {name:?}"))?;
    }
    if let Some(date) = args.date {
        session.set_date(date);
    }
    if let Some(id) = &args.compare {
        if !session.set_compare_layer(Some(id)) {
            bail!("unknown compare layer {id:?}");
        }
    }
    if let Some(date) = args.compare_date {
        session.set_compare_date(date);
    }
    if let Some(opacity) = args.opacity {
        session.set_opacity(opacity);
    }
    if let Some(layer) = session.selected_layer() {
        if !layer.is_date_valid(session.date()) {
            warn!("{} has no imagery for {}", layer.name, session.date());
        }
    }

    let view = session.map_view().context("the layer catalog is empty")?;
    let stdout = io::stdout();
    TextAdapter::new(stdout.lock()).render(&view, &mut |_| {})?;
    Ok(())
}

fn cmd_timelapse(
    catalog: &LayerCatalog,
    config: &ViewerConfig,
    base_url: Option<&str>,
    args: TimelapseArgs,
) -> anyhow::Result<()> {
    let layer = match &args.layer {
        Some(id) => lookup(catalog, id)?,
        None => match &config.start_layer {
            Some(id) => lookup(catalog, id)?,
            None => catalog.first().context("the layer catalog is empty")?,
        },
    };
    if !layer.temporal {
        bail!("{} does not vary by date; there is nothing to animate", layer.name);
    }

    let mut timelapse = config.timelapse.timelapse();
    if let Some(ms) = args.interval_ms {
        timelapse.interval = Duration::from_millis(ms);
    }
    if let Some(ms) = args.duration_ms {
        timelapse.duration = Duration::from_millis(ms);
    }

    let from = args.from.unwrap_or_else(today);
    let count = timelapse.frame_count();
    println!("{}: {count} frames, one day per frame, back from {from}", layer.name);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (index, date) in timelapse.frames(from).enumerate() {
        let template = match base_url {
            Some(base) => layer.tile_url_template_with_base(base, Some(date)),
            None => layer.tile_url_template(Some(date)),
        };
        let gap = if layer.is_date_valid(date) { "" } else { "  (no imagery)" };
        writeln!(out, "{date}  {template}{gap}")?;
        if !args.no_delay && index + 1 < count {
            thread::sleep(timelapse.interval);
        }
    }
    Ok(())
}

fn cmd_annotations(
    mut store: AnnotationStore<FilePersistence>,
    catalog: &LayerCatalog,
    config: &ViewerConfig,
    command: AnnotationsCommand,
) -> anyhow::Result<()> {
    match command {
        AnnotationsCommand::List { layer } => {
            let annotations: Vec<_> = match &layer {
                Some(id) => store.by_layer(id).collect(),
                None => store.annotations().iter().collect(),
            };
            for annotation in &annotations {
                println!("{}  {}  {}", annotation.id, annotation.date, annotation.title);
                println!(
                    "    {}, {} on {} ({})",
                    annotation.lat, annotation.lng, annotation.layer_id, annotation.category
                );
                if !annotation.description.is_empty() {
                    println!("    {}", annotation.description);
                }
                if !annotation.tags.is_empty() {
                    println!("    tags: {}", annotation.tags.join(", "));
                }
            }
            println!("{} annotations", annotations.len());
        }
        AnnotationsCommand::Add(args) => {
            let layer_id = args
                .layer
                .or_else(|| config.start_layer.clone())
                .or_else(|| catalog.first().map(|layer| layer.id.clone()))
                .unwrap_or_default();
            let created = store.add(NewAnnotation {
                lat: args.lat,
                lng: args.lng,
                title: args.title,
                description: args.description,
                category: args.category,
                layer_id,
                date: args.date.unwrap_or_else(today),
                tags: args.tags,
            })?;
            println!("created {}", created.id);
        }
        AnnotationsCommand::Remove { id } => {
            let known = store.annotations().iter().any(|a| a.id == id);
            store.remove(&id)?;
            if known {
                println!("removed {id}");
            } else {
                println!("no annotation {id}");
            }
        }
        AnnotationsCommand::Update(args) => {
            let known = store.annotations().iter().any(|a| a.id == args.id);
            store.update(
                &args.id,
                AnnotationUpdate {
                    lat: args.lat,
                    lng: args.lng,
                    title: args.title,
                    description: args.description,
                    category: args.category,
                    layer_id: args.layer,
                    date: args.date,
                    tags: args.tags,
                },
            )?;
            if known {
                println!("updated {}", args.id);
            } else {
                println!("no annotation {}", args.id);
            }
        }
        AnnotationsCommand::Export { output } => {
            let data = store.export()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &data)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("exported {} annotations to {}", store.len(), path.display());
                }
                None => println!("{data}"),
            }
        }
        AnnotationsCommand::Import { file } => {
            let data = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let count = store.import(&data)?;
            println!("imported {count} annotations");
        }
    }
    Ok(())
}
