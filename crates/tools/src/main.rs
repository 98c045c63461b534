use std::fs;
use std::path::{Path, PathBuf};

use catalog::{ContextPayload, SiteMapState};
use clap::{Parser, Subcommand};
use foundation::{MapContainer, WindowSize, derive_zoom_level, dynamic_aspect_ratio};
use scene::{FocusLocation, MapView};
use serde_json::{Value, json};
use streaming::{FeatureDataSource, FetchConfig, FetchCoordinator, MemoryTransport};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Site map geometry, viewport and fetch utilities")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the ids of features inside bounds, in document order
    InBounds {
        /// JSON file mapping feature id to geometry descriptor
        features: PathBuf,

        /// Bounds as JSON: {"lat":[min,max],"lng":[min,max]}; omit for all ids
        #[arg(long)]
        bounds: Option<String>,

        /// Extend bounds by half their span on each axis
        #[arg(long)]
        map_extension: bool,

        /// Extend bounds by a fixed distance in degrees
        #[arg(long)]
        point_extension: Option<f64>,
    },

    /// Print the full-observatory zoom level for a container size
    Zoom {
        #[arg(long)]
        width: Option<f64>,
        #[arg(long)]
        height: Option<f64>,
    },

    /// Print the map aspect ratio for a window size
    Aspect {
        #[arg(long)]
        width: Option<f64>,
        #[arg(long)]
        height: Option<f64>,

        /// Pixels reserved below the map
        #[arg(long, default_value_t = 0.0)]
        buffer: f64,
    },

    /// Print whether a map view sits at the focus location
    Focus {
        /// View as JSON: {"zoom":4,"center":[lat,lng]}
        #[arg(long)]
        view: String,

        /// Focus as JSON: {"current":"ID","map":{"zoom":4,"center":[lat,lng]}}
        #[arg(long)]
        focus: String,
    },

    /// Hydrate the default site map state from a context payload file
    Hydrate { payload: PathBuf },

    /// Validate a selection-limit value given as JSON
    ValidateLimit { value: Option<String> },

    /// Print an outbound href
    Href { key: Option<String>, arg: Option<String> },

    /// Replay recorded responses through the fetch coordinator
    Fetch {
        /// JSON file: {"SOURCE": {"KEY": payload}}
        responses: PathBuf,

        /// Only request keys of this source
        #[arg(long)]
        source: Option<String>,

        /// Overrides SITEMAP_MAX_IN_FLIGHT
        #[arg(long)]
        max_in_flight: Option<usize>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let args = Args::parse();
    let out = run(args.command)?;
    println!("{out}");
    Ok(())
}

fn run(command: Command) -> Result<String, String> {
    match command {
        Command::InBounds {
            features,
            bounds,
            map_extension,
            point_extension,
        } => {
            let features = read_json(&features)?;
            let bounds = bounds.as_deref().map(parse_json).transpose()?;
            let ids = scene::calculate_locations_in_bounds_json(
                &features,
                bounds.as_ref(),
                map_extension,
                point_extension,
            );
            to_json(&ids)
        }
        Command::Zoom { width, height } => {
            let container = match (width, height) {
                (Some(w), Some(h)) => Some(MapContainer::with_parent(w, h)),
                _ => None,
            };
            Ok(derive_zoom_level(container.as_ref()).to_string())
        }
        Command::Aspect {
            width,
            height,
            buffer,
        } => {
            let window = match (width, height) {
                (Some(w), Some(h)) => Some(WindowSize::new(w, h)),
                _ => None,
            };
            Ok(dynamic_aspect_ratio(window, buffer).to_string())
        }
        Command::Focus { view, focus } => {
            let view: MapView = serde_json::from_str(&view).map_err(|e| format!("view: {e}"))?;
            let focus: FocusLocation =
                serde_json::from_str(&focus).map_err(|e| format!("focus: {e}"))?;
            Ok(match scene::focus_mismatch(&view, &focus) {
                Ok(()) => "true".to_string(),
                Err(reason) => format!("false ({reason})"),
            })
        }
        Command::Hydrate { payload } => {
            let payload: ContextPayload = serde_json::from_value(read_json(&payload)?)
                .map_err(|e| format!("context payload: {e}"))?;
            let state = catalog::hydrate(&SiteMapState::default(), &payload);
            to_json(&state)
        }
        Command::ValidateLimit { value } => {
            let value = value.as_deref().map(parse_json).transpose()?;
            to_json(&scene::validate_selection_limit(value.as_ref()))
        }
        Command::Href { key, arg } => Ok(catalog::href(key.as_deref(), arg.as_deref())),
        Command::Fetch {
            responses,
            source,
            max_in_flight,
        } => {
            let transport =
                MemoryTransport::from_json(&read_json(&responses)?).map_err(|e| e.to_string())?;
            let source = source
                .as_deref()
                .map(str::parse::<FeatureDataSource>)
                .transpose()?;
            let mut config = FetchConfig::from_env();
            if let Some(n) = max_in_flight {
                config.max_in_flight = n.max(1);
            }
            let rt = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(|e| format!("tokio runtime: {e}"))?;
            rt.block_on(replay(transport, config, source))
        }
    }
}

async fn replay(
    transport: MemoryTransport,
    config: FetchConfig,
    source: Option<FeatureDataSource>,
) -> Result<String, String> {
    debug!(
        max_in_flight = config.max_in_flight,
        "replaying recorded responses"
    );
    let mut coordinator = FetchCoordinator::new(transport, config);
    match source {
        Some(source) => coordinator.request_source(source),
        None => coordinator.request_all(),
    };
    coordinator.run_until_settled().await;
    to_json(&json!({
        "progress": coordinator.table().progress(),
        "featureDataFetches": coordinator.table(),
    }))
}

fn read_json(path: &Path) -> Result<Value, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
    serde_json::from_str(&text).map_err(|e| format!("parse {path:?}: {e}"))
}

fn parse_json(text: &str) -> Result<Value, String> {
    serde_json::from_str(text).map_err(|e| format!("parse {text:?}: {e}"))
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::{Args, Command, run};
    use clap::Parser;
    use serde_json::Value;
    use std::io::Write;

    fn parse(argv: &[&str]) -> Command {
        Args::try_parse_from(std::iter::once("sitemap").chain(argv.iter().copied()))
            .unwrap()
            .command
    }

    fn temp_json(name: &str, body: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("sitemap-{}-{name}", std::process::id()));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn zoom_and_aspect() {
        assert_eq!(run(parse(&["zoom"])).unwrap(), "2");
        assert_eq!(
            run(parse(&["zoom", "--width", "1400", "--height", "1200"])).unwrap(),
            "4"
        );
        assert_eq!(run(parse(&["aspect"])).unwrap(), "1");
        assert_eq!(
            run(parse(&["aspect", "--width", "1000", "--height", "1000"])).unwrap(),
            "1"
        );
    }

    #[test]
    fn in_bounds_reads_feature_file() {
        let path = temp_json(
            "features.json",
            r#"{"A": {"latitude": 15, "longitude": 0}, "E": {"latitude": 27, "longitude": 0}}"#,
        );
        let p = path.to_str().unwrap();
        let bounds = r#"{"lat":[10,20],"lng":[-30,30]}"#;

        let out = run(parse(&["in-bounds", p, "--bounds", bounds])).unwrap();
        assert_eq!(serde_json::from_str::<Value>(&out).unwrap(), serde_json::json!(["A"]));

        let out = run(parse(&["in-bounds", p, "--bounds", bounds, "--point-extension", "10"]))
            .unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(&out).unwrap(),
            serde_json::json!(["A", "E"])
        );
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn focus_and_limits_and_links() {
        let focus = r#"{"current":"foo","map":{"zoom":4,"center":[-68.3,15]}}"#;
        assert_eq!(
            run(parse(&["focus", "--view", r#"{"zoom":4,"center":[-68.3,15]}"#, "--focus", focus]))
                .unwrap(),
            "true"
        );
        assert!(
            run(parse(&["focus", "--view", r#"{"zoom":5,"center":[-68.3,15]}"#, "--focus", focus]))
                .unwrap()
                .starts_with("false")
        );

        let out = run(parse(&["validate-limit", "[3,3]"])).unwrap();
        let v: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["valid"], Value::Bool(false));
        assert!(run(parse(&["validate-limit", "{"])).is_err());

        assert_eq!(
            run(parse(&["href", "DOMAIN_DETAILS", "D08"])).unwrap(),
            "https://www.neonscience.org/domains/D08"
        );
        assert_eq!(run(parse(&["href"])).unwrap(), "#");
    }

    #[test]
    fn fetch_replay_reports_table() {
        let path = temp_json(
            "responses.json",
            r#"{"REST_LOCATIONS_API": {"TOWERS": [], "SITE_LOCATION_HIERARCHIES": {}}}"#,
        );
        let out = run(parse(&[
            "fetch",
            path.to_str().unwrap(),
            "--source",
            "REST_LOCATIONS_API",
            "--max-in-flight",
            "1",
        ]))
        .unwrap();
        let v: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["progress"], serde_json::json!(12.5));
        assert_eq!(
            v["featureDataFetches"]["REST_LOCATIONS_API"]["TOWERS"],
            Value::String("fetched".to_string())
        );
        assert_eq!(
            v["featureDataFetches"]["ARCGIS_ASSETS_API"]["POUR_POINTS"],
            serde_json::json!({})
        );
        let _ = std::fs::remove_file(path);
    }
}
