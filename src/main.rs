use std::path::PathBuf;

use log::{error, info};
use pas_catalog::config::{load_config_file, Config};
use pas_catalog::{DbManager, SelectResult};

const USAGE: &str = "usage: pas_catalog [--namespace NS] <command>
commands:
  root
  counts
  tracks <folder-id>
  folders <folder-id>
  folder <folder-id>
  query <column> <pattern> [orderby]
  ids <column> <pattern>
  path <track-id>
  device <alsa-name>
  schema";

fn config_path() -> PathBuf {
    std::env::var_os("PAS_CATALOG_CONFIG")
        .map(PathBuf::from)
        .or_else(|| dirs::config_dir().map(|dir| dir.join("pas_catalog.toml")))
        .unwrap_or_else(|| PathBuf::from("pas_catalog.toml"))
}

fn parse_id(value: Option<&String>) -> Result<i64, Box<dyn std::error::Error>> {
    let value = value.ok_or(USAGE)?;
    Ok(value.parse::<i64>()?)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(
    db: &DbManager,
    namespace: &str,
    args: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let command = args.first().map(String::as_str).ok_or(USAGE)?;
    let mut results = SelectResult::default();

    match command {
        "root" => print_json(&db.get_root(namespace)?),
        "counts" => print_json(&serde_json::json!({
            "tracks": db.get_track_count(namespace)?,
            "artists": db.get_artist_count(namespace)?,
        })),
        "tracks" => {
            db.get_tracks(&mut results, parse_id(args.get(1))?, namespace)?;
            print_json(&results)
        }
        "folders" => {
            db.get_subfolders(&mut results, parse_id(args.get(1))?, namespace)?;
            print_json(&results)
        }
        "folder" => {
            db.get_folder(&mut results, parse_id(args.get(1))?, namespace)?;
            print_json(&results)
        }
        "query" => {
            let column = args.get(1).ok_or(USAGE)?;
            let pattern = args.get(2).ok_or(USAGE)?;
            let orderby = args.get(3).map(String::as_str).unwrap_or_default();
            if !db.is_a_column(column) {
                return Err(format!("unknown column: {column}").into());
            }
            db.multi_valued_query(column, pattern, &mut results, namespace, orderby)?;
            print_json(&results)
        }
        "ids" => {
            let column = args.get(1).ok_or(USAGE)?;
            let pattern = args.get(2).ok_or(USAGE)?;
            print_json(&db.find_ids(column, pattern, namespace)?)
        }
        "path" => print_json(&db.path_from_id(parse_id(args.get(1))?, namespace)?),
        "device" => print_json(&db.get_device_info(args.get(1).ok_or(USAGE)?)?),
        "schema" => {
            db.initialize_schema()?;
            info!("Catalog schema is in place");
            Ok(())
        }
        _ => Err(USAGE.into()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_file = config_path();
    let config: Config = load_config_file(&config_file);

    let mut clog = colog::default_builder();
    clog.filter(None, config.logging.level_filter());
    clog.init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let mut namespace = String::new();
    if args.first().map(String::as_str) == Some("--namespace") {
        if args.len() < 2 {
            return Err(USAGE.into());
        }
        namespace = args.remove(1);
        args.remove(0);
    }

    let mut db = DbManager::new().with_max_path_depth(config.paths.max_depth);
    db.initialize(&config.database.path)?;

    let outcome = run(&db, &namespace, &args);
    db.shutdown();
    if let Err(err) = &outcome {
        error!("{}", err);
    }
    outcome
}
