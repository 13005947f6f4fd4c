use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use itemdesc_core::config::{Config, DEFAULT_CONFIG_FILE};
use itemdesc_core::core_api::{Category, Engine, RunSummary};
use itemdesc_core::document::DEFAULT_TABLE_NAME;
use itemdesc_core::materials::DirectorySource;
use itemdesc_core::merge::is_decorated;
use log::{error, info, warn};

const DEFAULT_OUTPUT: &str = "System/itemInfo_EN.lua";
const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Client item-description file to decorate.
    #[arg(value_name = "ITEMINFO.LUA")]
    input: Option<PathBuf>,
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Directory holding the per-category material tables.
    #[arg(long = "data-dir", value_name = "DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,
    #[arg(long, value_name = "PATH", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,
    #[arg(long = "table-name", value_name = "NAME", default_value = DEFAULT_TABLE_NAME)]
    table_name: String,
    /// Process input that already carries item-id annotations.
    #[arg(long)]
    force: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let config = Config::load_or_create(&cli.config);

    let Some(input) = cli.input.as_deref() else {
        warn!("No input file given; nothing to do");
        return;
    };
    if !input.is_file() {
        warn!("Input file {} does not exist; nothing to do", input.display());
        return;
    }
    if same_file(input, &cli.output) {
        error!(
            "Refusing to overwrite the input file {}; choose a different --output",
            input.display()
        );
        process::exit(2);
    }

    let engine = Engine::new(config).with_table_name(cli.table_name.as_str());

    let document = match engine.open(input) {
        Ok(document) => document,
        Err(e) => {
            error!("Error reading {}: {e}", input.display());
            process::exit(1);
        }
    };
    if is_decorated(&document) && !cli.force {
        error!(
            "{} already carries item-id annotations; pass --force to decorate it again",
            input.display()
        );
        process::exit(2);
    }

    if let Some(parent) = cli.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent) {
            error!("Error creating {}: {e}", parent.display());
            process::exit(1);
        }
    }

    let source = DirectorySource::new(cli.data_dir.clone());
    match engine.run(document, &source, &cli.output) {
        Ok(summary) => print_summary(&summary),
        Err(e) => {
            error!("Error processing {}: {e}", input.display());
            process::exit(1);
        }
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn print_summary(summary: &RunSummary) {
    for category in Category::ALL {
        let count = summary.decorated.get(&category).copied().unwrap_or(0);
        info!("{category}: {count} items tagged");
    }
    println!(
        "Processed {} items into {}",
        summary.item_count,
        summary.output.display()
    );
}
