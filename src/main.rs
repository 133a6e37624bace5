use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;

use mangaview::config::{self, CliOverrides};
use mangaview::duplicates::{DuplicateRequest, DuplicateWorker};
use mangaview::library::Library;
use mangaview::tap_zone::{self, TapPoint, TapZoneInvertMode, TapZoneLayout};

#[derive(Parser)]
#[command(
    name = "mangaview",
    about = "Terminal manga reader with tap zones, auto-scroll and chapter preloading",
    version = mangaview::VERSION
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file (default: $XDG_CONFIG_HOME/mangaview/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log output file path (enables logging in the viewer when specified)
    #[arg(long, global = true)]
    log: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Read a manga from a library file
    View {
        /// Library file (TOML)
        library: PathBuf,

        /// Tap zone layout (overrides the config file)
        #[arg(long, value_enum)]
        layout: Option<TapZoneLayout>,

        /// Keep auto-scroll running while the overlay is visible
        #[arg(long)]
        static_nav: bool,

        /// Disable reloading settings when the config file changes
        #[arg(long)]
        no_watch: bool,
    },
    /// Print the tap zone a point (percent of the viewport) falls in
    Classify {
        /// Horizontal position, 0-100
        #[arg(allow_negative_numbers = true)]
        x: f64,

        /// Vertical position, 0-100
        #[arg(allow_negative_numbers = true)]
        y: f64,

        /// Tap zone layout (default: config file, then kindle)
        #[arg(long, value_enum)]
        layout: Option<TapZoneLayout>,

        #[arg(long)]
        invert_horizontal: bool,

        #[arg(long)]
        invert_vertical: bool,
    },
    /// List library entries that look like the same manga
    Dupes {
        /// Library file (TOML)
        library: PathBuf,

        /// Also match on alternative titles listed in descriptions
        #[arg(long)]
        alternative_titles: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    let is_viewer = matches!(cli.command, Command::View { .. });

    if let Some(log_path) = &cli.log {
        let file = match std::fs::File::create(log_path) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Error: failed to open log file {}: {e}", log_path.display());
                std::process::exit(1);
            }
        };
        env_logger::Builder::from_default_env()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();
    } else if !is_viewer {
        env_logger::init();
    }
    // viewer mode + no --log → logger not initialized (stderr belongs to the TUI)

    let config_path = cli.config.clone().or_else(config::default_config_path);
    let mut cfg = match config::load_config(config_path.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::View {
            library,
            layout,
            static_nav,
            no_watch,
        } => {
            let overrides = CliOverrides {
                tap_zone_layout: layout,
                static_nav,
            };
            cfg.merge_cli(&overrides);
            cmd_view(library, cfg.resolve(), overrides, config_path, !no_watch)
        }
        Command::Classify {
            x,
            y,
            layout,
            invert_horizontal,
            invert_vertical,
        } => {
            let overrides = CliOverrides {
                tap_zone_layout: layout,
                static_nav: false,
            };
            cfg.merge_cli(&overrides);
            let reader = cfg.resolve().reader;
            let invert = TapZoneInvertMode {
                horizontal: invert_horizontal || reader.tap_zone_invert.horizontal,
                vertical: invert_vertical || reader.tap_zone_invert.vertical,
            };
            cmd_classify(reader.tap_zone_layout, invert, x, y);
            Ok(())
        }
        Command::Dupes {
            library,
            alternative_titles,
        } => cmd_dupes(library, alternative_titles),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn cmd_view(
    library: PathBuf,
    config: config::Config,
    overrides: CliOverrides,
    config_path: Option<PathBuf>,
    watch: bool,
) -> Result<()> {
    let lib = Library::load(&library)?;
    mangaview::viewer::run(lib, config, overrides, config_path, watch)
}

fn cmd_classify(layout: TapZoneLayout, invert: TapZoneInvertMode, x: f64, y: f64) {
    let zone = tap_zone::classify(layout, invert, TapPoint::new(x, y));
    info!(
        "cmd_classify: ({x}, {y}) layout={} invert=({}, {}) → {zone:?}",
        layout.name(),
        invert.horizontal,
        invert.vertical
    );
    println!("{zone:?}");
}

fn cmd_dupes(library: PathBuf, alternative_titles: bool) -> Result<()> {
    let lib = Library::load(&library)?;
    let total = lib.mangas.len();
    let groups = DuplicateWorker::spawn(DuplicateRequest {
        mangas: lib.mangas.clone(),
        check_alternative_titles: alternative_titles,
    })
    .wait()?;

    if groups.is_empty() {
        eprintln!("no duplicates among {total} manga");
        return Ok(());
    }
    for group in &groups {
        let ids: Vec<String> = group.manga_ids.iter().map(|id| id.to_string()).collect();
        println!("{}: {}", group.title, ids.join(", "));
    }
    eprintln!("{} duplicate group(s) among {total} manga", groups.len());
    Ok(())
}
