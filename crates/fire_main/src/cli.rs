use clap::{Parser, Subcommand};
use fire_core::Marker;
use std::path::PathBuf;

/// Fire Gateway: operate on the shared classroom directory.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Read configuration from this file instead of the default location.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the shared root directory.
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show gateway status.
    Status,
    /// List one directory under the root.
    List {
        /// Relative path (defaults to the root).
        #[arg(default_value = "")]
        path: String,
    },
    /// Print the media tree with tags and markers.
    Tree,
    /// Print all tags, including derived ones.
    Tags,
    /// Replace the tags of one path; giving no tags removes them.
    Tag { path: String, tags: Vec<String> },
    /// Print the markers of one file.
    Markers { path: String },
    /// Replace the markers of one file.
    Mark {
        path: String,
        /// Markers as `SECONDS` or `SECONDS=LABEL`; none clears the list.
        #[arg(value_parser = parse_marker)]
        markers: Vec<Marker>,
    },
    /// List saved lesson plans.
    Lessons,
    /// Print one lesson plan.
    Lesson { name: String },
    /// Save a lesson plan from a JSON file.
    SaveLesson { file: PathBuf },
    /// Create a directory under the root.
    Mkdir { path: String },
    /// Copy a local file into the root.
    Upload {
        /// Destination, relative to the root.
        path: String,
        /// Local file to read.
        source: PathBuf,
    },
    /// Print the download link of a file.
    Share {
        path: String,
        /// Host clients use to reach the gateway (defaults to the LAN address).
        #[arg(long)]
        host: Option<String>,
    },
    /// Import legacy `<media>.marks.json` sidecars into the marker database.
    ImportMarkers,
    /// Write the effective configuration to the config file.
    InitConfig,
}

fn parse_marker(raw: &str) -> Result<Marker, String> {
    let (time, label) = raw.split_once('=').unwrap_or((raw, ""));
    let time: f64 = time
        .trim()
        .parse()
        .map_err(|_| format!("invalid marker time: {time:?}"))?;

    Ok(Marker {
        time,
        label: label.to_string(),
    })
}
