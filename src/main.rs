use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rbtagcache::model::RawTrack;
use rbtagcache::render;
use rbtagcache::tagcache::database::Database;
use rbtagcache::tagcache::decoder;
use rbtagcache::tagcache::mutate;
use rbtagcache::{Endian, TagKind, Track};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "rbtagcache")]
#[command(about = "Build, dump, and edit Rockbox tag-cache databases", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble a fresh database from a JSON track list
    Gen {
        /// Encode as big-endian instead of little-endian
        #[arg(long)]
        big: bool,
        /// Directory to write the ten database files into
        #[arg(long)]
        target: PathBuf,
        /// JSON file holding an array of tracks
        #[arg(long = "tracks")]
        tracks: PathBuf,
    },
    /// Print a database's contents
    Dump {
        /// Directory holding the ten database files
        #[arg(long = "in")]
        input: PathBuf,
        /// Write the rendered output here instead of stdout
        #[arg(long = "out")]
        output: Option<PathBuf>,
        /// "tabular" (default) or "plaintext"
        #[arg(long, default_value = "tabular")]
        format: String,
    },
    /// Append tracks and/or re-sort an existing database in place
    Edit {
        /// Directory holding the ten database files
        #[arg(long = "in")]
        input: PathBuf,
        /// JSON file holding an array of tracks to append
        #[arg(long = "append-tracks-json")]
        append_tracks_json: Option<PathBuf>,
        /// Re-sort one tag file's records by lower-case data ("artist", "album", ...)
        #[arg(long = "sort-tags")]
        sort_tags: Option<String>,
        /// Re-sort the index's row order (by lower-case artist/album/title, year, track)
        #[arg(long = "sort-index")]
        sort_index: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match args.command {
        Command::Gen { big, target, tracks } => cmd_gen(big, &target, &tracks),
        Command::Dump { input, output, format } => cmd_dump(&input, output.as_deref(), &format),
        Command::Edit {
            input,
            append_tracks_json,
            sort_tags,
            sort_index,
        } => cmd_edit(&input, append_tracks_json.as_deref(), sort_tags.as_deref(), sort_index),
    }
}

fn load_tracks(path: &Path) -> Result<Vec<Track>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let raw: Vec<RawTrack> =
        serde_json::from_str(&text).with_context(|| format!("parsing {} as a JSON track list", path.display()))?;
    Ok(raw.into_iter().map(Track::from).collect())
}

fn cmd_gen(big: bool, target: &Path, tracks_path: &Path) -> Result<()> {
    let tracks = load_tracks(tracks_path)?;
    log::info!("Generating tag-cache database from {} tracks", tracks.len());

    let endian = if big { Endian::Big } else { Endian::Little };
    let db = Database::generate(endian, &tracks);
    db.save(target)?;

    log::info!("Wrote database to {}", target.display());
    Ok(())
}

fn cmd_dump(input: &Path, output: Option<&Path>, format: &str) -> Result<()> {
    let decoded = decoder::decode(input)?;

    let rendered = match format {
        "tabular" => render::render_index(&decoded),
        "plaintext" => render::render_plaintext(&decoded),
        other => bail!("unknown dump format {other:?}, expected \"tabular\" or \"plaintext\""),
    };

    match output {
        Some(path) => {
            fs::write(path, rendered).with_context(|| format!("writing {}", path.display()))?;
            log::info!("Wrote dump to {}", path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

fn cmd_edit(
    input: &Path,
    append_tracks_json: Option<&Path>,
    sort_tags_kind: Option<&str>,
    sort_index: bool,
) -> Result<()> {
    let mut db = Database::load(input)?;

    if let Some(path) = append_tracks_json {
        let tracks = load_tracks(path)?;
        mutate::append_tracks(&mut db, &tracks)?;
        log::info!("Appended {} tracks", tracks.len());
    }

    if let Some(name) = sort_tags_kind {
        let kind = parse_tag_kind(name)?;
        mutate::sort_tags(&mut db, kind, mutate::default_tag_order)?;
        log::info!("Re-sorted {} by lower-case data", kind.display_name());
    }

    if sort_index {
        mutate::sort_index(&mut db, compare_decoded_rows)?;
        log::info!("Re-sorted the index's row order");
    }

    db.save(input)?;
    log::info!("Saved changes to {}", input.display());
    Ok(())
}

fn parse_tag_kind(name: &str) -> Result<TagKind> {
    for kind in TagKind::canonical_order() {
        if kind.display_name().eq_ignore_ascii_case(name) {
            return Ok(kind);
        }
    }
    bail!("unknown tag kind {name:?}")
}

/// Default index ordering for `--sort-index`: year, then track number. The
/// index row alone doesn't carry resolved tag strings, so a string-keyed sort
/// (artist/album/title) requires going through `edit`'s tag-file sort first.
fn compare_decoded_rows(a: &rbtagcache::tagcache::IndexRow, b: &rbtagcache::tagcache::IndexRow) -> std::cmp::Ordering {
    a.year.cmp(&b.year).then(a.track.cmp(&b.track))
}
