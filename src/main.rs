//! enginevfs - inspect an overlay of asset directories
//!
//! Usage:
//!   enginevfs --mount <dir>... stat <path>   - Show metadata of the winning copy
//!   enginevfs --mount <dir>... cat <path>    - Print the winning copy
//!   enginevfs --mount <dir>... which <path>  - Print the mount root that serves a path
//!   enginevfs --mount <dir>... ls <path>     - List a directory
//!   enginevfs --mount <dir>... mounts        - Show mounts in resolution order

use anyhow::Context;
use clap::{Parser, Subcommand};
use enginevfs::{fs::OverlayFileSystem, VfsConfig};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "enginevfs")]
#[command(version)]
#[command(about = "Read-only overlay of asset directories")]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Mount a root directory (repeatable, earlier wins)
    #[arg(short, long = "mount", value_name = "DIR")]
    mounts: Vec<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show metadata for a path
    Stat { path: PathBuf },

    /// Write a file's contents to stdout
    Cat { path: PathBuf },

    /// Print the mount root that contains a path
    Which { path: PathBuf },

    /// List a directory
    Ls {
        #[arg(default_value = "")]
        path: PathBuf,

        /// Merge entries from every mount instead of the first match
        #[arg(short, long)]
        union: bool,
    },

    /// List mounts in resolution order
    Mounts,
}

/// Outcome of a command that ran without I/O failure
enum Outcome {
    Found,
    Missing,
}

fn main() {
    let cli = Cli::parse();

    // Setup logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(Outcome::Found) => {}
        Ok(Outcome::Missing) => std::process::exit(1),
        Err(e) => {
            error!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<Outcome> {
    let mut config = match &cli.config {
        Some(path) => {
            let path = expand_tilde(path);
            VfsConfig::load(&path).with_context(|| format!("loading {:?}", path))?
        }
        None => VfsConfig::from_env()?,
    };
    config.mounts.extend(cli.mounts);
    config.validate()?;

    let overlay = OverlayFileSystem::from_config(&config)?;
    debug!("Overlay ready with {} mounts", overlay.len());

    match cli.command {
        Commands::Stat { path } => cmd_stat(&overlay, &path),
        Commands::Cat { path } => cmd_cat(&overlay, &path),
        Commands::Which { path } => cmd_which(&overlay, &path),
        Commands::Ls { path, union } => cmd_ls(&overlay, &path, union),
        Commands::Mounts => cmd_mounts(&overlay),
    }
}

fn not_found(path: &Path) -> Outcome {
    eprintln!("{}: not found in any mount", path.display());
    Outcome::Missing
}

fn cmd_stat(overlay: &OverlayFileSystem, path: &Path) -> anyhow::Result<Outcome> {
    let Some(stat) = overlay.stat(path)? else {
        return Ok(not_found(path));
    };
    let root = overlay.containing_dir(path)?.unwrap_or_default();

    println!("Path: {}", path.display());
    println!("Mount: {}", root.display());
    println!("Kind: {:?}", stat.kind);
    println!("Size: {} bytes", stat.size);
    println!("Read-only: {}", stat.readonly);
    if let Some(modified) = stat.modified {
        println!("Modified: {:?}", modified);
    }
    Ok(Outcome::Found)
}

fn cmd_cat(overlay: &OverlayFileSystem, path: &Path) -> anyhow::Result<Outcome> {
    let Some(mut stream) = overlay.open_for_input(path)? else {
        return Ok(not_found(path));
    };
    let mut stdout = std::io::stdout().lock();
    std::io::copy(&mut stream, &mut stdout)
        .with_context(|| format!("reading {:?}", stream.path()))?;
    stdout.flush()?;
    Ok(Outcome::Found)
}

fn cmd_which(overlay: &OverlayFileSystem, path: &Path) -> anyhow::Result<Outcome> {
    match overlay.containing_dir(path)? {
        Some(root) => {
            println!("{}", root.display());
            Ok(Outcome::Found)
        }
        None => Ok(not_found(path)),
    }
}

fn cmd_ls(overlay: &OverlayFileSystem, path: &Path, union: bool) -> anyhow::Result<Outcome> {
    let Some(names) = list_names(overlay, path, union)? else {
        return Ok(not_found(path));
    };

    for name in names {
        println!("{}", name.to_string_lossy());
    }
    Ok(Outcome::Found)
}

/// Entries of directory `path`, or `None` when no mount has it as a directory
fn list_names(
    overlay: &OverlayFileSystem,
    path: &Path,
    union: bool,
) -> enginevfs::Result<Option<Vec<OsString>>> {
    if !overlay.is_dir(path)? {
        return Ok(None);
    }
    if union {
        return overlay.list_union(path).map(Some);
    }
    match overlay.open_directory(path)? {
        Some(handle) => handle.collect_names().map(Some),
        None => Ok(None),
    }
}

fn cmd_mounts(overlay: &OverlayFileSystem) -> anyhow::Result<Outcome> {
    println!("Mounts (first wins):");
    for (index, root) in overlay.mount_roots().iter().enumerate() {
        let marker = if root.is_dir() { "" } else { "  (missing)" };
        println!("  {}. {}{}", index, root.display(), marker);
    }
    Ok(Outcome::Found)
}

/// Expand ~ to home directory
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}
