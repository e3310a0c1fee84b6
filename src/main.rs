mod export;
mod failure;
mod listing;
mod manifest;

use std::{
    io::Write,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context;
use clap::Parser;
use failure::Failure;
use guccs_ccs::{Container, ScanEnd};
use hashbrown::HashSet;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::Level;
#[macro_use]
extern crate tracing;

/// Extracts images and meshes from CCS containers.
#[derive(clap::Parser, Debug)]
#[command(version)]
pub struct Args {
    /// Container files, optionally gzip-compressed. Glob patterns are expanded.
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output directory. With several inputs, each gets a subdirectory named after the file.
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Which of an image's palettes to render with
    #[arg(short, long, default_value_t = 0)]
    palette: usize,

    /// Only print the listing, write nothing
    #[arg(long)]
    list: bool,

    /// Also write a JSON manifest per input
    #[arg(long)]
    manifest: bool,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match (args.quiet, args.verbose) {
        (true, _) => Level::WARN,
        (false, 0) => Level::INFO,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let paths = expand_inputs(&args.inputs);
    let jobs = output_dirs(&paths, &args.output);

    let worst = jobs
        .par_iter()
        .filter_map(|(path, out_dir)| {
            process(path, out_dir, &args).err().map(|(failure, e)| {
                error!("{}: {e:#}", path.display());
                failure
            })
        })
        .max();

    match worst {
        Some(failure) => failure.exit_code(),
        None => ExitCode::SUCCESS,
    }
}

/// Expands glob patterns. Inputs that match nothing are kept as-is so they fail to open later.
fn expand_inputs(inputs: &[String]) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for input in inputs {
        let matches: Vec<PathBuf> = glob::glob(input)
            .map(|paths| paths.flatten().collect())
            .unwrap_or_default();
        if matches.is_empty() {
            paths.push(PathBuf::from(input));
        } else {
            paths.extend(matches);
        }
    }
    paths
}

/// Pairs each input with its output directory.
///
/// A single input writes straight into `root`. Several inputs each get a subdirectory named after
/// the file stem; stems seen before get a `_2`, `_3`, ... suffix so no two inputs share one.
fn output_dirs(paths: &[PathBuf], root: &Path) -> Vec<(PathBuf, PathBuf)> {
    if let [path] = paths {
        return vec![(path.clone(), root.to_path_buf())];
    }

    let mut taken = HashSet::new();
    paths
        .iter()
        .map(|path| {
            let stem = path
                .file_stem()
                .unwrap_or(path.as_os_str())
                .to_string_lossy()
                .into_owned();
            let mut name = stem.clone();
            let mut n = 1;
            while !taken.insert(name.clone()) {
                n += 1;
                name = format!("{stem}_{n}");
            }
            if n > 1 {
                warn!("{} shares its name with another input, writing to {name}", path.display());
            }
            (path.clone(), root.join(name))
        })
        .collect()
}

/// Decodes and exports one file. Each call owns its own buffer and container.
fn process(path: &Path, out_dir: &Path, args: &Args) -> Result<(), (Failure, anyhow::Error)> {
    let source = path.display().to_string();

    let mut cursor = guccs_source::load(path).map_err(|e| (Failure::Open, e))?;
    let container = Container::read(&mut cursor).map_err(|e| {
        let failure = Failure::from_load(&e);
        (failure, anyhow::Error::new(e).context("Failed to read container"))
    })?;

    let mut listing = String::new();
    listing::render(&mut listing, &container, &source)
        .context("Failed to render listing")
        .map_err(|e| (Failure::Export, e))?;
    std::io::stdout().lock().write_all(listing.as_bytes()).ok();

    if !args.list {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("Cannot create {}", out_dir.display()))
            .map_err(|e| (Failure::Export, e))?;

        if args.manifest {
            write_manifest(&container, &source, path, out_dir).map_err(|e| (Failure::Export, e))?;
        }

        let stats = export::export_all(&container, out_dir, args.palette);
        info!(
            "{source}: wrote {} images and {} meshes to {} ({} skipped, {} failed)",
            stats.images,
            stats.meshes,
            out_dir.display(),
            stats.skipped,
            stats.failed
        );
        if stats.failed > 0 {
            return Err((
                Failure::Export,
                anyhow::anyhow!("{} assets could not be written", stats.failed),
            ));
        }
    }

    // Partial results were exported, but the file is still reported as malformed.
    if let ScanEnd::PaletteFailure { offset, error } = &container.report.end {
        return Err((
            Failure::Malformed,
            anyhow::anyhow!("palette at {offset:#x} is malformed: {error}"),
        ));
    }

    Ok(())
}

fn write_manifest(
    container: &Container,
    source: &str,
    path: &Path,
    out_dir: &Path,
) -> anyhow::Result<()> {
    let stem = path.file_stem().unwrap_or(path.as_os_str());
    let manifest_path = out_dir.join(format!("{}.json", stem.to_string_lossy()));
    let json = manifest::Manifest::new(container, source).to_json()?;
    std::fs::write(&manifest_path, json)
        .with_context(|| format!("Failed to write {}", manifest_path.display()))?;
    debug!("Wrote {}", manifest_path.display());
    Ok(())
}
