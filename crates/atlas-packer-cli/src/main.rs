use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use atlas_packer_core::{
    AtlasJob, InputImage, JobOutput, PackStats, PackerConfig, pack_images, pack_jobs, to_json,
    to_manifest_text,
};
use clap::{ArgAction, Parser};
use image::{DynamicImage, ImageReader};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "atlas-packer",
    about = "Pack every subdirectory of sprites into a power-of-two texture atlas",
    version
)]
struct Cli {
    /// Directory containing one subdirectory of images per atlas
    #[arg(help_heading = "Input/Output")]
    source: PathBuf,
    /// Output directory (created if missing)
    #[arg(help_heading = "Input/Output")]
    dest: PathBuf,
    /// YAML config file path (overrides packing options)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,

    /// Largest atlas width/height to try (power of two); unbounded when omitted
    #[arg(long, help_heading = "Layout")]
    max_dimension: Option<u32>,
    /// Pack atlases in parallel (requires core feature `parallel`)
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    parallel: bool,

    /// Also write <atlas>.json next to the texture-data file
    #[arg(long, default_value_t = false, help_heading = "Export")]
    json: bool,
    /// Export packing stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: pack and report stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,

    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(short, long, default_value_t = false, help_heading = "Logging/UX")]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    run(&cli, cli.progress && !cli.quiet)
}

fn run(cli: &Cli, show_progress: bool) -> anyhow::Result<()> {
    let mut cfg = PackerConfig {
        max_dimension: cli.max_dimension,
        parallel: cli.parallel,
    };
    // Config file sets packing options en bloc
    if let Some(path) = &cli.config {
        let file =
            fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)
            .with_context(|| format!("parse config {}", path.display()))?;
        cfg = y.into_packer_config(cfg);
    }
    cfg.validate()?;

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }

    let job_dirs = discover_jobs(&cli.source)?;
    info!(count = job_dirs.len(), source = %cli.source.display(), "found atlas jobs");

    if !cli.dry_run {
        fs::create_dir_all(&cli.dest)
            .with_context(|| format!("create dest {}", cli.dest.display()))?;
    }
    let mut all_stats: Vec<JobStats> = Vec::with_capacity(job_dirs.len());
    if use_parallel(&cfg) {
        let mut jobs = Vec::with_capacity(job_dirs.len());
        for dir in &job_dirs {
            jobs.push(load_job(dir, show_progress)?);
        }
        for job in pack_jobs(jobs, &cfg)? {
            all_stats.push(finish_job(&job, cli)?);
        }
    } else {
        // One directory at a time: earlier atlases are on disk before later ones load
        for dir in &job_dirs {
            let start = Instant::now();
            let job = load_job(dir, show_progress)?;
            let name = job.name;
            let output = pack_images(job.inputs, cfg.clone())
                .with_context(|| format!("pack {}", name))?;
            let job = JobOutput { name, output };
            all_stats.push(finish_job(&job, cli)?);
            info!(
                atlas = %job.name,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "atlas done"
            );
        }
    }

    if let Some(stats_path) = &cli.export_stats {
        if !cli.dry_run {
            fs::write(stats_path, serde_json::to_string_pretty(&all_stats)?)
                .with_context(|| format!("write {}", stats_path.display()))?;
            info!(?stats_path, "stats exported");
        } else {
            for s in &all_stats {
                println!("{}: {}", s.name, s.stats.summary());
            }
        }
    }
    Ok(())
}

/// Logs stats for a packed job and writes its files unless this is a dry run.
fn finish_job(job: &JobOutput, cli: &Cli) -> anyhow::Result<JobStats> {
    let stats = job.output.stats();
    info!(
        atlas = %job.name,
        sprites = stats.sprites,
        width = stats.width,
        height = stats.height,
        occupancy = format!("{:.2}%", stats.occupancy * 100.0),
        "stats"
    );
    if !cli.dry_run {
        write_job(job, &cli.dest, cli.json)?;
    }
    Ok(JobStats {
        name: job.name.clone(),
        stats,
    })
}

/// Whether jobs go through the rayon pool. Requires the `parallel` feature.
fn use_parallel(cfg: &PackerConfig) -> bool {
    #[cfg(not(feature = "parallel"))]
    {
        if cfg.parallel {
            warn!("parallel packing requested but this build lacks the `parallel` feature; packing sequentially");
        }
    }
    cfg!(feature = "parallel") && cfg.parallel
}

#[derive(Serialize)]
struct JobStats {
    name: String,
    #[serde(flatten)]
    stats: PackStats,
}

fn is_hidden(p: &Path) -> bool {
    p.file_name()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.starts_with('.'))
}

/// Visible subdirectories of `source`, sorted by name. Each one is an atlas job.
fn discover_jobs(source: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in WalkDir::new(source)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("list {}", source.display()))?;
        let p = entry.path();
        if is_hidden(p) {
            continue;
        }
        if entry.file_type().is_dir() {
            dirs.push(p.to_path_buf());
        } else {
            debug!(?p, "skip non-directory entry");
        }
    }
    Ok(dirs)
}

/// Visible files directly inside one job directory, sorted by name.
fn gather_sprite_paths(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut list = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("list {}", dir.display()))?;
        let p = entry.path();
        if entry.file_type().is_file() && !is_hidden(p) {
            list.push(p.to_path_buf());
        }
    }
    Ok(list)
}

/// Sprite name: the file name up to its first `.`.
fn sprite_name(p: &Path) -> String {
    let file = p.file_name().map(|s| s.to_string_lossy()).unwrap_or_default();
    file.split('.').next().unwrap_or_default().to_string()
}

fn job_name(dir: &Path) -> String {
    dir.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.to_string_lossy().into_owned())
}

fn load_job(dir: &Path, progress: bool) -> anyhow::Result<AtlasJob> {
    let paths = gather_sprite_paths(dir)?;
    let inputs = load_images_with_progress(&paths, progress)?;
    let name = job_name(dir);
    info!(atlas = %name, count = inputs.len(), "loaded sprites");
    Ok(AtlasJob { name, inputs })
}

fn load_images_with_progress(paths: &[PathBuf], progress: bool) -> anyhow::Result<Vec<InputImage>> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(paths.len() as u64);
        let style = ProgressStyle::with_template(
            "{spinner:.green} loading {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?;
        b.set_style(style);
        Some(b)
    } else {
        None
    };
    let mut list = Vec::with_capacity(paths.len());
    for p in paths {
        let msg = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if let Some(b) = &bar {
            b.set_message(msg.to_string());
        }
        // Any undecodable file aborts the run
        let img = load_image(p).with_context(|| format!("decode {}", p.display()))?;
        list.push(InputImage {
            key: sprite_name(p),
            image: img,
        });
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(list)
}

fn load_image(p: &Path) -> anyhow::Result<DynamicImage> {
    let img = ImageReader::open(p)?.with_guessed_format()?.decode()?;
    Ok(img)
}

fn texture_data_path(dest: &Path, name: &str) -> PathBuf {
    dest.join(format!("{}-texture-data.txt", name))
}

fn write_job(job: &JobOutput, dest: &Path, json: bool) -> anyhow::Result<()> {
    let png_path = dest.join(format!("{}.png", job.name));
    job.output
        .rgba
        .save(&png_path)
        .with_context(|| format!("write {}", png_path.display()))?;

    let txt_path = texture_data_path(dest, &job.name);
    fs::write(&txt_path, to_manifest_text(&job.output.manifest))
        .with_context(|| format!("write {}", txt_path.display()))?;

    if json {
        let json_path = dest.join(format!("{}.json", job.name));
        let value = to_json(&job.output.manifest);
        fs::write(&json_path, serde_json::to_string_pretty(&value)?)
            .with_context(|| format!("write {}", json_path.display()))?;
    }
    info!(?png_path, ?txt_path, "atlas written");
    Ok(())
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    max_dimension: Option<u32>,
    parallel: Option<bool>,
}

impl YamlConfig {
    fn into_packer_config(self, mut cfg: PackerConfig) -> PackerConfig {
        if let Some(v) = self.max_dimension {
            cfg.max_dimension = Some(v);
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        cfg
    }
}
