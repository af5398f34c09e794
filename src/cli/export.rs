//! Export command implementation.
//!
//! Loads a scene file, runs the export pipeline and writes the manifest.

use std::path::{Path, PathBuf};

use clap::Args;

use crate::config::{ExportConfig, CONFIG_FILENAME};
use crate::error::Result;
use crate::export::{export_images, ManifestBuilder};
use crate::host::Scene;
use crate::output::{display_path, file_size, plural, Printer};
use crate::types::ImageManifestEntry;

/// Export the images of a scene file
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Scene file describing images and textures
    pub scene: PathBuf,

    /// Output directory (overrides texport.yaml)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Copy stored files and trust declared alpha
    #[arg(long)]
    pub compat: bool,

    /// Config file (defaults to texport.yaml next to the scene)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Manifest file name (overrides texport.yaml)
    #[arg(long)]
    pub manifest: Option<String>,
}

/// What an export run produced.
#[derive(Debug)]
pub struct ExportSummary {
    pub output: PathBuf,
    pub manifest_path: PathBuf,
    pub entries: Vec<ImageManifestEntry>,
}

pub fn run(args: ExportArgs) -> Result<()> {
    let printer = Printer::new();
    let summary = export_scene(&args, &printer)?;

    let files: usize = summary
        .entries
        .iter()
        .map(|entry| entry.formats.record_count())
        .sum();
    printer.status(
        "Finished",
        &format!(
            "{} ({}) to {}",
            plural(summary.entries.len(), "image", "images"),
            plural(files, "file", "files"),
            display_path(&summary.output)
        ),
    );
    Ok(())
}

/// Run the export described by `args`, reporting progress through `printer`.
pub fn export_scene(args: &ExportArgs, printer: &Printer) -> Result<ExportSummary> {
    let scene_dir = base_dir(&args.scene);
    let (config, config_dir) = match &args.config {
        Some(path) => (ExportConfig::load(path)?, base_dir(path)),
        None => (ExportConfig::discover(&scene_dir)?, scene_dir.clone()),
    };
    if args.config.is_none() && config_dir.join(CONFIG_FILENAME).is_file() {
        printer.info("Config", &display_path(&config_dir.join(CONFIG_FILENAME)));
    }

    let output = match &args.output {
        Some(dir) => dir.clone(),
        None if config.output.is_relative() => config_dir.join(&config.output),
        None => config.output.clone(),
    };
    let manifest_name = args.manifest.as_deref().unwrap_or(&config.manifest);
    let mut options = config.options();
    options.compatibility_mode |= args.compat;

    let mut scene = Scene::load(&args.scene)?;
    scene.set_jpeg_quality(config.jpeg_quality);
    printer.status(
        "Exporting",
        &format!(
            "{} from {}",
            plural(scene.images.len(), "image", "images"),
            display_path(&args.scene)
        ),
    );
    if options.compatibility_mode {
        printer.warning("Compat", "declared alpha is trusted, stored files are copied");
    }

    let entries = export_images(&mut scene.images, &scene.users, &output, &options)?;
    for entry in &entries {
        for (_, records) in entry.formats.iter() {
            for record in records {
                printer.status(
                    "Wrote",
                    &format!(
                        "{} {}",
                        record.file_name,
                        printer.dim(&format!(
                            "({}x{}, {})",
                            record.width,
                            record.height,
                            file_size(record.file_size)
                        ))
                    ),
                );
            }
        }
    }

    let manifest_path = output.join(manifest_name);
    let manifest = ManifestBuilder::from_entries(entries);
    manifest.write_json(&manifest_path)?;
    printer.status("Manifest", &display_path(&manifest_path));

    Ok(ExportSummary {
        output,
        manifest_path,
        entries: manifest.finish(),
    })
}

fn base_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
