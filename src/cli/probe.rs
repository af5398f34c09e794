//! Probe command implementation.
//!
//! Reports whether PNG files actually use transparency, without decoding
//! pixel data.

use std::path::{Path, PathBuf};

use clap::Args;
use walkdir::WalkDir;

use crate::error::Result;
use crate::export::{inspect_png_file, PngSummary};
use crate::output::{plural, Printer};

/// Report whether PNG files carry alpha
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// PNG files or directories to search for them
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

pub fn run(args: ProbeArgs) -> Result<()> {
    let printer = Printer::new();
    let files = collect_pngs(&args.paths);

    let mut with_alpha = 0;
    for file in &files {
        match inspect_png_file(file) {
            Ok(summary) => {
                if summary.has_alpha() {
                    with_alpha += 1;
                }
                println!("{}: {}", file.display(), describe(&summary));
            }
            Err(e) => printer.warning("Skipped", &format!("{}: {}", file.display(), e)),
        }
    }

    printer.status(
        "Probed",
        &format!(
            "{}, {} with alpha",
            plural(files.len(), "file", "files"),
            with_alpha
        ),
    );
    Ok(())
}

/// Expand directories into the `.png` files below them, sorted per root.
/// Files named explicitly are kept whatever their extension.
pub fn collect_pngs(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for root in paths {
        if !root.is_dir() {
            files.push(root.clone());
            continue;
        }

        let mut found: Vec<PathBuf> = WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && is_png(e.path()))
            .map(|e| e.into_path())
            .collect();
        found.sort();
        files.extend(found);
    }

    files
}

fn is_png(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

/// One-line verdict, e.g. "alpha (64x64, 8-bit rgba)".
pub fn describe(summary: &PngSummary) -> String {
    let verdict = if summary.has_alpha() { "alpha" } else { "opaque" };

    let mut details = Vec::new();
    if let (Some(w), Some(h)) = (summary.width, summary.height) {
        details.push(format!("{}x{}", w, h));
    }
    match summary.bit_depth {
        Some(depth) => details.push(format!("{}-bit {}", depth, summary.color_type_name())),
        None => details.push(summary.color_type_name().to_string()),
    }
    if summary.has_transparency_chunk {
        details.push("tRNS".to_string());
    }
    if summary.truncated {
        details.push("truncated".to_string());
    }

    format!("{} ({})", verdict, details.join(", "))
}
