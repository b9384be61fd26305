//! Main entry point for the tarstore CLI application.
//!
//! This binary lists, inspects and extracts tar archives from both the local
//! filesystem and HTTP URLs, going through the same [`Storager`] interface a
//! library user would.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::Parser;
use log::warn;
use std::collections::HashSet;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tarstore::{ByteSource, Cli, HttpSource, LocalFileSource, Object, ObjectMode, Storager};

/// Application entry point.
///
/// Parses command-line arguments and dispatches to the appropriate handler
/// based on whether the input is a local file or HTTP URL.
fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.is_http_url() {
        // Handle remote tar file, streamed over HTTP
        let source = HttpSource::new(cli.archive.clone(), Duration::from_secs(cli.timeout))
            .context("building HTTP client")?;
        let source = Arc::new(source);

        process_archive(&Storager::new(source.clone()), &cli)?;

        // Display network transfer statistics for HTTP sources
        if !cli.is_quiet() {
            eprintln!(
                "\nTotal bytes transferred: {}",
                format_size(source.transferred_bytes())
            );
        }
    } else {
        // Handle local tar file
        let source = Arc::new(LocalFileSource::new(&cli.archive));
        process_archive(&Storager::new(source), &cli)?;
    }

    Ok(())
}

/// Process a tar archive based on CLI options.
///
/// - List mode (`-l` or `-v`): display archive contents
/// - Stat mode (`-s`): display metadata of the named paths
/// - Extract mode: extract file objects matching the filters
fn process_archive<S: ByteSource + ?Sized>(storager: &Storager<S>, cli: &Cli) -> Result<()> {
    if cli.list || cli.verbose {
        return list_objects(storager, &cli.prefix, cli.verbose);
    }

    if cli.stat {
        return stat_objects(storager, &cli.paths);
    }

    // Select file objects in archive order. Duplicates resolve to the first
    // entry anyway, so each path is extracted once.
    let mut selected = Vec::new();
    let mut seen = HashSet::new();
    let mut lister = storager.list("")?;
    for object in lister.objects()? {
        let object = object?;
        if object.is_file() && is_selected(&object.path, cli) && seen.insert(object.path.clone()) {
            selected.push(object);
        }
    }
    drop(lister);

    let multiple_files = cli.pipe && selected.len() > 1;
    for object in &selected {
        extract_object(storager, object, cli, multiple_files)?;
    }

    Ok(())
}

/// Apply the positional path filters and the `-x` exclusions.
fn is_selected(path: &str, cli: &Cli) -> bool {
    if !cli.paths.is_empty() {
        let matches = cli.paths.iter().any(|p| {
            if has_glob_chars(p) {
                glob_match(p, path)
            } else {
                let basename = Path::new(path)
                    .file_name()
                    .map(|s| s.to_string_lossy())
                    .unwrap_or_default();
                path == p || basename == *p
            }
        });
        if !matches {
            return false;
        }
    }

    !cli
        .exclude
        .iter()
        .any(|x| path.contains(x.as_str()) || glob_match(x, path))
}

/// List objects in archive order.
///
/// The verbose format adds size, mode, permissions and modification time.
fn list_objects<S: ByteSource + ?Sized>(
    storager: &Storager<S>,
    prefix: &str,
    verbose: bool,
) -> Result<()> {
    let mut lister = storager.list(prefix)?;

    if verbose {
        println!(
            "{:>10}  {:<7}  {:>4}  {:>10}  {:>5}  Name",
            "Length", "Mode", "Perm", "Date", "Time"
        );
        println!("{}", "-".repeat(70));
    }

    let mut total_size = 0u64;
    let mut file_count = 0usize;

    for object in lister.objects()? {
        let object = object?;
        if verbose {
            let length = object
                .content_length
                .map(|n| n.to_string())
                .unwrap_or_default();
            println!(
                "{:>10}  {:<7}  {:04o}  {}  {}",
                length,
                object.mode,
                object.permissions,
                format_time(&object),
                display_name(&object)
            );

            if let Some(n) = object.content_length {
                total_size += n;
                file_count += 1;
            }
        } else {
            println!("{}", object.path);
        }
    }

    if verbose {
        println!("{}", "-".repeat(70));
        println!("{:>10}  {:>33}  {} files", total_size, "", file_count);
    }

    Ok(())
}

/// Print metadata of each requested path.
fn stat_objects<S: ByteSource + ?Sized>(storager: &Storager<S>, paths: &[String]) -> Result<()> {
    if paths.is_empty() {
        bail!("-s needs at least one path");
    }

    for path in paths {
        let object = storager.stat(path)?;
        println!("  Path: {}", object.path);
        println!("  Mode: {} ({:04o})", object.mode, object.permissions);
        if let Some(length) = object.content_length {
            println!("  Size: {} ({})", length, format_size(length));
        }
        if let Some(target) = &object.link_target {
            println!("Target: {}", target);
        }
        println!("  Time: {}", format_time(&object));
    }

    Ok(())
}

/// Extract a single file object.
///
/// Handles pipe mode (`-p`), a custom output directory (`-d`), junk paths
/// (`-j`) and overwrite control (`-n`, `-o`).
fn extract_object<S: ByteSource + ?Sized>(
    storager: &Storager<S>,
    object: &Object,
    cli: &Cli,
    show_filename: bool,
) -> Result<()> {
    // Pipe mode: write file contents directly to stdout
    if cli.pipe {
        let stdout = std::io::stdout();
        let mut stdout = stdout.lock();
        if show_filename {
            writeln!(stdout, "--- {} ---", object.path)?;
        }
        storager.read(&object.path, &mut stdout)?;
        stdout.flush()?;
        return Ok(());
    }

    let relative = if cli.junk_paths {
        Path::new(&object.path)
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(&object.path))
    } else {
        PathBuf::from(&object.path)
    };

    // Archive names are not sanitized by the storager; refuse to write
    // outside the output directory.
    if !is_contained(&relative) {
        warn!("refusing to extract {:?} outside the output directory", object.path);
        if !cli.is_very_quiet() {
            eprintln!("Skipping: {} (unsafe path)", object.path);
        }
        return Ok(());
    }

    let output_path = match &cli.extract_dir {
        Some(dir) => PathBuf::from(dir).join(&relative),
        None => relative,
    };

    // Handle existing files based on overwrite options
    if output_path.exists() {
        if cli.never_overwrite {
            if !cli.is_quiet() {
                eprintln!("Skipping: {} (file exists)", object.path);
            }
            return Ok(());
        }

        if !cli.overwrite {
            if !cli.is_quiet() {
                eprintln!("Skipping: {} (use -o to overwrite)", object.path);
            }
            return Ok(());
        }
    }

    if !cli.is_quiet() {
        println!("  extracting: {}", object.path);
    }

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }

    let file = fs::File::create(&output_path)
        .with_context(|| format!("creating {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);
    storager.read(&object.path, &mut writer)?;
    writer.flush()?;

    Ok(())
}

/// Check that a relative path stays below its base directory.
fn is_contained(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn display_name(object: &Object) -> String {
    match (&object.mode, &object.link_target) {
        (ObjectMode::Link, Some(target)) => format!("{} -> {}", object.path, target),
        _ => object.path.clone(),
    }
}

fn format_time(object: &Object) -> String {
    object
        .last_modified
        .map(|t| DateTime::<Utc>::from(t).format("%Y-%m-%d  %H:%M").to_string())
        .unwrap_or_else(|| format!("{:>17}", "-"))
}

/// Check if a pattern contains glob wildcard characters.
fn has_glob_chars(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Simple glob pattern matching supporting `*` and `?` wildcards.
///
/// - `*` matches zero or more characters, including `/`
/// - `?` matches exactly one character
///
/// ```ignore
/// assert!(glob_match("*.txt", "dir/readme.txt"));
/// assert!(glob_match("file?.dat", "file1.dat"));
/// assert!(!glob_match("*.txt", "readme.md"));
/// ```
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern_chars: Vec<char> = pattern.chars().collect();
    let text_chars: Vec<char> = text.chars().collect();

    fn do_match(pattern: &[char], text: &[char]) -> bool {
        match (pattern.first(), text.first()) {
            (None, None) => true,
            // Skip the star, or let it swallow one more character
            (Some('*'), _) => {
                do_match(&pattern[1..], text) || (!text.is_empty() && do_match(pattern, &text[1..]))
            }
            (Some('?'), Some(_)) => do_match(&pattern[1..], &text[1..]),
            (Some(p), Some(t)) if *p == *t => do_match(&pattern[1..], &text[1..]),
            _ => false,
        }
    }

    do_match(&pattern_chars, &text_chars)
}

/// Format a byte size into a human-readable string.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
