//! photostrip: compose image files into a single 600x1800 photo strip PNG.
//!
//! # Usage
//!
//! ```text
//! photostrip [OPTIONS] <IMAGE[:FILTER]>...
//! photostrip --manifest strip.json
//! ```
//!
//! Each positional image may carry a filter suffix
//! (`:normal`, `:grayscale`, `:sepia`, `:invert`); images without one use
//! `--filter`. Logging is controlled with `RUST_LOG`.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod manifest;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use clap::Parser;
use photostrip_compositor::{
    Clock, ComposeOptions, EncodedImage, FilterTag, FontConfig, StripDiagnostics,
};

use crate::manifest::{ImageSpec, Manifest};

/// Compose captured photos into a printable photo strip.
///
/// Images are stacked top to bottom in the order given, under an optional
/// event title and date, above a fixed footer.
#[derive(Parser)]
#[command(name = "photostrip", version)]
struct Cli {
    /// Input images (PNG, JPEG, BMP, WebP), optionally suffixed `:FILTER`.
    #[arg(value_name = "IMAGE[:FILTER]", required_unless_present = "manifest")]
    images: Vec<String>,

    /// Filter for images without a suffix (normal, grayscale, sepia, invert).
    #[arg(long, default_value_t = FilterTag::Normal)]
    filter: FilterTag,

    /// Event title. `"A & B"` renders as a two-name header.
    #[arg(long)]
    title: Option<String>,

    /// Event date, rendered verbatim under the title.
    #[arg(long)]
    date: Option<String>,

    /// Output PNG path. Defaults to `photo-strip-<unix-millis>.png`.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print a `data:image/png;base64,...` URI to stdout instead of writing a file.
    #[arg(long, conflicts_with = "output")]
    data_uri: bool,

    /// Additional directory to load fonts from (repeatable).
    #[arg(long = "font-dir", value_name = "DIR")]
    font_dirs: Vec<PathBuf>,

    /// Do not load system-installed fonts.
    #[arg(long)]
    no_system_fonts: bool,

    /// JSON manifest listing images, title, and date.
    ///
    /// Replaces the positional images. `--title` and `--date` still
    /// override the manifest's values.
    #[arg(long, conflicts_with = "images")]
    manifest: Option<PathBuf>,

    /// Print per-stage timings after composing.
    #[arg(long)]
    diagnostics: bool,

    /// Print diagnostics as JSON instead of a human-readable report.
    #[arg(long, requires = "diagnostics")]
    json: bool,

    /// Emit log events as JSON lines.
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn compose_options(&self) -> ComposeOptions {
        ComposeOptions {
            fonts: FontConfig {
                font_dirs: self.font_dirs.clone(),
                load_system_fonts: !self.no_system_fonts,
            },
        }
    }

    /// The manifest describing this run, loaded from `--manifest` or
    /// assembled from the positional images.
    fn manifest(&self) -> Result<Manifest, manifest::InputError> {
        match self.manifest {
            Some(ref path) => Manifest::load(path),
            None => Ok(Manifest {
                images: self.images.iter().map(|a| ImageSpec::parse_arg(a)).collect(),
                ..Manifest::default()
            }),
        }
    }
}

/// Install the global tracing subscriber. Logs go to stderr so stdout
/// stays clean for data URIs and diagnostics.
fn init_logging(json: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
}

/// Download-style file name stamped with the current time.
fn default_output_path(now: SystemTime) -> PathBuf {
    let millis = now
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis());
    PathBuf::from(format!("photo-strip-{millis}.png"))
}

fn print_diagnostics(diagnostics: &StripDiagnostics, json: bool, to_stderr: bool) -> ExitCode {
    let text = if json {
        match serde_json::to_string_pretty(diagnostics) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("Error serializing diagnostics: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        diagnostics.report()
    };
    if to_stderr {
        eprintln!("{text}");
    } else {
        println!("{text}");
    }
    ExitCode::SUCCESS
}

fn write_strip(strip: &EncodedImage, path: &Path) -> std::io::Result<()> {
    std::fs::write(path, strip.as_bytes())?;
    eprintln!(
        "Photo strip written to {} ({}x{}, {} bytes)",
        path.display(),
        strip.width(),
        strip.height(),
        strip.as_bytes().len(),
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let manifest = match cli.manifest() {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let images = match manifest.read_images(cli.filter) {
        Ok(images) => images,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let metadata = manifest.metadata(cli.title.as_deref(), cli.date.as_deref());
    tracing::info!(
        images = images.len(),
        title = metadata.title.as_deref(),
        date = metadata.date.as_deref(),
        "composing photo strip"
    );

    let (strip, diagnostics) = match photostrip_compositor::compose_with_diagnostics(
        &images,
        &metadata,
        &cli.compose_options(),
        &StdClock,
    ) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Compose error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.data_uri {
        println!("{}", strip.to_data_uri());
    } else {
        let path = cli
            .output
            .clone()
            .unwrap_or_else(|| default_output_path(SystemTime::now()));
        if let Err(e) = write_strip(&strip, &path) {
            eprintln!("Error writing {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
    }

    if cli.diagnostics {
        return print_diagnostics(&diagnostics, cli.json, cli.data_uri);
    }
    ExitCode::SUCCESS
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("photostrip").chain(args.iter().copied()))
    }

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn positional_images_with_suffixes() {
        let cli = parse(&["a.png", "b.png:grayscale", "c.png:SEPIA"]).unwrap();
        let manifest = cli.manifest().unwrap();
        let filters: Vec<_> = manifest.images.iter().map(|s| s.filter).collect();
        assert_eq!(
            filters,
            [None, Some(FilterTag::Grayscale), Some(FilterTag::Sepia)]
        );
    }

    #[test]
    fn default_filter_flag_parses() {
        let cli = parse(&["--filter", "invert", "a.png"]).unwrap();
        assert_eq!(cli.filter, FilterTag::Invert);
    }

    #[test]
    fn unknown_filter_flag_is_rejected() {
        assert!(parse(&["--filter", "vintage", "a.png"]).is_err());
    }

    #[test]
    fn images_or_manifest_required() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["--manifest", "strip.json"]).is_ok());
    }

    #[test]
    fn manifest_conflicts_with_positional_images() {
        assert!(parse(&["--manifest", "strip.json", "a.png"]).is_err());
    }

    #[test]
    fn data_uri_conflicts_with_output() {
        assert!(parse(&["--data-uri", "-o", "out.png", "a.png"]).is_err());
    }

    #[test]
    fn json_requires_diagnostics() {
        assert!(parse(&["--json", "a.png"]).is_err());
        assert!(parse(&["--diagnostics", "--json", "a.png"]).is_ok());
    }

    #[test]
    fn font_options_map_to_config() {
        let cli = parse(&[
            "--font-dir",
            "/fonts/a",
            "--font-dir",
            "/fonts/b",
            "--no-system-fonts",
            "a.png",
        ])
        .unwrap();
        let options = cli.compose_options();
        assert_eq!(
            options.fonts.font_dirs,
            [PathBuf::from("/fonts/a"), PathBuf::from("/fonts/b")]
        );
        assert!(!options.fonts.load_system_fonts);
    }

    #[test]
    fn default_output_is_timestamped() {
        let at = UNIX_EPOCH + Duration::from_millis(1_700_000_000_123);
        assert_eq!(
            default_output_path(at),
            PathBuf::from("photo-strip-1700000000123.png")
        );
    }
}
