//! Auto-fitting text box driven from stdin
//!
//! Every input line replaces the content of a fixed-size box; the fitted font size and
//! the text that would be drawn are printed after each edit.

mod input;

use anyhow::{bail, Context};
use autofit::{FitConfig, FitSurface, LineMeasurer, MonospaceMeasurer, Spacing, TextFitter};
use autofit_cosmic::cosmic::CosmicMeasurer;
use clap::{Parser, ValueEnum};
use input::Edit;
use std::io::{BufRead, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// Fixed advance per character
    Mono,
    /// Real font shaping through cosmic-text
    Cosmic,
}

#[derive(Parser, Debug)]
#[command(version, about = "Shrink text until it fits its box")]
struct Cli {
    #[arg(help = "Box width", long)]
    width: f32,

    #[arg(help = "Box height", long)]
    height: f32,

    #[arg(help = "Largest font size", long, default_value_t = autofit::DEFAULT_MAX_SIZE)]
    max_size: f32,

    #[arg(help = "Smallest font size", long, default_value_t = autofit::DEFAULT_MIN_SIZE)]
    min_size: f32,

    #[arg(help = "Size step of the search", long, default_value_t = autofit::DEFAULT_STEP)]
    step: f32,

    #[arg(help = "Measurement backend", long, value_enum, default_value_t = Backend::Mono)]
    backend: Backend,

    #[arg(help = "Font files to load (cosmic backend)", long)]
    font: Vec<PathBuf>,

    #[arg(help = "Font family to request (cosmic backend)", long)]
    family: Option<String>,

    #[arg(help = "Do not end truncated text with an ellipsis", long)]
    no_ellipsis: bool,
}

fn build_measurer(cli: &Cli) -> anyhow::Result<Box<dyn LineMeasurer>> {
    match cli.backend {
        Backend::Mono => {
            if !cli.font.is_empty() {
                log::warn!("--font is ignored by the mono backend");
            }
            Ok(Box::new(MonospaceMeasurer::default()))
        }
        Backend::Cosmic => {
            let mut measurer = CosmicMeasurer::new_default();
            for path in &cli.font {
                let data = std::fs::read(path)
                    .with_context(|| format!("reading font {}", path.display()))?;
                measurer.load_font_data(data);
                log::info!("Loaded font {}", path.display());
            }
            if let Some(family) = &cli.family {
                measurer = measurer.with_family(family.clone());
            }
            if !measurer.has_fonts() {
                bail!("no fonts available; pass --font or install system fonts");
            }
            Ok(Box::new(measurer))
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = FitConfig::default()
        .with_size_range(cli.min_size, cli.max_size)
        .with_step(cli.step)
        .with_ellipsis(!cli.no_ellipsis);
    log::info!(
        "Fitting into {}x{} with sizes {}..={} ({:?} backend)",
        cli.width,
        cli.height,
        cli.min_size,
        cli.max_size,
        cli.backend
    );

    let mut measurer = build_measurer(&cli)?;
    let mut surface = FitSurface::new(TextFitter::new(config));
    surface.set_bounds(cli.width, cli.height);

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        match input::parse_line(&line) {
            Ok(Edit::Text(text)) => surface.set_text(text),
            Ok(Edit::Bounds { width, height }) => surface.set_bounds(width, height),
            Ok(Edit::Padding(padding)) => surface.set_padding(Spacing::all(padding)),
            Ok(Edit::TextSize(size)) => surface.set_text_size(size),
            Err(message) => {
                log::warn!("{message}");
                continue;
            }
        }

        match surface.layout(measurer.as_mut(), false) {
            Ok(Some(result)) => {
                if result.truncated {
                    log::debug!("Truncated at {}", result.font_size);
                }
                writeln!(
                    stdout,
                    "{}\t{}",
                    result.font_size,
                    input::escape(&result.display_text)
                )?;
            }
            Ok(None) => {}
            Err(err) => log::error!("Fit failed: {err}"),
        }
    }

    Ok(())
}
