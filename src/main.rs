//! region-blur - CLI entry point

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn, Level};

use region_blur::{
    exit_codes, load_regions, load_rgba, mosaic, save_rgba, stack_blur, BlurArgs, Cli,
    CliOverrides, Commands, Config, ConfigError, MosaicArgs, PixelRect, RegionError,
    RegionRenderer, RenderArgs, Size, TargetKind, MAX_BLUR_RADIUS,
};

/// Argument values clap cannot reject on its own
#[derive(Debug, Error)]
#[error("Invalid argument: {0}")]
struct InvalidArgs(String);

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Render(args) => run_render(args),
        Commands::Blur(args) => run_blur(args),
        Commands::Mosaic(args) => run_mosaic(args),
        Commands::Info => run_info(),
    };

    std::process::exit(match result {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code_for(&e)
        }
    });
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if let Some(RegionError::ImageNotFound(_)) = err.downcast_ref::<RegionError>() {
        return exit_codes::INPUT_NOT_FOUND;
    }
    if err.downcast_ref::<InvalidArgs>().is_some() || err.downcast_ref::<ConfigError>().is_some() {
        return exit_codes::INVALID_ARGS;
    }
    exit_codes::GENERAL_ERROR
}

// ============ Render Command ============

fn run_render(args: &RenderArgs) -> Result<()> {
    let start_time = Instant::now();

    let display = Size::new(args.display_width, args.display_height);
    if display.is_degenerate() {
        bail!(InvalidArgs(format!(
            "display size must be positive, got {}x{}",
            args.display_width, args.display_height
        )));
    }

    let config = match &args.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load().unwrap_or_else(|e| {
            warn!("Failed to load config file: {}", e);
            Config::default()
        }),
    };

    let overrides = CliOverrides {
        dpr: args.dpr,
        max_blur_radius: args.max_radius,
        ..CliOverrides::new()
    };
    let options = config.merge_with_cli(&overrides);
    let target = config.target(args.target == TargetKind::Export, overrides.dpr);

    let source = load_rgba(&args.input)?;
    let regions = load_regions(&args.regions)
        .with_context(|| format!("reading regions from {}", args.regions.display()))?;

    info!(
        input = %args.input.display(),
        regions = regions.len(),
        canvas = ?target,
        "Rendering"
    );

    let renderer = RegionRenderer::new(options);
    let output = renderer.render(&source, display, target, &regions);
    save_rgba(&output, &args.output)?;

    info!(
        output = %args.output.display(),
        width = output.width(),
        height = output.height(),
        "Done in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

// ============ Blur Command ============

fn run_blur(args: &BlurArgs) -> Result<()> {
    if args.radius.is_nan() || args.radius.round() < 1.0 {
        bail!(InvalidArgs(format!(
            "radius must be at least 1, got {}",
            args.radius
        )));
    }
    if args.radius > MAX_BLUR_RADIUS as f64 {
        warn!("Radius {} clamped to {}", args.radius, MAX_BLUR_RADIUS);
    }

    let mut image = load_rgba(&args.input)?;
    let rect = args
        .rect
        .unwrap_or_else(|| PixelRect::full(image.width(), image.height()));
    if rect.clip_to(image.width(), image.height()).is_none() {
        warn!(?rect, "Rectangle lies outside the image; output is unchanged");
    }

    stack_blur(&mut image, rect, args.radius);
    save_rgba(&image, &args.output)?;
    info!(output = %args.output.display(), "Blurred");
    Ok(())
}

// ============ Mosaic Command ============

fn run_mosaic(args: &MosaicArgs) -> Result<()> {
    if args.block == 0 {
        bail!(InvalidArgs("block size must be at least 1".into()));
    }

    let mut image = load_rgba(&args.input)?;
    mosaic(&mut image, args.block);
    save_rgba(&image, &args.output)?;
    info!(output = %args.output.display(), block = args.block, "Pixelated");
    Ok(())
}

// ============ Info Command ============

fn run_info() -> Result<()> {
    println!("region-blur v{}", env!("CARGO_PKG_VERSION"));
    println!();

    let config = Config::load().unwrap_or_else(|e| {
        println!("Config error (using defaults): {}", e);
        Config::default()
    });
    let options = config.merge_with_cli(&CliOverrides::new());

    println!("Render Defaults:");
    println!("  Display DPR:        {}", config.display_dpr());
    println!("  Export DPR:         {}", config.export_dpr());
    println!("  Max blur radius:    {}", options.max_blur_radius);
    println!("  Corner radius:      {}", options.corner_radius);
    println!(
        "  Mosaic block floor: {} (display), {} (export)",
        options.display_mosaic_min_block, options.export_mosaic_min_block
    );

    println!();
    println!("Effective Config:");
    print!("{}", config.resolved().to_toml()?);

    println!();
    println!("Config File Locations:");
    for path in Config::search_paths() {
        let status = if path.is_file() { "found" } else { "not found" };
        println!("  {} ({})", path.display(), status);
    }

    Ok(())
}
