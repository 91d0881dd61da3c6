//! Springy CLI
//!
//! Replays springy animations headlessly and prints the resulting poses.

use anyhow::Result;
use clap::{Parser, Subcommand};
use springy_animation::{
    AnimationKind, AnimationScheduler, AnimatorConfig, CallbackListener, EntranceStyle,
    ListStaggerConfig, ListStaggerCoordinator, SingleElementSpringAnimator, ViewProperties,
    Viewport,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

/// One simulated display frame
const FRAME: Duration = Duration::from_millis(16);

/// Upper bound on simulated frames per run (~5 minutes)
const MAX_FRAMES: usize = 20_000;

#[derive(Parser)]
#[command(name = "springy")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Replay spring animations without a display", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stagger a list's first screenful, then scroll through the rest
    List {
        /// Number of items in the list
        #[arg(short = 'n', long, default_value = "99")]
        items: usize,

        /// Viewport height in pixels
        #[arg(long, default_value = "1920")]
        height: u32,

        /// Viewport width in pixels
        #[arg(long, default_value = "1080")]
        width: u32,

        /// Height of one row in pixels
        #[arg(long, default_value = "160")]
        row_height: u32,

        /// Entrance style (slide_from_bottom, slide_from_left, slide_from_right, scale)
        #[arg(short, long)]
        style: Option<EntranceStyle>,

        /// Last position to scroll to after the first batch
        #[arg(long)]
        scroll_to: Option<usize>,

        /// TOML file with list stagger settings
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Animate a single element and print a trace of its value
    Single {
        /// Animated property (translate_x, translate_y, rotate_x, rotate_y,
        /// rotation, scale_x, scale_y, scale_xy, alpha)
        #[arg(short, long)]
        kind: Option<AnimationKind>,

        /// Start value
        #[arg(long, allow_hyphen_values = true)]
        from: Option<f32>,

        /// End value
        #[arg(long, allow_hyphen_values = true)]
        to: Option<f32>,

        /// Start delay in milliseconds
        #[arg(short, long)]
        delay: Option<u64>,

        /// Spring tension (designer scale)
        #[arg(long)]
        tension: Option<f64>,

        /// Spring friction (designer scale)
        #[arg(long)]
        friction: Option<f64>,

        /// Print every Nth frame
        #[arg(long, default_value = "4")]
        sample_every: usize,

        /// TOML file with animator settings
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::List {
            items,
            height,
            width,
            row_height,
            style,
            scroll_to,
            config: config_path,
        } => {
            let mut settings: ListStaggerConfig =
                config::load_or_default(config_path.as_deref())?;
            if let Some(style) = style {
                settings.style = style;
            }
            cmd_list(
                &settings,
                Viewport::new(width, height),
                items,
                row_height,
                scroll_to,
            )
        }

        Commands::Single {
            kind,
            from,
            to,
            delay,
            tension,
            friction,
            sample_every,
            config: config_path,
        } => {
            let mut settings = match config_path {
                Some(path) => config::load::<AnimatorConfig>(&path)?,
                None => AnimatorConfig::fade_in(),
            };
            if let Some(kind) = kind {
                settings.kind = kind;
            }
            if let Some(from) = from {
                settings.from = from;
            }
            if let Some(to) = to {
                settings.to = to;
            }
            if let Some(delay) = delay {
                settings.delay_ms = delay;
            }
            if let Some(tension) = tension {
                settings.tension = tension;
            }
            if let Some(friction) = friction {
                settings.friction = friction;
            }
            cmd_single(&settings, sample_every.max(1))
        }
    }
}

fn cmd_list(
    settings: &ListStaggerConfig,
    viewport: Viewport,
    items: usize,
    row_height: u32,
    scroll_to: Option<usize>,
) -> Result<()> {
    if items == 0 {
        anyhow::bail!("List needs at least one item");
    }
    if row_height == 0 {
        anyhow::bail!("Row height must be positive");
    }

    let scheduler = AnimationScheduler::new();
    let list = ListStaggerCoordinator::from_config(scheduler.handle(), &viewport, settings)?;
    let on_screen = (viewport.height.div_ceil(row_height) as usize).min(items);

    info!(
        "Staggering {} of {} items ({}, {}x{})",
        on_screen, items, settings.style, viewport.width, viewport.height
    );

    let mut rows = Vec::with_capacity(items);
    let mut starts = Vec::with_capacity(items);

    // First layout: create and bind every row that fits on screen
    for position in 0..on_screen {
        let row = ViewProperties::new().shared();
        let scheduled = list.on_item_create(&row);
        list.on_item_bind(&row, position);
        starts.push(scheduled.map(|s| (scheduler.now() + s.delay, s.parameters.tension())));
        rows.push(row);
    }

    let mut frames = run_until_idle(&scheduler)?;
    debug!("First batch idle after {} frames", frames);

    // Scroll one row per frame
    let last = scroll_to.unwrap_or(items - 1).min(items - 1);
    for position in on_screen..=last {
        let row = ViewProperties::new().shared();
        let created = list.on_item_create(&row);
        let bound = list.on_item_bind(&row, position);
        let scheduled = created.or(bound);
        starts.push(scheduled.map(|s| (scheduler.now() + s.delay, s.parameters.tension())));
        rows.push(row);
        scheduler.advance(FRAME);
        frames += 1;
    }
    frames += run_until_idle(&scheduler)?;

    println!(
        "{:>8}  {:>10}  {:>8}  {:>10}  {:>10}",
        "position", "start", "tension", "offset", "scale"
    );
    for (position, (row, start)) in rows.iter().zip(&starts).enumerate() {
        let props = row.lock().clone();
        let offset = match settings.style {
            EntranceStyle::SlideFromBottom => props.translation_y,
            _ => props.translation_x,
        };
        match start {
            Some((at, tension)) => println!(
                "{:>8}  {:>8}ms  {:>8.1}  {:>10.2}  {:>10.3}",
                position,
                at.as_millis(),
                tension,
                offset,
                props.scale_x
            ),
            None => println!(
                "{:>8}  {:>10}  {:>8}  {:>10.2}  {:>10.3}",
                position, "-", "-", offset, props.scale_x
            ),
        }
    }

    info!(
        "Done after {} frames ({}ms simulated)",
        frames,
        scheduler.now().as_millis()
    );
    Ok(())
}

fn cmd_single(settings: &AnimatorConfig, sample_every: usize) -> Result<()> {
    let scheduler = AnimationScheduler::new();
    let view = ViewProperties::hidden().shared();

    let listener = CallbackListener::new()
        .on_start(|| info!("Spring started"))
        .on_stop(|| info!("Spring at rest"));
    let animator = SingleElementSpringAnimator::from_config(scheduler.handle(), settings)?
        .with_listener(listener);

    info!(
        "Animating {} from {} to {} (tension={}, friction={}, delay={}ms)",
        settings.kind,
        settings.from,
        settings.to,
        settings.tension,
        settings.friction,
        settings.delay_ms
    );
    animator.start(&view);

    println!("{:>8}  {:>12}", "time", settings.kind);
    println!("{:>6}ms  {:>12.4}", 0, view.lock().get(settings.kind));

    let mut frame = 0;
    let mut running = true;
    while running {
        running = scheduler.advance(FRAME);
        frame += 1;
        if frame % sample_every == 0 || !running {
            println!(
                "{:>6}ms  {:>12.4}",
                scheduler.now().as_millis(),
                view.lock().get(settings.kind)
            );
        }
        if frame >= MAX_FRAMES {
            anyhow::bail!("Spring did not settle within {} frames", MAX_FRAMES);
        }
    }

    Ok(())
}

fn run_until_idle(scheduler: &AnimationScheduler) -> Result<usize> {
    let mut frames = 0;
    while scheduler.advance(FRAME) {
        frames += 1;
        if frames >= MAX_FRAMES {
            anyhow::bail!("Animations did not settle within {} frames", MAX_FRAMES);
        }
    }
    Ok(frames)
}
