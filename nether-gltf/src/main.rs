//! nether-gltf - glTF binary data inspector
//!
//! Validates .gltf/.glb files and prints decoded accessors, node transforms
//! and sampled animation channels.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use nether_gltf::{Config, Model, Tuple, import, validate};

#[derive(Parser)]
#[command(name = "nether-gltf")]
#[command(about = "glTF 2.0 accessor, scene and animation inspector")]
#[command(version)]
struct Cli {
    /// Path to a nether-gltf.toml configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a document
    Info {
        /// Input glTF/GLB file
        input: PathBuf,
    },

    /// Run every validation check and list all violations
    Validate {
        /// Input glTF/GLB file
        input: PathBuf,
    },

    /// Decode one accessor
    Accessor {
        /// Input glTF/GLB file
        input: PathBuf,

        /// Accessor index
        index: usize,
    },

    /// Print a node's local and world transform
    Node {
        /// Input glTF/GLB file
        input: PathBuf,

        /// Node index
        index: usize,
    },

    /// Sample one animation channel at a time
    Sample {
        /// Input glTF/GLB file
        input: PathBuf,

        /// Animation index
        #[arg(short, long, default_value_t = 0)]
        animation: usize,

        /// Channel index
        #[arg(short, long, default_value_t = 0)]
        channel: usize,

        /// Time in seconds
        #[arg(short, long)]
        time: f32,
    },

    /// Sample one animation channel at a fixed frame rate
    Bake {
        /// Input glTF/GLB file
        input: PathBuf,

        /// Animation index
        #[arg(short, long, default_value_t = 0)]
        animation: usize,

        /// Channel index
        #[arg(short, long, default_value_t = 0)]
        channel: usize,

        /// Frame rate for sampling (default: from config, 30)
        #[arg(short, long)]
        frame_rate: Option<f32>,
    },
}

fn load_model(input: &Path, config: &Config) -> Result<Model> {
    let (document, buffers) = import::import(input)?;
    match Model::with_config(document, buffers, config) {
        Ok(model) => Ok(model),
        Err(report) => {
            for error in &report {
                tracing::error!("{}", error);
            }
            Err(report).with_context(|| format!("{:?} is not a valid glTF document", input))
        }
    }
}

fn format_row(values: &[f32]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{:.6}", v)).collect();
    format!("[{}]", parts.join(", "))
}

fn format_tuple(tuple: Tuple<'_>) -> String {
    match tuple {
        Tuple::Float(v) => format_row(v),
        Tuple::Signed(v) => format!("{:?}", v),
        Tuple::Unsigned(v) => format!("{:?}", v),
    }
}

fn info(model: &Model, input: &Path) -> Result<()> {
    let document = model.document();
    tracing::info!(
        "{:?}: glTF {} ({})",
        input,
        document.asset.version,
        document.asset.generator.as_deref().unwrap_or("unknown generator")
    );
    tracing::info!(
        "  {} buffer(s), {} view(s), {} accessor(s)",
        document.buffers.len(),
        document.buffer_views.len(),
        document.accessors.len()
    );
    tracing::info!(
        "  {} node(s), {} scene(s), {} mesh(es), {} skin(s)",
        document.nodes.len(),
        document.scenes.len(),
        document.meshes.len(),
        document.skins.len()
    );

    for (i, animation) in document.animations.iter().enumerate() {
        tracing::info!(
            "  animation [{}] '{}': {} channels, {:.2}s",
            i,
            animation.name.as_deref().unwrap_or("unnamed"),
            animation.channels.len(),
            model.duration(i)?
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let max_rows = config.output.max_rows;

    match cli.command {
        Commands::Info { input } => {
            let model = load_model(&input, &config)?;
            info(&model, &input)?;
        }

        Commands::Validate { input } => {
            let (document, buffers) = import::import(&input)?;
            match validate(&document, &buffers) {
                Ok(()) => tracing::info!("{:?} is valid", input),
                Err(report) => {
                    for error in &report {
                        tracing::error!("{}", error);
                    }
                    bail!("{:?}: {}", input, report);
                }
            }
        }

        Commands::Accessor { input, index } => {
            let model = load_model(&input, &config)?;
            let decoded = model.decode_accessor(index)?;
            tracing::info!(
                "Accessor {}: {} x {}{:?} {:?}",
                index,
                decoded.count,
                if decoded.normalized { "normalized " } else { "" },
                decoded.component_type,
                decoded.element_type
            );
            for i in 0..decoded.count.min(max_rows) {
                if let Some(tuple) = decoded.tuple(i) {
                    tracing::info!("  [{}] {}", i, format_tuple(tuple));
                }
            }
            if decoded.count > max_rows {
                tracing::info!("  ... {} more", decoded.count - max_rows);
            }
        }

        Commands::Node { input, index } => {
            let model = load_model(&input, &config)?;
            let node = model
                .document()
                .nodes
                .get(index)
                .with_context(|| format!("Node index {} not found", index))?;
            let local = nether_gltf::scene::local_matrix(node);
            let world = model.world_transform(index)?;
            let (scale, rotation, translation) = world.to_scale_rotation_translation();

            tracing::info!("Node {} '{}'", index, node.name.as_deref().unwrap_or("unnamed"));
            tracing::info!("  local: {}", format_row(&local.to_cols_array()));
            tracing::info!("  world: {}", format_row(&world.to_cols_array()));
            tracing::info!("  world translation: {}", format_row(&translation.to_array()));
            tracing::info!("  world rotation: {}", format_row(&rotation.to_array()));
            tracing::info!("  world scale: {}", format_row(&scale.to_array()));
        }

        Commands::Sample {
            input,
            animation,
            channel,
            time,
        } => {
            let model = load_model(&input, &config)?;
            let value = model.sample(animation, channel, time)?;
            tracing::info!(
                "Animation {} channel {} at {}s: {}",
                animation,
                channel,
                time,
                format_row(&value)
            );
        }

        Commands::Bake {
            input,
            animation,
            channel,
            frame_rate,
        } => {
            let frame_rate = frame_rate.unwrap_or(config.sampling.frame_rate);
            if !(frame_rate > 0.0) {
                bail!("Frame rate must be positive, got {}", frame_rate);
            }
            let model = load_model(&input, &config)?;
            let sampler = model.channel_sampler(animation, channel)?;
            let frames = sampler.bake(frame_rate)?;
            tracing::info!(
                "Animation {} channel {} ({:?}, {:?}): {} frames at {} fps",
                animation,
                channel,
                sampler.target_path(),
                sampler.interpolation(),
                frames.len(),
                frame_rate
            );
            for (i, frame) in frames.iter().take(max_rows).enumerate() {
                tracing::info!("  [{}] {:.4}s {}", i, i as f32 / frame_rate, format_row(frame));
            }
            if frames.len() > max_rows {
                tracing::info!("  ... {} more", frames.len() - max_rows);
            }
        }
    }

    Ok(())
}
