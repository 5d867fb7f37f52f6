#![deny(unsafe_code)]
//! CLI binary for the glyph field.
//!
//! Subcommands:
//! - `render`: drive the field with a scripted pointer and write a PNG
//! - `list`: print glyphs, pointer scripts and default colors
//! - `params`: print the effective parameters and their schema

mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use glyph_field_core::{FieldConfig, Simulation, Srgb, Viewport, GLYPHS};
use glyph_field_headless::{PointerScript, RasterSurface};
use log::info;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "glyph-field", about = "Pointer-reactive glyph particle field")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the field headlessly under a pointer script and write a PNG of the last frame.
    Render {
        /// Surface width in CSS pixels.
        #[arg(short = 'W', long, default_value_t = 800.0)]
        width: f64,

        /// Surface height in CSS pixels.
        #[arg(short = 'H', long, default_value_t = 600.0)]
        height: f64,

        /// Device pixel ratio of the backing store.
        #[arg(long, default_value_t = 1.0)]
        dpr: f64,

        /// Number of frames to simulate.
        #[arg(short, long, default_value_t = 180)]
        frames: usize,

        /// Simulated frame rate.
        #[arg(long, default_value_t = 60.0)]
        fps: f64,

        /// PRNG seed for deterministic output.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Pointer script (orbit, sweep, idle, none).
        #[arg(short, long, default_value = "orbit")]
        script: String,

        /// Opaque background color as #rrggbb; transparent when omitted.
        #[arg(short, long)]
        background: Option<String>,

        /// Output file path.
        #[arg(short, long, default_value = "glyph-field.png")]
        output: PathBuf,

        /// Field parameters as a JSON string.
        #[arg(long, default_value = "{}")]
        params: String,
    },
    /// List glyphs, pointer scripts and default colors.
    List,
    /// Print the effective parameters and the parameter schema.
    Params {
        /// Field parameters as a JSON string.
        #[arg(long, default_value = "{}")]
        params: String,
    },
}

fn parse_config(params: &str) -> Result<FieldConfig, CliError> {
    let params: serde_json::Value = serde_json::from_str(params)
        .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
    Ok(FieldConfig::from_json(&params)?)
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let scripts = PointerScript::list_scripts();
            let colors: Vec<String> = FieldConfig::default()
                .colors
                .colors()
                .iter()
                .map(|c| c.to_hex())
                .collect();
            if cli.json {
                let info = serde_json::json!({
                    "glyphs": GLYPHS,
                    "scripts": scripts,
                    "colors": colors,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Glyphs:");
                println!("  {}", GLYPHS.join(" "));
                println!("Scripts:");
                for name in scripts {
                    println!("  {name}");
                }
                println!("Default colors:");
                println!("  {}", colors.join(", "));
            }
        }
        Command::Params { params } => {
            let config = parse_config(&params)?;
            let info = serde_json::json!({
                "params": config.params(),
                "schema": FieldConfig::param_schema(),
            });
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&info["params"])?);
            }
        }
        Command::Render {
            width,
            height,
            dpr,
            frames,
            fps,
            seed,
            script,
            background,
            output,
            params,
        } => {
            let config = parse_config(&params)?;
            let script = PointerScript::from_name(&script)?;
            let viewport = Viewport::new(width, height, dpr)?;
            let background = background
                .map(|hex| Srgb::from_hex(&hex).map_err(|e| CliError::Input(e.to_string())))
                .transpose()?;

            let mut sim = Simulation::new(config, viewport, seed)?;
            let mut surface = RasterSurface::new(viewport)?;
            if let Some(color) = background {
                surface = surface.with_background(color);
            }

            let summary = glyph_field_headless::run(&mut sim, script, frames, fps, &mut surface)?;
            glyph_field_headless::snapshot::write_png(&surface, &output)?;
            info!("wrote {}", output.display());

            if cli.json {
                let info = serde_json::json!({
                    "script": script.name(),
                    "width": width,
                    "height": height,
                    "dpr": dpr,
                    "seed": seed,
                    "summary": summary,
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {} ({width}x{height} @{dpr}x, {frames} frames, seed {seed}): \
                     {} alive, {} spawned, {} dropped -> {}",
                    script.name(),
                    summary.final_alive,
                    summary.spawned,
                    summary.dropped,
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let default_filter = match (verbose, quiet) {
        (_, true) => "error",
        (0, _) => "warn",
        (1, _) => "info",
        (2, _) => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn render_defaults() {
        let cli = Cli::try_parse_from(["glyph-field", "render"]).unwrap();
        match cli.command {
            Command::Render {
                width,
                frames,
                script,
                background,
                ..
            } => {
                assert_eq!(width, 800.0);
                assert_eq!(frames, 180);
                assert_eq!(script, "orbit");
                assert!(background.is_none());
            }
            _ => panic!("expected render"),
        }
    }

    #[test]
    fn verbosity_counts_and_conflicts_with_quiet() {
        let cli = Cli::try_parse_from(["glyph-field", "-vv", "list"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(Cli::try_parse_from(["glyph-field", "-v", "-q", "list"]).is_err());
    }

    #[test]
    fn parse_config_applies_overrides() {
        let config = parse_config(r#"{"capacity": 50, "max_opacity": 0.5}"#).unwrap();
        assert_eq!(config.capacity, 50);
        assert_eq!(config.max_opacity, 0.5);
    }

    #[test]
    fn parse_config_bad_json_is_input_error() {
        let err = parse_config("{nope").err().unwrap();
        assert_eq!(err.exit_code(), 12);
    }

    #[test]
    fn parse_config_out_of_range_is_field_error() {
        let err = parse_config(r#"{"damping": 1.5}"#).err().unwrap();
        assert_eq!(err.exit_code(), 10);
    }

    #[test]
    fn render_unknown_script_fails_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.png");
        let cli = Cli::try_parse_from([
            "glyph-field",
            "render",
            "--script",
            "wander",
            "--output",
            output.to_str().unwrap(),
        ])
        .unwrap();
        let err = run(cli).err().unwrap();
        assert_eq!(err.exit_code(), 10);
        assert!(!output.exists());
    }

    #[test]
    fn render_oversized_surface_is_field_error() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("huge.png");
        let cli = Cli::try_parse_from([
            "glyph-field",
            "render",
            "-W",
            "1e10",
            "-H",
            "1e10",
            "--frames",
            "1",
            "--output",
            output.to_str().unwrap(),
        ])
        .unwrap();
        let err = run(cli).err().unwrap();
        assert_eq!(err.exit_code(), 10);
        assert!(!output.exists());
    }
}
