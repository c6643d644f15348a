use std::path::PathBuf;

use acrylic_engine::{global, RawEffectOptions, RawHandle};
use clap::{Args, Parser, Subcommand};

mod actions;
mod config;
#[cfg(windows)]
mod demo;

use config::Config;

#[derive(Parser)]
#[command(name = "fancy-acrylic", about = "Apply blur and acrylic effects to windows")]
struct Cli {
    /// Effect profiles file (defaults to ./effects.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply an effect to a window
    Apply {
        /// Window handle, decimal or 0x-prefixed hex
        hwnd: String,
        #[command(flatten)]
        effect: EffectArgs,
    },
    /// Remove the effect from a window
    Clear {
        /// Window handle, decimal or 0x-prefixed hex
        hwnd: String,
    },
    /// Print whether window effects are supported
    Supported,
    /// Print the Windows build number (0 when not on Windows)
    Build,
    /// Show the detected capability tier
    Probe,
    /// Open a demo window with the effect applied
    #[cfg(windows)]
    Demo {
        #[command(flatten)]
        effect: EffectArgs,
    },
}

#[derive(Args)]
struct EffectArgs {
    /// Profile from the config file
    #[arg(long)]
    profile: Option<String>,
    /// Effect type: blur or acrylic
    #[arg(long = "type")]
    effect_type: Option<String>,
    /// Corner style: none, round or roundsmall
    #[arg(long)]
    corner: Option<String>,
    /// Opacity 0-255 (out-of-range values are clamped)
    #[arg(long, allow_negative_numbers = true)]
    opacity: Option<i64>,
    /// Tint color, RRGGBB
    #[arg(long)]
    tint: Option<String>,
    /// Border color, RRGGBB
    #[arg(long)]
    border_color: Option<String>,
    /// Whether the window border is drawn
    #[arg(long)]
    border_visible: Option<bool>,
}

impl EffectArgs {
    fn overrides(&self, hwnd: Option<RawHandle>) -> RawEffectOptions {
        RawEffectOptions {
            hwnd,
            effect_type: self.effect_type.clone(),
            corner: self.corner.clone(),
            opacity: self.opacity,
            tint_color: self.tint.clone(),
            border_color: self.border_color.clone(),
            border_visible: self.border_visible,
        }
    }

    fn resolve(&self, hwnd: Option<RawHandle>, config_path: Option<&PathBuf>) -> RawEffectOptions {
        let resolved = Config::load_or_default(config_path.map(PathBuf::as_path))
            .and_then(|config| actions::resolve_options(self.overrides(hwnd), self.profile.as_deref(), &config));
        match resolved {
            Ok(options) => options,
            Err(e) => {
                log::error!("Failed to load effect profile: {}", e);
                std::process::exit(actions::EXIT_CONFIG);
            }
        }
    }
}

fn main() {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Apply { hwnd, effect } => {
            let options = effect.resolve(Some(RawHandle::Text(hwnd)), cli.config.as_ref());
            actions::apply(global(), &options)
        }
        Commands::Clear { hwnd } => actions::clear(global(), &hwnd),
        Commands::Supported => {
            println!("{}", acrylic_engine::is_supported());
            actions::EXIT_OK
        }
        Commands::Build => {
            println!("{}", acrylic_engine::get_build_number());
            actions::EXIT_OK
        }
        Commands::Probe => {
            println!("{}", actions::probe_report(&acrylic_engine::detect()));
            actions::EXIT_OK
        }
        #[cfg(windows)]
        Commands::Demo { effect } => {
            let options = effect.resolve(None, cli.config.as_ref());
            match demo::run(options) {
                Ok(()) => actions::EXIT_OK,
                Err(e) => {
                    log::error!("Failed to open demo window: {}", e);
                    actions::EXIT_APPLY
                }
            }
        }
    };

    std::process::exit(code);
}
