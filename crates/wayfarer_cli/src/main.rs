use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use wayfarer_core::core_api::{BuildRequest, CoreError, CoreErrorCode, Engine};
use wayfarer_core::format::Format;
use wayfarer_core::profile::{Profile, ProfileStore};
use wayfarer_core::region::{OnboardingConfig, RegionOverride, Teleport, World};
use wayfarer_core::templates;
use wayfarer_render::{
    JsonStyle, TextRenderOptions, error_to_json, render_build_json, render_build_text,
    render_import_json, render_import_text, render_regions_json, render_regions_text,
    render_validation_json, render_validation_text,
};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[arg(
        long = "profile-dir",
        value_name = "DIR",
        env = "WAYFARER_PROFILE_DIR",
        global = true
    )]
    profile_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a server profile, or update its name and onboarding.
    Init {
        server_id: String,
        #[arg(long)]
        name: String,
        #[arg(long = "start-region")]
        start_region: Option<String>,
        #[arg(long, value_name = "WORLD", value_parser = parse_world)]
        world: Option<World>,
        #[arg(long, allow_hyphen_values = true)]
        x: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        y: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        z: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        yaw: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        pitch: Option<f64>,
    },
    /// Classify a WorldGuard regions.yml into one world of a profile.
    Import {
        server_id: String,
        #[arg(value_name = "REGIONS.YML")]
        path: PathBuf,
        #[arg(long, value_name = "WORLD", value_parser = parse_world)]
        world: World,
        #[arg(long)]
        label: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// List the classified regions of a profile.
    Regions {
        server_id: String,
        #[arg(long)]
        json: bool,
    },
    /// Set or clear operator overrides on one region. An empty value clears.
    Override {
        server_id: String,
        #[arg(value_name = "WORLD", value_parser = parse_world)]
        world: World,
        region_id: String,
        #[arg(long = "command-id")]
        command_id: Option<String>,
        #[arg(long = "display-name")]
        display_name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        difficulty: Option<String>,
    },
    /// Generate, merge and validate target documents, writing those that pass.
    Build {
        server_id: String,
        #[arg(long, value_name = "DIR")]
        out: PathBuf,
        #[arg(long = "format", value_name = "FORMAT", value_parser = parse_format)]
        formats: Vec<Format>,
        #[arg(long = "base", value_name = "FORMAT=PATH", value_parser = parse_base_override)]
        bases: Vec<(Format, PathBuf)>,
        #[arg(long, value_name = "DIR")]
        defaults: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Run the diff gate on a base document and a candidate rewrite.
    Validate {
        #[arg(long, value_name = "FORMAT", value_parser = parse_format)]
        format: Format,
        #[arg(value_name = "BASE.YML")]
        base: PathBuf,
        #[arg(value_name = "CANDIDATE.YML")]
        candidate: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Export the bundled base documents.
    Templates {
        #[arg(long, value_name = "DIR")]
        out: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let store = ProfileStore::new(
        cli.profile_dir
            .clone()
            .unwrap_or_else(ProfileStore::default_root),
    );
    let engine = Engine::new();

    let text_options = TextRenderOptions {
        verbose: cli.verbose > 0,
    };

    let code = match run(&engine, &store, text_options, cli.command) {
        Ok(code) => code,
        Err(e) => {
            report_error(&e);
            exit_code_for(&e)
        }
    };
    process::exit(code);
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(
    engine: &Engine,
    store: &ProfileStore,
    text_options: TextRenderOptions,
    command: Command,
) -> Result<i32, CoreError> {
    match command {
        Command::Init {
            server_id,
            name,
            start_region,
            world,
            x,
            y,
            z,
            yaw,
            pitch,
        } => {
            let mut profile = if store.exists(&server_id) {
                store.load(&server_id)?
            } else {
                Profile::new(server_id.as_str(), name.as_str())
            };
            profile.server_name = name;
            profile.onboarding = onboarding_from_args(
                &profile.onboarding,
                start_region,
                world,
                [x, y, z, yaw, pitch],
            );
            let path = store.save(&profile)?;
            println!("Saved profile {} to {}", profile.server_id, path.display());
            Ok(0)
        }
        Command::Import {
            server_id,
            path,
            world,
            label,
            json,
        } => {
            let mut profile = store.load(&server_id)?;
            let bytes = fs::read(&path).map_err(|e| CoreError::io(&path, &e))?;
            let summary = engine.import_regions(
                &mut profile,
                world,
                label.as_deref(),
                &display_file_name(&path),
                &bytes,
            )?;
            store.save(&profile)?;
            if json {
                print_json(&render_import_json(&summary, JsonStyle::CanonicalV1));
            } else {
                print!("{}", render_import_text(&summary));
            }
            Ok(0)
        }
        Command::Regions { server_id, json } => {
            let profile = store.load(&server_id)?;
            if json {
                print_json(&render_regions_json(&profile, JsonStyle::CanonicalV1));
            } else {
                print!("{}", render_regions_text(&profile));
            }
            Ok(0)
        }
        Command::Override {
            server_id,
            world,
            region_id,
            command_id,
            display_name,
            description,
            difficulty,
        } => {
            let mut profile = store.load(&server_id)?;
            let edit = RegionOverride {
                command_id,
                display_name,
                description,
            };
            engine.override_region(
                &mut profile,
                world,
                &region_id,
                &edit,
                difficulty.as_deref(),
            )?;
            store.save(&profile)?;
            println!("Updated {world}/{region_id}");
            Ok(0)
        }
        Command::Build {
            server_id,
            out,
            formats,
            bases,
            defaults,
            json,
        } => {
            let profile = store.load(&server_id)?;
            let mut request = BuildRequest::new(out);
            request.formats = formats;
            request.defaults_dir = defaults;
            request.overrides = bases.into_iter().collect();

            let report = engine.build(&profile, &request);
            if json {
                print_json(&render_build_json(&report, JsonStyle::CanonicalV1));
            } else {
                print!("{}", render_build_text(&report, text_options));
            }
            Ok(if report.is_success() { 0 } else { 1 })
        }
        Command::Validate {
            format,
            base,
            candidate,
            json,
        } => {
            let report = engine.validate_file(format, &base, &candidate)?;
            if json {
                print_json(&render_validation_json(&report, JsonStyle::CanonicalV1));
            } else {
                print!("{}", render_validation_text(&report));
            }
            Ok(if report.valid { 0 } else { 1 })
        }
        Command::Templates { out } => {
            for path in templates::export_all(&out)? {
                println!("{}", path.display());
            }
            Ok(0)
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn onboarding_from_args(
    current: &OnboardingConfig,
    start_region: Option<String>,
    world: Option<World>,
    coords: [Option<f64>; 5],
) -> OnboardingConfig {
    let mut next = current.clone();
    if let Some(id) = start_region {
        next.start_region_id = id;
    }
    let [x, y, z, yaw, pitch] = coords;
    let current_tp = &current.teleport;
    next.teleport = Teleport {
        world: world.unwrap_or(current_tp.world),
        x: x.unwrap_or(current_tp.x),
        y: y.or(current_tp.y),
        z: z.unwrap_or(current_tp.z),
        yaw: yaw.or(current_tp.yaw),
        pitch: pitch.or(current_tp.pitch),
    };
    next
}

fn display_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("Error encoding JSON output: {e}");
            process::exit(1);
        }
    }
}

fn report_error(error: &CoreError) {
    eprintln!("error: {}", error.message);
    for difference in &error.differences {
        eprintln!("  {}", difference.path);
    }
    tracing::debug!(error = %error_to_json(error), "command failed");
}

fn exit_code_for(error: &CoreError) -> i32 {
    match error.code {
        CoreErrorCode::InvalidInput => 2,
        _ => 1,
    }
}

fn parse_world(value: &str) -> Result<World, String> {
    value.parse::<World>().map_err(|e| e.message)
}

fn parse_format(value: &str) -> Result<Format, String> {
    value.parse::<Format>().map_err(|e| e.message)
}

fn parse_base_override(value: &str) -> Result<(Format, PathBuf), String> {
    let Some((format, path)) = value.split_once('=') else {
        return Err(format!(
            "invalid base override '{value}', expected FORMAT=PATH"
        ));
    };
    if path.trim().is_empty() {
        return Err(format!("base override '{value}' has an empty path"));
    }
    Ok((parse_format(format)?, PathBuf::from(path)))
}
