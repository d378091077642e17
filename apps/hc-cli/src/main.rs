use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use chrono::Weekday;
use hc_app::{
    AppError, AppResult, ArchetypeParams, BuildingShape, BuildingType, CompileOptions,
    CompileOutput, Diagnostic, SystemArchetype, config_service,
};
use hc_core::TimeOfDay;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "hc")]
#[command(about = "HVAC configuration compiler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a config file through every compiler stage
    Validate {
        /// Path to the config file (.yaml, .yml or .json)
        config_path: PathBuf,
    },
    /// Compile a config file into a model
    Compile {
        /// Path to the config file (.yaml, .yml or .json)
        config_path: PathBuf,
        /// Output JSON file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Generate a config file for a system archetype
    Archetype {
        /// System01, System05 or System07
        system: SystemArchetype,
        /// Occupied weekday start hour
        #[arg(long, default_value_t = 6)]
        start_hour: u8,
        /// Occupied weekday end hour
        #[arg(long, default_value_t = 18)]
        end_hour: u8,
        /// Keep the weekday pattern on weekends
        #[arg(long)]
        weekend_occupancy: bool,
        /// Enable demand-controlled ventilation
        #[arg(long)]
        dcv: bool,
        /// Office, Retail, School, Hospital, Hotel, Restaurant, Warehouse or Apartment
        #[arg(long, default_value = "Office")]
        building_type: BuildingType,
        /// Total floor area in m²
        #[arg(long, default_value_t = 10000.0)]
        area: f64,
        /// Number of floors
        #[arg(long, default_value_t = 10)]
        floors: u32,
        /// Footprint shape: Rectangle, L, H, T or U
        #[arg(long, default_value = "Rectangle")]
        shape: BuildingShape,
        /// Window-to-wall ratio
        #[arg(long, default_value_t = 0.33)]
        wwr: f64,
        /// Output file path, .yaml or .json (optional, defaults to YAML on stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Query a compiled schedule
    Schedule {
        /// Path to the config file
        config_path: PathBuf,
        /// Schedule key
        schedule: String,
        /// Weekday (e.g., Mon, Saturday)
        weekday: Weekday,
        /// Time of day, HH:MM
        time: TimeOfDay,
    },
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Compile {
            config_path,
            output,
        } => cmd_compile(&config_path, output.as_deref()),
        Commands::Archetype {
            system,
            start_hour,
            end_hour,
            weekend_occupancy,
            dcv,
            building_type,
            area,
            floors,
            shape,
            wwr,
            output,
        } => {
            let params = ArchetypeParams {
                weekday_start_hour: start_hour,
                weekday_end_hour: end_hour,
                has_weekend_occupancy: weekend_occupancy,
                has_dcv: dcv,
                building_type,
                building_area: area,
                number_of_floors: floors,
                building_shape: shape,
                window_to_wall_ratio: wwr,
                ..Default::default()
            };
            cmd_archetype(system, &params, output.as_deref())
        }
        Commands::Schedule {
            config_path,
            schedule,
            weekday,
            time,
        } => cmd_schedule(&config_path, &schedule, weekday, time),
    }
}

/// Compile, printing every diagnostic of a failed stage before returning the error.
fn compile_reporting(config_path: &Path) -> AppResult<CompileOutput> {
    info!(path = %config_path.display(), "compiling config");
    match config_service::compile_file(config_path, &CompileOptions::default()) {
        Ok(output) => {
            print_diagnostics(&output.warnings);
            Ok(output)
        }
        Err(AppError::Compile(err)) => {
            print_diagnostics(&err.diagnostics().into_vec());
            Err(AppError::Compile(err))
        }
        Err(err) => Err(err),
    }
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        match &diagnostic.field {
            Some(field) => eprintln!("  {} [{} / {}]", diagnostic, diagnostic.entity, field),
            None => eprintln!("  {} [{}]", diagnostic, diagnostic.entity),
        }
    }
}

fn cmd_validate(config_path: &Path) -> AppResult<()> {
    println!("Validating config: {}", config_path.display());
    let output = compile_reporting(config_path)?;
    let summary = config_service::summarize(&output.model);

    println!("✓ Config is valid");
    println!("  Systems: {}", summary.system_count);
    println!(
        "  Components: {} (+{} sub-components)",
        summary.component_count, summary.sub_component_count
    );
    for lp in &summary.loops {
        println!(
            "  Loop {} ({}): {} components",
            lp.name, lp.kind, lp.component_count
        );
    }
    println!("  Schedules: {}", summary.schedule_count);
    println!("  Fingerprint: {}", summary.fingerprint);
    Ok(())
}

fn cmd_compile(config_path: &Path, output: Option<&Path>) -> AppResult<()> {
    let compiled = compile_reporting(config_path)?;

    match output {
        Some(path) => {
            config_service::save_config(path, &compiled.model)?;
            println!("✓ Model written to {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&compiled.model)?),
    }
    Ok(())
}

fn cmd_archetype(
    system: SystemArchetype,
    params: &ArchetypeParams,
    output: Option<&Path>,
) -> AppResult<()> {
    debug!(%system, building_type = %params.building_type, "generating archetype");
    let config = hc_app::generate_config(system, params)?;

    match output {
        Some(path) => {
            config_service::save_config(path, &config)?;
            println!("✓ {} config written to {}", system, path.display());
        }
        None => print!("{}", config_service::to_yaml_string(&config)?),
    }
    Ok(())
}

fn cmd_schedule(
    config_path: &Path,
    schedule: &str,
    weekday: Weekday,
    time: TimeOfDay,
) -> AppResult<()> {
    let compiled = compile_reporting(config_path)?;
    let value = config_service::query_schedule(&compiled.model, schedule, weekday, time)?;
    println!("{} {} {}: {}", schedule, weekday, time, value);
    Ok(())
}
