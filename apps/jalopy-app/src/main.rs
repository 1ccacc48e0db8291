//! Jalopy vehicle simulation CLI.
//!
//! Provides three modes of operation:
//! - `drive`: Run a scripted drive headlessly and print telemetry
//! - `check`: Load a vehicle spec TOML and report whether it validates
//! - `info`: Print workspace crate versions and configuration

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bevy::prelude::*;
use clap::{Parser, Subcommand};

use jalopy_core::prelude::*;
use jalopy_physics::context::PhysicsContext;
use jalopy_sim::SceneBuilder;
use jalopy_spec::{presets, VehicleSpec};
use jalopy_vehicle::components::{DriverControls, Vehicle, WheelState};
use jalopy_vehicle::damage::VehicleDamage;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Jalopy drivable vehicle simulation.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted drive headlessly and print telemetry.
    Drive {
        /// Vehicle spec TOML; the built-in hatchback when omitted.
        #[arg(short, long)]
        spec: Option<PathBuf>,

        /// Simulation config TOML.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of simulation steps.
        #[arg(short = 'n', long, default_value_t = 600)]
        steps: u32,

        /// Throttle in [-1, 1].
        #[arg(short, long, default_value_t = 1.0)]
        throttle: f32,

        /// Steering in [-1, 1]; positive steers left.
        #[arg(long, default_value_t = 0.0)]
        steering: f32,

        /// Flood the world with a water plane at this height.
        #[arg(short, long)]
        water_level: Option<f32>,
    },

    /// Load a vehicle spec TOML and report whether it validates.
    Check {
        /// Vehicle spec TOML file.
        spec: PathBuf,
    },

    /// Print crate information.
    Info,
}

// ---------------------------------------------------------------------------
// Mode implementations
// ---------------------------------------------------------------------------

fn run_drive(
    spec_path: Option<&Path>,
    config_path: Option<&Path>,
    steps: u32,
    throttle: f32,
    steering: f32,
    water_level: Option<f32>,
) -> Result<(), JalopyError> {
    let spec = match spec_path {
        Some(path) => VehicleSpec::from_file(path)?,
        None => presets::hatchback(),
    };
    let config = match config_path {
        Some(path) => SimConfig::from_file(path)?,
        None => SimConfig::default(),
    };
    let name = spec.name.clone();

    // Spawn with every spring at its rest length; the car settles from
    // there under its own weight.
    let lowest_mount = spec
        .wheels
        .iter()
        .map(|w| w.offset[1])
        .fold(f32::INFINITY, f32::min);
    let spawn = Vec3::new(
        0.0,
        spec.handling.suspension.wheel_radius - lowest_mount,
        0.0,
    );

    let mut builder = SceneBuilder::new()
        .with_sim_config(config)
        .with_ground_plane();
    if let Some(level) = water_level {
        builder = builder.with_water_level(level);
    }
    let scene = builder.with_vehicle(Arc::new(spec), spawn)?.build();

    let mut app = scene.app;
    let Some(&car) = scene.vehicles.first() else {
        return Err(VehicleError::ChassisMissing.into());
    };

    if let Some(mut controls) = app.world_mut().get_mut::<DriverControls>(car) {
        controls.set_throttle(throttle.clamp(-1.0, 1.0));
        controls.set_steering(steering.clamp(-1.0, 1.0));
    }

    println!("driving '{name}' for {steps} steps (throttle={throttle}, steering={steering})");
    for step in 1..=steps {
        app.update();
        if step % 60 == 0 || step == steps {
            print_telemetry(&app, car);
        }
    }
    Ok(())
}

fn print_telemetry(app: &App, car: Entity) {
    let world = app.world();
    let Some(vehicle) = world.get::<Vehicle>(car) else {
        return;
    };
    let ctx = world.resource::<PhysicsContext>();
    let Some(body) = ctx.body(vehicle.chassis()) else {
        return;
    };
    let time = world.resource::<SimTime>();
    let pos = body.translation();
    let speed = body.linvel().norm();
    let grounded = world
        .get::<WheelState>(car)
        .map_or(0, WheelState::grounded_count);
    let wheels = vehicle.spec().wheels.len();
    let health = world.get::<VehicleDamage>(car).map_or(0.0, VehicleDamage::health);
    println!(
        "t={:6.2}s  pos=({:7.2}, {:5.2}, {:8.2})  speed={:5.2} m/s  wheels={grounded}/{wheels}  health={health:.0}",
        time.secs_f32(),
        pos.x,
        pos.y,
        pos.z,
        speed
    );
}

fn run_check(path: &Path) -> Result<(), JalopyError> {
    let spec = VehicleSpec::from_file(path)?;
    let driven = spec.wheels.iter().filter(|w| w.driven).count();
    let steerable = spec.wheels.iter().filter(|w| w.steerable).count();
    let detachable = spec.panels.iter().filter(|p| p.kind.detachable()).count();

    println!("{}: ok", path.display());
    println!("  name    {}", spec.name);
    println!("  mass    {} kg", spec.handling.mass);
    println!("  seats   {}", spec.seat_count());
    println!(
        "  wheels  {} ({driven} driven, {steerable} steerable)",
        spec.wheels.len()
    );
    println!(
        "  panels  {} ({detachable} detachable)",
        spec.panel_count()
    );
    Ok(())
}

fn run_info() {
    println!("jalopy v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("crates:");
    println!("  jalopy-core    {}", env!("CARGO_PKG_VERSION"));
    println!("  jalopy-spec    {}", env!("CARGO_PKG_VERSION"));
    println!("  jalopy-physics {}", env!("CARGO_PKG_VERSION"));
    println!("  jalopy-vehicle {}", env!("CARGO_PKG_VERSION"));
    println!("  jalopy-sim     {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("edition: 2024");
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Drive {
            spec,
            config,
            steps,
            throttle,
            steering,
            water_level,
        }) => run_drive(
            spec.as_deref(),
            config.as_deref(),
            steps,
            throttle,
            steering,
            water_level,
        ),
        Some(Commands::Check { spec }) => run_check(&spec),
        Some(Commands::Info) => {
            run_info();
            Ok(())
        }
        None => run_drive(None, None, 600, 1.0, 0.0, None),
    };

    if let Err(err) = result {
        eprintln!("jalopy: {err}");
        std::process::exit(1);
    }
}
