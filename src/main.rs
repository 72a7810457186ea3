//! Command-line entry points for the two experiment variants.

use std::path::Path;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::SeedableRng;
use rand_pcg::Pcg32;

use pencil_polarizer::physics::RigidWorld;
use pencil_polarizer::sim::{
    find_spacing, run_trial, ConsoleDisplay, PassRateMonitor, PolarizerSpec, SearchOutcome,
};
use pencil_polarizer::Settings;

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("drop");

    let settings = match args.get(2) {
        Some(path) => match Settings::load(Path::new(path)) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("failed to load settings from {path}: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => Settings::default(),
    };

    match command {
        "drop" => run_drop(&settings),
        "calibrate" => run_calibrate(&settings),
        "help" | "--help" | "-h" => {
            print_help();
            ExitCode::SUCCESS
        }
        other => {
            eprintln!("unknown command: {other}");
            print_help();
            ExitCode::FAILURE
        }
    }
}

fn seeded_rng(settings: &Settings) -> Pcg32 {
    let seed = settings.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    });
    log::info!("rng seed: {seed}");
    Pcg32::seed_from_u64(seed)
}

/// Variant 1: drop a batch through the configured grid with a live pass-rate
/// readout, then report the final tally.
fn run_drop(settings: &Settings) -> ExitCode {
    let mut world = RigidWorld::new(settings.gravity);
    let mut rng = seeded_rng(settings);
    let mut monitor = PassRateMonitor::new(ConsoleDisplay);

    let result = run_trial(
        &mut world,
        &settings.polarizer(),
        &settings.trial(),
        &mut rng,
        &mut monitor,
    );
    match result {
        Ok(batch) => {
            println!(
                "\nTotal pencils that passed through: {}/{}",
                batch.successful_passes, batch.total_classified
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("simulation failed: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Variant 2: search for the spacing that filters the batch down to the
/// target pass rate.
fn run_calibrate(settings: &Settings) -> ExitCode {
    let mut world = RigidWorld::new(settings.gravity);
    let mut rng = seeded_rng(settings);
    let polarizer = settings.polarizer();
    let trial = settings.calibration_trial();

    let outcome = find_spacing(
        |spacing| {
            let spec = PolarizerSpec { spacing, ..polarizer };
            run_trial(&mut world, &spec, &trial, &mut rng, &mut ()).map(|r| r.pass_rate())
        },
        &settings.search(),
    );
    match outcome {
        Ok(SearchOutcome::Converged {
            spacing,
            pass_rate,
            iterations,
        }) => {
            log::info!("converged after {iterations} bisection iterations");
            println!("Optimal spacing found: {spacing:.4} with pass rate {pass_rate:.2}%");
            ExitCode::SUCCESS
        }
        Ok(SearchOutcome::Exhausted {
            last_spacing,
            last_rate,
        }) => {
            eprintln!(
                "search budget exhausted at spacing {last_spacing:.4} (pass rate {last_rate:.2}%)"
            );
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("simulation failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn print_help() {
    println!("pencil-polarizer - stochastic pencil-drop filtering experiment");
    println!();
    println!("Usage: pencil-polarizer [COMMAND] [SETTINGS.json]");
    println!();
    println!("Commands:");
    println!("  drop       Drop a batch with a live pass-rate monitor (default)");
    println!("  calibrate  Search for the bar spacing that hits the target pass rate");
    println!("  help       Show this message");
    println!();
    println!("Settings default to the reference experiment; pass a JSON file to override.");
}
