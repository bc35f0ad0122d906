//! # Brickwise CLI Application
//!
//! Runs a wall material takeoff from a JSON job file.
//!
//! ```text
//! estimate_cli <job.json> [--settings <settings.json>]
//! ```
//!
//! The job file holds the inputs, the catalog snapshot and optionally a
//! supplied composition, stored perspectives and a finish preference. No
//! external composition detector is configured here, so composition comes
//! from the job file or the room metadata.
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use estimate_core::calculations::CalculationInputs;
use estimate_core::composition::WallComposition;
use estimate_core::errors::{CalcResult, EstimateError};
use estimate_core::materials::{FinishType, Material, MaterialRole};
use estimate_core::perspective::Perspective;
use estimate_core::selection::Provenance;
use estimate_core::settings::{load_settings, EstimateSettings};
use estimate_core::{Estimate, EstimateSession};

/// Contents of a job file
#[derive(Debug, Deserialize)]
struct Job {
    #[serde(default)]
    inputs: CalculationInputs,
    #[serde(default)]
    catalog: Vec<Material>,
    #[serde(default)]
    composition: Option<WallComposition>,
    #[serde(default)]
    perspectives: Vec<Perspective>,
    #[serde(default)]
    finish: Option<FinishType>,
}

struct Args {
    job: PathBuf,
    settings: Option<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let mut job = None;
    let mut settings = None;
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--settings" => {
                let path = args.next().ok_or("--settings needs a path")?;
                settings = Some(PathBuf::from(path));
            }
            "-h" | "--help" => return Err(usage()),
            _ if job.is_none() => job = Some(PathBuf::from(arg)),
            other => return Err(format!("unexpected argument '{}'\n{}", other, usage())),
        }
    }

    Ok(Args {
        job: job.ok_or_else(usage)?,
        settings,
    })
}

fn usage() -> String {
    "Usage: estimate_cli <job.json> [--settings <settings.json>]".to_string()
}

fn load_job(path: &Path) -> CalcResult<Job> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| EstimateError::file_error("read", path.display().to_string(), e.to_string()))?;
    serde_json::from_str(&contents).map_err(|e| EstimateError::SerializationError {
        reason: format!("Invalid job file {}: {}", path.display(), e),
    })
}

async fn run(args: &Args) -> CalcResult<(EstimateSession, Estimate)> {
    let settings = match &args.settings {
        Some(path) => load_settings(path)?,
        None => EstimateSettings::default(),
    };
    let job = load_job(&args.job)?;
    info!(job = %args.job.display(), materials = job.catalog.len(), "loaded job");

    let mut session = EstimateSession::new(job.inputs).with_settings(settings);
    session.update_catalog(job.catalog).await;
    session.resolve_composition(job.composition).await?;

    if let Some(first) = job.perspectives.first().map(|p| p.id.clone()) {
        session.set_perspectives(job.perspectives);
        session.apply_perspective(&first)?;
    }
    if job.finish.is_some() {
        session.set_finish(job.finish);
    }

    let estimate = session.estimate();
    Ok((session, estimate))
}

fn provenance_label(provenance: Provenance) -> &'static str {
    match provenance {
        Provenance::Unset => "-",
        Provenance::Manual => "manual",
        Provenance::Ai => "ai",
    }
}

fn print_takeoff(session: &EstimateSession, estimate: &Estimate) {
    let inputs = session.inputs();
    let composition = session.composition();
    let q = &estimate.quantities;
    let c = &estimate.costs;

    println!("═══════════════════════════════════════");
    println!("  WALL MATERIAL TAKEOFF");
    println!("═══════════════════════════════════════");
    println!();
    println!("Input:");
    println!("  Tier:        {}", inputs.tier);
    println!("  Area:        {:.0} sq ft ({} rooms)", inputs.total_area_sqft, inputs.rooms.len());
    println!("  Height:      {:.1} ft", inputs.height_ft);
    println!("  Thickness:   {:.1}\" load-bearing, {:.1}\" partition",
        inputs.wall_thickness_in,
        inputs.partition_wall_thickness_in
    );
    println!("  Openings:    {:.1}%", inputs.opening_deduction_percent);
    println!("  Composition: {:.0}% / {:.0}% ({:?})",
        composition.main_ratio * 100.0,
        composition.partition_ratio * 100.0,
        composition.source
    );
    if let Some(finish) = session.finish() {
        println!("  Finish:      {:?}", finish);
    }
    println!();
    println!("Selection:");
    for role in MaterialRole::ALL {
        let name = session
            .selected_material(role)
            .map(|m| m.name.as_str())
            .unwrap_or("(none)");
        println!("  {:<18} {} [{}]",
            role.display_name(),
            name,
            provenance_label(session.selection().provenance(role))
        );
    }
    println!();
    println!("Quantities:");
    println!("  Running length: {:.0} ft", q.running_length_ft);
    println!("  Load-bearing:   {} units over {:.0} sq ft", q.load_bearing_qty, q.load_bearing_area_sqft);
    println!("  Partition:      {} units over {:.0} sq ft", q.partition_qty, q.partition_area_sqft);
    if q.unallocated_area_sqft > 0.0 {
        println!("  Unallocated:    {:.0} sq ft", q.unallocated_area_sqft);
    }
    println!("  Mortar:         {:.3} m3", q.mortar_volume_m3);
    println!("  Cement:         {} bags", q.cement_qty);
    println!("  Sand:           {} kg", q.sand_qty);
    println!();
    println!("Cost:");
    println!("  Load-bearing: {:>10}", c.load_bearing);
    println!("  Partition:    {:>10}", c.partition);
    println!("  Cement:       {:>10}", c.cement);
    println!("  Sand:         {:>10}", c.sand);
    println!("  Total:        {:>10}", c.total);
    println!();
    println!("Budget Checks:");
    for (role, check) in [
        (MaterialRole::LoadBearing, estimate.budget.load_bearing),
        (MaterialRole::Partition, estimate.budget.partition),
    ] {
        if check.violated {
            println!("  {:<18} [OVER] by {:.3} per unit", role.display_name(), check.difference as f64 / 1000.0);
        } else {
            println!("  {:<18} [OK]", role.display_name());
        }
    }

    let missing = session.missing_materials();
    if !missing.is_empty() {
        println!();
        println!("Warnings:");
        for notice in &missing {
            println!("  [WARN] {}", notice);
        }
    }
    println!("═══════════════════════════════════════");
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::from(2);
        }
    };

    match run(&args).await {
        Ok((session, estimate)) => {
            print_takeoff(&session, &estimate);

            println!();
            println!("JSON Output (for LLM/API use):");
            if let Ok(json) = serde_json::to_string_pretty(&estimate) {
                println!("{}", json);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}
