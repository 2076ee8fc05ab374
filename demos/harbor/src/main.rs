//! harbor — five boats encircle a slowly drifting target.
//!
//! Usage: `cargo run -p harbor [-- path/to/fleet.toml] [--output-dir DIR]`
//!
//! Without a config every setting takes its default; a TOML file only
//! needs the keys it overrides.  Set `RUST_LOG=debug` to see every plan
//! request.  The trace lands in `output/harbor/` unless redirected.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use fleet_core::{Destination, FleetConfig, PlanId, SimRng, Tick, Vec2};
use fleet_motion::{Boat, MotionState, ReplanReason, Target};
use fleet_output::{CsvWriter, OutputWriter, TraceObserver};
use fleet_sim::{SimBuilder, SimObserver, TickSummary, load_fleet_reader};

// ── Constants ─────────────────────────────────────────────────────────────────

const OUTPUT_DIR: &str = "output/harbor";
/// Offset of the jitter stream derived from the run seed.
const JITTER_STREAM: u64 = 1;
/// Start positions are perturbed by up to this much on each axis.
const JITTER: f64 = 15.0;
const TARGET_AT: (f64, f64) = (850.0, 420.0);
/// World units per tick.
const TARGET_DRIFT: (f64, f64) = (-0.04, 0.015);

// ── Args ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "harbor")]
#[command(about = "Five boats encircle a slowly drifting target")]
struct Args {
    /// TOML config; every setting takes its default when omitted
    config: Option<PathBuf>,

    /// Directory receiving boat_snapshots.csv and tick_summaries.csv
    #[arg(long, default_value = OUTPUT_DIR)]
    output_dir: PathBuf,
}

// ── Fleet CSV ─────────────────────────────────────────────────────────────────

const FLEET_CSV: &str = "\
agent_id,x,y,base_speed\n\
0,120.0,400.0,2.0\n\
1,150.0,520.0,2.0\n\
2,150.0,280.0,2.0\n\
3,60.0,460.0,1.8\n\
4,60.0,340.0,1.8\n\
";

// ── Observer wrapper to count rows and plans ──────────────────────────────────

struct CountingObserver<W: OutputWriter> {
    inner:         TraceObserver<W>,
    snapshot_rows: usize,
    summary_rows:  usize,
    plans:         usize,
    first_docked:  Option<Tick>,
    all_docked:    Option<Tick>,
}

impl<W: OutputWriter> CountingObserver<W> {
    fn new(inner: TraceObserver<W>) -> Self {
        Self { inner, snapshot_rows: 0, summary_rows: 0, plans: 0, first_docked: None, all_docked: None }
    }
}

impl<W: OutputWriter> SimObserver for CountingObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, summary: &TickSummary) {
        self.summary_rows += 1;
        if summary.docked > 0 {
            self.first_docked.get_or_insert(tick);
        }
        if summary.all_docked() {
            self.all_docked.get_or_insert(tick);
        }
        self.inner.on_tick_end(tick, summary);
    }

    fn on_snapshot(&mut self, tick: Tick, boats: &[Boat], target: &Target) {
        self.snapshot_rows += boats.len();
        self.inner.on_snapshot(tick, boats, target);
    }

    fn on_plan_requested(&mut self, _tick: Tick, _id: PlanId, _reason: ReplanReason) {
        self.plans += 1;
    }

    fn on_plan_failed(&mut self, tick: Tick, id: PlanId, failure: &fleet_sim::PlanFailure) {
        self.inner.on_plan_failed(tick, id, failure);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.inner.on_sim_end(final_tick);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn load_config(path: Option<&Path>) -> Result<FleetConfig> {
    let Some(path) = path else {
        return Ok(FleetConfig::default());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config: FleetConfig = toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    println!("=== harbor — fleet convergence ===");
    println!(
        "Ticks: {}  |  Rate: {} Hz  |  Seed: {}",
        config.sim.total_ticks, config.sim.tick_rate_hz, config.sim.seed
    );
    println!();

    // 1. Fleet from the embedded CSV, with seeded jitter.
    let mut boats = load_fleet_reader(Cursor::new(FLEET_CSV), &config)?;
    let mut rng = SimRng::new(config.sim.seed).child(JITTER_STREAM);
    for boat in &mut boats {
        boat.pos += rng.jitter(JITTER);
    }
    println!("Fleet: {} boats", boats.len());

    // 2. Drifting target.
    let target = Target::new(Destination::new(TARGET_AT.0, TARGET_AT.1)?, &config.target)
        .with_drift(Vec2::new(TARGET_DRIFT.0, TARGET_DRIFT.1));

    // 3. Build and start.
    let mut sim = SimBuilder::new(config.clone(), boats, target).started().build()?;

    // 4. Output.
    let writer = CsvWriter::new(&args.output_dir)?;
    let mut obs = CountingObserver::new(TraceObserver::new(writer));

    // 5. Run.
    let t0 = Instant::now();
    sim.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    // 6. Summary.
    let docked = sim.engine.fleet().count_in(MotionState::Docked);
    let per_tick = elapsed / (config.sim.total_ticks.max(1) as u32);
    tracing::info!(
        plans = obs.plans,
        failed = obs.inner.plan_failures(),
        docked,
        elapsed_ms = elapsed.as_millis() as u64,
        per_tick_us = per_tick.as_micros() as u64,
        budget_us = sim.clock.tick_budget().as_micros() as u64,
        "Run complete"
    );
    if per_tick > sim.clock.tick_budget() {
        tracing::warn!("Slower than real time at {} Hz", config.sim.tick_rate_hz);
    }

    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  plans requested     : {}", obs.plans);
    println!("  plans failed        : {}", obs.inner.plan_failures());
    match (obs.first_docked, obs.all_docked) {
        (_, Some(all)) => println!("  fleet docked        : tick {}", all.0),
        (Some(first), None) => println!("  first boat docked   : tick {} (fleet incomplete)", first.0),
        (None, None) => println!("  no boat docked"),
    }
    println!("  boat_snapshots.csv  : {} rows", obs.snapshot_rows);
    println!("  tick_summaries.csv  : {} rows", obs.summary_rows);
    println!();

    // 7. Final boat table.
    let target = sim.engine.target().point();
    println!("Target at ({:.1}, {:.1})", target.x, target.y);
    println!("{:<6} {:<16} {:>9} {:>9} {:>10}", "Boat", "State", "x", "y", "range");
    println!("{}", "-".repeat(54));
    for boat in sim.engine.boats() {
        println!(
            "{:<6} {:<16} {:>9.1} {:>9.1} {:>10.1}",
            boat.id.0,
            boat.state.as_str(),
            boat.pos.x,
            boat.pos.y,
            boat.pos.distance(target),
        );
    }
    println!();
    println!("{docked}/{} boats docked", sim.engine.fleet().len());

    Ok(())
}
