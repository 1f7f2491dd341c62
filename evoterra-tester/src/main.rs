mod harness;
mod policy;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use evoterra_game::{BiomeId, SessionCfg};
use harness::run_session;
use policy::{DecisionPolicy, Strategy};

#[derive(Debug, Parser)]
#[command(name = "evoterra-tester", version = "0.1.0")]
#[command(about = "Automated QA testing for Evoterra - headless scripted session runs")]
struct Args {
    /// Number of sessions to run
    #[arg(long, default_value_t = 25)]
    sessions: u64,

    /// Base seed; session N runs with seed base + N
    #[arg(long, default_value_t = 1337)]
    seed: u64,

    /// Decision strategy for the scripted player
    #[arg(long, value_enum, default_value_t = Strategy::Mixed)]
    strategy: Strategy,

    /// Biome to settle (tropical, temperate, grassland, desert, tundra,
    /// oceanic) or "cycle" to rotate through all six
    #[arg(long, default_value = "temperate")]
    biome: String,

    /// Civilization countdown length in seconds
    #[arg(long, default_value_t = 180.0)]
    duration: f64,

    /// Emit the full JSON report instead of the console table
    #[arg(long)]
    json: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbose per-session output
    #[arg(short, long)]
    verbose: bool,
}

fn resolve_biomes(arg: &str) -> Result<Vec<BiomeId>> {
    if arg == "cycle" {
        return Ok(BiomeId::all().to_vec());
    }
    let biome = BiomeId::from_str(arg)
        .map_err(|()| anyhow::anyhow!("unknown biome '{arg}'"))?;
    Ok(vec![biome])
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    println!("{}", "🌱 Evoterra Automated Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());

    let biomes = resolve_biomes(&args.biome)?;
    let cfg = SessionCfg {
        duration_secs: args.duration,
        ..SessionCfg::default()
    };

    let mut reports = Vec::new();
    for index in 0..args.sessions {
        let seed = args.seed.wrapping_add(index);
        let biome = biomes[usize::try_from(index).unwrap_or(0) % biomes.len()];
        let mut policy = DecisionPolicy::new(args.strategy, seed);
        let session = run_session(seed, biome, cfg.clone(), &mut policy)
            .with_context(|| format!("session with seed {seed} failed"))?;
        log::info!(
            "seed {seed}: {} with score {}",
            session.outcome,
            session.final_score
        );
        if args.verbose && !args.json {
            report::print_session_line(&session);
        }
        reports.push(session);
    }

    let summary = report::summarize(&reports);

    if args.json {
        let document = report::to_json(&reports, &summary)?;
        match &args.output {
            Some(path) => fs::write(path, document)
                .with_context(|| format!("writing report to {}", path.display()))?,
            None => println!("{document}"),
        }
    } else {
        if !args.verbose {
            for session in &reports {
                report::print_session_line(session);
            }
        }
        report::print_summary(args.strategy.label(), &args.biome, &summary);
    }

    Ok(())
}
