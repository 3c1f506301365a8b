//! rc_match CLI
//!
//! Plays a full match of locally driven teams against the kinematic demo
//! simulator and prints the final score.

mod demo_sim;

use std::path::PathBuf;
use std::thread;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use rc_core::engine::Point;
use rc_core::game_master::{GameMaster, MatchSummary, TeamRunner, TickMessage};
use rc_core::{MatchConfig, MissingTeamPolicy, TransportError};

use demo_sim::KinematicSimulator;

#[derive(Parser)]
#[command(name = "rc_match")]
#[command(about = "Run a robot soccer match against the demo simulator", long_about = None)]
struct Cli {
    /// Match config JSON (missing fields take defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tick limit
    #[arg(long)]
    ticks: Option<u64>,

    /// Robots per team
    #[arg(long)]
    robots: Option<usize>,

    /// Number of teams (1 or 2)
    #[arg(long)]
    teams: Option<usize>,

    /// Barrier deadline per tick (ms)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// What a team that misses the deadline gets
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Seed for the simulator's kickoff placement
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Make the last team skip every N-th tick
    #[arg(long)]
    drop_team_every: Option<u64>,

    /// Log at info level regardless of RUST_LOG
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Reuse,
    Zero,
}

impl From<PolicyArg> for MissingTeamPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Reuse => MissingTeamPolicy::ReusePrevious,
            PolicyArg::Zero => MissingTeamPolicy::ZeroCommand,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so `--json` output stays clean.
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr).with_filter(filter))
        .init();

    let config = load_config(&cli)?;
    let summary = play(&config, cli.seed, cli.drop_team_every.filter(|n| *n > 0))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        let score = summary.goals.iter().map(u32::to_string).collect::<Vec<_>>().join(" - ");
        println!("Final score: {score}");
        println!("Ticks played: {} ({:?})", summary.ticks_played, summary.phase);
        println!("Degraded ticks: {}", summary.degraded_ticks);
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<MatchConfig> {
    let mut config = match &cli.config {
        Some(path) => MatchConfig::from_path(path)
            .with_context(|| format!("loading match config from {}", path.display()))?,
        None => MatchConfig::from_env_or_default(),
    };

    if let Some(ticks) = cli.ticks {
        config.tick_limit = ticks;
    }
    if let Some(robots) = cli.robots {
        config.number_of_robots = robots;
    }
    if let Some(teams) = cli.teams {
        config.number_of_teams = teams;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.tick_timeout_ms = timeout_ms;
    }
    if let Some(policy) = cli.policy {
        config.missing_team_policy = policy.into();
    }

    config.validate().context("invalid match config")?;
    Ok(config)
}

fn play(config: &MatchConfig, seed: u64, drop_every: Option<u64>) -> Result<MatchSummary> {
    let simulator = KinematicSimulator::new(config, seed);
    let mut game_master = GameMaster::new(config.clone(), simulator)?;
    let last_team = config.number_of_teams - 1;

    let mut workers = Vec::with_capacity(config.number_of_teams);
    for team_id in 0..config.number_of_teams {
        let mut runner = TeamRunner::new(game_master.connect_team(team_id)?, config);
        assign_keeper(&mut runner, config);

        let flaky = drop_every.filter(|_| team_id == last_team);
        workers.push(thread::spawn(move || match flaky {
            Some(every) => run_flaky(runner, every),
            None => runner.run(),
        }));
    }

    info!(seed, "kickoff");
    let summary = game_master.run()?;

    for worker in workers {
        worker.join().map_err(|_| anyhow!("team runner panicked"))??;
    }
    Ok(summary)
}

/// Last robot patrols the goal mouth.
fn assign_keeper(runner: &mut TeamRunner, config: &MatchConfig) {
    let robots = config.number_of_robots;
    if robots < 2 {
        return;
    }
    let x = -config.field.half_length() + 0.3;
    let reach = 0.4 * config.field.goal_width_m;
    if let Some(keeper) = runner.controller_mut(robots - 1) {
        keeper.go_to(Point::new(x, -reach), Point::new(x, reach));
    }
}

/// Like [`TeamRunner::run`], but withholds every `every`-th submission.
fn run_flaky(mut runner: TeamRunner, every: u64) -> std::result::Result<MatchSummary, TransportError> {
    loop {
        match runner.handle().recv_latest()? {
            TickMessage::Snapshot(team) => {
                let commands = runner.decide_all(&team);
                if team.tick % every == 0 {
                    debug!(tick = team.tick, team = team.team_id, "withholding submission");
                    continue;
                }
                runner.handle().submit(team.tick, commands)?;
            }
            TickMessage::MatchEnded(summary) => return Ok(summary),
        }
    }
}
