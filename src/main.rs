use std::path::PathBuf;
use std::sync::atomic::Ordering;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;

use ml_silo::agent::{Agent, AgentParams, HumanAgent, LearningAgent};
use ml_silo::config::AppConfig;
use ml_silo::game::{Marker, Outcome};
use ml_silo::policy::PolicyStore;
use ml_silo::training::episode::play_match;
use ml_silo::training::trainer::Trainer;

/// Robocon 2024 silo game: train the tabular RL agent or play a match.
#[derive(Parser)]
#[command(name = "ml_silo", about = "Robocon 2024 silo game simulator")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Fixed RNG seed for reproducible runs (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train two AI seats against each other
    Train {
        /// Override number of training episodes
        #[arg(long)]
        episodes: Option<usize>,

        #[command(flatten)]
        seats: SeatPins,
    },
    /// Play a single rendered match
    Play {
        /// Red seat controller
        #[arg(long, value_enum, default_value = "ai")]
        red: Controller,

        /// Blue seat controller
        #[arg(long, value_enum, default_value = "ai")]
        blue: Controller,

        #[command(flatten)]
        seats: SeatPins,
    },
}

/// Per-seat attribute pins; anything left unset is randomized per episode.
#[derive(Args, Clone, Copy)]
struct SeatPins {
    /// Red placement interval in seconds (0-18)
    #[arg(long)]
    red_speed: Option<f64>,

    /// Red arrival time in the silo zone in seconds (0-170)
    #[arg(long)]
    red_freeze: Option<f64>,

    /// Red placement success rate (0.7-1.0)
    #[arg(long)]
    red_rate: Option<f64>,

    /// Blue placement interval in seconds (0-18)
    #[arg(long)]
    blue_speed: Option<f64>,

    /// Blue arrival time in the silo zone in seconds (0-170)
    #[arg(long)]
    blue_freeze: Option<f64>,

    /// Blue placement success rate (0.7-1.0)
    #[arg(long)]
    blue_rate: Option<f64>,
}

impl SeatPins {
    fn params(&self, marker: Marker) -> AgentParams {
        match marker {
            Marker::Red => AgentParams {
                speed: self.red_speed,
                freeze_time: self.red_freeze,
                success_rate: self.red_rate,
            },
            Marker::Blue => AgentParams {
                speed: self.blue_speed,
                freeze_time: self.blue_freeze,
                success_rate: self.blue_rate,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Controller {
    Ai,
    Human,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    if let Some(seed) = cli.seed {
        config.training.seed = Some(seed);
    }

    match cli.command {
        Command::Train { episodes, seats } => {
            if let Some(episodes) = episodes {
                config.training.num_episodes = episodes;
            }
            run_train(config, seats)
        }
        Command::Play { red, blue, seats } => run_play(config, red, blue, seats),
    }
}

fn build_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn open_store(dir: &std::path::Path) -> Result<PolicyStore> {
    PolicyStore::open(dir).with_context(|| format!("opening policy store at {}", dir.display()))
}

fn run_train(config: AppConfig, seats: SeatPins) -> Result<()> {
    let training = config.training;
    let mut rng = build_rng(training.seed);
    let mut policies = open_store(&training.models_dir)?;

    let red = LearningAgent::new(
        "Red",
        Marker::Red,
        training.exploration_rate,
        seats.params(Marker::Red),
        &mut policies,
        &mut rng,
    );
    let blue = LearningAgent::new(
        "Blue",
        Marker::Blue,
        training.exploration_rate,
        seats.params(Marker::Blue),
        &mut policies,
        &mut rng,
    );
    println!("Initialized {}", red.state());
    println!("Initialized {}", blue.state());

    let trainer = Trainer::new(training);
    let stop = trainer.stop_flag();
    ctrlc::set_handler(move || stop.store(true, Ordering::Relaxed))
        .context("installing Ctrl-C handler")?;

    let mut agents = [red, blue];
    trainer.train(&mut agents, &mut policies, &mut rng)?;
    Ok(())
}

fn run_play(config: AppConfig, red: Controller, blue: Controller, seats: SeatPins) -> Result<()> {
    let training = config.training;
    let mut rng = build_rng(training.seed);
    let mut policies = open_store(&training.models_dir)?;

    let mut red_seat = build_seat(red, "Red", Marker::Red, seats, &mut policies, &mut rng);
    let mut blue_seat = build_seat(blue, "Blue", Marker::Blue, seats, &mut policies, &mut rng);
    println!("Initialized {}", red_seat.state());
    println!("Initialized {}", blue_seat.state());

    let result = play_match(&mut *red_seat, &mut *blue_seat, &policies, &mut rng, true)?;

    match result.outcome {
        Outcome::Win(marker) => println!("Winner: {marker}"),
        _ => println!("No one ended the game"),
    }
    for (marker, score) in &result.scores {
        println!("{marker}: {score}");
    }
    Ok(())
}

fn build_seat(
    controller: Controller,
    name: &str,
    marker: Marker,
    seats: SeatPins,
    policies: &mut PolicyStore,
    rng: &mut StdRng,
) -> Box<dyn Agent> {
    let params = seats.params(marker);
    match controller {
        // Play mode is pure exploitation: exploration rate 0.
        Controller::Ai => Box::new(LearningAgent::new(name, marker, 0.0, params, policies, rng)),
        Controller::Human => Box::new(HumanAgent::new(name, marker, params, rng)),
    }
}
