use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;

use crate::agent::{Agent, LearningAgent};
use crate::error::TrainingError;
use crate::game::Marker;
use crate::policy::PolicyStore;
use crate::training::episode::play_match;
use crate::training::metrics::TrainingMetrics;

/// Trainer configuration, loadable from the `[training]` TOML section.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub num_episodes: usize,
    pub log_interval: usize,
    /// Save the policy store every N episodes; 0 disables periodic saves.
    pub save_interval: usize,
    /// Exploration probability handed to the learning agents.
    pub exploration_rate: f64,
    pub models_dir: PathBuf,
    /// Fixed RNG seed for reproducible runs; `None` draws from OS entropy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            num_episodes: 10_000,
            log_interval: 100,
            save_interval: 1000,
            exploration_rate: 0.8,
            models_dir: PathBuf::from("models"),
            seed: None,
        }
    }
}

/// Runs self-play episodes between two learning agents, feeding rewards and
/// keeping tallies. The interrupt flag is checked between episodes; on
/// interruption the policy accumulated so far is flushed before returning.
pub struct Trainer {
    config: TrainerConfig,
    stop: Arc<AtomicBool>,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        Trainer {
            config,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle for external interruption (Ctrl-C wiring lives in the
    /// binary).
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// Run the full training loop.
    pub fn train(
        &self,
        agents: &mut [LearningAgent; 2],
        policies: &mut PolicyStore,
        rng: &mut StdRng,
    ) -> Result<TrainingMetrics, TrainingError> {
        let mut metrics = TrainingMetrics::new();
        let total = self.config.num_episodes;

        println!("Starting training for {total} episodes...");
        println!("-------------------------------------------");

        for episode in 1..=total {
            if self.stop.load(Ordering::Relaxed) {
                println!("Interrupted before episode {episode}, saving policy...");
                break;
            }

            let result = {
                let [red, blue] = agents;
                play_match(red, blue, policies, rng, false)?
            };

            for agent in agents.iter_mut() {
                let reward = agent.feed_reward(&result.outcome, &result.scores, policies);
                metrics.record_reward(agent.state().marker(), reward);
                agent.reset(policies, rng);
            }

            if episode % self.config.log_interval == 0 {
                let window = self.config.log_interval;
                let red = metrics.tally(Marker::Red);
                let blue = metrics.tally(Marker::Blue);
                println!(
                    "Episode {episode}/{total} | Red w/d/l {}/{}/{} avg({window}): {:+.2} | Blue w/d/l {}/{}/{} avg({window}): {:+.2}",
                    red.wins,
                    red.draws,
                    red.losses,
                    metrics.average_reward(Marker::Red, window),
                    blue.wins,
                    blue.draws,
                    blue.losses,
                    metrics.average_reward(Marker::Blue, window),
                );
            }

            if self.config.save_interval > 0 && episode % self.config.save_interval == 0 {
                policies.save()?;
                println!("  >> Policy saved: {}", policies.dir().display());
            }
        }

        // Final (or interrupt) flush; a failure here is fatal only after
        // everything learnable has been learned.
        policies.save()?;

        println!("-------------------------------------------");
        println!("{} episodes played.", metrics.total_episodes());
        for marker in [Marker::Red, Marker::Blue] {
            let tally = metrics.tally(marker);
            println!(
                "{marker}: {} wins, {} draws, {} losses",
                tally.wins, tally.draws, tally.losses
            );
        }

        Ok(metrics)
    }
}
