use std::{
    fmt,
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use machine_learning::ActorCritic;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

const GRAPH_FILE: &str = "graph.json";
const EPISODES_FILE: &str = "episodes.jsonl";

/// What a worker reports when one of its episodes ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeReport {
    pub worker: String,
    pub episode: usize,
    pub achieved: bool,
    pub position: f32,
    pub reward: f32,
    /// The action spread of the last update, empty before the first one.
    pub sigma: Vec<f32>,
}

impl fmt::Display for EpisodeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let achieve = if self.achieved { "Achieve" } else { "-------" };

        write!(
            f,
            "{} Ep: {} | {achieve} | Pos: {} | Ep_r: {:.2} | var: {:?}",
            self.worker, self.episode, self.position as i64, self.reward, self.sigma
        )
    }
}

/// One dense layer of the exported topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSummary {
    pub fan_in: usize,
    pub fan_out: usize,
    pub activation: String,
}

/// The topology of the actor and critic networks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub observation_dim: usize,
    pub action_dim: usize,
    pub actor: Vec<LayerSummary>,
    pub critic: Vec<LayerSummary>,
}

impl GraphSummary {
    pub fn new(net: &ActorCritic) -> Self {
        let layers = |dims: Vec<(usize, usize)>, activations: Vec<&'static str>| -> Vec<LayerSummary> {
            dims.into_iter()
                .zip(activations)
                .map(|((fan_in, fan_out), activation)| LayerSummary {
                    fan_in,
                    fan_out,
                    activation: activation.to_string(),
                })
                .collect()
        };

        Self {
            observation_dim: net.observation_dim(),
            action_dim: net.action_dim(),
            actor: layers(net.actor_layers(), net.actor_activations()),
            critic: layers(net.critic_layers(), net.critic_activations()),
        }
    }
}

/// Writes the training summary of a run to a log directory.
///
/// The directory is wiped when the writer is created, every run starts from an
/// empty log.
#[derive(Debug)]
pub struct SummaryWriter {
    dir: PathBuf,
    episodes: Mutex<BufWriter<File>>,
}

impl SummaryWriter {
    /// Creates a new `SummaryWriter`, deleting `dir` first if it exists.
    pub fn create(dir: impl AsRef<Path>) -> io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();

        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        fs::create_dir_all(&dir)?;

        let episodes = File::create(dir.join(EPISODES_FILE))?;

        Ok(Self {
            dir,
            episodes: Mutex::new(BufWriter::new(episodes)),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes the network topology to `graph.json`.
    pub fn write_graph(&self, graph: &GraphSummary) -> io::Result<()> {
        let file = File::create(self.dir.join(GRAPH_FILE))?;
        let mut writer = BufWriter::new(file);

        serde_json::to_writer_pretty(&mut writer, graph)?;
        writer.flush()
    }

    /// Appends one report to `episodes.jsonl`.
    pub fn record(&self, report: &EpisodeReport) -> io::Result<()> {
        let mut episodes = self.episodes.lock();

        serde_json::to_writer(&mut *episodes, report)?;
        episodes.write_all(b"\n")?;
        episodes.flush()
    }
}

#[cfg(test)]
mod tests {
    use std::env;

    use machine_learning::ActorCriticBuilder;

    use super::*;

    fn report(episode: usize) -> EpisodeReport {
        EpisodeReport {
            worker: "W_0".to_string(),
            episode,
            achieved: episode % 2 == 0,
            position: 88.7,
            reward: -12.345,
            sigma: vec![0.5],
        }
    }

    #[test]
    fn display_matches_the_console_format() {
        assert_eq!(
            report(4).to_string(),
            "W_0 Ep: 4 | Achieve | Pos: 88 | Ep_r: -12.35 | var: [0.5]"
        );
    }

    #[test]
    fn writes_graph_and_episodes() {
        let dir = env::temp_dir().join(format!("a3c-summary-{}", std::process::id()));
        fs::create_dir_all(dir.join("stale")).unwrap();

        let writer = SummaryWriter::create(&dir).unwrap();
        assert!(!dir.join("stale").exists());

        let net = ActorCriticBuilder::new(3, vec![-1.], vec![1.])
            .build()
            .unwrap();
        writer.write_graph(&GraphSummary::new(&net)).unwrap();
        writer.record(&report(0)).unwrap();
        writer.record(&report(1)).unwrap();

        let graph: GraphSummary =
            serde_json::from_str(&fs::read_to_string(dir.join(GRAPH_FILE)).unwrap()).unwrap();
        assert_eq!(graph.actor.len(), 3);
        assert_eq!(graph.critic[1].activation, "linear");

        let episodes: Vec<EpisodeReport> = fs::read_to_string(dir.join(EPISODES_FILE))
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(episodes, vec![report(0), report(1)]);

        fs::remove_dir_all(&dir).unwrap();
    }
}
