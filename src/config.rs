use serde::Deserialize;
use std::path::Path;

/// The category endpoints one deployment watches. Kept as built-in defaults
/// so the collector runs without any config file present.
const DEFAULT_ENDPOINTS: &[&str] = &[
    "https://api-berita-indonesia.vercel.app/antara/olahraga/",
    "https://api-berita-indonesia.vercel.app/antara/bola/",
    "https://api-berita-indonesia.vercel.app/cnn/gayaHidup/",
    "https://api-berita-indonesia.vercel.app/merdeka/teknologi/",
    "https://api-berita-indonesia.vercel.app/merdeka/jateng/",
    "https://api-berita-indonesia.vercel.app/merdeka/sehat/",
    "https://api-berita-indonesia.vercel.app/okezone/sports/",
    "https://api-berita-indonesia.vercel.app/okezone/bola/",
];

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Seconds between ingestion cycles
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<String>,
    #[serde(default)]
    pub replace: ReplacePolicy,
}

fn default_interval_seconds() -> u64 {
    120
}

fn default_endpoints() -> Vec<String> {
    DEFAULT_ENDPOINTS.iter().map(|e| e.to_string()).collect()
}

/// How a cycle's results replace the previous snapshot.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ReplacePolicy {
    /// Clear the collection up front, then persist each endpoint's batch as
    /// it arrives. Readers may observe an empty or partially populated
    /// collection while a cycle is in flight, and batches stored before a
    /// later endpoint fails survive on their own.
    ClearFirst,
    /// Stage every successful batch in memory and swap the whole snapshot in
    /// one transaction at the end of the cycle. No read-visible gap.
    #[default]
    StageAndSwap,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval_seconds(),
            endpoints: default_endpoints(),
            replace: ReplacePolicy::default(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from `path`, falling back to the built-in defaults when the file
    /// does not exist. A file that exists but fails to parse is still an
    /// error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}
