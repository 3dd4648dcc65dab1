// Copyright (c) 2026 Mathsieve Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.

use std::path::Path;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "./Mathsieve.toml";
pub const DEFAULT_ROOT_MARKER: &str = "data-math-processed";
pub const DEFAULT_NODE_MARKER: &str = "data-math-rendered";
pub const DEFAULT_DISPLAY_CLASS: &str = "katex-display";
pub const DEFAULT_MAX_BLOCK_LEN: usize = 500;

#[derive(Deserialize, Debug, Default, Serialize, Clone)]
#[serde(default)]
pub struct Config {
    pub scan: Scan,
    pub schedule: Schedule,
    pub classify: Classify,
    pub render: Render,
}

#[derive(Deserialize, Debug, Serialize, Clone)]
#[serde(default, rename_all = "kebab-case")]
pub struct Scan {
    /// Content-area selectors. Only these subtrees are ever scanned, so
    /// navigation, chrome and third-party embeds stay untouched.
    pub roots: Vec<String>,

    /// Selector of the subtree watched for late insertions.
    pub observer_root: String,

    /// Marker attribute set on a root once it has been scanned.
    pub root_marker: String,

    /// Marker attribute set on a candidate once it has been classified.
    pub node_marker: String,
}

impl Default for Scan {
    fn default() -> Self {
        Self {
            roots: vec![
                "main article".to_string(),
                "main section".to_string(),
                "[class*=mdx]".to_string(),
                "main > div > div".to_string(),
            ],
            observer_root: "main".to_string(),
            root_marker: DEFAULT_ROOT_MARKER.to_string(),
            node_marker: DEFAULT_NODE_MARKER.to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Serialize, Clone)]
#[serde(default, rename_all = "kebab-case")]
pub struct Schedule {
    /// Delays (ms) of the scan burst after initial-load and route-change.
    /// The surrounding page may still be hydrating at the nominal "loaded"
    /// signal, so one pass is not enough; an unbounded poll is too much.
    /// These are tunables, not a contract.
    pub burst_delays: Vec<u64>,

    /// Delay (ms) before the pass that follows a subtree insertion, so that
    /// rapid successive mutations collapse into one pass.
    pub mutation_delay: u64,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            burst_delays: vec![500, 1000, 2000],
            mutation_delay: 500,
        }
    }
}

#[derive(Deserialize, Debug, Serialize, Clone)]
#[serde(default, rename_all = "kebab-case")]
pub struct Classify {
    /// Block candidates longer than this are never treated as math.
    pub max_block_len: usize,
}

impl Default for Classify {
    fn default() -> Self {
        Self {
            max_block_len: DEFAULT_MAX_BLOCK_LEN,
        }
    }
}

#[derive(Deserialize, Debug, Serialize, Clone)]
#[serde(default, rename_all = "kebab-case")]
pub struct Render {
    /// Class put on the container that replaces a block candidate.
    pub display_class: String,
}

impl Default for Render {
    fn default() -> Self {
        Self {
            display_class: DEFAULT_DISPLAY_CLASS.to_string(),
        }
    }
}

pub fn parse_config(config: &str) -> eyre::Result<Config> {
    let config: Config =
        toml::from_str(config).map_err(|e| eyre::eyre!("failed to parse config file: {}", e))?;
    Ok(config)
}

/// Load the configuration file, or fall back to the defaults when there is
/// no such file.
pub fn load_config<P: AsRef<Path>>(path: P) -> eyre::Result<Config> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read config file {}: {}", path.display(), e))?;
    parse_config(&content)
}

#[cfg(test)]
mod test {

    #[test]
    fn test_empty_toml() {
        let config = crate::config::parse_config("").unwrap();

        assert_eq!(config.scan.roots.len(), 4);
        assert_eq!(config.scan.observer_root, "main");
        assert_eq!(config.scan.root_marker, "data-math-processed");
        assert_eq!(config.scan.node_marker, "data-math-rendered");
        assert_eq!(config.schedule.burst_delays, vec![500, 1000, 2000]);
        assert_eq!(config.schedule.mutation_delay, 500);
        assert_eq!(config.classify.max_block_len, 500);
        assert_eq!(config.render.display_class, "katex-display");
    }

    #[test]
    fn test_simple_toml() {
        let config = crate::config::parse_config(
            r#"
            [scan]
            roots = ["article"]
            observer-root = "body"

            [schedule]
            burst-delays = [100]
            mutation-delay = 50

            [classify]
            max-block-len = 200
            "#,
        )
        .unwrap();

        assert_eq!(config.scan.roots, vec!["article"]);
        assert_eq!(config.scan.observer_root, "body");
        assert_eq!(config.schedule.burst_delays, vec![100]);
        assert_eq!(config.schedule.mutation_delay, 50);
        assert_eq!(config.classify.max_block_len, 200);
    }
}
