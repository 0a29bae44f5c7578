use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tool configuration, loaded from a TOML file.
///
/// The original scripts wired one operator's database paths, collection
/// prefix, threshold, and tag name straight into the code; here they live in
/// `phototidy.toml` with CLI flags taking precedence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub library: LibraryConfig,

    #[serde(default)]
    pub bursts: BurstConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Path to digiKam's main database (`digikam4.db`).
    #[serde(default)]
    pub album_db: Option<PathBuf>,

    /// Path to the thumbnail cache database (`thumbnails-digikam.db`).
    #[serde(default)]
    pub thumbnail_db: Option<PathBuf>,

    /// Directory prefix every cached thumbnail path must fall under.
    #[serde(default)]
    pub collection_prefix: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurstConfig {
    /// Maximum gap between consecutive shots of a burst, in seconds.
    #[serde(default = "default_threshold_secs")]
    pub threshold_secs: i64,

    /// Name of the tag applied to burst members.
    #[serde(default = "default_burst_tag")]
    pub tag: String,
}

fn default_threshold_secs() -> i64 {
    2
}

fn default_burst_tag() -> String {
    "Burst".to_string()
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            threshold_secs: default_threshold_secs(),
            tag: default_burst_tag(),
        }
    }
}

impl Config {
    /// Default config file location under the user config directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("phototidy")
            .join("phototidy.toml")
    }

    /// Load configuration.
    ///
    /// An explicitly named file must exist; a missing file at the default
    /// location just yields the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::ConfigNotFound(path.to_path_buf()));
                }
                Self::parse(&std::fs::read_to_string(path)?)
            }
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::parse(&std::fs::read_to_string(&path)?)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// The album database path, which has no usable default.
    pub fn album_db(&self) -> Result<&Path> {
        self.library
            .album_db
            .as_deref()
            .ok_or(Error::MissingSetting("library.album_db"))
    }

    /// The thumbnail database path, which has no usable default.
    pub fn thumbnail_db(&self) -> Result<&Path> {
        self.library
            .thumbnail_db
            .as_deref()
            .ok_or(Error::MissingSetting("library.thumbnail_db"))
    }

    /// The collection prefix, which has no usable default.
    pub fn collection_prefix(&self) -> Result<&Path> {
        self.library
            .collection_prefix
            .as_deref()
            .ok_or(Error::MissingSetting("library.collection_prefix"))
    }
}
