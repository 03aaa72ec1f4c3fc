use std::path::Path;

use anyhow::{bail, Context};
use confique::Config as DeriveConfig;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "shapejson.toml";

#[derive(Debug, DeriveConfig)]
pub struct Config {
    /// How deeply arrays and objects may nest before the input is rejected.
    #[config(default = 128)]
    pub max_depth: usize,

    /// Only write record fields that are explicitly mapped to a wire key when formatting.
    #[config(default = false)]
    pub bound_fields_only: bool,

    /// Shape expression used when `--shape` is not passed, e.g. `map<string, list<f64>>`.
    #[config(default = "any")]
    pub default_shape: String,
}

impl Config {
    /// Load `path` if given (it must exist), otherwise `shapejson.toml` if present, otherwise the
    /// defaults.
    pub fn load_from(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(path) if !path.is_file() => {
                bail!("config file `{}` does not exist", path.display())
            }
            Some(path) => path,
            None => Path::new(DEFAULT_CONFIG_FILE),
        };

        Config::builder()
            .file(path)
            .load()
            .with_context(|| format!("failed to load config from `{}`", path.display()))
    }
}
