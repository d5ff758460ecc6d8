//! Config file discovery and layering for the CLI

use anyhow::{Context, Result};
use isoreach_core::config::LayeredConfig;
use std::path::Path;

const DEFAULT_CONFIG_FILE: &str = "isoreach.toml";

/// Build the run configuration: defaults, then file, then environment
///
/// An explicitly requested config file must exist; the implicit
/// `isoreach.toml` in the working directory is optional.
pub fn load_config(explicit: Option<&Path>) -> Result<LayeredConfig> {
    let config = LayeredConfig::with_defaults();

    let config = match explicit {
        Some(path) => config
            .load_from_file(path)
            .with_context(|| format!("cannot load config file {}", path.display()))?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                config.load_from_file(default_path)?
            } else {
                config
            }
        }
    };

    Ok(config.load_from_env())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let result = load_config(Some(Path::new("/nonexistent/isoreach.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_explicit_file_is_loaded() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[routing]\nbase_url = \"http://ors.internal:8080/ors\"").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.ors_base_url.value, "http://ors.internal:8080/ors");
    }
}
