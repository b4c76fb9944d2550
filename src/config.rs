use crate::errors::Result;
use crate::report::Instruction;
use serde::Deserialize;
use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Name of the per-user configuration directory.
const APP_DIR: &str = "docsub";

/// One find/replace pair as written in a batch file.
#[derive(Debug, Clone, Deserialize)]
pub struct InstructionEntry {
    pub find: String,
    pub replace: String,
}

/// A batch of instructions loaded from YAML.
///
/// ```yaml
/// prefixes:
///   - "Trust Summary"
/// instructions:
///   - find: "John Doe"
///     replace: "Jane Roe"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    /// Optional replacement for the built-in template whitelist.
    #[serde(default)]
    pub prefixes: Option<Vec<String>>,
    /// The find/replace pairs, applied in order.
    #[serde(default)]
    pub instructions: Vec<InstructionEntry>,
}

impl BatchConfig {
    /// Validates every entry into an [`Instruction`].
    pub fn instructions(&self) -> Result<Vec<Instruction>> {
        if self.instructions.is_empty() {
            return Err("Config file contains no instructions".into());
        }
        self.instructions
            .iter()
            .map(|e| Instruction::new(e.find.as_str(), e.replace.as_str()))
            .collect()
    }
}

/// A utility for locating and loading batch files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Finds the configuration file by searching in a prioritized list of locations.
    ///
    /// The search order is:
    /// 1. The path as given (absolute, or relative to the current directory).
    /// 2. A path relative to `working_dir` (the template folder).
    /// 3. Inside the user's configuration directory (`<config dir>/docsub`).
    /// 4. Next to the executable.
    ///
    /// # Returns
    ///
    /// Returns a `Result` with the `PathBuf` to the found config file, or an error
    /// listing every location that was tried.
    pub fn find_config(config_path: &Path, working_dir: &Path) -> Result<PathBuf> {
        if config_path.exists() {
            return Ok(config_path.to_path_buf());
        }

        let mut candidates = vec![working_dir.join(config_path)];

        if !config_path.is_absolute() {
            if let Some(config_dir) = dirs::config_dir() {
                candidates.push(config_dir.join(APP_DIR).join(config_path));
            }
            if let Ok(exe_path) = env::current_exe()
                && let Some(exe_dir) = exe_path.parent()
            {
                candidates.push(exe_dir.join(config_path));
            }
        }

        if let Some(found) = candidates.iter().find(|c| c.exists()) {
            return Ok(found.clone());
        }

        let tried: Vec<String> = std::iter::once(config_path.to_path_buf())
            .chain(candidates)
            .map(|p| p.display().to_string())
            .collect();

        Err(format!(
            "Config file '{}' not found. Searched in:\n  - {}",
            config_path.display(),
            tried.join("\n  - ")
        )
        .into())
    }

    /// Loads a `BatchConfig` from a YAML file.
    pub fn load_batch_config(path: &Path) -> Result<BatchConfig> {
        let file = File::open(path)?;
        Ok(serde_yaml::from_reader(file)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_batch_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("batch.yaml");
        fs::write(
            &path,
            "prefixes:\n  - Engagement Letter\ninstructions:\n  - find: John Doe\n    replace: Jane Roe\n  - find: '2023'\n    replace: '2024'\n",
        )
        .unwrap();

        let config = ConfigLoader::load_batch_config(&path).unwrap();
        assert_eq!(config.prefixes, Some(vec!["Engagement Letter".to_string()]));

        let instructions = config.instructions().unwrap();
        assert_eq!(instructions.len(), 2);
        assert_eq!(instructions[1], Instruction::new("2023", "2024").unwrap());
    }

    #[test]
    fn test_blank_entry_is_rejected() {
        let config: BatchConfig =
            serde_yaml::from_str("instructions:\n  - find: ''\n    replace: x\n").unwrap();
        assert!(matches!(config.instructions(), Err(Error::BlankFind)));

        let empty: BatchConfig = serde_yaml::from_str("prefixes: [RLT]\n").unwrap();
        assert!(matches!(empty.instructions(), Err(Error::Config(_))));
    }

    #[test]
    fn test_find_config_in_working_dir() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("docsub-batch-test.yaml"), "instructions: []\n").unwrap();

        let found =
            ConfigLoader::find_config(Path::new("docsub-batch-test.yaml"), temp_dir.path()).unwrap();
        assert_eq!(found, temp_dir.path().join("docsub-batch-test.yaml"));
    }

    #[test]
    fn test_missing_config_lists_locations() {
        let temp_dir = TempDir::new().unwrap();
        let err = ConfigLoader::find_config(Path::new("no-such-batch.yaml"), temp_dir.path())
            .unwrap_err()
            .to_string();
        assert!(err.contains("not found"));
        assert!(err.contains(&temp_dir.path().display().to_string()));
    }
}
