//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Run the config command.
pub fn run_config(action: &ConfigAction, config_path: Option<PathBuf>, settings: Settings) -> Result<()> {
    let config_path = config_path.unwrap_or_else(Settings::default_config_path);

    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Init { force } => {
            if config_path.exists() && !force {
                Output::warning(&format!(
                    "Config already exists at {} (use --force to overwrite)",
                    config_path.display()
                ));
            } else {
                Settings::default().save_to(&config_path)?;
                Output::success(&format!("Wrote default config to {}", config_path.display()));
            }
        }

        ConfigAction::Edit => {
            if !config_path.exists() {
                settings.save_to(&config_path)?;
                Output::info(&format!("Created default config at {:?}", config_path));
            }
            open_in_editor(&config_path);
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

fn open_in_editor(config_path: &Path) {
    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

    Output::info(&format!("Opening config in {}...", editor));

    match std::process::Command::new(&editor).arg(config_path).status() {
        Ok(s) if s.success() => {
            Output::success("Config saved.");
        }
        Ok(_) => {
            Output::warning("Editor exited with non-zero status.");
        }
        Err(e) => {
            Output::error(&format!("Failed to open editor: {}", e));
            Output::info(&format!("Config file is at: {:?}", config_path));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        run_config(&ConfigAction::Init { force: false }, Some(path.clone()), Settings::default())
            .unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.graph.max_messages, 6);
    }

    #[test]
    fn test_init_keeps_existing_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[llm]\nmodel = \"gpt-4o\"\n").unwrap();

        run_config(&ConfigAction::Init { force: false }, Some(path.clone()), Settings::default())
            .unwrap();
        assert_eq!(Settings::load_from(Some(&path)).unwrap().llm.model, "gpt-4o");

        run_config(&ConfigAction::Init { force: true }, Some(path.clone()), Settings::default())
            .unwrap();
        assert_eq!(Settings::load_from(Some(&path)).unwrap().llm.model, "gpt-4");
    }
}
