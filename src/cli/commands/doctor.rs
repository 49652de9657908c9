//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::path::Path;
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("Palaver Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let sections = [
        ("External Tools", vec![check_tool(&settings.tools.tesseract_cmd, install_hint_tesseract())]),
        ("API Configuration", vec![check_openai_api_key(settings)]),
        ("Directories", check_directories(settings)),
        ("Configuration", vec![check_config_file(config_path)]),
    ];

    let mut errors = 0;
    let mut warnings = 0;
    for (title, checks) in &sections {
        println!("{}", style(title).bold());
        for check in checks {
            check.print();
            match check.status {
                CheckStatus::Error => errors += 1,
                CheckStatus::Warning => warnings += 1,
                CheckStatus::Ok => {}
            }
        }
        println!();
    }

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Palaver.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Palaver is ready to use.");
    }

    Ok(())
}

/// Check if an external tool is available.
///
/// A missing OCR binary only disables image attachments, so it is a warning.
fn check_tool(name: &str, hint: &str) -> CheckResult {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => {
            // tesseract prints its version on stderr in older releases
            let text = if output.stdout.is_empty() { output.stderr } else { output.stdout };
            let version = String::from_utf8_lossy(&text)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .to_string();
            CheckResult::ok(name, &crate::cli::output::preview(&version, 50))
        }
        Ok(_) => CheckResult::error(name, "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::warning(name, "not found (image text extraction disabled)", hint)
        }
        Err(e) => CheckResult::error(name, &format!("error: {}", e), hint),
    }
}

/// Check if OpenAI API key is configured.
fn check_openai_api_key(settings: &Settings) -> CheckResult {
    let key = std::env::var("OPENAI_API_KEY").ok();
    check_api_key_value(key.as_deref(), settings.llm.api_base.as_deref())
}

fn check_api_key_value(key: Option<&str>, api_base: Option<&str>) -> CheckResult {
    const HINT: &str = "Set with: export OPENAI_API_KEY='sk-...'";

    match (key, api_base) {
        (Some(key), _) if key.starts_with("sk-") && key.len() > 20 => {
            let masked = format!("{}...{}", &key[..7], &key[key.len() - 4..]);
            CheckResult::ok("OPENAI_API_KEY", &format!("configured ({})", masked))
        }
        (_, Some(base)) => CheckResult::ok(
            "OPENAI_API_KEY",
            &format!("not required for custom endpoint {}", base),
        ),
        (Some(""), None) => CheckResult::error("OPENAI_API_KEY", "empty", HINT),
        (Some(_), None) => CheckResult::warning(
            "OPENAI_API_KEY",
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        (None, None) => CheckResult::error("OPENAI_API_KEY", "not set", HINT),
    }
}

/// Check data directories.
fn check_directories(settings: &Settings) -> Vec<CheckResult> {
    [("Data directory", settings.data_dir()), ("Uploads", settings.uploads_dir())]
        .into_iter()
        .map(|(name, dir)| {
            if dir.is_dir() {
                CheckResult::ok(name, &dir.display().to_string())
            } else {
                CheckResult::warning(
                    name,
                    &format!("{} (will be created)", dir.display()),
                    "Directory will be created on first use",
                )
            }
        })
        .collect()
}

/// Check if config file exists and parses.
fn check_config_file(config_path: &Path) -> CheckResult {
    if !config_path.exists() {
        return CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: palaver config init (or palaver config edit)",
        );
    }
    match Settings::load_from(Some(&config_path.to_path_buf())) {
        Ok(_) => CheckResult::ok("Config file", &config_path.display().to_string()),
        Err(e) => CheckResult::error("Config file", &e.to_string(), "Fix the file or recreate it with: palaver config init --force"),
    }
}

/// Platform-specific install hint for tesseract.
fn install_hint_tesseract() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install tesseract"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install tesseract-ocr (or your package manager)"
    } else {
        "Install from: https://github.com/tesseract-ocr/tesseract"
    }
}
