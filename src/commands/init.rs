use crate::config::CONFIG_FILE_NAME;
use anyhow::{Context, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# bugdash configuration

[upstream]
# Query URL without the cursor bound. Must return CSV with human-readable
# headers ordered by bug id.
# base_url = "https://bugzilla.mozilla.org/buglist.cgi?...&ctype=csv&human=1&order=bug_id&limit=0"
page_ceiling = 10000
request_timeout_secs = 60
bug_link_base = "https://bugzilla.mozilla.org/show_bug.cgi?id="

[schedule]
interval_secs = 3600

[server]
host = "0.0.0.0"
port = 3000
static_dir = "public"

[export]
# path = "out/report.csv"
"#;

/// Write the default configuration into `dir`.
pub fn init_config(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!("Configuration file already exists. Use --force to overwrite.");
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("Created {CONFIG_FILE_NAME} configuration file");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_config_from, BugdashConfig};
    use tempfile::TempDir;

    #[test]
    fn test_default_config_parses_to_defaults() {
        let dir = TempDir::new().unwrap();
        init_config(dir.path(), false).unwrap();

        let loaded = load_config_from(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(loaded, BugdashConfig::default());
    }

    #[test]
    fn test_refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[server]\nport = 1\n").unwrap();

        assert!(init_config(dir.path(), false).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[server]\nport = 1\n");

        init_config(dir.path(), true).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("interval_secs = 3600"));
    }
}
