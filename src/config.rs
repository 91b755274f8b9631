use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Persistent settings, stored as JSON under `~/.fitsync/config.json`.
/// Created with the site defaults on first run.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub private_key_path: PathBuf,
    pub local_dir: PathBuf,
    pub remote_base: String,
    /// FITS header keyword carrying the Julian Date
    pub date_keyword: String,
    pub process_script: String,
    /// upper bound on waiting for remote command output, seconds
    pub command_timeout_secs: u64,
}

impl Config {
    fn site_default(home_dir: &Path) -> Self {
        Config {
            host: "alis".to_string(),
            port: 22,
            username: "talon".to_string(),
            private_key_path: home_dir.join(".ssh").join("id_rsa"),
            local_dir: PathBuf::from("/home/optjo/fits"),
            remote_base: "/mnt/storage/rawdata".to_string(),
            date_keyword: "JD".to_string(),
            process_script: "/opt/dataprocessing/dataprocess.py".to_string(),
            command_timeout_secs: 600,
        }
    }

    pub fn config_dir(home_dir: &Path) -> PathBuf {
        home_dir.join(".".to_owned() + env!("CARGO_PKG_NAME"))
    }

    pub fn init() -> Self {
        match dirs::home_dir() {
            Some(home_dir) => {
                let config_storage_dir = Self::config_dir(&home_dir);
                let config_path = config_storage_dir.join("config.json");
                if !config_path.exists() {
                    if !config_storage_dir.exists() {
                        if let Err(e) = std::fs::create_dir_all(&config_storage_dir) {
                            eprintln!(
                                "Cannot create config dir {}: {}",
                                config_storage_dir.display(),
                                e
                            );
                            std::process::exit(1);
                        }
                    }
                    let config = Config::site_default(&home_dir);
                    config.save_to(&config_path);
                }
                Config::read_from(&config_path)
            }
            None => {
                println!("Cannot find user's home dir");
                std::process::exit(1);
            }
        }
    }

    pub fn read_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Invalid config {}: {}", path.display(), e);
                    std::process::exit(1);
                }
            },
            Err(e) => {
                eprintln!("Cannot read config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        }
    }

    pub fn save_to(&self, path: &Path) {
        match serde_json::to_string_pretty(self) {
            Ok(content) => {
                if let Err(e) = std::fs::write(path, content) {
                    eprintln!("Cannot write config {}: {}", path.display(), e);
                }
            }
            Err(e) => eprintln!("Cannot serialize config: {}", e),
        }
    }

    /// Remote night directory for the given identifier.
    pub fn remote_night_dir(&self, night: i64) -> String {
        format!("{}/{}", self.remote_base.trim_end_matches('/'), night)
    }

    /// Where the frame lands on the storage server.
    pub fn remote_file_path(&self, night: i64, basename: &str) -> String {
        format!("{}/{}", self.remote_night_dir(night), basename)
    }

    /// Absolute arguments override the configured acquisition directory;
    /// anything else resolves relative to it.
    pub fn resolve_local(&self, arg: &str) -> PathBuf {
        let p = Path::new(arg);
        if p.is_absolute() { p.to_path_buf() } else { self.local_dir.join(p) }
    }
}
