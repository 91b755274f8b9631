use std::path::PathBuf;

use fitsync::config::Config;

fn sample_config() -> Config {
    Config {
        host: "alis".to_string(),
        port: 22,
        username: "talon".to_string(),
        private_key_path: PathBuf::from("/home/optjo/.ssh/id_rsa"),
        local_dir: PathBuf::from("/home/optjo/fits"),
        remote_base: "/mnt/storage/rawdata".to_string(),
        date_keyword: "JD".to_string(),
        process_script: "/opt/dataprocessing/dataprocess.py".to_string(),
        command_timeout_secs: 600,
    }
}

#[test]
fn remote_paths_group_by_night() {
    let config = sample_config();
    assert_eq!(config.remote_night_dir(2459123), "/mnt/storage/rawdata/2459123");
    assert_eq!(
        config.remote_file_path(2459123, "calib-0042.fts"),
        "/mnt/storage/rawdata/2459123/calib-0042.fts"
    );
}

#[test]
fn trailing_slash_in_base_does_not_double_up() {
    let mut config = sample_config();
    config.remote_base = "/mnt/storage/rawdata/".to_string();
    assert_eq!(config.remote_night_dir(2459123), "/mnt/storage/rawdata/2459123");
}

#[test]
fn relative_arguments_resolve_under_local_dir() {
    let config = sample_config();
    assert_eq!(
        config.resolve_local("calib-0042.fts"),
        PathBuf::from("/home/optjo/fits/calib-0042.fts")
    );
}

#[test]
fn absolute_arguments_are_kept() {
    let config = sample_config();
    assert_eq!(config.resolve_local("/tmp/calib.fts"), PathBuf::from("/tmp/calib.fts"));
}

#[test]
fn config_round_trips_through_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    let config = sample_config();
    config.save_to(&path);

    let loaded = Config::read_from(&path);
    assert_eq!(loaded.host, config.host);
    assert_eq!(loaded.port, config.port);
    assert_eq!(loaded.private_key_path, config.private_key_path);
    assert_eq!(loaded.command_timeout_secs, config.command_timeout_secs);
}
