use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use owo_colors::OwoColorize;

use fitsync::cli::{Cli, Commands};
use fitsync::command::{LaunchStatus, launch_status, processing_command, run_remote};
use fitsync::config::Config;
use fitsync::meta;
use fitsync::remote::{MkdirOutcome, Ssh2Remote, ensure_dir};
use fitsync::session::SshSession;
use fitsync::transfer::{SyncOutcome, UploadReason, copying_line, sync_file};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = if cli.verbose { init_verbose_logging() } else { None };
    let config = Config::init();

    match cli.command {
        Some(Commands::Set {
            host,
            port,
            username,
            key_path,
            local_dir,
            remote_base,
            process_script,
            command_timeout,
        }) => {
            let mut config = config;
            if let Some(v) = host {
                config.host = v;
            }
            if let Some(v) = port {
                config.port = v;
            }
            if let Some(v) = username {
                config.username = v;
            }
            if let Some(v) = key_path {
                config.private_key_path = v;
            }
            if let Some(v) = local_dir {
                config.local_dir = v;
            }
            if let Some(v) = remote_base {
                config.remote_base = v;
            }
            if let Some(v) = process_script {
                config.process_script = v;
            }
            if let Some(v) = command_timeout {
                config.command_timeout_secs = v;
            }
            let home_dir = dirs::home_dir().expect("home dir resolved by Config::init");
            let config_path = Config::config_dir(&home_dir).join("config.json");
            config.save_to(&config_path);
            println!("✅ Configuration saved to {}", config_path.display());
            Ok(())
        }
        None => run_sync(&config, &cli.file, cli.final_batch()),
    }
}

/// The whole run: resolve the night directory from the frame's date
/// keyword, ship the frame, trigger processing. The session handle drops on
/// every exit path, so the connection is closed even when a step fails.
fn run_sync(config: &Config, file_arg: &str, final_batch: bool) -> Result<()> {
    let local_file = config.resolve_local(file_arg);
    let basename = local_file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file_arg.to_string());

    let jd = meta::read_date_keyword(&local_file, &config.date_keyword)?;
    let night = meta::night_id(jd)?;
    let night_dir = config.remote_night_dir(night);
    let remote_file = config.remote_file_path(night, &basename);

    println!("{}", "=".repeat(60));
    println!("Establishing SSH connection to: {} {} ...", config.host, config.port);
    println!("{}", "=".repeat(60));
    let sess = SshSession::connect(config)?;
    tracing::debug!(addr = sess.addr(), "session established");
    let mut store = Ssh2Remote(sess.sftp()?);

    match ensure_dir(&mut store, &night_dir)? {
        MkdirOutcome::Created => println!("Created: {}", night_dir),
        _ => println!("Exists:  {}", night_dir),
    }

    println!("Copying: {}", basename);
    println!("{}", "=".repeat(60));
    println!("{}", copying_line(&local_file, &remote_file));
    let mut verified = true;
    match sync_file(&mut store, &local_file, &remote_file)? {
        SyncOutcome::UpToDate => {
            println!("{} exists and has not been changed", basename);
        }
        SyncOutcome::Uploaded { reason } => {
            match reason {
                UploadReason::New => println!("NEW: {}", basename),
                UploadReason::Changed => {
                    println!("{} exists but has a different digest, overwriting...", basename)
                }
            }
            println!("{} {}", basename, "copied correctly".green());
            println!("{} removed", basename);
        }
        SyncOutcome::VerifyMismatch { local_digest, remote_digest } => {
            verified = false;
            println!("{} {}", basename, "not copied correctly".red());
            println!("  local  sha224: {}", local_digest);
            println!("  remote sha224: {}", remote_digest);
            println!("  keeping local copy for the next attempt");
        }
    }
    println!("{}", "=".repeat(60));

    if final_batch {
        println!("Starting final processing for calibration images");
    } else {
        println!("Starting data processing");
    }
    let cmd = processing_command(&config.process_script, night, &basename, final_batch);
    tracing::debug!(%cmd, "triggering remote processing");
    let output = run_remote(&sess, &cmd, Duration::from_secs(config.command_timeout_secs))?;

    println!("{} {}", night, basename);
    match launch_status(&output) {
        LaunchStatus::Started => {
            println!("{}", "Data processing started successfully".green());
        }
        LaunchStatus::NotStarted { marker_count } => {
            println!(
                "{} ({} start markers seen)",
                "Data processing failed to start".red(),
                marker_count
            );
        }
    }
    println!("{}", "=".repeat(60));

    if verified {
        Ok(())
    } else {
        Err(anyhow::anyhow!("transfer verification failed for {}", basename))
    }
}

fn init_verbose_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let home_dir = dirs::home_dir()?;
    let log_dir = Config::config_dir(&home_dir).join("logs");
    let appender = tracing_appender::rolling::daily(log_dir, "fitsync.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}
