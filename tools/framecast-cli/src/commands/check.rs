//! Check system capabilities.

use framecast_common::config::AppConfig;
use framecast_render::{FfmpegEngine, RenderEngine};

pub fn run() -> anyhow::Result<()> {
    println!("Framecast System Check");
    println!("{}", "=".repeat(50));

    let engine = FfmpegEngine::default();
    if engine.is_available() {
        println!("[OK] Render engine: {}", engine.name());
    } else {
        println!("[FAIL] Render engine '{}' not found on PATH", engine.name());
    }

    let config = AppConfig::load();
    println!("[OK] Upload dir: {}", config.upload_dir.display());
    println!("[OK] Export dir: {}", config.export_dir.display());
    println!("[OK] Max concurrent jobs: {}", config.max_concurrent_jobs);

    match config.ensure_dirs() {
        Ok(()) => println!("[OK] Working directories are writable"),
        Err(e) => println!("[FAIL] Could not create working directories: {e}"),
    }

    println!();
    if engine.is_available() {
        println!("Framecast is ready.");
    } else {
        println!("Install ffmpeg to enable rendering.");
    }

    Ok(())
}
