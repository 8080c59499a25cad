//! Integration tests for config persistence and application

use tempfile::TempDir;
use vertex_pipeline::config::{RenderConfig, WorkerConfig};
use vertex_pipeline::pipeline::{OperationRegistry, RenderModes, RenderState};

#[test]
fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let config = RenderConfig {
        modes: RenderModes::dynamic(),
        base_colour: 0x40C0_80FF,
        alpha_override: Some(200),
        workers: WorkerConfig {
            threads: 2,
            batch_size: 512,
        },
        log_filter: "warn".to_string(),
    };
    config.save(&path).unwrap();

    let loaded = RenderConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_load_or_default_on_missing_file() {
    let dir = TempDir::new().unwrap();
    let config = RenderConfig::load_or_default(dir.path().join("absent.toml"));
    assert_eq!(config, RenderConfig::default());
}

#[test]
fn test_load_or_default_on_corrupt_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "workers = \"many\"").unwrap();

    assert!(RenderConfig::load(&path).is_err());
    assert_eq!(RenderConfig::load_or_default(&path), RenderConfig::default());
}

#[test]
fn test_loaded_config_drives_render_state() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "base_colour = 4286611711\n\n[modes]\nuse_normals = true\n",
    )
    .unwrap();

    let config = RenderConfig::load(&path).unwrap();
    let mut state = RenderState::new(OperationRegistry::shared());
    config.apply(&mut state);

    assert!(state.modes().use_normals);
    assert!(state.modes().use_colour);
    assert_eq!(state.ctx.base_colour, 0xFF80_80FF);
}
