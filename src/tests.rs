use crate::config::{default_data_path, CategorierConfig};
use crate::format::{format_listing, format_node};
use categorier_graph::{Combine, Criterion, FlatMode, GraphManager};
use tempfile::TempDir;

// ===========================================================================
// Config
// ===========================================================================

#[test]
fn config_defaults() {
    let config = CategorierConfig::default();
    assert_eq!(config.log_filter, "categorier=info");
    assert_eq!(config.flat_mode, FlatMode::None);
    assert_eq!(config.data_path, default_data_path());
    assert!(config.data_path.ends_with("data.yml"));
}

#[test]
fn config_missing_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let config = CategorierConfig::load(&dir.path().join("absent.toml"));
    assert_eq!(config.log_filter, "categorier=info");
}

#[test]
fn config_partial_file_fills_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "flat_mode = \"all-flat\"\ndata_path = \"/tmp/tax.yml\"\n").unwrap();

    let config = CategorierConfig::load(&path);
    assert_eq!(config.flat_mode, FlatMode::AllFlat);
    assert_eq!(config.data_path, std::path::PathBuf::from("/tmp/tax.yml"));
    assert_eq!(config.log_filter, "categorier=info");
}

#[test]
fn config_malformed_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "flat_mode = [[[").unwrap();
    assert_eq!(CategorierConfig::load(&path).flat_mode, FlatMode::None);
}

#[test]
fn config_toml_roundtrip() {
    let config = CategorierConfig {
        flat_mode: FlatMode::Flat,
        ..Default::default()
    };
    let text = config.to_toml();
    assert!(text.contains("flat_mode = \"flat\""));

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, &text).unwrap();
    assert_eq!(CategorierConfig::load(&path).flat_mode, FlatMode::Flat);
}

// ===========================================================================
// Saved graph, rendered
// ===========================================================================

#[test]
fn saved_graph_renders_after_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.yml");

    let mut graph = GraphManager::open(&path).unwrap();
    graph.create("music", &[], &[]).unwrap();
    graph.create("jazz", &["music"], &[]).unwrap();
    graph.set_attribute("jazz", "born", &["1910s"]).unwrap();
    graph.save().unwrap();

    let reopened = GraphManager::open(&path).unwrap();
    let text = format_node(&reopened, "jazz").unwrap();
    assert!(text.contains("parents: music\n"));
    assert!(text.contains("born: 1910s\n"));

    let found = reopened.search(&[Criterion::name_prefix("j")], Combine::All);
    assert_eq!(format_listing(&found), "1. jazz\n");
}
