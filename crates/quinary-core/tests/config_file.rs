use std::path::PathBuf;

use quinary_core::load_config;
use quinary_model::{AnchorMode, ProjectId};

#[test]
fn shipped_config_loads() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config/quinary.toml");
    let config = load_config(&path).expect("load shipped config");
    assert_eq!(config.anchor, AnchorMode::IntentToTreat);
    assert_eq!(config.protocols.len(), 3);
    let adaptive = config
        .protocol(&ProjectId::new("30").expect("project id"))
        .expect("project 30");
    assert!(adaptive.is_adaptive());
}
