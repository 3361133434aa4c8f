//! TOML configuration loading.

use std::path::Path;

use quinary_model::{PipelineConfig, ProtocolSpec, STUDY_DAY_LIMIT};
use tracing::debug;

use crate::error::{PipelineError, Result};

/// Reads, parses and validates a configuration file.
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    let contents = std::fs::read_to_string(path).map_err(|source| PipelineError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&contents, path)?;
    debug!(
        path = %path.display(),
        targets = config.drugs.targets.len(),
        protocols = config.protocols.len(),
        anchor = ?config.anchor,
        "loaded config"
    );
    Ok(config)
}

/// Parses configuration text; `path` is only used in error messages.
pub fn parse_config(contents: &str, path: &Path) -> Result<PipelineConfig> {
    let config: PipelineConfig =
        toml::from_str(contents).map_err(|source| PipelineError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
    validate(&config)?;
    Ok(config)
}

fn invalid(message: impl Into<String>) -> PipelineError {
    PipelineError::InvalidConfig {
        message: message.into(),
    }
}

pub fn validate(config: &PipelineConfig) -> Result<()> {
    if config.drugs.targets.iter().all(|target| target.trim().is_empty()) {
        return Err(invalid("drugs.targets must name at least one substance"));
    }
    if config.drugs.sources.is_empty() {
        return Err(invalid("drugs.sources must not be empty"));
    }
    if config.protocols.is_empty() {
        return Err(invalid("no protocols configured"));
    }
    for (project, spec) in &config.protocols {
        if project.as_str().trim().is_empty() {
            return Err(invalid("protocol keys must be non-blank project ids"));
        }
        if !spec.is_plausible() {
            return Err(invalid(format!(
                "protocol {project}: days must lie within -{STUDY_DAY_LIMIT}..={STUDY_DAY_LIMIT}"
            )));
        }
        match *spec {
            ProtocolSpec::Fixed { start_day, end_day } if end_day < start_day => {
                return Err(invalid(format!(
                    "protocol {project}: end_day {end_day} is before start_day {start_day}"
                )));
            }
            ProtocolSpec::Adaptive {
                start_day,
                phase2_days,
                max_day,
            } => {
                if phase2_days < 0 {
                    return Err(invalid(format!(
                        "protocol {project}: phase2_days must not be negative"
                    )));
                }
                if max_day < start_day {
                    return Err(invalid(format!(
                        "protocol {project}: max_day {max_day} is before start_day {start_day}"
                    )));
                }
            }
            ProtocolSpec::Fixed { .. } => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quinary_model::{AnchorMode, ProjectId, Source};

    const SAMPLE: &str = r#"
anchor = "as-treated"

[drugs]
targets = ["Heroin", "Morphine"]
sources = ["UDS", "UDSAB"]

[protocols.27]
kind = "fixed"
start_day = -30
end_day = 168

[protocols.30]
kind = "adaptive"
start_day = -30
phase2_days = 84
max_day = 300
"#;

    fn parse(text: &str) -> Result<PipelineConfig> {
        parse_config(text, Path::new("test.toml"))
    }

    #[test]
    fn parses_full_config() {
        let config = parse(SAMPLE).unwrap();
        assert_eq!(config.anchor, AnchorMode::AsTreated);
        assert_eq!(config.drugs.sources, vec![Source::Uds, Source::UdsAb]);
        let adaptive = config.protocol(&ProjectId::new("30").unwrap()).unwrap();
        assert!(adaptive.is_adaptive());
        assert_eq!(adaptive.start_day(), -30);
    }

    #[test]
    fn defaults_anchor_and_sources() {
        let config = parse(
            r#"
[drugs]
targets = ["Heroin"]

[protocols.51]
kind = "fixed"
start_day = 0
end_day = 84
"#,
        )
        .unwrap();
        assert_eq!(config.anchor, AnchorMode::IntentToTreat);
        assert_eq!(config.drugs.sources, Source::ALL.to_vec());
    }

    #[test]
    fn rejects_reversed_window() {
        let err = parse(
            r#"
[drugs]
targets = ["Heroin"]

[protocols.27]
kind = "fixed"
start_day = 10
end_day = 0
"#,
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig { .. }));
        assert!(err.to_string().contains("protocol 27"));
    }

    #[test]
    fn rejects_days_past_the_limit() {
        let err = parse(
            r#"
[drugs]
targets = ["Heroin"]

[protocols.30]
kind = "adaptive"
start_day = 0
phase2_days = 2147483000
max_day = 300
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("protocol 30: days must lie within"));
    }

    #[test]
    fn rejects_empty_targets_and_protocols() {
        let no_targets = "[drugs]\ntargets = []\n[protocols.27]\nkind = \"fixed\"\nstart_day = 0\nend_day = 7\n";
        assert!(matches!(parse(no_targets), Err(PipelineError::InvalidConfig { .. })));
        let no_protocols = "[drugs]\ntargets = [\"Heroin\"]\n[protocols]\n";
        assert!(matches!(parse(no_protocols), Err(PipelineError::InvalidConfig { .. })));
    }

    #[test]
    fn syntax_errors_name_the_file() {
        let err = parse("anchor = ").unwrap_err();
        assert!(matches!(err, PipelineError::ConfigParse { .. }));
        assert!(err.to_string().contains("test.toml"));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigRead { .. }));
    }
}
