//! Configuration options for encoding.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::{AnchorMode, Source};
use crate::ids::ProjectId;
use crate::protocol::ProtocolSpec;

/// Target substances and the sources they may be reported through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugSelection {
    pub targets: Vec<String>,
    #[serde(default = "all_sources")]
    pub sources: Vec<Source>,
}

fn all_sources() -> Vec<Source> {
    Source::ALL.to_vec()
}

impl DrugSelection {
    pub fn new<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            targets: targets.into_iter().map(Into::into).collect(),
            sources: all_sources(),
        }
    }

    pub fn with_sources(mut self, sources: impl Into<Vec<Source>>) -> Self {
        self.sources = sources.into();
        self
    }
}

/// Everything the pipeline needs besides the input tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub anchor: AnchorMode,
    pub drugs: DrugSelection,
    /// Window definitions keyed by project id.
    pub protocols: BTreeMap<ProjectId, ProtocolSpec>,
}

impl PipelineConfig {
    pub fn new(drugs: DrugSelection) -> Self {
        Self {
            anchor: AnchorMode::default(),
            drugs,
            protocols: BTreeMap::new(),
        }
    }

    pub fn with_anchor(mut self, anchor: AnchorMode) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_protocol(mut self, project: ProjectId, spec: ProtocolSpec) -> Self {
        self.protocols.insert(project, spec);
        self
    }

    pub fn protocol(&self, project: &ProjectId) -> Option<&ProtocolSpec> {
        self.protocols.get(project)
    }
}
