//! Application state for the merge server

use std::sync::Arc;

use crate::config::MergeConfig;
use crate::pipeline::MergePipeline;

/// Shared, immutable server state
#[derive(Clone)]
pub struct AppState {
    config: Arc<MergeConfig>,
    pipeline: MergePipeline,
}

impl AppState {
    pub fn new(config: MergeConfig) -> Self {
        let pipeline = MergePipeline::new(config.extraction.clone());
        Self {
            config: Arc::new(config),
            pipeline,
        }
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &MergePipeline {
        &self.pipeline
    }
}
