//! Engine configuration threaded through every analysis

use std::ops::RangeInclusive;

/// Which set of strategies a C->T / G->A request runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// G1397, G1333 and DddA11 as three separate pipelines
    Legacy,
    /// The combined Mok2020 pipeline
    Library,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Window sizes enumerated for every strategy, in bp
    pub window_sizes: RangeInclusive<usize>,
    pub mode: DispatchMode,
}

impl EngineConfig {
    /// Standalone pipelines: 14-18bp windows, separate Mok strategies
    pub fn legacy() -> Self {
        EngineConfig {
            window_sizes: 14..=18,
            mode: DispatchMode::Legacy,
        }
    }

    /// Library pipelines: 14-20bp windows, unified Mok strategy
    pub fn library() -> Self {
        EngineConfig {
            window_sizes: 14..=20,
            mode: DispatchMode::Library,
        }
    }

    pub fn with_window_sizes(mut self, sizes: RangeInclusive<usize>) -> Self {
        self.window_sizes = sizes;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::library()
    }
}
