// Library exports for mitoedit
pub mod analysis;
pub mod annotation;
pub mod bystander;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod io;
pub mod output;
pub mod pipeline;
pub mod reconcile;
pub mod sequence;
pub mod tale_nt;
pub mod window;

pub use analysis::{analyze, analyze_sequence, AnalysisRequest, AnalysisResult};
pub use config::{DispatchMode, EngineConfig};
pub use error::{MitoEditError, Result};
pub use pipeline::{PipelineKind, PipelineResult, Window};
pub use sequence::Sequence;
pub use tale_nt::{TaleNt, TaleNtConfig, TaleReport};
