// Knowledge about the BGCFlow checkout: which Snakefiles exist,
// which pipelines rules.yaml describes, and how many cores a run may use.

pub mod catalog;
pub mod snakefile;

pub use catalog::{CatalogError, PipelineCatalog, PipelineInfo};
pub use snakefile::{resolve_snakefile, snakefile_path, SnakefileNotFound, KNOWN_WORKFLOWS};

/// Cores actually handed to Snakemake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreAllocation {
    pub requested: usize,
    pub available: usize,
    pub granted: usize,
}

impl CoreAllocation {
    pub fn clamped(&self) -> bool {
        self.granted < self.requested
    }
}

pub fn allocate_cores(requested: usize, available: usize) -> CoreAllocation {
    CoreAllocation {
        requested,
        available,
        granted: requested.min(available),
    }
}

pub fn available_cores() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1)
}
