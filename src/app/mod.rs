// Application layer - Use case interactors

pub mod batch_interactor;
pub mod clip_orchestrator;
pub mod container;
pub mod folder_interactor;

// Re-export interactors
pub use batch_interactor::{BatchInteractor, BatchOutcome, InputSummary, RejectionEntry};
pub use clip_orchestrator::{ClipOrchestrator, HaltInfo, OrchestratorSettings, RunReport};
pub use folder_interactor::{FolderEntry, FolderInteractor};

/// How duplicates of existing clips are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Keep the existing clip
    Skip,
    /// Ask on the terminal for each duplicate
    Ask,
}
