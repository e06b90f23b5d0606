mod cleaner;
mod clock;
mod collection;
pub mod config;
pub mod date_format;
mod error;
pub mod executor;
mod restore;
pub mod runner;
mod target;

pub use cleaner::{
    execute, Capacity, CleanupPlan, CleanupReport, Cleaner, Deleter, DeletionFailure, Keeper,
    LocalDeleter, OnePerGroup, Outdated, Policy, Quantity, Range, Stepwise, StepwisePolicy,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use collection::{File, FileCollection};
pub use error::{Error, Result};
pub use restore::{
    build_restore_plan, DirectoryRestore, MysqlRestore, OpensslDecryption, RestorePlan,
    RestoreStep,
};
pub use target::{
    ArtifactKind, Compression, CompressionResolver, CompressorSpec, Decompressor, Target,
    DEFAULT_COMPRESSORS,
};
