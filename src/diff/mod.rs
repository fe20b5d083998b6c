//! Schema comparison core: routine text normalization, the metadata provider
//! seam, and the comparator that turns two catalogs into a [`DiffResult`].

mod compare;
mod model;
mod normalize;
mod provider;
mod snapshot;

pub use compare::compare;
pub use model::{
    ColumnDescriptor, DiffCounts, DiffResult, Mismatch, RoutineDescriptor, TableDifference,
};
pub use normalize::{equivalent, normalize};
pub use provider::MetadataProvider;
pub use snapshot::{SchemaSnapshot, SnapshotFormat, TableSnapshot, capture};
