use thiserror::Error;

/// Top-level error type for the Tekton building-topology core.
#[derive(Debug, Error)]
pub enum TektonError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,

    #[error("offset distance {distance} exceeds arc radius {radius}")]
    OffsetExceedsRadius { distance: f64, radius: f64 },
}

/// Errors related to the joint topology graph and document entities.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("joint has no wall infos")]
    EmptyJoint,

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Errors related to face reconciliation.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("duplicate final key in face map: {0}")]
    DuplicateFinalKey(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Errors related to the dump/load persistence contract.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("unresolved reference: {0}")]
    UnresolvedReference(String),
}

/// Convenience type alias for results using [`TektonError`].
pub type Result<T> = std::result::Result<T, TektonError>;
