use std::path::PathBuf;

/// Error that aborts a whole serialization.
///
/// Everything else met during a traversal (a failing accessor, an object with
/// no descriptor, a renderer that never reports) is recovered locally.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Too many objects reached: {count} objects (max: {max} allowed)")]
    TooManyObjects { count: usize, max: usize },

    #[error("Failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Error raised while building an object graph from a fixture description.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("Failed to read fixture '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed fixture: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Fixture root '{0}' is not a declared object")]
    UnknownRoot(String),

    #[error("Object '{object}' refers to undeclared object '{target}'")]
    UnknownReference { object: String, target: String },

    #[error("Object '{0}' declares an empty class hierarchy")]
    EmptyHierarchy(String),
}

pub type Result<T> = std::result::Result<T, GraphError>;
