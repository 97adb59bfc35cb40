//! Remote scene error types

use contracts::{ComponentGroup, ContractError, Handle, MappingKey, ObjectKind, ReturnCode};
use thiserror::Error;

use crate::link::LinkOperation;

/// Remote scene error
#[derive(Debug, Error)]
pub enum SceneError {
    /// The link refused to connect
    #[error("failed to connect to remote API server at {address}: {code}")]
    ConnectionFailed { address: String, code: ReturnCode },

    /// Operation attempted after the client was closed
    #[error("connection to remote API server already closed")]
    ConnectionClosed,

    /// No object with that name in the scene
    #[error("object '{name}' not found in scene")]
    NotFound { name: String },

    /// Object exists but is not of the requested kind
    #[error("invalid object type for '{object}': expected {expected}, got {actual}")]
    InvalidKind {
        object: String,
        expected: &'static str,
        actual: ObjectKind,
    },

    /// Handle matches none of the known kinds
    #[error("object handle {handle} matches no known object type")]
    UnrecognizedType { handle: Handle },

    /// Sensor read while the simulation is stopped
    #[error("simulation is not running")]
    SimulationNotRunning,

    /// Server answered with a failing status
    #[error("remote operation '{operation}' failed with {code}")]
    RemoteOperationFailed {
        operation: LinkOperation,
        code: ReturnCode,
    },

    /// Buffered read found no value yet
    #[error("remote operation '{operation}' has no buffered value yet ({code})")]
    TransientReadMiss {
        operation: LinkOperation,
        code: ReturnCode,
    },

    #[error(transparent)]
    Collection(#[from] CollectionError),

    /// Pixel data could not be turned into an image
    #[error("invalid image data: {message}")]
    Image { message: String },

    #[error("invalid value for {arg}: {value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl SceneError {
    pub fn remote(operation: LinkOperation, code: ReturnCode) -> Self {
        Self::RemoteOperationFailed { operation, code }
    }

    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    pub fn image(message: impl Into<String>) -> Self {
        Self::Image {
            message: message.into(),
        }
    }

    pub fn invalid_argument(arg: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            value: value.into(),
        }
    }

    /// Whether this error only reports something missing, as opposed to a failure
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SceneError::NotFound { .. }
                | SceneError::Collection(
                    CollectionError::RootAbsent { .. } | CollectionError::ObjectAbsent { .. }
                )
        )
    }

    /// Unmasked buffer misses surface as plain remote failures
    pub(crate) fn escalate(self) -> Self {
        match self {
            SceneError::TransientReadMiss { operation, code } => {
                SceneError::RemoteOperationFailed { operation, code }
            }
            other => other,
        }
    }
}

/// Collection lookup error
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("failed to get object collection named '{name}'")]
    UnknownCollection { name: String },

    /// The instance's root object is not in the scene
    #[error("collection '{collection}' has no instance rooted at '{root}'")]
    RootAbsent { collection: String, root: String },

    #[error("{collection}.{group}[{index}] is out of range (declared {len})")]
    IndexOutOfRange {
        collection: String,
        group: ComponentGroup,
        index: usize,
        len: usize,
    },

    #[error("{collection}.{group} declares no entry {key}")]
    NotInMapping {
        collection: String,
        group: ComponentGroup,
        key: MappingKey,
    },

    /// Declared in the mapping but missing from the live scene
    #[error("{collection}.{group} object '{name}' is absent from the scene")]
    ObjectAbsent {
        collection: String,
        group: ComponentGroup,
        name: String,
    },
}

/// Result alias
pub type Result<T> = std::result::Result<T, SceneError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escalate_only_touches_misses() {
        let miss = SceneError::TransientReadMiss {
            operation: LinkOperation::ReadProximitySensor,
            code: ReturnCode::NO_VALUE,
        };
        assert!(matches!(
            miss.escalate(),
            SceneError::RemoteOperationFailed {
                code: ReturnCode::NO_VALUE,
                ..
            }
        ));
        assert!(matches!(
            SceneError::SimulationNotRunning.escalate(),
            SceneError::SimulationNotRunning
        ));
    }

    #[test]
    fn test_not_found_family() {
        assert!(SceneError::not_found("x").is_not_found());
        assert!(SceneError::from(CollectionError::RootAbsent {
            collection: "epuck".into(),
            root: "ePuck#0".into(),
        })
        .is_not_found());
        assert!(!SceneError::from(CollectionError::UnknownCollection {
            name: "ghost".into()
        })
        .is_not_found());
        assert!(!SceneError::ConnectionClosed.is_not_found());
    }

    #[test]
    fn test_messages() {
        let err = SceneError::remote(LinkOperation::StartSimulation, ReturnCode::REMOTE_ERROR);
        assert_eq!(
            err.to_string(),
            "remote operation 'start_simulation' failed with code 8 (remote_error)"
        );
    }
}
