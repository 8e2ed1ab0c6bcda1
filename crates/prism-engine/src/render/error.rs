use std::fmt;

use crate::resource::{ResourceId, ResourceType};

use super::frame::FrameState;

/// Failure reported by a render backend while creating or using GPU objects.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { message: msg.into() }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "backend error: {}", self.message)
    }
}

impl std::error::Error for BackendError {}

/// Contract violations reported by `RenderManager`.
///
/// All variants are synchronous and not retryable: they point at a resource
/// lifetime or frame-ordering bug in the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// A setup references a mesh or program id that is not live.
    DependencyNotFound { kind: ResourceType, id: ResourceId },
    /// The selection mask matches no compiled variant of the program.
    InvalidVariant { program: ResourceId, mask: u32 },
    /// The id is null, released, or was never issued by this manager.
    InvalidHandle { id: ResourceId, op: &'static str },
    /// A frame-scoped operation was called in the wrong frame state.
    FrameBoundaryViolation { op: &'static str, state: FrameState },
    /// `draw` was asked for a primitive group the bound mesh does not have.
    PrimitiveGroupOutOfRange { mesh: ResourceId, index: usize, count: usize },
    /// The uniform block does not fit the bound program's declared block.
    InvalidUniformBlock { program: ResourceId, size: usize, capacity: u64 },
    /// A mesh or program setup is internally inconsistent.
    InvalidSetup { kind: ResourceType, reason: String },
    /// The pool for `kind` has no free slot.
    PoolExhausted { kind: ResourceType, capacity: usize },
    Backend(BackendError),
}

pub type Result<T> = std::result::Result<T, RenderError>;

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::DependencyNotFound { kind, id } => {
                write!(f, "{kind} dependency {id} is not a live {kind}")
            }
            RenderError::InvalidVariant { program, mask } => {
                write!(f, "program {program} has no variant for selection mask {mask:#x}")
            }
            RenderError::InvalidHandle { id, op } => {
                write!(f, "{op}: {id} does not refer to a live resource")
            }
            RenderError::FrameBoundaryViolation { op, state } => {
                write!(f, "{op} is not allowed while {state}")
            }
            RenderError::PrimitiveGroupOutOfRange { mesh, index, count } => {
                write!(f, "primitive group {index} out of range for {mesh} ({count} groups)")
            }
            RenderError::InvalidUniformBlock { program, size, capacity } => {
                write!(
                    f,
                    "uniform block of {size} bytes does not fit {program} ({capacity} bytes declared)"
                )
            }
            RenderError::InvalidSetup { kind, reason } => write!(f, "invalid {kind} setup: {reason}"),
            RenderError::PoolExhausted { kind, capacity } => {
                write!(f, "{kind} pool exhausted ({capacity} live resources)")
            }
            RenderError::Backend(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Backend(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BackendError> for RenderError {
    fn from(err: BackendError) -> Self {
        RenderError::Backend(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_handle() {
        let err = RenderError::InvalidHandle {
            id: ResourceId::INVALID,
            op: "apply_draw_state",
        };
        assert_eq!(err.to_string(), "apply_draw_state: invalid-id does not refer to a live resource");
    }

    #[test]
    fn frame_violation_names_state() {
        let err = RenderError::FrameBoundaryViolation {
            op: "draw",
            state: FrameState::OutsideFrame,
        };
        assert_eq!(err.to_string(), "draw is not allowed while outside a frame");
    }

    #[test]
    fn backend_errors_convert() {
        let err: RenderError = BackendError::new("boom").into();
        assert!(matches!(err, RenderError::Backend(_)));
        assert_eq!(err.to_string(), "backend error: boom");
    }
}
