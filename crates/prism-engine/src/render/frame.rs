use std::fmt;

use super::error::{RenderError, Result};

/// Frame-boundary state machine.
///
/// `OutsideFrame --begin--> InsideFrame --end--> OutsideFrame`. Draw-state
/// application, clears, uniform uploads and draws are only accepted inside.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum FrameState {
    #[default]
    OutsideFrame,
    InsideFrame,
}

impl FrameState {
    #[inline]
    pub fn is_inside(self) -> bool {
        self == FrameState::InsideFrame
    }

    pub(crate) fn require_inside(self, op: &'static str) -> Result<()> {
        match self {
            FrameState::InsideFrame => Ok(()),
            FrameState::OutsideFrame => Err(RenderError::FrameBoundaryViolation { op, state: self }),
        }
    }

    pub(crate) fn require_outside(self, op: &'static str) -> Result<()> {
        match self {
            FrameState::OutsideFrame => Ok(()),
            FrameState::InsideFrame => Err(RenderError::FrameBoundaryViolation { op, state: self }),
        }
    }
}

impl fmt::Display for FrameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameState::OutsideFrame => f.write_str("outside a frame"),
            FrameState::InsideFrame => f.write_str("inside a frame"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_outside() {
        assert_eq!(FrameState::default(), FrameState::OutsideFrame);
    }

    #[test]
    fn guards() {
        assert!(FrameState::InsideFrame.require_inside("draw").is_ok());
        assert!(FrameState::OutsideFrame.require_outside("begin_frame").is_ok());
        assert!(matches!(
            FrameState::OutsideFrame.require_inside("draw"),
            Err(RenderError::FrameBoundaryViolation { op: "draw", .. })
        ));
        assert!(matches!(
            FrameState::InsideFrame.require_outside("begin_frame"),
            Err(RenderError::FrameBoundaryViolation { op: "begin_frame", .. })
        ));
    }
}
