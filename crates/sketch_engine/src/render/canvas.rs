//! Canvas abstraction
//!
//! The engine never rasterizes anything itself. Scenes and viewers talk to
//! a [`Canvas`] supplied by the host, which owns the drawing surface and a
//! push/pop transform stack.

use super::commands::{Color, DrawCommand};
use crate::foundation::math::{vec2, Vec2};

/// 2D drawing surface with a transform stack
pub trait Canvas {
    /// Size of the visible area in pixels
    fn size(&self) -> Vec2;

    /// Save the current transform
    fn push(&mut self);

    /// Restore the transform saved by the matching `push`
    fn pop(&mut self);

    /// Move the origin by `offset`
    fn translate(&mut self, offset: Vec2);

    /// Clear the surface with a color
    fn background(&mut self, color: Color);

    /// Draw one shape under the current transform
    fn draw(&mut self, command: DrawCommand);
}

/// One call made on a [`RecordingCanvas`]
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasOp {
    /// `push`
    Push,
    /// `pop`
    Pop,
    /// `translate`
    Translate(Vec2),
    /// `background`
    Background(Color),
    /// `draw`, with the offset that was active at the time
    Draw {
        /// Accumulated translation when the command was issued
        offset: Vec2,
        /// The command itself
        command: DrawCommand,
    },
}

/// Canvas that records every call, used headless and in tests
#[derive(Debug, Clone)]
pub struct RecordingCanvas {
    size: Vec2,
    offset: Vec2,
    stack: Vec<Vec2>,
    ops: Vec<CanvasOp>,
}

impl RecordingCanvas {
    /// Create a recording canvas of the given size
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: vec2(width, height),
            offset: Vec2::zeros(),
            stack: Vec::new(),
            ops: Vec::new(),
        }
    }

    /// Every call recorded so far
    pub fn ops(&self) -> &[CanvasOp] {
        &self.ops
    }

    /// Only the draw commands, in order
    pub fn draws(&self) -> impl Iterator<Item = &DrawCommand> {
        self.ops.iter().filter_map(|op| match op {
            CanvasOp::Draw { command, .. } => Some(command),
            _ => None,
        })
    }

    /// Number of draw commands recorded
    pub fn draw_count(&self) -> usize {
        self.draws().count()
    }

    /// Current accumulated translation
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Depth of the transform stack
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Forget the recorded calls, typically once per frame
    pub fn clear(&mut self) {
        self.ops.clear();
    }
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn push(&mut self) {
        self.stack.push(self.offset);
        self.ops.push(CanvasOp::Push);
    }

    fn pop(&mut self) {
        match self.stack.pop() {
            Some(offset) => self.offset = offset,
            None => log::warn!("Canvas pop without a matching push"),
        }
        self.ops.push(CanvasOp::Pop);
    }

    fn translate(&mut self, offset: Vec2) {
        self.offset += offset;
        self.ops.push(CanvasOp::Translate(offset));
    }

    fn background(&mut self, color: Color) {
        self.ops.push(CanvasOp::Background(color));
    }

    fn draw(&mut self, command: DrawCommand) {
        self.ops.push(CanvasOp::Draw {
            offset: self.offset,
            command,
        });
    }
}

/// Canvas that discards everything
#[derive(Debug, Clone, Copy)]
pub struct NullCanvas {
    size: Vec2,
}

impl NullCanvas {
    /// Create a null canvas reporting the given size
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: vec2(width, height),
        }
    }
}

impl Canvas for NullCanvas {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn push(&mut self) {}

    fn pop(&mut self) {}

    fn translate(&mut self, _offset: Vec2) {}

    fn background(&mut self, _color: Color) {}

    fn draw(&mut self, _command: DrawCommand) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_restores_offset() {
        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        canvas.push();
        canvas.translate(vec2(10.0, 5.0));
        canvas.draw(DrawCommand::circle(Vec2::zeros(), 1.0, Color::WHITE));
        canvas.pop();
        canvas.draw(DrawCommand::circle(Vec2::zeros(), 1.0, Color::WHITE));

        let offsets: Vec<Vec2> = canvas
            .ops()
            .iter()
            .filter_map(|op| match op {
                CanvasOp::Draw { offset, .. } => Some(*offset),
                _ => None,
            })
            .collect();
        assert_eq!(offsets, vec![vec2(10.0, 5.0), Vec2::zeros()]);
        assert_eq!(canvas.stack_depth(), 0);
    }

    #[test]
    fn test_unbalanced_pop_is_harmless() {
        let mut canvas = RecordingCanvas::new(10.0, 10.0);
        canvas.translate(vec2(1.0, 1.0));
        canvas.pop();
        assert_eq!(canvas.offset(), vec2(1.0, 1.0));
    }
}
