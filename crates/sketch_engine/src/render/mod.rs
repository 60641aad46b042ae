//! Rendering interface
//!
//! Shape commands and the canvas trait the host implements. The engine
//! only decides what is drawn and in which order.

pub mod canvas;
pub mod commands;

pub use canvas::{Canvas, CanvasOp, NullCanvas, RecordingCanvas};
pub use commands::{Color, DrawCommand};
