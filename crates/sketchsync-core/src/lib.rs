//! SketchSync Core Library
//!
//! Shared vector scene, undo history and sync protocol for collaborative
//! sketching over a publish/subscribe channel.

pub mod config;
pub mod document;
mod number;
pub mod path_data;
pub mod protocol;
pub mod selection;
pub mod session;
pub mod shapes;
pub mod svg;
pub mod tools;
pub mod transform;
pub mod undo;

pub use config::{ConfigError, SessionConfig, UndoChangePolicy};
pub use document::Document;
pub use path_data::{CommandKind, PathCommand, PathData, PathParseError};
pub use protocol::{Envelope, MessageKind, OutboundMessage, ProtocolError, RemoteEvent, SyncProtocol};
pub use selection::{Corner, DragState};
pub use session::{EditorSession, SessionError};
pub use shapes::{Shape, ShapeError, ShapeId, ShapeKind};
pub use tools::ToolKind;
pub use transform::{MatrixMode, Transform, TransformParseError};
pub use undo::{UndoAction, UndoError, UndoStack};
