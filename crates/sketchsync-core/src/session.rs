//! Editing session: routes pointer gestures and inbound messages through the
//! document, the undo stack and the sync protocol.

use crate::config::SessionConfig;
use crate::document::Document;
use crate::protocol::{MessageKind, OutboundMessage, ProtocolError, RemoteEvent, SyncProtocol};
use crate::selection::{Corner, DragState};
use crate::shapes::{Shape, ShapeError, ShapeId, shape_id};
use crate::tools::{self, ActiveTool, ToolKind, ToolStyle};
use crate::undo::{UndoAction, UndoError, UndoStack};
use kurbo::Point;
use std::collections::HashSet;
use thiserror::Error;

/// Errors raised by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("A gesture is already in progress")]
    GestureInProgress,
    #[error("Shape not found: {0}")]
    ShapeNotFound(ShapeId),
    #[error("Shape {0} cannot be selected")]
    NotSelectable(ShapeId),
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error(transparent)]
    Undo(#[from] UndoError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// One client's editing state.
///
/// At most one creation gesture and one drag are in flight at a time; both
/// end only on pointer release.
#[derive(Debug)]
pub struct EditorSession {
    config: SessionConfig,
    /// Counter for the next shape id.
    counter: u64,
    tool: ToolKind,
    document: Document,
    undo: UndoStack,
    sync: SyncProtocol,
    /// Shapes that respond to pointer presses.
    selectable: HashSet<ShapeId>,
    active_tool: Option<ActiveTool>,
    drag: Option<DragState>,
}

impl EditorSession {
    pub fn new(config: SessionConfig) -> Self {
        let sync = SyncProtocol::new(config.author.clone(), config.channel.clone());
        let undo = UndoStack::new(config.undo_change);
        log::info!("Session for {} on channel {}", config.author, config.channel);
        Self {
            config,
            counter: 0,
            tool: ToolKind::default(),
            document: Document::new(),
            undo,
            sync,
            selectable: HashSet::new(),
            active_tool: None,
            drag: None,
        }
    }

    /// Start from an existing document; its shapes become selectable.
    pub fn with_document(config: SessionConfig, document: Document) -> Self {
        let mut session = Self::new(config);
        session.selectable = document
            .shapes()
            .iter()
            .map(|s| s.id().to_string())
            .collect();
        session.document = document;
        session
    }

    pub fn author(&self) -> &str {
        &self.config.author
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn undo_stack(&self) -> &UndoStack {
        &self.undo
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tool = tool;
    }

    pub fn set_stroke(&mut self, color: impl Into<String>) {
        self.config.stroke = color.into();
    }

    pub fn set_fill(&mut self, color: impl Into<String>) {
        self.config.fill = color.into();
    }

    pub fn set_stroke_width(&mut self, width: f64) {
        self.config.stroke_width = width;
    }

    /// Whether pressing on the shape starts a drag.
    pub fn is_selectable(&self, id: &str) -> bool {
        self.selectable.contains(id) && !self.document.is_excluded(id)
    }

    pub fn is_creating(&self) -> bool {
        self.active_tool.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    fn next_id(&mut self) -> ShapeId {
        let id = shape_id(&self.config.author, self.counter);
        self.counter += 1;
        id
    }

    fn tool_style(&self) -> ToolStyle {
        ToolStyle {
            stroke: self.config.stroke.clone(),
            fill: self.config.fill.clone(),
            stroke_width: self.config.stroke_width,
            linecap: self.config.linecap,
        }
    }

    /// Pointer pressed on the canvas. Creation tools add a new shape and
    /// return its id.
    pub fn pointer_down(&mut self, point: Point) -> Result<Option<ShapeId>, SessionError> {
        if self.active_tool.is_some() {
            return Err(SessionError::GestureInProgress);
        }
        if !self.tool.creates_shapes() {
            return Ok(None);
        }

        let id = self.next_id();
        let style = self.tool_style();
        let Some(shape) = tools::begin_shape(self.tool, id.clone(), point, &style, &self.config.text)
        else {
            return Ok(None);
        };
        self.document.push(shape);
        self.active_tool = Some(ActiveTool {
            tool: self.tool,
            shape_id: id.clone(),
            start: point,
        });
        log::debug!("Started {:?} gesture for {}", self.tool, id);
        Ok(Some(id))
    }

    /// Pointer pressed on a shape. With the select tool this starts moving
    /// it; returns whether a drag started.
    pub fn pointer_down_on_shape(&mut self, id: &str, point: Point) -> Result<bool, SessionError> {
        if self.tool != ToolKind::Select {
            return Ok(false);
        }
        let shape = self.drag_target(id)?;
        let drag = DragState::begin_move(shape, point)?;
        self.drag = Some(drag);
        Ok(true)
    }

    /// Pointer pressed on a corner handle of a shape's border. The opposite
    /// corner stays fixed while the pointer moves.
    pub fn pointer_down_on_handle(
        &mut self,
        id: &str,
        corner: Corner,
        _point: Point,
    ) -> Result<bool, SessionError> {
        if self.tool != ToolKind::Select {
            return Ok(false);
        }
        let shape = self.drag_target(id)?;
        let drag = DragState::begin_resize(shape, corner)?;
        self.drag = Some(drag);
        Ok(true)
    }

    fn drag_target(&self, id: &str) -> Result<&Shape, SessionError> {
        if self.drag.is_some() {
            return Err(SessionError::GestureInProgress);
        }
        let shape = self
            .document
            .get(id)
            .ok_or_else(|| SessionError::ShapeNotFound(id.to_string()))?;
        if !self.is_selectable(id) {
            return Err(SessionError::NotSelectable(id.to_string()));
        }
        Ok(shape)
    }

    /// Pointer moved: grow the shape being created and move the dragged one.
    pub fn pointer_move(&mut self, point: Point) -> Result<(), SessionError> {
        if let Some(active) = &self.active_tool {
            match self.document.get_mut(&active.shape_id) {
                Some(shape) => tools::extend_shape(active, shape, point),
                None => log::debug!("Shape {} vanished during creation", active.shape_id),
            }
        }
        if let Some(drag) = &self.drag {
            match self.document.get_mut(&drag.shape_id) {
                Some(shape) => drag.update(shape, point)?,
                None => log::debug!("Shape {} vanished during drag", drag.shape_id),
            }
        }
        Ok(())
    }

    /// Pointer released: commit the finished creation as `new` and the
    /// finished drag as `change`.
    pub fn pointer_up(&mut self) -> Result<(), SessionError> {
        if let Some(active) = self.active_tool.take() {
            if self.document.contains(&active.shape_id) {
                self.undo.add_change(
                    &mut self.document,
                    &mut self.sync,
                    UndoAction::New,
                    &active.shape_id,
                    Some(active.tool),
                    None,
                )?;
                self.selectable.insert(active.shape_id);
            }
        }
        if let Some(drag) = self.drag.take() {
            if self.document.contains(&drag.shape_id)
                && !self.document.is_excluded(&drag.shape_id)
            {
                self.undo.add_change(
                    &mut self.document,
                    &mut self.sync,
                    UndoAction::Change,
                    &drag.shape_id,
                    None,
                    Some(drag.before),
                )?;
            }
        }
        Ok(())
    }

    /// Apply `edit` to a shape outside of a pointer gesture and commit it as
    /// a `change`. Returns false if the edit left the shape as it was.
    pub fn edit_shape<F>(&mut self, id: &str, edit: F) -> Result<bool, SessionError>
    where
        F: FnOnce(&mut Shape),
    {
        if self.drag.as_ref().is_some_and(|d| d.shape_id == id) {
            return Err(SessionError::GestureInProgress);
        }
        if self.document.is_excluded(id) {
            return Err(SessionError::NotSelectable(id.to_string()));
        }
        let shape = self
            .document
            .get_mut(id)
            .ok_or_else(|| SessionError::ShapeNotFound(id.to_string()))?;
        shape.take_change();
        let before = shape.clone();
        edit(shape);
        // Path data and transforms notify; other attributes are compared.
        let changed = shape.take_change() || *shape != before;
        if !changed {
            return Ok(false);
        }
        self.undo.add_change(
            &mut self.document,
            &mut self.sync,
            UndoAction::Change,
            id,
            None,
            Some(before),
        )?;
        Ok(true)
    }

    /// Undo the last local action. A drag on a shape the undo hides ends
    /// without committing.
    pub fn undo(&mut self) -> bool {
        if !self.undo.undo(&mut self.document, &mut self.sync) {
            return false;
        }
        if let Some(drag) = &self.drag {
            if self.document.is_excluded(&drag.shape_id) {
                log::debug!("Dragged shape {} hidden by undo", drag.shape_id);
                self.drag = None;
            }
        }
        true
    }

    pub fn redo(&mut self) -> bool {
        self.undo.redo(&mut self.document, &mut self.sync)
    }

    /// Apply an inbound message delivered under the event name `kind`.
    pub fn receive(&mut self, kind: MessageKind, payload: &str) -> Option<RemoteEvent> {
        let event = self.sync.receive(&mut self.document, kind, payload)?;
        match &event {
            RemoteEvent::Created(id) | RemoteEvent::Changed(id) => {
                self.selectable.insert(id.clone());
            }
            RemoteEvent::Deleted(id) => {
                self.selectable.remove(id);
                if self.drag.as_ref().is_some_and(|d| &d.shape_id == id) {
                    log::debug!("Dragged shape {} deleted remotely", id);
                    self.drag = None;
                }
            }
        }
        Some(event)
    }

    /// Like [`EditorSession::receive`], with the event name as text.
    pub fn receive_named(&mut self, kind: &str, payload: &str) -> Result<Option<RemoteEvent>, SessionError> {
        let kind = kind.parse::<MessageKind>()?;
        Ok(self.receive(kind, payload))
    }

    /// Take pending outgoing messages (drains the queue).
    pub fn take_outgoing(&mut self) -> Vec<OutboundMessage> {
        self.sync.take_outgoing()
    }

    pub fn has_outgoing(&self) -> bool {
        self.sync.has_outgoing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UndoChangePolicy;
    use crate::protocol::Envelope;
    use crate::shapes::Rectangle;
    use crate::svg;
    use kurbo::Rect;

    fn session(author: &str) -> EditorSession {
        EditorSession::new(SessionConfig::new(author))
    }

    #[test]
    fn test_ids_count_from_zero() {
        let mut s = session("alice");
        s.set_tool(ToolKind::Rectangle);
        assert_eq!(s.pointer_down(Point::new(1.0, 1.0)).unwrap().as_deref(), Some("alice_shape_0"));
        s.pointer_up().unwrap();
        assert_eq!(s.pointer_down(Point::new(2.0, 2.0)).unwrap().as_deref(), Some("alice_shape_1"));
    }

    #[test]
    fn test_select_tool_creates_nothing() {
        let mut s = session("alice");
        assert_eq!(s.pointer_down(Point::new(1.0, 1.0)).unwrap(), None);
        s.pointer_up().unwrap();
        assert!(s.document().is_empty());
        assert!(!s.has_outgoing());
    }

    #[test]
    fn test_creation_commits_new_on_release() {
        let mut s = session("alice");
        s.set_tool(ToolKind::Rectangle);
        let id = s.pointer_down(Point::new(10.0, 10.0)).unwrap().unwrap();
        s.pointer_move(Point::new(30.0, 25.0)).unwrap();
        assert!(!s.has_outgoing());
        assert!(!s.is_selectable(&id));

        s.pointer_up().unwrap();
        let out = s.take_outgoing();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, MessageKind::New);
        assert_eq!(out[0].channel, "img_0");
        assert!(s.is_selectable(&id));
        assert_eq!(s.undo_stack().len(), 1);
        assert_eq!(
            s.document().get(&id).unwrap().border(),
            Some(Rect::new(10.0, 10.0, 30.0, 25.0))
        );
    }

    #[test]
    fn test_second_creation_is_rejected() {
        let mut s = session("alice");
        s.set_tool(ToolKind::Ellipse);
        s.pointer_down(Point::new(10.0, 10.0)).unwrap();
        assert!(matches!(
            s.pointer_down(Point::new(20.0, 20.0)),
            Err(SessionError::GestureInProgress)
        ));
        assert_eq!(s.document().len(), 1);
    }

    #[test]
    fn test_move_drag_commits_change() {
        let mut s = session("alice");
        s.set_tool(ToolKind::Rectangle);
        let id = s.pointer_down(Point::new(10.0, 10.0)).unwrap().unwrap();
        s.pointer_move(Point::new(20.0, 20.0)).unwrap();
        s.pointer_up().unwrap();
        s.take_outgoing();

        s.set_tool(ToolKind::Select);
        assert!(s.pointer_down_on_shape(&id, Point::new(12.0, 12.0)).unwrap());
        assert!(matches!(
            s.pointer_down_on_shape(&id, Point::new(12.0, 12.0)),
            Err(SessionError::GestureInProgress)
        ));
        s.pointer_move(Point::new(52.0, 32.0)).unwrap();
        s.pointer_up().unwrap();

        assert_eq!(
            s.document().get(&id).unwrap().border(),
            Some(Rect::new(50.0, 30.0, 60.0, 40.0))
        );
        let out = s.take_outgoing();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, MessageKind::Change);
        assert!(!s.is_dragging());
    }

    #[test]
    fn test_drag_requires_select_tool_and_handler() {
        let mut s = session("alice");
        s.set_tool(ToolKind::Rectangle);
        let id = s.pointer_down(Point::new(0.0, 0.0)).unwrap().unwrap();
        assert!(!s.pointer_down_on_shape(&id, Point::ZERO).unwrap());

        s.set_tool(ToolKind::Select);
        assert!(matches!(
            s.pointer_down_on_shape(&id, Point::ZERO),
            Err(SessionError::NotSelectable(_))
        ));
        assert!(matches!(
            s.pointer_down_on_shape("missing", Point::ZERO),
            Err(SessionError::ShapeNotFound(_))
        ));
    }

    #[test]
    fn test_text_cannot_be_dragged() {
        let mut s = session("alice");
        s.set_tool(ToolKind::Text);
        let id = s.pointer_down(Point::new(5.0, 5.0)).unwrap().unwrap();
        s.pointer_up().unwrap();
        s.set_tool(ToolKind::Select);
        assert!(matches!(
            s.pointer_down_on_shape(&id, Point::new(5.0, 5.0)),
            Err(SessionError::Shape(ShapeError::BorderUnsupported(_)))
        ));
    }

    #[test]
    fn test_undone_shape_is_not_selectable() {
        let mut s = session("alice");
        s.set_tool(ToolKind::Line);
        let id = s.pointer_down(Point::new(0.0, 0.0)).unwrap().unwrap();
        s.pointer_move(Point::new(10.0, 10.0)).unwrap();
        s.pointer_up().unwrap();
        assert!(s.undo());
        assert!(!s.is_selectable(&id));
        assert!(s.redo());
        assert!(s.is_selectable(&id));
    }

    #[test]
    fn test_undo_during_drag_keeps_shape_recoverable() {
        let mut s = session("alice");
        s.set_tool(ToolKind::Rectangle);
        let id = s.pointer_down(Point::new(0.0, 0.0)).unwrap().unwrap();
        s.pointer_move(Point::new(10.0, 10.0)).unwrap();
        s.pointer_up().unwrap();

        s.set_tool(ToolKind::Select);
        s.pointer_down_on_shape(&id, Point::new(5.0, 5.0)).unwrap();
        assert!(s.undo());
        assert!(!s.is_dragging());
        s.pointer_move(Point::new(50.0, 50.0)).unwrap();
        s.pointer_up().unwrap();

        let kinds: Vec<MessageKind> = s.take_outgoing().iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec![MessageKind::New, MessageKind::Delete]);
        assert_eq!(s.undo_stack().len(), 1);
        assert!(s.undo_stack().can_redo());

        assert!(s.redo());
        assert!(!s.document().is_excluded(&id));
        assert_eq!(
            s.document().get(&id).unwrap().border(),
            Some(Rect::new(0.0, 0.0, 10.0, 10.0))
        );
    }

    #[test]
    fn test_edit_shape_commits_path_change() {
        let mut s = session("alice");
        s.set_tool(ToolKind::Pen);
        let id = s.pointer_down(Point::new(1.0, 1.0)).unwrap().unwrap();
        s.pointer_move(Point::new(5.0, 1.0)).unwrap();
        s.pointer_up().unwrap();
        s.take_outgoing();

        let extend = |shape: &mut Shape| {
            if let Shape::Path(path) = shape {
                path.data_mut().line_to(5.0, 9.0, false);
            }
        };
        assert!(s.edit_shape(&id, extend).unwrap());
        let out = s.take_outgoing();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, MessageKind::Change);
        assert!(Envelope::from_json(&out[0].payload).unwrap().data().contains("d=\"M1,1H5V9\""));
        assert_eq!(s.undo_stack().len(), 2);

        // Drawing to the current pen position is not an edit.
        assert!(!s.edit_shape(&id, extend).unwrap());
        assert!(!s.has_outgoing());
    }

    #[test]
    fn test_edit_shape_commits_attribute_change() {
        let mut s = EditorSession::with_document(
            SessionConfig::new("alice"),
            Document::from_svg(
                r#"<svg xmlns="http://www.w3.org/2000/svg"><rect id="bob_shape_0" width="4" height="4"/></svg>"#,
            )
            .unwrap(),
        );
        assert!(s.is_selectable("bob_shape_0"));
        assert!(
            s.edit_shape("bob_shape_0", |shape| {
                if let Some(fill) = shape.as_fill_mut() {
                    fill.set_fill(Some("red".into()));
                }
            })
            .unwrap()
        );
        assert_eq!(s.take_outgoing()[0].kind, MessageKind::Change);
        assert!(matches!(
            s.edit_shape("missing", |_| {}),
            Err(SessionError::ShapeNotFound(_))
        ));
    }

    #[test]
    fn test_resize_by_handle() {
        let mut s = session("alice");
        s.set_tool(ToolKind::Rectangle);
        let id = s.pointer_down(Point::new(10.0, 10.0)).unwrap().unwrap();
        s.pointer_up().unwrap();

        s.set_tool(ToolKind::Select);
        s.pointer_down_on_handle(&id, Corner::BottomRight, Point::new(10.0, 10.0))
            .unwrap();
        s.pointer_move(Point::new(60.0, 40.0)).unwrap();
        s.pointer_up().unwrap();
        assert_eq!(
            s.document().get(&id).unwrap().border(),
            Some(Rect::new(10.0, 10.0, 60.0, 40.0))
        );
    }

    #[test]
    fn test_receive_attaches_and_detaches_handlers() {
        let mut s = session("bob");
        let markup = svg::write_shape(&Shape::Rect(Rectangle::new(
            "alice_shape_0".into(),
            0.0,
            0.0,
            5.0,
            5.0,
        )));
        let payload = Envelope("alice".into(), markup).to_json().unwrap();
        assert_eq!(
            s.receive(MessageKind::New, &payload),
            Some(RemoteEvent::Created("alice_shape_0".into()))
        );
        assert!(s.is_selectable("alice_shape_0"));

        let payload = Envelope("alice".into(), "alice_shape_0".into()).to_json().unwrap();
        assert_eq!(
            s.receive_named("delete", &payload).unwrap(),
            Some(RemoteEvent::Deleted("alice_shape_0".into()))
        );
        assert!(!s.is_selectable("alice_shape_0"));
        assert!(s.document().is_empty());
        assert!(matches!(
            s.receive_named("rename", &payload),
            Err(SessionError::Protocol(_))
        ));
    }

    #[test]
    fn test_restore_policy_undoes_drag() {
        let mut config = SessionConfig::new("alice");
        config.undo_change = UndoChangePolicy::Restore;
        let mut s = EditorSession::new(config);
        s.set_tool(ToolKind::Rectangle);
        let id = s.pointer_down(Point::new(0.0, 0.0)).unwrap().unwrap();
        s.pointer_move(Point::new(10.0, 10.0)).unwrap();
        s.pointer_up().unwrap();

        s.set_tool(ToolKind::Select);
        s.pointer_down_on_shape(&id, Point::new(5.0, 5.0)).unwrap();
        s.pointer_move(Point::new(105.0, 5.0)).unwrap();
        s.pointer_up().unwrap();
        s.take_outgoing();

        assert!(s.undo());
        assert_eq!(
            s.document().get(&id).unwrap().border(),
            Some(Rect::new(0.0, 0.0, 10.0, 10.0))
        );
        assert_eq!(s.take_outgoing()[0].kind, MessageKind::Change);
    }
}
