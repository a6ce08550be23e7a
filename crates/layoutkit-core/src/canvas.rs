//! Canvas document and editor session.
//!
//! [`Document`] is the layout itself: an optional background template plus
//! one registry per shape variant. [`Editor`] wraps a document with
//! everything an interactive session needs (camera, interaction mode, the
//! shape controller, alignment guides, auto-pan and selection) and reports
//! what changed through [`EditorEvent`]s the host drains after each call.

use crate::alignment::{AlignmentCandidates, AlignmentEngine, Guide};
use crate::autopan::AutoPan;
use crate::camera::Camera;
use crate::config::EditorConfig;
use crate::controller::{GeometryChange, ShapeController};
use crate::error::{LayoutError, LayoutResult};
use crate::export::{ImportedLayout, LayoutExport, export_layout, import_layout};
use crate::fonts::{FontCache, FontResolver};
use crate::grid::quantize_point;
use crate::handles::CursorHint;
use crate::input::{MouseButton, PointerEvent, PointerState};
use crate::registry::NameRegistry;
use crate::shapes::{
    ApproximateMetrics, BoxFields, BoxShape, LabelFields, LabelShape, ShapeKind, ShapeRef,
    ShapeTrait, TextMetrics, Typography,
};
use crate::storage::{ExportPaths, FileStorage, Storage};
use crate::tools::{InteractionMode, ToolManager};
use chrono::NaiveDateTime;
use indexmap::IndexMap;
use kurbo::{Point, Rect, Size};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Template image the layout is drawn over.
#[derive(Debug, Clone, PartialEq)]
pub struct Background {
    pub path: PathBuf,
    /// Pixel size of the image; the scene has the same extent.
    pub size: Size,
}

/// Plain-data view of a document, keyed by shape name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSnapshot {
    pub background: Option<PathBuf>,
    pub boxes: IndexMap<String, BoxFields>,
    pub labels: IndexMap<String, LabelFields>,
}

impl DocumentSnapshot {
    pub fn to_json(&self) -> LayoutResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| LayoutError::Encode(format!("Snapshot encoding failed: {}", e)))
    }
}

/// A layout document.
#[derive(Debug, Clone)]
pub struct Document {
    pub background: Option<Background>,
    pub boxes: NameRegistry<BoxShape>,
    pub labels: NameRegistry<LabelShape>,
    placeholder: Size,
}

impl Document {
    /// Create a new empty document.
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            background: None,
            boxes: NameRegistry::new(),
            labels: NameRegistry::new(),
            placeholder: config.placeholder_size,
        }
    }

    /// Scene extent: the background image, or the placeholder size.
    pub fn scene_rect(&self) -> Rect {
        let size = self
            .background
            .as_ref()
            .map(|bg| bg.size)
            .unwrap_or(self.placeholder);
        Rect::from_origin_size(Point::ZERO, size)
    }

    /// All shapes, boxes first, each registry in insertion order.
    pub fn shapes(&self) -> impl Iterator<Item = &dyn ShapeTrait> {
        self.boxes
            .iter()
            .map(|(_, b)| b as &dyn ShapeTrait)
            .chain(self.labels.iter().map(|(_, l)| l as &dyn ShapeTrait))
    }

    /// Get a shape by reference.
    pub fn shape(&self, target: ShapeRef) -> Option<&dyn ShapeTrait> {
        match target.kind {
            ShapeKind::Box => self.boxes.find_by_id(target.id).map(|b| b as &dyn ShapeTrait),
            ShapeKind::Label => self.labels.find_by_id(target.id).map(|l| l as &dyn ShapeTrait),
        }
    }

    /// Current registry name of a shape.
    pub fn name_of(&self, target: ShapeRef) -> Option<String> {
        self.shape(target).map(|s| s.name().to_string())
    }

    /// Whether a box or a label is stored under `name`.
    pub fn contains_name(&self, name: &str) -> bool {
        self.boxes.contains(name) || self.labels.contains(name)
    }

    /// Empty both registries.
    pub fn clear(&mut self) {
        self.boxes.clear();
        self.labels.clear();
    }

    pub fn len(&self) -> usize {
        self.boxes.len() + self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty() && self.labels.is_empty()
    }

    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            background: self.background.as_ref().map(|bg| bg.path.clone()),
            boxes: self.boxes.snapshot(),
            labels: self.labels.snapshot(),
        }
    }

    /// Export snapshot, named after the background when there is one.
    pub fn export(&self, timestamp: NaiveDateTime) -> LayoutExport {
        let template = self.background.as_ref().map(|bg| bg.path.as_path());
        export_layout(&self.boxes, &self.labels, template, timestamp)
    }

    /// Replace both registries with imported shapes, keeping stored names.
    fn replace_with(&mut self, imported: ImportedLayout) {
        self.clear();
        for entry in imported.boxes {
            self.boxes
                .add(BoxShape::new(entry.rect, entry.typography), Some(entry.name.as_str()));
        }
        for entry in imported.labels {
            let mut label = LabelShape::new(entry.position, entry.typography);
            label.fill = entry.fill;
            self.labels.add(label, Some(entry.name.as_str()));
        }
    }
}

/// Change notifications drained by the host with [`Editor::take_events`].
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// A registry gained, lost or renamed an entry.
    ListChanged(ShapeKind),
    /// Geometry, typography, text or visibility of a shape changed.
    ShapeChanged(ShapeRef),
    SelectionChanged(Option<ShapeRef>),
    ModeChanged(InteractionMode),
    /// A requested name was already used by a box or a label; the shape was
    /// stored under `assigned`.
    DuplicateName { requested: String, assigned: String },
    /// The whole document was replaced by an import.
    DocumentReplaced,
}

/// Name and typography applied to the next created shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeRequest {
    /// `None` asks for an auto-generated name.
    pub name: Option<String>,
    pub typography: Typography,
}

impl ShapeRequest {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            name: None,
            typography: Typography::new(config.default_font.clone(), config.default_font_size),
        }
    }

    /// Set the name from a header selector value; `AUTO` or blank means
    /// auto-naming.
    pub fn select_name(&mut self, selector: &str) {
        let selector = selector.trim();
        self.name = if selector.is_empty() || selector.eq_ignore_ascii_case("AUTO") {
            None
        } else {
            Some(selector.to_string())
        };
    }
}

/// Interactive editing session over one document.
pub struct Editor {
    config: EditorConfig,
    pub document: Document,
    pub camera: Camera,
    /// Name and font used for the next created shape.
    pub request: ShapeRequest,
    tools: ToolManager,
    alignment: AlignmentEngine,
    controller: ShapeController,
    autopan: AutoPan,
    pointer: PointerState,
    panning: bool,
    selection: Option<ShapeRef>,
    fonts: FontResolver,
    font_cache: FontCache,
    metrics: Box<dyn TextMetrics>,
    events: Vec<EditorEvent>,
}

impl Editor {
    /// Create a session with approximate text metrics.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_metrics(config, Box::new(ApproximateMetrics))
    }

    pub fn with_metrics(config: EditorConfig, metrics: Box<dyn TextMetrics>) -> Self {
        let document = Document::new(&config);
        let mut camera = Camera::new(config.zoom.clone());
        camera.reset(document.scene_rect());

        Self {
            request: ShapeRequest::from_config(&config),
            tools: ToolManager::new(),
            alignment: AlignmentEngine::new(config.snap_threshold),
            controller: ShapeController::new(&config),
            autopan: AutoPan::new(config.autopan.clone()),
            pointer: PointerState::new(),
            panning: false,
            selection: None,
            fonts: FontResolver::new(config.fonts_dir.clone()),
            font_cache: FontCache::new(),
            metrics,
            events: Vec::new(),
            document,
            camera,
            config,
        }
    }

    /// Use a font cache shared with other sessions.
    pub fn with_font_cache(mut self, cache: FontCache) -> Self {
        self.font_cache = cache;
        self
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn font_cache(&self) -> &FontCache {
        &self.font_cache
    }

    /// Font files offered for new shapes.
    pub fn available_fonts(&self) -> Vec<String> {
        self.fonts.available_fonts()
    }

    pub fn mode(&self) -> InteractionMode {
        self.tools.mode()
    }

    pub fn selection(&self) -> Option<ShapeRef> {
        self.selection
    }

    /// Guide lines to draw for the current gesture.
    pub fn guides(&self) -> &[Guide] {
        self.alignment.guides()
    }

    /// Temporary rectangle of a box being drawn.
    pub fn preview_rect(&self) -> Option<Rect> {
        self.tools.preview_rect()
    }

    pub fn is_gesture_active(&self) -> bool {
        self.tools.is_active() || self.controller.is_dragging()
    }

    pub fn is_auto_panning(&self) -> bool {
        self.autopan.is_active()
    }

    /// Drain pending change notifications.
    pub fn take_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn set_viewport_size(&mut self, size: Size) {
        self.camera.viewport = size;
        self.camera.clamp_to_scene(self.document.scene_rect());
    }

    /// Switch interaction mode, aborting any gesture in progress.
    pub fn set_mode(&mut self, mode: InteractionMode) {
        if mode == self.tools.mode() {
            return;
        }
        self.cancel_gesture();
        self.tools.set_mode(mode);
        log::debug!("Mode changed to {}", mode.display_name());
        self.events.push(EditorEvent::ModeChanged(mode));
    }

    pub fn select(&mut self, target: Option<ShapeRef>) {
        let target = target.filter(|t| self.document.shape(*t).is_some());
        if target != self.selection {
            self.selection = target;
            self.events.push(EditorEvent::SelectionChanged(target));
        }
    }

    /// Cursor to show at a viewport position.
    pub fn hover_cursor(&self, screen: Point) -> CursorHint {
        let world = self.camera.screen_to_world(screen);
        self.controller.hover_cursor(&self.document, self.tools.mode(), world)
    }

    /// Route a pointer event.
    pub fn handle_pointer(&mut self, event: PointerEvent, now: Instant) {
        match event {
            PointerEvent::Down { position, button } => self.pointer_down(position, button, now),
            PointerEvent::Move { position } => self.pointer_move(position, now),
            PointerEvent::Up { position, button } => self.pointer_up(position, button),
            PointerEvent::Wheel { position, notches } => {
                self.pointer.record(&event);
                self.zoom(position, notches);
            }
        }
    }

    pub fn pointer_down(&mut self, screen: Point, button: MouseButton, now: Instant) {
        self.pointer.record(&PointerEvent::Down {
            position: screen,
            button,
        });
        if button != MouseButton::Left {
            return;
        }
        let world = self.camera.screen_to_world(screen);

        match self.tools.mode() {
            InteractionMode::Select => {
                let hit = self.controller.pick(&self.document, world).map(|(t, _)| t);
                match hit {
                    Some(target) => self.select(Some(target)),
                    None => self.panning = true,
                }
            }
            InteractionMode::Transform => {
                let target = self
                    .controller
                    .press(&self.document, InteractionMode::Transform, world);
                self.select(target);
            }
            InteractionMode::CreateBox => {
                let candidates =
                    AlignmentCandidates::collect(self.document.shapes(), ShapeKind::Box, None);
                let snapped = self
                    .alignment
                    .update_guides(world, &candidates, self.document.scene_rect())
                    .point;
                self.tools.begin(quantize_point(snapped));
            }
            InteractionMode::CreateLabel => {
                let candidates =
                    AlignmentCandidates::collect(self.document.shapes(), ShapeKind::Label, None);
                let snapped = self
                    .alignment
                    .update_guides(world, &candidates, self.document.scene_rect())
                    .point;
                self.alignment.clear_guides();
                self.create_label(quantize_point(snapped));
            }
        }
        self.evaluate_autopan(screen, now);
    }

    pub fn pointer_move(&mut self, screen: Point, now: Instant) {
        let delta = self.pointer.record(&PointerEvent::Move { position: screen });

        if self.panning {
            self.camera.scroll_by(-delta, self.document.scene_rect());
            return;
        }

        let world = self.camera.screen_to_world(screen);
        if self.is_gesture_active() {
            self.update_gesture(world);
        } else {
            self.update_hover_guides(world);
        }
        self.evaluate_autopan(screen, now);
    }

    pub fn pointer_up(&mut self, screen: Point, button: MouseButton) {
        self.pointer.record(&PointerEvent::Up {
            position: screen,
            button,
        });
        if button != MouseButton::Left {
            return;
        }
        self.panning = false;
        self.autopan.stop();

        if self.tools.is_active() {
            let world = self.camera.screen_to_world(screen);
            self.update_gesture(world);
            let rect = self.tools.end();
            self.alignment.clear_guides();
            if let Some(rect) = rect {
                if rect.width() >= self.config.min_box_size && rect.height() >= self.config.min_box_size {
                    self.create_box(rect);
                } else {
                    log::debug!("Discarded box below minimum size: {:?}", rect);
                }
            }
        }

        if self.controller.is_dragging() {
            self.controller.release(&mut self.alignment);
        }
        self.alignment.clear_guides();
    }

    /// Zoom by wheel notches around a viewport position.
    pub fn zoom(&mut self, screen: Point, notches: i32) -> bool {
        self.camera
            .zoom_at(screen, notches, self.document.scene_rect())
    }

    /// Advance auto-pan. Returns true when the view scrolled.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(delta) = self.autopan.tick(now) else {
            return false;
        };
        self.camera.scroll_by(delta, self.document.scene_rect());
        if let Some(screen) = self.autopan.last_screen_pos() {
            let world = self.camera.screen_to_world(screen);
            self.update_gesture(world);
        }
        true
    }

    /// Abort the current gesture: a drag is rolled back, a pending create
    /// is discarded.
    pub fn cancel_gesture(&mut self) {
        if self.tools.is_active() {
            self.tools.cancel();
            log::debug!("Create gesture cancelled");
        }
        if let Some(target) = self.controller.cancel(&mut self.document, &mut self.alignment) {
            self.relayout(target);
            self.events.push(EditorEvent::ShapeChanged(target));
        }
        self.alignment.clear_guides();
        self.autopan.stop();
        self.panning = false;
    }

    fn evaluate_autopan(&mut self, screen: Point, now: Instant) {
        let active = self.tools.mode().auto_pans() && self.is_gesture_active();
        self.autopan
            .evaluate(screen, self.camera.viewport, active, now);
    }

    /// Preview where a click in a create mode would snap.
    fn update_hover_guides(&mut self, world: Point) {
        let kind = match self.tools.mode() {
            InteractionMode::CreateBox => ShapeKind::Box,
            InteractionMode::CreateLabel => ShapeKind::Label,
            InteractionMode::Select | InteractionMode::Transform => return,
        };
        let candidates = AlignmentCandidates::collect(self.document.shapes(), kind, None);
        self.alignment
            .update_guides(world, &candidates, self.document.scene_rect());
    }

    /// Feed a scene position to whichever gesture is running.
    fn update_gesture(&mut self, world: Point) {
        if self.tools.is_active() {
            let candidates =
                AlignmentCandidates::collect(self.document.shapes(), ShapeKind::Box, None);
            let snapped = self
                .alignment
                .update_guides(world, &candidates, self.document.scene_rect())
                .point;
            self.tools.update(quantize_point(snapped));
        } else if self.controller.is_dragging() {
            let change = self
                .controller
                .drag(&mut self.document, &mut self.alignment, world);
            if let GeometryChange::Committed(target) = change {
                self.relayout(target);
                self.events.push(EditorEvent::ShapeChanged(target));
            }
        }
    }

    /// Add a box with the current request and select it.
    pub fn create_box(&mut self, rect: Rect) -> ShapeRef {
        let shape = BoxShape::new(rect, self.request.typography.clone());
        let target = shape.shape_ref();
        let requested = self.request.name.clone();
        let duplicate = requested
            .as_deref()
            .is_some_and(|name| self.document.contains_name(name.trim()));
        let assigned = self.document.boxes.add(shape, requested.as_deref());
        self.after_create(target, requested, duplicate, assigned);
        target
    }

    /// Add a label with the current request and select it.
    pub fn create_label(&mut self, position: Point) -> ShapeRef {
        let shape = LabelShape::new(position, self.request.typography.clone());
        let target = shape.shape_ref();
        let requested = self.request.name.clone();
        let duplicate = requested
            .as_deref()
            .is_some_and(|name| self.document.contains_name(name.trim()));
        let assigned = self.document.labels.add(shape, requested.as_deref());
        self.after_create(target, requested, duplicate, assigned);
        target
    }

    fn after_create(
        &mut self,
        target: ShapeRef,
        requested: Option<String>,
        duplicate: bool,
        assigned: String,
    ) {
        if let (true, Some(requested)) = (duplicate, requested) {
            log::warn!("Name {} already exists, stored as {}", requested, assigned);
            self.events.push(EditorEvent::DuplicateName {
                requested,
                assigned: assigned.clone(),
            });
        }
        log::debug!("Created {:?} {}", target.kind, assigned);
        self.relayout(target);
        self.events.push(EditorEvent::ListChanged(target.kind));
        self.select(Some(target));
    }

    /// Recompute the text layout of a shape.
    fn relayout(&mut self, target: ShapeRef) {
        match target.kind {
            ShapeKind::Box => {
                if let Some(shape) = self.document.boxes.find_by_id_mut(target.id) {
                    let font = self
                        .fonts
                        .resolve(&shape.typography.font_name, &mut self.font_cache);
                    shape.relayout(font, self.metrics.as_ref());
                }
            }
            ShapeKind::Label => {
                if let Some(label) = self.document.labels.find_by_id_mut(target.id) {
                    let font = self
                        .fonts
                        .resolve(&label.typography.font_name, &mut self.font_cache);
                    label.relayout(font, self.metrics.as_ref());
                }
            }
        }
    }

    fn relayout_all(&mut self) {
        let targets: Vec<ShapeRef> = self.document.shapes().map(|s| s.shape_ref()).collect();
        for target in targets {
            self.relayout(target);
        }
    }

    /// Remove a shape. Returns the name it was stored under.
    pub fn delete_shape(&mut self, target: ShapeRef) -> Option<String> {
        if self.controller.target() == Some(target) {
            self.cancel_gesture();
        }
        let name = self.document.name_of(target)?;
        match target.kind {
            ShapeKind::Box => {
                self.document.boxes.remove(&name);
            }
            ShapeKind::Label => {
                self.document.labels.remove(&name);
            }
        }
        if self.selection == Some(target) {
            self.select(None);
        }
        log::debug!("Deleted {:?} {}", target.kind, name);
        self.events.push(EditorEvent::ListChanged(target.kind));
        Some(name)
    }

    pub fn delete_selected(&mut self) -> Option<String> {
        let target = self.selection?;
        self.delete_shape(target)
    }

    /// Rename a shape. The name is trimmed first. False when it is blank or
    /// taken, or when the shape is gone.
    pub fn rename_shape(&mut self, target: ShapeRef, new_name: &str) -> bool {
        let Some(old_name) = self.document.name_of(target) else {
            return false;
        };
        let renamed = match target.kind {
            ShapeKind::Box => self.document.boxes.rename(&old_name, new_name),
            ShapeKind::Label => self.document.labels.rename(&old_name, new_name),
        };
        if renamed {
            log::debug!("Renamed {} to {}", old_name, new_name.trim());
            self.events.push(EditorEvent::ListChanged(target.kind));
        }
        renamed
    }

    fn typography_mut(&mut self, target: ShapeRef) -> Option<&mut Typography> {
        match target.kind {
            ShapeKind::Box => self
                .document
                .boxes
                .find_by_id_mut(target.id)
                .map(|b| &mut b.typography),
            ShapeKind::Label => self
                .document
                .labels
                .find_by_id_mut(target.id)
                .map(|l| &mut l.typography),
        }
    }

    /// Step the font size, never below the configured minimum.
    /// Returns the new size.
    pub fn adjust_font_size(&mut self, target: ShapeRef, delta: i32) -> Option<u32> {
        let min = self.config.min_font_size;
        let typography = self.typography_mut(target)?;
        let size = (i64::from(typography.font_size) + i64::from(delta))
            .clamp(i64::from(min), i64::from(u32::MAX)) as u32;
        typography.font_size = size;
        self.relayout(target);
        self.events.push(EditorEvent::ShapeChanged(target));
        Some(size)
    }

    pub fn set_font(&mut self, target: ShapeRef, font_name: &str) -> bool {
        let Some(typography) = self.typography_mut(target) else {
            return false;
        };
        typography.font_name = font_name.to_string();
        self.relayout(target);
        self.events.push(EditorEvent::ShapeChanged(target));
        true
    }

    pub fn set_text(&mut self, target: ShapeRef, text: &str) -> bool {
        let run = match target.kind {
            ShapeKind::Box => self
                .document
                .boxes
                .find_by_id_mut(target.id)
                .map(|b| &mut b.text),
            ShapeKind::Label => self
                .document
                .labels
                .find_by_id_mut(target.id)
                .map(|l| &mut l.text),
        };
        let Some(run) = run else {
            return false;
        };
        run.content = text.to_string();
        self.relayout(target);
        self.events.push(EditorEvent::ShapeChanged(target));
        true
    }

    pub fn set_visible(&mut self, target: ShapeRef, visible: bool) -> bool {
        let flag = match target.kind {
            ShapeKind::Box => self
                .document
                .boxes
                .find_by_id_mut(target.id)
                .map(|b| &mut b.visible),
            ShapeKind::Label => self
                .document
                .labels
                .find_by_id_mut(target.id)
                .map(|l| &mut l.visible),
        };
        let Some(flag) = flag else {
            return false;
        };
        *flag = visible;
        self.events.push(EditorEvent::ShapeChanged(target));
        true
    }

    /// Set the template image; the scene takes its size.
    pub fn load_background(&mut self, path: impl Into<PathBuf>, size: Size) {
        let path = path.into();
        log::info!("Loaded background {} ({}x{})", path.display(), size.width, size.height);
        self.document.background = Some(Background { path, size });
        self.camera.reset(self.document.scene_rect());
    }

    /// Export the document to `storage`.
    pub fn export_to(
        &self,
        storage: &dyn Storage,
        timestamp: NaiveDateTime,
    ) -> LayoutResult<ExportPaths> {
        let export = self.document.export(timestamp);
        Ok(storage.write_export(&export)?)
    }

    /// Replace the document with the contents of a structured document.
    ///
    /// The document is fully validated first; on error the session is left
    /// untouched. Returns the number of shapes imported.
    pub fn import_str(&mut self, source: &str) -> LayoutResult<usize> {
        let default = Typography::new(self.config.default_font.clone(), self.config.default_font_size);
        let imported = import_layout(source, &default)?;

        self.cancel_gesture();
        self.select(None);
        self.document.replace_with(imported);
        self.relayout_all();

        let count = self.document.len();
        log::info!(
            "Imported {} boxes and {} labels",
            self.document.boxes.len(),
            self.document.labels.len()
        );
        self.events.push(EditorEvent::DocumentReplaced);
        self.events.push(EditorEvent::ListChanged(ShapeKind::Box));
        self.events.push(EditorEvent::ListChanged(ShapeKind::Label));
        Ok(count)
    }

    /// Import a structured document from disk.
    pub fn import_file(&mut self, path: &Path) -> LayoutResult<usize> {
        let source = FileStorage::read_path(path)?;
        self.import_str(&source)
    }
}
