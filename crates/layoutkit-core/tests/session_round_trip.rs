use chrono::NaiveDate;
use kurbo::{Point, Rect, Size};
use layoutkit_core::{
    Editor, EditorConfig, EditorEvent, FileStorage, InteractionMode, MouseButton, PointerEvent,
    ShapeKind, Storage, Typography,
};
use std::fs;
use std::time::Instant;
use tempfile::tempdir;

fn press_drag_release(editor: &mut Editor, from: Point, to: Point) {
    let now = Instant::now();
    editor.handle_pointer(
        PointerEvent::Down {
            position: from,
            button: MouseButton::Left,
        },
        now,
    );
    editor.handle_pointer(PointerEvent::Move { position: to }, now);
    editor.handle_pointer(
        PointerEvent::Up {
            position: to,
            button: MouseButton::Left,
        },
        now,
    );
}

#[test]
fn test_designed_layout_survives_export_and_import() {
    let dir = tempdir().unwrap();
    let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
    let timestamp = NaiveDate::from_ymd_opt(2024, 5, 6)
        .and_then(|d| d.and_hms_opt(7, 8, 9))
        .unwrap();

    let mut editor = Editor::new(EditorConfig::default());
    editor.load_background(dir.path().join("certificate.png"), Size::new(1600.0, 1000.0));

    // Two boxes, the second snapped onto the first one's right edge.
    editor.set_mode(InteractionMode::CreateBox);
    editor.request.select_name("Recipient");
    editor.request.typography = Typography::new("Georgia-Bold.ttf", 24);
    press_drag_release(&mut editor, Point::new(102.0, 98.0), Point::new(401.0, 199.0));
    editor.request.select_name("AUTO");
    editor.request.typography = Typography::default();
    press_drag_release(&mut editor, Point::new(398.0, 250.0), Point::new(600.0, 330.0));

    // A label, then move it in transform mode.
    editor.set_mode(InteractionMode::CreateLabel);
    editor.request.select_name("Date");
    press_drag_release(&mut editor, Point::new(500.0, 500.0), Point::new(500.0, 500.0));
    editor.set_mode(InteractionMode::Transform);
    press_drag_release(&mut editor, Point::new(500.0, 500.0), Point::new(512.0, 488.0));

    assert_eq!(editor.document.boxes.names(), vec!["Recipient", "Box1"]);
    assert_eq!(
        editor.document.boxes.get("Box1").map(|b| b.rect()),
        Some(Rect::new(400.0, 250.0, 600.0, 330.0))
    );
    assert_eq!(
        editor.document.labels.get("Date").map(|l| l.position),
        Some(Point::new(510.0, 490.0))
    );

    let paths = editor.export_to(&storage, timestamp).unwrap();
    assert_eq!(paths.structured, dir.path().join("certificate_layout.py"));
    let human = fs::read_to_string(&paths.human).unwrap();
    assert!(human.starts_with("# --- certificate_layout.txt ---"));
    assert!(storage.exists("certificate_layout").unwrap());

    let mut restored = Editor::new(EditorConfig::default());
    restored.create_box(Rect::new(0.0, 0.0, 20.0, 20.0));
    restored.take_events();

    let count = restored.import_file(&paths.structured).unwrap();
    assert_eq!(count, 3);
    assert_eq!(restored.document.boxes.snapshot(), editor.document.boxes.snapshot());
    assert_eq!(restored.document.labels.snapshot(), editor.document.labels.snapshot());

    let events = restored.take_events();
    assert!(events.contains(&EditorEvent::DocumentReplaced));
    assert!(events.contains(&EditorEvent::ListChanged(ShapeKind::Label)));

    // Auto-naming continues after the imported names.
    let next = restored.create_box(Rect::new(0.0, 0.0, 20.0, 20.0));
    assert_eq!(restored.document.name_of(next).as_deref(), Some("Box2"));
}

#[test]
fn test_import_of_missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    let mut editor = Editor::new(EditorConfig::default());
    editor.create_label(Point::new(5.0, 5.0));

    assert!(editor.import_file(&dir.path().join("absent.py")).is_err());
    assert_eq!(editor.document.labels.len(), 1);
}
