//! Layout export and import.
//!
//! An export is a pair of documents sharing one base name:
//!
//! - `<base>.py`, a Python module that loads every font with Pillow and
//!   defines `LAYOUT_CONFIG`, the machine-readable layout;
//! - `<base>.txt`, the same information as commented drawing calls, meant to
//!   be pasted into a rendering script.
//!
//! The `.py` document can be read back with [`import_layout`].

mod lexer;
mod parse;

pub use parse::{ImportedBox, ImportedLabel, ImportedLayout, Value, import_layout, parse_module};

use crate::registry::NameRegistry;
use crate::shapes::{BoxShape, LabelShape};
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::path::Path;

/// Directory prefix written in font path variables.
pub const FONTS_PREFIX: &str = "fonts";

/// Line-height argument of the justified text helper in the human document.
const JUSTIFY_LINE_SPACING: u32 = 17;

/// Both export documents and the base name they are saved under.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutExport {
    pub base_name: String,
    /// Contents of `<base>.py`.
    pub structured: String,
    /// Contents of `<base>.txt`.
    pub human: String,
}

impl LayoutExport {
    pub fn structured_file_name(&self) -> String {
        format!("{}.py", self.base_name)
    }

    pub fn human_file_name(&self) -> String {
        format!("{}.txt", self.base_name)
    }
}

/// Base file name for an export.
pub fn base_name(template: Option<&Path>, timestamp: NaiveDateTime) -> String {
    match template.and_then(|p| p.file_stem()).and_then(|s| s.to_str()) {
        Some(stem) if !stem.is_empty() => format!("{stem}_layout"),
        _ => format!("layout_config-{}", timestamp.format("%Y-%m-%d_%H-%M-%S")),
    }
}

/// Identifier fragment for a font family: text before the first `.`,
/// lowercased, with anything outside `[a-z0-9_]` turned into `_`.
pub fn clean_font_key(font_name: &str) -> String {
    let stem = font_name.split('.').next().unwrap_or_default();
    let key: String = stem
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if key.is_empty() || key.starts_with(|c: char| c.is_ascii_digit()) {
        format!("f_{key}")
    } else {
        key
    }
}

/// Variables generated for every font used by the layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontTable {
    /// font name -> clean key, in sorted font-name order.
    keys: BTreeMap<String, String>,
    /// (font name, size) pairs, sorted.
    pairs: BTreeSet<(String, u32)>,
}

impl FontTable {
    /// Collect the distinct `(font, size)` pairs of both registries.
    pub fn collect(boxes: &NameRegistry<BoxShape>, labels: &NameRegistry<LabelShape>) -> Self {
        let pairs: BTreeSet<(String, u32)> = boxes
            .iter()
            .map(|(_, b)| &b.typography)
            .chain(labels.iter().map(|(_, l)| &l.typography))
            .map(|t| (t.font_name.clone(), t.font_size))
            .collect();

        // Families in sorted order; a clean key already taken by another
        // family gets a numeric suffix.
        let mut keys = BTreeMap::new();
        let mut taken = BTreeSet::new();
        for (font_name, _) in &pairs {
            if keys.contains_key(font_name) {
                continue;
            }
            let base = clean_font_key(font_name);
            let mut key = base.clone();
            let mut n = 2;
            while taken.contains(&key) {
                key = format!("{base}_{n}");
                n += 1;
            }
            taken.insert(key.clone());
            keys.insert(font_name.clone(), key);
        }

        Self { keys, pairs }
    }

    fn key(&self, font_name: &str) -> &str {
        self.keys.get(font_name).map(String::as_str).unwrap_or("default")
    }

    pub fn path_var(&self, font_name: &str) -> String {
        format!("path_{}", self.key(font_name))
    }

    pub fn font_var(&self, font_name: &str, size: u32) -> String {
        format!("font_{}_{}", self.key(font_name), size)
    }

    /// Pillow setup lines shared by both documents.
    fn preamble(&self) -> Vec<String> {
        let mut lines = vec![
            "from PIL import ImageFont".to_string(),
            String::new(),
            "# Font paths".to_string(),
        ];
        for font_name in self.keys.keys() {
            let path = format!("{FONTS_PREFIX}\\{}", font_name.replace('/', "\\"));
            lines.push(format!("{} = {}", self.path_var(font_name), py_path(&path)));
        }
        lines.push(String::new());
        lines.push("# Font loading".to_string());
        for (font_name, size) in &self.pairs {
            lines.push(format!(
                "{} = ImageFont.truetype({}, {})",
                self.font_var(font_name, *size),
                self.path_var(font_name),
                size
            ));
        }
        lines
    }
}

/// Python string literal with single quotes.
fn py_str(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Raw string for Windows-style paths, unless the path cannot be written raw.
fn py_path(path: &str) -> String {
    let raw_safe = !path.contains(['\'', '\n', '\r']) && !path.ends_with('\\');
    if raw_safe {
        format!("r'{path}'")
    } else {
        py_str(path)
    }
}

/// Produce both export documents from the registries.
pub fn export_layout(
    boxes: &NameRegistry<BoxShape>,
    labels: &NameRegistry<LabelShape>,
    template: Option<&Path>,
    timestamp: NaiveDateTime,
) -> LayoutExport {
    let fonts = FontTable::collect(boxes, labels);
    let base_name = base_name(template, timestamp);
    let structured = structured_document(&fonts, boxes, labels);
    let human = human_document(&fonts, boxes, labels, &format!("{base_name}.txt"));

    log::info!(
        "Exported {} boxes and {} labels as {}",
        boxes.len(),
        labels.len(),
        base_name
    );
    LayoutExport {
        base_name,
        structured,
        human,
    }
}

fn structured_document(
    fonts: &FontTable,
    boxes: &NameRegistry<BoxShape>,
    labels: &NameRegistry<LabelShape>,
) -> String {
    let mut out = String::new();
    for line in fonts.preamble() {
        let _ = writeln!(out, "{line}");
    }
    out.push('\n');

    out.push_str("LAYOUT_CONFIG = {\n    'boxes': {\n");
    for (name, fields) in boxes.snapshot() {
        let _ = writeln!(
            out,
            "        {}: {{'x1': {}, 'y1': {}, 'x2': {}, 'y2': {}, 'font': {}}},",
            py_str(&name),
            fields.x1,
            fields.y1,
            fields.x2,
            fields.y2,
            fonts.font_var(&fields.font_name, fields.font_size)
        );
    }
    out.push_str("    },\n    'labels': {\n");
    for (name, fields) in labels.snapshot() {
        let (r, g, b) = fields.fill;
        let _ = writeln!(
            out,
            "        {}: {{'x': {}, 'y': {}, 'font': {}, 'fill': ({}, {}, {})}},",
            py_str(&name),
            fields.x,
            fields.y,
            fonts.font_var(&fields.font_name, fields.font_size),
            r,
            g,
            b
        );
    }
    out.push_str("    },\n}\n");
    out
}

fn human_document(
    fonts: &FontTable,
    boxes: &NameRegistry<BoxShape>,
    labels: &NameRegistry<LabelShape>,
    file_name: &str,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# --- {file_name} ---");
    out.push_str("#\n");
    for line in fonts.preamble() {
        if line.is_empty() {
            out.push_str("#\n");
        } else {
            let _ = writeln!(out, "# {line}");
        }
    }
    out.push_str("#\n# LABELS\n");
    for (name, fields) in labels.snapshot() {
        let (r, g, b) = fields.fill;
        let _ = writeln!(
            out,
            "# draw.text(({}, {}), {}, font={}, fill=({}, {}, {}))",
            fields.x,
            fields.y,
            name,
            fonts.font_var(&fields.font_name, fields.font_size),
            r,
            g,
            b
        );
    }
    out.push_str("#\n# BOXES\n");
    for (name, fields) in boxes.snapshot() {
        let font = fonts.font_var(&fields.font_name, fields.font_size);
        let _ = writeln!(
            out,
            "# draw.rectangle([({}, {}), ({}, {})], fill=None, outline=None)",
            fields.x1, fields.y1, fields.x2, fields.y2
        );
        let _ = writeln!(
            out,
            "# text_box = ({}, {}, {}, {})",
            fields.x1, fields.y1, fields.x2, fields.y2
        );
        let _ = writeln!(
            out,
            "# draw_wrapped_text_justified(draw, {name}, {font}, text_box, {JUSTIFY_LINE_SPACING}, (0, 0, 0))"
        );
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{SerializableColor, Typography};
    use chrono::NaiveDate;
    use kurbo::{Point, Rect};
    use std::path::PathBuf;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|d| d.and_hms_opt(14, 5, 7))
            .unwrap()
    }

    fn registries() -> (NameRegistry<BoxShape>, NameRegistry<LabelShape>) {
        let mut boxes = NameRegistry::new();
        boxes.add(
            BoxShape::new(Rect::new(10.0, 20.0, 110.0, 220.0), Typography::new("Tw-Cen-MT-Bold.ttf", 17)),
            Some("Title"),
        );
        boxes.add(
            BoxShape::new(Rect::new(0.0, 300.0, 400.0, 500.0), Typography::new("Arial", 10)),
            None,
        );
        let mut labels = NameRegistry::new();
        let mut label = LabelShape::new(Point::new(15.0, 25.0), Typography::new("Tw-Cen-MT-Bold.ttf", 12));
        label.fill = SerializableColor::rgb(200, 10, 0);
        labels.add(label, None);
        (boxes, labels)
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name(None, timestamp()), "layout_config-2024-03-09_14-05-07");
        let template = PathBuf::from("/tmp/templates/Certificate A4.png");
        assert_eq!(base_name(Some(&template), timestamp()), "Certificate A4_layout");
    }

    #[test]
    fn test_clean_font_key() {
        assert_eq!(clean_font_key("Tw-Cen-MT-Bold.ttf"), "tw_cen_mt_bold");
        assert_eq!(clean_font_key("Open Sans.otf"), "open_sans");
        assert_eq!(clean_font_key("Arial"), "arial");
        assert_eq!(clean_font_key("3of9.ttf"), "f_3of9");
    }

    #[test]
    fn test_font_key_collision_gets_suffix() {
        let mut boxes = NameRegistry::new();
        boxes.add(BoxShape::new(Rect::new(0.0, 0.0, 10.0, 10.0), Typography::new("open-sans.ttf", 10)), None);
        boxes.add(BoxShape::new(Rect::new(0.0, 0.0, 10.0, 10.0), Typography::new("Open Sans.ttf", 10)), None);
        let fonts = FontTable::collect(&boxes, &NameRegistry::new());
        // "Open Sans.ttf" sorts first and keeps the plain key.
        assert_eq!(fonts.font_var("Open Sans.ttf", 10), "font_open_sans_10");
        assert_eq!(fonts.font_var("open-sans.ttf", 10), "font_open_sans_2_10");
        assert_eq!(fonts.path_var("open-sans.ttf"), "path_open_sans_2");
    }

    #[test]
    fn test_structured_document_layout() {
        let (boxes, labels) = registries();
        let export = export_layout(&boxes, &labels, None, timestamp());
        let doc = &export.structured;

        assert!(doc.starts_with("from PIL import ImageFont\n"));
        assert!(doc.contains("path_tw_cen_mt_bold = r'fonts\\Tw-Cen-MT-Bold.ttf'\n"));
        assert!(doc.contains("font_arial_10 = ImageFont.truetype(path_arial, 10)\n"));
        assert!(doc.contains("font_tw_cen_mt_bold_12 = ImageFont.truetype(path_tw_cen_mt_bold, 12)\n"));
        assert!(doc.contains(
            "'Title': {'x1': 10, 'y1': 20, 'x2': 110, 'y2': 220, 'font': font_tw_cen_mt_bold_17},"
        ));
        assert!(doc.contains("'Label1': {'x': 15, 'y': 25, 'font': font_tw_cen_mt_bold_12, 'fill': (200, 10, 0)},"));

        // Font loading lines appear in sorted pair order.
        let p12 = doc.find("font_tw_cen_mt_bold_12 =").unwrap();
        let p17 = doc.find("font_tw_cen_mt_bold_17 =").unwrap();
        assert!(p12 < p17);
        assert_eq!(export.structured_file_name(), "layout_config-2024-03-09_14-05-07.py");
    }

    #[test]
    fn test_human_document_is_all_comments() {
        let (boxes, labels) = registries();
        let export = export_layout(&boxes, &labels, None, timestamp());
        let human = &export.human;

        assert!(human.starts_with("# --- layout_config-2024-03-09_14-05-07.txt ---\n"));
        assert!(human.contains("# draw.text((15, 25), Label1, font=font_tw_cen_mt_bold_12, fill=(200, 10, 0))"));
        assert!(human.contains("# draw.rectangle([(10, 20), (110, 220)], fill=None, outline=None)"));
        assert!(human.contains("# text_box = (10, 20, 110, 220)"));
        assert!(human.contains(
            "# draw_wrapped_text_justified(draw, Title, font_tw_cen_mt_bold_17, text_box, 17, (0, 0, 0))"
        ));
        assert!(human.find("# LABELS").unwrap() < human.find("# BOXES").unwrap());
        assert!(human.lines().all(|l| l.is_empty() || l.starts_with('#')));
    }

    #[test]
    fn test_export_then_import_round_trip() {
        let (boxes, labels) = registries();
        let export = export_layout(&boxes, &labels, None, timestamp());
        let imported = import_layout(&export.structured, &Typography::default()).unwrap();

        let names: Vec<&str> = imported.boxes.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Title", "Box1"]);
        assert_eq!(imported.boxes[0].rect, Rect::new(10.0, 20.0, 110.0, 220.0));
        assert_eq!(imported.boxes[0].typography, Typography::new("Tw-Cen-MT-Bold.ttf", 17));
        assert_eq!(imported.boxes[1].typography, Typography::new("Arial", 10));
        assert_eq!(imported.labels[0].fill, SerializableColor::rgb(200, 10, 0));
        assert_eq!(imported.labels[0].position, Point::new(15.0, 25.0));
    }

    #[test]
    fn test_awkward_names_survive_round_trip() {
        let mut boxes = NameRegistry::new();
        boxes.add(
            BoxShape::new(Rect::new(0.0, 0.0, 50.0, 50.0), Typography::new("it's.ttf", 9)),
            Some("O'Brien \\ co"),
        );
        let export = export_layout(&boxes, &NameRegistry::new(), None, timestamp());
        let imported = import_layout(&export.structured, &Typography::default()).unwrap();
        assert_eq!(imported.boxes[0].name, "O'Brien \\ co");
        assert_eq!(imported.boxes[0].typography, Typography::new("it's.ttf", 9));
    }

    #[test]
    fn test_font_in_subdirectory_round_trips() {
        let mut labels = NameRegistry::new();
        labels.add(
            LabelShape::new(Point::new(5.0, 5.0), Typography::new("brand/Serif.ttf", 12)),
            None,
        );
        let export = export_layout(&NameRegistry::new(), &labels, None, timestamp());
        assert!(export.structured.contains(r"r'fonts\brand\Serif.ttf'"));

        let imported = import_layout(&export.structured, &Typography::default()).unwrap();
        assert_eq!(imported.labels[0].typography, Typography::new("brand/Serif.ttf", 12));
    }

    #[test]
    fn test_empty_export_imports_empty() {
        let export = export_layout(&NameRegistry::new(), &NameRegistry::new(), None, timestamp());
        let imported = import_layout(&export.structured, &Typography::default()).unwrap();
        assert!(imported.is_empty());
    }
}
