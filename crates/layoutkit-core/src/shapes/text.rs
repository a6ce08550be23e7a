//! Text runs attached to shapes.
//!
//! A box lays its text out justified inside its rectangle; a label lays out a
//! single line anchored at its point. Glyph measurement is abstracted behind
//! [`TextMetrics`] so the host can plug in real font metrics.

use crate::fonts::ResolvedFont;
use kurbo::{Point, Rect};

/// Glyph measurement used by the layout.
pub trait TextMetrics {
    /// Advance width of `text` set in `font` at `size` points.
    fn text_width(&self, text: &str, font: &ResolvedFont, size: u32) -> f64;

    /// Distance between consecutive baselines.
    fn line_height(&self, font: &ResolvedFont, size: u32) -> f64;
}

/// Average-advance metrics: every character is half an em wide.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateMetrics;

impl ApproximateMetrics {
    fn pixel_size(size: u32) -> f64 {
        size as f64 * 4.0 / 3.0
    }
}

impl TextMetrics for ApproximateMetrics {
    fn text_width(&self, text: &str, font: &ResolvedFont, size: u32) -> f64 {
        let advance = if font.bold { 0.55 } else { 0.5 };
        text.chars().count() as f64 * advance * Self::pixel_size(size)
    }

    fn line_height(&self, _font: &ResolvedFont, size: u32) -> f64 {
        Self::pixel_size(size) * 1.2
    }
}

/// How a run is broken into lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    /// Wrap to the frame width, justify all but paragraph-final lines.
    #[default]
    Justified,
    /// One unwrapped line per paragraph.
    Simple,
}

/// A laid-out line.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub width: f64,
    /// Whether the renderer should stretch inter-word spacing to the frame.
    pub justify: bool,
}

/// Result of laying out a run inside a frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextLayout {
    pub lines: Vec<TextLine>,
    /// Top-left of the first line, after vertical centering.
    pub origin: Point,
    pub line_height: f64,
    /// Widest line.
    pub width: f64,
    /// Height of the visible lines.
    pub height: f64,
    /// Lines were clipped at the frame height.
    pub overflow: bool,
}

/// Editable text content plus its cached layout.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub content: String,
    pub wrap: WrapMode,
    font: ResolvedFont,
    layout: TextLayout,
}

impl TextRun {
    pub fn new(content: impl Into<String>, wrap: WrapMode) -> Self {
        Self {
            content: content.into(),
            wrap,
            font: ResolvedFont::fallback(),
            layout: TextLayout::default(),
        }
    }

    /// Font the last layout was computed with.
    pub fn font(&self) -> &ResolvedFont {
        &self.font
    }

    pub fn layout(&self) -> &TextLayout {
        &self.layout
    }

    /// Recompute the layout for `frame`.
    ///
    /// For [`WrapMode::Simple`] only the frame origin is used.
    pub fn relayout(
        &mut self,
        frame: Rect,
        font: ResolvedFont,
        size: u32,
        metrics: &dyn TextMetrics,
    ) {
        self.layout = match self.wrap {
            WrapMode::Justified => layout_justified(&self.content, frame, &font, size, metrics),
            WrapMode::Simple => layout_simple(&self.content, frame.origin(), &font, size, metrics),
        };
        self.font = font;
    }
}

fn layout_simple(
    content: &str,
    origin: Point,
    font: &ResolvedFont,
    size: u32,
    metrics: &dyn TextMetrics,
) -> TextLayout {
    let line_height = metrics.line_height(font, size);
    let lines: Vec<TextLine> = content
        .split('\n')
        .map(|text| TextLine {
            text: text.to_string(),
            width: metrics.text_width(text, font, size),
            justify: false,
        })
        .collect();
    let width = lines.iter().map(|l| l.width).fold(0.0, f64::max);

    TextLayout {
        height: lines.len() as f64 * line_height,
        lines,
        origin,
        line_height,
        width,
        overflow: false,
    }
}

fn layout_justified(
    content: &str,
    frame: Rect,
    font: &ResolvedFont,
    size: u32,
    metrics: &dyn TextMetrics,
) -> TextLayout {
    let frame = frame.abs();
    let line_height = metrics.line_height(font, size);
    let mut layout = TextLayout {
        origin: frame.origin(),
        line_height,
        ..TextLayout::default()
    };

    if frame.width() <= 0.0 || line_height <= 0.0 {
        layout.overflow = !content.trim().is_empty();
        return layout;
    }

    let mut lines = Vec::new();
    for paragraph in content.split('\n') {
        wrap_paragraph(paragraph, frame.width(), font, size, metrics, &mut lines);
    }

    let max_lines = (frame.height() / line_height).floor() as usize;
    if lines.len() > max_lines {
        lines.truncate(max_lines);
        layout.overflow = true;
    }

    layout.height = lines.len() as f64 * line_height;
    layout.width = lines.iter().map(|l| l.width).fold(0.0, f64::max);
    let y_offset = ((frame.height() - layout.height) / 2.0).max(0.0);
    layout.origin = Point::new(frame.x0, frame.y0 + y_offset);
    layout.lines = lines;
    layout
}

/// Greedy word wrap; words wider than the frame break anywhere.
fn wrap_paragraph(
    paragraph: &str,
    max_width: f64,
    font: &ResolvedFont,
    size: u32,
    metrics: &dyn TextMetrics,
    out: &mut Vec<TextLine>,
) {
    let fits = |text: &str| metrics.text_width(text, font, size) <= max_width;
    let push = |out: &mut Vec<TextLine>, text: String, justify: bool| {
        let width = metrics.text_width(&text, font, size);
        out.push(TextLine { text, width, justify });
    };

    let mut current = String::new();
    for word in paragraph.split_whitespace() {
        if !current.is_empty() {
            let candidate = format!("{current} {word}");
            if fits(&candidate) {
                current = candidate;
                continue;
            }
            push(out, std::mem::take(&mut current), true);
        }

        if fits(word) {
            current = word.to_string();
            continue;
        }

        // Break an oversized word into the longest prefixes that fit,
        // at least one character each.
        let mut chunk = String::new();
        for ch in word.chars() {
            chunk.push(ch);
            if !fits(&chunk) && chunk.chars().count() > 1 {
                chunk.pop();
                push(out, std::mem::take(&mut chunk), true);
                chunk.push(ch);
            }
        }
        current = chunk;
    }

    push(out, current, false);
}
