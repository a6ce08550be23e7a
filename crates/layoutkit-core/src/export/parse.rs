//! Reading a structured layout document back.
//!
//! The document is a Python module, but only a literal subset is understood:
//! imports, and top-level `name = expression` assignments whose expressions
//! are strings, numbers, names, dotted calls, dicts, tuples and lists.
//! Nothing is executed.

use super::FONTS_PREFIX;
use super::lexer::{Span, Token, lex};
use crate::error::{LayoutError, LayoutResult};
use crate::shapes::{SerializableColor, Typography};
use indexmap::IndexMap;
use kurbo::{Point, Rect};

const MAX_NESTING: usize = 32;
const MAX_NAME_HOPS: usize = 16;

/// Parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Number(f64),
    /// Bare or dotted name.
    Name(String),
    Call { func: String, args: Vec<Value> },
    Dict(Vec<(Value, Value)>),
    /// Tuples and lists alike.
    Tuple(Vec<Value>),
}

/// A box entry read from a document.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedBox {
    pub name: String,
    pub rect: Rect,
    pub typography: Typography,
}

/// A label entry read from a document.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedLabel {
    pub name: String,
    pub position: Point,
    pub typography: Typography,
    pub fill: SerializableColor,
}

/// Fully validated document contents, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedLayout {
    pub boxes: Vec<ImportedBox>,
    pub labels: Vec<ImportedLabel>,
}

impl ImportedLayout {
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty() && self.labels.is_empty()
    }
}

fn malformed(msg: impl Into<String>) -> LayoutError {
    LayoutError::MalformedDocument(msg.into())
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<(Token, Span)>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> LayoutResult<Self> {
        let tokens = lex(source).map_err(|span| {
            let found = source.get(span.clone()).unwrap_or("?");
            malformed(format!(
                "line {}: unexpected character {:?}",
                line_of(source, span.start),
                found
            ))
        })?;
        Ok(Self {
            source,
            tokens,
            pos: 0,
        })
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error(&self, msg: &str) -> LayoutError {
        let offset = self
            .tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|(_, span)| span.start)
            .unwrap_or(0);
        malformed(format!("line {}: {}", line_of(self.source, offset), msg))
    }

    fn expect(&mut self, expected: Token, what: &str) -> LayoutResult<()> {
        if self.peek() == Some(&expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected {what}")))
        }
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> LayoutResult<String> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.error("expected identifier")),
        }
    }

    fn dotted_name(&mut self) -> LayoutResult<String> {
        let mut name = self.ident()?;
        while self.eat(&Token::Dot) {
            name.push('.');
            name.push_str(&self.ident()?);
        }
        Ok(name)
    }

    fn module(&mut self) -> LayoutResult<IndexMap<String, Value>> {
        let mut env = IndexMap::new();
        while let Some(token) = self.peek() {
            match token {
                Token::Ident(word) if word == "from" => {
                    self.pos += 1;
                    self.dotted_name()?;
                    match self.next() {
                        Some(Token::Ident(word)) if word == "import" => {}
                        _ => return Err(self.error("expected 'import'")),
                    }
                    self.name_list()?;
                }
                Token::Ident(word) if word == "import" => {
                    self.pos += 1;
                    self.name_list()?;
                }
                Token::Ident(_) => {
                    let name = self.ident()?;
                    self.expect(Token::Equals, "'=' after name")?;
                    let value = self.expr(0)?;
                    env.insert(name, value);
                }
                _ => return Err(self.error("expected statement")),
            }
        }
        Ok(env)
    }

    fn name_list(&mut self) -> LayoutResult<()> {
        self.dotted_name()?;
        while self.eat(&Token::Comma) {
            self.dotted_name()?;
        }
        Ok(())
    }

    fn expr(&mut self, depth: usize) -> LayoutResult<Value> {
        if depth > MAX_NESTING {
            return Err(self.error("expression nested too deeply"));
        }
        match self.next() {
            Some(Token::String(s)) => Ok(Value::Str(s)),
            Some(Token::Number(n)) => Ok(Value::Number(n)),
            Some(Token::Minus) => match self.next() {
                Some(Token::Number(n)) => Ok(Value::Number(-n)),
                _ => Err(self.error("expected number after '-'")),
            },
            Some(Token::Ident(first)) => {
                let mut name = first;
                while self.eat(&Token::Dot) {
                    name.push('.');
                    name.push_str(&self.ident()?);
                }
                if self.eat(&Token::ParenOpen) {
                    let args = self.items(Token::ParenClose, depth)?;
                    Ok(Value::Call { func: name, args })
                } else {
                    Ok(Value::Name(name))
                }
            }
            Some(Token::BraceOpen) => self.dict(depth),
            Some(Token::BracketOpen) => Ok(Value::Tuple(self.items(Token::BracketClose, depth)?)),
            Some(Token::ParenOpen) => {
                let start = self.pos;
                let items = self.items(Token::ParenClose, depth)?;
                // `(x)` is grouping, `(x,)` is a tuple.
                let had_comma = self.tokens[start..self.pos]
                    .iter()
                    .any(|(t, _)| *t == Token::Comma);
                match items.len() {
                    1 if !had_comma => Ok(items.into_iter().next().unwrap_or(Value::Tuple(Vec::new()))),
                    _ => Ok(Value::Tuple(items)),
                }
            }
            Some(_) => {
                self.pos -= 1;
                Err(self.error("expected expression"))
            }
            None => Err(self.error("unexpected end of document")),
        }
    }

    /// Comma-separated expressions up to `close`, trailing comma allowed.
    fn items(&mut self, close: Token, depth: usize) -> LayoutResult<Vec<Value>> {
        let mut items = Vec::new();
        loop {
            if self.eat(&close) {
                return Ok(items);
            }
            items.push(self.expr(depth + 1)?);
            if !self.eat(&Token::Comma) {
                self.expect(close, "',' or closing bracket")?;
                return Ok(items);
            }
        }
    }

    fn dict(&mut self, depth: usize) -> LayoutResult<Value> {
        let mut entries = Vec::new();
        loop {
            if self.eat(&Token::BraceClose) {
                return Ok(Value::Dict(entries));
            }
            let key = self.expr(depth + 1)?;
            self.expect(Token::Colon, "':' in dict")?;
            let value = self.expr(depth + 1)?;
            entries.push((key, value));
            if !self.eat(&Token::Comma) {
                self.expect(Token::BraceClose, "',' or '}'")?;
                return Ok(Value::Dict(entries));
            }
        }
    }
}

fn line_of(source: &str, offset: usize) -> usize {
    source
        .get(..offset)
        .map(|prefix| prefix.matches('\n').count() + 1)
        .unwrap_or(1)
}

/// Parse a document into its top-level assignments.
pub fn parse_module(source: &str) -> LayoutResult<IndexMap<String, Value>> {
    Parser::new(source)?.module()
}

/// Follow bare names through the assignments.
fn resolve<'v>(value: &'v Value, env: &'v IndexMap<String, Value>) -> &'v Value {
    let mut current = value;
    for _ in 0..MAX_NAME_HOPS {
        match current {
            Value::Name(name) => match env.get(name) {
                Some(next) => current = next,
                None => return current,
            },
            _ => return current,
        }
    }
    current
}

/// String-keyed dict entries; later duplicates replace earlier ones in place.
fn string_dict<'v>(
    value: &'v Value,
    env: &'v IndexMap<String, Value>,
    what: &str,
) -> LayoutResult<IndexMap<&'v str, &'v Value>> {
    let Value::Dict(entries) = resolve(value, env) else {
        return Err(malformed(format!("{what} must be a dict")));
    };
    let mut map = IndexMap::new();
    for (key, value) in entries {
        let Value::Str(key) = resolve(key, env) else {
            return Err(malformed(format!("{what} keys must be strings")));
        };
        map.insert(key.as_str(), value);
    }
    Ok(map)
}

fn number(
    fields: &IndexMap<&str, &Value>,
    env: &IndexMap<String, Value>,
    key: &str,
    owner: &str,
) -> LayoutResult<f64> {
    match fields.get(key).map(|v| resolve(v, env)) {
        Some(Value::Number(n)) if n.is_finite() => Ok(*n),
        Some(_) => Err(malformed(format!("{owner}: '{key}' must be a number"))),
        None => Err(malformed(format!("{owner}: missing '{key}'"))),
    }
}

/// Font name from a stored path: the part below the fonts directory, with
/// `/` separators. `fonts\\sub\\Serif.ttf` gives `sub/Serif.ttf`; paths
/// outside the fonts directory are kept whole.
fn font_name_of(path: &str) -> String {
    let relative = path
        .strip_prefix(FONTS_PREFIX)
        .and_then(|rest| rest.strip_prefix(['\\', '/']))
        .unwrap_or(path);
    relative.replace('\\', "/")
}

/// Map a font reference back to typography through the preamble.
fn typography(
    value: Option<&&Value>,
    env: &IndexMap<String, Value>,
    default: &Typography,
) -> Typography {
    let Some(value) = value else {
        return default.clone();
    };
    let Value::Call { func, args } = resolve(value, env) else {
        return default.clone();
    };
    if !func.ends_with("truetype") || args.len() < 2 {
        return default.clone();
    }
    let (Value::Str(path), Value::Number(size)) = (resolve(&args[0], env), resolve(&args[1], env))
    else {
        return default.clone();
    };
    if *size < 1.0 || size.fract() != 0.0 || *size > u32::MAX as f64 {
        return default.clone();
    }
    Typography::new(font_name_of(path), *size as u32)
}

fn fill(value: Option<&&Value>, env: &IndexMap<String, Value>, owner: &str) -> LayoutResult<SerializableColor> {
    let Some(value) = value else {
        return Ok(SerializableColor::black());
    };
    let invalid = || malformed(format!("{owner}: 'fill' must be a tuple of three integers 0-255"));
    let Value::Tuple(items) = resolve(value, env) else {
        return Err(invalid());
    };
    if items.len() != 3 {
        return Err(invalid());
    }
    let mut rgb = [0u8; 3];
    for (slot, item) in rgb.iter_mut().zip(items) {
        match resolve(item, env) {
            Value::Number(n) if n.fract() == 0.0 && (0.0..=255.0).contains(n) => *slot = *n as u8,
            _ => return Err(invalid()),
        }
    }
    Ok(SerializableColor::rgb(rgb[0], rgb[1], rgb[2]))
}

/// Parse and validate a structured layout document.
///
/// Nothing is returned unless every entry is valid. Font references that do
/// not resolve through the preamble fall back to `default`.
pub fn import_layout(source: &str, default: &Typography) -> LayoutResult<ImportedLayout> {
    let env = parse_module(source)?;
    let config = env
        .get("LAYOUT_CONFIG")
        .ok_or_else(|| malformed("LAYOUT_CONFIG is not defined"))?;
    let sections = string_dict(config, &env, "LAYOUT_CONFIG")?;

    let mut layout = ImportedLayout::default();

    if let Some(boxes) = sections.get("boxes") {
        for (name, entry) in string_dict(boxes, &env, "'boxes'")? {
            let owner = format!("box '{name}'");
            let fields = string_dict(entry, &env, &owner)?;
            let rect = Rect::new(
                number(&fields, &env, "x1", &owner)?,
                number(&fields, &env, "y1", &owner)?,
                number(&fields, &env, "x2", &owner)?,
                number(&fields, &env, "y2", &owner)?,
            );
            layout.boxes.push(ImportedBox {
                name: name.to_string(),
                rect,
                typography: typography(fields.get("font"), &env, default),
            });
        }
    }

    if let Some(labels) = sections.get("labels") {
        for (name, entry) in string_dict(labels, &env, "'labels'")? {
            let owner = format!("label '{name}'");
            let fields = string_dict(entry, &env, &owner)?;
            let position = Point::new(
                number(&fields, &env, "x", &owner)?,
                number(&fields, &env, "y", &owner)?,
            );
            layout.labels.push(ImportedLabel {
                name: name.to_string(),
                position,
                typography: typography(fields.get("font"), &env, default),
                fill: fill(fields.get("fill"), &env, &owner)?,
            });
        }
    }

    Ok(layout)
}
