use std::fmt;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

use super::literal::{is_identifier_part, is_identifier_start, LiteralParser};
use super::CodecError;

/// Declaration keyword of a data binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Keyword {
    #[default]
    Const,
    Let,
    Var,
}

impl Keyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Const => "const",
            Keyword::Let => "let",
            Keyword::Var => "var",
        }
    }

    fn parse(word: &str) -> Option<Self> {
        match word {
            "const" => Some(Keyword::Const),
            "let" => Some(Keyword::Let),
            "var" => Some(Keyword::Var),
            _ => None,
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One top-level `<keyword> <name> = <literal>;` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub keyword: Keyword,
    pub name: String,
    pub value: Value,
}

/// Header and footer around an encoded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTemplate {
    /// Leading comment block, written verbatim.
    pub banner: String,
    pub keyword: Keyword,
    /// Name of the declared binding, also the exported value.
    pub binding: String,
    /// Text of the `//` comment above the CommonJS export.
    pub export_note: String,
}

impl SourceTemplate {
    pub fn new(banner: impl Into<String>, binding: impl Into<String>) -> Self {
        Self {
            banner: banner.into(),
            keyword: Keyword::Const,
            binding: binding.into(),
            export_note: "Export for use in main site".to_string(),
        }
    }

    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        self.keyword = keyword;
        self
    }

    pub fn with_export_note(mut self, note: impl Into<String>) -> Self {
        self.export_note = note.into();
        self
    }
}

/// Candidate declaration found by the scanner, before the name filter.
struct Found {
    keyword: Keyword,
    name: String,
    offset: usize,
    value: Result<Value, CodecError>,
}

/// Decode the single top-level declaration in `text`.
pub fn decode(text: &str) -> Result<Declaration, CodecError> {
    single(scan(text)?, None)
}

/// Decode the single top-level declaration of `name` in `text`. Other
/// declarations are ignored.
pub fn decode_named(text: &str, name: &str) -> Result<Declaration, CodecError> {
    single(scan(text)?, Some(name))
}

fn single(found: Vec<Found>, name: Option<&str>) -> Result<Declaration, CodecError> {
    let mut matching = found
        .into_iter()
        .filter(|f| name.map_or(true, |n| f.name == n));

    let first = match matching.next() {
        Some(first) => first,
        None => {
            let reason = match name {
                Some(name) => format!("no `const {} = ...;` declaration found", name),
                None => "no `const <name> = ...;` declaration found".to_string(),
            };
            return Err(CodecError::malformed(reason, 0));
        }
    };
    if let Some(second) = matching.next() {
        return Err(CodecError::malformed(
            format!("duplicate declaration of `{}`", second.name),
            second.offset,
        ));
    }

    let value = first.value?;
    if !value.is_array() && !value.is_object() {
        return Err(CodecError::malformed(
            format!("`{}` must be an array or object literal", first.name),
            first.offset,
        ));
    }

    Ok(Declaration {
        keyword: first.keyword,
        name: first.name,
        value,
    })
}

/// Walk the text at statement level, skipping comments, strings and nested
/// blocks, and collect every top-level `<keyword> <ident> =` declaration.
fn scan(text: &str) -> Result<Vec<Found>, CodecError> {
    let mut p = LiteralParser::new(text, 0);
    let mut found = Vec::new();
    let mut depth = 0usize;
    let mut prev_dot = false;

    loop {
        p.skip_trivia()?;
        let start = p.position();
        let c = match p.peek() {
            Some(c) => c,
            None => break,
        };

        match c {
            '"' | '\'' | '`' => {
                skip_string(&mut p)?;
                prev_dot = false;
            }
            '{' | '(' | '[' => {
                p.bump();
                depth += 1;
                prev_dot = false;
            }
            '}' | ')' | ']' => {
                p.bump();
                depth = depth.saturating_sub(1);
                prev_dot = false;
            }
            c if is_identifier_start(c) => {
                let word = identifier(&mut p);
                let keyword = match Keyword::parse(word) {
                    Some(keyword) if depth == 0 && !prev_dot => keyword,
                    _ => {
                        prev_dot = false;
                        continue;
                    }
                };
                prev_dot = false;
                if let Some(name) = binding(&mut p)? {
                    let value = p.parse_value().and_then(|value| {
                        terminator(&mut p)?;
                        Ok(value)
                    });
                    let failed = value.is_err();
                    found.push(Found {
                        keyword,
                        name,
                        offset: start,
                        value,
                    });
                    if failed {
                        // The initializer is not data; continue scanning it as
                        // plain code so unrelated declarations still resolve.
                        p = LiteralParser::new(text, found_resume(text, start));
                    }
                }
            }
            c => {
                p.bump();
                prev_dot = c == '.';
            }
        }
    }

    Ok(found)
}

/// Position just past the `=` of the declaration starting at `start`.
fn found_resume(text: &str, start: usize) -> usize {
    text[start..].find('=').map_or(text.len(), |i| start + i + 1)
}

/// Read `<ident> =` after a keyword. Returns `None` when the keyword does not
/// start a simple binding (destructuring, `==`, missing initializer).
fn binding(p: &mut LiteralParser<'_>) -> Result<Option<String>, CodecError> {
    p.skip_trivia()?;
    match p.peek() {
        Some(c) if is_identifier_start(c) => {}
        _ => return Ok(None),
    }
    let name = identifier(p).to_string();
    p.skip_trivia()?;
    if p.peek() != Some('=') {
        return Ok(None);
    }
    p.bump();
    if matches!(p.peek(), Some('=') | Some('>')) {
        return Ok(None);
    }
    Ok(Some(name))
}

/// Accept `;`, end of input, or a line break before the next token.
fn terminator(p: &mut LiteralParser<'_>) -> Result<(), CodecError> {
    let newline = p.skip_trivia()?;
    match p.peek() {
        Some(';') => {
            p.bump();
            Ok(())
        }
        None => Ok(()),
        Some(_) if newline => Ok(()),
        Some(c) => Err(CodecError::malformed(
            format!("expected `;` after literal, found {:?}", c),
            p.position(),
        )),
    }
}

fn identifier<'a>(p: &mut LiteralParser<'a>) -> &'a str {
    let start = p.position();
    while matches!(p.peek(), Some(c) if is_identifier_part(c)) {
        p.bump();
    }
    p.slice(start)
}

/// Skip a string in code position. Templates may interpolate here, so
/// interpolation is skipped rather than rejected.
fn skip_string(p: &mut LiteralParser<'_>) -> Result<(), CodecError> {
    let start = p.position();
    let quote = p.bump();
    while let Some(c) = p.bump() {
        match c {
            '\\' => {
                p.bump();
            }
            c if Some(c) == quote => return Ok(()),
            '\n' if quote != Some('`') => break,
            _ => {}
        }
    }
    Err(CodecError::malformed("unterminated string", start))
}

/// Encode `value` as source text: banner, declaration with a
/// 4-space-indented literal, then the CommonJS export footer.
///
/// The output is deterministic and decodes back to `value`.
pub fn encode(value: &Value, template: &SourceTemplate) -> Result<String, CodecError> {
    if !is_identifier(&template.binding) {
        return Err(CodecError::Encode(format!(
            "invalid binding name {:?}",
            template.binding
        )));
    }

    let literal = to_pretty(value)?;
    let binding = &template.binding;
    let mut out = String::with_capacity(literal.len() + template.banner.len() + 160);
    out.push_str(template.banner.trim_end());
    out.push_str("\n\n");
    out.push_str(&format!("{} {} = {};\n\n", template.keyword, binding, literal));
    out.push_str(&format!("// {}\n", template.export_note));
    out.push_str("if (typeof module !== 'undefined' && module.exports) {\n");
    out.push_str(&format!("    module.exports = {};\n", binding));
    out.push_str("}\n");
    Ok(out)
}

/// `JSON.stringify(value, null, 4)` layout.
fn to_pretty(value: &Value) -> Result<String, CodecError> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|e| CodecError::Encode(e.to_string()))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if is_identifier_start(c) => chars.all(is_identifier_part),
        _ => false,
    }
}
