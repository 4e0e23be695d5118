//! Records - typed entries of the site's content files.
//!
//! Every content file is described by a [`Category`]: where it lives, the
//! binding it declares, the banner written above it, which fields a record
//! must carry and how listings are ordered. Collection files hold an array
//! of [`Record`]s; singleton files hold one [`Singleton`] object.
//!
//! ## Example
//!
//! ```ignore
//! use folio::{Book, Record};
//!
//! let text = Book::CATEGORY.encode(&serde_json::json!([]))?;
//! let value = Book::CATEGORY.decode(&text)?;
//! ```

mod category;
mod content;
mod landing;
mod now;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::codec::{self, CodecError, SourceTemplate};

pub use category::{
    Category, SortPolicy, BOOKS, DOCUMENTARIES, EVENTS, LANDING, PLAYING, PODCASTS, READING,
    TIMELINE, WRITING,
};
pub use content::{timeline_type_label, Book, Documentary, Event, Podcast, TimelineEntry, Writing};
pub use landing::{ImageBox, LandingConfig};
pub use now::{CurrentPlaying, CurrentReading};

/// An entry of a collection file.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// The file this record type lives in.
    const CATEGORY: &'static Category;

    /// Stable identifier, if one has been assigned.
    fn id(&self) -> Option<&str>;

    fn set_id(&mut self, id: String);

    /// Human readable title, used in commit messages and id slugs.
    fn title(&self) -> &str;
}

/// The single object held by a singleton file.
pub trait Singleton: Serialize + DeserializeOwned + Clone + Default + Send + Sync {
    const CATEGORY: &'static Category;
}

impl Category {
    /// The comment block written above the declaration.
    pub fn banner(&self) -> String {
        format!("/**\n * {}\n * {}\n */", self.title, self.summary)
    }

    pub fn template(&self) -> SourceTemplate {
        SourceTemplate::new(self.banner(), self.binding).with_export_note(self.export_note)
    }

    /// Decode this category's declaration from file text.
    pub fn decode(&self, text: &str) -> Result<Value, CodecError> {
        codec::decode_named(text, self.binding).map(|decl| decl.value)
    }

    /// Encode a body as this category's file text.
    pub fn encode(&self, body: &Value) -> Result<String, CodecError> {
        codec::encode(body, &self.template())
    }

    /// Required fields that are absent, null or blank in `record`.
    pub fn missing_fields(&self, record: &Value) -> Vec<&'static str> {
        self.required
            .iter()
            .copied()
            .filter(|field| match record.get(*field) {
                Some(Value::String(s)) => s.trim().is_empty(),
                Some(Value::Null) | None => true,
                Some(_) => false,
            })
            .collect()
    }
}

/// Lower-case slug of `title`: runs of characters outside `[a-z0-9]` become
/// a single `-`, with no leading or trailing dash.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("item");
    }
    slug
}

/// First id derived from `title` that is not in `taken`.
pub fn unique_id<'a>(title: &str, taken: impl Iterator<Item = &'a str> + Clone) -> String {
    let base = slugify(title);
    let free = |candidate: &str| !taken.clone().any(|id| id == candidate);
    if free(base.as_str()) {
        return base;
    }
    (2..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| free(candidate.as_str()))
        .unwrap_or(base)
}

/// Give every object in `items` without a string `id` one of its own.
///
/// A numeric id is kept as its decimal text. Anything else (missing, null,
/// blank, or a non-scalar) is replaced by an id derived from the title,
/// inserted as the first key. Returns how many ids were assigned.
pub fn assign_ids(items: &mut [Value]) -> usize {
    let mut assigned = 0;
    for i in 0..items.len() {
        let existing = match &items[i] {
            Value::Object(map) => map.get("id").cloned(),
            _ => continue,
        };
        let title = items[i]
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let taken = || items.iter().filter_map(|v| v.get("id")?.as_str());

        let id = match existing {
            Some(Value::String(s)) if !s.is_empty() => continue,
            Some(Value::Number(n)) if !taken().any(|id| id == n.to_string()) => {
                tracing::debug!(id = %n, title = %title, "numeric record id kept as text");
                n.to_string()
            }
            Some(Value::Null) | Some(Value::String(_)) | None => unique_id(&title, taken()),
            Some(other) => {
                let id = unique_id(&title, taken());
                tracing::warn!(replaced = %other, id = %id, title = %title, "record id replaced");
                id
            }
        };

        if let Value::Object(map) = &mut items[i] {
            match map.get_mut("id") {
                Some(slot) => *slot = Value::String(id),
                None => {
                    let mut rebuilt = Map::with_capacity(map.len() + 1);
                    rebuilt.insert("id".to_string(), Value::String(id));
                    rebuilt.extend(std::mem::take(map));
                    *map = rebuilt;
                }
            }
            assigned += 1;
        }
    }
    assigned
}

/// Shape an edited record like the one it replaces: `null` fields the stored
/// record never had are dropped, and a string field stored as a number with
/// the same text goes back to being a number.
pub fn conform(updated: &mut Value, stored: &Value) {
    let (Value::Object(updated), Value::Object(stored)) = (updated, stored) else {
        return;
    };
    updated.retain(|key, value| !value.is_null() || stored.contains_key(key));
    for (key, value) in updated.iter_mut() {
        if let (Value::String(text), Some(Value::Number(n))) = (&*value, stored.get(key)) {
            if *text == n.to_string() {
                *value = Value::Number(n.clone());
            }
        }
    }
}

/// Accept a string or a number (years are written both ways), or null as
/// empty.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(D::Error::custom(format!(
            "expected a string or number, found {}",
            other
        ))),
    }
}
