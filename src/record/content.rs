use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::category::{BOOKS, DOCUMENTARIES, EVENTS, PODCASTS, TIMELINE, WRITING};
use super::{lenient_string, Category, Record};

macro_rules! impl_record {
    ($ty:ty, $category:expr) => {
        impl Record for $ty {
            const CATEGORY: &'static Category = &$category;

            fn id(&self) -> Option<&str> {
                self.id.as_deref().filter(|id| !id.is_empty())
            }

            fn set_id(&mut self, id: String) {
                self.id = Some(id);
            }

            fn title(&self) -> &str {
                &self.title
            }
        }
    };
}

/// A published book.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Book {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub publisher: String,
    #[serde(deserialize_with = "lenient_string")]
    pub year: String,
    pub description: String,
    pub cover: String,
    pub publisher_link: Option<String>,
    pub reviews_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookshop_link: Option<String>,
    /// Fields this version does not know about, kept as written.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl_record!(Book, BOOKS);

/// A talk, discussion or launch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Event {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `HH:MM`, 24 hour clock.
    pub time: String,
    pub timezone: String,
    pub location: String,
    pub description: String,
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl_record!(Event, EVENTS);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Writing {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub outlet: String,
    /// Free-form display date, e.g. `25 September 2024`.
    pub date: String,
    pub excerpt: String,
    pub link: String,
    pub outlet_logo: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl_record!(Writing, WRITING);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Podcast {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub podcast_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub year: String,
    pub embed_url: String,
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl_record!(Podcast, PODCASTS);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Documentary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub production_company: String,
    #[serde(deserialize_with = "lenient_string")]
    pub year: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    pub role: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watch_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl_record!(Documentary, DOCUMENTARIES);

/// One entry of the career timeline (`projects.js`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimelineEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    /// One of `book`, `exhibition`, `fellowship`, `education`, `teaching`,
    /// `media`, `talk`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Display date, e.g. `2018-2019` or `June 2025`.
    pub date: String,
    /// `YYYY-MM-DD`, used for ordering.
    pub sort_date: String,
    /// `academic`, `public`, `international` or `national`.
    pub scope: String,
    pub description: String,
    pub link: Option<String>,
    pub venue: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl_record!(TimelineEntry, TIMELINE);

impl TimelineEntry {
    pub fn type_label(&self) -> &str {
        timeline_type_label(&self.kind)
    }
}

/// Display label of a timeline entry type. Unknown types are shown as is.
pub fn timeline_type_label(kind: &str) -> &str {
    match kind {
        "book" => "Publication",
        "exhibition" => "Exhibition",
        "fellowship" => "Fellowship",
        "education" => "Education",
        "teaching" => "Teaching",
        "media" => "Media",
        "talk" => "Talk",
        other => other,
    }
}
