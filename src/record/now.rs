use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::category::{PLAYING, READING};
use super::{Category, Singleton};

/// The "What I'm reading" box.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentReading {
    pub title: String,
    pub author: String,
    pub cover: String,
    pub note: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Singleton for CurrentReading {
    const CATEGORY: &'static Category = &READING;
}

/// The "What I'm playing" box.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentPlaying {
    pub title: String,
    pub developer: String,
    pub cover: String,
    pub note: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Singleton for CurrentPlaying {
    const CATEGORY: &'static Category = &PLAYING;
}
