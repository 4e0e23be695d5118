use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::category::LANDING;
use super::{Category, Singleton};

pub const DEFAULT_ROTATION: &str = "daily";

/// A landing page box and the images it rotates through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageBox {
    pub images: Vec<String>,
    /// `daily` or `weekly`.
    pub rotation: String,
    /// Display name in the admin panel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ImageBox {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            rotation: DEFAULT_ROTATION.to_string(),
            label: None,
            extra: Map::new(),
        }
    }
}

impl ImageBox {
    pub fn new(label: Option<String>) -> Self {
        Self {
            label,
            ..Self::default()
        }
    }
}

/// `landing-config.js`: box name to [`ImageBox`], in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandingConfig {
    boxes: Vec<(String, ImageBox)>,
}

impl LandingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.boxes.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ImageBox)> {
        self.boxes.iter().map(|(name, b)| (name.as_str(), b))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&ImageBox> {
        self.boxes.iter().find(|(n, _)| n == name).map(|(_, b)| b)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ImageBox> {
        self.boxes
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, b)| b)
    }

    /// Append a box. Returns `false` and leaves the config untouched when
    /// the name is taken.
    pub fn insert(&mut self, name: impl Into<String>, image_box: ImageBox) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.boxes.push((name, image_box));
        true
    }

    pub fn remove(&mut self, name: &str) -> Option<ImageBox> {
        let index = self.boxes.iter().position(|(n, _)| n == name)?;
        Some(self.boxes.remove(index).1)
    }
}

impl Singleton for LandingConfig {
    const CATEGORY: &'static Category = &LANDING;
}

impl Serialize for LandingConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.boxes.len()))?;
        for (name, image_box) in &self.boxes {
            map.serialize_entry(name, image_box)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LandingConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ConfigVisitor;

        impl<'de> Visitor<'de> for ConfigVisitor {
            type Value = LandingConfig;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of box names to image boxes")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut config = LandingConfig::new();
                while let Some((name, image_box)) = access.next_entry::<String, ImageBox>()? {
                    match config.get_mut(&name) {
                        Some(existing) => *existing = image_box,
                        None => config.boxes.push((name, image_box)),
                    }
                }
                Ok(config)
            }
        }

        deserializer.deserialize_map(ConfigVisitor)
    }
}
