use std::{
    collections::{BTreeMap, btree_map},
    fmt,
};

use serde::{Deserialize, Serialize};

use crate::spinner::merge::merge;

pub type SpinnerKey = String;
pub type ThemeName = String;
pub type HandleId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpinState {
    #[default]
    Idle,
    Spinning,
}

/// Scalar value accepted by a rendering primitive option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl OptionValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Flag(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u32> for OptionValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Schema-less option bag handed to the rendering primitive untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpinnerOptions(BTreeMap<String, OptionValue>);

impl SpinnerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<OptionValue>,
    {
        pairs
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<OptionValue>,
    ) -> Option<OptionValue> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, OptionValue> {
        self.0.iter()
    }
}

impl FromIterator<(String, OptionValue)> for SpinnerOptions {
    fn from_iter<T: IntoIterator<Item = (String, OptionValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<(String, OptionValue)> for SpinnerOptions {
    fn extend<T: IntoIterator<Item = (String, OptionValue)>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl IntoIterator for SpinnerOptions {
    type Item = (String, OptionValue);
    type IntoIter = btree_map::IntoIter<String, OptionValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a SpinnerOptions {
    type Item = (&'a String, &'a OptionValue);
    type IntoIter = btree_map::Iter<'a, String, OptionValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Process-wide defaults and named themes.
///
/// Handles never hold references into this value; every merge produces an
/// owned record, so later `set_defaults`/`set_theme` calls cannot reach back
/// into options already handed to a primitive.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpinnerConfig {
    #[serde(default)]
    defaults: SpinnerOptions,
    #[serde(default)]
    themes: BTreeMap<ThemeName, SpinnerOptions>,
}

impl SpinnerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_defaults(&mut self, options: SpinnerOptions) {
        self.defaults = options;
    }

    pub fn set_theme(&mut self, name: impl Into<ThemeName>, options: SpinnerOptions) {
        self.themes.insert(name.into(), options);
    }

    pub fn defaults(&self) -> &SpinnerOptions {
        &self.defaults
    }

    pub fn theme(&self, name: &str) -> Option<&SpinnerOptions> {
        self.themes.get(name)
    }

    pub fn themes(&self) -> &BTreeMap<ThemeName, SpinnerOptions> {
        &self.themes
    }

    pub fn merged(&self, theme_name: Option<&str>, instance: &SpinnerOptions) -> SpinnerOptions {
        let theme = theme_name.and_then(|name| self.theme(name));
        merge(&self.defaults, theme, instance)
    }
}
