//! Nested candidate configurations.

use std::collections::BTreeMap;

/// A configuration value: a number or a nested configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ConfigValue {
    Number(f64),
    Nested(Config),
}

/// A fully materialized configuration, as produced by enumerating a
/// [`ParameterSpace`](super::ParameterSpace).
///
/// Keys are addressed with dotted paths (`"tool.depth"`) through
/// [`get_path`](Config::get_path) and [`set_path`](Config::set_path).
///
/// # Examples
///
/// ```
/// use u_tuner::space::Config;
///
/// let mut c = Config::new();
/// c.set_path("tool.depth", 3.0);
/// c.set_path("speed", 1.5);
/// assert_eq!(c.get_path("tool.depth"), Some(3.0));
/// assert_eq!(c.get("speed"), Some(1.5));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Config {
    entries: BTreeMap<String, ConfigValue>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ConfigValue)> {
        self.entries.iter()
    }

    /// Top-level numeric value.
    pub fn get(&self, key: &str) -> Option<f64> {
        match self.entries.get(key) {
            Some(ConfigValue::Number(v)) => Some(*v),
            _ => None,
        }
    }

    /// Top-level nested configuration.
    pub fn nested(&self, key: &str) -> Option<&Config> {
        match self.entries.get(key) {
            Some(ConfigValue::Nested(c)) => Some(c),
            _ => None,
        }
    }

    /// Sets a top-level value, replacing whatever was there.
    pub fn insert(&mut self, key: impl Into<String>, value: ConfigValue) {
        self.entries.insert(key.into(), value);
    }

    /// Numeric value at a dotted path.
    pub fn get_path(&self, path: &str) -> Option<f64> {
        let segments: Vec<&str> = path.split('.').collect();
        self.get_segments(&segments)
    }

    /// Sets the numeric value at a dotted path, creating intermediate
    /// levels and replacing numbers that stand in the way.
    pub fn set_path(&mut self, path: &str, value: f64) {
        let segments: Vec<&str> = path.split('.').collect();
        self.set_segments(&segments, value);
    }

    pub(crate) fn get_segments<S: AsRef<str>>(&self, segments: &[S]) -> Option<f64> {
        let (last, parents) = segments.split_last()?;
        let mut node = self;
        for seg in parents {
            node = node.nested(seg.as_ref())?;
        }
        node.get(last.as_ref())
    }

    pub(crate) fn set_segments<S: AsRef<str>>(&mut self, segments: &[S], value: f64) {
        let Some((last, parents)) = segments.split_last() else {
            return;
        };
        let mut node = self;
        for seg in parents {
            let slot = node
                .entries
                .entry(seg.as_ref().to_string())
                .or_insert_with(|| ConfigValue::Nested(Config::new()));
            if let ConfigValue::Number(_) = slot {
                *slot = ConfigValue::Nested(Config::new());
            }
            node = match slot {
                ConfigValue::Nested(c) => c,
                ConfigValue::Number(_) => unreachable!("slot was just made nested"),
            };
        }
        node.entries
            .insert(last.as_ref().to_string(), ConfigValue::Number(value));
    }

    /// Overlays `other` onto `self`: nested levels merge, numbers replace.
    pub fn merge(&mut self, other: &Config) {
        for (key, value) in &other.entries {
            match (self.entries.get_mut(key), value) {
                (Some(ConfigValue::Nested(mine)), ConfigValue::Nested(theirs)) => {
                    mine.merge(theirs);
                }
                _ => {
                    self.entries.insert(key.clone(), value.clone());
                }
            }
        }
    }

    /// Every numeric leaf keyed by its dotted path.
    pub fn flatten(&self) -> BTreeMap<String, f64> {
        let mut out = BTreeMap::new();
        self.flatten_into("", &mut out);
        out
    }

    fn flatten_into(&self, prefix: &str, out: &mut BTreeMap<String, f64>) {
        for (key, value) in &self.entries {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            match value {
                ConfigValue::Number(v) => {
                    out.insert(path, *v);
                }
                ConfigValue::Nested(c) => c.flatten_into(&path, out),
            }
        }
    }

    /// Inverse of [`flatten`](Config::flatten).
    pub fn from_flat(flat: &BTreeMap<String, f64>) -> Self {
        let mut config = Config::new();
        for (path, &value) in flat {
            config.set_path(path, value);
        }
        config
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Config {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut config = Config::new();
        for (key, value) in iter {
            config.set_path(&key.into(), value);
        }
        config
    }
}
