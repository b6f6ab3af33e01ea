use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::priority::{builtin_visuals, PriorityVisual};
use crate::validation::Validator;

/// The resolved, immutable set of priority visuals for one page load.
#[derive(Debug, Clone, PartialEq)]
pub struct PriorityConfiguration {
    visuals: Vec<PriorityVisual>,
    index: HashMap<String, usize>,
    min_name_len: usize,
    max_name_len: usize,
    debug: bool,
}

/// A per-class override candidate and whether it came from the class's canonical name.
struct Candidate {
    value: String,
    canonical: bool,
}

impl PriorityConfiguration {
    /// The built-in priority set with debug disabled.
    pub fn defaults() -> Self {
        Self::assemble(builtin_visuals(), false)
    }

    /// Build a custom default set, e.g. for a deployment with other aliases.
    pub fn from_visuals(visuals: Vec<PriorityVisual>, debug: bool) -> Result<Self, ConfigError> {
        if visuals.is_empty() {
            return Err(ConfigError::Empty);
        }
        let mut seen = HashSet::new();
        for visual in &visuals {
            Validator::validate_visual(visual)?;
            if !seen.insert(visual.name.as_str()) {
                return Err(ConfigError::DuplicateName(visual.name.clone()));
            }
        }
        Ok(Self::assemble(visuals, debug))
    }

    /// Merge an optional override payload onto the built-in defaults.
    pub fn resolve(overrides: Option<&Value>) -> Self {
        Self::defaults().merge(overrides)
    }

    /// Decode a raw JSON payload and merge it onto the built-in defaults.
    /// Undecodable payloads resolve to the defaults.
    pub fn resolve_json(payload: Option<&str>) -> Self {
        let payload = match payload.map(str::trim) {
            Some(p) if !p.is_empty() => p,
            _ => return Self::defaults(),
        };
        match serde_json::from_str::<Value>(payload) {
            Ok(value) => Self::resolve(Some(&value)),
            Err(e) => {
                tracing::warn!("Ignoring undecodable priority configuration: {}", e);
                Self::defaults()
            }
        }
    }

    /// Merge an optional override payload onto this configuration.
    ///
    /// Accepts `{"priorities": {name: {...}}, "debug": bool}` or a bare
    /// `{name: {...}}` map. Colors and icons are keyed by css class, so an
    /// override on one name reaches every alias of that class; when both a
    /// canonical name and an alias carry one, the canonical name wins.
    /// Invalid values are dropped and the existing value kept.
    pub fn merge(mut self, overrides: Option<&Value>) -> Self {
        let Some(payload) = overrides else {
            return self;
        };
        let Some(object) = payload.as_object() else {
            tracing::warn!("Ignoring priority configuration: expected an object");
            return self;
        };

        if let Some(debug_value) = object.get("debug") {
            match debug_value.as_bool() {
                Some(flag) => self.debug = flag,
                None => tracing::warn!("Ignoring non-boolean debug flag: {}", debug_value),
            }
        }

        let entries: Vec<(&String, &Value)> = match object.get("priorities") {
            Some(Value::Object(map)) => map.iter().collect(),
            Some(other) => {
                tracing::warn!("Ignoring priorities override: expected an object, got {}", other);
                return self;
            }
            None => object.iter().filter(|(key, _)| *key != "debug").collect(),
        };

        let canonical = self.canonical_names();
        let mut colors: HashMap<String, Candidate> = HashMap::new();
        let mut icons: HashMap<String, Candidate> = HashMap::new();

        for (name, entry) in entries {
            let Some(visual) = self.get(name) else {
                tracing::debug!("Ignoring override for unknown priority {:?}", name);
                continue;
            };
            let Some(fields) = entry.as_object() else {
                tracing::warn!("Ignoring override for {}: expected an object", name);
                continue;
            };
            let is_canonical = canonical.contains(name.as_str());
            let class = visual.css_class.clone();

            if let Some(color) = string_field(fields, "color", name) {
                match Validator::validate_color(color) {
                    Ok(()) => offer(&mut colors, class.clone(), color, is_canonical),
                    Err(e) => tracing::warn!("Ignoring color override for {}: {}", name, e),
                }
            }
            if let Some(icon) = string_field(fields, "icon", name) {
                match Validator::validate_icon_id(icon) {
                    Ok(()) => offer(&mut icons, class.clone(), icon, is_canonical),
                    Err(e) => tracing::warn!("Ignoring icon override for {}: {}", name, e),
                }
            }
            if let Some(requested) = fields.get("class").and_then(Value::as_str) {
                if requested != class {
                    tracing::debug!(
                        "Ignoring class override for {}: class is fixed to {}",
                        name,
                        class
                    );
                }
            }
        }

        for visual in &mut self.visuals {
            if let Some(color) = colors.get(&visual.css_class) {
                visual.color_hex = color.value.clone();
            }
            if let Some(icon) = icons.get(&visual.css_class) {
                visual.icon_id = icon.value.clone();
            }
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&PriorityVisual> {
        self.index.get(name).map(|&i| &self.visuals[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Priority names in definition order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.visuals.iter().map(|v| v.name.as_str())
    }

    pub fn visuals(&self) -> &[PriorityVisual] {
        &self.visuals
    }

    pub fn len(&self) -> usize {
        self.visuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visuals.is_empty()
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Shortest and longest name, in characters.
    pub fn name_length_bounds(&self) -> (usize, usize) {
        (self.min_name_len, self.max_name_len)
    }

    fn assemble(visuals: Vec<PriorityVisual>, debug: bool) -> Self {
        let index = visuals
            .iter()
            .enumerate()
            .map(|(i, v)| (v.name.clone(), i))
            .collect();
        let lengths = visuals.iter().map(|v| v.name.chars().count());
        let min_name_len = lengths.clone().min().unwrap_or(0);
        let max_name_len = lengths.max().unwrap_or(0);
        Self {
            visuals,
            index,
            min_name_len,
            max_name_len,
            debug,
        }
    }

    /// The first name defined for each css class.
    fn canonical_names(&self) -> HashSet<&str> {
        let mut classes = HashSet::new();
        self.visuals
            .iter()
            .filter(|v| classes.insert(v.css_class.as_str()))
            .map(|v| v.name.as_str())
            .collect()
    }
}

impl Default for PriorityConfiguration {
    fn default() -> Self {
        Self::defaults()
    }
}

fn string_field<'a>(fields: &'a Map<String, Value>, key: &str, name: &str) -> Option<&'a str> {
    let value = fields.get(key)?;
    match value.as_str() {
        Some(s) => Some(s),
        None => {
            tracing::warn!("Ignoring {} override for {}: expected a string", key, name);
            None
        }
    }
}

fn offer(slot: &mut HashMap<String, Candidate>, class: String, value: &str, canonical: bool) {
    let replace = match slot.get(&class) {
        Some(existing) => canonical && !existing.canonical,
        None => true,
    };
    if replace {
        slot.insert(
            class,
            Candidate {
                value: value.to_string(),
                canonical,
            },
        );
    }
}
