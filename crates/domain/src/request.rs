//! Request-side input types
//!
//! Parameter assembly follows one policy everywhere: an optional value that
//! the caller did not supply is omitted from the request entirely, so the
//! server applies its own defaults. Nothing here ever sends an empty or
//! null placeholder.

use serde::Serialize;

/// Ordered query/form parameter list.
///
/// Thin wrapper over `Vec<(String, String)>` so it serializes directly as a
/// query string or URL-encoded form body.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a key/value pair.
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        self.0.push((key.into(), value.to_string()));
    }

    /// Append a key/value pair only when the value is present.
    pub fn set_opt(&mut self, key: impl Into<String>, value: Option<impl ToString>) {
        if let Some(value) = value {
            self.set(key, value);
        }
    }

    /// Append `key` with `value` unless the caller already supplied `key`.
    pub fn set_default(&mut self, key: &str, value: impl ToString) {
        if !self.contains_key(key) {
            self.set(key, value);
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Move every pair of `other` onto the end of this list.
    pub fn extend(&mut self, other: Params) {
        self.0.extend(other.0);
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Params {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.to_string())).collect())
    }
}

/// Filter for the `sites/` listing.
#[derive(Debug, Clone, Default)]
pub struct SiteFilter {
    /// Restrict to one site number.
    pub site: Option<u32>,
    /// Pass-through query parameters (e.g. a `fields` projection).
    pub extra: Params,
}

/// Filter for the `areas/` listing. The configured site is applied unless
/// `extra` already carries a `site` key.
#[derive(Debug, Clone, Default)]
pub struct AreaFilter {
    pub areacode: Option<String>,
    pub externalid: Option<String>,
    pub extra: Params,
}

/// Filter for the `lines/` listing.
#[derive(Debug, Clone, Default)]
pub struct LineFilter {
    pub areacode: Option<String>,
    pub linecode: Option<String>,
    pub externalid: Option<String>,
    pub extra: Params,
}

/// Filter for the `machines/` listing.
#[derive(Debug, Clone, Default)]
pub struct MachineFilter {
    pub areacode: Option<String>,
    pub linecode: Option<String>,
    pub machinecode: Option<String>,
    pub externalid: Option<String>,
    pub extra: Params,
}

/// The line a pitch record is reported against: by code or by external id.
#[derive(Debug, Clone)]
pub enum LineRef {
    Code(String),
    ExternalId(String),
}

impl LineRef {
    pub fn code(code: impl Into<String>) -> Self {
        Self::Code(code.into())
    }

    pub fn external_id(id: impl Into<String>) -> Self {
        Self::ExternalId(id.into())
    }
}

/// Production counts for one pitch reporting interval.
///
/// With all three unset, `record_pitch_details` has nothing to report and
/// issues no request.
#[derive(Debug, Clone, Copy, Default)]
pub struct PitchCounts {
    /// Parts produced in the interval.
    pub actual: Option<f64>,
    /// Parts scrapped in the interval.
    pub scrap: Option<f64>,
    /// Operators staffing the line during the interval.
    pub operator_count: Option<f64>,
}

impl PitchCounts {
    pub fn is_empty(&self) -> bool {
        self.actual.is_none() && self.scrap.is_none() && self.operator_count.is_none()
    }
}

/// A request to open a maintenance dispatch against a machine.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub dispatchtypecode: String,
    pub description: String,
    pub machinecode: String,
    pub tradecode: Option<String>,
    /// Overrides the configured username when set.
    pub username: Option<String>,
}

impl DispatchRequest {
    pub fn new(
        dispatchtypecode: impl Into<String>,
        description: impl Into<String>,
        machinecode: impl Into<String>,
    ) -> Self {
        Self {
            dispatchtypecode: dispatchtypecode.into(),
            description: description.into(),
            machinecode: machinecode.into(),
            tradecode: None,
            username: None,
        }
    }

    pub fn tradecode(mut self, tradecode: impl Into<String>) -> Self {
        self.tradecode = Some(tradecode.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}
