//! Query-string decoding into a [`TrackingConfig`].
//!
//! Every parameter is optional and falls back to its default. Typed fields
//! that fail to parse reject the whole request with a [`ParamError`] naming
//! the parameter.

use std::collections::HashMap;
use std::str::FromStr;

use shico_types::TrackingConfig;

use crate::error::ParamError;

const COUNT: &str = "a non-negative integer";
const NUMBER: &str = "a number";
const BOOLEAN: &str = "a boolean";

/// Decoded query parameters, first occurrence wins.
struct Query {
    values: HashMap<String, String>,
}

impl Query {
    fn parse(query: &str) -> Self {
        let mut values = HashMap::new();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            values.entry(key.into_owned()).or_insert_with(|| value.into_owned());
        }
        Self { values }
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Aggregation parameters carry an `agg.` prefix; the bare name is an alias.
    fn get_agg(&self, name: &str) -> Option<(String, &str)> {
        let prefixed = format!("agg.{}", name);
        match self.get(&prefixed) {
            Some(v) => Some((prefixed, v)),
            None => self.get(name).map(|v| (name.to_string(), v)),
        }
    }

    fn typed<T: FromStr>(&self, name: &str, expected: &'static str) -> Result<Option<T>, ParamError> {
        self.get(name)
            .map(|raw| coerce(name, raw, expected))
            .transpose()
    }

    fn typed_agg<T: FromStr>(&self, name: &str, expected: &'static str) -> Result<Option<T>, ParamError> {
        self.get_agg(name)
            .map(|(full, raw)| coerce(&full, raw, expected))
            .transpose()
    }

    fn flag(&self, name: &str) -> Result<Option<bool>, ParamError> {
        self.get(name)
            .map(|raw| parse_bool(raw).ok_or_else(|| invalid(name, raw, BOOLEAN)))
            .transpose()
    }

    /// Keys given as an empty string count as absent.
    fn key(&self, name: &str) -> Option<String> {
        self.get(name).filter(|v| !v.is_empty()).map(str::to_string)
    }
}

fn invalid(name: &str, raw: &str, expected: &'static str) -> ParamError {
    ParamError {
        name: name.to_string(),
        value: raw.to_string(),
        expected,
    }
}

fn coerce<T: FromStr>(name: &str, raw: &str, expected: &'static str) -> Result<T, ParamError> {
    raw.trim().parse().map_err(|_| invalid(name, raw, expected))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Build the per-request configuration from a raw query string.
pub fn parse_query(query: Option<&str>) -> Result<TrackingConfig, ParamError> {
    let q = Query::parse(query.unwrap_or_default());
    let mut config = TrackingConfig::default();

    let track = &mut config.track;
    if let Some(n) = q.typed("maxTerms", COUNT)? {
        track.max_terms = n;
    }
    if let Some(n) = q.typed("maxRelatedTerms", COUNT)? {
        track.max_related_terms = n;
    }
    track.start_key = q.key("startKey");
    track.end_key = q.key("endKey");
    if let Some(d) = q.typed("minDist", NUMBER)? {
        track.min_dist = d;
    }
    if let Some(b) = q.typed("wordBoost", NUMBER)? {
        track.word_boost = b;
    }
    if let Some(f) = q.flag("forwards")? {
        track.forwards = f;
    }
    if let Some(s) = q.flag("sumDistances")? {
        track.sum_distances = s;
    }
    if let Some(name) = q.get("algorithm") {
        track.algorithm = name.to_string();
    }

    let agg = &mut config.aggregation;
    if let Some((_, name)) = q.get_agg("weighF") {
        agg.weighting_fn = name.to_string();
    }
    if let Some(p) = q.typed_agg("wfParam", NUMBER)? {
        agg.wf_param = p;
    }
    if let Some(n) = q.typed_agg("yearsInInterval", COUNT)? {
        agg.years_in_interval = n;
    }
    if let Some(n) = q.typed_agg("nWordsPerYear", COUNT)? {
        agg.words_per_year = n;
    }

    Ok(config)
}
