//! Recovery of structured reports from free-form model output
//!
//! Model answers are routinely *almost* JSON: wrapped in prose or code
//! fences, with trailing commas, bare keys or single quotes. Recovery is an
//! ordered chain of pure string transforms, each tried only when the
//! previous parse failed:
//!
//! 1. [`extract_candidate`], parsed as-is ([`RecoveryStage::Direct`])
//! 2. [`normalize_light`] ([`RecoveryStage::Light`])
//! 3. [`normalize_aggressive`] on top of the light output ([`RecoveryStage::Aggressive`])
//!
//! When all three fail the caller synthesizes a report
//! ([`RecoveryStage::Fallback`]). Transforms that touch structure only
//! rewrite text outside double-quoted string literals.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

static FENCED_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)```json\s*(.*?)\s*```").expect("valid regex"));
static BRACED_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static TRAILING_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*([}\]])").expect("valid regex"));
static TRAILING_COMMAS_LOOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\s*,)+\s*([}\]])").expect("valid regex"));
static REPEATED_COMMAS: Lazy<Regex> = Lazy::new(|| Regex::new(r",(?:\s*,)+").expect("valid regex"));
static BARE_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([{,]\s*)([A-Za-z_][A-Za-z0-9_]*)\s*:").expect("valid regex"));
static LOOSE_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([{,]\s*)([A-Za-z_][A-Za-z0-9_\-]*)\s*:").expect("valid regex")
});
static SINGLE_QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r"'([^'\\]*)'").expect("valid regex"));
static UNQUOTED_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#":\s*([^\s"{\[,}\]][^,}\]]*)"#).expect("valid regex"));

/// How a report was obtained from the model answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryStage {
    /// The extracted candidate was already strict JSON
    Direct,
    /// Parsed after light normalization
    Light,
    /// Parsed after aggressive normalization
    Aggressive,
    /// Nothing parsed; sections were synthesized from the product record
    Fallback,
}

impl RecoveryStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Light => "light",
            Self::Aggressive => "aggressive",
            Self::Fallback => "fallback",
        }
    }
}

/// Every parsing strategy failed
#[derive(Debug, Clone, thiserror::Error)]
#[error("format recovery exhausted: {reason}")]
pub struct RecoveryExhausted {
    pub reason: String,
}

/// Pick the JSON candidate out of a model answer
///
/// A fenced ```json block wins; otherwise the span from the first `{` to
/// the last `}`.
pub fn extract_candidate(raw: &str) -> Option<String> {
    if let Some(caps) = FENCED_JSON.captures(raw) {
        let inner = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
        if !inner.is_empty() {
            return Some(inner.to_string());
        }
    }
    BRACED_SPAN.find(raw).map(|m| m.as_str().to_string())
}

/// Whitespace cleanup, trailing commas, bare keys and single quotes
pub fn normalize_light(candidate: &str) -> String {
    let flattened = candidate
        .replace("\\n", " ")
        .replace(['\n', '\r', '\t'], " ");
    let collapsed = WHITESPACE_RUN.replace_all(&flattened, " ");

    let requoted = outside_strings(collapsed.trim(), |segment| {
        SINGLE_QUOTED
            .replace_all(segment, |caps: &Captures| {
                format!("\"{}\"", caps[1].replace('"', "\\\""))
            })
            .into_owned()
    });

    outside_strings(&requoted, |segment| {
        let segment = TRAILING_COMMA.replace_all(segment, "$1");
        BARE_KEY.replace_all(&segment, "$1\"$2\":").into_owned()
    })
}

/// Looser comma cleanup, key quoting with dashes, and quoting of bare values
///
/// Best effort: values that contain `,` `}` or `]` are cut at that character.
pub fn normalize_aggressive(light: &str) -> String {
    let commas = outside_strings(light, |segment| {
        let segment = REPEATED_COMMAS.replace_all(segment, ",");
        TRAILING_COMMAS_LOOSE.replace_all(&segment, "$1").into_owned()
    });

    outside_strings(&commas, |segment| {
        let segment = LOOSE_KEY.replace_all(segment, "$1\"$2\":");
        UNQUOTED_VALUE
            .replace_all(&segment, |caps: &Captures| quote_bare_value(&caps[1]))
            .into_owned()
    })
}

fn quote_bare_value(value: &str) -> String {
    let trimmed = value.trim();
    let keep = matches!(trimmed, "true" | "false" | "null")
        || trimmed.parse::<f64>().map(|v| v.is_finite()).unwrap_or(false);
    if keep {
        format!(": {}", trimmed)
    } else {
        format!(": \"{}\"", trimmed.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

/// Apply `transform` to the text between double-quoted string literals
///
/// Escapes inside literals are honoured; an unterminated literal runs to the
/// end of the input and is left untouched.
pub fn outside_strings<F>(input: &str, transform: F) -> String
where
    F: Fn(&str) -> String,
{
    let mut output = String::with_capacity(input.len() + 16);
    let mut segment_start = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in input.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
                output.push_str(&input[segment_start..=idx]);
                segment_start = idx + 1;
            }
        } else if ch == '"' {
            output.push_str(&transform(&input[segment_start..idx]));
            in_string = true;
            segment_start = idx;
        }
    }

    let rest = &input[segment_start..];
    if in_string {
        output.push_str(rest);
    } else {
        output.push_str(&transform(rest));
    }
    output
}

/// A report schema the recovery chain can target
pub trait ReportSchema: DeserializeOwned {
    /// False when the parse produced nothing but defaults
    fn has_content(&self) -> bool;
}

/// Strict parse of a candidate into a report schema
///
/// The text must be a JSON object that deserializes into `T` and leaves
/// its core sections filled. A lone wrapper key (`{"report": {...}}`) is
/// looked through once.
pub fn parse_strict<T: ReportSchema>(text: &str) -> Result<T, String> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(|e| e.to_string())?;
    let object = value
        .as_object()
        .ok_or_else(|| "top-level JSON value is not an object".to_string())?;

    let report: T = serde_json::from_value(value.clone()).map_err(|e| e.to_string())?;
    if report.has_content() {
        return Ok(report);
    }

    if let Some(inner) = object.values().next().filter(|v| object.len() == 1 && v.is_object()) {
        if let Ok(report) = serde_json::from_value::<T>(inner.clone()) {
            if report.has_content() {
                return Ok(report);
            }
        }
    }
    Err("JSON object carries no report sections".to_string())
}

/// Run the recovery chain over a raw model answer
pub fn recover<T: ReportSchema>(raw: &str) -> Result<(T, RecoveryStage), RecoveryExhausted> {
    let candidate = extract_candidate(raw).ok_or_else(|| RecoveryExhausted {
        reason: "no JSON object found in model output".to_string(),
    })?;

    match parse_strict(&candidate) {
        Ok(report) => return Ok((report, RecoveryStage::Direct)),
        Err(e) => debug!("Direct parse failed: {}", e),
    }

    let light = normalize_light(&candidate);
    match parse_strict(&light) {
        Ok(report) => return Ok((report, RecoveryStage::Light)),
        Err(e) => debug!("Parse after light normalization failed: {}", e),
    }

    let aggressive = normalize_aggressive(&light);
    match parse_strict(&aggressive) {
        Ok(report) => Ok((report, RecoveryStage::Aggressive)),
        Err(e) => {
            warn!("Parse after aggressive normalization failed: {}", e);
            Err(RecoveryExhausted { reason: e })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_extract_fenced_block() {
        let raw = "Here is your report:\n```json\n{\"a\": 1}\n```\nGood luck!";
        assert_eq!(extract_candidate(raw).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn test_extract_braced_span() {
        let raw = "Sure! {\"a\": {\"b\": 2}} Hope this helps.";
        assert_eq!(extract_candidate(raw).unwrap(), "{\"a\": {\"b\": 2}}");
    }

    #[test]
    fn test_extract_nothing() {
        assert!(extract_candidate("not json at all").is_none());
    }

    #[test]
    fn test_outside_strings_leaves_literals() {
        let out = outside_strings(r#"{a: "x, b: y", c: 1}"#, |s| s.to_uppercase());
        assert_eq!(out, r#"{A: "x, b: y", C: 1}"#);
    }

    #[test]
    fn test_outside_strings_handles_escapes() {
        let out = outside_strings(r#"{"q": "say \"hi\", k: v"}"#, |s| s.replace(' ', ""));
        assert_eq!(out, r#"{"q":"say \"hi\", k: v"}"#);
    }

    #[test]
    fn test_light_removes_trailing_commas() {
        let out = normalize_light("{\"a\": [1, 2,], \"b\": 3,}");
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value, json!({"a": [1, 2], "b": 3}));
    }

    #[test]
    fn test_light_quotes_bare_keys() {
        let out = normalize_light("{customerPersona: \"Runners, age: 25-40\", score: 4}");
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["customerPersona"], "Runners, age: 25-40");
        assert_eq!(value["score"], 4);
    }

    #[test]
    fn test_light_converts_single_quotes() {
        let out = normalize_light("{'positioning': 'premium', \"note\": \"it's fine\"}");
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["positioning"], "premium");
        assert_eq!(value["note"], "it's fine");
    }

    #[test]
    fn test_light_flattens_raw_newlines() {
        let out = normalize_light("{\"a\": \"line one\nline two\"}");
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["a"], "line one line two");
    }

    #[test]
    fn test_aggressive_quotes_bare_values() {
        let light = normalize_light("{budget: 500 per month, testQuantity: 50, ok: true}");
        assert!(serde_json::from_str::<Value>(&light).is_err());

        let out = normalize_aggressive(&light);
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["budget"], "500 per month");
        assert_eq!(value["testQuantity"], 50);
        assert_eq!(value["ok"], true);
    }

    #[test]
    fn test_aggressive_handles_double_commas_and_dashed_keys() {
        let out = normalize_aggressive("{\"a\": 1,, launch-plan: \"soon\", }");
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value, json!({"a": 1, "launch-plan": "soon"}));
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Named {
        #[serde(default)]
        name: String,
    }

    impl ReportSchema for Named {
        fn has_content(&self) -> bool {
            !self.name.is_empty()
        }
    }

    #[test]
    fn test_recover_stages() {
        let (named, stage) = recover::<Named>("{\"name\": \"x\"}").unwrap();
        assert_eq!(named.name, "x");
        assert_eq!(stage, RecoveryStage::Direct);

        let (_, stage) = recover::<Named>("```json\n{name: 'x',}\n```").unwrap();
        assert_eq!(stage, RecoveryStage::Light);

        let (named, stage) = recover::<Named>("{name: bare words here}").unwrap();
        assert_eq!(named.name, "bare words here");
        assert_eq!(stage, RecoveryStage::Aggressive);
    }

    #[test]
    fn test_recover_rejects_non_objects() {
        assert!(recover::<Named>("not json at all").is_err());
        assert!(recover::<Named>("{{{{").is_err());
    }

    #[test]
    fn test_recover_schema_mismatch_is_a_failure() {
        assert!(recover::<Named>("{\"name\": [1, 2]}").is_err());
    }

    #[test]
    fn test_recover_rejects_objects_without_content() {
        assert!(recover::<Named>("{}").is_err());
        assert!(recover::<Named>("{\"error\": \"content filtered\"}").is_err());
        assert!(recover::<Named>("{\"name\": \"\"}").is_err());
    }

    #[test]
    fn test_recover_looks_through_single_wrapper() {
        let (named, stage) = recover::<Named>("{\"report\": {\"name\": \"x\"}}").unwrap();
        assert_eq!(named.name, "x");
        assert_eq!(stage, RecoveryStage::Direct);

        assert!(recover::<Named>("{\"report\": {\"name\": \"x\"}, \"extra\": {}}").is_err());
    }
}
