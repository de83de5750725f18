//! The template helper surface shared by every render engine.
//!
//! Helpers are plain functions over JSON values. Inline helpers map
//! arguments to a value; block helpers additionally receive a `body` closure
//! that renders the enclosed block, optionally binding a value for it (the
//! iteration index, for `repeat`). Switch/case/default are a dedicated
//! variant: each engine keeps a [`SwitchFrame`] on its own render stack and
//! threads it explicitly from `switch` to its `case`/`default` children.

use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde_json::{Map, Value, json};
use thiserror::Error;

use super::condition::is_truthy;
use super::inflection;

/// Upper bound on `repeat` iterations.
pub const MAX_REPEAT: u64 = 10_000;

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("helper '{helper}': {message}")]
pub struct HelperError {
    pub helper: String,
    pub message: String,
}

impl HelperError {
    pub fn new(helper: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            helper: helper.into(),
            message: message.into(),
        }
    }
}

pub type HelperResult<T> = Result<T, HelperError>;

/// Renders the body of a block helper, with an optional value bound for it.
pub type BlockBody<'a> = dyn FnMut(Option<Value>) -> HelperResult<String> + 'a;

pub type InlineFn = dyn Fn(&[Value]) -> HelperResult<Value> + Send + Sync;
pub type BlockFn = dyn Fn(&[Value], &mut BlockBody<'_>) -> HelperResult<String> + Send + Sync;

/// A named helper.
#[derive(Clone)]
pub enum Helper {
    Inline(Arc<InlineFn>),
    Block(Arc<BlockFn>),
    /// Opens a switch frame over its first argument.
    Switch,
    /// Renders its body if its argument matches the enclosing switch value
    /// and no earlier case matched.
    Case,
    /// Renders its body if no case of the enclosing switch matched.
    Default,
}

impl Helper {
    pub fn inline<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> HelperResult<Value> + Send + Sync + 'static,
    {
        Self::Inline(Arc::new(f))
    }

    pub fn block<F>(f: F) -> Self
    where
        F: Fn(&[Value], &mut BlockBody<'_>) -> HelperResult<String> + Send + Sync + 'static,
    {
        Self::Block(Arc::new(f))
    }

    pub fn is_block(&self) -> bool {
        !matches!(self, Self::Inline(_))
    }
}

impl fmt::Debug for Helper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Inline(_) => "Inline",
            Self::Block(_) => "Block",
            Self::Switch => "Switch",
            Self::Case => "Case",
            Self::Default => "Default",
        };
        f.write_str(kind)
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Name → helper mapping.
///
/// Engines copy the registry into their own helper tables at construction,
/// so a registry is never shared mutably between render calls.
#[derive(Debug, Clone, Default)]
pub struct HelperRegistry {
    helpers: BTreeMap<String, Helper>,
}

impl HelperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with every built-in helper.
    pub fn builtin() -> Self {
        let mut r = Self::new();

        // ── case ────────────────────────────────────────────────────────────
        r.text_fn("camelCase", inflection::camel_case);
        r.text_fn("pascalCase", inflection::pascal_case);
        r.text_fn("kebabCase", inflection::kebab_case);
        r.text_fn("snakeCase", inflection::snake_case);
        r.text_fn("constantCase", inflection::constant_case);
        r.text_fn("dotCase", inflection::dot_case);
        r.text_fn("pathCase", inflection::path_case);

        // ── inflection ──────────────────────────────────────────────────────
        r.text_fn("pluralize", inflection::pluralize);
        r.text_fn("singularize", inflection::singularize);

        // ── string ──────────────────────────────────────────────────────────
        r.text_fn("upperCase", |s| s.to_uppercase());
        r.text_fn("lowerCase", |s| s.to_lowercase());
        r.text_fn("capitalize", inflection::capitalize_first);
        r.text_fn("titleCase", inflection::title_case);
        r.text_fn("trim", |s| s.trim().to_string());
        r.register("replace", Helper::inline(replace));
        r.register(
            "concat",
            Helper::inline(|args| Ok(Value::String(args.iter().map(as_text).collect()))),
        );

        // ── comparison and logic ────────────────────────────────────────────
        r.register("eq", Helper::inline(|args| Ok(json!(arg(args, 0) == arg(args, 1)))));
        r.register("ne", Helper::inline(|args| Ok(json!(arg(args, 0) != arg(args, 1)))));
        r.ordering("lt", |o| o.is_lt());
        r.ordering("gt", |o| o.is_gt());
        r.ordering("lte", |o| o.is_le());
        r.ordering("gte", |o| o.is_ge());
        r.register(
            "and",
            Helper::inline(|args| Ok(json!(!args.is_empty() && args.iter().all(is_truthy)))),
        );
        r.register("or", Helper::inline(|args| Ok(json!(args.iter().any(is_truthy)))));
        r.register("not", Helper::inline(|args| Ok(json!(!is_truthy(arg(args, 0))))));

        // ── array ───────────────────────────────────────────────────────────
        r.register("includes", Helper::inline(includes));
        r.register("join", Helper::inline(join));
        r.register("length", Helper::inline(|args| Ok(json!(length(arg(args, 0))))));
        r.register("first", Helper::inline(|args| Ok(edge(arg(args, 0), false))));
        r.register("last", Helper::inline(|args| Ok(edge(arg(args, 0), true))));

        // ── object ──────────────────────────────────────────────────────────
        r.register("json", Helper::inline(to_json));
        r.register("keys", Helper::inline(|args| Ok(object_parts(arg(args, 0), Part::Keys))));
        r.register("values", Helper::inline(|args| Ok(object_parts(arg(args, 0), Part::Values))));
        r.register("entries", Helper::inline(|args| Ok(object_parts(arg(args, 0), Part::Entries))));

        // ── date ────────────────────────────────────────────────────────────
        r.register("now", Helper::inline(|_| Ok(json!(Utc::now().to_rfc3339()))));
        r.register("year", Helper::inline(|_| Ok(json!(Utc::now().year()))));
        r.register("formatDate", Helper::inline(format_date));

        // ── blocks ──────────────────────────────────────────────────────────
        r.register("repeat", Helper::block(repeat));
        r.register("switch", Helper::Switch);
        r.register("case", Helper::Case);
        r.register("default", Helper::Default);

        r
    }

    /// Add or replace a helper.
    pub fn register(&mut self, name: impl Into<String>, helper: Helper) {
        self.helpers.insert(name.into(), helper);
    }

    /// Copy every helper from `other`, replacing same-named entries.
    pub fn extend(&mut self, other: &HelperRegistry) {
        for (name, helper) in &other.helpers {
            self.helpers.insert(name.clone(), helper.clone());
        }
    }

    pub fn get(&self, name: &str) -> Option<&Helper> {
        self.helpers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.helpers.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.helpers.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Helper)> {
        self.helpers.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.helpers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.helpers.is_empty()
    }

    fn text_fn(&mut self, name: &'static str, f: fn(&str) -> String) {
        self.register(
            name,
            Helper::inline(move |args| Ok(Value::String(f(&as_text(arg(args, 0)))))),
        );
    }

    fn ordering(&mut self, name: &'static str, pick: fn(std::cmp::Ordering) -> bool) {
        self.register(
            name,
            Helper::inline(move |args| {
                Ok(json!(compare(arg(args, 0), arg(args, 1)).is_some_and(pick)))
            }),
        );
    }
}

// ============================================================================
// Switch state
// ============================================================================

/// State of one open `switch` block.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchFrame {
    value: Value,
    matched: bool,
}

impl SwitchFrame {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            matched: false,
        }
    }

    /// Rebuild a frame an engine persisted between `case` calls.
    pub fn resume(value: Value, matched: bool) -> Self {
        Self { value, matched }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn matched(&self) -> bool {
        self.matched
    }

    /// Whether a `case` with `candidate` should render. At most one case per
    /// frame ever returns `true`.
    pub fn try_case(&mut self, candidate: &Value) -> bool {
        if self.matched || !loosely_equal(&self.value, candidate) {
            return false;
        }
        self.matched = true;
        true
    }

    /// Whether `default` should render: only if no case matched yet.
    pub fn take_default(&mut self) -> bool {
        if self.matched {
            return false;
        }
        self.matched = true;
        true
    }
}

// ============================================================================
// Built-in implementations
// ============================================================================

static NULL: Value = Value::Null;

fn arg(args: &[Value], i: usize) -> &Value {
    args.get(i).unwrap_or(&NULL)
}

/// Text form of a value as it would appear in rendered output.
pub fn as_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn loosely_equal(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }
    let scalar = |v: &Value| matches!(v, Value::String(_) | Value::Number(_) | Value::Bool(_));
    scalar(a) && scalar(b) && as_text(a) == as_text(b)
}

fn compare(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn replace(args: &[Value]) -> HelperResult<Value> {
    if args.len() < 3 {
        return Err(HelperError::new(
            "replace",
            "expects (text, search, replacement)",
        ));
    }
    let text = as_text(&args[0]);
    let from = as_text(&args[1]);
    if from.is_empty() {
        return Ok(Value::String(text));
    }
    Ok(Value::String(text.replace(&from, &as_text(&args[2]))))
}

fn includes(args: &[Value]) -> HelperResult<Value> {
    let needle = arg(args, 1);
    let found = match arg(args, 0) {
        Value::Array(items) => items.iter().any(|v| v == needle),
        Value::String(s) => s.contains(&as_text(needle)),
        _ => false,
    };
    Ok(json!(found))
}

fn join(args: &[Value]) -> HelperResult<Value> {
    let sep = match args.get(1) {
        Some(Value::Null) | None => ",".to_string(),
        Some(v) => as_text(v),
    };
    match arg(args, 0) {
        Value::Array(items) => Ok(Value::String(
            items.iter().map(as_text).collect::<Vec<_>>().join(&sep),
        )),
        Value::Null => Ok(Value::String(String::new())),
        other => Err(HelperError::new(
            "join",
            format!("expects an array, got {other}"),
        )),
    }
}

fn edge(value: &Value, last: bool) -> Value {
    let items = value.as_array().map(Vec::as_slice).unwrap_or(&[]);
    let item = if last { items.last() } else { items.first() };
    item.cloned().unwrap_or(Value::Null)
}

fn length(value: &Value) -> usize {
    match value {
        Value::Array(a) => a.len(),
        Value::Object(o) => o.len(),
        Value::String(s) => s.chars().count(),
        _ => 0,
    }
}

fn to_json(args: &[Value]) -> HelperResult<Value> {
    let value = arg(args, 0);
    let text = if is_truthy(arg(args, 1)) {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| HelperError::new("json", e.to_string()))?;
    Ok(Value::String(text))
}

enum Part {
    Keys,
    Values,
    Entries,
}

fn object_parts(value: &Value, part: Part) -> Value {
    let Some(map) = value.as_object() else {
        return Value::Array(Vec::new());
    };
    let items = map.iter().map(|(k, v)| match part {
        Part::Keys => Value::String(k.clone()),
        Part::Values => v.clone(),
        Part::Entries => {
            let mut entry = Map::new();
            entry.insert("key".into(), Value::String(k.clone()));
            entry.insert("value".into(), v.clone());
            Value::Object(entry)
        }
    });
    Value::Array(items.collect())
}

/// `formatDate()`, `formatDate(format)` or `formatDate(date, format)`.
///
/// `date` is RFC 3339 or `YYYY-MM-DD`; the format uses strftime syntax.
fn format_date(args: &[Value]) -> HelperResult<Value> {
    let (date, format) = match args {
        [] => (Utc::now(), DEFAULT_DATE_FORMAT.to_string()),
        [fmt] => (Utc::now(), as_text(fmt)),
        [date, fmt, ..] => (parse_date(date)?, as_text(fmt)),
    };

    let mut out = String::new();
    write!(out, "{}", date.format(&format))
        .map_err(|_| HelperError::new("formatDate", format!("invalid format '{format}'")))?;
    Ok(Value::String(out))
}

fn parse_date(value: &Value) -> HelperResult<DateTime<Utc>> {
    let text = as_text(value);
    if text.is_empty() || text == "now" {
        return Ok(Utc::now());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(&text) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(&text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| HelperError::new("formatDate", format!("cannot parse date '{text}'")))
}

fn repeat(args: &[Value], body: &mut BlockBody<'_>) -> HelperResult<String> {
    let count = arg(args, 0)
        .as_u64()
        .ok_or_else(|| HelperError::new("repeat", "expects a non-negative integer count"))?;
    if count > MAX_REPEAT {
        return Err(HelperError::new(
            "repeat",
            format!("count {count} exceeds the limit of {MAX_REPEAT}"),
        ));
    }
    let mut out = String::new();
    for i in 0..count {
        out.push_str(&body(Some(json!(i)))?);
    }
    Ok(out)
}
