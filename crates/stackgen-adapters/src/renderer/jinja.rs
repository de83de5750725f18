//! Jinja render engine backed by `minijinja`.
//!
//! Inline helpers are exposed both as functions and as filters, so
//! `{{ camelCase(name) }}` and `{{ name | camelCase }}` are equivalent.
//! Block helpers use call blocks; the switch frame is passed explicitly:
//!
//! ```text
//! {% call(i) repeat(3) %}{{ i }}{% endcall %}
//! {% call(sw) switch(database.type) %}
//!   {% call case(sw, "postgres") %}pg{% endcall %}
//!   {% call default(sw) %}none{% endcall %}
//! {% endcall %}
//! ```

use std::{
    path::Path,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use minijinja::{
    AutoEscape, Environment, Error, ErrorKind, State,
    value::{Object, Rest, Value},
};

use stackgen_core::{
    application::ports::{Filesystem, RenderEngine},
    domain::{
        EngineKind, GenerationContext, Helper, HelperError, HelperRegistry, SwitchFrame,
        TemplateError,
        helpers::{BlockFn, InlineFn},
    },
    error::StackgenResult,
};

/// [`RenderEngine`] backed by a `minijinja` environment.
pub struct JinjaEngine {
    env: Environment<'static>,
    filesystem: Arc<dyn Filesystem>,
    frozen: AtomicBool,
}

impl JinjaEngine {
    pub fn new(filesystem: Arc<dyn Filesystem>, helpers: &HelperRegistry) -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.set_auto_escape_callback(|_: &str| AutoEscape::None);

        let mut engine = Self {
            env,
            filesystem,
            frozen: AtomicBool::new(false),
        };
        for (name, helper) in helpers.iter() {
            engine.install(name, helper.clone());
        }
        engine
    }

    fn install(&mut self, name: &str, helper: Helper) {
        let name = name.to_string();
        match helper {
            Helper::Inline(f) => {
                let call = inline(f);
                self.env.add_filter(name.clone(), call.clone());
                self.env.add_function(name, call);
            }
            Helper::Block(f) => {
                let call = block(name.clone(), f);
                self.env.add_function(name, call);
            }
            Helper::Switch => self.env.add_function(name, switch),
            Helper::Case => self.env.add_function(name, case),
            Helper::Default => self.env.add_function(name, default),
        }
    }

    fn ensure_open(&self, name: &str) -> Result<(), TemplateError> {
        if self.frozen.load(Ordering::Acquire) {
            return Err(TemplateError::RegistryFrozen {
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

impl RenderEngine for JinjaEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Secondary
    }

    fn register_helper(&mut self, name: &str, helper: Helper) -> Result<(), TemplateError> {
        self.ensure_open(name)?;
        self.install(name, helper);
        Ok(())
    }

    fn register_partial(&mut self, name: &str, source: &str) -> Result<(), TemplateError> {
        self.ensure_open(name)?;
        self.env
            .add_template_owned(name.to_string(), source.to_string())
            .map_err(|e| TemplateError::render(name, e.to_string(), source))
    }

    fn render(
        &self,
        name: &str,
        source: &str,
        context: &GenerationContext,
    ) -> Result<String, TemplateError> {
        self.frozen.store(true, Ordering::Release);
        self.env
            .render_named_str(name, source, context.data())
            .map_err(|e| TemplateError::render(name, e.to_string(), source))
    }

    fn render_file(&self, path: &Path, context: &GenerationContext) -> StackgenResult<String> {
        let source = self.filesystem.read_to_string(path)?;
        Ok(self.render(&path.display().to_string(), &source, context)?)
    }
}

// ── Value conversion ──────────────────────────────────────────────────────────

fn helper_error(e: HelperError) -> Error {
    Error::new(ErrorKind::InvalidOperation, e.to_string())
}

fn to_json(value: &Value) -> Result<serde_json::Value, Error> {
    serde_json::to_value(value).map_err(|e| Error::new(ErrorKind::InvalidOperation, e.to_string()))
}

fn to_json_args(args: &[Value]) -> Result<Vec<serde_json::Value>, Error> {
    args.iter().map(to_json).collect()
}

/// Split a call-block invocation into its `caller` macro and positional args.
fn split_call<'a>(args: &'a [Value], helper: &str) -> Result<(Value, &'a [Value]), Error> {
    let caller = args
        .last()
        .filter(|v| v.is_kwargs())
        .and_then(|kwargs| kwargs.get_attr("caller").ok())
        .filter(|c| !c.is_undefined())
        .ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidOperation,
                format!("'{helper}' must be used as a call block"),
            )
        })?;
    Ok((caller, &args[..args.len() - 1]))
}

/// Invoke `caller`, passing `bound` only if the call block declares a
/// parameter for it.
fn call_body(state: &State, caller: &Value, bound: Option<Value>) -> Result<String, Error> {
    let rendered = match bound {
        Some(value) => match caller.call(state, &[value]) {
            Err(e) if e.kind() == ErrorKind::TooManyArguments => caller.call(state, &[]),
            other => other,
        },
        None => caller.call(state, &[]),
    }?;
    Ok(rendered.to_string())
}

// ── Helper adapters ───────────────────────────────────────────────────────────

fn inline(
    f: Arc<InlineFn>,
) -> impl Fn(Rest<Value>) -> Result<Value, Error> + Clone + Send + Sync + 'static {
    move |args: Rest<Value>| {
        let out = f(&to_json_args(&args)?).map_err(helper_error)?;
        Ok(Value::from_serialize(&out))
    }
}

fn block(
    name: String,
    f: Arc<BlockFn>,
) -> impl Fn(&State, Rest<Value>) -> Result<Value, Error> + Send + Sync + 'static {
    move |state: &State, args: Rest<Value>| {
        let (caller, positional) = split_call(&args, &name)?;
        let json_args = to_json_args(positional)?;

        let mut body = |bound: Option<serde_json::Value>| -> Result<String, HelperError> {
            call_body(state, &caller, bound.as_ref().map(Value::from_serialize))
                .map_err(|e| HelperError::new(&name, e.to_string()))
        };

        let text = f(&json_args, &mut body).map_err(helper_error)?;
        Ok(Value::from_safe_string(text))
    }
}

#[derive(Debug)]
struct SwitchState(Mutex<SwitchFrame>);

impl Object for SwitchState {}

fn frame_arg<'a>(args: &'a [Value], helper: &str) -> Result<&'a SwitchState, Error> {
    args.first()
        .and_then(|v| v.downcast_object_ref::<SwitchState>())
        .ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidOperation,
                format!("'{helper}' expects the frame of an enclosing 'switch' as first argument"),
            )
        })
}

fn decide(
    frame: &SwitchState,
    helper: &str,
    pick: impl FnOnce(&mut SwitchFrame) -> bool,
) -> Result<bool, Error> {
    let mut guard = frame.0.lock().map_err(|_| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("'{helper}': switch state poisoned"),
        )
    })?;
    Ok(pick(&mut guard))
}

fn switch(state: &State, args: Rest<Value>) -> Result<Value, Error> {
    let (caller, positional) = split_call(&args, "switch")?;
    let value = positional
        .first()
        .map(to_json)
        .transpose()?
        .unwrap_or(serde_json::Value::Null);
    let frame = Value::from_object(SwitchState(Mutex::new(SwitchFrame::new(value))));
    Ok(Value::from_safe_string(call_body(state, &caller, Some(frame))?))
}

fn case(state: &State, args: Rest<Value>) -> Result<Value, Error> {
    let (caller, positional) = split_call(&args, "case")?;
    let frame = frame_arg(positional, "case")?;
    let candidate = positional
        .get(1)
        .map(to_json)
        .transpose()?
        .unwrap_or(serde_json::Value::Null);

    if decide(frame, "case", |f| f.try_case(&candidate))? {
        return Ok(Value::from_safe_string(call_body(state, &caller, None)?));
    }
    Ok(Value::from(""))
}

fn default(state: &State, args: Rest<Value>) -> Result<Value, Error> {
    let (caller, positional) = split_call(&args, "default")?;
    let frame = frame_arg(positional, "default")?;

    if decide(frame, "default", SwitchFrame::take_default)? {
        return Ok(Value::from_safe_string(call_body(state, &caller, None)?));
    }
    Ok(Value::from(""))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::MemoryFilesystem;
    use serde_json::json;

    fn engine() -> JinjaEngine {
        JinjaEngine::new(Arc::new(MemoryFilesystem::new()), &HelperRegistry::builtin())
    }

    fn ctx(data: serde_json::Value) -> GenerationContext {
        GenerationContext::from_value(data)
    }

    fn render(source: &str, data: serde_json::Value) -> String {
        engine().render("test", source, &ctx(data)).unwrap()
    }

    #[test]
    fn substitutes_without_escaping_and_keeps_trailing_newline() {
        assert_eq!(
            render("{{ name }} <{{ tag }}>\n", json!({"name": "a&b", "tag": "<x>"})),
            "a&b <<x>>\n"
        );
    }

    #[test]
    fn helpers_work_as_functions_and_filters() {
        let data = json!({"name": "billing-api"});
        assert_eq!(render("{{ pascalCase(name) }}", data.clone()), "BillingApi");
        assert_eq!(render("{{ name | snakeCase }}", data.clone()), "billing_api");
        assert_eq!(render("{{ name | replace('-', '.') }}", data), "billing.api");
    }

    #[test]
    fn comparison_helpers_drive_conditionals() {
        assert_eq!(
            render("{% if eq(language, 'go') %}yes{% endif %}", json!({"language": "go"})),
            "yes"
        );
    }

    #[test]
    fn repeat_binds_index_when_declared() {
        assert_eq!(render("{% call(i) repeat(3) %}{{ i }}{% endcall %}", json!({})), "012");
        assert_eq!(render("{% call repeat(2) %}x{% endcall %}", json!({})), "xx");
    }

    #[test]
    fn switch_renders_first_match_only() {
        let source = "{% call(sw) switch(kind) %}\
                      {% call case(sw, 'a') %}A{% endcall %}\
                      {% call case(sw, 'b') %}B{% endcall %}\
                      {% call case(sw, 'b') %}B2{% endcall %}\
                      {% call default(sw) %}D{% endcall %}\
                      {% endcall %}";
        assert_eq!(render(source, json!({"kind": "b"})), "B");
        assert_eq!(render(source, json!({"kind": "q"})), "D");
    }

    #[test]
    fn case_without_frame_fails() {
        let err = engine()
            .render("t", "{% call case(1, 2) %}x{% endcall %}", &ctx(json!({})))
            .unwrap_err();
        assert!(err.to_string().contains("switch"), "{err}");
    }

    #[test]
    fn partials_are_includable() {
        let mut e = engine();
        e.register_partial("header", "// {{ name }}").unwrap();
        let out = e
            .render("t", "{% include 'header' %}!", &ctx(json!({"name": "svc"})))
            .unwrap();
        assert_eq!(out, "// svc!");
    }

    #[test]
    fn render_error_names_template() {
        let err = engine()
            .render("broken.j2", "{% if %}", &ctx(json!({})))
            .unwrap_err();
        match err {
            TemplateError::Render {
                template, snippet, ..
            } => {
                assert_eq!(template, "broken.j2");
                assert_eq!(snippet, "{% if %}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn registry_is_frozen_after_first_render() {
        let mut e = engine();
        e.render("t", "x", &ctx(json!({}))).unwrap();
        assert!(matches!(
            e.register_helper("late", Helper::inline(|_| Ok(serde_json::Value::Null))),
            Err(TemplateError::RegistryFrozen { .. })
        ));
    }
}
