//! Handlebars render engine.
//!
//! Helpers are called Handlebars-style: `{{camelCase name}}`,
//! `{{#if (eq language "go")}}`, `{{#repeat 3}}{{@index}}{{/repeat}}` and
//!
//! ```text
//! {{#switch database.type}}
//!   {{#case "postgres"}}pg{{/case}}
//!   {{#default}}none{{/default}}
//! {{/switch}}
//! ```
//!
//! Output is never HTML-escaped.

use std::{
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use handlebars::{
    BlockContext, BlockParams, Context, Handlebars, Helper as HbHelper, HelperDef, HelperResult,
    Output, RenderContext, RenderError, RenderErrorReason, Renderable, ScopedJson, StringOutput,
};
use serde_json::Value;

use stackgen_core::{
    application::ports::{Filesystem, RenderEngine},
    domain::{
        EngineKind, GenerationContext, Helper, HelperError, HelperRegistry, SwitchFrame,
        TemplateError, error::snippet, helpers::{BlockFn, InlineFn},
    },
    error::StackgenResult,
};

/// First line of a handlebars error, bounded. Parse errors append the
/// offending template segment on later lines.
fn reason(err: &impl std::fmt::Display) -> String {
    let message = err.to_string();
    snippet(message.lines().next().unwrap_or_default())
}

const SWITCH_VALUE: &str = "__switch_value";
const SWITCH_MATCHED: &str = "__switch_matched";

/// [`RenderEngine`] backed by the `handlebars` crate.
pub struct HandlebarsEngine {
    registry: Handlebars<'static>,
    filesystem: Arc<dyn Filesystem>,
    frozen: AtomicBool,
}

impl HandlebarsEngine {
    /// Engine with every helper in `helpers` installed.
    pub fn new(filesystem: Arc<dyn Filesystem>, helpers: &HelperRegistry) -> Self {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);

        let mut engine = Self {
            registry,
            filesystem,
            frozen: AtomicBool::new(false),
        };
        for (name, helper) in helpers.iter() {
            engine.install(name, helper.clone());
        }
        engine
    }

    fn install(&mut self, name: &str, helper: Helper) {
        let def: Box<dyn HelperDef + Send + Sync> = match helper {
            Helper::Inline(f) => Box::new(InlineHelper {
                name: name.to_string(),
                f,
            }),
            Helper::Block(f) => Box::new(BlockHelper {
                name: name.to_string(),
                f,
            }),
            Helper::Switch => Box::new(SwitchHelper),
            Helper::Case => Box::new(CaseHelper),
            Helper::Default => Box::new(DefaultHelper),
        };
        self.registry.register_helper(name, def);
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

impl RenderEngine for HandlebarsEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Primary
    }

    fn register_helper(&mut self, name: &str, helper: Helper) -> Result<(), TemplateError> {
        self.ensure_open(name)?;
        self.install(name, helper);
        Ok(())
    }

    fn register_partial(&mut self, name: &str, source: &str) -> Result<(), TemplateError> {
        self.ensure_open(name)?;
        self.registry
            .register_partial(name, source)
            .map_err(|e| TemplateError::render(name, reason(&e), source))
    }

    fn render(
        &self,
        name: &str,
        source: &str,
        context: &GenerationContext,
    ) -> Result<String, TemplateError> {
        self.frozen.store(true, Ordering::Release);
        self.registry
            .render_template(source, context.data())
            .map_err(|e| TemplateError::render(name, reason(&e), source))
    }

    fn render_file(&self, path: &Path, context: &GenerationContext) -> StackgenResult<String> {
        let source = self.filesystem.read_to_string(path)?;
        Ok(self.render(&path.display().to_string(), &source, context)?)
    }
}

// ── Helper adapters ───────────────────────────────────────────────────────────

fn helper_failure(e: HelperError) -> RenderError {
    RenderErrorReason::Other(e.to_string()).into()
}

fn params(h: &HbHelper<'_>) -> Vec<Value> {
    h.params().iter().map(|p| p.value().clone()).collect()
}

fn first_param(h: &HbHelper<'_>) -> Value {
    h.param(0).map(|p| p.value().clone()).unwrap_or(Value::Null)
}

struct InlineHelper {
    name: String,
    f: Arc<InlineFn>,
}

impl HelperDef for InlineHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &HbHelper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        let value = (self.f)(&params(h)).map_err(helper_failure)?;
        tracing::trace!(helper = %self.name, "inline helper evaluated");
        Ok(ScopedJson::Derived(value))
    }
}

struct BlockHelper {
    name: String,
    f: Arc<BlockFn>,
}

impl HelperDef for BlockHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &HbHelper<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let args = params(h);
        let template = h.template();
        let block_param = h.block_param();

        let mut body = |bound: Option<Value>| -> Result<String, HelperError> {
            let Some(t) = template else {
                return Ok(String::new());
            };
            let fail = |e: &dyn std::fmt::Display| HelperError::new(&self.name, e.to_string());

            let mut block = rc.block().cloned().unwrap_or_else(BlockContext::new);
            if let Some(value) = bound {
                block.set_local_var("index", value.clone());
                if let Some(param) = block_param {
                    let mut params = BlockParams::new();
                    params.add_value(param, value).map_err(|e| fail(&e))?;
                    block.set_block_params(params);
                }
            }

            rc.push_block(block);
            let mut buf = StringOutput::new();
            let rendered = t.render(r, ctx, rc, &mut buf);
            rc.pop_block();

            rendered.map_err(|e| fail(&e))?;
            buf.into_string().map_err(|e| fail(&e))
        };

        let text = (self.f)(&args, &mut body).map_err(helper_failure)?;
        out.write(&text)?;
        Ok(())
    }
}

// ── switch / case / default ───────────────────────────────────────────────────
//
// The open frame lives in the local variables of the block `switch` pushes;
// `case` and `default` read it back through `SwitchFrame::resume`.

struct SwitchHelper;

impl HelperDef for SwitchHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &HbHelper<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let frame = SwitchFrame::new(first_param(h));

        let mut block = rc.block().cloned().unwrap_or_else(BlockContext::new);
        block.set_local_var(SWITCH_VALUE, frame.value().clone());
        block.set_local_var(SWITCH_MATCHED, Value::Bool(frame.matched()));

        rc.push_block(block);
        let result = match h.template() {
            Some(t) => t.render(r, ctx, rc, out),
            None => Ok(()),
        };
        rc.pop_block();
        result
    }
}

/// Load the enclosing frame, let `decide` update it, store it back.
fn with_frame(
    rc: &mut RenderContext<'_, '_>,
    helper: &str,
    decide: impl FnOnce(&mut SwitchFrame) -> bool,
) -> Result<bool, RenderError> {
    let outside = || -> RenderError {
        RenderErrorReason::Other(format!("'{helper}' used outside of a 'switch' block")).into()
    };
    let block = rc.block_mut().ok_or_else(outside)?;
    let value = block.get_local_var(SWITCH_VALUE).cloned().ok_or_else(outside)?;
    let matched = block
        .get_local_var(SWITCH_MATCHED)
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let mut frame = SwitchFrame::resume(value, matched);
    let render = decide(&mut frame);
    block.set_local_var(SWITCH_MATCHED, Value::Bool(frame.matched()));
    Ok(render)
}

struct CaseHelper;

impl HelperDef for CaseHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &HbHelper<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let candidate = first_param(h);
        if with_frame(rc, "case", |frame| frame.try_case(&candidate))? {
            if let Some(t) = h.template() {
                t.render(r, ctx, rc, out)?;
            }
        }
        Ok(())
    }
}

struct DefaultHelper;

impl HelperDef for DefaultHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &HbHelper<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        if with_frame(rc, "default", SwitchFrame::take_default)? {
            if let Some(t) = h.template() {
                t.render(r, ctx, rc, out)?;
            }
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
