//! Template directives
//!
//! The input document is a handlebars template whose helpers drive the
//! generation context:
//!
//! | Helper | Effect |
//! |--------|--------|
//! | `{{title "API"}}` | set the page title, prints nothing |
//! | `{{import "m" "example.com/shop/models"}}` | register an alias, prints nothing |
//! | `{{input "Name"}}` | request body section |
//! | `{{output "m.Name"}}` | response body section |
//!
//! Helper output is written raw. Errors abort the render; the typed error is
//! kept aside so callers see the original kind rather than a template error.

use crate::context::GenerationContext;
use crate::diagnostics::{JsonDocError, JsonDocResult};
use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext, RenderErrorReason,
};
use std::sync::{Arc, Mutex};

type SharedContext = Arc<Mutex<GenerationContext>>;
type ErrorSlot = Arc<Mutex<Option<JsonDocError>>>;

/// Directive names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Title,
    Import,
    Input,
    Output,
}

impl Directive {
    /// All directives
    pub const ALL: [Directive; 4] = [
        Directive::Title,
        Directive::Import,
        Directive::Input,
        Directive::Output,
    ];

    /// Helper name in templates
    pub fn name(&self) -> &'static str {
        match self {
            Directive::Title => "title",
            Directive::Import => "import",
            Directive::Input => "input",
            Directive::Output => "output",
        }
    }

    fn arity(&self) -> usize {
        match self {
            Directive::Import => 2,
            _ => 1,
        }
    }
}

struct DirectiveHelper {
    directive: Directive,
    context: SharedContext,
    error: ErrorSlot,
}

impl DirectiveHelper {
    fn run(&self, h: &Helper<'_>) -> JsonDocResult<String> {
        let args = string_params(h, self.directive)?;
        let mut context = self
            .context
            .lock()
            .map_err(|_| JsonDocError::Template("generation context is poisoned".to_string()))?;

        match self.directive {
            Directive::Title => {
                context.set_title(args[0].as_str());
                Ok(String::new())
            }
            Directive::Import => {
                context.register_import(&args[0], &args[1])?;
                Ok(String::new())
            }
            Directive::Input => context.render_input(&args[0]),
            Directive::Output => context.render_output(&args[0]),
        }
    }

    fn stash(&self, err: JsonDocError) -> String {
        let message = err.to_string();
        if let Ok(mut slot) = self.error.lock() {
            slot.get_or_insert(err);
        }
        message
    }
}

impl HelperDef for DirectiveHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        match self.run(h) {
            Ok(markup) => {
                out.write(&markup)?;
                Ok(())
            }
            Err(err) => Err(RenderErrorReason::Other(self.stash(err)).into()),
        }
    }
}

fn string_params(h: &Helper<'_>, directive: Directive) -> JsonDocResult<Vec<String>> {
    let params = h.params();
    if params.len() != directive.arity() {
        return Err(JsonDocError::Template(format!(
            "{} expects {} argument(s), got {}",
            directive.name(),
            directive.arity(),
            params.len()
        )));
    }
    params
        .iter()
        .map(|p| {
            p.value().as_str().map(str::to_string).ok_or_else(|| {
                JsonDocError::Template(format!(
                    "{} expects string arguments, got {}",
                    directive.name(),
                    p.value()
                ))
            })
        })
        .collect()
}

/// Expands templates against a generation context
pub struct DirectiveEngine {
    registry: Handlebars<'static>,
    context: SharedContext,
    error: ErrorSlot,
}

impl DirectiveEngine {
    /// Register the directives over `context`
    pub fn new(context: GenerationContext) -> Self {
        let context = Arc::new(Mutex::new(context));
        let error: ErrorSlot = Arc::new(Mutex::new(None));

        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        for directive in Directive::ALL {
            registry.register_helper(
                directive.name(),
                Box::new(DirectiveHelper {
                    directive,
                    context: Arc::clone(&context),
                    error: Arc::clone(&error),
                }),
            );
        }

        Self {
            registry,
            context,
            error,
        }
    }

    /// Expand a template into markdown with rendered sections
    pub fn expand(&mut self, template: &str) -> JsonDocResult<String> {
        match self.registry.render_template(template, &serde_json::json!({})) {
            Ok(markdown) => Ok(markdown),
            Err(err) => {
                let stashed = self.error.lock().ok().and_then(|mut slot| slot.take());
                Err(stashed.unwrap_or_else(|| JsonDocError::Template(err.to_string())))
            }
        }
    }

    /// Run `f` against the context
    pub fn with_context<T>(&self, f: impl FnOnce(&mut GenerationContext) -> T) -> JsonDocResult<T> {
        let mut context = self
            .context
            .lock()
            .map_err(|_| JsonDocError::Template("generation context is poisoned".to_string()))?;
        Ok(f(&mut context))
    }
}
