//! Generation context
//!
//! Owns all mutable state of one run: the renderer with its link table and
//! namespace cache, the registered import aliases and the document title.
//! Directives are evaluated against it strictly in template order.

use crate::diagnostics::{DiagnosticsCollector, JsonDocError, JsonDocResult};
use crate::html::escape_text;
use crate::index::{DeclarationIndex, Namespace, LOCAL_NAMESPACE};
use crate::queue::slug;
use crate::render::TypeRenderer;
use indexmap::IndexMap;
use std::sync::Arc;

/// Direction of a documented body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Request body
    Input,
    /// Response body
    Output,
}

impl Direction {
    /// Heading label
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Input => "Input",
            Direction::Output => "Output",
        }
    }

    fn id_prefix(&self) -> &'static str {
        match self {
            Direction::Input => "input-",
            Direction::Output => "output-",
        }
    }
}

/// State of one generation run
pub struct GenerationContext {
    renderer: TypeRenderer,
    local: Arc<Namespace>,
    aliases: IndexMap<String, Arc<Namespace>>,
    title: Option<String>,
    sections: usize,
}

impl GenerationContext {
    /// Create a context and load the local package
    pub fn new(index: Box<dyn DeclarationIndex>) -> JsonDocResult<Self> {
        let mut renderer = TypeRenderer::new(index);
        let local = renderer.lookup(LOCAL_NAMESPACE, None)?;
        tracing::debug!(package = %local.package, "generation context ready");
        Ok(Self {
            renderer,
            local,
            aliases: IndexMap::new(),
            title: None,
            sections: 0,
        })
    }

    /// The documented package
    pub fn local(&self) -> &Arc<Namespace> {
        &self.local
    }

    /// Render the request body section for `name`
    pub fn render_input(&mut self, name: &str) -> JsonDocResult<String> {
        self.render_section(Direction::Input, name)
    }

    /// Render the response body section for `name`
    pub fn render_output(&mut self, name: &str) -> JsonDocResult<String> {
        self.render_section(Direction::Output, name)
    }

    fn render_section(&mut self, direction: Direction, name: &str) -> JsonDocResult<String> {
        let (namespace, ident) = self.resolve_root(name)?;
        let heading_name = match direction {
            Direction::Input => name,
            Direction::Output => ident.as_str(),
        };

        let root = self.renderer.render_root(namespace, &ident)?;
        let heading_id = self
            .renderer
            .links_mut()
            .unique_anchor(&format!("{}{}", direction.id_prefix(), slug(heading_name)));
        self.sections += 1;

        let mut out = String::new();
        match &root.anchor {
            Some(anchor) => out.push_str(&format!("<div id=\"{}\">\n", anchor)),
            None => out.push_str("<div>\n"),
        }
        out.push_str(&format!(
            "<h3 id=\"{}\">{} ({})</h3>\n",
            heading_id,
            direction.label(),
            escape_text(heading_name)
        ));
        out.push_str(&root.body);
        out.push_str("</div>\n");
        Ok(out)
    }

    /// Split an optionally qualified name into its namespace and identifier
    fn resolve_root(&self, name: &str) -> JsonDocResult<(Arc<Namespace>, String)> {
        match name.split_once('.') {
            Some((alias, ident)) => {
                let namespace = self
                    .aliases
                    .get(alias)
                    .ok_or_else(|| JsonDocError::UnregisteredAlias(alias.to_string()))?;
                Ok((Arc::clone(namespace), ident.to_string()))
            }
            None => Ok((Arc::clone(&self.local), name.to_string())),
        }
    }

    /// Set the document title; the last call wins
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Title set by the template, if any
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Make the package at `path` available under `alias`
    pub fn register_import(&mut self, alias: &str, path: &str) -> JsonDocResult<()> {
        if alias.is_empty() || alias.contains('.') {
            return Err(JsonDocError::Template(format!(
                "invalid import alias {:?}",
                alias
            )));
        }
        if self.aliases.contains_key(alias) {
            return Err(JsonDocError::DuplicateImportAlias(alias.to_string()));
        }
        let namespace = self.renderer.lookup(path, Some(&self.local))?;
        tracing::debug!(alias = %alias, path = %path, package = %namespace.package, "registered import");
        self.aliases.insert(alias.to_string(), namespace);
        Ok(())
    }

    /// Number of input and output sections rendered
    pub fn sections(&self) -> usize {
        self.sections
    }

    /// Number of type bodies rendered
    pub fn tables_rendered(&self) -> usize {
        self.renderer.tables_rendered()
    }

    /// Diagnostics collected so far
    pub fn diagnostics(&self) -> &DiagnosticsCollector {
        self.renderer.diagnostics()
    }

    /// Take the collected diagnostics
    pub fn take_diagnostics(&mut self) -> DiagnosticsCollector {
        self.renderer.take_diagnostics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{sample_index, MemoryIndex};
    use pretty_assertions::assert_eq;

    fn context() -> GenerationContext {
        let index = sample_index().with_package(
            "example.com/shop/models",
            &[(
                "item.go",
                "package models\n\ntype Item struct {\n\tSKU string `json:\"sku\"`\n}\n\nconst Limit = 10\n",
            )],
        );
        GenerationContext::new(Box::new(index)).unwrap()
    }

    #[test]
    fn test_input_section() {
        let mut ctx = context();
        let html = ctx.render_input("helloOutput").unwrap();
        assert_eq!(
            html,
            "<div id=\"type-helloOutput\">\n\
             <h3 id=\"input-helloOutput\">Input (helloOutput)</h3>\n\
             <p>JSON object with the following fields:</p>\n\
             <table>\n<tr>\n<th>Key name</th>\n<th>Value type</th>\n<th>Description</th>\n</tr>\n\
             <tr>\n<td>\"msg\"</td>\n<td>string</td>\n<td>Greetings message for the provided name</td>\n</tr>\n\
             </table>\n\
             </div>\n"
        );
        assert_eq!(ctx.sections(), 1);
    }

    #[test]
    fn test_output_heading_uses_bare_name() {
        let mut ctx = context();
        ctx.register_import("m", "example.com/shop/models").unwrap();
        let input = ctx.render_input("m.Item").unwrap();
        assert!(input.contains("<h3 id=\"input-m-Item\">Input (m.Item)</h3>"));
        let output = ctx.render_output("m.Item").unwrap();
        assert!(output.starts_with("<div>\n<h3 id=\"output-Item\">Output (Item)</h3>"));
    }

    #[test]
    fn test_unregistered_alias() {
        let mut ctx = context();
        let err = ctx.render_input("m.Item").unwrap_err();
        assert_eq!(err.kind(), "unregistered-alias");
    }

    #[test]
    fn test_duplicate_alias() {
        let mut ctx = context();
        ctx.register_import("m", "example.com/shop/models").unwrap();
        let err = ctx
            .register_import("m", "example.com/shop/models")
            .unwrap_err();
        assert_eq!(err.kind(), "duplicate-import-alias");
    }

    #[test]
    fn test_resolution_errors() {
        let mut ctx = context();
        assert_eq!(ctx.render_input("missing").unwrap_err().kind(), "name-not-found");
        assert_eq!(ctx.render_output("handler").unwrap_err().kind(), "not-a-type");

        ctx.register_import("m", "example.com/shop/models").unwrap();
        assert_eq!(ctx.render_output("m.Limit").unwrap_err().kind(), "not-a-type");
        assert_eq!(
            ctx.register_import("x", "example.com/unknown").unwrap_err().kind(),
            "package-not-found"
        );
    }

    #[test]
    fn test_same_type_twice_gets_unique_heading_ids() {
        let mut ctx = context();
        let first = ctx.render_input("helloOutput").unwrap();
        let second = ctx.render_input("helloOutput").unwrap();
        assert!(first.contains("id=\"input-helloOutput\""));
        assert!(second.starts_with("<div>\n<h3 id=\"input-helloOutput-2\">"));
    }

    #[test]
    fn test_references_link_across_sections() {
        let mut ctx = context();
        let input = ctx.render_input("helloInput").unwrap();
        assert!(input.contains("<h4 id=\"type-size\">"));
        let output = ctx.render_output("itemGetOutput").unwrap();
        assert!(output.contains("<td><a href=\"#type-size\">size</a></td>"));
        assert!(!output.contains("<h4 id=\"type-size\">"));
    }

    #[test]
    fn test_title_last_write_wins() {
        let mut ctx = GenerationContext::new(Box::new(sample_index())).unwrap();
        assert_eq!(ctx.title(), None);
        ctx.set_title("First");
        ctx.set_title("Second");
        assert_eq!(ctx.title(), Some("Second"));
    }

    #[test]
    fn test_missing_local_package() {
        let result = GenerationContext::new(Box::new(MemoryIndex::new()));
        assert_eq!(result.err().map(|e| e.kind()), Some("package-not-found"));
    }
}
