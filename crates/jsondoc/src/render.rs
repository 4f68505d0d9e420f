//! Type renderer
//!
//! Turns a type declaration into HTML: a table of JSON fields for structs,
//! a one-line description for anything else. Every named type that appears
//! in a table is linked and queued, so draining the queue yields the full
//! transitive set of tables reachable from the root.

use crate::diagnostics::{Diagnostic, DiagnosticsCollector, JsonDocError, JsonDocResult};
use crate::html::escape_text;
use crate::index::{DeclarationIndex, Namespace, Scope};
use crate::queue::{LinkKey, LinkTable, RenderItem, RenderQueue};
use crate::tag::{resolve_embedded, resolve_field_name, EmbeddedRule, FieldName, JsonKey};
use crate::types::{is_builtin_type, Declaration, Member, TypeExpr};
use std::collections::HashMap;
use std::sync::Arc;

/// Upper bound on alias chains followed when flattening embedded members
const MAX_ALIAS_HOPS: usize = 16;

/// Rendered root declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootRender {
    /// Anchor claimed by the root, `None` if it was already linked earlier
    pub anchor: Option<String>,
    /// Root body followed by every queued table
    pub body: String,
}

/// Where a type expression occurs; names synthetic tables for inline structs
#[derive(Debug, Clone)]
struct Site {
    name: String,
    line: usize,
}

impl Site {
    fn element(&self) -> Site {
        if self.name.ends_with(" element") {
            self.clone()
        } else {
            Site {
                name: format!("{} element", self.name),
                line: self.line,
            }
        }
    }

    fn is_element(&self) -> bool {
        self.name.ends_with(" element")
    }
}

/// Outcome of resolving a named reference
enum Target {
    /// Predeclared type
    Builtin(String),
    /// Declaration found
    Declared {
        namespace: Arc<Namespace>,
        decl: Declaration,
    },
    /// Could not be linked; rendered as text
    Unresolved(String),
}

/// One table row before rendering
struct Field {
    key: JsonKey,
    ty: TypeExpr,
    scope: Scope,
    description: String,
    depth: usize,
    line: usize,
}

/// Renders declarations and the tables they reach
pub struct TypeRenderer {
    index: Box<dyn DeclarationIndex>,
    links: LinkTable,
    queue: RenderQueue,
    diagnostics: DiagnosticsCollector,
    tables: usize,
}

impl TypeRenderer {
    /// Create a renderer over a declaration index
    pub fn new(index: Box<dyn DeclarationIndex>) -> Self {
        Self {
            index,
            links: LinkTable::new(),
            queue: RenderQueue::new(),
            diagnostics: DiagnosticsCollector::new(),
            tables: 0,
        }
    }

    /// Load a namespace through the index
    pub fn lookup(&mut self, path: &str, importer: Option<&Namespace>) -> JsonDocResult<Arc<Namespace>> {
        self.index.lookup(path, importer)
    }

    /// Link table of the run
    pub fn links_mut(&mut self) -> &mut LinkTable {
        &mut self.links
    }

    /// Diagnostics collected so far
    pub fn diagnostics(&self) -> &DiagnosticsCollector {
        &self.diagnostics
    }

    /// Take the collected diagnostics
    pub fn take_diagnostics(&mut self) -> DiagnosticsCollector {
        std::mem::take(&mut self.diagnostics)
    }

    /// Number of type bodies rendered
    pub fn tables_rendered(&self) -> usize {
        self.tables
    }

    /// Render a declaration and drain the queue it fills.
    ///
    /// The declaration claims its anchor first so references back to it link
    /// to this section.
    pub fn render_root(&mut self, namespace: Arc<Namespace>, name: &str) -> JsonDocResult<RootRender> {
        let (decl, ty) = namespace.resolve_type(name)?;
        let (decl, ty) = (decl.clone(), ty.clone());

        let (anchor, claimed) = self
            .links
            .assign(LinkKey::declaration(namespace.id, &decl.name), &decl.name);
        let scope = Scope::of_declaration(namespace, &decl);
        let site = Site {
            name: decl.name.clone(),
            line: decl.line,
        };

        let mut body = String::new();
        self.render_body(&ty, &scope, &site, &mut body)?;
        self.drain(&mut body)?;

        Ok(RootRender {
            anchor: claimed.then_some(anchor),
            body,
        })
    }

    /// Emit every queued item, including the ones queued while draining
    fn drain(&mut self, out: &mut String) -> JsonDocResult<()> {
        while let Some(item) = self.queue.pop() {
            tracing::debug!(anchor = %item.anchor, pending = self.queue.len(), "rendering type");
            out.push_str(&format!(
                "<h4 id=\"{}\">Type {}</h4>\n",
                item.anchor,
                escape_text(&item.title)
            ));
            if let Some(doc) = &item.doc {
                out.push_str(&format!("<p>{}</p>\n", escape_text(doc)));
            }
            let site = Site {
                name: item.title.clone(),
                line: 0,
            };
            self.render_body(&item.ty, &item.scope, &site, out)?;
        }
        Ok(())
    }

    // ========== Bodies ==========

    fn render_body(&mut self, ty: &TypeExpr, scope: &Scope, site: &Site, out: &mut String) -> JsonDocResult<()> {
        self.tables += 1;

        let mut prefix = String::new();
        let mut containers = 0;
        let mut current = ty.strip_pointers();
        loop {
            match current {
                TypeExpr::Array { elem } => {
                    prefix.push_str(if containers == 0 { "array of " } else { "arrays of " });
                    current = elem.strip_pointers();
                }
                TypeExpr::Map { key, value } => {
                    check_map_key(key)?;
                    prefix.push_str(if containers == 0 { "object of " } else { "objects of " });
                    current = value.strip_pointers();
                }
                _ => break,
            }
            containers += 1;
        }

        match current {
            TypeExpr::Struct { members } => {
                let plural = if containers > 0 { "s" } else { "" };
                self.render_struct(members, scope, &prefix, plural, out)
            }
            other if containers == 0 => {
                let text = self.describe(other, scope, site, false)?;
                out.push_str(&format!("<p>JSON value of type {}.</p>\n", text));
                Ok(())
            }
            other => {
                let text = self.describe(other, scope, &site.element(), true)?;
                out.push_str(&format!("<p>JSON {}{}.</p>\n", prefix, text));
                Ok(())
            }
        }
    }

    fn render_struct(
        &mut self,
        members: &[Member],
        scope: &Scope,
        prefix: &str,
        plural: &str,
        out: &mut String,
    ) -> JsonDocResult<()> {
        let mut fields = Vec::new();
        let mut visiting = Vec::new();
        self.collect_fields(members, scope, 0, &mut visiting, &mut fields)?;
        let fields = dominant_fields(fields);

        if fields.is_empty() {
            out.push_str(&format!("<p>JSON {}object{} with no fields.</p>\n", prefix, plural));
            return Ok(());
        }

        out.push_str(&format!(
            "<p>JSON {}object{} with the following fields:</p>\n",
            prefix, plural
        ));
        out.push_str("<table>\n<tr>\n<th>Key name</th>\n<th>Value type</th>\n<th>Description</th>\n</tr>\n");
        for field in fields {
            let site = Site {
                name: field.key.name.clone(),
                line: field.line,
            };
            let value_type = self.describe(&field.ty, &field.scope, &site, false)?;
            let mut description = escape_text(&field.description);
            if field.key.optional {
                if !description.is_empty() {
                    description.push(' ');
                }
                description.push_str("(optional)");
            }
            out.push_str(&format!(
                "<tr>\n<td>{}</td>\n<td>{}</td>\n<td>{}</td>\n</tr>\n",
                escape_text(&field.key.quoted()?),
                value_type,
                description
            ));
        }
        out.push_str("</table>\n");
        Ok(())
    }

    /// Gather visible fields, flattening embedded structs
    fn collect_fields(
        &mut self,
        members: &[Member],
        scope: &Scope,
        depth: usize,
        visiting: &mut Vec<LinkKey>,
        fields: &mut Vec<Field>,
    ) -> JsonDocResult<()> {
        for member in members {
            let description = member
                .description
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string();

            let Some(name) = &member.name else {
                let type_name = member
                    .embedded_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| member.ty.to_string());
                match resolve_embedded(&type_name, member.tag.as_deref())? {
                    EmbeddedRule::Suppressed => {}
                    EmbeddedRule::Named(key) => fields.push(Field {
                        key,
                        ty: member.ty.clone(),
                        scope: scope.clone(),
                        description,
                        depth,
                        line: member.line,
                    }),
                    EmbeddedRule::Flatten => {
                        let Some((key, inner, inner_scope)) = self.embedded_struct(&member.ty, scope) else {
                            tracing::debug!(member = %type_name, "skipping embedded member without struct type");
                            continue;
                        };
                        if visiting.contains(&key) {
                            continue;
                        }
                        visiting.push(key);
                        self.collect_fields(&inner, &inner_scope, depth + 1, visiting, fields)?;
                        visiting.pop();
                    }
                }
                continue;
            };

            match resolve_field_name(name, member.tag.as_deref())? {
                FieldName::Suppressed => {}
                FieldName::Visible(key) => fields.push(Field {
                    key,
                    ty: member.ty.clone(),
                    scope: scope.clone(),
                    description,
                    depth,
                    line: member.line,
                }),
            }
        }
        Ok(())
    }

    /// Struct members behind an embedded type, following declarations.
    /// Anything unresolvable or not struct-like yields `None`.
    fn embedded_struct(&mut self, ty: &TypeExpr, scope: &Scope) -> Option<(LinkKey, Vec<Member>, Scope)> {
        let mut current = ty.strip_pointers().clone();
        let mut scope = scope.clone();
        for _ in 0..MAX_ALIAS_HOPS {
            let (namespace, decl) = match &current {
                TypeExpr::Ident { name } if !is_builtin_type(name) => {
                    let decl = scope.namespace.get(name)?.clone();
                    (Arc::clone(&scope.namespace), decl)
                }
                TypeExpr::Qualified { package, name } => {
                    let path = scope.import_path(package)?.to_string();
                    let namespace = self.index.lookup(&path, Some(&scope.namespace)).ok()?;
                    let decl = namespace.get(name)?.clone();
                    (namespace, decl)
                }
                _ => return None,
            };
            let target = decl.type_expr()?.strip_pointers().clone();
            let key = LinkKey::declaration(namespace.id, &decl.name);
            scope = Scope::of_declaration(namespace, &decl);
            if let TypeExpr::Struct { members } = target {
                return Some((key, members, scope));
            }
            current = target;
        }
        None
    }

    // ========== Cells ==========

    /// Value-type cell for `ty`. Named types are linked and queued, inline
    /// structs get a table of their own.
    fn describe(&mut self, ty: &TypeExpr, scope: &Scope, site: &Site, plural: bool) -> JsonDocResult<String> {
        match ty {
            TypeExpr::Pointer { elem } => self.describe(elem, scope, site, plural),
            TypeExpr::Ident { .. } | TypeExpr::Qualified { .. } => {
                match self.resolve_reference(ty, scope, site)? {
                    Target::Builtin(name) => Ok(name),
                    Target::Unresolved(text) => Ok(escape_text(&text)),
                    Target::Declared { namespace, decl } => Ok(self.link_declaration(namespace, decl, &ty.to_string())),
                }
            }
            TypeExpr::Array { elem } => {
                let inner = self.describe(elem, scope, &site.element(), true)?;
                Ok(format!("{}{}", if plural { "arrays of " } else { "array of " }, inner))
            }
            TypeExpr::Map { key, value } => {
                check_map_key(key)?;
                let inner = self.describe(value, scope, &site.element(), true)?;
                Ok(format!("{}{}", if plural { "objects of " } else { "object of " }, inner))
            }
            TypeExpr::Struct { .. } => {
                let title = if site.is_element() {
                    site.name.clone()
                } else {
                    format!("of {}", site.name)
                };
                let key = self.links.new_site();
                let (anchor, _) = self.links.assign(key, &title);
                self.queue.enqueue(RenderItem {
                    title: title.clone(),
                    anchor: anchor.clone(),
                    ty: ty.clone(),
                    scope: scope.clone(),
                    doc: None,
                });
                Ok(format!("<a href=\"#{}\">type {}</a>", anchor, escape_text(&title)))
            }
            TypeExpr::Opaque { text } => Ok(escape_text(text)),
        }
    }

    fn link_declaration(&mut self, namespace: Arc<Namespace>, decl: Declaration, label: &str) -> String {
        let key = LinkKey::declaration(namespace.id, &decl.name);
        let (anchor, assigned) = self.links.assign(key, label);
        if assigned {
            if let Some(ty) = decl.type_expr() {
                self.queue.enqueue(RenderItem {
                    title: label.to_string(),
                    anchor: anchor.clone(),
                    ty: ty.clone(),
                    scope: Scope::of_declaration(namespace, &decl),
                    doc: decl.doc.clone(),
                });
            }
        }
        format!("<a href=\"#{}\">{}</a>", anchor, escape_text(label))
    }

    fn resolve_reference(&mut self, ty: &TypeExpr, scope: &Scope, site: &Site) -> JsonDocResult<Target> {
        match ty {
            TypeExpr::Ident { name } if is_builtin_type(name) => Ok(Target::Builtin(name.clone())),
            TypeExpr::Ident { name } => {
                let (decl, _) = scope.namespace.resolve_type(name)?;
                Ok(Target::Declared {
                    namespace: Arc::clone(&scope.namespace),
                    decl: decl.clone(),
                })
            }
            TypeExpr::Qualified { package, name } => {
                let text = ty.to_string();
                let Some(path) = scope.import_path(package).map(str::to_string) else {
                    self.unresolved(&text, None, "package is not imported by this file", scope, site);
                    return Ok(Target::Unresolved(text));
                };
                let namespace = match self.index.lookup(&path, Some(&scope.namespace)) {
                    Ok(namespace) => namespace,
                    Err(err) => {
                        self.unresolved(&text, Some(&path), &err.to_string(), scope, site);
                        return Ok(Target::Unresolved(text));
                    }
                };
                let (decl, _) = namespace.resolve_type(name)?;
                let decl = decl.clone();
                Ok(Target::Declared { namespace, decl })
            }
            other => Err(JsonDocError::Template(format!("{} is not a named type", other))),
        }
    }

    /// Report a reference that stays unlinked.
    ///
    /// Standard library packages are expected to be missing and only logged.
    fn unresolved(&mut self, text: &str, path: Option<&str>, reason: &str, scope: &Scope, site: &Site) {
        if path.is_some_and(is_standard_library) {
            tracing::debug!(reference = %text, "leaving standard library type unlinked");
            return;
        }
        let mut diagnostic = Diagnostic::warning(format!("cannot link {}: {}", text, reason))
            .with_code("unresolved-link");
        if let Some(file) = scope.file_path() {
            diagnostic = diagnostic.in_file(file);
        }
        if site.line > 0 {
            diagnostic = diagnostic.at(site.line);
        }
        self.diagnostics.add(diagnostic);
    }
}

fn check_map_key(key: &TypeExpr) -> JsonDocResult<()> {
    if key.is_string_like() {
        Ok(())
    } else {
        Err(JsonDocError::UnsupportedMapKey {
            key: key.to_string(),
        })
    }
}

/// Standard library import paths have no dot in their first element
fn is_standard_library(path: &str) -> bool {
    !path.split('/').next().unwrap_or_default().contains('.')
}

/// Resolve duplicate keys introduced by flattening. Direct fields are always
/// kept; a promoted field survives only if no shallower field has its key
/// and it is the first declared among equally deep ones.
fn dominant_fields(fields: Vec<Field>) -> Vec<Field> {
    let mut best: HashMap<String, (usize, usize)> = HashMap::new();
    for (i, field) in fields.iter().enumerate() {
        best.entry(field.key.name.clone())
            .and_modify(|entry| {
                if field.depth < entry.0 {
                    *entry = (field.depth, i);
                }
            })
            .or_insert((field.depth, i));
    }
    fields
        .into_iter()
        .enumerate()
        .filter(|(i, field)| {
            field.depth == 0 || best.get(&field.key.name).map(|b| b.1) == Some(*i)
        })
        .map(|(_, field)| field)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::LOCAL_NAMESPACE;
    use crate::test::{sample_index, MemoryIndex, SAMPLE_PACKAGE};
    use pretty_assertions::assert_eq;

    fn renderer(sources: &[(&str, &str)]) -> (TypeRenderer, Arc<Namespace>) {
        let mut index = MemoryIndex::new();
        for (path, source) in sources {
            index.add(path, &[("types.go", source)]);
        }
        let mut renderer = TypeRenderer::new(Box::new(index));
        let local = renderer.lookup(LOCAL_NAMESPACE, None).unwrap();
        (renderer, local)
    }

    fn sample() -> (TypeRenderer, Arc<Namespace>) {
        let mut renderer = TypeRenderer::new(Box::new(sample_index()));
        let local = renderer.lookup(LOCAL_NAMESPACE, None).unwrap();
        (renderer, local)
    }

    #[test]
    fn test_simple_table() {
        let (mut renderer, local) = sample();
        let root = renderer.render_root(local, "helloInput").unwrap();
        assert_eq!(root.anchor.as_deref(), Some("type-helloInput"));
        assert!(root.body.starts_with(
            "<p>JSON object with the following fields:</p>\n\
             <table>\n<tr>\n<th>Key name</th>\n<th>Value type</th>\n<th>Description</th>\n</tr>\n\
             <tr>\n<td>\"test\"</td>\n<td>string</td>\n<td>Name to be used in greetings</td>\n</tr>\n\
             <tr>\n<td>\"A\"</td>\n<td>int</td>\n<td>Some numeric parameter</td>\n</tr>\n\
             <tr>\n<td>\"B\"</td>\n<td>int</td>\n<td>Some numeric parameter</td>\n</tr>\n\
             <tr>\n<td>\"size\"</td>\n<td><a href=\"#type-size\">size</a></td>\n<td></td>\n</tr>\n\
             </table>\n\
             <h4 id=\"type-size\">Type size</h4>\n"
        ));
        assert!(root.body.contains("<td>\"lenght\"</td>\n<td>float64</td>\n<td>length of the object</td>"));
        assert!(!root.body.contains("(optional)"));
        assert!(!root.body.contains("\n\n"));
    }

    #[test]
    fn test_optional_field() {
        let (mut renderer, local) = sample();
        let root = renderer.render_root(local, "itemGetOutput").unwrap();
        assert!(root.body.contains(
            "<td>\"error\"</td>\n<td>string</td>\n<td>only present if there was an error (optional)</td>"
        ));
        assert!(root
            .body
            .contains("<td>\"request_id\"</td>\n<td>string</td>\n<td>request ID assigned by the server</td>"));
    }

    #[test]
    fn test_suppressed_fields() {
        let (mut renderer, local) = sample();
        let root = renderer.render_root(local, "itemGetInput").unwrap();
        assert!(!root.body.contains("NotExported"));
        assert!(root.body.contains("<td>\"id\"</td>\n<td>int64</td>\n<td>ID of the requested item</td>"));
        assert!(root.body.contains("<td>\"b\"</td>\n<td>array of string</td>"));
    }

    #[test]
    fn test_array_of_inline_struct() {
        let (mut renderer, local) = renderer(&[(
            LOCAL_NAMESPACE,
            "package api\n\ntype list struct {\n\tF []struct {\n\t\tA int\n\t} `json:\"f\"`\n}\n",
        )]);
        let root = renderer.render_root(local, "list").unwrap();
        assert!(root
            .body
            .contains("<td>array of <a href=\"#type-f-element\">type f element</a></td>"));
        assert!(root.body.contains("<h4 id=\"type-f-element\">Type f element</h4>\n<p>JSON object with the following fields:</p>"));
        assert!(root.body.contains("<td>\"A\"</td>"));
    }

    #[test]
    fn test_inline_struct_field() {
        let (mut renderer, local) = sample();
        let root = renderer.render_root(local, "itemGetInput").unwrap();
        assert!(root.body.contains("<td><a href=\"#type-of-C\">type of C</a></td>"));
        assert!(root.body.contains("<h4 id=\"type-of-C\">Type of C</h4>"));
        assert!(root.body.contains("<td>array of arrays of <a href=\"#type-g-element\">type g element</a></td>"));
    }

    #[test]
    fn test_named_type_rendered_once() {
        let (mut renderer, local) = renderer(&[(
            LOCAL_NAMESPACE,
            r#"package api

type pair struct {
	Left  point `json:"left"`
	Right point `json:"right"`
	All   []point
}

type point struct {
	X, Y float64
}
"#,
        )]);
        let root = renderer.render_root(local, "pair").unwrap();
        assert_eq!(root.body.matches("<a href=\"#type-point\">point</a>").count(), 3);
        assert_eq!(root.body.matches("<h4 id=\"type-point\">").count(), 1);
    }

    #[test]
    fn test_identical_inline_structs_not_merged() {
        let (mut renderer, local) = renderer(&[(
            LOCAL_NAMESPACE,
            r#"package api

type twins struct {
	A []struct{ V int } `json:"items"`
	B []struct{ V int } `json:"items2"`
	C struct{ V int }   `json:"x"`
	D map[string]struct{ V int } `json:"x"`
}
"#,
        )]);
        let root = renderer.render_root(local, "twins").unwrap();
        assert_eq!(root.body.matches("<h4 id=").count(), 4);
        assert!(root.body.contains("id=\"type-items-element\""));
        assert!(root.body.contains("id=\"type-items2-element\""));
        assert!(root.body.contains("id=\"type-of-x\""));
        assert!(root.body.contains("id=\"type-x-element\""));
        // direct fields sharing a key each keep their row
        assert_eq!(root.body.matches("<td>\"x\"</td>").count(), 2);
        assert!(root
            .body
            .contains("<td>\"x\"</td>\n<td>object of <a href=\"#type-x-element\">type x element</a></td>"));
    }

    #[test]
    fn test_repeated_site_names_get_suffixes() {
        let (mut renderer, local) = renderer(&[(
            LOCAL_NAMESPACE,
            r#"package api

type outer struct {
	Items []struct{ V int } `json:"items"`
	Inner inner `json:"inner"`
}

type inner struct {
	Items []struct{ W int } `json:"items"`
}
"#,
        )]);
        let root = renderer.render_root(local, "outer").unwrap();
        assert!(root.body.contains("id=\"type-items-element\""));
        assert!(root.body.contains("id=\"type-items-element-2\""));
    }

    #[test]
    fn test_empty_structs() {
        let (mut renderer, local) = sample();
        let root = renderer.render_root(Arc::clone(&local), "empty").unwrap();
        assert_eq!(root.body, "<p>JSON object with no fields.</p>\n");
        assert!(!root.body.contains("<table>"));

        let root = renderer.render_root(Arc::clone(&local), "emptyOA").unwrap();
        assert_eq!(root.body, "<p>JSON object of arrays of objects with no fields.</p>\n");

        let root = renderer.render_root(local, "hidden").unwrap();
        assert_eq!(root.body, "<p>JSON object with no fields.</p>\n");
    }

    #[test]
    fn test_embedded_fields_flattened() {
        let (mut renderer, local) = sample();
        let root = renderer.render_root(local, "info").unwrap();
        let width = root.body.find("<td>\"width\"</td>").unwrap();
        let height = root.body.find("<td>\"height\"</td>").unwrap();
        let weight = root.body.find("<td>\"weight\"</td>").unwrap();
        assert!(width < height && height < weight);
        assert!(!root.body.contains("type-size"));
    }

    #[test]
    fn test_shallow_field_shadows_promoted() {
        let (mut renderer, local) = renderer(&[(
            LOCAL_NAMESPACE,
            r#"package api

type base struct {
	ID   string `json:"id"`
	Kind string `json:"kind"`
}

type derived struct {
	base
	ID int `json:"id"`
	self *derived
	loop
}

type loop struct {
	*loop
	Extra bool
}
"#,
        )]);
        let root = renderer.render_root(local, "derived").unwrap();
        assert_eq!(root.body.matches("<td>\"id\"</td>").count(), 1);
        assert!(root.body.contains("<td>\"id\"</td>\n<td>int</td>"));
        assert!(root.body.contains("<td>\"kind\"</td>"));
        assert!(root.body.contains("<td>\"Extra\"</td>"));
    }

    #[test]
    fn test_non_string_map_key_is_fatal() {
        let (mut renderer, local) = renderer(&[(
            LOCAL_NAMESPACE,
            "package api\n\ntype counts struct {\n\tByID map[int]string\n}\n",
        )]);
        let err = renderer.render_root(local, "counts").unwrap_err();
        assert_eq!(err.kind(), "unsupported-map-key");
        assert!(err
            .to_string()
            .starts_with("only maps with string keys are supported"));

        let (mut renderer, local) = self::renderer(&[(
            LOCAL_NAMESPACE,
            "package api\n\ntype refs struct {\n\tM map[*string]int\n}\n",
        )]);
        let err = renderer.render_root(local, "refs").unwrap_err();
        assert_eq!(err.kind(), "unsupported-map-key");
        assert!(err.to_string().contains("*string"));
    }

    #[test]
    fn test_map_of_inline_structs() {
        let (mut renderer, local) = sample();
        let root = renderer.render_root(local, "mapOutput").unwrap();
        assert!(root
            .body
            .starts_with("<p>JSON object of objects with the following fields:</p>"));
        assert!(root
            .body
            .contains("<td>object of <a href=\"#type-OI-element\">type OI element</a></td>"));
        assert!(root.body.contains(
            "<td>object of objects of arrays of <a href=\"#type-OOAI-element\">type OOAI element</a></td>"
        ));
        assert!(root.body.contains("<h4 id=\"type-OOAI-element\">Type OOAI element</h4>"));
    }

    #[test]
    fn test_array_of_arrays_root() {
        let (mut renderer, local) = sample();
        let root = renderer.render_root(local, "arrayInput").unwrap();
        assert!(root
            .body
            .starts_with("<p>JSON array of arrays of objects with the following fields:</p>"));
        assert!(root.body.contains("<td>\"AAI\"</td>\n<td>array of arrays of int</td>"));
    }

    #[test]
    fn test_unknown_field_type_is_fatal() {
        let (mut renderer, local) = renderer(&[(
            LOCAL_NAMESPACE,
            "package api\n\ntype broken struct {\n\tX missing\n\tY helper\n}\n\nfunc helper() {}\n",
        )]);
        let err = renderer.render_root(Arc::clone(&local), "broken").unwrap_err();
        assert_eq!(err.kind(), "name-not-found");

        let err = renderer.render_root(local, "helper").unwrap_err();
        assert_eq!(err.kind(), "not-a-type");
    }

    #[test]
    fn test_qualified_references() {
        let (mut renderer, local) = renderer(&[
            (
                LOCAL_NAMESPACE,
                r#"package api

import (
	"time"

	m "example.com/shop/models"
	"example.com/vendor/gone"
)

type order struct {
	Item    m.Item    `json:"item"`
	Created time.Time `json:"created"`
	Gone    gone.Thing
}
"#,
            ),
            (
                "example.com/shop/models",
                "package models\n\n// Item is a catalog entry\ntype Item struct {\n\tSKU string `json:\"sku\"`\n}\n",
            ),
        ]);
        let root = renderer.render_root(local, "order").unwrap();
        assert!(root.body.contains("<td><a href=\"#type-m-Item\">m.Item</a></td>"));
        assert!(root.body.contains("<h4 id=\"type-m-Item\">Type m.Item</h4>\n<p>Item is a catalog entry</p>"));
        assert!(root.body.contains("<td>\"sku\"</td>"));
        assert!(root.body.contains("<td>time.Time</td>"));
        assert!(root.body.contains("<td>gone.Thing</td>"));

        let diagnostics = renderer.diagnostics().diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code.as_deref(), Some("unresolved-link"));
        assert!(diagnostics[0].message.contains("gone.Thing"));
    }

    #[test]
    fn test_root_anchor_claimed_once() {
        let (mut renderer, local) = sample();
        let output = renderer.render_root(Arc::clone(&local), "itemGetOutput").unwrap();
        assert!(output.body.contains("<td><a href=\"#type-info\">info</a></td>"));
        assert!(output.body.contains("<h4 id=\"type-info\">Type info</h4>"));

        let again = renderer.render_root(local, "info").unwrap();
        assert_eq!(again.anchor, None);
        assert!(!again.body.contains("<h4"));
    }

    #[test]
    fn test_non_struct_declarations() {
        let (mut renderer, local) = renderer(&[(
            LOCAL_NAMESPACE,
            "package api\n\ntype ID int64\n\ntype IDs []ID\n\ntype Handler func(int) error\n",
        )]);
        let root = renderer.render_root(Arc::clone(&local), "IDs").unwrap();
        assert_eq!(
            root.body,
            "<p>JSON array of <a href=\"#type-ID\">ID</a>.</p>\n\
             <h4 id=\"type-ID\">Type ID</h4>\n\
             <p>JSON value of type int64.</p>\n"
        );

        let root = renderer.render_root(Arc::clone(&local), "ID").unwrap();
        assert_eq!(root.anchor, None);
        assert_eq!(root.body, "<p>JSON value of type int64.</p>\n");

        let root = renderer.render_root(local, "Handler").unwrap();
        assert_eq!(root.body, "<p>JSON value of type func(int) error.</p>\n");
    }

    #[test]
    fn test_sample_package_parses() {
        let ns = Namespace::from_sources(0, LOCAL_NAMESPACE, &[("example.go", SAMPLE_PACKAGE)]).unwrap();
        assert!(ns.type_count() >= 10);
    }
}
