//! Declaration index
//!
//! A [`Namespace`] is one Go package: its declarations keyed by name plus the
//! import table of each file. Namespaces are loaded on demand through a
//! [`DeclarationIndex`] and memoized for the rest of the run.

use crate::diagnostics::{JsonDocError, JsonDocResult};
use crate::go::{self, ImportSpec, ParsedFile};
use crate::types::{Declaration, TypeExpr};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Import path of the package being documented
pub const LOCAL_NAMESPACE: &str = ".";

/// Identifier of a loaded namespace, unique within one index
pub type NamespaceId = usize;

/// One source file of a namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// File name (relative to the namespace directory)
    pub name: String,
    /// Local name → import path
    pub imports: IndexMap<String, String>,
}

impl SourceFile {
    fn new(name: String, imports: &[ImportSpec]) -> Self {
        let imports = imports
            .iter()
            .filter_map(|spec| {
                spec.local_name()
                    .map(|local| (local.to_string(), spec.path.clone()))
            })
            .collect();
        Self { name, imports }
    }
}

/// A loaded package
#[derive(Debug, Clone)]
pub struct Namespace {
    /// Unique id within the index
    pub id: NamespaceId,
    /// Import path the namespace was requested under
    pub path: String,
    /// Package clause
    pub package: String,
    /// Directory the sources came from
    pub dir: Option<PathBuf>,
    /// Source files in load order
    pub files: Vec<SourceFile>,
    /// Declarations by name; the first declaration of a name wins
    pub decls: IndexMap<String, Declaration>,
}

impl Namespace {
    /// Build a namespace from parsed files
    pub fn from_parsed(
        id: NamespaceId,
        path: impl Into<String>,
        dir: Option<PathBuf>,
        parsed: Vec<(String, ParsedFile)>,
    ) -> JsonDocResult<Self> {
        let path = path.into();
        let mut package: Option<String> = None;
        let mut files = Vec::with_capacity(parsed.len());
        let mut decls = IndexMap::new();

        for (index, (name, file)) in parsed.into_iter().enumerate() {
            match &package {
                Some(existing) if *existing != file.package => {
                    return Err(JsonDocError::parse(
                        dir.as_deref().map(|d| d.join(&name)).unwrap_or_else(|| PathBuf::from(&name)),
                        format!(
                            "found packages {} and {} in the same directory",
                            existing, file.package
                        ),
                    ));
                }
                Some(_) => {}
                None => package = Some(file.package.clone()),
            }

            files.push(SourceFile::new(name, &file.imports));
            for mut decl in file.decls {
                decl.file = index;
                decls.entry(decl.name.clone()).or_insert(decl);
            }
        }

        let package =
            package.ok_or_else(|| JsonDocError::package_not_found(&path, "no Go source files"))?;
        Ok(Self {
            id,
            path,
            package,
            dir,
            files,
            decls,
        })
    }

    /// Parse and build a namespace from in-memory `(file name, source)` pairs
    pub fn from_sources(
        id: NamespaceId,
        path: impl Into<String>,
        sources: &[(&str, &str)],
    ) -> JsonDocResult<Self> {
        let parsed = sources
            .iter()
            .map(|(name, source)| Ok((name.to_string(), go::parse_file(name, source)?)))
            .collect::<JsonDocResult<Vec<_>>>()?;
        Self::from_parsed(id, path, None, parsed)
    }

    /// Name used in messages: the import path, or the package name for the
    /// local namespace
    pub fn display_name(&self) -> &str {
        if self.path == LOCAL_NAMESPACE {
            &self.package
        } else {
            &self.path
        }
    }

    /// Look up any declaration
    pub fn get(&self, name: &str) -> Option<&Declaration> {
        self.decls.get(name)
    }

    /// Look up a type declaration.
    ///
    /// Fails with `NameNotFound` when the name is not declared and with
    /// `NotAType` when it names a var, const or func.
    pub fn resolve_type(&self, name: &str) -> JsonDocResult<(&Declaration, &TypeExpr)> {
        let decl = self.get(name).ok_or_else(|| JsonDocError::NameNotFound {
            name: name.to_string(),
            namespace: self.display_name().to_string(),
        })?;
        let ty = decl.type_expr().ok_or_else(|| JsonDocError::NotAType {
            name: name.to_string(),
            namespace: self.display_name().to_string(),
        })?;
        Ok((decl, ty))
    }

    /// Import path a file refers to by `alias`
    pub fn import_path(&self, file: usize, alias: &str) -> Option<&str> {
        self.files
            .get(file)
            .and_then(|f| f.imports.get(alias))
            .map(String::as_str)
    }

    /// Path of a file for diagnostics
    pub fn file_path(&self, file: usize) -> Option<PathBuf> {
        let name = &self.files.get(file)?.name;
        Some(match &self.dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        })
    }

    /// Number of type declarations
    pub fn type_count(&self) -> usize {
        self.decls
            .values()
            .filter(|d| d.type_expr().is_some())
            .count()
    }
}

/// Where a type expression is resolved: the namespace that declares it and
/// the file whose imports apply
#[derive(Debug, Clone)]
pub struct Scope {
    /// Declaring namespace
    pub namespace: Arc<Namespace>,
    /// File index inside the namespace; `None` outside any source file
    pub file: Option<usize>,
}

impl Scope {
    /// Scope of a declaration
    pub fn of_declaration(namespace: Arc<Namespace>, decl: &Declaration) -> Self {
        Self {
            namespace,
            file: Some(decl.file),
        }
    }

    /// Import path of `alias` in the current file
    pub fn import_path(&self, alias: &str) -> Option<&str> {
        self.file
            .and_then(|file| self.namespace.import_path(file, alias))
    }

    /// Source location for diagnostics
    pub fn file_path(&self) -> Option<PathBuf> {
        self.file.and_then(|file| self.namespace.file_path(file))
    }
}

/// Source of namespaces
pub trait DeclarationIndex: Send {
    /// Load the namespace for an import path.
    ///
    /// `importer` is the namespace containing the import, used to resolve
    /// relative paths. Results are memoized: loading the same package twice
    /// yields the same `Arc`.
    fn lookup(&mut self, path: &str, importer: Option<&Namespace>) -> JsonDocResult<Arc<Namespace>>;

    /// Find a type declaration by import path and name
    fn find_declaration(&mut self, path: &str, name: &str) -> JsonDocResult<Declaration> {
        let namespace = self.lookup(path, None)?;
        let (decl, _) = namespace.resolve_type(name)?;
        Ok(decl.clone())
    }
}

/// `module` line of a go.mod file
#[derive(Debug, Clone, PartialEq, Eq)]
struct GoModule {
    path: String,
    root: PathBuf,
}

impl GoModule {
    /// Find the go.mod governing `dir`
    fn discover(dir: &Path) -> Option<Self> {
        for ancestor in dir.ancestors() {
            let manifest = ancestor.join("go.mod");
            let Ok(content) = fs::read_to_string(&manifest) else {
                continue;
            };
            let path = parse_module_line(&content)?;
            tracing::debug!(module = %path, root = %ancestor.display(), "found go.mod");
            return Some(Self {
                path,
                root: ancestor.to_path_buf(),
            });
        }
        None
    }

    fn resolve(&self, import_path: &str) -> Option<PathBuf> {
        if import_path == self.path {
            return Some(self.root.clone());
        }
        import_path
            .strip_prefix(&self.path)
            .and_then(|rest| rest.strip_prefix('/'))
            .map(|rest| self.root.join(rest))
    }
}

fn parse_module_line(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let line = line.split("//").next().unwrap_or_default().trim();
        let rest = line.strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        Some(rest.trim().trim_matches('"').to_string())
    })
}

/// Filesystem-backed declaration index
#[derive(Debug)]
pub struct SourceIndex {
    base_dir: PathBuf,
    search_paths: Vec<PathBuf>,
    module: Option<GoModule>,
    cache: HashMap<PathBuf, Arc<Namespace>>,
    next_id: NamespaceId,
}

impl SourceIndex {
    /// Index rooted at the directory of the documented package
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        let module = GoModule::discover(&base_dir);
        Self {
            base_dir,
            search_paths: Vec::new(),
            module,
            cache: HashMap::new(),
            next_id: 0,
        }
    }

    /// Add roots searched for non-module import paths
    pub fn with_search_paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.search_paths.extend(paths);
        self
    }

    fn resolve_dir(&self, path: &str, importer: Option<&Namespace>) -> JsonDocResult<PathBuf> {
        if path == LOCAL_NAMESPACE {
            return Ok(self.base_dir.clone());
        }
        if path.starts_with("./") || path.starts_with("../") {
            let from = importer
                .and_then(|ns| ns.dir.as_deref())
                .unwrap_or(&self.base_dir);
            return Ok(from.join(path));
        }
        if let Some(dir) = self.module.as_ref().and_then(|m| m.resolve(path)) {
            return Ok(dir);
        }
        for root in &self.search_paths {
            for candidate in [root.join(path), root.join("src").join(path)] {
                if candidate.is_dir() {
                    return Ok(candidate);
                }
            }
        }
        Err(JsonDocError::package_not_found(
            path,
            "not in the current module or any search path",
        ))
    }

    fn load(&mut self, path: &str, dir: PathBuf) -> JsonDocResult<Arc<Namespace>> {
        let mut parsed = Vec::new();
        let entries = WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file());

        for entry in entries {
            let name = entry.file_name().to_string_lossy().to_string();
            if !go::is_source_file(&name) {
                continue;
            }
            let source = fs::read_to_string(entry.path())?;
            parsed.push((name, go::parse_file(entry.path(), &source)?));
        }

        if parsed.is_empty() {
            return Err(JsonDocError::package_not_found(
                path,
                format!("no Go source files in {}", dir.display()),
            ));
        }

        let id = self.next_id;
        self.next_id += 1;
        let namespace = Namespace::from_parsed(id, path, Some(dir.clone()), parsed)?;
        tracing::debug!(
            path = %path,
            dir = %dir.display(),
            files = namespace.files.len(),
            types = namespace.type_count(),
            "loaded package"
        );
        Ok(Arc::new(namespace))
    }
}

impl DeclarationIndex for SourceIndex {
    fn lookup(&mut self, path: &str, importer: Option<&Namespace>) -> JsonDocResult<Arc<Namespace>> {
        let dir = self.resolve_dir(path, importer)?;
        if !dir.is_dir() {
            return Err(JsonDocError::package_not_found(
                path,
                format!("{} is not a directory", dir.display()),
            ));
        }
        let key = fs::canonicalize(&dir).unwrap_or_else(|_| dir.clone());
        if let Some(namespace) = self.cache.get(&key) {
            return Ok(Arc::clone(namespace));
        }
        let namespace = self.load(path, dir)?;
        self.cache.insert(key, Arc::clone(&namespace));
        Ok(namespace)
    }
}
