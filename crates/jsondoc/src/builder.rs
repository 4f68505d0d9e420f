//! DocBuilder - main API for documentation generation
//!
//! Wires the pieces together: load configuration, index the package next to
//! the template, expand the directives and assemble the page.

use crate::config::DocConfig;
use crate::context::GenerationContext;
use crate::diagnostics::{Diagnostic, JsonDocResult};
use crate::directives::DirectiveEngine;
use crate::html::PageAssembler;
use crate::index::{DeclarationIndex, SourceIndex};
use std::fs;
use std::path::{Path, PathBuf};

/// Title used when neither the template, the configuration nor the
/// template file name provides one
pub const FALLBACK_TITLE: &str = "JSON API";

/// Result of one generation run
#[derive(Debug)]
pub struct BuildOutput {
    /// Complete HTML page
    pub html: String,
    /// Expanded template before markdown conversion
    pub markdown: String,
    /// Title the page was given
    pub title: String,
    /// Non-fatal problems found on the way
    pub diagnostics: Vec<Diagnostic>,
    /// Number of input and output sections
    pub sections: usize,
    /// Number of type bodies rendered
    pub type_count: usize,
}

impl BuildOutput {
    /// Write the page to `path`, creating parent directories
    pub fn write_to(&self, path: &Path) -> JsonDocResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, &self.html)?;
        Ok(())
    }
}

/// Builder for configuring documentation generation
///
/// # Example
///
/// ```no_run
/// use jsondoc::DocBuilder;
///
/// let output = DocBuilder::new("api/index.md")
///     .search_path("/home/me/go")
///     .default_title("Shop API")
///     .build()
///     .expect("Failed to generate docs");
/// println!("{}", output.html);
/// ```
#[derive(Debug, Clone)]
pub struct DocBuilder {
    /// Template file
    pub template: PathBuf,
    /// Settings
    pub config: DocConfig,
}

impl DocBuilder {
    /// Create a builder for a template file
    pub fn new(template: impl Into<PathBuf>) -> Self {
        Self {
            template: template.into(),
            config: DocConfig::default(),
        }
    }

    /// Replace the configuration
    pub fn config(mut self, config: DocConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the documented package directory
    pub fn package_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.package_dir = Some(dir.into());
        self
    }

    /// Add an import search root
    pub fn search_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.search_paths.push(dir.into());
        self
    }

    /// Set the title used when the template sets none
    pub fn default_title(mut self, title: impl Into<String>) -> Self {
        self.config.default_title = Some(title.into());
        self
    }

    /// Generate the page
    pub fn build(self) -> JsonDocResult<BuildOutput> {
        let template = fs::read_to_string(&self.template)?;
        let package_dir = self.config.package_dir.clone().unwrap_or_else(|| {
            self.template
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
        });
        tracing::info!(
            template = %self.template.display(),
            package = %package_dir.display(),
            "generating documentation"
        );

        let index = SourceIndex::new(package_dir).with_search_paths(self.config.search_paths.clone());
        let fallback = self
            .config
            .default_title
            .clone()
            .or_else(|| {
                self.template
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
            })
            .unwrap_or_else(|| FALLBACK_TITLE.to_string());

        generate(&template, Box::new(index), &fallback)
    }
}

/// Expand a template against an index and assemble the page
pub fn generate(
    template: &str,
    index: Box<dyn DeclarationIndex>,
    fallback_title: &str,
) -> JsonDocResult<BuildOutput> {
    let mut engine = DirectiveEngine::new(GenerationContext::new(index)?);
    let markdown = engine.expand(template)?;

    let (title, diagnostics, sections, type_count) = engine.with_context(|ctx| {
        (
            ctx.title().unwrap_or(fallback_title).to_string(),
            ctx.take_diagnostics(),
            ctx.sections(),
            ctx.tables_rendered(),
        )
    })?;

    let html = PageAssembler::new()?.assemble(&title, &markdown)?;
    tracing::info!(
        sections,
        types = type_count,
        warnings = diagnostics.warning_count(),
        "documentation generated"
    );

    Ok(BuildOutput {
        html,
        markdown,
        title,
        diagnostics: diagnostics.diagnostics().to_vec(),
        sections,
        type_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{sample_index, SAMPLE_PACKAGE, SAMPLE_TEMPLATE};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_generate_sample() {
        let output = generate(SAMPLE_TEMPLATE, Box::new(sample_index()), "fallback").unwrap();
        assert_eq!(output.title, "Example API");
        assert_eq!(output.sections, 4);
        assert!(output.diagnostics.is_empty());
        assert!(output.html.contains("<title>Example API</title>"));
        assert!(output.html.contains("<h3 id=\"input-helloInput\">Input (helloInput)</h3>"));
        assert!(output.html.contains("<h4 id=\"type-size\">Type size</h4>"));
        assert!(output
            .html
            .contains("<li class=\"level-3\"><a href=\"#output-itemGetOutput\">Output (itemGetOutput)</a></li>"));
    }

    #[test]
    fn test_fallback_title() {
        let output = generate("{{input \"empty\"}}\n", Box::new(sample_index()), "index").unwrap();
        assert_eq!(output.title, "index");
        assert!(output.html.contains("JSON object with no fields."));
    }

    #[test]
    fn test_fatal_error_aborts() {
        let err = generate("{{input \"nothing\"}}\n", Box::new(sample_index()), "x").unwrap_err();
        assert_eq!(err.kind(), "name-not-found");
    }

    #[test]
    fn test_build_from_disk() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("example.go"), SAMPLE_PACKAGE).unwrap();
        fs::write(temp.path().join("api.md"), "# API\n\n{{output \"helloOutput\"}}\n").unwrap();

        let output = DocBuilder::new(temp.path().join("api.md")).build().unwrap();
        assert_eq!(output.title, "api");
        assert!(output.html.contains("<td>\"msg\"</td>"));

        let target = temp.path().join("out/api.html");
        output.write_to(&target).unwrap();
        assert_eq!(fs::read_to_string(target).unwrap(), output.html);
    }

    #[test]
    fn test_build_with_separate_package_dir() {
        let temp = TempDir::new().unwrap();
        let package = temp.path().join("pkg");
        fs::create_dir_all(&package).unwrap();
        fs::write(package.join("example.go"), SAMPLE_PACKAGE).unwrap();
        fs::write(temp.path().join("doc.md"), "{{input \"helloOutput\"}}\n").unwrap();

        let output = DocBuilder::new(temp.path().join("doc.md"))
            .package_dir(&package)
            .default_title("Shop")
            .build()
            .unwrap();
        assert_eq!(output.title, "Shop");
        assert_eq!(output.sections, 1);
    }
}
