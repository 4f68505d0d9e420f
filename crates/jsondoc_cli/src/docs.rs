//! Documentation generation command
//!
//! Expands a markdown template into a standalone HTML page describing the
//! JSON bodies of the Go types it names.

use anyhow::{anyhow, bail, Result};
use jsondoc::{Diagnostic, DiagnosticPrinter, DocBuilder, DocConfig, JsonDocError};
use std::io::Write;
use std::path::PathBuf;

/// Extra import search roots, in platform path-list syntax
const SEARCH_PATH_VAR: &str = "JSONDOC_PATH";

const USAGE: &str = "\
Usage: jsondoc [OPTIONS] <TEMPLATE>

Generate HTML documentation for JSON bodies declared as Go structs.

Options:
  -o, --output <FILE>        Write the page to FILE instead of standard output
  -p, --package <DIR>        Directory of the documented package
  -I, --search-path <DIR>    Add a root searched for imported packages
  -c, --config <FILE>        Read settings from FILE instead of jsondoc.toml
      --no-color             Disable colored diagnostics
  -h, --help                 Print this help

Environment:
  JSONDOC_PATH               Additional search roots
  JSONDOC_LOG                Log filter (default: warn)
";

/// Run the docs command with the given arguments
pub fn run(args: &[String]) -> Result<()> {
    let cmd = DocsCommand::parse(args)?;
    if cmd.help {
        print!("{}", USAGE);
        return Ok(());
    }

    let Some(template) = cmd.template.clone() else {
        bail!("missing template file (see --help)");
    };

    let config = cmd.resolve_config(env_search_paths())?;
    let output_path = config.output.clone();
    let output = DocBuilder::new(&template).config(config).build()?;

    DiagnosticPrinter::new(&output.diagnostics, !cmd.no_color).print_to_stderr();

    match output_path {
        Some(path) => {
            output
                .write_to(&path)
                .map_err(|e| anyhow!("failed to write {}: {}", path.display(), e))?;
            tracing::info!(path = %path.display(), "wrote documentation");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(output.html.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}

/// Print a fatal error as a single diagnostic line
pub fn report_error(err: &anyhow::Error, use_color: bool) {
    let diagnostic = match err.downcast_ref::<JsonDocError>() {
        Some(e) => e.to_diagnostic(),
        None => Diagnostic::error(err.to_string()),
    };
    DiagnosticPrinter::new(std::slice::from_ref(&diagnostic), use_color).print_to_stderr();
}

/// Whether colored output is allowed by the raw arguments
pub fn color_requested(args: &[String]) -> bool {
    !args.iter().any(|arg| arg == "--no-color")
}

fn env_search_paths() -> Vec<PathBuf> {
    std::env::var_os(SEARCH_PATH_VAR)
        .map(|value| {
            std::env::split_paths(&value)
                .filter(|p| !p.as_os_str().is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Docs command configuration
#[derive(Debug, Default)]
struct DocsCommand {
    /// Template file
    template: Option<PathBuf>,
    /// Output file
    output: Option<PathBuf>,
    /// Documented package directory
    package: Option<PathBuf>,
    /// Import search roots given on the command line
    search_paths: Vec<PathBuf>,
    /// Explicit configuration file
    config: Option<PathBuf>,
    no_color: bool,
    help: bool,
}

impl DocsCommand {
    fn parse(args: &[String]) -> Result<Self> {
        let mut cmd = DocsCommand::default();

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--output" | "-o" => {
                    if i + 1 < args.len() {
                        cmd.output = Some(PathBuf::from(&args[i + 1]));
                        i += 2;
                    } else {
                        bail!("--output requires a value");
                    }
                }
                "--package" | "-p" => {
                    if i + 1 < args.len() {
                        cmd.package = Some(PathBuf::from(&args[i + 1]));
                        i += 2;
                    } else {
                        bail!("--package requires a directory");
                    }
                }
                "--search-path" | "-I" => {
                    if i + 1 < args.len() {
                        cmd.search_paths.push(PathBuf::from(&args[i + 1]));
                        i += 2;
                    } else {
                        bail!("--search-path requires a directory");
                    }
                }
                "--config" | "-c" => {
                    if i + 1 < args.len() {
                        cmd.config = Some(PathBuf::from(&args[i + 1]));
                        i += 2;
                    } else {
                        bail!("--config requires a file");
                    }
                }
                "--no-color" => {
                    cmd.no_color = true;
                    i += 1;
                }
                "--help" | "-h" => {
                    cmd.help = true;
                    i += 1;
                }
                arg if !arg.starts_with('-') => {
                    if cmd.template.is_some() {
                        bail!("Unexpected argument: {}", arg);
                    }
                    cmd.template = Some(PathBuf::from(arg));
                    i += 1;
                }
                _ => {
                    bail!("Unknown flag: {}", args[i]);
                }
            }
        }

        Ok(cmd)
    }

    /// Settings from the configuration file with flags and `env_paths` layered on top
    fn resolve_config(&self, env_paths: Vec<PathBuf>) -> Result<DocConfig> {
        let file = match (&self.config, &self.template) {
            (Some(path), _) => DocConfig::from_file(path)?,
            (None, Some(template)) => DocConfig::discover(template)?.unwrap_or_default(),
            (None, None) => DocConfig::default(),
        };

        let overrides = DocConfig {
            package_dir: self.package.clone(),
            search_paths: self.search_paths.clone(),
            default_title: None,
            output: self.output.clone(),
        };
        let mut config = file.merge(overrides);
        config.search_paths.extend(env_paths);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsondoc::CONFIG_FILE_NAME;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    const PACKAGE: &str = r#"package api

type pingInput struct {
	Host string `json:"host"` // Host to ping
	Count int `json:",omitempty"`
}
"#;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_flags() {
        let cmd = DocsCommand::parse(&args(&[
            "-o", "out.html", "-I", "/a", "--search-path", "/b", "--no-color", "index.md",
        ]))
        .unwrap();
        assert_eq!(cmd.template, Some(PathBuf::from("index.md")));
        assert_eq!(cmd.output, Some(PathBuf::from("out.html")));
        assert_eq!(cmd.search_paths, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
        assert!(cmd.no_color);
        assert!(!cmd.help);
    }

    #[test]
    fn test_parse_errors() {
        let err = DocsCommand::parse(&args(&["--output"])).unwrap_err();
        assert_eq!(err.to_string(), "--output requires a value");

        let err = DocsCommand::parse(&args(&["--verbose", "index.md"])).unwrap_err();
        assert_eq!(err.to_string(), "Unknown flag: --verbose");

        let err = DocsCommand::parse(&args(&["a.md", "b.md"])).unwrap_err();
        assert_eq!(err.to_string(), "Unexpected argument: b.md");
    }

    #[test]
    fn test_missing_template() {
        let err = run(&args(&["--no-color"])).unwrap_err();
        assert!(err.to_string().starts_with("missing template file"));
    }

    #[test]
    fn test_color_requested() {
        assert!(color_requested(&args(&["index.md"])));
        assert!(!color_requested(&args(&["--no-color", "index.md"])));
    }

    #[test]
    fn test_config_layering() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "search_paths = [\"/file\"]\ndefault_title = \"Ping\"\noutput = \"file.html\"\n",
        )
        .unwrap();
        let template = temp.path().join("index.md");
        let cmd = DocsCommand::parse(&args(&[
            template.to_str().unwrap(),
            "-I",
            "/flag",
            "-o",
            "flag.html",
        ]))
        .unwrap();

        let config = cmd.resolve_config(vec![PathBuf::from("/env")]).unwrap();
        assert_eq!(config.output, Some(PathBuf::from("flag.html")));
        assert_eq!(config.default_title.as_deref(), Some("Ping"));
        assert_eq!(
            config.search_paths,
            vec![
                PathBuf::from("/flag"),
                PathBuf::from("/file"),
                PathBuf::from("/env")
            ]
        );
    }

    #[test]
    fn test_run_writes_output_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("ping.go"), PACKAGE).unwrap();
        let template = temp.path().join("index.md");
        fs::write(&template, "{{title \"Ping API\"}}\n\n{{input \"pingInput\"}}\n").unwrap();
        let target = temp.path().join("site/index.html");

        run(&args(&[
            template.to_str().unwrap(),
            "--no-color",
            "-o",
            target.to_str().unwrap(),
        ]))
        .unwrap();

        let html = fs::read_to_string(&target).unwrap();
        assert!(html.contains("<title>Ping API</title>"));
        assert!(html.contains("<td>\"host\"</td>"));
        assert!(html.contains("<td>Host to ping</td>"));
        assert!(html.contains("<td>\"Count\"</td>"));
    }

    #[test]
    fn test_run_reports_typed_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("ping.go"), PACKAGE).unwrap();
        let template = temp.path().join("index.md");
        fs::write(&template, "{{input \"missing\"}}\n").unwrap();

        let err = run(&args(&[template.to_str().unwrap(), "--no-color"])).unwrap_err();
        let typed = err.downcast_ref::<JsonDocError>().unwrap();
        assert_eq!(typed.kind(), "name-not-found");
    }
}
