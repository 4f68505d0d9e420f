//! jsondoc: documentation generator for JSON APIs declared as Go structs
//!
//! A markdown document containing directives is expanded into a standalone
//! HTML page. Each `input`/`output` directive names a Go type; the type is
//! resolved in the package next to the document, and every struct reachable
//! from it is rendered as a table of JSON keys, value types and descriptions.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────────┐
//! │ index.md        │    │ *.go             │
//! │ (handlebars)    │    │ (logos + parser) │
//! └────────┬────────┘    └────────┬─────────┘
//!          │                      │
//!          │              ┌───────┴────────┐
//!          │              │ SourceIndex    │
//!          │              └───────┬────────┘
//!          └──────────┬───────────┘
//!                     ▼
//!          ┌─────────────────────┐
//!          │ GenerationContext   │
//!          │ TypeRenderer + queue│
//!          └──────────┬──────────┘
//!                     ▼
//!              ┌──────────────┐
//!              │ comrak → HTML│
//!              └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use jsondoc::DocBuilder;
//!
//! let output = DocBuilder::new("api/index.md")
//!     .build()
//!     .expect("Failed to generate docs");
//! std::fs::write("api.html", output.html).unwrap();
//! ```
//!
//! With a template like:
//!
//! ```text
//! {{title "Shop API"}}
//! {{import "m" "example.com/shop/models"}}
//!
//! ## /item/get
//!
//! {{input "itemGetInput"}}
//!
//! {{output "m.Item"}}
//! ```

// Core types
pub mod diagnostics;
pub mod tag;
pub mod types;

// Go front end and declaration index
pub mod go;
pub mod index;

// Rendering
pub mod context;
pub mod directives;
pub mod queue;
pub mod render;

// Output and configuration
pub mod builder;
pub mod config;
pub mod html;
pub mod printer;

// Re-exports for convenience
pub use builder::{generate, BuildOutput, DocBuilder};
pub use config::{DocConfig, CONFIG_FILE_NAME};
pub use context::{Direction, GenerationContext};
pub use diagnostics::{
    Diagnostic, DiagnosticSeverity, DiagnosticsCollector, JsonDocError, JsonDocResult,
};
pub use directives::DirectiveEngine;
pub use html::PageAssembler;
pub use index::{DeclarationIndex, Namespace, Scope, SourceIndex, LOCAL_NAMESPACE};
pub use printer::DiagnosticPrinter;
pub use queue::{LinkKey, LinkTable, RenderItem, RenderQueue};
pub use render::TypeRenderer;
pub use tag::{resolve_field_name, FieldName, JsonKey};
pub use types::{Declaration, Member, TypeExpr};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
