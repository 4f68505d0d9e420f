//! Type expressions and declarations
//!
//! This is the language-level model the renderer works on. It is produced
//! by the Go parser (see [`crate::go`]) but nothing here depends on how it
//! was built, so tests and alternative front ends can construct it directly.
//!
//! # Mapping to JSON
//!
//! | Go type | Rendered as |
//! |---------|-------------|
//! | `bool`, `int64`, `string`, `error`, ... | plain name |
//! | `T` (declared in the package) | link to the table of `T` |
//! | `pkg.T` | link to the table of `T` in the imported package |
//! | `*T` | same as `T` |
//! | `[]T`, `[N]T` | `array of ...` |
//! | `map[string]T` | `object of ...` |
//! | `struct { ... }` | link to a table generated for this site |

use serde::{Deserialize, Serialize};
use std::fmt;

/// A type expression as written in the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeExpr {
    /// Bare identifier resolved in the current package
    Ident { name: String },
    /// `package.Name` through an import of the current file
    Qualified { package: String, name: String },
    /// `*T`; JSON encodes the pointee
    Pointer { elem: Box<TypeExpr> },
    /// Slice or fixed-size array
    Array { elem: Box<TypeExpr> },
    /// `map[K]V`
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    /// Inline struct literal type
    Struct { members: Vec<Member> },
    /// Anything without a JSON table (interfaces, funcs, channels)
    Opaque { text: String },
}

impl TypeExpr {
    /// Bare identifier
    pub fn ident(name: impl Into<String>) -> Self {
        TypeExpr::Ident { name: name.into() }
    }

    /// Package-qualified identifier
    pub fn qualified(package: impl Into<String>, name: impl Into<String>) -> Self {
        TypeExpr::Qualified {
            package: package.into(),
            name: name.into(),
        }
    }

    /// Pointer to `elem`
    pub fn pointer(elem: TypeExpr) -> Self {
        TypeExpr::Pointer {
            elem: Box::new(elem),
        }
    }

    /// Array of `elem`
    pub fn array(elem: TypeExpr) -> Self {
        TypeExpr::Array {
            elem: Box::new(elem),
        }
    }

    /// Map from `key` to `value`
    pub fn map(key: TypeExpr, value: TypeExpr) -> Self {
        TypeExpr::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Struct with the given members
    pub fn structure(members: Vec<Member>) -> Self {
        TypeExpr::Struct { members }
    }

    /// Opaque type text
    pub fn opaque(text: impl Into<String>) -> Self {
        TypeExpr::Opaque { text: text.into() }
    }

    /// Strip any number of pointer indirections
    pub fn strip_pointers(&self) -> &TypeExpr {
        match self {
            TypeExpr::Pointer { elem } => elem.strip_pointers(),
            other => other,
        }
    }

    /// Whether this is a valid JSON object key type.
    ///
    /// Only `string` is accepted. Pointers and named string types are
    /// rejected.
    pub fn is_string_like(&self) -> bool {
        matches!(self, TypeExpr::Ident { name } if name == "string")
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Ident { name } => write!(f, "{}", name),
            TypeExpr::Qualified { package, name } => write!(f, "{}.{}", package, name),
            TypeExpr::Pointer { elem } => write!(f, "*{}", elem),
            TypeExpr::Array { elem } => write!(f, "[]{}", elem),
            TypeExpr::Map { key, value } => write!(f, "map[{}]{}", key, value),
            TypeExpr::Struct { members } if members.is_empty() => write!(f, "struct{{}}"),
            TypeExpr::Struct { .. } => write!(f, "struct{{...}}"),
            TypeExpr::Opaque { text } => write!(f, "{}", text),
        }
    }
}

/// One struct member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Field name; `None` for embedded members
    pub name: Option<String>,
    /// Member type
    pub ty: TypeExpr,
    /// Raw struct tag contents (without the surrounding quotes)
    pub tag: Option<String>,
    /// Trailing or leading comment text
    pub description: Option<String>,
    /// Source line (1-indexed, 0 when unknown)
    pub line: usize,
}

impl Member {
    /// Named field
    pub fn field(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: Some(name.into()),
            ty,
            tag: None,
            description: None,
            line: 0,
        }
    }

    /// Embedded member
    pub fn embedded(ty: TypeExpr) -> Self {
        Self {
            name: None,
            ty,
            tag: None,
            description: None,
            line: 0,
        }
    }

    /// Attach a struct tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Attach a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether the member is embedded (anonymous)
    pub fn is_embedded(&self) -> bool {
        self.name.is_none()
    }

    /// Name Go uses for an embedded member: the type name without pointer or
    /// package qualifier
    pub fn embedded_name(&self) -> Option<&str> {
        match self.ty.strip_pointers() {
            TypeExpr::Ident { name } | TypeExpr::Qualified { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Non-type package-level declaration kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueKind {
    Var,
    Const,
    Func,
}

/// What a declaration declares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DeclKind {
    /// `type Name T` or `type Name = T`
    Type { ty: TypeExpr },
    /// var, const or func
    Value { value: ValueKind },
}

/// A named package-level declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    /// Declared name
    pub name: String,
    /// Declaration body
    pub kind: DeclKind,
    /// Index of the declaring file inside its namespace
    pub file: usize,
    /// Doc comment
    pub doc: Option<String>,
    /// Source line (1-indexed)
    pub line: usize,
}

impl Declaration {
    /// Type expression if this declares a type
    pub fn type_expr(&self) -> Option<&TypeExpr> {
        match &self.kind {
            DeclKind::Type { ty } => Some(ty),
            DeclKind::Value { .. } => None,
        }
    }
}

/// Predeclared names rendered as plain text without lookup
pub const BUILTIN_TYPES: &[&str] = &[
    "bool",
    "string",
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
    "byte",
    "rune",
    "float32",
    "float64",
    "complex64",
    "complex128",
    "error",
    "any",
];

/// Check if a name is a predeclared type
pub fn is_builtin_type(name: &str) -> bool {
    BUILTIN_TYPES.contains(&name)
}

/// Go export rule: identifier starts with an upper-case letter
pub fn is_exported(name: &str) -> bool {
    name.chars().next().map(char::is_uppercase).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let ty = TypeExpr::map(
            TypeExpr::ident("string"),
            TypeExpr::array(TypeExpr::pointer(TypeExpr::qualified("models", "User"))),
        );
        assert_eq!(ty.to_string(), "map[string][]*models.User");
        assert_eq!(TypeExpr::structure(vec![]).to_string(), "struct{}");
    }

    #[test]
    fn test_string_like_keys() {
        assert!(TypeExpr::ident("string").is_string_like());
        assert!(!TypeExpr::ident("int").is_string_like());
        assert!(!TypeExpr::qualified("models", "Key").is_string_like());
        assert!(!TypeExpr::pointer(TypeExpr::ident("string")).is_string_like());
    }

    #[test]
    fn test_embedded_name() {
        let member = Member::embedded(TypeExpr::pointer(TypeExpr::qualified("base", "Model")));
        assert!(member.is_embedded());
        assert_eq!(member.embedded_name(), Some("Model"));
    }

    #[test]
    fn test_exported() {
        assert!(is_exported("Name"));
        assert!(is_exported("Ärger"));
        assert!(!is_exported("name"));
        assert!(!is_exported("_Name"));
        assert!(!is_exported(""));
    }

    #[test]
    fn test_builtins() {
        assert!(is_builtin_type("float64"));
        assert!(is_builtin_type("error"));
        assert!(!is_builtin_type("size"));
    }
}
