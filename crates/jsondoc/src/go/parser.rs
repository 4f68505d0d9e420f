//! Declaration parser for Go source files
//!
//! Extracts the package clause, the import table and every package-level
//! declaration. Type declarations are parsed into [`TypeExpr`]s; var, const
//! and func declarations are only recorded by name. Function bodies and
//! initializer expressions are skipped by bracket matching.

use super::lexer::{tokenize, Token, TokenKind};
use crate::diagnostics::{JsonDocError, JsonDocResult};
use crate::tag::unquote;
use crate::types::{DeclKind, Declaration, Member, TypeExpr, ValueKind};
use std::path::{Path, PathBuf};

/// One import of a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Explicit alias (`_` and `.` included)
    pub alias: Option<String>,
    /// Import path
    pub path: String,
}

impl ImportSpec {
    /// Name the import is referenced by, if any
    pub fn local_name(&self) -> Option<&str> {
        match self.alias.as_deref() {
            Some("_") | Some(".") => None,
            Some(alias) => Some(alias),
            None => self.path.rsplit('/').next(),
        }
    }
}

/// Result of parsing one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFile {
    /// Package clause
    pub package: String,
    /// Imports in source order
    pub imports: Vec<ImportSpec>,
    /// Package-level declarations in source order
    pub decls: Vec<Declaration>,
}

/// Parse a Go source file
pub fn parse_file(file: impl AsRef<Path>, source: &str) -> JsonDocResult<ParsedFile> {
    let file = file.as_ref();
    let tokens = tokenize(source).map_err(|e| {
        JsonDocError::parse_at(file, format!("unexpected character {:?}", e.text), e.line)
    })?;
    Parser::new(file, source, tokens).parse()
}

#[derive(Debug, Clone)]
struct Comment {
    text: String,
    line: usize,
    end_line: usize,
    own_line: bool,
}

struct Parser<'s> {
    file: PathBuf,
    source: &'s str,
    tokens: Vec<Token>,
    comments: Vec<Comment>,
    pos: usize,
    prev_end_line: usize,
}

impl<'s> Parser<'s> {
    fn new(file: &Path, source: &'s str, all: Vec<Token>) -> Self {
        let mut tokens = Vec::with_capacity(all.len());
        let mut comments = Vec::new();
        let mut last_code_line = 0;

        for token in all {
            if token.kind.is_comment() {
                comments.push(Comment {
                    text: comment_text(&source[token.span.clone()]),
                    line: token.line,
                    end_line: token.end_line,
                    own_line: last_code_line != token.line,
                });
                // a comment spanning lines acts like a newline
                if token.end_line > token.line {
                    tokens.push(Token {
                        kind: TokenKind::Newline,
                        span: token.span.end..token.span.end,
                        line: token.end_line,
                        end_line: token.end_line,
                    });
                }
            } else {
                if token.kind != TokenKind::Newline {
                    last_code_line = token.end_line;
                }
                tokens.push(token);
            }
        }

        Self {
            file: file.to_path_buf(),
            source,
            tokens,
            comments,
            pos: 0,
            prev_end_line: 1,
        }
    }

    fn parse(mut self) -> JsonDocResult<ParsedFile> {
        let mut package = None;
        let mut imports = Vec::new();
        let mut decls = Vec::new();

        while let Some(kind) = self.peek() {
            match kind {
                TokenKind::Package => {
                    self.bump();
                    let name = self.expect(TokenKind::Ident, "package name")?;
                    package = Some(self.text(&name).to_string());
                }
                TokenKind::Import => self.parse_imports(&mut imports)?,
                TokenKind::Type => self.parse_type_decls(&mut decls)?,
                TokenKind::Func => self.parse_func(&mut decls)?,
                TokenKind::Var => self.parse_value_decls(ValueKind::Var, &mut decls)?,
                TokenKind::Const => self.parse_value_decls(ValueKind::Const, &mut decls)?,
                _ => {
                    self.bump();
                }
            }
        }

        let package = package.ok_or_else(|| JsonDocError::parse(&self.file, "missing package clause"))?;
        Ok(ParsedFile {
            package,
            imports,
            decls,
        })
    }

    // ========== Declarations ==========

    fn parse_imports(&mut self, imports: &mut Vec<ImportSpec>) -> JsonDocResult<()> {
        self.bump();
        if self.eat(TokenKind::LParen) {
            loop {
                self.skip_separators();
                if self.eat(TokenKind::RParen) {
                    return Ok(());
                }
                imports.push(self.parse_import_spec()?);
            }
        }
        imports.push(self.parse_import_spec()?);
        Ok(())
    }

    fn parse_import_spec(&mut self) -> JsonDocResult<ImportSpec> {
        let alias = match self.peek() {
            Some(TokenKind::Ident) => {
                let token = self.bump_token()?;
                Some(self.text(&token).to_string())
            }
            Some(TokenKind::Dot) => {
                self.bump();
                Some(".".to_string())
            }
            _ => None,
        };
        let path = self.string_literal("import path")?;
        Ok(ImportSpec { alias, path })
    }

    fn parse_type_decls(&mut self, decls: &mut Vec<Declaration>) -> JsonDocResult<()> {
        let keyword = self.bump_token()?;
        let group_doc = self.doc_above(keyword.line);
        if self.eat(TokenKind::LParen) {
            loop {
                self.skip_separators();
                if self.eat(TokenKind::RParen) {
                    return Ok(());
                }
                let line = self.current_line();
                let doc = self.doc_above(line).or_else(|| group_doc.clone());
                decls.push(self.parse_type_spec(doc)?);
            }
        }
        decls.push(self.parse_type_spec(group_doc)?);
        Ok(())
    }

    fn parse_type_spec(&mut self, doc: Option<String>) -> JsonDocResult<Declaration> {
        let name_token = self.expect(TokenKind::Ident, "type name")?;
        let name = self.text(&name_token).to_string();
        if self.at(TokenKind::LBracket) && self.starts_type_params() {
            self.skip_balanced()?;
        }
        self.eat(TokenKind::Assign);
        let ty = self.parse_type()?;
        Ok(Declaration {
            name,
            kind: DeclKind::Type { ty },
            file: 0,
            doc,
            line: name_token.line,
        })
    }

    /// `[T any]` after a type name, as opposed to `[N]T`
    fn starts_type_params(&self) -> bool {
        self.peek_at(1) == Some(TokenKind::Ident) && self.peek_at(2) != Some(TokenKind::RBracket)
    }

    fn parse_func(&mut self, decls: &mut Vec<Declaration>) -> JsonDocResult<()> {
        let keyword = self.bump_token()?;
        let is_method = self.at(TokenKind::LParen);
        if is_method {
            self.skip_balanced()?;
        }
        let name_token = self.expect(TokenKind::Ident, "function name")?;
        if self.at(TokenKind::LBracket) {
            self.skip_balanced()?;
        }
        if !self.at(TokenKind::LParen) {
            return Err(self.error("expected parameter list"));
        }
        self.skip_balanced()?;

        match self.peek() {
            Some(TokenKind::LParen) => self.skip_balanced()?,
            Some(TokenKind::LBrace)
            | Some(TokenKind::Newline)
            | Some(TokenKind::Semicolon)
            | None => {}
            Some(_) => {
                self.parse_type()?;
            }
        }
        if self.at(TokenKind::LBrace) {
            self.skip_balanced()?;
        }

        if !is_method {
            decls.push(Declaration {
                name: self.text(&name_token).to_string(),
                kind: DeclKind::Value {
                    value: ValueKind::Func,
                },
                file: 0,
                doc: self.doc_above(keyword.line),
                line: name_token.line,
            });
        }
        Ok(())
    }

    fn parse_value_decls(
        &mut self,
        value: ValueKind,
        decls: &mut Vec<Declaration>,
    ) -> JsonDocResult<()> {
        self.bump();
        if self.eat(TokenKind::LParen) {
            loop {
                self.skip_separators();
                match self.peek() {
                    Some(TokenKind::RParen) => {
                        self.bump();
                        return Ok(());
                    }
                    Some(TokenKind::Ident) => self.parse_value_spec(value, decls)?,
                    Some(_) => {
                        self.bump();
                    }
                    None => return Err(self.error("unterminated declaration group")),
                }
            }
        }
        self.parse_value_spec(value, decls)
    }

    fn parse_value_spec(
        &mut self,
        value: ValueKind,
        decls: &mut Vec<Declaration>,
    ) -> JsonDocResult<()> {
        loop {
            let token = self.expect(TokenKind::Ident, "name")?;
            let name = self.text(&token);
            if name != "_" {
                decls.push(Declaration {
                    name: name.to_string(),
                    kind: DeclKind::Value { value },
                    file: 0,
                    doc: self.doc_above(token.line),
                    line: token.line,
                });
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
            self.skip_newlines();
        }
        self.skip_to_spec_end()
    }

    /// Skip a type and initializer up to the end of the spec, honoring Go's
    /// rule that a newline only ends a statement after certain tokens.
    fn skip_to_spec_end(&mut self) -> JsonDocResult<()> {
        let mut prev: Option<Token> = None;
        while let Some(kind) = self.peek() {
            match kind {
                TokenKind::Semicolon | TokenKind::RParen => return Ok(()),
                TokenKind::Newline if prev.as_ref().map_or(true, |p| self.ends_statement(p)) => {
                    return Ok(())
                }
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => {
                    let open = self.tokens[self.pos].clone();
                    self.skip_balanced()?;
                    prev = Some(Token {
                        kind: closing_of(open.kind),
                        ..open
                    });
                }
                _ => prev = Some(self.bump_token()?),
            }
        }
        Ok(())
    }

    fn ends_statement(&self, token: &Token) -> bool {
        match token.kind {
            TokenKind::Ident
            | TokenKind::Number
            | TokenKind::String
            | TokenKind::RawString
            | TokenKind::Char
            | TokenKind::RParen
            | TokenKind::RBracket
            | TokenKind::RBrace => true,
            TokenKind::Operator => matches!(self.text(token), "++" | "--"),
            _ => false,
        }
    }

    // ========== Types ==========

    fn parse_type(&mut self) -> JsonDocResult<TypeExpr> {
        let Some(kind) = self.peek() else {
            return Err(self.error("expected type, found end of file"));
        };
        match kind {
            TokenKind::Ident => {
                let first = self.bump_token()?;
                let ty = if self.at(TokenKind::Dot) && self.peek_at(1) == Some(TokenKind::Ident) {
                    self.bump();
                    let name = self.bump_token()?;
                    TypeExpr::qualified(self.text(&first), self.text(&name))
                } else {
                    TypeExpr::ident(self.text(&first))
                };
                // generic instantiation, rendered as the base type
                if self.at(TokenKind::LBracket) {
                    self.skip_balanced()?;
                }
                Ok(ty)
            }
            TokenKind::Star => {
                self.bump();
                Ok(TypeExpr::pointer(self.parse_type()?))
            }
            TokenKind::LBracket => {
                if self.peek_at(1) == Some(TokenKind::RBracket) {
                    self.bump();
                    self.bump();
                } else {
                    self.skip_balanced()?;
                }
                Ok(TypeExpr::array(self.parse_type()?))
            }
            TokenKind::Map => {
                self.bump();
                self.expect(TokenKind::LBracket, "[ after map")?;
                let key = self.parse_type()?;
                self.expect(TokenKind::RBracket, "] after map key")?;
                let value = self.parse_type()?;
                Ok(TypeExpr::map(key, value))
            }
            TokenKind::Struct => self.parse_struct(),
            TokenKind::Interface => {
                let start = self.bump_token()?.span.start;
                if !self.at(TokenKind::LBrace) {
                    return Err(self.error("expected { after interface"));
                }
                self.skip_balanced()?;
                Ok(TypeExpr::opaque(self.source_since(start)))
            }
            TokenKind::Func => {
                let start = self.bump_token()?.span.start;
                if !self.at(TokenKind::LParen) {
                    return Err(self.error("expected ( after func"));
                }
                self.skip_balanced()?;
                match self.peek() {
                    Some(TokenKind::LParen) => self.skip_balanced()?,
                    Some(k) if starts_type(k) => {
                        self.parse_type()?;
                    }
                    _ => {}
                }
                Ok(TypeExpr::opaque(self.source_since(start)))
            }
            TokenKind::Chan => {
                let start = self.bump_token()?.span.start;
                if self.at(TokenKind::Operator) && self.current_text() == "<-" {
                    self.bump();
                }
                self.parse_type()?;
                Ok(TypeExpr::opaque(self.source_since(start)))
            }
            TokenKind::Operator if self.current_text() == "<-" => {
                let start = self.bump_token()?.span.start;
                self.expect(TokenKind::Chan, "chan after <-")?;
                self.parse_type()?;
                Ok(TypeExpr::opaque(self.source_since(start)))
            }
            TokenKind::LParen => {
                self.bump();
                let ty = self.parse_type()?;
                self.expect(TokenKind::RParen, ")")?;
                Ok(ty)
            }
            _ => Err(self.error(format!("expected type, found {:?}", self.current_text()))),
        }
    }

    fn parse_struct(&mut self) -> JsonDocResult<TypeExpr> {
        self.bump();
        self.expect(TokenKind::LBrace, "{ after struct")?;
        let mut members = Vec::new();

        loop {
            self.skip_separators();
            match self.peek() {
                Some(TokenKind::RBrace) => {
                    self.bump();
                    break;
                }
                None => return Err(self.error("unterminated struct")),
                Some(_) => {}
            }

            let first_line = self.current_line();
            let mut fields = self.parse_field_decl()?;

            let tag = match self.peek() {
                Some(TokenKind::String) | Some(TokenKind::RawString) => {
                    Some(self.string_literal("struct tag")?)
                }
                _ => None,
            };
            let description = self
                .trailing_comment(self.prev_end_line)
                .or_else(|| self.doc_above(first_line));

            match self.peek() {
                Some(TokenKind::Newline) | Some(TokenKind::Semicolon) | Some(TokenKind::RBrace) => {}
                _ => return Err(self.error("expected end of struct field")),
            }

            for field in &mut fields {
                field.tag = tag.clone();
                field.description = description.clone();
                field.line = first_line;
            }
            members.extend(fields);
        }

        Ok(TypeExpr::structure(members))
    }

    fn parse_field_decl(&mut self) -> JsonDocResult<Vec<Member>> {
        match self.peek() {
            Some(TokenKind::Star) => Ok(vec![Member::embedded(self.parse_type()?)]),
            Some(TokenKind::Ident) => match self.peek_at(1) {
                Some(TokenKind::Comma) => {
                    let mut names = Vec::new();
                    loop {
                        let token = self.expect(TokenKind::Ident, "field name")?;
                        names.push(self.text(&token).to_string());
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                        self.skip_newlines();
                    }
                    let ty = self.parse_type()?;
                    Ok(names
                        .into_iter()
                        .map(|name| Member::field(name, ty.clone()))
                        .collect())
                }
                Some(TokenKind::Dot)
                | Some(TokenKind::Newline)
                | Some(TokenKind::Semicolon)
                | Some(TokenKind::RBrace)
                | Some(TokenKind::String)
                | Some(TokenKind::RawString)
                | None => Ok(vec![Member::embedded(self.parse_type()?)]),
                Some(_) => {
                    let token = self.bump_token()?;
                    let name = self.text(&token).to_string();
                    Ok(vec![Member::field(name, self.parse_type()?)])
                }
            },
            _ => Err(self.error(format!(
                "expected field name, found {:?}",
                self.current_text()
            ))),
        }
    }

    // ========== Comments ==========

    fn doc_above(&self, line: usize) -> Option<String> {
        let mut lines = Vec::new();
        let mut next = line.checked_sub(1)?;
        while let Some(comment) = self
            .comments
            .iter()
            .find(|c| c.own_line && c.end_line == next)
        {
            lines.push(comment.text.as_str());
            match comment.line.checked_sub(1) {
                Some(l) => next = l,
                None => break,
            }
        }
        if lines.is_empty() {
            return None;
        }
        lines.reverse();
        Some(lines.join(" "))
    }

    fn trailing_comment(&self, line: usize) -> Option<String> {
        self.comments
            .iter()
            .find(|c| !c.own_line && c.line == line)
            .map(|c| c.text.clone())
    }

    // ========== Cursor ==========

    fn peek(&self) -> Option<TokenKind> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| t.kind)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == Some(kind)
    }

    fn bump(&mut self) {
        if let Some(token) = self.tokens.get(self.pos) {
            self.prev_end_line = token.end_line;
            self.pos += 1;
        }
    }

    fn bump_token(&mut self) -> JsonDocResult<Token> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| self.error("unexpected end of file"))?;
        self.bump();
        Ok(token)
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> JsonDocResult<Token> {
        if self.at(kind) {
            self.bump_token()
        } else {
            Err(self.error(format!(
                "expected {}, found {:?}",
                what,
                self.current_text()
            )))
        }
    }

    fn skip_newlines(&mut self) {
        while self.eat(TokenKind::Newline) {}
    }

    fn skip_separators(&mut self) {
        while self.eat(TokenKind::Newline) || self.eat(TokenKind::Semicolon) {}
    }

    /// Skip from an opening bracket past its matching close
    fn skip_balanced(&mut self) -> JsonDocResult<()> {
        let start_line = self.current_line();
        let mut depth = 0usize;
        while let Some(kind) = self.peek() {
            self.bump();
            match kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
        Err(JsonDocError::parse_at(
            &self.file,
            "unbalanced brackets",
            start_line,
        ))
    }

    fn string_literal(&mut self, what: &str) -> JsonDocResult<String> {
        let token = match self.peek() {
            Some(TokenKind::String) | Some(TokenKind::RawString) => self.bump_token()?,
            _ => {
                return Err(self.error(format!(
                    "expected {}, found {:?}",
                    what,
                    self.current_text()
                )))
            }
        };
        let text = self.text(&token);
        if token.kind == TokenKind::RawString {
            return Ok(text.trim_matches('`').replace('\r', ""));
        }
        unquote(text).map_err(|reason| {
            JsonDocError::parse_at(&self.file, format!("invalid {}: {}", what, reason), token.line)
        })
    }

    fn text(&self, token: &Token) -> &'s str {
        &self.source[token.span.clone()]
    }

    fn current_text(&self) -> &'s str {
        self.tokens
            .get(self.pos)
            .map(|t| &self.source[t.span.clone()])
            .unwrap_or("end of file")
    }

    fn current_line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|t| t.line)
            .unwrap_or(self.prev_end_line)
    }

    /// Source text from `start` to the end of the last consumed token,
    /// whitespace collapsed
    fn source_since(&self, start: usize) -> String {
        let end = self
            .pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.span.end)
            .unwrap_or(start);
        self.source[start..end]
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn error(&self, message: impl Into<String>) -> JsonDocError {
        JsonDocError::parse_at(&self.file, message, self.current_line())
    }
}

fn starts_type(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Ident
            | TokenKind::Star
            | TokenKind::LBracket
            | TokenKind::Map
            | TokenKind::Struct
            | TokenKind::Interface
            | TokenKind::Func
            | TokenKind::Chan
    )
}

fn closing_of(open: TokenKind) -> TokenKind {
    match open {
        TokenKind::LParen => TokenKind::RParen,
        TokenKind::LBracket => TokenKind::RBracket,
        _ => TokenKind::RBrace,
    }
}

/// Strip comment markers and surrounding whitespace
fn comment_text(raw: &str) -> String {
    let body = raw
        .strip_prefix("//")
        .or_else(|| raw.strip_prefix("/*").and_then(|s| s.strip_suffix("*/")))
        .unwrap_or(raw);
    body.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> ParsedFile {
        parse_file("test.go", source).unwrap()
    }

    fn type_of<'a>(file: &'a ParsedFile, name: &str) -> &'a TypeExpr {
        file.decls
            .iter()
            .find(|d| d.name == name)
            .and_then(|d| d.type_expr())
            .unwrap()
    }

    #[test]
    fn test_package_and_imports() {
        let file = parse(
            r#"package api

import "encoding/json"
import (
    m "example.com/shop/models"
    _ "embed"
    "time"
)
"#,
        );
        assert_eq!(file.package, "api");
        let names: Vec<_> = file.imports.iter().map(|i| i.local_name()).collect();
        assert_eq!(names, vec![Some("json"), Some("m"), None, Some("time")]);
        assert_eq!(file.imports[1].path, "example.com/shop/models");
    }

    #[test]
    fn test_struct_fields() {
        let file = parse(
            "package example\n\
             type helloInput struct {\n\
             \tName string `json:\"test\"` // Name to be used in greetings\n\
             \tA, B int // Some numeric parameter\n\
             \tSize size `json:\"size\"`\n\
             }\n",
        );
        let TypeExpr::Struct { members } = type_of(&file, "helloInput") else {
            panic!("expected struct");
        };
        assert_eq!(members.len(), 4);
        assert_eq!(members[0].name.as_deref(), Some("Name"));
        assert_eq!(members[0].tag.as_deref(), Some("json:\"test\""));
        assert_eq!(
            members[0].description.as_deref(),
            Some("Name to be used in greetings")
        );
        assert_eq!(members[1].name.as_deref(), Some("A"));
        assert_eq!(members[2].name.as_deref(), Some("B"));
        assert_eq!(members[2].ty, TypeExpr::ident("int"));
        assert_eq!(members[2].description.as_deref(), Some("Some numeric parameter"));
        assert_eq!(members[3].ty, TypeExpr::ident("size"));
        assert_eq!(members[3].description, None);
    }

    #[test]
    fn test_nested_types() {
        let file = parse(
            r#"package example

type itemGetInput struct {
	C struct {
		D, E int
		F    []struct {
			A, B int
		} `json:"f"`
		G [][]struct {
			A, B, C int
		} `json:"g"`
	}
	M map[string]*models.Item
	P [4]byte
}
"#,
        );
        let TypeExpr::Struct { members } = type_of(&file, "itemGetInput") else {
            panic!("expected struct");
        };
        let TypeExpr::Struct { members: inner } = &members[0].ty else {
            panic!("expected inline struct");
        };
        assert_eq!(inner.len(), 4);
        assert_eq!(inner[2].tag.as_deref(), Some("json:\"f\""));
        assert!(matches!(&inner[2].ty, TypeExpr::Array { .. }));
        assert_eq!(
            members[1].ty,
            TypeExpr::map(
                TypeExpr::ident("string"),
                TypeExpr::pointer(TypeExpr::qualified("models", "Item"))
            )
        );
        assert_eq!(members[2].ty, TypeExpr::array(TypeExpr::ident("byte")));
    }

    #[test]
    fn test_embedded_members() {
        let file = parse(
            r#"package example

type info struct {
	size
	*Base
	models.Audit `json:"audit"`
	Weight float64 `json:"weight"` // weight of the object
}
"#,
        );
        let TypeExpr::Struct { members } = type_of(&file, "info") else {
            panic!("expected struct");
        };
        assert!(members[0].is_embedded());
        assert_eq!(members[0].ty, TypeExpr::ident("size"));
        assert_eq!(members[1].ty, TypeExpr::pointer(TypeExpr::ident("Base")));
        assert_eq!(members[2].ty, TypeExpr::qualified("models", "Audit"));
        assert_eq!(members[2].tag.as_deref(), Some("json:\"audit\""));
        assert_eq!(members[3].name.as_deref(), Some("Weight"));
    }

    #[test]
    fn test_type_groups_and_docs() {
        let file = parse(
            r#"package example

// itemGetOutput specifies output of /item/get request
type itemGetOutput struct {
	// request ID assigned
	// by the server
	RequestID string `json:"request_id"`
}

type (
	empty   struct{}
	emptyOA map[string][]struct{}
	// ID of an item
	ID = int64
)
"#,
        );
        let out = file.decls.iter().find(|d| d.name == "itemGetOutput").unwrap();
        assert_eq!(
            out.doc.as_deref(),
            Some("itemGetOutput specifies output of /item/get request")
        );
        let TypeExpr::Struct { members } = type_of(&file, "itemGetOutput") else {
            panic!("expected struct");
        };
        assert_eq!(
            members[0].description.as_deref(),
            Some("request ID assigned by the server")
        );
        assert_eq!(type_of(&file, "empty"), &TypeExpr::structure(vec![]));
        assert_eq!(
            type_of(&file, "emptyOA"),
            &TypeExpr::map(
                TypeExpr::ident("string"),
                TypeExpr::array(TypeExpr::structure(vec![]))
            )
        );
        let id = file.decls.iter().find(|d| d.name == "ID").unwrap();
        assert_eq!(id.doc.as_deref(), Some("ID of an item"));
        assert_eq!(id.type_expr(), Some(&TypeExpr::ident("int64")));
    }

    #[test]
    fn test_values_and_functions() {
        let file = parse(
            r#"package example

const Version = "1.0"

var (
	total = 1 +
		2
	a, _ = split(func() int {
		return 1
	})
)

func (s *server) handle(w http.ResponseWriter) {
	type local struct{}
}

func NewServer(opts ...Option) (*Server, error) {
	return nil, nil
}

type after struct{}
"#,
        );
        let names: Vec<_> = file
            .decls
            .iter()
            .map(|d| (d.name.as_str(), d.type_expr().is_some()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("Version", false),
                ("total", false),
                ("a", false),
                ("NewServer", false),
                ("after", true),
            ]
        );
    }

    #[test]
    fn test_opaque_types() {
        let file = parse(
            r#"package example

type handlers struct {
	Any      interface{}
	Callback func(int) error `json:"-"`
	Events   <-chan string
}
"#,
        );
        let TypeExpr::Struct { members } = type_of(&file, "handlers") else {
            panic!("expected struct");
        };
        assert_eq!(members[0].ty, TypeExpr::opaque("interface{}"));
        assert_eq!(members[1].ty, TypeExpr::opaque("func(int) error"));
        assert_eq!(members[2].ty, TypeExpr::opaque("<-chan string"));
    }

    #[test]
    fn test_generic_declarations() {
        let file = parse(
            r#"package example

type Page[T any] struct {
	Total int
}

type Buffer [16]byte

type Pages struct {
	Users Page[User]
}
"#,
        );
        assert!(matches!(type_of(&file, "Page"), TypeExpr::Struct { .. }));
        assert_eq!(type_of(&file, "Buffer"), &TypeExpr::array(TypeExpr::ident("byte")));
        let TypeExpr::Struct { members } = type_of(&file, "Pages") else {
            panic!("expected struct");
        };
        assert_eq!(members[0].ty, TypeExpr::ident("Page"));
    }

    #[test]
    fn test_block_comment_descriptions() {
        let file = parse(
            "/* Copyright 2016\n * All rights reserved.\n */\n\
             package a\n\n\
             type T struct {\n\
             \tA int /* the a */\n\
             \t/* the b */\n\
             \tB string `json:\"b\"`\n\
             \tC int /* spans\n\
             \tlines */ D int\n\
             }\n",
        );
        assert_eq!(file.package, "a");
        let TypeExpr::Struct { members } = type_of(&file, "T") else {
            panic!("expected struct");
        };
        assert_eq!(members.len(), 4);
        assert_eq!(members[0].description.as_deref(), Some("the a"));
        assert_eq!(members[1].description.as_deref(), Some("the b"));
        assert_eq!(members[1].tag.as_deref(), Some("json:\"b\""));
        assert_eq!(members[2].name.as_deref(), Some("C"));
        assert_eq!(members[2].description.as_deref(), Some("spans lines"));
        assert_eq!(members[3].name.as_deref(), Some("D"));
    }

    #[test]
    fn test_errors_carry_location() {
        let err = parse_file("bad.go", "package a\n\ntype x struct {\n\tA int int int\n}\n")
            .unwrap_err();
        assert_eq!(err.kind(), "parse");
        assert!(err.to_string().contains("bad.go:4"), "{}", err);

        let err = parse_file("nopkg.go", "type x int\n").unwrap_err();
        assert!(err.to_string().contains("missing package clause"));
    }
}
