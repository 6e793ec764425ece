//! Declaration-level pre-parse stage sitting between the lexer and the precompiler.
//!
//! The preparser walks the flat [`Token`](crate::lexer::Token) stream produced by
//! [`crate::lexer::tokenize`] and segments it into declaration-level units without ever
//! building expression-level AST: it locates where each top-level declaration begins and
//! ends (tracking balanced `{}`/`()`/`[]` so a shell's span always ends at the matching
//! close of its opening delimiter), splits off import and macro-definition declarations
//! into their own lists, and leaves everything else as an opaque, still-unparsed
//! [`DeclShell`] for the parser proper to pick up later.

use std::fmt::Display;

use liblily_macros::LilyError;
use liblily_macros_core::SourceCode;

use crate::{file::SourceFile, lexer::{Keyword, Punctuation, Token, TokenKind}};

/// The fourteen kinds of top-level declaration the preparser recognizes by leading
/// keyword. `EnumObject`/`RecordObject` mirror [`crate::ast::ObjectKind`]; `Method` is
/// only produced for declarations nested inside an `object`/`class`/`trait`/`impl` shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Fun,
    Type,
    Module,
    Object,
    Constant,
    Error,
    Alias,
    Enum,
    Record,
    Class,
    Trait,
    EnumObject,
    RecordObject,
    Method,
}

impl Display for DeclKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            DeclKind::Fun => "fun",
            DeclKind::Type => "type",
            DeclKind::Module => "module",
            DeclKind::Object => "object",
            DeclKind::Constant => "constant",
            DeclKind::Error => "error",
            DeclKind::Alias => "alias",
            DeclKind::Enum => "enum",
            DeclKind::Record => "record",
            DeclKind::Class => "class",
            DeclKind::Trait => "trait",
            DeclKind::EnumObject => "enum object",
            DeclKind::RecordObject => "record object",
            DeclKind::Method => "method",
        };
        f.write_str(text)
    }
}

/// A borrowed, balanced slice of the original token stream. The preparser never copies
/// tokens: every shell, macro body and macro parameter list is just a subslice of the
/// `Vec<Token>` the lexer produced.
pub type TokenSpan<'base> = &'base [Token<'base>];

/// A single top-level (or, for `module`, recursively nested) declaration, not yet
/// parsed into expression-level AST.
#[derive(Debug)]
pub struct DeclShell<'base> {
    pub name: &'base str,
    pub kind: DeclKind,
    pub span: TokenSpan<'base>,
    pub nested: Vec<DeclShell<'base>>,
}

/// One segment of an import path: either a plain path component or a `{a, b, c}`
/// select-group, which the precompiler later unfolds into multiple imports.
#[derive(Debug, Clone)]
pub enum ImportSegment<'base> {
    Access(&'base str),
    Select(Vec<Vec<ImportSegment<'base>>>),
}

/// A single `use` declaration, still in source form (the precompiler classifies the
/// leading segment into a `LilyImportValueKind`-equivalent).
#[derive(Debug, Clone)]
pub struct Import<'base> {
    pub path: Vec<ImportSegment<'base>>,
    pub alias: Option<&'base str>,
    pub span: TokenSpan<'base>,
}

/// A `macro` definition: a name, a borrowed parameter-list span and a borrowed body
/// span, both left unexpanded for the precompiler.
#[derive(Debug)]
pub struct MacroDef<'base> {
    pub name: &'base str,
    pub params: TokenSpan<'base>,
    pub body: TokenSpan<'base>,
}

/// Optional `module <name>;` header at the very top of a file, naming the package this
/// file's declarations belong to.
#[derive(Debug, Default, Clone)]
pub struct PackageHeader<'base> {
    pub name: Option<&'base str>,
}

/// Everything the preparser extracted from one file's token stream.
#[derive(Debug)]
pub struct PreparserInfo<'base> {
    pub package_header: PackageHeader<'base>,
    pub public_imports: Vec<Import<'base>>,
    pub private_imports: Vec<Import<'base>>,
    pub public_macros: Vec<MacroDef<'base>>,
    pub private_macros: Vec<MacroDef<'base>>,
    pub shells: Vec<DeclShell<'base>>,
}

#[derive(Clone, Debug, LilyError, thiserror::Error)]
#[error("unexpected token at the top level")]
#[diagnostic(code("lily::error::preparser_malformed_top_level"), help("expected a 'pub', 'use', 'macro' or declaration keyword here"))]
pub struct MalformedTopLevel {
    #[label("not a recognized top-level declaration")]
    pub position: std::ops::Range<usize>,

    #[source_code]
    pub code: SourceCode,
}

#[derive(Clone, Debug, LilyError, thiserror::Error)]
#[error("unbalanced delimiters in declaration")]
#[diagnostic(code("lily::error::preparser_unbalanced_delimiters"), help("check for a missing closing '}', ')' or ']'"))]
pub struct UnbalancedDelimiters {
    #[label("this delimiter is never closed")]
    pub position: std::ops::Range<usize>,

    #[source_code]
    pub code: SourceCode,
}

/// Errors the preparser can report. Unlike [`crate::tir::TirError`] these are recovered
/// from, not propagated as a hard abort: [`prepare`] keeps scanning after each one and
/// returns every error it accumulated alongside whatever shells it could still recover.
#[derive(Clone, Debug, thiserror::Error)]
pub enum PreparserError {
    #[error(transparent)]
    MalformedTopLevel(#[from] MalformedTopLevel),

    #[error(transparent)]
    UnbalancedDelimiters(#[from] UnbalancedDelimiters),
}

/// Explicit depth-tracking state the single pass over `&[Token]` moves through. `nom`'s
/// combinator style does not itself track "depth" as first-class state, so the
/// preparser is written as a plain loop over token indices instead of a combinator
/// chain, since it needs to report that depth in `UnbalancedDelimiters`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PreparserState {
    TopLevel,
    InsideDecl(u32),
}

fn is_open_delim(kind: &TokenKind) -> bool {
    matches!(kind, TokenKind::Punctuation(Punctuation::LBrace | Punctuation::LParen | Punctuation::LBracket))
}

fn matching_close(kind: &TokenKind) -> Option<Punctuation> {
    match kind {
        TokenKind::Punctuation(Punctuation::LBrace) => Some(Punctuation::RBrace),
        TokenKind::Punctuation(Punctuation::LParen) => Some(Punctuation::RParen),
        TokenKind::Punctuation(Punctuation::LBracket) => Some(Punctuation::RBracket),
        _ => None,
    }
}

fn is_close_delim(kind: &TokenKind) -> bool {
    matches!(kind, TokenKind::Punctuation(Punctuation::RBrace | Punctuation::RParen | Punctuation::RBracket))
}

/// Scans forward from `start` (the declaration's leading keyword token) and returns the
/// index one past the span's last token, given the first open delimiter is at `open_at`.
/// Tracks nested delimiters with an explicit depth counter (the `PreparserState`
/// machine) rather than recursion, so arbitrarily deep nesting never blows the Rust
/// call stack.
fn scan_balanced<'base>(tokens: &'base [Token<'base>], open_at: usize) -> Result<usize, usize> {
    let mut state = PreparserState::InsideDecl(1);
    let opener = &tokens[open_at].kind;
    let closer = matching_close(opener).expect("scan_balanced called on a non-opening token");

    let mut index = open_at + 1;
    while index < tokens.len() {
        let kind = &tokens[index].kind;
        if is_open_delim(kind) {
            state = match state {
                PreparserState::InsideDecl(depth) => PreparserState::InsideDecl(depth + 1),
                PreparserState::TopLevel => PreparserState::InsideDecl(1),
            };
        } else if kind == &TokenKind::Punctuation(closer) || is_close_delim(kind) {
            state = match state {
                PreparserState::InsideDecl(depth) if depth > 1 => PreparserState::InsideDecl(depth - 1),
                PreparserState::InsideDecl(_) => {
                    return Ok(index + 1);
                }
                PreparserState::TopLevel => state,
            };
        }
        index += 1;
    }

    Err(open_at)
}

/// Splits a comma-separated argument list respecting nested delimiters, used for both
/// import select-groups and macro parameter lists.
fn split_top_level_commas<'base>(tokens: &'base [Token<'base>]) -> Vec<&'base [Token<'base>]> {
    let mut groups = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;

    for (index, token) in tokens.iter().enumerate() {
        if is_open_delim(&token.kind) {
            depth += 1;
        } else if is_close_delim(&token.kind) {
            depth -= 1;
        } else if depth == 0 && token.kind == TokenKind::Punctuation(Punctuation::Comma) {
            groups.push(&tokens[start..index]);
            start = index + 1;
        }
    }
    if start < tokens.len() {
        groups.push(&tokens[start..]);
    }
    groups
}

fn parse_import_segment<'base>(tokens: &'base [Token<'base>]) -> Vec<ImportSegment<'base>> {
    let mut segments = Vec::new();
    let mut index = 0;

    while index < tokens.len() {
        let token = &tokens[index];
        match &token.kind {
            TokenKind::Identifier => {
                segments.push(ImportSegment::Access(token.lexeme()));
                index += 1;
            }
            TokenKind::Punctuation(Punctuation::LBrace) => {
                let end = scan_balanced(tokens, index).unwrap_or(tokens.len());
                let inner = &tokens[index + 1..end.saturating_sub(1)];
                let groups = split_top_level_commas(inner).into_iter().map(parse_import_segment).collect();
                segments.push(ImportSegment::Select(groups));
                index = end;
            }
            _ => index += 1,
        }
    }

    segments
}

/// Parses one `use ...;` declaration starting just after the `use` keyword token,
/// splitting off a trailing `as <ident>` alias if present.
fn parse_import<'base>(tokens: &'base [Token<'base>], start: usize) -> (Import<'base>, usize) {
    let mut end = start;
    while end < tokens.len() && tokens[end].kind != TokenKind::Punctuation(Punctuation::Semicolon) {
        end += 1;
    }

    let body = &tokens[start..end];
    let as_position = body.iter().position(|t| t.kind == TokenKind::Keyword(Keyword::As));

    let (path_tokens, alias) = match as_position {
        Some(pos) => {
            let alias = body.get(pos + 1).map(|t| t.lexeme());
            (&body[..pos], alias)
        }
        None => (body, None),
    };

    (
        Import {
            path: parse_import_segment(path_tokens),
            alias,
            span: body,
        },
        (end + 1).min(tokens.len()),
    )
}

/// Parses one `macro <name>(...) { ... }` declaration starting at the `macro` keyword
/// token's index (matched by lexeme since `macro` is not in [`crate::lexer::Keyword`]:
/// it is a preparser-only concept, never re-tokenized by the parser).
fn parse_macro<'base>(tokens: &'base [Token<'base>], start: usize) -> Result<(MacroDef<'base>, usize), usize> {
    let name_index = start + 1;
    let name = tokens.get(name_index).map(|t| t.lexeme()).unwrap_or("");

    let paren_index = name_index + 1;
    let params_end = scan_balanced(tokens, paren_index).map_err(|_| paren_index)?;
    let params = &tokens[paren_index + 1..params_end.saturating_sub(1)];

    let brace_index = params_end;
    let body_end = scan_balanced(tokens, brace_index).map_err(|_| brace_index)?;
    let body = &tokens[brace_index + 1..body_end.saturating_sub(1)];

    Ok((MacroDef { name, params, body }, body_end))
}

fn decl_name<'base>(tokens: &'base [Token<'base>], keyword_index: usize) -> &'base str {
    tokens.get(keyword_index + 1).map(|t| t.lexeme()).unwrap_or("")
}

/// Recursively parses the shells nested inside a `module { ... }` declaration's span,
/// reusing [`prepare`]'s own top-level loop over the inner tokens.
fn parse_nested_shells<'base>(tokens: &'base [Token<'base>]) -> Vec<DeclShell<'base>> {
    let mut errors = Vec::new();
    let info = prepare_inner(tokens, &mut errors);
    info.shells
}

/// Main entry point: segments `tokens` into import/macro lists and declaration shells.
/// Recovers from `PreparserError`s by skipping to the next top-level declaration
/// keyword rather than aborting, matching the accumulate-don't-abort error policy used
/// throughout analysis.
pub fn prepare<'base>(tokens: &'base [Token<'base>], source: &SourceFile) -> (PreparserInfo<'base>, Vec<PreparserError>) {
    let mut errors = Vec::new();
    let mut info = prepare_inner(tokens, &mut errors);

    // Attach source context to every accumulated error now that we have it.
    let errors = errors
        .into_iter()
        .map(|error: RawPreparserError| match error {
            RawPreparserError::MalformedTopLevel(position) => {
                PreparserError::MalformedTopLevel(MalformedTopLevel { position, code: source.into() })
            }
            RawPreparserError::UnbalancedDelimiters(position) => {
                PreparserError::UnbalancedDelimiters(UnbalancedDelimiters { position, code: source.into() })
            }
        })
        .collect();

    if info.package_header.name.is_none() {
        info.package_header = PackageHeader::default();
    }

    (info, errors)
}

/// Error shape collected during the scan, before we have a `SourceFile` to attach.
enum RawPreparserError {
    MalformedTopLevel(std::ops::Range<usize>),
    UnbalancedDelimiters(std::ops::Range<usize>),
}

fn token_position(token: &Token<'_>) -> std::ops::Range<usize> {
    token.span.position.clone()
}

fn prepare_inner<'base>(tokens: &'base [Token<'base>], errors: &mut Vec<RawPreparserError>) -> PreparserInfo<'base> {
    let mut info = PreparserInfo {
        package_header: PackageHeader::default(),
        public_imports: Vec::new(),
        private_imports: Vec::new(),
        public_macros: Vec::new(),
        private_macros: Vec::new(),
        shells: Vec::new(),
    };

    let mut index = 0usize;
    let mut saw_leading_decl = false;

    while index < tokens.len() {
        let token = &tokens[index];
        if token.kind == TokenKind::Eof {
            break;
        }

        let mut public = false;
        let mut cursor = index;
        if tokens[cursor].kind == TokenKind::Keyword(Keyword::Pub) {
            public = true;
            cursor += 1;
        }

        if cursor >= tokens.len() {
            break;
        }

        let current = &tokens[cursor];

        if current.kind == TokenKind::Keyword(Keyword::Use) {
            let (import, next) = parse_import(tokens, cursor + 1);
            if public {
                info.public_imports.push(import);
            } else {
                info.private_imports.push(import);
            }
            index = next;
            saw_leading_decl = true;
            continue;
        }

        if current.kind == TokenKind::Identifier && current.lexeme() == "macro" {
            match parse_macro(tokens, cursor) {
                Ok((macro_def, next)) => {
                    if public {
                        info.public_macros.push(macro_def);
                    } else {
                        info.private_macros.push(macro_def);
                    }
                    index = next;
                }
                Err(open_at) => {
                    errors.push(RawPreparserError::UnbalancedDelimiters(token_position(&tokens[open_at])));
                    index = recover_to_next_decl(tokens, cursor + 1);
                }
            }
            saw_leading_decl = true;
            continue;
        }

        if current.kind == TokenKind::Identifier && current.lexeme() == "module" && !saw_leading_decl {
            let name = decl_name(tokens, cursor);
            let semicolon = tokens.get(cursor + 2).map(|t| t.kind.clone());
            if semicolon == Some(TokenKind::Punctuation(Punctuation::Semicolon)) {
                info.package_header = PackageHeader { name: Some(name) };
                index = cursor + 3;
                saw_leading_decl = true;
                continue;
            }
        }

        let two_word_object_kind = match (&current.kind, tokens.get(cursor + 1).map(|t| (&t.kind, t.lexeme()))) {
            (TokenKind::Keyword(Keyword::Enum), Some((TokenKind::Identifier, "object"))) => Some((DeclKind::EnumObject, 1usize)),
            (TokenKind::Keyword(Keyword::Record), Some((TokenKind::Identifier, "object"))) => Some((DeclKind::RecordObject, 1usize)),
            _ => None,
        };

        if let Some((kind, name_offset)) = two_word_object_kind.or_else(|| decl_kind_of(current).map(|kind| (kind, 0))) {
            let name = decl_name(tokens, cursor + name_offset);
            let brace_index = find_opening_brace(tokens, cursor);
            match brace_index {
                Some(open_at) => match scan_balanced(tokens, open_at) {
                    Ok(end) => {
                        let span = &tokens[cursor..end];
                        let nested = if kind == DeclKind::Module { parse_nested_shells(&span[3.min(span.len())..span.len().saturating_sub(1)]) } else { Vec::new() };
                        info.shells.push(DeclShell { name, kind, span, nested });
                        index = end;
                        saw_leading_decl = true;
                        continue;
                    }
                    Err(bad) => {
                        errors.push(RawPreparserError::UnbalancedDelimiters(token_position(&tokens[bad])));
                        index = recover_to_next_decl(tokens, cursor + 1);
                        saw_leading_decl = true;
                        continue;
                    }
                },
                None => {
                    // No `{`/`(`/`[` before the terminating `;` (e.g. `alias X = Y;`):
                    // a valid brace-free shell rather than an error.
                    let mut end = cursor;
                    while end < tokens.len() && tokens[end].kind != TokenKind::Punctuation(Punctuation::Semicolon) {
                        end += 1;
                    }
                    if end < tokens.len() {
                        let span = &tokens[cursor..=end];
                        info.shells.push(DeclShell { name, kind, span, nested: Vec::new() });
                        index = end + 1;
                    } else {
                        errors.push(RawPreparserError::UnbalancedDelimiters(token_position(current)));
                        index = recover_to_next_decl(tokens, cursor + 1);
                    }
                    saw_leading_decl = true;
                    continue;
                }
            }
        }

        errors.push(RawPreparserError::MalformedTopLevel(token_position(current)));
        index = recover_to_next_decl(tokens, cursor + 1);
        saw_leading_decl = true;
    }

    info
}

fn decl_kind_of(token: &Token<'_>) -> Option<DeclKind> {
    match &token.kind {
        TokenKind::Keyword(Keyword::Fun) => Some(DeclKind::Fun),
        TokenKind::Keyword(Keyword::Type) => Some(DeclKind::Type),
        TokenKind::Keyword(Keyword::Constant) | TokenKind::Keyword(Keyword::Const) => Some(DeclKind::Constant),
        TokenKind::Keyword(Keyword::Error) => Some(DeclKind::Error),
        TokenKind::Keyword(Keyword::Trait) => Some(DeclKind::Trait),
        TokenKind::Keyword(Keyword::Impl) => Some(DeclKind::Trait),
        TokenKind::Keyword(Keyword::Class) => Some(DeclKind::Class),
        TokenKind::Keyword(Keyword::Record) => Some(DeclKind::Record),
        TokenKind::Keyword(Keyword::Enum) => Some(DeclKind::Enum),
        TokenKind::Keyword(Keyword::Object) => Some(DeclKind::Object),
        TokenKind::Identifier if token.lexeme() == "module" => Some(DeclKind::Module),
        TokenKind::Identifier if token.lexeme() == "alias" => Some(DeclKind::Alias),
        TokenKind::Identifier if token.lexeme() == "method" => Some(DeclKind::Method),
        _ => None,
    }
}

fn find_opening_brace(tokens: &[Token<'_>], from: usize) -> Option<usize> {
    let mut index = from;
    while index < tokens.len() {
        match &tokens[index].kind {
            TokenKind::Punctuation(Punctuation::LBrace) => return Some(index),
            TokenKind::Punctuation(Punctuation::Semicolon) => return None,
            _ => index += 1,
        }
    }
    None
}

/// Error-recovery cursor: skip forward to the next token that starts a recognizable
/// top-level declaration (or `pub`/`use`), so one malformed declaration doesn't swallow
/// the rest of the file.
fn recover_to_next_decl(tokens: &[Token<'_>], from: usize) -> usize {
    let mut index = from;
    while index < tokens.len() {
        let kind = &tokens[index].kind;
        if kind == &TokenKind::Eof
            || kind == &TokenKind::Keyword(Keyword::Use)
            || kind == &TokenKind::Keyword(Keyword::Pub)
            || decl_kind_of(&tokens[index]).is_some()
        {
            return index;
        }
        index += 1;
    }
    tokens.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{file::SourceFile, lexer, nom_tools::State};

    fn tokens_for(code: &str) -> (Vec<Token<'static>>, SourceFile) {
        let source = SourceFile::new(vec!["test".into()], code.to_string());
        let state = Box::leak(Box::new(State::new(source.clone())));
        (lexer::tokenize(state).unwrap(), source)
    }

    #[test]
    fn splits_public_and_private_imports() {
        let (tokens, source) = tokens_for("use foo.Bar; pub use baz.Qux as Q; fun main(): i32 { }");
        let (info, errors) = prepare(&tokens, &source);
        assert!(errors.is_empty());
        assert_eq!(info.private_imports.len(), 1);
        assert_eq!(info.public_imports.len(), 1);
        assert_eq!(info.public_imports[0].alias, Some("Q"));
    }

    #[test]
    fn records_balanced_declaration_shell() {
        let (tokens, source) = tokens_for("fun add(a: i32, b: i32): i32 { var c = a; }");
        let (info, errors) = prepare(&tokens, &source);
        assert!(errors.is_empty());
        assert_eq!(info.shells.len(), 1);
        assert_eq!(info.shells[0].kind, DeclKind::Fun);
        assert_eq!(info.shells[0].name, "add");
    }

    #[test]
    fn captures_macro_params_and_body_as_token_spans() {
        let (tokens, source) = tokens_for("macro double(x) { x + x } fun main(): i32 { }");
        let (info, errors) = prepare(&tokens, &source);
        assert!(errors.is_empty());
        assert_eq!(info.private_macros.len(), 1);
        assert_eq!(info.private_macros[0].name, "double");
        assert_eq!(info.private_macros[0].params.len(), 1);
        assert!(!info.private_macros[0].body.is_empty());
    }

    #[test]
    fn reports_malformed_top_level_and_recovers() {
        let (tokens, source) = tokens_for("123 fun valid(): i32 { }");
        let (info, errors) = prepare(&tokens, &source);
        assert_eq!(errors.len(), 1);
        assert_eq!(info.shells.len(), 1);
    }

    #[test]
    fn reports_unbalanced_delimiters() {
        let (tokens, source) = tokens_for("fun broken(): i32 { var x = 1;");
        let (_info, errors) = prepare(&tokens, &source);
        assert_eq!(errors.len(), 1);
    }
}
