//! Import resolution, macro expansion and package dependency tracking.
//!
//! The precompiler sits between the preparser and the parser: it turns each
//! [`crate::preparser::Import`] into a resolved [`ImportValue`] path, expands macro
//! invocations inside a shell's token span, and folds every package it touches into a
//! dependency DAG (`DependencyTreeNode`) the [`crate::orchestrator`] later schedules
//! over.

use std::{collections::HashMap, ops::Range};

use indexmap::IndexMap;
use liblily_macros::LilyError;
use liblily_macros_core::SourceCode;

use crate::{
    file::SourceFile,
    lexer::{Punctuation, Token, TokenKind},
    preparser::{Import, ImportSegment, MacroDef, TokenSpan},
};

/// A single segment of a resolved import path, one variant per root an import can walk
/// from. `Select`/`SelectAll` unfold during resolution rather than staying nested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportValue {
    Access(String),
    File(String),
    Library(String),
    Package(String),
    SelectAll,
    Select(Vec<Vec<ImportValue>>),
    Std,
    Core,
    Sys,
    Builtin,
    Url,
}

impl ImportValue {
    /// Classifies a single leading path segment into its root-variant kind. Matches
    /// `original_source`'s `LilyImportValueKind` roots (`std`/`core`/`sys`/`builtin`
    /// are reserved identifiers recognized before falling back to a plain namespace
    /// access).
    fn classify_root(name: &str) -> ImportValue {
        match name {
            "std" => ImportValue::Std,
            "core" => ImportValue::Core,
            "sys" => ImportValue::Sys,
            "builtin" => ImportValue::Builtin,
            _ => ImportValue::Access(name.to_string()),
        }
    }
}

fn resolve_segments(segments: &[ImportSegment<'_>]) -> Vec<ImportValue> {
    segments
        .iter()
        .map(|segment| match segment {
            ImportSegment::Access(name) => ImportValue::classify_root(name),
            ImportSegment::Select(groups) => {
                let resolved = groups.iter().map(|group| resolve_segments(group)).collect();
                ImportValue::Select(resolved)
            }
        })
        .collect()
}

/// A resolved import, still carrying the alias and source span for diagnostics.
#[derive(Debug, Clone)]
pub struct ResolvedImport {
    pub path: Vec<ImportValue>,
    pub alias: Option<String>,
}

/// Uniquely identifies a package within a [`Program`](crate::precompiler)'s dependency
/// tree. Index-only, never an ownership handle — mirrors the `TypeLocation`/
/// `ScopeLocation` newtype-index idiom used throughout `tir`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackageId(pub usize);

/// A resolved package: its fully-qualified name, the imports it resolved, and its
/// position in the dependency tree once [`build_dependency_tree`] runs.
#[derive(Debug, Clone)]
pub struct Package {
    pub name: String,
    pub imports: Vec<ResolvedImport>,
    pub dependencies: Vec<PackageId>,
}

/// One node of the package dependency DAG. `done` is a plain `Cell<bool>` here: the
/// per-node `Mutex<bool>`/`Condvar` pair the orchestrator actually synchronizes on
/// lives on [`crate::orchestrator::SchedulerNode`], which wraps this node once threads
/// enter the picture. This type only models the DAG's *shape* the way
/// `dependency_tree.c` builds it.
#[derive(Debug, Clone)]
pub struct DependencyTreeNode {
    pub package: PackageId,
    pub dependencies: Vec<usize>,
    pub children: Vec<usize>,
}

#[derive(Clone, Debug, LilyError, thiserror::Error)]
#[error("import '{path}' not found")]
#[diagnostic(code("lily::error::precompiler_import_not_found"), help("check the package name or add the dependency"))]
pub struct ImportNotFound {
    pub path: String,

    #[label("no package resolves this import")]
    pub position: Range<usize>,

    #[source_code]
    pub code: SourceCode,
}

#[derive(Clone, Debug, LilyError, thiserror::Error)]
#[error("macro recursion limit exceeded while expanding '{macro_name}'")]
#[diagnostic(code("lily::error::precompiler_macro_recursion_limit"), help("check for a macro that expands into an invocation of itself"))]
pub struct MacroRecursionLimit {
    pub macro_name: String,

    #[label("expansion did not terminate within the configured limit")]
    pub position: Range<usize>,

    #[source_code]
    pub code: SourceCode,
}

#[derive(Clone, Debug, LilyError, thiserror::Error)]
#[error("package '{name}' depends on itself transitively")]
#[diagnostic(code("lily::error::precompiler_cyclic_package_dependency"), help("break the cycle by removing one of the package imports"))]
pub struct CyclicPackageDependency {
    pub name: String,

    #[label("this import closes a dependency cycle")]
    pub position: Range<usize>,

    #[source_code]
    pub code: SourceCode,
}

#[derive(Clone, Debug, thiserror::Error)]
pub enum PrecompilerError {
    #[error(transparent)]
    ImportNotFound(#[from] ImportNotFound),

    #[error(transparent)]
    MacroRecursionLimit(#[from] MacroRecursionLimit),

    #[error(transparent)]
    CyclicPackageDependency(#[from] CyclicPackageDependency),
}

/// Bounds recursive macro expansion so a macro expanding into itself can't spin the
/// precompiler forever.
#[derive(Debug, Clone, Copy)]
pub struct CompilerConfig {
    pub macro_recursion_limit: u32,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self { macro_recursion_limit: 128 }
    }
}

/// Resolves every import in `public_imports`/`private_imports` against `known_packages`
/// (by fully-qualified name). Returns one [`ResolvedImport`] per input, in order;
/// unresolvable plain-access imports (no `std`/`core`/`sys`/`builtin` root and no match
/// in `known_packages`) are reported as `PrecompilerError::ImportNotFound`.
pub fn resolve_imports(imports: &[Import<'_>], known_packages: &[&str], source: &SourceFile) -> (Vec<ResolvedImport>, Vec<PrecompilerError>) {
    let mut resolved = Vec::with_capacity(imports.len());
    let mut errors = Vec::new();

    for import in imports {
        let path = resolve_segments(&import.path);

        if let Some(ImportValue::Access(root)) = path.first() {
            if !known_packages.contains(&root.as_str()) {
                errors.push(PrecompilerError::ImportNotFound(ImportNotFound {
                    path: root.clone(),
                    position: span_position(import.span),
                    code: source.into(),
                }));
            }
        }

        resolved.push(ResolvedImport { path, alias: import.alias.map(|a| a.to_string()) });
    }

    (resolved, errors)
}

fn span_position(span: TokenSpan<'_>) -> Range<usize> {
    match (span.first(), span.last()) {
        (Some(first), Some(last)) => first.span.position.start..last.span.position.end,
        _ => 0..0,
    }
}

/// Expands macro invocations (a bare identifier matching a known macro's name,
/// immediately followed by a parenthesized, comma-separated argument list) inside
/// `body`, substituting each macro parameter's name with its matching argument's
/// tokens. Purely textual at the token level: no hygiene, matching
/// `original_source`'s own substitution model.
pub fn expand_macros<'base>(
    body: TokenSpan<'base>,
    macros: &IndexMap<&'base str, &'base MacroDef<'base>>,
    config: CompilerConfig,
    source: &SourceFile,
) -> Result<Vec<Token<'base>>, PrecompilerError> {
    expand_with_depth(body, macros, config, 0, source)
}

fn expand_with_depth<'base>(
    body: TokenSpan<'base>,
    macros: &IndexMap<&'base str, &'base MacroDef<'base>>,
    config: CompilerConfig,
    depth: u32,
    source: &SourceFile,
) -> Result<Vec<Token<'base>>, PrecompilerError> {
    let mut output = Vec::with_capacity(body.len());
    let mut index = 0;

    while index < body.len() {
        let token = &body[index];

        let invocation = if token.kind == TokenKind::Identifier {
            macros.get(token.lexeme()).filter(|_| {
                body.get(index + 1).map(|next| next.kind == TokenKind::Punctuation(Punctuation::LParen)).unwrap_or(false)
            })
        } else {
            None
        };

        match invocation {
            Some(macro_def) => {
                if depth >= config.macro_recursion_limit {
                    return Err(PrecompilerError::MacroRecursionLimit(MacroRecursionLimit {
                        macro_name: macro_def.name.to_string(),
                        position: token.span.position.clone(),
                        code: source.into(),
                    }));
                }

                let (close, args) = split_call_arguments(body, index + 1);
                let bindings = bind_arguments(macro_def, &args);
                let substituted = substitute(macro_def.body, &bindings);
                let expanded = expand_with_depth(&substituted, macros, config, depth + 1, source)?;
                output.extend(expanded);
                index = close;
            }
            None => {
                output.push(token.clone());
                index += 1;
            }
        }
    }

    Ok(output)
}

/// Given the index of the `(` opening a macro call's argument list, returns the index
/// one past the matching `)` plus each top-level-comma-separated argument's tokens.
fn split_call_arguments<'base>(tokens: TokenSpan<'base>, open_at: usize) -> (usize, Vec<&'base [Token<'base>]>) {
    let mut depth = 0i32;
    let mut end = open_at;
    for (offset, token) in tokens[open_at..].iter().enumerate() {
        match &token.kind {
            TokenKind::Punctuation(Punctuation::LParen) => depth += 1,
            TokenKind::Punctuation(Punctuation::RParen) => {
                depth -= 1;
                if depth == 0 {
                    end = open_at + offset;
                    break;
                }
            }
            _ => {}
        }
    }

    let inner = &tokens[open_at + 1..end];
    let mut groups = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, token) in inner.iter().enumerate() {
        match &token.kind {
            TokenKind::Punctuation(Punctuation::LParen) => depth += 1,
            TokenKind::Punctuation(Punctuation::RParen) => depth -= 1,
            TokenKind::Punctuation(Punctuation::Comma) if depth == 0 => {
                groups.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < inner.len() {
        groups.push(&inner[start..]);
    }

    (end + 1, groups)
}

fn bind_arguments<'base>(macro_def: &MacroDef<'base>, args: &[&'base [Token<'base>]]) -> HashMap<&'base str, &'base [Token<'base>]> {
    let mut bindings = HashMap::new();
    for (param, arg) in macro_def.params.iter().zip(args.iter()) {
        bindings.insert(param.lexeme(), *arg);
    }
    bindings
}

fn substitute<'base>(body: TokenSpan<'base>, bindings: &HashMap<&'base str, &'base [Token<'base>]>) -> Vec<Token<'base>> {
    let mut output = Vec::with_capacity(body.len());
    for token in body {
        if token.kind == TokenKind::Identifier {
            if let Some(replacement) = bindings.get(token.lexeme()) {
                output.extend((*replacement).iter().cloned());
                continue;
            }
        }
        output.push(token.clone());
    }
    output
}

/// Locates the dependency-tree node owning any existing dependency of `pkg`, exactly
/// following `is_added__LilyPackageDependencyTree`/
/// `determine_tree__LilyPackageDependencyTree`'s walk-then-recurse-into-children shape.
pub fn determine_tree(trees: &[DependencyTreeNode], pkg_dependencies: &[PackageId]) -> Option<usize> {
    fn search(trees: &[DependencyTreeNode], node_index: usize, pkg_dependencies: &[PackageId]) -> Option<usize> {
        let node = &trees[node_index];
        if pkg_dependencies.contains(&node.package) {
            return Some(node_index);
        }
        for &child in &node.children {
            if let Some(found) = search(trees, child, pkg_dependencies) {
                return Some(found);
            }
        }
        None
    }

    (0..trees.len()).find_map(|index| search(trees, index, pkg_dependencies))
}

/// Adds `pkg` to `trees` if not already present: recursively ensures every dependency
/// already has a tree node (building any missing ancestor first, per the original's
/// `add_dependency:` loop, expressed here as an explicit `loop {}` rather than a
/// `goto`), then attaches a new child node under the tree owning an existing
/// dependency, or starts a new root tree if none exists.
pub fn add_package(trees: &mut Vec<DependencyTreeNode>, packages: &[Package], package_id: PackageId) -> Result<usize, CyclicPackageDependency> {
    add_package_checking(trees, packages, package_id, &mut vec![])
}

/// `in_progress` tracks packages whose `add_package` call is still on the stack, so a
/// dependency that loops back to one of them is a cycle, not a diamond (shared
/// dependencies reached through two different paths are fine and only built once).
fn add_package_checking(
    trees: &mut Vec<DependencyTreeNode>,
    packages: &[Package],
    package_id: PackageId,
    in_progress: &mut Vec<PackageId>,
) -> Result<usize, CyclicPackageDependency> {
    if let Some(existing) = trees.iter().position(|node| node.package == package_id) {
        return Ok(existing);
    }

    if in_progress.contains(&package_id) {
        return Err(CyclicPackageDependency {
            name: packages[package_id.0].name.clone(),
            position: 0..0,
            code: SourceFile::new(vec![], String::new()).into(),
        });
    }

    let pkg = &packages[package_id.0];
    in_progress.push(package_id);

    let mut dependency_node_indices = Vec::new();
    let mut pending: Vec<PackageId> = pkg.dependencies.clone();
    loop {
        let Some(dep_id) = pending.pop() else { break };
        let dep_index = add_package_checking(trees, packages, dep_id, in_progress)?;
        dependency_node_indices.push(dep_index);
    }

    in_progress.pop();

    let node_index = trees.len();
    trees.push(DependencyTreeNode {
        package: package_id,
        dependencies: dependency_node_indices.clone(),
        children: Vec::new(),
    });

    match determine_tree(trees, &dependency_node_indices.iter().map(|&i| trees[i].package).collect::<Vec<_>>()) {
        Some(owner) if owner != node_index => trees[owner].children.push(node_index),
        _ => {}
    }

    Ok(node_index)
}
