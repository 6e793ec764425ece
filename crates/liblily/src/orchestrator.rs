//! Build orchestration: schedules per-package compilation over the dependency DAG
//! built by [`crate::precompiler`], one OS thread per tree node.
//!
//! The teacher crate has no concurrency of its own to generalize from, so the
//! threading model here is built from scratch against spec §4.7/§5: each node waits
//! on its own `(Mutex<bool>, Condvar)` pair for its dependencies, runs its package's
//! parse → analysis → MIR generation, then spawns one thread per child and joins them.

use std::{
    rc::Rc,
    sync::{Arc, Condvar, Mutex, OnceLock},
    thread,
};

use crate::{ast::FileAst, mir::{Lowering, MirModule, MirTopLevel}, precompiler::DependencyTreeNode, tir, tir::TirError};

/// Per-node synchronization primitives, independent of every other node's: contention
/// only happens at a shared ancestor, never process-wide.
pub struct SchedulerNode {
    pub tree_index: usize,
    pub children: Vec<usize>,
    pub dependencies: Vec<usize>,
    pub done: Arc<(Mutex<bool>, Condvar)>,
    pub sticky_error: Arc<OnceLock<String>>,
}

impl SchedulerNode {
    fn from_tree(trees: &[DependencyTreeNode]) -> Vec<Arc<SchedulerNode>> {
        trees
            .iter()
            .enumerate()
            .map(|(index, node)| {
                Arc::new(SchedulerNode {
                    tree_index: index,
                    children: node.children.clone(),
                    dependencies: node.dependencies.clone(),
                    done: Arc::new((Mutex::new(false), Condvar::new())),
                    sticky_error: Arc::new(OnceLock::new()),
                })
            })
            .collect()
    }
}

/// One package's compilation result, recorded once its node's `done` flag flips.
pub struct PackageBuildResult {
    pub tree_index: usize,
    pub mir: Option<MirModule>,
}

/// Blocks until every dependency of `node` has `done == true`, polling each
/// dependency's own mutex with a short-held lock per check (no process-wide lock).
/// Returns early if any dependency (transitively) recorded a sticky error.
fn wait_for_dependencies(node: &SchedulerNode, nodes: &[Arc<SchedulerNode>]) -> Result<(), String> {
    for &dep_index in &node.dependencies {
        let dep = &nodes[dep_index];
        if let Some(error) = dep.sticky_error.get() {
            return Err(error.clone());
        }

        let (lock, condvar) = &*dep.done;
        let mut done = lock.lock().unwrap();
        while !*done {
            done = condvar.wait(done).unwrap();
        }
        if let Some(error) = dep.sticky_error.get() {
            return Err(error.clone());
        }
    }
    Ok(())
}

fn mark_done(node: &SchedulerNode) {
    let (lock, condvar) = &*node.done;
    let mut done = lock.lock().unwrap();
    *done = true;
    condvar.notify_all();
}

/// Runs parser → analysis → MIR generation for one package's already-tokenized file.
/// `Rc<FileAst>` is not `Send`, so this module never ships a parsed AST across a
/// thread boundary: each spawned thread reparses its own package's source text, which
/// also matches §5's "lexer/preparser/precompiler/parser/analysis/MIR run to
/// completion without yielding" ordering within a single thread.
fn build_package(source_text: &str, file_name: &str) -> Result<MirModule, TirError> {
    let state = crate::nom_tools::State::new(crate::file::SourceFile::new(vec![file_name.to_string()], source_text.to_string()));
    let ast: FileAst<'_> = crate::process_code(&state)?;
    let ast_rc: Rc<FileAst<'_>> = Rc::new(ast);
    let context = tir::build(vec![ast_rc.clone()])?;
    let _ = &context;

    let mut module = MirModule::new(file_name);
    let mut lowering = Lowering::new();
    for statement in &ast_rc.statements {
        if let crate::ast::FileStatementAst::Function(function) = statement {
            let is_main = function.name.text == "main";
            let lowered = lowering.lower_function(function, is_main);
            module.items.insert(lowered.name.clone(), MirTopLevel::Function(lowered));
        }
    }

    Ok(module)
}

/// One root-or-child package's source, keyed by its dependency-tree index.
pub struct PackageSource {
    pub tree_index: usize,
    pub file_name: String,
    pub source_text: String,
}

/// Schedules the whole dependency DAG: one `std::thread` per root, fanning out one
/// thread per child as each node's own dependencies become available. Returns one
/// [`PackageBuildResult`] per node, in tree-index order. A fatal error in one package
/// is recorded sticky on its node; downstream nodes observe it during their
/// dependency poll and exit without starting work.
pub fn run(trees: &[DependencyTreeNode], sources: &[PackageSource]) -> Vec<PackageBuildResult> {
    let nodes = SchedulerNode::from_tree(trees);
    let roots: Vec<usize> = (0..trees.len()).filter(|&i| trees[i].dependencies.is_empty()).collect();

    let results: Arc<Mutex<Vec<PackageBuildResult>>> = Arc::new(Mutex::new(Vec::new()));

    let handles: Vec<_> = roots
        .into_iter()
        .map(|root| spawn_subtree(root, nodes.clone(), owned_sources(sources), results.clone()))
        .collect();

    for handle in handles {
        let _ = handle.join();
    }

    let mut out = Arc::try_unwrap(results).map(|m| m.into_inner().unwrap()).unwrap_or_default();
    out.sort_by_key(|r| r.tree_index);
    out
}

fn owned_sources(sources: &[PackageSource]) -> Arc<Vec<PackageSource>> {
    Arc::new(
        sources
            .iter()
            .map(|s| PackageSource { tree_index: s.tree_index, file_name: s.file_name.clone(), source_text: s.source_text.clone() })
            .collect(),
    )
}

fn spawn_subtree(
    tree_index: usize,
    nodes: Vec<Arc<SchedulerNode>>,
    sources: Arc<Vec<PackageSource>>,
    results: Arc<Mutex<Vec<PackageBuildResult>>>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let node = nodes[tree_index].clone();

        if wait_for_dependencies(&node, &nodes).is_err() {
            mark_done(&node);
            return;
        }

        let source = sources.iter().find(|s| s.tree_index == tree_index);
        let build_result = match source {
            Some(source) => build_package(&source.source_text, &source.file_name),
            None => Err(TirError::TemporaryError),
        };

        let mir = match build_result {
            Ok(mir) => Some(mir),
            Err(error) => {
                let _ = node.sticky_error.set(error.to_string());
                None
            }
        };

        results.lock().unwrap().push(PackageBuildResult { tree_index, mir });
        mark_done(&node);

        let children = node.children.clone();
        let child_handles: Vec<_> = children
            .into_iter()
            .map(|child| spawn_subtree(child, nodes.clone(), sources.clone(), results.clone()))
            .collect();
        for handle in child_handles {
            let _ = handle.join();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::precompiler::PackageId;

    #[test]
    fn schedules_independent_roots_and_records_results() {
        let trees = vec![
            DependencyTreeNode { package: PackageId(0), dependencies: vec![], children: vec![] },
            DependencyTreeNode { package: PackageId(1), dependencies: vec![], children: vec![] },
        ];
        let sources = vec![
            PackageSource { tree_index: 0, file_name: "a".into(), source_text: "fun main(): i32 { }".into() },
            PackageSource { tree_index: 1, file_name: "b".into(), source_text: "fun main(): i32 { }".into() },
        ];

        let results = run(&trees, &sources);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.mir.is_some()));
    }

    #[test]
    fn child_waits_for_parent_before_building() {
        let trees = vec![
            DependencyTreeNode { package: PackageId(0), dependencies: vec![], children: vec![1] },
            DependencyTreeNode { package: PackageId(1), dependencies: vec![0], children: vec![] },
        ];
        let sources = vec![
            PackageSource { tree_index: 0, file_name: "root".into(), source_text: "fun main(): i32 { }".into() },
            PackageSource { tree_index: 1, file_name: "child".into(), source_text: "fun main(): i32 { }".into() },
        ];

        let results = run(&trees, &sources);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.mir.is_some()));
    }
}
