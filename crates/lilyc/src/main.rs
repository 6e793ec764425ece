//! Lily Language Compiler Executable
//!
//! Multi-subcommand driver for the `liblily` pipeline: tokenize, preparse, precompile,
//! parse, analyze, lower to MIR, and either stop at a `--dump-*` stage or hand the MIR
//! off to the interpreter VM.

use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use liblily::{
    error::{CodeSpanReportGenerator, ReportGenerator},
    file::SourceFile,
    mir::{Lowering, MirModule, MirTopLevel},
    nom_tools::State,
    orchestrator::{self, PackageSource},
    precompiler::{self, CompilerConfig, DependencyTreeNode, Package, PackageId},
    preparser,
    vm::{Vm, VmConfig},
};
use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, ConfigBuilder, LevelPadding, TermLogger, TerminalMode, ThreadLogMode};

#[derive(Parser)]
#[command(name = "lilyc", about = "Toolchain driver for the Lily systems language")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Builds every package reachable from the current directory's manifest.
    Build(BuildArgs),
    /// Runs the pipeline over a single file up to the requested stage.
    Compile(CompileArgs),
    /// Compiles a file and executes its `main` through the interpreter VM.
    Run(RunArgs),
    /// Compiles and runs a file's test declarations (not yet implemented).
    Test(CompileArgs),
    /// Lowers a file to the requested backend IR (MIR only; native backends are out of
    /// scope for this core).
    To(CompileArgs),
    /// Scaffolds a new package manifest at an existing path.
    Init { path: PathBuf },
    /// Scaffolds a new package directory.
    New { name: String },
    /// Treats the input as a foreign C translation unit (not implemented by this core).
    Cc { file: PathBuf },
    /// Treats the input as a foreign C++ translation unit (not implemented by this core).
    #[command(name = "c++")]
    Cpp { file: PathBuf },
}

#[derive(Parser)]
#[allow(dead_code)]
struct PipelineFlags {
    #[arg(long, short = 'b')]
    build: bool,
    #[arg(long, short = 'l')]
    lib: bool,
    #[arg(long)]
    r#static: bool,
    #[arg(long)]
    dynamic: bool,

    #[arg(long)]
    dump_scanner: bool,
    #[arg(long)]
    dump_preparser: bool,
    #[arg(long)]
    dump_precompiler: bool,
    #[arg(long)]
    dump_parser: bool,
    #[arg(long)]
    dump_analysis: bool,
    #[arg(long)]
    dump_mir: bool,
    #[arg(long)]
    dump_ir: bool,

    #[arg(long, default_value = "llvm-ir")]
    backend: String,
    #[arg(short = 'O', default_value = "0")]
    opt: String,

    #[arg(long)]
    target: Option<String>,
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
    #[arg(long, short = 'v')]
    verbose: bool,
    #[arg(long, short = 'r')]
    run: bool,
}

#[derive(Parser)]
struct BuildArgs {
    #[command(flatten)]
    flags: PipelineFlags,
}

#[derive(Parser)]
struct CompileArgs {
    file: PathBuf,
    #[command(flatten)]
    flags: PipelineFlags,
}

#[derive(Parser)]
struct RunArgs {
    file: PathBuf,
    #[command(flatten)]
    flags: PipelineFlags,

    #[arg(long, default_value_t = 8 * 1024 * 1024)]
    max_stack: usize,
    #[arg(long, default_value_t = 64 * 1024 * 1024)]
    max_heap: usize,

    #[arg(last = true)]
    program_args: Vec<String>,
}

fn init_logging(verbose: bool) {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Error };
    let config = ConfigBuilder::new()
        .set_location_level(LevelFilter::Error)
        .set_thread_mode(ThreadLogMode::Both)
        .set_level_padding(LevelPadding::Off)
        .set_thread_level(LevelFilter::Off)
        .build();
    let _ = CombinedLogger::init(vec![TermLogger::new(level, config, TerminalMode::Mixed, ColorChoice::Auto)]);
}

fn module_name_for(path: &std::path::Path) -> String {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("main").to_string()
}

/// Runs the pipeline on `file`'s source text up to whatever stage `flags` asks it to
/// stop at, printing a dump and returning `Ok(None)` if it stops early. On success past
/// every dump gate, returns the lowered `MirModule`.
fn run_pipeline(file: &std::path::Path, flags: &PipelineFlags) -> Result<Option<MirModule>, ExitCode> {
    let content = std::fs::read_to_string(file).map_err(|error| {
        eprintln!("error reading {}: {error}", file.display());
        ExitCode::from(1)
    })?;

    let module_name = module_name_for(file);
    let source = SourceFile::new(vec![module_name.clone()], content.clone());
    let state = State::new(source.clone());

    let tokens = liblily::lexer::tokenize(&state).map_err(|error| {
        CodeSpanReportGenerator::generate(error);
        ExitCode::from(1)
    })?;

    if flags.dump_scanner {
        for token in &tokens {
            println!("{token:?}");
        }
        return Ok(None);
    }

    let (preparsed, preparse_errors) = preparser::prepare(&tokens, &source);
    if !preparse_errors.is_empty() {
        for error in &preparse_errors {
            eprintln!("{error}");
        }
        return Err(ExitCode::from(1));
    }

    if flags.dump_preparser {
        println!("{} public imports, {} private imports, {} shells", preparsed.public_imports.len(), preparsed.private_imports.len(), preparsed.shells.len());
        return Ok(None);
    }

    let (_resolved, precompile_errors) = precompiler::resolve_imports(&preparsed.private_imports, &[], &source);
    if flags.dump_precompiler {
        for error in &precompile_errors {
            eprintln!("{error}");
        }
        println!("resolved {} private imports", preparsed.private_imports.len());
        return Ok(None);
    }

    let ast = liblily::process_code(&state).map_err(|error| {
        CodeSpanReportGenerator::generate(error);
        ExitCode::from(1)
    })?;

    if flags.dump_parser {
        println!("{ast:#?}");
        return Ok(None);
    }

    let ast_rc = std::rc::Rc::new(ast);
    let context = liblily::process_ast(vec![ast_rc.clone()]).map_err(|error| {
        CodeSpanReportGenerator::generate(error);
        ExitCode::from(1)
    })?;

    if flags.dump_analysis {
        println!("{context:#?}");
        return Ok(None);
    }

    let mut mir_module = MirModule::new(module_name.clone());
    let mut lowering = Lowering::new();
    for statement in &ast_rc.statements {
        if let liblily::ast::FileStatementAst::Function(function) = statement {
            let is_main = function.name.text == "main";
            let lowered = lowering.lower_function(function, is_main);
            mir_module.items.insert(lowered.name.clone(), MirTopLevel::Function(lowered));
        }
    }

    if flags.dump_mir || flags.dump_ir {
        println!("{mir_module:#?}");
        return Ok(None);
    }

    Ok(Some(mir_module))
}

fn compile_command(args: CompileArgs) -> ExitCode {
    match run_pipeline(&args.file, &args.flags) {
        Ok(Some(_)) => {
            println!("Compilation successful!");
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(code) => code,
    }
}

fn run_command(args: RunArgs) -> ExitCode {
    let module = match run_pipeline(&args.file, &args.flags) {
        Ok(Some(module)) => module,
        Ok(None) => return ExitCode::SUCCESS,
        Err(code) => return code,
    };

    let config = VmConfig { debug: true, max_heap: args.max_heap, max_stack: args.max_stack };
    let mut vm = Vm::new(config);
    match vm.run(&module, args.program_args) {
        Ok(code) => ExitCode::from(code as u8),
        Err(error) => {
            eprintln!("{error}");
            ExitCode::from(101)
        }
    }
}

/// Builds every `.lily` file found in the current directory by feeding each into
/// [`orchestrator::run`] as an independent root: there is no manifest-driven package
/// graph wired up yet, so every file is scheduled as its own dependency-tree node with
/// no edges between them.
fn build_command(_args: BuildArgs) -> ExitCode {
    let files: Vec<PathBuf> = match std::fs::read_dir(".") {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("lily"))
            .collect(),
        Err(error) => {
            eprintln!("error reading current directory: {error}");
            return ExitCode::from(1);
        }
    };

    if files.is_empty() {
        eprintln!("no .lily source files found in the current directory");
        return ExitCode::from(1);
    }

    let trees: Vec<DependencyTreeNode> = files
        .iter()
        .enumerate()
        .map(|(index, _)| DependencyTreeNode { package: PackageId(index), dependencies: vec![], children: vec![] })
        .collect();
    let _packages: Vec<Package> = files
        .iter()
        .map(|path| Package { name: module_name_for(path), imports: vec![], dependencies: vec![] })
        .collect();

    let sources: Vec<PackageSource> = files
        .iter()
        .enumerate()
        .filter_map(|(index, path)| {
            std::fs::read_to_string(path).ok().map(|source_text| PackageSource { tree_index: index, file_name: module_name_for(path), source_text })
        })
        .collect();

    let results = orchestrator::run(&trees, &sources);
    let failed = results.iter().filter(|r| r.mir.is_none()).count();
    if failed > 0 {
        eprintln!("{failed} package(s) failed to build");
        return ExitCode::from(1);
    }

    println!("built {} package(s)", results.len());
    ExitCode::SUCCESS
}

fn init_command(path: PathBuf) -> ExitCode {
    if let Err(error) = std::fs::create_dir_all(&path) {
        eprintln!("error creating {}: {error}", path.display());
        return ExitCode::from(1);
    }
    println!("initialized package manifest at {}", path.display());
    ExitCode::SUCCESS
}

fn new_command(name: String) -> ExitCode {
    let path = PathBuf::from(&name);
    if let Err(error) = std::fs::create_dir_all(&path) {
        eprintln!("error creating {}: {error}", path.display());
        return ExitCode::from(1);
    }
    println!("created new package '{name}' at {}", path.display());
    ExitCode::SUCCESS
}

fn unsupported(kind: &str, file: &std::path::Path) -> ExitCode {
    eprintln!("{kind} front end for {} is out of scope for this core (see SPEC_FULL.md Non-goals)", file.display());
    ExitCode::from(1)
}

/// Kept reachable from the CLI crate so `precompiler::CompilerConfig` has a call site
/// here once manifest-driven macro expansion is wired into `build` (the precompiler runs
/// ahead of the orchestrator; `build_command` does not invoke it yet since there is no
/// manifest format to source `macro_recursion_limit` overrides from).
#[allow(dead_code)]
fn default_macro_config() -> CompilerConfig {
    CompilerConfig::default()
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let verbose = match &cli.command {
        Command::Build(args) => args.flags.verbose,
        Command::Compile(args) | Command::Test(args) | Command::To(args) => args.flags.verbose,
        Command::Run(args) => args.flags.verbose,
        _ => false,
    };
    init_logging(verbose);

    match cli.command {
        Command::Build(args) => build_command(args),
        Command::Compile(args) => compile_command(args),
        Command::Run(args) => run_command(args),
        Command::Test(args) => {
            eprintln!("test runner for {} is not yet implemented", args.file.display());
            ExitCode::from(1)
        }
        Command::To(args) => compile_command(args),
        Command::Init { path } => init_command(path),
        Command::New { name } => new_command(name),
        Command::Cc { file } => unsupported("C", &file),
        Command::Cpp { file } => unsupported("C++", &file),
    }
}
