//! Command-line driver for stubgen.
//!
//! Loads a class graph snapshot, runs the generator compiler over it and
//! writes one RBI file per generated class.
//!
//! # Modes
//!
//! - default: write stubs under `--out`
//! - `--print`: render everything to stdout (`--format json` dumps the tree)
//! - `--verify`: compare the stubs with the files already on disk and exit
//!   non-zero if any are missing, out of date or no longer generated
//!
//! `--out` is owned by stubgen: writing removes `.rbi` files there that the
//! run no longer produces.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use stubgen_compiler::render::{render_class, render_tree};
use stubgen_compiler::{GeneratorCompiler, GeneratorConfig, Pipeline, Report, StubTree};
use walkdir::WalkDir;

/// CLI arguments for stubgen
#[derive(Parser, Debug)]
#[command(name = "stubgen")]
#[command(about = "Generate RBI stubs for generator arguments and options")]
struct Args {
    /// Class graph snapshot (JSON) to read
    #[arg(short, long)]
    snapshot: PathBuf,

    /// Directory stub files are written to
    #[arg(short, long, default_value = "sorbet/rbi/dsl")]
    out: PathBuf,

    /// Generator configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Qualified name of the root generator type
    #[arg(long)]
    root: Option<String>,

    /// Built-in namespace pattern; repeat to give several.
    /// Replaces the configured patterns.
    #[arg(long = "builtin-pattern")]
    builtin_patterns: Vec<String>,

    /// Print stubs to stdout instead of writing files
    #[arg(long)]
    print: bool,

    /// Fail if the stubs on disk are missing or out of date
    #[arg(long, conflicts_with = "print")]
    verify: bool,

    /// Output format for --print
    #[arg(long, value_enum, default_value_t = Format::Rbi)]
    format: Format,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Rbi,
    Json,
}

/// Build the generator configuration from the config file and flags.
fn resolve_config(args: &Args) -> Result<GeneratorConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str(&json)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        }
        None => GeneratorConfig::default(),
    };

    if let Some(root) = &args.root {
        config.root = root.clone();
    }
    if !args.builtin_patterns.is_empty() {
        config.builtin_patterns = args.builtin_patterns.clone();
    }

    Ok(config)
}

/// Write one file per class. Returns the paths written.
fn write_stubs(tree: &StubTree, out: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(tree.len());
    let mut owners: HashMap<PathBuf, &str> = HashMap::new();

    for class in tree.classes() {
        let path = out.join(stubgen_types::stub_path(class.name()));
        if let Some(previous) = owners.insert(path.clone(), class.name()) {
            log::warn!(
                "{} and {} both map to {}; keeping the stub for {}",
                previous,
                class.name(),
                path.display(),
                class.name()
            );
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, render_class(class))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::debug!("Wrote {}", path.display());
        written.push(path);
    }

    Ok(written)
}

/// Every `.rbi` file currently under `out`, sorted.
fn existing_stubs(out: &Path) -> Result<Vec<PathBuf>> {
    if !out.exists() {
        return Ok(Vec::new());
    }

    let mut stubs = Vec::new();
    for entry in WalkDir::new(out) {
        let entry = entry.with_context(|| format!("Failed to scan {}", out.display()))?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "rbi") {
            stubs.push(path.to_path_buf());
        }
    }
    stubs.sort();

    Ok(stubs)
}

/// Paths under `out` this run accounts for.
///
/// Classes that failed keep their old file: the run cannot tell what their
/// stub should be.
fn owned_stubs(tree: &StubTree, report: &Report, out: &Path) -> HashSet<PathBuf> {
    tree.classes()
        .map(|class| class.name())
        .chain(report.failures.iter().map(|failure| failure.class.as_str()))
        .map(|name| out.join(stubgen_types::stub_path(name)))
        .collect()
}

/// Stub files under `out` that no class of this run produces.
fn orphaned_stubs(out: &Path, owned: &HashSet<PathBuf>) -> Result<Vec<PathBuf>> {
    Ok(existing_stubs(out)?
        .into_iter()
        .filter(|path| !owned.contains(path))
        .collect())
}

/// Delete orphaned stub files. Returns the paths removed.
fn remove_orphans(out: &Path, owned: &HashSet<PathBuf>) -> Result<Vec<PathBuf>> {
    let orphans = orphaned_stubs(out, owned)?;
    for path in &orphans {
        std::fs::remove_file(path)
            .with_context(|| format!("Failed to remove {}", path.display()))?;
        log::debug!("Removed {}", path.display());
    }

    Ok(orphans)
}

/// Paths whose content differs from what would be written.
fn stale_stubs(tree: &StubTree, out: &Path) -> Vec<PathBuf> {
    tree.classes()
        .filter_map(|class| {
            let path = out.join(stubgen_types::stub_path(class.name()));
            match std::fs::read_to_string(&path) {
                Ok(existing) if existing == render_class(class) => None,
                _ => Some(path),
            }
        })
        .collect()
}

fn generate(args: &Args) -> Result<(StubTree, Report)> {
    let config = resolve_config(args)?;
    let graph = stubgen_reflect::load_snapshot(&args.snapshot)
        .with_context(|| format!("Failed to load snapshot {}", args.snapshot.display()))?;
    let compiler = GeneratorCompiler::new(&graph, &config)?;

    let mut tree = StubTree::new();
    let report = Pipeline::new().with(compiler).run(&mut tree);
    tree.sort();

    Ok((tree, report))
}

/// Returns whether the run succeeded.
fn run(args: &Args) -> Result<bool> {
    let (tree, report) = generate(args)?;
    let mut ok = report.is_success();

    if args.print {
        match args.format {
            Format::Rbi => print!("{}", render_tree(&tree)),
            Format::Json => println!("{}", tree.to_json()?),
        }
    } else if args.verify {
        let stale = stale_stubs(&tree, &args.out);
        for path in &stale {
            eprintln!("[stubgen] Out of date: {}", path.display());
        }
        let orphans = orphaned_stubs(&args.out, &owned_stubs(&tree, &report, &args.out))?;
        for path in &orphans {
            eprintln!("[stubgen] No longer generated: {}", path.display());
        }
        ok &= stale.is_empty() && orphans.is_empty();
    } else {
        let written = write_stubs(&tree, &args.out)?;
        let removed = remove_orphans(&args.out, &owned_stubs(&tree, &report, &args.out))?;
        if args.verbose {
            eprintln!(
                "[stubgen] Wrote {} files and removed {} from {}",
                written.len(),
                removed.len(),
                args.out.display()
            );
        }
    }

    for failure in &report.failures {
        eprintln!(
            "[stubgen] {} failed for {}: {}",
            failure.compiler, failure.class, failure.error
        );
    }
    eprintln!(
        "[stubgen] {} candidates, {} stubs, {} unchanged, {} failed",
        report.candidates,
        report.emitted,
        report.skipped,
        report.failures.len()
    );

    Ok(ok)
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match run(&args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("[stubgen] Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "classes": [
            { "id": "Rails::Generators::Base", "name": "Rails::Generators::Base" },
            {
                "id": "Rails::Generators::NamedBase",
                "name": "Rails::Generators::NamedBase",
                "superclass": "Rails::Generators::Base",
                "arguments": [{ "name": "name", "type": "string", "required": true }]
            },
            {
                "id": "ServiceGenerator",
                "name": "ServiceGenerator",
                "superclass": "Rails::Generators::NamedBase",
                "arguments": [
                    { "name": "name", "type": "string", "required": true },
                    { "name": "result_type", "type": "string", "required": true }
                ],
                "options": [{ "name": "skip_comments", "type": "boolean", "default": false }]
            },
            {
                "id": "Admin::QuietGenerator",
                "name": "Admin::QuietGenerator",
                "superclass": "Rails::Generators::NamedBase",
                "arguments": [{ "name": "name", "type": "string", "required": true }]
            }
        ]
    }"#;

    fn args_for(dir: &Path, extra: &[&str]) -> Args {
        let snapshot = dir.join("snapshot.json");
        std::fs::write(&snapshot, SNAPSHOT).unwrap();
        let out = dir.join("rbi");

        let mut argv = vec![
            "stubgen".to_string(),
            "--snapshot".to_string(),
            snapshot.display().to_string(),
            "--out".to_string(),
            out.display().to_string(),
        ];
        argv.extend(extra.iter().map(|s| s.to_string()));
        Args::parse_from(argv)
    }

    #[test]
    fn test_write_then_verify() {
        let dir = tempfile::tempdir().unwrap();
        let args = args_for(dir.path(), &[]);

        assert!(run(&args).unwrap());
        let written = dir.path().join("rbi").join("service_generator.rbi");
        let contents = std::fs::read_to_string(&written).unwrap();
        assert!(contents.contains("sig { returns(::String) }\n  def result_type; end"));
        assert!(contents.contains("sig { returns(T::Boolean) }\n  def skip_comments; end"));
        assert!(!dir.path().join("rbi").join("admin").exists());

        let verify = args_for(dir.path(), &["--verify"]);
        assert!(run(&verify).unwrap());

        std::fs::write(&written, "# stale\n").unwrap();
        assert!(!run(&verify).unwrap());
    }

    #[test]
    fn test_files_no_longer_generated_are_drift() {
        let dir = tempfile::tempdir().unwrap();
        let args = args_for(dir.path(), &[]);
        let orphan = args.out.join("admin").join("quiet_generator.rbi");
        std::fs::create_dir_all(orphan.parent().unwrap()).unwrap();
        std::fs::write(&orphan, "# typed: strong\n").unwrap();
        let notes = args.out.join("README.md");
        std::fs::write(&notes, "kept\n").unwrap();

        let verify = args_for(dir.path(), &["--verify"]);
        let (tree, report) = generate(&verify).unwrap();
        let owned = owned_stubs(&tree, &report, &verify.out);
        assert_eq!(orphaned_stubs(&verify.out, &owned).unwrap(), vec![orphan.clone()]);

        assert!(run(&args).unwrap());
        assert!(!orphan.exists());
        assert!(notes.exists());
        assert!(run(&verify).unwrap());

        std::fs::write(&orphan, "# typed: strong\n").unwrap();
        assert!(!run(&verify).unwrap());
    }

    #[test]
    fn test_failed_classes_keep_their_files() {
        let dir = tempfile::tempdir().unwrap();
        let args = args_for(dir.path(), &["--builtin-pattern", "^Nothing::"]);
        let kept = args.out.join("service_generator.rbi");
        std::fs::create_dir_all(&args.out).unwrap();
        std::fs::write(&kept, "# typed: strong\n").unwrap();

        assert!(!run(&args).unwrap());
        assert!(kept.exists());
    }

    #[test]
    fn test_colliding_stub_paths_keep_the_last_class() {
        let dir = tempfile::tempdir().unwrap();
        let mut tree = StubTree::new();
        tree.create_path("HTTPClientGenerator").append_accessor(
            "host",
            stubgen_types::TypeDescriptor::new(stubgen_types::BaseType::String),
        );
        tree.create_path("HttpClientGenerator").append_accessor(
            "port",
            stubgen_types::TypeDescriptor::new(stubgen_types::BaseType::Numeric),
        );

        let written = write_stubs(&tree, dir.path()).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0], written[1]);

        let contents = std::fs::read_to_string(&written[0]).unwrap();
        assert!(contents.contains("class HttpClientGenerator"));
        assert!(!contents.contains("def host"));
    }

    #[test]
    fn test_verify_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let args = args_for(dir.path(), &["--verify"]);
        let (tree, _) = generate(&args).unwrap();
        let stale = stale_stubs(&tree, &args.out);
        assert_eq!(stale, vec![args.out.join("service_generator.rbi")]);
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.json");
        std::fs::write(
            &config,
            r#"{ "root": "Framework::Base", "builtin_patterns": ["^Framework::"] }"#,
        )
        .unwrap();

        let args = args_for(
            dir.path(),
            &["--config", config.to_str().unwrap(), "--root", "Rails::Generators::Base"],
        );
        let resolved = resolve_config(&args).unwrap();
        assert_eq!(resolved.root, "Rails::Generators::Base");
        assert_eq!(resolved.builtin_patterns, vec!["^Framework::".to_string()]);
    }

    #[test]
    fn test_inconsistent_patterns_fail_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let args = args_for(dir.path(), &["--builtin-pattern", "^Nothing::"]);

        let (tree, report) = generate(&args).unwrap();
        assert!(tree.is_empty());
        assert_eq!(report.failures.len(), 3);
        assert!(!run(&args).unwrap());
    }

    #[test]
    fn test_missing_snapshot_is_an_error() {
        let args = Args::parse_from(["stubgen", "--snapshot", "/nonexistent/snapshot.json"]);
        let err = run(&args).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to load snapshot"));
    }
}
