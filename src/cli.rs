//! Minimal CLI: metadata files → (defaults | validate | describe | merge | check)
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indexmap::IndexMap;
use serde_json::{Map, Value};

use param_shape::check::check_metadata;
use param_shape::defaults::resolve_defaults;
use param_shape::describe::describe;
use param_shape::merge::reconcile;
use param_shape::meta::{Entity, MetadataFile};
use param_shape::schema::Param;
use param_shape::validate::{Issue, ParamsValidator};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// derive defaults, validators and shape summaries from function/class parameter metadata
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    /// raise log verbosity (overridden by RUST_LOG)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// disable colored output
    #[arg(long, global = true, default_value_t = false)]
    no_color: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// print initial argument values for every signature
    Defaults(DefaultsOut),
    /// check an argument record against one signature
    Validate(ValidateIn),
    /// print the shape summary of every typed param
    Describe(DescribeOut),
    /// merge discovered metadata with declared metadata
    Merge(MergeOut),
    /// self-check metadata files: defaults and test case inputs must validate
    Check(CheckIn),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more metadata files. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// only this signature (`fn`, `Class::new`, `Class::method`)
    #[arg(long)]
    target: Option<String>,
}

#[derive(clap::Parser, Debug)]
struct DefaultsOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct DescribeOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct ValidateIn {
    /// metadata file declaring the signature
    #[arg(long, short)]
    input: PathBuf,

    /// signature to validate against (`fn`, `Class::new`, `Class::method`)
    #[arg(long)]
    target: String,

    /// JSON object of argument values
    #[arg(long)]
    values: PathBuf,
}

#[derive(clap::Parser, Debug)]
struct MergeOut {
    /// discovered entity lists (JSON arrays); literal paths or quoted globs
    #[arg(long, num_args = 1.., required = true)]
    discovered: Vec<String>,

    /// declared metadata file
    #[arg(long)]
    declared: PathBuf,

    /// names the host exports; everything resolves when omitted
    #[arg(long, value_delimiter = ',')]
    exports: Vec<String>,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct CheckIn {
    /// metadata files; literal paths or quoted globs
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    /// Every (signature, params) pair across the inputs, filtered by `--target`.
    fn load_process(&self, mut apply: impl FnMut(&str, &[Param])) -> Result<()> {
        let mut matched = false;
        for path in resolve_file_path_patterns(&self.input)? {
            let file = load_metadata(&path)?;
            for entity in file.meta.values() {
                for (name, params) in entity.signatures() {
                    if self.target.as_deref().is_some_and(|t| t != name) {
                        continue;
                    }
                    matched = true;
                    apply(&name, params);
                }
            }
        }
        if let (Some(target), false) = (&self.target, matched) {
            bail!("no signature named `{target}` in the given inputs");
        }
        Ok(())
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        param_shape::init_tracing(self.verbose);
        if self.no_color {
            colored::control::set_override(false);
        }
        match &self.cmd {
            Command::Defaults(target) => {
                let mut out = Map::new();
                target.input_settings.load_process(|name, params| {
                    out.insert(name.to_string(), Value::Object(resolve_defaults(params)));
                })?;
                emit(&Value::Object(out), target.out.as_deref())
            }
            Command::Describe(target) => {
                let mut out = Map::new();
                target.input_settings.load_process(|name, params| {
                    let shapes = params
                        .iter()
                        .map(|p| {
                            let shape = p.shape.as_ref().map(|leaf| serde_json::to_value(describe(leaf)));
                            let shape = match shape {
                                Some(Ok(v)) => v,
                                _ => Value::from("untyped"),
                            };
                            (p.name.clone(), shape)
                        })
                        .collect();
                    out.insert(name.to_string(), Value::Object(shapes));
                })?;
                emit(&Value::Object(out), target.out.as_deref())
            }
            Command::Validate(target) => {
                let file = load_metadata(&target.input)?;
                let params = file
                    .meta
                    .values()
                    .flat_map(Entity::signatures)
                    .find(|(name, _)| *name == target.target)
                    .map(|(_, params)| params.to_vec())
                    .with_context(|| format!("no signature named `{}`", target.target))?;
                let bytes = std::fs::read(&target.values)
                    .with_context(|| format!("failed to read {}", target.values.display()))?;
                let values: Map<String, Value> = param_shape::path_de::from_slice_with_path(&bytes)
                    .with_context(|| format!("failed to parse {}", target.values.display()))?;
                match ParamsValidator::compile(&params).validate(&values) {
                    Ok(()) => {
                        println!("{} {}", "✓".green(), target.target);
                        Ok(())
                    }
                    Err(issues) => {
                        report_issues(&target.target, &issues);
                        bail!("{} issue(s) in {}", issues.len(), target.values.display())
                    }
                }
            }
            Command::Merge(target) => {
                let declared = load_metadata(&target.declared)?;
                let mut discovered = Vec::<Entity>::new();
                for path in resolve_file_path_patterns(&target.discovered)? {
                    let bytes = std::fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
                    let mut entities: Vec<Entity> = param_shape::path_de::from_slice_with_path(&bytes)
                        .with_context(|| format!("failed to parse {}", path.display()))?;
                    discovered.append(&mut entities);
                }
                let exports: BTreeSet<&str> = target.exports.iter().map(String::as_str).collect();
                let resolver = |name: &str| (exports.is_empty() || exports.contains(name)).then_some(());
                let merged: Vec<Entity> = reconcile(&discovered, &declared.meta, &resolver)
                    .into_iter()
                    .map(|loaded| loaded.entity)
                    .collect();
                let merged: IndexMap<String, Entity> =
                    merged.into_iter().map(|e| (e.name().to_string(), e)).collect();
                let doc = MetadataFile { test_cases: declared.test_cases, meta: merged };
                emit(&serde_json::to_value(&doc)?, target.out.as_deref())
            }
            Command::Check(target) => {
                let mut failures = 0usize;
                for path in resolve_file_path_patterns(&target.input)? {
                    failures += check_file(&path)?;
                }
                if failures > 0 {
                    bail!("{failures} signature(s) failed their self-check");
                }
                Ok(())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn load_metadata(path: &Path) -> Result<MetadataFile> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    param_shape::path_de::from_slice_with_path(&bytes).with_context(|| format!("failed to parse {}", path.display()))
}

fn emit(value: &Value, out: Option<&Path>) -> Result<()> {
    let src = serde_json::to_string_pretty(value)?;
    if let Some(out) = out {
        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(out, &src).with_context(|| format!("failed to write {}", out.display()))?;
    } else {
        println!("{src}");
    }
    Ok(())
}

fn report_issues(name: &str, issues: &[Issue]) {
    eprintln!("{} {name}", "✗".red());
    for issue in issues {
        eprintln!("    {}", issue.to_string().yellow());
    }
}

/// Returns the number of failing signatures.
fn check_file(path: &Path) -> Result<usize> {
    let file = load_metadata(path)?;
    println!("{}", path.display().to_string().bold());
    let mut failures = 0;
    for report in check_metadata(&file) {
        if report.passed() {
            println!("  {} {}", "✓".green(), report.signature);
        } else {
            failures += 1;
            report_issues(&format!("  {}", report.signature), &report.issues);
        }
    }
    Ok(failures)
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern).with_context(|| format!("bad glob pattern: {pattern}"))? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
