//! Orchestration for one batch run.
//!
//! The driver walks `DirectorySetup → Preprocessing → {GenerateVariant →
//! Validate → Simulate}* → Postprocessing`. A validation failure returns
//! early: it aborts the remaining variants *and* skips postprocessing, but
//! everything already written stays on disk for inspection. A simulation
//! exiting non-zero is only logged; one bad run must not stop the sweep.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use colored::Color;
use tracing::debug;

use crate::RC_FILENAME;
use crate::core::batch_name::batch_dir_name;
use crate::core::classify::classify_params;
use crate::core::params::ParamValue;
use crate::core::rc::RunControl;
use crate::core::template::{SubstitutionRequest, substitute, variant_file_name};
use crate::io::batch::{create_batch, read_and_increment_counter};
use crate::io::process::{StreamRequest, stream_command};
use crate::io::rcfile::find_run_control;
use crate::io::script::read_script_lines;
use crate::report;

/// Everything resolved once at startup and threaded through the driver.
///
/// No process-wide state: the run control, paths, and original argv live
/// here for the duration of one invocation.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub rc: RunControl,
    pub rc_path: PathBuf,
    /// Directory the tool was invoked from; owns the counter and pointer
    /// files, and batch directories are created beneath it.
    pub invoke_dir: PathBuf,
    /// Full invoking command line, recorded in the batch directory.
    pub argv: Vec<String>,
    pub script_path: PathBuf,
    pub interpreter: String,
    pub var_prefix: String,
    /// Token historically inserted between interpreter and script path.
    pub separator: Option<String>,
    /// Extra trailing argument appended to every simulation invocation.
    pub static_args: Option<String>,
}

impl RunContext {
    /// Locate and validate run control starting from `invoke_dir`.
    ///
    /// Fails if no run-control file exists up to the filesystem root or a
    /// required key is missing; the driver never starts in that case.
    pub fn resolve(invoke_dir: &Path, argv: Vec<String>) -> Result<Self> {
        let (rc_path, rc) = find_run_control(invoke_dir, RC_FILENAME)?;
        report::info(format!("run control file found: {}", rc_path.display()));

        let script_path = invoke_dir.join(rc.require("scriptname")?);
        let interpreter = rc.require("interpreter")?.to_string();
        let var_prefix = rc.require("varprefix")?.to_string();
        let separator = rc.optional("separator").map(str::to_string);
        let static_args = rc.optional("staticparams").map(str::to_string);

        Ok(Self {
            rc,
            rc_path,
            invoke_dir: invoke_dir.to_path_buf(),
            argv,
            script_path,
            interpreter,
            var_prefix,
            separator,
            static_args,
        })
    }
}

/// How one sweep ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepOutcome {
    /// All variants were generated and run.
    Completed {
        variants: usize,
        /// Simulations and hooks that exited non-zero.
        failed_runs: usize,
    },
    /// A declared parameter never matched an assignment line; remaining
    /// variants were skipped and postprocessing did not run.
    ValidationFailed { missing: Vec<String> },
}

/// Run one full batch: classify parameters, set up the batch directory,
/// then generate, validate, and simulate each variant in scan order.
pub fn run_sweep(ctx: &RunContext, tokens: &[String]) -> Result<SweepOutcome> {
    let plan = classify_params(tokens)?;
    for demotion in &plan.demotions {
        report::warn(format!(
            "already set up a 1-D scan over `{}`, cannot also scan over `{}`",
            demotion.kept, demotion.rejected
        ));
        report::warn(format!(
            "setting {}={} as a static parameter instead",
            demotion.rejected, demotion.pinned
        ));
    }

    let script_basename = ctx
        .script_path
        .file_name()
        .with_context(|| format!("script path {} has no file name", ctx.script_path.display()))?
        .to_string_lossy()
        .into_owned();

    let counter = read_and_increment_counter(&ctx.invoke_dir)?;
    let batch_name = batch_dir_name(
        counter,
        &script_basename,
        &plan.statics,
        plan.scanned.as_ref().map(|scan| scan.name.as_str()),
    );
    debug!(batch = %batch_name, counter, "setting up batch directory");
    let batch = create_batch(&ctx.invoke_dir, &batch_name, &ctx.argv, &ctx.script_path)?;

    let template_lines = read_script_lines(&ctx.script_path)?;

    let mut failed_runs = run_hooks(ctx, "preprocess")?;

    let scan_values: Vec<Option<&ParamValue>> = match &plan.scanned {
        Some(scan) => scan.values.iter().map(Some).collect(),
        None => vec![None],
    };

    let mut variants = 0usize;
    for current in scan_values {
        let scan_pair = match (&plan.scanned, current) {
            (Some(scan), Some(value)) => Some((scan.name.as_str(), value)),
            _ => None,
        };
        if let Some((name, ParamValue::Text(_))) = scan_pair {
            report::warn(format!(
                "could not format scanning parameter `{name}` value as a number, assuming it is a text parameter"
            ));
        }

        let result = substitute(
            &template_lines,
            &SubstitutionRequest {
                prefix: &ctx.var_prefix,
                scanned: scan_pair,
                statics: &plan.statics,
            },
        );

        let file_name = variant_file_name(&script_basename, scan_pair);
        let script_file = batch.dir.join(&file_name);
        let mut contents = result.lines.join("\n");
        contents.push('\n');
        fs::write(&script_file, contents)
            .with_context(|| format!("write {}", script_file.display()))?;
        debug!(script = %script_file.display(), "variant generated");

        if !result.missing.is_empty() {
            report_missing(&result.missing, &ctx.script_path);
            return Ok(SweepOutcome::ValidationFailed {
                missing: result.missing,
            });
        }

        report::info(format!(
            "it is {}, running the next simulation with output:",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        let mut argv = vec![ctx.interpreter.clone()];
        if let Some(separator) = &ctx.separator {
            argv.push(separator.clone());
        }
        argv.push(script_file.display().to_string());
        if let Some(extra) = &ctx.static_args {
            argv.push(extra.clone());
        }
        let outcome = stream_command(&StreamRequest {
            argv: &argv,
            cwd: &batch.dir,
            color: Color::Blue,
        })?;
        if !outcome.status.success() {
            report::warn(format!(
                "simulation for `{file_name}` exited with {}; continuing with the sweep",
                outcome.status
            ));
            failed_runs += 1;
        }
        variants += 1;
    }

    failed_runs += run_hooks(ctx, "postprocess")?;

    Ok(SweepOutcome::Completed {
        variants,
        failed_runs,
    })
}

/// Run the configured hook commands for `stage`, sequentially, from the
/// invocation directory. Non-zero exits are logged and counted, never
/// fatal.
fn run_hooks(ctx: &RunContext, stage: &str) -> Result<usize> {
    let commands = ctx.rc.commands(stage);
    if commands.is_empty() {
        return Ok(0);
    }
    report::info(format!("calling the {stage} command now..."));
    let mut failed = 0usize;
    for argv in &commands {
        let outcome = stream_command(&StreamRequest {
            argv,
            cwd: &ctx.invoke_dir,
            color: Color::Magenta,
        })?;
        if !outcome.status.success() {
            report::warn(format!(
                "{stage} command `{}` exited with {}",
                argv.join(" "),
                outcome.status
            ));
            failed += 1;
        }
    }
    Ok(failed)
}

fn report_missing(missing: &[String], script_path: &Path) {
    let listed = missing.join("`, `");
    if missing.len() == 1 {
        report::error(format!(
            "the parameter `{listed}` was not found to be defined anywhere in {}",
            script_path.display()
        ));
    } else {
        report::error(format!(
            "the parameters `{listed}` were not found to be defined anywhere in {}",
            script_path.display()
        ));
    }
}
