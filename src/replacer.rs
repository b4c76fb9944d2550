use crate::backup;
use crate::config::{BatchConfig, ConfigLoader};
use crate::docx::DocxPackage;
use crate::errors::Result;
use crate::output_formatter::{OutputFormat, OutputFormatter};
use crate::report::{FileOutcome, FindReplaceReport, Instruction};
use crate::scanner;
use crate::templates::TemplateWhitelist;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Options for processing a file.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessOptions {
    /// If `true`, a `.bak` copy is made before a document is first modified.
    pub create_backup: bool,
    /// If `true`, changes are counted but not written to disk.
    pub dry_run: bool,
}

/// Core engine for replacing text across a folder of templates.
///
/// Processing is strictly sequential: each document is opened, edited and
/// saved before the next one is considered.
#[derive(Debug, Clone, Default)]
pub struct FindAndReplace {
    whitelist: TemplateWhitelist,
    options: ProcessOptions,
}

impl FindAndReplace {
    /// Creates an engine with the default template whitelist, no backups and
    /// no dry run.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_whitelist(mut self, whitelist: TemplateWhitelist) -> Self {
        self.whitelist = whitelist;
        self
    }

    pub fn with_options(mut self, options: ProcessOptions) -> Self {
        self.options = options;
        self
    }

    pub fn whitelist(&self) -> &TemplateWhitelist {
        &self.whitelist
    }

    /// Replaces `find` with `replace` in every template inside `folder`.
    ///
    /// Blank texts are rejected with an error before the folder is looked at.
    /// A missing folder, or a folder without templates, yields an
    /// unsuccessful report instead of an error.
    pub fn find_and_replace(
        &self,
        folder: &Path,
        find: &str,
        replace: &str,
    ) -> Result<FindReplaceReport> {
        let instruction = Instruction::new(find, replace)?;
        Ok(self.apply(folder, &instruction, &mut HashSet::new()))
    }

    /// Applies several instructions in order, returning one report each.
    ///
    /// Every instruction is validated before any document is touched. With
    /// backups enabled, a document is backed up once, before the first
    /// instruction that changes it.
    pub fn run_instructions(
        &self,
        folder: &Path,
        instructions: &[Instruction],
    ) -> Result<Vec<FindReplaceReport>> {
        self.run_instructions_with(folder, instructions, |_| {})
    }

    /// Same as [`run_instructions`](Self::run_instructions), calling
    /// `on_progress` after each instruction has been applied.
    pub fn run_instructions_with<F>(
        &self,
        folder: &Path,
        instructions: &[Instruction],
        mut on_progress: F,
    ) -> Result<Vec<FindReplaceReport>>
    where
        F: FnMut(&FindReplaceReport),
    {
        for instruction in instructions {
            Instruction::new(instruction.find.as_str(), instruction.replace.as_str())?;
        }

        let mut backed_up = HashSet::new();
        let mut reports = Vec::with_capacity(instructions.len());
        for instruction in instructions {
            let report = self.apply(folder, instruction, &mut backed_up);
            on_progress(&report);
            reports.push(report);
        }
        Ok(reports)
    }

    fn apply(
        &self,
        folder: &Path,
        instruction: &Instruction,
        backed_up: &mut HashSet<PathBuf>,
    ) -> FindReplaceReport {
        if !scanner::verify_folder(folder) {
            return FindReplaceReport::failed(
                instruction.clone(),
                format!("Folder not found: {}", folder.display()),
            );
        }

        let files = match scanner::find_docx_files(folder, &self.whitelist) {
            Ok(files) => files,
            Err(e) => {
                return FindReplaceReport::failed(
                    instruction.clone(),
                    format!("Could not read folder {}: {e}", folder.display()),
                );
            }
        };

        if files.is_empty() {
            return FindReplaceReport::failed(instruction.clone(), "No .docx files found.");
        }

        let mut report = FindReplaceReport::new(instruction.clone());
        for path in files {
            match self.process_file(&path, instruction, backed_up) {
                Ok(outcome) => report.record_file(outcome),
                Err(e) => {
                    log::warn!("Skipping {}: {}", path.display(), e);
                    report.warn(format!("Skipped {}: {}", path.display(), e));
                }
            }
        }

        report.success = true;
        report
    }

    /// Processes a single document.
    ///
    /// The document is saved only when at least one replacement occurred and
    /// this is not a dry run.
    fn process_file(
        &self,
        path: &Path,
        instruction: &Instruction,
        backed_up: &mut HashSet<PathBuf>,
    ) -> Result<FileOutcome> {
        let mut document = DocxPackage::open(path)?;
        let replacements = document.replace_in_runs(&instruction.find, &instruction.replace);
        let modified = replacements > 0;

        if modified && !self.options.dry_run {
            if self.options.create_backup && !backed_up.contains(path) {
                backup::create_backup(path)?;
                backed_up.insert(path.to_path_buf());
            }
            document.save()?;
            log::info!("Modified {} ({} replacements)", path.display(), replacements);
        }

        Ok(FileOutcome {
            path: path.to_path_buf(),
            replacements,
            modified,
        })
    }
}

/// Settings for the `replace` command, gathered from the command line.
#[derive(Debug, Clone, Default)]
pub struct ReplaceRequest {
    pub config: Option<PathBuf>,
    pub find: Vec<String>,
    pub replace: Vec<String>,
    pub dir: PathBuf,
    pub prefixes: Vec<String>,
    pub no_backup: bool,
    pub dry_run: bool,
    pub verbose: bool,
    pub format: String,
    pub output: Option<PathBuf>,
}

/// The main entry point for the `replace` command.
///
/// This function orchestrates the entire replacement process:
/// 1. It loads the instructions from a batch file or the `--find`/`--replace` pairs.
/// 2. It applies them one after the other to the templates in the folder.
/// 3. It writes the reports in the requested format.
///
/// Returns `Ok(false)` when at least one report was unsuccessful.
pub fn run_replace(request: ReplaceRequest) -> Result<bool> {
    let (instructions, config_prefixes) = if let Some(cfg_path) = &request.config {
        let resolved_path = ConfigLoader::find_config(cfg_path, &request.dir)?;
        log::info!("Using config file: {}", resolved_path.display());
        let config: BatchConfig = ConfigLoader::load_batch_config(&resolved_path)?;
        (config.instructions()?, config.prefixes)
    } else if !request.find.is_empty() || !request.replace.is_empty() {
        (pair_instructions(&request.find, &request.replace)?, None)
    } else {
        return Err("Specify --config, or --find together with --replace".into());
    };

    let whitelist = if !request.prefixes.is_empty() {
        TemplateWhitelist::new(request.prefixes.clone())
    } else if let Some(prefixes) = config_prefixes {
        TemplateWhitelist::new(prefixes)
    } else {
        TemplateWhitelist::default()
    };

    let engine = FindAndReplace::new()
        .with_whitelist(whitelist)
        .with_options(ProcessOptions {
            create_backup: !request.no_backup,
            dry_run: request.dry_run,
        });

    let pb = ProgressBar::new(instructions.len() as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("##-"));
    }

    let reports = engine.run_instructions_with(&request.dir, &instructions, |report| {
        pb.set_message(format!(
            "'{}' -> '{}'",
            report.instruction.find, report.instruction.replace
        ));
        pb.inc(1);
    })?;
    pb.finish_and_clear();

    let formatter = OutputFormatter::new(OutputFormat::from(request.format.as_str()))
        .verbose(request.verbose || request.dry_run)
        .dry_run(request.dry_run);

    let mut writer: Box<dyn Write> = match &request.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout()),
    };
    formatter.write_reports(&mut writer, &reports)?;
    writer.flush()?;

    Ok(reports.iter().all(|r| r.success))
}

/// Pairs `--find` and `--replace` values by position.
fn pair_instructions(find: &[String], replace: &[String]) -> Result<Vec<Instruction>> {
    if find.len() != replace.len() {
        return Err(format!(
            "Got {} --find value(s) but {} --replace value(s); they are paired in order",
            find.len(),
            replace.len()
        )
        .into());
    }

    find.iter()
        .zip(replace)
        .map(|(f, r)| Instruction::new(f.as_str(), r.as_str()))
        .collect()
}
