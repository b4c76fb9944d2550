use crate::errors::Result;
use crate::report::FindReplaceReport;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

/// Defines the possible output formats for replacement reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// A simple, human-readable text format.
    Text,
    /// JSON format, suitable for machine processing.
    Json,
    /// Comma-Separated Values format, one row per instruction.
    Csv,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            _ => OutputFormat::Text,
        }
    }
}

/// Handles the formatting of reports into various output formats.
pub struct OutputFormatter {
    format: OutputFormat,
    verbose: bool,
    dry_run: bool,
    tool_name: String,
    tool_version: String,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            verbose: false,
            dry_run: false,
            tool_name: env!("CARGO_PKG_NAME").to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// List every processed document in the text output.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Mark the text output as a preview.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Writes the formatted reports to a given writer.
    pub fn write_reports<W: Write>(&self, writer: &mut W, reports: &[FindReplaceReport]) -> Result<()> {
        let output = match self.format {
            OutputFormat::Text => self.format_text(reports),
            OutputFormat::Json => self.format_json(reports)?,
            OutputFormat::Csv => self.format_csv(reports)?,
        };

        writer.write_all(output.as_bytes())?;
        Ok(())
    }

    fn format_text(&self, reports: &[FindReplaceReport]) -> String {
        let mut output = String::new();

        for report in reports {
            let instruction = &report.instruction;
            output.push_str(&format!(
                "{}'{}' -> '{}'\n",
                if self.dry_run { "[DRY RUN] " } else { "" },
                instruction.find,
                instruction.replace
            ));

            if self.verbose {
                for file in &report.files {
                    let name = file
                        .path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| file.path.display().to_string());
                    let marker = if file.modified { "Modified" } else { "Unchanged" };
                    output.push_str(&format!("  {marker:<9} {name} ({} changes)\n", file.replacements));
                }
            }

            for line in report.message().lines() {
                output.push_str(&format!("  {line}\n"));
            }
            for warning in &report.warnings {
                output.push_str(&format!("  Warning: {warning}\n"));
            }
            output.push('\n');
        }

        output
    }

    fn format_json(&self, reports: &[FindReplaceReport]) -> Result<String> {
        #[derive(Serialize)]
        struct JsonOutput<'a> {
            tool: ToolInfo<'a>,
            run_time: DateTime<Utc>,
            dry_run: bool,
            reports: &'a [FindReplaceReport],
        }

        #[derive(Serialize)]
        struct ToolInfo<'a> {
            name: &'a str,
            version: &'a str,
        }

        let output = JsonOutput {
            tool: ToolInfo {
                name: &self.tool_name,
                version: &self.tool_version,
            },
            run_time: Utc::now(),
            dry_run: self.dry_run,
            reports,
        };

        Ok(serde_json::to_string_pretty(&output)?)
    }

    fn format_csv(&self, reports: &[FindReplaceReport]) -> Result<String> {
        use csv::Writer;

        let mut wtr = Writer::from_writer(vec![]);
        wtr.write_record([
            "Find",
            "Replace",
            "Success",
            "Processed",
            "Modified",
            "Replacements",
            "Error",
        ])?;

        for r in reports {
            let processed = r.files_processed.to_string();
            let modified = r.files_modified.to_string();
            let replacements = r.total_replacements.to_string();
            wtr.write_record([
                r.instruction.find.as_str(),
                r.instruction.replace.as_str(),
                if r.success { "true" } else { "false" },
                processed.as_str(),
                modified.as_str(),
                replacements.as_str(),
                r.error_message.as_deref().unwrap_or(""),
            ])?;
        }

        let data = wtr.into_inner().map_err(|e| format!("CSV writer error: {e}"))?;
        Ok(String::from_utf8(data)?)
    }
}
