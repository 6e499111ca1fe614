//! `zqlz folds`: print the folding regions of a SQL script.

use anyhow::{Context, Result, bail};
use comfy_table::{Table, presets::UTF8_FULL};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use zqlz_folding::{
    FoldingSession, FoldingSettings, ReconcileOutcome, RegionId, TextBuffer, TrackedRegion,
};

/// One `--edit OFFSET:REMOVE:TEXT` argument.
///
/// `TEXT` understands `\n`, `\t` and `\\` escapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditSpec {
    pub offset: usize,
    pub remove: usize,
    pub text: String,
}

impl FromStr for EditSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(3, ':');
        let (Some(offset), Some(remove), Some(text)) = (parts.next(), parts.next(), parts.next())
        else {
            bail!("expected OFFSET:REMOVE:TEXT, got {:?}", s);
        };

        Ok(Self {
            offset: offset
                .trim()
                .parse()
                .with_context(|| format!("invalid edit offset {:?}", offset))?,
            remove: remove
                .trim()
                .parse()
                .with_context(|| format!("invalid edit length {:?}", remove))?,
            text: unescape(text)?,
        })
    }
}

fn unescape(text: &str) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => bail!("unknown escape \\{} in edit text", other),
            None => bail!("edit text ends with a lone backslash"),
        }
    }
    Ok(out)
}

/// A fold as printed, with 1-based inclusive line numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoldRow {
    pub id: RegionId,
    pub offset: usize,
    pub length: usize,
    pub start_line: usize,
    pub end_line: usize,
}

impl FoldRow {
    fn new(buffer: &TextBuffer, region: &TrackedRegion) -> Self {
        let line = |offset: usize| buffer.byte_to_line(offset).unwrap_or_default() + 1;
        Self {
            id: region.id,
            offset: region.offset(),
            length: region.length(),
            start_line: line(region.offset()),
            end_line: line(region.end().saturating_sub(1).max(region.offset())),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EditReport {
    pub edit: EditSpec,
    pub outcome: ReconcileOutcome,
    pub folds: Vec<FoldRow>,
}

#[derive(Debug, Serialize)]
pub struct FoldsReport {
    pub file: PathBuf,
    pub folds: Vec<FoldRow>,
    pub edits: Vec<EditReport>,
}

/// Resolves the settings file: an explicit path must load, the default
/// location falls back to defaults.
pub fn load_settings(path: Option<&Path>) -> Result<FoldingSettings> {
    if let Some(path) = path {
        return FoldingSettings::load(path)
            .with_context(|| format!("Failed to load folding settings from {:?}", path));
    }
    match FoldingSettings::default_path() {
        Ok(path) => FoldingSettings::load(&path)
            .with_context(|| format!("Failed to load folding settings from {:?}", path)),
        Err(e) => {
            tracing::warn!(error = %e, "using default folding settings");
            Ok(FoldingSettings::default())
        }
    }
}

/// Folds `text`, replays `edits` and collects what happened.
pub fn run(
    file: &Path,
    text: &str,
    settings: FoldingSettings,
    edits: &[EditSpec],
) -> Result<FoldsReport> {
    let mut session = FoldingSession::open(text, settings).context("Failed to fold document")?;
    let folds = rows(&session);

    let mut reports = Vec::with_capacity(edits.len());
    for edit in edits {
        let Some(end) = edit.offset.checked_add(edit.remove) else {
            bail!("edit at offset {} removes past the end of any document", edit.offset);
        };
        let outcome = session
            .replace(edit.offset..end, &edit.text)
            .with_context(|| format!("Failed to apply edit at offset {}", edit.offset))?;
        tracing::info!(
            offset = edit.offset,
            removed = edit.remove,
            inserted = edit.text.len(),
            "applied edit"
        );
        reports.push(EditReport {
            edit: edit.clone(),
            outcome,
            folds: rows(&session),
        });
    }

    Ok(FoldsReport {
        file: file.to_path_buf(),
        folds,
        edits: reports,
    })
}

fn rows(session: &FoldingSession) -> Vec<FoldRow> {
    session
        .regions()
        .iter()
        .map(|region| FoldRow::new(session.buffer(), region))
        .collect()
}

fn table(folds: &[FoldRow]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Fold", "Offset", "Length", "Lines"]);
    for fold in folds {
        table.add_row(vec![
            fold.id.to_string(),
            fold.offset.to_string(),
            fold.length.to_string(),
            format!("{}-{}", fold.start_line, fold.end_line),
        ]);
    }
    table
}

pub fn print_table(report: &FoldsReport) {
    println!("{}: {} folds", report.file.display(), report.folds.len());
    println!("{}", table(&report.folds));

    for (index, edit) in report.edits.iter().enumerate() {
        let summary = match &edit.outcome {
            ReconcileOutcome::Applied(r) => format!(
                "{} retained, {} minted, {} retired",
                r.retained.len(),
                r.minted.len(),
                r.retired.len()
            ),
            ReconcileOutcome::Skipped(reason) => format!("skipped ({:?})", reason),
        };
        println!(
            "\nedit #{} at {} (-{} +{}): {}",
            index + 1,
            edit.edit.offset,
            edit.edit.remove,
            edit.edit.text.len(),
            summary
        );
        println!("{}", table(&edit.folds));
    }
}

pub fn print_json(report: &FoldsReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SCRIPT: &str = "SELECT *\nFROM a;\n\nSELECT *\nFROM b;\n";

    #[test]
    fn test_parse_edit_spec() {
        let edit: EditSpec = "26:0:, id".parse().unwrap();
        assert_eq!(
            edit,
            EditSpec {
                offset: 26,
                remove: 0,
                text: ", id".to_string()
            }
        );
    }

    #[test]
    fn test_parse_edit_text_keeps_colons_and_escapes() {
        let edit: EditSpec = "0:3:a:b\\nc\\\\".parse().unwrap();
        assert_eq!(edit.remove, 3);
        assert_eq!(edit.text, "a:b\nc\\");
    }

    #[test]
    fn test_parse_edit_errors() {
        assert!("12".parse::<EditSpec>().is_err());
        assert!("x:0:".parse::<EditSpec>().is_err());
        assert!("0:0:\\q".parse::<EditSpec>().is_err());
        assert!("0:0:trailing\\".parse::<EditSpec>().is_err());
    }

    #[test]
    fn test_run_reports_lines() {
        let report = run(Path::new("a.sql"), SCRIPT, FoldingSettings::default(), &[]).unwrap();

        let lines: Vec<_> = report
            .folds
            .iter()
            .map(|f| (f.offset, f.length, f.start_line, f.end_line))
            .collect();
        assert_eq!(lines, vec![(0, 17, 1, 2), (18, 17, 4, 5)]);
    }

    #[test]
    fn test_run_replays_edits() {
        let edits = vec!["8:0:, id".parse().unwrap(), "0:0:SELECT 1;\\n".parse().unwrap()];
        let report = run(Path::new("a.sql"), SCRIPT, FoldingSettings::default(), &edits).unwrap();

        assert_eq!(report.edits.len(), 2);
        let first = report.edits[0].outcome.report().unwrap();
        assert!(first.is_noop());
        assert_eq!(report.edits[1].folds[0].offset, 10);
        assert_eq!(report.edits[1].folds[0].id, report.folds[0].id);
    }

    #[test]
    fn test_run_rejects_out_of_bounds_edit() {
        let edits = vec!["500:0:x".parse().unwrap()];
        assert!(run(Path::new("a.sql"), SCRIPT, FoldingSettings::default(), &edits).is_err());
    }

    #[test]
    fn test_run_rejects_overflowing_edit() {
        let edits = vec![format!("{}:1:", usize::MAX).parse().unwrap()];
        let err = run(Path::new("a.sql"), SCRIPT, FoldingSettings::default(), &edits).unwrap_err();
        assert!(err.to_string().contains("removes past the end"));
    }

    #[test]
    fn test_json_output_shape() {
        let report = run(Path::new("a.sql"), SCRIPT, FoldingSettings::default(), &[]).unwrap();
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["folds"][0]["id"], 1);
        assert_eq!(value["folds"][1]["start_line"], 4);
    }
}
