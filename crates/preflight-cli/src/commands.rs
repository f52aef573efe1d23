use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use preflight_errors::{ErrorRegistry, ErrorSession};
use preflight_ingest::{
    CsvWorkbookSource, ProjectSpec, RowMajorTable, SessionSpec, Table, TableSpec,
};
use preflight_validate::{FileChecker, FileRequirement, check_table};
use tracing::{info, info_span, warn};

use crate::cli::{CheckArgs, CodesArgs};
use crate::summary::codes_table;
use crate::types::{CheckResult, FileSummary, TableStatus, TableSummary};

/// Session flags after command-line overrides.
#[derive(Debug, Clone, Copy)]
struct SessionFlags {
    warnings: bool,
    print: bool,
    log: bool,
}

impl SessionFlags {
    fn resolve(spec: &SessionSpec, args: &CheckArgs) -> Self {
        Self {
            warnings: spec.warnings || args.warnings,
            print: spec.print && !args.quiet_messages && !args.json,
            log: spec.log || args.log_messages,
        }
    }

    fn session(self, registry: &Arc<ErrorRegistry>, header: &str) -> ErrorSession {
        ErrorSession::new(Arc::clone(registry))
            .with_header(header)
            .with_warning(self.warnings)
            .with_print(self.print)
            .with_log(self.log)
    }
}

pub fn run_codes(args: &CodesArgs) -> Result<()> {
    let registry = ErrorRegistry::from_path(&args.codes)
        .with_context(|| format!("load error codes from {}", args.codes.display()))?;
    let entries: Vec<_> = registry
        .table()
        .entries()
        .iter()
        .filter(|entry| {
            args.location
                .as_deref()
                .is_none_or(|location| entry.location == location)
        })
        .collect();
    println!("{}", codes_table(&entries));
    Ok(())
}

pub fn run_check(args: &CheckArgs) -> Result<CheckResult> {
    let project = ProjectSpec::from_path(&args.project)
        .with_context(|| format!("load project {}", args.project.display()))?;
    let span = info_span!("project", path = %args.project.display());
    let _guard = span.enter();

    let codes = args
        .codes
        .clone()
        .or_else(|| project.codes.clone())
        .ok_or_else(|| {
            anyhow!("no error-code table: pass --codes or set `codes` in the project file")
        })?;
    let registry = Arc::new(
        ErrorRegistry::from_path(&codes)
            .with_context(|| format!("load error codes from {}", codes.display()))?,
    );
    let flags = SessionFlags::resolve(&project.session, args);
    let source = CsvWorkbookSource;

    // Stage 1: every file exists, opens, and holds its sheets.
    let requirements = file_requirements(&project.tables);
    let mut file_session = flags.session(&registry, &project.session.header);
    let mut files = Vec::with_capacity(requirements.len());
    {
        let mut checker = FileChecker::new(&source, &mut file_session);
        for requirement in requirements {
            let passed = checker.check_file(&requirement);
            files.push(FileSummary {
                path: requirement.path,
                sheets: requirement.sheets,
                passed,
            });
        }
    }
    let files_failed = files.iter().any(|file| !file.passed);
    if files_failed {
        warn!("file preflight failed");
    }

    // Stage 2: import and validate each table.
    let mut session = flags.session(&registry, &project.session.header);
    let mut stopped = files_failed && !flags.warnings;
    let mut tables = Vec::with_capacity(project.tables.len());
    for spec in &project.tables {
        let file_passed = files
            .iter()
            .find(|file| file.path == spec.path)
            .is_some_and(|file| file.passed);
        if stopped || !file_passed {
            tables.push(TableSummary {
                name: spec.name.clone(),
                rows: None,
                status: TableStatus::Skipped,
                report: None,
            });
            continue;
        }

        let mut table = import_table(spec, &source)?;
        let rows = table.dataset()?.height();
        let report = check_table(spec, &mut table, &mut session)
            .with_context(|| format!("check table {}", spec.name))?;
        let status = if report.passed() {
            TableStatus::Passed
        } else {
            TableStatus::Failed
        };
        if status == TableStatus::Failed && !flags.warnings {
            stopped = true;
        }
        tables.push(TableSummary {
            name: spec.name.clone(),
            rows: Some(rows),
            status,
            report: Some(report),
        });
    }

    let messages: Vec<String> = [file_session.accumulated(), session.accumulated()]
        .into_iter()
        .flat_map(str::lines)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    let has_errors =
        files_failed || tables.iter().any(|table| table.status == TableStatus::Failed);
    info!(
        tables = tables.len(),
        messages = messages.len(),
        has_errors,
        "check complete"
    );
    Ok(CheckResult {
        project: args.project.clone(),
        warnings: flags.warnings,
        files,
        tables,
        messages,
        has_errors,
    })
}

/// One requirement per distinct file, listing its sheets in project order.
fn file_requirements(tables: &[TableSpec]) -> Vec<FileRequirement> {
    let mut order: Vec<PathBuf> = Vec::new();
    let mut sheets: BTreeMap<PathBuf, Vec<String>> = BTreeMap::new();
    for spec in tables {
        let entry = sheets.entry(spec.path.clone()).or_insert_with(|| {
            order.push(spec.path.clone());
            Vec::new()
        });
        let sheet = spec.sheet_name();
        if !entry.contains(&sheet) {
            entry.push(sheet);
        }
    }
    order
        .into_iter()
        .map(|path| {
            let sheets = sheets.remove(&path).unwrap_or_default();
            FileRequirement::new(path, sheets)
        })
        .collect()
}

fn import_table(spec: &TableSpec, source: &CsvWorkbookSource) -> Result<Table> {
    let mut table = spec.to_table();
    match &spec.row_major {
        Some(params) => {
            let raw = table
                .read_raw(source)
                .with_context(|| format!("read sheet for {}", spec.name))?;
            RowMajorTable::new(params.clone(), raw, spec.name.as_str())
                .parse_into(&mut table)
                .with_context(|| format!("parse row-major table {}", spec.name))?;
        }
        None => table
            .import(source)
            .with_context(|| format!("import table {}", spec.name))?,
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, path: &str, sheet: Option<&str>) -> TableSpec {
        TableSpec {
            name: name.to_string(),
            path: PathBuf::from(path),
            sheet: sheet.map(str::to_string),
            ..TableSpec::default()
        }
    }

    #[test]
    fn test_file_requirements_group_sheets_by_path() {
        let tables = vec![
            spec("a", "book", Some("s1")),
            spec("b", "other.csv", None),
            spec("c", "book", Some("s2")),
            spec("d", "book", Some("s1")),
        ];
        let requirements = file_requirements(&tables);
        assert_eq!(
            requirements,
            vec![
                FileRequirement::new("book", ["s1", "s2"]),
                FileRequirement::new("other.csv", ["other"]),
            ]
        );
    }

    #[test]
    fn test_session_flags_overrides() {
        let args = CheckArgs {
            project: PathBuf::from("project.toml"),
            codes: None,
            warnings: true,
            quiet_messages: false,
            log_messages: true,
            json: true,
        };
        let flags = SessionFlags::resolve(&SessionSpec::default(), &args);
        assert!(flags.warnings);
        assert!(!flags.print);
        assert!(flags.log);
    }
}
