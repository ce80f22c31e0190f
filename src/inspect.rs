//! Reports inferred column types without generating SQL.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use itertools::Itertools;
use log::error;
use serde::Serialize;

use crate::{
    cli::InspectArgs,
    column::{CandidateType, TypeState},
    config::InferenceConfig,
    emit,
    generate::{self, ScannedFile},
    infer::FinalColumn,
    io_utils,
    table::{Align, TextTable},
};

#[derive(Debug, Serialize)]
pub struct FileReport {
    pub file: String,
    pub table: String,
    pub header_consumed: bool,
    pub data_rows: usize,
    /// Row-shape diagnostic when the scan stopped early.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncated: Option<String>,
    pub columns: Vec<ColumnReport>,
}

#[derive(Debug, Serialize)]
pub struct ColumnReport {
    pub name: String,
    pub sql_type: String,
    pub nullable: bool,
    pub max_length: usize,
    pub min_int: Option<String>,
    pub max_int: Option<String>,
    pub unique_key: bool,
    pub candidates: BTreeMap<&'static str, TypeState>,
}

impl From<&FinalColumn> for ColumnReport {
    fn from(column: &FinalColumn) -> Self {
        Self {
            name: column.name.clone(),
            sql_type: column.sql_type.to_string(),
            nullable: column.nullable,
            max_length: column.max_length,
            min_int: column.min_int.as_ref().map(ToString::to_string),
            max_int: column.max_int.as_ref().map(ToString::to_string),
            unique_key: column.unique_key,
            candidates: column
                .states
                .iter()
                .map(|(candidate, state)| (candidate.as_str(), state))
                .collect(),
        }
    }
}

impl From<&ScannedFile> for FileReport {
    fn from(scanned: &ScannedFile) -> Self {
        Self {
            file: scanned.path.display().to_string(),
            table: emit::table_name_for(&scanned.file_name),
            header_consumed: scanned.table.header_consumed,
            data_rows: scanned.table.data_rows,
            truncated: scanned.truncated.as_ref().map(ToString::to_string),
            columns: scanned.table.columns.iter().map(ColumnReport::from).collect(),
        }
    }
}

pub fn execute(args: &InspectArgs) -> Result<()> {
    let config = InferenceConfig::from_args(&args.inference);
    let encoding = io_utils::resolve_encoding(args.inference.input_encoding.as_deref())?;

    let mut reports = Vec::with_capacity(args.files.len());
    for path in &args.files {
        match generate::scan_file(path, &config, encoding) {
            Ok(scanned) => reports.push(FileReport::from(&scanned)),
            Err(err) => error!("Skipping {path:?}: {err:#}"),
        }
    }

    if args.json {
        let json = serde_json::to_string_pretty(&reports).context("Serializing report")?;
        println!("{json}");
    } else {
        for report in &reports {
            print!("{}", render_report(report));
        }
    }
    Ok(())
}

pub fn render_report(report: &FileReport) -> String {
    let mut out = format!(
        "{} -> {} ({} rows, {})\n",
        report.file,
        report.table,
        report.data_rows,
        if report.header_consumed {
            "header"
        } else {
            "generated names"
        }
    );
    if let Some(reason) = &report.truncated {
        out.push_str(&format!("truncated: {reason}\n"));
    }

    let mut table = TextTable::new([
        ("column", Align::Left),
        ("type", Align::Left),
        ("null", Align::Left),
        ("max_len", Align::Right),
        ("min", Align::Right),
        ("max", Align::Right),
        ("key", Align::Left),
        ("possible", Align::Left),
    ]);
    for column in &report.columns {
        let possible = CandidateType::ALL
            .iter()
            .filter(|candidate| column.candidates.get(candidate.as_str()) == Some(&TypeState::Possible))
            .map(|candidate| candidate.as_str())
            .join(",");
        table.push_row(vec![
            column.name.clone(),
            column.sql_type.clone(),
            yes_no(column.nullable),
            column.max_length.to_string(),
            column.min_int.clone().unwrap_or_default(),
            column.max_int.clone().unwrap_or_default(),
            yes_no(column.unique_key),
            possible,
        ]);
    }
    out.push_str(&table.render());
    out.push('\n');
    out
}

fn yes_no(value: bool) -> String {
    let text = if value { "yes" } else { "no" };
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infer::ColumnInferencer;

    fn report_for(rows: &[&[&str]], config: &InferenceConfig) -> FileReport {
        let mut inferencer = ColumnInferencer::new(config);
        for &row in rows {
            inferencer.observe_row(row).expect("row shape");
        }
        let scanned = ScannedFile {
            path: "people.csv".into(),
            file_name: "people.csv".to_string(),
            table: inferencer.finish(),
            truncated: None,
        };
        FileReport::from(&scanned)
    }

    #[test]
    fn report_lists_types_and_possible_candidates() {
        let config = InferenceConfig {
            detect_unique_keys: true,
            ..InferenceConfig::default()
        };
        let report = report_for(&[&["id", "score"], &["1", "2.5"], &["2", ""]], &config);
        assert_eq!(report.table, "people");
        assert_eq!(report.data_rows, 2);
        assert_eq!(report.columns[0].sql_type, "TINYINT UNSIGNED");
        assert!(report.columns[0].unique_key);
        assert_eq!(report.columns[1].sql_type, "FLOAT");
        assert!(report.columns[1].nullable);

        let rendered = render_report(&report);
        assert!(rendered.starts_with("people.csv -> people (2 rows, header)\n"));
        assert!(rendered.contains("integer,float,double"));
    }

    #[test]
    fn json_report_uses_lowercase_states() {
        let report = report_for(&[&["v"], &["x"]], &InferenceConfig::default());
        let json = serde_json::to_value(&report).expect("json");
        assert_eq!(json["columns"][0]["candidates"]["integer"], "impossible");
        assert_eq!(json["columns"][0]["sql_type"], "VARCHAR(255)");
        assert!(json.get("truncated").is_none());
    }
}
