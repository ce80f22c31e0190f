//! Renders finalized columns as MySQL DDL plus a `LOAD DATA` statement.
//!
//! Rendering is a pure function of [`InferredTable`]; no inference happens
//! here. The layout keeps each separator at the start of the next line so a
//! text column's `-- max=N` comment lands after its trailing comma.

use itertools::Itertools;

use crate::{
    config::{Dialect, InferenceConfig},
    infer::{FinalColumn, InferredTable, SqlType},
};

const ORACLE_DATETIME_FORMAT: &str = "%d-%b-%Y %H:%i:%s";
const ORACLE_DATE_FORMAT: &str = "%d-%b-%Y";

/// Table name for an input file: the file name without its last extension.
/// A dot in the first two characters is kept, so `.csv` and `a.csv` stay
/// intact.
pub fn table_name_for(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(dot) if file_name[..dot].chars().count() > 1 => file_name[..dot].to_string(),
        _ => file_name.to_string(),
    }
}

/// Renders a dialect character for a single-quoted SQL literal. `'` and `\`
/// are backslash-escaped; the absent (or NUL) character renders empty.
pub fn quote_if_needed(ch: Option<u8>) -> String {
    match ch {
        None | Some(0) => String::new(),
        Some(b'\'') => "\\'".to_string(),
        Some(b'\\') => "\\\\".to_string(),
        Some(other) => char::from(other).to_string(),
    }
}

/// The `SET` expression that converts the staged `@name` variable.
pub fn load_expression(column: &FinalColumn) -> String {
    let variable = format!("@{}", column.name);
    let expr = match column.sql_type {
        SqlType::DateTime { oracle: true } => {
            format!("STR_TO_DATE({variable},\"{ORACLE_DATETIME_FORMAT}\")")
        }
        SqlType::Date { oracle: true } => {
            format!("STR_TO_DATE({variable},\"{ORACLE_DATE_FORMAT}\")")
        }
        _ => variable.clone(),
    };
    if column.nullable {
        format!("IF({variable}='', NULL, {expr})")
    } else {
        expr
    }
}

pub fn render_create_table(table: &str, inferred: &InferredTable, utf8: bool) -> String {
    let mut out = format!("DROP TABLE IF EXISTS {table};\nCREATE TABLE {table}");
    let mut separator = " (";
    let mut comment = String::new();

    for column in &inferred.columns {
        out.push_str(separator);
        out.push_str(&comment);
        out.push('\n');
        separator = ",";
        comment.clear();

        out.push_str(&format!("   {} {}", column.name, column.sql_type));
        if column.sql_type.is_text() {
            comment = format!("\t-- max={}", column.max_length);
        }
        if !column.nullable {
            out.push_str(" NOT NULL");
        }
    }

    for column in inferred.columns.iter().filter(|column| column.unique_key) {
        out.push_str(separator);
        out.push_str(&comment);
        out.push('\n');
        comment.clear();
        out.push_str(&format!(
            "  UNIQUE KEY {table}_{name} ({name})",
            name = column.name
        ));
    }

    if comment.is_empty() {
        out.push(')');
    } else {
        out.push_str(&comment);
        out.push_str("\n  )");
    }
    if utf8 {
        out.push_str("\n  CHARACTER SET = UTF8");
    }
    out.push_str(";\n\n");
    out
}

pub fn render_load_statement(
    file_name: &str,
    table: &str,
    inferred: &InferredTable,
    dialect: &Dialect,
) -> String {
    let mut out = format!("LOAD DATA LOCAL INFILE '{file_name}' INTO TABLE {table}\n");
    out.push_str(&format!(
        "   FIELDS TERMINATED BY '{}' ESCAPED BY '{}' OPTIONALLY ENCLOSED BY '{}' \n",
        quote_if_needed(dialect.separator),
        quote_if_needed(dialect.escape),
        quote_if_needed(dialect.quote),
    ));
    out.push_str("   LINES TERMINATED BY '\\n'\n");
    if inferred.header_consumed {
        out.push_str("   IGNORE 1 LINES\n");
    }

    let variables = inferred
        .columns
        .iter()
        .map(|column| format!("@{}", column.name))
        .join(",");
    out.push_str(&format!("   ({variables})\n"));

    let assignments = inferred
        .columns
        .iter()
        .map(|column| format!("   {} = {}", column.name, load_expression(column)))
        .join(",\n");
    out.push_str(&format!(" SET\n{assignments};\n\n"));
    out
}

/// Both statements for one input file.
pub fn render_script(file_name: &str, inferred: &InferredTable, config: &InferenceConfig) -> String {
    let table = table_name_for(file_name);
    let mut script = render_create_table(&table, inferred, config.utf8);
    script.push_str(&render_load_statement(
        file_name,
        &table,
        inferred,
        &config.dialect,
    ));
    script
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        column::TypeStates,
        infer::{IntegerType, IntegerWidth, TextType},
    };

    fn column(name: &str, sql_type: SqlType, nullable: bool) -> FinalColumn {
        FinalColumn {
            name: name.to_string(),
            sql_type,
            nullable,
            max_length: 3,
            min_int: None,
            max_int: None,
            unique_key: false,
            states: TypeStates::default(),
        }
    }

    #[test]
    fn table_names_strip_last_extension() {
        assert_eq!(table_name_for("people.csv"), "people");
        assert_eq!(table_name_for("archive.2012.csv"), "archive.2012");
        assert_eq!(table_name_for("a.csv"), "a.csv");
        assert_eq!(table_name_for(".hidden"), ".hidden");
        assert_eq!(table_name_for("noext"), "noext");
    }

    #[test]
    fn dialect_characters_are_escaped() {
        assert_eq!(quote_if_needed(Some(b',')), ",");
        assert_eq!(quote_if_needed(Some(b'\'')), "\\'");
        assert_eq!(quote_if_needed(Some(b'\\')), "\\\\");
        assert_eq!(quote_if_needed(None), "");
        assert_eq!(quote_if_needed(Some(0)), "");
    }

    #[test]
    fn load_expressions_wrap_dates_and_nulls() {
        let oracle = column("ts", SqlType::DateTime { oracle: true }, false);
        assert_eq!(
            load_expression(&oracle),
            "STR_TO_DATE(@ts,\"%d-%b-%Y %H:%i:%s\")"
        );
        let nullable_date = column("d", SqlType::Date { oracle: true }, true);
        assert_eq!(
            load_expression(&nullable_date),
            "IF(@d='', NULL, STR_TO_DATE(@d,\"%d-%b-%Y\"))"
        );
        let plain_datetime = column("p", SqlType::DateTime { oracle: false }, false);
        assert_eq!(load_expression(&plain_datetime), "@p");
    }

    #[test]
    fn text_comment_trails_the_following_separator() {
        let table = InferredTable {
            columns: vec![
                column("name", SqlType::Text(TextType::Varchar), false),
                column(
                    "n",
                    SqlType::Integer(IntegerType {
                        width: IntegerWidth::Tiny,
                        unsigned: false,
                    }),
                    true,
                ),
            ],
            header_consumed: true,
            data_rows: 1,
            lines_read: 2,
        };
        assert_eq!(
            render_create_table("t", &table, false),
            "DROP TABLE IF EXISTS t;\nCREATE TABLE t (\n   name VARCHAR(255) NOT NULL,\t-- max=3\n   n TINYINT)"
                .to_string()
                + ";\n\n"
        );
    }

    #[test]
    fn trailing_text_column_closes_on_its_own_line() {
        let table = InferredTable {
            columns: vec![column("name", SqlType::Text(TextType::Varchar), true)],
            header_consumed: false,
            data_rows: 1,
            lines_read: 1,
        };
        assert_eq!(
            render_create_table("t", &table, true),
            "DROP TABLE IF EXISTS t;\nCREATE TABLE t (\n   name VARCHAR(255)\t-- max=3\n  )\n  CHARACTER SET = UTF8;\n\n"
        );
    }
}
