//! Output formatting: table, JSON, YAML.
//!
//! Renders data in the format selected by `--output`. Table uses
//! `tabled`, structured formats use serde.

use std::io::{self, Write};

use tabled::{Table, Tabled, settings::Style};

use crate::cli::OutputFormat;

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `text`: uses the `Tabled` derive to build a table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
pub fn render_list<T, R>(format: OutputFormat, data: &[T], to_row: impl Fn(&T) -> R) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Interactive | OutputFormat::Text => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Text rendering uses `detail_fn`, which returns a pre-formatted
/// string; single-item views don't use the `Tabled` derive.
pub fn render_single<T>(format: OutputFormat, data: &T, detail_fn: impl Fn(&T) -> String) -> String
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Interactive | OutputFormat::Text => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
    }
}

/// Print rendered output to stdout.
pub fn print_output(output: &str) {
    if output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let result = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    result.expect("serialization should not fail")
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).expect("serialization should not fail")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(serde::Serialize)]
    struct Item {
        id: String,
        name: String,
    }

    #[derive(Tabled)]
    struct ItemRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
    }

    fn items() -> Vec<Item> {
        vec![Item {
            id: "srv-1".into(),
            name: "web".into(),
        }]
    }

    #[test]
    fn text_renders_a_table_with_headers() {
        let out = render_list(OutputFormat::Text, &items(), |i| ItemRow {
            id: i.id.clone(),
            name: i.name.clone(),
        });
        assert!(out.contains("ID"));
        assert!(out.contains("srv-1"));
    }

    #[test]
    fn json_serializes_the_original_data() {
        let out = render_list(OutputFormat::JsonCompact, &items(), |i| ItemRow {
            id: i.id.clone(),
            name: i.name.clone(),
        });
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[0]["name"], "web");
    }

    #[test]
    fn yaml_round_trips_a_single_item() {
        let item = Item {
            id: "dpg-1".into(),
            name: "db".into(),
        };
        let out = render_single(OutputFormat::Yaml, &item, |i| i.name.clone());
        assert!(out.contains("id: dpg-1"));
    }
}
