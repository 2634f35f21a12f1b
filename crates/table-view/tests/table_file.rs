use async_trait::async_trait;
use connectors::{backend::QueryBackend, error::DbError};
use model::{
    core::value::{FieldValue, Value},
    pagination::page::PageRequest,
    records::row::RowData,
};
use query_builder::{
    dialect::{Dialect, MySql},
    renderer::render,
};
use std::{io::Write, sync::Arc};
use table_view::{
    Filter, TOTAL_RESULTS, TableView, reshape::nest_by_alias,
    spec::{ConfigError, TableFile},
};
use tempfile::NamedTempFile;

const TABLES: &str = r#"
[[table]]
name = "orders"
alias = "o"
columns = ["id", "customer_id", "placed_at"]
default_sort = { column = "placed_at", direction = "descending" }

[[table.joins]]
table = "customers"
local = "customer_id"
foreign = "id"

[[table]]
name = "customers"
alias = "c"
columns = ["id", "name"]
"#;

/// Returns one joined row for any statement.
struct SingleRow;

#[async_trait]
impl QueryBackend for SingleRow {
    fn dialect(&self) -> &dyn Dialect {
        &MySql
    }

    async fn fetch_rows(&self, _sql: &str, _params: Vec<Value>) -> Result<Vec<RowData>, DbError> {
        Ok(vec![RowData::new(
            "",
            vec![
                FieldValue::new("o_id", Value::Int(100)),
                FieldValue::new("o_customer_id", Value::Int(7)),
                FieldValue::new("c_id", Value::Int(7)),
                FieldValue::new("c_name", Value::from("Ada")),
                FieldValue::new(TOTAL_RESULTS, Value::Int(1)),
            ],
        )])
    }
}

fn write_tables(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_table_file_builds_joined_query() {
    let file = write_tables(TABLES);
    let tables = TableFile::from_file(file.path()).unwrap();
    let config = tables.config("orders", RowData::clone).unwrap();
    let view = TableView::new(config, Arc::new(SingleRow));

    let (sql, _) = render(&view.base_query(None, None), &MySql);
    assert_eq!(
        sql,
        concat!(
            "SELECT `o`.`id` AS `o_id`, `o`.`customer_id` AS `o_customer_id`, `o`.`placed_at` AS `o_placed_at`, ",
            "`c`.`id` AS `c_id`, `c`.`name` AS `c_name` FROM `orders` AS `o` ",
            "LEFT JOIN `customers` AS `c` ON (`o`.`customer_id` = `c`.`id`) ORDER BY `o`.`placed_at` DESC"
        )
    );
}

#[tokio::test]
async fn test_table_file_paginates_nested_records() {
    let file = write_tables(TABLES);
    let tables = TableFile::from_file(file.path()).unwrap();
    let config = tables
        .config("orders", |row: &RowData| nest_by_alias(row, &["o", "c"]))
        .unwrap();
    let view = TableView::new(config, Arc::new(SingleRow));

    let page = view
        .paginate(&Filter::All, PageRequest::default())
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.data[0]["o"]["id"], 100);
    assert_eq!(page.data[0]["c"]["id"], 7);
    assert_eq!(page.data[0]["c"]["name"], "Ada");
}

#[test]
fn test_missing_table_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = TableFile::from_file(dir.path().join("tables.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn test_malformed_table_file() {
    let file = write_tables("[[table]]\nname = 1\n");
    assert!(matches!(
        TableFile::from_file(file.path()),
        Err(ConfigError::Parse(_))
    ));
}
