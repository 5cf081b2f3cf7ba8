use crate::error::DbError;
use std::collections::BTreeMap;
use std::path::Path;

const QUERY_MARKER: &str = "-- Query name:";
const BUNDLED_QUERIES: &str = include_str!("../queries/sales.sql");

/// Named, parameterless, read-only SQL queries.
///
/// Loaded once at startup and never modified afterwards.
#[derive(Debug, Clone, Default)]
pub struct QueryCatalog {
    queries: BTreeMap<String, String>,
}

impl QueryCatalog {
    /// Parses a SQL script in which every query is introduced by a
    /// `-- Query name: <name>` line. Text before the first marker is ignored.
    pub fn parse(script: &str) -> Result<Self, DbError> {
        let mut queries = BTreeMap::new();
        let mut current: Option<(String, Vec<&str>)> = None;

        for line in script.lines() {
            if let Some(name) = line.trim_start().strip_prefix(QUERY_MARKER) {
                if let Some((name, body)) = current.take() {
                    insert_query(&mut queries, name, &body)?;
                }
                current = Some((name.trim().to_string(), Vec::new()));
            } else if let Some((_, body)) = current.as_mut() {
                body.push(line);
            }
        }
        if let Some((name, body)) = current.take() {
            insert_query(&mut queries, name, &body)?;
        }

        Ok(Self { queries })
    }

    /// Reads and parses a catalog file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let path = path.as_ref();
        let script = std::fs::read_to_string(path).map_err(|source| DbError::CatalogIo {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::parse(&script)?;
        tracing::info!(path = %path.display(), queries = catalog.len(), "Loaded query catalog.");
        Ok(catalog)
    }

    /// The catalog shipped with this crate (`queries/sales.sql`).
    pub fn bundled() -> Result<Self, DbError> {
        Self::parse(BUNDLED_QUERIES)
    }

    pub fn lookup(&self, name: &str) -> Result<&str, DbError> {
        self.queries
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| DbError::UnknownQuery(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.queries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.queries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

fn insert_query(
    queries: &mut BTreeMap<String, String>,
    name: String,
    body: &[&str],
) -> Result<(), DbError> {
    if name.is_empty() {
        return Err(DbError::InvalidCatalog("query marker without a name".to_string()));
    }
    let sql = body.join("\n").trim().to_string();
    if sql.is_empty() {
        return Err(DbError::InvalidCatalog(format!("query '{name}' has no SQL text")));
    }
    if queries.contains_key(&name) {
        return Err(DbError::InvalidCatalog(format!("query '{name}' is defined twice")));
    }
    queries.insert(name, sql);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_sections() {
        let script = "-- header comment\n\
                      -- Query name: first\n\
                      SELECT 1\n\
                      \n\
                      -- Query name:  second \n\
                      SELECT a,\n  b FROM t\n";
        let catalog = QueryCatalog::parse(script).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.lookup("first").unwrap(), "SELECT 1");
        assert_eq!(catalog.lookup("second").unwrap(), "SELECT a,\n  b FROM t");
    }

    #[test]
    fn unknown_name_is_an_error() {
        let catalog = QueryCatalog::parse("-- Query name: only\nSELECT 1").unwrap();
        assert!(matches!(catalog.lookup("missing"), Err(DbError::UnknownQuery(name)) if name == "missing"));
    }

    #[test]
    fn rejects_empty_and_duplicate_queries() {
        assert!(matches!(
            QueryCatalog::parse("-- Query name: empty\n\n-- Query name: next\nSELECT 1"),
            Err(DbError::InvalidCatalog(_))
        ));
        assert!(matches!(
            QueryCatalog::parse("-- Query name: q\nSELECT 1\n-- Query name: q\nSELECT 2"),
            Err(DbError::InvalidCatalog(_))
        ));
    }

    #[test]
    fn bundled_catalog_defines_every_report_query() {
        let catalog = QueryCatalog::bundled().unwrap();
        for name in [
            "product_sales_summary",
            "event_sales_summary",
            "group_sales_summary",
            "group_a_amounts",
            "group_b_amounts",
            "group_c_amounts",
            "group_d_amounts",
            "monthly_purchases",
            "avg_purchase_by_ui_and_desc",
            "avg_purchase_by_product_ui_desc",
        ] {
            assert!(catalog.contains(name), "missing {name}");
        }
    }
}
