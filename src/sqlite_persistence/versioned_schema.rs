use crate::error::{EtlError, Result};
use rusqlite::{params, Connection};

#[macro_export]
macro_rules! sqlite_column {
    ($name:expr, $sql_type:expr $(, $field:ident = $value:expr)*) => {
        {
            // Only mutated when optional field assignments are passed
            #[allow(unused_mut)]
            let mut column = Column {
                name: $name,
                sql_type: $sql_type,
                is_primary_key: false,
                non_null: false,
            };
            $(
                column.$field = $value;
            )*
            column
        }
    };
}

#[derive(Debug, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
    Real,
}

impl SqlType {
    fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
        }
    }
}

pub struct Column<'a, S: AsRef<str>> {
    pub name: S,
    pub sql_type: &'a SqlType,
    pub is_primary_key: bool,
    pub non_null: bool,
}

pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column<'static, &'static str>],
    pub indices: &'static [(&'static str, &'static str)],
    pub unique_constraints: &'static [&'static [&'static str]],
}

impl Table {
    pub fn create_sql(&self) -> String {
        let mut create_sql = format!("CREATE TABLE IF NOT EXISTS {} (", self.name);
        for (column_index, column) in self.columns.iter().enumerate() {
            if column_index > 0 {
                create_sql.push_str(", ");
            }
            create_sql.push_str(&format!("{} {}", column.name, column.sql_type.as_sql()));
            if column.is_primary_key {
                create_sql.push_str(" PRIMARY KEY");
            }
            if column.non_null {
                create_sql.push_str(" NOT NULL");
            }
        }

        for unique_constraint in self.unique_constraints {
            create_sql.push_str(&format!(", UNIQUE ({})", unique_constraint.join(", ")));
        }
        create_sql.push_str(");");
        create_sql
    }

    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {};", self.name)
    }

    pub fn create(&self, conn: &Connection) -> Result<()> {
        conn.execute(&self.create_sql(), params![])?;

        for (index_name, column_name) in self.indices {
            conn.execute(
                &format!(
                    "CREATE INDEX IF NOT EXISTS {} ON {}({});",
                    index_name, self.name, column_name
                ),
                params![],
            )?;
        }
        Ok(())
    }

    fn validate(&self, conn: &Connection) -> Result<()> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", self.name))?;
        let raw_columns = stmt
            .query_map(params![], |row| {
                Ok((
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i32>(3)? == 1,
                    row.get::<_, i32>(5)? == 1,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut actual_columns: Vec<Column<'_, String>> = Vec::with_capacity(raw_columns.len());
        for (name, declared_type, non_null, is_primary_key) in raw_columns {
            let sql_type = match declared_type.to_ascii_uppercase().as_str() {
                "TEXT" => &SqlType::Text,
                "INTEGER" => &SqlType::Integer,
                "REAL" => &SqlType::Real,
                _ => {
                    return Err(EtlError::Schema(format!(
                        "Table {} column {} has unsupported type {}",
                        self.name, name, declared_type
                    )))
                }
            };
            actual_columns.push(Column {
                name,
                sql_type,
                non_null,
                is_primary_key,
            });
        }

        if actual_columns.is_empty() {
            return Err(EtlError::Schema(format!("Table {} is missing", self.name)));
        }

        if actual_columns.len() != self.columns.len() {
            return Err(EtlError::Schema(format!(
                "Table {} has {} columns, expected {}. Found column names: {}, expected: {}",
                self.name,
                actual_columns.len(),
                self.columns.len(),
                actual_columns
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                self.columns
                    .iter()
                    .map(|c| c.name)
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        for (actual, expected) in actual_columns.iter().zip(self.columns.iter()) {
            if actual.name != expected.name {
                return Err(EtlError::Schema(format!(
                    "Table {} column name mismatch: expected {}, got {}",
                    self.name, expected.name, actual.name
                )));
            }
            if actual.sql_type != expected.sql_type {
                return Err(EtlError::Schema(format!(
                    "Table {} column {} type mismatch: expected {:?}, got {:?}",
                    self.name, expected.name, expected.sql_type, actual.sql_type
                )));
            }
            if actual.non_null != expected.non_null {
                return Err(EtlError::Schema(format!(
                    "Table {} column {} non-null mismatch: expected {}, got {}",
                    self.name, expected.name, expected.non_null, actual.non_null
                )));
            }
            if actual.is_primary_key != expected.is_primary_key {
                return Err(EtlError::Schema(format!(
                    "Table {} column {} primary key mismatch: expected {}, got {}",
                    self.name, expected.name, expected.is_primary_key, actual.is_primary_key
                )));
            }
        }

        for (index_name, _column) in self.indices {
            let index_exists: bool = conn
                .query_row(
                    "SELECT 1 FROM sqlite_master WHERE type='index' AND name=?1 AND tbl_name=?2",
                    params![index_name, self.name],
                    |_| Ok(true),
                )
                .unwrap_or(false);

            if !index_exists {
                return Err(EtlError::Schema(format!(
                    "Table {} is missing index '{}'",
                    self.name, index_name
                )));
            }
        }

        if !self.unique_constraints.is_empty() {
            // SQLite keeps unique constraints as indices flagged unique in index_list
            let mut stmt = conn.prepare(&format!("PRAGMA index_list({})", self.name))?;
            let unique_indices: Vec<String> = stmt
                .query_map([], |row| {
                    let name: String = row.get(1)?;
                    let is_unique: i32 = row.get(2)?;
                    Ok((name, is_unique))
                })?
                .filter_map(|r| r.ok())
                .filter(|(_, is_unique)| *is_unique == 1)
                .map(|(name, _)| name)
                .collect();

            let mut unique_index_columns: Vec<Vec<String>> = Vec::new();
            for index_name in &unique_indices {
                let mut idx_stmt = conn.prepare(&format!("PRAGMA index_info({})", index_name))?;
                let mut cols: Vec<String> = idx_stmt
                    .query_map([], |row| row.get::<_, String>(2))?
                    .filter_map(|r| r.ok())
                    .collect();
                cols.sort();
                unique_index_columns.push(cols);
            }

            for expected_columns in self.unique_constraints {
                let mut expected_sorted: Vec<&str> = expected_columns.to_vec();
                expected_sorted.sort();

                let found = unique_index_columns.iter().any(|actual_cols| {
                    actual_cols.iter().map(|s| s.as_str()).collect::<Vec<_>>() == expected_sorted
                });

                if !found {
                    return Err(EtlError::Schema(format!(
                        "Table {} is missing unique constraint on columns ({})",
                        self.name,
                        expected_columns.join(", ")
                    )));
                }
            }
        }
        Ok(())
    }
}

pub struct VersionedSchema {
    pub version: usize,
    pub tables: &'static [Table],
}

impl VersionedSchema {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            table.create(conn)?;
        }
        conn.pragma_update(None, "user_version", (BASE_DB_VERSION + self.version) as i64)?;
        Ok(())
    }

    /// Drops every table of this schema, in reverse declaration order.
    pub fn drop(&self, conn: &Connection) -> Result<()> {
        for table in self.tables.iter().rev() {
            conn.execute(&table.drop_sql(), params![])?;
        }
        conn.pragma_update(None, "user_version", 0i64)?;
        Ok(())
    }

    pub fn validate(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            table.validate(conn)?;
        }
        Ok(())
    }
}

pub const BASE_DB_VERSION: usize = 99999;
