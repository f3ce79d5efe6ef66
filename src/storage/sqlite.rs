//! SQLite source and sink

use crate::error::EtlError;
use crate::etl::Extractor;
use crate::model::{Entity, Tables};
use crate::record::{Cell, Table};

use eyre::{Result, ensure};
use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use rusqlite::{Connection, OpenFlags, params_from_iter};
use std::path::{Path, PathBuf};

impl From<Value> for Cell {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Cell::Null,
            Value::Integer(i) => Cell::Integer(i),
            Value::Real(f) => Cell::Real(f),
            Value::Text(s) => Cell::Text(s),
            Value::Blob(b) => Cell::Blob(b),
        }
    }
}

/// Dates are stored as `YYYY-MM-DD` text
impl ToSql for Cell {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Cell::Null => ToSqlOutput::Owned(Value::Null),
            Cell::Integer(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            Cell::Real(f) => ToSqlOutput::Owned(Value::Real(*f)),
            Cell::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Cell::Date(d) => ToSqlOutput::Owned(Value::Text(d.format("%Y-%m-%d").to_string())),
            Cell::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Column affinity for the values actually present
fn sql_type<'a>(cells: impl Iterator<Item = &'a Cell>) -> &'static str {
    let mut found: Option<&'static str> = None;
    for cell in cells {
        let ty = match cell {
            Cell::Null => continue,
            Cell::Integer(_) => "INTEGER",
            Cell::Real(_) => "REAL",
            Cell::Text(_) => "TEXT",
            Cell::Date(_) => "TIMESTAMP",
            Cell::Blob(_) => "BLOB",
        };
        found = Some(match (found, ty) {
            (None, ty) => ty,
            (Some(prev), ty) if prev == ty => ty,
            (Some("INTEGER"), "REAL") | (Some("REAL"), "INTEGER") => "REAL",
            _ => "TEXT",
        });
    }
    found.unwrap_or("TEXT")
}

/// Read-only SQLite source holding the raw record sets
///
/// # Example
/// ```no_run
/// use cademycode_etl::storage::SqliteSource;
///
/// let tables = SqliteSource::new("cademycode.db").read().unwrap();
/// println!("{}", tables.row_counts());
/// ```
#[derive(Debug, Clone)]
pub struct SqliteSource {
    path: PathBuf,
}

impl SqliteSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn source_error(&self, reason: impl ToString) -> EtlError {
        EtlError::source_access(self.path.display().to_string(), reason)
    }

    /// Read every row of one table
    ///
    /// # Errors
    /// Returns [`EtlError::SourceAccess`] if the table does not exist or a
    /// row cannot be read
    pub fn read_table(&self, conn: &Connection, table: &str) -> Result<Table> {
        let sql = format!("SELECT * FROM {}", quote_ident(table));
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| self.source_error(format!("table '{}': {}", table, e)))?;

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let rows = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|i| row.get::<_, Value>(i).map(Cell::from))
                    .collect::<rusqlite::Result<Vec<Cell>>>()
            })
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(|e| self.source_error(format!("table '{}': {}", table, e)))?;

        Table::from_rows(table, columns, rows)
    }

    /// Read the Student, Job and Course tables in full
    ///
    /// The connection is closed before returning, on success or failure.
    ///
    /// # Errors
    /// Returns [`EtlError::SourceAccess`] if the database cannot be opened or
    /// any table is missing
    pub fn read(&self) -> Result<Tables> {
        let conn = Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| self.source_error(e))?;

        let students = self.read_table(&conn, Entity::Students.source_table())?;
        let jobs = self.read_table(&conn, Entity::Jobs.source_table())?;
        let courses = self.read_table(&conn, Entity::Courses.source_table())?;

        conn.close().map_err(|(_, e)| self.source_error(e))?;

        Ok(Tables::new(students, jobs, courses))
    }
}

impl Extractor for SqliteSource {
    type Output = Tables;

    async fn extract(&self) -> Result<Self::Output> {
        let source = self.clone();
        tokio::task::spawn_blocking(move || source.read()).await?
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }
}

/// SQLite sink receiving the cleaned record sets
#[derive(Debug, Clone)]
pub struct SqliteSink {
    path: PathBuf,
}

impl SqliteSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sink_error(&self, table: &str, reason: impl ToString) -> EtlError {
        EtlError::sink_write(format!("{}:{}", self.path.display(), table), reason)
    }

    /// Open the sink, creating the database file if needed
    pub fn open(&self) -> Result<Connection> {
        Connection::open(&self.path).map_err(|e| {
            EtlError::sink_write(self.path.display().to_string(), e).into()
        })
    }

    pub fn close(&self, conn: Connection) -> Result<()> {
        conn.close()
            .map_err(|(_, e)| EtlError::sink_write(self.path.display().to_string(), e).into())
    }

    /// Drop `name` if it exists and recreate it holding exactly `table`
    ///
    /// The replacement is atomic per table. Tables replaced by earlier calls
    /// are unaffected if this one fails.
    ///
    /// Returns the number of rows written.
    pub fn replace_table(&self, conn: &mut Connection, name: &str, table: &Table) -> Result<usize> {
        ensure!(
            !table.columns().is_empty(),
            self.sink_error(name, "table has no columns")
        );

        let quoted = quote_ident(name);
        let definitions: Vec<String> = table
            .columns()
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let ty = sql_type(table.rows().iter().map(|row| &row[i]));
                format!("{} {}", quote_ident(column), ty)
            })
            .collect();
        let placeholders = vec!["?"; table.columns().len()].join(", ");

        let write = |conn: &mut Connection| -> rusqlite::Result<()> {
            let tx = conn.transaction()?;
            tx.execute_batch(&format!(
                "DROP TABLE IF EXISTS {quoted}; CREATE TABLE {quoted} ({});",
                definitions.join(", ")
            ))?;
            {
                let mut insert =
                    tx.prepare(&format!("INSERT INTO {quoted} VALUES ({placeholders})"))?;
                for row in table.rows() {
                    insert.execute(params_from_iter(row.iter()))?;
                }
            }
            tx.commit()
        };

        write(conn).map_err(|e| self.sink_error(name, e))?;
        Ok(table.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn seed(path: &Path) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE cademycode_students (uuid TEXT, dob TEXT, job_id TEXT);
            INSERT INTO cademycode_students VALUES ('s1', '1990-01-01', '5');
            INSERT INTO cademycode_students VALUES ('s2', NULL, 'x');
            CREATE TABLE cademycode_student_jobs (job_id INTEGER, avg_salary REAL);
            INSERT INTO cademycode_student_jobs VALUES (5, 86000.0);
            CREATE TABLE cademycode_courses (career_path_id INTEGER, career_path_name TEXT);
            "#,
        )
        .unwrap();
    }

    #[test]
    fn test_read_all_tables() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("source.db");
        seed(&path);

        let tables = SqliteSource::new(&path).read().unwrap();

        assert_eq!(tables.students.columns(), ["uuid", "dob", "job_id"]);
        assert_eq!(tables.students.len(), 2);
        assert_eq!(tables.students.get(1, "dob"), Some(&Cell::Null));
        assert_eq!(tables.jobs.get(0, "avg_salary"), Some(&Cell::Real(86000.0)));
        assert!(tables.courses.is_empty());
    }

    #[test]
    fn test_missing_database_is_source_access() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.db");

        let err = SqliteSource::new(&path).read().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EtlError>(),
            Some(EtlError::SourceAccess { .. })
        ));
        // Read-only open never creates the file
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_table_is_source_access() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.db");
        Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE cademycode_students (uuid TEXT);")
            .unwrap();

        let err = SqliteSource::new(&path).read().unwrap_err();
        match err.downcast_ref::<EtlError>() {
            Some(EtlError::SourceAccess { reason, .. }) => {
                assert!(reason.contains("cademycode_student_jobs"))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_extract() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("source.db");
        seed(&path);

        let tables = SqliteSource::new(&path).extract().await.unwrap();
        assert_eq!(tables.row_counts().get(Entity::Jobs), 1);
    }

    #[test]
    fn test_replace_table_overwrites() {
        let dir = TempDir::new().unwrap();
        let sink = SqliteSink::new(dir.path().join("sink.db"));
        let mut conn = sink.open().unwrap();

        let first = Table::from_rows(
            "t",
            ["id", "dob"],
            vec![
                vec![Cell::Integer(1), Cell::Date(NaiveDate::from_ymd_opt(1990, 1, 1).unwrap())],
                vec![Cell::Integer(2), Cell::Null],
            ],
        )
        .unwrap();
        let second = Table::from_rows("t", ["name"], vec![vec![Cell::text("only")]]).unwrap();

        assert_eq!(sink.replace_table(&mut conn, "things_clean", &first).unwrap(), 2);
        let dob: String = conn
            .query_row("SELECT dob FROM things_clean WHERE id = 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(dob, "1990-01-01");

        sink.replace_table(&mut conn, "things_clean", &second).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM things_clean", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
        let name: String = conn
            .query_row("SELECT name FROM things_clean", [], |r| r.get(0))
            .unwrap();
        assert_eq!(name, "only");
    }

    #[test]
    fn test_unwritable_sink() {
        let dir = TempDir::new().unwrap();
        let sink = SqliteSink::new(dir.path().join("missing_dir").join("sink.db"));
        let err = sink.open().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EtlError>(),
            Some(EtlError::SinkWrite { .. })
        ));
    }

    #[test]
    fn test_sql_type_inference() {
        let cells = [Cell::Integer(1), Cell::Null, Cell::Real(2.5)];
        assert_eq!(sql_type(cells.iter()), "REAL");
        assert_eq!(sql_type([Cell::Null].iter()), "TEXT");
        assert_eq!(sql_type([Cell::Integer(1), Cell::text("a")].iter()), "TEXT");
        assert_eq!(sql_type([Cell::Integer(1)].iter()), "INTEGER");
    }
}
