//! Loads the cleaned record sets into the sink and the flat export

use crate::etl::Loader;
use crate::model::{Tables, columns};
use crate::record::Table;
use crate::storage::{CsvExport, SqliteSink};

use eyre::Result;

/// Joins Students with Jobs on `job_id`, then with Courses on the student's
/// career path
///
/// Both joins are left joins, so every student appears at least once and
/// unmatched job or course columns are null. Students repeat only if a
/// right-hand key is duplicated.
pub fn denormalize(tables: &Tables) -> Result<Table> {
    tables
        .students
        .left_join(&tables.jobs, columns::JOB_ID, columns::JOB_ID)?
        .left_join(
            &tables.courses,
            columns::CURRENT_CAREER_PATH_ID,
            columns::CAREER_PATH_ID,
        )
}

/// Writes each cleaned table to the SQLite sink, then the joined export
///
/// Tables are replaced one at a time. A failure on a later table leaves the
/// earlier ones written.
#[derive(Debug, Clone)]
pub struct CleanDataLoader {
    sink: SqliteSink,
    export: CsvExport,
}

impl CleanDataLoader {
    pub fn new(sink: SqliteSink, export: CsvExport) -> Self {
        Self { sink, export }
    }

    pub fn sink(&self) -> &SqliteSink {
        &self.sink
    }

    pub fn export(&self) -> &CsvExport {
        &self.export
    }

    /// Blocking write of all outputs; returns the number of exported rows
    pub fn write(&self, tables: &Tables) -> Result<usize> {
        let mut conn = self.sink.open()?;
        for (entity, table) in tables.iter() {
            let name = entity.clean_table();
            let rows = self.sink.replace_table(&mut conn, &name, table)?;
            log::debug!("Replaced {} with {} rows", name, rows);
        }
        self.sink.close(conn)?;

        let joined = denormalize(tables)?;
        self.export.write(&joined)
    }
}

impl Loader for CleanDataLoader {
    type Input = Tables;

    async fn load(&self, input: Self::Input) -> Result<usize> {
        let loader = self.clone();
        tokio::task::spawn_blocking(move || loader.write(&input)).await?
    }

    fn describe(&self) -> String {
        format!(
            "sqlite:{} + csv:{}",
            self.sink.path().display(),
            self.export.path().display()
        )
    }
}
