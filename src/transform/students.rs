//! Student record cleaning

use super::coerce::{to_date, to_integer, to_numeric};
use super::contact::ContactDecomposer;
use crate::etl::Transformer;
use crate::model::{Entity, RuleCount, columns};
use crate::record::Table;

use eyre::Result;

/// Columns the cleaning rules read; their absence is a schema mismatch
const REQUIRED: &[&str] = &[
    columns::UUID,
    columns::DOB,
    columns::TIME_SPENT_HRS,
    columns::JOB_ID,
    columns::NUM_COURSE_TAKEN,
    columns::CURRENT_CAREER_PATH_ID,
];

const INTEGER_COLUMNS: &[&str] = &[
    columns::JOB_ID,
    columns::NUM_COURSE_TAKEN,
    columns::CURRENT_CAREER_PATH_ID,
];

const COMPLETENESS_COLUMNS: &[&str] = &[
    columns::CURRENT_CAREER_PATH_ID,
    columns::TIME_SPENT_HRS,
    columns::NUM_COURSE_TAKEN,
];

/// Cleans the Student record set
///
/// Coerces the typed columns, drops incomplete rows, splits the contact
/// column and renames `uuid` to `student_id`. The rules run in two phases
/// so the composed transformer can interleave the Job deduplication
/// between them.
#[derive(Debug, Clone, Default)]
pub struct StudentCleaner {
    contact: ContactDecomposer,
}

impl StudentCleaner {
    pub fn new(contact: ContactDecomposer) -> Self {
        Self { contact }
    }

    /// Check every column the rules touch exists
    pub fn check_schema(&self, table: &Table) -> Result<()> {
        REQUIRED
            .iter()
            .try_for_each(|column| table.require_column(column).map(|_| ()))
    }

    /// Phase one: parse dates, numbers and integer references
    pub(crate) fn coerce(&self, table: &mut Table, trace: &mut Vec<RuleCount>) -> Result<()> {
        let nulled = table.map_column(columns::DOB, to_date)?;
        trace.push(step("parse date of birth", table, nulled));

        let nulled = table.map_column(columns::TIME_SPENT_HRS, to_numeric)?;
        trace.push(step("coerce time spent", table, nulled));

        let mut nulled = 0;
        for column in INTEGER_COLUMNS {
            nulled += table.map_column(column, to_integer)?;
        }
        trace.push(step("coerce integer references", table, nulled));

        Ok(())
    }

    /// Phase two: null filters, contact split, key rename
    pub(crate) fn filter(&self, table: &mut Table, trace: &mut Vec<RuleCount>) -> Result<()> {
        table.drop_nulls(&[columns::JOB_ID])?;
        trace.push(step("drop null job_id", table, 0));

        table.drop_nulls(COMPLETENESS_COLUMNS)?;
        trace.push(step("drop incomplete rows", table, 0));

        let rejected = self.contact.decompose(table)?;
        trace.push(step("decompose contact info", table, rejected));

        table.rename_column(columns::UUID, columns::STUDENT_ID)?;

        table.drop_nulls(&[columns::STUDENT_ID])?;
        trace.push(step("drop null student_id", table, 0));

        Ok(())
    }
}

fn step(rule: &'static str, table: &Table, nulled: usize) -> RuleCount {
    RuleCount {
        entity: Entity::Students,
        rule,
        rows: table.len(),
        nulled,
    }
}

impl Transformer for StudentCleaner {
    type Input = Table;
    type Output = (Table, Vec<RuleCount>);

    fn transform(&self, mut input: Self::Input) -> Result<Self::Output> {
        self.check_schema(&input)?;
        let mut trace = Vec::new();
        self.coerce(&mut input, &mut trace)?;
        self.filter(&mut input, &mut trace)?;
        Ok((input, trace))
    }
}
