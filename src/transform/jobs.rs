//! Job record cleaning

use crate::etl::Transformer;
use crate::model::{Entity, RuleCount, columns};
use crate::record::Table;

use eyre::Result;

/// Removes exact-duplicate Job rows and rows without a job reference
#[derive(Debug, Clone, Default)]
pub struct JobCleaner;

impl JobCleaner {
    pub fn check_schema(&self, table: &Table) -> Result<()> {
        table.require_column(columns::JOB_ID).map(|_| ())
    }

    pub(crate) fn dedupe(&self, table: &mut Table, trace: &mut Vec<RuleCount>) {
        table.drop_duplicates();
        trace.push(step("drop duplicate jobs", table));
    }

    pub(crate) fn filter(&self, table: &mut Table, trace: &mut Vec<RuleCount>) -> Result<()> {
        table.drop_nulls(&[columns::JOB_ID])?;
        trace.push(step("drop null job_id", table));
        Ok(())
    }
}

fn step(rule: &'static str, table: &Table) -> RuleCount {
    RuleCount {
        entity: Entity::Jobs,
        rule,
        rows: table.len(),
        nulled: 0,
    }
}

impl Transformer for JobCleaner {
    type Input = Table;
    type Output = (Table, Vec<RuleCount>);

    fn transform(&self, mut input: Self::Input) -> Result<Self::Output> {
        self.check_schema(&input)?;
        let mut trace = Vec::new();
        self.dedupe(&mut input, &mut trace);
        self.filter(&mut input, &mut trace)?;
        Ok((input, trace))
    }
}
