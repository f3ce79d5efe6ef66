//! The three entities moved by the pipeline and their well-known columns

use crate::record::Table;

use std::collections::BTreeMap;
use std::fmt;

/// Column names shared between the source schema and the cleaning rules
pub mod columns {
    pub const UUID: &str = "uuid";
    pub const STUDENT_ID: &str = "student_id";
    pub const DOB: &str = "dob";
    pub const TIME_SPENT_HRS: &str = "time_spent_hrs";
    pub const JOB_ID: &str = "job_id";
    pub const NUM_COURSE_TAKEN: &str = "num_course_taken";
    pub const CURRENT_CAREER_PATH_ID: &str = "current_career_path_id";
    pub const CONTACT_INFO: &str = "contact_info";
    pub const EMAIL: &str = "email";
    pub const PHONE: &str = "phone";
    pub const CAREER_PATH_ID: &str = "career_path_id";
}

/// One of the three record sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Entity {
    Students,
    Jobs,
    Courses,
}

impl Entity {
    pub const ALL: [Entity; 3] = [Entity::Students, Entity::Jobs, Entity::Courses];

    /// Name used in row-count reports
    pub fn name(self) -> &'static str {
        match self {
            Entity::Students => "cademycode_students",
            Entity::Jobs => "student_jobs",
            Entity::Courses => "courses",
        }
    }

    /// Table read from the source store
    pub fn source_table(self) -> &'static str {
        match self {
            Entity::Students => "cademycode_students",
            Entity::Jobs => "cademycode_student_jobs",
            Entity::Courses => "cademycode_courses",
        }
    }

    /// Table written to the sink, `<entity>_clean`
    pub fn clean_table(self) -> String {
        format!("{}_clean", self.name())
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The Student, Job and Course record sets of one run
#[derive(Debug, Clone, PartialEq)]
pub struct Tables {
    pub students: Table,
    pub jobs: Table,
    pub courses: Table,
}

impl Tables {
    pub fn new(students: Table, jobs: Table, courses: Table) -> Self {
        Self {
            students,
            jobs,
            courses,
        }
    }

    pub fn get(&self, entity: Entity) -> &Table {
        match entity {
            Entity::Students => &self.students,
            Entity::Jobs => &self.jobs,
            Entity::Courses => &self.courses,
        }
    }

    /// Each record set paired with its entity, in `Entity::ALL` order
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &Table)> {
        Entity::ALL.into_iter().map(move |e| (e, self.get(e)))
    }

    pub fn row_counts(&self) -> RowCounts {
        self.iter().map(|(e, t)| (e, t.len())).collect()
    }
}

/// Entity name → row count
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowCounts(BTreeMap<Entity, usize>);

impl RowCounts {
    pub fn get(&self, entity: Entity) -> usize {
        self.0.get(&entity).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Entity, usize)> + '_ {
        self.0.iter().map(|(e, n)| (*e, *n))
    }
}

impl FromIterator<(Entity, usize)> for RowCounts {
    fn from_iter<I: IntoIterator<Item = (Entity, usize)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for RowCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(e, n)| format!("{}: {}", e, n)).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

/// Outcome of one cleaning rule, for the per-rule trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleCount {
    pub entity: Entity,
    pub rule: &'static str,
    /// Rows remaining after the rule
    pub rows: usize,
    /// Non-null values the rule coerced to null
    pub nulled: usize,
}

impl fmt::Display for RuleCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}: {} rows", self.entity, self.rule, self.rows)?;
        if self.nulled > 0 {
            write!(f, ", {} value(s) nulled", self.nulled)?;
        }
        Ok(())
    }
}

/// Cleaned record sets plus the trace of how each rule shaped them
#[derive(Debug, Clone, PartialEq)]
pub struct Cleaned {
    pub tables: Tables,
    pub trace: Vec<RuleCount>,
}

impl Cleaned {
    pub fn row_counts(&self) -> RowCounts {
        self.tables.row_counts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Cell;

    #[test]
    fn test_table_names() {
        assert_eq!(Entity::Jobs.source_table(), "cademycode_student_jobs");
        assert_eq!(Entity::Students.clean_table(), "cademycode_students_clean");
        assert_eq!(Entity::Jobs.clean_table(), "student_jobs_clean");
        assert_eq!(Entity::Courses.clean_table(), "courses_clean");
    }

    #[test]
    fn test_row_counts_display() {
        let students = Table::from_rows("s", ["uuid"], vec![vec![Cell::text("a")]]).unwrap();
        let jobs = Table::new("j", vec!["job_id".to_string()]);
        let courses = Table::new("c", vec!["career_path_id".to_string()]);

        let counts = Tables::new(students, jobs, courses).row_counts();
        assert_eq!(counts.get(Entity::Students), 1);
        assert_eq!(
            counts.to_string(),
            "{cademycode_students: 1, student_jobs: 0, courses: 0}"
        );
    }
}
