//! Cleaning rules for the Student, Job and Course record sets
//!
//! Rules run in a fixed order, since later filters read columns produced by
//! earlier coercions:
//!
//! 1. parse the student date of birth
//! 2. coerce time spent to a number
//! 3. coerce the job, course-count and career-path references to integers
//! 4. drop exact-duplicate jobs
//! 5. drop students without a job reference
//! 6. drop students missing a career path, time spent or course count
//! 7. split contact info into its sub-fields
//! 8. rename `uuid` to `student_id`
//! 9. drop jobs without a job reference and students without an id
//!
//! Courses pass through unchanged.

mod coerce;
mod contact;
mod jobs;
mod students;

pub use coerce::{to_date, to_integer, to_numeric};
pub use contact::ContactDecomposer;
pub use jobs::JobCleaner;
pub use students::StudentCleaner;

use crate::etl::{IdentityTransformer, Transformer};
use crate::model::{Cleaned, Tables, columns};
use crate::record::Table;

use eyre::Result;

/// Applies every cleaning rule to the three raw record sets
///
/// Pure: the output depends only on the input tables.
///
/// # Example
/// ```
/// use cademycode_etl::etl::Transformer;
/// use cademycode_etl::model::{Entity, Tables};
/// use cademycode_etl::record::{Cell, Table};
/// use cademycode_etl::transform::CleaningTransformer;
///
/// let students = Table::from_rows(
///     "cademycode_students",
///     ["uuid", "dob", "job_id", "time_spent_hrs", "num_course_taken", "current_career_path_id"],
///     vec![vec![
///         Cell::text("s1"),
///         Cell::text("1990-01-01"),
///         Cell::text("5"),
///         Cell::text("12.5"),
///         Cell::text("3"),
///         Cell::text("2"),
///     ]],
/// )
/// .unwrap();
/// let jobs = Table::from_rows("cademycode_student_jobs", ["job_id"], vec![]).unwrap();
/// let courses = Table::from_rows("cademycode_courses", ["career_path_id"], vec![]).unwrap();
///
/// let cleaned = CleaningTransformer::default()
///     .transform(Tables::new(students, jobs, courses))
///     .unwrap();
/// assert_eq!(cleaned.row_counts().get(Entity::Students), 1);
/// ```
pub struct CleaningTransformer {
    students: StudentCleaner,
    jobs: JobCleaner,
    courses: IdentityTransformer<Table>,
}

impl CleaningTransformer {
    /// Build a transformer splitting contact info into `contact_fields`
    pub fn with_contact_fields(contact_fields: Vec<String>) -> Self {
        Self {
            students: StudentCleaner::new(ContactDecomposer::new(
                columns::CONTACT_INFO,
                contact_fields,
            )),
            ..Self::default()
        }
    }
}

impl Default for CleaningTransformer {
    fn default() -> Self {
        Self {
            students: StudentCleaner::default(),
            jobs: JobCleaner,
            courses: IdentityTransformer::new(),
        }
    }
}

impl Transformer for CleaningTransformer {
    type Input = Tables;
    type Output = Cleaned;

    fn transform(&self, input: Self::Input) -> Result<Self::Output> {
        let Tables {
            mut students,
            mut jobs,
            courses,
        } = input;

        // Structural problems surface before any rule runs
        self.students.check_schema(&students)?;
        self.jobs.check_schema(&jobs)?;
        courses.require_column(columns::CAREER_PATH_ID)?;

        let mut trace = Vec::new();
        self.students.coerce(&mut students, &mut trace)?;
        self.jobs.dedupe(&mut jobs, &mut trace);
        self.students.filter(&mut students, &mut trace)?;
        self.jobs.filter(&mut jobs, &mut trace)?;
        let courses = self.courses.transform(courses)?;

        Ok(Cleaned {
            tables: Tables::new(students, jobs, courses),
            trace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Entity;
    use crate::record::Cell;

    fn raw() -> Tables {
        let students = Table::from_rows(
            "cademycode_students",
            [
                "uuid",
                "dob",
                "job_id",
                "time_spent_hrs",
                "num_course_taken",
                "current_career_path_id",
                "contact_info",
            ],
            vec![
                vec![
                    Cell::text("s1"),
                    Cell::text("1990-01-01"),
                    Cell::text("5"),
                    Cell::text("12.5"),
                    Cell::text("3"),
                    Cell::text("2"),
                    Cell::text("{'email':'a@x.com','phone':'123'}"),
                ],
                vec![
                    Cell::text("s2"),
                    Cell::text("1991-02-03"),
                    Cell::text("not_a_number"),
                    Cell::text("1"),
                    Cell::text("1"),
                    Cell::text("1"),
                    Cell::Null,
                ],
            ],
        )
        .unwrap();
        let job = || vec![Cell::Integer(1), Cell::text("A")];
        let jobs =
            Table::from_rows("cademycode_student_jobs", ["job_id", "title"], vec![job(), job()])
                .unwrap();
        let courses = Table::from_rows(
            "cademycode_courses",
            ["career_path_id", "career_path_name"],
            vec![vec![Cell::Integer(2), Cell::text("data science")]],
        )
        .unwrap();
        Tables::new(students, jobs, courses)
    }

    #[test]
    fn test_cleaning_all_tables() {
        let raw = raw();
        let courses = raw.courses.clone();
        let cleaned = CleaningTransformer::default().transform(raw).unwrap();

        assert_eq!(cleaned.row_counts().get(Entity::Students), 1);
        assert_eq!(cleaned.row_counts().get(Entity::Jobs), 1);
        assert_eq!(cleaned.tables.courses, courses);
    }

    #[test]
    fn test_trace_follows_rule_order() {
        let cleaned = CleaningTransformer::default().transform(raw()).unwrap();
        let rules: Vec<(Entity, &str)> = cleaned.trace.iter().map(|s| (s.entity, s.rule)).collect();

        assert_eq!(
            rules,
            vec![
                (Entity::Students, "parse date of birth"),
                (Entity::Students, "coerce time spent"),
                (Entity::Students, "coerce integer references"),
                (Entity::Jobs, "drop duplicate jobs"),
                (Entity::Students, "drop null job_id"),
                (Entity::Students, "drop incomplete rows"),
                (Entity::Students, "decompose contact info"),
                (Entity::Students, "drop null student_id"),
                (Entity::Jobs, "drop null job_id"),
            ]
        );
    }

    #[test]
    fn test_custom_contact_fields() {
        let transformer = CleaningTransformer::with_contact_fields(vec!["email".to_string()]);
        let cleaned = transformer.transform(raw()).unwrap();
        assert!(cleaned.tables.students.has_column("email"));
        assert!(!cleaned.tables.students.has_column("phone"));
    }

    #[test]
    fn test_course_without_career_path_id_is_schema_mismatch() {
        let mut tables = raw();
        tables.courses =
            Table::from_rows("cademycode_courses", ["id", "name"], vec![]).unwrap();

        let err = CleaningTransformer::default().transform(tables).unwrap_err();
        match err.downcast_ref::<crate::error::EtlError>() {
            Some(crate::error::EtlError::SchemaMismatch { column, .. }) => {
                assert_eq!(column, "career_path_id")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_job_schema_checked_before_students_change() {
        let mut tables = raw();
        tables.jobs = Table::from_rows("cademycode_student_jobs", ["title"], vec![]).unwrap();
        assert!(CleaningTransformer::default().transform(tables).is_err());
    }
}
