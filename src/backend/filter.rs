//! Student search

use crate::backend::types::Student;

/// Students whose name or remarks contain `term` (case-insensitive) or whose
/// phone number contains it verbatim. A blank term keeps everyone.
pub fn filter_students<'a>(students: &'a [Student], term: &str) -> Vec<&'a Student> {
    let term = term.trim();
    if term.is_empty() {
        return students.iter().collect();
    }

    let needle = term.to_lowercase();
    students
        .iter()
        .filter(|student| {
            student.name.to_lowercase().contains(&needle)
                || student.tel.as_deref().is_some_and(|tel| tel.contains(term))
                || student
                    .remarks
                    .as_deref()
                    .is_some_and(|remarks| remarks.to_lowercase().contains(&needle))
        })
        .collect()
}
