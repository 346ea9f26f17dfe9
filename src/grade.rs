//! Grade computation.
//!
//! Each criterion resolves to a quality level 0..=3 from its checkmarks and
//! the per-level gates. Criteria are split into the two exam parts by id
//! prefix and each part is graded on its own:
//!
//!   grade = total_quality_level / (3 * criteria) * 5 + 1
//!
//! An empty part is graded 6.0. Grades and averages are rounded to two
//! decimals.

use tracing::{debug, instrument};

use crate::classify::{exam_part, ExamPart};
use crate::domain::{Criterion, CriterionGrade, GradeDetails, GradeResult, QualityLevelSpec};

pub const MAX_QUALITY_LEVEL: u8 = 3;
const EMPTY_PART_GRADE: f64 = 6.0;

/// Quality level reached by one criterion. First match wins:
/// everything checked -> 3, then the "2" gate, then the "1" gate, else 0.
pub fn resolve_quality_level(criterion: &Criterion) -> u8 {
    let checked = criterion.checked.len();
    // Count comparison only; out-of-range indexes still count.
    if checked >= criterion.requirements.len() {
        return MAX_QUALITY_LEVEL;
    }
    for (key, level) in [("2", 2), ("1", 1)] {
        if let Some(spec) = criterion.quality_levels.get(key) {
            if meets_level(criterion, spec) {
                return level;
            }
        }
    }
    0
}

/// Both gates must hold: every required index is checked, and enough are.
fn meets_level(criterion: &Criterion, spec: &QualityLevelSpec) -> bool {
    spec.required_indexes.is_subset(&criterion.checked)
        && criterion.checked.len() >= spec.min_requirements as usize
}

#[instrument(level = "debug", skip_all, fields(criteria = criteria.len()))]
pub fn calculate_grade(criteria: &[Criterion]) -> GradeResult {
    let (part1, part2): (Vec<&Criterion>, Vec<&Criterion>) = criteria
        .iter()
        .partition(|c| exam_part(&c.id) == ExamPart::Part1);

    let result = GradeResult {
        part1: grade_details(&part1),
        part2: grade_details(&part2),
    };
    debug!(
        target: "grade",
        part1 = result.part1.grade,
        part2 = result.part2.grade,
        "grade computed"
    );
    result
}

fn grade_details(criteria: &[&Criterion]) -> GradeDetails {
    let criterion_grades: Vec<CriterionGrade> = criteria
        .iter()
        .map(|c| CriterionGrade {
            criterion_id: c.id.clone(),
            criterion_title: c.title.clone(),
            quality_level: resolve_quality_level(c),
        })
        .collect();

    let total: u32 = criterion_grades.iter().map(|g| u32::from(g.quality_level)).sum();
    let count = criterion_grades.len();
    let max = u32::from(MAX_QUALITY_LEVEL) * count as u32;

    let average_quality_level = if count > 0 {
        round2(f64::from(total) / count as f64)
    } else {
        0.0
    };
    let grade = if max > 0 {
        round2(f64::from(total) / f64::from(max) * 5.0 + 1.0)
    } else {
        EMPTY_PART_GRADE
    };

    GradeDetails {
        grade,
        average_quality_level,
        criterion_grades,
    }
}

/// Two decimals, ties away from zero.
fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use super::*;

    fn level(min: u32, required: &[u32]) -> QualityLevelSpec {
        QualityLevelSpec {
            description: String::new(),
            min_requirements: min,
            required_indexes: required.iter().copied().collect(),
        }
    }

    fn criterion(
        id: &str,
        requirements: usize,
        checked: &[u32],
        levels: &[(&str, QualityLevelSpec)],
    ) -> Criterion {
        Criterion {
            id: id.into(),
            title: format!("{id} title"),
            question: String::new(),
            requirements: (1..=requirements).map(|i| format!("Req{i}")).collect(),
            checked: checked.iter().copied().collect::<BTreeSet<u32>>(),
            quality_levels: levels
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<BTreeMap<_, _>>(),
            notes: String::new(),
        }
    }

    fn reference_fixture() -> Vec<Criterion> {
        vec![
            criterion("A01", 4, &[1, 2, 3, 4], &[("2", level(3, &[])), ("1", level(2, &[]))]),
            criterion("A15", 5, &[1, 3, 4, 5], &[("2", level(4, &[2])), ("1", level(2, &[]))]),
            criterion("Doc01", 4, &[1, 2, 3], &[("2", level(3, &[])), ("1", level(2, &[]))]),
            criterion("Doc02", 5, &[1], &[("2", level(4, &[2])), ("1", level(2, &[]))]),
        ]
    }

    #[test]
    fn all_checked_is_level_three() {
        let c = criterion("A01", 3, &[1, 2, 3], &[("2", level(2, &[1, 2])), ("1", level(1, &[1]))]);
        assert_eq!(resolve_quality_level(&c), 3);

        // Gates don't matter once every requirement is checked.
        let c = criterion("A01", 3, &[1, 2, 3], &[("2", level(9, &[7])), ("1", level(9, &[8]))]);
        assert_eq!(resolve_quality_level(&c), 3);
    }

    #[test]
    fn level_two_and_one_gates() {
        let levels = [("2", level(2, &[1, 2])), ("1", level(1, &[1]))];
        assert_eq!(resolve_quality_level(&criterion("A01", 3, &[1, 2], &levels)), 2);
        assert_eq!(resolve_quality_level(&criterion("A01", 3, &[1], &levels)), 1);
    }

    #[test]
    fn no_gate_met_is_level_zero() {
        let levels = [("2", level(3, &[1, 2, 3])), ("1", level(2, &[]))];
        assert_eq!(resolve_quality_level(&criterion("A01", 4, &[1], &levels)), 0);
    }

    #[test]
    fn count_without_required_index_blocks_level_two() {
        let c = criterion("A15", 5, &[1, 3, 4, 5], &[("2", level(4, &[2])), ("1", level(2, &[]))]);
        assert_eq!(resolve_quality_level(&c), 1);
    }

    #[test]
    fn required_index_without_count_blocks_level() {
        let c = criterion("A15", 5, &[2], &[("2", level(4, &[2])), ("1", level(2, &[2]))]);
        assert_eq!(resolve_quality_level(&c), 0);
    }

    #[test]
    fn missing_level_key_falls_through() {
        let c = criterion("A01", 4, &[1, 2, 3], &[("1", level(1, &[]))]);
        assert_eq!(resolve_quality_level(&c), 1);
        let c = criterion("A01", 4, &[1, 2, 3], &[]);
        assert_eq!(resolve_quality_level(&c), 0);
    }

    #[test]
    fn out_of_range_indexes_still_count_toward_level_three() {
        let c = criterion("A01", 2, &[5, 6], &[]);
        assert_eq!(resolve_quality_level(&c), 3);
    }

    #[test]
    fn reference_fixture_grades() {
        let result = calculate_grade(&reference_fixture());

        assert_eq!(result.part1.grade, 2.67);
        assert_eq!(result.part1.average_quality_level, 1.0);
        assert_eq!(result.part2.grade, 4.33);
        assert_eq!(result.part2.average_quality_level, 2.0);

        let part1: Vec<(&str, u8)> = result
            .part1
            .criterion_grades
            .iter()
            .map(|g| (g.criterion_id.as_str(), g.quality_level))
            .collect();
        assert_eq!(part1, vec![("Doc01", 2), ("Doc02", 0)]);

        let part2: Vec<(&str, u8)> = result
            .part2
            .criterion_grades
            .iter()
            .map(|g| (g.criterion_id.as_str(), g.quality_level))
            .collect();
        assert_eq!(part2, vec![("A01", 3), ("A15", 1)]);
        assert_eq!(result.part2.criterion_grades[0].criterion_title, "A01 title");
    }

    #[test]
    fn empty_part_gets_fixed_grade() {
        let only_docs: Vec<Criterion> = reference_fixture()
            .into_iter()
            .filter(|c| c.id.starts_with("Doc"))
            .collect();
        let result = calculate_grade(&only_docs);
        assert_eq!(result.part2.grade, 6.0);
        assert_eq!(result.part2.average_quality_level, 0.0);
        assert!(result.part2.criterion_grades.is_empty());

        let result = calculate_grade(&[]);
        assert_eq!(result.part1.grade, 6.0);
        assert_eq!(result.part2.grade, 6.0);
    }

    #[test]
    fn grade_scale_endpoints() {
        let full = vec![criterion("A01", 2, &[1, 2], &[]), criterion("A02", 1, &[1], &[])];
        assert_eq!(calculate_grade(&full).part2.grade, 6.0);

        let none = vec![criterion("A01", 2, &[], &[]), criterion("A02", 1, &[], &[])];
        let part2 = calculate_grade(&none).part2;
        assert_eq!(part2.grade, 1.0);
        assert_eq!(part2.average_quality_level, 0.0);
    }

    #[test]
    fn lowercase_doc_prefix_lands_in_part_one() {
        let criteria = vec![criterion("doc09", 1, &[1], &[])];
        let result = calculate_grade(&criteria);
        assert_eq!(result.part1.criterion_grades.len(), 1);
        assert!(result.part2.criterion_grades.is_empty());
    }

    #[test]
    fn repeated_calls_are_identical() {
        let criteria = reference_fixture();
        let a = serde_json::to_string(&calculate_grade(&criteria)).unwrap();
        let b = serde_json::to_string(&calculate_grade(&criteria)).unwrap();
        assert_eq!(a, b);
    }
}
