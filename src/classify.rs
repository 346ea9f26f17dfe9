//! Criterion classification by id prefix.
//!
//! `Doc..` criteria grade the documentation (exam part 1), everything else
//! grades the result (part 2). Mandatory criteria are the documentation ones
//! plus `A01`..`A12`. Matching is ASCII case-insensitive.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExamPart {
    Part1,
    Part2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Obligation {
    Mandatory,
    Optional,
}

fn has_doc_prefix(id: &str) -> bool {
    id.get(..3).is_some_and(|p| p.eq_ignore_ascii_case("doc"))
}

pub fn exam_part(id: &str) -> ExamPart {
    if has_doc_prefix(id) {
        ExamPart::Part1
    } else {
        ExamPart::Part2
    }
}

pub fn obligation(id: &str) -> Obligation {
    if has_doc_prefix(id) || is_core_a_criterion(id) {
        Obligation::Mandatory
    } else {
        Obligation::Optional
    }
}

/// `A01`..=`A12`, exactly three characters.
fn is_core_a_criterion(id: &str) -> bool {
    let b = id.as_bytes();
    if b.len() != 3 || !b[0].eq_ignore_ascii_case(&b'a') {
        return false;
    }
    if !b[1].is_ascii_digit() || !b[2].is_ascii_digit() {
        return false;
    }
    let n = (b[1] - b'0') * 10 + (b[2] - b'0');
    (1..=12).contains(&n)
}
