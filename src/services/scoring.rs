// SPDX-License-Identifier: MIT

//! Answer scoring.

use std::collections::HashMap;

/// Count submitted answers that match the correct choice.
///
/// Question ids not present in `correct` are ignored; unanswered
/// questions contribute nothing. No partial credit, no penalties.
pub fn score_answers(
    answers: &HashMap<String, String>,
    correct: &HashMap<String, String>,
) -> u32 {
    answers
        .iter()
        .filter(|&(qid, selected)| correct.get(qid.as_str()) == Some(selected))
        .count() as u32
}
