use alloc::collections::VecDeque;

use crate::*;

/// Cells uncovered by clicking `clicked`: the cell itself plus everything reachable
/// through zero-count cells.
///
/// Already revealed and flagged cells are never part of the result, and the fill
/// does not pass through them. Calling this for an already revealed or flagged cell
/// yields an empty set.
///
/// # Panics
///
/// Panics when `clicked` lies outside the schema's matrix.
pub fn indexes_to_reveal(
    clicked: CellIndex,
    schema: &MinefieldSchema,
    revealed: &RevealedSet,
    marks: &MarksMap,
) -> RevealedSet {
    let matrix = schema.matrix();
    let mut result = RevealedSet::new();
    let mut to_visit = VecDeque::from([clicked]);

    while let Some(index) = to_visit.pop_front() {
        if result.contains(&index) || revealed.contains(&index) || is_flagged(marks, index) {
            continue;
        }

        result.insert(index);

        if schema[index].is_zero() {
            to_visit.extend(
                matrix
                    .indexes_around(index)
                    .filter(|around| !result.contains(around)),
            );
        }
    }

    log::trace!("Reveal from {clicked} uncovers {} cells", result.len());
    result
}

fn is_flagged(marks: &MarksMap, index: CellIndex) -> bool {
    matches!(marks.get(&index), Some(Mark::Flag))
}
