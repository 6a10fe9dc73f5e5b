use crate::crawl::aggregate::{Candidate, FragmentStore};
use crate::crawl::crawl_model::{
    ElementBuffer, ElementKind, ElementRecord, Fragment, MetaAttribute, Point,
};

/// Merge a candidate with the fragments it owns. Returns `None` when the
/// result has nothing worth showing.
pub fn materialize(candidate: Candidate, fragments: Vec<Fragment>) -> Option<ElementRecord> {
    let mut pieces: Vec<String> = candidate.value.into_iter().collect();
    let mut meta = candidate.meta;
    for fragment in fragments {
        match fragment {
            Fragment::Text(value) => pieces.push(value),
            Fragment::Attribute { key, value } => meta.push(MetaAttribute { key, value }),
        }
    }

    // One element is one line: whitespace runs (newlines included) collapse to a single space.
    let text = pieces
        .iter()
        .flat_map(|piece| piece.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ");

    let kind = ElementKind::from_tag(&candidate.tag, candidate.clickable);
    let button_with_meta = kind == ElementKind::Button && !meta.is_empty();
    if text.is_empty() && !kind.always_kept() && !button_with_meta {
        return None;
    }

    let bounds = candidate.bounds;
    Some(ElementRecord {
        id: 0,
        node_index: candidate.node,
        backend_node_id: None,
        kind,
        text,
        meta,
        clickable: candidate.clickable,
        origin: Point {
            x: bounds.x as i64,
            y: bounds.y as i64,
        },
        center: Point {
            x: (bounds.x + bounds.width / 2.0) as i64,
            y: (bounds.y + bounds.height / 2.0) as i64,
        },
    })
}

/// Materialize candidates in traversal order, assigning dense ids.
///
/// Each entry of the result pairs the candidate's node with its id, or `None`
/// if the candidate was dropped.
pub fn materialize_all(
    candidates: Vec<Candidate>,
    store: &mut FragmentStore,
    backend_id: impl Fn(usize) -> Option<i64>,
) -> (ElementBuffer, Vec<(usize, Option<usize>)>) {
    let mut buffer = ElementBuffer::default();
    let mut placed = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let node = candidate.node;
        let fragments = store.take(node);

        match materialize(candidate, fragments) {
            Some(mut record) => {
                record.backend_node_id = backend_id(node);
                let id = buffer.push(record);
                placed.push((node, Some(id)));
            }
            None => placed.push((node, None)),
        }
    }

    (buffer, placed)
}
