use crate::crawl::aggregate::{contribute, owner_of, Contribution, FragmentStore};
use crate::crawl::ancestry::AncestryResolver;
use crate::crawl::crawl_model::{CrawledPage, NodeFate};
use crate::crawl::materialize::materialize_all;
use crate::snapshot::snapshot_model::Snapshot;
use crate::snapshot::viewport::{place, Placement, ViewportBox, ViewportMetrics};

/// Turn one snapshot into the element list and buffer for this cycle.
///
/// Nodes are visited in index order, which is document order: ancestry is
/// resolved for every node before its placement is considered, so roots are
/// always known by the time their descendants contribute fragments.
pub fn crawl(snapshot: &Snapshot, metrics: &ViewportMetrics) -> CrawledPage {
    let viewport = ViewportBox::from_metrics(metrics);
    let mut anchors = AncestryResolver::anchors();
    let mut buttons = AncestryResolver::buttons();
    let mut store = FragmentStore::default();

    let mut fates = vec![NodeFate::Dropped; snapshot.node_count()];
    let mut candidates = Vec::new();

    for node in 0..snapshot.node_count() {
        let anchor = anchors.resolve(snapshot, node);
        let button = buttons.resolve(snapshot, node);

        let tag = snapshot.tag(node);
        let bounds = match place(&tag, snapshot.layout(node), &viewport) {
            Placement::Visible(bounds) => bounds,
            Placement::ExcludedTag => {
                fates[node] = NodeFate::ExcludedTag;
                continue;
            }
            Placement::NotRendered => {
                fates[node] = NodeFate::NotRendered;
                continue;
            }
            Placement::OutsideViewport => {
                fates[node] = NodeFate::OutsideViewport;
                continue;
            }
        };

        let owner = owner_of(anchor, button);
        match contribute(snapshot, node, bounds, owner, &mut store) {
            Contribution::Candidate(candidate) => candidates.push(candidate),
            Contribution::MergedInto(root) => fates[node] = NodeFate::MergedInto { root },
            Contribution::Separator => fates[node] = NodeFate::Dropped,
        }
    }

    let (buffer, placed) =
        materialize_all(candidates, &mut store, |node| snapshot.backend_node_id(node));

    for (node, id) in placed {
        fates[node] = match id {
            Some(id) => NodeFate::Emitted { id },
            None => NodeFate::Dropped,
        };
    }

    tracing::debug!(
        nodes = snapshot.node_count(),
        elements = buffer.len(),
        "crawled snapshot"
    );

    CrawledPage { buffer, fates }
}
