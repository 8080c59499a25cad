//! Property tests for compiled order validity over random acyclic graphs

mod common;

use common::builders::{ModelFixture, RecordingOp};
use proptest::prelude::*;
use vertex_pipeline::pipeline::{
    OperationId, OperationRef, OperationRegistry, RenderModes, RenderState,
};

/// A random acyclic operation graph.
///
/// `rank` is a topological rank per operation; operation `i` may only
/// depend on `j` when `rank[j] < rank[i]`, which rules out cycles while
/// still letting dependencies point at higher ids.
#[derive(Debug, Clone)]
struct Graph {
    rank: Vec<usize>,
    edges: Vec<Vec<bool>>,
    loads: Vec<bool>,
    presentation: Vec<usize>,
}

impl Graph {
    fn depends(&self, i: usize, j: usize) -> bool {
        self.rank[j] < self.rank[i] && self.edges[i][j]
    }
}

fn graph() -> impl Strategy<Value = Graph> {
    (1usize..10).prop_flat_map(|n| {
        (
            Just((0..n).collect::<Vec<_>>()).prop_shuffle(),
            prop::collection::vec(prop::collection::vec(any::<bool>(), n), n),
            prop::collection::vec(prop::bool::weighted(0.8), n),
            Just((0..n).collect::<Vec<_>>()).prop_shuffle(),
        )
            .prop_map(|(rank, edges, loads, presentation)| Graph {
                rank,
                edges,
                loads,
                presentation,
            })
    })
}

fn build(graph: &Graph) -> (RenderState, Vec<OperationId>) {
    let registry = OperationRegistry::shared();
    let n = graph.rank.len();
    let ids: Vec<OperationId> = (0..n).map(|_| registry.register_operation_type()).collect();

    let mut ops: Vec<Option<OperationRef>> = vec![None; n];
    for i in 0..n {
        let mut op = RecordingOp::new(ids[i], &format!("op{}", i));
        for j in 0..n {
            if graph.depends(i, j) {
                op = op.requires(ids[j]);
            }
        }
        if !graph.loads[i] {
            op = op.rejects();
        }
        ops[i] = Some(op.shared());
    }

    let mut state = RenderState::new(registry);
    state.set_modes(RenderModes {
        use_normals: false,
        use_colour: false,
        compute_lighting: false,
    });
    state.set_operations(graph.presentation.iter().filter_map(|&i| ops[i].clone()));
    (state, ids)
}

proptest! {
    #[test]
    fn prop_order_is_topologically_valid(graph in graph()) {
        let (mut state, ids) = build(&graph);
        state.set_source_full(ModelFixture::new(1).build()).unwrap();
        let order = state.pipeline().plan().order_ids();

        for (i, id) in ids.iter().enumerate() {
            let count = order.iter().filter(|o| *o == id).count();
            prop_assert_eq!(count, usize::from(graph.loads[i]));
        }

        let position = |id: OperationId| order.iter().position(|o| *o == id);
        for i in 0..ids.len() {
            for j in 0..ids.len() {
                if !graph.depends(i, j) {
                    continue;
                }
                if let (Some(pi), Some(pj)) = (position(ids[i]), position(ids[j])) {
                    prop_assert!(pj < pi, "op{} must run before op{}", j, i);
                }
            }
        }
    }

    #[test]
    fn prop_rebuild_is_idempotent(graph in graph()) {
        let (mut state, _) = build(&graph);
        state.set_source_full(ModelFixture::new(1).build()).unwrap();
        let first = state.pipeline().plan().order_ids();

        state.rebuild().unwrap();
        prop_assert_eq!(state.pipeline().plan().order_ids(), first.clone());

        state.rebuild().unwrap();
        prop_assert_eq!(state.pipeline().plan().order_ids(), first);
    }

    #[test]
    fn prop_presentation_order_does_not_matter(graph in graph()) {
        let (mut shuffled, _) = build(&graph);
        let sorted_graph = Graph {
            presentation: (0..graph.rank.len()).collect(),
            ..graph.clone()
        };
        let (mut sorted, _) = build(&sorted_graph);

        shuffled.set_source_full(ModelFixture::new(1).build()).unwrap();
        sorted.set_source_full(ModelFixture::new(1).build()).unwrap();

        prop_assert_eq!(
            shuffled.pipeline().plan().order_names(),
            sorted.pipeline().plan().order_names()
        );
    }
}
