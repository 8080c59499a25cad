use super::compiled_plan::{CompiledPlan, PlanStats};
use super::context::{RenderContext, RenderModes};
use super::error::{PipelineError, PipelineResult};
use super::id::{AttributeSlotId, OperationId};
use super::operation::{LoadContext, OperationKind, OperationRef};
use super::registry::OperationRegistry;
use super::source::VertexSource;

/// DFS visit state of a node during emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum VisitMark {
    #[default]
    Unvisited,
    InProgress,
    Done,
}

/// One node per operation type.
#[derive(Default)]
struct PipelineNode {
    /// Operation types this node must run after, in registration order
    deps: Vec<OperationId>,
    /// Operation instance armed for the current build
    armed: Option<OperationRef>,
    mark: VisitMark,
}

/// Per-pipeline build scratch: the node table and the load worklist.
///
/// The node table only grows; nodes for operation types registered after the
/// previous build are appended at the start of the next one.
#[derive(Default)]
pub struct BuildState {
    nodes: Vec<PipelineNode>,
    worklist: Vec<OperationRef>,
    /// Attribute slots taking part in the current build
    active: Vec<bool>,
    /// Attribute slots already enqueued this build (each loads at most once)
    enqueued: Vec<bool>,
    loading: Option<OperationId>,
}

impl BuildState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes in the table.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether attribute `slot` is active in the current (or last) build.
    pub fn is_active(&self, slot: AttributeSlotId) -> bool {
        self.active.get(slot.index()).copied().unwrap_or(false)
    }

    fn grow(&mut self, operation_count: usize, attribute_count: usize) {
        if self.nodes.len() < operation_count {
            self.nodes.resize_with(operation_count, PipelineNode::default);
        }
        if self.active.len() < attribute_count {
            self.active.resize(attribute_count, false);
            self.enqueued.resize(attribute_count, false);
        }
    }

    /// Deactivate all attributes and clear every node's edges and arming.
    pub(crate) fn clear(&mut self) {
        for node in &mut self.nodes {
            node.deps.clear();
            node.armed = None;
            node.mark = VisitMark::Unvisited;
        }
        self.active.fill(false);
        self.enqueued.fill(false);
        self.worklist.clear();
        self.loading = None;
    }

    fn ensure_slot(&mut self, slot: AttributeSlotId) {
        if slot.index() >= self.active.len() {
            self.active.resize(slot.index() + 1, false);
            self.enqueued.resize(slot.index() + 1, false);
        }
    }

    /// Enqueue `attribute` unless it already joined this build.
    pub(crate) fn activate(&mut self, slot: AttributeSlotId, attribute: OperationRef) {
        self.ensure_slot(slot);
        let index = slot.index();
        if !self.enqueued[index] {
            self.enqueued[index] = true;
            self.active[index] = true;
            self.worklist.push(attribute);
        }
    }

    fn set_active(&mut self, slot: AttributeSlotId, active: bool) {
        self.ensure_slot(slot);
        self.enqueued[slot.index()] = true;
        self.active[slot.index()] = active;
    }

    /// Record that the loading node runs after `target`.
    pub(crate) fn add_edge(&mut self, target: OperationId) -> PipelineResult<()> {
        let loading = self.loading.ok_or(PipelineError::NoActiveBuild)?;
        if target.index() >= self.nodes.len() {
            return Err(PipelineError::UnknownOperation(target));
        }
        self.nodes[loading.index()].deps.push(target);
        Ok(())
    }
}

/// Compiles an operation set into a dependency-sorted execution order
pub struct PipelineCompiler;

impl PipelineCompiler {
    /// Compile `operations` against the source bound to `ctx`.
    ///
    /// 1. Grow the node table to the registry's current operation count.
    /// 2. Load every operation in worklist order; `load()` may append
    ///    attribute slots to the worklist, which are loaded in the same pass.
    /// 3. Walk nodes in ascending id order, emitting each armed node after its
    ///    dependencies (in the order they were registered).
    ///
    /// On error the build state is cleared and no partial plan is returned.
    pub(crate) fn compile(
        build: &mut BuildState,
        operations: &[OperationRef],
        ctx: &mut RenderContext,
        registry: &OperationRegistry,
        generation: u64,
    ) -> PipelineResult<CompiledPlan> {
        let start_time = std::time::Instant::now();
        let source = ctx.source().cloned().ok_or(PipelineError::NoSource)?;

        build.grow(registry.operation_count(), registry.attribute_count());
        build.clear();
        ctx.clear_provided();

        // Caller's operations first, then the default attributes the modes ask for
        build.worklist.extend(operations.iter().cloned());
        for op in operations {
            if let OperationKind::Attribute(slot) = op.kind() {
                build.set_active(slot, true);
            }
        }
        Self::enqueue_defaults(build, ctx.modes(), registry);

        let result = Self::load_all(build, ctx, &*source, registry).and_then(|loaded| {
            let mut plan = CompiledPlan::new();
            Self::emit_all(build, &mut plan)?;
            plan.generation = generation;
            plan.stats = PlanStats {
                requested: operations.len(),
                loaded,
                armed: plan.order.len(),
                active_attributes: build.active.iter().filter(|&&a| a).count(),
                compile_time_us: start_time.elapsed().as_micros() as u64,
            };
            Ok(plan)
        });

        if result.is_err() {
            build.clear();
            ctx.clear_provided();
        }
        result
    }

    fn enqueue_defaults(build: &mut BuildState, modes: RenderModes, registry: &OperationRegistry) {
        let standard = registry.standard();
        let defaults = [
            (modes.use_normals, standard.normal.slot),
            (modes.use_colour, standard.colour.slot),
            (modes.compute_lighting, standard.lighting.slot),
        ];
        for (enabled, slot) in defaults {
            if !enabled {
                continue;
            }
            if let Some(attribute) = registry.attribute(slot) {
                build.activate(slot, attribute);
            }
        }
    }

    /// Load the worklist, which may grow while it is processed.
    fn load_all(
        build: &mut BuildState,
        ctx: &mut RenderContext,
        source: &dyn VertexSource,
        registry: &OperationRegistry,
    ) -> PipelineResult<usize> {
        let mut cursor = 0;
        while cursor < build.worklist.len() {
            let op = build.worklist[cursor].clone();
            cursor += 1;

            let id = op.operation_id();
            if id.index() >= build.nodes.len() {
                return Err(PipelineError::UnknownOperation(id));
            }

            let deps_before = build.nodes[id.index()].deps.len();
            build.loading = Some(id);
            let loaded = {
                let mut load = LoadContext::new(ctx, source, registry, build);
                op.load(&mut load)
            };
            build.loading = None;
            let loaded = loaded?;

            tracing::trace!("Loaded '{}' ({:?}): {}", op.name(), id, loaded);

            if let OperationKind::Attribute(slot) = op.kind() {
                build.set_active(slot, loaded);
            }

            let node = &mut build.nodes[id.index()];
            if loaded {
                if let Some(previous) = &node.armed {
                    tracing::warn!(
                        "Operation type {:?} armed twice ('{}' replaces '{}')",
                        id,
                        op.name(),
                        previous.name()
                    );
                }
                node.armed = Some(op);
            } else {
                // Edges added by a rejected load must not leak into the build
                node.deps.truncate(deps_before);
            }
        }
        Ok(cursor)
    }

    /// Emit every armed node in ascending id order, dependencies first.
    fn emit_all(build: &mut BuildState, plan: &mut CompiledPlan) -> PipelineResult<()> {
        let mut path: Vec<OperationRef> = Vec::new();
        for index in 0..build.nodes.len() {
            Self::emit(&mut build.nodes, index, plan, &mut path)?;
        }
        Ok(())
    }

    fn emit(
        nodes: &mut [PipelineNode],
        index: usize,
        plan: &mut CompiledPlan,
        path: &mut Vec<OperationRef>,
    ) -> PipelineResult<()> {
        match nodes[index].mark {
            VisitMark::Done => return Ok(()),
            VisitMark::InProgress => {
                let id = OperationId(index as u32);
                let start = path
                    .iter()
                    .position(|op| op.operation_id() == id)
                    .unwrap_or(0);
                let mut chain: Vec<String> =
                    path[start..].iter().map(|op| op.name().to_string()).collect();
                if let Some(first) = chain.first().cloned() {
                    chain.push(first);
                }
                return Err(PipelineError::CycleDetected { chain });
            }
            VisitMark::Unvisited => {}
        }

        // Unarmed nodes are not part of this build; their dependents simply skip them
        let Some(op) = nodes[index].armed.take() else {
            nodes[index].mark = VisitMark::Done;
            return Ok(());
        };

        nodes[index].mark = VisitMark::InProgress;
        path.push(op.clone());

        for i in 0..nodes[index].deps.len() {
            let dep = nodes[index].deps[i];
            Self::emit(nodes, dep.index(), plan, path)?;
            if nodes[dep.index()].mark == VisitMark::Done && plan.position(dep).is_some() {
                plan.edges.push((dep, op.operation_id()));
            }
        }

        path.pop();
        nodes[index].mark = VisitMark::Done;
        plan.order.push(op);
        Ok(())
    }
}
