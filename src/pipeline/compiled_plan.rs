use crate::pipeline::id::OperationId;
use crate::pipeline::operation::OperationRef;

/// Compiled execution plan for a pipeline build.
/// Contains only armed operations, each exactly once, dependencies first.
#[derive(Clone)]
pub struct CompiledPlan {
    /// Armed operations in execution order
    pub order: Vec<OperationRef>,

    /// Dependency edges between armed operations (dependency, dependent)
    pub edges: Vec<(OperationId, OperationId)>,

    /// Build generation this plan was produced by
    pub generation: u64,

    /// Compilation statistics
    pub stats: PlanStats,
}

/// Statistics about the compiled plan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanStats {
    /// Number of operations supplied by the caller
    pub requested: usize,

    /// Number of operations loaded (caller's plus enqueued attributes)
    pub loaded: usize,

    /// Number of operations in the compiled order
    pub armed: usize,

    /// Number of attribute slots active after the build
    pub active_attributes: usize,

    /// Compilation time in microseconds
    pub compile_time_us: u64,
}

impl CompiledPlan {
    /// Create a new empty compiled plan
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            edges: Vec::new(),
            generation: 0,
            stats: PlanStats::default(),
        }
    }

    /// Check if the plan has any armed operations
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Operation ids in execution order
    pub fn order_ids(&self) -> Vec<OperationId> {
        self.order.iter().map(|op| op.operation_id()).collect()
    }

    /// Operation names in execution order
    pub fn order_names(&self) -> Vec<String> {
        self.order.iter().map(|op| op.name().to_string()).collect()
    }

    /// Position of operation type `id` in the execution order
    pub fn position(&self, id: OperationId) -> Option<usize> {
        self.order.iter().position(|op| op.operation_id() == id)
    }

    /// Drop the order and edges, keeping allocations for the next build
    pub fn clear(&mut self) {
        self.order.clear();
        self.edges.clear();
        self.stats = PlanStats::default();
    }
}

impl Default for CompiledPlan {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CompiledPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledPlan")
            .field("order", &self.order_names())
            .field("edges", &self.edges)
            .field("generation", &self.generation)
            .field("stats", &self.stats)
            .finish()
    }
}
