//! Multi-threaded batch mesher.
//!
//! Splits a vertex range of a shared source into fixed-size batches and fans
//! them out to scoped worker threads over crossbeam channels. Each worker owns
//! one [`RenderState`]: its pipeline is built once, then reused for every
//! batch it picks up, since only the range changes between batches.
//!
//! ```text
//!             ┌──► [worker 0: RenderState] ──┐
//! [batches] ──┼──► [worker 1: RenderState] ──┼──► [merge in batch order]
//!             └──► [worker N: RenderState] ──┘
//! ```

use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::pipeline::{
    CompiledPlan, OperationRef, OperationRegistry, OutputVertex, PipelineError, PipelineResult,
    RenderState, VertexBuffer, VertexSource,
};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;

/// A contiguous slice of the vertex range assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Batch {
    index: usize,
    first: usize,
    last: usize,
}

/// Message sent from a worker back to the mesher
enum WorkerMessage {
    /// A batch finished rendering
    Done { index: usize, buffer: VertexBuffer },
    /// The worker failed and stopped
    Failed { worker: usize, error: PipelineError },
}

/// Result of meshing a range
#[derive(Debug, Clone, Default)]
pub struct MeshOutput {
    /// Output vertices in source order
    pub vertices: Vec<OutputVertex>,
    pub batches: usize,
    pub workers: usize,
}

pub struct BatchMesher {
    registry: Arc<OperationRegistry>,
    operations: Vec<OperationRef>,
    config: RenderConfig,
}

impl BatchMesher {
    pub fn new(registry: Arc<OperationRegistry>, config: RenderConfig) -> Self {
        Self {
            registry,
            operations: Vec::new(),
            config,
        }
    }

    pub fn with_operations<I>(mut self, operations: I) -> Self
    where
        I: IntoIterator<Item = OperationRef>,
    {
        self.operations = operations.into_iter().collect();
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// A fresh render state configured the way every worker's is.
    pub fn worker_state(&self) -> RenderState {
        let mut state = RenderState::new(self.registry.clone());
        self.config.apply(&mut state);
        state.set_operations(self.operations.iter().cloned());
        state
    }

    /// Build the pipeline once against `source` and return the compiled order.
    pub fn explain(&self, source: Arc<dyn VertexSource>) -> Result<CompiledPlan> {
        let mut state = self.worker_state();
        state.bind_source(source)?;
        state.rebuild_if_needed()?;
        Ok(state.pipeline().plan().clone())
    }

    /// Mesh every vertex of `source`.
    pub fn mesh(&self, source: Arc<dyn VertexSource>) -> Result<MeshOutput> {
        let len = source.vertices().len();
        self.mesh_range(source, 0, len)
    }

    /// Mesh the half-open range `[first, last)` of `source`.
    pub fn mesh_range(
        &self,
        source: Arc<dyn VertexSource>,
        first: usize,
        last: usize,
    ) -> Result<MeshOutput> {
        let len = source.vertices().len();
        if first > last || last > len {
            return Err(PipelineError::RangeOutOfBounds { first, last, len }.into());
        }

        let batch_size = self.config.workers.effective_batch_size();
        let batches: Vec<Batch> = (first..last)
            .step_by(batch_size)
            .enumerate()
            .map(|(index, start)| Batch {
                index,
                first: start,
                last: (start + batch_size).min(last),
            })
            .collect();
        let workers = self.config.workers.effective_threads().min(batches.len());
        if batches.is_empty() {
            return Ok(MeshOutput::default());
        }

        let (job_tx, job_rx) = unbounded::<Batch>();
        let (result_tx, result_rx) = unbounded::<WorkerMessage>();
        for batch in &batches {
            job_tx
                .send(*batch)
                .map_err(|e| Error::Worker(format!("Failed to queue batch: {}", e)))?;
        }
        drop(job_tx);

        tracing::debug!(
            "Meshing {} vertices in {} batches on {} workers",
            last - first,
            batches.len(),
            workers
        );

        std::thread::scope(|scope| {
            for worker in 0..workers {
                let jobs = job_rx.clone();
                let results = result_tx.clone();
                let source = source.clone();
                scope.spawn(move || self.run_worker(worker, source, jobs, results));
            }
        });
        drop(result_tx);

        let mut slots: Vec<Option<VertexBuffer>> = vec![None; batches.len()];
        for message in result_rx.iter() {
            match message {
                WorkerMessage::Done { index, buffer } => slots[index] = Some(buffer),
                WorkerMessage::Failed { worker, error } => {
                    return Err(Error::from(error).with_context(format!("Worker {} failed", worker)));
                }
            }
        }

        let mut vertices = Vec::with_capacity(last - first);
        for (index, slot) in slots.into_iter().enumerate() {
            let buffer = slot.ok_or_else(|| Error::Worker(format!("Batch {} was not rendered", index)))?;
            vertices.extend(buffer.into_vertices());
        }

        Ok(MeshOutput {
            vertices,
            batches: batches.len(),
            workers,
        })
    }

    fn run_worker(
        &self,
        worker: usize,
        source: Arc<dyn VertexSource>,
        jobs: Receiver<Batch>,
        results: Sender<WorkerMessage>,
    ) {
        let mut state = self.worker_state();
        let outcome = state
            .bind_source(source)
            .and_then(|_| Self::drain(&mut state, &jobs, &results));

        match outcome {
            Ok(rendered) => tracing::debug!("Worker {} finished {} batches", worker, rendered),
            Err(error) => {
                let _ = results.send(WorkerMessage::Failed { worker, error });
            }
        }
    }

    fn drain(
        state: &mut RenderState,
        jobs: &Receiver<Batch>,
        results: &Sender<WorkerMessage>,
    ) -> PipelineResult<usize> {
        let mut rendered = 0;
        for batch in jobs.iter() {
            state.set_range(batch.first, batch.last);
            let mut buffer = VertexBuffer::with_capacity(batch.last - batch.first);
            state.render(&mut buffer)?;
            rendered += 1;
            if results
                .send(WorkerMessage::Done {
                    index: batch.index,
                    buffer,
                })
                .is_err()
            {
                break;
            }
        }
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkerConfig;
    use crate::model::Model;
    use crate::pipeline::ColourMultiplier;
    use crate::types::Vector3;

    fn config(threads: usize, batch_size: usize) -> RenderConfig {
        RenderConfig {
            workers: WorkerConfig {
                threads,
                batch_size,
            },
            ..RenderConfig::default()
        }
    }

    #[test]
    fn test_multi_worker_output_matches_single_worker() {
        let registry = OperationRegistry::shared();
        let model: Arc<dyn VertexSource> = Arc::new(Model::cuboid(
            &registry,
            Vector3::ZERO,
            Vector3::new(1.0, 1.0, 1.0),
        ));
        let ops: Vec<OperationRef> = vec![Arc::new(ColourMultiplier::new(&registry, 0x8080_80FF))];

        let single = BatchMesher::new(registry.clone(), config(1, 1024))
            .with_operations(ops.clone())
            .mesh(model.clone())
            .unwrap();
        let multi = BatchMesher::new(registry.clone(), config(4, 5))
            .with_operations(ops)
            .mesh(model)
            .unwrap();

        assert_eq!(single.vertices.len(), 24);
        assert_eq!(multi.batches, 5);
        assert_eq!(multi.workers, 4);
        assert_eq!(single.vertices, multi.vertices);
    }

    #[test]
    fn test_empty_range() {
        let registry = OperationRegistry::shared();
        let model: Arc<dyn VertexSource> = Arc::new(Model::builder().build());
        let output = BatchMesher::new(registry, config(2, 8)).mesh(model).unwrap();
        assert!(output.vertices.is_empty());
        assert_eq!(output.batches, 0);
    }

    #[test]
    fn test_range_outside_source_is_rejected() {
        let registry = OperationRegistry::shared();
        let model: Arc<dyn VertexSource> =
            Arc::new(Model::cuboid(&registry, Vector3::ZERO, Vector3::new(1.0, 1.0, 1.0)));
        let err = BatchMesher::new(registry, config(2, 8))
            .mesh_range(model, 4, 30)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Pipeline(PipelineError::RangeOutOfBounds { len: 24, .. })
        ));
    }

    #[test]
    fn test_build_error_reported_with_worker_context() {
        let registry = OperationRegistry::shared();
        let colour = registry.standard().colour.slot;
        // Advertised but never supplied
        let model: Arc<dyn VertexSource> = Arc::new(
            Model::cuboid(&registry, Vector3::ZERO, Vector3::new(1.0, 1.0, 1.0))
                .into_builder()
                .advertise(colour)
                .build(),
        );
        let ops = vec![registry.attribute(colour).unwrap()];

        let err = BatchMesher::new(registry, config(2, 8))
            .with_operations(ops)
            .mesh(model)
            .unwrap_err();
        assert!(err.to_string().contains("Worker"));
        assert!(err.to_string().contains("Colour"));
    }
}
