use crate::errors::PlannerResult;
use crate::placement::Placement;

/// Build side-effect collaborator: something that can materialize a committed
/// placement in a world (block writes, network calls, a file). The planner
/// only calls `place` on commit, never during lookahead.
pub trait StructureBuilder {
    fn place(&mut self, placement: &Placement) -> PlannerResult<()>;
}

/// Dry-run builder: commits stay in the placement list only
#[derive(Debug, Default)]
pub struct NullBuilder;

impl StructureBuilder for NullBuilder {
    fn place(&mut self, _placement: &Placement) -> PlannerResult<()> {
        Ok(())
    }
}

/// Captures every build call, for tests and run summaries
#[derive(Debug, Default)]
pub struct RecordingBuilder {
    pub placed: Vec<Placement>,
}

impl StructureBuilder for RecordingBuilder {
    fn place(&mut self, placement: &Placement) -> PlannerResult<()> {
        self.placed.push(placement.clone());
        Ok(())
    }
}
