//! Readers for the fixed-size record lists of the metadata table.
//!
//! Records are read sequentially from the table cursor; every offset inside a record resolves
//! against the base cursor.

use tracing::{debug, trace, warn};

use crate::cursor::BinaryCursor;
use crate::decoder::Decoder;
use crate::error::EffectError;
use crate::limits::check_count;
use crate::model::{EffectAnnotation, EffectParameter, EffectPass, EffectState, EffectTechnique};
use crate::states::RenderStateType;

const PARAMETER_RECORD_BYTES: usize = 16;
const ANNOTATION_RECORD_BYTES: usize = 8;
const TECHNIQUE_RECORD_BYTES: usize = 12;
const PASS_RECORD_BYTES: usize = 12;
const STATE_RECORD_BYTES: usize = 16;

impl Decoder<'_, '_> {
    pub(crate) fn read_parameters(
        &mut self,
        table: &mut BinaryCursor<'_>,
        count: u32,
    ) -> Result<Vec<EffectParameter>, EffectError> {
        let count = check_count(table, "parameters", count, PARAMETER_RECORD_BYTES)?;
        let mut parameters = Vec::with_capacity(count);
        for _ in 0..count {
            let type_offset = table.read::<u32>()?;
            let value_offset = table.read::<u32>()?;
            let flags = table.read::<u32>()?;
            let annotation_count = table.read::<u32>()?;
            let annotations = self.read_annotations(table, annotation_count)?;
            let value = self.resolve_value(type_offset, value_offset)?;
            trace!(name = %value.name, flags, "parsed parameter");
            parameters.push(EffectParameter {
                value,
                flags,
                annotations,
            });
        }
        Ok(parameters)
    }

    pub(crate) fn read_annotations(
        &mut self,
        table: &mut BinaryCursor<'_>,
        count: u32,
    ) -> Result<Vec<EffectAnnotation>, EffectError> {
        let count = check_count(table, "annotations", count, ANNOTATION_RECORD_BYTES)?;
        let mut annotations = Vec::with_capacity(count);
        for _ in 0..count {
            let type_offset = table.read::<u32>()?;
            let value_offset = table.read::<u32>()?;
            annotations.push(EffectAnnotation {
                value: self.resolve_value(type_offset, value_offset)?,
            });
        }
        Ok(annotations)
    }

    pub(crate) fn read_techniques(
        &mut self,
        table: &mut BinaryCursor<'_>,
        count: u32,
    ) -> Result<Vec<EffectTechnique>, EffectError> {
        let count = check_count(table, "techniques", count, TECHNIQUE_RECORD_BYTES)?;
        let mut techniques = Vec::with_capacity(count);
        for _ in 0..count {
            let name_offset = table.read::<u32>()?;
            let annotation_count = table.read::<u32>()?;
            let pass_count = table.read::<u32>()?;
            let name = self.string_at(name_offset)?;
            let annotations = self.read_annotations(table, annotation_count)?;
            let passes = self.read_passes(table, pass_count)?;
            debug!(%name, passes = passes.len(), "parsed technique");
            techniques.push(EffectTechnique {
                name,
                annotations,
                passes,
            });
        }
        Ok(techniques)
    }

    fn read_passes(
        &mut self,
        table: &mut BinaryCursor<'_>,
        count: u32,
    ) -> Result<Vec<EffectPass>, EffectError> {
        let count = check_count(table, "passes", count, PASS_RECORD_BYTES)?;
        let mut passes = Vec::with_capacity(count);
        for _ in 0..count {
            let name_offset = table.read::<u32>()?;
            let annotation_count = table.read::<u32>()?;
            let state_count = table.read::<u32>()?;
            let name = self.string_at(name_offset)?;
            let annotations = self.read_annotations(table, annotation_count)?;
            let states = self.read_states(table, state_count)?;
            trace!(%name, states = states.len(), "parsed pass");
            passes.push(EffectPass {
                name,
                annotations,
                states,
            });
        }
        Ok(passes)
    }

    fn read_states(
        &mut self,
        table: &mut BinaryCursor<'_>,
        count: u32,
    ) -> Result<Vec<EffectState>, EffectError> {
        let count = check_count(table, "states", count, STATE_RECORD_BYTES)?;
        let mut states = Vec::with_capacity(count);
        for _ in 0..count {
            let ty = RenderStateType::from_raw(table.read::<u32>()?);
            let _reserved = table.read::<u32>()?;
            let type_offset = table.read::<u32>()?;
            let value_offset = table.read::<u32>()?;
            if let RenderStateType::Unknown(code) = ty {
                warn!(code, "unrecognized render state");
            }
            states.push(EffectState {
                ty,
                value: self.resolve_value(type_offset, value_offset)?,
            });
        }
        Ok(states)
    }
}
