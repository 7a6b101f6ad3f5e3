use tracing::{debug, warn};

use crate::decoder::Decoder;
use crate::error::EffectError;
use crate::finalize::Finalizer;
use crate::header::{parse_header, EffectHeader};
use crate::lookup::find_parameter;
use crate::model::{EffectParameter, EffectTechnique};
use crate::object::{EffectObject, ObjectState};
use crate::options::{DecodeOptions, UntypedObjectPolicy};

/// A fully decoded effect binary.
#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    pub header: EffectHeader,
    /// In declaration order.
    pub parameters: Vec<EffectParameter>,
    pub techniques: Vec<EffectTechnique>,
    /// Indexed by object id; slot 0 is never referenced by well-formed effects.
    pub objects: Vec<EffectObject>,
}

impl Effect {
    /// Decodes `bytes` with [`DecodeOptions::default`].
    pub fn parse(bytes: &[u8]) -> Result<Self, EffectError> {
        Self::parse_with_options(bytes, &DecodeOptions::default())
    }

    /// Decodes a complete effect binary. Any fault aborts the whole decode.
    pub fn parse_with_options(bytes: &[u8], options: &DecodeOptions) -> Result<Self, EffectError> {
        let layout = parse_header(bytes)?;
        let header = layout.header;
        if header.object_count > options.max_objects {
            return Err(EffectError::TooManyObjects {
                count: header.object_count,
                max: options.max_objects,
            });
        }

        let mut table = layout.table;
        let mut decoder = Decoder::new(layout.base, header.object_count as usize, options);
        let parameters = decoder.read_parameters(&mut table, header.parameter_count)?;
        let techniques = decoder.read_techniques(&mut table, header.technique_count)?;

        let mut objects = decoder.objects;
        Finalizer {
            parameters: &parameters,
            techniques: &techniques,
            objects: &mut objects,
            options,
        }
        .run(&mut table)?;

        let effect = Effect {
            header,
            parameters,
            techniques,
            objects: objects.into_vec(),
        };
        effect.check_untyped(options.untyped_objects)?;
        debug!(
            parameters = effect.parameters.len(),
            techniques = effect.techniques.len(),
            objects = effect.objects.len(),
            "decoded effect"
        );
        Ok(effect)
    }

    fn check_untyped(&self, policy: UntypedObjectPolicy) -> Result<(), EffectError> {
        if policy == UntypedObjectPolicy::Ignore {
            return Ok(());
        }
        let untyped: Vec<u32> = self.untyped_objects().collect();
        let Some(&first) = untyped.first() else {
            return Ok(());
        };
        match policy {
            UntypedObjectPolicy::Reject => Err(EffectError::UntypedObjects {
                count: untyped.len(),
                first,
            }),
            _ => {
                warn!(count = untyped.len(), first, "effect objects left untyped");
                Ok(())
            }
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&EffectParameter> {
        self.parameters.iter().find(|parameter| parameter.name() == name)
    }

    /// Index of the parameter named `name`; a missing name is a lookup fault.
    pub fn parameter_index(&self, name: &str) -> Result<usize, EffectError> {
        find_parameter(&self.parameters, name)
    }

    pub fn technique(&self, name: &str) -> Option<&EffectTechnique> {
        self.techniques.iter().find(|technique| technique.name == name)
    }

    pub fn object(&self, index: u32) -> Option<&EffectObject> {
        self.objects.get(index as usize)
    }

    /// Ids of objects no value referenced, excluding the reserved slot 0.
    pub fn untyped_objects(&self) -> impl Iterator<Item = u32> + '_ {
        self.objects
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, object)| object.state() == ObjectState::Untyped)
            .map(|(index, _)| index as u32)
    }
}
