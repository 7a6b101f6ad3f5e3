use crate::limits;

/// What to do with object-table entries no value ever referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UntypedObjectPolicy {
    /// Keep them silently.
    Ignore,
    /// Keep them and emit a `tracing` warning.
    #[default]
    Warn,
    /// Fail the decode with [`crate::EffectError::UntypedObjects`].
    Reject,
}

/// Knobs for [`crate::Effect::parse_with_options`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Upper bound on the header's object count, checked before allocating the table.
    pub max_objects: u32,
    /// Recursion bound for sampler states whose values nest further descriptors.
    pub max_value_depth: u32,
    pub untyped_objects: UntypedObjectPolicy,
    /// When false, shader payloads are kept as raw bytes with no symbol binding.
    pub parse_shaders: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_objects: limits::DEFAULT_MAX_OBJECTS,
            max_value_depth: limits::DEFAULT_MAX_VALUE_DEPTH,
            untyped_objects: UntypedObjectPolicy::default(),
            parse_shaders: true,
        }
    }
}

impl DecodeOptions {
    pub fn with_max_objects(mut self, max_objects: u32) -> Self {
        self.max_objects = max_objects;
        self
    }

    pub fn with_max_value_depth(mut self, max_value_depth: u32) -> Self {
        self.max_value_depth = max_value_depth;
        self
    }

    pub fn with_untyped_objects(mut self, policy: UntypedObjectPolicy) -> Self {
        self.untyped_objects = policy;
        self
    }

    pub fn with_parse_shaders(mut self, parse_shaders: bool) -> Self {
        self.parse_shaders = parse_shaders;
        self
    }
}
