use crate::cursor::BinaryCursor;
use crate::object::ObjectTable;
use crate::options::DecodeOptions;

/// First-pass decode state shared by the list readers and the value resolver.
pub(crate) struct Decoder<'a, 'o> {
    /// Every type, value and name offset resolves against this cursor.
    pub base: BinaryCursor<'a>,
    pub objects: ObjectTable,
    pub options: &'o DecodeOptions,
}

impl<'a, 'o> Decoder<'a, 'o> {
    pub fn new(base: BinaryCursor<'a>, object_count: usize, options: &'o DecodeOptions) -> Self {
        Self {
            base,
            objects: ObjectTable::new(object_count),
            options,
        }
    }

    /// Cursor at `offset` from the base origin.
    pub fn at(&self, offset: u32) -> Result<BinaryCursor<'a>, crate::EffectError> {
        self.base.slice(offset as usize)
    }

    pub fn string_at(&self, offset: u32) -> Result<String, crate::EffectError> {
        self.base.read_length_prefixed_string(offset as usize)
    }
}
