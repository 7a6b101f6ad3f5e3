use crate::header::{EFFECT_MAGIC, LEGACY_MAGIC};
use crate::symbol::{SymbolClass, SymbolType};

fn push_words(out: &mut Vec<u8>, words: &[u32]) {
    for word in words {
        out.extend_from_slice(&word.to_le_bytes());
    }
}

fn push_padded(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(bytes);
    while out.len() % 4 != 0 {
        out.push(0);
    }
}

/// A render or sampler state entry: `(state code, type offset, value offset)`.
pub type StateRecord = (u32, u32, u32);

/// An annotation entry: `(type offset, value offset)`.
pub type AnnotationRecord = (u32, u32);

#[derive(Debug, Clone, Default)]
pub struct PassRecord {
    pub name: String,
    pub annotations: Vec<AnnotationRecord>,
    pub states: Vec<StateRecord>,
}

impl PassRecord {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }

    pub fn state(mut self, code: u32, type_offset: u32, value_offset: u32) -> Self {
        self.states.push((code, type_offset, value_offset));
        self
    }

    pub fn annotation(mut self, type_offset: u32, value_offset: u32) -> Self {
        self.annotations.push((type_offset, value_offset));
        self
    }
}

/// One member of a struct type: `(name, class, columns, rows, elements)`.
pub type StructMemberSpec<'a> = (&'a str, SymbolClass, u32, u32, u32);

/// Assembles an effect binary: a pool of names/types/values addressed by offset, the metadata
/// table, and the object lists.
///
/// Offsets returned by the pool helpers are relative to the base origin, so they can be placed
/// directly in records.
#[derive(Debug, Clone, Default)]
pub struct EffectBlobBuilder {
    pool: Vec<u8>,
    legacy_len: Option<u32>,
    parameter_count: u32,
    parameters: Vec<u8>,
    technique_count: u32,
    techniques: Vec<u8>,
    object_count: u32,
    small_count: u32,
    small_objects: Vec<u8>,
    large_count: u32,
    large_objects: Vec<u8>,
}

impl EffectBlobBuilder {
    /// The pool starts with an empty string at offset 0, usable as "no name".
    pub fn new() -> Self {
        let mut builder = Self::default();
        builder.words(&[0]);
        builder
    }

    /// Prepends a legacy preamble declaring `len` total bytes (`len - 8` of filler).
    pub fn legacy_preamble(&mut self, len: u32) -> &mut Self {
        self.legacy_len = Some(len);
        self
    }

    pub fn object_count(&mut self, count: u32) -> &mut Self {
        self.object_count = count;
        self
    }

    pub fn words(&mut self, words: &[u32]) -> u32 {
        let offset = self.pool.len() as u32;
        push_words(&mut self.pool, words);
        offset
    }

    pub fn floats(&mut self, values: &[f32]) -> u32 {
        let bits: Vec<u32> = values.iter().map(|v| v.to_bits()).collect();
        self.words(&bits)
    }

    /// Length-prefixed, NUL-terminated string.
    pub fn string(&mut self, text: &str) -> u32 {
        if text.is_empty() {
            return 0;
        }
        let offset = self.pool.len() as u32;
        let mut body = text.as_bytes().to_vec();
        body.push(0);
        push_words(&mut self.pool, &[body.len() as u32]);
        push_padded(&mut self.pool, &body);
        offset
    }

    pub fn numeric_type(
        &mut self,
        name: &str,
        class: SymbolClass,
        ty: SymbolType,
        columns: u32,
        rows: u32,
        elements: u32,
    ) -> u32 {
        let name = self.string(name);
        self.words(&[ty.raw(), class.raw(), name, 0, elements, columns, rows])
    }

    pub fn object_type(&mut self, name: &str, ty: SymbolType, elements: u32) -> u32 {
        let name = self.string(name);
        self.words(&[ty.raw(), SymbolClass::Object.raw(), name, 0, elements])
    }

    /// Struct descriptor with its member values packed after the member descriptors.
    pub fn struct_type(
        &mut self,
        name: &str,
        elements: u32,
        members: &[StructMemberSpec<'_>],
        values: &[f32],
    ) -> u32 {
        let name = self.string(name);
        let member_names: Vec<u32> = members.iter().map(|m| self.string(m.0)).collect();
        let mut words = vec![
            SymbolType::Void.raw(),
            SymbolClass::Struct.raw(),
            name,
            0,
            elements,
            members.len() as u32,
        ];
        for (&(_, class, columns, rows, member_elements), &member_name) in
            members.iter().zip(&member_names)
        {
            words.extend_from_slice(&[
                SymbolType::Float.raw(),
                class.raw(),
                member_name,
                0,
                member_elements,
                columns,
                rows,
            ]);
        }
        words.extend(values.iter().map(|v| v.to_bits()));
        self.words(&words)
    }

    /// Sampler value: a state count, then `{code, reserved, type, value}` per state.
    pub fn sampler_value(&mut self, states: &[StateRecord]) -> u32 {
        let mut words = vec![states.len() as u32];
        for &(code, type_offset, value_offset) in states {
            words.extend_from_slice(&[code, 0, type_offset, value_offset]);
        }
        self.words(&words)
    }

    pub fn parameter(&mut self, type_offset: u32, value_offset: u32) -> &mut Self {
        self.parameter_with(type_offset, value_offset, 0, &[])
    }

    pub fn parameter_with(
        &mut self,
        type_offset: u32,
        value_offset: u32,
        flags: u32,
        annotations: &[AnnotationRecord],
    ) -> &mut Self {
        self.parameter_count += 1;
        push_words(
            &mut self.parameters,
            &[type_offset, value_offset, flags, annotations.len() as u32],
        );
        for &(ty, value) in annotations {
            push_words(&mut self.parameters, &[ty, value]);
        }
        self
    }

    pub fn technique(
        &mut self,
        name: &str,
        annotations: &[AnnotationRecord],
        passes: &[PassRecord],
    ) -> &mut Self {
        self.technique_count += 1;
        let name = self.string(name);
        push_words(
            &mut self.techniques,
            &[name, annotations.len() as u32, passes.len() as u32],
        );
        for &(ty, value) in annotations {
            push_words(&mut self.techniques, &[ty, value]);
        }
        for pass in passes {
            let pass_name = self.string(&pass.name);
            push_words(
                &mut self.techniques,
                &[
                    pass_name,
                    pass.annotations.len() as u32,
                    pass.states.len() as u32,
                ],
            );
            for &(ty, value) in &pass.annotations {
                push_words(&mut self.techniques, &[ty, value]);
            }
            for &(code, ty, value) in &pass.states {
                push_words(&mut self.techniques, &[code, 0, ty, value]);
            }
        }
        self
    }

    pub fn small_object(&mut self, index: u32, payload: &[u8]) -> &mut Self {
        self.small_count += 1;
        push_words(&mut self.small_objects, &[index, payload.len() as u32]);
        push_padded(&mut self.small_objects, payload);
        self
    }

    /// `technique == u32::MAX` locates the object through parameter `index` instead of a pass.
    pub fn large_object(
        &mut self,
        technique: u32,
        index: u32,
        state: u32,
        flag: u32,
        payload: &[u8],
    ) -> &mut Self {
        self.large_count += 1;
        push_words(
            &mut self.large_objects,
            &[technique, index, 0, state, flag, payload.len() as u32],
        );
        push_padded(&mut self.large_objects, payload);
        self
    }

    pub fn finish(&self) -> Vec<u8> {
        let mut out = Vec::new();
        if let Some(len) = self.legacy_len {
            push_words(&mut out, &[LEGACY_MAGIC, len]);
            out.resize(out.len() + len.saturating_sub(8) as usize, 0);
        }
        push_words(&mut out, &[EFFECT_MAGIC, self.pool.len() as u32]);
        out.extend_from_slice(&self.pool);
        push_words(
            &mut out,
            &[
                self.parameter_count,
                self.technique_count,
                0,
                self.object_count,
            ],
        );
        out.extend_from_slice(&self.parameters);
        out.extend_from_slice(&self.techniques);
        push_words(&mut out, &[self.small_count, self.large_count]);
        out.extend_from_slice(&self.small_objects);
        out.extend_from_slice(&self.large_objects);
        out
    }
}

/// Payload of a standalone preshader large object: the bound parameter's name, then bytecode.
pub fn preshader_object_payload(parameter: &str, bytecode: &[u8]) -> Vec<u8> {
    let mut name = parameter.as_bytes().to_vec();
    name.push(0);
    let mut out = Vec::new();
    push_words(&mut out, &[name.len() as u32]);
    out.extend_from_slice(&name);
    out.extend_from_slice(bytecode);
    out
}
