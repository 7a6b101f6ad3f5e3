use xnafx_shader::{
    parse_ctab_chunk, Preshader, RegisterSet, ShaderBytecode, ShaderError, ShaderStage,
};

fn words_to_bytes(words: &[u32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(words.len() * 4);
    for w in words {
        bytes.extend_from_slice(&w.to_le_bytes());
    }
    bytes
}

fn push_str(words: &mut Vec<u32>, s: &[u8]) {
    let mut padded = s.to_vec();
    while padded.len() % 4 != 0 {
        padded.push(0);
    }
    for c in padded.chunks_exact(4) {
        words.push(u32::from_le_bytes([c[0], c[1], c[2], c[3]]));
    }
}

/// `CTAB` payload with a float4 constant `Tint` at c3 and a sampler `Tex` at s1.
fn ctab_words() -> Vec<u32> {
    let mut w = vec![
        28, 0, 0xFFFF_0200, 2, 28, 0, 0, // header
        68, 0x0000_0002 | (3 << 16), 1, 0, 0, // Tint: float4, c3, 1 register
        76, 0x0000_0003 | (1 << 16), 1, 0, 0, // Tex: sampler, s1
    ];
    push_str(&mut w, b"Tint\0\0\0\0");
    push_str(&mut w, b"Tex\0");
    w
}

#[test]
fn malformed_empty_blob_errors() {
    assert_eq!(ShaderBytecode::parse(&[]).unwrap_err(), ShaderError::Empty);
}

#[test]
fn malformed_invalid_byte_length_errors() {
    let err = ShaderBytecode::parse(&[0u8; 5]).unwrap_err();
    assert_eq!(err, ShaderError::InvalidByteLength { len: 5 });
}

#[test]
fn rejects_oversized_bytecode() {
    let bytes = vec![0u8; xnafx_shader::MAX_SHADER_BYTECODE_BYTES + 4];
    let err = ShaderBytecode::parse(&bytes).unwrap_err();
    assert!(matches!(err, ShaderError::BytecodeTooLarge { .. }), "{err:?}");
}

#[test]
fn hand_assembled_ctab_parses() {
    let ctab = parse_ctab_chunk(&words_to_bytes(&ctab_words())).unwrap();
    assert_eq!(ctab.constants.len(), 2);
    assert_eq!(ctab.constants[0].name, "Tint");
    assert_eq!(ctab.constants[0].register_set, RegisterSet::Float4);
    assert_eq!(ctab.constants[0].register_index, 3);
    assert_eq!(ctab.constants[1].name, "Tex");
    assert_eq!(ctab.constants[1].register_set, RegisterSet::Sampler);
    assert_eq!(ctab.constants[1].register_index, 1);
}

#[test]
fn vertex_shader_with_ctab_comment() {
    let ctab = ctab_words();
    let mut words = vec![0xFFFE_0101]; // vs_1_1
    words.push(0xFFFE | (((ctab.len() + 1) as u32) << 16));
    words.push(u32::from_le_bytes(*b"CTAB"));
    words.extend_from_slice(&ctab);
    words.extend_from_slice(&[0x0000_0001, 0xC00F_0000, 0x90E4_0000]); // mov oPos, v0
    words.push(0x0000_FFFF);

    let shader = ShaderBytecode::parse(&words_to_bytes(&words)).unwrap();
    assert_eq!(shader.stage, ShaderStage::Vertex);
    assert_eq!((shader.model.major, shader.model.minor), (1, 1));
    assert_eq!(shader.symbols().len(), 2);
    assert_eq!(shader.samplers().count(), 1);
    assert_eq!(shader.instructions.len(), 4);
}

#[test]
fn truncated_comment_is_rejected() {
    let words = [0xFFFF_0200, 0x0010_FFFE, 0x4241_5443];
    let err = ShaderBytecode::parse(&words_to_bytes(&words)).unwrap_err();
    assert!(matches!(err, ShaderError::TruncatedComment { at_token: 1, .. }), "{err:?}");
}

#[test]
fn preshader_requires_fx_version() {
    let words = [0xFFFE_0200, 0x0000_FFFF];
    let err = Preshader::parse(&words_to_bytes(&words)).unwrap_err();
    assert_eq!(err, ShaderError::InvalidVersionToken { token: 0xFFFE_0200 });
}
