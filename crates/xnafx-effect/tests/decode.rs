use pretty_assertions::assert_eq;
use xnafx_effect::test_utils::{preshader_object_payload, EffectBlobBuilder, PassRecord};
use xnafx_effect::{
    DecodeOptions, Effect, EffectError, FaultKind, ObjectState, RenderStateType,
    SamplerStateType, ShaderPayload, SymbolClass, SymbolType, UntypedObjectPolicy,
};
use xnafx_shader::test_utils::{build_ctab, build_shader, CtabEntry, PreshaderBuilder};
use xnafx_shader::{FourCC, ShaderStage};

const IDENTITY: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
];

fn vertex_shader() -> Vec<u8> {
    let ctab = build_ctab(&[CtabEntry::float4("World", 0, 4)]);
    build_shader(
        ShaderStage::Vertex,
        2,
        0,
        &[(FourCC::CTAB, ctab.as_slice())],
        &[],
    )
}

fn pixel_shader() -> Vec<u8> {
    let ctab = build_ctab(&[
        CtabEntry::float4("Tint", 0, 1),
        CtabEntry::sampler("DiffuseSampler", 0),
    ]);
    build_shader(
        ShaderStage::Pixel,
        2,
        0,
        &[(FourCC::CTAB, ctab.as_slice())],
        &[],
    )
}

fn tint_preshader() -> Vec<u8> {
    let mut pre = PreshaderBuilder::new();
    pre.symbol(CtabEntry::float4("Tint", 0, 1));
    pre.literal(0.5);
    pre.instruction(0x2050, 1, &[(2, 0), (1, 0), (4, 0)]);
    preshader_object_payload("Tint", &pre.bytes())
}

/// Parameters World, Tint, DiffuseTexture, DiffuseSampler and Light; one technique with two
/// passes; objects 1..=5 covering every payload kind.
fn full_effect() -> Vec<u8> {
    let mut b = EffectBlobBuilder::new();
    b.object_count(6);

    let world_ty = b.numeric_type("World", SymbolClass::MatrixRows, SymbolType::Float, 4, 4, 0);
    let world = b.floats(&IDENTITY);
    b.parameter(world_ty, world);

    let tint_ty = b.numeric_type("Tint", SymbolClass::Vector, SymbolType::Float, 4, 1, 0);
    let tint = b.floats(&[1.0, 0.5, 0.25, 1.0]);
    let ui_name_ty = b.object_type("UIName", SymbolType::String, 0);
    let ui_name = b.words(&[1]);
    b.parameter_with(tint_ty, tint, 0x1, &[(ui_name_ty, ui_name)]);

    let texture_ty = b.object_type("DiffuseTexture", SymbolType::Texture2D, 0);
    let texture = b.words(&[2]);
    b.parameter(texture_ty, texture);

    let state_texture_ty = b.object_type("", SymbolType::Texture, 0);
    let min_filter_ty = b.numeric_type("", SymbolClass::Scalar, SymbolType::Int, 1, 1, 0);
    let min_filter = b.words(&[2]);
    let sampler_ty = b.object_type("DiffuseSampler", SymbolType::Sampler2D, 0);
    let sampler = b.sampler_value(&[
        (4, state_texture_ty, texture),
        (10, min_filter_ty, min_filter),
    ]);
    b.parameter(sampler_ty, sampler);

    let light_ty = b.struct_type(
        "Light",
        0,
        &[
            ("Direction", SymbolClass::Vector, 3, 1, 0),
            ("Intensity", SymbolClass::Scalar, 1, 1, 0),
        ],
        &[0.0, -1.0, 0.0, 0.75],
    );
    b.parameter(light_ty, 0);

    let z_enable_ty = b.numeric_type("", SymbolClass::Scalar, SymbolType::Bool, 1, 1, 0);
    let z_enable = b.words(&[1]);
    let vs_ty = b.object_type("", SymbolType::VertexShader, 0);
    let vs = b.words(&[3]);
    let ps_ty = b.object_type("", SymbolType::PixelShader, 0);
    let ps = b.words(&[4]);
    let pre = b.words(&[5]);
    b.technique(
        "Main",
        &[],
        &[
            PassRecord::new("P0")
                .state(0, z_enable_ty, z_enable)
                .state(146, vs_ty, vs)
                .state(147, ps_ty, ps),
            PassRecord::new("P1").state(147, ps_ty, pre),
        ],
    );

    b.small_object(1, b"Diffuse Color\0");
    b.small_object(2, b"diffuse.png\0");
    b.small_object(3, &vertex_shader());
    b.large_object(0, 0, 2, 0, &pixel_shader());
    b.large_object(0, 1, 0, 2, &tint_preshader());
    b.finish()
}

#[test]
fn decodes_parameters() {
    let effect = Effect::parse(&full_effect()).unwrap();
    let names: Vec<&str> = effect.parameters.iter().map(|p| p.name()).collect();
    assert_eq!(
        names,
        vec!["World", "Tint", "DiffuseTexture", "DiffuseSampler", "Light"]
    );

    let world = effect.parameter("World").unwrap();
    assert_eq!(world.value.ty.class, SymbolClass::MatrixRows);
    assert_eq!(world.value.as_floats().unwrap(), &IDENTITY);

    let tint = effect.parameter("Tint").unwrap();
    assert_eq!(tint.flags, 0x1);
    assert_eq!(tint.value.as_floats().unwrap(), &[1.0, 0.5, 0.25, 1.0]);
    assert_eq!(tint.annotations.len(), 1);
    assert_eq!(tint.annotations[0].value.name, "UIName");
    assert_eq!(tint.annotations[0].value.object_indices().unwrap(), &[1]);

    let light = effect.parameter("Light").unwrap();
    assert_eq!(light.value.ty.class, SymbolClass::Struct);
    assert_eq!(light.value.ty.members[0].name, "Direction");
    assert_eq!(&light.value.as_floats().unwrap()[..4], &[0.0, -1.0, 0.0, 0.75]);

    assert_eq!(effect.parameter_index("DiffuseSampler"), Ok(3));
    assert_eq!(
        effect.parameter_index("Missing").unwrap_err().kind(),
        FaultKind::Lookup
    );
}

#[test]
fn decodes_techniques_and_states() {
    let effect = Effect::parse(&full_effect()).unwrap();
    let main = effect.technique("Main").unwrap();
    assert_eq!(main.passes.len(), 2);
    let p0 = main.pass("P0").unwrap();
    assert_eq!(
        p0.states.iter().map(|s| s.ty).collect::<Vec<_>>(),
        vec![
            RenderStateType::ZEnable,
            RenderStateType::VertexShader,
            RenderStateType::PixelShader
        ]
    );
    let z_enable = p0.state(RenderStateType::ZEnable).unwrap();
    assert!(z_enable.value.as_bools().unwrap()[0]);
    assert!(effect.technique("Missing").is_none());
}

#[test]
fn finalizes_every_object_kind() {
    let effect = Effect::parse(&full_effect()).unwrap();
    assert_eq!(effect.untyped_objects().count(), 0);
    assert_eq!(effect.object(0).unwrap().state(), ObjectState::Untyped);

    assert_eq!(effect.object(1).unwrap().as_string(), Some("Diffuse Color"));

    let texture = effect.object(2).unwrap();
    assert_eq!(texture.ty, Some(SymbolType::Sampler2D));
    assert_eq!(texture.as_mapping(), Some("diffuse.png"));

    let vs = effect.object(3).unwrap().as_shader().unwrap();
    assert_eq!((vs.technique, vs.pass), (None, None));
    let ShaderPayload::Compiled(vs) = &vs.payload else {
        panic!("expected compiled vertex shader");
    };
    assert_eq!(vs.shader.as_ref().unwrap().stage, ShaderStage::Vertex);
    assert_eq!(vs.parameters, vec![0]);
    assert!(vs.samplers.is_empty());

    let ps = effect.object(4).unwrap().as_shader().unwrap();
    assert_eq!((ps.technique, ps.pass), (Some(0), Some(0)));
    let ShaderPayload::Compiled(ps) = &ps.payload else {
        panic!("expected compiled pixel shader");
    };
    assert_eq!(ps.parameters, vec![1, 3]);
    assert_eq!(ps.samplers.len(), 1);
    assert_eq!(ps.samplers[0].name, "DiffuseSampler");
    assert_eq!(ps.samplers[0].parameter, 3);
    assert_eq!(ps.samplers[0].states[0].ty, SamplerStateType::Texture);
    assert_eq!(ps.samplers[0].states[1].ty, SamplerStateType::MinFilter);

    let pre = effect.object(5).unwrap().as_shader().unwrap();
    assert_eq!((pre.technique, pre.pass), (Some(0), Some(1)));
    let ShaderPayload::Preshader(pre) = &pre.payload else {
        panic!("expected standalone preshader");
    };
    assert_eq!(pre.parameter, 1);
    assert_eq!(pre.parameters, vec![1]);
    assert_eq!(pre.preshader.as_ref().unwrap().literals, vec![0.5]);
}

#[test]
fn shader_parsing_can_be_disabled() {
    let options = DecodeOptions::default().with_parse_shaders(false);
    let effect = Effect::parse_with_options(&full_effect(), &options).unwrap();
    let ShaderPayload::Compiled(vs) = &effect.object(3).unwrap().as_shader().unwrap().payload
    else {
        panic!("expected compiled vertex shader");
    };
    assert!(vs.shader.is_none());
    assert_eq!(vs.bytecode, vertex_shader());
}

#[test]
fn every_truncation_is_a_bounds_fault() {
    let bytes = full_effect();
    for len in 0..bytes.len() {
        let err = Effect::parse(&bytes[..len]).unwrap_err();
        assert_eq!(err.kind(), FaultKind::Bounds, "len={len}: {err}");
    }
}

#[test]
fn legacy_preamble_is_skipped() {
    let mut b = EffectBlobBuilder::new();
    b.legacy_preamble(20);
    let bytes = b.finish();
    assert_eq!(bytes.len() - 20, EffectBlobBuilder::new().finish().len());
    let effect = Effect::parse(&bytes).unwrap();
    assert!(effect.parameters.is_empty());
    assert!(effect.objects.is_empty());
}

#[test]
fn foreign_magic_is_a_container_fault() {
    let mut bytes = EffectBlobBuilder::new().finish();
    bytes[..4].copy_from_slice(&0x0000_0000u32.to_le_bytes());
    let err = Effect::parse(&bytes).unwrap_err();
    assert_eq!(err.kind(), FaultKind::ContainerFormat);
}

fn single_string_effect(object_count: u32) -> Vec<u8> {
    let mut b = EffectBlobBuilder::new();
    b.object_count(object_count);
    let ty = b.object_type("Label", SymbolType::String, 0);
    let value = b.words(&[1]);
    b.parameter(ty, value);
    b.small_object(1, b"Hi");
    b.finish()
}

#[test]
fn small_string_object_is_populated() {
    let effect = Effect::parse(&single_string_effect(3)).unwrap();
    assert_eq!(effect.object(1).unwrap().as_string(), Some("Hi"));
    assert_eq!(effect.untyped_objects().collect::<Vec<_>>(), vec![2]);
}

#[test]
fn untyped_objects_follow_policy() {
    let bytes = single_string_effect(3);
    let ignore = DecodeOptions::default().with_untyped_objects(UntypedObjectPolicy::Ignore);
    assert!(Effect::parse_with_options(&bytes, &ignore).is_ok());

    let reject = DecodeOptions::default().with_untyped_objects(UntypedObjectPolicy::Reject);
    assert_eq!(
        Effect::parse_with_options(&bytes, &reject).unwrap_err(),
        EffectError::UntypedObjects { count: 1, first: 2 }
    );
    assert!(Effect::parse_with_options(&single_string_effect(2), &reject).is_ok());
}

#[test]
fn object_count_limit_is_enforced() {
    let options = DecodeOptions::default().with_max_objects(2);
    assert_eq!(
        Effect::parse_with_options(&single_string_effect(3), &options).unwrap_err(),
        EffectError::TooManyObjects { count: 3, max: 2 }
    );
}

#[test]
fn object_referenced_past_the_table_is_rejected() {
    let err = Effect::parse(&single_string_effect(1)).unwrap_err();
    assert_eq!(err, EffectError::ObjectIndexOutOfRange { index: 1, count: 1 });
    assert_eq!(err.kind(), FaultKind::Decode);
}

#[test]
fn small_record_for_untyped_object_is_unsupported() {
    let mut b = EffectBlobBuilder::new();
    b.object_count(2);
    b.small_object(1, b"orphan\0");
    let err = Effect::parse(&b.finish()).unwrap_err();
    assert_eq!(err, EffectError::UnsupportedObject { index: 1, ty: None });
    assert_eq!(err.kind(), FaultKind::UnsupportedObject);
}

#[test]
fn populating_twice_is_rejected() {
    let mut b = EffectBlobBuilder::new();
    b.object_count(2);
    let ty = b.object_type("Label", SymbolType::String, 0);
    let value = b.words(&[1]);
    b.parameter(ty, value);
    b.small_object(1, b"a\0");
    b.small_object(1, b"b\0");
    let err = Effect::parse(&b.finish()).unwrap_err();
    assert!(matches!(err, EffectError::ObjectAlreadyPopulated { index: 1, .. }));
}

#[test]
fn shader_symbol_without_parameter_is_a_lookup_fault() {
    let mut b = EffectBlobBuilder::new();
    b.object_count(2);
    let vs_ty = b.object_type("", SymbolType::VertexShader, 0);
    let vs = b.words(&[1]);
    b.technique("T", &[], &[PassRecord::new("P").state(146, vs_ty, vs)]);
    b.small_object(1, &vertex_shader());
    let err = Effect::parse(&b.finish()).unwrap_err();
    assert_eq!(
        err,
        EffectError::ParameterNotFound {
            name: "World".to_owned()
        }
    );
    assert_eq!(err.kind(), FaultKind::Lookup);
}

#[test]
fn malformed_shader_bytecode_is_a_decode_fault() {
    let mut b = EffectBlobBuilder::new();
    b.object_count(2);
    let ps_ty = b.object_type("", SymbolType::PixelShader, 0);
    let ps = b.words(&[1]);
    b.technique("T", &[], &[PassRecord::new("P").state(147, ps_ty, ps)]);
    b.small_object(1, &[0u8; 8]);
    let err = Effect::parse(&b.finish()).unwrap_err();
    assert!(matches!(err, EffectError::Shader { index: 1, .. }), "{err:?}");
    assert_eq!(err.kind(), FaultKind::Decode);
}

#[test]
fn large_object_path_out_of_range_is_rejected() {
    let mut b = EffectBlobBuilder::new();
    b.object_count(1);
    b.large_object(3, 0, 0, 0, b"x");
    let err = Effect::parse(&b.finish()).unwrap_err();
    assert_eq!(
        err,
        EffectError::IndexOutOfRange {
            what: "technique",
            index: 3,
            len: 0
        }
    );
}

#[test]
fn large_object_through_sampler_parameter() {
    let mut b = EffectBlobBuilder::new();
    b.object_count(2);
    let texture_ty = b.object_type("", SymbolType::Texture, 0);
    let texture = b.words(&[1]);
    let sampler_ty = b.object_type("Sampler", SymbolType::SamplerCube, 0);
    let sampler = b.sampler_value(&[(4, texture_ty, texture)]);
    b.parameter(sampler_ty, sampler);
    b.large_object(u32::MAX, 0, 0, 0, b"sky.dds\0");
    let effect = Effect::parse(&b.finish()).unwrap();
    let object = effect.object(1).unwrap();
    assert_eq!(object.ty, Some(SymbolType::SamplerCube));
    assert_eq!(object.as_mapping(), Some("sky.dds"));
}

#[test]
fn large_object_of_string_kind_is_unsupported() {
    let mut b = EffectBlobBuilder::new();
    b.object_count(2);
    let label_ty = b.object_type("", SymbolType::String, 0);
    let label = b.words(&[1]);
    b.technique("T", &[], &[PassRecord::new("P").state(146, label_ty, label)]);
    b.large_object(0, 0, 0, 0, b"text\0");
    let err = Effect::parse(&b.finish()).unwrap_err();
    assert_eq!(
        err,
        EffectError::UnsupportedObject {
            index: 1,
            ty: Some(SymbolType::String)
        }
    );
    assert_eq!(err.kind(), FaultKind::UnsupportedObject);
}
