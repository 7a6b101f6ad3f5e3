//! Plain-text summary of a decoded effect.

use std::io::{self, Write};

use xnafx::effect::{
    Effect, EffectAnnotation, EffectObject, EffectPayload, EffectValue, NumericValues, ObjectData,
    ShaderPayload,
};

/// Values printed per numeric payload before eliding the rest.
const MAX_VALUES: usize = 16;

fn join<T: ToString>(values: &[T]) -> String {
    let shown: Vec<String> = values.iter().take(MAX_VALUES).map(T::to_string).collect();
    let mut text = shown.join(", ");
    if values.len() > MAX_VALUES {
        text.push_str(&format!(", ... ({} total)", values.len()));
    }
    text
}

fn describe_value(value: &EffectValue) -> String {
    let ty = &value.ty;
    let shape = format!("{:?} {:?} {}x{}", ty.ty, ty.class, ty.rows, ty.columns);
    let shape = if ty.elements > 0 {
        format!("{shape}[{}]", ty.elements)
    } else {
        shape
    };
    let semantic = if value.semantic.is_empty() {
        String::new()
    } else {
        format!(" : {}", value.semantic)
    };
    let payload = match &value.payload {
        EffectPayload::Numeric(NumericValues::Float(v)) => format!("[{}]", join(v)),
        EffectPayload::Numeric(NumericValues::Int(v)) => format!("[{}]", join(v)),
        EffectPayload::Numeric(NumericValues::Bool(v)) => format!("[{}]", join(v)),
        EffectPayload::Objects(indices) => format!("objects [{}]", join(indices)),
        EffectPayload::SamplerStates(states) => format!("{} sampler states", states.len()),
    };
    format!("{shape}{semantic} = {payload}")
}

fn write_annotations(
    out: &mut dyn Write,
    annotations: &[EffectAnnotation],
    indent: usize,
) -> io::Result<()> {
    for annotation in annotations {
        writeln!(
            out,
            "{:indent$}@{}: {}",
            "",
            annotation.value.name,
            describe_value(&annotation.value)
        )?;
    }
    Ok(())
}

fn describe_object(object: &EffectObject) -> String {
    let ty = object
        .ty
        .map_or_else(|| "untyped".to_owned(), |ty| format!("{ty:?}"));
    match &object.data {
        None => ty,
        Some(ObjectData::String(text)) => format!("{ty} {text:?}"),
        Some(ObjectData::Mapping(name)) => format!("{ty} -> {name:?}"),
        Some(ObjectData::Shader(shader)) => {
            let owner = match (shader.technique, shader.pass) {
                (Some(t), Some(p)) => format!(" (technique {t}, pass {p})"),
                _ => String::new(),
            };
            let body = match &shader.payload {
                ShaderPayload::Compiled(compiled) => match &compiled.shader {
                    Some(parsed) => format!(
                        "{:?} {}.{}, {} bytes, {} symbols, {} samplers{}",
                        parsed.stage,
                        parsed.model.major,
                        parsed.model.minor,
                        compiled.bytecode.len(),
                        compiled.parameters.len(),
                        compiled.samplers.len(),
                        if compiled.preshader_parameters.is_empty() {
                            ""
                        } else {
                            ", preshader"
                        }
                    ),
                    None => format!("{} bytes (not parsed)", compiled.bytecode.len()),
                },
                ShaderPayload::Preshader(preshader) => match &preshader.preshader {
                    Some(program) => format!(
                        "preshader for parameter {}, {} literals, {} temps, {} instructions",
                        preshader.parameter,
                        program.literals.len(),
                        program.temp_count,
                        program.instructions.len()
                    ),
                    None => format!(
                        "preshader for parameter {}, {} bytes (not parsed)",
                        preshader.parameter,
                        preshader.bytecode.len()
                    ),
                },
            };
            format!("{ty} {body}{owner}")
        }
    }
}

pub fn write_effect(out: &mut dyn Write, effect: &Effect) -> io::Result<()> {
    writeln!(
        out,
        "effect: {} parameters, {} techniques, {} objects",
        effect.parameters.len(),
        effect.techniques.len(),
        effect.objects.len()
    )?;

    writeln!(out, "parameters:")?;
    for (index, parameter) in effect.parameters.iter().enumerate() {
        writeln!(
            out,
            "  [{index}] {}: {}",
            parameter.name(),
            describe_value(&parameter.value)
        )?;
        write_annotations(out, &parameter.annotations, 6)?;
        if let Some(states) = parameter.value.sampler_states() {
            for state in states {
                writeln!(out, "      {:?} = {}", state.ty, describe_value(&state.value))?;
            }
        }
    }

    writeln!(out, "techniques:")?;
    for technique in &effect.techniques {
        writeln!(out, "  {}", technique.name)?;
        write_annotations(out, &technique.annotations, 4)?;
        for pass in &technique.passes {
            writeln!(out, "    pass {}", pass.name)?;
            write_annotations(out, &pass.annotations, 6)?;
            for state in &pass.states {
                writeln!(out, "      {:?} = {}", state.ty, describe_value(&state.value))?;
            }
        }
    }

    writeln!(out, "objects:")?;
    for (index, object) in effect.objects.iter().enumerate().skip(1) {
        writeln!(out, "  [{index}] {}", describe_object(object))?;
    }
    Ok(())
}
