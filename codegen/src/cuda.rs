//! CUDA launch-wrapper generation.
//!
//! # Entry Point
//!
//! ```cpp
//! extern "C" void launch(void* raw_X, int N, int& __return_code);
//! ```
//! - one parameter per argument definition, in declaration order, typed by the
//!   raw-ABI table
//! - buffers and streams arrive as `void* raw_<name>` and are cast to
//!   `<name>` before the body runs; scalars already have their semantic type
//!   and arrive as `<name>`
//! - the trailing status reference is set to zero after the body. Any other
//!   value has to come from the body itself.

use std::collections::HashSet;

use copyan_dtype::{AbiType, ArgumentDefinition, is_c_identifier};
use snafu::{OptionExt, ensure};

use crate::error::{DuplicateArgumentNameSnafu, InvalidArgumentNameSnafu, Result, UnsupportedArgumentTypeSnafu};

/// Name of the exported entry point.
pub const ENTRY_POINT: &str = "launch";

/// Name of the trailing status-code parameter.
pub const STATUS_PARAM: &str = "__return_code";

const PREAMBLE: [&str; 3] = ["<cuda_runtime.h>", "<cuda_fp16.h>", "<cuda_bf16.h>"];

const INDENT: &str = "    ";

/// Validate argument definitions against the raw-ABI table.
///
/// Returns the ABI mapping of every definition, in order. Fails on the first
/// unmapped type, invalid name, or name collision between emitted parameters.
pub fn check_supported(arg_defs: &[ArgumentDefinition]) -> Result<Vec<AbiType>> {
    let mut seen: HashSet<String> = HashSet::from([STATUS_PARAM.to_string()]);
    let mut abis = Vec::with_capacity(arg_defs.len());

    for def in arg_defs {
        ensure!(
            is_c_identifier(&def.name) && def.name != STATUS_PARAM,
            InvalidArgumentNameSnafu { name: def.name.clone() }
        );

        let abi = def.ty.abi().context(UnsupportedArgumentTypeSnafu { name: def.name.clone(), ty: def.ty })?;

        ensure!(seen.insert(def.name.clone()), DuplicateArgumentNameSnafu { name: def.name.clone() });
        if abi.needs_cast() {
            let raw = raw_name(&def.name);
            ensure!(seen.insert(raw.clone()), DuplicateArgumentNameSnafu { name: raw });
        }

        abis.push(abi);
    }

    Ok(abis)
}

/// Render a complete translation unit around a launch body.
///
/// `includes` are emitted after the fixed CUDA preamble, in order, each as
/// `#include <text>`; callers supply the quoting (`"reduce.cuh"` or
/// `<cub/cub.cuh>`). `body` is inserted verbatim, indented one level.
pub fn generate<S: AsRef<str>>(includes: &[S], arg_defs: &[ArgumentDefinition], body: &str) -> Result<String> {
    let abis = check_supported(arg_defs)?;

    let mut code_lines: Vec<String> = Vec::new();

    // Includes
    for include in PREAMBLE {
        code_lines.push(format!("#include {include}"));
    }
    for include in includes {
        code_lines.push(format!("#include {}", include.as_ref()));
    }
    code_lines.push(String::new());

    // Entry point signature
    let mut params: Vec<String> = arg_defs
        .iter()
        .zip(&abis)
        .map(|(def, abi)| {
            let name = if abi.needs_cast() { raw_name(&def.name) } else { def.name.clone() };
            format!("{} {name}", abi.raw.c_name())
        })
        .collect();
    params.push(format!("int& {STATUS_PARAM}"));
    code_lines.push(format!("extern \"C\" void {ENTRY_POINT}({}) {{", params.join(", ")));

    // Raw pointer casts
    let casts: Vec<String> = arg_defs
        .iter()
        .zip(&abis)
        .filter(|(_, abi)| abi.needs_cast())
        .map(|(def, abi)| {
            format!("{INDENT}auto {} = reinterpret_cast<{}>({});", def.name, abi.semantic, raw_name(&def.name))
        })
        .collect();
    if !casts.is_empty() {
        code_lines.extend(casts);
        code_lines.push(String::new());
    }

    // Launch body
    code_lines.extend(body.lines().map(|line| if line.is_empty() { String::new() } else { format!("{INDENT}{line}") }));

    code_lines.push(format!("{INDENT}{STATUS_PARAM} = 0;"));
    code_lines.push("}".to_string());
    code_lines.push(String::new());

    let code = code_lines.join("\n");
    tracing::debug!(kernel.num_args = arg_defs.len(), kernel.code_len = code.len(), "generated launch wrapper");

    Ok(code)
}

fn raw_name(name: &str) -> String {
    format!("raw_{name}")
}
