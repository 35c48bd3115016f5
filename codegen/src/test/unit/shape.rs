//! Structural properties of generated entry points.

use proptest::prelude::*;

use copyan_dtype::test::generators::argument_definitions;

use crate::generate;

fn launch_params(code: &str) -> Vec<String> {
    let line = code.lines().find(|l| l.starts_with("extern \"C\" void launch(")).expect("no entry point");
    let inner = line.trim_start_matches("extern \"C\" void launch(").trim_end_matches(") {");
    inner.split(", ").map(str::to_string).collect()
}

proptest! {
    #[test]
    fn entry_point_has_one_param_per_argument_plus_status(defs in argument_definitions(8)) {
        let code = generate(&["\"k.cuh\""], &defs, "kernel<<<1, 1>>>();").unwrap();
        let params = launch_params(&code);

        prop_assert_eq!(params.len(), defs.len() + 1);
        prop_assert_eq!(params.last().unwrap(), "int& __return_code");

        for (def, param) in defs.iter().zip(&params) {
            let abi = def.ty.abi().unwrap();
            let expected_name = if abi.needs_cast() { format!("raw_{}", def.name) } else { def.name.clone() };
            prop_assert_eq!(param, &format!("{} {}", abi.raw.c_name(), expected_name));
        }
    }

    #[test]
    fn casts_only_for_differing_types(defs in argument_definitions(8)) {
        let code = generate(&["\"k.cuh\""], &defs, "").unwrap();

        let expected = defs.iter().filter(|d| d.ty.abi().unwrap().needs_cast()).count();
        prop_assert_eq!(code.matches("reinterpret_cast<").count(), expected);

        for def in &defs {
            let cast = format!("auto {} = reinterpret_cast<", def.name);
            prop_assert_eq!(code.contains(&cast), def.ty.abi().unwrap().needs_cast());
        }
    }

    #[test]
    fn generation_is_deterministic(defs in argument_definitions(6)) {
        let a = generate(&["\"k.cuh\""], &defs, "go();").unwrap();
        let b = generate(&["\"k.cuh\""], &defs, "go();").unwrap();
        prop_assert_eq!(a, b);
    }
}
