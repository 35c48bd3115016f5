use std::sync::Arc;

use copyan_codegen::TemplateKeys;
use copyan_device::{ComputeCapability, DevicePtr, FixedAccelerator};
use copyan_dtype::{ArgumentDefinition, ScalarType};
use copyan_runtime::testing::RecordingCompiler;
use copyan_runtime::{BuildCache, JitConfig, KernelArg};
use test_case::test_case;

use crate::{Error, KernelRequest, Tuner};

fn tuner(root: &std::path::Path) -> (Tuner, RecordingCompiler) {
    let compiler = RecordingCompiler::new();
    let config = JitConfig::builder().cache_dir(root).build();
    let accelerator = FixedAccelerator::new(ComputeCapability::new(9, 0));
    (Tuner::new(BuildCache::with_parts(config, compiler.clone(), accelerator)), compiler)
}

fn reduce_request() -> KernelRequest {
    KernelRequest::builder()
        .name("reduce_sum")
        .includes(vec!["\"reduce/reduce.cuh\"".to_string()])
        .arg_defs(vec![
            ArgumentDefinition::buffer("X", ScalarType::Float32),
            ArgumentDefinition::buffer("y", ScalarType::Float32),
            ArgumentDefinition::scalar("N", ScalarType::Int32),
        ])
        .template("reduce_sum<{BLOCK}><<<1, {BLOCK}>>>(X, y, N);")
        .build()
}

fn reduce_args() -> [KernelArg; 3] {
    [KernelArg::Buffer(DevicePtr::new(0x1000)), KernelArg::Buffer(DevicePtr::new(0x2000)), KernelArg::Int(1024)]
}

fn generated_source(compiler: &RecordingCompiler, call: usize) -> String {
    compiler.sources()[call].clone()
}

#[test]
fn test_repeat_request_skips_codegen_and_build() {
    let root = tempfile::tempdir().unwrap();
    let (tuner, compiler) = tuner(root.path());
    let keys = TemplateKeys::new().with("BLOCK", 256);

    let first = tuner.compile_and_tune(&reduce_request(), &keys, &[], &reduce_args()).unwrap();
    let second = tuner.compile_and_tune(&reduce_request(), &keys, &[], &reduce_args()).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(compiler.calls(), 1);
    assert_eq!(tuner.len(), 1);
}

#[test]
fn test_keys_are_substituted() {
    let root = tempfile::tempdir().unwrap();
    let (tuner, compiler) = tuner(root.path());
    let keys = TemplateKeys::new().with("BLOCK", 512);

    tuner.compile_and_tune(&reduce_request(), &keys, &[], &reduce_args()).unwrap();

    let source = generated_source(&compiler, 0);
    assert!(source.contains("    reduce_sum<512><<<1, 512>>>(X, y, N);"), "{source}");
    assert!(source.contains("#include \"reduce/reduce.cuh\""), "{source}");
}

#[test]
fn test_only_first_candidate_is_compiled() {
    let root = tempfile::tempdir().unwrap();
    let (tuner, compiler) = tuner(root.path());
    let keys = TemplateKeys::new().with("BLOCK", 128);
    let space = [TemplateKeys::new().with("BLOCK", 1024), TemplateKeys::new().with("BLOCK", 64)];

    tuner.compile_and_tune(&reduce_request(), &keys, &space, &reduce_args()).unwrap();

    assert_eq!(compiler.calls(), 1);
    let source = generated_source(&compiler, 0);
    assert!(source.contains("reduce_sum<1024>"), "{source}");

    // The same effective configuration reached without a space hits the cache.
    tuner.compile_and_tune(&reduce_request(), &TemplateKeys::new().with("BLOCK", 1024), &[], &reduce_args()).unwrap();
    assert_eq!(compiler.calls(), 1);
}

#[test]
fn test_distinct_configurations_are_cached_separately() {
    let root = tempfile::tempdir().unwrap();
    let (tuner, compiler) = tuner(root.path());

    let small = tuner.compile_and_tune(&reduce_request(), &TemplateKeys::new().with("BLOCK", 64), &[], &reduce_args());
    let large = tuner.compile_and_tune(&reduce_request(), &TemplateKeys::new().with("BLOCK", 256), &[], &reduce_args());

    assert_ne!(small.unwrap().path(), large.unwrap().path());
    assert_eq!(compiler.calls(), 2);
    assert_eq!(tuner.len(), 2);
}

#[test]
fn test_unsupported_type_fails_before_compiling() {
    let root = tempfile::tempdir().unwrap();
    let (tuner, compiler) = tuner(root.path());
    let request = KernelRequest::builder()
        .name("norm")
        .arg_defs(vec![ArgumentDefinition::buffer("X", ScalarType::Float64)])
        .template("norm(X);")
        .build();

    let err = tuner
        .compile_and_tune(&request, &TemplateKeys::new(), &[], &[KernelArg::Buffer(DevicePtr::null())])
        .unwrap_err();

    assert!(matches!(err, Error::Codegen { source: copyan_codegen::Error::UnsupportedArgumentType { .. } }), "{err}");
    assert_eq!(compiler.calls(), 0);
    assert!(tuner.is_empty());
}

#[test_case(&[] ; "missing arguments")]
#[test_case(&[KernelArg::Int(1), KernelArg::Int(2), KernelArg::Int(3)] ; "wrong categories")]
fn test_argument_mismatch_fails_before_compiling(args: &[KernelArg]) {
    let root = tempfile::tempdir().unwrap();
    let (tuner, compiler) = tuner(root.path());

    let err = tuner.compile_and_tune(&reduce_request(), &TemplateKeys::new().with("BLOCK", 32), &[], args).unwrap_err();

    assert!(matches!(err, Error::Runtime { source: copyan_runtime::Error::ArgumentMismatch { .. } }), "{err}");
    assert_eq!(compiler.calls(), 0);
}
