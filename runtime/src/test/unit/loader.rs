//! Load-and-call tests against real shared libraries built from plain C.
//!
//! Skipped when no host C compiler is available.

use std::fs;
use std::path::Path;

use copyan_device::{DevicePtr, StreamHandle};
use copyan_dtype::{ArgumentDefinition, ScalarType};

use super::{config_in, hopper};
use crate::artifact::{ArtifactPaths, DESCRIPTOR_FILE};
use crate::testing::HostCompiler;
use crate::{BuildCache, Error, KernelArg, Runtime};

macro_rules! require_cc {
    () => {
        if !HostCompiler::available() {
            eprintln!("skipping: no host C compiler");
            return;
        }
    };
}

fn host_cache(root: &Path) -> (BuildCache, HostCompiler) {
    let compiler = HostCompiler::new();
    (BuildCache::with_parts(config_in(root), compiler.clone(), hopper()), compiler)
}

const NOOP: &str = "void launch(int* status) { *status = 0; }\n";

const MIXED: &str = r#"
#include <stdbool.h>
#include <stdint.h>

void launch(void* raw_out, int n, float scale, bool flag, void* stream, int* status) {
    int32_t* out = (int32_t*)raw_out;
    out[0] = n;
    out[1] = (int32_t)(scale * 4.0f);
    out[2] = flag ? 1 : 0;
    out[3] = stream == 0 ? 0 : 1;
    *status = 7;
}
"#;

fn mixed_defs() -> Vec<ArgumentDefinition> {
    vec![
        ArgumentDefinition::buffer("out", ScalarType::Int32),
        ArgumentDefinition::scalar("n", ScalarType::Int32),
        ArgumentDefinition::scalar("scale", ScalarType::Float32),
        ArgumentDefinition::scalar("flag", ScalarType::Bool),
        ArgumentDefinition::stream("stream"),
    ]
}

#[test]
fn test_zero_arg_kernel_built_once_called_twice() {
    require_cc!();
    let root = tempfile::tempdir().unwrap();
    let (cache, compiler) = host_cache(root.path());

    let first = cache.build("null_op", &[], NOOP).unwrap();
    let status = unsafe { first.call(&[]) }.unwrap();
    assert_eq!(status, 0);
    assert!(first.is_loaded());

    let second = cache.build("null_op", &[], NOOP).unwrap();
    assert_eq!(unsafe { second.call(&[]) }.unwrap(), 0);
    assert_eq!(compiler.calls(), 1);
}

#[test]
fn test_status_is_passed_through() {
    require_cc!();
    let root = tempfile::tempdir().unwrap();
    let (cache, _) = host_cache(root.path());

    let runtime = cache.build("failing", &[], "void launch(int* status) { *status = 42; }\n").unwrap();
    assert_eq!(unsafe { runtime.call(&[]) }.unwrap(), 42);
}

#[test]
fn test_mixed_arguments_are_marshaled() {
    require_cc!();
    let root = tempfile::tempdir().unwrap();
    let (cache, _) = host_cache(root.path());
    let runtime = cache.build("mixed", &mixed_defs(), MIXED).unwrap();

    let mut out = [0i32; 4];
    let args = [
        KernelArg::Buffer(DevicePtr::from(out.as_mut_ptr())),
        KernelArg::Int(-3),
        KernelArg::Float(2.5),
        KernelArg::Bool(true),
        KernelArg::Stream(StreamHandle::default_stream()),
    ];

    let status = unsafe { runtime.call(&args) }.unwrap();
    assert_eq!(status, 7);
    assert_eq!(out, [-3, 10, 1, 0]);
    assert_eq!(runtime.descriptor().unwrap().args(), mixed_defs());
}

#[test]
fn test_argument_mismatch_is_rejected_before_call() {
    require_cc!();
    let root = tempfile::tempdir().unwrap();
    let (cache, _) = host_cache(root.path());
    let runtime = cache.build("mixed", &mixed_defs(), MIXED).unwrap();

    let err = unsafe { runtime.call(&[KernelArg::Int(1)]) }.unwrap_err();
    assert!(matches!(err, Error::ArgumentMismatch { .. }), "{err}");

    let swapped = [
        KernelArg::Int(-3),
        KernelArg::Buffer(DevicePtr::null()),
        KernelArg::Float(2.5),
        KernelArg::Bool(true),
        KernelArg::Stream(StreamHandle::default_stream()),
    ];
    let err = unsafe { runtime.call(&swapped) }.unwrap_err();
    assert!(matches!(err, Error::ArgumentMismatch { .. }), "{err}");
}

#[test]
fn test_missing_entry_point() {
    require_cc!();
    let root = tempfile::tempdir().unwrap();
    let (cache, _) = host_cache(root.path());
    let runtime = cache.build("no_launch", &[], "void other(void) {}\n").unwrap();

    let err = unsafe { runtime.call(&[]) }.unwrap_err();
    assert!(matches!(err, Error::EntryPointNotFound { ref name, .. } if name == "launch"), "{err}");
    assert!(!runtime.is_loaded());
}

fn fake_artifact(descriptor: Option<&str>) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let paths = ArtifactPaths::new(dir.path());
    fs::write(paths.library(), b"not a shared library").unwrap();
    if let Some(text) = descriptor {
        fs::write(dir.path().join(DESCRIPTOR_FILE), text).unwrap();
    }
    dir
}

#[test]
fn test_missing_descriptor_is_malformed() {
    let dir = fake_artifact(None);
    let err = unsafe { Runtime::new(dir.path()).call(&[]) }.unwrap_err();
    assert!(matches!(err, Error::MalformedArgumentDescriptor { .. }), "{err}");
}

#[test]
fn test_corrupt_descriptor_is_malformed() {
    let dir = fake_artifact(Some("x: quaternion\n"));
    let runtime = Runtime::new(dir.path());

    let err = unsafe { runtime.call(&[]) }.unwrap_err();
    assert!(matches!(err, Error::MalformedArgumentDescriptor { ref reason, .. } if reason.contains("quaternion")), "{err}");

    // Not repaired or cached as loaded.
    assert!(!runtime.is_loaded());
    assert!(runtime.descriptor().is_err());
}

#[test]
fn test_unloadable_library() {
    let dir = fake_artifact(Some("()\n"));
    let err = unsafe { Runtime::new(dir.path()).call(&[]) }.unwrap_err();
    assert!(matches!(err, Error::LibraryLoad { .. }), "{err}");
}
