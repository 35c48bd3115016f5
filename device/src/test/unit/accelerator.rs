use crate::{Accelerator, ComputeCapability, FixedAccelerator};

#[test]
fn test_fixed_accelerator() {
    let accelerator = FixedAccelerator::new(ComputeCapability::new(8, 9));
    assert_eq!(accelerator.compute_capability().unwrap(), ComputeCapability::new(8, 9));
    assert_eq!(accelerator.name(), "fixed");
}

#[test]
fn test_accelerator_is_object_safe() {
    let boxed: Box<dyn Accelerator> = Box::new(FixedAccelerator::new(ComputeCapability::new(8, 0)));
    assert_eq!(boxed.compute_capability().unwrap().arch_code(), "80");
}
