use std::ffi::c_void;

use crate::{DevicePtr, StreamHandle};

#[test]
fn test_device_ptr_raw_round_trip() {
    let ptr = DevicePtr::new(0x7f00_dead_beef);
    assert_eq!(ptr.as_raw() as usize as u64, 0x7f00_dead_beef);
    assert_eq!(DevicePtr::from(ptr.as_raw()), ptr);
    assert!(DevicePtr::null().is_null());
}

#[test]
fn test_default_stream_is_null() {
    let stream = StreamHandle::default();
    assert!(stream.is_default());
    assert!(stream.as_raw().is_null());

    let raw = 0x1000usize as *mut c_void;
    let stream = unsafe { StreamHandle::from_raw(raw) };
    assert_eq!(stream.as_raw(), raw);
    assert!(!stream.is_default());
}
