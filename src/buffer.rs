use libgssapi_sys::{gss_buffer_desc_struct, gss_release_buffer};

/// A single provider-allocated buffer, released through `gss_release_buffer`.
pub(crate) struct OwnedBuffer(gss_buffer_desc_struct);
impl OwnedBuffer {
    pub(crate) fn empty() -> Self {
        Self(gss_buffer_desc_struct {
            length: 0,
            value: std::ptr::null_mut(),
        })
    }
    pub(crate) fn as_mut_ptr(&mut self) -> *mut gss_buffer_desc_struct {
        std::ptr::from_mut(&mut self.0)
    }
    pub(crate) fn as_slice(&self) -> &[u8] {
        if self.0.value.is_null() {
            &[]
        } else {
            unsafe { std::slice::from_raw_parts(self.0.value as *const u8, self.0.length) }
        }
    }
    pub(crate) fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}
impl Drop for OwnedBuffer {
    fn drop(&mut self) {
        if !self.0.value.is_null() {
            let mut _min = 0;
            let _maj = unsafe { gss_release_buffer(&mut _min, &mut self.0) };
        }
    }
}
// Sole owner of the allocation, no interior mutability
unsafe impl Send for OwnedBuffer {}
unsafe impl Sync for OwnedBuffer {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer_is_an_empty_slice() {
        let buffer = OwnedBuffer::empty();
        assert!(buffer.is_empty());
        assert_eq!(buffer.as_slice(), &[] as &[u8]);
    }
}
