use std::fmt;

use libgssapi_sys::{gss_buffer_set_desc_struct, gss_release_buffer_set};

/// An ordered set of opaque buffers answering a context inquiry.
///
/// The provider allocates and populates the whole set; this handle owns it
/// and releases it as a whole through `gss_release_buffer_set` on drop. The
/// individual elements are never freed separately.
pub struct BufferSet(*mut gss_buffer_set_desc_struct);
impl BufferSet {
    /// # Safety
    /// `set` must be null or a buffer set the provider handed out and nothing
    /// else has released.
    pub(crate) unsafe fn from_raw(set: *mut gss_buffer_set_desc_struct) -> Self {
        Self(set)
    }

    /// Number of buffers in the set. A null set counts as empty.
    pub fn len(&self) -> usize {
        if self.0.is_null() {
            0
        } else {
            unsafe { (*self.0).count }
        }
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<&[u8]> {
        if index >= self.len() {
            return None;
        }
        let element = unsafe { &*(*self.0).elements.add(index) };
        if element.value.is_null() {
            Some(&[])
        } else {
            Some(unsafe { std::slice::from_raw_parts(element.value as *const u8, element.length) })
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        (0..self.len()).map(|index| self.get(index).unwrap_or(&[]))
    }
}
impl Drop for BufferSet {
    fn drop(&mut self) {
        if !self.0.is_null() {
            let mut _min = 0;
            let _maj = unsafe { gss_release_buffer_set(&mut _min, &mut self.0) };
        }
    }
}
// Sole owner of the set, exposes the elements by shared reference only
unsafe impl Send for BufferSet {}
unsafe impl Sync for BufferSet {}

impl fmt::Debug for BufferSet {
    // buffer sets regularly hold key material, so print shape only
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferSet")
            .field("count", &self.len())
            .field("lengths", &self.iter().map(<[u8]>::len).collect::<Vec<_>>())
            .finish()
    }
}

impl<'set> IntoIterator for &'set BufferSet {
    type Item = &'set [u8];
    type IntoIter = Iter<'set>;
    fn into_iter(self) -> Iter<'set> {
        Iter { set: self, index: 0 }
    }
}

pub struct Iter<'set> {
    set: &'set BufferSet,
    index: usize,
}
impl<'set> Iterator for Iter<'set> {
    type Item = &'set [u8];
    fn next(&mut self) -> Option<&'set [u8]> {
        let item = self.set.get(self.index)?;
        self.index += 1;
        Some(item)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.set.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use std::{ffi::c_void, mem::ManuallyDrop};

    use libgssapi_sys::gss_buffer_desc_struct;

    use super::*;

    // Builds a set over stack buffers. ManuallyDrop keeps Drop from handing
    // a pointer the provider never allocated to gss_release_buffer_set.
    fn stack_set<'a>(elements: &'a mut [gss_buffer_desc_struct], desc: &'a mut gss_buffer_set_desc_struct) -> ManuallyDrop<BufferSet> {
        desc.count = elements.len();
        desc.elements = elements.as_mut_ptr();
        ManuallyDrop::new(unsafe { BufferSet::from_raw(desc) })
    }

    fn element(bytes: &[u8]) -> gss_buffer_desc_struct {
        gss_buffer_desc_struct {
            length: bytes.len(),
            value: bytes.as_ptr() as *mut c_void,
        }
    }

    #[test]
    fn elements_are_indexed_against_count() {
        let first = *b"key material";
        let second = [0x12];
        let mut elements = [element(&first), element(&second)];
        let mut desc = gss_buffer_set_desc_struct {
            count: 0,
            elements: std::ptr::null_mut(),
        };
        let set = stack_set(&mut elements, &mut desc);
        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());
        assert_eq!(set.get(0), Some(&first[..]));
        assert_eq!(set.get(1), Some(&second[..]));
        assert_eq!(set.get(2), None);
        let in_order: Vec<_> = set.iter().collect();
        assert_eq!(in_order, [&first[..], &second[..]]);
        let via_into_iter: Vec<_> = (&*set).into_iter().collect();
        assert_eq!(via_into_iter, in_order);
    }

    #[test]
    fn zero_count_ignores_the_element_pointer() {
        let backing = [0xff];
        let mut elements = [element(&backing)];
        let mut desc = gss_buffer_set_desc_struct {
            count: 0,
            elements: std::ptr::null_mut(),
        };
        desc.elements = elements.as_mut_ptr();
        let set = ManuallyDrop::new(unsafe { BufferSet::from_raw(&mut desc) });
        assert!(set.is_empty());
        assert_eq!(set.get(0), None);
    }

    #[test]
    fn debug_prints_shape_but_not_contents() {
        let secret = *b"hunter2";
        let mut elements = [element(&secret)];
        let mut desc = gss_buffer_set_desc_struct {
            count: 0,
            elements: std::ptr::null_mut(),
        };
        let set = stack_set(&mut elements, &mut desc);
        let rendered = format!("{:?}", *set);
        assert_eq!(rendered, "BufferSet { count: 1, lengths: [7] }");
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn null_set_is_empty() {
        let set = unsafe { BufferSet::from_raw(std::ptr::null_mut()) };
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert_eq!(set.get(0), None);
        assert_eq!(set.iter().count(), 0);
        assert_eq!((&set).into_iter().count(), 0);
    }

    #[test]
    fn null_set_debug_does_not_dereference() {
        let set = unsafe { BufferSet::from_raw(std::ptr::null_mut()) };
        assert_eq!(format!("{set:?}"), "BufferSet { count: 0, lengths: [] }");
    }

    #[test]
    fn element_layout_matches_the_extension_header() {
        // count then elements pointer, native alignment
        assert_eq!(
            std::mem::size_of::<gss_buffer_set_desc_struct>(),
            std::mem::size_of::<usize>() + std::mem::size_of::<*mut ()>(),
        );
        let mut elements = [];
        let desc = gss_buffer_set_desc_struct {
            count: 0,
            elements: elements.as_mut_ptr(),
        };
        assert_eq!(desc.count, 0);
    }
}
