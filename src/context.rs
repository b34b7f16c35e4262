use std::ptr::NonNull;

use bitflags::bitflags;
use libgssapi_sys::{
    GSS_C_ANON_FLAG, GSS_C_CONF_FLAG, GSS_C_DELEG_FLAG, GSS_C_INTEG_FLAG, GSS_C_MUTUAL_FLAG, GSS_C_PROT_READY_FLAG,
    GSS_C_REPLAY_FLAG, GSS_C_SEQUENCE_FLAG, GSS_C_TRANS_FLAG, gss_buffer_set_desc_struct, gss_ctx_id_struct,
    gss_ctx_id_t, gss_delete_sec_context, gss_inquire_sec_context_by_oid,
};

use crate::{BufferSet, Error, Oid, SessionKey, error};

bitflags! {
    /// Services the provider granted on an established context.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct CtxFlags: u32 {
        const DELEGATION = GSS_C_DELEG_FLAG;
        const MUTUAL_AUTH = GSS_C_MUTUAL_FLAG;
        const REPLAY_DETECTION = GSS_C_REPLAY_FLAG;
        const SEQUENCE_DETECTION = GSS_C_SEQUENCE_FLAG;
        const CONFIDENTIALITY = GSS_C_CONF_FLAG;
        const INTEGRITY = GSS_C_INTEG_FLAG;
        const ANONYMOUS = GSS_C_ANON_FLAG;
        const PROT_READY = GSS_C_PROT_READY_FLAG;
        const TRANSFERABLE = GSS_C_TRANS_FLAG;
    }
}

pub(crate) struct ContextHandle(NonNull<gss_ctx_id_struct>);
impl ContextHandle {
    pub(crate) fn new(ctx: NonNull<gss_ctx_id_struct>) -> Self {
        Self(ctx)
    }
    pub(crate) fn as_ptr(&self) -> gss_ctx_id_t {
        self.0.as_ptr()
    }

    /// Asks the provider for the property `oid` describes on this context.
    pub(crate) fn inquire_by_oid(&self, oid: &Oid<'_>) -> Result<BufferSet, Error> {
        let mut minor = 0;
        let mut desired = oid.as_desc();
        let mut set: *mut gss_buffer_set_desc_struct = std::ptr::null_mut();
        let major = unsafe {
            gss_inquire_sec_context_by_oid(
                &mut minor,
                self.0.as_ptr(),
                std::ptr::from_mut(&mut desired),
                std::ptr::from_mut(&mut set),
            )
        };
        // take ownership before checking so a set written on failure is still released
        let set = unsafe { BufferSet::from_raw(set) };
        error::check(major, minor)?;
        Ok(set)
    }

    pub(crate) fn session_key(&self) -> Result<SessionKey, Error> {
        let set = self.inquire_by_oid(&Oid::INQ_SSPI_SESSION_KEY)?;
        SessionKey::from_buffer_set(set)
    }
}
impl Drop for ContextHandle {
    fn drop(&mut self) {
        let mut _s = 0;
        unsafe { gss_delete_sec_context(&mut _s, &mut NonNull::as_ptr(self.0), std::ptr::null_mut()) };
    }
}
// Exclusive owner of the context, which providers allow to move between threads
unsafe impl Send for ContextHandle {}
