use std::ptr::NonNull;

use libgssapi_sys::{
    gss_OID, gss_buffer_desc_struct, gss_channel_bindings_struct, gss_ctx_id_t, gss_init_sec_context,
};

use crate::{
    BufferSet, Error, Oid, SessionKey, gss_mech_krb5,
    buffer::OwnedBuffer,
    context::{ContextHandle, CtxFlags},
    cred::Credentials,
    error,
    name::NameHandle,
};

mod builder;
pub use builder::ClientBuilder;

pub enum StepOut {
    /// More round trips needed, send [`PendingClientContext::next_token`] to the acceptor.
    Pending(PendingClientContext),
    Established(ClientContext),
}

/// A context mid-establishment on the initiating side.
pub struct PendingClientContext {
    context: ContextHandle,
    cred: Credentials,
    target: NameHandle,
    next_token: OwnedBuffer,
    requested_flags: CtxFlags,
    lifetime: u32,
}
impl PendingClientContext {
    /// The token the acceptor expects next.
    pub fn next_token(&self) -> &[u8] {
        self.next_token.as_slice()
    }

    /// Feeds the acceptor's answer back into the provider.
    pub fn step(self, token: &[u8]) -> Result<StepOut, Error> {
        step(
            Some(self.context),
            self.cred,
            self.target,
            Some(token),
            self.requested_flags,
            self.lifetime,
        )
    }
}

/// An established context on the initiating side.
pub struct ClientContext {
    context: ContextHandle,
    flags: CtxFlags,
    final_token: Option<OwnedBuffer>,
}
impl ClientContext {
    /// A token produced alongside completion that the acceptor still needs.
    pub fn last_token(&self) -> Option<&[u8]> {
        self.final_token.as_ref().map(OwnedBuffer::as_slice)
    }
    pub fn flags(&self) -> CtxFlags {
        self.flags
    }
    pub fn is_mutually_authenticated(&self) -> bool {
        self.flags.contains(CtxFlags::MUTUAL_AUTH)
    }

    /// Asks the provider for the property `oid` describes.
    pub fn inquire_by_oid(&self, oid: &Oid<'_>) -> Result<BufferSet, Error> {
        self.context.inquire_by_oid(oid)
    }
    pub fn session_key(&self) -> Result<SessionKey, Error> {
        self.context.session_key()
    }
}

pub(crate) fn step(
    existing: Option<ContextHandle>,
    cred: Credentials,
    target: NameHandle,
    input: Option<&[u8]>,
    requested_flags: CtxFlags,
    lifetime: u32,
) -> Result<StepOut, Error> {
    let mut minor = 0;
    let mut ctx_ptr: gss_ctx_id_t = existing
        .as_ref()
        .map(ContextHandle::as_ptr)
        .unwrap_or(std::ptr::null_mut());
    let mut input_desc = input.map(|token| gss_buffer_desc_struct {
        length: token.len(),
        value: token.as_ptr() as *mut std::ffi::c_void,
    });
    let mut output = OwnedBuffer::empty();
    let mut granted = 0;
    let major = unsafe {
        gss_init_sec_context(
            &mut minor,
            cred.as_ptr(),
            &mut ctx_ptr,
            target.as_ptr(),
            gss_mech_krb5,
            requested_flags.bits(),
            lifetime,
            std::ptr::null_mut::<gss_channel_bindings_struct>(),
            input_desc
                .as_mut()
                .map(std::ptr::from_mut)
                .unwrap_or(std::ptr::null_mut()),
            std::ptr::null_mut::<gss_OID>(),
            output.as_mut_ptr(),
            &mut granted,
            std::ptr::null_mut(),
        )
    };
    // adopt the context the provider created on the first call; dropping it
    // on the error path deletes a half-built context
    let context = existing.or_else(|| NonNull::new(ctx_ptr).map(ContextHandle::new));
    error::check(major, minor)?;
    let context = context.ok_or_else(error::failure)?;
    if error::continue_needed(major) {
        Ok(StepOut::Pending(PendingClientContext {
            context,
            cred,
            target,
            next_token: output,
            requested_flags,
            lifetime,
        }))
    } else {
        Ok(StepOut::Established(ClientContext {
            context,
            flags: CtxFlags::from_bits_truncate(granted),
            final_token: (!output.is_empty()).then_some(output),
        }))
    }
}
