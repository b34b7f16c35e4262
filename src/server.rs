use std::ptr::NonNull;

use libgssapi_sys::{
    gss_OID, gss_accept_sec_context, gss_buffer_desc_struct, gss_channel_bindings_struct, gss_cred_id_t,
    gss_ctx_id_t, gss_name_struct, gss_name_t,
};

use crate::{
    BufferSet, Error, Oid, SessionKey,
    buffer::OwnedBuffer,
    context::{ContextHandle, CtxFlags},
    cred::Credentials,
    error,
    name::NameHandle,
};

pub enum StepOut {
    /// More round trips needed, send [`PendingServerContext::next_token`] back to the initiator.
    Pending(PendingServerContext),
    Established(ServerContext),
}

/// A context mid-establishment on the accepting side.
pub struct PendingServerContext {
    context: ContextHandle,
    cred: Credentials,
    next_token: OwnedBuffer,
    // flags and the initiator name trickle in across steps
    flags: CtxFlags,
    initiator: Option<NameHandle>,
}
impl PendingServerContext {
    pub fn next_token(&self) -> &[u8] {
        self.next_token.as_slice()
    }
    pub fn step(self, token: &[u8]) -> Result<StepOut, Error> {
        step(Some((self.context, self.flags, self.initiator)), self.cred, token)
    }
}

/// An established context on the accepting side.
pub struct ServerContext {
    context: ContextHandle,
    flags: CtxFlags,
    initiator: Option<NameHandle>,
    final_token: Option<OwnedBuffer>,
}
impl ServerContext {
    /// Starts accepting with the initiator's first token.
    pub fn accept(cred: Credentials, token: &[u8]) -> Result<StepOut, Error> {
        step(None, cred, token)
    }

    /// The authenticated name of the initiator, when the provider reported one.
    pub fn initiator(&self) -> Option<&NameHandle> {
        self.initiator.as_ref()
    }
    /// A token produced alongside completion that the initiator still needs,
    /// e.g. the mutual authentication answer.
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

fn step(
    existing: Option<(ContextHandle, CtxFlags, Option<NameHandle>)>,
    cred: Credentials,
    token: &[u8],
) -> Result<StepOut, Error> {
    let (existing, mut flags, mut initiator) = match existing {
        Some((context, flags, initiator)) => (Some(context), flags, initiator),
        None => (None, CtxFlags::empty(), None),
    };
    let mut minor = 0;
    let mut ctx_ptr: gss_ctx_id_t = existing
        .as_ref()
        .map(ContextHandle::as_ptr)
        .unwrap_or(std::ptr::null_mut());
    let mut input_desc = gss_buffer_desc_struct {
        length: token.len(),
        value: token.as_ptr() as *mut std::ffi::c_void,
    };
    let mut src_name: gss_name_t = std::ptr::null_mut::<gss_name_struct>();
    let mut output = OwnedBuffer::empty();
    let mut granted = 0;
    let major = unsafe {
        gss_accept_sec_context(
            &mut minor,
            &mut ctx_ptr,
            cred.as_ptr(),
            &mut input_desc,
            std::ptr::null_mut::<gss_channel_bindings_struct>(),
            &mut src_name,
            std::ptr::null_mut::<gss_OID>(),
            output.as_mut_ptr(),
            &mut granted,
            std::ptr::null_mut(),
            std::ptr::null_mut::<gss_cred_id_t>(),
        )
    };
    if let Some(name) = NameHandle::from_raw(src_name) {
        initiator = Some(name);
    }
    // adopt the context the provider created on the first call; dropping it
    // on the error path deletes a half-built context
    let context = existing.or_else(|| NonNull::new(ctx_ptr).map(ContextHandle::new));
    error::check(major, minor)?;
    let context = context.ok_or_else(error::failure)?;
    flags |= CtxFlags::from_bits_truncate(granted);
    if error::continue_needed(major) {
        Ok(StepOut::Pending(PendingServerContext {
            context,
            cred,
            next_token: output,
            flags,
            initiator,
        }))
    } else {
        Ok(StepOut::Established(ServerContext {
            context,
            flags,
            initiator,
            final_token: (!output.is_empty()).then_some(output),
        }))
    }
}
