//! Request-control layer: duplicate-request cancellation and per-URL
//! serialization.
//!
//! The two pieces are independent and are combined by the client wrapper: a
//! request can be canceled through the [`AbortRegistry`] while it still sits
//! in the [`RequestSerializer`]'s queue; its eventual release then delivers
//! a request the transport layer refuses to send.
mod abort;
mod key;
mod serialize;


pub use abort::AbortRegistry;
pub use key::RequestKey;
pub use serialize::RequestSerializer;
