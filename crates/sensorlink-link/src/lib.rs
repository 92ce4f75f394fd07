//! `sensorlink-link` – serial transport and wire codec.
//!
//! Everything between the OS device node and the command dispatcher lives
//! here.  Bytes arrive through a [`SerialStream`], are framed into lines by
//! [`SerialLink`], and are decoded/encoded by [`CommandCodec`].
//!
//! # Modules
//!
//! - [`stream`] – [`SerialStream`][stream::SerialStream]: the seam between
//!   the link and the OS.  [`PortStream`][stream::PortStream] adapts a real
//!   `serialport` device; tests substitute an in-memory stream.
//! - [`link`] – [`SerialLink`][link::SerialLink]: owns the device for the
//!   lifetime of a server loop, accumulates partial input, enforces the
//!   frame-length bound, and resynchronises after overflow.
//! - [`codec`] – [`CommandCodec`][codec::CommandCodec]: UTF-8 + whitespace +
//!   length discipline inbound, compact JSON + `\r\n` outbound.

pub mod codec;
pub mod link;
pub mod stream;

pub use codec::{CodecError, CommandCodec};
pub use link::{LinkError, SerialLink};
pub use stream::{PortStream, SerialStream};
