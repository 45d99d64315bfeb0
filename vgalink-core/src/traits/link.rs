//! Outbound link to the streaming host

/// Transport toward the host
///
/// Called from the line interrupt as well as the receive context, so
/// implementations must not block; queue the bytes and return.
pub trait HostLink {
    /// Error type for send operations
    type Error;

    /// Queue bytes for transmission
    fn send(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

impl<T: HostLink + ?Sized> HostLink for &mut T {
    type Error = T::Error;

    fn send(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        (**self).send(bytes)
    }
}
