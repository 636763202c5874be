//! The reliable, ordered message channel between the two parties.
//!
//! Transport is an external concern: the protocols only need blocking `send` and `receive`
//! of length-delimited frames. [`LocalChannel`] connects two parties inside one process.

use alloc::boxed::Box;
use alloc::string::ToString;
use std::sync::mpsc;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::ChannelError;

/// A blocking, reliable, ordered, bidirectional channel carrying byte frames.
pub trait Channel {
    /// Sends one frame. Returns once the frame is handed over to the transport.
    fn send_frame(&mut self, frame: Box<[u8]>) -> Result<(), ChannelError>;

    /// Blocks until the next frame arrives or the channel fails.
    fn receive_frame(&mut self) -> Result<Box<[u8]>, ChannelError>;

    /// Encodes and sends a typed message.
    fn send<T: Serialize>(&mut self, message: &T) -> Result<(), ChannelError>
    where
        Self: Sized,
    {
        let frame = bincode::serialize(message).map_err(|err| ChannelError::Encoding(err.to_string()))?;
        self.send_frame(frame.into())
    }

    /// Receives and decodes a typed message.
    fn receive<T: DeserializeOwned>(&mut self) -> Result<T, ChannelError>
    where
        Self: Sized,
    {
        let frame = self.receive_frame()?;
        bincode::deserialize(&frame).map_err(|err| ChannelError::Malformed(err.to_string()))
    }
}

impl<C: Channel + ?Sized> Channel for &mut C {
    fn send_frame(&mut self, frame: Box<[u8]>) -> Result<(), ChannelError> {
        (**self).send_frame(frame)
    }

    fn receive_frame(&mut self) -> Result<Box<[u8]>, ChannelError> {
        (**self).receive_frame()
    }
}

/// One end of an in-process channel.
#[derive(Debug)]
pub struct LocalChannel {
    outgoing: mpsc::Sender<Box<[u8]>>,
    incoming: mpsc::Receiver<Box<[u8]>>,
}

impl LocalChannel {
    /// Creates two connected ends.
    pub fn pair() -> (Self, Self) {
        let (tx_a, rx_a) = mpsc::channel();
        let (tx_b, rx_b) = mpsc::channel();
        (
            Self {
                outgoing: tx_a,
                incoming: rx_b,
            },
            Self {
                outgoing: tx_b,
                incoming: rx_a,
            },
        )
    }
}

impl Channel for LocalChannel {
    fn send_frame(&mut self, frame: Box<[u8]>) -> Result<(), ChannelError> {
        self.outgoing.send(frame).map_err(|_| ChannelError::Closed)
    }

    fn receive_frame(&mut self) -> Result<Box<[u8]>, ChannelError> {
        self.incoming.recv().map_err(|_| ChannelError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::{Channel, LocalChannel};
    use crate::error::ChannelError;

    #[test]
    fn typed_roundtrip_in_order() {
        let (mut a, mut b) = LocalChannel::pair();
        a.send(&(1u32, vec![1u8, 2, 3])).unwrap();
        a.send(&2u64).unwrap();
        assert_eq!(b.receive::<(u32, alloc::vec::Vec<u8>)>().unwrap(), (1, vec![1, 2, 3]));
        assert_eq!(b.receive::<u64>().unwrap(), 2);
    }

    #[test]
    fn failures_are_channel_errors() {
        let (mut a, mut b) = LocalChannel::pair();
        a.send_frame(vec![1u8].into()).unwrap();
        assert!(matches!(b.receive::<u64>(), Err(ChannelError::Malformed(_))));

        drop(a);
        assert_eq!(b.receive_frame(), Err(ChannelError::Closed));
    }
}
