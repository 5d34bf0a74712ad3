//! Newline-delimited JSON codec for tokio transports.
//!
//! The codec is generic over the send/receive event types so the same
//! implementation serves both ends of a connection: the server decodes
//! [`ClientEvent`]s and encodes [`ServerEvent`]s, a client the reverse.

use std::marker::PhantomData;

use bytes::{BufMut, BytesMut};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::ProtocolError;
use crate::event::{ClientEvent, ServerEvent};

/// Default frame length limit. Notes are whole text blobs, so frames are
/// allowed to be far larger than a chat line.
pub const DEFAULT_MAX_FRAME: usize = 256 * 1024;

/// Framing codec: one JSON event per `\n`-terminated line.
pub struct EventCodec<Tx, Rx> {
    /// Index of the next byte to check for a newline.
    next_index: usize,
    max_frame: usize,
    _direction: PhantomData<fn(Tx) -> Rx>,
}

/// Codec for the server side of a connection.
pub type ServerCodec = EventCodec<ServerEvent, ClientEvent>;

/// Codec for the client side of a connection.
pub type ClientCodec = EventCodec<ClientEvent, ServerEvent>;

impl<Tx, Rx> EventCodec<Tx, Rx> {
    /// Create a codec with the default frame limit.
    pub fn new() -> Self {
        Self::with_max_frame(DEFAULT_MAX_FRAME)
    }

    /// Create a codec with a custom frame limit.
    pub fn with_max_frame(max_frame: usize) -> Self {
        Self {
            next_index: 0,
            max_frame,
            _direction: PhantomData,
        }
    }
}

impl<Tx, Rx> Default for EventCodec<Tx, Rx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Tx, Rx> Decoder for EventCodec<Tx, Rx>
where
    Rx: DeserializeOwned,
{
    type Item = Rx;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Rx>, ProtocolError> {
        loop {
            let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
                self.next_index = src.len();
                if src.len() > self.max_frame {
                    return Err(ProtocolError::FrameTooLong {
                        actual: src.len(),
                        limit: self.max_frame,
                    });
                }
                return Ok(None);
            };

            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if line.len() > self.max_frame {
                return Err(ProtocolError::FrameTooLong {
                    actual: line.len(),
                    limit: self.max_frame,
                });
            }

            // Tolerate blank keepalive lines between frames.
            let trimmed: &[u8] = {
                let mut s = &line[..];
                while let [rest @ .., last] = s {
                    if matches!(last, b'\n' | b'\r' | b' ' | b'\t') {
                        s = rest;
                    } else {
                        break;
                    }
                }
                s
            };
            if trimmed.is_empty() {
                continue;
            }

            return Ok(Some(serde_json::from_slice(trimmed)?));
        }
    }
}

impl<Tx, Rx> Encoder<Tx> for EventCodec<Tx, Rx>
where
    Tx: Serialize,
{
    type Error = ProtocolError;

    fn encode(&mut self, item: Tx, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        let frame = serde_json::to_vec(&item)?;
        dst.reserve(frame.len() + 1);
        dst.put_slice(&frame);
        dst.put_u8(b'\n');
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(codec: &mut ServerCodec, bytes: &[u8]) -> Vec<ClientEvent> {
        let mut buf = BytesMut::from(bytes);
        let mut out = Vec::new();
        while let Some(ev) = codec.decode(&mut buf).expect("decode") {
            out.push(ev);
        }
        out
    }

    #[test]
    fn decodes_frames_split_across_reads() {
        let mut codec = ServerCodec::new();
        let mut buf = BytesMut::new();

        buf.extend_from_slice(br#"{"event":"edit-note","data":{"noteId":"#);
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"\"n1\",\"content\":\"x\"}}\n");
        let ev = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(
            ev,
            ClientEvent::EditNote {
                note_id: "n1".into(),
                content: "x".into()
            }
        );
    }

    #[test]
    fn skips_blank_lines() {
        let mut codec = ServerCodec::new();
        let events = decode_all(
            &mut codec,
            b"\r\n\n{\"event\":\"editing\",\"data\":{\"isEditing\":false}}\n",
        );
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn rejects_oversized_frame() {
        let mut codec = ServerCodec::with_max_frame(32);
        let mut buf = BytesMut::from(&b"{\"event\":\"editing\",\"data\":{\"isEditing\":false,\"content\":\"xxxx\"}}\n"[..]);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(ProtocolError::FrameTooLong { .. })
        ));
    }

    #[test]
    fn encode_decode_is_symmetric() {
        let mut server = ServerCodec::new();
        let mut client = ClientCodec::new();
        let mut buf = BytesMut::new();

        server
            .encode(
                ServerEvent::NoteUpdated {
                    note_id: "n2".into(),
                    content: "hi".into(),
                },
                &mut buf,
            )
            .unwrap();

        let ev = client.decode(&mut buf).unwrap().unwrap();
        assert_eq!(
            ev,
            ServerEvent::NoteUpdated {
                note_id: "n2".into(),
                content: "hi".into()
            }
        );
    }
}
