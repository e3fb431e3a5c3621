//! Interest/Data wire codec.
//!
//! All multi-byte fields are network byte order. In [`Mode::StaticPeers`]
//! every datagram is prefixed with a 32-bit originator IPv4 address so a
//! peer can route a returning Data packet back to whoever asked; in
//! [`Mode::Broadcast`] the prefix is absent and the originator is instead
//! the UDP source address (recovered by the transport layer, not the
//! codec).

use no_std_net::Ipv4Addr;

use crate::{BytesIn, BytesOut, Error, UDP_BUFFER_SIZE};

pub const TYPE_INTEREST: u8 = 0x01;
pub const TYPE_DATA: u8 = 0x02;

/// Selects which of the two wire framings a datagram uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// No originator prefix; the UDP source address is the originator.
    Broadcast,
    /// 32-bit originator IPv4 prefix, used for unicast fan-out to peers.
    StaticPeers,
}

/// A request for named content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interest<'a> {
    /// Present only in [`Mode::StaticPeers`]; `None` in broadcast mode.
    pub originator: Option<Ipv4Addr>,
    pub nonce: u32,
    pub name: &'a [u8],
}

/// A response carrying named content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Data<'a> {
    pub originator: Option<Ipv4Addr>,
    pub name: &'a [u8],
    pub content: &'a [u8],
}

/// Either packet kind, as produced by [`Packet::decode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet<'a> {
    Interest(Interest<'a>),
    Data(Data<'a>),
}

fn decode_originator(mode: Mode, bytes: &mut BytesIn) -> Result<Option<Ipv4Addr>, Error> {
    Ok(match mode {
        Mode::Broadcast => None,
        Mode::StaticPeers => Some(Ipv4Addr::from(bytes.arr::<4>()?)),
    })
}

fn encode_originator(mode: Mode, originator: Option<Ipv4Addr>, out: &mut BytesOut) -> Result<(), Error> {
    if mode == Mode::StaticPeers {
        let originator = originator.ok_or(Error::MalformedPacket)?;
        out.push(&originator.octets())?;
    }

    Ok(())
}

impl<'a> Interest<'a> {
    /// Header size in bytes, excluding the optional originator prefix:
    /// `type(1) + nonce(4) + name_len(2)`.
    pub const HEADER_SIZE: usize = 7;

    pub fn encode<'o>(&self, mode: Mode, buf: &'o mut [u8]) -> Result<&'o [u8], Error> {
        let mut out = BytesOut::new(buf);

        encode_originator(mode, self.originator, &mut out)?;

        out.push(&[TYPE_INTEREST])?
            .push(&self.nonce.to_be_bytes())?
            .push(&(self.name.len() as u16).to_be_bytes())?
            .push(self.name)?;

        if out.len() > UDP_BUFFER_SIZE {
            return Err(Error::BufferOverflow);
        }

        let len = out.len();
        Ok(&buf[..len])
    }

    pub fn decode(mode: Mode, data: &'a [u8]) -> Result<Self, Error> {
        if data.len() > UDP_BUFFER_SIZE {
            return Err(Error::MalformedPacket);
        }

        let mut bytes = BytesIn::new(data);

        let originator = decode_originator(mode, &mut bytes)?;

        if bytes.byte()? != TYPE_INTEREST {
            return Err(Error::UnknownPacketType);
        }

        let nonce = u32::from_be_bytes(bytes.arr()?);
        let name_len = u16::from_be_bytes(bytes.arr()?) as usize;

        if name_len == 0 {
            return Err(Error::MalformedPacket);
        }

        let name = bytes.slice(name_len)?;

        if !bytes.is_empty() {
            return Err(Error::MalformedPacket);
        }

        Ok(Self {
            originator,
            nonce,
            name,
        })
    }
}

impl<'a> Data<'a> {
    /// Header size in bytes, excluding the optional originator prefix:
    /// `type(1) + name_len(2) + content_len(4)`.
    pub const HEADER_SIZE: usize = 7;

    pub fn encode<'o>(&self, mode: Mode, buf: &'o mut [u8]) -> Result<&'o [u8], Error> {
        let mut out = BytesOut::new(buf);

        encode_originator(mode, self.originator, &mut out)?;

        out.push(&[TYPE_DATA])?
            .push(&(self.name.len() as u16).to_be_bytes())?
            .push(&(self.content.len() as u32).to_be_bytes())?
            .push(self.name)?
            .push(self.content)?;

        if out.len() > UDP_BUFFER_SIZE {
            return Err(Error::BufferOverflow);
        }

        let len = out.len();
        Ok(&buf[..len])
    }

    pub fn decode(mode: Mode, data: &'a [u8]) -> Result<Self, Error> {
        if data.len() > UDP_BUFFER_SIZE {
            return Err(Error::MalformedPacket);
        }

        let mut bytes = BytesIn::new(data);

        let originator = decode_originator(mode, &mut bytes)?;

        if bytes.byte()? != TYPE_DATA {
            return Err(Error::UnknownPacketType);
        }

        let name_len = u16::from_be_bytes(bytes.arr()?) as usize;
        let content_len = u32::from_be_bytes(bytes.arr()?) as usize;

        if name_len == 0 {
            return Err(Error::MalformedPacket);
        }

        let name = bytes.slice(name_len)?;
        let content = bytes.slice(content_len)?;

        if !bytes.is_empty() {
            return Err(Error::MalformedPacket);
        }

        Ok(Self {
            originator,
            name,
            content,
        })
    }
}

impl<'a> Packet<'a> {
    pub fn encode<'o>(&self, mode: Mode, buf: &'o mut [u8]) -> Result<&'o [u8], Error> {
        match self {
            Self::Interest(interest) => interest.encode(mode, buf),
            Self::Data(data) => data.encode(mode, buf),
        }
    }

    /// Decodes a full datagram, branching on the type tag. Returns
    /// [`Error::UnknownPacketType`] for any tag other than Interest/Data.
    pub fn decode(mode: Mode, data: &'a [u8]) -> Result<Self, Error> {
        if data.is_empty() {
            return Err(Error::MalformedPacket);
        }

        // Peek past the optional originator prefix to find the type tag
        // without consuming it twice.
        let prefix = if mode == Mode::StaticPeers { 4 } else { 0 };

        if data.len() <= prefix {
            return Err(Error::MalformedPacket);
        }

        match data[prefix] {
            TYPE_INTEREST => Interest::decode(mode, data).map(Self::Interest),
            TYPE_DATA => Data::decode(mode, data).map(Self::Data),
            _ => Err(Error::UnknownPacketType),
        }
    }
}
