/*!
 * Stringified IOR Decoding
 *
 * `IOR:<hex>` is a CDR encapsulation: byte-order octet, type id string,
 * then a sequence of tagged profiles. Only IIOP profiles are decoded.
 */

/// Profile tag for IIOP endpoints
pub const TAG_INTERNET_IOP: u32 = 0;

/// Decoded IIOP profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IiopProfile {
    pub major: u8,
    pub minor: u8,
    pub host: String,
    pub port: u16,
}

/// Decoded object reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ior {
    pub type_id: String,
    /// Size of the encapsulation in bytes
    pub byte_len: usize,
    pub profiles: Vec<IiopProfile>,
}

impl Ior {
    /// Decode a stringified IOR; `None` on any malformation
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if !text.get(..4)?.eq_ignore_ascii_case("IOR:") {
            return None;
        }
        let bytes = hex::decode(&text[4..]).ok()?;

        let mut reader = CdrReader::encapsulation(&bytes)?;
        let type_id = reader.read_string()?;
        let count = reader.read_u32()?;

        let mut profiles = Vec::new();
        for _ in 0..count {
            let tag = reader.read_u32()?;
            let data = reader.read_octets()?;
            if tag == TAG_INTERNET_IOP {
                if let Some(profile) = parse_iiop_profile(data) {
                    profiles.push(profile);
                }
            }
        }

        Some(Self {
            type_id,
            byte_len: bytes.len(),
            profiles,
        })
    }

    /// First IIOP endpoint, if any
    pub fn primary(&self) -> Option<&IiopProfile> {
        self.profiles.first()
    }
}

fn parse_iiop_profile(data: &[u8]) -> Option<IiopProfile> {
    let mut reader = CdrReader::encapsulation(data)?;
    let major = reader.read_u8()?;
    let minor = reader.read_u8()?;
    let host = reader.read_string()?;
    let port = reader.read_u16()?;
    Some(IiopProfile {
        major,
        minor,
        host,
        port,
    })
}

/// Minimal CDR reader over one encapsulation
///
/// Alignment is relative to the start of the encapsulation, which begins
/// with the byte-order octet.
struct CdrReader<'a> {
    buf: &'a [u8],
    pos: usize,
    little_endian: bool,
}

impl<'a> CdrReader<'a> {
    fn encapsulation(buf: &'a [u8]) -> Option<Self> {
        let order = *buf.first()?;
        Some(Self {
            buf,
            pos: 1,
            little_endian: order & 1 == 1,
        })
    }

    fn align(&mut self, n: usize) {
        self.pos = self.pos.div_ceil(n) * n;
    }

    fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(len)?;
        let slice = self.buf.get(self.pos..end)?;
        self.pos = end;
        Some(slice)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take(1).map(|b| b[0])
    }

    fn read_u16(&mut self) -> Option<u16> {
        self.align(2);
        let b: [u8; 2] = self.take(2)?.try_into().ok()?;
        Some(if self.little_endian {
            u16::from_le_bytes(b)
        } else {
            u16::from_be_bytes(b)
        })
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.align(4);
        let b: [u8; 4] = self.take(4)?.try_into().ok()?;
        Some(if self.little_endian {
            u32::from_le_bytes(b)
        } else {
            u32::from_be_bytes(b)
        })
    }

    /// Length-prefixed, NUL-terminated string
    fn read_string(&mut self) -> Option<String> {
        let len = self.read_u32()? as usize;
        let raw = self.take(len)?;
        let text = raw.strip_suffix(&[0]).unwrap_or(raw);
        Some(String::from_utf8_lossy(text).into_owned())
    }

    /// Length-prefixed octet sequence
    fn read_octets(&mut self) -> Option<&'a [u8]> {
        let len = self.read_u32()? as usize;
        self.take(len)
    }
}

/// Encode an IOR with IIOP profiles (big-endian); used to build fixtures
pub fn encode_ior(type_id: &str, endpoints: &[(&str, u16)]) -> String {
    let mut out = CdrWriter::new();
    out.write_string(type_id);
    out.write_u32(endpoints.len() as u32);
    for (host, port) in endpoints {
        let mut profile = CdrWriter::new();
        profile.write_u8(1);
        profile.write_u8(2);
        profile.write_string(host);
        profile.write_u16(*port);
        profile.write_u32(4);
        profile.buf.extend_from_slice(b"key1");

        out.write_u32(TAG_INTERNET_IOP);
        out.write_u32(profile.buf.len() as u32);
        out.buf.extend_from_slice(&profile.buf);
    }
    format!("IOR:{}", hex::encode(out.buf))
}

struct CdrWriter {
    buf: Vec<u8>,
}

impl CdrWriter {
    fn new() -> Self {
        // Big-endian byte-order octet
        Self { buf: vec![0] }
    }

    fn pad(&mut self, n: usize) {
        while self.buf.len() % n != 0 {
            self.buf.push(0);
        }
    }

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u16(&mut self, v: u16) {
        self.pad(2);
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn write_u32(&mut self, v: u32) {
        self.pad(4);
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn write_string(&mut self, s: &str) {
        self.write_u32(s.len() as u32 + 1);
        self.buf.extend_from_slice(s.as_bytes());
        self.buf.push(0);
    }
}
