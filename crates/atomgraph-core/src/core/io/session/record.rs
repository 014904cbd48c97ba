use super::SessionVersion;
use super::error::SessionError;
use super::schema::Layout;
use crate::core::models::color::Rgba;
use std::io::{self, Read, Write};

/// A session as stored on disk: a version plus flat int and float streams.
///
/// Byte layout, little endian: `version: i32`, `int_count: u64`, the ints as `i32`,
/// `float_count: u64`, the floats as `f64`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionRecord {
    pub version: i32,
    pub ints: Vec<i32>,
    pub floats: Vec<f64>,
}

impl SessionRecord {
    pub fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        writer.write_all(&self.version.to_le_bytes())?;
        writer.write_all(&(self.ints.len() as u64).to_le_bytes())?;
        for value in &self.ints {
            writer.write_all(&value.to_le_bytes())?;
        }
        writer.write_all(&(self.floats.len() as u64).to_le_bytes())?;
        for value in &self.floats {
            writer.write_all(&value.to_le_bytes())?;
        }
        writer.flush()
    }

    /// Reads a record, rejecting unknown versions before the streams are read.
    pub fn read_from(reader: &mut impl Read) -> Result<Self, SessionError> {
        let version = i32::from_le_bytes(read_array(reader, "session version")?);
        SessionVersion::try_from(version)?;

        let int_count = u64::from_le_bytes(read_array(reader, "int count")?);
        let ints = read_values(reader, int_count, i32::from_le_bytes, "int block")?;
        let float_count = u64::from_le_bytes(read_array(reader, "float count")?);
        let floats = read_values(reader, float_count, f64::from_le_bytes, "float block")?;

        let mut extra = [0u8; 1];
        if reader.read(&mut extra)? != 0 {
            return Err(SessionError::TrailingBytes);
        }
        Ok(Self {
            version,
            ints,
            floats,
        })
    }
}

fn read_array<const N: usize>(
    reader: &mut impl Read,
    context: &'static str,
) -> Result<[u8; N], SessionError> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => SessionError::Truncated { context },
        _ => SessionError::Io(e),
    })?;
    Ok(buf)
}

/// Reads `count` fixed-width values. Memory grows with the bytes actually present,
/// not with the declared count.
fn read_values<const N: usize, T>(
    reader: &mut impl Read,
    count: u64,
    decode: fn([u8; N]) -> T,
    context: &'static str,
) -> Result<Vec<T>, SessionError> {
    let byte_len = count
        .checked_mul(N as u64)
        .ok_or(SessionError::Truncated { context })?;
    let mut bytes = Vec::new();
    reader.by_ref().take(byte_len).read_to_end(&mut bytes)?;
    if (bytes.len() as u64) < byte_len {
        return Err(SessionError::Truncated { context });
    }
    Ok(bytes
        .chunks_exact(N)
        .map(|chunk| {
            let mut buf = [0u8; N];
            buf.copy_from_slice(chunk);
            decode(buf)
        })
        .collect())
}

/// Appends values to the int and float streams.
#[derive(Debug, Default)]
pub(crate) struct StreamWriter {
    pub(crate) ints: Vec<i32>,
    pub(crate) floats: Vec<f64>,
}

impl StreamWriter {
    pub(crate) fn int(&mut self, value: i32) {
        self.ints.push(value);
    }

    pub(crate) fn bool(&mut self, value: bool) {
        self.ints.push(value as i32);
    }

    pub(crate) fn count(&mut self, value: usize) -> Result<(), SessionError> {
        self.ints.push(session_int(value)?);
        Ok(())
    }

    /// `-1` for none.
    pub(crate) fn index(&mut self, value: Option<usize>) -> Result<(), SessionError> {
        let raw = value.map(session_int).transpose()?.unwrap_or(-1);
        self.ints.push(raw);
        Ok(())
    }

    /// Length, then one int per Unicode scalar value.
    pub(crate) fn string(&mut self, value: &str) -> Result<(), SessionError> {
        self.count(value.chars().count())?;
        self.ints.extend(value.chars().map(|c| c as i32));
        Ok(())
    }

    pub(crate) fn color(&mut self, color: Rgba) {
        self.ints.extend(color.to_session_ints());
    }

    pub(crate) fn float(&mut self, value: f64) {
        self.floats.push(value);
    }
}

fn session_int(value: usize) -> Result<i32, SessionError> {
    i32::try_from(value).map_err(|_| SessionError::TooLarge { value })
}

/// Consumes the int and float streams front to back.
#[derive(Debug)]
pub(crate) struct StreamReader<'a> {
    ints: &'a [i32],
    floats: &'a [f64],
}

impl<'a> StreamReader<'a> {
    pub(crate) fn new(ints: &'a [i32], floats: &'a [f64]) -> Self {
        Self { ints, floats }
    }

    /// Fails unless at least `layout` is left in both streams.
    pub(crate) fn require(&self, record: &'static str, layout: Layout) -> Result<(), SessionError> {
        if self.ints.len() < layout.ints || self.floats.len() < layout.floats {
            return Err(SessionError::RecordTruncated {
                record,
                ints: layout.ints,
                floats: layout.floats,
            });
        }
        Ok(())
    }

    pub(crate) fn int(&mut self, context: &'static str) -> Result<i32, SessionError> {
        let (&value, rest) = self
            .ints
            .split_first()
            .ok_or(SessionError::Truncated { context })?;
        self.ints = rest;
        Ok(value)
    }

    pub(crate) fn bool(&mut self, context: &'static str) -> Result<bool, SessionError> {
        Ok(self.int(context)? != 0)
    }

    pub(crate) fn count(&mut self, context: &'static str) -> Result<usize, SessionError> {
        let value = self.int(context)?;
        usize::try_from(value).map_err(|_| SessionError::InvalidValue {
            field: context,
            value: value.into(),
        })
    }

    pub(crate) fn index(&mut self, context: &'static str) -> Result<Option<usize>, SessionError> {
        match self.int(context)? {
            -1 => Ok(None),
            value => usize::try_from(value)
                .map(Some)
                .map_err(|_| SessionError::InvalidValue {
                    field: context,
                    value: value.into(),
                }),
        }
    }

    pub(crate) fn string(&mut self, context: &'static str) -> Result<String, SessionError> {
        let len = self.count(context)?;
        if len > self.ints.len() {
            return Err(SessionError::Truncated { context });
        }
        let (chars, rest) = self.ints.split_at(len);
        self.ints = rest;
        chars
            .iter()
            .map(|&c| {
                u32::try_from(c)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or(SessionError::InvalidValue {
                        field: context,
                        value: c.into(),
                    })
            })
            .collect()
    }

    pub(crate) fn color(&mut self, context: &'static str) -> Result<Rgba, SessionError> {
        if self.ints.len() < Rgba::SESSION_NUM_INTS {
            return Err(SessionError::Truncated { context });
        }
        let (channels, rest) = self.ints.split_at(Rgba::SESSION_NUM_INTS);
        self.ints = rest;
        Ok(Rgba::from_session_ints(channels))
    }

    pub(crate) fn float(&mut self, context: &'static str) -> Result<f64, SessionError> {
        let (&value, rest) = self
            .floats
            .split_first()
            .ok_or(SessionError::Truncated { context })?;
        self.floats = rest;
        Ok(value)
    }

    /// Fails if anything is left unread.
    pub(crate) fn finish(self) -> Result<(), SessionError> {
        if self.ints.is_empty() && self.floats.is_empty() {
            Ok(())
        } else {
            Err(SessionError::TrailingData {
                ints: self.ints.len(),
                floats: self.floats.len(),
            })
        }
    }
}
