//! IPC request and response model.
//!
//! The host decodes the wire message into a [`Request`]: a header, the normal parameter words
//! and the translated items (process id, handles and buffers). Handlers consume it through a
//! [`RequestParser`] and answer with a [`Response`] assembled by a [`ResponseBuilder`].
//!
//! # Header
//!
//! ```text
//! Bits   Field
//! ─────────────────────────────
//! 0-5    translate parameter words
//! 6-11   normal parameter words
//! 16-31  command id
//! ```
//!
//! Every translated item occupies two translate words.
//!
//! Handlers are trusted to match the declared command shape. A request that does not (too few
//! words, a missing buffer) is a caller contract violation and panics.

use std::{collections::VecDeque, sync::Arc};

use zerocopy::{FromBytes, Immutable, IntoBytes};

use crate::{platform::Event, result::ResultCode};

/// Translate words taken by each translated item.
pub const TRANSLATE_WORDS_PER_ITEM: u8 = 2;

/// Command header word.
#[derive(Copy, Clone, Eq, PartialEq)]
#[repr(transparent)]
pub struct Header(u32);

impl Header {
    pub const fn new(command_id: u16, normal_words: u8, translate_words: u8) -> Self {
        Self(
            (command_id as u32) << 16
                | ((normal_words as u32) & 0x3F) << 6
                | (translate_words as u32) & 0x3F,
        )
    }

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn to_raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn command_id(&self) -> u16 {
        (self.0 >> 16) as u16
    }

    #[inline]
    pub const fn normal_words(&self) -> u8 {
        ((self.0 >> 6) & 0x3F) as u8
    }

    #[inline]
    pub const fn translate_words(&self) -> u8 {
        (self.0 & 0x3F) as u8
    }
}

impl core::fmt::Debug for Header {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Header")
            .field("command_id", &format_args!("{:#06x}", self.command_id()))
            .field("normal_words", &self.normal_words())
            .field("translate_words", &self.translate_words())
            .finish()
    }
}

/// A client buffer mapped into the service for the duration of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappedBuffer {
    data: Vec<u8>,
}

impl MappedBuffer {
    /// A zero-filled buffer of `len` bytes.
    pub fn new(len: usize) -> Self {
        Self {
            data: vec![0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Copies `bytes` into the buffer at `offset`.
    ///
    /// # Panics
    /// If the write does not fit.
    pub fn write(&mut self, offset: usize, bytes: &[u8]) {
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// A handle, buffer or process id carried in the translate section.
#[derive(Clone)]
pub enum TranslatedItem {
    /// Caller process id, filled in by the kernel
    ProcessId(u32),
    Event(Arc<dyn Event>),
    StaticBuffer { id: u8, data: Vec<u8> },
    MappedBuffer(MappedBuffer),
}

impl core::fmt::Debug for TranslatedItem {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ProcessId(pid) => f.debug_tuple("ProcessId").field(pid).finish(),
            Self::Event(_) => f.write_str("Event"),
            Self::StaticBuffer { id, data } => f
                .debug_struct("StaticBuffer")
                .field("id", id)
                .field("len", &data.len())
                .finish(),
            Self::MappedBuffer(buffer) => f
                .debug_struct("MappedBuffer")
                .field("len", &buffer.len())
                .finish(),
        }
    }
}

/// An inbound IPC request.
#[derive(Debug, Clone)]
pub struct Request {
    pub header: Header,
    pub words: Vec<u32>,
    pub translated: Vec<TranslatedItem>,
}

impl Request {
    /// A request for `command_id`; the header is derived from the parameters.
    pub fn new(command_id: u16, words: Vec<u32>, translated: Vec<TranslatedItem>) -> Self {
        let header = Header::new(
            command_id,
            words.len() as u8,
            translated.len() as u8 * TRANSLATE_WORDS_PER_ITEM,
        );
        Self {
            header,
            words,
            translated,
        }
    }
}

/// An outbound IPC response. The first normal word is always the result.
#[derive(Debug, Clone)]
pub struct Response {
    pub header: Header,
    pub words: Vec<u32>,
    pub translated: Vec<TranslatedItem>,
}

impl Response {
    /// A bare error response for `command_id`.
    pub fn error(command_id: u16, result: ResultCode) -> Self {
        let mut rb = ResponseBuilder::new(command_id, 1, 0);
        rb.push_result(result);
        rb.build()
    }

    pub fn result(&self) -> ResultCode {
        ResultCode::from_raw(self.words.first().copied().unwrap_or_default())
    }

    /// Normal words following the result.
    pub fn values(&self) -> &[u32] {
        self.words.get(1..).unwrap_or_default()
    }

    /// Contents of the static buffer with the given id.
    pub fn static_buffer(&self, id: u8) -> Option<&[u8]> {
        self.translated.iter().find_map(|item| match item {
            TranslatedItem::StaticBuffer { id: buffer_id, data } if *buffer_id == id => {
                Some(data.as_slice())
            }
            _ => None,
        })
    }

    /// The `index`th mapped buffer handed back to the caller.
    pub fn mapped_buffer(&self, index: usize) -> Option<&MappedBuffer> {
        self.translated
            .iter()
            .filter_map(|item| match item {
                TranslatedItem::MappedBuffer(buffer) => Some(buffer),
                _ => None,
            })
            .nth(index)
    }
}

/// Sequential reader over a [`Request`].
pub struct RequestParser {
    header: Header,
    words: VecDeque<u32>,
    translated: VecDeque<TranslatedItem>,
}

impl RequestParser {
    pub fn new(request: Request) -> Self {
        Self {
            header: request.header,
            words: request.words.into(),
            translated: request.translated.into(),
        }
    }

    #[inline]
    pub fn header(&self) -> Header {
        self.header
    }

    #[inline]
    pub fn command_id(&self) -> u16 {
        self.header.command_id()
    }

    /// Starts the response with the declared word counts.
    pub fn make_builder(&self, normal_words: u8, translate_words: u8) -> ResponseBuilder {
        ResponseBuilder::new(self.command_id(), normal_words, translate_words)
    }

    pub fn pop_u32(&mut self) -> u32 {
        match self.words.pop_front() {
            Some(word) => word,
            None => panic!(
                "command {:#06x}: request has fewer normal words than expected",
                self.command_id()
            ),
        }
    }

    /// Two words, low word first.
    pub fn pop_u64(&mut self) -> u64 {
        let low = self.pop_u32() as u64;
        let high = self.pop_u32() as u64;
        high << 32 | low
    }

    pub fn pop_bool(&mut self) -> bool {
        self.pop_u32() != 0
    }

    /// Reads a structure spanning whole words.
    pub fn pop_raw<T: FromBytes>(&mut self) -> T {
        let word_count = size_of::<T>().div_ceil(4);
        let mut bytes = Vec::with_capacity(word_count * 4);
        for _ in 0..word_count {
            bytes.extend_from_slice(&self.pop_u32().to_le_bytes());
        }
        match T::read_from_prefix(&bytes) {
            Ok((value, _)) => value,
            Err(_) => unreachable!("buffer holds at least size_of::<T>() bytes"),
        }
    }

    pub fn pop_pid(&mut self) -> u32 {
        match self.pop_item() {
            TranslatedItem::ProcessId(pid) => pid,
            item => self.unexpected("process id", &item),
        }
    }

    pub fn pop_event(&mut self) -> Arc<dyn Event> {
        match self.pop_item() {
            TranslatedItem::Event(event) => event,
            item => self.unexpected("event handle", &item),
        }
    }

    pub fn pop_static_buffer(&mut self) -> Vec<u8> {
        match self.pop_item() {
            TranslatedItem::StaticBuffer { data, .. } => data,
            item => self.unexpected("static buffer", &item),
        }
    }

    pub fn pop_mapped_buffer(&mut self) -> MappedBuffer {
        match self.pop_item() {
            TranslatedItem::MappedBuffer(buffer) => buffer,
            item => self.unexpected("mapped buffer", &item),
        }
    }

    fn pop_item(&mut self) -> TranslatedItem {
        match self.translated.pop_front() {
            Some(item) => item,
            None => panic!(
                "command {:#06x}: request has fewer translated items than expected",
                self.command_id()
            ),
        }
    }

    fn unexpected(&self, expected: &str, item: &TranslatedItem) -> ! {
        panic!(
            "command {:#06x}: expected {expected}, found {item:?}",
            self.command_id()
        )
    }
}

/// Assembles a [`Response`] and checks it against the declared word counts.
#[derive(Debug)]
pub struct ResponseBuilder {
    header: Header,
    words: Vec<u32>,
    translated: Vec<TranslatedItem>,
}

impl ResponseBuilder {
    pub fn new(command_id: u16, normal_words: u8, translate_words: u8) -> Self {
        Self {
            header: Header::new(command_id, normal_words, translate_words),
            words: Vec::with_capacity(normal_words as usize),
            translated: Vec::new(),
        }
    }

    pub fn push_result(&mut self, result: ResultCode) {
        assert!(self.words.is_empty(), "result must be the first word");
        self.words.push(result.to_raw());
    }

    pub fn push_u32(&mut self, value: u32) {
        self.words.push(value);
    }

    /// Two words, low word first.
    pub fn push_u64(&mut self, value: u64) {
        self.words.push(value as u32);
        self.words.push((value >> 32) as u32);
    }

    pub fn push_bool(&mut self, value: bool) {
        self.words.push(value as u32);
    }

    /// Writes a structure as words, zero-padding the last one.
    pub fn push_raw<T: IntoBytes + Immutable + ?Sized>(&mut self, value: &T) {
        for chunk in value.as_bytes().chunks(4) {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            self.words.push(u32::from_le_bytes(word));
        }
    }

    pub fn push_static_buffer(&mut self, data: Vec<u8>, id: u8) {
        self.translated.push(TranslatedItem::StaticBuffer { id, data });
    }

    pub fn push_mapped_buffer(&mut self, buffer: MappedBuffer) {
        self.translated.push(TranslatedItem::MappedBuffer(buffer));
    }

    /// # Panics
    /// If the pushed words do not match the declared header.
    pub fn build(self) -> Response {
        assert_eq!(
            self.words.len(),
            self.header.normal_words() as usize,
            "command {:#06x}: normal word count mismatch",
            self.header.command_id()
        );
        assert_eq!(
            self.translated.len() * TRANSLATE_WORDS_PER_ITEM as usize,
            self.header.translate_words() as usize,
            "command {:#06x}: translate word count mismatch",
            self.header.command_id()
        );
        Response {
            header: self.header,
            words: self.words,
            translated: self.translated,
        }
    }
}
