//! A module for all encoding needs.
use crate::alloc::vec::Vec;
use crate::dict::{Dictionary, DictionaryFull};
use crate::pack::Packer;
use crate::{Code, Framing, LzwStatus, StreamResult, VecResult, HEADER_FLAGS, MAGIC};

#[cfg(feature = "std")]
use crate::AllResult;
#[cfg(feature = "std")]
use std::io::{self, BufRead, Write};

/// The container header, written once before any code.
const HEADER: [u8; 3] = [MAGIC[0], MAGIC[1], HEADER_FLAGS];

/// The size of intermediate buffers of the stream adapters.
#[cfg(feature = "std")]
const STREAM_BUF_SIZE: usize = 1 << 16;

/// The amount by which a vector grows per encoding round.
const VEC_CHUNK: usize = 1 << 12;

/// The state of one compressed stream.
///
/// Each encoder owns its dictionary and bit buffer. Compressing several streams, in sequence or
/// in parallel, requires one encoder per stream.
pub struct Encoder {
    state: EncodeState,
}

/// A encoding stream sink.
///
/// See [`Encoder::into_stream`] on how to create this type.
///
/// [`Encoder::into_stream`]: struct.Encoder.html#method.into_stream
#[cfg(feature = "std")]
pub struct IntoStream<'d, W> {
    encoder: &'d mut Encoder,
    writer: W,
}

/// An async encoding sink.
///
/// See [`Encoder::into_async`] on how to create this type.
///
/// [`Encoder::into_async`]: struct.Encoder.html#method.into_async
#[cfg(feature = "async")]
pub struct IntoAsync<'d, W> {
    encoder: &'d mut Encoder,
    writer: W,
}

/// A encoding sink into a vector.
///
/// See [`Encoder::into_vec`] on how to create this type.
///
/// [`Encoder::into_vec`]: struct.Encoder.html#method.into_vec
pub struct IntoVec<'d> {
    encoder: &'d mut Encoder,
    vector: &'d mut Vec<u8>,
}

struct EncodeState {
    framing: Framing,
    /// Progress of writing the container header.
    header: Header,
    /// The strings learned so far.
    dict: Dictionary,
    /// The string read since the last emitted code, it is always known to the dictionary.
    candidate: Vec<u8>,
    /// The code of `candidate`, `None` before the first byte.
    pending: Option<Code>,
    /// The bit buffer for encoding.
    buffer: Packer,
    /// If the input was marked as complete.
    has_ended: bool,
    /// If we have already reported a saturated dictionary.
    saturated: bool,
    phase: Phase,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    /// Reading input.
    Encoding,
    /// Input ended and the last code is queued, padding to a byte boundary.
    Padding,
    /// Everything has been queued and written.
    Done,
}

struct Header {
    written: usize,
}

impl Encoder {
    /// Create an encoder packing every code with 9 bits.
    pub fn new() -> Self {
        Encoder::with_framing(Framing::Uniform)
    }

    /// Create an encoder that packs the first code with 8 bits.
    ///
    /// Only the width of the first code follows the historic tool this container variant
    /// originates from, the rest of its output differs.
    pub fn with_legacy_framing() -> Self {
        Encoder::with_framing(Framing::Legacy)
    }

    /// Create an encoder with the given framing of the first code.
    pub fn with_framing(framing: Framing) -> Self {
        Encoder {
            state: EncodeState::new(framing),
        }
    }

    /// Encode some bytes from `inp` into `out`.
    ///
    /// The container header is written before the first code. See [`into_stream`] for
    /// high-level functions (this interface is only available with the `std` feature) and
    /// [`finish`] for marking the input data as complete.
    ///
    /// [`into_stream`]: #method.into_stream
    /// [`finish`]: #method.finish
    pub fn encode_bytes(&mut self, inp: &[u8], out: &mut [u8]) -> StreamResult {
        self.state.advance(inp, out)
    }

    /// Construct an encoder into a writer.
    #[cfg(feature = "std")]
    pub fn into_stream<W: Write>(&mut self, writer: W) -> IntoStream<'_, W> {
        IntoStream {
            encoder: self,
            writer,
        }
    }

    /// Construct an encoder into an async writer.
    #[cfg(feature = "async")]
    pub fn into_async<W: futures::io::AsyncWrite>(&mut self, writer: W) -> IntoAsync<'_, W> {
        IntoAsync {
            encoder: self,
            writer,
        }
    }

    /// Construct an encoder appending to a vector.
    pub fn into_vec<'lt>(&'lt mut self, vec: &'lt mut Vec<u8>) -> IntoVec<'lt> {
        IntoVec {
            encoder: self,
            vector: vec,
        }
    }

    /// Mark the encoding as finished.
    ///
    /// In following calls to `encode_bytes` the encoder will emit the code of the remaining
    /// input and pad the stream after encoding all of `inp`. It's not recommended, but also not
    /// unsound, to use different byte slices in different calls from this point forward. Input
    /// passed after the final code has been queued is not consumed, `consumed_in` reports zero.
    pub fn finish(&mut self) {
        self.state.has_ended = true;
    }

    /// If the input has been marked as complete.
    pub fn has_ended(&self) -> bool {
        self.state.has_ended
    }

    /// If the complete stream, including padding, has been written.
    pub fn is_done(&self) -> bool {
        self.state.phase == Phase::Done
    }

    /// The strings learned so far.
    pub fn dictionary(&self) -> &Dictionary {
        &self.state.dict
    }

    /// The framing this encoder was created with.
    pub fn framing(&self) -> Framing {
        self.state.framing
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Encoder::new()
    }
}

/// Compress all of `data` with uniform framing.
pub fn encode_to_vec(data: &[u8]) -> Vec<u8> {
    let mut encoder = Encoder::new();
    let mut compressed = Vec::with_capacity(data.len() + HEADER.len() + 16);
    let result = encoder.into_vec(&mut compressed).encode_all(data);
    debug_assert_eq!(result.status, LzwStatus::Done);
    compressed
}

#[cfg(feature = "std")]
impl<W: Write> IntoStream<'_, W> {
    /// Encode data from a reader.
    ///
    /// This will drain the supplied reader. It will not finish the stream after all data has
    /// been processed.
    pub fn encode(&mut self, read: impl BufRead) -> AllResult {
        self.encode_part(read, false)
    }

    /// Encode data from a reader and finish the stream.
    pub fn encode_all(mut self, read: impl BufRead) -> AllResult {
        self.encode_part(read, true)
    }

    fn encode_part(&mut self, mut read: impl BufRead, finish: bool) -> AllResult {
        let IntoStream { encoder, writer } = self;
        enum Progress {
            Ok,
            Done,
        }

        let mut bytes_read = 0;
        let mut bytes_written = 0;

        let read_bytes = &mut bytes_read;
        let write_bytes = &mut bytes_written;

        let mut outbuf = vec![0; STREAM_BUF_SIZE];
        let once = move || {
            let data = read.fill_buf()?;

            if data.is_empty() {
                if finish {
                    encoder.finish();
                } else {
                    return Ok(Progress::Done);
                }
            }

            let result = encoder.encode_bytes(data, &mut outbuf[..]);
            *read_bytes += result.consumed_in;
            *write_bytes += result.consumed_out;
            read.consume(result.consumed_in);

            writer.write_all(&outbuf[..result.consumed_out])?;

            match result.status {
                LzwStatus::Ok => Ok(Progress::Ok),
                LzwStatus::Done => {
                    writer.flush()?;
                    Ok(Progress::Done)
                }
                LzwStatus::NoProgress => Err(no_progress()),
            }
        };

        let status = core::iter::repeat_with(once)
            // scan+fuse can be replaced with map_while
            .scan((), |(), result| match result {
                Ok(Progress::Ok) => Some(Ok(())),
                Err(err) => Some(Err(err)),
                Ok(Progress::Done) => None,
            })
            .fuse()
            .collect();

        AllResult {
            bytes_read,
            bytes_written,
            status,
        }
    }
}

#[cfg(feature = "async")]
impl<W: futures::io::AsyncWrite + core::marker::Unpin> IntoAsync<'_, W> {
    /// Encode data from a reader.
    ///
    /// This will drain the supplied reader. It will not finish the stream after all data has
    /// been processed.
    pub async fn encode(
        &mut self,
        read: impl futures::io::AsyncBufRead + core::marker::Unpin,
    ) -> AllResult {
        self.encode_part(read, false).await
    }

    /// Encode data from a reader and finish the stream.
    pub async fn encode_all(
        mut self,
        read: impl futures::io::AsyncBufRead + core::marker::Unpin,
    ) -> AllResult {
        self.encode_part(read, true).await
    }

    async fn encode_part(
        &mut self,
        mut read: impl futures::io::AsyncBufRead + core::marker::Unpin,
        finish: bool,
    ) -> AllResult {
        use futures::io::{AsyncBufReadExt, AsyncWriteExt};

        let IntoAsync { encoder, writer } = self;
        let mut bytes_read = 0;
        let mut bytes_written = 0;
        let mut outbuf = vec![0; STREAM_BUF_SIZE];

        let status = loop {
            let data = match read.fill_buf().await {
                Ok(data) => data,
                Err(err) => break Err(err),
            };

            if data.is_empty() {
                if finish {
                    encoder.finish();
                } else {
                    break Ok(());
                }
            }

            let result = encoder.encode_bytes(data, &mut outbuf[..]);
            bytes_read += result.consumed_in;
            bytes_written += result.consumed_out;
            read.consume_unpin(result.consumed_in);

            if let Err(err) = writer.write_all(&outbuf[..result.consumed_out]).await {
                break Err(err);
            }

            match result.status {
                LzwStatus::Ok => {}
                LzwStatus::Done => break writer.flush().await,
                LzwStatus::NoProgress => break Err(no_progress()),
            }
        };

        AllResult {
            bytes_read,
            bytes_written,
            status,
        }
    }
}

impl IntoVec<'_> {
    /// Encode data from a slice.
    ///
    /// The stream is not finished, more data can be appended by later calls.
    pub fn encode(&mut self, read: &[u8]) -> VecResult {
        self.encode_part(read, false)
    }

    /// Encode data from a slice and finish the stream.
    pub fn encode_all(mut self, read: &[u8]) -> VecResult {
        self.encode_part(read, true)
    }

    fn encode_part(&mut self, mut read: &[u8], finish: bool) -> VecResult {
        let IntoVec { encoder, vector } = self;
        let mut consumed_in = 0;
        let mut consumed_out = 0;

        if finish {
            encoder.finish();
        }

        let status = loop {
            let start = vector.len();
            vector.resize(start + VEC_CHUNK, 0);
            let result = encoder.encode_bytes(read, &mut vector[start..]);
            vector.truncate(start + result.consumed_out);

            read = &read[result.consumed_in..];
            consumed_in += result.consumed_in;
            consumed_out += result.consumed_out;

            match result.status {
                LzwStatus::Ok => {}
                LzwStatus::Done => break LzwStatus::Done,
                // All input is consumed and all complete bytes are out.
                LzwStatus::NoProgress => break LzwStatus::Ok,
            }
        };

        VecResult {
            consumed_in,
            consumed_out,
            status,
        }
    }
}

#[cfg(feature = "std")]
fn no_progress() -> io::Error {
    io::Error::new(
        io::ErrorKind::WriteZero,
        "No room in the output buffer to make progress",
    )
}

impl EncodeState {
    fn new(framing: Framing) -> Self {
        EncodeState {
            framing,
            header: Header { written: 0 },
            dict: Dictionary::new(),
            candidate: Vec::new(),
            pending: None,
            buffer: Packer::new(framing),
            has_ended: false,
            saturated: false,
            phase: Phase::Encoding,
        }
    }

    fn advance(&mut self, mut inp: &[u8], mut out: &mut [u8]) -> StreamResult {
        let c_in = inp.len();
        let c_out = out.len();
        let mut status = LzwStatus::Ok;

        loop {
            if !self.header.write_out(&mut out) {
                break;
            }

            // Complete bytes leave before the next code is queued, this bounds the buffer.
            if self.buffer.flush_out(&mut out) {
                break;
            }

            // Once the last code is queued no further input is accepted.
            if self.phase == Phase::Encoding {
                if let Some((&byte, rest)) = inp.split_first() {
                    inp = rest;
                    self.next_byte(byte);
                    continue;
                }
            }

            if !self.has_ended {
                break;
            }

            match self.phase {
                Phase::Encoding => {
                    let before = self.candidate.len();
                    self.emit_pending(before);
                    self.phase = Phase::Padding;
                }
                Phase::Padding => {
                    if !self.buffer.pad() {
                        self.phase = Phase::Done;
                        self.log_summary();
                    }
                }
                Phase::Done => {
                    status = LzwStatus::Done;
                    break;
                }
            }
        }

        let consumed_in = c_in - inp.len();
        let consumed_out = c_out - out.len();
        if status == LzwStatus::Ok && consumed_in == 0 && consumed_out == 0 {
            status = LzwStatus::NoProgress;
        }

        StreamResult {
            consumed_in,
            consumed_out,
            status,
        }
    }

    fn next_byte(&mut self, byte: u8) {
        self.candidate.push(byte);
        if let Some(code) = self.dict.lookup(&self.candidate) {
            self.pending = Some(code);
            return;
        }

        self.learn();
        self.emit_pending(self.candidate.len() - 1);
        self.candidate.clear();
        self.candidate.push(byte);
        self.pending = Some(Code::from(byte));
    }

    fn learn(&mut self) {
        match self.dict.insert(&self.candidate) {
            Ok(_) => {}
            // The string stays unknown, later input is encoded with the frozen table.
            Err(DictionaryFull) => {
                if !self.saturated {
                    self.saturated = true;
                    log::debug!(
                        "dictionary saturated with {} learned entries",
                        self.dict.len()
                    );
                }
            }
        }
    }

    /// Queue the code of the match preceding the last read byte.
    ///
    /// Without any match the bytes before that point go out as literals; `before` is the
    /// length of that run in the candidate.
    fn emit_pending(&mut self, before: usize) {
        match self.pending {
            Some(code) if code < 256 => {
                log::trace!("literal {{{}}}", (code as u8).escape_ascii());
                self.buffer.put_code(code);
            }
            Some(code) => {
                log::trace!("code [{}]", code);
                self.buffer.put_code(code);
            }
            None => self.buffer.put_string(&self.candidate[..before]),
        }
    }

    fn log_summary(&self) {
        log::debug!(
            "stream finished: {} codes, {} padding, {} entries learned",
            self.buffer.codes(),
            self.buffer.padding(),
            self.dict.len(),
        );

        if log::log_enabled!(log::Level::Debug) {
            for (code, value) in self.dict.learned() {
                log::debug!("dump [{}] = {{{}}}", code, value.escape_ascii());
            }
        }
    }
}

impl Header {
    /// Write the rest of the header, returning if it is complete.
    fn write_out(&mut self, out: &mut &mut [u8]) -> bool {
        let rest = &HEADER[self.written..];
        let count = rest.len().min((*out).len());
        let (bytes, tail) = core::mem::replace(out, &mut []).split_at_mut(count);
        bytes.copy_from_slice(&rest[..count]);
        *out = tail;
        self.written += count;
        self.written == HEADER.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{encode_to_vec, Encoder};
    use crate::{LzwStatus, FIRST_LEARNED, MAX_ENTRIES};

    #[test]
    fn header_survives_tiny_buffers() {
        let mut encoder = Encoder::new();
        encoder.finish();
        let mut output = vec![];
        loop {
            let mut target = [0u8; 1];
            let result = encoder.encode_bytes(&[], &mut target);
            output.extend_from_slice(&target[..result.consumed_out]);
            if result.status == LzwStatus::Done {
                break;
            }
        }
        assert_eq!(output, [0x1f, 0x9d, 0x89]);
        assert!(encoder.is_done());
    }

    #[test]
    fn second_repeat_learns_pair() {
        let mut encoder = Encoder::new();
        let mut output = vec![];
        let result = encoder.into_vec(&mut output).encode(b"AA");
        assert_eq!(result.status, LzwStatus::Ok);
        assert_eq!(encoder.dictionary().lookup(b"AA"), Some(FIRST_LEARNED));
        assert_eq!(encoder.dictionary().len(), 1);
        assert!(!encoder.has_ended());
    }

    #[test]
    fn no_progress_without_room() {
        let mut encoder = Encoder::new();
        let result = encoder.encode_bytes(b"abc", &mut []);
        assert_eq!(result.status, LzwStatus::NoProgress);
        assert_eq!(result.consumed_in, 0);
    }

    #[test]
    fn no_progress_without_input() {
        let mut encoder = Encoder::new();
        let mut target = [0u8; 8];
        let result = encoder.encode_bytes(&[], &mut target);
        assert_eq!(result.consumed_out, 3);
        assert_eq!(result.status, LzwStatus::Ok);
        let result = encoder.encode_bytes(&[], &mut target);
        assert_eq!(result.status, LzwStatus::NoProgress);
    }

    #[test]
    fn done_is_sticky() {
        let mut encoder = Encoder::new();
        let mut output = vec![];
        let result = encoder.into_vec(&mut output).encode_all(b"abcabc");
        assert_eq!(result.status, LzwStatus::Done);
        let mut target = [0u8; 8];
        let result = encoder.encode_bytes(&[], &mut target);
        assert_eq!(result.status, LzwStatus::Done);
        assert_eq!(result.consumed_out, 0);
    }

    #[test]
    fn input_after_done_is_refused() {
        let mut encoder = Encoder::new();
        let mut output = vec![];
        let result = encoder.into_vec(&mut output).encode_all(b"abc");
        assert_eq!(result.status, LzwStatus::Done);
        let finished = output.clone();

        let mut target = [0u8; 16];
        let result = encoder.encode_bytes(b"more", &mut target);
        assert_eq!(result.status, LzwStatus::Done);
        assert_eq!(result.consumed_in, 0);
        assert_eq!(result.consumed_out, 0);

        let result = encoder.into_vec(&mut output).encode(b"more");
        assert_eq!(result.status, LzwStatus::Done);
        assert_eq!(output, finished);
    }

    #[test]
    fn input_while_padding_is_refused() {
        let mut encoder = Encoder::new();
        let mut target = [0u8; 3];
        let result = encoder.encode_bytes(b"A", &mut target);
        assert_eq!(result.consumed_in, 1);
        encoder.finish();
        // Only one output byte of room: the final code is queued but padding is not written out.
        let mut tiny = [0u8; 1];
        let result = encoder.encode_bytes(&[], &mut tiny);
        assert_eq!(result.status, LzwStatus::Ok);
        let result = encoder.encode_bytes(b"B", &mut tiny);
        assert_eq!(result.consumed_in, 0);
        assert_eq!(encoder.dictionary().lookup(b"AB"), None);
    }

    #[test]
    fn saturation_keeps_encoding() {
        // Pairs of distinct bytes, each one a new string until the table is full.
        let data: Vec<u8> = (0..=255u8)
            .flat_map(|a| (0..=255u8).step_by(7).map(move |b| [a, b]))
            .flatten()
            .collect();
        let mut encoder = Encoder::new();
        let mut output = vec![];
        let result = encoder.into_vec(&mut output).encode_all(&data);
        assert_eq!(result.status, LzwStatus::Done);
        assert_eq!(result.consumed_in, data.len());
        assert!(encoder.dictionary().is_full());
        assert_eq!(
            encoder.dictionary().len(),
            MAX_ENTRIES - usize::from(FIRST_LEARNED)
        );
    }

    #[test]
    fn helper_matches_encoder() {
        let data = b"TOBEORNOTTOBEORTOBEORNOT";
        let mut encoder = Encoder::new();
        let mut output = vec![];
        let result = encoder.into_vec(&mut output).encode_all(data);
        assert_eq!(result.status, LzwStatus::Done);
        assert_eq!(encode_to_vec(data), output);
    }
}
