//! Packing of codes into a byte stream, most significant bit first.
use crate::{Code, Framing, CODE_SIZE, PAD_CODE};

/// Serializes codes into bytes.
///
/// Codes are queued into a 64-bit buffer where the oldest bits sit at the most significant end.
/// Complete bytes are taken from that end by [`flush_out`]. The buffer itself does not bound
/// the number of queued bits, drain it before queueing more than 64 bits.
///
/// [`flush_out`]: #method.flush_out
pub struct Packer {
    /// The width of the next code.
    code_size: u8,
    /// The buffer bits.
    buffer: u64,
    /// The number of valid buffer bits.
    bits_in_buffer: u8,
    /// The number of codes queued so far, padding included.
    codes: usize,
    /// The number of padding codes queued so far.
    padding: usize,
}

impl Packer {
    /// Create an empty buffer whose first code is framed according to `framing`.
    pub fn new(framing: Framing) -> Self {
        let code_size = match framing {
            Framing::Uniform => CODE_SIZE,
            Framing::Legacy => CODE_SIZE - 1,
        };

        Packer {
            code_size,
            buffer: 0,
            bits_in_buffer: 0,
            codes: 0,
            padding: 0,
        }
    }

    /// Queue the low bits of a code with the current code width.
    ///
    /// Only the low 9 bits of `code` are considered and of those only as many as the current
    /// width allows. All codes after the first are 9 bits wide.
    pub fn put_code(&mut self, code: Code) {
        debug_assert!(self.bits_in_buffer + self.code_size <= 64, "packer overrun");
        let mask = (1u64 << self.code_size) - 1;
        let code = u64::from(code & 0x1ff) & mask;

        let shift = 64 - self.bits_in_buffer - self.code_size;
        self.buffer |= code << shift;
        self.bits_in_buffer += self.code_size;
        self.code_size = CODE_SIZE;
        self.codes += 1;
    }

    /// Queue each byte of `bytes` as its literal code.
    pub fn put_string(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.put_code(Code::from(byte));
        }
    }

    /// Queue one padding code if the stream does not end on a byte boundary yet.
    ///
    /// Returns whether a code was queued. Call this repeatedly, draining in between, until it
    /// returns `false`. Every code after the first is 9 bits wide so each padding code moves the
    /// bit count one step closer to the boundary; at most seven are needed.
    pub fn pad(&mut self) -> bool {
        if self.is_aligned() {
            return false;
        }

        self.put_code(PAD_CODE);
        self.padding += 1;
        true
    }

    /// If all queued bits form complete bytes.
    pub fn is_aligned(&self) -> bool {
        self.bits_in_buffer % 8 == 0
    }

    /// Move all complete bytes into `out`, returning if at least one complete byte remains.
    pub fn flush_out(&mut self, out: &mut &mut [u8]) -> bool {
        let want = usize::from(self.bits_in_buffer / 8);
        let count = want.min((*out).len());
        let (bytes, tail) = core::mem::replace(out, &mut []).split_at_mut(count);
        *out = tail;

        for b in bytes {
            *b = ((self.buffer & 0xff00_0000_0000_0000) >> 56) as u8;
            self.buffer <<= 8;
            self.bits_in_buffer -= 8;
        }

        count < want
    }

    /// The number of queued bits not yet moved out.
    pub fn pending_bits(&self) -> u8 {
        self.bits_in_buffer
    }

    /// The width the next code will be packed with.
    pub fn code_size(&self) -> u8 {
        self.code_size
    }

    /// The number of codes queued so far, padding included.
    pub fn codes(&self) -> usize {
        self.codes
    }

    /// The number of padding codes queued so far.
    pub fn padding(&self) -> usize {
        self.padding
    }
}
