// crates/pt-engine/src/ffi/struct_return.rs
//
// Owning guard for a caller-allocated struct-by-value return buffer.
// Encapsulated in a scoped owner so fan-out only threads a reference
// through, and the buffer is freed as soon as the guard drops — a
// per-SetGroup-member buffer lifetime rather than batching frees at
// the end of a whole group.

pub struct StructReturn {
    buffer: Vec<u8>,
}

impl StructReturn {
    pub fn new(size: usize) -> Self {
        Self {
            buffer: vec![0u8; size],
        }
    }

    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.buffer.as_mut_ptr()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
