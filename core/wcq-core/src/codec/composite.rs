//! Composite key codec — byte-comparable multi-component cell names.
//!
//! Every component is written escaped and followed by a two byte terminator:
//!
//! ```text
//! 0x00        -> 0x00 0xFF   (escaped payload byte)
//! terminator  =  0x00 <eoc>  (end-of-component marker)
//! ```
//!
//! The end-of-component marker decides where a bound sorts relative to the
//! stored keys sharing its components:
//!
//! ```text
//! EOC_BEFORE (0x00)  Lt, Gte   before every key with this component
//! EOC_EXACT  (0x01)  Eq        stored keys
//! EOC_AFTER  (0x02)  Gt, Lte   after every key with this component
//! ```
//!
//! A shorter component always sorts first because its `0x00` terminator is
//! lower than any payload byte (and an escaped `0x00 0xFF` beats every marker),
//! so plain `memcmp` over encoded keys follows component-wise byte order.

use crate::error::{WcqError, WcqResult};
use crate::operator::Operator;
use smallvec::SmallVec;

pub const ESCAPE: u8 = 0x00;
pub const ESCAPED_ZERO: u8 = 0xFF;
pub const EOC_BEFORE: u8 = 0x00;
pub const EOC_EXACT: u8 = 0x01;
pub const EOC_AFTER: u8 = 0x02;

/// End-of-component marker for a comparison operator.
pub fn end_of_component(op: Operator) -> u8 {
    match op {
        Operator::Lt | Operator::Gte => EOC_BEFORE,
        Operator::Eq => EOC_EXACT,
        Operator::Gt | Operator::Lte => EOC_AFTER,
    }
}

fn write_component(buf: &mut Vec<u8>, component: &[u8], eoc: u8) {
    for &b in component {
        if b == ESCAPE {
            buf.extend_from_slice(&[ESCAPE, ESCAPED_ZERO]);
        } else {
            buf.push(b);
        }
    }
    buf.extend_from_slice(&[ESCAPE, eoc]);
}

/// Encodes a fully specified composite (every component `Eq`).
pub fn encode<C: AsRef<[u8]>>(components: &[C]) -> Vec<u8> {
    let size: usize = components.iter().map(|c| c.as_ref().len() + 2).sum();
    let mut buf = Vec::with_capacity(size);
    for c in components {
        write_component(&mut buf, c.as_ref(), EOC_EXACT);
    }
    buf
}

/// Decoded composite name.
///
/// Accessors are bounds-checked; a name shorter than the table expects simply
/// has fewer components.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Composite {
    components: SmallVec<[Vec<u8>; 4]>,
}

impl Composite {
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&[u8]> {
        self.components.get(position).map(Vec::as_slice)
    }

    /// Component at `position`, or the empty string when the name is shorter.
    pub fn get_or_empty(&self, position: usize) -> &[u8] {
        self.get(position).unwrap_or(&[])
    }

    pub fn last(&self) -> Option<&[u8]> {
        self.components.last().map(Vec::as_slice)
    }

    /// All components but the last.
    pub fn prefix(&self) -> &[Vec<u8>] {
        match self.components.len() {
            0 => &[],
            n => &self.components[..n - 1],
        }
    }

    pub fn into_vec(self) -> Vec<Vec<u8>> {
        self.components.into_vec()
    }
}

/// Splits an encoded composite back into its components.
pub fn split(encoded: &[u8]) -> WcqResult<Composite> {
    let mut components = SmallVec::new();
    let mut current = Vec::new();
    let mut pos = 0;
    let mut open = false;

    while pos < encoded.len() {
        let b = encoded[pos];
        if b != ESCAPE {
            current.push(b);
            open = true;
            pos += 1;
            continue;
        }
        let marker = *encoded.get(pos + 1).ok_or_else(|| {
            WcqError::MalformedKey(format!("truncated escape at offset {pos}"))
        })?;
        match marker {
            ESCAPED_ZERO => {
                current.push(ESCAPE);
                open = true;
            }
            EOC_BEFORE | EOC_EXACT | EOC_AFTER => {
                components.push(std::mem::take(&mut current));
                open = false;
            }
            other => {
                return Err(WcqError::MalformedKey(format!(
                    "unknown end-of-component marker 0x{other:02x} at offset {}",
                    pos + 1
                )));
            }
        }
        pos += 2;
    }

    if open {
        return Err(WcqError::MalformedKey(format!(
            "component {} is missing its terminator",
            components.len()
        )));
    }
    Ok(Composite { components })
}

/// Incremental composite builder for scan bounds.
///
/// Components are appended in order, each with the operator that decides its
/// end-of-component marker. Cloning a builder gives an independent copy that
/// can be extended with a different suffix.
#[derive(Debug, Clone)]
pub struct CompositeBuilder {
    arity: usize,
    count: usize,
    buf: Vec<u8>,
}

impl CompositeBuilder {
    /// A builder for composites of at most `arity` components.
    pub fn new(arity: usize) -> Self {
        Self {
            arity,
            count: 0,
            buf: Vec::new(),
        }
    }

    pub fn add(&mut self, component: &[u8], op: Operator) -> WcqResult<&mut Self> {
        if self.count >= self.arity {
            return Err(WcqError::assertion(format!(
                "composite already has its {} components",
                self.arity
            )));
        }
        write_component(&mut self.buf, component, end_of_component(op));
        self.count += 1;
        Ok(self)
    }

    pub fn build(&self) -> Vec<u8> {
        self.buf.clone()
    }

    /// Same components, but sorting after every key that extends them.
    pub fn build_as_end_of_range(&self) -> Vec<u8> {
        let mut out = self.buf.clone();
        if let Some(last) = out.last_mut() {
            *last = EOC_AFTER;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_then_split_round_trips() {
        let key = encode(&[b"a".as_slice(), b"b".as_slice()]);
        let parts = split(&key).unwrap();
        assert_eq!(parts.into_vec(), vec![b"a".to_vec(), b"b".to_vec()]);
    }

    #[test]
    fn embedded_zero_bytes_survive() {
        let key = encode(&[vec![0u8, 1, 0], vec![]]);
        assert_eq!(key, vec![0x00, 0xFF, 0x01, 0x00, 0xFF, 0x00, 0x01, 0x00, 0x01]);
        let parts = split(&key).unwrap();
        assert_eq!(parts.get(0), Some([0u8, 1, 0].as_slice()));
        assert_eq!(parts.get(1), Some(b"".as_slice()));
    }

    #[test]
    fn empty_key_has_no_components() {
        assert!(split(&[]).unwrap().is_empty());
    }

    #[test]
    fn split_rejects_missing_terminator() {
        let err = split(b"abc").unwrap_err();
        assert!(matches!(err, WcqError::MalformedKey(_)));
    }

    #[test]
    fn split_rejects_truncated_escape() {
        let err = split(&[b'a', 0x00]).unwrap_err();
        assert!(matches!(err, WcqError::MalformedKey(_)));
    }

    #[test]
    fn split_rejects_unknown_marker() {
        let err = split(&[b'a', 0x00, 0x07]).unwrap_err();
        assert!(matches!(err, WcqError::MalformedKey(_)));
    }

    #[test]
    fn shorter_component_sorts_first() {
        assert!(encode(&[b"ab".as_slice()]) < encode(&[b"abc".as_slice()]));
        assert!(encode(&[b"a".as_slice()]) < encode(&[b"a\0".as_slice()]));
        assert!(encode(&[b"a".as_slice(), b"zz".as_slice()]) < encode(&[b"ab".as_slice()]));
    }

    #[test]
    fn bound_markers_bracket_the_prefix() {
        let stored = [
            encode(&[b"a".as_slice(), b"x".as_slice()]),
            encode(&[b"a".as_slice(), b"y".as_slice()]),
        ];
        let before = encode(&[b"0".as_slice(), b"z".as_slice()]);
        let after = encode(&[b"b".as_slice(), b"".as_slice()]);

        let mut gt = CompositeBuilder::new(2);
        gt.add(b"a", Operator::Gt).unwrap();
        let gt = gt.build();
        assert!(stored.iter().all(|k| *k < gt));
        assert!(gt < after);

        let mut lt = CompositeBuilder::new(2);
        lt.add(b"a", Operator::Lt).unwrap();
        let lt = lt.build();
        assert!(stored.iter().all(|k| lt < *k));
        assert!(before < lt);

        let mut lte = CompositeBuilder::new(2);
        lte.add(b"a", Operator::Lte).unwrap();
        assert!(stored.iter().all(|k| *k <= lte.build()));

        let mut gte = CompositeBuilder::new(2);
        gte.add(b"a", Operator::Gte).unwrap();
        assert!(stored.iter().all(|k| gte.build() <= *k));
    }

    #[test]
    fn end_of_range_follows_every_extension() {
        let mut builder = CompositeBuilder::new(2);
        builder.add(b"a", Operator::Eq).unwrap();
        let end = builder.build_as_end_of_range();
        assert!(encode(&[b"a".as_slice(), b"\xff\xff".as_slice()]) < end);
        assert!(end < encode(&[b"a\x01".as_slice()]));
        assert!(CompositeBuilder::new(2).build_as_end_of_range().is_empty());
    }

    #[test]
    fn builder_refuses_extra_components() {
        let mut builder = CompositeBuilder::new(1);
        builder.add(b"a", Operator::Eq).unwrap();
        let err = builder.add(b"b", Operator::Eq).unwrap_err();
        assert!(matches!(err, WcqError::AssertionFailure(_)));
    }

    #[test]
    fn cloned_builder_is_independent() {
        let mut prefix = CompositeBuilder::new(2);
        prefix.add(b"p", Operator::Eq).unwrap();
        let mut first = prefix.clone();
        first.add(b"x", Operator::Eq).unwrap();
        assert_eq!(prefix.build(), encode(&[b"p".as_slice()]));
        assert_eq!(first.build(), encode(&[b"p".as_slice(), b"x".as_slice()]));
    }

    #[test]
    fn prefix_excludes_last_component() {
        let parts = split(&encode(&[b"a".as_slice(), b"b".as_slice(), b"c".as_slice()])).unwrap();
        assert_eq!(parts.prefix(), &[b"a".to_vec(), b"b".to_vec()]);
        assert_eq!(parts.last(), Some(b"c".as_slice()));
        assert_eq!(parts.get_or_empty(5), b"");
    }
}
