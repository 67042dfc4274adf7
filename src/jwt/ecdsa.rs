//! Conversion between DER-encoded ECDSA signatures and the fixed-width `r || s` form used by
//! JOSE (RFC 7518, section 3.4).

use thiserror::Error;

/// Size in bytes of each signature coordinate for ES256 (P-256).
pub const ES256_COORDINATE_SIZE: usize = 32;

const SEQUENCE_TAG: u8 = 0x30;
const INTEGER_TAG: u8 = 0x02;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignatureCodecError {
    #[error("malformed DER signature: `{0}`")]
    MalformedDer(String),
    #[error("signature integer is {0} bytes, larger than the {1} bytes coordinate size")]
    IntegerTooLong(usize, usize),
    #[error("JOSE signature must be {expected} bytes, got {actual}")]
    InvalidJoseLength { expected: usize, actual: usize },
}

/// Converts a DER `SEQUENCE { INTEGER r, INTEGER s }` into `r || s`, each coordinate
/// left-padded to `coordinate_size` bytes.
pub fn der_to_jose(der: &[u8], coordinate_size: usize) -> Result<Vec<u8>, SignatureCodecError> {
    let mut reader = DerReader::new(der);
    let sequence = reader.read_tlv(SEQUENCE_TAG)?;
    if !reader.is_empty() {
        return Err(malformed("trailing bytes after signature sequence"));
    }

    let mut reader = DerReader::new(sequence);
    let r = reader.read_unsigned_integer()?;
    let s = reader.read_unsigned_integer()?;
    if !reader.is_empty() {
        return Err(malformed("trailing bytes inside signature sequence"));
    }

    let mut jose = Vec::with_capacity(coordinate_size * 2);
    for coordinate in [r, s] {
        if coordinate.len() > coordinate_size {
            return Err(SignatureCodecError::IntegerTooLong(
                coordinate.len(),
                coordinate_size,
            ));
        }
        jose.resize(jose.len() + coordinate_size - coordinate.len(), 0);
        jose.extend_from_slice(coordinate);
    }
    Ok(jose)
}

/// Converts a fixed-width `r || s` signature into its minimal DER encoding.
pub fn jose_to_der(jose: &[u8], coordinate_size: usize) -> Result<Vec<u8>, SignatureCodecError> {
    if jose.len() != coordinate_size * 2 {
        return Err(SignatureCodecError::InvalidJoseLength {
            expected: coordinate_size * 2,
            actual: jose.len(),
        });
    }
    let (r, s) = jose.split_at(coordinate_size);

    let mut content = Vec::with_capacity(jose.len() + 6);
    write_unsigned_integer(&mut content, r);
    write_unsigned_integer(&mut content, s);

    let mut der = Vec::with_capacity(content.len() + 4);
    der.push(SEQUENCE_TAG);
    write_length(&mut der, content.len());
    der.extend_from_slice(&content);
    Ok(der)
}

fn malformed(reason: &str) -> SignatureCodecError {
    SignatureCodecError::MalformedDer(reason.to_string())
}

struct DerReader<'a> {
    input: &'a [u8],
}

impl<'a> DerReader<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self { input }
    }

    fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    fn read_byte(&mut self) -> Result<u8, SignatureCodecError> {
        let (first, rest) = self
            .input
            .split_first()
            .ok_or_else(|| malformed("unexpected end of input"))?;
        self.input = rest;
        Ok(*first)
    }

    fn read_length(&mut self) -> Result<usize, SignatureCodecError> {
        let first = self.read_byte()?;
        if first & 0x80 == 0 {
            return Ok(first as usize);
        }
        let num_bytes = (first & 0x7f) as usize;
        if num_bytes == 0 || num_bytes > 2 {
            return Err(malformed("unsupported length encoding"));
        }
        let mut length = 0usize;
        for _ in 0..num_bytes {
            length = (length << 8) | self.read_byte()? as usize;
        }
        if length < 0x80 || (num_bytes == 2 && length <= 0xff) {
            return Err(malformed("non-minimal length encoding"));
        }
        Ok(length)
    }

    /// Reads a tag-length-value with the expected tag and returns its value.
    fn read_tlv(&mut self, tag: u8) -> Result<&'a [u8], SignatureCodecError> {
        let found = self.read_byte()?;
        if found != tag {
            return Err(SignatureCodecError::MalformedDer(format!(
                "expected tag 0x{tag:02x}, found 0x{found:02x}"
            )));
        }
        let length = self.read_length()?;
        if length > self.input.len() {
            return Err(malformed("length exceeds available input"));
        }
        let (value, rest) = self.input.split_at(length);
        self.input = rest;
        Ok(value)
    }

    /// Reads a non-negative INTEGER and returns its magnitude without sign padding.
    fn read_unsigned_integer(&mut self) -> Result<&'a [u8], SignatureCodecError> {
        let value = self.read_tlv(INTEGER_TAG)?;
        match value {
            [] => Err(malformed("empty integer")),
            [first, ..] if first & 0x80 != 0 => Err(malformed("negative integer")),
            [0x00, second, ..] if second & 0x80 == 0 => Err(malformed("non-minimal integer")),
            [0x00, rest @ ..] => Ok(rest),
            _ => Ok(value),
        }
    }
}

fn write_length(out: &mut Vec<u8>, length: usize) {
    if length < 0x80 {
        out.push(length as u8);
    } else if length <= 0xff {
        out.extend_from_slice(&[0x81, length as u8]);
    } else {
        out.extend_from_slice(&[0x82, (length >> 8) as u8, length as u8]);
    }
}

fn write_unsigned_integer(out: &mut Vec<u8>, coordinate: &[u8]) {
    let start = coordinate
        .iter()
        .position(|b| *b != 0)
        .unwrap_or(coordinate.len());
    let magnitude = &coordinate[start..];
    let needs_padding = magnitude.first().is_none_or(|b| b & 0x80 != 0);

    out.push(INTEGER_TAG);
    write_length(out, magnitude.len() + usize::from(needs_padding));
    if needs_padding {
        out.push(0x00);
    }
    out.extend_from_slice(magnitude);
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use p256::ecdsa::signature::Signer;
    use p256::ecdsa::{Signature, SigningKey};
    use rstest::rstest;

    use super::*;

    fn hex(input: &str) -> Vec<u8> {
        (0..input.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&input[i..i + 2], 16).unwrap())
            .collect()
    }

    fn fixed_jose() -> Vec<u8> {
        // r has its high bit clear, s has it set
        (0x01..=0x20).chain(0x80..=0x9f).collect()
    }

    const FIXED_DER: &str = "304502200102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f20022100808182838485868788898a8b8c8d8e8f909192939495969798999a9b9c9d9e9f";

    #[test]
    fn der_to_jose_strips_sign_padding() {
        let jose = der_to_jose(&hex(FIXED_DER), ES256_COORDINATE_SIZE).unwrap();
        assert_eq!(jose.len(), 64);
        assert_eq!(jose, fixed_jose());
    }

    #[test]
    fn jose_to_der_adds_sign_padding() {
        let der = jose_to_der(&fixed_jose(), ES256_COORDINATE_SIZE).unwrap();
        assert_eq!(der, hex(FIXED_DER));
    }

    #[test]
    fn der_to_jose_left_pads_short_integers() {
        // r = 0x01, s = 0x00ff (sign padded)
        let der = hex("3007020101020200ff");
        let jose = der_to_jose(&der, ES256_COORDINATE_SIZE).unwrap();

        let mut expected = vec![0u8; 64];
        expected[31] = 0x01;
        expected[63] = 0xff;
        assert_eq!(jose, expected);
        assert_eq!(jose_to_der(&jose, ES256_COORDINATE_SIZE).unwrap(), der);
    }

    #[test]
    fn zero_coordinates_round_trip() {
        let der = hex("3006020100020100");
        let jose = der_to_jose(&der, ES256_COORDINATE_SIZE).unwrap();
        assert_eq!(jose, vec![0u8; 64]);
        assert_eq!(jose_to_der(&jose, ES256_COORDINATE_SIZE).unwrap(), der);
    }

    #[test]
    fn long_form_sequence_length() {
        // P-521 sized coordinates need a long-form sequence length.
        let coordinate_size = 66;
        let jose: Vec<u8> = (0..coordinate_size * 2).map(|i| 0x80 | i as u8).collect();
        let der = jose_to_der(&jose, coordinate_size).unwrap();

        assert_eq!(&der[..3], &[SEQUENCE_TAG, 0x81, 138]);
        assert_eq!(der_to_jose(&der, coordinate_size).unwrap(), jose);
    }

    #[test]
    fn signatures_from_p256_round_trip() {
        let key = SigningKey::from_slice(&[0x42; 32]).unwrap();
        for i in 0..64u32 {
            let signature: Signature = key.sign(format!("message {i}").as_bytes());
            let der = signature.to_der();

            let jose = der_to_jose(der.as_bytes(), ES256_COORDINATE_SIZE).unwrap();
            assert_eq!(jose.len(), 64);
            assert_eq!(jose.as_slice(), signature.to_bytes().as_slice());
            assert_eq!(
                jose_to_der(&jose, ES256_COORDINATE_SIZE).unwrap(),
                der.as_bytes()
            );
        }
    }

    #[rstest]
    #[case::empty("")]
    #[case::not_a_sequence("3106020100020100")]
    #[case::truncated("30450220010203")]
    #[case::trailing_bytes("300602010002010000")]
    #[case::trailing_inside_sequence("3009020100020100020100")]
    #[case::not_an_integer("3006040100020100")]
    #[case::empty_integer("30050200020100")]
    #[case::negative_integer("3006020180020100")]
    #[case::non_minimal_integer("300702020001020100")]
    #[case::missing_s("3003020101")]
    #[case::indefinite_length("3080020100020100")]
    #[case::non_minimal_length("308106020100020100")]
    fn malformed_der_is_rejected(#[case] der: &str) {
        assert_matches!(
            der_to_jose(&hex(der), ES256_COORDINATE_SIZE),
            Err(SignatureCodecError::MalformedDer(_))
        );
    }

    #[test]
    fn integer_larger_than_coordinate_is_rejected() {
        let mut der = vec![SEQUENCE_TAG, 2 + 33 + 3, INTEGER_TAG, 33];
        der.extend_from_slice(&[0x01; 33]);
        der.extend_from_slice(&[INTEGER_TAG, 1, 0x01]);
        assert_eq!(
            der_to_jose(&der, ES256_COORDINATE_SIZE),
            Err(SignatureCodecError::IntegerTooLong(33, 32))
        );
    }

    #[rstest]
    #[case(0)]
    #[case(63)]
    #[case(65)]
    fn jose_with_wrong_length_is_rejected(#[case] len: usize) {
        assert_eq!(
            jose_to_der(&vec![1u8; len], ES256_COORDINATE_SIZE),
            Err(SignatureCodecError::InvalidJoseLength {
                expected: 64,
                actual: len
            })
        );
    }
}
