use std::fmt;

use bytes::Bytes;
use iso7816_tlv::ber::{Tag, Tlv};
use tracing::warn;

use crate::constants::{PUBLIC_KEY_LEN, REGISTRATION_RESERVED_BYTE};
use crate::{Error, Result};

/// DER SEQUENCE tag that opens an X.509 certificate
const CERTIFICATE_TAG: u8 = 0x30;

/// Tag of an uncompressed elliptic curve point
const UNCOMPRESSED_POINT_TAG: u8 = 0x04;

/// Registration response message
///
/// ```text
/// 0x05 | public key (65) | L | key handle (L) | certificate (DER) | signature
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationResponse {
    /// User public key as an uncompressed P-256 point
    pub public_key: [u8; PUBLIC_KEY_LEN],
    /// Opaque key handle to present on authentication
    pub key_handle: Bytes,
    /// DER-encoded attestation certificate
    pub certificate: Bytes,
    /// ECDSA signature over the registration data
    pub signature: Bytes,
}

impl RegistrationResponse {
    /// Parse a registration response body
    pub fn parse(data: &[u8]) -> Result<Self> {
        let (&reserved, rest) = data
            .split_first()
            .ok_or(Error::InvalidResponse("empty registration response"))?;
        if reserved != REGISTRATION_RESERVED_BYTE {
            return Err(Error::InvalidReservedByte(reserved));
        }

        let (public_key, rest) = rest
            .split_first_chunk::<PUBLIC_KEY_LEN>()
            .ok_or(Error::InvalidResponse("truncated public key"))?;

        let (&key_handle_len, rest) = rest
            .split_first()
            .ok_or(Error::InvalidResponse("missing key handle length"))?;
        let key_handle_len = key_handle_len as usize;
        if rest.len() < key_handle_len {
            return Err(Error::InvalidResponse("truncated key handle"));
        }
        let (key_handle, rest) = rest.split_at(key_handle_len);

        let (certificate, signature) = split_certificate(rest)?;
        if signature.is_empty() {
            return Err(Error::InvalidResponse("missing signature"));
        }

        let response = Self {
            public_key: *public_key,
            key_handle: Bytes::copy_from_slice(key_handle),
            certificate: Bytes::copy_from_slice(certificate),
            signature: Bytes::copy_from_slice(signature),
        };
        if !response.is_uncompressed_point() {
            warn!(
                tag = response.public_key[0],
                "Public key is not an uncompressed point"
            );
        }

        Ok(response)
    }

    /// Whether the public key carries the uncompressed point tag
    pub const fn is_uncompressed_point(&self) -> bool {
        self.public_key[0] == UNCOMPRESSED_POINT_TAG
    }
}

/// Split a DER certificate from the bytes that follow it
///
/// The certificate length comes from its own TLV header.
fn split_certificate(data: &[u8]) -> Result<(&[u8], &[u8])> {
    if data.is_empty() {
        return Err(Error::InvalidResponse("missing attestation certificate"));
    }

    let (tlv, remaining) = Tlv::parse(data);
    let tlv = tlv.map_err(|_| Error::InvalidResponse("truncated attestation certificate"))?;
    if tlv.tag() != &Tag::try_from(CERTIFICATE_TAG).map_err(Error::Tlv)? {
        return Err(Error::InvalidResponse("certificate is not a DER sequence"));
    }

    Ok(data.split_at(data.len() - remaining.len()))
}

impl fmt::Display for RegistrationResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Public key:  {}", hex::encode_upper(&self.public_key))?;
        writeln!(f, "Key handle:  {}", hex::encode_upper(&self.key_handle))?;
        writeln!(
            f,
            "Certificate: {} bytes\n  {}",
            self.certificate.len(),
            hex::encode_upper(&self.certificate)
        )?;
        write!(f, "Signature:   {}", hex::encode_upper(&self.signature))
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    /// Build a registration body around a small stand-in certificate
    fn sample_registration(key_handle: &[u8], signature: &[u8]) -> Vec<u8> {
        let mut data = vec![REGISTRATION_RESERVED_BYTE, UNCOMPRESSED_POINT_TAG];
        data.extend_from_slice(&[0x5A; PUBLIC_KEY_LEN - 1]);
        data.push(key_handle.len() as u8);
        data.extend_from_slice(key_handle);
        // SEQUENCE { INTEGER 1, OCTET STRING 0xAB 0xCD }
        data.extend_from_slice(&hex!("30070201010402ABCD"));
        data.extend_from_slice(signature);
        data
    }

    #[test]
    fn test_parse_registration() {
        let data = sample_registration(&hex!("DEADBEEF"), &hex!("3045AABBCC"));
        let response = RegistrationResponse::parse(&data).unwrap();

        assert!(response.is_uncompressed_point());
        assert_eq!(&response.key_handle[..], &hex!("DEADBEEF"));
        assert_eq!(&response.certificate[..], &hex!("30070201010402ABCD"));
        assert_eq!(&response.signature[..], &hex!("3045AABBCC"));
    }

    #[test]
    fn test_parse_long_form_certificate_length() {
        let mut data = vec![REGISTRATION_RESERVED_BYTE];
        data.extend_from_slice(&[0x04; PUBLIC_KEY_LEN]);
        data.push(0);
        // SEQUENCE with a two-byte length of 300
        data.extend_from_slice(&hex!("3082012C"));
        data.extend_from_slice(&[0x05, 0x00].repeat(150));
        data.extend_from_slice(&hex!("0102"));

        let response = RegistrationResponse::parse(&data).unwrap();
        assert!(response.key_handle.is_empty());
        assert_eq!(response.certificate.len(), 304);
        assert_eq!(&response.signature[..], &hex!("0102"));
    }

    #[test]
    fn test_wrong_reserved_byte() {
        let mut data = sample_registration(&[0x01], &[0x02]);
        data[0] = 0x04;
        let err = RegistrationResponse::parse(&data).unwrap_err();
        assert!(matches!(err, Error::InvalidReservedByte(0x04)));
        assert!(err.is_structural());
    }

    #[test]
    fn test_truncated_responses() {
        let data = sample_registration(&hex!("DEADBEEF"), &[0x02]);

        for len in [0, 1, 40, 66, 68, data.len() - 1] {
            let err = RegistrationResponse::parse(&data[..len]).unwrap_err();
            assert!(err.is_structural(), "length {len}: {err}");
        }
    }

    #[test]
    fn test_certificate_must_be_sequence() {
        let mut data = sample_registration(&[0x01], &[0x02]);
        let cert_offset = 1 + PUBLIC_KEY_LEN + 1 + 1;
        data[cert_offset] = 0x31;
        let err = RegistrationResponse::parse(&data).unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
    }
}
