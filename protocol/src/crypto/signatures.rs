//! # Digital Signatures
//!
//! Domain-separated Ed25519 signing and verification.
//!
//! Nothing in the protocol signs a bare message. Transactions are signed as
//! `"TX" || bytes`, delegated programs as `"Program" || program`, and
//! free-form data as `"MX" || data`. These wrappers make the domain an
//! explicit argument so the prefix can't be forgotten at a call site.

use super::hash::HashDomain;
use super::keys::{Keypair, PublicKey, Signature};

/// Sign `domain.tag() || message`.
pub fn sign_in_domain(keypair: &Keypair, domain: HashDomain, message: &[u8]) -> Signature {
    keypair.sign(&domain.prefixed(message))
}

/// Verify a signature over `domain.tag() || message`.
pub fn verify_in_domain(
    public_key: &PublicKey,
    domain: HashDomain,
    message: &[u8],
    signature: &Signature,
) -> bool {
    public_key.verify(&domain.prefixed(message), signature)
}

/// Sign arbitrary application data with an account key.
///
/// The `"MX"` prefix guarantees the result can never be replayed as a
/// transaction or program signature.
///
/// # Example
///
/// ```
/// use algo_protocol::crypto::{Keypair, sign_bytes, verify_bytes};
///
/// let kp = Keypair::generate();
/// let sig = sign_bytes(&kp, b"login nonce 42");
/// assert!(verify_bytes(&kp.public_key(), b"login nonce 42", &sig));
/// ```
pub fn sign_bytes(keypair: &Keypair, data: &[u8]) -> Signature {
    sign_in_domain(keypair, HashDomain::Bytes, data)
}

/// Verify a signature produced by [`sign_bytes`].
pub fn verify_bytes(public_key: &PublicKey, data: &[u8], signature: &Signature) -> bool {
    verify_in_domain(public_key, HashDomain::Bytes, data, signature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify_in_domain() {
        let kp = Keypair::generate();
        let sig = sign_in_domain(&kp, HashDomain::Transaction, b"payload");
        assert!(verify_in_domain(
            &kp.public_key(),
            HashDomain::Transaction,
            b"payload",
            &sig
        ));
    }

    #[test]
    fn test_signature_is_over_prefixed_message() {
        let kp = Keypair::from_seed(&[3u8; 32]);
        let sig = sign_in_domain(&kp, HashDomain::Program, b"\x01\x20");
        assert_eq!(sig, kp.sign(b"Program\x01\x20"));
    }

    #[test]
    fn test_domain_mismatch_fails() {
        let kp = Keypair::generate();
        let sig = sign_in_domain(&kp, HashDomain::Transaction, b"payload");
        assert!(!verify_in_domain(
            &kp.public_key(),
            HashDomain::Program,
            b"payload",
            &sig
        ));
    }

    #[test]
    fn test_sign_bytes_is_not_a_transaction_signature() {
        let kp = Keypair::generate();
        let sig = sign_bytes(&kp, b"data");
        assert!(verify_bytes(&kp.public_key(), b"data", &sig));
        assert!(!verify_in_domain(
            &kp.public_key(),
            HashDomain::Transaction,
            b"data",
            &sig
        ));
    }

    #[test]
    fn test_empty_message() {
        let kp = Keypair::generate();
        let sig = sign_bytes(&kp, b"");
        assert!(verify_bytes(&kp.public_key(), b"", &sig));
    }
}
