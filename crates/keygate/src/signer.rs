//! hmac token signing and verification for multipasses.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use keygate_access::{Error, MultipassClaims, Result, TokenSigner};

/// signs multipass claims with hs256.
#[derive(Clone)]
pub struct HmacSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl HmacSigner {
    /// build a signer from a shared secret.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// verify a token and return its claims.
    ///
    /// checks the signature and the `exp` claim; the caller still has to
    /// compare `jti` against the multipass salt.
    pub fn verify(&self, token: &str, issuer: &str) -> Result<MultipassClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer]);
        validation.validate_aud = false;

        let data = decode::<MultipassClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| Error::TokenSign(e.to_string()))?;
        Ok(data.claims)
    }
}

impl TokenSigner for HmacSigner {
    fn sign(&self, claims: &MultipassClaims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| Error::TokenSign(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(exp: i64) -> MultipassClaims {
        MultipassClaims {
            iss: "keygate".to_string(),
            sub: "mp1".to_string(),
            aud: "t1".to_string(),
            jti: "jti1".to_string(),
            iat: exp - 3600,
            exp,
        }
    }

    #[test]
    fn test_sign_verify_round_trip() {
        let signer = HmacSigner::new(b"secret");
        let exp = chrono::Utc::now().timestamp() + 3600;
        let token = signer.sign(&claims(exp)).unwrap();

        let verified = signer.verify(&token, "keygate").unwrap();
        assert_eq!(verified.sub, "mp1");
        assert_eq!(verified.jti, "jti1");
    }

    #[test]
    fn test_verify_rejects_wrong_secret_and_issuer() {
        let signer = HmacSigner::new(b"secret");
        let exp = chrono::Utc::now().timestamp() + 3600;
        let token = signer.sign(&claims(exp)).unwrap();

        assert!(HmacSigner::new(b"other").verify(&token, "keygate").is_err());
        assert!(signer.verify(&token, "somebody-else").is_err());
    }

    #[test]
    fn test_verify_rejects_expired() {
        let signer = HmacSigner::new(b"secret");
        let token = signer
            .sign(&claims(chrono::Utc::now().timestamp() - 3600))
            .unwrap();
        assert!(signer.verify(&token, "keygate").is_err());
    }
}
