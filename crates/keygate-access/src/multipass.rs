//! multipass token issue and prolongation.
//!
//! the actual jwt signing lives behind [`TokenSigner`] so this logic
//! stays pure; the server wires in an hmac signer, tests use a fake.

use keygate_types::{Multipass, new_uuid};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// claims carried by an issued multipass token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipassClaims {
    /// issuer.
    pub iss: String,
    /// subject: the multipass uuid.
    pub sub: String,
    /// audience: the owner's tenant uuid.
    pub aud: String,
    /// token id; must match the multipass salt to be accepted.
    pub jti: String,
    /// issued-at unix timestamp.
    pub iat: i64,
    /// expiry unix timestamp.
    pub exp: i64,
}

/// signs multipass claims into a compact token.
pub trait TokenSigner {
    /// produce a signed token for the given claims.
    fn sign(&self, claims: &MultipassClaims) -> Result<String>;
}

/// issues and prolongs multipass tokens.
pub struct MultipassService<S: TokenSigner> {
    signer: S,
    issuer: String,
}

impl<S: TokenSigner> MultipassService<S> {
    /// create a service signing with the given issuer name.
    pub fn new(signer: S, issuer: impl Into<String>) -> Self {
        Self {
            signer,
            issuer: issuer.into(),
        }
    }

    /// issue a fresh token for a multipass.
    ///
    /// rotates the multipass salt, so any previously issued token stops
    /// matching. the caller persists the updated multipass.
    pub fn issue(&self, multipass: &mut Multipass, now: i64) -> Result<String> {
        if multipass.archive_mark.is_archived() || multipass.valid_till <= now {
            return Err(Error::MultipassExpired(multipass.uuid.clone()));
        }

        let jti = new_uuid();
        multipass.salt = jti.clone();

        let exp = (now + multipass.ttl_seconds).min(multipass.valid_till);
        self.signer.sign(&MultipassClaims {
            iss: self.issuer.clone(),
            sub: multipass.uuid.clone(),
            aud: multipass.tenant_uuid.clone(),
            jti,
            iat: now,
            exp,
        })
    }

    /// prolong an existing multipass: same semantics as issue, but only
    /// allowed for a multipass that already carries a token issue.
    pub fn prolong(&self, multipass: &mut Multipass, now: i64) -> Result<String> {
        if multipass.salt.is_empty() {
            return Err(Error::MultipassExpired(multipass.uuid.clone()));
        }
        self.issue(multipass, now)
    }
}

/// true if a presented token's jti matches the current issue.
pub fn jti_matches(multipass: &Multipass, jti: &str) -> bool {
    !multipass.salt.is_empty() && multipass.salt == jti
}

#[cfg(test)]
mod tests {
    use keygate_types::MultipassOwnerType;

    use super::*;

    struct FakeSigner;

    impl TokenSigner for FakeSigner {
        fn sign(&self, claims: &MultipassClaims) -> Result<String> {
            Ok(format!("{}:{}:{}", claims.sub, claims.jti, claims.exp))
        }
    }

    const NOW: i64 = 1_700_000_000;

    fn multipass() -> Multipass {
        Multipass::new(
            "t1",
            MultipassOwnerType::User,
            "u1",
            3600,
            86400,
            NOW + 1_000_000,
        )
    }

    #[test]
    fn test_issue_rotates_salt() {
        let service = MultipassService::new(FakeSigner, "keygate");
        let mut mp = multipass();
        assert!(mp.salt.is_empty());

        let token = service.issue(&mut mp, NOW).unwrap();
        assert!(!mp.salt.is_empty());
        assert!(token.contains(&mp.salt));

        let first_salt = mp.salt.clone();
        service.issue(&mut mp, NOW).unwrap();
        assert_ne!(mp.salt, first_salt);
        assert!(!jti_matches(&mp, &first_salt));
        assert!(jti_matches(&mp, &mp.salt.clone()));
    }

    #[test]
    fn test_expiry_capped_by_valid_till() {
        let service = MultipassService::new(FakeSigner, "keygate");
        let mut mp = multipass();
        mp.valid_till = NOW + 60;

        let token = service.issue(&mut mp, NOW).unwrap();
        assert!(token.ends_with(&format!(":{}", NOW + 60)));
    }

    #[test]
    fn test_issue_rejects_expired_or_archived() {
        let service = MultipassService::new(FakeSigner, "keygate");

        let mut expired = multipass();
        expired.valid_till = NOW - 1;
        assert!(service.issue(&mut expired, NOW).is_err());

        let mut archived = multipass();
        archived.archive_mark = keygate_types::ArchiveMark::new(NOW, 1);
        assert!(service.issue(&mut archived, NOW).is_err());
    }

    #[test]
    fn test_prolong_requires_prior_issue() {
        let service = MultipassService::new(FakeSigner, "keygate");
        let mut mp = multipass();
        assert!(service.prolong(&mut mp, NOW).is_err());

        service.issue(&mut mp, NOW).unwrap();
        assert!(service.prolong(&mut mp, NOW).is_ok());
    }
}
