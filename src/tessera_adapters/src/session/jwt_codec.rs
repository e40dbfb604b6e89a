use chrono::{TimeDelta, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode,
    errors::ErrorKind,
};
use secrecy::{ExposeSecret, Secret};
use tessera_core::{
    Identity, IssuedSession, SessionClaims, SessionCodec, SessionError, SessionToken,
};

/// The only algorithm accepted. Tokens declaring anything else are rejected.
pub const SESSION_ALGORITHM: Algorithm = Algorithm::HS256;

/// HS256 session codec. The signing secret is injected at construction.
#[derive(Clone)]
pub struct JwtSessionCodec {
    secret: Secret<String>,
}

impl JwtSessionCodec {
    pub fn new(secret: Secret<String>) -> Self {
        Self { secret }
    }

    fn secret_bytes(&self) -> &[u8] {
        self.secret.expose_secret().as_bytes()
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(SESSION_ALGORITHM);
        // Expiry is checked by hand so the boundary is `now >= exp` with no leeway.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp", "iat"]);
        validation
    }
}

impl SessionCodec for JwtSessionCodec {
    fn issue(&self, identity: &Identity, ttl: TimeDelta) -> Result<IssuedSession, SessionError> {
        let iat = Utc::now().timestamp();
        let exp = iat.checked_add(ttl.num_seconds()).ok_or_else(|| {
            SessionError::UnexpectedError("Session expiry out of range".to_owned())
        })?;

        let claims = SessionClaims {
            sub: identity.id,
            tenant_id: identity.tenant_id,
            email: identity.email.clone(),
            iat,
            exp,
        };

        let token = encode(
            &Header::new(SESSION_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(self.secret_bytes()),
        )
        .map_err(|e| SessionError::UnexpectedError(e.to_string()))?;

        Ok(IssuedSession {
            token: SessionToken::new(token),
            claims,
        })
    }

    fn verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        if token.split('.').count() != 3 {
            return Err(SessionError::Malformed);
        }

        // The header is covered by the MAC, so a header that does not decode
        // to HS256 can only come from a forged or damaged token.
        match decode_header(token) {
            Ok(header) if header.alg == SESSION_ALGORITHM => {}
            _ => return Err(SessionError::InvalidSignature),
        }

        let claims = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret_bytes()),
            &Self::validation(),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm | ErrorKind::Base64(_) => {
                SessionError::InvalidSignature
            }
            ErrorKind::ExpiredSignature => SessionError::Expired,
            _ => SessionError::Malformed,
        })?;

        if claims.is_expired_at(Utc::now()) {
            return Err(SessionError::Expired);
        }

        Ok(claims)
    }
}
