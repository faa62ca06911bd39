use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use thiserror::Error;

pub const URI_ROOT_PATH: &str = ".well-known/acme-challenge";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ChallengeError {
    #[error("account key is not a JSON object")]
    NotAnObject,
    #[error("unsupported account key type: {0}")]
    UnsupportedKeyType(String),
    #[error("account key is missing the '{0}' member")]
    MissingMember(&'static str),
}

/// Challenge types this plugin can fulfil.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeType {
    Http01,
}

impl ChallengeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeType::Http01 => "http-01",
        }
    }
}

/// Public half of the ACME account key, reduced to its JWK thumbprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountKey {
    thumbprint: String,
}

impl AccountKey {
    pub fn from_jwk(jwk: Value) -> Result<Self, ChallengeError> {
        Ok(Self {
            thumbprint: jwk_thumbprint(&jwk)?,
        })
    }

    /// RFC 7638 SHA-256 thumbprint, base64url without padding.
    pub fn thumbprint(&self) -> &str {
        &self.thumbprint
    }
}

fn jwk_thumbprint(jwk: &Value) -> Result<String, ChallengeError> {
    let object = jwk.as_object().ok_or(ChallengeError::NotAnObject)?;
    let kty = object
        .get("kty")
        .and_then(Value::as_str)
        .ok_or(ChallengeError::MissingMember("kty"))?;

    // Required members, already in lexicographic order.
    let members: &[&'static str] = match kty {
        "RSA" => &["e", "kty", "n"],
        "EC" => &["crv", "kty", "x", "y"],
        "OKP" => &["crv", "kty", "x"],
        other => return Err(ChallengeError::UnsupportedKeyType(other.to_string())),
    };

    let mut canonical = Map::new();
    for &member in members {
        let value = object
            .get(member)
            .and_then(Value::as_str)
            .ok_or(ChallengeError::MissingMember(member))?;
        canonical.insert(member.to_string(), Value::String(value.to_string()));
    }

    let serialized = Value::Object(canonical).to_string();
    let digest = Sha256::digest(serialized.as_bytes());
    Ok(URL_SAFE_NO_PAD.encode(digest))
}

/// An HTTP-01 challenge as issued by the ACME server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Http01Challenge {
    token: String,
}

impl Http01Challenge {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Resource path the validator fetches, e.g.
    /// `/.well-known/acme-challenge/<token>`.
    pub fn path(&self) -> String {
        format!("/{URI_ROOT_PATH}/{}", self.token)
    }

    pub fn uri(&self, domain: &str, port: u16) -> String {
        let host = idna::domain_to_ascii(domain).unwrap_or_else(|_| domain.to_string());
        if port == 80 {
            format!("http://{host}{}", self.path())
        } else {
            format!("http://{host}:{port}{}", self.path())
        }
    }

    pub fn key_authorization(&self, account_key: &AccountKey) -> String {
        format!("{}.{}", self.token, account_key.thumbprint())
    }

    pub fn response(&self, account_key: &AccountKey) -> Http01Response {
        Http01Response {
            key_authorization: self.key_authorization(account_key),
        }
    }
}

/// Answer to an HTTP-01 challenge; the same text must be served at the
/// challenge path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Http01Response {
    key_authorization: String,
}

impl Http01Response {
    pub fn key_authorization(&self) -> &str {
        &self.key_authorization
    }

    /// True when this response was built for `challenge` with `account_key`.
    pub fn verify_key_authorization(
        &self,
        challenge: &Http01Challenge,
        account_key: &AccountKey,
    ) -> bool {
        match self.key_authorization.split_once('.') {
            Some((token, thumbprint)) => {
                token == challenge.token() && thumbprint == account_key.thumbprint()
            }
            None => false,
        }
    }
}

/// One pending domain validation: the challenge plus the domain it is for
/// and the account that must answer it.
#[derive(Debug, Clone)]
pub struct AnnotatedChallenge {
    pub domain: String,
    pub challenge: Http01Challenge,
    pub account_key: AccountKey,
}

impl AnnotatedChallenge {
    pub fn new(
        domain: impl Into<String>,
        challenge: Http01Challenge,
        account_key: AccountKey,
    ) -> Self {
        Self {
            domain: domain.into(),
            challenge,
            account_key,
        }
    }

    pub fn path(&self) -> String {
        self.challenge.path()
    }

    /// The response to report and the exact bytes to publish.
    pub fn response_and_validation(&self) -> (Http01Response, Vec<u8>) {
        let response = self.challenge.response(&self.account_key);
        let validation = response.key_authorization().as_bytes().to_vec();
        (response, validation)
    }
}
