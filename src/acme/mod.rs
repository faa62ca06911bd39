mod challenge;
mod verify;

pub use challenge::{
    AccountKey, AnnotatedChallenge, ChallengeError, ChallengeType, Http01Challenge,
    Http01Response, URI_ROOT_PATH,
};
pub use verify::{HttpSelfVerifier, SelfVerifier};
