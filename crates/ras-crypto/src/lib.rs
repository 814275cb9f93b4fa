//! AES/RSA/HMAC primitives and the TCG KDFa key derivation function.
//! Pure functions, no shared state.

pub mod asymmetric;
pub mod kdfa;
pub mod pkcs7;
pub mod random;
pub mod symmetric;

pub use asymmetric::{asymmetric_decrypt, asymmetric_encrypt, AsymAlg, AsymMode, IDENTITY_LABEL};
pub use kdfa::kdfa;
pub use random::get_random_bytes;
pub use symmetric::{symmetric_decrypt, symmetric_encrypt, SymAlg, SymMode};
