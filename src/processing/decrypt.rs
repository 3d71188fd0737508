//! Decryption processor
//!
//! The crate carries no cryptography of its own. Values are expected to be base64 encoded
//! ciphertext, and the actual decryption is delegated to a caller-supplied [`Decryptor`].

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::sync::Arc;

use super::Processor;
use crate::contract::InvocationContext;
use crate::error::{BoxError, ExternalizedPropertiesError, Result};

/// Decrypts raw ciphertext bytes
pub trait Decryptor: Send + Sync {
    /// Decrypt `ciphertext`, returning the plaintext bytes
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>>;
}

impl<F> Decryptor for F
where
    F: Fn(&[u8]) -> Result<Vec<u8>> + Send + Sync,
{
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self(ciphertext)
    }
}

/// Base64-decodes a value and decrypts it to a UTF-8 string
#[derive(Clone)]
pub struct DecryptProcessor {
    name: String,
    decryptor: Arc<dyn Decryptor>,
}

impl DecryptProcessor {
    /// Default processor name
    pub const NAME: &'static str = "decrypt";

    /// Create a processor registered under [`Self::NAME`]
    pub fn new(decryptor: Arc<dyn Decryptor>) -> Self {
        Self::named(Self::NAME, decryptor)
    }

    /// Create a processor with a custom name, allowing several keys side by side
    pub fn named(name: impl Into<String>, decryptor: Arc<dyn Decryptor>) -> Self {
        Self {
            name: name.into(),
            decryptor,
        }
    }

    fn fail(
        &self,
        ctx: &InvocationContext,
        message: &str,
        source: impl Into<BoxError>,
    ) -> ExternalizedPropertiesError {
        ExternalizedPropertiesError::processing_with_source(
            self.name.clone(),
            ctx.operation().signature(),
            message,
            source,
        )
    }
}

impl Processor for DecryptProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&self, ctx: &InvocationContext, value: &str) -> Result<String> {
        let ciphertext = STANDARD
            .decode(value)
            .map_err(|e| self.fail(ctx, "Encrypted value is not valid base64", e))?;
        let plaintext = self
            .decryptor
            .decrypt(&ciphertext)
            .map_err(|e| self.fail(ctx, "Decryption failed", e))?;
        String::from_utf8(plaintext)
            .map_err(|e| self.fail(ctx, "Decrypted value is not valid UTF-8", e))
    }
}

impl std::fmt::Debug for DecryptProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecryptProcessor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::OperationDescriptor;
    use crate::error::ErrorKind;

    // XOR with a fixed byte, enough to exercise the delegation
    fn xor_decryptor() -> Arc<dyn Decryptor> {
        Arc::new(|bytes: &[u8]| -> Result<Vec<u8>> { Ok(bytes.iter().map(|b| b ^ 0x2a).collect()) })
    }

    fn encrypt(plain: &str) -> String {
        STANDARD.encode(plain.bytes().map(|b| b ^ 0x2a).collect::<Vec<_>>())
    }

    fn ctx() -> InvocationContext {
        InvocationContext::new(Arc::new(OperationDescriptor::builder("password").build()))
    }

    #[test]
    fn test_decrypts_through_decryptor() {
        let processor = DecryptProcessor::new(xor_decryptor());
        assert_eq!(processor.process(&ctx(), &encrypt("s3cret")).unwrap(), "s3cret");
    }

    #[test]
    fn test_decryptor_failure_is_processing_error() {
        let failing: Arc<dyn Decryptor> = Arc::new(|_: &[u8]| -> Result<Vec<u8>> {
            Err(ExternalizedPropertiesError::configuration("unknown key id"))
        });
        let processor = DecryptProcessor::named("vault", failing);
        let err = processor.process(&ctx(), &encrypt("x")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Processing);
        assert!(err.to_string().contains("'vault'"));
        assert!(err.to_string().contains("password() -> String"));
    }

    #[test]
    fn test_rejects_non_base64() {
        let processor = DecryptProcessor::new(xor_decryptor());
        assert!(processor.process(&ctx(), "%%%").is_err());
    }
}
