use aes::cipher::{inout::InOutBuf, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;
use rsa::{pkcs8::EncodePublicKey, Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use thiserror::Error;

pub type Aes128Cfb8Encryptor = cfb8::Encryptor<aes::Aes128>;
pub type Aes128Cfb8Decryptor = cfb8::Decryptor<aes::Aes128>;

pub const SERVER_KEY_BITS: usize = 1024;
pub const SHARED_SECRET_LENGTH: usize = 16;
pub const VERIFY_TOKEN_LENGTH: usize = 4;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("failed to generate server key pair")]
    KeyGeneration,

    #[error("failed to decrypt key exchange payload")]
    Decrypt,

    #[error("shared secret must be {SHARED_SECRET_LENGTH} bytes, got {0}")]
    InvalidSharedSecret(usize),

    #[error("verify token mismatch")]
    VerifyTokenMismatch,

    #[error("cipher already installed")]
    AlreadyInstalled,
}

/// Long lived RSA key pair used for every encrypted login.
pub struct ServerKeyPair {
    private_key: RsaPrivateKey,
    public_key_der: Vec<u8>,
}

impl ServerKeyPair {
    pub fn generate() -> Result<Self, CryptoError> {
        let mut rng = rand::thread_rng();
        let private_key =
            RsaPrivateKey::new(&mut rng, SERVER_KEY_BITS).map_err(|_| CryptoError::KeyGeneration)?;
        let public_key_der = RsaPublicKey::from(&private_key)
            .to_public_key_der()
            .map_err(|_| CryptoError::KeyGeneration)?
            .as_bytes()
            .to_vec();

        Ok(Self {
            private_key,
            public_key_der,
        })
    }

    /// X.509 SubjectPublicKeyInfo DER, as sent in key requests.
    pub fn public_key_der(&self) -> &[u8] {
        &self.public_key_der
    }

    pub fn public_key(&self) -> RsaPublicKey {
        RsaPublicKey::from(&self.private_key)
    }

    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.private_key
            .decrypt(Pkcs1v15Encrypt, data)
            .map_err(|_| CryptoError::Decrypt)
    }

    /// Decrypts a client's key response, checking the verify token when the
    /// client returned one.
    pub fn decrypt_shared_secret(
        &self,
        encrypted_secret: &[u8],
        encrypted_token: &[u8],
        expected_token: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let shared_secret = self.decrypt(encrypted_secret)?;
        if shared_secret.len() != SHARED_SECRET_LENGTH {
            return Err(CryptoError::InvalidSharedSecret(shared_secret.len()));
        }

        if !encrypted_token.is_empty() && self.decrypt(encrypted_token)? != expected_token {
            return Err(CryptoError::VerifyTokenMismatch);
        }

        Ok(shared_secret)
    }
}

pub fn generate_verify_token() -> [u8; VERIFY_TOKEN_LENGTH] {
    let mut token = [0u8; VERIFY_TOKEN_LENGTH];
    rand::thread_rng().fill_bytes(&mut token);
    token
}

pub fn generate_shared_secret() -> [u8; SHARED_SECRET_LENGTH] {
    let mut secret = [0u8; SHARED_SECRET_LENGTH];
    rand::thread_rng().fill_bytes(&mut secret);
    secret
}

/// The shared secret is both key and IV.
pub fn create_cipher(
    shared_secret: &[u8],
) -> Result<(Aes128Cfb8Encryptor, Aes128Cfb8Decryptor), CryptoError> {
    let encryptor = Aes128Cfb8Encryptor::new_from_slices(shared_secret, shared_secret)
        .map_err(|_| CryptoError::InvalidSharedSecret(shared_secret.len()))?;
    let decryptor = Aes128Cfb8Decryptor::new_from_slices(shared_secret, shared_secret)
        .map_err(|_| CryptoError::InvalidSharedSecret(shared_secret.len()))?;
    Ok((encryptor, decryptor))
}

pub fn encrypt_in_place(cipher: &mut Aes128Cfb8Encryptor, data: &mut [u8]) {
    let (blocks, _) = InOutBuf::from(data).into_chunks();
    cipher.encrypt_blocks_inout_mut(blocks);
}

pub fn decrypt_in_place(cipher: &mut Aes128Cfb8Decryptor, data: &mut [u8]) {
    let (blocks, _) = InOutBuf::from(data).into_chunks();
    cipher.decrypt_blocks_inout_mut(blocks);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::traits::PublicKeyParts;

    #[test]
    fn stream_cipher_is_symmetric_across_chunks() {
        let secret = generate_shared_secret();
        let (mut encryptor, _) = create_cipher(&secret).unwrap();
        let (_, mut decryptor) = create_cipher(&secret).unwrap();

        let plain = b"hello over an encrypted socket".to_vec();
        let mut data = plain.clone();
        encrypt_in_place(&mut encryptor, &mut data[..5]);
        encrypt_in_place(&mut encryptor, &mut data[5..]);
        assert_ne!(data, plain);

        decrypt_in_place(&mut decryptor, &mut data[..11]);
        decrypt_in_place(&mut decryptor, &mut data[11..]);
        assert_eq!(data, plain);
    }

    #[test]
    fn short_secret_is_rejected() {
        assert!(matches!(
            create_cipher(&[0u8; 8]),
            Err(CryptoError::InvalidSharedSecret(8))
        ));
    }

    #[test]
    fn key_exchange_round_trip() {
        let key_pair = ServerKeyPair::generate().unwrap();
        assert_eq!(key_pair.public_key().size(), SERVER_KEY_BITS / 8);

        let token = generate_verify_token();
        let secret = generate_shared_secret();
        let mut rng = rand::thread_rng();
        let public_key = key_pair.public_key();
        let encrypted_secret = public_key
            .encrypt(&mut rng, Pkcs1v15Encrypt, &secret)
            .unwrap();
        let encrypted_token = public_key
            .encrypt(&mut rng, Pkcs1v15Encrypt, &token)
            .unwrap();

        let decrypted = key_pair
            .decrypt_shared_secret(&encrypted_secret, &encrypted_token, &token)
            .unwrap();
        assert_eq!(decrypted, secret);

        let wrong_token = public_key
            .encrypt(&mut rng, Pkcs1v15Encrypt, &[9u8; 4])
            .unwrap();
        assert!(matches!(
            key_pair.decrypt_shared_secret(&encrypted_secret, &wrong_token, &token),
            Err(CryptoError::VerifyTokenMismatch)
        ));
    }
}
