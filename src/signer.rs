use ed25519_dalek::{Signer, SigningKey, SECRET_KEY_LENGTH};

pub const KEYPAIR_LENGTH: usize = 64;

/// Detached signature over the fixed message plus the wallet's public
/// identifier, both base58 encoded.
#[derive(Clone, Debug)]
pub struct SignedAttestation {
    pub signature: String,
    pub public_key: String,
}

/// Decodes a base58 private key into an ed25519 keypair. Accepts the 64-byte
/// keypair form (secret || public) as well as a bare 32-byte seed.
pub fn derive_keypair(encoded: &str) -> eyre::Result<SigningKey> {
    let bytes = bs58::decode(encoded.trim())
        .into_vec()
        .map_err(|e| eyre::eyre!("invalid base58 private key: {e}"))?;

    match bytes.len() {
        KEYPAIR_LENGTH => {
            let keypair: [u8; KEYPAIR_LENGTH] = bytes
                .try_into()
                .expect("length checked above");
            SigningKey::from_keypair_bytes(&keypair)
                .map_err(|e| eyre::eyre!("keypair bytes are inconsistent: {e}"))
        }
        SECRET_KEY_LENGTH => {
            let seed: [u8; SECRET_KEY_LENGTH] = bytes
                .try_into()
                .expect("length checked above");
            Ok(SigningKey::from_bytes(&seed))
        }
        other => eyre::bail!("private key must decode to 32 or 64 bytes, got {other}"),
    }
}

pub fn public_key(keypair: &SigningKey) -> String {
    bs58::encode(keypair.verifying_key().to_bytes()).into_string()
}

/// Deterministic detached ed25519 signature over the UTF-8 bytes of `message`.
pub fn sign_message(keypair: &SigningKey, message: &str) -> eyre::Result<SignedAttestation> {
    let signature = keypair
        .try_sign(message.as_bytes())
        .map_err(|e| eyre::eyre!("signing failed: {e}"))?;

    Ok(SignedAttestation {
        signature: bs58::encode(signature.to_bytes()).into_string(),
        public_key: public_key(keypair),
    })
}
