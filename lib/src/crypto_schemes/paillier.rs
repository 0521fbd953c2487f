use std::fmt;
use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_prime::RandPrime;
use num_traits::{One, Zero};
use rand::rngs::ThreadRng;
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};
use super::bigint::{is_unit, l_function};
use super::error::CryptoError;

// Below this the primes are too small for the modulus to hold a tally.
const MIN_KEY_BITS: usize = 32;
// Units are dense in a Paillier modulus; running out of draws means the modulus is not one.
const MAX_GROUP_DRAWS: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    #[serde(with = "crate::serialize::big_uint")]
    pub n: BigUint,
    #[serde(with = "crate::serialize::big_uint")]
    pub g: BigUint,
}

/// Decryption key. `lambda = lcm(p - 1, q - 1)`, `mu = L(g^lambda mod n^2)^-1 mod n`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateKey {
    #[serde(with = "crate::serialize::big_uint")]
    pub lambda: BigUint,
    #[serde(with = "crate::serialize::big_uint")]
    pub mu: BigUint,
    pub public_key: PublicKey,
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("lambda", &"<redacted>")
            .field("mu", &"<redacted>")
            .field("public_key", &self.public_key)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct KeyPair {
    pub public_key: PublicKey,
    pub private_key: PrivateKey,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ciphertext(#[serde(with = "crate::serialize::big_uint")] pub BigUint);

impl Ciphertext {
    pub fn value(&self) -> &BigUint {
        &self.0
    }
}

impl From<BigUint> for Ciphertext {
    fn from(value: BigUint) -> Self {
        Ciphertext(value)
    }
}

impl fmt::Display for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PublicKey {
    pub fn n_squared(&self) -> BigUint {
        self.n.pow(2)
    }

    /// `n > 1` and `g` is a unit modulo `n^2`.
    pub fn is_well_formed(&self) -> bool {
        self.n > BigUint::one() && is_unit(&self.g, &self.n_squared())
    }

    /// A well formed ciphertext under this key is a unit modulo n^2.
    pub fn is_valid_ciphertext(&self, ciphertext: &Ciphertext) -> bool {
        is_unit(ciphertext.value(), &self.n_squared())
    }

    /// An encryption of zero that carries no randomness, the identity of [`PaillierCipher::add`].
    pub fn encrypted_zero(&self) -> Ciphertext {
        Ciphertext(BigUint::one())
    }
}

impl PrivateKey {
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// `lambda` is nonzero and `mu` inverts `L(g^lambda mod n^2)` modulo `n`.
    pub fn is_consistent(&self) -> bool {
        let pk = &self.public_key;
        if !pk.is_well_formed() || self.lambda.is_zero() {
            return false;
        }
        let u = pk.g.modpow(&self.lambda, &pk.n_squared());
        l_function(&u, &pk.n).map_or(false, |l| (l * &self.mu % &pk.n).is_one())
    }
}

/// Additively homomorphic Paillier scheme.
///
/// `decrypt(add(encrypt(a), encrypt(b))) == a + b (mod n)`.
pub struct PaillierCipher<R = ThreadRng> {
    rng: R,
}

impl PaillierCipher<ThreadRng> {
    pub fn new() -> Self {
        PaillierCipher { rng: thread_rng() }
    }

    pub fn add(public_key: &PublicKey, a: &Ciphertext, b: &Ciphertext) -> Ciphertext {
        Ciphertext((a.value() * b.value()) % public_key.n_squared())
    }

    pub fn decrypt(private_key: &PrivateKey, ciphertext: &Ciphertext) -> Result<BigUint, CryptoError> {
        let pk = private_key.public_key();
        if !pk.is_valid_ciphertext(ciphertext) {
            return Err(CryptoError::DecryptionError);
        }
        let u = ciphertext.value().modpow(&private_key.lambda, &pk.n_squared());
        let l = l_function(&u, &pk.n).ok_or(CryptoError::DecryptionError)?;
        Ok(l * &private_key.mu % &pk.n)
    }
}

impl Default for PaillierCipher<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> PaillierCipher<R> {
    pub fn from_rng(rng: R) -> Self {
        PaillierCipher { rng }
    }

    /// Generates a key pair whose modulus is roughly `key_bits` long, with `g = n + 1`.
    pub fn generate(&mut self, key_bits: usize) -> KeyPair {
        let prime_bits = key_bits.max(MIN_KEY_BITS) / 2;
        let one = BigUint::one();
        loop {
            let p: BigUint = self.rng.gen_prime(prime_bits, None);
            let q: BigUint = self.rng.gen_prime(prime_bits, None);
            if p == q {
                continue;
            }
            let n = &p * &q;
            let phi = (&p - &one) * (&q - &one);
            if !n.gcd(&phi).is_one() {
                continue;
            }
            let lambda = (&p - &one).lcm(&(&q - &one));
            let Some(mu) = lambda.modinv(&n) else { continue };
            let g = &n + &one;

            let public_key = PublicKey { n, g };
            let private_key = PrivateKey { lambda, mu, public_key: public_key.clone() };
            return KeyPair { public_key, private_key };
        }
    }

    pub fn encrypt(&mut self, public_key: &PublicKey, message: &BigUint) -> Result<Ciphertext, CryptoError> {
        if !public_key.is_well_formed() {
            return Err(CryptoError::InvalidKey);
        }
        if message >= &public_key.n {
            return Err(CryptoError::InvalidPlaintext);
        }
        let modulo = public_key.n_squared();
        let r = Self::get_element_of_group(&mut self.rng, &public_key.n)?;
        let c = (public_key.g.modpow(message, &modulo) * r.modpow(&public_key.n, &modulo)) % &modulo;
        Ok(Ciphertext(c))
    }

    /// Random unit in `[1, modulo)`.
    pub fn get_element_of_group(rng: &mut R, modulo: &BigUint) -> Result<BigUint, CryptoError> {
        if modulo <= &BigUint::one() {
            return Err(CryptoError::InvalidKey);
        }
        for _ in 0..MAX_GROUP_DRAWS {
            let x = rng.gen_biguint_range(&BigUint::one(), modulo);
            if x.gcd(modulo).is_one() {
                return Ok(x);
            }
        }
        Err(CryptoError::InvalidKey)
    }

    /// Accepts `private_key` only if it is consistent and recovers a fresh
    /// random plaintext encrypted under its own public key.
    pub fn check_private_key(&mut self, private_key: &PrivateKey) -> Result<(), CryptoError> {
        if !private_key.is_consistent() {
            return Err(CryptoError::InvalidKey);
        }
        let public_key = private_key.public_key();
        let message = self.rng.gen_biguint_below(&public_key.n);
        let c = self.encrypt(public_key, &message)?;
        match PaillierCipher::decrypt(private_key, &c) {
            Ok(decrypted) if decrypted == message => Ok(()),
            _ => Err(CryptoError::InvalidKey),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_pair() -> KeyPair {
        PaillierCipher::new().generate(256)
    }

    #[test]
    fn decrypt_inverts_encrypt() {
        let keys = key_pair();
        let mut cipher = PaillierCipher::new();
        for p in [0u64, 1, 2, 97, 65_535, u64::MAX] {
            let message = BigUint::from(p);
            let c = cipher.encrypt(&keys.public_key, &message).unwrap();
            assert_eq!(PaillierCipher::decrypt(&keys.private_key, &c).unwrap(), message);
        }
        let largest = &keys.public_key.n - BigUint::one();
        let c = cipher.encrypt(&keys.public_key, &largest).unwrap();
        assert_eq!(PaillierCipher::decrypt(&keys.private_key, &c).unwrap(), largest);
    }

    #[test]
    fn add_is_homomorphic() {
        let keys = key_pair();
        let mut cipher = PaillierCipher::new();
        let a = cipher.encrypt(&keys.public_key, &BigUint::from(1234u32)).unwrap();
        let b = cipher.encrypt(&keys.public_key, &BigUint::from(4321u32)).unwrap();
        let sum = PaillierCipher::add(&keys.public_key, &a, &b);
        assert_eq!(PaillierCipher::decrypt(&keys.private_key, &sum).unwrap(), BigUint::from(5555u32));

        let zero = keys.public_key.encrypted_zero();
        let same = PaillierCipher::add(&keys.public_key, &zero, &a);
        assert_eq!(PaillierCipher::decrypt(&keys.private_key, &same).unwrap(), BigUint::from(1234u32));
    }

    #[test]
    fn encryption_is_probabilistic() {
        let keys = key_pair();
        let mut cipher = PaillierCipher::new();
        let one = BigUint::one();
        let a = cipher.encrypt(&keys.public_key, &one).unwrap();
        let b = cipher.encrypt(&keys.public_key, &one).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn plaintext_must_be_below_modulus() {
        let keys = key_pair();
        let mut cipher = PaillierCipher::new();
        let n = keys.public_key.n.clone();
        assert_eq!(cipher.encrypt(&keys.public_key, &n), Err(CryptoError::InvalidPlaintext));
    }

    #[test]
    fn foreign_ciphertext_fails_to_decrypt() {
        let keys = key_pair();
        let other = key_pair();
        let mut cipher = PaillierCipher::new();
        let c = cipher.encrypt(&other.public_key, &BigUint::from(7u8)).unwrap();
        // Outside the group of the first key, or failing its L(u) divisibility check.
        assert_eq!(PaillierCipher::decrypt(&keys.private_key, &c), Err(CryptoError::DecryptionError));

        let zero = Ciphertext(BigUint::zero());
        assert_eq!(PaillierCipher::decrypt(&keys.private_key, &zero), Err(CryptoError::DecryptionError));
        let too_big = Ciphertext(keys.public_key.n_squared());
        assert_eq!(PaillierCipher::decrypt(&keys.private_key, &too_big), Err(CryptoError::DecryptionError));
    }

    #[test]
    fn degenerate_public_keys_are_refused() {
        let keys = key_pair();
        assert!(keys.public_key.is_well_formed());
        let tiny = PublicKey { n: BigUint::one(), g: BigUint::from(2u8) };
        let no_unit_g = PublicKey { n: keys.public_key.n.clone(), g: keys.public_key.n.clone() };
        let zero_g = PublicKey { n: keys.public_key.n.clone(), g: BigUint::zero() };
        let mut cipher = PaillierCipher::new();
        for key in [&tiny, &no_unit_g, &zero_g] {
            assert!(!key.is_well_formed());
            assert_eq!(cipher.encrypt(key, &BigUint::zero()), Err(CryptoError::InvalidKey));
        }
        let mut rng = thread_rng();
        assert_eq!(
            PaillierCipher::get_element_of_group(&mut rng, &BigUint::one()),
            Err(CryptoError::InvalidKey)
        );
        assert_eq!(PaillierCipher::get_element_of_group(&mut rng, &BigUint::from(2u8)), Ok(BigUint::one()));
    }

    #[test]
    fn tampered_private_keys_are_refused() {
        let keys = key_pair();
        let mut cipher = PaillierCipher::new();
        assert!(keys.private_key.is_consistent());
        assert_eq!(cipher.check_private_key(&keys.private_key), Ok(()));

        let mut zero_lambda = keys.private_key.clone();
        zero_lambda.lambda = BigUint::zero();
        zero_lambda.mu = BigUint::one();
        let mut shifted_mu = keys.private_key.clone();
        shifted_mu.mu += 1u8;
        for key in [&zero_lambda, &shifted_mu] {
            assert!(!key.is_consistent());
            assert_eq!(cipher.check_private_key(key), Err(CryptoError::InvalidKey));
        }

        // Passes the g check, but r^(n * lambda) is not 1 for a random r.
        let unit_lambda = PrivateKey {
            lambda: BigUint::one(),
            mu: BigUint::one(),
            public_key: keys.public_key.clone(),
        };
        assert!(unit_lambda.is_consistent());
        assert_eq!(cipher.check_private_key(&unit_lambda), Err(CryptoError::InvalidKey));
    }

    #[test]
    fn keys_serialize_with_decimal_components() {
        let keys = key_pair();
        let json = serde_json::to_value(&keys.private_key).unwrap();
        assert_eq!(json["publicKey"]["n"], serde_json::Value::String(keys.public_key.n.to_str_radix(10)));
        assert!(json["lambda"].is_string());
        let back: PrivateKey = serde_json::from_value(json).unwrap();
        assert_eq!(back, keys.private_key);
        assert!(!format!("{:?}", back).contains(&back.lambda.to_str_radix(10)));
    }
}
