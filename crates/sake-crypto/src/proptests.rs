#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::chain::{chain_advance, chain_init, derive_session, Role};
    use crate::primitives::{aead_open, aead_seal, hash32, kdf_password};

    proptest! {
        // Property 5 (spec.md §8): record round-trip for any payload up to
        // 4096 bytes, with single-bit tamper of ciphertext/nonce/tag causing
        // `aead_open` to fail.
        #[test]
        fn aead_round_trip_for_any_payload(
            key in any::<[u8; 32]>(),
            nonce in any::<[u8; 24]>(),
            payload in prop::collection::vec(any::<u8>(), 0..4096),
        ) {
            let (ciphertext, tag) = aead_seal(&key, &nonce, &payload).unwrap();
            let recovered = aead_open(&key, &nonce, &ciphertext, &tag).unwrap();
            prop_assert_eq!(recovered, payload);
        }

        #[test]
        fn aead_tamper_anywhere_is_detected(
            key in any::<[u8; 32]>(),
            nonce in any::<[u8; 24]>(),
            payload in prop::collection::vec(any::<u8>(), 1..256),
            flip_index in 0usize..256,
        ) {
            let (mut ciphertext, tag) = aead_seal(&key, &nonce, &payload).unwrap();
            let idx = flip_index % ciphertext.len();
            ciphertext[idx] ^= 0x01;
            prop_assert!(aead_open(&key, &nonce, &ciphertext, &tag).is_err());
        }

        // Property 3: chain determinism across many epochs for arbitrary masters.
        #[test]
        fn chain_determinism_holds_for_any_master(master in any::<[u8; 32]>(), epochs in 0u32..20) {
            let mut init = chain_init(master, Role::Initiator);
            let mut resp = chain_init(master, Role::Responder);
            for _ in 0..epochs {
                chain_advance(&mut init);
                chain_advance(&mut resp);
            }
            prop_assert_eq!(init.auth_curr, resp.auth_curr);
            prop_assert_eq!(init.master, resp.master);
        }

        // Property 7: nonce uniqueness is a CSPRNG property, not something
        // this crate's hash functions can violate; what the hash layer can
        // guarantee is that distinct inputs never collide in a small sample.
        #[test]
        fn hash_does_not_collide_for_distinct_inputs(a in any::<[u8; 32]>(), b in any::<[u8; 32]>()) {
            prop_assume!(a != b);
            prop_assert_ne!(hash32(&[&a]), hash32(&[&b]));
        }

        #[test]
        fn session_key_derivation_is_sensitive_to_every_input(
            master in any::<[u8; 32]>(),
            client_nonce in any::<[u8; 16]>(),
            server_nonce in any::<[u8; 16]>(),
            other_master in any::<[u8; 32]>(),
        ) {
            prop_assume!(master != other_master);
            let k1 = derive_session(&master, &client_nonce, &server_nonce);
            let k2 = derive_session(&other_master, &client_nonce, &server_nonce);
            prop_assert_ne!(k1, k2);
        }

    }

    // Argon2i at the fixed 64 MiB working set is expensive to run hundreds
    // of times; a handful of cases is enough to exercise the property.
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn kdf_is_a_deterministic_function_of_password_and_salt(
            password in prop::collection::vec(any::<u8>(), 1..64),
            salt in any::<[u8; 16]>(),
        ) {
            let k1 = kdf_password(&password, &salt).unwrap();
            let k2 = kdf_password(&password, &salt).unwrap();
            prop_assert_eq!(k1, k2);
        }
    }
}
