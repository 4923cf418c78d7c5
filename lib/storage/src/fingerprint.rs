use sha2::{Digest, Sha256};

/// SHA-256 over the embedder identity and every (id, text) pair, in order.
///
/// Fields are length-prefixed so that moving bytes between adjacent texts
/// changes the digest.
pub fn corpus_fingerprint(model_id: &str, dimension: usize, hack_ids: &[String], texts: &[String]) -> String {
    let mut hasher = Sha256::new();
    update_field(&mut hasher, model_id.as_bytes());
    hasher.update((dimension as u64).to_le_bytes());
    hasher.update((texts.len() as u64).to_le_bytes());
    for (id, text) in hack_ids.iter().zip(texts) {
        update_field(&mut hasher, id.as_bytes());
        update_field(&mut hasher, text.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

fn update_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_stable() {
        let ids = strings(&["a", "b"]);
        let texts = strings(&["red sedan", "blue truck"]);
        assert_eq!(
            corpus_fingerprint("m", 8, &ids, &texts),
            corpus_fingerprint("m", 8, &ids, &texts)
        );
    }

    #[test]
    fn test_sensitive_to_inputs() {
        let ids = strings(&["a", "b"]);
        let texts = strings(&["red sedan", "blue truck"]);
        let base = corpus_fingerprint("m", 8, &ids, &texts);

        assert_ne!(base, corpus_fingerprint("other", 8, &ids, &texts));
        assert_ne!(base, corpus_fingerprint("m", 16, &ids, &texts));
        assert_ne!(base, corpus_fingerprint("m", 8, &ids, &strings(&["red sedan", "blue trucks"])));
        assert_ne!(base, corpus_fingerprint("m", 8, &ids, &strings(&["red sedanb", "lue truck"])));
        assert_ne!(base, corpus_fingerprint("m", 8, &strings(&["b", "a"]), &texts));
    }

    #[test]
    fn test_hex_digest() {
        let fp = corpus_fingerprint("m", 8, &[], &[]);
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
