//! Property-based tests for chain assembly, temporal validity, and the
//! extension-satisfaction helpers that [`x509_validate::chain::validator`]
//! leans on.

use chrono::{DateTime, Duration, Utc};
use proptest::prelude::*;

use x509_validate::cert::certificate::{PublicKey, SignatureAlgorithm};
use x509_validate::cert::extensions::{
    CertificatePolicies, ExtendedKeyUsage, ExtendedKeyUsagePurpose, KeyUsage, KeyUsageBit,
    SubjectAltName, ANY_POLICY_OID,
};
use x509_validate::chain::builder::{build_with_max_length, ChainError};
use x509_validate::name::DistinguishedName;
use x509_validate::Certificate;

fn arb_common_name() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9-]{2,20}").unwrap()
}

fn make_cert(subject: &str, issuer: &str, serial: u8, not_before: DateTime<Utc>, not_after: DateTime<Utc>) -> Certificate {
    Certificate {
        serial: vec![serial],
        issuer_dn: DistinguishedName::new(format!("CN={issuer}")),
        subject_dn: DistinguishedName::new(format!("CN={subject}")),
        subject_dn_der: subject.as_bytes().to_vec(),
        not_before,
        not_after,
        public_key: PublicKey {
            algorithm: SignatureAlgorithm::EcdsaSha256,
            key_bytes: vec![serial],
            spki_der: vec![serial, serial],
        },
        tbs_bytes: vec![],
        signature_bytes: vec![],
        signature_algorithm: SignatureAlgorithm::EcdsaSha256,
        extensions: Default::default(),
        der: vec![],
    }
}

prop_compose! {
    fn arb_validity()(before_days in 0i64..365, after_days in 1i64..730) -> (DateTime<Utc>, DateTime<Utc>) {
        let now = Utc::now();
        (now - Duration::days(before_days), now + Duration::days(after_days))
    }
}

prop_compose! {
    fn arb_chain_names(len in 1usize..6)(len in Just(len), names in prop::collection::vec(arb_common_name(), len)) -> Vec<String> {
        names
    }
}

proptest! {
    /// P1: a straight-line chain of N distinct issuers, each one issuing the
    /// next, terminating at a self-signed anchor, always assembles to
    /// exactly N+1 certificates (N subordinates plus the anchor) regardless
    /// of the identifiers chosen, as long as all names are distinct.
    #[test]
    fn chain_builder_assembles_every_link_in_a_straight_line(names in arb_chain_names()) {
        let mut names = names;
        names.dedup();
        prop_assume!(names.len() >= 1);

        let now = Utc::now();
        let not_before = now - Duration::days(1);
        let not_after = now + Duration::days(3650);

        // names[0] is the leaf, names[last] is the root (self-signed).
        let root_name = names.last().unwrap().clone();
        let mut certs = Vec::new();
        for i in 0..names.len() {
            let subject = names[i].clone();
            let issuer = if i + 1 < names.len() { names[i + 1].clone() } else { subject.clone() };
            certs.push(make_cert(&subject, &issuer, i as u8 + 1, not_before, not_after));
        }

        let leaf = certs[0].clone();
        let intermediates = certs[1..].to_vec();
        let root = certs.last().unwrap().clone();

        let chain = build_with_max_length(&leaf, &intermediates, &[root], 20).unwrap();
        prop_assert_eq!(chain.len(), names.len());
        prop_assert_eq!(chain.leaf().subject_dn.as_str(), format!("CN={}", names[0]));
        prop_assert_eq!(chain.terminal().subject_dn.as_str(), format!("CN={root_name}"));
    }

    /// P2: `is_valid_at` agrees exactly with the not_before/not_after bounds
    /// for any validity window and any evaluation instant.
    #[test]
    fn is_valid_at_matches_its_bounds((not_before, not_after) in arb_validity(), offset_days in -800i64..800) {
        let cert = make_cert("leaf", "ca", 1, not_before, not_after);
        let at = not_before + Duration::days(offset_days);
        let expected = at >= not_before && at <= not_after;
        prop_assert_eq!(cert.is_valid_at(at), expected);
    }

    /// P3: a two-hop cycle (A issued by B, B issued by A, neither an
    /// anchor) never assembles, no matter what names are chosen, because
    /// the builder refuses to revisit an identity already in the chain.
    #[test]
    fn issuer_cycles_never_assemble(a in arb_common_name(), b in arb_common_name()) {
        prop_assume!(a != b);
        let now = Utc::now();
        let not_before = now - Duration::days(1);
        let not_after = now + Duration::days(365);

        let leaf = make_cert(&a, &b, 1, not_before, not_after);
        let cycle_cert = make_cert(&b, &a, 2, not_before, not_after);

        let err = build_with_max_length(&leaf, &[cycle_cert], &[], 10).unwrap_err();
        prop_assert!(matches!(err, ChainError::IncompleteChain { .. }));
    }

    /// P4: Key Usage's `satisfies` is monotone in the asserted set — adding
    /// bits to the asserted side can only make `satisfies` more likely to
    /// hold, never less.
    #[test]
    fn key_usage_satisfies_is_monotone_in_asserted_bits(
        extra_has_cert_sign in any::<bool>(),
        extra_has_crl_sign in any::<bool>(),
    ) {
        let required = KeyUsage::from_bits([KeyUsageBit::DigitalSignature]);
        let mut bits = vec![KeyUsageBit::DigitalSignature];
        if extra_has_cert_sign {
            bits.push(KeyUsageBit::KeyCertSign);
        }
        if extra_has_crl_sign {
            bits.push(KeyUsageBit::CrlSign);
        }
        let asserted = KeyUsage::from_bits(bits);
        prop_assert!(asserted.satisfies(&required));

        let superset = {
            let mut wider = asserted.bits().clone();
            wider.insert(KeyUsageBit::NonRepudiation);
            KeyUsage::from_bits(wider)
        };
        prop_assert!(superset.satisfies(&required));
    }

    /// P5: extended key usage satisfaction behaves the same way for an
    /// arbitrary subset of purposes.
    #[test]
    fn extended_key_usage_satisfies_is_monotone(has_client_auth in any::<bool>()) {
        let required = ExtendedKeyUsage::from_purposes([ExtendedKeyUsagePurpose::ServerAuth]);
        let mut purposes = vec![ExtendedKeyUsagePurpose::ServerAuth];
        if has_client_auth {
            purposes.push(ExtendedKeyUsagePurpose::ClientAuth);
        }
        let asserted = ExtendedKeyUsage::from_purposes(purposes);
        prop_assert!(asserted.satisfies(&required));
    }

    /// P6: `anyPolicy` satisfies any arbitrary required OID string.
    #[test]
    fn any_policy_satisfies_arbitrary_required_oid(required in "[0-9]{1,2}(\\.[0-9]{1,3}){2,6}") {
        let policies = CertificatePolicies {
            oids: vec![ANY_POLICY_OID.to_string()],
            critical: false,
        };
        prop_assert!(policies.satisfies(&required));
    }

    /// P7: a single-label wildcard SAN matches exactly the hostnames with
    /// one additional leftmost label and the same suffix, never more.
    #[test]
    fn wildcard_san_matches_exactly_one_label(label in "[a-z]{1,10}", suffix in "[a-z]{1,10}\\.[a-z]{2,5}") {
        let san = SubjectAltName::new(vec![format!("*.{suffix}")]);
        prop_assert!(san.matches_hostname(&format!("{label}.{suffix}")));
        prop_assert!(!san.matches_hostname(&format!("{label}.sub.{suffix}")));
        prop_assert!(!san.matches_hostname(&suffix));
    }
}

#[test]
fn max_depth_boundary_is_exact_not_off_by_one() {
    let now = Utc::now();
    let not_before = now - Duration::days(1);
    let not_after = now + Duration::days(3650);

    let root = make_cert("root", "root", 0xFF, not_before, not_after);
    let mut candidates = Vec::new();
    let mut issuer = "root".to_string();
    for i in 0..8u8 {
        let subject = format!("mid{i}");
        candidates.push(make_cert(&subject, &issuer, i + 1, not_before, not_after));
        issuer = subject;
    }
    let leaf = make_cert("leaf", &issuer, 0xAA, not_before, not_after);

    // 10 total: leaf + 8 intermediates + root.
    let chain = build_with_max_length(&leaf, &candidates, &[root.clone()], 10).unwrap();
    assert_eq!(chain.len(), 10);

    let err = build_with_max_length(&leaf, &candidates, &[root], 9).unwrap_err();
    assert!(matches!(err, ChainError::MaxDepthExceeded { .. }));
}
