// Signing & recovery benchmarks for sigmint vouchers.
//
// Covers secp256k1 key generation, domain separator computation, struct
// hashing, voucher signing and signer recovery, and issuing batches of
// vouchers through a memoized domain.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use sigmint_protocol::config::CHAIN_ID_DEVNET;
use sigmint_protocol::crypto::SignerKeypair;
use sigmint_protocol::domain::SigningDomain;
use sigmint_protocol::types::{Address, Uid};
use sigmint_protocol::voucher::{
    next_uid, recover_signer, sign_voucher, struct_hash, MintRequest, VoucherDraft, VoucherIssuer,
    VoucherKind, VoucherTarget, VoucherTerms,
};

fn contract() -> Address {
    Address::new([0xC0; 20])
}

fn sample_request() -> MintRequest {
    VoucherDraft {
        to: Address::new([0x01; 20]),
        quantity: 1,
        currency: Address::new([0x02; 20]),
        validity_start: 0,
        validity_end: u64::MAX,
        uid: Uid::from_u128(0x1234567890abcdef),
        ..Default::default()
    }
    .with_terms(VoucherTerms::PerUnit {
        uri: "ipfs://bench".into(),
        price_per_token: 1_000_000_000_000_000_000,
    })
}

fn bench_keypair_generation(c: &mut Criterion) {
    c.bench_function("secp256k1/keypair_generate", |b| {
        b.iter(SignerKeypair::generate);
    });
}

fn bench_domain_separator(c: &mut Criterion) {
    c.bench_function("voucher/domain_separator", |b| {
        b.iter(|| SigningDomain::for_kind(VoucherKind::PerUnit, CHAIN_ID_DEVNET, contract()));
    });
}

fn bench_struct_hash(c: &mut Criterion) {
    let request = sample_request();
    c.bench_function("voucher/struct_hash", |b| {
        b.iter(|| struct_hash(&request));
    });
}

fn bench_sign_voucher(c: &mut Criterion) {
    let keypair = SignerKeypair::generate();
    let domain = SigningDomain::for_kind(VoucherKind::PerUnit, CHAIN_ID_DEVNET, contract());
    let request = sample_request();

    c.bench_function("voucher/sign", |b| {
        b.iter(|| sign_voucher(&domain, &request, &keypair).unwrap());
    });
}

fn bench_recover_signer(c: &mut Criterion) {
    let keypair = SignerKeypair::generate();
    let domain = SigningDomain::for_kind(VoucherKind::PerUnit, CHAIN_ID_DEVNET, contract());
    let request = sample_request();
    let signature = sign_voucher(&domain, &request, &keypair).unwrap();

    c.bench_function("voucher/recover_signer", |b| {
        b.iter(|| recover_signer(&domain, &request, &signature).unwrap());
    });
}

fn bench_issue_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("voucher/issue_batch");
    let target = VoucherTarget {
        chain_id: CHAIN_ID_DEVNET,
        verifying_contract: contract(),
    };
    let base = Uid::from_u128(0x1234567890abcdef);

    for size in [10u64, 50, 100] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut issuer =
                    VoucherIssuer::for_kind(SignerKeypair::generate(), VoucherKind::Flat);
                for n in 0..size {
                    let draft = VoucherDraft {
                        to: Address::new([0x01; 20]),
                        quantity: 1,
                        validity_end: u64::MAX,
                        uid: next_uid(&base, n),
                        ..Default::default()
                    };
                    issuer.create_flat_request(target, draft, 0).unwrap();
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_keypair_generation,
    bench_domain_separator,
    bench_struct_hash,
    bench_sign_voucher,
    bench_recover_signer,
    bench_issue_batch,
);
criterion_main!(benches);
