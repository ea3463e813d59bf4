//! Benchmarks for pricing and transaction assembly.

use std::collections::HashMap;
use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use solana_sdk::pubkey::Pubkey;
use tokio::runtime::Runtime;

use solana_pos_checkout::app::{CheckoutService, default_catalog, pricing};
use solana_pos_checkout::domain::{CheckoutQuery, CheckoutTransactionRequest};
use solana_pos_checkout::test_utils::{MockLedgerClient, test_config};

fn bench_compute_amount(c: &mut Criterion) {
    let catalog = default_catalog();
    let mut params: HashMap<String, String> = HashMap::new();
    params.insert("box".to_string(), "3".to_string());
    params.insert("cookie".to_string(), "7".to_string());
    let query = CheckoutQuery::from_params(params);

    c.bench_function("compute_amount", |b| {
        b.iter(|| pricing::compute_amount(std::hint::black_box(&catalog), &query))
    });
}

fn bench_assemble_transaction(c: &mut Criterion) {
    let runtime = Runtime::new().unwrap();
    let config = test_config();
    let mock = Arc::new(
        MockLedgerClient::new()
            .with_mint(config.price_mint, 6)
            .with_mint(config.coupon_mint, 0)
            .with_balance(5),
    );
    let service = CheckoutService::new(mock as _, config);

    let mut params: HashMap<String, String> = HashMap::new();
    params.insert("box".to_string(), "1".to_string());
    params.insert("reference".to_string(), Pubkey::new_unique().to_string());
    let query = CheckoutQuery::from_params(params);
    let request = CheckoutTransactionRequest {
        account: Pubkey::new_unique().to_string(),
    };

    c.bench_function("assemble_checkout_transaction", |b| {
        b.to_async(&runtime).iter(|| async {
            service
                .create_checkout_transaction(&query, &request)
                .await
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_compute_amount, bench_assemble_transaction);
criterion_main!(benches);
