use checkout::{CheckoutCoordinator, CheckoutRequest};
use common::PrincipalId;
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{CartLine, Money, ProductSnapshot};
use store::{InMemoryCatalogStore, InMemoryOrderStore};

fn catalog(stock: u32) -> InMemoryCatalogStore {
    InMemoryCatalogStore::with_products((0..10).map(|i| {
        ProductSnapshot::new(
            format!("SKU-{i:03}"),
            format!("Product {i}"),
            Money::from_cents(100 * (i + 1)),
            stock,
        )
    }))
}

fn request(lines: usize) -> CheckoutRequest {
    CheckoutRequest {
        principal: Some(PrincipalId::new("bench-user")),
        lines: (0..lines)
            .map(|i| CartLine::new(format!("SKU-{i:03}"), 1))
            .collect(),
        delivery_slot_id: Some("slot-bench".to_string()),
    }
}

fn bench_place_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let orders = InMemoryOrderStore::new();
    rt.block_on(orders.register_user("bench-user"));
    let coordinator = CheckoutCoordinator::new(catalog(u32::MAX), orders);

    c.bench_function("checkout/place_order_1_line", |b| {
        b.iter(|| {
            rt.block_on(async {
                coordinator.place_order(request(1)).await.unwrap();
            });
        });
    });

    c.bench_function("checkout/place_order_10_lines", |b| {
        b.iter(|| {
            rt.block_on(async {
                coordinator.place_order(request(10)).await.unwrap();
            });
        });
    });
}

fn bench_rejected_checkout(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let orders = InMemoryOrderStore::new();
    rt.block_on(orders.register_user("bench-user"));
    let coordinator = CheckoutCoordinator::new(catalog(0), orders);

    c.bench_function("checkout/insufficient_stock", |b| {
        b.iter(|| {
            rt.block_on(async {
                coordinator.place_order(request(10)).await.unwrap_err();
            });
        });
    });
}

criterion_group!(benches, bench_place_order, bench_rejected_checkout);
criterion_main!(benches);
