use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use rust_decimal::Decimal;
use std::sync::Arc;
use stockfeed_core::{ProductId, SourceCode, StockId, StoreId, WebsiteId};
use stockfeed_inventory::in_memory::{InMemoryInventory, InMemoryLegacyRegistry, StaticProbe};
use stockfeed_inventory::{
    Product, QtyResolver, QuantityType, SourceItemStatus, StockItemConfiguration, Store, Website,
};

const SOURCE_COUNTS: [usize; 3] = [1, 10, 100];

fn source_code(i: usize) -> SourceCode {
    SourceCode::new(format!("source-{i}")).unwrap()
}

fn setup(sources: usize) -> (QtyResolver, Store) {
    let inventory = Arc::new(InMemoryInventory::new());
    inventory.link_website("base", StockId::new(1)).configure(
        "SKU",
        StockId::new(1),
        StockItemConfiguration {
            manage_stock: true,
            min_qty: Decimal::from(1),
        },
    );

    for i in 0..sources {
        let status = if i % 3 == 0 {
            SourceItemStatus::OutOfStock
        } else {
            SourceItemStatus::InStock
        };
        inventory
            .link_source(StockId::new(1), source_code(i))
            .set_source_item("SKU", source_code(i), status, Decimal::from(i as i64));
    }

    let resolver = QtyResolver::new(
        Arc::new(StaticProbe::enabled(inventory)),
        Arc::new(InMemoryLegacyRegistry::new()),
    );
    let store = Store::new(StoreId::new(1), Website::new(WebsiteId::new(1), "base"), StoreId::new(1));
    (resolver, store)
}

/// Fresh product per iteration: source items looked up every time.
fn bench_cold_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_cold_snapshot");

    for sources in SOURCE_COUNTS {
        let (resolver, store) = setup(sources);
        group.throughput(Throughput::Elements(sources as u64));
        group.bench_with_input(BenchmarkId::from_parameter(sources), &sources, |b, _| {
            b.iter(|| {
                let product = Product::new(ProductId::new(1), "SKU");
                black_box(resolver.resolve(&product, &store, QuantityType::Salable));
            });
        });
    }

    group.finish();
}

/// Same product across iterations: only the aggregation runs.
fn bench_warm_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_warm_snapshot");

    for sources in SOURCE_COUNTS {
        let (resolver, store) = setup(sources);
        let product = Product::new(ProductId::new(1), "SKU");
        group.throughput(Throughput::Elements(sources as u64));
        group.bench_with_input(BenchmarkId::from_parameter(sources), &sources, |b, _| {
            b.iter(|| black_box(resolver.resolve(&product, &store, QuantityType::Salable)));
        });
    }

    group.finish();
}

/// Restricted aggregate (half the sources usable) versus reporting every source.
fn bench_filtered_vs_statuses(c: &mut Criterion) {
    let mut group = c.benchmark_group("filtered_vs_statuses");
    let (resolver, store) = setup(100);
    resolver.set_usable_sources(&store, Some((0..50).map(source_code).collect()));
    let product = Product::new(ProductId::new(1), "SKU");

    group.bench_function("filtered_aggregate", |b| {
        b.iter(|| black_box(resolver.resolve_quantity(&product, &store, QuantityType::Stock)));
    });

    group.bench_function("source_statuses", |b| {
        b.iter(|| black_box(resolver.source_statuses(&product, &store)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_cold_snapshot,
    bench_warm_snapshot,
    bench_filtered_vs_statuses
);
criterion_main!(benches);
