use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use std::sync::Arc;
use std::thread;

use dyntable::catalog::{Column, FileCatalog, MemoryCatalog, SchemaCatalog};
use dyntable::engine::SchemaEngine;
use dyntable::storage::MemoryStore;

// Test configuration
const TABLES: usize = 4;
const COLUMNS_PER_TABLE: usize = 25;

fn memory_engine() -> SchemaEngine {
    SchemaEngine::new(Arc::new(MemoryCatalog::new()), Arc::new(MemoryStore::new()))
}

// Add then drop columns on a single table
fn run_add_remove(engine: &SchemaEngine, table: &str) {
    for i in 0..COLUMNS_PER_TABLE {
        engine
            .add_column(table, Column::new(format!("c{i}"), "number"))
            .unwrap();
    }
    for i in 0..COLUMNS_PER_TABLE {
        engine.remove_column(table, &format!("c{i}")).unwrap();
    }
}

fn bench_single_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("SingleTable");

    group.bench_function("MemoryCatalog", |b| {
        b.iter_batched(
            || {
                let engine = memory_engine();
                engine.create_table("t0", vec![]).unwrap();
                engine
            },
            |engine| run_add_remove(&engine, "t0"),
            BatchSize::SmallInput,
        )
    });

    group.bench_function("FileCatalog", |b| {
        b.iter_batched(
            || {
                let dir = tempfile::TempDir::new().unwrap();
                let catalog: Arc<dyn SchemaCatalog> = Arc::new(FileCatalog::open(dir.path()).unwrap());
                let engine = SchemaEngine::new(catalog, Arc::new(MemoryStore::new()));
                engine.create_table("t0", vec![]).unwrap();
                (dir, engine)
            },
            |(_dir, engine)| run_add_remove(&engine, "t0"),
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

fn bench_parallel_tables(c: &mut Criterion) {
    let mut group = c.benchmark_group("ParallelTables");

    group.bench_function("MemoryCatalog", |b| {
        b.iter_batched(
            || {
                let engine = Arc::new(memory_engine());
                for t in 0..TABLES {
                    engine.create_table(&format!("t{t}"), vec![]).unwrap();
                }
                engine
            },
            |engine| {
                let handles: Vec<_> = (0..TABLES)
                    .map(|t| {
                        let engine = engine.clone();
                        thread::spawn(move || run_add_remove(&engine, &format!("t{t}")))
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
            },
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_single_table, bench_parallel_tables);
criterion_main!(benches);
