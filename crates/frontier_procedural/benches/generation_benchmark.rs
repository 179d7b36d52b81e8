//! Benchmark for the generation hot paths.
//!
//! Run with: cargo bench --package frontier_procedural --bench generation_benchmark

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use frontier_core::SeededRandom;
use frontier_procedural::generators::{NameOptions, NpcOptions};
use frontier_procedural::{
    GenerationContext, GeneratorConfig, LocationRef, NameGenerator, NpcGenerator, ProceduralLocationManager,
    QuestGenerator, TemplateRegistry, WorldGenerator,
};

fn benchmark_entities(c: &mut Criterion) {
    let registry = TemplateRegistry::frontier().expect("embedded content pack");
    let ctx = GenerationContext::new(42);

    c.bench_function("name", |b| {
        let names = NameGenerator::new(&registry.names);
        let mut rng = SeededRandom::new(42);
        b.iter(|| black_box(names.generate(&mut rng, "frontier_anglo", NameOptions::default())));
    });

    c.bench_function("npc", |b| {
        let npcs = NpcGenerator::new(&registry);
        let mut rng = SeededRandom::new(42);
        b.iter(|| black_box(npcs.generate(&mut rng, "sheriff", &ctx, &NpcOptions::default())));
    });

    c.bench_function("quest", |b| {
        let quests = QuestGenerator::new(&registry.quests);
        let mut rng = SeededRandom::new(42);
        b.iter(|| black_box(quests.generate(&mut rng, "bounty_basic", &ctx)));
    });
}

fn benchmark_locations(c: &mut Criterion) {
    let registry = Arc::new(TemplateRegistry::frontier().expect("embedded content pack"));
    let town = LocationRef::new("dry-gulch", "Dry Gulch", "frontier_town");

    c.bench_function("location_content_uncached", |b| {
        let mut manager = ProceduralLocationManager::new(Arc::clone(&registry), 42);
        b.iter(|| {
            manager.clear();
            black_box(manager.generate_location_content(&town))
        });
    });

    c.bench_function("location_content_cached", |b| {
        let mut manager = ProceduralLocationManager::new(Arc::clone(&registry), 42);
        let _ = manager.generate_location_content(&town);
        b.iter(|| black_box(manager.generate_location_content(&town)));
    });

    let mut group = c.benchmark_group("world");
    group.sample_size(20);
    group.bench_function("default_world", |b| {
        let mut generator = WorldGenerator::new(GeneratorConfig::default());
        generator.initialize(Arc::clone(&registry));
        let mut seed = 0;
        b.iter(|| {
            seed += 1;
            black_box(generator.generate_world(seed))
        });
    });
    group.finish();
}

criterion_group!(benches, benchmark_entities, benchmark_locations);
criterion_main!(benches);
