//! Benchmarks for task graph operations
//!
//! Run with: cargo bench -p taskdag-graph

#![allow(clippy::unwrap_used)]

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use taskdag_graph::{TaskGraph, TaskId};

/// Generate a wide graph with many tasks depending on a single root
fn generate_wide_graph(task_count: usize) -> TaskGraph {
    let mut graph = TaskGraph::new();
    let root = graph.add_task("root", 1).unwrap();

    for i in 0..task_count {
        let task = graph.add_task(&format!("task_{i}"), 1 + (i as u64 % 7)).unwrap();
        graph.add_dependency(&root, &task).unwrap();
    }

    graph
}

/// Generate a deep graph with linear dependency chain
fn generate_deep_graph(depth: usize) -> (TaskGraph, TaskId, TaskId) {
    let mut graph = TaskGraph::new();
    let first = graph.add_task("task_0", 1).unwrap();
    let mut prev = first.clone();

    for i in 1..depth {
        let task = graph.add_task(&format!("task_{i}"), 2).unwrap();
        graph.add_dependency(&prev, &task).unwrap();
        prev = task;
    }

    (graph, first, prev)
}

/// Generate a diamond graph (fan-out then fan-in)
fn generate_diamond_graph(width: usize, depth: usize) -> TaskGraph {
    let mut graph = TaskGraph::new();
    let root = graph.add_task("root", 1).unwrap();
    let mut prev_level = vec![root];

    for level in 0..depth {
        let mut current_level = Vec::new();
        for w in 0..width {
            let duration = 1 + ((level * width + w) as u64 % 5);
            let task = graph
                .add_task(&format!("level_{level}_task_{w}"), duration)
                .unwrap();
            for prev in &prev_level {
                graph.add_dependency(prev, &task).unwrap();
            }
            current_level.push(task);
        }
        prev_level = current_level;
    }

    // Final task depends on all leaf tasks
    let last = graph.add_task("final", 1).unwrap();
    for prev in &prev_level {
        graph.add_dependency(prev, &last).unwrap();
    }

    graph
}

fn benchmark_compute_levels(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_levels");

    for count in [50, 100, 200, 500] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let graph = generate_wide_graph(count);
            b.iter(|| black_box(graph.compute_levels().unwrap()));
        });
    }

    group.finish();
}

fn benchmark_deep_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("deep_chain_critical_path");

    for depth in [10, 20, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            let (graph, _, _) = generate_deep_graph(depth);
            b.iter(|| black_box(graph.analyze_critical_path().unwrap()));
        });
    }

    group.finish();
}

fn benchmark_diamond_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("diamond_graph_report");

    for (width, depth) in [(5, 5), (10, 5), (5, 10), (10, 10)] {
        let label = format!("w{width}_d{depth}");
        group.bench_with_input(
            BenchmarkId::from_parameter(&label),
            &(width, depth),
            |b, &(width, depth)| {
                let graph = generate_diamond_graph(width, depth);
                b.iter(|| black_box(graph.analysis_report().unwrap()));
            },
        );
    }

    group.finish();
}

fn benchmark_cycle_check(c: &mut Criterion) {
    let mut group = c.benchmark_group("would_create_cycle");

    for depth in [100, 500, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            // Closing the chain forces a full walk from the head to the tail
            let (graph, first, last) = generate_deep_graph(depth);
            b.iter(|| black_box(graph.would_create_cycle(&last, &first)));
        });
    }

    group.finish();
}

fn benchmark_graph_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_construction");

    for count in [100, 500, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let graph = generate_wide_graph(count);
                black_box(graph)
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_compute_levels,
    benchmark_deep_chain,
    benchmark_diamond_graph,
    benchmark_cycle_check,
    benchmark_graph_construction,
);

criterion_main!(benches);
