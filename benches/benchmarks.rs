//! Performance benchmarks for Skriptor.
//!
//! This module contains benchmarks for:
//! - Context flattening with wide and deep project metadata
//! - Step compilation
//! - Script parsing
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Map, Value};
use skriptor::config::parse_script_str;
use skriptor::engine::{compile_step, flatten, render, TemplateMode};
use skriptor::{Context, Utils};

// ============================================================================
// Mock Data Fixtures
// ============================================================================

mod fixtures {
    use super::*;

    /// Project metadata with `width` keys per level, nested `depth` levels.
    pub fn project(width: usize, depth: usize) -> Map<String, Value> {
        let mut map = Map::new();
        for i in 0..width {
            let value = if depth > 1 {
                Value::Object(project(width, depth - 1))
            } else {
                json!(format!("value-{i}"))
            };
            map.insert(format!("key{i}"), value);
        }
        map
    }

    /// A script with `num_steps` file-creating steps.
    pub fn script(num_steps: usize) -> String {
        let mut yaml = String::from("project:\n  name: demo\n  owner:\n    name: Ada\nsteps:\n");
        for i in 0..num_steps {
            yaml.push_str(&format!(
                "  - type: create_file\n    name: File {i}\n    path: \"/tmp/{{{{ project_name }}}}/file-{i}.txt\"\n    content: \"by {{{{ project.owner.name }}}}\"\n"
            ));
        }
        yaml
    }
}

// ============================================================================
// Flattening
// ============================================================================

fn bench_flatten(c: &mut Criterion) {
    let mut group = c.benchmark_group("context/flatten");

    for (width, depth) in [(10, 1), (50, 1), (5, 3), (4, 5)] {
        let project = fixtures::project(width, depth);
        let leaves = width.pow(depth as u32);

        group.throughput(Throughput::Elements(leaves as u64));
        group.bench_with_input(
            BenchmarkId::new("flatten", format!("{width}x{depth}")),
            &project,
            |b, project| b.iter(|| black_box(flatten(black_box(project)))),
        );
    }

    group.finish();
}

// ============================================================================
// Compilation
// ============================================================================

fn bench_render(c: &mut Criterion) {
    let project = fixtures::project(20, 2);
    let vars = flatten(&project);
    let template = "{{ key1_key2 }}/{{ key3_key4 }}/{{ missing }}-{{! note }}-{{{ key0_key0 }}}";

    c.bench_function("template/render", |b| {
        b.iter(|| render(black_box(template), &vars, TemplateMode::Lenient));
    });
}

fn bench_compile_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("template/compile_step");

    for width in [5, 50, 200] {
        let config = parse_script_str(&fixtures::script(1)).expect("valid script");
        let step = &config.steps[0];

        let mut project = fixtures::project(width, 2);
        project.extend(config.project.clone());
        let ctx = Context::new(project, Utils::new());

        group.bench_with_input(BenchmarkId::new("project_keys", width), &ctx, |b, ctx| {
            b.iter(|| compile_step(black_box(step), ctx, TemplateMode::Lenient));
        });
    }

    group.finish();
}

// ============================================================================
// Parsing
// ============================================================================

fn bench_parse_script(c: &mut Criterion) {
    let mut group = c.benchmark_group("config/parse");

    for num_steps in [10, 100, 500] {
        let yaml = fixtures::script(num_steps);

        group.throughput(Throughput::Elements(num_steps as u64));
        group.bench_with_input(BenchmarkId::new("parse_script_str", num_steps), &yaml, |b, yaml| {
            b.iter(|| black_box(parse_script_str(black_box(yaml))));
        });
    }

    group.finish();
}

criterion_group!(context_benches, bench_flatten,);

criterion_group!(template_benches, bench_render, bench_compile_step,);

criterion_group!(parsing_benches, bench_parse_script,);

criterion_main!(context_benches, template_benches, parsing_benches,);
