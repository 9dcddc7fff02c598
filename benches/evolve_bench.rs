//! Criterion benchmarks for u-evolve.
//!
//! Measures non-dominated sorting on random objective matrices and short
//! NSGA-II runs on a synthetic two-objective problem.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array2;
use rand::Rng;
use u_evolve::algorithm::{AlgorithmConfig, Nsga2};
use u_evolve::codec::{Encoding, Variable};
use u_evolve::error::EvoResult;
use u_evolve::problem::{Evaluation, FnProblem, ProblemDescriptor};
use u_evolve::random::create_rng;
use u_evolve::ranking::{non_dominated_sort, SortLimit};

// ===========================================================================
// ZDT1: f1 = x1, f2 = g (1 - sqrt(f1 / g))
// ===========================================================================

fn zdt1(x: &Array2<f64>) -> EvoResult<Evaluation> {
    let d = x.ncols() as f64;
    let objectives = Array2::from_shape_fn((x.nrows(), 2), |(i, j)| {
        let row = x.row(i);
        let f1 = row[0];
        if j == 0 {
            return f1;
        }
        let g = 1.0 + 9.0 * row.iter().skip(1).sum::<f64>() / (d - 1.0);
        g * (1.0 - (f1 / g).sqrt())
    });
    Ok(Evaluation::new(objectives))
}

fn random_objectives(n: usize, m: usize, seed: u64) -> Array2<f64> {
    let mut rng = create_rng(seed);
    Array2::from_shape_fn((n, m), |_| rng.random_range(0.0..1.0))
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_nd_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("nd_sort");

    for &(n, m) in &[(100, 2), (500, 2), (500, 3), (2000, 2)] {
        let objv = random_objectives(n, m, 42);
        group.bench_with_input(
            BenchmarkId::new(format!("all_m{m}"), n),
            &objv,
            |b, objv| b.iter(|| non_dominated_sort(black_box(objv), None, &[], SortLimit::All)),
        );
        group.bench_with_input(
            BenchmarkId::new(format!("half_m{m}"), n),
            &objv,
            |b, objv| {
                b.iter(|| {
                    non_dominated_sort(black_box(objv), None, &[], SortLimit::Count(n / 2))
                })
            },
        );
    }
    group.finish();
}

fn bench_nsga2_zdt1(c: &mut Criterion) {
    let mut group = c.benchmark_group("nsga2_zdt1");
    group.sample_size(10);

    for &(dim, pop, gens) in &[(10, 50, 50), (30, 100, 50)] {
        group.bench_with_input(
            BenchmarkId::new(format!("d{dim}_p{pop}_g{gens}"), dim),
            &(dim, pop, gens),
            |b, &(dim, pop, gens)| {
                b.iter(|| {
                    let descriptor = ProblemDescriptor::new(
                        "zdt1",
                        2,
                        vec![Variable::continuous(0.0, 1.0); dim],
                    );
                    let problem = FnProblem::new(
                        descriptor,
                        zdt1 as fn(&Array2<f64>) -> EvoResult<Evaluation>,
                    );
                    let config = AlgorithmConfig::default()
                        .with_population_size(pop)
                        .with_max_generations(gens)
                        .with_log_period(0)
                        .with_seed(42);
                    let mut algorithm = Nsga2::new(problem, Encoding::RealInteger, config)
                        .expect("valid configuration");
                    black_box(algorithm.run(None).expect("run completes"))
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_nd_sort, bench_nsga2_zdt1);
criterion_main!(benches);
