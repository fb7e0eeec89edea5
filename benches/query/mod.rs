use std::hint::black_box;

use criterion::{measurement::Measurement, BenchmarkGroup, BenchmarkId, Criterion, Throughput};
use stabtree::{Interval, IntervalIndex};

use crate::Lfsr;

#[derive(Debug)]
struct BenchName {
    bench_name: &'static str,
    n_values: usize,
}

impl From<BenchName> for BenchmarkId {
    fn from(v: BenchName) -> Self {
        Self::new(format!("{}/n_values", v.bench_name), v.n_values)
    }
}

pub(super) fn bench(c: &mut Criterion) {
    let mut g = c.benchmark_group("query");

    for n_values in [1, 100, 1_000, 10_000] {
        bench_param(&mut g, n_values)
    }
}

fn bench_param<M>(g: &mut BenchmarkGroup<'_, M>, n_values: usize)
where
    M: Measurement,
{
    // Generate the index.
    let mut rand = Lfsr::default();
    let mut t = IntervalIndex::default();

    for _i in 0..n_values {
        t.insert(rand.next_span());
    }

    bench_iter(n_values, g, &t);
    bench_stab(n_values, g, &t);
    bench_overlapping(n_values, g, &t);
}

fn bench_iter<M>(n_values: usize, g: &mut BenchmarkGroup<M>, t: &IntervalIndex<Interval<u16>>)
where
    M: Measurement,
{
    let bench_name = BenchName {
        n_values,
        bench_name: "iter",
    };

    g.throughput(Throughput::Elements(n_values as _));
    // Values per second
    g.bench_function(BenchmarkId::from(bench_name), |b| {
        b.iter(|| {
            for v in t.iter() {
                black_box(v);
            }
        })
    });
}

macro_rules! query_bench {
    (
        $name:ident,
        $probe:expr
    ) => {
        paste::paste! {
            fn [<bench_ $name>]<M>(
                n_values: usize,
                g: &mut BenchmarkGroup<M>,
                t: &IntervalIndex<Interval<u16>>,
            )
            where
                M: Measurement,
            {
                let bench_name = BenchName {
                    n_values,
                    bench_name: stringify!($name),
                };

                g.throughput(Throughput::Elements(n_values as _));
                // Values per second
                g.bench_function(BenchmarkId::from(bench_name), |b| {
                    b.iter(|| {
                        t.$name($probe, |v| {
                            black_box(v);
                        });
                    })
                });
            }
        }
    };
}

query_bench!(stab, &512);
query_bench!(overlapping, &Interval::new(42, 100));
