// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

use std::hint::black_box;

use ballast_syntax::lexer::{Scanner, TokenReader};
use ballast_syntax::parser::Parser;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};

const MODULE: &str = r#"
import ballerina/http;
import ballerina/lang.int as ints;

type Point record {| int x; int y; |};

listener http:Listener ep = new (8080);

service /geometry on ep {
    resource function get distance/[int x]/[int y]() returns float {
        Point p = {x, y};
        [int, int] pair = [p.x, p.y];
        [int a, int b] = pair;
        return <float>(a * a + b * b);
    }
}

public function classify(int[] values) returns map<int> {
    map<int> counts = {};
    foreach int v in values {
        match v % 3 {
            0 => { counts["zero"] = (counts["zero"] ?: 0) + 1; }
            1|2 if v > 10 => { counts["big"] = (counts["big"] ?: 0) + 1; }
            _ => { continue; }
        }
    }
    int[] evens = from int v in values where v % 2 == 0 select v;
    counts["evens"] = evens.length();
    return counts;
}
"#;

/// Same module with every `;` dropped, to exercise recovery.
fn broken_module() -> String {
    MODULE.replace(';', "")
}

fn bench_scanner(c: &mut Criterion) {
    let mut group = c.benchmark_group("scanner");
    group.throughput(Throughput::Bytes(MODULE.len() as u64));
    group.bench_function("module", |b| {
        b.iter(|| Scanner::new(black_box(MODULE)).count())
    });
    group.finish();
}

fn bench_parser(c: &mut Criterion) {
    let broken = broken_module();
    let mut group = c.benchmark_group("parser");
    group.throughput(Throughput::Bytes(MODULE.len() as u64));
    group.bench_function("well_formed", |b| {
        b.iter(|| Parser::new(TokenReader::new(black_box(MODULE))).parse())
    });
    group.bench_function("recovering", |b| {
        b.iter(|| Parser::new(TokenReader::new(black_box(&broken))).parse())
    });
    group.finish();
}

criterion_group!(benches, bench_scanner, bench_parser);
criterion_main!(benches);
