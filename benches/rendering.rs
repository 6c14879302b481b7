//! Rendering-path benchmarks: raw buffer writes, canvas apply, and a
//! full container-tree draw pass.

#![allow(missing_docs)]

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use termgrid::{
    BorderStyle, Canvas, CellOptions, ContainerOptions, ContainerTree, Point, Rect, Size, Spec,
    SplitPosition, TestTerminal, TreeOptions,
};
use termgrid::buffer::Buffer;

fn benchmark_buffer_set_narrow(c: &mut Criterion) {
    c.bench_function("buffer_set_narrow_80x24", |b| {
        b.iter(|| {
            let mut buffer = Buffer::new(Size::new(80, 24));
            for y in 0..24 {
                for x in 0..80 {
                    let _ = buffer.set(Point::new(x, y), 'x', CellOptions::new());
                }
            }
            black_box(buffer)
        })
    });
}

fn benchmark_canvas_apply(c: &mut Criterion) {
    c.bench_function("canvas_apply_80x24", |b| {
        b.iter(|| {
            let mut master = Buffer::new(Size::new(80, 24));
            let mut canvas = Canvas::new(Rect::new(0, 0, 80, 24));
            for y in 0..24 {
                for x in 0..80 {
                    let _ = canvas.set(Point::new(x, y), '#', CellOptions::new());
                }
            }
            let result = canvas.apply(&mut master);
            assert!(result.is_ok());
            black_box(master)
        })
    });
}

fn benchmark_container_draw_grid(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("tokio runtime for bench");

    c.bench_function("container_draw_split_grid_80x24", |b| {
        b.iter(|| {
            rt.block_on(async {
                let spec = Spec::split_horizontal(
                    ContainerOptions::new().border(BorderStyle::Single),
                    SplitPosition::Percentage(50),
                    Spec::leaf(ContainerOptions::new()),
                    Spec::split_vertical(
                        ContainerOptions::new(),
                        SplitPosition::Percentage(50),
                        Spec::leaf(ContainerOptions::new()),
                        Spec::leaf(ContainerOptions::new()),
                    ),
                );
                let tree = ContainerTree::build(spec, TreeOptions::new(), Size::new(80, 24))
                    .expect("tree should build");
                let mut terminal = TestTerminal::new(Size::new(80, 24));
                let result = tree.draw(&mut terminal).await;
                black_box(result)
            })
        })
    });
}

criterion_group!(
    benches,
    benchmark_buffer_set_narrow,
    benchmark_canvas_apply,
    benchmark_container_draw_grid
);
criterion_main!(benches);
