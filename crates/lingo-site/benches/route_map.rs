//! Benchmarks for route map building and switcher assembly.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use lingo_cache::NullCache;
use lingo_site::{
    ContentTree, LanguageContext, Languages, SiteTree, Switcher, SwitcherOptions, TreeOptions,
    build_route_map,
};
use lingo_storage::FsStorage;

/// Create a page tree with the given depth and breadth, translated into
/// French on every other level.
fn create_pages(root: &Path, depth: usize, breadth: usize) {
    fn create_level(dir: &Path, level: usize, depth: usize, breadth: usize) {
        if level > depth {
            return;
        }
        for i in 0..breadth {
            let page = dir.join(format!("{i:02}.section-{i}"));
            fs::create_dir_all(&page).unwrap();
            fs::write(page.join("default.md"), format!("# Level {level}")).unwrap();
            if level % 2 == 0 {
                fs::write(
                    page.join("default.fr.md"),
                    format!("---\nslug: rubrique-{i}\n---\n"),
                )
                .unwrap();
            }
            create_level(&page, level + 1, depth, breadth);
        }
    }

    create_level(root, 1, depth, breadth);
}

fn load_tree(root: &Path) -> Arc<SiteTree> {
    let storage = Arc::new(FsStorage::new(root.to_path_buf()));
    let languages = Arc::new(Languages::new(["en", "fr", "de"], Some("en")).unwrap());
    Arc::new(SiteTree::load(storage, languages, TreeOptions::default()).unwrap())
}

fn bench_build_route_map(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_route_map");

    for (depth, breadth) in [(2, 5), (3, 5), (4, 4)] {
        let temp_dir = tempfile::tempdir().unwrap();
        create_pages(temp_dir.path(), depth, breadth);
        let tree = load_tree(temp_dir.path());
        let context = LanguageContext::new(Arc::clone(&tree) as Arc<dyn ContentTree>);

        group.bench_with_input(
            BenchmarkId::from_parameter(tree.len()),
            &context,
            |b, context| b.iter(|| build_route_map(context, "en").unwrap()),
        );
    }

    group.finish();
}

fn bench_assemble(c: &mut Criterion) {
    let temp_dir = tempfile::tempdir().unwrap();
    create_pages(temp_dir.path(), 3, 5);
    let tree = load_tree(temp_dir.path());
    let switcher = Switcher::new(
        Arc::clone(&tree) as Arc<dyn ContentTree>,
        &NullCache,
        tree.locator().clone(),
        SwitcherOptions::default(),
    );
    let page = tree.get("01.section-1/02.section-2/03.section-3").unwrap();

    let mut group = c.benchmark_group("assemble");

    group.bench_function("cached", |b| {
        switcher.assemble(&page, "en").unwrap();
        b.iter(|| switcher.assemble(&page, "en").unwrap());
    });

    group.bench_function("after_invalidate", |b| {
        b.iter(|| {
            switcher.clear();
            switcher.assemble(&page, "en").unwrap()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_build_route_map, bench_assemble);
criterion_main!(benches);
