use atlas_packer_core::prelude::*;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

fn is_pow2(v: u32) -> bool {
    v != 0 && (v & (v - 1)) == 0
}

fn check_layout(layout: &AtlasLayout, sizes: &HashMap<String, (u32, u32)>) {
    assert!(is_pow2(layout.width), "width {}", layout.width);
    assert!(is_pow2(layout.height), "height {}", layout.height);
    assert!(layout.height <= layout.width);
    assert_eq!(layout.placements.len(), sizes.len());

    let bounds = layout.bounds();
    for p in &layout.placements {
        // exact-fit leaves
        let (w, h) = sizes[&p.name];
        assert_eq!((p.rect.width(), p.rect.height()), (w, h), "size of {}", p.name);
        // containment
        assert!(bounds.contains(&p.rect), "{} escapes: {:?}", p.name, p.rect);
    }
    // no overlap
    for i in 0..layout.placements.len() {
        for j in (i + 1)..layout.placements.len() {
            let a = &layout.placements[i];
            let b = &layout.placements[j];
            assert!(
                !a.rect.intersects(&b.rect),
                "{} {:?} overlaps {} {:?}",
                a.name,
                a.rect,
                b.name,
                b.rect
            );
        }
    }
}

#[test]
fn random_sets_never_overlap() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(2024);
    for round in 0..20u32 {
        let count = rng.gen_range(1..=120);
        let mut items: Vec<(String, u32, u32)> = Vec::new();
        for i in 0..count {
            let w = rng.gen_range(1..=64);
            let h = rng.gen_range(1..=64);
            items.push((format!("r{round}_{i}"), w, h));
        }
        let sizes: HashMap<String, (u32, u32)> =
            items.iter().map(|(k, w, h)| (k.clone(), (*w, *h))).collect();
        let layout = pack_layout(items, PackerConfig::default()).expect("pack");
        check_layout(&layout, &sizes);
    }
}

#[test]
fn mixed_extremes_never_overlap() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    let mut items: Vec<(String, u32, u32)> = vec![
        ("banner".into(), 500, 3),
        ("pillar".into(), 3, 300),
        ("block".into(), 129, 129),
    ];
    for i in 0..60 {
        items.push((format!("dot{i}"), rng.gen_range(1..=8), rng.gen_range(1..=8)));
    }
    let sizes: HashMap<String, (u32, u32)> =
        items.iter().map(|(k, w, h)| (k.clone(), (*w, *h))).collect();
    let layout = pack_layout(items, PackerConfig::default()).expect("pack");
    assert!(layout.width >= 500);
    assert!(layout.height >= 300);
    check_layout(&layout, &sizes);
}

#[test]
fn packing_order_is_area_descending_with_name_ties() {
    let layout = pack_layout(
        vec![("b", 8, 8), ("a", 8, 8), ("big", 16, 16), ("tiny", 2, 2), ("c", 4, 16)],
        PackerConfig::default(),
    )
    .expect("pack");
    let names: Vec<&str> = layout.placements.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["big", "a", "b", "c", "tiny"]);
}

#[test]
fn packing_is_deterministic_regardless_of_input_order() {
    let forward: Vec<(String, u32, u32)> = (0..40u32)
        .map(|i| (format!("s{i:02}"), 4 + (i * 7) % 29, 3 + (i * 11) % 23))
        .collect();
    let mut backward = forward.clone();
    backward.reverse();

    let a = pack_layout(forward, PackerConfig::default()).expect("pack");
    let b = pack_layout(backward, PackerConfig::default()).expect("pack");
    assert_eq!((a.width, a.height), (b.width, b.height));
    assert_eq!(a.placements, b.placements);
}

#[test]
fn stats_reflect_the_layout() {
    let layout = pack_layout(
        vec![("c_big", 64, 64), ("a_mid", 32, 32), ("b_small", 32, 16)],
        PackerConfig::default(),
    )
    .expect("pack");
    let stats = layout.stats();
    assert_eq!(stats.sprites, 3);
    assert_eq!(stats.atlas_area, 128 * 64);
    assert_eq!(stats.used_area, 5632);
    assert_eq!(stats.wasted_area(), 128 * 64 - 5632);
    assert!((stats.occupancy - 5632.0 / 8192.0).abs() < 1e-9);
    assert!((stats.waste_percentage() - 31.25).abs() < 1e-9);
    assert!(stats.summary().contains("128x64"));
}
