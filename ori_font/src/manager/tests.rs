//! Font manager tests: registration, scoring-based matching, fallback.

use std::path::Path;

use super::*;
use crate::test_util::{FakeSource, RecordingBackend};

const HIRAGANA_A: u32 = 0x3042;

fn manager() -> FontManager<RecordingBackend> {
    FontManager::new(RecordingBackend::default(), Config::default())
}

fn add(
    m: &mut FontManager<RecordingBackend>,
    family: &str,
    generic: GenericFamily,
    style: FontStyle,
    weight: u16,
) -> FaceId {
    add_source(m, FakeSource::new(family).class(generic, style, weight))
}

fn add_source(m: &mut FontManager<RecordingBackend>, source: FakeSource) -> FaceId {
    let name = format!("/fonts/{}.ttf", m.len());
    m.add_source(Path::new(&name), source.boxed())
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[test]
fn faces_bucketed_by_generic_in_load_order() {
    let mut m = manager();
    let a = add(&mut m, "Alpha", GenericFamily::Serif, FontStyle::Normal, 400);
    let b = add(&mut m, "Beta", GenericFamily::Monospace, FontStyle::Normal, 400);
    let c = add(&mut m, "Gamma", GenericFamily::Serif, FontStyle::Normal, 400);
    assert_eq!(m.faces_in(GenericFamily::Serif), &[a, c]);
    assert_eq!(m.faces_in(GenericFamily::Monospace), &[b]);
    assert!(m.faces_in(GenericFamily::Cursive).is_empty());
    assert_eq!(m.len(), 3);
    assert_eq!(a.index(), 0);
}

#[test]
fn aliases_registered_once_each() {
    let mut m = manager();
    let id = add_source(&mut m, FakeSource::new("Alpha").alias("Alpha Text").alias("ALPHA"));
    m.register("alpha", id);
    let names: Vec<_> = m.family_names().collect();
    assert_eq!(names, vec!["alpha", "alpha text"]);
    assert_eq!(
        m.resolve_by_name("Alpha Text", FontStyle::Normal, FontWeight::NORMAL),
        Some(id)
    );
}

#[test]
fn register_adds_alias() {
    let mut m = manager();
    let id = add(&mut m, "Alpha", GenericFamily::Serif, FontStyle::Normal, 400);
    m.register("Body Font", id);
    assert_eq!(
        m.resolve_by_name("body font", FontStyle::Normal, FontWeight::NORMAL),
        Some(id)
    );
}

// ---------------------------------------------------------------------------
// ResolveByGeneric
// ---------------------------------------------------------------------------

#[test]
fn regular_request_picks_regular_over_black() {
    let mut m = manager();
    let a = add(&mut m, "Alpha", GenericFamily::Serif, FontStyle::Normal, 400);
    let _b = add(&mut m, "Alpha", GenericFamily::Serif, FontStyle::Normal, 900);
    let got = m.resolve_by_generic(GenericFamily::Serif, FontStyle::Normal, FontWeight::NORMAL, GenericMask::all());
    assert_eq!(got, Some(a));
}

#[test]
fn best_variant_wins_regardless_of_order_within_group() {
    let mut m = manager();
    let _b = add(&mut m, "Alpha", GenericFamily::Serif, FontStyle::Normal, 900);
    let a = add(&mut m, "Alpha", GenericFamily::Serif, FontStyle::Normal, 400);
    let got = m.resolve_by_generic(GenericFamily::Serif, FontStyle::Normal, FontWeight::NORMAL, GenericMask::all());
    assert_eq!(got, Some(a));
}

#[test]
fn only_candidate_selected_despite_style_mismatch() {
    let mut m = manager();
    let b = add(&mut m, "Beta", GenericFamily::Serif, FontStyle::Normal, 700);
    let got = m.resolve_by_generic(GenericFamily::Serif, FontStyle::Italic, FontWeight::NORMAL, GenericMask::all());
    assert_eq!(got, Some(b));
    assert_eq!(score(FontStyle::Normal, FontWeight::BOLD, FontStyle::Italic, FontWeight::NORMAL), 3);
}

#[test]
fn first_family_group_wins_over_better_later_family() {
    let mut m = manager();
    let first = add(&mut m, "Alpha", GenericFamily::Serif, FontStyle::Normal, 900);
    let _exact = add(&mut m, "Beta", GenericFamily::Serif, FontStyle::Italic, 400);
    let got = m.resolve_by_generic(GenericFamily::Serif, FontStyle::Italic, FontWeight::NORMAL, GenericMask::all());
    assert_eq!(got, Some(first));
}

#[test]
fn medium_beats_light_for_regular_and_ties_go_first() {
    let mut m = manager();
    let _a300 = add(&mut m, "Alpha", GenericFamily::Serif, FontStyle::Normal, 300);
    let a500 = add(&mut m, "Alpha", GenericFamily::Serif, FontStyle::Normal, 500);
    // Request 400: 300 scores 9 - 1 = 8; 500 scores the special-case 9.
    let got = m.resolve_by_generic(GenericFamily::Serif, FontStyle::Normal, FontWeight::NORMAL, GenericMask::all());
    assert_eq!(got, Some(a500));

    let mut m = manager();
    let first = add(&mut m, "Alpha", GenericFamily::Serif, FontStyle::Normal, 700);
    let _same = add(&mut m, "Alpha", GenericFamily::Serif, FontStyle::Normal, 700);
    let got = m.resolve_by_generic(GenericFamily::Serif, FontStyle::Normal, FontWeight::BOLD, GenericMask::all());
    assert_eq!(got, Some(first));
}

#[test]
fn empty_bucket_advances_to_lowest_remaining() {
    let mut m = manager();
    let mono = add(&mut m, "Mono", GenericFamily::Monospace, FontStyle::Normal, 400);
    let fantasy = add(&mut m, "Fancy", GenericFamily::Fantasy, FontStyle::Normal, 400);
    let got = m.resolve_by_generic(GenericFamily::Cursive, FontStyle::Normal, FontWeight::NORMAL, GenericMask::all());
    assert_eq!(got, Some(mono));

    let mask = GenericMask::CURSIVE | GenericMask::FANTASY;
    let got = m.resolve_by_generic(GenericFamily::Cursive, FontStyle::Normal, FontWeight::NORMAL, mask);
    assert_eq!(got, Some(fantasy));
}

#[test]
fn requested_bucket_searched_even_outside_mask() {
    let mut m = manager();
    let serif = add(&mut m, "Alpha", GenericFamily::Serif, FontStyle::Normal, 400);
    let got = m.resolve_by_generic(GenericFamily::Serif, FontStyle::Normal, FontWeight::NORMAL, GenericMask::empty());
    assert_eq!(got, Some(serif));
}

#[test]
fn exhausted_mask_finds_nothing() {
    let mut m = manager();
    add(&mut m, "Alpha", GenericFamily::Serif, FontStyle::Normal, 400);
    let mask = GenericMask::MONOSPACE | GenericMask::CURSIVE;
    let got = m.resolve_by_generic(GenericFamily::Monospace, FontStyle::Normal, FontWeight::NORMAL, mask);
    assert_eq!(got, None);
}

// ---------------------------------------------------------------------------
// ResolveByName
// ---------------------------------------------------------------------------

#[test]
fn name_lookup_ignores_case_and_scores_variants() {
    let mut m = manager();
    let _regular = add(&mut m, "DejaVu Sans", GenericFamily::SansSerif, FontStyle::Normal, 400);
    let bold = add(&mut m, "DejaVu Sans", GenericFamily::SansSerif, FontStyle::Normal, 700);
    let oblique = add(&mut m, "DejaVu Sans", GenericFamily::SansSerif, FontStyle::Oblique, 400);
    assert_eq!(m.resolve_by_name("dejavu sans", FontStyle::Normal, FontWeight::BOLD), Some(bold));
    assert_eq!(m.resolve_by_name("DEJAVU SANS", FontStyle::Italic, FontWeight::NORMAL), Some(oblique));
    assert_eq!(m.resolve_by_name("DejaVu", FontStyle::Normal, FontWeight::NORMAL), None);
}

// ---------------------------------------------------------------------------
// ResolveAlternate
// ---------------------------------------------------------------------------

#[test]
fn alternate_prefers_later_variant_of_same_family() {
    let mut m = manager();
    let current = add(&mut m, "Alpha", GenericFamily::Serif, FontStyle::Normal, 400);
    let sibling = add_source(
        &mut m,
        FakeSource::new("Alpha")
            .class(GenericFamily::Serif, FontStyle::Normal, 700)
            .with_codepoint(HIRAGANA_A),
    );
    let _other = add_source(
        &mut m,
        FakeSource::new("Sans CJK")
            .class(GenericFamily::SansSerif, FontStyle::Normal, 400)
            .with_codepoint(HIRAGANA_A),
    );
    let got = m.resolve_alternate(GenericFamily::Serif, FontStyle::Normal, FontWeight::NORMAL, current, HIRAGANA_A);
    assert_eq!(got, Some(sibling));
}

#[test]
fn alternate_skips_siblings_without_the_glyph() {
    let mut m = manager();
    let current = add(&mut m, "Alpha", GenericFamily::Serif, FontStyle::Normal, 400);
    let _sibling = add(&mut m, "Alpha", GenericFamily::Serif, FontStyle::Normal, 700);
    let cjk = add_source(
        &mut m,
        FakeSource::new("Sans CJK")
            .class(GenericFamily::SansSerif, FontStyle::Normal, 400)
            .with_codepoint(HIRAGANA_A),
    );
    let got = m.resolve_alternate(GenericFamily::Serif, FontStyle::Normal, FontWeight::NORMAL, current, HIRAGANA_A);
    assert_eq!(got, Some(cjk));
}

#[test]
fn alternate_does_not_look_at_earlier_siblings() {
    let mut m = manager();
    let _earlier = add_source(
        &mut m,
        FakeSource::new("Alpha")
            .class(GenericFamily::Serif, FontStyle::Normal, 300)
            .with_codepoint(HIRAGANA_A),
    );
    let current = add(&mut m, "Alpha", GenericFamily::Serif, FontStyle::Normal, 400);
    let got = m.resolve_alternate(GenericFamily::Serif, FontStyle::Normal, FontWeight::NORMAL, current, HIRAGANA_A);
    assert_eq!(got, None, "no other bucket has faces");
}

#[test]
fn alternate_from_requested_bucket_excludes_only_that_bucket() {
    let mut m = manager();
    let serif = add(&mut m, "Alpha", GenericFamily::Serif, FontStyle::Normal, 400);
    let mono = add(&mut m, "Mono", GenericFamily::Monospace, FontStyle::Normal, 400);
    let _cursive = add(&mut m, "Script", GenericFamily::Cursive, FontStyle::Normal, 400);
    let got = m.resolve_alternate(GenericFamily::Serif, FontStyle::Normal, FontWeight::NORMAL, serif, HIRAGANA_A);
    assert_eq!(got, Some(mono));
}

#[test]
fn alternate_from_fallback_bucket_moves_past_it() {
    let mut m = manager();
    let _serif = add(&mut m, "Alpha", GenericFamily::Serif, FontStyle::Normal, 400);
    let mono = add(&mut m, "Mono", GenericFamily::Monospace, FontStyle::Normal, 400);
    let cursive = add(&mut m, "Script", GenericFamily::Cursive, FontStyle::Normal, 400);
    // Monospace is not the requested bucket: everything up to it is skipped.
    let got = m.resolve_alternate(GenericFamily::Serif, FontStyle::Normal, FontWeight::NORMAL, mono, HIRAGANA_A);
    assert_eq!(got, Some(cursive));
}

#[test]
fn alternate_for_unknown_face_is_none() {
    let m = manager();
    let got = m.resolve_alternate(GenericFamily::Serif, FontStyle::Normal, FontWeight::NORMAL, FaceId(7), 0x41);
    assert_eq!(got, None);
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[test]
fn request_tries_families_in_order() {
    let mut m = manager();
    let serif = add(&mut m, "Alpha", GenericFamily::Serif, FontStyle::Normal, 400);
    let sans = add(&mut m, "Beta", GenericFamily::SansSerif, FontStyle::Normal, 400);

    let req = FontRequest::new(GenericFamily::Serif).family("Missing").family("beta");
    assert_eq!(m.resolve(&req), Ok(sans));

    let req = FontRequest::new(GenericFamily::SansSerif).family("Missing");
    assert_eq!(m.resolve(&req), Ok(sans));

    let req = FontRequest::new(GenericFamily::SansSerif).family("serif");
    assert_eq!(m.resolve(&req), Ok(serif));
}

#[test]
fn request_style_and_weight_flow_through() {
    let mut m = manager();
    let _regular = add(&mut m, "Alpha", GenericFamily::Serif, FontStyle::Normal, 400);
    let italic = add(&mut m, "Alpha", GenericFamily::Serif, FontStyle::Italic, 400);
    let req = FontRequest::default()
        .style(FontStyle::Italic)
        .weight(FontWeight::NORMAL);
    assert_eq!(m.resolve(&req), Ok(italic));
}

#[test]
fn empty_manager_has_no_match() {
    let m = manager();
    assert_eq!(m.resolve(&FontRequest::default()), Err(NoMatchFound));
    assert!(m.is_empty());
}

#[test]
fn configured_fallback_restricts_buckets() {
    let mut config = Config::default();
    config.matching.fallback = vec![GenericFamily::Serif];
    let mut m = FontManager::new(RecordingBackend::default(), config);
    add(&mut m, "Mono", GenericFamily::Monospace, FontStyle::Normal, 400);
    assert_eq!(m.resolve(&FontRequest::new(GenericFamily::Serif)), Err(NoMatchFound));
}

#[test]
fn atlas_pass_through_uses_synthesis() {
    let mut m = manager();
    let id = add(&mut m, "Alpha", GenericFamily::Serif, FontStyle::Normal, 400);
    let atlas = m
        .atlas(id, 18, FontStyle::Italic, FontWeight::BOLD)
        .expect("face exists");
    assert!(atlas.key().bold && atlas.key().oblique);
    assert!(m.atlas(FaceId(42), 18, FontStyle::Normal, FontWeight::NORMAL).is_none());
    assert_eq!(m.backend().adds(), 1);
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn set_face(
    m: &FontManager<RecordingBackend>,
    file: &str,
    family: &str,
    style: FontStyle,
    weight: u16,
) -> FontFace<RecordingBackend> {
    let source = FakeSource::new(family).class(GenericFamily::SansSerif, style, weight);
    m.new_face(Path::new(file), source.boxed())
}

#[test]
fn font_set_keeps_families_contiguous() {
    let mut m = manager();
    // Path order puts the Light family between two "DejaVu Sans" variants.
    let set = vec![
        set_face(&m, "DejaVuSans-Bold.ttf", "DejaVu Sans", FontStyle::Normal, 700),
        set_face(&m, "DejaVuSans-BoldOblique.ttf", "DejaVu Sans", FontStyle::Oblique, 700),
        set_face(&m, "DejaVuSans-ExtraLight.ttf", "DejaVu Sans Light", FontStyle::Normal, 200),
        set_face(&m, "DejaVuSans-Oblique.ttf", "DejaVu Sans", FontStyle::Oblique, 400),
        set_face(&m, "DejaVuSans.ttf", "DejaVu Sans", FontStyle::Normal, 400),
    ];
    let ids = m.add_faces(set);
    assert_eq!(ids.len(), 5);

    let families: Vec<_> = m
        .faces_in(GenericFamily::SansSerif)
        .iter()
        .map(|&id| m.face(id).expect("registered").family().to_owned())
        .collect();
    assert_eq!(
        families,
        ["DejaVu Sans", "DejaVu Sans", "DejaVu Sans", "DejaVu Sans", "DejaVu Sans Light"]
    );

    let got = m
        .resolve(&FontRequest::new(GenericFamily::SansSerif))
        .expect("sans bucket populated");
    let regular = m.face(got).expect("registered");
    assert_eq!(regular.filename(), Path::new("DejaVuSans.ttf"));
    assert_eq!(regular.weight(), FontWeight::NORMAL);
    assert_eq!(m.resolve_by_name("dejavu sans light", FontStyle::Normal, FontWeight::NORMAL), Some(ids[4]));
}

#[test]
fn font_set_grouping_ignores_family_case() {
    let mut m = manager();
    let set = vec![
        set_face(&m, "a-bold.ttf", "Alpha", FontStyle::Normal, 700),
        set_face(&m, "b.ttf", "Beta", FontStyle::Normal, 400),
        set_face(&m, "a.ttf", "ALPHA", FontStyle::Normal, 400),
    ];
    let ids = m.add_faces(set);
    let order: Vec<_> = ids
        .iter()
        .map(|&id| m.face(id).expect("registered").filename().to_owned())
        .collect();
    assert_eq!(order, [Path::new("a-bold.ttf"), Path::new("a.ttf"), Path::new("b.ttf")]);
    assert_eq!(m.faces_in(GenericFamily::SansSerif), ids.as_slice());
}

#[test]
fn load_missing_file_fails() {
    let mut m = manager();
    let err = m.load(Path::new("/nonexistent/ori_font/a.ttf")).expect_err("missing");
    assert!(matches!(err, FontLoadError::Io { .. }));
}

#[test]
fn font_set_skips_failures() {
    let dir = std::env::temp_dir().join(format!("ori_font_set_{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    let bad = dir.join("broken.ttf");
    std::fs::write(&bad, b"\0\x01\0\0 truncated").expect("write temp file");

    let mut m = manager();
    let loaded = m.load_font_set([bad.as_path(), Path::new("/nonexistent/ori_font/b.otf")]);
    assert_eq!(loaded, 0);
    assert!(m.is_empty());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn system_fonts_from_empty_dir_load_nothing() {
    let dir = std::env::temp_dir().join(format!("ori_font_sysdir_{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    let mut config = Config::default();
    config.fonts.dirs = vec![dir.clone()];
    let mut m = FontManager::new(RecordingBackend::default(), config);
    assert_eq!(m.load_system_fonts(), 0);
    assert!(m.config().fonts.files.is_empty());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn faces_iterates_with_ids() {
    let mut m = manager();
    let a = add(&mut m, "Alpha", GenericFamily::Serif, FontStyle::Normal, 400);
    let b = add(&mut m, "Beta", GenericFamily::Serif, FontStyle::Normal, 400);
    let ids: Vec<_> = m.faces().map(|(id, f)| (id, f.family().to_owned())).collect();
    assert_eq!(ids, vec![(a, "Alpha".to_owned()), (b, "Beta".to_owned())]);
    assert!(m.face(a).is_some());
    assert!(m.face_mut(b).is_some());
}
