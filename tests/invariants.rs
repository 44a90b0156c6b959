//! Contract Invariant Tests
//!
//! These tests verify the guarantees callers rely on.

use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::Arc;
use std::thread;

use memegen_core::{
    anchors_for, render_font_size, wrap, CaptionProvider, EngineConfig, Field, FsAssetLoader,
    MemeGenerator, MemeHandler, MemeService, MemoryAssetLoader, OutputFormat, RenderRequest,
    Template, TemplateRegistry,
};

const FONT: &[u8] = include_bytes!("fixtures/DejaVuSans-Bold.ttf");
const BACKGROUND: [u8; 4] = [40, 90, 160, 255];

fn base_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba(BACKGROUND));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

fn create_registry() -> TemplateRegistry {
    TemplateRegistry::from_templates([
        Template::new("t1", "Test One", 2, "classic", "t1.png"),
        Template::new("panels", "Panels", 4, "classic", "panels.png"),
        Template::new("solo", "Solo", 1, "debate", "solo.png"),
    ])
}

fn create_generator(config: EngineConfig) -> MemeGenerator {
    let assets = MemoryAssetLoader::new()
        .with_image("t1.png", base_png(600, 400))
        .with_image("panels.png", base_png(600, 600))
        .with_image("solo.png", base_png(240, 240))
        .with_font(FONT.to_vec());
    MemeGenerator::new(create_registry(), config, Box::new(assets))
}

fn request(template_id: &str, top: &str, bottom: &str) -> RenderRequest {
    RenderRequest {
        template_id: template_id.to_string(),
        top_text: top.to_string(),
        bottom_text: bottom.to_string(),
        ..Default::default()
    }
}

fn png_config() -> EngineConfig {
    EngineConfig {
        output_format: OutputFormat::Png,
        ..Default::default()
    }
}

fn decode(bytes: &[u8]) -> RgbaImage {
    image::load_from_memory(bytes).unwrap().to_rgba8()
}

#[test]
fn invariant_end_to_end_top_and_bottom() {
    let generator = create_generator(EngineConfig::default());
    let template = generator.registry().get("t1").unwrap().clone();
    let req = request("t1", "HELLO", "WORLD");

    assert_eq!(render_font_size(600), 48.0);
    let points: Vec<_> = anchors_for(&template, &req, 600, 400, 48.0)
        .iter()
        .map(|a| (a.field, a.x, a.y))
        .collect();
    assert_eq!(points, vec![(Field::Top, 300, 72), (Field::Bottom, 300, 328)]);

    let result = generator.generate(req);
    assert_eq!(result.error, "");
    assert_eq!(result.mime_type, "image/jpeg");
    assert!(!result.image_data.is_empty());

    let img = image::load_from_memory(&result.image_data).unwrap();
    assert_eq!((img.width(), img.height()), (600, 400));
}

#[test]
fn invariant_unknown_template_reports_error() {
    let generator = create_generator(EngineConfig::default());
    let result = generator.generate(request("does-not-exist", "a", "b"));

    assert!(result.image_data.is_empty());
    assert!(result.mime_type.is_empty());
    assert!(result.error.contains("does-not-exist"));
    assert!(result.error.contains("not found"));
}

#[test]
fn invariant_list_by_category() {
    let generator = create_generator(EngineConfig::default());

    let classic = generator.list_templates(Some("classic"));
    assert_eq!(classic.len(), 2);
    assert!(classic.iter().all(|t| t.category == "classic"));

    let mut all: Vec<_> = generator.list_templates(Some("")).into_iter().map(|t| t.id).collect();
    all.sort();
    assert_eq!(all, vec!["panels", "solo", "t1"]);

    assert!(generator.list_templates(Some("nonexistent")).is_empty());
}

#[test]
fn invariant_extra_additional_text_ignored() {
    // "solo" has one field: no additional text may be drawn at all
    let generator = create_generator(png_config());
    let plain = generator.generate(request("solo", "", ""));
    let mut crowded = request("solo", "", "");
    crowded.additional_text = vec!["SHOULD".into(), "NOT".into(), "APPEAR".into()];
    let crowded = generator.generate(crowded);

    assert!(plain.is_success() && crowded.is_success());
    assert_eq!(decode(&plain.image_data), decode(&crowded.image_data));
}

#[test]
fn invariant_additional_text_within_capacity_drawn() {
    let generator = create_generator(png_config());
    let mut req = request("panels", "", "");
    req.additional_text = vec!["ONE".into(), "TWO".into(), "THREE".into()];
    let with_three = generator.generate(req.clone());

    req.additional_text.truncate(2);
    let with_two = generator.generate(req);

    // capacity is 4 - 2 = 2, so the third entry changes nothing
    assert_eq!(decode(&with_three.image_data), decode(&with_two.image_data));
    assert_ne!(decode(&with_two.image_data), decode(&base_png(600, 600)));
}

#[test]
fn invariant_missing_base_image_is_image_load_failure() {
    let assets = MemoryAssetLoader::new().with_font(FONT.to_vec());
    let generator = MemeGenerator::new(create_registry(), EngineConfig::default(), Box::new(assets));
    let result = generator.generate(request("t1", "x", ""));

    assert!(result.image_data.is_empty());
    assert!(result.error.contains("Image load failure"));
}

#[test]
fn invariant_undecodable_base_image_is_image_load_failure() {
    let assets = MemoryAssetLoader::new()
        .with_image("t1.png", b"not really a png".to_vec())
        .with_font(FONT.to_vec());
    let generator = MemeGenerator::new(create_registry(), EngineConfig::default(), Box::new(assets));
    let result = generator.generate(request("t1", "x", ""));

    assert!(result.error.contains("Image load failure"));
}

#[test]
fn invariant_bad_font_is_font_load_failure_and_recoverable() {
    let assets = MemoryAssetLoader::new()
        .with_image("t1.png", base_png(600, 400))
        .with_font(b"garbage".to_vec());
    let generator = MemeGenerator::new(create_registry(), EngineConfig::default(), Box::new(assets));

    let first = generator.generate(request("t1", "x", ""));
    assert!(first.error.contains("Font load failure"));
    assert!(first.image_data.is_empty());

    // shared state untouched: the next request fails the same way, no panic
    let second = generator.generate(request("t1", "y", ""));
    assert!(second.error.contains("Font load failure"));
    assert!(generator.list_templates(None).len() == 3);
}

#[test]
fn invariant_generated_caption_fills_empty_top() {
    let generator = create_generator(png_config()).with_captions(CaptionProvider::StaticPlaceholder);

    let mut req = request("t1", "", "");
    req.use_generated_caption = true;
    let result = generator.generate(req);
    assert!(result.is_success());
    assert_eq!(result.generated_captions, vec!["AI generated caption for Test One meme"]);
    assert_ne!(decode(&result.image_data), decode(&base_png(600, 400)));

    // flag off: provider is not consulted
    let result = generator.generate(request("t1", "", ""));
    assert!(result.generated_captions.is_empty());
    assert_eq!(decode(&result.image_data), decode(&base_png(600, 400)));
}

#[test]
fn invariant_default_generator_fills_caption() {
    // no with_captions, and the config switch left at its default (off)
    let config = png_config();
    assert!(!config.enable_ai_caption);
    let generator = create_generator(config);

    let mut req = request("t1", "", "");
    req.use_generated_caption = true;
    let result = generator.generate(req);

    assert!(result.is_success(), "{}", result.error);
    assert_eq!(result.generated_captions, vec!["AI generated caption for Test One meme"]);
    assert_ne!(decode(&result.image_data), decode(&base_png(600, 400)));
}

#[test]
fn invariant_caption_does_not_replace_explicit_top() {
    let external = CaptionProvider::external(|_: &str| vec!["IGNORED".to_string()]);
    let generator = create_generator(png_config()).with_captions(external);

    let mut with_flag = request("t1", "MINE", "");
    with_flag.use_generated_caption = true;
    let with_flag = generator.generate(with_flag);
    let without_flag = generator.generate(request("t1", "MINE", ""));

    assert_eq!(with_flag.generated_captions, vec!["IGNORED"]);
    assert_eq!(decode(&with_flag.image_data), decode(&without_flag.image_data));
}

#[test]
fn invariant_empty_caption_list_leaves_top_empty() {
    let generator =
        create_generator(png_config()).with_captions(CaptionProvider::external(|_: &str| Vec::<String>::new()));
    let mut req = request("t1", "", "");
    req.use_generated_caption = true;
    let result = generator.generate(req);

    assert!(result.is_success());
    assert!(result.generated_captions.is_empty());
    assert_eq!(decode(&result.image_data), decode(&base_png(600, 400)));
}

#[test]
fn invariant_render_is_deterministic() {
    let generator = create_generator(png_config());
    let a = generator.generate(request("t1", "SAME TEXT", "EVERY TIME"));
    let b = generator.generate(request("t1", "SAME TEXT", "EVERY TIME"));
    assert_eq!(a.image_data, b.image_data);
}

#[test]
fn invariant_concurrent_renders_share_engine() {
    let generator = Arc::new(create_generator(png_config()));
    let expected = generator.generate(request("t1", "PARALLEL", "RENDER")).image_data;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let generator = Arc::clone(&generator);
            thread::spawn(move || generator.generate(request("t1", "PARALLEL", "RENDER")).image_data)
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn invariant_two_font_sizes_observed() {
    // Wrapping is measured at config.font_size while glyphs are drawn at the
    // width-derived size. On a 240px image the drawn size is 20, yet a text
    // that fits at 20 is still broken into lines measured at 36.
    let generator = create_generator(png_config());
    let text = "WHEN THE CODE COMPILES";
    let drawn_size = render_font_size(240);
    assert_eq!(drawn_size, 20.0);

    let font = memegen_core::FontFace::from_bytes(FONT.to_vec()).unwrap();
    let at_render = wrap(text, 240.0, |s| font.measure(s, drawn_size));
    let at_config = wrap(text, 240.0, |s| font.measure(s, generator.config().font_size));
    assert!(at_config.len() > at_render.len());

    let result = generator.generate(request("solo", text, ""));
    assert!(result.is_success());
}

#[test]
fn invariant_huge_line_spacing_still_renders() {
    let config = EngineConfig::from_lookup(|key: &str| match key {
        "LINE_SPACING" => Some("1e9".to_string()),
        "OUTPUT_FORMAT" => Some("png".to_string()),
        _ => None,
    });
    assert_eq!(config.line_spacing, 1e9);
    let generator = create_generator(config);

    // wraps to several lines on a 240px canvas
    let result = generator.generate(request("solo", "ONE TWO THREE FOUR", ""));
    assert!(result.is_success(), "{}", result.error);
    assert_eq!(decode(&result.image_data).dimensions(), (240, 240));
}

#[test]
fn invariant_handler_rejects_blank_template_id() {
    let handler = MemeHandler::new(create_generator(EngineConfig::default()));
    let result = handler.generate_meme(request("", "x", "y"));
    assert_eq!(result.error, "Invalid request: template_id is required");
    assert!(result.image_data.is_empty());

    let ok = handler.generate_meme(request("t1", "x", "y"));
    assert!(ok.is_success());
}

#[test]
fn invariant_filesystem_assets() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("t1.png"), base_png(300, 200)).unwrap();
    std::fs::write(dir.path().join("font.ttf"), FONT).unwrap();

    let assets = FsAssetLoader::new(dir.path(), dir.path().join("font.ttf"));
    let generator = MemeGenerator::new(create_registry(), png_config(), Box::new(assets));
    let result = generator.generate(request("t1", "FROM", "DISK"));

    assert!(result.is_success(), "{}", result.error);
    assert_eq!(result.mime_type, "image/png");
    let img = decode(&result.image_data);
    assert_eq!(img.dimensions(), (300, 200));
}
