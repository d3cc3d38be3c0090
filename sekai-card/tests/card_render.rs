mod common;

use std::io::Write;

use common::{Recorder, png_bytes, renderer};
use sekai_card::{
    BackgroundSource, CardBlock, CardStyle, HeaderImage, LayoutEngine, Normalizer, compose_blocks,
};

fn dimensions(png: &[u8]) -> (u32, u32) {
    let decoded = image::load_from_memory(png).expect("valid png");
    (decoded.width(), decoded.height())
}

const SMALLTALK: &str = "**Today's small talk**
**EN: Where do you like to study?
JP: どこで勉強するのが好きですか？
Romaji: Doko de benkyou suru no ga suki desu ka?**

EN: I study ___ the library every morning.
JP: 毎朝図書館___勉強します。
Romaji: Maiasa toshokan ___ benkyou shimasu.";

#[test]
fn short_card_is_png_at_base_size() {
    let png = renderer().compose("hello", None).unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    assert_eq!(dimensions(&png), (800, 600));
}

#[test]
fn empty_input_still_renders() {
    let png = renderer().compose("", None).unwrap();
    assert_eq!(dimensions(&png), (800, 600));
}

#[test]
fn dimensions_stay_within_policy() {
    let style = CardStyle::default();
    let inputs = [
        "tiny".to_string(),
        SMALLTALK.to_string(),
        "word ".repeat(2000),
        "x".repeat(5000),
        (0..80).map(|i| format!("line {i}\n\n")).collect::<String>(),
    ];

    for input in &inputs {
        let (width, height) = dimensions(&renderer().compose(input, None).unwrap());
        assert!(width as f32 >= style.policy.min_width);
        assert!(width as f32 <= style.policy.max_width);
        assert!(height as f32 >= style.policy.base_height);
    }
}

#[test]
fn tall_content_grows_past_base_height() {
    let input: String = (0..30).map(|i| format!("paragraph {i}\n\n")).collect();
    let (_, height) = dimensions(&renderer().compose(&input, None).unwrap());
    assert!(height > 600);
}

#[test]
fn measured_and_rendered_line_counts_agree() {
    let style = CardStyle::default();
    let measure = common::MonoMeasure { advance: 9.0 };
    let engine = LayoutEngine::new(&measure, &style);
    let normalizer = Normalizer::new(&style.theme.title_sentinel);

    let long_para = "This sentence keeps going ".repeat(40);
    let inputs = [
        SMALLTALK.to_string(),
        format!("Title\n\n{long_para}\n\nmixed **bold** line\nand plain"),
        format!("{}\n\nAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA tail", long_para),
    ];

    for input in &inputs {
        let blocks = compose_blocks(input, &normalizer);
        let measured = engine.measure(&blocks, None);
        let mut recorder = Recorder::default();
        let drawn = engine.render(&mut recorder, &blocks, &measured, None);
        assert_eq!(drawn, measured.block_line_counts, "input: {input:.40}");
    }
}

#[test]
fn last_baseline_fits_inside_canvas() {
    let style = CardStyle::default();
    let measure = common::MonoMeasure { advance: 10.0 };
    let engine = LayoutEngine::new(&measure, &style);
    let blocks: Vec<CardBlock> = (0..25)
        .map(|i| CardBlock::body(vec![format!("block {i} ").repeat(20)]))
        .collect();

    let measured = engine.measure(&blocks, None);
    let mut recorder = Recorder::default();
    engine.render(&mut recorder, &blocks, &measured, None);

    let deepest = recorder.texts.iter().map(|t| t.2).fold(0.0_f32, f32::max);
    assert!(deepest < measured.plan.height as f32 - style.policy.bottom_margin);
}

#[tokio::test]
async fn unreadable_background_falls_back_to_flat_header() {
    let source = BackgroundSource::Path("/definitely/not/here.png".into());
    let png = renderer()
        .compose_with_background("hello", Some(&source))
        .await
        .unwrap();
    assert_eq!(dimensions(&png), (800, 600));

    let style = CardStyle::default();
    let measure = common::MonoMeasure { advance: 10.0 };
    let engine = LayoutEngine::new(&measure, &style);
    let header = HeaderImage::resolve(&source).await;
    assert!(header.is_none());

    let blocks = vec![CardBlock::titled(vec!["hello".to_string()])];
    let measured = engine.measure(&blocks, header.as_ref());
    let mut recorder = Recorder::default();
    engine.render(&mut recorder, &blocks, &measured, header.as_ref());

    assert!(recorder.images.is_empty());
    assert_eq!(recorder.fills[0].1, style.theme.header_color);
    assert_eq!(recorder.fills[0].0.h, style.policy.header_height);
    assert!(recorder.ellipses > 0);
}

#[tokio::test]
async fn corrupt_background_bytes_fall_back() {
    let source = BackgroundSource::Bytes(b"GIF89a but not really".to_vec());
    let png = renderer()
        .compose_with_background("hello", Some(&source))
        .await
        .unwrap();
    assert_eq!(dimensions(&png), (800, 600));
}

#[tokio::test]
async fn background_file_sets_header_height() {
    let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
    file.write_all(&png_bytes(100, 100)).unwrap();
    let source = BackgroundSource::Path(file.path().to_path_buf());

    let png = renderer()
        .compose_with_background("hello", Some(&source))
        .await
        .unwrap();
    // 800 header + 50 top + 48 title + 32 spacing + 60 margin
    assert_eq!(dimensions(&png), (800, 990));

    let header = HeaderImage::resolve(&source).await.unwrap();
    let style = CardStyle::default();
    let measure = common::MonoMeasure { advance: 10.0 };
    let engine = LayoutEngine::new(&measure, &style);
    let blocks = vec![CardBlock::titled(vec!["hello".to_string()])];
    let measured = engine.measure(&blocks, Some(&header));
    let mut recorder = Recorder::default();
    engine.render(&mut recorder, &blocks, &measured, Some(&header));

    assert_eq!(recorder.images.len(), 1);
    assert_eq!(recorder.images[0].h, 800.0);
    assert_eq!(recorder.ellipses, 0);
}
