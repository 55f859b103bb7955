use std::f64::consts::TAU;

use chart_markers::core::{MarkerShape, Viewport};
use chart_markers::extensions::MarkerRenderItem;
use chart_markers::render::{
    BitmapShapeCoordinates, Color, DrawCommand, DrawingContext, FontSpec, MarkerFrame,
    NullRenderer, RecordingContext, Renderer, TextBaseline, TextHAlign, draw_circle,
    draw_circle_with_text, draw_marker, draw_marker_frame, truncate_inner_text,
};

fn item(shape: MarkerShape, inner_text: Option<&str>) -> MarkerRenderItem {
    let item =
        MarkerRenderItem::new(shape, 50.0, 25.0, 10.0, Color::rgb(0.2, 0.4, 0.8)).with_id("m");
    match inner_text {
        Some(text) => item.with_inner_text(text),
        None => item,
    }
}

#[test]
fn circle_with_text_records_expected_command_sequence() {
    let mut ctx = RecordingContext::new();
    draw_circle_with_text(
        &mut ctx,
        BitmapShapeCoordinates::new(100.0, 50.0, 2.0),
        10.0,
        Some("AB"),
        None,
        None,
    )
    .expect("draw");

    let expected = vec![
        DrawCommand::BeginPath,
        DrawCommand::Arc {
            x: 100.0,
            y: 50.0,
            radius: 10.0,
            start_angle: 0.0,
            end_angle: TAU,
        },
        DrawCommand::Fill,
        DrawCommand::Save,
        DrawCommand::Scale { sx: 2.0, sy: 2.0 },
        DrawCommand::SetFillColor(Color::WHITE),
        DrawCommand::SetFont(FontSpec::new(8.0, "Arial")),
        DrawCommand::SetTextAlign(TextHAlign::Center),
        DrawCommand::SetTextBaseline(TextBaseline::Middle),
        DrawCommand::FillText {
            text: "AB".to_owned(),
            x: 50.0,
            y: 25.0,
        },
        DrawCommand::Restore,
    ];
    assert_eq!(ctx.commands(), expected.as_slice());
}

#[test]
fn text_state_does_not_leak_after_draw() {
    let mut ctx = RecordingContext::new();
    ctx.set_fill_color(Color::rgb(0.1, 0.2, 0.3));
    draw_circle_with_text(
        &mut ctx,
        BitmapShapeCoordinates::new(30.0, 30.0, 1.5),
        20.0,
        Some("X"),
        Some(Color::BLACK),
        Some(14.0),
    )
    .expect("draw");

    assert_eq!(ctx.save_depth(), 0);
    assert_eq!(ctx.current_scale(), (1.0, 1.0));
    assert_eq!(ctx.current_fill_color(), Color::rgb(0.1, 0.2, 0.3));
    assert!(ctx.current_font().is_none());
    assert_eq!(ctx.current_text_align(), TextHAlign::Left);
}

#[test]
fn inner_text_is_truncated_to_two_characters() {
    let mut long = RecordingContext::new();
    let mut short = RecordingContext::new();
    let coords = BitmapShapeCoordinates::new(10.0, 10.0, 1.0);
    draw_circle_with_text(&mut long, coords, 12.0, Some("ABCD"), None, None).expect("draw");
    draw_circle_with_text(&mut short, coords, 12.0, Some("AB"), None, None).expect("draw");

    assert_eq!(long.commands(), short.commands());
    assert_eq!(truncate_inner_text("€uro"), "€u");
    assert_eq!(truncate_inner_text("Z"), "Z");
}

#[test]
fn empty_or_missing_inner_text_draws_only_the_circle() {
    for text in [None, Some("")] {
        let mut ctx = RecordingContext::new();
        draw_circle_with_text(
            &mut ctx,
            BitmapShapeCoordinates::new(10.0, 10.0, 1.0),
            10.0,
            text,
            None,
            None,
        )
        .expect("draw");

        assert_eq!(ctx.commands().len(), 3);
        assert!(ctx.drawn_texts().is_empty());
        assert!(
            !ctx.commands()
                .iter()
                .any(|command| matches!(command, DrawCommand::SetFont(_) | DrawCommand::Save))
        );
    }
}

#[test]
fn explicit_text_style_overrides_defaults() {
    let mut ctx = RecordingContext::new();
    let red = Color::rgb(1.0, 0.0, 0.0);
    draw_circle_with_text(
        &mut ctx,
        BitmapShapeCoordinates::new(10.0, 10.0, 1.0),
        30.0,
        Some("S"),
        Some(red),
        Some(13.0),
    )
    .expect("draw");

    assert!(ctx.commands().contains(&DrawCommand::SetFillColor(red)));
    assert!(
        ctx.commands()
            .contains(&DrawCommand::SetFont(FontSpec::new(13.0, "Arial")))
    );
}

#[test]
fn default_font_grows_with_large_shapes() {
    let mut ctx = RecordingContext::new();
    // size 30 -> shape 29 -> half 14 -> font 8.4
    draw_circle_with_text(
        &mut ctx,
        BitmapShapeCoordinates::new(0.0, 0.0, 1.0),
        30.0,
        Some("7"),
        None,
        None,
    )
    .expect("draw");

    let font = ctx
        .commands()
        .iter()
        .find_map(|command| match command {
            DrawCommand::SetFont(font) => Some(font.clone()),
            _ => None,
        })
        .expect("font set");
    approx::assert_relative_eq!(font.size_px, 14.0 * 0.6);
}

#[test]
fn plain_circle_uses_smaller_footprint() {
    let mut ctx = RecordingContext::new();
    draw_circle(&mut ctx, BitmapShapeCoordinates::new(5.0, 5.0, 1.0), 10.0).expect("draw");
    // circle coefficient 0.8 -> shape 9 -> radius 4
    assert!(ctx.commands().iter().any(|command| matches!(
        command,
        DrawCommand::Arc { radius, .. } if *radius == 4.0
    )));
}

#[test]
fn draw_marker_sets_marker_color_and_skips_undrawable_shapes() {
    let mut ctx = RecordingContext::new();
    let drawn = draw_marker(&mut ctx, &item(MarkerShape::CircleWithText, Some("B")), 2.0)
        .expect("draw");
    assert!(drawn);
    assert_eq!(
        ctx.commands().first(),
        Some(&DrawCommand::SetFillColor(Color::rgb(0.2, 0.4, 0.8)))
    );
    assert_eq!(ctx.drawn_texts(), vec!["B"]);

    for shape in [MarkerShape::Square, MarkerShape::ArrowUp, MarkerShape::ArrowDown] {
        let mut ctx = RecordingContext::new();
        assert!(!draw_marker(&mut ctx, &item(shape, None), 1.0).expect("draw"));
        assert!(ctx.commands().is_empty());
    }
}

#[test]
fn frame_replay_counts_drawn_markers() {
    let frame = MarkerFrame::new(Viewport::new(200, 100), 1.0).with_items([
        item(MarkerShape::CircleWithText, Some("A")),
        item(MarkerShape::Circle, None),
        item(MarkerShape::Square, None),
    ]);

    let mut ctx = RecordingContext::new();
    assert_eq!(draw_marker_frame(&mut ctx, &frame).expect("replay"), 2);

    let mut renderer = NullRenderer::default();
    renderer.render(&frame).expect("render");
    assert_eq!(renderer.last_marker_count, 3);
    assert_eq!(renderer.last_drawn_count, 2);
    assert_eq!(renderer.last_text_count, 1);
}

#[test]
fn invalid_frames_are_rejected() {
    let mut renderer = NullRenderer::default();
    let empty_viewport = MarkerFrame::new(Viewport::new(0, 100), 1.0);
    assert!(renderer.render(&empty_viewport).is_err());

    let bad_ratio = MarkerFrame::new(Viewport::new(10, 10), 0.0);
    assert!(renderer.render(&bad_ratio).is_err());

    let mut bad_item = item(MarkerShape::Circle, None);
    bad_item.x = f64::NAN;
    let frame = MarkerFrame::new(Viewport::new(10, 10), 1.0).with_item(bad_item);
    assert!(renderer.render(&frame).is_err());
}

#[test]
fn unbalanced_restore_is_an_error() {
    let mut ctx = RecordingContext::new();
    assert!(ctx.restore().is_err());
}
