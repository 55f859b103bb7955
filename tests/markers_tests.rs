use chart_markers::ChartError;
use chart_markers::core::{BusinessDay, MarkerShape};
use chart_markers::extensions::{
    BarPosition, MarkerAnchor, MarkerPosition, MarkerSet, PricePosition, SeriesMarker,
};
use chart_markers::render::Color;

fn circle(time: f64, position: MarkerPosition) -> SeriesMarker<f64> {
    SeriesMarker::new(time, position, MarkerShape::CircleWithText, "#2196F3")
}

#[test]
fn ingestion_orders_markers_by_time() {
    let set = MarkerSet::from_markers(vec![
        circle(30.0, MarkerPosition::AboveBar).with_id("late"),
        circle(10.0, MarkerPosition::BelowBar).with_id("early"),
        circle(20.0, MarkerPosition::InBar).with_id("middle"),
    ])
    .expect("valid markers");

    let ids: Vec<_> = set
        .markers()
        .iter()
        .map(|marker| marker.id.as_deref())
        .collect();
    assert_eq!(ids, vec![Some("early"), Some("middle"), Some("late")]);
}

#[test]
fn markers_sharing_time_keep_input_order() {
    let set = MarkerSet::from_markers(vec![
        circle(5.0, MarkerPosition::AboveBar).with_id("a"),
        circle(1.0, MarkerPosition::AboveBar).with_id("x"),
        circle(5.0, MarkerPosition::AboveBar).with_id("b"),
        circle(5.0, MarkerPosition::BelowBar).with_id("c"),
    ])
    .expect("valid markers");

    let same_time: Vec<_> = set
        .markers_at(5.0)
        .iter()
        .map(|marker| marker.id.as_deref().expect("id"))
        .collect();
    assert_eq!(same_time, vec!["a", "b", "c"]);
    assert!(set.markers_at(2.0).is_empty());
    assert_eq!(set.find_by_id("x").map(|m| m.time), Some(1.0));
    assert!(set.find_by_id("missing").is_none());
}

#[test]
fn price_relative_marker_without_price_rejects_batch() {
    let err = MarkerSet::from_markers(vec![
        circle(1.0, MarkerPosition::AboveBar),
        circle(2.0, MarkerPosition::AtPriceTop),
    ])
    .expect_err("missing price must fail");

    assert!(matches!(
        err,
        ChartError::MissingMarkerPrice {
            index: 1,
            position: MarkerPosition::AtPriceTop
        }
    ));
}

#[test]
fn price_relative_marker_requires_finite_price() {
    let err = MarkerSet::from_markers(vec![
        circle(1.0, MarkerPosition::AtPriceMiddle).with_price(f64::NAN),
    ])
    .expect_err("nan price must fail");
    assert!(matches!(err, ChartError::InvalidData(_)));
}

#[test]
fn bar_relative_marker_ignores_price() {
    let set = MarkerSet::from_markers(vec![
        circle(1.0, MarkerPosition::BelowBar).with_price(f64::NAN),
        circle(2.0, MarkerPosition::AtPriceBottom).with_price(42.5),
    ])
    .expect("valid markers");

    let markers = set.markers();
    assert_eq!(markers[0].anchor, MarkerAnchor::Bar(BarPosition::Below));
    assert_eq!(markers[0].price(), None);
    assert_eq!(
        markers[1].anchor,
        MarkerAnchor::Price {
            position: PricePosition::Bottom,
            price: 42.5
        }
    );
    assert_eq!(markers[1].position(), MarkerPosition::AtPriceBottom);
}

#[test]
fn ingestion_resolves_defaults_and_parses_colors() {
    let set = MarkerSet::from_markers(vec![
        circle(1.0, MarkerPosition::InBar)
            .with_inner_text("AB")
            .with_inner_text_color("#000"),
    ])
    .expect("valid marker");

    let marker = &set.markers()[0];
    assert_eq!(marker.size, 1.0);
    assert_eq!(marker.color, Color::from_rgba8(0x21, 0x96, 0xF3, 0xFF));
    assert_eq!(marker.inner_text_color, Some(Color::BLACK));
    assert_eq!(marker.original_time, 1.0);
}

#[test]
fn ingestion_accepts_any_css_color() {
    let set = MarkerSet::from_markers(vec![
        circle(1.0, MarkerPosition::InBar).with_id("hex"),
        SeriesMarker::new(2.0, MarkerPosition::InBar, MarkerShape::Circle, "orange")
            .with_id("named"),
        SeriesMarker::new(3.0, MarkerPosition::InBar, MarkerShape::Circle, "rgb(33 150 243)")
            .with_id("space-rgb"),
        SeriesMarker::new(4.0, MarkerPosition::InBar, MarkerShape::Circle, "rgba(0,0,0,50%)")
            .with_id("percent-alpha"),
        SeriesMarker::new(5.0, MarkerPosition::InBar, MarkerShape::Circle, "hsl(0, 100%, 50%)")
            .with_id("hsl"),
    ])
    .expect("css colors are valid");

    let color = |id: &str| set.find_by_id(id).expect("marker").color;
    assert_eq!(color("named"), Color::from_rgba8(0xFF, 0xA5, 0x00, 0xFF));
    assert_eq!(color("space-rgb"), color("hex"));
    assert_eq!(color("hsl"), Color::from_rgba8(0xFF, 0x00, 0x00, 0xFF));
    assert!((color("percent-alpha").alpha - 0.5).abs() < 0.01);
}

#[test]
fn malformed_styles_fall_back_without_rejecting_batch() {
    let set = MarkerSet::from_markers(vec![
        SeriesMarker::new(1.0, MarkerPosition::InBar, MarkerShape::Circle, "not-a-color")
            .with_id("bad-color"),
        circle(2.0, MarkerPosition::InBar)
            .with_id("bad-inner-color")
            .with_inner_text_color("#12"),
        circle(3.0, MarkerPosition::InBar).with_id("zero-size").with_size(0.0),
        circle(4.0, MarkerPosition::InBar)
            .with_id("infinite-size")
            .with_size(f64::INFINITY),
        circle(5.0, MarkerPosition::InBar)
            .with_id("zero-text-size")
            .with_inner_text_size(0.0),
        circle(6.0, MarkerPosition::InBar)
            .with_id("negative-text-size")
            .with_inner_text_size(-1.0),
    ])
    .expect("style problems never reject the batch");
    assert_eq!(set.len(), 6);

    let marker = |id: &str| set.find_by_id(id).expect("marker");
    assert_eq!(marker("bad-color").color, Color::BLACK);
    assert_eq!(marker("bad-inner-color").inner_text_color, None);
    assert_eq!(marker("zero-size").size, 1.0);
    assert_eq!(marker("infinite-size").size, 1.0);
    assert_eq!(marker("zero-text-size").inner_text_size, None);
    assert_eq!(marker("negative-text-size").inner_text_size, None);
}

#[test]
fn non_finite_time_rejects_batch() {
    let err = MarkerSet::from_markers(vec![
        circle(1.0, MarkerPosition::InBar),
        circle(f64::NAN, MarkerPosition::InBar),
    ])
    .expect_err("nan time must fail");
    assert!(matches!(err, ChartError::InvalidData(_)));
}

#[test]
fn business_day_markers_keep_original_time() {
    let set = MarkerSet::from_markers(vec![
        SeriesMarker::new(
            BusinessDay::new(2024, 2, 20),
            MarkerPosition::BelowBar,
            MarkerShape::CircleWithText,
            "#FF5722",
        ),
        SeriesMarker::new(
            BusinessDay::new(2024, 1, 15),
            MarkerPosition::AboveBar,
            MarkerShape::CircleWithText,
            "#2196F3",
        ),
    ])
    .expect("valid markers");

    let first = &set.markers()[0];
    assert_eq!(first.original_time, BusinessDay::new(2024, 1, 15));
    assert_eq!(first.time, 1_705_276_800.0);
    assert_eq!(first.position(), MarkerPosition::AboveBar);
}

#[test]
fn invalid_business_day_is_rejected() {
    let err = MarkerSet::from_markers(vec![SeriesMarker::new(
        BusinessDay::new(2024, 2, 30),
        MarkerPosition::InBar,
        MarkerShape::Circle,
        "red",
    )])
    .expect_err("invalid calendar day");
    assert!(matches!(err, ChartError::InvalidData(_)));
}

#[test]
fn markers_load_from_camel_case_json() {
    let json = r##"[
        {
            "time": "2024-03-10",
            "position": "atPriceTop",
            "price": 101.5,
            "shape": "circleWithText",
            "color": "#4CAF50",
            "id": "marker3",
            "innerText": "EF",
            "innerTextColor": "#000000",
            "innerTextSize": 10,
            "tooltipText": "Target Price - Key support level"
        },
        {
            "time": "2024-03-11",
            "position": "inBar",
            "shape": "circle",
            "color": "rgba(0, 0, 0, 0.5)"
        }
    ]"##;

    let markers = SeriesMarker::<String>::list_from_json_str(json).expect("parse markers");
    assert_eq!(markers.len(), 2);
    assert_eq!(markers[0].position, MarkerPosition::AtPriceTop);
    assert_eq!(markers[0].inner_text_size, Some(10.0));
    assert_eq!(markers[1].id, None);

    let set = MarkerSet::from_markers(markers).expect("valid markers");
    assert_eq!(set.markers()[0].price(), Some(101.5));
    assert_eq!(set.markers()[0].original_time, "2024-03-10");
}

#[test]
fn markers_json_omits_absent_optional_fields() {
    let markers = vec![circle(1.0, MarkerPosition::AboveBar).with_id("m1")];
    let json = SeriesMarker::list_to_json_pretty(&markers).expect("serialize");
    assert!(json.contains("\"aboveBar\""));
    assert!(json.contains("\"circleWithText\""));
    assert!(!json.contains("tooltipText"));
}

#[test]
fn unknown_position_in_json_is_rejected() {
    let json = r#"[{"time": 1.0, "position": "overBar", "shape": "circle", "color": "red"}]"#;
    let err = SeriesMarker::<f64>::list_from_json_str(json).expect_err("unknown position");
    assert!(matches!(err, ChartError::InvalidData(_)));
}
