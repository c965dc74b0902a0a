
use rm_inkml::mapper::{SCREEN_HEIGHT, SCREEN_WIDTH, X_PAD, Y_PAD};
use rm_inkml::{
    BoundingBox, CoordinateMapper, Canvas, InkmlError, Node, Point, SceneTree, Stroke, Tool,
    export, export_to_string,
};
use test_helpers::{load_scene, parse_output};

fn assert_in_canvas(samples: &[(i32, i32, i32)]) {
    for &(x, y, _) in samples {
        assert!(
            (X_PAD..=SCREEN_WIDTH - X_PAD).contains(&x),
            "x={} outside the padded canvas",
            x
        );
        assert!(
            (Y_PAD..=SCREEN_HEIGHT - Y_PAD).contains(&y),
            "y={} outside the padded canvas",
            y
        );
    }
}

#[test]
fn wide_page_scenario() {
    let scene = load_scene("wide_page.json");
    assert_eq!(
        BoundingBox::of_scene(&scene),
        BoundingBox {
            min_x: 0.0,
            max_x: 1000.0,
            min_y: 0.0,
            max_y: 500.0
        }
    );

    let xml = export_to_string(&scene).unwrap();
    let (brushes, traces) = parse_output(&xml);

    assert_eq!(brushes, vec!["br1"]);
    assert_eq!(traces.len(), 1);

    let (id, brush, samples) = &traces[0];
    assert_eq!(id, "1");
    assert_eq!(brush, "#br1");
    assert_eq!(samples.len(), 2);
    assert_in_canvas(samples);

    let (x0, y0, f0) = samples[0];
    let (x1, y1, f1) = samples[1];
    // padding corner along x, far corner along x; y centered in the widened range
    assert_eq!(x0, X_PAD);
    assert_eq!(x1, SCREEN_WIDTH - X_PAD);
    assert!(y0 < y1);
    assert!((y0 - Y_PAD) - (SCREEN_HEIGHT - Y_PAD - y1) <= 1);
    assert_eq!(f0, 64);
    assert_eq!(f1, 128);
}

#[test]
fn empty_document_is_valid() {
    let scene = load_scene("empty.json");
    let xml = export_to_string(&scene).unwrap();
    let (brushes, traces) = parse_output(&xml);

    assert!(brushes.is_empty());
    assert!(traces.is_empty());
    assert!(xml.contains("<inkml:traceGroup>"));
    assert!(xml.contains("</inkml:traceGroup>"));
    assert!(xml.contains(r#"<inkml:channel name="F" type="integer" max="32767" units="dev"/>"#));
}

#[test]
fn pens_dedup_across_groups() {
    let scene = load_scene("mixed_pens.json");
    let stats = scene.stats();
    assert_eq!(stats.strokes, 6);
    assert_eq!(stats.texts, 1);
    assert_eq!(stats.groups, 3);

    let xml = export_to_string(&scene).unwrap();
    let (brushes, traces) = parse_output(&xml);

    assert_eq!(brushes, vec!["br1", "br2", "br3"]);

    let ids: Vec<&str> = traces.iter().map(|(id, _, _)| id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3", "4", "5", "6"]);

    let refs: Vec<&str> = traces.iter().map(|(_, b, _)| b.as_str()).collect();
    assert_eq!(refs, vec!["#br1", "#br2", "#br1", "#br3", "#br2", "#br3"]);

    for (_, _, samples) in &traces {
        assert_in_canvas(samples);
    }
}

#[test]
fn text_is_not_rendered() {
    let scene = load_scene("mixed_pens.json");
    let xml = export_to_string(&scene).unwrap();
    assert!(!xml.contains("Title"));
}

#[test]
fn unknown_color_fails_without_output() {
    let scene = load_scene("bad_color.json");
    let mut out = Vec::new();
    let err = export(&scene, &mut out).unwrap_err();
    assert!(matches!(err, InkmlError::UnknownColor(42)));
    assert!(out.is_empty());
}

#[test]
fn trace_order_follows_points() {
    let points: Vec<Point> = (0..20)
        .map(|i| Point::new(i as f64 * 50.0, (i % 5) as f64 * 30.0, i as f64 / 19.0))
        .collect();
    let scene = SceneTree::new(vec![Node::Stroke(Stroke {
        tool: Tool::Ballpoint,
        color: 0,
        thickness_scale: 1.0,
        points: points.clone(),
    })]);

    let mapper = CoordinateMapper::for_scene(&scene, Canvas::default());
    let expected: Vec<(i32, i32, i32)> = points
        .iter()
        .map(|p| mapper.map(p))
        .map(|p| (p.x, p.y, p.force))
        .collect();

    let (_, traces) = parse_output(&export_to_string(&scene).unwrap());
    assert_eq!(traces[0].2, expected);
}

#[test]
fn exports_are_independent() {
    let wide = load_scene("wide_page.json");
    let mixed = load_scene("mixed_pens.json");

    let first = export_to_string(&wide).unwrap();
    let _ = export_to_string(&mixed).unwrap();
    let again = export_to_string(&wide).unwrap();
    assert_eq!(first, again);
}

#[test]
fn concurrent_exports_match_sequential() {
    let scenes = ["wide_page.json", "mixed_pens.json", "empty.json"].map(load_scene);
    let sequential: Vec<String> = scenes.iter().map(|s| export_to_string(s).unwrap()).collect();

    let concurrent: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = scenes
            .iter()
            .map(|s| scope.spawn(move || export_to_string(s).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(sequential, concurrent);
}
