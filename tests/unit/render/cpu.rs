use super::*;
use crate::foundation::core::Rect;
use kurbo::Shape;

const RED: ColorDef = ColorDef {
    r: 1.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

fn canvas() -> Canvas {
    Canvas {
        width: 20,
        height: 20,
    }
}

fn px(buf: &[u8], x: u32, y: u32) -> [u8; 4] {
    let i = ((y * canvas().width + x) * 4) as usize;
    [buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]
}

fn rect_node(id: &str, r: Rect, color: ColorDef) -> SceneNode {
    SceneNode::new(
        id,
        1.0,
        NodeContent::Shape {
            path: r.to_path(0.1),
            transform: Affine::IDENTITY,
            fill: Some(color),
            stroke: None,
            uniform_stroke: true,
        },
    )
}

fn scene(nodes: Vec<SceneNode>) -> Scene {
    Scene {
        width: 20.0,
        height: 20.0,
        nodes,
    }
}

#[test]
fn filled_shapes_cover_their_interior_only() {
    let out = CpuRasterizer::new()
        .render(
            &scene(vec![rect_node("r", Rect::new(0.0, 0.0, 10.0, 20.0), RED)]),
            Affine::IDENTITY,
            canvas(),
        )
        .unwrap();
    assert_eq!(out.len(), canvas().byte_len());
    assert_eq!(px(&out, 5, 5), [255, 0, 0, 255]);
    assert_eq!(px(&out, 15, 5), [0, 0, 0, 0]);
}

#[test]
fn view_transform_moves_the_drawing() {
    let out = CpuRasterizer::new()
        .render(
            &scene(vec![rect_node("r", Rect::new(10.0, 0.0, 20.0, 20.0), RED)]),
            Affine::translate((-10.0, 0.0)),
            canvas(),
        )
        .unwrap();
    assert_eq!(px(&out, 5, 5)[3], 255);
    assert_eq!(px(&out, 15, 5)[3], 0);
}

#[test]
fn path_clips_cut_the_node() {
    let mut node = rect_node("r", Rect::new(0.0, 0.0, 20.0, 20.0), RED);
    node.clips
        .push(ClipShape::Path(Rect::new(0.0, 0.0, 20.0, 10.0).to_path(0.1)));
    let out = CpuRasterizer::new()
        .render(&scene(vec![node]), Affine::IDENTITY, canvas())
        .unwrap();
    assert_eq!(px(&out, 5, 5)[3], 255);
    assert_eq!(px(&out, 5, 15)[3], 0);
}

#[test]
fn group_opacity_applies_once_to_the_composite() {
    let children = vec![
        rect_node("a", Rect::new(0.0, 0.0, 20.0, 20.0), RED),
        rect_node("b", Rect::new(0.0, 0.0, 20.0, 20.0), RED),
    ];
    let group = SceneNode::new("g", 0.5, NodeContent::Group(children));
    let out = CpuRasterizer::new()
        .render(&scene(vec![group]), Affine::IDENTITY, canvas())
        .unwrap();
    let a = px(&out, 10, 10)[3];
    assert!((126..=129).contains(&a), "alpha {a}");
}

#[test]
fn images_draw_their_pixels_under_the_transform() {
    let pixels = ImagePixels {
        width: 2,
        height: 2,
        premul: Arc::new([0, 0, 255, 255].repeat(4)),
    };
    let node = SceneNode::new(
        "img",
        1.0,
        NodeContent::Image {
            pixels,
            transform: Affine::scale(5.0),
        },
    );
    let out = CpuRasterizer::new()
        .render(&scene(vec![node]), Affine::IDENTITY, canvas())
        .unwrap();
    assert_eq!(px(&out, 4, 4), [0, 0, 255, 255]);
    assert_eq!(px(&out, 15, 15)[3], 0);
}

#[test]
fn shadows_paint_beneath_and_offset() {
    let mut node = rect_node("r", Rect::new(0.0, 0.0, 10.0, 10.0), RED);
    node.shadow = Some(Shadow {
        color: ColorDef::rgba(0.0, 0.0, 0.0, 1.0),
        blur: 0.0,
        offset_x: 5.0,
        offset_y: 5.0,
    });
    let out = CpuRasterizer::new()
        .render(&scene(vec![node]), Affine::IDENTITY, canvas())
        .unwrap();
    assert_eq!(px(&out, 2, 2), [255, 0, 0, 255]);
    assert_eq!(px(&out, 12, 12), [0, 0, 0, 255]);
    assert_eq!(px(&out, 17, 17)[3], 0);
}

#[test]
fn strokes_draw_outside_unfilled_shapes() {
    let node = SceneNode::new(
        "s",
        1.0,
        NodeContent::Shape {
            path: Rect::new(4.0, 4.0, 16.0, 16.0).to_path(0.1),
            transform: Affine::IDENTITY,
            fill: None,
            stroke: Some(StrokeSpec {
                color: RED,
                width: 2.0,
                cap: LineCapDef::Butt,
                join: LineJoinDef::Miter,
                miter_limit: 4.0,
            }),
            uniform_stroke: true,
        },
    );
    let out = CpuRasterizer::new()
        .render(&scene(vec![node]), Affine::IDENTITY, canvas())
        .unwrap();
    assert_eq!(px(&out, 10, 4)[3], 255);
    assert_eq!(px(&out, 10, 10)[3], 0);
}
