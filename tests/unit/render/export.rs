use super::*;

#[test]
fn png_round_trips_through_the_decoder() {
    // Half-transparent red, premultiplied.
    let premul = [128u8, 0, 0, 128].repeat(6);
    let img = encode(&premul, 3, 2, ExportFormat::Png).unwrap();
    assert_eq!((img.width, img.height), (3, 2));
    assert!(img.bytes.starts_with(b"\x89PNG"));

    let decoded = image::load_from_memory(&img.bytes).unwrap().to_rgba8();
    assert_eq!(decoded.get_pixel(0, 0).0, [255, 0, 0, 128]);
}

#[test]
fn webp_output_is_a_riff_container() {
    let img = encode(&[0u8; 16], 2, 2, ExportFormat::Webp).unwrap();
    assert!(img.bytes.starts_with(b"RIFF"));
    assert_eq!(&img.bytes[8..12], b"WEBP");
}

#[test]
fn data_urls_name_their_mime_type() {
    let img = RenderedImage {
        width: 1,
        height: 1,
        format: ExportFormat::Webp,
        bytes: vec![1, 2, 3],
    };
    assert_eq!(img.to_data_url(), "data:image/webp;base64,AQID");
    assert_eq!(ExportFormat::Png.to_string(), "png");
}

#[test]
fn mismatched_surfaces_are_render_errors() {
    let err = encode(&[0u8; 3], 1, 1, ExportFormat::Png).unwrap_err();
    assert!(matches!(err, BatchboardError::Render(_)));
}
