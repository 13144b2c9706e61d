//! Integration tests for inline-artifacts.
//!
//! Every fixture is generated in-process (`image` for rasters,
//! `rust_xlsxwriter` for workbooks, literal CSV), so these run offline and
//! without any files on disk.
//!
//! Run with:
//!   cargo test --test pipeline -- --nocapture

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use inline_artifacts::{
    build, decode, decode_to_image, decode_to_image_with_extension, decode_to_table,
    decode_to_table_with_type, decode_with_extension, file_extension_of, file_type_of,
    literal_table_to_html, parse, render_image, render_plot, render_table, table_from_rows,
    text_to_download_link, ArtifactError, CellValue, Figure, ImageRenderOptions,
    PlotRenderOptions, TableDownloadFormat, TableRenderOptions, TextDownloadOptions,
};
use plotters::prelude::*;
use std::io::Cursor;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

fn jpeg_upload(w: u32, h: u32) -> String {
    let img = DynamicImage::ImageRgb8(RgbImage::from_fn(w, h, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
        .unwrap();
    data_uri("image/jpeg", &buf)
}

/// Decode the base64 payload of the first `attr='data:…'` in `fragment`.
fn payload_of(fragment: &str, attr: &str) -> Vec<u8> {
    let start = fragment.find(&format!("{attr}='")).unwrap() + attr.len() + 2;
    let rest = &fragment[start..];
    let uri = &rest[..rest.find('\'').unwrap()];
    let (_, payload) = parse(uri).unwrap();
    STANDARD.decode(payload).unwrap()
}

fn bar_figure() -> Figure {
    Figure::new(|area| {
        area.fill(&WHITE)?;
        area.draw(&Rectangle::new([(20, 20), (120, 80)], BLUE.filled()))?;
        Ok(())
    })
    .with_size(2.0, 1.0)
}

// ── Codec & decoder ──────────────────────────────────────────────────────────

#[test]
fn codec_splits_and_joins() {
    let (meta, payload) = parse("data:text/plain;base64,aGVsbG8=").unwrap();
    assert_eq!(meta, "data:text/plain");
    assert_eq!(payload, "aGVsbG8=");
    assert_eq!(build(meta, payload), "data:text/plain;base64,aGVsbG8=");
}

#[test]
fn malformed_input_is_rejected_everywhere() {
    for input in ["hello", "", "data:text/plain,aGk="] {
        assert!(matches!(
            decode(input),
            Err(ArtifactError::MalformedInput { .. })
        ));
        assert!(decode_to_image(input).is_err());
        assert!(decode_to_table(input).is_err());
    }
}

#[test]
fn decoded_buffer_starts_at_zero() {
    let buffer = decode("data:text/plain;base64,aGVsbG8=").unwrap();
    assert_eq!(buffer.position(), 0);
    assert_eq!(buffer.get_ref().as_slice(), b"hello");
}

#[test]
fn type_tags_and_extensions() {
    assert_eq!(file_type_of("data:image/jpeg;base64,"), "jpeg");
    assert_eq!(file_type_of("data:text/csv;base64,"), "csv");
    assert_eq!(
        file_type_of(
            "data:application/vnd.openxmlformats-officedocument.spreadsheetml.sheet;base64,"
        ),
        "xlsx"
    );
    assert_eq!(file_extension_of("data:image/jpeg;base64,").unwrap(), ".jpg");
    assert_eq!(file_extension_of("data:text/csv;base64,").unwrap(), ".csv");
    assert!(matches!(
        file_extension_of("data:application/x-never-registered;base64,"),
        Err(ArtifactError::UnknownType { .. })
    ));

    let (buffer, ext) = decode_with_extension("data:text/html;base64,PHA+").unwrap();
    assert_eq!(ext, ".html");
    assert_eq!(buffer.get_ref().as_slice(), b"<p>");
}

// ── Images ───────────────────────────────────────────────────────────────────

#[test]
fn jpeg_upload_round_trip() {
    let upload = jpeg_upload(640, 480);
    let image = decode_to_image(&upload).unwrap();
    assert_eq!(image.dimensions(), (640, 480));
    assert_eq!(image.format(), ImageFormat::Jpeg);

    let (_, ext) = decode_to_image_with_extension(&upload).unwrap();
    assert_eq!(ext, ".jpg");

    let options = ImageRenderOptions::builder().download(true).build().unwrap();
    let html = render_image(&image, &options).unwrap();
    assert!(html.display.starts_with("<img src="));
    let download = html.download.as_deref().unwrap();
    assert!(download.starts_with("<a href="));
    assert!(download.contains("download='myimg.png'"));

    let shown = image::load_from_memory(&payload_of(&html.display, "src")).unwrap();
    assert_eq!((shown.width(), shown.height()), (200, 150));
    let full = image::load_from_memory(&payload_of(download, "href")).unwrap();
    assert_eq!((full.width(), full.height()), (640, 480));
}

#[test]
fn image_download_type_override() {
    let image = decode_to_image(&jpeg_upload(30, 20)).unwrap();
    let options = ImageRenderOptions::builder()
        .download(true)
        .download_type(".JPG")
        .download_name("photo")
        .build()
        .unwrap();
    let html = render_image(&image, &options).unwrap();
    assert!(html.display.starts_with("<img src='data:image/jpeg;base64,"));
    assert!(html.download.unwrap().contains("download='photo.jpg'"));
}

#[test]
fn csv_bytes_are_not_an_image() {
    let upload = data_uri("text/csv", b"A,B\n1,2\n");
    assert!(matches!(
        decode_to_image(&upload),
        Err(ArtifactError::InvalidImage { .. })
    ));
}

// ── Tables ───────────────────────────────────────────────────────────────────

#[test]
fn csv_upload_round_trip() {
    let upload = data_uri("text/csv", b"A,B,C\n1,2,3\n4,5,6\n");
    let (table, tag) = decode_to_table_with_type(&upload).unwrap();
    assert_eq!(tag, "csv");
    assert_eq!(table.columns(), ["A", "B", "C"]);
    assert_eq!(table.num_rows(), 2);
    assert_eq!(table.rows()[1][2], CellValue::Int(6));

    let options = TableRenderOptions {
        download: true,
        ..Default::default()
    };
    let html = render_table(&table, &options).unwrap();
    assert!(html.display.starts_with("<table"));
    let download = html.download.unwrap();
    assert!(download.contains("download='myfile.csv'"));
    assert_eq!(payload_of(&download, "href"), b"A,B,C\n1,2,3\n4,5,6\n");
}

#[test]
fn xlsx_upload_round_trip() {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "name").unwrap();
    sheet.write_string(0, 1, "score").unwrap();
    sheet.write_string(1, 0, "ada").unwrap();
    sheet.write_number(1, 1, 36.0).unwrap();
    let bytes = workbook.save_to_buffer().unwrap();

    let upload = data_uri(
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        &bytes,
    );
    let (table, tag) = decode_to_table_with_type(&upload).unwrap();
    assert_eq!(tag, "xlsx");
    assert_eq!(table.columns(), ["name", "score"]);
    assert_eq!(
        table.column("score").unwrap(),
        vec![&CellValue::Int(36)]
    );

    let options = TableRenderOptions {
        download: true,
        download_format: TableDownloadFormat::from_alias("excel"),
        ..Default::default()
    };
    let download = render_table(&table, &options).unwrap().download.unwrap();
    assert!(download.contains("download='myfile.xlsx'"));
    let echoed = payload_of(&download, "href");
    assert_eq!(&echoed[..2], b"PK");
}

#[test]
fn garbage_is_not_a_table() {
    let upload = data_uri("application/octet-stream", &[0xff, 0x00, 0x13, 0x37]);
    assert!(matches!(
        decode_to_table(&upload),
        Err(ArtifactError::UnsupportedTableFormat { .. })
    ));
}

#[test]
fn rows_must_match_headers() {
    let err = table_from_rows(&["a", "b"], vec![vec![1, 2], vec![3]]).unwrap_err();
    assert!(matches!(
        err,
        ArtifactError::RowLengthMismatch {
            row: 1,
            expected: 2,
            found: 1
        }
    ));
}

// ── Plots ────────────────────────────────────────────────────────────────────

#[test]
fn plot_rendering_is_deterministic() {
    let options = PlotRenderOptions::builder().download(true).build().unwrap();
    let first = render_plot(bar_figure(), &options).unwrap();
    let second = render_plot(bar_figure(), &options).unwrap();
    assert_eq!(first, second);

    assert!(first.display.ends_with("width='500'>"));
    let png = image::load_from_memory(&payload_of(&first.display, "src")).unwrap();
    assert_eq!((png.width(), png.height()), (200, 100));
    assert!(first.download.unwrap().contains("download='myplot.png'"));
}

// ── Text & literal tables ────────────────────────────────────────────────────

#[test]
fn text_download_link_carries_text() {
    let link = text_to_download_link("hello", &TextDownloadOptions::default());
    assert!(link.starts_with("<a href='data:text/plain;base64,"));
    assert!(link.contains("download='myfile.txt'"));
    assert_eq!(payload_of(&link, "href"), b"hello");
}

#[test]
fn literal_table_escapes_cells() {
    let html = literal_table_to_html(&["<b>"], &[vec!["<script>"]]);
    assert!(html.contains("&lt;b&gt;"));
    assert!(html.contains("&lt;script&gt;"));
    assert!(!html.contains("<script>"));
}
